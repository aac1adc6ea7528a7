//! The site's contact and registration form schemas.

use serde_json::Value;

use crate::path::FieldPath;
use crate::schema::{FieldSchema, ObjectSchema};
use crate::state::FormValues;

/// Challenge tracks a team can register for, as `(value, label)` pairs.
pub const CHALLENGE_TRACKS: &[(&str, &str)] = &[
    ("ai-ml", "AI & Machine Learning"),
    ("web3", "Web3 & Blockchain"),
    ("sustainability", "Sustainability"),
    ("health", "Health & Wellbeing"),
    ("fintech", "FinTech"),
    ("open", "Open Innovation"),
];

/// Experience levels offered on the registration form.
pub const EXPERIENCE_LEVELS: &[&str] = &["beginner", "intermediate", "advanced"];

pub const MAX_TEAM_MEMBERS: usize = 4;

const EMAIL_MESSAGE: &str = "Please enter a valid email address";
const NAME_MESSAGE: &str = "Name must be at least 2 characters";

/// The contact form: name, email, optional subject, message.
pub fn contact_schema() -> ObjectSchema {
    ObjectSchema::new()
        .field(
            "name",
            FieldSchema::string().min_length(2, NAME_MESSAGE),
        )
        .field("email", FieldSchema::string().email(EMAIL_MESSAGE))
        .field(
            "subject",
            FieldSchema::string()
                .optional()
                .max_length(100, "Subject must be at most 100 characters"),
        )
        .field(
            "message",
            FieldSchema::string().min_length(10, "Message must be at least 10 characters"),
        )
}

fn person(phone: bool) -> ObjectSchema {
    let schema = ObjectSchema::new()
        .field("name", FieldSchema::string().min_length(2, NAME_MESSAGE))
        .field("email", FieldSchema::string().email(EMAIL_MESSAGE));
    if phone {
        schema.field(
            "phone",
            FieldSchema::string()
                .optional()
                .min_length(7, "Please enter a valid phone number"),
        )
    } else {
        schema
    }
}

/// The team registration form.
///
/// `members` holds 1 to [`MAX_TEAM_MEMBERS`] people besides the leader, and
/// no member may reuse the leader's email.
pub fn registration_schema() -> ObjectSchema {
    ObjectSchema::new()
        .field(
            "teamName",
            FieldSchema::string()
                .min_length(2, "Team name must be at least 2 characters")
                .max_length(50, "Team name must be at most 50 characters"),
        )
        .field("teamLeader", FieldSchema::object(person(true)))
        .field(
            "members",
            FieldSchema::array(FieldSchema::object(person(false)))
                .min_items(1, "Add at least one team member")
                .max_items(
                    MAX_TEAM_MEMBERS,
                    format!("Teams can have at most {MAX_TEAM_MEMBERS} members"),
                ),
        )
        .field(
            "track",
            FieldSchema::string()
                .required_message("Please select a challenge track")
                .one_of(
                    CHALLENGE_TRACKS.iter().map(|(value, _)| *value),
                    "Please select a challenge track",
                ),
        )
        .field(
            "experience",
            FieldSchema::string()
                .optional()
                .one_of(EXPERIENCE_LEVELS.iter().copied(), "Please select your experience level"),
        )
        .field(
            "agreeToTerms",
            FieldSchema::boolean()
                .required_message("You must agree to the terms and conditions")
                .accepted("You must agree to the terms and conditions"),
        )
        .refine(
            FieldPath::key("members"),
            "Team members must use a different email than the team leader",
            members_distinct_from_leader,
        )
}

fn members_distinct_from_leader(values: &FormValues) -> bool {
    let Some(leader) = values
        .get("teamLeader")
        .and_then(|leader| leader.get("email"))
        .and_then(Value::as_str)
        .map(str::to_lowercase)
    else {
        return true;
    };
    if leader.is_empty() {
        return true;
    }
    let Some(members) = values.get("members").and_then(Value::as_array) else {
        return true;
    };
    !members
        .iter()
        .filter_map(|member| member.get("email").and_then(Value::as_str))
        .any(|email| email.to_lowercase() == leader)
}
