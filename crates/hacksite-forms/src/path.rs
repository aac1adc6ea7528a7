//! Structured field paths.
//!
//! A [`FieldPath`] addresses a (possibly nested) value inside a form's
//! values: `teamLeader.name` is `[Key("teamLeader"), Key("name")]` and the
//! second member's email is `[Key("members"), Index(1), Key("email")]`.
//! Paths are never built by string concatenation, so a key that itself
//! contains a dot stays a single segment.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::state::FormValues;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    /// An object key.
    Key(String),
    /// An array index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// The address of a field within the form values.
///
/// # Examples
///
/// ```
/// use hacksite_forms::path::FieldPath;
///
/// let path = FieldPath::key("members").index(0).child("email");
/// assert_eq!(path.to_string(), "members.0.email");
/// assert_eq!(FieldPath::parse("members.0.email"), path);
///
/// // Converting from a plain string never splits on dots.
/// assert_eq!(FieldPath::from("a.b").len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The empty path, addressing the whole form.
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// A single-key path.
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Key(key.into())],
        }
    }

    /// Parses a dot-separated path.
    ///
    /// Canonical decimal segments (`0`, `12`, never `012`) become indices so
    /// that a parsed path displays back to the same string.
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::root();
        }
        let segments = dotted
            .split('.')
            .map(|part| match part.parse::<usize>() {
                Ok(index) if is_canonical_index(part) => PathSegment::Index(index),
                _ => PathSegment::Key(part.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// Returns this path extended with an object key.
    #[must_use]
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.into()));
        Self { segments }
    }

    /// Returns this path extended with an array index.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// Returns `other` appended to this path.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The top-level field this path belongs to.
    pub fn top_level(&self) -> Option<Self> {
        self.segments.first().map(|first| Self {
            segments: vec![first.clone()],
        })
    }

    /// Returns `true` if `self` equals `prefix` or lies underneath it.
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Iterates over `self` and every ancestor, longest first, excluding the root.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> + '_ {
        (1..=self.segments.len()).rev().map(move |len| Self {
            segments: self.segments[..len].to_vec(),
        })
    }

    /// Looks the path up in a set of form values.
    pub fn get<'a>(&self, values: &'a FormValues) -> Option<&'a Value> {
        let (first, rest) = self.segments.split_first()?;
        let mut current = values.get(&segment_key(first))?;
        for segment in rest {
            current = match (segment, current) {
                (PathSegment::Key(key), Value::Object(map)) => map.get(key)?,
                (PathSegment::Index(index), Value::Array(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Writes `value` at this path, creating intermediate objects and arrays.
    ///
    /// Intermediate values of the wrong shape are replaced. An index may
    /// address an existing element or append one right after the last; a
    /// path with an index past that is not written and `values` is left
    /// untouched. Writing at the root replaces all values when `value` is an
    /// object. Returns `true` if the value was written.
    pub fn set(&self, values: &mut FormValues, value: Value) -> bool {
        let Some((first, rest)) = self.segments.split_first() else {
            return match value {
                Value::Object(map) => {
                    *values = map;
                    true
                }
                _ => false,
            };
        };
        let key = segment_key(first);
        if !reachable(values.get(&key), rest) {
            return false;
        }
        set_in(values.entry(key).or_insert(Value::Null), rest, value);
        true
    }
}

fn is_canonical_index(part: &str) -> bool {
    !part.is_empty()
        && part.bytes().all(|b| b.is_ascii_digit())
        && (part == "0" || !part.starts_with('0'))
}

fn segment_key(segment: &PathSegment) -> String {
    match segment {
        PathSegment::Key(key) => key.clone(),
        PathSegment::Index(index) => index.to_string(),
    }
}

/// Returns `true` if every index along `segments` is at most one past the end.
fn reachable(mut current: Option<&Value>, segments: &[PathSegment]) -> bool {
    for segment in segments {
        current = match (segment, current) {
            (PathSegment::Index(index), Some(Value::Array(items))) => {
                if *index > items.len() {
                    return false;
                }
                items.get(*index)
            }
            (PathSegment::Index(index), _) => {
                if *index > 0 {
                    return false;
                }
                None
            }
            (PathSegment::Key(key), Some(Value::Object(map))) => map.get(key),
            (PathSegment::Key(_), _) => None,
        };
    }
    true
}

fn set_in(target: &mut Value, segments: &[PathSegment], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *target = value;
        return;
    };
    match first {
        PathSegment::Key(key) => {
            if !target.is_object() {
                *target = Value::Object(serde_json::Map::new());
            }
            if let Value::Object(map) = target {
                set_in(map.entry(key.clone()).or_insert(Value::Null), rest, value);
            }
        }
        PathSegment::Index(index) => {
            if !target.is_array() {
                *target = Value::Array(Vec::new());
            }
            if let Value::Array(items) = target {
                if *index == items.len() {
                    items.push(Value::Null);
                }
                if let Some(slot) = items.get_mut(*index) {
                    set_in(slot, rest, value);
                }
            }
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl From<&str> for FieldPath {
    fn from(key: &str) -> Self {
        Self::key(key)
    }
}

impl From<String> for FieldPath {
    fn from(key: String) -> Self {
        Self::key(key)
    }
}

impl From<&Self> for FieldPath {
    fn from(path: &Self) -> Self {
        path.clone()
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let dotted = String::deserialize(deserializer)?;
        Ok(Self::parse(&dotted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(v: Value) -> FormValues {
        match v {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_parse_and_display() {
        let path = FieldPath::parse("teamLeader.name");
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("teamLeader".into()),
                PathSegment::Key("name".into())
            ]
        );
        assert_eq!(path.to_string(), "teamLeader.name");
        assert_eq!(FieldPath::parse("members.2").segments()[1], PathSegment::Index(2));
    }

    #[test]
    fn test_parse_empty_is_root() {
        assert!(FieldPath::parse("").is_root());
        assert_eq!(FieldPath::root().to_string(), "");
    }

    #[test]
    fn test_from_str_does_not_split() {
        let path = FieldPath::from("file.name");
        assert_eq!(path.len(), 1);
        assert_ne!(path, FieldPath::parse("file.name"));
    }

    #[test]
    fn test_starts_with_and_top_level() {
        let path = FieldPath::parse("members.0.email");
        assert!(path.starts_with(&FieldPath::key("members")));
        assert!(path.starts_with(&path));
        assert!(!path.starts_with(&FieldPath::key("member")));
        assert_eq!(path.top_level(), Some(FieldPath::key("members")));
        assert_eq!(FieldPath::root().top_level(), None);
    }

    #[test]
    fn test_join() {
        let joined = FieldPath::key("members").index(0).join(&FieldPath::key("email"));
        assert_eq!(joined, FieldPath::parse("members.0.email"));
        assert_eq!(FieldPath::root().join(&joined), joined);
    }

    #[test]
    fn test_ancestors() {
        let path = FieldPath::parse("a.b.c");
        let all: Vec<String> = path.ancestors().map(|p| p.to_string()).collect();
        assert_eq!(all, vec!["a.b.c", "a.b", "a"]);
    }

    #[test]
    fn test_get_nested() {
        let v = values(json!({
            "teamLeader": { "name": "Ada" },
            "members": [{ "email": "a@b.co" }]
        }));
        assert_eq!(
            FieldPath::parse("teamLeader.name").get(&v),
            Some(&json!("Ada"))
        );
        assert_eq!(
            FieldPath::parse("members.0.email").get(&v),
            Some(&json!("a@b.co"))
        );
        assert_eq!(FieldPath::parse("members.1.email").get(&v), None);
        assert_eq!(FieldPath::parse("teamLeader.name.first").get(&v), None);
        assert_eq!(FieldPath::root().get(&v), None);
    }

    #[test]
    fn test_parse_keeps_non_canonical_digits_as_keys() {
        let path = FieldPath::parse("codes.01.007.0");
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("codes".into()),
                PathSegment::Key("01".into()),
                PathSegment::Key("007".into()),
                PathSegment::Index(0)
            ]
        );
        assert_eq!(path.to_string(), "codes.01.007.0");
        let encoded = serde_json::to_string(&path).unwrap();
        assert_eq!(serde_json::from_str::<FieldPath>(&encoded).unwrap(), path);
    }

    #[test]
    fn test_parse_oversized_number_is_a_key() {
        let path = FieldPath::parse("members.99999999999999999999999");
        assert!(matches!(path.segments()[1], PathSegment::Key(_)));
    }

    #[test]
    fn test_set_creates_intermediates() {
        let mut v = FormValues::new();
        assert!(FieldPath::parse("members.0.name").set(&mut v, json!("Grace")));
        assert!(FieldPath::parse("members.1.name").set(&mut v, json!("Ada")));
        assert_eq!(
            Value::Object(v),
            json!({ "members": [{ "name": "Grace" }, { "name": "Ada" }] })
        );
    }

    #[test]
    fn test_set_rejects_index_past_end() {
        let mut v = values(json!({ "members": [{ "name": "Grace" }] }));
        let before = v.clone();
        assert!(!FieldPath::parse("members.2.name").set(&mut v, json!("x")));
        assert!(!FieldPath::parse("members.18446744073709551615.email").set(&mut v, json!("x")));
        assert!(!FieldPath::parse("members.10000000000.email").set(&mut v, json!("x")));
        assert_eq!(v, before);

        let mut empty = FormValues::new();
        assert!(!FieldPath::parse("teams.3.name").set(&mut empty, json!("x")));
        assert!(empty.is_empty());
    }

    #[test]
    fn test_set_replaces_wrong_shape() {
        let mut v = values(json!({ "teamLeader": "nobody" }));
        FieldPath::parse("teamLeader.email").set(&mut v, json!("x@y.io"));
        assert_eq!(v["teamLeader"], json!({ "email": "x@y.io" }));
    }

    #[test]
    fn test_set_top_level_overwrites() {
        let mut v = values(json!({ "name": "J" }));
        FieldPath::key("name").set(&mut v, json!("John"));
        assert_eq!(v["name"], json!("John"));
    }

    #[test]
    fn test_set_root() {
        let mut v = values(json!({ "name": "J" }));
        assert!(!FieldPath::root().set(&mut v, json!(42)));
        assert_eq!(v["name"], json!("J"));
        assert!(FieldPath::root().set(&mut v, json!({ "email": "a@b.co" })));
        assert_eq!(Value::Object(v), json!({ "email": "a@b.co" }));
    }

    #[test]
    fn test_serde_as_string() {
        let path = FieldPath::parse("members.0.email");
        let encoded = serde_json::to_string(&path).unwrap();
        assert_eq!(encoded, "\"members.0.email\"");
        let decoded: FieldPath = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, path);
    }
}
