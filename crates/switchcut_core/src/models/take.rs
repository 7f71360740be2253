//! Take identifier newtype.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Upload field prefix for take media (`video_1`, `video_2`, ...).
pub const VIDEO_FIELD_PREFIX: &str = "video_";

/// Identifies a recorded take.
///
/// Callers send take identifiers as JSON strings or numbers. Both forms
/// are canonicalized to text so `2`, `2.0` and `"2"` name the same take.
/// Serializes back as a string.
///
/// # Examples
///
/// ```
/// use switchcut_core::models::TakeId;
///
/// let take = TakeId::new("2");
/// assert_eq!(take.field_name(), "video_2");
/// assert_eq!(TakeId::from_field_name("video_2"), Some(take));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TakeId(String);

impl TakeId {
    /// Create a take id from its textual form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a take id from a numeric index.
    pub fn from_index(index: u64) -> Self {
        Self(index.to_string())
    }

    /// Get the textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upload field name carrying this take's media.
    pub fn field_name(&self) -> String {
        format!("{}{}", VIDEO_FIELD_PREFIX, self.0)
    }

    /// Parse from an upload field name like "video_3".
    ///
    /// Returns None for any other field.
    pub fn from_field_name(field: &str) -> Option<Self> {
        field
            .strip_prefix(VIDEO_FIELD_PREFIX)
            .filter(|id| !id.is_empty())
            .map(Self::new)
    }
}

impl fmt::Display for TakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TakeId {
    fn from(index: u64) -> Self {
        Self::from_index(index)
    }
}

impl From<&str> for TakeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl Serialize for TakeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TakeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TakeIdVisitor)
    }
}

struct TakeIdVisitor;

impl<'de> Visitor<'de> for TakeIdVisitor {
    type Value = TakeId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a take identifier (string or number)")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<TakeId, E> {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            return Err(E::custom("take identifier must not be empty"));
        }
        Ok(TakeId::new(trimmed))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<TakeId, E> {
        Ok(TakeId::from_index(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<TakeId, E> {
        Ok(TakeId::new(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<TakeId, E> {
        if !v.is_finite() {
            return Err(E::custom("take identifier must be finite"));
        }
        if v.fract() == 0.0 && v.abs() < 1e15 {
            Ok(TakeId::new(format!("{}", v as i64)))
        } else {
            Ok(TakeId::new(v.to_string()))
        }
    }
}
