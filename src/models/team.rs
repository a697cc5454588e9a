//! Team data structure and the persisted logo-key encoding.

use serde::{Deserialize, Serialize};

/// Opaque key referencing binary image data in the blob store.
pub type BlobKey = String;

/// A team slot in a tournament.
///
/// Teams have no id of their own: index `i` in `Tournament::teams`
/// corresponds to index `i` in every match's `results`, and `slot` is the
/// stable identity proxy (1-based, never changes after creation).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    /// Blob key for the team logo; persisted as `""` when absent.
    #[serde(with = "empty_string_option", default)]
    pub logo: Option<BlobKey>,
    /// 1-based creation position. Tie-break key of last resort.
    pub slot: u32,
}

impl Team {
    /// Create a team at the given 1-based slot. A blank name falls back to
    /// `Team {slot}`.
    pub fn new(name: impl Into<String>, logo: Option<BlobKey>, slot: u32) -> Self {
        let name = name.into();
        let name = name.trim().to_string();
        let name = if name.is_empty() {
            format!("Team {slot}")
        } else {
            name
        };
        Self { name, logo, slot }
    }
}

/// Serde helper: `Option<String>` stored as a plain string, `""` meaning
/// absent (the legacy document shape).
mod empty_string_option {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(v.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let s = Option::<String>::deserialize(d)?.unwrap_or_default();
        Ok(if s.is_empty() { None } else { Some(s) })
    }
}
