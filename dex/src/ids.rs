use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Normalized identifier for species, moves, abilities, items, and
/// conditions: lowercase ASCII alphanumerics only, so "Stealth Rock",
/// "stealth-rock", and "stealthrock" all name the same thing.
///
/// The embedded data documents are authored pre-normalized; `Id::new`
/// normalizes anything user-supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn new(raw: &str) -> Id {
        Id(to_id(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(raw: &str) -> Id {
        Id::new(raw)
    }
}

/// Lets `HashMap<Id, _>` be queried with plain string keys.
impl Borrow<str> for Id {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Normalization applied by `Id::new`.
pub fn to_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
