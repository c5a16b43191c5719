//! Skill observations and identities
//!
//! A [`SkillObservation`] is one `(skill id, level, total xp)` sample taken
//! from the game each tick. The engine keys all per-skill state by
//! [`SkillKey`], which is the skill's display name when the host knows it and
//! the numeric id otherwise.

use crate::error::FeedError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

/// One skill sample from the game feed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillObservation {
    /// Numeric skill id
    #[serde(rename = "_skill")]
    pub skill_id: i64,
    /// Current level
    #[serde(rename = "_level")]
    pub level: i32,
    /// Total experience
    #[serde(rename = "_xp")]
    pub total_xp: f64,
}

impl SkillObservation {
    pub fn new(skill_id: i64, level: i32, total_xp: f64) -> Self {
        Self {
            skill_id,
            level,
            total_xp,
        }
    }
}

impl TryFrom<&Value> for SkillObservation {
    type Error = FeedError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let obj = value.as_object().ok_or(FeedError::NotAnObject)?;

        let number = |field: &'static str| -> Result<f64, FeedError> {
            let raw = obj.get(field).ok_or(FeedError::MissingField { field })?;
            match raw.as_f64() {
                Some(n) if n.is_finite() => Ok(n),
                _ => Err(FeedError::WrongType { field }),
            }
        };

        // `3` and `3.0` are the same id; `3.5` is not an id at all
        let integer = |field: &'static str| -> Result<i64, FeedError> {
            let raw = obj.get(field).ok_or(FeedError::MissingField { field })?;
            if let Some(n) = raw.as_i64() {
                return Ok(n);
            }
            match raw.as_f64() {
                Some(n) if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 => {
                    Ok(n as i64)
                }
                _ => Err(FeedError::WrongType { field }),
            }
        };

        let level = i32::try_from(integer("_level")?)
            .map_err(|_| FeedError::WrongType { field: "_level" })?;

        Ok(Self {
            skill_id: integer("_skill")?,
            level,
            total_xp: number("_xp")?,
        })
    }
}

/// Stable per-skill identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillKey(String);

impl SkillKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Fallback identity for a skill the host has no name for
    pub fn from_id(skill_id: i64) -> Self {
        Self(skill_id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SkillKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SkillKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SkillKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SkillKey {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Numeric skill id → display name lookup supplied by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillNames {
    names: HashMap<i64, String>,
}

impl SkillNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from explicit `(id, name)` pairs
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        Self {
            names: pairs.into_iter().map(|(id, name)| (id, name.into())).collect(),
        }
    }

    /// Build from the game's lookup value
    ///
    /// Accepts either an array indexed by skill id or an object keyed by the
    /// id's decimal string. Non-string names and unparsable keys are skipped.
    pub fn from_lookup(lookup: &Value) -> Self {
        let names = match lookup {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .filter_map(|(idx, v)| v.as_str().map(|name| (idx as i64, name.to_string())))
                .collect(),
            Value::Object(map) => map
                .iter()
                .filter_map(|(k, v)| {
                    let id = k.parse::<i64>().ok()?;
                    let name = v.as_str()?;
                    Some((id, name.to_string()))
                })
                .collect(),
            _ => HashMap::new(),
        };
        Self { names }
    }

    /// Register or replace one name
    pub fn insert(&mut self, skill_id: i64, name: impl Into<String>) {
        self.names.insert(skill_id, name.into());
    }

    /// Resolve the key for a skill id, falling back to the id itself
    pub fn key_for(&self, skill_id: i64) -> SkillKey {
        match self.names.get(&skill_id) {
            Some(name) if !name.is_empty() => SkillKey::new(name.clone()),
            _ => SkillKey::from_id(skill_id),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
