//! Whose timetable is requested.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EdtError;

/// The portal's classification of a timetable owner.
///
/// Which one applies to a given id is not knowable in advance, so the
/// fetcher tries them in turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Student,
    Group,
    Class,
    Program,
}

impl EntityType {
    pub const ALL: [EntityType; 4] = [
        EntityType::Student,
        EntityType::Group,
        EntityType::Class,
        EntityType::Program,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EntityType::Student => "student",
            EntityType::Group => "group",
            EntityType::Class => "class",
            EntityType::Program => "program",
        }
    }

    /// CELCAT federation resource code, when the portal has one for this type.
    pub fn federation_code(&self) -> Option<u16> {
        match self {
            EntityType::Student => Some(104),
            EntityType::Group => Some(103),
            EntityType::Class | EntityType::Program => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntityType {
    type Err = EdtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                EdtError::Config(format!(
                    "Unknown entity type '{}'. Expected one of: student, group, class, program",
                    s
                ))
            })
    }
}

/// A typed identity on the portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub kind: EntityType,
    pub id: String,
}

impl Entity {
    pub fn new(kind: EntityType, id: impl Into<String>) -> Self {
        Entity { kind, id: id.into() }
    }
}
