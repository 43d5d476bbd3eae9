//! Errors for rejected generator inputs.

use thiserror::Error;

/// Reasons a generator refuses its input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    LevelOutOfRange {
        field: &'static str,
        value: i64,
        min: u32,
        max: u32,
    },

    #[error("count must be between 1 and {max}, got {value}")]
    CountOutOfRange { value: i64, max: u32 },

    #[error("invalid rarity: {0}. Must be one of: common, uncommon, rare, epic, legendary")]
    UnknownRarity(String),

    #[error("invalid item type: {0}. Must be one of: weapon, armor, potion, scroll")]
    UnknownItemKind(String),

    #[error("invalid enemy type: {0}. Must be one of: zombie, skeleton, orc, demon")]
    UnknownEnemyKind(String),

    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    #[error("invalid dungeon: {0}")]
    InvalidDungeon(String),
}

impl GenError {
    /// Short machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LevelOutOfRange { .. } => "LevelOutOfRange",
            Self::CountOutOfRange { .. } => "CountOutOfRange",
            Self::UnknownRarity(_) => "UnknownRarity",
            Self::UnknownItemKind(_) => "UnknownItemKind",
            Self::UnknownEnemyKind(_) => "UnknownEnemyKind",
            Self::InvalidTuning(_) => "InvalidTuning",
            Self::InvalidDungeon(_) => "InvalidDungeon",
        }
    }
}

pub type Result<T> = std::result::Result<T, GenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = GenError::LevelOutOfRange {
            field: "level",
            value: 0,
            min: 1,
            max: 100,
        };
        assert_eq!(e.to_string(), "level must be between 1 and 100, got 0");
        assert_eq!(e.kind(), "LevelOutOfRange");

        let e = GenError::UnknownRarity("mythic".into());
        assert!(e.to_string().starts_with("invalid rarity: mythic"));
    }
}
