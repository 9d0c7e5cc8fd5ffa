//! Error types for catalog loading, session setup, and purchases.
use thiserror::Error;

use crate::catalog::ComponentKind;

/// Broken data contract between the engine and its catalog source.
///
/// These never surface during a pull; they are raised when catalog data is
/// parsed, validated, or queried with a key outside its range.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown component kind '{0}'")]
    UnknownComponent(String),
    #[error("unknown weather condition '{0}'")]
    UnknownWeather(String),
    #[error("no {kind} tier at level {level}")]
    TierNotFound { kind: ComponentKind, level: u8 },
    #[error("tier list is empty")]
    EmptyLadder,
    #[error("{kind} tiers must be contiguous from level 1 (expected level {expected}, found {found})")]
    LevelGap {
        kind: ComponentKind,
        expected: u8,
        found: u8,
    },
    #[error("{kind} tier '{name}' is missing {attribute}")]
    MissingAttribute {
        kind: ComponentKind,
        name: String,
        attribute: &'static str,
    },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("location catalog is empty")]
    NoLocations,
    #[error("catalog JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised when session configuration invariants are violated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionConfigError {
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: i64,
        value: i64,
    },
    #[error("player team name must not be empty")]
    EmptyTeamName,
}

/// Expected, user-facing rejections from the upgrade shop and truck dealer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("{kind} is already at max level")]
    AlreadyMaxed { kind: ComponentKind },
    #[error("invalid upgrade level {requested} for {kind} (next level is {expected})")]
    InvalidLevel {
        kind: ComponentKind,
        requested: u8,
        expected: u8,
    },
    #[error("insufficient funds: need ${cost}, have ${cash}")]
    InsufficientFunds { cost: i64, cash: i64 },
    #[error("garage is full ({limit} trucks)")]
    GarageFull { limit: usize },
}

/// Failures while building a session through [`crate::GameEngine`].
#[derive(Debug, Error)]
pub enum EngineError<E>
where
    E: std::error::Error + 'static,
{
    #[error("catalog could not be loaded: {0}")]
    Catalog(#[source] E),
    #[error(transparent)]
    Config(#[from] SessionConfigError),
}
