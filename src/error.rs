use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::BetKind;

/// Errors raised while loading or interpreting engine inputs.
#[derive(Debug, Error)]
pub enum XosoError {
    #[error("unknown region: {0}")]
    InvalidRegion(String),
    #[error("unknown prize tier: {0}")]
    InvalidTier(String),
    #[error("unknown bet type: {0}")]
    InvalidBetKind(String),
    #[error("unknown settlement option: {0}")]
    InvalidOption(String),
    #[error("invalid point value: {0}")]
    InvalidPoint(String),
    #[error("rate {key} must be positive, got {value}")]
    InvalidRate { key: String, value: f64 },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, XosoError>;

/// What went wrong with one statement of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseErrorKind {
    /// Bet type with no point after it.
    SyntaxIncomplete,
    /// Wrong amount of numbers, or wrong digit length, for the bet type.
    CardinalityViolation,
    /// Bet type not offered in the region.
    RegionViolation,
    /// Not enough stations to auto-assign.
    ResourceShortage,
}

/// A non-fatal problem found while compiling a message. The statement it
/// refers to is dropped; the rest of the message keeps parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub bet_type: Option<BetKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numbers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provinces: Option<Vec<String>>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            bet_type: None,
            numbers: None,
            provinces: None,
        }
    }

    pub fn with_bet_type(mut self, bet_type: BetKind) -> Self {
        self.bet_type = Some(bet_type);
        self
    }

    pub fn with_numbers(mut self, numbers: &[String]) -> Self {
        self.numbers = Some(numbers.to_vec());
        self
    }

    pub fn with_provinces(mut self, provinces: &[String]) -> Self {
        self.provinces = Some(provinces.to_vec());
        self
    }
}
