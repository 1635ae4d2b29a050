//! Parsing of interactive input: amounts, weights and session commands.

use thiserror::Error;

/// Default keyword that rewinds the session by one leaf.
pub const DEFAULT_GO_BACK_KEYWORD: &str = "back";

/// Words accepted at the review step to end the session.
const FINISH_KEYWORDS: [&str; 3] = ["done", "finish", "f"];

/// Rejected user input; the same prompt is repeated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("amount must not be negative: {0}")]
    Negative(String),

    #[error("an amount is required")]
    Empty,

    #[error("type '{keyword}' to go back or press Enter to finish, got '{input}'")]
    UnknownCommand { keyword: String, input: String },
}

/// Value entered for a leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LeafInput {
    Amount(f64),
    GoBack,
}

/// Answer at the review step after the last leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewInput {
    GoBack,
    Finish,
}

fn parse_non_negative(raw: &str) -> Result<f64, InputError> {
    let value: f64 = raw
        .parse()
        .map_err(|_| InputError::NotANumber(raw.to_string()))?;
    if !value.is_finite() {
        return Err(InputError::NotANumber(raw.to_string()));
    }
    if value < 0.0 {
        return Err(InputError::Negative(raw.to_string()));
    }
    Ok(value)
}

fn is_keyword(raw: &str, keyword: &str) -> bool {
    raw.eq_ignore_ascii_case(keyword.trim())
}

/// Parse the total amount of a session. Empty input is rejected.
pub fn parse_amount(raw: &str) -> Result<f64, InputError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(InputError::Empty);
    }
    parse_non_negative(raw)
}

/// Parse a solicited weight; empty input keeps `default`.
pub fn parse_weight(raw: &str, default: f64) -> Result<f64, InputError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(default);
    }
    parse_non_negative(raw)
}

/// Parse the value for a leaf: a number, the go-back keyword, or empty (= 0).
pub fn parse_leaf_input(raw: &str, go_back_keyword: &str) -> Result<LeafInput, InputError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(LeafInput::Amount(0.0));
    }
    if is_keyword(raw, go_back_keyword) {
        return Ok(LeafInput::GoBack);
    }
    parse_non_negative(raw).map(LeafInput::Amount)
}

/// Parse the answer at the review step: empty or a finish word ends the session.
pub fn parse_review_input(raw: &str, go_back_keyword: &str) -> Result<ReviewInput, InputError> {
    let raw = raw.trim();
    if raw.is_empty() || FINISH_KEYWORDS.iter().any(|k| is_keyword(raw, k)) {
        return Ok(ReviewInput::Finish);
    }
    if is_keyword(raw, go_back_keyword) {
        return Ok(ReviewInput::GoBack);
    }
    Err(InputError::UnknownCommand {
        keyword: go_back_keyword.to_string(),
        input: raw.to_string(),
    })
}
