//! Table workflow states
//!
//! A table moves through an externally defined, ordered list of states
//! (ready -> guest arrived -> ... -> cleaned). Movement is circular in both
//! directions; there are no guards or conditional transitions.

use crate::error::{AppError, ErrorCode};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Literal used by the POS side for "no state yet"
pub const NULL_STATE: &str = "null";

/// Workflow installed when no custom vocabulary is given
pub const DEFAULT_TABLE_STATES: &[&str] = &[
    "1:ready",
    "2:guest_arrived",
    "3:drinks_ordered",
    "4:drinks_served",
    "5:food_ordered",
    "6:food_served",
    "7:bill_requested",
    "8:paid",
    "9:uncleaned",
    "10:cleaned",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("No table states available")]
    Empty,

    #[error("Current state \"{0}\" not found")]
    Unknown(String),

    #[error("State name is empty or null")]
    Missing,
}

impl From<StateError> for AppError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::Empty => AppError::new(ErrorCode::StatesMissing),
            StateError::Unknown(state) => AppError::stale_state(state),
            StateError::Missing => AppError::validation(StateError::Missing.to_string()),
        }
    }
}

/// Direction of a state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Next => "next",
            Direction::Previous => "previous",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A workflow state, optionally ranked (`"3:drinks_ordered"`)
///
/// The parsed text is kept verbatim: a POS label such as `"01:ready"` is
/// written back exactly as read, and only equal text compares equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableState {
    pub rank: Option<u32>,
    pub name: String,
    label: String,
}

impl TableState {
    pub fn new(rank: Option<u32>, name: impl Into<String>) -> Self {
        let name = name.into();
        let label = match rank {
            Some(rank) => format!("{}:{}", rank, name),
            None => name.clone(),
        };
        Self { rank, name, label }
    }

    /// The state as stored on the POS
    pub fn as_str(&self) -> &str {
        &self.label
    }

    /// Parse a state string, treating `"null"` and blanks as "no state"
    pub fn parse_optional(s: &str) -> Option<TableState> {
        s.parse().ok()
    }

    /// Whether `other` names the same state: equal ranks (however written),
    /// or a rank missing on either side
    pub fn matches_name(&self, other: &TableState) -> bool {
        self.name == other.name && (self.rank == other.rank || self.rank.is_none() || other.rank.is_none())
    }
}

impl FromStr for TableState {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == NULL_STATE {
            return Err(StateError::Missing);
        }

        if let Some((prefix, name)) = s.split_once(':')
            && let Ok(rank) = prefix.trim().parse::<u32>()
            && !name.is_empty()
        {
            return Ok(Self {
                rank: Some(rank),
                name: name.to_string(),
                label: s.to_string(),
            });
        }

        Ok(Self::new(None, s))
    }
}

impl TryFrom<String> for TableState {
    type Error = StateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TableState> for String {
    fn from(state: TableState) -> Self {
        state.to_string()
    }
}

impl fmt::Display for TableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Deserialize an optional state, mapping the `"null"` literal to `None`
pub fn deserialize_optional_state<'de, D>(deserializer: D) -> Result<Option<TableState>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(TableState::parse_optional))
}

/// Ordered state vocabulary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateSequence {
    states: Vec<TableState>,
}

impl StateSequence {
    /// Build a sequence in the given order
    pub fn new(states: Vec<TableState>) -> Self {
        Self { states }
    }

    /// Build a sequence from raw names, ordered by rank prefix
    ///
    /// Unranked names keep their relative order after all ranked ones.
    /// Names that cannot be parsed are dropped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut states: Vec<TableState> = names
            .into_iter()
            .filter_map(|n| match n.as_ref().parse() {
                Ok(state) => Some(state),
                Err(_) => {
                    tracing::warn!(name = n.as_ref(), "Ignoring unusable state name");
                    None
                }
            })
            .collect();
        states.sort_by_key(|s| (s.rank.is_none(), s.rank.unwrap_or(0)));
        Self { states }
    }

    pub fn states(&self) -> &[TableState] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn first(&self) -> Option<&TableState> {
        self.states.first()
    }

    pub fn last(&self) -> Option<&TableState> {
        self.states.last()
    }

    /// Index of a state: exact match first, then by name
    pub fn position(&self, state: &TableState) -> Option<usize> {
        self.states
            .iter()
            .position(|s| s == state)
            .or_else(|| self.states.iter().position(|s| s.matches_name(state)))
    }

    pub fn contains(&self, state: &TableState) -> bool {
        self.position(state).is_some()
    }

    /// Compute the state after `current` in `direction`, wrapping at both ends
    ///
    /// With no current state, `Next` starts at the first state and
    /// `Previous` at the last one.
    pub fn advance(
        &self,
        current: Option<&TableState>,
        direction: Direction,
    ) -> Result<TableState, StateError> {
        let (first, last) = match (self.states.first(), self.states.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(StateError::Empty),
        };

        let Some(current) = current else {
            return Ok(match direction {
                Direction::Next => first.clone(),
                Direction::Previous => last.clone(),
            });
        };

        let index = self
            .position(current)
            .ok_or_else(|| StateError::Unknown(current.to_string()))?;
        let last_index = self.states.len() - 1;

        let next = match direction {
            Direction::Next if index == last_index => 0,
            Direction::Next => index + 1,
            Direction::Previous if index == 0 => last_index,
            Direction::Previous => index - 1,
        };

        Ok(self.states[next].clone())
    }

    /// String form of every state, in order
    pub fn names(&self) -> Vec<String> {
        self.states.iter().map(ToString::to_string).collect()
    }
}

impl FromIterator<TableState> for StateSequence {
    fn from_iter<T: IntoIterator<Item = TableState>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> StateSequence {
        StateSequence::from_names(["a", "b", "c"])
    }

    fn state(s: &str) -> TableState {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_ranked_and_plain() {
        assert_eq!(state("1:ready"), TableState::new(Some(1), "ready"));
        assert_eq!(state("guest_arrived"), TableState::new(None, "guest_arrived"));
        assert_eq!(state("x:y"), TableState::new(None, "x:y"));
        assert_eq!("null".parse::<TableState>(), Err(StateError::Missing));
        assert_eq!("  ".parse::<TableState>(), Err(StateError::Missing));
        assert_eq!(TableState::parse_optional("null"), None);
    }

    #[test]
    fn test_display_round_trip() {
        for s in ["10:cleaned", "ready", "2:guest_arrived"] {
            assert_eq!(state(s).to_string(), s);
        }
    }

    #[test]
    fn test_rank_text_kept_verbatim() {
        let padded = state("01:ready");
        assert_eq!(padded.rank, Some(1));
        assert_eq!(padded.name, "ready");
        assert_eq!(padded.to_string(), "01:ready");
        assert_ne!(padded, state("1:ready"));

        let json = serde_json::to_string(&padded).unwrap();
        assert_eq!(json, "\"01:ready\"");
        assert_eq!(TableState::new(Some(1), "ready").as_str(), "1:ready");

        let seq = StateSequence::from_names(["1:ready", "2:seated"]);
        assert_eq!(seq.position(&padded), Some(0));
        assert_eq!(seq.advance(Some(&padded), Direction::Next).unwrap(), state("2:seated"));
    }

    #[test]
    fn test_next_wraps_to_first() {
        let seq = abc();
        assert_eq!(seq.advance(Some(&state("c")), Direction::Next).unwrap(), state("a"));
        assert_eq!(seq.advance(Some(&state("a")), Direction::Next).unwrap(), state("b"));
    }

    #[test]
    fn test_previous_wraps_to_last() {
        let seq = abc();
        assert_eq!(seq.advance(Some(&state("a")), Direction::Previous).unwrap(), state("c"));
        assert_eq!(seq.advance(Some(&state("c")), Direction::Previous).unwrap(), state("b"));
    }

    #[test]
    fn test_no_current_state() {
        let seq = abc();
        assert_eq!(seq.advance(None, Direction::Next).unwrap(), state("a"));
        assert_eq!(seq.advance(None, Direction::Previous).unwrap(), state("c"));
    }

    #[test]
    fn test_empty_sequence_fails() {
        let seq = StateSequence::default();
        assert_eq!(seq.advance(None, Direction::Next), Err(StateError::Empty));
        assert_eq!(
            seq.advance(Some(&state("a")), Direction::Previous),
            Err(StateError::Empty)
        );
    }

    #[test]
    fn test_unknown_state_fails() {
        let seq = abc();
        assert_eq!(
            seq.advance(Some(&state("z")), Direction::Next),
            Err(StateError::Unknown("z".into()))
        );
    }

    #[test]
    fn test_single_state_cycles_onto_itself() {
        let seq = StateSequence::from_names(["1:only"]);
        let only = state("1:only");
        assert_eq!(seq.advance(Some(&only), Direction::Next).unwrap(), only);
        assert_eq!(seq.advance(Some(&only), Direction::Previous).unwrap(), only);
    }

    #[test]
    fn test_from_names_sorts_by_rank() {
        let seq = StateSequence::from_names(["10:cleaned", "2:guest_arrived", "1:ready", "null"]);
        assert_eq!(seq.names(), vec!["1:ready", "2:guest_arrived", "10:cleaned"]);
    }

    #[test]
    fn test_unranked_names_sort_last_in_input_order() {
        let seq = StateSequence::from_names(["zeta", "2:b", "alpha", "1:a"]);
        assert_eq!(seq.names(), vec!["1:a", "2:b", "zeta", "alpha"]);
    }

    #[test]
    fn test_position_matches_by_name_suffix() {
        let seq = StateSequence::from_names(DEFAULT_TABLE_STATES.iter().copied());
        assert_eq!(seq.position(&state("drinks_served")), Some(3));
        assert_eq!(seq.position(&state("4:drinks_served")), Some(3));
        // a ranked state with the wrong rank is foreign
        assert_eq!(seq.position(&state("5:drinks_served")), None);
    }

    #[test]
    fn test_default_workflow_round() {
        let seq = StateSequence::from_names(DEFAULT_TABLE_STATES.iter().copied());
        let mut current: Option<TableState> = None;
        for expected in DEFAULT_TABLE_STATES {
            let next = seq.advance(current.as_ref(), Direction::Next).unwrap();
            assert_eq!(next.to_string(), *expected);
            current = Some(next);
        }
        let wrapped = seq.advance(current.as_ref(), Direction::Next).unwrap();
        assert_eq!(wrapped.to_string(), "1:ready");
    }

    #[test]
    fn test_state_error_into_app_error() {
        let err: AppError = StateError::Unknown("9:x".into()).into();
        assert_eq!(err.code, ErrorCode::StateStale);
        let err: AppError = StateError::Empty.into();
        assert_eq!(err.code, ErrorCode::StatesMissing);
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&state("3:drinks_ordered")).unwrap();
        assert_eq!(json, "\"3:drinks_ordered\"");
        let back: TableState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state("3:drinks_ordered"));
        assert!(serde_json::from_str::<TableState>("\"null\"").is_err());
    }
}
