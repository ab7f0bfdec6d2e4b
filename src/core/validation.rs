//! Input and completeness validation
//!
//! Provides:
//! - Player tag format check
//! - Per-discipline and whole-registration completeness checks

use lazy_regex::regex_is_match;
use thiserror::Error;

use crate::registration::model::{Discipline, GameData, Participant};

/// Validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Tag does not match `#` followed by word characters
    #[error("Invalid player tag: {0:?}")]
    InvalidTag(String),

    /// No discipline was registered at all
    #[error("No discipline selected")]
    NoDisciplines,

    /// Some disciplines still miss a nickname or tag
    #[error("Incomplete disciplines: {0:?}")]
    Incomplete(Vec<Discipline>),
}

/// Validates a player tag.
///
/// A tag is a literal `#` followed by one or more ASCII letters, digits or
/// underscores. Case-sensitive, no length bound.
///
/// # Examples
/// ```
/// use etriathlon::core::validation::validate_tag;
///
/// assert!(validate_tag("#ABC123").is_ok());
/// assert!(validate_tag("#a_1").is_ok());
///
/// assert!(validate_tag("ABC123").is_err());
/// assert!(validate_tag("#").is_err());
/// assert!(validate_tag("# ABC").is_err());
/// ```
pub fn validate_tag(tag: &str) -> Result<(), ValidationError> {
    if regex_is_match!(r"^#[A-Za-z0-9_]+$", tag) {
        Ok(())
    } else {
        Err(ValidationError::InvalidTag(tag.to_string()))
    }
}

/// An entry is complete when it has a nickname and, unless the discipline is
/// tag-exempt, a tag.
pub fn is_entry_complete(discipline: Discipline, data: &GameData) -> bool {
    if data.nickname.is_empty() {
        return false;
    }
    !discipline.requires_tag() || data.tag().is_some()
}

/// Completeness of one discipline in a working record
pub fn is_discipline_complete(participant: &Participant, discipline: Discipline) -> bool {
    participant
        .entry(discipline)
        .is_some_and(|data| is_entry_complete(discipline, data))
}

/// Disciplines of the fixed required set that are not complete yet
pub fn missing_disciplines(participant: &Participant) -> Vec<Discipline> {
    Discipline::all()
        .filter(|d| !is_discipline_complete(participant, *d))
        .collect()
}

/// Every discipline of the fixed set is complete
pub fn all_disciplines_complete(participant: &Participant) -> bool {
    missing_disciplines(participant).is_empty()
}

/// Checks that a working record may be sent to confirmation.
///
/// In all-disciplines mode every discipline must be complete. Otherwise at
/// least one discipline must be entered and every entered one complete.
pub fn check_ready_for_confirmation(participant: &Participant, all_disciplines: bool) -> Result<(), ValidationError> {
    if all_disciplines {
        let missing = missing_disciplines(participant);
        return if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Incomplete(missing))
        };
    }

    if participant.disciplines.is_empty() {
        return Err(ValidationError::NoDisciplines);
    }

    let incomplete: Vec<Discipline> = participant
        .disciplines
        .iter()
        .filter(|(discipline, data)| !is_entry_complete(**discipline, data))
        .map(|(discipline, _)| *discipline)
        .collect();

    if incomplete.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Incomplete(incomplete))
    }
}
