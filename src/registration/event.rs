//! Inbound events and the typed button payload set
//!
//! Callback payloads are opaque strings on the wire. They are parsed exactly
//! once, at the Telegram boundary, into [`Action`]; everything past that point
//! matches on the enum.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::model::Discipline;

/// Button payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// `disc_<code>`: show the rules of one discipline
    SelectDiscipline(Discipline),
    /// `ok_<code>`: rules acknowledged
    AcknowledgeRules(Discipline),
    /// `disc_all`: enter all-disciplines (triathlon) mode
    SelectAll,
    /// `tri_<code>`: edit one discipline from the triathlon keyboard
    TriathlonPick(Discipline),
    /// `tri_check`
    TriathlonCheck,
    /// `tri_done`
    TriathlonDone,
    /// `more_yes`
    MoreYes,
    /// `more_no`
    MoreNo,
    /// `confirm`
    Confirm,
    /// `cancel_reg`
    CancelRegistration,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown callback payload: {0:?}")]
pub struct ParseActionError(pub String);

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(payload: &str) -> Result<Self, Self::Err> {
        let unknown = || ParseActionError(payload.to_string());
        let discipline = |code: &str| Discipline::from_code(code).ok_or_else(unknown);

        let action = match payload {
            "disc_all" => Action::SelectAll,
            "tri_check" => Action::TriathlonCheck,
            "tri_done" => Action::TriathlonDone,
            "more_yes" => Action::MoreYes,
            "more_no" => Action::MoreNo,
            "confirm" => Action::Confirm,
            "cancel_reg" => Action::CancelRegistration,
            _ => {
                if let Some(code) = payload.strip_prefix("disc_") {
                    Action::SelectDiscipline(discipline(code)?)
                } else if let Some(code) = payload.strip_prefix("ok_") {
                    Action::AcknowledgeRules(discipline(code)?)
                } else if let Some(code) = payload.strip_prefix("tri_") {
                    Action::TriathlonPick(discipline(code)?)
                } else {
                    return Err(unknown());
                }
            }
        };

        Ok(action)
    }
}

impl fmt::Display for Action {
    /// Renders the wire payload, the inverse of `FromStr`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::SelectDiscipline(d) => write!(f, "disc_{}", d.code()),
            Action::AcknowledgeRules(d) => write!(f, "ok_{}", d.code()),
            Action::SelectAll => f.write_str("disc_all"),
            Action::TriathlonPick(d) => write!(f, "tri_{}", d.code()),
            Action::TriathlonCheck => f.write_str("tri_check"),
            Action::TriathlonDone => f.write_str("tri_done"),
            Action::MoreYes => f.write_str("more_yes"),
            Action::MoreNo => f.write_str("more_no"),
            Action::Confirm => f.write_str("confirm"),
            Action::CancelRegistration => f.write_str("cancel_reg"),
        }
    }
}

/// Anything the engine can be fed for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `/start`
    Start,
    /// `/cancel`
    Cancel,
    /// `/help`
    Help,
    /// Free text message
    Text(String),
    /// Button click
    Action(Action),
}

impl From<Action> for Event {
    fn from(action: Action) -> Self {
        Event::Action(action)
    }
}
