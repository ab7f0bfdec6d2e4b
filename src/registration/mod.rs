//! Registration dialogue: record model, per-user sessions, and the state machine

pub mod engine;
pub mod event;
pub mod model;
pub mod reply;
pub mod session;
pub mod texts;

pub use engine::RegistrationEngine;
pub use event::{Action, Event, ParseActionError};
pub use model::{Discipline, GameData, Participant};
pub use reply::{Button, Keyboard, Reply};
pub use session::{Session, SessionStore, State};
