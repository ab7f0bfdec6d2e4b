//! Registration state machine
//!
//! The engine is synchronous and transport-agnostic: it takes one [`Event`]
//! for one user, works on a copy of that user's session, and either commits
//! the copy, leaves the stored session untouched, or removes it. Replies are
//! returned to the caller, which owns the delivery channel.

use std::sync::Arc;

use super::event::{Action, Event};
use super::model::Discipline;
use super::reply::Reply;
use super::session::{Session, SessionStore, State};
use super::texts;
use crate::core::validation::{check_ready_for_confirmation, validate_tag, ValidationError};
use crate::storage::participants::ParticipantStore;

/// Outcome of one event
enum Transition {
    /// Commit the mutated session
    Advance(Session, Vec<Reply>),
    /// Reply, stored session untouched
    Stay(Vec<Reply>),
    /// Remove the session
    Finish(Vec<Reply>),
    /// Not valid in the current state
    Ignore,
}

/// Drives the registration dialogue for every user.
#[derive(Clone)]
pub struct RegistrationEngine {
    sessions: Arc<SessionStore>,
    store: Arc<dyn ParticipantStore>,
}

impl RegistrationEngine {
    pub fn new(sessions: Arc<SessionStore>, store: Arc<dyn ParticipantStore>) -> Self {
        Self { sessions, store }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Processes one event for `user_id` and returns the replies to send.
    ///
    /// Events must arrive in order per user. An event that makes no sense in
    /// the current state is logged and produces no replies.
    pub fn handle(&self, user_id: i64, event: Event) -> Vec<Reply> {
        match event {
            Event::Start => self.start(user_id),
            Event::Cancel => self.cancel(user_id),
            Event::Help => vec![Reply::text(texts::HELP)],
            Event::Text(text) => {
                let session = self.sessions.get(user_id);
                let state = session.state;
                let transition = self.on_text(session, &text);
                self.apply(user_id, state, "text message", transition)
            }
            Event::Action(action) => {
                let session = self.sessions.get(user_id);
                let state = session.state;
                let transition = self.on_action(user_id, session, action);
                self.apply(user_id, state, &action.to_string(), transition)
            }
        }
    }

    fn apply(&self, user_id: i64, from: State, input: &str, transition: Transition) -> Vec<Reply> {
        match transition {
            Transition::Advance(session, replies) => {
                log::debug!("User {}: {} -> {} on {}", user_id, from, session.state, input);
                self.sessions.update(user_id, session);
                replies
            }
            Transition::Stay(replies) => replies,
            Transition::Finish(replies) => {
                self.sessions.reset(user_id);
                replies
            }
            Transition::Ignore => {
                log::warn!("Ignoring {} from user {} in state {}", input, user_id, from);
                Vec::new()
            }
        }
    }

    fn start(&self, user_id: i64) -> Vec<Reply> {
        self.sessions.reset(user_id);
        self.sessions.update(
            user_id,
            Session {
                state: State::WaitingName,
                ..Session::new(user_id)
            },
        );
        log::info!("🆕 Registration started by user {}", user_id);
        vec![Reply::text(texts::welcome())]
    }

    fn cancel(&self, user_id: i64) -> Vec<Reply> {
        self.sessions.reset(user_id);
        log::info!("Registration cancelled by user {}", user_id);
        vec![Reply::text(texts::CANCELLED)]
    }

    fn on_text(&self, mut session: Session, text: &str) -> Transition {
        let value = text.trim();

        match session.state {
            State::WaitingName | State::WaitingLastName | State::WaitingClass | State::EnteringNick
                if value.is_empty() =>
            {
                Transition::Stay(vec![Reply::text(texts::EMPTY_INPUT)])
            }
            State::WaitingName => {
                session.participant.first_name = value.to_string();
                session.state = State::WaitingLastName;
                Transition::Advance(session, vec![Reply::text(texts::ASK_LAST_NAME)])
            }
            State::WaitingLastName => {
                session.participant.last_name = value.to_string();
                session.state = State::WaitingClass;
                Transition::Advance(session, vec![Reply::text(texts::ASK_CLASS)])
            }
            State::WaitingClass => {
                session.participant.class_label = value.to_string();
                session.state = State::ChoosingDiscipline;
                Transition::Advance(
                    session,
                    vec![Reply::with_keyboard(
                        texts::CHOOSE_DISCIPLINE,
                        texts::discipline_keyboard(),
                    )],
                )
            }
            State::EnteringNick => match session.current_game {
                None => no_game_selected(session),
                Some(game) => {
                    session.participant.set_nickname(game, value);
                    if game.requires_tag() {
                        session.state = State::EnteringTag;
                        Transition::Advance(session, vec![Reply::text(texts::ask_tag(game))])
                    } else {
                        after_entry(session, game)
                    }
                }
            },
            State::EnteringTag => match session.current_game {
                None => no_game_selected(session),
                Some(game) => {
                    if let Err(e) = validate_tag(value) {
                        log::debug!("{}", e);
                        return Transition::Stay(vec![Reply::text(texts::INVALID_TAG)]);
                    }
                    if session.participant.set_tag(game, value) {
                        after_entry(session, game)
                    } else {
                        // Tag without a nickname: ask for the nickname first
                        session.state = State::EnteringNick;
                        Transition::Advance(session, vec![Reply::text(texts::ask_nickname(game))])
                    }
                }
            },
            State::Idle
            | State::ChoosingDiscipline
            | State::ReadingRules
            | State::TriathlonSelect
            | State::Confirmation => Transition::Ignore,
        }
    }

    fn on_action(&self, user_id: i64, mut session: Session, action: Action) -> Transition {
        match (session.state, action) {
            (State::ChoosingDiscipline | State::ReadingRules, Action::SelectDiscipline(game)) => {
                session.state = State::ReadingRules;
                session.current_game = None;
                Transition::Advance(
                    session,
                    vec![
                        Reply::text(texts::rules(game)),
                        Reply::with_keyboard(texts::RULES_ACK_PROMPT, texts::rules_ack_keyboard(game)),
                    ],
                )
            }
            (State::ReadingRules, Action::AcknowledgeRules(game))
            | (State::TriathlonSelect, Action::TriathlonPick(game)) => {
                session.current_game = Some(game);
                session.state = State::EnteringNick;
                Transition::Advance(session, vec![Reply::text(texts::ask_nickname(game))])
            }
            (State::ChoosingDiscipline, Action::SelectAll) => {
                session.all_disciplines = true;
                session.state = State::TriathlonSelect;
                let keyboard = texts::triathlon_keyboard(&session.participant);
                Transition::Advance(session, vec![Reply::with_keyboard(texts::TRIATHLON_INTRO, keyboard)])
            }
            (State::TriathlonSelect, Action::TriathlonCheck) => Transition::Stay(vec![Reply::with_keyboard(
                texts::triathlon_status(&session.participant),
                texts::triathlon_keyboard(&session.participant),
            )]),
            (State::ChoosingDiscipline, Action::MoreYes) => {
                session.all_disciplines = false;
                Transition::Advance(
                    session,
                    vec![Reply::with_keyboard(
                        texts::CHOOSE_NEXT_DISCIPLINE,
                        texts::discipline_keyboard(),
                    )],
                )
            }
            (State::ChoosingDiscipline, Action::MoreNo) | (State::TriathlonSelect, Action::TriathlonDone) => {
                request_confirmation(session)
            }
            (State::Confirmation, Action::Confirm) => self.confirm(user_id, session),
            (_, Action::CancelRegistration) => {
                log::info!("Registration cancelled by user {}", user_id);
                Transition::Finish(vec![Reply::text(texts::CANCELLED)])
            }
            _ => Transition::Ignore,
        }
    }

    /// Persists the working record. On failure the session stays in
    /// `Confirmation` so the user can press the button again.
    fn confirm(&self, user_id: i64, session: Session) -> Transition {
        let mut participant = session.participant;
        participant.telegram_id = user_id;

        match self.store.upsert(&participant) {
            Ok(saved) => {
                log::info!(
                    "✅ Registration completed: user {} ({}, {}), {} disciplines",
                    user_id,
                    saved.full_name(),
                    saved.class_label,
                    saved.disciplines.len()
                );
                Transition::Finish(vec![Reply::text(texts::summary(&saved))])
            }
            Err(e) => {
                log::error!("❌ Failed to save registration for user {}: {}", user_id, e);
                Transition::Stay(vec![Reply::text(texts::SAVE_FAILED)])
            }
        }
    }
}

fn no_game_selected(mut session: Session) -> Transition {
    session.state = State::ChoosingDiscipline;
    Transition::Advance(
        session,
        vec![Reply::with_keyboard(
            texts::NO_GAME_SELECTED,
            texts::discipline_keyboard(),
        )],
    )
}

/// Branch after a discipline entry is complete
fn after_entry(mut session: Session, game: Discipline) -> Transition {
    session.current_game = None;

    if session.all_disciplines {
        session.state = State::TriathlonSelect;
        let keyboard = texts::triathlon_keyboard(&session.participant);
        Transition::Advance(session, vec![Reply::with_keyboard(texts::triathlon_saved(game), keyboard)])
    } else {
        session.state = State::ChoosingDiscipline;
        Transition::Advance(
            session,
            vec![Reply::with_keyboard(texts::MORE_DISCIPLINES, texts::more_keyboard())],
        )
    }
}

fn request_confirmation(mut session: Session) -> Transition {
    match check_ready_for_confirmation(&session.participant, session.all_disciplines) {
        Ok(()) => {
            session.state = State::Confirmation;
            let preview = texts::preview(&session.participant);
            Transition::Advance(session, vec![Reply::with_keyboard(preview, texts::confirm_keyboard())])
        }
        Err(ValidationError::Incomplete(_)) if session.all_disciplines => {
            Transition::Stay(vec![Reply::text(texts::TRIATHLON_INCOMPLETE)])
        }
        Err(ValidationError::Incomplete(missing)) => {
            Transition::Stay(vec![Reply::text(texts::incomplete_disciplines(&missing))])
        }
        Err(ValidationError::NoDisciplines) => Transition::Stay(vec![Reply::text(texts::NO_DISCIPLINES)]),
        Err(e @ ValidationError::InvalidTag(_)) => Transition::Stay(vec![Reply::text(e.to_string())]),
    }
}
