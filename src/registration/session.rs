use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use strum::{AsRefStr, Display};

use super::model::{Discipline, Participant};

/// Состояние диалога регистрации.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, AsRefStr, Display)]
pub enum State {
    /// Сессия только создана, диалог не начат
    #[default]
    Idle,
    WaitingName,
    WaitingLastName,
    WaitingClass,
    /// Выбор дисциплины или ответ на «ещё одну дисциплину?»
    ChoosingDiscipline,
    /// Показаны правила, ждём «Ознакомлен»
    ReadingRules,
    EnteringNick,
    EnteringTag,
    /// Режим триатлона: клавиатура со статусом по каждой игре
    TriathlonSelect,
    /// Показан предпросмотр, ждём confirm / cancel_reg
    Confirmation,
}

/// Сессия одного пользователя.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub state: State,
    /// Рабочая (ещё не сохранённая) копия участника
    pub participant: Participant,
    /// Дисциплина, для которой сейчас вводятся ник и тег
    pub current_game: Option<Discipline>,
    /// Режим «все дисциплины» (триатлон)
    pub all_disciplines: bool,
}

impl Session {
    /// Новая сессия в состоянии `Idle` с пустой рабочей записью.
    pub fn new(user_id: i64) -> Self {
        Self {
            participant: Participant::new(user_id),
            ..Self::default()
        }
    }
}

/// Хранилище сессий в памяти.
///
/// Одна блокировка на всю таблицу, удерживается только на время операции
/// с картой. Создаётся явно и передаётся через `Arc`, глобального
/// экземпляра нет.
///
/// # Example
///
/// ```
/// use etriathlon::registration::session::{SessionStore, State};
///
/// let store = SessionStore::new();
/// assert_eq!(store.get(42).state, State::Idle);
///
/// store.set_state(42, State::WaitingName);
/// assert_eq!(store.get(42).state, State::WaitingName);
///
/// store.reset(42);
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<i64, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Блокирует таблицу. Отравленный мьютекс не теряет данные: берём
    /// внутреннее значение и продолжаем.
    fn lock(&self) -> MutexGuard<'_, HashMap<i64, Session>> {
        self.sessions.lock().unwrap_or_else(|poisoned| {
            log::warn!("Session table mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Возвращает копию сессии, атомарно создавая новую при отсутствии.
    pub fn get(&self, user_id: i64) -> Session {
        self.lock()
            .entry(user_id)
            .or_insert_with(|| Session::new(user_id))
            .clone()
    }

    /// Переводит сессию в новое состояние (создаёт её при необходимости).
    pub fn set_state(&self, user_id: i64, state: State) {
        self.lock()
            .entry(user_id)
            .or_insert_with(|| Session::new(user_id))
            .state = state;
    }

    /// Записывает изменённую вызывающим кодом сессию целиком.
    pub fn update(&self, user_id: i64, session: Session) {
        self.lock().insert(user_id, session);
    }

    /// Удаляет сессию; следующий `get` вернёт свежую.
    pub fn reset(&self, user_id: i64) {
        self.lock().remove(&user_id);
    }

    /// Есть ли сессия у пользователя (без создания)
    pub fn contains(&self, user_id: i64) -> bool {
        self.lock().contains_key(&user_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
