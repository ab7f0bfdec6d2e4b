//! Participant record and the closed set of tournament disciplines

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

/// Tournament discipline.
///
/// The short code (`bs`, `cr`, `ch`) is what travels inside button payloads;
/// the display name is what gets persisted as the JSON map key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, AsRefStr, EnumString, EnumIter,
)]
pub enum Discipline {
    #[serde(rename = "Brawl Stars")]
    #[strum(serialize = "bs")]
    BrawlStars,
    #[serde(rename = "Clash Royale")]
    #[strum(serialize = "cr")]
    ClashRoyale,
    #[serde(rename = "Chess")]
    #[strum(serialize = "ch")]
    Chess,
}

impl Discipline {
    /// All disciplines in display order
    pub fn all() -> impl Iterator<Item = Discipline> {
        Discipline::iter()
    }

    /// Parses a short payload code (`bs`, `cr`, `ch`)
    pub fn from_code(code: &str) -> Option<Self> {
        code.parse().ok()
    }

    /// Short payload code
    pub fn code(self) -> &'static str {
        match self {
            Discipline::BrawlStars => "bs",
            Discipline::ClashRoyale => "cr",
            Discipline::Chess => "ch",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Discipline::BrawlStars => "Brawl Stars",
            Discipline::ClashRoyale => "Clash Royale",
            Discipline::Chess => "Chess",
        }
    }

    /// Chess players are identified by nickname only
    pub fn requires_tag(self) -> bool {
        !matches!(self, Discipline::Chess)
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Discipline-specific player data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameData {
    #[serde(rename = "nick", default)]
    pub nickname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl GameData {
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Tag, treating an empty string the same as an absent one
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref().filter(|t| !t.is_empty())
    }
}

/// Registered (or in-progress) tournament participant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Internal row id, `None` until persisted
    pub id: Option<i64>,
    /// Telegram user id, unique across participants
    pub telegram_id: i64,
    pub first_name: String,
    pub last_name: String,
    /// School class label, e.g. "10B"
    #[serde(rename = "class")]
    pub class_label: String,
    pub disciplines: BTreeMap<Discipline, GameData>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Participant {
    /// Empty working record for a Telegram user
    pub fn new(telegram_id: i64) -> Self {
        Self {
            telegram_id,
            ..Self::default()
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Looks up a discipline entry; absent entries stay absent
    pub fn entry(&self, discipline: Discipline) -> Option<&GameData> {
        self.disciplines.get(&discipline)
    }

    /// Sets the nickname for a discipline, keeping any tag entered before
    pub fn set_nickname(&mut self, discipline: Discipline, nickname: impl Into<String>) {
        let existing_tag = self.entry(discipline).and_then(|data| data.tag.clone());
        self.disciplines.insert(
            discipline,
            GameData {
                nickname: nickname.into(),
                tag: existing_tag,
            },
        );
    }

    /// Sets the tag for a discipline that already has an entry.
    ///
    /// Returns `false` (and changes nothing) when no nickname was entered yet.
    pub fn set_tag(&mut self, discipline: Discipline, tag: impl Into<String>) -> bool {
        match self.disciplines.get(&discipline).cloned() {
            Some(mut data) => {
                data.tag = Some(tag.into());
                self.disciplines.insert(discipline, data);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_discipline_codes_parse() {
        assert_eq!(Discipline::from_code("bs"), Some(Discipline::BrawlStars));
        assert_eq!(Discipline::from_code("cr"), Some(Discipline::ClashRoyale));
        assert_eq!(Discipline::from_code("ch"), Some(Discipline::Chess));
        assert_eq!(Discipline::from_code("tri"), None);
        assert_eq!(Discipline::from_code("BS"), None);
    }

    #[test]
    fn test_code_matches_strum_serialization() {
        for discipline in Discipline::all() {
            assert_eq!(discipline.code(), discipline.as_ref());
        }
    }

    #[test]
    fn test_only_chess_is_tag_exempt() {
        let exempt: Vec<_> = Discipline::all().filter(|d| !d.requires_tag()).collect();
        assert_eq!(exempt, vec![Discipline::Chess]);
    }

    #[test]
    fn test_set_nickname_keeps_existing_tag() {
        let mut participant = Participant::new(1);
        participant.set_nickname(Discipline::BrawlStars, "first");
        assert!(participant.set_tag(Discipline::BrawlStars, "#TAG1"));
        participant.set_nickname(Discipline::BrawlStars, "second");

        assert_eq!(
            participant.entry(Discipline::BrawlStars),
            Some(&GameData::new("second").with_tag("#TAG1"))
        );
    }

    #[test]
    fn test_set_tag_without_entry_is_rejected() {
        let mut participant = Participant::new(1);
        assert!(!participant.set_tag(Discipline::ClashRoyale, "#TAG"));
        assert!(participant.entry(Discipline::ClashRoyale).is_none());
    }

    #[test]
    fn test_discipline_map_json_shape() {
        let mut participant = Participant::new(7);
        participant.set_nickname(Discipline::Chess, "annlee");
        participant.set_nickname(Discipline::BrawlStars, "ann");
        participant.set_tag(Discipline::BrawlStars, "#ABC");

        let json = serde_json::to_string(&participant.disciplines).unwrap();
        assert_eq!(
            json,
            r##"{"Brawl Stars":{"nick":"ann","tag":"#ABC"},"Chess":{"nick":"annlee"}}"##
        );

        let back: BTreeMap<Discipline, GameData> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, participant.disciplines);
    }

    #[test]
    fn test_empty_tag_reads_as_absent() {
        let data: GameData = serde_json::from_str(r#"{"nick":"x","tag":""}"#).unwrap();
        assert_eq!(data.tag(), None);
    }

    #[test]
    fn test_full_name() {
        let participant = Participant {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            ..Participant::new(1)
        };
        assert_eq!(participant.full_name(), "Ann Lee");
    }
}
