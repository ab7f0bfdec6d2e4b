//! CSV backup of all registrations

use chrono::{DateTime, Local};
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::core::config::TOURNAMENT_NAME;
use crate::core::error::AppResult;
use crate::registration::model::{Discipline, Participant};
use crate::storage::participants::ParticipantStore;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// `backup_etriathlon_2026-03-01_12-30-05.csv`
pub fn backup_file_name(now: DateTime<Local>) -> String {
    format!("backup_etriathlon_{}.csv", now.format(FILE_TIMESTAMP_FORMAT))
}

/// Renders the discipline column: `Brawl Stars: ann #ABC; Chess: annlee`
pub fn format_disciplines(participant: &Participant) -> String {
    participant
        .disciplines
        .iter()
        .map(|(discipline, data)| match data.tag() {
            Some(tag) if discipline.requires_tag() => format!("{}: {} {}", discipline, data.nickname, tag),
            _ => format!("{}: {}", discipline, data.nickname),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Number of participants per discipline, every discipline listed in fixed order
pub fn discipline_counts(participants: &[Participant]) -> Vec<(Discipline, usize)> {
    Discipline::all()
        .map(|discipline| {
            let count = participants
                .iter()
                .filter(|p| p.disciplines.contains_key(&discipline))
                .count();
            (discipline, count)
        })
        .collect()
}

/// Writes the backup document
///
/// Layout: header block, column row, one row per participant, total, then
/// per-discipline statistics. Rows have different widths.
pub fn write_backup<W: Write>(writer: W, participants: &[Participant], generated_at: DateTime<Local>) -> AppResult<()> {
    let mut csv = WriterBuilder::new().flexible(true).from_writer(writer);

    csv.write_record([format!("=== {} - Database Backup ===", TOURNAMENT_NAME)])?;
    csv.write_record([format!("Generated: {}", generated_at.format(TIMESTAMP_FORMAT))])?;
    csv.write_record([""])?;
    csv.write_record(["=== TABLE: participants ==="])?;
    csv.write_record(["ID", "Telegram ID", "Имя", "Фамилия", "Класс", "Дисциплины"])?;

    for participant in participants {
        csv.write_record([
            participant.id.map(|id| id.to_string()).unwrap_or_default(),
            participant.telegram_id.to_string(),
            participant.first_name.clone(),
            participant.last_name.clone(),
            participant.class_label.clone(),
            format_disciplines(participant),
        ])?;
    }

    csv.write_record([""])?;
    csv.write_record([format!("Total registrations: {}", participants.len())])?;
    csv.write_record([""])?;
    csv.write_record(["=== STATISTICS BY DISCIPLINE ==="])?;

    for (discipline, count) in discipline_counts(participants) {
        csv.write_record([discipline.display_name().to_string(), format!("{} участников", count)])?;
    }

    csv.flush()?;
    Ok(())
}

/// Renders the backup into a string
pub fn render_backup(participants: &[Participant], generated_at: DateTime<Local>) -> AppResult<String> {
    let mut buffer = Vec::new();
    write_backup(&mut buffer, participants, generated_at)?;
    String::from_utf8(buffer).map_err(|e| anyhow::anyhow!("Backup is not valid UTF-8: {}", e).into())
}

/// Reads every participant from the store and writes the backup file.
///
/// # Returns
///
/// Number of exported participants.
pub fn export_to_file(store: &dyn ParticipantStore, path: &Path, generated_at: DateTime<Local>) -> AppResult<usize> {
    let participants = store.list_all()?;
    let file = File::create(path)?;
    write_backup(file, &participants, generated_at)?;

    log::info!("📄 Exported {} participants to {}", participants.len(), path.display());
    Ok(participants.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 1, 12, 30, 5).unwrap()
    }

    fn ann() -> Participant {
        let mut participant = Participant {
            id: Some(1),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            class_label: "10B".to_string(),
            ..Participant::new(555)
        };
        participant.set_nickname(Discipline::BrawlStars, "ann");
        participant.set_tag(Discipline::BrawlStars, "#ABC");
        participant.set_nickname(Discipline::Chess, "annlee");
        participant
    }

    #[test]
    fn test_backup_file_name() {
        assert_eq!(backup_file_name(at()), "backup_etriathlon_2026-03-01_12-30-05.csv");
    }

    #[test]
    fn test_format_disciplines() {
        assert_eq!(format_disciplines(&ann()), "Brawl Stars: ann #ABC; Chess: annlee");
        assert_eq!(format_disciplines(&Participant::new(1)), "");
    }

    #[test]
    fn test_render_backup_layout() {
        let rendered = render_backup(&[ann()], at()).unwrap();
        // A lone empty field may be written quoted
        let lines: Vec<&str> = rendered
            .lines()
            .map(|line| if line == "\"\"" { "" } else { line })
            .collect();

        assert_eq!(
            lines,
            vec![
                "=== eTriathlon 2026 - Database Backup ===",
                "Generated: 2026-03-01 12:30:05",
                "",
                "=== TABLE: participants ===",
                "ID,Telegram ID,Имя,Фамилия,Класс,Дисциплины",
                "1,555,Ann,Lee,10B,Brawl Stars: ann #ABC; Chess: annlee",
                "",
                "Total registrations: 1",
                "",
                "=== STATISTICS BY DISCIPLINE ===",
                "Brawl Stars,1 участников",
                "Clash Royale,0 участников",
                "Chess,1 участников",
            ]
        );
    }

    #[test]
    fn test_discipline_counts_in_fixed_order() {
        let mut other = Participant::new(2);
        other.set_nickname(Discipline::Chess, "x");

        let counts = discipline_counts(&[ann(), other]);
        assert_eq!(
            counts,
            vec![
                (Discipline::BrawlStars, 1),
                (Discipline::ClashRoyale, 0),
                (Discipline::Chess, 2),
            ]
        );
    }
}
