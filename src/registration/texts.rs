//! Тексты сообщений и клавиатуры диалога регистрации

use indoc::{formatdoc, indoc};

use super::event::Action;
use super::model::{Discipline, GameData, Participant};
use super::reply::{Button, Keyboard};
use crate::core::config::TOURNAMENT_NAME;
use crate::core::validation::{all_disciplines_complete, is_discipline_complete};

pub fn welcome() -> String {
    formatdoc! {"
        🎮 Добро пожаловать на регистрацию {tournament}!

        Турнир включает три игры:
        • Brawl Stars
        • Clash Royale
        • Chess (Шахматы)

        Для регистрации введите ваши данные.

        Введите ваше имя:",
        tournament = TOURNAMENT_NAME,
    }
}

pub const ASK_LAST_NAME: &str = "Введите вашу фамилию:";
pub const ASK_CLASS: &str = "Введите ваш класс (например: 9A, 10B):";
pub const EMPTY_INPUT: &str = "Пустое сообщение не подходит. Попробуйте снова:";
pub const CHOOSE_DISCIPLINE: &str = "Выберите дисциплину для участия:";
pub const CHOOSE_NEXT_DISCIPLINE: &str = "Выберите следующую дисциплину:";
pub const RULES_ACK_PROMPT: &str = "Нажмите «Ознакомлен»";
pub const NO_GAME_SELECTED: &str = "Ошибка: игра не выбрана. Выберите дисциплину:";
pub const INVALID_TAG: &str =
    "Неверный формат тега. Тег должен начинаться с # и содержать буквы/цифры/подчёркивания. Попробуйте снова:";
pub const MORE_DISCIPLINES: &str = "Хотите зарегистрироваться на другие дисциплины?";
pub const TRIATHLON_INCOMPLETE: &str = "❌ Необходимо заполнить данные для всех трёх игр!";
pub const NO_DISCIPLINES: &str = "❌ Сначала зарегистрируйтесь хотя бы на одну дисциплину.";
pub const SAVE_FAILED: &str = "❌ Ошибка сохранения данных. Попробуйте нажать «Подтвердить» ещё раз.";
pub const CANCELLED: &str = "❌ Регистрация отменена. Чтобы начать заново, отправьте /start";
pub const UNKNOWN_COMMAND: &str = "Неизвестная команда. Список команд: /help";

pub const HELP: &str = indoc! {"
    ℹ️ Бот регистрации на турнир eTriathlon 2026

    Команды:
    /start - начать регистрацию заново
    /cancel - отменить текущую регистрацию
    /help - показать эту справку

    Повторная регистрация заменяет ранее сохранённые данные."};

pub const TRIATHLON_INTRO: &str = indoc! {"
    🏆 ТРИАТЛОН

    Для участия необходимо зарегистрироваться во всех трёх дисциплинах:
    • Brawl Stars
    • Clash Royale
    • Chess

    Выберите игру для ввода данных:"};

/// Правила дисциплины
pub fn rules(discipline: Discipline) -> &'static str {
    match discipline {
        Discipline::BrawlStars => indoc! {r#"
            📋 ПРАВИЛА BRAWL STARS:
            Формат: 1v1 (Дружеский бой)
            Один из игроков создает код команды и приглашает другого.
            Второй присоединяется по коду или через приглашение в друзья.
            Один из участников обязан создать пустую карту в режиме "Награда за поимку", после чего игроки по очереди выбирают персонажей для обоих.
            Победителем считается тот, кто выиграл 2 матча.
            При счёте 1:1 игроки выбирают персонажа, предложенного судьями."#},
        Discipline::ClashRoyale => indoc! {r#"
            📋 ПРАВИЛА CLASH ROYALE:
            Формат: 1v1 (Дружеский бой).
            Один из игроков отправляет запрос "Дружеский бой"; оба игрока должны добавить друг друга в друзья.
            Матч проводится до одной победы/ничьи на групповом этапе и до одной победы в плей-офф."#},
        Discipline::Chess => indoc! {"
            📋 ПРАВИЛА ШАХМАТ:
            Создатель матча выставляет контроль времени (5+5 минут).
            Второй игрок получает приглашение или ссылку.
            Матч проводится до одной победы/ничьи на групповом этапе и до одной победы в плей-офф.
            Платформа: Chess.com"},
    }
}

pub fn ask_nickname(discipline: Discipline) -> String {
    format!("Введите ваш игровой ник для {}:", discipline)
}

pub fn ask_tag(discipline: Discipline) -> String {
    format!("Введите ваш тег игрока для {} (например: #ABC123):", discipline)
}

pub fn triathlon_saved(discipline: Discipline) -> String {
    format!("✅ Данные для {} сохранены!\n\nВыберите следующую игру:", discipline)
}

pub fn incomplete_disciplines(disciplines: &[Discipline]) -> String {
    let names: Vec<&str> = disciplines.iter().map(|d| d.display_name()).collect();
    format!("❌ Не заполнены данные для: {}", names.join(", "))
}

/// `Ник` или `Ник #TAG`, для шахмат тег не выводится
fn entry_line(discipline: Discipline, data: &GameData) -> String {
    match data.tag() {
        Some(tag) if discipline.requires_tag() => format!("• {}: {} {}", discipline, data.nickname, tag),
        _ => format!("• {}: {}", discipline, data.nickname),
    }
}

fn participant_block(participant: &Participant) -> String {
    let lines: Vec<String> = participant
        .disciplines
        .iter()
        .map(|(discipline, data)| entry_line(*discipline, data))
        .collect();

    formatdoc! {"
        Имя: {first}
        Фамилия: {last}
        Класс: {class}

        Дисциплины:
        {lines}",
        first = participant.first_name,
        last = participant.last_name,
        class = participant.class_label,
        lines = lines.join("\n"),
    }
}

/// Предпросмотр перед подтверждением
pub fn preview(participant: &Participant) -> String {
    format!(
        "📝 Проверьте ваши данные:\n\n{}\n\nВсё верно?",
        participant_block(participant)
    )
}

/// Итог после успешного сохранения
pub fn summary(participant: &Participant) -> String {
    format!(
        "✅ Регистрация завершена!\n\nВаши данные:\n{}\n\nУдачи на турнире! 🏆",
        participant_block(participant)
    )
}

/// Статус заполнения триатлона, выводится из рабочей записи
pub fn triathlon_status(participant: &Participant) -> String {
    let mut status = String::from("📊 Статус регистрации на Триатлон:\n\n");

    for discipline in Discipline::all() {
        let line = match participant.entry(discipline) {
            Some(data) if is_discipline_complete(participant, discipline) => match data.tag() {
                Some(tag) => format!("✅ {}: {} ({})", discipline, data.nickname, tag),
                None => format!("✅ {}: {}", discipline, data.nickname),
            },
            Some(data) if !data.nickname.is_empty() => {
                format!("⚠️ {}: {} (нет тега)", discipline, data.nickname)
            }
            _ => format!("⬜ {}: не заполнено", discipline),
        };
        status.push_str(&line);
        status.push('\n');
    }

    if all_disciplines_complete(participant) {
        status.push_str("\n✅ Все данные заполнены! Можете завершить регистрацию.");
    } else {
        status.push_str("\n⚠️ Заполните данные для всех игр перед завершением.");
    }

    status
}

pub fn discipline_keyboard() -> Keyboard {
    let button = |d: Discipline| Button::new(d.display_name(), Action::SelectDiscipline(d));
    Keyboard::new(vec![
        vec![button(Discipline::BrawlStars), button(Discipline::ClashRoyale)],
        vec![
            button(Discipline::Chess),
            Button::new("Триатлон (все 3)", Action::SelectAll),
        ],
    ])
}

pub fn rules_ack_keyboard(discipline: Discipline) -> Keyboard {
    Keyboard::new(vec![vec![Button::new(
        "Ознакомлен ✅",
        Action::AcknowledgeRules(discipline),
    )]])
}

pub fn more_keyboard() -> Keyboard {
    Keyboard::new(vec![vec![
        Button::new("Да", Action::MoreYes),
        Button::new("Нет, завершить", Action::MoreNo),
    ]])
}

/// Клавиатура триатлона с отметками ✅/⬜.
///
/// Кнопка завершения появляется только когда заполнены все игры.
pub fn triathlon_keyboard(participant: &Participant) -> Keyboard {
    let mut rows: Vec<Vec<Button>> = Discipline::all()
        .map(|discipline| {
            let mark = if is_discipline_complete(participant, discipline) {
                "✅"
            } else {
                "⬜"
            };
            vec![Button::new(
                format!("{} {}", mark, discipline),
                Action::TriathlonPick(discipline),
            )]
        })
        .collect();

    rows.push(vec![Button::new("🔄 Проверить статус", Action::TriathlonCheck)]);

    if all_disciplines_complete(participant) {
        rows.push(vec![Button::new("✅ Завершить регистрацию", Action::TriathlonDone)]);
    }

    Keyboard::new(rows)
}

pub fn confirm_keyboard() -> Keyboard {
    Keyboard::new(vec![vec![
        Button::new("✅ Подтвердить", Action::Confirm),
        Button::new("❌ Отменить", Action::CancelRegistration),
    ]])
}
