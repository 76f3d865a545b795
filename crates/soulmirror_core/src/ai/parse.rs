//! Tagged-line grammar for task recommendation replies.
//!
//! A reply is a sequence of lines. Recognized lines:
//! - `Название: <title>`
//! - `Автор...: <names>` or `Режиссер...: <names>`
//! - `Описание: <text>` followed by continuation lines
//!
//! Anything before the first recognized tag is ignored. A reply without a
//! non-blank title is `Unparsed`; the caller substitutes the static table.

use crate::model::task::TaskKind;

const TITLE_TAG: &str = "Название:";
const DESCRIPTION_TAG: &str = "Описание:";
const AUTHOR_TAGS: [&str; 2] = ["Автор", "Режиссер"];
const UNKNOWN_AUTHOR_MARKERS: [&str; 2] = ["не указано", "неизвестно"];
const QUOTE_CHARS: [char; 4] = ['"', '\'', '«', '»'];

pub const MAX_AUTHORS: usize = 3;
pub const MAX_DESCRIPTION_LINES: usize = 5;
pub const MAX_DESCRIPTION_CHARS: usize = 350;

/// Result of parsing a generated recommendation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReply {
    Parsed {
        title: String,
        author: Option<String>,
        /// `None` when the reply had no description lines.
        description: Option<String>,
    },
    Unparsed,
}

/// Parses a cleaned reply for a recommendation of `kind`.
pub fn parse_task_reply(text: &str, kind: TaskKind) -> ParsedReply {
    let mut title: Option<String> = None;
    let mut author: Option<String> = None;
    let mut description_lines: Vec<String> = Vec::new();
    let mut capturing_description = false;

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(rest) = line.strip_prefix(TITLE_TAG) {
            title = Some(normalize_title(rest, kind));
        } else if AUTHOR_TAGS.iter().any(|tag| line.starts_with(tag)) {
            author = line.split_once(':').and_then(|(_, rest)| normalize_author(rest));
        } else if let Some(rest) = line.strip_prefix(DESCRIPTION_TAG) {
            let rest = rest.trim();
            if !rest.is_empty() && description_lines.len() < MAX_DESCRIPTION_LINES {
                description_lines.push(rest.to_string());
            }
            capturing_description = true;
        } else if capturing_description && description_lines.len() < MAX_DESCRIPTION_LINES {
            description_lines.push(line.to_string());
        }
    }

    match title {
        Some(title) if !title.is_empty() => ParsedReply::Parsed {
            title,
            author,
            description: finish_description(&description_lines),
        },
        _ => ParsedReply::Unparsed,
    }
}

fn normalize_title(raw: &str, kind: TaskKind) -> String {
    let mut title = raw.trim();
    if let Some((head, _)) = title.split_once(DESCRIPTION_TAG) {
        title = head;
    }
    if let Some((head, _)) = title.split_once('—') {
        title = head;
    }
    // Book titles often arrive as "Title - Author".
    if kind == TaskKind::Book {
        if let Some((head, _)) = title.split_once(" - ") {
            title = head;
        }
    }
    title.trim().trim_matches(&QUOTE_CHARS[..]).trim().to_string()
}

fn normalize_author(raw: &str) -> Option<String> {
    let cleaned = raw.trim().trim_matches(&QUOTE_CHARS[..]).trim();
    if cleaned.is_empty() {
        return None;
    }
    let lowered = cleaned.to_lowercase();
    if UNKNOWN_AUTHOR_MARKERS
        .iter()
        .any(|marker| lowered.trim_end_matches('.') == *marker)
    {
        return None;
    }
    let names: Vec<&str> = cleaned
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .take(MAX_AUTHORS)
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}

fn finish_description(lines: &[String]) -> Option<String> {
    if lines.is_empty() {
        return None;
    }
    let joined = lines.join(" ");
    if joined.chars().count() > MAX_DESCRIPTION_CHARS {
        let mut truncated: String = joined.chars().take(MAX_DESCRIPTION_CHARS - 3).collect();
        truncated.push_str("...");
        Some(truncated)
    } else {
        Some(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_task_reply, ParsedReply, MAX_DESCRIPTION_CHARS};
    use crate::model::task::TaskKind;

    fn parsed(text: &str, kind: TaskKind) -> (String, Option<String>, Option<String>) {
        match parse_task_reply(text, kind) {
            ParsedReply::Parsed {
                title,
                author,
                description,
            } => (title, author, description),
            ParsedReply::Unparsed => panic!("expected parsed reply for {text:?}"),
        }
    }

    #[test]
    fn parses_well_formed_reply() {
        let reply = "Вот рекомендация:\nНазвание: \"Алхимик\"\nАвтор: Пауло Коэльо\nОписание: Книга о пути.\nОна учит слушать сердце.";
        let (title, author, description) = parsed(reply, TaskKind::Book);
        assert_eq!(title, "Алхимик");
        assert_eq!(author.as_deref(), Some("Пауло Коэльо"));
        assert_eq!(
            description.as_deref(),
            Some("Книга о пути. Она учит слушать сердце.")
        );
    }

    #[test]
    fn title_is_cut_at_dash_separators() {
        let (title, _, _) = parsed("Название: Сиддхартха - Герман Гессе", TaskKind::Book);
        assert_eq!(title, "Сиддхартха");

        let (title, _, _) = parsed("Название: Начало — Кристофер Нолан", TaskKind::Movie);
        assert_eq!(title, "Начало");

        // Only books are split on a spaced hyphen.
        let (title, _, _) = parsed("Название: Человек - паук", TaskKind::Movie);
        assert_eq!(title, "Человек - паук");
    }

    #[test]
    fn director_line_and_unknown_author_markers() {
        let (_, author, _) = parsed(
            "Название: Матрица\nРежиссер: Лана Вачовски, Лилли Вачовски",
            TaskKind::Movie,
        );
        assert_eq!(author.as_deref(), Some("Лана Вачовски, Лилли Вачовски"));

        let (_, author, _) = parsed("Название: Друзья\nАвтор: не указано", TaskKind::Series);
        assert_eq!(author, None);
    }

    #[test]
    fn authors_are_capped_at_three() {
        let (_, author, _) = parsed("Название: Сборник\nАвторы: А, Б, В, Г", TaskKind::Book);
        assert_eq!(author.as_deref(), Some("А, Б, В"));
    }

    #[test]
    fn description_is_bounded_in_lines_and_chars() {
        let reply = "Название: X\nОписание: 1\n2\n3\n4\n5\n6\n7";
        let (_, _, description) = parsed(reply, TaskKind::Movie);
        assert_eq!(description.as_deref(), Some("1 2 3 4 5"));

        let long = format!("Название: X\nОписание: {}", "ж".repeat(400));
        let (_, _, description) = parsed(&long, TaskKind::Movie);
        let description = description.unwrap();
        assert_eq!(description.chars().count(), MAX_DESCRIPTION_CHARS);
        assert!(description.ends_with("..."));
    }

    #[test]
    fn missing_title_is_unparsed() {
        assert_eq!(
            parse_task_reply("Рекомендация: Исследуйте произведения.", TaskKind::Book),
            ParsedReply::Unparsed
        );
        assert_eq!(
            parse_task_reply("Название: \"\"\nОписание: текст", TaskKind::Book),
            ParsedReply::Unparsed
        );
        assert_eq!(parse_task_reply("", TaskKind::Series), ParsedReply::Unparsed);
    }

    #[test]
    fn missing_description_is_none() {
        let (_, _, description) = parsed("Название: Шерлок", TaskKind::Series);
        assert_eq!(description, None);
    }
}
