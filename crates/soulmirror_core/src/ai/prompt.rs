//! Prompt builders.
//!
//! All user-provided text passed in here must already be sanitized.

use crate::model::reading::{ChartLayout, Planet, TarotCard};
use crate::model::sign::ZodiacSign;
use crate::model::task::TaskKind;

const PLAIN_TEXT_RULES: &str = "БЕЗ нумерации, маркеров, звездочек, решеток.";
const ANSWER_IN_RUSSIAN: &str = "Ответь на русском языке.";

/// Themes for daily advice: `(name, suggested action)`.
pub const ADVICE_THEMES: [(&str, &str); 5] = [
    (
        "самопознание",
        "исследуй свой внутренний мир, прислушайся к истинным желаниям",
    ),
    (
        "отношения",
        "обрати внимание на близких, покажи заботу и понимание",
    ),
    (
        "карьера",
        "сосредоточься на целях, прояви свои лучшие качества в работе",
    ),
    ("баланс", "найди гармонию между делом и отдыхом, позаботься о себе"),
    ("творчество", "дай волю креативности, попробуй что-то новое"),
];

/// Angles a task description may emphasize.
pub const DESCRIPTION_FOCUSES: [&str; 4] = [
    "сюжет и персонажи",
    "уроки и выводы",
    "эмоциональное воздействие",
    "практическое применение",
];

/// Accusative noun for a task kind, as used in "порекомендуй <...>".
pub fn kind_noun(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::Book => "книгу",
        TaskKind::Movie => "фильм",
        TaskKind::Series => "сериал",
    }
}

fn emotion_context(emotion_level: u8) -> &'static str {
    match emotion_level {
        0..=3 => "очень сложные, тяжелые переживания",
        4..=5 => "негативные, непростые чувства",
        6..=7 => "нейтральные, спокойные эмоции",
        _ => "позитивные, радостные переживания",
    }
}

pub fn entry_advice_prompt(
    inner_sign: ZodiacSign,
    user_level: u32,
    event: &str,
    emotion_level: u8,
) -> String {
    let sign = inner_sign.display_name();
    format!(
        "Ты - профессиональный астролог. Дай астрологический совет на основе записи клиента.

Знак зодиака: {sign}
Уровень самопознания: {user_level}

Запись из дневника:
\"{event}\"

Эмоциональная оценка: {emotion_level}/10 ({context})

Дай астрологический совет из 4-5 предложений:
- Как энергия знака {sign} проявляется в этой ситуации
- Что говорят звезды о происходящем
- Астрологические рекомендации для работы с ситуацией
- Поддержка и напутствие от космоса

{PLAIN_TEXT_RULES}
Только текст. Профессионально и эмпатично.
{ANSWER_IN_RUSSIAN}",
        context = emotion_context(emotion_level),
    )
}

pub fn daily_advice_prompt(sign: ZodiacSign, theme: (&str, &str)) -> String {
    let (theme_name, theme_action) = theme;
    format!(
        "Ты - опытный астролог. Дай короткий вдохновляющий совет на день для знака {}.

Тема дня: {theme_name}

Создай совет из 2-3 коротких предложений:
- Что говорят звезды сегодня
- Конкретная рекомендация: {theme_action}

БЕЗ нумерации, заголовков, звездочек, решеток.
Только текст. Просто и по делу.
{ANSWER_IN_RUSSIAN}",
        sign.display_name()
    )
}

pub fn tarot_prompt(question: &str, cards: &[TarotCard]) -> String {
    let cards_info = cards
        .iter()
        .map(|card| format!("{}: {}", card.position.display_name(), card.card))
        .collect::<Vec<_>>()
        .join("\n");
    let positions = cards
        .iter()
        .map(|card| format!("{} ({})", card.position.display_name(), card.card))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Ты - таролог. Проанализируй расклад Таро для вопроса: \"{question}\"

Карты:
{cards_info}

Дай короткую интерпретацию из 4-5 предложений, пройдя по позициям: {positions}.
Прошлое: что привело к ситуации. Настоящее: что происходит сейчас. Будущее: куда это ведет и что делать.

{PLAIN_TEXT_RULES}
Только текст. Понятно и по делу.
{ANSWER_IN_RUSSIAN}"
    )
}

/// Inputs of one recommendation attempt.
#[derive(Debug, Clone, Copy)]
pub struct TaskPrompt<'a> {
    pub kind: TaskKind,
    pub target_sign: ZodiacSign,
    pub qualities: &'a str,
    pub description_focus: &'a str,
    /// Already sanitized; at most the most recent titles.
    pub exclusions: &'a [String],
}

pub fn task_prompt(request: &TaskPrompt<'_>) -> String {
    let sign = request.target_sign.display_name();
    let qualities = request.qualities;
    let exclusions = if request.exclusions.is_empty() {
        String::new()
    } else {
        let list = request
            .exclusions
            .iter()
            .map(|title| format!("- {title}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!("\n\nНЕ РЕКОМЕНДУЙ ЭТИ ПРОИЗВЕДЕНИЯ (уже были):\n{list}")
    };
    format!(
        "Ты - эксперт по культуре и астрологии. Порекомендуй КОНКРЕТНОЕ произведение.

ТИП КОНТЕНТА: {kind}
ЦЕЛЕВОЙ ЗНАК: {sign}
КАЧЕСТВА ДЛЯ РАЗВИТИЯ: {qualities}{exclusions}

ЗАДАЧА:
Порекомендуй РЕАЛЬНО СУЩЕСТВУЮЩЕЕ произведение, которое поможет развить качества знака {sign}: {qualities}
Рекомендуй произведение, которого НЕТ в списке исключений выше.

ФОРМАТ ОТВЕТА (СТРОГО СЛЕДУЙ):
Название: [ТОЛЬКО название произведения БЕЗ автора/режиссера]
Автор: [Для книг - автор (максимум 3 автора через запятую). Для фильмов/сериалов - режиссер или \"не указано\"]
Описание: [2-3 предложения с акцентом на {focus}: о чем произведение и как оно помогает развить качества знака {sign}]

БЕЗ лишнего текста, только формат выше.
{ANSWER_IN_RUSSIAN}",
        kind = kind_noun(request.kind),
        focus = request.description_focus,
    )
}

/// One of the four natal interpretation sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NatalSection {
    Personality,
    Career,
    Relationships,
    LifePurpose,
}

impl NatalSection {
    pub const ALL: [NatalSection; 4] = [
        Self::Personality,
        Self::Career,
        Self::Relationships,
        Self::LifePurpose,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Personality => "personality",
            Self::Career => "career",
            Self::Relationships => "relationships",
            Self::LifePurpose => "life_purpose",
        }
    }

    fn planets(self) -> &'static [Planet] {
        match self {
            Self::Personality => &[
                Planet::Moon,
                Planet::Mercury,
                Planet::Venus,
                Planet::Mars,
            ],
            Self::Career => &[Planet::Mars, Planet::Jupiter, Planet::Saturn],
            Self::Relationships => &[Planet::Moon, Planet::Venus, Planet::Mars],
            Self::LifePurpose => &[Planet::Moon, Planet::Jupiter, Planet::Saturn],
        }
    }

    fn brief(self) -> &'static str {
        match self {
            Self::Personality => {
                "Ты - астролог. Опиши личность по натальной карте.
Дай целостный портрет из 6-7 предложений: характер и сильные стороны, эмоции и потребности, мышление и общение, любовь и ценности, энергия и действия."
            }
            Self::Career => {
                "Ты - карьерный астролог. Раскрой профессиональный потенциал.
Дай карьерный анализ из 5-6 предложений: природные таланты, стиль работы, направления роста, путь к успеху. Назови конкретные профессии и сферы."
            }
            Self::Relationships => {
                "Ты - астролог по отношениям. Раскрой любовную сферу.
Дай анализ отношений из 5-6 предложений: стиль любви, эмоциональные потребности, что важно в партнере, страсть и желания."
            }
            Self::LifePurpose => {
                "Ты - духовный астролог. Раскрой предназначение души.
Дай вдохновляющий анализ из 5-6 предложений: миссия души, таланты и дары, путь развития, кармические уроки."
            }
        }
    }
}

pub fn natal_prompt(section: NatalSection, birth_sign: ZodiacSign, layout: &ChartLayout) -> String {
    let mut chart = format!("- Солнце в знаке {}", birth_sign.display_name());
    for planet in section.planets() {
        if let Some(position) = layout.position_of(*planet) {
            chart.push_str(&format!(
                "\n- {} в знаке {}, {} дом",
                planet.display_name(),
                position.sign.display_name(),
                position.house
            ));
        }
    }
    format!(
        "{brief}

Натальная карта:
{chart}

{PLAIN_TEXT_RULES}
Только текст. Конкретно и понятно.
{ANSWER_IN_RUSSIAN}",
        brief = section.brief(),
    )
}

#[cfg(test)]
mod tests {
    use super::{natal_prompt, task_prompt, NatalSection, TaskPrompt};
    use crate::model::sign::ZodiacSign;
    use crate::model::task::TaskKind;
    use crate::rules::natal::generate_layout;
    use chrono::NaiveDate;

    #[test]
    fn task_prompt_lists_exclusions_only_when_present() {
        let titles = vec!["Алхимик".to_string(), "Матрица".to_string()];
        let mut request = TaskPrompt {
            kind: TaskKind::Book,
            target_sign: ZodiacSign::Libra,
            qualities: "гармония",
            description_focus: "уроки и выводы",
            exclusions: &titles,
        };
        let prompt = task_prompt(&request);
        assert!(prompt.contains("- Алхимик\n- Матрица"));
        assert!(prompt.contains("книгу"));
        assert!(prompt.contains("Весы"));

        request.exclusions = &[];
        assert!(!task_prompt(&request).contains("НЕ РЕКОМЕНДУЙ"));
    }

    #[test]
    fn natal_prompt_mentions_section_planets() {
        let layout = generate_layout(NaiveDate::from_ymd_opt(1995, 3, 3).unwrap(), ZodiacSign::Pisces);
        let prompt = natal_prompt(NatalSection::Career, ZodiacSign::Pisces, &layout);
        assert!(prompt.contains("Солнце в знаке Рыбы"));
        assert!(prompt.contains("Юпитер"));
        assert!(prompt.contains("Сатурн"));
        assert!(!prompt.contains("Венера"));
    }
}
