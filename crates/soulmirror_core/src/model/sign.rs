//! Zodiac sign enumeration and per-sign reference data.
//!
//! # Responsibility
//! - Define the closed set of 12 sign identifiers in canonical order.
//! - Own the static per-sign tables (display names, keywords, qualities).
//!
//! # Invariants
//! - Variant declaration order is the canonical order; `Ord` follows it.
//! - `code()` is the persisted form and round-trips through `parse()`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One of the 12 zodiac signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

/// Error for unknown sign codes at parse boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSignError(pub String);

impl Display for ParseSignError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown zodiac sign `{}`", self.0)
    }
}

impl Error for ParseSignError {}

impl ZodiacSign {
    /// All signs in canonical order.
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    /// Stable lowercase code used for storage and serialization.
    pub fn code(self) -> &'static str {
        match self {
            Self::Aries => "aries",
            Self::Taurus => "taurus",
            Self::Gemini => "gemini",
            Self::Cancer => "cancer",
            Self::Leo => "leo",
            Self::Virgo => "virgo",
            Self::Libra => "libra",
            Self::Scorpio => "scorpio",
            Self::Sagittarius => "sagittarius",
            Self::Capricorn => "capricorn",
            Self::Aquarius => "aquarius",
            Self::Pisces => "pisces",
        }
    }

    /// Parses a sign code, ignoring surrounding whitespace and ASCII case.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|sign| sign.code() == normalized.as_str())
    }

    /// Human-readable name shown to users and inserted into prompts.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Aries => "Овен",
            Self::Taurus => "Телец",
            Self::Gemini => "Близнецы",
            Self::Cancer => "Рак",
            Self::Leo => "Лев",
            Self::Virgo => "Дева",
            Self::Libra => "Весы",
            Self::Scorpio => "Скорпион",
            Self::Sagittarius => "Стрелец",
            Self::Capricorn => "Козерог",
            Self::Aquarius => "Водолей",
            Self::Pisces => "Рыбы",
        }
    }

    /// Zero-based position in canonical order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the sign `delta` steps away on the zodiac wheel.
    pub fn offset(self, delta: i64) -> Self {
        let position = (self.index() as i64 + delta).rem_euclid(12);
        Self::ALL[position as usize]
    }

    /// Lowercase keywords whose presence in event text strengthens this sign.
    pub fn keywords(self) -> &'static [&'static str; 5] {
        match self {
            Self::Aries => &["действие", "начало", "инициатива", "борьба", "соревнование"],
            Self::Taurus => &["стабильность", "терпение", "материальное", "комфорт", "упорство"],
            Self::Gemini => &["общение", "обучение", "информация", "любопытство", "разговор"],
            Self::Cancer => &["семья", "дом", "эмоции", "забота", "защита"],
            Self::Leo => &["творчество", "признание", "лидерство", "успех", "выступление"],
            Self::Virgo => &["анализ", "порядок", "работа", "детали", "помощь"],
            Self::Libra => &["отношения", "гармония", "баланс", "справедливость", "красота"],
            Self::Scorpio => &["трансформация", "глубина", "страсть", "тайна", "изменение"],
            Self::Sagittarius => &["путешествие", "философия", "свобода", "приключение", "знание"],
            Self::Capricorn => &["цель", "карьера", "ответственность", "достижение", "дисциплина"],
            Self::Aquarius => &["инновация", "независимость", "друзья", "будущее", "уникальность"],
            Self::Pisces => &["интуиция", "мечта", "духовность", "сострадание", "искусство"],
        }
    }

    /// Alternative phrasings of the qualities a task for this sign develops.
    pub fn quality_variants(self) -> &'static [&'static str; 4] {
        match self {
            Self::Aries => &[
                "лидерство, инициатива, смелость, энергия",
                "решительность, предприимчивость, независимость, конкурентоспособность",
                "храбрость, новаторство, динамичность, прямота",
                "активность, напористость, пионерский дух, самоутверждение",
            ],
            Self::Taurus => &[
                "стабильность, терпение, практичность, чувственность",
                "надежность, упорство, материальная безопасность, верность",
                "последовательность, настойчивость, эстетический вкус, земная мудрость",
                "выносливость, комфорт, финансовая грамотность, природная связь",
            ],
            Self::Gemini => &[
                "коммуникация, любознательность, гибкость, адаптивность",
                "интеллект, общительность, разносторонность, находчивость",
                "красноречие, обучаемость, многозадачность, остроумие",
                "социальность, информированность, логика, вербальные навыки",
            ],
            Self::Cancer => &[
                "эмоциональность, забота, интуиция, семейность",
                "чувствительность, защита близких, эмпатия, домашний уют",
                "сострадание, память о прошлом, душевность, преданность",
                "нежность, верность традициям, эмоциональный интеллект, забота",
            ],
            Self::Leo => &[
                "творчество, щедрость, уверенность, харизма",
                "лидерство, драматизм, самовыражение, великодушие",
                "достоинство, артистизм, благородство, вдохновение",
                "сила воли, яркость, организаторские способности, гордость",
            ],
            Self::Virgo => &[
                "аналитичность, внимательность к деталям, служение, совершенство",
                "практичность, критическое мышление, организованность, здоровье",
                "методичность, скромность, полезность, точность",
                "рациональность, трудолюбие, систематизация, забота о других",
            ],
            Self::Libra => &[
                "гармония, дипломатия, справедливость, партнерство",
                "эстетика, баланс, социальные навыки, миротворчество",
                "элегантность, объективность, сотрудничество, искусство компромисса",
                "утонченность, равновесие, культурность, отношения",
            ],
            Self::Scorpio => &[
                "глубина, трансформация, страсть, проницательность",
                "интенсивность, психология, власть, возрождение",
                "магнетизм, исследование тайн, целеустремленность, выживание",
                "решительность, эмоциональная сила, регенерация, контроль",
            ],
            Self::Sagittarius => &[
                "оптимизм, философия, стремление к знаниям, приключения",
                "свобода, расширение горизонтов, мудрость, путешествия",
                "идеализм, высшее образование, вера, исследование мира",
                "энтузиазм, истина, международность, духовный рост",
            ],
            Self::Capricorn => &[
                "амбициозность, дисциплина, ответственность, достижения",
                "целеустремленность, структура, карьера, профессионализм",
                "выдержка, стратегия, авторитет, долгосрочное планирование",
                "надежность, практицизм, управление, социальный статус",
            ],
            Self::Aquarius => &[
                "оригинальность, гуманизм, независимость, инновации",
                "прогрессивность, дружба, интеллектуальность, свобода мысли",
                "индивидуальность, альтруизм, технологии, будущее",
                "нестандартность, коллективное сознание, реформы, эксцентричность",
            ],
            Self::Pisces => &[
                "сострадание, интуиция, творческое воображение, духовность",
                "чувствительность, мистика, жертвенность, артистизм",
                "эмпатия, мечтательность, универсальная любовь, целительство",
                "тонкость восприятия, вдохновение, растворение границ, воображение",
            ],
        }
    }
}

impl Display for ZodiacSign {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ZodiacSign {
    type Err = ParseSignError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| ParseSignError(value.to_string()))
    }
}
