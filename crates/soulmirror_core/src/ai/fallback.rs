//! Deterministic replacements for unavailable or unusable generations.

use crate::model::sign::ZodiacSign;
use crate::model::task::{TaskDraft, TaskKind};

/// Which kind of text a fallback stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    /// Reflection on a journal event.
    Event,
    /// Daily advice.
    Advice,
    Tarot,
    Task,
    /// Natal readings and anything else.
    General,
}

impl FallbackKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Advice => "advice",
            Self::Tarot => "tarot",
            Self::Task => "task",
            Self::General => "general",
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::Event => {
                "Каждое переживание - это шаг на пути самопознания. Примите свои чувства и используйте этот опыт для внутреннего роста."
            }
            Self::Advice => {
                "Сегодня звезды советуют прислушаться к своему внутреннему голосу. Доверьтесь интуиции."
            }
            Self::Tarot => {
                "Карты указывают на период трансформации. Будьте открыты новым возможностям и доверьтесь своей мудрости."
            }
            Self::Task => "Рекомендация: Исследуйте произведения, которые резонируют с вашей душой.",
            Self::General => "Звезды благосклонны к вашему пути самопознания.",
        }
    }
}

/// Static recommendation `(title, author)` for a kind and sign.
pub fn fallback_title(kind: TaskKind, sign: ZodiacSign) -> (&'static str, Option<&'static str>) {
    use ZodiacSign::*;
    match kind {
        TaskKind::Book => match sign {
            Aries => ("Думай и богатей", Some("Наполеон Хилл")),
            Taurus => ("Маленький принц", Some("Антуан де Сент-Экзюпери")),
            Gemini => ("Мастер и Маргарита", Some("Михаил Булгаков")),
            Cancer => ("Гордость и предубеждение", Some("Джейн Остин")),
            Leo => ("Портрет Дориана Грея", Some("Оскар Уайльд")),
            Virgo => ("Искусство войны", Some("Сунь Цзы")),
            Libra => ("Алхимик", Some("Пауло Коэльо")),
            Scorpio => ("Преступление и наказание", Some("Федор Достоевский")),
            Sagittarius => ("Сиддхартха", Some("Герман Гессе")),
            Capricorn => ("Атлант расправил плечи", Some("Айн Рэнд")),
            Aquarius => ("1984", Some("Джордж Оруэлл")),
            Pisces => ("Вино из одуванчиков", Some("Рэй Брэдбери")),
        },
        TaskKind::Movie => match sign {
            Aries => ("Гладиатор", None),
            Taurus => ("Форрест Гамп", None),
            Gemini => ("Начало", None),
            Cancer => ("Жизнь прекрасна", None),
            Leo => ("Король Лев", None),
            Virgo => ("Игры разума", None),
            Libra => ("Красота по-американски", None),
            Scorpio => ("Бойцовский клуб", None),
            Sagittarius => ("В диких условиях", None),
            Capricorn => ("Волк с Уолл-стрит", None),
            Aquarius => ("Матрица", None),
            Pisces => ("Интерстеллар", None),
        },
        TaskKind::Series => match sign {
            Aries => ("Игра престолов", None),
            Taurus => ("Друзья", None),
            Gemini => ("Шерлок", None),
            Cancer => ("Во все тяжкие", None),
            Leo => ("Корона", None),
            Virgo => ("Доктор Хаус", None),
            Libra => ("Безумцы", None),
            Scorpio => ("Настоящий детектив", None),
            Sagittarius => ("Звездный путь", None),
            Capricorn => ("Карточный домик", None),
            Aquarius => ("Черное зеркало", None),
            Pisces => ("Странные дела", None),
        },
    }
}

/// Description used when a reply carries no usable description.
pub fn generic_description(sign: ZodiacSign, qualities: &str) -> String {
    format!(
        "Это произведение поможет вам развить качества знака {}: {qualities}.",
        sign.display_name()
    )
}

/// Complete draft from the static table.
pub fn fallback_draft(kind: TaskKind, sign: ZodiacSign, qualities: &str) -> TaskDraft {
    let (title, author) = fallback_title(kind, sign);
    TaskDraft {
        kind,
        title: title.to_string(),
        author: author.map(str::to_string),
        description: generic_description(sign, qualities),
    }
}
