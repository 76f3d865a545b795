//! Three-card tarot spread drawn from the major arcana.
//!
//! Draws are random with no reproducibility contract; pass a seeded `Rng`
//! to make tests deterministic.

use crate::model::reading::{SpreadPosition, TarotCard};
use rand::seq::SliceRandom;
use rand::Rng;

/// Chance that a draw comes from the question-specific preferred cards.
pub const PREFERRED_DRAW_PROBABILITY: f64 = 0.7;

/// The 22 major arcana with their short meanings.
pub const MAJOR_ARCANA: [(&str, &str); 22] = [
    ("Шут", "Новые начинания, спонтанность, свобода"),
    ("Маг", "Мастерство, сила воли, ресурсы"),
    ("Верховная Жрица", "Интуиция, тайные знания, подсознание"),
    ("Императрица", "Плодородие, изобилие, забота"),
    ("Император", "Власть, структура, контроль"),
    ("Иерофант", "Традиции, духовность, наставничество"),
    ("Влюбленные", "Выбор, любовь, партнерство"),
    ("Колесница", "Победа, контроль, движение вперед"),
    ("Сила", "Внутренняя сила, храбрость, терпение"),
    ("Отшельник", "Самопознание, уединение, мудрость"),
    ("Колесо Фортуны", "Судьба, циклы, перемены"),
    ("Справедливость", "Равновесие, истина, закон"),
    ("Повешенный", "Новая перспектива, жертва, пауза"),
    ("Смерть", "Трансформация, окончание, обновление"),
    ("Умеренность", "Баланс, гармония, модерация"),
    ("Дьявол", "Материализм, зависимость, искушение"),
    ("Башня", "Разрушение, откровение, освобождение"),
    ("Звезда", "Надежда, вдохновение, исцеление"),
    ("Луна", "Иллюзии, страхи, подсознание"),
    ("Солнце", "Радость, успех, ясность"),
    ("Суд", "Возрождение, прощение, призвание"),
    ("Мир", "Завершение, целостность, достижение"),
];

const THEMES: [(&[&str], &[&str]); 4] = [
    (
        &["любовь", "отношения", "партнер"],
        &["Влюбленные", "Императрица", "Солнце", "Звезда"],
    ),
    (
        &["работа", "карьера", "деньги", "финансы"],
        &["Император", "Колесница", "Солнце", "Колесо Фортуны"],
    ),
    (
        &["изменения", "перемены", "будущее"],
        &["Смерть", "Башня", "Колесо Фортуны", "Суд"],
    ),
    (
        &["духовность", "развитие", "познание"],
        &["Отшельник", "Верховная Жрица", "Иерофант", "Звезда"],
    ),
];

/// Cards favored for a question; the whole deck when no theme matches.
pub fn preferred_cards(question: &str) -> Vec<&'static str> {
    let lowered = question.to_lowercase();
    THEMES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map(|(_, cards)| cards.to_vec())
        .unwrap_or_else(|| MAJOR_ARCANA.iter().map(|(name, _)| *name).collect())
}

/// Meaning of a major arcana card by name.
pub fn card_meaning(name: &str) -> Option<&'static str> {
    MAJOR_ARCANA
        .iter()
        .find(|(card, _)| *card == name)
        .map(|(_, meaning)| *meaning)
}

/// Draws a past/present/future spread with no repeated cards.
pub fn draw_spread<R: Rng + ?Sized>(question: &str, rng: &mut R) -> Vec<TarotCard> {
    let mut preferred = preferred_cards(question);
    let mut available: Vec<&'static str> = MAJOR_ARCANA.iter().map(|(name, _)| *name).collect();
    let mut spread = Vec::with_capacity(SpreadPosition::ALL.len());

    for position in SpreadPosition::ALL {
        let use_preferred = !preferred.is_empty() && rng.gen_bool(PREFERRED_DRAW_PROBABILITY);
        let pool = if use_preferred { &preferred } else { &available };
        let Some(&card) = pool.choose(rng) else {
            break;
        };
        preferred.retain(|name| *name != card);
        available.retain(|name| *name != card);

        spread.push(TarotCard {
            position,
            card: card.to_string(),
            meaning: card_meaning(card).unwrap_or_default().to_string(),
        });
    }

    spread
}
