//! Simplified natal chart layout.
//!
//! # Invariants
//! - The layout is a pure function of birth date and birth sign.
//! - The sun sits in the birth sign, house 1.
//! - House `n` is stored at index `n - 1`; twelve houses, consecutive signs.
//! - The generator is `ChaCha8Rng`; its stream is stable across releases.

use crate::model::reading::{ChartLayout, Planet, PlanetPosition};
use crate::model::sign::ZodiacSign;
use chrono::{Datelike, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed derived from the birth date, e.g. `1990-07-15` -> `19900715`.
pub fn chart_seed(birth_date: NaiveDate) -> u64 {
    let year = i64::from(birth_date.year());
    let seed = year * 10_000 + i64::from(birth_date.month()) * 100 + i64::from(birth_date.day());
    seed.unsigned_abs()
}

/// Rotation of the house ring for a birth date.
pub fn house_shift(birth_date: NaiveDate) -> i64 {
    let year = i64::from(birth_date.year());
    (year + i64::from(birth_date.month()) * 31 + i64::from(birth_date.day())).rem_euclid(12)
}

/// Builds the planet and house layout for a birth date and sign.
pub fn generate_layout(birth_date: NaiveDate, birth_sign: ZodiacSign) -> ChartLayout {
    let mut rng = ChaCha8Rng::seed_from_u64(chart_seed(birth_date));

    let planets = Planet::ALL
        .into_iter()
        .map(|planet| {
            let (sign, house) = match planet {
                Planet::Sun => (birth_sign, 1),
                other => {
                    let delta = match other {
                        Planet::Moon => rng.gen_range(3..=5),
                        Planet::Mercury => rng.gen_range(-1..=1),
                        Planet::Venus => rng.gen_range(-2..=2),
                        _ => rng.gen_range(0..=11),
                    };
                    (birth_sign.offset(delta), rng.gen_range(1..=12))
                }
            };
            PlanetPosition {
                planet,
                sign,
                house,
                degree: rng.gen_range(0..=29),
            }
        })
        .collect();

    let shift = house_shift(birth_date);
    let houses = (0..12).map(|house| birth_sign.offset(shift + house)).collect();

    ChartLayout { planets, houses }
}

#[cfg(test)]
mod tests {
    use super::{chart_seed, generate_layout, house_shift};
    use crate::model::reading::{Planet, PlanetPosition};
    use crate::model::sign::ZodiacSign;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn seed_concatenates_date_parts() {
        assert_eq!(chart_seed(date(1990, 7, 15)), 19_900_715);
    }

    #[test]
    fn same_inputs_give_same_layout() {
        let first = generate_layout(date(1988, 2, 29), ZodiacSign::Pisces);
        let second = generate_layout(date(1988, 2, 29), ZodiacSign::Pisces);
        assert_eq!(first, second);
    }

    #[test]
    fn layout_for_known_birth_date_is_pinned() {
        let layout = generate_layout(date(1990, 7, 15), ZodiacSign::Leo);
        let expected = [
            (Planet::Sun, ZodiacSign::Leo, 1, 2),
            (Planet::Moon, ZodiacSign::Capricorn, 6, 5),
            (Planet::Mercury, ZodiacSign::Virgo, 4, 10),
            (Planet::Venus, ZodiacSign::Libra, 3, 10),
            (Planet::Mars, ZodiacSign::Gemini, 4, 5),
            (Planet::Jupiter, ZodiacSign::Virgo, 4, 1),
            (Planet::Saturn, ZodiacSign::Virgo, 11, 18),
        ]
        .map(|(planet, sign, house, degree)| PlanetPosition {
            planet,
            sign,
            house,
            degree,
        });
        assert_eq!(layout.planets, expected);
    }

    #[test]
    fn layout_respects_planet_ranges() {
        for day in 1..=28 {
            let sign = ZodiacSign::Gemini;
            let layout = generate_layout(date(2001, 6, day), sign);
            assert_eq!(layout.planets.len(), 7);
            assert_eq!(layout.houses.len(), 12);

            let sun = layout.position_of(Planet::Sun).unwrap();
            assert_eq!(sun.sign, sign);
            assert_eq!(sun.house, 1);

            let moon = layout.position_of(Planet::Moon).unwrap().sign;
            assert!((3..=5).any(|delta| sign.offset(delta) == moon));
            let mercury = layout.position_of(Planet::Mercury).unwrap().sign;
            assert!((-1..=1).any(|delta| sign.offset(delta) == mercury));
            let venus = layout.position_of(Planet::Venus).unwrap().sign;
            assert!((-2..=2).any(|delta| sign.offset(delta) == venus));

            for position in &layout.planets {
                assert!((1..=12).contains(&position.house));
                assert!(position.degree <= 29);
            }
        }
    }

    #[test]
    fn houses_rotate_from_birth_sign() {
        let birth = date(2000, 1, 1);
        // (2000 + 31 + 1) % 12 == 4
        assert_eq!(house_shift(birth), 4);
        let layout = generate_layout(birth, ZodiacSign::Aries);
        assert_eq!(layout.houses[0], ZodiacSign::Leo);
        assert_eq!(layout.houses[11], ZodiacSign::Cancer);
    }
}
