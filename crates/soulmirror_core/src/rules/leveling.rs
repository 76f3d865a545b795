//! Sign experience accrual, level-ups and inner-sign drift.
//!
//! # Responsibility
//! - Convert experience deltas into per-sign level-ups.
//! - Decide when the inner sign must move to the dominant sign.
//!
//! # Invariants
//! - After `add_sign_experience`, stored experience is below `XP_PER_LEVEL`.
//! - Sign levels never decrease.
//! - Dominance ties resolve to the earliest sign in canonical order.
//! - The inner sign only changes when the level gap reaches
//!   `SIGN_CHANGE_THRESHOLD`.

use crate::model::profile::{ZodiacProfile, SIGN_CHANGE_THRESHOLD, XP_PER_LEVEL};
use crate::model::sign::ZodiacSign;

/// Outcome of adding experience to one sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUpResult {
    pub sign: ZodiacSign,
    /// Remaining experience toward the next level.
    pub current_experience: u32,
    pub new_level: u32,
    /// Zero when no level was gained.
    pub levels_gained: u32,
}

/// Result of the inner-sign dominance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignChangeCheck {
    pub should_change: bool,
    /// Set only when `should_change` is true.
    pub candidate: Option<ZodiacSign>,
}

/// Per-sign summary for progress displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignStat {
    pub sign: ZodiacSign,
    pub level: u32,
    pub experience: u32,
    pub progress_percent: u32,
    pub is_current: bool,
}

/// Adds `amount` experience to `sign`, carrying overflow into levels.
///
/// Several levels may be gained in one call.
pub fn add_sign_experience(
    profile: &mut ZodiacProfile,
    sign: ZodiacSign,
    amount: u32,
) -> LevelUpResult {
    let accumulated = u64::from(profile.sign_experience(sign)) + u64::from(amount);
    let per_level = u64::from(XP_PER_LEVEL);
    let levels_gained = u32::try_from(accumulated / per_level).unwrap_or(u32::MAX);
    // Remainder is below XP_PER_LEVEL, so it always fits.
    let current_experience = (accumulated % per_level) as u32;
    let new_level = profile.sign_level(sign).saturating_add(levels_gained);

    profile.sign_experience.insert(sign, current_experience);
    profile.sign_levels.insert(sign, new_level);

    LevelUpResult {
        sign,
        current_experience,
        new_level,
        levels_gained,
    }
}

/// Sign with the highest level; ties go to the first sign in canonical order.
pub fn dominant_sign(profile: &ZodiacProfile) -> ZodiacSign {
    let mut best = ZodiacSign::ALL[0];
    let mut best_level = profile.sign_level(best);
    for sign in ZodiacSign::ALL.into_iter().skip(1) {
        let level = profile.sign_level(sign);
        if level > best_level {
            best = sign;
            best_level = level;
        }
    }
    best
}

/// Checks whether the inner sign should move to the dominant sign.
pub fn check_sign_change(profile: &ZodiacProfile) -> SignChangeCheck {
    let dominant = dominant_sign(profile);
    if dominant != profile.inner_sign {
        let gap = profile
            .sign_level(dominant)
            .saturating_sub(profile.sign_level(profile.inner_sign));
        if gap >= SIGN_CHANGE_THRESHOLD {
            return SignChangeCheck {
                should_change: true,
                candidate: Some(dominant),
            };
        }
    }
    SignChangeCheck {
        should_change: false,
        candidate: None,
    }
}

/// Runs `check_sign_change` and applies the move. Returns the new inner sign.
pub fn apply_sign_change(profile: &mut ZodiacProfile) -> Option<ZodiacSign> {
    let check = check_sign_change(profile);
    match check.candidate {
        Some(candidate) if check.should_change => {
            profile.inner_sign = candidate;
            Some(candidate)
        }
        _ => None,
    }
}

/// Per-sign stats sorted by level, then experience, highest first.
pub fn sign_stats(profile: &ZodiacProfile) -> Vec<SignStat> {
    let mut stats: Vec<SignStat> = ZodiacSign::ALL
        .into_iter()
        .map(|sign| {
            let experience = profile.sign_experience(sign);
            SignStat {
                sign,
                level: profile.sign_level(sign),
                experience,
                progress_percent: experience * 100 / XP_PER_LEVEL,
                is_current: profile.inner_sign == sign,
            }
        })
        .collect();
    stats.sort_by(|a, b| (b.level, b.experience).cmp(&(a.level, a.experience)));
    stats
}

#[cfg(test)]
mod tests {
    use super::{
        add_sign_experience, apply_sign_change, check_sign_change, dominant_sign, sign_stats,
    };
    use crate::model::profile::{ZodiacProfile, XP_PER_LEVEL};
    use crate::model::sign::ZodiacSign;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use uuid::Uuid;

    fn profile(inner: ZodiacSign) -> ZodiacProfile {
        ZodiacProfile::new(Uuid::new_v4(), inner, Some(inner))
    }

    #[test]
    fn multi_level_jump_keeps_remainder() {
        let mut profile = profile(ZodiacSign::Aries);
        let result = add_sign_experience(&mut profile, ZodiacSign::Aries, 1_250);
        assert_eq!(result.new_level, 3);
        assert_eq!(result.current_experience, 250);
        assert_eq!(result.levels_gained, 2);
        assert_eq!(profile.sign_level(ZodiacSign::Aries), 3);
        assert_eq!(profile.sign_experience(ZodiacSign::Aries), 250);
    }

    #[test]
    fn zero_amount_changes_nothing_but_materializes_entries() {
        let mut profile = profile(ZodiacSign::Leo);
        let result = add_sign_experience(&mut profile, ZodiacSign::Leo, 0);
        assert_eq!(result.levels_gained, 0);
        assert_eq!(result.new_level, 1);
        assert_eq!(result.current_experience, 0);
    }

    #[test]
    fn exact_boundary_levels_up_with_zero_remainder() {
        let mut profile = profile(ZodiacSign::Leo);
        add_sign_experience(&mut profile, ZodiacSign::Leo, 499);
        let result = add_sign_experience(&mut profile, ZodiacSign::Leo, 1);
        assert_eq!(result.levels_gained, 1);
        assert_eq!(result.current_experience, 0);
    }

    #[test]
    fn random_accrual_preserves_bounds_and_monotonic_levels() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut profile = profile(ZodiacSign::Virgo);
        for _ in 0..2_000 {
            let sign = ZodiacSign::ALL[rng.gen_range(0..12)];
            let before = profile.sign_level(sign);
            let amount = rng.gen_range(0..2_000);
            let result = add_sign_experience(&mut profile, sign, amount);
            assert!(result.current_experience < XP_PER_LEVEL);
            assert!(result.new_level >= before);
            assert_eq!(result.new_level - before, result.levels_gained);
            assert!(profile.validate().is_ok());
        }
    }

    #[test]
    fn dominant_ties_resolve_in_canonical_order() {
        let mut profile = profile(ZodiacSign::Pisces);
        profile.sign_levels.insert(ZodiacSign::Scorpio, 4);
        profile.sign_levels.insert(ZodiacSign::Taurus, 4);
        assert_eq!(dominant_sign(&profile), ZodiacSign::Taurus);

        let flat = self::profile(ZodiacSign::Leo);
        assert_eq!(dominant_sign(&flat), ZodiacSign::Aries);
    }

    #[test]
    fn sign_change_requires_threshold_gap() {
        let mut profile = profile(ZodiacSign::Leo);
        profile.sign_levels.insert(ZodiacSign::Leo, 2);
        profile.sign_levels.insert(ZodiacSign::Capricorn, 4);
        let check = check_sign_change(&profile);
        assert!(!check.should_change);
        assert_eq!(check.candidate, None);

        profile.sign_levels.insert(ZodiacSign::Capricorn, 5);
        let check = check_sign_change(&profile);
        assert!(check.should_change);
        assert_eq!(check.candidate, Some(ZodiacSign::Capricorn));
    }

    #[test]
    fn no_change_when_inner_sign_is_dominant_or_tied() {
        let mut profile = profile(ZodiacSign::Leo);
        profile.sign_levels.insert(ZodiacSign::Leo, 9);
        assert!(!check_sign_change(&profile).should_change);

        profile.sign_levels.insert(ZodiacSign::Aries, 9);
        // Aries wins the tie but the gap is zero.
        assert!(!check_sign_change(&profile).should_change);
    }

    #[test]
    fn check_never_fires_below_threshold_for_random_layouts() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1_000 {
            let inner = ZodiacSign::ALL[rng.gen_range(0..12)];
            let mut profile = profile(inner);
            for sign in ZodiacSign::ALL {
                profile.sign_levels.insert(sign, rng.gen_range(1..8));
            }
            let check = check_sign_change(&profile);
            let dominant = dominant_sign(&profile);
            let gap = profile.sign_level(dominant) as i64 - profile.sign_level(inner) as i64;
            if gap < 3 {
                assert!(!check.should_change);
            } else {
                assert_eq!(check.candidate, Some(dominant));
            }
        }
    }

    #[test]
    fn apply_sign_change_mutates_inner_sign_only_on_change() {
        let mut profile = profile(ZodiacSign::Gemini);
        assert_eq!(apply_sign_change(&mut profile), None);
        assert_eq!(profile.inner_sign, ZodiacSign::Gemini);

        profile.sign_levels.insert(ZodiacSign::Libra, 4);
        assert_eq!(apply_sign_change(&mut profile), Some(ZodiacSign::Libra));
        assert_eq!(profile.inner_sign, ZodiacSign::Libra);
    }

    #[test]
    fn stats_are_sorted_by_level_then_experience() {
        let mut profile = profile(ZodiacSign::Cancer);
        add_sign_experience(&mut profile, ZodiacSign::Cancer, 700);
        add_sign_experience(&mut profile, ZodiacSign::Aquarius, 600);
        add_sign_experience(&mut profile, ZodiacSign::Gemini, 250);

        let stats = sign_stats(&profile);
        assert_eq!(stats.len(), 12);
        assert_eq!(stats[0].sign, ZodiacSign::Cancer);
        assert_eq!(stats[0].progress_percent, 40);
        assert!(stats[0].is_current);
        assert_eq!(stats[1].sign, ZodiacSign::Aquarius);
        assert_eq!(stats[2].sign, ZodiacSign::Gemini);
        assert_eq!(stats[3].sign, ZodiacSign::Aries);
    }
}
