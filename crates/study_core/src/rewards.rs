//! crates/study_core/src/rewards.rs
//!
//! Turns reported study minutes into collectibles.
//!
//! The guaranteed part (15-minute blocks, cumulative milestones, streak
//! bonuses) is a pure function of the prior record. The bonus rolls and the
//! cosmetic attributes draw from a caller-supplied random source so tests can
//! pin them down.

use crate::domain::{Collectible, Rarity, RewardState};
use crate::ports::{PortError, PortResult};
use crate::streak::advance_streak;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::f64::consts::TAU;
use tracing::debug;
use uuid::Uuid;

/// One collectible of `rarity` the first time the cumulative total reaches `minutes`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Milestone {
    pub minutes: u32,
    pub rarity: Rarity,
}

/// An independent chance of one extra collectible on long sessions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonusRoll {
    pub rarity: Rarity,
    pub chance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RewardRules {
    /// One Common per complete block of this many minutes.
    pub block_minutes: u32,
    /// Ascending by `minutes`.
    pub milestones: Vec<Milestone>,
    /// A streak that is a positive multiple of this earns a Rare.
    pub streak_rare_every: u32,
    /// A streak at or above this earns an Epic.
    pub streak_epic_from: u32,
    /// Bonus rolls only happen for sessions of at least this many minutes.
    pub bonus_min_minutes: u32,
    pub bonus_rolls: Vec<BonusRoll>,
}

impl Default for RewardRules {
    fn default() -> Self {
        Self {
            block_minutes: 15,
            milestones: vec![
                Milestone { minutes: 30, rarity: Rarity::Rare },
                Milestone { minutes: 60, rarity: Rarity::Rare },
                Milestone { minutes: 120, rarity: Rarity::Epic },
                Milestone { minutes: 180, rarity: Rarity::Epic },
                Milestone { minutes: 300, rarity: Rarity::Legendary },
                Milestone { minutes: 480, rarity: Rarity::Legendary },
                Milestone { minutes: 600, rarity: Rarity::UltraRare },
            ],
            streak_rare_every: 3,
            streak_epic_from: 7,
            bonus_min_minutes: 30,
            bonus_rolls: vec![
                BonusRoll { rarity: Rarity::Rare, chance: 0.10 },
                BonusRoll { rarity: Rarity::Epic, chance: 0.05 },
                BonusRoll { rarity: Rarity::Legendary, chance: 0.02 },
                BonusRoll { rarity: Rarity::UltraRare, chance: 0.005 },
            ],
        }
    }
}

/// Result of applying one study report.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardOutcome {
    pub state: RewardState,
    pub new_collectibles: Vec<Collectible>,
}

#[derive(Debug, Clone, Default)]
pub struct RewardCalculator {
    rules: RewardRules,
}

impl RewardCalculator {
    pub fn new(rules: RewardRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RewardRules {
        &self.rules
    }

    /// Tiers earned regardless of luck: blocks, newly crossed milestones, streak bonuses.
    ///
    /// `streak` is the already-updated streak for this report.
    pub fn guaranteed_tiers(&self, previous_total: u32, minutes: u32, streak: u32) -> Vec<Rarity> {
        let mut tiers = Vec::new();

        if self.rules.block_minutes > 0 {
            let blocks = minutes / self.rules.block_minutes;
            tiers.extend(std::iter::repeat(Rarity::Common).take(blocks as usize));
        }

        let new_total = previous_total.saturating_add(minutes);
        tiers.extend(
            self.rules
                .milestones
                .iter()
                .filter(|m| new_total >= m.minutes && previous_total < m.minutes)
                .map(|m| m.rarity),
        );

        let every = self.rules.streak_rare_every;
        if every > 0 && streak >= every && streak % every == 0 {
            tiers.push(Rarity::Rare);
        }
        if streak >= self.rules.streak_epic_from {
            tiers.push(Rarity::Epic);
        }

        tiers
    }

    /// Runs every bonus roll once if the session is long enough.
    pub fn roll_bonus_tiers<R: Rng + ?Sized>(&self, minutes: u32, rng: &mut R) -> Vec<Rarity> {
        if minutes < self.rules.bonus_min_minutes {
            return Vec::new();
        }
        self.rules
            .bonus_rolls
            .iter()
            .filter(|roll| rng.random_bool(roll.chance.clamp(0.0, 1.0)))
            .map(|roll| roll.rarity)
            .collect()
    }

    /// Applies `minutes` of study to `state` at time `now`.
    ///
    /// Fails only when `minutes` is zero; the record is untouched in that case.
    pub fn apply_study_minutes<R: Rng + ?Sized>(
        &self,
        mut state: RewardState,
        minutes: u32,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> PortResult<RewardOutcome> {
        if minutes == 0 {
            return Err(PortError::Invalid(
                "studyMinutes must be a positive number".to_string(),
            ));
        }

        let previous_total = state.total_study_time;
        state.total_study_time = previous_total.saturating_add(minutes);
        state.updated_at = now;

        state.study_streak = advance_streak(state.study_streak, state.last_study_date, now);
        state.last_study_date = Some(now);

        let mut tiers = self.guaranteed_tiers(previous_total, minutes, state.study_streak);
        tiers.extend(self.roll_bonus_tiers(minutes, rng));

        let new_collectibles: Vec<Collectible> = tiers
            .into_iter()
            .map(|rarity| mint_collectible(rarity, minutes, now, &mut *rng))
            .collect();

        state.push_collectibles(&new_collectibles);
        state.last_reward_time = Some(now);

        debug!(
            user_id = %state.user_id,
            minutes,
            streak = state.study_streak,
            earned = new_collectibles.len(),
            "Applied study minutes"
        );

        Ok(RewardOutcome {
            state,
            new_collectibles,
        })
    }
}

/// Creates a collectible with random placement. Only `rarity` carries meaning.
pub fn mint_collectible<R: Rng + ?Sized>(
    rarity: Rarity,
    earned_from_minutes: u32,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Collectible {
    Collectible {
        id: Uuid::new_v4().to_string(),
        rarity,
        x: rng.random_range(10.0..90.0),
        y: rng.random_range(20.0..80.0),
        direction: rng.random_range(0.0..TAU),
        speed: rng.random_range(0.4..1.2),
        color: rarity.color().to_string(),
        size: rarity.scale(),
        earned_at: now,
        earned_from_minutes,
    }
}
