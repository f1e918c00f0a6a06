//! Elo rating calculation.
//!
//! The engine computes the logistic expectation between two participants and
//! applies a zero-sum update to the [`ParticipantStore`] after each completed
//! match. A K-factor of 32 is the default.

use crate::game_runner::MatchResult;
use crate::participant::{Participant, ParticipantError, ParticipantStore};
use serde::Serialize;

/// Default K-factor (maximum rating swing per game).
pub const K_FACTOR: f64 = 32.0;

/// Expected score of `a` against `b`, in `[0, 1]`.
pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10_f64.powf((rating_b - rating_a) / 400.0))
}

/// A rating change that was applied to the store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingChange {
    pub first: usize,
    pub second: usize,
    /// Points gained by `first` and lost by `second`.
    pub delta: f64,
    pub first_before: f64,
    pub second_before: f64,
}

/// Elo engine with a per-instance K-factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EloEngine {
    k: f64,
}

impl Default for EloEngine {
    fn default() -> Self {
        Self::new(K_FACTOR)
    }
}

impl EloEngine {
    pub fn new(k: f64) -> Self {
        Self { k }
    }

    pub fn k_factor(&self) -> f64 {
        self.k
    }

    /// Expected score of `a` against `b`.
    pub fn expected(&self, a: &Participant, b: &Participant) -> f64 {
        expected_score(a.rating(), b.rating())
    }

    /// Rating points `a` would gain (negative: lose) for scoring `score_a` against `b`.
    pub fn delta(&self, a: &Participant, b: &Participant, score_a: f64) -> f64 {
        self.k * (score_a - self.expected(a, b))
    }

    /// Applies the outcome of a completed match between `first` and `second`.
    ///
    /// `result` is from `first`'s perspective. When the computed delta is
    /// exactly zero the store is left untouched and `None` is returned;
    /// otherwise both ratings move by the same magnitude in opposite
    /// directions and the applied change is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ParticipantError`] if either index is not in the store.
    pub fn apply(
        &self,
        store: &mut ParticipantStore,
        first: usize,
        second: usize,
        result: MatchResult,
    ) -> Result<Option<RatingChange>, ParticipantError> {
        let (delta, first_before, second_before) = {
            let a = store.get(first)?;
            let b = store.get(second)?;
            (self.delta(a, b, result.score()), a.rating(), b.rating())
        };

        if delta == 0.0 {
            tracing::debug!(first, second, "no rating change");
            return Ok(None);
        }

        store.apply_rating_delta(first, second, delta)?;
        tracing::debug!(
            first,
            second,
            delta,
            first_after = first_before + delta,
            second_after = second_before - delta,
            "ratings updated"
        );

        Ok(Some(RatingChange {
            first,
            second,
            delta,
            first_before,
            second_before,
        }))
    }
}
