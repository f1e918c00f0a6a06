//! Tournament participants and the store that owns their ratings.
//!
//! Every competitor is created once, at tournament start, and lives for the
//! whole run. A participant's `idx` is its position in the
//! [`ParticipantStore`] and never changes. Ratings are private to this module:
//! the only write path is [`ParticipantStore::apply_rating_delta`], which the
//! Elo engine drives after a completed match.

use serde::Serialize;
use thiserror::Error;

/// Rating assigned to every participant at creation.
pub const DEFAULT_RATING: f64 = 1000.0;

/// Errors raised by participant lookups and pairing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParticipantError {
    /// The index does not address a participant in the store.
    #[error("participant index {idx} out of range (store holds {len})")]
    OutOfRange { idx: usize, len: usize },
    /// The opponent handle does not name a participant of this store.
    #[error("index {0} does not name a participant")]
    NotAParticipant(usize),
    /// A participant cannot be its own competitor.
    #[error("participant {0} cannot compete against itself")]
    SelfPairing(usize),
}

/// A single competitor.
#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    /// Unique identity, also used to construct the participant's move provider.
    pub name: String,
    /// Stable position in the store.
    pub idx: usize,
    rating: f64,
    /// Cumulative score. Declared for reporting; the rating path never writes it.
    pub score: f64,
    /// Games counter. Declared for reporting; the rating path never writes it.
    pub games_played: u32,
    #[serde(skip)]
    current_competitor: Option<usize>,
}

impl Participant {
    /// Creates a participant with the default rating and an empty record.
    pub fn new(name: impl Into<String>, idx: usize) -> Self {
        Self {
            name: name.into(),
            idx,
            rating: DEFAULT_RATING,
            score: 0.0,
            games_played: 0,
            current_competitor: None,
        }
    }

    /// Current Elo rating.
    pub fn rating(&self) -> f64 {
        self.rating
    }

    /// Index of the opponent in the match currently being played, if any.
    pub fn current_competitor(&self) -> Option<usize> {
        self.current_competitor
    }
}

/// Owns all participants of one tournament, indexed by `idx`.
#[derive(Debug, Clone, Default)]
pub struct ParticipantStore {
    participants: Vec<Participant>,
}

impl ParticipantStore {
    /// Builds a store from an ordered list of identities; the i-th name gets `idx == i`.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let participants = names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| Participant::new(name, idx))
            .collect();
        Self { participants }
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Looks up a participant.
    ///
    /// # Errors
    ///
    /// Returns [`ParticipantError::OutOfRange`] if `idx` is not a valid index.
    pub fn get(&self, idx: usize) -> Result<&Participant, ParticipantError> {
        self.participants
            .get(idx)
            .ok_or(ParticipantError::OutOfRange {
                idx,
                len: self.participants.len(),
            })
    }

    /// Iterates participants in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    /// Identities in index order.
    pub fn names(&self) -> Vec<String> {
        self.participants.iter().map(|p| p.name.clone()).collect()
    }

    /// Records `other` as the current competitor of `idx`.
    ///
    /// The association is transient: callers clear it with
    /// [`clear_current_competitor`](Self::clear_current_competitor) when the
    /// match ends.
    ///
    /// # Errors
    ///
    /// Returns [`ParticipantError::OutOfRange`] if `idx` is invalid,
    /// [`ParticipantError::NotAParticipant`] if `other` is not in the store, and
    /// [`ParticipantError::SelfPairing`] if both indices are equal.
    pub fn set_current_competitor(
        &mut self,
        idx: usize,
        other: usize,
    ) -> Result<(), ParticipantError> {
        if other >= self.participants.len() {
            return Err(ParticipantError::NotAParticipant(other));
        }
        if idx == other {
            return Err(ParticipantError::SelfPairing(idx));
        }
        let len = self.participants.len();
        let participant = self
            .participants
            .get_mut(idx)
            .ok_or(ParticipantError::OutOfRange { idx, len })?;
        participant.current_competitor = Some(other);
        Ok(())
    }

    /// Drops the transient opponent association of `idx`. Unknown indices are ignored.
    pub fn clear_current_competitor(&mut self, idx: usize) {
        if let Some(participant) = self.participants.get_mut(idx) {
            participant.current_competitor = None;
        }
    }

    /// Applies a zero-sum rating change: `first` gains `delta`, `second` loses it.
    ///
    /// Both indices are validated before either rating is touched, so the
    /// update is all-or-nothing.
    pub(crate) fn apply_rating_delta(
        &mut self,
        first: usize,
        second: usize,
        delta: f64,
    ) -> Result<(), ParticipantError> {
        self.get(first)?;
        self.get(second)?;
        if first == second {
            return Err(ParticipantError::SelfPairing(first));
        }
        self.participants[first].rating += delta;
        self.participants[second].rating -= delta;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn set_rating(&mut self, idx: usize, rating: f64) {
        self.participants[idx].rating = rating;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_participant_defaults() {
        let p = Participant::new("alpha", 3);
        assert_eq!(p.name, "alpha");
        assert_eq!(p.idx, 3);
        assert_eq!(p.rating(), 1000.0);
        assert_eq!(p.score, 0.0);
        assert_eq!(p.games_played, 0);
        assert!(p.current_competitor().is_none());
    }

    #[test]
    fn test_store_assigns_positional_indices() {
        let store = ParticipantStore::from_names(["a", "b", "c"]);
        assert_eq!(store.len(), 3);
        for (i, p) in store.iter().enumerate() {
            assert_eq!(p.idx, i);
        }
        assert_eq!(store.get(1).unwrap().name, "b");
    }

    #[test]
    fn test_get_out_of_range() {
        let store = ParticipantStore::from_names(["a", "b"]);
        assert_eq!(
            store.get(2).unwrap_err(),
            ParticipantError::OutOfRange { idx: 2, len: 2 }
        );
    }

    #[test]
    fn test_empty_store() {
        let store = ParticipantStore::from_names(Vec::<String>::new());
        assert!(store.is_empty());
        assert!(store.get(0).is_err());
    }

    #[test]
    fn test_set_and_clear_current_competitor() {
        let mut store = ParticipantStore::from_names(["a", "b"]);
        store.set_current_competitor(0, 1).unwrap();
        assert_eq!(store.get(0).unwrap().current_competitor(), Some(1));

        store.clear_current_competitor(0);
        assert!(store.get(0).unwrap().current_competitor().is_none());
    }

    #[test]
    fn test_set_current_competitor_rejects_non_participant() {
        let mut store = ParticipantStore::from_names(["a", "b"]);
        assert_eq!(
            store.set_current_competitor(0, 7),
            Err(ParticipantError::NotAParticipant(7))
        );
        assert!(store.get(0).unwrap().current_competitor().is_none());
    }

    #[test]
    fn test_set_current_competitor_rejects_self() {
        let mut store = ParticipantStore::from_names(["a", "b"]);
        assert_eq!(
            store.set_current_competitor(1, 1),
            Err(ParticipantError::SelfPairing(1))
        );
    }

    #[test]
    fn test_apply_rating_delta_is_zero_sum() {
        let mut store = ParticipantStore::from_names(["a", "b"]);
        store.apply_rating_delta(0, 1, 12.5).unwrap();
        assert_eq!(store.get(0).unwrap().rating(), 1012.5);
        assert_eq!(store.get(1).unwrap().rating(), 987.5);
    }

    #[test]
    fn test_apply_rating_delta_invalid_index_leaves_ratings() {
        let mut store = ParticipantStore::from_names(["a", "b"]);
        assert!(store.apply_rating_delta(0, 5, 10.0).is_err());
        assert_eq!(store.get(0).unwrap().rating(), DEFAULT_RATING);
    }
}
