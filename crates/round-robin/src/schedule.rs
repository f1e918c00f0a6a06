//! Round-robin match scheduling.
//!
//! A [`Schedule`] lists every unordered pair of participants exactly once per
//! cycle, in a deterministic order that depends only on the participant
//! count. Pairs are enumerated lexicographically by index, so the same input
//! ordering always yields the same sequence and a position in the sequence can
//! be used to resume a partially executed run.

use serde::Serialize;

/// One scheduled game between two participant indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Pairing {
    /// Index of the participant who moves first (white).
    pub first: usize,
    /// Index of the participant who moves second (black).
    pub second: usize,
    /// Zero-based cycle this pairing belongs to.
    pub cycle: u32,
}

impl Pairing {
    /// Returns `true` if `idx` plays in this pairing.
    pub fn involves(&self, idx: usize) -> bool {
        self.first == idx || self.second == idx
    }

    /// The pair as `(low, high)` regardless of colors.
    pub fn unordered(&self) -> (usize, usize) {
        (self.first.min(self.second), self.first.max(self.second))
    }
}

/// The full, ordered list of pairings for a tournament.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    pairings: Vec<Pairing>,
}

impl Schedule {
    /// Builds a round-robin over `participants` competitors repeated `cycles` times.
    ///
    /// Fewer than two participants (or zero cycles) produce an empty schedule.
    /// Colors are swapped on every odd cycle so repeated cycles balance who
    /// moves first.
    pub fn round_robin(participants: usize, cycles: u32) -> Self {
        let mut pairings = Vec::new();
        if participants < 2 {
            return Self { pairings };
        }
        for cycle in 0..cycles {
            for first in 0..participants {
                for second in (first + 1)..participants {
                    let pairing = if cycle % 2 == 0 {
                        Pairing { first, second, cycle }
                    } else {
                        Pairing {
                            first: second,
                            second: first,
                            cycle,
                        }
                    };
                    pairings.push(pairing);
                }
            }
        }
        Self { pairings }
    }

    pub fn len(&self) -> usize {
        self.pairings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairings.is_empty()
    }

    pub fn pairings(&self) -> &[Pairing] {
        &self.pairings
    }

    /// Pairings from schedule position `start` onwards, with their positions.
    pub fn iter_from(&self, start: usize) -> impl Iterator<Item = (usize, &Pairing)> {
        self.pairings.iter().enumerate().skip(start)
    }

    /// Partitions the pairings from `start` into participant-disjoint rounds.
    ///
    /// Each pairing goes into the earliest round that does not already involve
    /// either of its participants (first-fit). Rounds keep schedule order
    /// internally, and every round can be played concurrently.
    pub fn rounds_from(&self, start: usize) -> Vec<Vec<(usize, Pairing)>> {
        let mut rounds: Vec<Vec<(usize, Pairing)>> = Vec::new();

        for (pos, pairing) in self.iter_from(start) {
            let slot = rounds.iter().position(|round| {
                round
                    .iter()
                    .all(|(_, p)| !p.involves(pairing.first) && !p.involves(pairing.second))
            });
            match slot {
                Some(r) => rounds[r].push((pos, *pairing)),
                None => rounds.push(vec![(pos, *pairing)]),
            }
        }
        rounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_four_participants_single_cycle() {
        let schedule = Schedule::round_robin(4, 1);
        assert_eq!(schedule.len(), 6);

        let pairs: Vec<(usize, usize)> = schedule
            .pairings()
            .iter()
            .map(|p| (p.first, p.second))
            .collect();
        assert_eq!(
            pairs,
            vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]
        );
    }

    #[test]
    fn test_fewer_than_two_is_empty() {
        assert!(Schedule::round_robin(0, 1).is_empty());
        assert!(Schedule::round_robin(1, 3).is_empty());
    }

    #[test]
    fn test_second_cycle_swaps_colors() {
        let schedule = Schedule::round_robin(3, 2);
        assert_eq!(schedule.len(), 6);
        let second = &schedule.pairings()[3];
        assert_eq!((second.first, second.second, second.cycle), (1, 0, 1));
    }

    #[test]
    fn test_iter_from_skips_played_positions() {
        let schedule = Schedule::round_robin(4, 1);
        let remaining: Vec<usize> = schedule.iter_from(4).map(|(pos, _)| pos).collect();
        assert_eq!(remaining, vec![4, 5]);
    }

    #[test]
    fn test_rounds_for_four_participants() {
        let schedule = Schedule::round_robin(4, 1);
        let rounds = schedule.rounds_from(0);
        assert_eq!(rounds.len(), 3);
        assert!(rounds.iter().all(|round| round.len() == 2));
        let first: Vec<usize> = rounds[0].iter().map(|(pos, _)| *pos).collect();
        assert_eq!(first, vec![0, 5]);
    }

    #[test]
    fn test_rounds_from_resume_position() {
        let schedule = Schedule::round_robin(4, 1);
        let rounds = schedule.rounds_from(3);
        let positions: Vec<usize> = rounds.iter().flatten().map(|(pos, _)| *pos).collect();
        assert_eq!(positions.len(), 3);
        assert!(positions.iter().all(|&pos| pos >= 3));
    }

    proptest! {
        #[test]
        fn prop_single_cycle_covers_every_pair_once(n in 0usize..24) {
            let schedule = Schedule::round_robin(n, 1);
            let expected = if n < 2 { 0 } else { n * (n - 1) / 2 };
            prop_assert_eq!(schedule.len(), expected);

            let mut seen = HashSet::new();
            for p in schedule.pairings() {
                prop_assert_ne!(p.first, p.second);
                prop_assert!(p.first < n && p.second < n);
                prop_assert!(seen.insert(p.unordered()));
            }
        }

        #[test]
        fn prop_schedule_is_deterministic(n in 0usize..16, cycles in 1u32..4) {
            prop_assert_eq!(
                Schedule::round_robin(n, cycles),
                Schedule::round_robin(n, cycles)
            );
        }

        #[test]
        fn prop_rounds_are_participant_disjoint(n in 2usize..14, cycles in 1u32..3) {
            let schedule = Schedule::round_robin(n, cycles);
            let rounds = schedule.rounds_from(0);
            let mut positions = Vec::new();
            for round in &rounds {
                let mut busy = HashSet::new();
                for (pos, p) in round {
                    prop_assert!(busy.insert(p.first));
                    prop_assert!(busy.insert(p.second));
                    positions.push(*pos);
                }
            }
            positions.sort_unstable();
            prop_assert_eq!(positions, (0..schedule.len()).collect::<Vec<_>>());
        }
    }
}
