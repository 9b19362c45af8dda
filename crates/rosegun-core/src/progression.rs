//! Progression ledger.
//!
//! Everything here derives from one monotonic counter: the number of
//! completed focus sessions. Rank and experience are a redundant base-2
//! "pip" encoding of that counter; memories and rank titles are pure lookups
//! against it. Nothing in this module ever decrements the counter.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Memory};

/// Rank and half-rank experience pip.
///
/// Serialized as `{"rank": <int>, "experience": 0 | 0.5}`. An experience of
/// exactly 1 is accepted on read and rolled into the next rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProgress", into = "RawProgress")]
pub struct UserProgress {
    rank: u32,
    half_step: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawProgress {
    #[serde(alias = "level")]
    rank: u32,
    #[serde(alias = "exp")]
    experience: f64,
}

/// Outcome of a single [`UserProgress::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    pub before: UserProgress,
    pub after: UserProgress,
}

impl Advance {
    /// Whether this advance crossed into a new rank.
    pub fn ranked_up(&self) -> bool {
        self.after.rank > self.before.rank
    }
}

impl Default for UserProgress {
    fn default() -> Self {
        Self {
            rank: 1,
            half_step: false,
        }
    }
}

impl UserProgress {
    /// Decode a focus-session count into rank and pip.
    pub fn from_focus_sessions(count: u64) -> Self {
        let rank = (count / 2).saturating_add(1);
        Self {
            rank: u32::try_from(rank).unwrap_or(u32::MAX),
            half_step: count % 2 == 1,
        }
    }

    pub fn rank(&self) -> u32 {
        self.rank
    }

    /// Experience within the current rank: 0.0 or 0.5.
    pub fn experience(&self) -> f64 {
        if self.half_step {
            0.5
        } else {
            0.0
        }
    }

    /// `(rank - 1) * 2 + pip`.
    pub fn focus_sessions(&self) -> u64 {
        u64::from(self.rank - 1) * 2 + u64::from(self.half_step)
    }

    /// Record one completed focus session.
    pub fn advance(&mut self) -> Advance {
        let before = *self;
        if self.half_step {
            self.rank = self.rank.saturating_add(1);
            self.half_step = false;
        } else {
            self.half_step = true;
        }
        Advance {
            before,
            after: *self,
        }
    }
}

impl TryFrom<RawProgress> for UserProgress {
    type Error = String;

    fn try_from(raw: RawProgress) -> Result<Self, Self::Error> {
        if raw.rank < 1 {
            return Err(format!("rank must be at least 1, got {}", raw.rank));
        }
        if raw.experience == 0.0 {
            Ok(Self {
                rank: raw.rank,
                half_step: false,
            })
        } else if raw.experience == 0.5 {
            Ok(Self {
                rank: raw.rank,
                half_step: true,
            })
        } else if raw.experience == 1.0 {
            Ok(Self {
                rank: raw.rank.saturating_add(1),
                half_step: false,
            })
        } else {
            Err(format!(
                "experience must be 0, 0.5 or 1, got {}",
                raw.experience
            ))
        }
    }
}

impl From<UserProgress> for RawProgress {
    fn from(progress: UserProgress) -> Self {
        Self {
            rank: progress.rank,
            experience: progress.experience(),
        }
    }
}

pub fn is_memory_unlocked(memory: &Memory, focus_sessions: u64) -> bool {
    focus_sessions >= memory.unlock_threshold
}

pub fn unlocked_memories(catalog: &Catalog, focus_sessions: u64) -> impl Iterator<Item = &Memory> {
    catalog
        .memories()
        .iter()
        .filter(move |m| is_memory_unlocked(m, focus_sessions))
}

/// The lowest-threshold locked memory and how many sessions it still needs.
pub fn next_memory(catalog: &Catalog, focus_sessions: u64) -> Option<(&Memory, u64)> {
    catalog
        .memories()
        .iter()
        .filter(|m| !is_memory_unlocked(m, focus_sessions))
        .min_by_key(|m| m.unlock_threshold)
        .map(|m| (m, m.unlock_threshold - focus_sessions))
}

/// Title for a focus-session count, clamped to the last catalog entry.
pub fn rank_title(catalog: &Catalog, focus_sessions: u64) -> &'static str {
    let titles = catalog.rank_titles();
    let last = titles.len().saturating_sub(1);
    let index = usize::try_from(focus_sessions).unwrap_or(usize::MAX).min(last);
    titles.get(index).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn progress(rank: u32, experience: f64) -> UserProgress {
        UserProgress::try_from(RawProgress { rank, experience }).unwrap()
    }

    #[test]
    fn default_is_rank_one_no_pip() {
        let p = UserProgress::default();
        assert_eq!(p.rank(), 1);
        assert_eq!(p.experience(), 0.0);
        assert_eq!(p.focus_sessions(), 0);
    }

    #[test]
    fn first_advance_adds_a_pip() {
        let mut p = UserProgress::default();
        let adv = p.advance();
        assert!(!adv.ranked_up());
        assert_eq!(p, progress(1, 0.5));
    }

    #[test]
    fn rank_up_boundary() {
        let mut p = progress(1, 0.5);
        let adv = p.advance();
        assert!(adv.ranked_up());
        assert_eq!(p.rank(), 2);
        assert_eq!(p.experience(), 0.0);
    }

    #[test]
    fn experience_of_one_rolls_over_on_read() {
        let p: UserProgress = serde_json::from_str(r#"{"rank":3,"experience":1}"#).unwrap();
        assert_eq!(p, progress(4, 0.0));
    }

    #[test]
    fn legacy_field_names_are_accepted() {
        let p: UserProgress = serde_json::from_str(r#"{"level":2,"exp":0.5}"#).unwrap();
        assert_eq!(p.focus_sessions(), 3);
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(serde_json::from_str::<UserProgress>(r#"{"rank":0,"experience":0}"#).is_err());
        assert!(serde_json::from_str::<UserProgress>(r#"{"rank":1,"experience":0.25}"#).is_err());
        assert!(serde_json::from_str::<UserProgress>(r#"{"rank":1}"#).is_err());
    }

    #[test]
    fn serializes_with_canonical_names() {
        let json = serde_json::to_string(&progress(2, 0.5)).unwrap();
        assert_eq!(json, r#"{"rank":2,"experience":0.5}"#);
    }

    #[test]
    fn from_focus_sessions_inverts_count() {
        for n in 0..50u64 {
            assert_eq!(UserProgress::from_focus_sessions(n).focus_sessions(), n);
        }
    }

    #[test]
    fn memory_unlock_boundary() {
        let catalog = Catalog::builtin();
        for memory in catalog.memories() {
            if memory.unlock_threshold == 0 {
                continue;
            }
            assert!(!is_memory_unlocked(memory, memory.unlock_threshold - 1));
            assert!(is_memory_unlocked(memory, memory.unlock_threshold));
        }
    }

    #[test]
    fn next_memory_reports_sessions_remaining() {
        let catalog = Catalog::builtin();
        let (memory, remaining) = next_memory(&catalog, 0).unwrap();
        assert_eq!(remaining, memory.unlock_threshold);
        assert!(remaining > 0);
    }

    #[test]
    fn rank_title_clamps_to_last_entry() {
        let catalog = Catalog::builtin();
        let last = *catalog.rank_titles().last().unwrap();
        assert_eq!(rank_title(&catalog, 0), catalog.rank_titles()[0]);
        assert_eq!(rank_title(&catalog, 10_000), last);
    }

    mod props {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn advance_is_monotonic(start in 0u64..10_000, steps in 0usize..64) {
                let mut p = UserProgress::from_focus_sessions(start);
                let mut last = p.focus_sessions();
                for _ in 0..steps {
                    p.advance();
                    prop_assert_eq!(p.focus_sessions(), last + 1);
                    last = p.focus_sessions();
                }
                prop_assert_eq!(p.focus_sessions(), start + steps as u64);
            }

            #[test]
            fn experience_never_reaches_one(start in 0u64..10_000) {
                let mut p = UserProgress::from_focus_sessions(start);
                p.advance();
                prop_assert!(p.experience() == 0.0 || p.experience() == 0.5);
                prop_assert!(p.rank() >= 1);
            }
        }
    }
}
