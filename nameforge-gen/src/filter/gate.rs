//! Batch-level uniqueness gate
//!
//! Tracks names accepted within one batch. A candidate is refused when its
//! normalized form was already accepted, or when it shares too many
//! significant word stems with any single accepted name.

use super::stemmer::{significant_words, stem};
use crate::normalizer::normalize_name;
use crate::params::FilterParams;
use std::collections::HashSet;
use std::fmt;

/// Why the gate refused a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateRejection {
    DuplicateName,
    Overlap {
        with: String,
        shared: usize,
        limit: usize,
    },
}

impl fmt::Display for GateRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateRejection::DuplicateName => write!(f, "duplicate name"),
            GateRejection::Overlap { with, shared, limit } => {
                write!(f, "shares {} of {} allowed stems with '{}'", shared, limit, with)
            }
        }
    }
}

#[derive(Debug, Clone)]
struct AcceptedName {
    display: String,
    stems: HashSet<String>,
}

#[derive(Debug, Clone)]
pub struct BatchGate {
    names: HashSet<String>,
    accepted: Vec<AcceptedName>,
    overlap_ratio: f64,
    overlap_cap: usize,
    min_len: usize,
}

impl BatchGate {
    pub fn new(overlap_ratio: f64, overlap_cap: usize, min_len: usize) -> Self {
        Self {
            names: HashSet::new(),
            accepted: Vec::new(),
            overlap_ratio: overlap_ratio.clamp(0.0, 1.0),
            overlap_cap: overlap_cap.max(1),
            min_len,
        }
    }

    pub fn from_params(params: &FilterParams) -> Self {
        Self::new(params.overlap_ratio, params.overlap_cap, params.significant_min_len)
    }

    /// Shared stems at which a name with `significant` words is refused
    pub fn overlap_limit(&self, significant: usize) -> usize {
        let by_ratio = (self.overlap_ratio * significant as f64).ceil() as usize;
        self.overlap_cap.min(by_ratio.max(1))
    }

    pub fn stems_of(&self, name: &str) -> HashSet<String> {
        significant_words(name, self.min_len)
            .iter()
            .map(|w| stem(w))
            .collect()
    }

    pub fn check(&self, name: &str) -> Option<GateRejection> {
        if self.names.contains(&normalize_name(name)) {
            return Some(GateRejection::DuplicateName);
        }

        let stems = self.stems_of(name);
        // Names with no significant words are judged only on exact match
        if stems.is_empty() {
            return None;
        }

        let limit = self.overlap_limit(stems.len());
        self.accepted.iter().find_map(|other| {
            let shared = stems.intersection(&other.stems).count();
            (shared >= limit).then(|| GateRejection::Overlap {
                with: other.display.clone(),
                shared,
                limit,
            })
        })
    }

    /// Record a name without checking it
    pub fn admit(&mut self, name: &str) {
        self.names.insert(normalize_name(name));
        self.accepted.push(AcceptedName {
            display: name.to_string(),
            stems: self.stems_of(name),
        });
    }

    /// Check and, when clear, record
    pub fn try_admit(&mut self, name: &str) -> Result<(), GateRejection> {
        match self.check(name) {
            Some(rejection) => Err(rejection),
            None => {
                self.admit(name);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// Distinct stems across every accepted name
    pub fn stem_count(&self) -> usize {
        self.accepted
            .iter()
            .flat_map(|a| a.stems.iter())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn clear(&mut self) {
        self.names.clear();
        self.accepted.clear();
    }
}

impl Default for BatchGate {
    fn default() -> Self {
        Self::from_params(&FilterParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_limit() {
        let gate = BatchGate::default();
        assert_eq!(gate.overlap_limit(1), 1);
        assert_eq!(gate.overlap_limit(2), 2);
        assert_eq!(gate.overlap_limit(3), 2);
        assert_eq!(gate.overlap_limit(5), 2);
    }

    #[test]
    fn test_duplicate_ignores_case_and_article() {
        let mut gate = BatchGate::default();
        gate.try_admit("The Velvet Wolves").unwrap();
        assert_eq!(gate.check("velvet wolves"), Some(GateRejection::DuplicateName));
    }

    #[test]
    fn test_overlap_uses_stems() {
        let mut gate = BatchGate::default();
        gate.try_admit("Burning Velvet Horizons").unwrap();

        // "burned" and "horizon" stem onto accepted words
        assert!(matches!(
            gate.check("Burned Glass Horizon"),
            Some(GateRejection::Overlap { shared: 2, limit: 2, .. })
        ));
        assert!(gate.check("Velvet Thunder Parade").is_none());
    }

    #[test]
    fn test_names_without_significant_words_pass() {
        let mut gate = BatchGate::default();
        gate.try_admit("Red Sun").unwrap();
        assert!(gate.check("Red Sky").is_none());
        assert_eq!(gate.check("red sun"), Some(GateRejection::DuplicateName));
    }

    #[test]
    fn test_clear_resets() {
        let mut gate = BatchGate::default();
        gate.try_admit("Silent Harbor").unwrap();
        assert_eq!(gate.len(), 1);
        assert_eq!(gate.stem_count(), 2);
        gate.clear();
        assert!(gate.is_empty());
        assert!(gate.check("Silent Harbor").is_none());
    }
}
