//! Coding business rules applied to ranked candidates.
//!
//! Rules run in order:
//! 1. Only one evaluation-and-management code per encounter (the best one).
//! 2. Other codes must clear the procedure threshold.
//! 3. Within each (category, code family) group only the best code survives.

use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::models::{rank_order, CandidateMatch, ProcedureCategory};

/// Refines ranked candidates into the final code set.
#[derive(Debug, Clone, Copy)]
pub struct BusinessRules {
    procedure_threshold: f64,
}

impl BusinessRules {
    /// Create rules with the given procedure threshold.
    pub fn new(procedure_threshold: f64) -> Self {
        Self {
            procedure_threshold,
        }
    }

    /// Apply all rules. The result is sorted by [`rank_order`].
    pub fn refine(&self, candidates: Vec<CandidateMatch>) -> Vec<CandidateMatch> {
        let (evaluation, other): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(is_evaluation_candidate);

        let mut survivors = self.apply_procedure_threshold(other);
        survivors.extend(select_evaluation(evaluation));

        deduplicate_families(survivors)
    }

    /// Rule 2: keep non-E&M codes with confidence strictly above the threshold.
    pub fn apply_procedure_threshold(&self, candidates: Vec<CandidateMatch>) -> Vec<CandidateMatch> {
        candidates
            .into_iter()
            .filter(|c| c.confidence > self.procedure_threshold)
            .collect()
    }
}

fn is_evaluation_candidate(candidate: &CandidateMatch) -> bool {
    match candidate.category {
        ProcedureCategory::EvaluationAndManagement => true,
        ProcedureCategory::Procedures
        | ProcedureCategory::Radiology
        | ProcedureCategory::Laboratory
        | ProcedureCategory::Injections
        | ProcedureCategory::WoundCare => false,
    }
}

/// Rule 1: the single best E&M candidate, if any.
pub fn select_evaluation(candidates: Vec<CandidateMatch>) -> Option<CandidateMatch> {
    candidates.into_iter().min_by(rank_order)
}

/// Rule 3: keep the best candidate of each (category, family) group.
pub fn deduplicate_families(candidates: Vec<CandidateMatch>) -> Vec<CandidateMatch> {
    let mut best: BTreeMap<(ProcedureCategory, String), CandidateMatch> = BTreeMap::new();

    for candidate in candidates {
        let key = (candidate.category, candidate.family().to_string());
        match best.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
            Entry::Occupied(mut slot) => {
                if rank_order(&candidate, slot.get()) == Ordering::Less {
                    slot.insert(candidate);
                }
            }
        }
    }

    let mut refined: Vec<CandidateMatch> = best.into_values().collect();
    refined.sort_by(rank_order);
    refined
}
