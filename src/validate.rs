//! Consistency checks between a hold map and the routes that reference it.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::config::CheckConfig;
use crate::error::{HoldRole, Warning};
use crate::ir::{HoldMap, Route};

#[derive(Debug, Clone, Default, Serialize)]
pub struct HoldReport {
    /// Route references to ids the map does not define, one per route and id.
    pub unresolved: Vec<Warning>,
    /// Expected wall ids that have no coordinates yet.
    pub unmapped: Vec<String>,
}

impl HoldReport {
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty() && self.unmapped.is_empty()
    }

    /// Distinct hold ids referenced by routes but missing from the map.
    pub fn unresolved_ids(&self) -> BTreeSet<String> {
        self.unresolved
            .iter()
            .filter_map(|warning| match warning {
                Warning::MissingHoldReference { hold_id, .. } => Some(HoldMap::normalize_id(hold_id)),
                _ => None,
            })
            .collect()
    }
}

pub fn check_holds(holds: &HoldMap, routes: &[Route], config: &CheckConfig) -> HoldReport {
    let report = HoldReport {
        unresolved: unresolved_references(holds, routes),
        unmapped: unmapped_hold_ids(holds, config),
    };
    tracing::debug!(
        unresolved = report.unresolved.len(),
        unmapped = report.unmapped.len(),
        "hold check finished"
    );
    report
}

pub fn unresolved_references(holds: &HoldMap, routes: &[Route]) -> Vec<Warning> {
    let mut out = Vec::new();
    for route in routes {
        let mut seen = BTreeSet::new();
        let refs = route
            .moves
            .iter()
            .map(|mv| (mv.hold_id.as_str(), HoldRole::Move))
            .chain(route.foot.iter().map(|id| (id.as_str(), HoldRole::Foot)));
        for (hold_id, role) in refs {
            if holds.contains(hold_id) || !seen.insert(HoldMap::normalize_id(hold_id)) {
                continue;
            }
            out.push(Warning::MissingHoldReference {
                route: route.name.clone(),
                hold_id: hold_id.to_string(),
                role,
            });
        }
    }
    out
}

/// Ids every wall is expected to carry: `1..=numeric_ids`, then `a..=z` when
/// letter ids are enabled.
pub fn expected_hold_ids(config: &CheckConfig) -> Vec<String> {
    let mut ids: Vec<String> = (1..=config.numeric_ids).map(|n| n.to_string()).collect();
    if config.letter_ids {
        ids.extend(('a'..='z').map(String::from));
    }
    ids
}

/// Expected ids with no coordinates, letters first and numbers in numeric
/// order.
pub fn unmapped_hold_ids(holds: &HoldMap, config: &CheckConfig) -> Vec<String> {
    let mut missing: Vec<String> = expected_hold_ids(config)
        .into_iter()
        .filter(|id| !holds.contains(id))
        .collect();
    missing.sort_by_key(|id| match id.parse::<u64>() {
        Ok(n) => (1, n, String::new()),
        Err(_) => (0, 0, id.clone()),
    });
    missing
}
