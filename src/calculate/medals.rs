//! Per-team superlative medals.

use crate::models::{Medal, MedalKind, RosterEntry};

/// Award every medal kind to the team members holding its maximum.
///
/// A kind is skipped when nobody on the team has a positive value. Ties
/// all receive the medal.
pub fn assign_medals(team: &mut [RosterEntry]) {
    for kind in MedalKind::ALL {
        let max = team
            .iter()
            .map(|p| kind.value(&p.counters))
            .fold(0.0, f64::max);
        if max <= 0.0 {
            continue;
        }

        for entry in team.iter_mut() {
            if kind.value(&entry.counters) == max {
                entry.medals.push(Medal::new(kind, max));
            }
        }
    }
}
