//! Per-match display rosters.

use crate::models::{DerivedMetrics, ParticipantId, RosterEntry, Team};

use super::medals::assign_medals;
use super::resolver::{ResolvedMatch, ResolvedParticipant};
use super::safe_divide;

const UNKNOWN_NAME: &str = "Unknown";

/// Match-wide maxima used for the percentage bars, each floored at 1.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Maxima {
    destruction: f64,
    losses: f64,
    objectives: f64,
}

impl Maxima {
    fn of(participants: &[ResolvedParticipant<'_>]) -> Self {
        let mut maxima = Self {
            destruction: 1.0,
            losses: 1.0,
            objectives: 1.0,
        };
        for p in participants {
            let c = &p.raw.counters;
            maxima.destruction = maxima.destruction.max(c.destruction_score);
            maxima.losses = maxima.losses.max(c.losses_score);
            maxima.objectives = maxima.objectives.max(c.objectives_captured);
        }
        maxima
    }
}

fn roster_entry(
    participant: &ResolvedParticipant<'_>,
    metrics: Option<&DerivedMetrics>,
    maxima: &Maxima,
    target: &ParticipantId,
) -> RosterEntry {
    let raw = participant.raw;
    let c = &raw.counters;
    let destruction = c.destruction_score;
    let losses = c.losses_score;
    let objectives = c.objectives_captured;

    RosterEntry {
        id: participant.id.clone(),
        name: raw.name.clone().unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        team: participant.team,
        is_target: &participant.id == target,
        level: raw.level,
        rating: raw.new_rating,
        rating_gain: raw.rating_gain(),
        destruction_pct: destruction / maxima.destruction * 100.0,
        losses_pct: losses / maxima.losses * 100.0,
        objectives_pct: objectives / maxima.objectives * 100.0,
        kd: safe_divide(destruction, losses.max(1.0), 0.0),
        score: (destruction - losses) / 1000.0 + objectives,
        counters: c.clone(),
        medals: Vec::new(),
        favorite_units: metrics.map(|m| m.favorite_units.clone()).unwrap_or_default(),
        self_damage: metrics.map_or(0.0, |m| m.self_damage),
    }
}

/// Ally and enemy rosters for one match, sorted by score with medals
/// awarded per team.
///
/// `metrics` must be in the same order as the match's participants.
pub fn build_rosters(
    resolved: &ResolvedMatch<'_>,
    metrics: &[DerivedMetrics],
    target: &ParticipantId,
    target_team: Team,
) -> (Vec<RosterEntry>, Vec<RosterEntry>) {
    let maxima = Maxima::of(&resolved.participants);

    let (mut ally, mut enemy): (Vec<_>, Vec<_>) = resolved
        .participants
        .iter()
        .enumerate()
        .map(|(i, p)| roster_entry(p, metrics.get(i), &maxima, target))
        .partition(|entry| entry.team == target_team);

    for team in [&mut ally, &mut enemy] {
        team.sort_by(|a, b| b.score.total_cmp(&a.score));
        assign_medals(team);
    }
    (ally, enemy)
}
