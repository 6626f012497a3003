//! Team and outcome resolution.
//!
//! Rating deltas are the ground truth here: they are near zero-sum within
//! a match and track the result far more reliably than the service's team
//! and winner labels, which are sometimes missing.

use std::collections::BTreeMap;

use tracing::warn;

use crate::models::{Outcome, ParticipantId, ParticipantRaw, Team, WinningTeam, DELTA_EPSILON};

/// A participant with its team settled.
#[derive(Debug, Clone)]
pub struct ResolvedParticipant<'a> {
    pub id: ParticipantId,
    pub raw: &'a ParticipantRaw,
    pub team: Team,
    pub team_inferred: bool,
}

/// Sums and counts of rating deltas of named participants per team.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TeamDeltas {
    sums: [f64; 2],
    counts: [usize; 2],
}

impl TeamDeltas {
    /// Collect deltas of named participants that declare a team.
    pub fn from_named(participants: &BTreeMap<String, ParticipantRaw>) -> Self {
        let mut deltas = Self::default();
        for p in participants.values().filter(|p| p.is_named()) {
            if let Some(code) = p.team_id {
                deltas.add(Team::from_code(code), p.rating_delta());
            }
        }
        deltas
    }

    pub fn add(&mut self, team: Team, delta: f64) {
        self.sums[team.index()] += delta;
        self.counts[team.index()] += 1;
    }

    /// Average delta of a team; zero when it has no named members.
    pub fn average(&self, team: Team) -> f64 {
        let i = team.index();
        if self.counts[i] > 0 {
            self.sums[i] / self.counts[i] as f64
        } else {
            0.0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts == [0, 0]
    }
}

/// Team for a participant with no team label.
///
/// Picks the team whose average delta is closer to the participant's own
/// (team 0 on a tie). With no named participants at all, a non-negative
/// delta means team 1.
pub fn infer_team(delta: f64, deltas: &TeamDeltas) -> Team {
    if deltas.is_empty() {
        return if delta >= 0.0 { Team::One } else { Team::Zero };
    }

    let to_one = (delta - deltas.average(Team::One)).abs();
    let to_zero = (delta - deltas.average(Team::Zero)).abs();
    if to_one < to_zero {
        Team::One
    } else {
        Team::Zero
    }
}

/// Settle every participant's team. Declared codes are folded to {0, 1};
/// missing ones are inferred.
pub fn resolve_teams(
    participants: &BTreeMap<String, ParticipantRaw>,
) -> Vec<ResolvedParticipant<'_>> {
    let deltas = TeamDeltas::from_named(participants);

    participants
        .iter()
        .map(|(key, raw)| {
            let id = raw.id.clone().unwrap_or_else(|| ParticipantId::from(key.as_str()));
            let (team, team_inferred) = match raw.team_id {
                Some(code) => (Team::from_code(code), false),
                None => {
                    let team = infer_team(raw.rating_delta(), &deltas);
                    warn!(participant = %id, ?team, "Inferred missing team");
                    (team, true)
                }
            };
            ResolvedParticipant {
                id,
                raw,
                team,
                team_inferred,
            }
        })
        .collect()
}

/// Winner from summed rating deltas of participants with both ratings.
///
/// Never yields a draw; equal totals go to team 1.
pub fn infer_winner(participants: &[ResolvedParticipant<'_>]) -> WinningTeam {
    let mut totals = [0.0f64; 2];
    for p in participants.iter().filter(|p| p.raw.has_ratings()) {
        totals[p.team.index()] += p.raw.rating_delta();
    }

    if totals[0] > totals[1] {
        WinningTeam::Team0
    } else {
        WinningTeam::Team1
    }
}

/// Use the declared winner when it is a known code, otherwise infer it.
/// The flag is true when the winner was inferred.
pub fn resolve_winner(
    declared: Option<i64>,
    participants: &[ResolvedParticipant<'_>],
) -> (WinningTeam, bool) {
    match declared {
        Some(code) => match WinningTeam::from_code(code) {
            Some(winner) => (winner, false),
            None => {
                warn!(code, "Unknown winning-team code, inferring winner");
                (infer_winner(participants), true)
            }
        },
        None => {
            warn!("No winning team declared, inferring winner");
            (infer_winner(participants), true)
        }
    }
}

/// A participant's result.
///
/// The participant's own rating delta decides first; only inside the
/// no-signal band does the team/winner comparison apply.
pub fn participant_outcome(delta: f64, team: Team, winner: WinningTeam) -> Outcome {
    if delta > DELTA_EPSILON {
        return Outcome::Win;
    }
    if delta < -DELTA_EPSILON {
        return Outcome::Loss;
    }

    match winner.team() {
        None => Outcome::Draw,
        Some(winning) if winning == team => Outcome::Win,
        Some(_) => Outcome::Loss,
    }
}

/// A match with teams and winner settled.
#[derive(Debug, Clone)]
pub struct ResolvedMatch<'a> {
    pub participants: Vec<ResolvedParticipant<'a>>,
    pub winner: WinningTeam,
    pub winner_inferred: bool,
}

impl<'a> ResolvedMatch<'a> {
    pub fn find(&self, id: &ParticipantId) -> Option<&ResolvedParticipant<'a>> {
        self.participants.iter().find(|p| &p.id == id)
    }
}

/// Resolve teams, then the winner.
pub fn resolve_match(
    participants: &BTreeMap<String, ParticipantRaw>,
    declared_winner: Option<i64>,
) -> ResolvedMatch<'_> {
    let participants = resolve_teams(participants);
    let (winner, winner_inferred) = resolve_winner(declared_winner, &participants);
    ResolvedMatch {
        participants,
        winner,
        winner_inferred,
    }
}
