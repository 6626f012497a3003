//! Raw match records as served by the match service.
//!
//! Field names follow the service's PascalCase wire format. Every numeric
//! counter defaults to zero when missing or `null`; the analyzer never
//! rejects a record for a missing counter.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::{MapId, MatchId, ParticipantId};

/// Winning-team code the service uses for a drawn match.
pub const DRAW_CODE: i64 = 101;

/// Rating change below which a participant's delta carries no win/loss signal.
pub const DELTA_EPSILON: f64 = 0.01;

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// One side of a two-team match.
///
/// Any team code other than `1` folds to `Zero`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Team {
    Zero,
    One,
}

impl Team {
    pub fn from_code(code: i64) -> Self {
        if code == 1 {
            Team::One
        } else {
            Team::Zero
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Team::Zero => 0,
            Team::One => 1,
        }
    }

    pub fn index(&self) -> usize {
        self.code() as usize
    }

    pub fn opponent(&self) -> Self {
        match self {
            Team::Zero => Team::One,
            Team::One => Team::Zero,
        }
    }
}

impl From<i64> for Team {
    fn from(code: i64) -> Self {
        Team::from_code(code)
    }
}

impl From<Team> for i64 {
    fn from(team: Team) -> Self {
        team.code()
    }
}

/// Resolved winner of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinningTeam {
    Team0,
    Team1,
    Draw,
}

impl WinningTeam {
    /// Decode a declared winner. Unknown codes decode to `None` and are
    /// treated the same as an undeclared winner.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(WinningTeam::Team0),
            1 => Some(WinningTeam::Team1),
            DRAW_CODE => Some(WinningTeam::Draw),
            _ => None,
        }
    }

    /// The winning team, or `None` for a draw.
    pub fn team(&self) -> Option<Team> {
        match self {
            WinningTeam::Team0 => Some(Team::Zero),
            WinningTeam::Team1 => Some(Team::One),
            WinningTeam::Draw => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self, WinningTeam::Draw)
    }
}

/// Per-participant cumulative counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Counters {
    #[serde(deserialize_with = "null_as_zero")]
    pub damage_dealt: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub damage_received: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub destruction_score: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub losses_score: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub objectives_captured: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub supply_captured: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub supply_points_consumed: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub supply_points_consumed_from_allies: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub supply_points_consumed_by_allies: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub total_spawned_unit_score: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub total_refunded_unit_score: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub total_self_damage_dealt: f64,
}

/// One controlled unit's cumulative stats within a match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UnitRecord {
    /// Unit type; absent or `0` when the service did not identify the unit.
    pub id: Option<u32>,
    #[serde(deserialize_with = "null_as_zero")]
    pub total_damage_dealt: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub total_damage_received: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub killed_count: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub building_destroyed_count: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub total_self_damage_dealt: f64,
}

/// One player's record within a match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ParticipantRaw {
    pub id: Option<ParticipantId>,

    /// Absent for participants whose identity the service did not resolve.
    pub name: Option<String>,

    pub team_id: Option<i64>,

    pub old_rating: Option<f64>,

    pub new_rating: Option<f64>,

    pub level: Option<u32>,

    /// Destruction/losses ratio precomputed by the service.
    #[serde(rename = "DLRatio")]
    pub dl_ratio: Option<f64>,

    #[serde(flatten)]
    pub counters: Counters,

    pub unit_data: Option<BTreeMap<String, UnitRecord>>,
}

impl UnitRecord {
    /// The identified unit type, if any.
    pub fn unit_type(&self) -> Option<u32> {
        self.id.filter(|&id| id != 0)
    }
}

impl ParticipantRaw {
    /// True when both ratings are present.
    pub fn has_ratings(&self) -> bool {
        self.old_rating.is_some() && self.new_rating.is_some()
    }

    /// Rating change for this match; zero unless both ratings are present.
    pub fn rating_delta(&self) -> f64 {
        match (self.old_rating, self.new_rating) {
            (Some(old), Some(new)) => new - old,
            _ => 0.0,
        }
    }

    /// Rating change when both ratings are present.
    pub fn rating_gain(&self) -> Option<f64> {
        self.has_ratings().then(|| self.rating_delta())
    }

    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }

    /// True when the rating moved by more than the no-signal band.
    pub fn has_rating_signal(&self) -> bool {
        self.rating_delta().abs() > DELTA_EPSILON
    }
}

/// One played game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MatchRecord {
    pub end_match_reason: Option<i64>,

    /// Seconds since the Unix epoch.
    pub end_time: Option<i64>,

    #[serde(rename = "TotalPlayTimeInSec")]
    pub duration_secs: Option<i64>,

    pub map_id: Option<MapId>,

    /// Declared winner: `0`, `1` or `101` (draw). Absent when undeclared.
    pub winner_team: Option<i64>,

    /// Participants keyed by participant id.
    #[serde(rename = "Data")]
    pub participants: Option<BTreeMap<String, ParticipantRaw>>,
}

impl MatchRecord {
    pub fn participant_count(&self) -> usize {
        self.participants.as_ref().map_or(0, |p| p.len())
    }

    /// Look up a participant by id, checking both the map key and the
    /// participant's own `Id` field.
    pub fn participant(&self, id: &ParticipantId) -> Option<&ParticipantRaw> {
        let participants = self.participants.as_ref()?;
        participants.get(id.as_str()).or_else(|| {
            participants
                .values()
                .find(|p| p.id.as_ref() == Some(id))
        })
    }

    /// True when at least one participant's rating moved.
    pub fn has_rating_signal(&self) -> bool {
        self.participants
            .as_ref()
            .is_some_and(|p| p.values().any(ParticipantRaw::has_rating_signal))
    }
}

/// A match record paired with its identifier, as handed over by retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEntry {
    pub id: MatchId,
    pub data: MatchRecord,
}
