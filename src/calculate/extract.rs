//! Per-participant metric extraction.

use std::collections::BTreeMap;

use crate::models::{
    DerivedMetrics, FavoriteUnit, FavoriteUnits, MatchEntry, ParticipantId, TeamTotals,
    UnitRecord,
};

use super::resolver::ResolvedParticipant;
use super::safe_divide;

/// Summed unit stats of one unit type.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct UnitTypeTotals {
    damage_dealt: f64,
    kills: f64,
    damage_received: f64,
}

/// Unit-level aggregates for one participant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitSummary {
    pub buildings_destroyed: f64,
    pub self_damage: f64,
    pub unique_types: usize,
    pub favorites: FavoriteUnits,
}

fn accumulate_units<'a>(
    units: impl IntoIterator<Item = &'a UnitRecord>,
    by_type: &mut BTreeMap<u32, UnitTypeTotals>,
) {
    for unit in units {
        let Some(unit_type) = unit.unit_type() else {
            continue;
        };
        let totals = by_type.entry(unit_type).or_default();
        totals.damage_dealt += unit.total_damage_dealt;
        totals.kills += unit.killed_count;
        totals.damage_received += unit.total_damage_received;
    }
}

/// Pick the type with the largest value along each axis.
///
/// Types are visited in ascending id order and only a strictly larger
/// value replaces the current pick, so ties go to the lowest type id.
fn pick_favorites(by_type: &BTreeMap<u32, UnitTypeTotals>) -> FavoriteUnits {
    fn best(
        by_type: &BTreeMap<u32, UnitTypeTotals>,
        axis: impl Fn(&UnitTypeTotals) -> f64,
    ) -> Option<FavoriteUnit> {
        let mut best: Option<FavoriteUnit> = None;
        for (&unit_type, totals) in by_type {
            let value = axis(totals);
            if best.as_ref().map_or(true, |b| value > b.value) {
                best = Some(FavoriteUnit::new(unit_type, value));
            }
        }
        best
    }

    FavoriteUnits {
        damage: best(by_type, |t| t.damage_dealt),
        kills: best(by_type, |t| t.kills),
        tank: best(by_type, |t| t.damage_received),
    }
}

/// Aggregate a participant's unit records.
///
/// Buildings destroyed and self-damage are summed over every unit
/// instance; damage, kills and damage received are summed per type to
/// find the favourites. Units without a type are skipped.
pub fn unit_summary(units: Option<&BTreeMap<String, UnitRecord>>) -> UnitSummary {
    let Some(units) = units else {
        return UnitSummary::default();
    };

    let mut summary = UnitSummary::default();
    for unit in units.values().filter(|u| u.unit_type().is_some()) {
        summary.buildings_destroyed += unit.building_destroyed_count;
        summary.self_damage += unit.total_self_damage_dealt;
    }

    let mut by_type = BTreeMap::new();
    accumulate_units(units.values(), &mut by_type);
    summary.unique_types = by_type.len();
    summary.favorites = pick_favorites(&by_type);
    summary
}

/// Team totals indexed by team, before flooring.
pub fn team_totals(participants: &[ResolvedParticipant<'_>]) -> [TeamTotals; 2] {
    let mut totals = [TeamTotals::default(); 2];
    for p in participants {
        let t = &mut totals[p.team.index()];
        let c = &p.raw.counters;
        t.damage_dealt += c.damage_dealt;
        t.destruction += c.destruction_score;
        t.losses += c.losses_score;
        t.spawned += c.total_spawned_unit_score;
    }
    totals
}

/// Derive every metric for one participant given its team's totals.
pub fn derive_metrics(
    participant: &ResolvedParticipant<'_>,
    team: &TeamTotals,
) -> DerivedMetrics {
    let team = team.floored();
    let raw = participant.raw;
    let c = &raw.counters;
    let units = unit_summary(raw.unit_data.as_ref());

    let net_investment = (c.total_spawned_unit_score - c.total_refunded_unit_score).max(1.0);
    let team_losses_share = safe_divide(c.losses_score, team.losses, 0.0);
    let damage_trade = safe_divide(c.damage_dealt, c.damage_received.max(1.0), 0.0);
    let dl_ratio = match raw.dl_ratio {
        Some(ratio) if ratio != 0.0 => ratio,
        _ => safe_divide(c.destruction_score, c.losses_score.max(1.0), 0.0),
    };
    let self_damage = if raw.unit_data.is_some() {
        units.self_damage
    } else {
        c.total_self_damage_dealt
    };

    DerivedMetrics {
        participant_id: participant.id.clone(),
        team: participant.team,

        team_damage_share: safe_divide(c.damage_dealt, team.damage_dealt, 0.0),
        team_destruction_share: safe_divide(c.destruction_score, team.destruction, 0.0),
        team_losses_share,

        dl_ratio,
        survival_rate: (1.0 - safe_divide(c.losses_score, net_investment, 0.0)).max(0.0),
        damage_trade,
        cost_efficiency: safe_divide(c.destruction_score, net_investment, 0.0),
        tank_efficiency: team_losses_share * damage_trade,

        refund_rate: safe_divide(
            c.total_refunded_unit_score,
            c.total_spawned_unit_score.max(1.0),
            0.0,
        ),
        total_refunded: c.total_refunded_unit_score,

        unique_units: units.unique_types as f64,
        supply_from_allies: c.supply_points_consumed_from_allies,
        supply_to_allies: c.supply_points_consumed_by_allies,

        objectives_captured: c.objectives_captured,
        supply_captured: c.supply_captured,
        buildings_destroyed: units.buildings_destroyed,

        damage_dealt: c.damage_dealt,
        destruction_score: c.destruction_score,
        firepower_roi: safe_divide(c.damage_dealt, net_investment, 0.0),

        net_investment,
        damage_received: c.damage_received,
        self_damage,
        favorite_units: units.favorites,
    }
}

/// Metrics for every participant of a match, in participant order.
pub fn extract_match(participants: &[ResolvedParticipant<'_>]) -> Vec<DerivedMetrics> {
    let totals = team_totals(participants);
    participants
        .iter()
        .map(|p| derive_metrics(p, &totals[p.team.index()]))
        .collect()
}

/// The target's favourite units summed across a whole batch.
///
/// `None` when the target fielded no identified unit in any match.
pub fn career_favorite_units(
    batch: &[MatchEntry],
    target: &ParticipantId,
) -> Option<FavoriteUnits> {
    let mut by_type = BTreeMap::new();
    for entry in batch {
        let units = entry
            .data
            .participant(target)
            .and_then(|p| p.unit_data.as_ref());
        if let Some(units) = units {
            accumulate_units(units.values(), &mut by_type);
        }
    }

    if by_type.is_empty() {
        None
    } else {
        Some(pick_favorites(&by_type))
    }
}
