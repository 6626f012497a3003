//! Per-participant metrics derived from a single match.

use serde::{Deserialize, Serialize};

use super::{ParticipantId, Team};

/// The unit type holding the largest summed value along one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteUnit {
    pub unit_type: u32,
    pub value: f64,
    /// Display name, when a unit-name lookup was available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl FavoriteUnit {
    pub fn new(unit_type: u32, value: f64) -> Self {
        Self {
            unit_type,
            value,
            name: None,
        }
    }

    /// Name to show for this unit, falling back to `Unit {id}`.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Unit {}", self.unit_type))
    }
}

/// Favourite units along the damage, kills and tanking axes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FavoriteUnits {
    pub damage: Option<FavoriteUnit>,
    pub kills: Option<FavoriteUnit>,
    pub tank: Option<FavoriteUnit>,
}

impl FavoriteUnits {
    pub fn is_empty(&self) -> bool {
        self.damage.is_none() && self.kills.is_none() && self.tank.is_none()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FavoriteUnit> {
        [&mut self.damage, &mut self.kills, &mut self.tank]
            .into_iter()
            .flatten()
    }
}

/// Team-wide sums used as share denominators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamTotals {
    pub damage_dealt: f64,
    pub destruction: f64,
    pub losses: f64,
    pub spawned: f64,
}

impl TeamTotals {
    /// Every total floored at 1 so shares never divide by zero.
    pub fn floored(&self) -> Self {
        Self {
            damage_dealt: self.damage_dealt.max(1.0),
            destruction: self.destruction.max(1.0),
            losses: self.losses.max(1.0),
            spawned: self.spawned.max(1.0),
        }
    }
}

/// Raw and ratio metrics for one participant in one match.
///
/// Recomputed on every analysis; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub participant_id: ParticipantId,
    pub team: Team,

    // Battlefield: shares of the team's totals
    pub team_damage_share: f64,
    pub team_destruction_share: f64,
    pub team_losses_share: f64,

    // Combat efficiency
    pub dl_ratio: f64,
    pub survival_rate: f64,
    pub damage_trade: f64,
    pub cost_efficiency: f64,
    /// Team losses share × damage trade.
    pub tank_efficiency: f64,

    // Economy
    pub refund_rate: f64,
    pub total_refunded: f64,

    // Teamwork
    pub unique_units: f64,
    pub supply_from_allies: f64,
    pub supply_to_allies: f64,

    // Strategy
    pub objectives_captured: f64,
    pub supply_captured: f64,
    pub buildings_destroyed: f64,

    // Firepower
    pub damage_dealt: f64,
    pub destruction_score: f64,
    /// Damage dealt per point of net investment.
    pub firepower_roi: f64,

    /// Spawned minus refunded unit score, floored at 1.
    pub net_investment: f64,
    pub damage_received: f64,
    pub self_damage: f64,
    pub favorite_units: FavoriteUnits,
}

impl DerivedMetrics {
    /// Mean of the three team-share metrics.
    pub fn mean_team_share(&self) -> f64 {
        (self.team_damage_share + self.team_destruction_share + self.team_losses_share) / 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_totals_floored() {
        let totals = TeamTotals {
            damage_dealt: 0.0,
            destruction: 250.0,
            losses: 0.4,
            spawned: 1200.0,
        };
        let floored = totals.floored();

        assert_eq!(floored.damage_dealt, 1.0);
        assert_eq!(floored.destruction, 250.0);
        assert_eq!(floored.losses, 1.0);
        assert_eq!(floored.spawned, 1200.0);
    }

    #[test]
    fn test_favorite_unit_display_name() {
        let mut unit = FavoriteUnit::new(301, 900.0);
        assert_eq!(unit.display_name(), "Unit 301");

        unit.name = Some("Leopard 2A4".to_string());
        assert_eq!(unit.display_name(), "Leopard 2A4");
    }

    #[test]
    fn test_favorite_units_empty() {
        let mut units = FavoriteUnits::default();
        assert!(units.is_empty());

        units.kills = Some(FavoriteUnit::new(12, 4.0));
        assert!(!units.is_empty());
        assert_eq!(units.iter_mut().count(), 1);
    }
}
