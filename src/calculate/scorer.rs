//! Category scores and the match-level Win Contribution Score.

use crate::config::{LevelThreshold, WcsWeights};
use crate::models::{Category, CategoryBreakdown, DerivedMetrics, Outcome, WcsLevel};

use super::percentile::{mean_percentile, percentile, NEUTRAL_PERCENTILE};

/// Sub-metrics that make up a category, in a fixed order.
pub fn category_inputs(category: Category, m: &DerivedMetrics) -> Vec<f64> {
    match category {
        Category::Battlefield => vec![
            m.team_damage_share,
            m.team_destruction_share,
            m.team_losses_share,
        ],
        Category::Combat => vec![
            m.survival_rate,
            m.tank_efficiency,
            m.cost_efficiency,
            m.dl_ratio,
            m.damage_trade,
        ],
        Category::Economy => vec![m.refund_rate, m.total_refunded],
        Category::Teamwork => vec![m.unique_units, m.supply_from_allies, m.supply_to_allies],
        Category::Strategy => vec![m.objectives_captured, m.supply_captured, m.buildings_destroyed],
        Category::Firepower => vec![m.destruction_score, m.firepower_roi, m.damage_dealt],
    }
}

/// Score one category as the mean percentile of its sub-metrics, each
/// ranked against the whole match population.
pub fn category_score(
    category: Category,
    target: &DerivedMetrics,
    population: &[DerivedMetrics],
) -> f64 {
    let rows: Vec<Vec<f64>> = population
        .iter()
        .map(|m| category_inputs(category, m))
        .collect();

    let percentiles: Vec<f64> = category_inputs(category, target)
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            let column: Vec<f64> = rows.iter().map(|row| row[i]).collect();
            percentile(value, &column)
        })
        .collect();
    mean_percentile(&percentiles)
}

/// All six category scores for `target` against the match population.
pub fn category_scores(
    target: &DerivedMetrics,
    population: &[DerivedMetrics],
) -> CategoryBreakdown {
    let mut scores = CategoryBreakdown::uniform(NEUTRAL_PERCENTILE);
    for category in Category::ALL {
        *scores.get_mut(category) = category_score(category, target, population);
    }
    scores
}

/// 100 for a win, 50 for a draw, 0 for a loss.
pub fn win_bonus(outcome: Outcome) -> f64 {
    match outcome {
        Outcome::Win => 100.0,
        Outcome::Draw => 50.0,
        Outcome::Loss => 0.0,
    }
}

/// Weighted category sum plus the weighted win bonus. Not clamped.
pub fn match_wcs(scores: &CategoryBreakdown, outcome: Outcome, weights: &WcsWeights) -> f64 {
    scores
        .iter()
        .map(|(category, score)| weights.category(category) * score)
        .sum::<f64>()
        + weights.win_bonus * win_bonus(outcome)
}

/// Category scores and WCS for one match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchScore {
    pub breakdown: CategoryBreakdown,
    pub wcs: f64,
}

impl MatchScore {
    /// Scores used when the target is not in the match.
    pub fn neutral() -> Self {
        Self {
            breakdown: CategoryBreakdown::uniform(NEUTRAL_PERCENTILE),
            wcs: NEUTRAL_PERCENTILE,
        }
    }
}

/// Score the target within its match, or neutral defaults when absent.
pub fn score_match(
    target: Option<&DerivedMetrics>,
    population: &[DerivedMetrics],
    outcome: Outcome,
    weights: &WcsWeights,
) -> MatchScore {
    match target {
        Some(target) => {
            let breakdown = category_scores(target, population);
            MatchScore {
                wcs: match_wcs(&breakdown, outcome, weights),
                breakdown,
            }
        }
        None => MatchScore::neutral(),
    }
}

/// First level whose threshold `wcs` meets, else the lowest listed level.
pub fn level_for(wcs: f64, levels: &[LevelThreshold]) -> WcsLevel {
    levels
        .iter()
        .find(|l| wcs >= l.min)
        .or(levels.last())
        .map_or(WcsLevel::Poor, |l| l.level)
}
