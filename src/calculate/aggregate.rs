//! Cross-match aggregation: averages, win rate, trend, style ratios and
//! medal frequencies.

use crate::config::ScoringConfig;
use crate::models::{
    CategoryBreakdown, DerivedMetrics, MedalKind, Outcome, PlaystyleProfile, Trend, WcsLevel,
};

use super::playstyle;
use super::scorer::{level_for, MatchScore};
use super::{mean, safe_divide};

/// Medals kept in the report summary.
pub const TOP_MEDAL_COUNT: usize = 2;

/// The target's value over the match mean. A non-positive mean divides
/// by 1 instead.
pub fn relative_ratio(value: f64, population_mean: f64) -> f64 {
    let denominator = if population_mean > 0.0 {
        population_mean
    } else {
        1.0
    };
    value / denominator
}

fn population_mean(population: &[DerivedMetrics], f: fn(&DerivedMetrics) -> f64) -> f64 {
    let values: Vec<f64> = population.iter().map(f).collect();
    mean(&values)
}

/// Per-category ratio of the target's representative metric to the
/// match average.
///
/// Battlefield uses the mean of the three team shares and falls back to a
/// ratio of 1 when the match average is zero.
pub fn style_ratios(target: &DerivedMetrics, population: &[DerivedMetrics]) -> CategoryBreakdown {
    let ratio = |f: fn(&DerivedMetrics) -> f64| {
        relative_ratio(f(target), population_mean(population, f))
    };

    CategoryBreakdown {
        battlefield: safe_divide(
            target.mean_team_share(),
            population_mean(population, DerivedMetrics::mean_team_share),
            1.0,
        ),
        combat: ratio(|m| m.dl_ratio),
        economy: ratio(|m| m.refund_rate),
        teamwork: ratio(|m| m.unique_units),
        strategy: ratio(|m| m.objectives_captured),
        firepower: ratio(|m| m.damage_dealt),
    }
}

/// Wins over total as a whole percentage.
pub fn win_rate_percent(wins: u32, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(wins) / total as f64 * 100.0).round() as u32
}

/// Compare the mean WCS of the first `window` matches with the rest.
///
/// Batches no longer than the window have nothing to compare against and
/// are steady.
pub fn trend(wcs: &[f64], window: usize, margin: f64) -> Trend {
    if wcs.len() <= window {
        return Trend::Steady;
    }

    let (recent, older) = wcs.split_at(window);
    let (recent, older) = (mean(recent), mean(older));
    if recent > older + margin {
        Trend::Rising
    } else if recent < older - margin {
        Trend::Falling
    } else {
        Trend::Steady
    }
}

/// The most frequent medals, most frequent first.
///
/// Equal counts keep the order in which the medals were first earned.
pub fn top_medals(earned: &[MedalKind], limit: usize) -> Vec<MedalKind> {
    let mut counts: Vec<(MedalKind, u32)> = Vec::new();
    for &kind in earned {
        match counts.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, count)) => *count += 1,
            None => counts.push((kind, 1)),
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(limit).map(|(kind, _)| kind).collect()
}

/// Aggregate figures for a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub wcs: f64,
    pub breakdown: CategoryBreakdown,
    pub level: WcsLevel,
    pub playstyle: PlaystyleProfile,
    pub wins: u32,
    pub win_rate: u32,
    pub top_medals: Vec<MedalKind>,
    pub trend: Trend,
}

/// Running totals across the matches of one batch.
///
/// Matches must be added in batch order; the trend depends on it.
#[derive(Debug, Clone, Default)]
pub struct BatchAccumulator {
    wcs: Vec<f64>,
    category_sums: CategoryBreakdown,
    style_ratio_sums: CategoryBreakdown,
    wins: u32,
    medals: Vec<MedalKind>,
}

impl BatchAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one match: its score, the target's outcome, its style
    /// ratios and the medals the target earned.
    pub fn add_match(
        &mut self,
        score: &MatchScore,
        outcome: Outcome,
        style_ratios: &CategoryBreakdown,
        medals: impl IntoIterator<Item = MedalKind>,
    ) {
        self.wcs.push(score.wcs);
        self.category_sums.accumulate(&score.breakdown);
        self.style_ratio_sums.accumulate(style_ratios);
        if outcome == Outcome::Win {
            self.wins += 1;
        }
        self.medals.extend(medals);
    }

    pub fn match_count(&self) -> usize {
        self.wcs.len()
    }

    /// Uniform averages over every recorded match.
    pub fn finish(&self, scoring: &ScoringConfig) -> BatchSummary {
        let n = self.match_count().max(1) as f64;
        let wcs = mean(&self.wcs);

        BatchSummary {
            wcs,
            breakdown: self.category_sums.map(|sum| sum / n),
            level: level_for(wcs, &scoring.levels),
            playstyle: playstyle::profile(&self.style_ratio_sums, self.match_count()),
            wins: self.wins,
            win_rate: win_rate_percent(self.wins, self.match_count()),
            top_medals: top_medals(&self.medals, TOP_MEDAL_COUNT),
            trend: trend(&self.wcs, scoring.trend_window, scoring.trend_margin),
        }
    }
}
