//! Batch analysis: resolve, extract, score and aggregate every match.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ScoringConfig;
use crate::models::{
    format_duration, timestamp_utc, CategoryBreakdown, FavoriteUnits, MatchEntry, MatchResult,
    Outcome, ParticipantId, Report, Team,
};

use super::aggregate::{style_ratios, BatchAccumulator};
use super::extract::{career_favorite_units, extract_match};
use super::resolver::{participant_outcome, resolve_match};
use super::roster::build_rosters;
use super::scorer::{score_match, MatchScore};
use super::AnalysisError;

/// Read-only unit-name lookup, typically backed by the match service's
/// unit catalog.
pub trait UnitNameLookup: Send + Sync {
    fn unit_name(&self, unit_type: u32) -> Option<String>;
}

/// Computes a [`Report`] for one target participant from a match batch.
#[derive(Clone)]
pub struct Analyzer {
    scoring: ScoringConfig,
    unit_names: Option<Arc<dyn UnitNameLookup>>,
}

impl Analyzer {
    pub fn new(scoring: ScoringConfig) -> Self {
        Self {
            scoring,
            unit_names: None,
        }
    }

    /// Annotate favourite units with names from `lookup`.
    pub fn with_unit_names(mut self, lookup: Arc<dyn UnitNameLookup>) -> Self {
        self.unit_names = Some(lookup);
        self
    }

    /// Analyze a batch, most recent match first.
    ///
    /// Fails only on an empty batch or a match without participant data.
    /// A target missing from a match gets neutral scores for that match.
    pub fn analyze(
        &self,
        target: &ParticipantId,
        batch: &[MatchEntry],
    ) -> Result<Report, AnalysisError> {
        if batch.is_empty() {
            return Err(AnalysisError::InsufficientData(
                "match batch is empty".to_string(),
            ));
        }

        let mut totals = BatchAccumulator::new();
        let matches = batch
            .iter()
            .map(|entry| self.analyze_match(target, entry, &mut totals))
            .collect::<Result<Vec<_>, _>>()?;
        let summary = totals.finish(&self.scoring);

        let mut favorite_units = career_favorite_units(batch, target);
        if let Some(units) = favorite_units.as_mut() {
            self.annotate(units);
        }

        info!(
            "Analyzed {} matches for {}: WCS {:.1} ({}), {} wins",
            matches.len(),
            target,
            summary.wcs,
            summary.level,
            summary.wins
        );

        Ok(Report {
            target: target.clone(),
            target_name: batch
                .iter()
                .find_map(|e| e.data.participant(target).and_then(|p| p.name.clone())),
            current_rating: batch[0]
                .data
                .participant(target)
                .and_then(|p| p.new_rating),
            matches,
            wcs: summary.wcs,
            breakdown: summary.breakdown,
            level: summary.level,
            playstyle: summary.playstyle,
            wins: summary.wins,
            win_rate: summary.win_rate,
            top_medals: summary.top_medals,
            trend: summary.trend,
            favorite_units,
        })
    }

    fn analyze_match(
        &self,
        target: &ParticipantId,
        entry: &MatchEntry,
        totals: &mut BatchAccumulator,
    ) -> Result<MatchResult, AnalysisError> {
        let participants = entry
            .data
            .participants
            .as_ref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                AnalysisError::InsufficientData(format!(
                    "match {} has no participant data",
                    entry.id
                ))
            })?;

        let resolved = resolve_match(participants, entry.data.winner_team);
        let metrics = extract_match(&resolved.participants);
        let target_index = resolved.participants.iter().position(|p| &p.id == target);

        let (team, outcome, score, ratios) = match target_index {
            Some(i) => {
                let me = &resolved.participants[i];
                let outcome =
                    participant_outcome(me.raw.rating_delta(), me.team, resolved.winner);
                let score = score_match(
                    Some(&metrics[i]),
                    &metrics,
                    outcome,
                    &self.scoring.weights,
                );
                (me.team, outcome, score, style_ratios(&metrics[i], &metrics))
            }
            None => {
                warn!("Target {} not found in match {}", target, entry.id);
                let team = resolved.winner.team().map_or(Team::Zero, |t| t.opponent());
                (
                    team,
                    participant_outcome(0.0, team, resolved.winner),
                    MatchScore::neutral(),
                    CategoryBreakdown::uniform(1.0),
                )
            }
        };

        let (mut ally, mut enemy) = build_rosters(&resolved, &metrics, target, team);
        for member in ally.iter_mut().chain(enemy.iter_mut()) {
            self.annotate(&mut member.favorite_units);
        }

        let medals = ally
            .iter()
            .find(|p| p.is_target)
            .map(|p| p.medals.iter().map(|m| m.kind).collect::<Vec<_>>())
            .unwrap_or_default();
        totals.add_match(&score, outcome, &ratios, medals);

        debug!(
            "Match {}: WCS {:.1}, {:?}, winner {:?}{}",
            entry.id,
            score.wcs,
            outcome,
            resolved.winner,
            if resolved.winner_inferred { " (inferred)" } else { "" }
        );

        Ok(MatchResult {
            id: entry.id.clone(),
            wcs: score.wcs,
            breakdown: score.breakdown,
            ally,
            enemy,
            outcome,
            is_win: outcome == Outcome::Win,
            is_draw: resolved.winner.is_draw(),
            target_located: target_index.is_some(),
            end_reason: entry.data.end_match_reason,
            end_time: entry.data.end_time,
            ended_at: entry.data.end_time.and_then(timestamp_utc),
            map_id: entry.data.map_id.clone(),
            duration_secs: entry.data.duration_secs,
            duration_display: entry.data.duration_secs.map(format_duration),
            winner: resolved.winner,
            winner_inferred: resolved.winner_inferred,
        })
    }

    fn annotate(&self, units: &mut FavoriteUnits) {
        let Some(lookup) = &self.unit_names else {
            return;
        };
        for unit in units.iter_mut() {
            unit.name = lookup.unit_name(unit.unit_type);
        }
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("scoring", &self.scoring)
            .field("unit_names", &self.unit_names.is_some())
            .finish()
    }
}
