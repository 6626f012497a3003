//! Batch collection: walk a player's match list until enough eligible
//! matches are found.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::CollectionConfig;
use crate::models::{MatchEntry, MatchId, MatchRecord, ParticipantId};

use super::{FetchError, MatchSource};

/// A match is worth analyzing when it has enough participants and at
/// least one rating moved.
pub fn is_eligible(record: &MatchRecord, min_players: usize) -> bool {
    record.participant_count() >= min_players && record.has_rating_signal()
}

/// Collect up to `match_goal` eligible matches for `player`.
///
/// The match list is fetched in windows of `concurrency` parallel
/// requests. Eligible matches keep match-list order. Failed fetches are
/// logged and skipped.
pub async fn collect_batch(
    source: Arc<dyn MatchSource>,
    player: &ParticipantId,
    config: &CollectionConfig,
) -> Result<Vec<MatchEntry>, FetchError> {
    let ids = source.match_list(player).await?;
    info!("Found {} matches for player {}", ids.len(), player);

    let mut batch: Vec<MatchEntry> = Vec::with_capacity(config.match_goal);
    for (index, window) in ids.chunks(config.concurrency.max(1)).enumerate() {
        if batch.len() >= config.match_goal {
            break;
        }
        if index > 0 && config.batch_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.batch_delay_ms)).await;
        }

        for (id, result) in fetch_window(&source, window).await {
            if batch.len() >= config.match_goal {
                break;
            }
            match result {
                Ok(data) if is_eligible(&data, config.min_players) => {
                    debug!("Match {} accepted ({}/{})", id, batch.len() + 1, config.match_goal);
                    batch.push(MatchEntry { id, data });
                }
                Ok(data) => debug!(
                    "Skipping match {}: {} participants, rating signal {}",
                    id,
                    data.participant_count(),
                    data.has_rating_signal()
                ),
                Err(e) => warn!("Failed to fetch match {}: {}", id, e),
            }
        }
    }

    if batch.len() < config.match_goal {
        return Err(FetchError::InsufficientMatches {
            found: batch.len(),
            required: config.match_goal,
        });
    }

    info!("Collected {} matches for player {}", batch.len(), player);
    Ok(batch)
}

/// Fetch one window in parallel, returning results in window order.
async fn fetch_window(
    source: &Arc<dyn MatchSource>,
    window: &[MatchId],
) -> Vec<(MatchId, Result<MatchRecord, FetchError>)> {
    let mut tasks = JoinSet::new();
    for (slot, id) in window.iter().cloned().enumerate() {
        let source = Arc::clone(source);
        tasks.spawn(async move {
            let result = source.match_detail(&id).await;
            (slot, id, result)
        });
    }

    let mut slots: Vec<Option<(MatchId, Result<MatchRecord, FetchError>)>> =
        window.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((slot, id, result)) => slots[slot] = Some((id, result)),
            Err(e) => warn!("Match fetch task failed: {}", e),
        }
    }
    slots.into_iter().flatten().collect()
}
