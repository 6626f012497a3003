use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::fetch::{collect_batch, MatchSource};
use crate::models::{MatchEntry, ParticipantId, Report};

/// Body of `POST /api/analyze`: a target and its match batch, most
/// recent first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub target: ParticipantId,
    pub matches: Vec<MatchEntry>,
}

pub async fn analyze_batch(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<Report>, ApiError> {
    let report = state.analyzer.analyze(&request.target, &request.matches)?;
    Ok(Json(report))
}

/// Collect the player's recent matches from the match service and
/// analyze them.
pub async fn player_report(
    State(state): State<AppState>,
    Path(player): Path<String>,
) -> Result<Json<Report>, ApiError> {
    let player = player.trim();
    if player.is_empty() {
        return Err(ApiError::BadRequest("player id is required".to_string()));
    }

    let target = state.source.resolve_player(player).await?;
    let batch = collect_batch(Arc::clone(&state.source), &target, &state.collection).await?;
    let report = state.analyzer.analyze(&target, &batch)?;

    info!(
        "Report for {}: WCS {:.1} over {} matches",
        target,
        report.wcs,
        report.matches.len()
    );
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::build_router;
    use crate::calculate::Analyzer;
    use crate::config::{CollectionConfig, ScoringConfig};
    use crate::fetch::FetchError;
    use crate::models::{Counters, MatchId, MatchRecord, ParticipantRaw};

    struct FixedSource {
        matches: Vec<MatchEntry>,
    }

    #[async_trait]
    impl MatchSource for FixedSource {
        async fn resolve_player(&self, input: &str) -> Result<ParticipantId, FetchError> {
            if input == "unknown" {
                return Err(FetchError::HttpStatus {
                    status: 404,
                    message: "Not Found".to_string(),
                });
            }
            Ok(ParticipantId::from(input))
        }

        async fn match_list(&self, _player: &ParticipantId) -> Result<Vec<MatchId>, FetchError> {
            Ok(self.matches.iter().map(|m| m.id.clone()).collect())
        }

        async fn match_detail(&self, match_id: &MatchId) -> Result<MatchRecord, FetchError> {
            self.matches
                .iter()
                .find(|m| &m.id == match_id)
                .map(|m| m.data.clone())
                .ok_or(FetchError::HttpStatus {
                    status: 404,
                    message: "Not Found".to_string(),
                })
        }
    }

    fn record(winner: i64) -> MatchRecord {
        let participants: BTreeMap<String, ParticipantRaw> = (1..=10u64)
            .map(|i| {
                let team = (i % 2) as i64;
                let delta = if team == winner { 12.0 } else { -12.0 };
                let raw = ParticipantRaw {
                    id: Some(ParticipantId::from(i)),
                    name: Some(format!("player{i}")),
                    team_id: Some(team),
                    old_rating: Some(1500.0),
                    new_rating: Some(1500.0 + delta),
                    counters: Counters {
                        damage_dealt: 400.0 * i as f64,
                        destruction_score: 900.0 * i as f64,
                        losses_score: 600.0,
                        total_spawned_unit_score: 3000.0,
                        ..Default::default()
                    },
                    ..Default::default()
                };
                (i.to_string(), raw)
            })
            .collect();
        MatchRecord {
            winner_team: Some(winner),
            participants: Some(participants),
            ..Default::default()
        }
    }

    fn batch(count: u64) -> Vec<MatchEntry> {
        (0..count)
            .map(|i| MatchEntry {
                id: MatchId::from(100 + i),
                data: record((i % 2) as i64),
            })
            .collect()
    }

    fn test_app(source_matches: Vec<MatchEntry>, match_goal: usize) -> axum::Router {
        let state = AppState {
            analyzer: Arc::new(Analyzer::new(ScoringConfig::default())),
            source: Arc::new(FixedSource {
                matches: source_matches,
            }),
            collection: Arc::new(CollectionConfig {
                match_goal,
                batch_delay_ms: 0,
                ..Default::default()
            }),
            cors_origin: "*".to_string(),
        };
        build_router(state)
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    async fn post_json(app: axum::Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (status, json) = get_json(test_app(Vec::new(), 1), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_analyze_posted_batch() {
        let request = AnalyzeRequest {
            target: ParticipantId::from(4u64),
            matches: batch(4),
        };
        let body = serde_json::to_string(&request).unwrap();

        let (status, json) = post_json(test_app(Vec::new(), 1), "/api/analyze", &body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["target"], "4");
        assert_eq!(json["matches"].as_array().unwrap().len(), 4);
        // player 4 sits on team 0, which wins every other match
        assert_eq!(json["wins"], 2);
        assert_eq!(json["win_rate"], 50);
        assert_eq!(json["target_name"], "player4");
    }

    #[tokio::test]
    async fn test_analyze_empty_batch_is_unprocessable() {
        let body = r#"{"target": "4", "matches": []}"#;
        let (status, json) = post_json(test_app(Vec::new(), 1), "/api/analyze", body).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "INSUFFICIENT_DATA");
    }

    #[tokio::test]
    async fn test_analyze_rejects_malformed_body() {
        let (status, _) = post_json(test_app(Vec::new(), 1), "/api/analyze", "{").await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_player_report_collects_batch() {
        let (status, json) = get_json(test_app(batch(6), 5), "/api/players/3/report").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["target"], "3");
        let ids: Vec<&str> = json["matches"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["100", "101", "102", "103", "104"]);
    }

    #[tokio::test]
    async fn test_player_report_not_enough_matches() {
        let (status, json) = get_json(test_app(batch(3), 12), "/api/players/3/report").await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "INSUFFICIENT_DATA");
    }

    #[tokio::test]
    async fn test_player_report_unknown_player() {
        let (status, json) = get_json(test_app(batch(3), 1), "/api/players/unknown/report").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }
}
