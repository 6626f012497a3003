//! Match service retrieval.
//!
//! Requests go to the primary service first. When that fails, the same
//! resource is requested from the fallback service through a rotating
//! pool of proxies until the attempt budget runs out.

mod collect;
mod units;

pub use collect::{collect_batch, is_eligible};
pub use units::UnitCatalog;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::FetchConfig;
use crate::models::{MatchId, MatchRecord, ParticipantId};

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Found only {found} valid matches, {required} required")]
    InsufficientMatches { found: usize, required: usize },

    #[error("Gave up on {url} after {attempts} attempts")]
    Exhausted { url: String, attempts: u32 },
}

/// Source of match data for one player.
#[async_trait]
pub trait MatchSource: Send + Sync {
    /// Turn user input (numeric id or platform id) into a participant id.
    async fn resolve_player(&self, input: &str) -> Result<ParticipantId, FetchError>;

    /// Match ids for a player, most recent first.
    async fn match_list(&self, player: &ParticipantId) -> Result<Vec<MatchId>, FetchError>;

    async fn match_detail(&self, match_id: &MatchId) -> Result<MatchRecord, FetchError>;
}

/// True when `input` is not a short numeric id and must be resolved first.
pub fn needs_resolution(input: &str) -> bool {
    input.len() > 10 || !ParticipantId::from(input).is_numeric()
}

/// A resource on the match service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    PlayerProfile(String),
    MatchList(ParticipantId),
    MatchDetail(MatchId),
}

impl Route {
    /// URL on the primary service.
    pub fn primary_url(&self, base: &str) -> String {
        let base = base.trim_end_matches('/');
        match self {
            Route::PlayerProfile(input) => format!("{base}/steam/player/{input}"),
            Route::MatchList(player) => {
                format!("{base}/stb/matchlistid_by_stbId?stbId={player}")
            }
            Route::MatchDetail(id) => format!("{base}/stb/match_by_matchid?match_id={id}"),
        }
    }

    /// URL on the fallback service. Match lists carry an hourly time
    /// stamp so proxies do not serve a stale copy.
    pub fn fallback_url(&self, base: &str, now: DateTime<Utc>) -> String {
        let base = base.trim_end_matches('/');
        match self {
            Route::PlayerProfile(input) => format!("{base}/stb/commander/{input}/steam"),
            Route::MatchList(player) => format!(
                "{base}/stb/commander/{player}/matches?time={}",
                now.format("%Y-%m-%d_%H")
            ),
            Route::MatchDetail(id) => format!("{base}/stb/match/{id}"),
        }
    }
}

/// Fill a proxy template's `{url}` placeholder with the encoded target.
pub fn proxy_url(template: &str, target: &str) -> Result<Url, FetchError> {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    let filled = template.replace("{url}", &encoded);
    Url::parse(&filled).map_err(|e| FetchError::InvalidUrl(format!("{filled}: {e}")))
}

/// Strip a proxy envelope (`{"contents": ...}`), parsing string contents.
pub fn unwrap_envelope(value: Value) -> Result<Value, FetchError> {
    match value.get("contents") {
        Some(Value::String(s)) if !s.is_empty() => Ok(serde_json::from_str(s)?),
        Some(Value::Null) | Some(Value::String(_)) | None => Ok(value),
        Some(contents) => Ok(contents.clone()),
    }
}

/// Strip the primary service's `{"data": ...}` wrapper when present.
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get("data").is_some_and(|d| !d.is_null()) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[derive(Debug, Deserialize)]
struct PlayerProfile {
    #[serde(alias = "Id")]
    id: ParticipantId,
}

/// HTTP client for the match service.
pub struct MatchServiceClient {
    client: Client,
    config: FetchConfig,
}

impl MatchServiceClient {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("wcs-analyzer/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch a route, falling back to the proxy pool.
    async fn fetch_route(&self, route: &Route) -> Result<Value, FetchError> {
        let primary = route.primary_url(&self.config.primary_base_url);
        match self.get_json(&primary).await {
            Ok(value) => return Ok(unwrap_data(value)),
            Err(e) => debug!("Primary service failed for {}: {}", primary, e),
        }

        let target = route.fallback_url(&self.config.fallback_base_url, Utc::now());
        let attempts = self.config.max_attempts as usize;
        let proxies = self.config.proxies.iter().cycle().take(attempts);
        for (attempt, template) in proxies.enumerate() {
            let result = match proxy_url(template, &target) {
                Ok(url) => self.get_json(url.as_str()).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(value) => return unwrap_envelope(value),
                Err(e) => warn!("Proxy attempt {} for {} failed: {}", attempt + 1, target, e),
            }
        }

        Err(FetchError::Exhausted {
            url: target,
            attempts: self.config.max_attempts,
        })
    }

    /// Load the unit-name catalog from the primary service.
    pub async fn unit_catalog(&self) -> Result<UnitCatalog, FetchError> {
        let url = format!("{}/Units", self.config.primary_base_url.trim_end_matches('/'));
        let catalog = UnitCatalog::from_value(&self.get_json(&url).await?);
        info!("Loaded {} unit names", catalog.len());
        Ok(catalog)
    }
}

#[async_trait]
impl MatchSource for MatchServiceClient {
    async fn resolve_player(&self, input: &str) -> Result<ParticipantId, FetchError> {
        let input = input.trim();
        if !needs_resolution(input) {
            return Ok(ParticipantId::from(input));
        }

        let route = Route::PlayerProfile(input.to_string());
        let profile: PlayerProfile = serde_json::from_value(self.fetch_route(&route).await?)?;
        info!("Resolved {} to player {}", input, profile.id);
        Ok(profile.id)
    }

    async fn match_list(&self, player: &ParticipantId) -> Result<Vec<MatchId>, FetchError> {
        let value = self.fetch_route(&Route::MatchList(player.clone())).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn match_detail(&self, match_id: &MatchId) -> Result<MatchRecord, FetchError> {
        let value = self.fetch_route(&Route::MatchDetail(match_id.clone())).await?;
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_needs_resolution() {
        assert!(!needs_resolution("123456"));
        assert!(needs_resolution("76561198000000000"));
        assert!(needs_resolution("abc"));
        assert!(needs_resolution(""));
        assert!(needs_resolution("+42"));
    }

    #[test]
    fn test_primary_urls() {
        let base = "https://primary.test/api/v1/";
        assert_eq!(
            Route::PlayerProfile("7656".to_string()).primary_url(base),
            "https://primary.test/api/v1/steam/player/7656"
        );
        assert_eq!(
            Route::MatchList(ParticipantId::from(42u64)).primary_url(base),
            "https://primary.test/api/v1/stb/matchlistid_by_stbId?stbId=42"
        );
        assert_eq!(
            Route::MatchDetail(MatchId::from(9u64)).primary_url(base),
            "https://primary.test/api/v1/stb/match_by_matchid?match_id=9"
        );
    }

    #[test]
    fn test_fallback_urls() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 7, 30, 0).unwrap();
        let base = "https://fallback.test";
        assert_eq!(
            Route::MatchList(ParticipantId::from(42u64)).fallback_url(base, now),
            "https://fallback.test/stb/commander/42/matches?time=2024-06-10_07"
        );
        assert_eq!(
            Route::MatchDetail(MatchId::from(9u64)).fallback_url(base, now),
            "https://fallback.test/stb/match/9"
        );
        assert_eq!(
            Route::PlayerProfile("abc".to_string()).fallback_url(base, now),
            "https://fallback.test/stb/commander/abc/steam"
        );
    }

    #[test]
    fn test_proxy_url_encodes_target() {
        let url = proxy_url(
            "https://proxy.test/get?url={url}",
            "https://fallback.test/stb/match/9?x=1&y=2",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://proxy.test/get?url=https%3A%2F%2Ffallback.test%2Fstb%2Fmatch%2F9%3Fx%3D1%26y%3D2"
        );

        assert!(matches!(
            proxy_url("not a url {url}", "x"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_unwrap_envelope() {
        let string_contents = json!({ "contents": "{\"WinnerTeam\": 1}" });
        assert_eq!(unwrap_envelope(string_contents).unwrap(), json!({ "WinnerTeam": 1 }));

        let object_contents = json!({ "contents": { "WinnerTeam": 0 } });
        assert_eq!(unwrap_envelope(object_contents).unwrap(), json!({ "WinnerTeam": 0 }));

        let plain = json!({ "WinnerTeam": 0 });
        assert_eq!(unwrap_envelope(plain.clone()).unwrap(), plain);

        assert!(unwrap_envelope(json!({ "contents": "not json" })).is_err());
    }

    #[test]
    fn test_unwrap_data() {
        assert_eq!(unwrap_data(json!({ "data": { "id": 5 } })), json!({ "id": 5 }));
        assert_eq!(unwrap_data(json!({ "id": 5 })), json!({ "id": 5 }));
        assert_eq!(unwrap_data(json!([1, 2])), json!([1, 2]));
    }

    #[test]
    fn test_player_profile_id() {
        let profile: PlayerProfile = serde_json::from_value(json!({ "id": 123456 })).unwrap();
        assert_eq!(profile.id.as_str(), "123456");
    }

    #[test]
    fn test_client_builds_from_default_config() {
        assert!(MatchServiceClient::new(FetchConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_short_numeric_input_skips_lookup() {
        let client = MatchServiceClient::new(FetchConfig::default()).unwrap();
        let id = client.resolve_player(" 123456 ").await.unwrap();
        assert_eq!(id.as_str(), "123456");
    }
}
