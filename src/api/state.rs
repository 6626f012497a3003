use std::sync::Arc;

use crate::calculate::Analyzer;
use crate::config::CollectionConfig;
use crate::fetch::MatchSource;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub source: Arc<dyn MatchSource>,
    pub collection: Arc<CollectionConfig>,
    pub cors_origin: String,
}
