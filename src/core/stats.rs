use serde::{Serialize, Deserialize};
use crate::index::index_cache::IndexCacheStats;
use crate::query::cache::CacheStats;

/// Engine statistics for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    pub records: usize,

    // Index metrics
    pub indexed: bool,
    pub index_leaves: Option<usize>,
    pub index_cache: IndexCacheStats,

    // Query metrics, present once the index exists
    pub query_cache: Option<CacheStats>,
}
