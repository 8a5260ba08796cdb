use serde::{Serialize, Deserialize};
use crate::query::types::Conditions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Memoized sub-query results kept per index; 0 disables the query cache.
    pub cache_size: usize,

    /// Indexes kept by an `IndexCache` created for this engine.
    pub index_cache_size: usize,

    /// Name of the record id field.
    pub key: String,

    /// Condition mode used when a search does not pass one.
    pub conditions: Conditions,

    /// Collections larger than this are indexed on the rayon pool.
    pub parallel_threshold: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cache_size: 10,
            index_cache_size: 10,
            key: "id".to_string(),
            conditions: Conditions::All,
            parallel_threshold: 1024,
        }
    }
}
