use std::sync::{Arc, OnceLock};
use serde_json::Value;
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::stats::EngineStats;
use crate::core::types::{record_id, Entities};
use crate::index::builder::IndexBuilder;
use crate::index::index_cache::{CachedIndex, CollectionKey, IndexCache};
use crate::query::ast::Query;
use crate::query::compiler::compile_all;
use crate::query::types::SearchOptions;
use crate::search::executor::{combine, QueryExecutor};
use crate::search::set_ops::IdSet;

/// Query engine over one normalized collection of records.
///
/// The index is built on the first query that needs it and kept in the
/// engine's [`IndexCache`], keyed by a content fingerprint or by the token
/// given to [`with_version`](Self::with_version). Engines sharing a cache
/// must not reuse a token for different data. To query new data, build a
/// new engine.
pub struct QueryEngine {
    config: Config,
    entities: Entities,
    ids: Vec<String>,
    version: Option<String>,
    collection_key: OnceLock<CollectionKey>,
    index_cache: Arc<IndexCache>,
}

impl QueryEngine {
    /// Takes ownership of `entities` (id -> record). Every record must be an
    /// object whose id field matches its key in the collection.
    pub fn new(entities: Entities, config: Config) -> Result<Self> {
        for (id, record) in &entities {
            if !record.is_object() {
                return Err(Error::invalid_input(format!("record {:?} is not an object", id)));
            }
            match record_id(record, &config.key) {
                Some(found) if found == id.as_str() => {}
                Some(found) => {
                    return Err(Error::invalid_input(format!(
                        "record {:?} has {} {:?}", id, config.key, found
                    )));
                }
                None => {
                    return Err(Error::invalid_input(format!(
                        "record {:?} has no string or numeric {:?} field", id, config.key
                    )));
                }
            }
        }

        let ids = entities.keys().cloned().collect();
        let index_cache = Arc::new(IndexCache::new(config.index_cache_size));

        Ok(QueryEngine {
            config,
            entities,
            ids,
            version: None,
            collection_key: OnceLock::new(),
            index_cache,
        })
    }

    /// Normalizes a list of records by their id field.
    pub fn from_records(records: Vec<Value>, config: Config) -> Result<Self> {
        let mut entities = Entities::new();
        for record in records {
            let id = record_id(&record, &config.key)
                .ok_or_else(|| Error::invalid_input(format!(
                    "record without a string or numeric {:?} field", config.key
                )))?
                .into_owned();

            if entities.contains_key(&id) {
                return Err(Error::invalid_input(format!("duplicate record id {:?}", id)));
            }
            entities.insert(id, record);
        }
        Self::new(entities, config)
    }

    /// Shares an index cache with other engines. Collections are told apart
    /// by content fingerprint unless [`with_version`](Self::with_version) is used.
    pub fn with_index_cache(mut self, cache: Arc<IndexCache>) -> Self {
        self.index_cache = cache;
        self
    }

    /// Keys the cached index by `token` instead of a content fingerprint.
    pub fn with_version(mut self, token: impl Into<String>) -> Self {
        self.version = Some(token.into());
        self.collection_key = OnceLock::new();
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.entities.get(id)
    }

    /// Every id, in collection order.
    pub fn all_ids(&self) -> Vec<String> {
        self.ids.clone()
    }

    /// Ids of the records matching `queries`; `None` selects every record.
    pub fn search(&self, queries: Option<&[Query]>, options: &SearchOptions) -> Result<Vec<String>> {
        let Some(queries) = queries else {
            return Ok(self.all_ids());
        };
        let matched = self.resolve(queries, options)?;
        Ok(matched.iter().map(|doc| self.ids[doc.0 as usize].clone()).collect())
    }

    /// Like [`search`](Self::search) for a JSON query: an object or an array of objects.
    pub fn search_value(&self, query: Option<&Value>, options: &SearchOptions) -> Result<Vec<String>> {
        match query {
            Some(value) => self.search(Some(&Query::parse(value)?), options),
            None => self.search(None, options),
        }
    }

    /// Records matching `queries`, one per id returned by `search`.
    pub fn filter(&self, queries: Option<&[Query]>, options: &SearchOptions) -> Result<Vec<&Value>> {
        let ids = self.search(queries, options)?;
        Ok(ids.iter().filter_map(|id| self.entities.get(id)).collect())
    }

    pub fn filter_value(&self, query: Option<&Value>, options: &SearchOptions) -> Result<Vec<&Value>> {
        let ids = self.search_value(query, options)?;
        Ok(ids.iter().filter_map(|id| self.entities.get(id)).collect())
    }

    /// First matching record in collection order.
    pub fn find(&self, queries: Option<&[Query]>, options: &SearchOptions) -> Result<Option<&Value>> {
        let Some(queries) = queries else {
            return Ok(self.entities.values().next());
        };
        let matched = self.resolve(queries, options)?;
        Ok(matched
            .iter()
            .next()
            .and_then(|doc| self.entities.get(&self.ids[doc.0 as usize])))
    }

    pub fn find_value(&self, query: Option<&Value>, options: &SearchOptions) -> Result<Option<&Value>> {
        match query {
            Some(value) => self.find(Some(&Query::parse(value)?), options),
            None => self.find(None, options),
        }
    }

    fn resolve(&self, queries: &[Query], options: &SearchOptions) -> Result<IdSet> {
        let conditions = options.conditions.unwrap_or(self.config.conditions);
        // malformed patterns fail here, before any traversal
        let groups = compile_all(queries)?;
        let universe = IdSet::full(self.ids.len());

        if groups.iter().all(Vec::is_empty) {
            let sets = vec![universe.clone(); groups.len()];
            return Ok(combine(conditions, &sets, &universe));
        }

        let index = self.index()?;
        Ok(QueryExecutor::new(&index, &universe).execute(&groups, conditions))
    }

    /// Cache key of this engine's collection.
    pub fn collection_key(&self) -> Result<CollectionKey> {
        if let Some(key) = self.collection_key.get() {
            return Ok(key.clone());
        }

        let key = match &self.version {
            Some(token) => CollectionKey::Version(token.clone()),
            None => CollectionKey::fingerprint(&self.entities, &self.config.key)?,
        };
        Ok(self.collection_key.get_or_init(|| key).clone())
    }

    /// The built index, building it on first use.
    pub fn index(&self) -> Result<Arc<CachedIndex>> {
        let key = self.collection_key()?;
        Ok(self.index_cache.get_or_build(&key, || {
            let index = IndexBuilder::new(&self.config.key)
                .with_parallel_threshold(self.config.parallel_threshold)
                .build(&self.entities);
            CachedIndex::new(index, self.config.cache_size)
        }))
    }

    pub fn is_indexed(&self) -> bool {
        self.collection_key()
            .is_ok_and(|key| self.index_cache.contains(&key))
    }

    /// Drops this collection's index and its memoized queries.
    pub fn clear_cache(&self) {
        if let Ok(key) = self.collection_key() {
            self.index_cache.invalidate(&key);
        }
    }

    pub fn stats(&self) -> EngineStats {
        let cached = self
            .collection_key()
            .ok()
            .and_then(|key| self.index_cache.get(&key));

        EngineStats {
            records: self.ids.len(),
            indexed: cached.is_some(),
            index_leaves: cached.as_ref().map(|c| c.index.leaf_count()),
            index_cache: self.index_cache.stats(),
            query_cache: cached.map(|c| c.queries.stats()),
        }
    }
}
