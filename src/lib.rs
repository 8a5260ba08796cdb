pub mod core;
pub mod index;
pub mod query;
pub mod search;

/*
┌────────────────────────────────────────────────────────────────────────────────┐
│                         ENTITY-QUERY STRUCT ARCHITECTURE                        │
└────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────────── CORE LAYER ─────────────────────────────────┐
│                                                                                  │
│  ┌──────────────────────────────────────────────────────────────────────────┐   │
│  │                           struct QueryEngine                              │   │
│  │  config: Config                     // cache sizes, id key, conditions    │   │
│  │  entities: Entities                 // id -> record (serde_json::Value)   │   │
│  │  ids: Vec<String>                   // DocId -> id                        │   │
│  │  collection_key: OnceLock<..>       // fingerprint or version token       │   │
│  │  index_cache: Arc<IndexCache>       // built lazily, shareable            │   │
│  └──────────────────────────────────────────────────────────────────────────┘   │
│                                                                                  │
│  search(queries?, options) -> ids      filter(..) -> records    find(..)         │
└──────────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────────── QUERY LAYER ─────────────────────────────────┐
│                                                                                  │
│  Query { fields: [(key, QueryValue)] }     QueryValue = Literal | Pattern        │
│         │                                              | Nested(Query)           │
│         ▼ compiler::compile                                                      │
│  Predicate { path: [Segment], target: Target }                                   │
│         │                                                                        │
│         ▼ QueryKey (sorted, tagged predicates) ──► QueryCache (FIFO, per index)  │
└──────────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────────── INDEX LAYER ─────────────────────────────────┐
│                                                                                  │
│  IndexBuilder ── record fragments ── IndexNode::merge ──► InvertedIndex          │
│                                                                                  │
│  IndexNode { fields: name -> IndexNode, values: value -> PostingList,            │
│              empty: PostingList }                                                │
│                                                                                  │
│  IndexCache: CollectionKey -> OnceLock<CachedIndex { index, queries }>           │
└──────────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────────── SEARCH LAYER ────────────────────────────────┐
│                                                                                  │
│  traversal::traverse(node, predicate) -> IdSet                                   │
│  QueryExecutor: AND within a sub-query, then all / any / diff / none             │
│  set_ops: IdSet over RoaringBitmap                                               │
└──────────────────────────────────────────────────────────────────────────────────┘
*/
