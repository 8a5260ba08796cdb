pub mod inverted;
pub mod posting;
pub mod builder;
pub mod index_cache;
