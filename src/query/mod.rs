pub mod ast;
pub mod matcher;
pub mod compiler;
pub mod cache;
pub mod types;
