pub mod set_ops;
pub mod traversal;
pub mod executor;
