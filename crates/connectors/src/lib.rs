pub mod error;
pub mod factory;
pub mod sql;
