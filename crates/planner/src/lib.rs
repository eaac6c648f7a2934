pub mod catalog;
pub mod error;
pub mod plan;
pub mod query;
