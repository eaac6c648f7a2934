pub mod connection;
pub mod errors;
pub mod phase;
pub mod pipeline;
pub mod report;
pub mod result;
pub mod sources;
pub mod statement;
