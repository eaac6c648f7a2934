pub mod connection;
pub mod utils;
