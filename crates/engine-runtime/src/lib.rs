pub mod error;
pub mod execution;
pub mod metrics;

#[cfg(test)]
mod tests;
