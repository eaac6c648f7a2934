pub mod duration;
pub mod identifiers;
