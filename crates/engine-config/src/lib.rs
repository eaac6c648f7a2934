pub mod env;
pub mod pipeline;
pub mod settings;
