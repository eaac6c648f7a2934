pub mod common;
pub mod copy;
pub mod drop_table;
