pub mod parallel;
pub mod planner;
pub mod runner;
pub mod sequential;
