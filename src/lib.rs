pub mod clock;
pub mod config;
pub mod constants;
pub mod logging;
pub mod queue;
pub mod store;
pub mod supply;

pub use queue::LearningQueue;
