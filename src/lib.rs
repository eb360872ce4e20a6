pub mod angle;
pub mod config;
pub mod error;
pub mod gps_tracker;
pub mod navigator;
pub mod planner;
pub mod polar;
pub mod position;
pub mod sensors;
pub mod simulator;
pub mod smoothing;
pub mod steering;
pub mod wind;

// Re-export commonly used types
pub use config::PlannerConfig;
pub use error::NavError;
pub use gps_tracker::GpsTracker;
pub use navigator::Navigator;
pub use planner::{LaylinePathPlanner, NavInput, Tack};
pub use position::Position;

#[cfg(test)]
pub(crate) mod mocks;
