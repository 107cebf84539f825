//! Glucose forecasting pipeline.
//!
//! Ingests a directory of heterogeneous time-stamped CSV recordings,
//! normalizes them onto a uniform 5-minute grid, and produces leakage-aware
//! supervised windows for short-horizon glucose prediction, with evaluation
//! back in mg/dL.

pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod scale;
pub mod split;
pub mod window;
