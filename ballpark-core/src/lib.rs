//! Core library for the `ballpark` CLI.
//!
//! This crate defines:
//! - The KBO stadium table and nearest-stadium lookup
//! - Position sources and the location resolver
//! - A cache-first client for the ballpark forecast API
//! - Grouping, filtering and rain-risk classification of forecasts
//!
//! It is used by `ballpark-cli`, but holds no terminal code of its own.

pub mod board;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod geo;
pub mod location;
pub mod model;
pub mod presenter;
pub mod selector;
pub mod stadium;
pub mod storage;

pub use board::{DayView, ForecastBoard, ForecastScreen};
pub use cache::ForecastCache;
pub use client::{ForecastClient, ForecastLoad, LoadState};
pub use config::{Config, LocationConfig};
pub use error::{ForecastError, LocationError, StadiumError};
pub use location::{LocationResolver, LocationSource, PositionOptions};
pub use model::{Coordinates, ForecastEntry};
pub use presenter::{HourlyCard, RiskThresholds, RiskTier};
pub use selector::StadiumSelector;
pub use stadium::Stadium;
pub use storage::{FileStorage, MemoryStorage, Storage};
