//! One-shot position lookup and nearest-stadium resolution.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{fmt::Debug, time::Duration};
use tracing::{debug, info, warn};

use crate::{
    config::LocationConfig,
    error::LocationError,
    model::Coordinates,
    stadium::{self, Stadium},
};

pub mod fixed;
pub mod ipapi;

pub use fixed::{DisabledLocation, FixedLocation};
pub use ipapi::IpApiLocation;

/// Options for a single position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// A remembered fix no older than this is reused instead of asking again.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(5 * 60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub coordinates: Coordinates,
    pub accuracy_m: Option<f64>,
    pub taken_at: DateTime<Utc>,
}

impl Position {
    pub fn now(coordinates: Coordinates) -> Self {
        Self { coordinates, accuracy_m: None, taken_at: Utc::now() }
    }
}

#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn current_position(&self, options: &PositionOptions) -> Result<Position, LocationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationSourceId {
    IpApi,
    Disabled,
}

impl LocationSourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationSourceId::IpApi => "ipapi",
            LocationSourceId::Disabled => "disabled",
        }
    }

    pub const fn all() -> &'static [LocationSourceId] {
        &[LocationSourceId::IpApi, LocationSourceId::Disabled]
    }
}

impl std::fmt::Display for LocationSourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for LocationSourceId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "ipapi" => Ok(LocationSourceId::IpApi),
            "disabled" | "off" => Ok(LocationSourceId::Disabled),
            _ => Err(anyhow::anyhow!(
                "Unknown location source '{value}'. Supported sources: ipapi, disabled."
            )),
        }
    }
}

/// Build the location source named in the config.
pub fn source_from_config(config: &LocationConfig) -> anyhow::Result<Box<dyn LocationSource>> {
    let id = LocationSourceId::try_from(config.source.as_str())?;

    let boxed: Box<dyn LocationSource> = match id {
        LocationSourceId::IpApi => Box::new(IpApiLocation::new(config.url.clone())),
        LocationSourceId::Disabled => Box::new(DisabledLocation),
    };

    Ok(boxed)
}

/// A position matched to its nearest stadium.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Located {
    pub position: Position,
    pub stadium: &'static Stadium,
    pub distance_km: f64,
}

impl Located {
    fn from_position(position: Position) -> Self {
        let nearest = stadium::nearest(position.coordinates);
        Self { position, stadium: nearest.stadium, distance_km: nearest.distance_km }
    }

    pub fn status_message(&self) -> String {
        format!(
            "Nearest ballpark: {} ({:.1} km away)",
            self.stadium.full_name, self.distance_km
        )
    }
}

#[derive(Debug)]
pub struct LocationResolver {
    source: Box<dyn LocationSource>,
    options: PositionOptions,
    last: Option<Position>,
}

impl LocationResolver {
    pub fn new(source: Box<dyn LocationSource>) -> Self {
        Self::with_options(source, PositionOptions::default())
    }

    pub fn with_options(source: Box<dyn LocationSource>, options: PositionOptions) -> Self {
        Self { source, options, last: None }
    }

    /// Obtain a position and match it to the nearest stadium.
    pub async fn resolve(&mut self) -> Result<Located, LocationError> {
        if let Some(last) = self.fresh_fix() {
            debug!(coordinates = %last.coordinates, "reusing recent position");
            return Ok(Located::from_position(last));
        }

        let request = self.source.current_position(&self.options);
        let position = match tokio::time::timeout(self.options.timeout, request).await {
            Ok(Ok(position)) => position,
            Ok(Err(err)) => {
                warn!(error = %err, "location lookup failed");
                return Err(err);
            }
            Err(_) => {
                warn!(timeout = ?self.options.timeout, "location lookup timed out");
                return Err(LocationError::Timeout);
            }
        };

        info!(coordinates = %position.coordinates, "obtained position");
        self.last = Some(position);
        Ok(Located::from_position(position))
    }

    /// Recompute the nearest stadium from the last fix without asking the source.
    pub fn re_resolve(&self) -> Option<Located> {
        self.last.map(Located::from_position)
    }

    fn fresh_fix(&self) -> Option<Position> {
        let last = self.last?;
        let age = Utc::now().signed_duration_since(last.taken_at).to_std().ok()?;
        (age <= self.options.maximum_age).then_some(last)
    }
}
