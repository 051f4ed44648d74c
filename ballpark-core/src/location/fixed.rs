use async_trait::async_trait;

use crate::{error::LocationError, model::Coordinates};

use super::{LocationSource, Position, PositionOptions};

/// Coordinates supplied by the user.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    coordinates: Coordinates,
}

impl FixedLocation {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl LocationSource for FixedLocation {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Position, LocationError> {
        let Coordinates { latitude, longitude } = self.coordinates;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationError::PositionUnavailable(format!(
                "coordinates out of range: {}",
                self.coordinates
            )));
        }

        Ok(Position { accuracy_m: Some(0.0), ..Position::now(self.coordinates) })
    }
}

/// Location turned off in the config. Behaves like a denied permission.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledLocation;

#[async_trait]
impl LocationSource for DisabledLocation {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Position, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}
