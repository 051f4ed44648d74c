use tracing::info;

use crate::{
    error::{LocationError, StadiumError},
    location::{Located, LocationResolver},
    stadium::Stadium,
};

/// Which stadium is on screen, chosen by name or by the user's position.
#[derive(Debug)]
pub struct StadiumSelector {
    selected: &'static Stadium,
    resolver: Option<LocationResolver>,
    status: Option<String>,
}

impl StadiumSelector {
    pub fn new(initial: &'static Stadium) -> Self {
        Self { selected: initial, resolver: None, status: None }
    }

    pub fn with_resolver(mut self, resolver: LocationResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn selected(&self) -> &'static Stadium {
        self.selected
    }

    /// Last location status line, if a lookup has run.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Select by short name. An unknown name leaves the selection as it was.
    pub fn select(&mut self, short_name: &str) -> Result<&'static Stadium, StadiumError> {
        let stadium = Stadium::find(short_name)?;
        self.selected = stadium;
        Ok(stadium)
    }

    /// Select the stadium nearest to the user. On failure the selection is
    /// kept and the status explains why.
    pub async fn locate(&mut self) -> Result<Located, LocationError> {
        let outcome = match self.resolver.as_mut() {
            Some(resolver) => resolver.resolve().await,
            None => Err(LocationError::Unavailable("no location source configured".into())),
        };

        self.apply(outcome)
    }

    /// Re-run nearest-stadium matching on the last known position.
    pub fn relocate(&mut self) -> Option<Located> {
        let located = self.resolver.as_ref()?.re_resolve()?;
        self.apply(Ok(located)).ok()
    }

    fn apply(&mut self, outcome: Result<Located, LocationError>) -> Result<Located, LocationError> {
        match &outcome {
            Ok(located) => {
                info!(stadium = located.stadium.full_name, distance_km = located.distance_km, "selected nearest stadium");
                self.selected = located.stadium;
                self.status = Some(located.status_message());
            }
            Err(err) => {
                self.status = Some(err.status_message());
            }
        }
        outcome
    }
}
