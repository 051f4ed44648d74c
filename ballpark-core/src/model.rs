use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A point on the globe, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// One forecast slot as returned by `/api/weather/forecast`.
///
/// Kept verbatim: `time` stays the server string (`YYYY-MM-DDTHH:MM:SS`)
/// and absent `pop`/`rain` stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub time: String,
    pub temp: f64,
    pub weather: String,
    /// Precipitation probability in `[0, 1]`.
    #[serde(default)]
    pub pop: Option<f64>,
    /// Rain volume in millimetres.
    #[serde(default)]
    pub rain: Option<f64>,
}

impl ForecastEntry {
    /// Calendar date taken from the first 10 characters of `time`.
    pub fn date(&self) -> Option<NaiveDate> {
        let prefix = self.time.get(..10)?;
        NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
    }

    /// Hour of day taken from characters 11..13 of `time`.
    pub fn hour(&self) -> Option<u32> {
        let hour: u32 = self.time.get(11..13)?.parse().ok()?;
        (hour < 24).then_some(hour)
    }

    /// `HH:MM` label, as shown on a forecast card.
    pub fn clock_label(&self) -> &str {
        self.time.get(11..16).unwrap_or(&self.time)
    }
}
