//! Turns raw forecast entries into per-day, per-hour cards.
//!
//! Everything here is pure: "today" is passed in by the caller.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::warn;

use crate::model::ForecastEntry;

pub const DEFAULT_DATE_CAP: usize = 5;

/// Inclusive display window, in local hours.
pub const FIRST_DISPLAY_HOUR: u32 = 8;
pub const LAST_DISPLAY_HOUR: u32 = 23;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskThresholds {
    /// Below this probability a slot is de-emphasised.
    pub low_pop_pct: u32,
    pub high_pop_pct: u32,
    pub rain_affected_mm: f64,
    pub cancellation_mm: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self { low_pop_pct: 20, high_pop_pct: 60, rain_affected_mm: 2.0, cancellation_mm: 5.0 }
    }
}

/// Entries keyed by calendar date, ascending. Entries with an unreadable
/// timestamp are dropped.
pub fn group_by_date(entries: &[ForecastEntry]) -> BTreeMap<NaiveDate, Vec<ForecastEntry>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<ForecastEntry>> = BTreeMap::new();

    for entry in entries {
        match entry.date() {
            Some(date) => grouped.entry(date).or_default().push(entry.clone()),
            None => warn!(time = %entry.time, "skipping forecast entry with unreadable time"),
        }
    }

    grouped
}

/// Dates from `today` onwards, ascending, at most `cap` of them.
pub fn available_dates<V>(grouped: &BTreeMap<NaiveDate, V>, today: NaiveDate, cap: usize) -> Vec<NaiveDate> {
    grouped.range(today..).map(|(date, _)| *date).take(cap).collect()
}

/// Today when it has data, else the earliest date offered.
pub fn default_date(dates: &[NaiveDate], today: NaiveDate) -> Option<NaiveDate> {
    if dates.contains(&today) { Some(today) } else { dates.iter().min().copied() }
}

pub fn in_display_window(entry: &ForecastEntry) -> bool {
    entry.hour().is_some_and(|h| (FIRST_DISPLAY_HOUR..=LAST_DISPLAY_HOUR).contains(&h))
}

/// Most severe condition of a slot; decides how its card is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskTier {
    CancellationRisk,
    RainAffected,
    HighProbability,
    Normal,
    LowProbability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Alert,
    Warning,
    Plain,
    Muted,
}

/// Fixed visual treatment of a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Treatment {
    pub tone: Tone,
    pub bold: bool,
    pub badge: Option<&'static str>,
    pub advisory: Option<&'static str>,
}

impl RiskTier {
    pub fn treatment(self) -> Treatment {
        match self {
            RiskTier::CancellationRisk => Treatment {
                tone: Tone::Alert,
                bold: true,
                badge: None,
                advisory: Some("Cancellation / rain delay risk"),
            },
            RiskTier::RainAffected => Treatment {
                tone: Tone::Warning,
                bold: false,
                badge: None,
                advisory: Some("Rain may affect play"),
            },
            RiskTier::HighProbability => Treatment {
                tone: Tone::Warning,
                bold: false,
                badge: Some("☔"),
                advisory: Some("High chance of rain"),
            },
            RiskTier::Normal => Treatment { tone: Tone::Plain, bold: false, badge: None, advisory: None },
            RiskTier::LowProbability => {
                Treatment { tone: Tone::Muted, bold: false, badge: None, advisory: None }
            }
        }
    }
}

/// One rendered forecast slot. Flags are fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyCard {
    /// Server timestamp, verbatim.
    pub time: String,
    /// `HH:MM`.
    pub clock: String,
    pub temp: f64,
    pub weather: String,
    /// Rounded to 0.1 mm; 0.0 when the server sent nothing.
    pub rain_mm: f64,
    /// Rounded percentage.
    pub pop_pct: u32,
    pub low_probability: bool,
    pub high_probability: bool,
    pub rain_affected: bool,
    pub cancellation_risk: bool,
}

impl HourlyCard {
    pub fn new(entry: &ForecastEntry, thresholds: &RiskThresholds) -> Self {
        let rain_mm = round_tenth(entry.rain.unwrap_or(0.0));
        let pop_pct = (entry.pop.unwrap_or(0.0) * 100.0).round().clamp(0.0, 100.0) as u32;

        Self {
            time: entry.time.clone(),
            clock: entry.clock_label().to_string(),
            temp: entry.temp,
            weather: entry.weather.clone(),
            rain_mm,
            pop_pct,
            low_probability: pop_pct < thresholds.low_pop_pct,
            high_probability: pop_pct >= thresholds.high_pop_pct,
            rain_affected: rain_mm >= thresholds.rain_affected_mm,
            cancellation_risk: rain_mm >= thresholds.cancellation_mm,
        }
    }

    pub fn tier(&self) -> RiskTier {
        if self.cancellation_risk {
            RiskTier::CancellationRisk
        } else if self.rain_affected {
            RiskTier::RainAffected
        } else if self.high_probability {
            RiskTier::HighProbability
        } else if self.low_probability {
            RiskTier::LowProbability
        } else {
            RiskTier::Normal
        }
    }
}

fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Cards for one date, limited to the display window.
pub fn cards_for(entries: &[ForecastEntry], thresholds: &RiskThresholds) -> Vec<HourlyCard> {
    entries
        .iter()
        .filter(|e| in_display_window(e))
        .map(|e| HourlyCard::new(e, thresholds))
        .collect()
}

/// `10/18 (Sun)`.
pub fn date_label(date: NaiveDate) -> String {
    date.format("%m/%d (%a)").to_string()
}

/// Selected position within the available dates.
///
/// Swiping left moves to the next date, swiping right to the previous one;
/// both stop at the ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateNavigator {
    dates: Vec<NaiveDate>,
    selected: Option<usize>,
}

impl DateNavigator {
    pub fn new(dates: Vec<NaiveDate>, today: NaiveDate) -> Self {
        let selected = default_date(&dates, today).and_then(|d| dates.iter().position(|x| *x == d));
        Self { dates, selected }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected.map(|i| self.dates[i])
    }

    pub fn swipe_left(&mut self) -> Option<NaiveDate> {
        if let Some(i) = self.selected {
            if i + 1 < self.dates.len() {
                self.selected = Some(i + 1);
            }
        }
        self.selected()
    }

    pub fn swipe_right(&mut self) -> Option<NaiveDate> {
        if let Some(i) = self.selected {
            self.selected = Some(i.saturating_sub(1));
        }
        self.selected()
    }

    /// Jump to `date` if it is offered. Returns whether it was.
    pub fn select(&mut self, date: NaiveDate) -> bool {
        match self.dates.iter().position(|d| *d == date) {
            Some(i) => {
                self.selected = Some(i);
                true
            }
            None => false,
        }
    }
}
