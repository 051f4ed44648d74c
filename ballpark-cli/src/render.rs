use std::fmt::Write as _;

use ballpark_core::{
    DayView, ForecastScreen, HourlyCard, LoadState, Stadium, StadiumError,
    location::Located,
    presenter::{FIRST_DISPLAY_HOUR, LAST_DISPLAY_HOUR, Tone, date_label},
};
use chrono::NaiveDate;
use crossterm::style::Stylize;

fn paint(text: &str, tone: Tone, bold: bool) -> String {
    let styled = match tone {
        Tone::Alert => text.red(),
        Tone::Warning => text.yellow(),
        Tone::Plain => text.stylize(),
        Tone::Muted => text.dark_grey(),
    };

    if bold { styled.bold().to_string() } else { styled.to_string() }
}

pub fn stadium_table() -> String {
    let mut out = String::new();
    for stadium in Stadium::all() {
        let _ = writeln!(
            out,
            "{:<4}  {:<14}  {}  ({})",
            stadium.short_name, stadium.full_name, stadium.address, stadium.coordinates
        );
    }
    out
}

/// Server-side stadium names, marked with whether this CLI can select them.
pub fn remote_stadiums(names: &[String]) -> String {
    let mut out = String::new();
    for name in names {
        let known = Stadium::all().iter().find(|s| s.full_name == name.as_str());
        match known {
            Some(s) => {
                let _ = writeln!(out, "✓ {name} ({})", s.short_name);
            }
            None => {
                let _ = writeln!(out, "  {name} (not selectable)");
            }
        }
    }
    out
}

pub fn invalid_stadium(err: &StadiumError) -> String {
    format!("⚠️ {err}")
}

pub fn located(located: &Located) -> String {
    let accuracy = match located.position.accuracy_m {
        Some(m) if m > 0.0 => format!(" (±{m:.0} m)"),
        Some(_) => " (exact)".to_string(),
        None => " (approximate)".to_string(),
    };

    format!(
        "📍 {}{}\n🏟️ {} · {}",
        located.position.coordinates,
        accuracy,
        located.status_message(),
        located.stadium.address
    )
}

pub fn screen(screen: &ForecastScreen) -> String {
    match screen {
        ForecastScreen::Idle => "☁️ Loading forecast...".to_string(),
        ForecastScreen::NoData { stadium, failure: Some(reason) } => {
            format!("🏟️ {stadium}\n⚠️ Could not load the forecast: {reason}")
        }
        ForecastScreen::NoData { stadium, failure: None } => {
            format!("🏟️ {stadium}\n⚠️ No forecast data available.")
        }
        ForecastScreen::Day(view) => day(view),
    }
}

fn day(view: &DayView) -> String {
    let mut out = String::new();

    let origin = match view.source {
        LoadState::Cached => " (cached)",
        _ => "",
    };
    let _ = writeln!(out, "🏟️ {}{}", view.stadium.full_name.bold(), origin.dark_grey());
    let _ = writeln!(out, "{}", date_tabs(&view.dates, view.selected));
    out.push('\n');

    if view.cards.is_empty() {
        let _ = writeln!(
            out,
            "No forecast between {FIRST_DISPLAY_HOUR:02}:00 and {LAST_DISPLAY_HOUR:02}:00 on {}.",
            date_label(view.selected)
        );
        return out;
    }

    for c in &view.cards {
        out.push_str(&card(c));
        out.push('\n');
    }
    out
}

pub fn date_tabs(dates: &[NaiveDate], selected: NaiveDate) -> String {
    dates
        .iter()
        .map(|d| {
            let label = format!(" {} ", date_label(*d));
            if *d == selected { label.white().on_blue().to_string() } else { label }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn card(card: &HourlyCard) -> String {
    let treatment = card.tier().treatment();
    let mut out = String::new();

    let mut headline = format!("🕘 {}  🌡️ {:.1}℃  🌦️ {}", card.clock, card.temp, card.weather);
    if let Some(badge) = treatment.badge {
        headline.push_str("  ");
        headline.push_str(badge);
    }
    let _ = writeln!(out, "{}", paint(&headline, treatment.tone, treatment.bold));

    let pop_tone = if card.high_probability {
        Tone::Alert
    } else if card.low_probability {
        Tone::Muted
    } else {
        Tone::Plain
    };
    let rain_tone = if card.low_probability { Tone::Muted } else { Tone::Plain };
    let rain_marker = if card.rain_affected { " ⚠️" } else { "" };

    let _ = writeln!(
        out,
        "   {}   {}{}",
        paint(&format!("🌧️ rain chance {}%", card.pop_pct), pop_tone, false),
        paint(&format!("💧 rain {:.1}mm", card.rain_mm), rain_tone, false),
        rain_marker
    );

    if let Some(advisory) = treatment.advisory {
        let _ = writeln!(out, "   {}", paint(advisory, treatment.tone, treatment.bold));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballpark_core::{ForecastEntry, RiskThresholds};

    fn card_for(pop: f64, rain: Option<f64>) -> HourlyCard {
        let entry = ForecastEntry {
            time: "2026-10-18T18:00:00".into(),
            temp: 17.06,
            weather: "비".into(),
            pop: Some(pop),
            rain,
        };
        HourlyCard::new(&entry, &RiskThresholds::default())
    }

    #[test]
    fn heavy_rain_card_shows_advisory() {
        let out = card(&card_for(0.95, Some(6.2)));
        assert!(out.contains("18:00"));
        assert!(out.contains("17.1℃"));
        assert!(out.contains("rain 6.2mm"));
        assert!(out.contains("Cancellation / rain delay risk"));
    }

    #[test]
    fn rain_affected_card_shows_advisory_and_one_marker() {
        let out = card(&card_for(0.9, Some(3.0)));
        assert!(out.contains("Rain may affect play"));
        assert!(!out.contains("Cancellation"));
        assert_eq!(out.matches("⚠️").count(), 1);
    }

    #[test]
    fn high_probability_card_shows_advisory() {
        let out = card(&card_for(0.8, Some(0.5)));
        assert!(out.contains("☔"));
        assert!(out.contains("High chance of rain"));
        assert!(!out.contains("⚠️"));
    }

    #[test]
    fn light_rain_card_has_no_advisory() {
        let out = card(&card_for(0.3, Some(0.4)));
        assert!(out.contains("rain chance 30%"));
        assert!(!out.contains("Cancellation"));
        assert!(!out.contains("⚠️"));
    }

    #[test]
    fn empty_day_is_explicit() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let view = DayView {
            stadium: Stadium::default_stadium(),
            source: LoadState::Fetched,
            dates: vec![date],
            selected: date,
            cards: Vec::new(),
        };

        let out = screen(&ForecastScreen::Day(view));
        assert!(out.contains("No forecast between 08:00 and 23:00 on 10/19 (Mon)"));
    }

    #[test]
    fn no_data_mentions_failure() {
        let out = screen(&ForecastScreen::NoData {
            stadium: Stadium::default_stadium(),
            failure: Some("status 500".into()),
        });
        assert!(out.contains("대전한화생명볼파크"));
        assert!(out.contains("status 500"));
    }

    #[test]
    fn located_reports_fix_accuracy() {
        use ballpark_core::{Coordinates, location::Position};

        let exact = Position { accuracy_m: Some(0.0), ..Position::now(Coordinates::new(35.87, 128.68)) };
        let fuzzy = Position { accuracy_m: None, ..exact };
        let at = |position| Located { position, stadium: Stadium::default_stadium(), distance_km: 1.0 };

        assert!(located(&at(exact)).contains("(exact)"));
        assert!(located(&at(fuzzy)).contains("(approximate)"));
    }

    #[test]
    fn table_lists_every_stadium() {
        let out = stadium_table();
        assert_eq!(out.lines().count(), Stadium::all().len());
        assert!(out.contains("창원NC파크"));
    }

    #[test]
    fn remote_list_marks_unknown_names() {
        let out = remote_stadiums(&["고척스카이돔".to_string(), "목동야구장".to_string()]);
        assert!(out.contains("✓ 고척스카이돔 (고척)"));
        assert!(out.contains("목동야구장 (not selectable)"));
    }
}
