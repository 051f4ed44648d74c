//! Forecast screen for the selected stadium.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::{
    client::{ForecastClient, LoadState},
    error::StadiumError,
    model::ForecastEntry,
    presenter::{DateNavigator, HourlyCard, RiskThresholds, available_dates, cards_for, group_by_date},
    stadium::Stadium,
    storage::Storage,
};

/// What the forecast area should show.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastScreen {
    /// Nothing has been loaded yet.
    Idle,
    /// No upcoming forecast for the stadium. `failure` is set when loading failed.
    NoData { stadium: &'static Stadium, failure: Option<String> },
    Day(DayView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayView {
    pub stadium: &'static Stadium,
    pub source: LoadState,
    pub dates: Vec<NaiveDate>,
    pub selected: NaiveDate,
    /// Cards inside the display window. Empty means "nothing to show for
    /// this date", which is rendered explicitly.
    pub cards: Vec<HourlyCard>,
}

#[derive(Debug)]
struct Loaded {
    stadium: &'static Stadium,
    state: LoadState,
    grouped: BTreeMap<NaiveDate, Vec<ForecastEntry>>,
    navigator: DateNavigator,
}

#[derive(Debug)]
pub struct ForecastBoard<S: Storage> {
    client: ForecastClient<S>,
    thresholds: RiskThresholds,
    date_cap: usize,
    loaded: Option<Loaded>,
}

impl<S: Storage> ForecastBoard<S> {
    pub fn new(client: ForecastClient<S>, thresholds: RiskThresholds, date_cap: usize) -> Self {
        Self { client, thresholds, date_cap, loaded: None }
    }

    pub fn client_mut(&mut self) -> &mut ForecastClient<S> {
        &mut self.client
    }

    pub fn stadium(&self) -> Option<&'static Stadium> {
        self.loaded.as_ref().map(|l| l.stadium)
    }

    /// Load `stadium` and reset the date selection to its default.
    pub async fn show(&mut self, stadium: &'static Stadium, today: NaiveDate, force_refresh: bool) -> ForecastScreen {
        let load = self.client.load(stadium.full_name, force_refresh).await;

        let grouped = group_by_date(&load.entries);
        let navigator = DateNavigator::new(available_dates(&grouped, today, self.date_cap), today);

        self.loaded = Some(Loaded { stadium, state: load.state, grouped, navigator });
        self.screen()
    }

    /// Like [`show`](Self::show) but starting from a short name.
    pub async fn show_short_name(
        &mut self,
        short_name: &str,
        today: NaiveDate,
        force_refresh: bool,
    ) -> Result<ForecastScreen, StadiumError> {
        let stadium = Stadium::find(short_name)?;
        Ok(self.show(stadium, today, force_refresh).await)
    }

    /// Reload the current stadium from the network.
    pub async fn refresh(&mut self, today: NaiveDate) -> ForecastScreen {
        match self.stadium() {
            Some(stadium) => self.show(stadium, today, true).await,
            None => ForecastScreen::Idle,
        }
    }

    pub fn screen(&self) -> ForecastScreen {
        let Some(loaded) = &self.loaded else {
            return ForecastScreen::Idle;
        };

        let failure = match &loaded.state {
            LoadState::Failed(msg) => Some(msg.clone()),
            _ => None,
        };

        let Some(selected) = loaded.navigator.selected() else {
            return ForecastScreen::NoData { stadium: loaded.stadium, failure };
        };

        let entries = loaded.grouped.get(&selected).map(Vec::as_slice).unwrap_or_default();

        ForecastScreen::Day(DayView {
            stadium: loaded.stadium,
            source: loaded.state.clone(),
            dates: loaded.navigator.dates().to_vec(),
            selected,
            cards: cards_for(entries, &self.thresholds),
        })
    }

    pub fn next_date(&mut self) -> ForecastScreen {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.navigator.swipe_left();
        }
        self.screen()
    }

    pub fn previous_date(&mut self) -> ForecastScreen {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.navigator.swipe_right();
        }
        self.screen()
    }

    /// Jump to `date`. Returns `false` if it is not among the offered dates.
    pub fn select_date(&mut self, date: NaiveDate) -> bool {
        self.loaded.as_mut().is_some_and(|l| l.navigator.select(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cache::ForecastCache, storage::MemoryStorage};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn seeded_board(entries: &[ForecastEntry]) -> ForecastBoard<MemoryStorage> {
        let mut cache = ForecastCache::new(MemoryStorage::new());
        cache.set("고척스카이돔", entries);
        // Unroutable base: any network use would fail the load.
        let client = ForecastClient::new("http://127.0.0.1:9", cache);
        ForecastBoard::new(client, RiskThresholds::default(), 5)
    }

    fn entry(time: &str) -> ForecastEntry {
        ForecastEntry { time: time.into(), temp: 15.0, weather: "맑음".into(), pop: Some(0.3), rain: None }
    }

    #[tokio::test]
    async fn idle_before_first_load() {
        let board = seeded_board(&[]);
        assert_eq!(board.screen(), ForecastScreen::Idle);
    }

    #[tokio::test]
    async fn unknown_short_name_is_rejected_without_loading() {
        let mut board = seeded_board(&[]);
        let err = board.show_short_name("서울(고척)", today(), false).await.unwrap_err();
        assert_eq!(err, StadiumError::Unknown("서울(고척)".into()));
        assert_eq!(board.screen(), ForecastScreen::Idle);
    }

    #[tokio::test]
    async fn cached_forecast_defaults_to_today_and_navigates() {
        let mut board = seeded_board(&[
            entry("2026-10-17T12:00:00"),
            entry("2026-10-18T06:00:00"),
            entry("2026-10-18T12:00:00"),
            entry("2026-10-19T03:00:00"),
        ]);

        let screen = board.show_short_name("고척", today(), false).await.unwrap();
        let ForecastScreen::Day(view) = screen else { panic!("expected a day view") };
        assert_eq!(view.source, LoadState::Cached);
        assert_eq!(view.selected, today());
        assert_eq!(view.dates.len(), 2);
        assert_eq!(view.cards.len(), 1);
        assert_eq!(view.cards[0].clock, "12:00");

        let ForecastScreen::Day(next) = board.next_date() else { panic!("expected a day view") };
        assert_eq!(next.selected, today().succ_opt().unwrap());
        // Only a 03:00 slot: the day exists but has nothing in the window.
        assert!(next.cards.is_empty());

        let ForecastScreen::Day(clamped) = board.next_date() else { panic!("expected a day view") };
        assert_eq!(clamped.selected, next.selected);

        let ForecastScreen::Day(back) = board.previous_date() else { panic!("expected a day view") };
        assert_eq!(back.selected, today());
    }

    #[tokio::test]
    async fn failed_load_is_no_data_with_reason() {
        let mut board = seeded_board(&[]);
        let stadium = Stadium::find("창원").unwrap();

        match board.show(stadium, today(), false).await {
            ForecastScreen::NoData { stadium, failure } => {
                assert_eq!(stadium.short_name, "창원");
                assert!(failure.is_some());
            }
            other => panic!("unexpected screen {other:?}"),
        }
    }

    #[tokio::test]
    async fn only_past_dates_is_no_data() {
        let mut board = seeded_board(&[entry("2026-10-10T12:00:00")]);
        let screen = board.show_short_name("고척", today(), false).await.unwrap();

        assert!(matches!(screen, ForecastScreen::NoData { failure: None, .. }));
    }
}
