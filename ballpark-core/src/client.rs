use reqwest::Client;
use tracing::{info, warn};

use crate::{
    cache::ForecastCache,
    error::{ForecastError, truncate_body},
    model::ForecastEntry,
    storage::Storage,
};

/// Where the entries of a [`ForecastLoad`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Cached,
    Fetched,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ForecastLoad {
    pub entries: Vec<ForecastEntry>,
    pub state: LoadState,
}

impl ForecastLoad {
    pub fn failed(&self) -> bool {
        matches!(self.state, LoadState::Failed(_))
    }
}

/// Cache-first client for the ballpark forecast API.
#[derive(Debug)]
pub struct ForecastClient<S: Storage> {
    api_base: String,
    http: Client,
    cache: ForecastCache<S>,
}

impl<S: Storage> ForecastClient<S> {
    pub fn new(api_base: impl Into<String>, cache: ForecastCache<S>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            http: Client::new(),
            cache,
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn cache_mut(&mut self) -> &mut ForecastCache<S> {
        &mut self.cache
    }

    /// Forecast for one stadium. Never fails: a broken request yields no
    /// entries and [`LoadState::Failed`].
    pub async fn load(&mut self, stadium_full_name: &str, force_refresh: bool) -> ForecastLoad {
        if !force_refresh {
            if let Some(entries) = self.cache.get(stadium_full_name) {
                return ForecastLoad { entries, state: LoadState::Cached };
            }
        }

        match self.fetch(stadium_full_name).await {
            Ok(entries) => {
                info!(stadium = stadium_full_name, count = entries.len(), "fetched forecast");
                self.cache.set(stadium_full_name, &entries);
                ForecastLoad { entries, state: LoadState::Fetched }
            }
            Err(err) => {
                warn!(stadium = stadium_full_name, error = %err, "forecast load failed");
                ForecastLoad { entries: Vec::new(), state: LoadState::Failed(err.to_string()) }
            }
        }
    }

    async fn fetch(&self, stadium_full_name: &str) -> Result<Vec<ForecastEntry>, ForecastError> {
        let url = format!("{}/api/weather/forecast", self.api_base);

        let res = self.http.get(&url).query(&[("stadium", stadium_full_name)]).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ForecastError::Status { status, body: truncate_body(&body) });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Full names of the stadiums the server has forecasts for.
    pub async fn remote_stadiums(&self) -> Result<Vec<String>, ForecastError> {
        let url = format!("{}/api/weather/stadiums", self.api_base);

        let res = self.http.get(&url).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ForecastError::Status { status, body: truncate_body(&body) });
        }

        let mut names: Vec<String> = serde_json::from_str(&body)?;
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base: &str) -> ForecastClient<MemoryStorage> {
        ForecastClient::new(base, ForecastCache::new(MemoryStorage::new()))
    }

    fn body() -> serde_json::Value {
        serde_json::json!([
            {"time": "2026-10-18T09:00:00", "temp": 16.3, "weather": "맑음", "pop": 0.0},
            {"time": "2026-10-18T12:00:00", "temp": 19.8, "weather": "비", "pop": 0.8, "rain": 3.2}
        ])
    }

    #[tokio::test]
    async fn miss_fetches_once_then_serves_from_cache() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/weather/forecast"))
            .and(query_param("stadium", "서울종합운동장 야구장"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body()))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = client(&server.uri());

        let first = client.load("서울종합운동장 야구장", false).await;
        assert_eq!(first.state, LoadState::Fetched);
        assert_eq!(first.entries.len(), 2);
        assert_eq!(first.entries[1].rain, Some(3.2));

        let second = client.load("서울종합운동장 야구장", false).await;
        assert_eq!(second.state, LoadState::Cached);
        assert_eq!(second.entries, first.entries);
    }

    #[tokio::test]
    async fn forced_refresh_skips_cache() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/weather/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body()))
            .expect(2)
            .mount(&server)
            .await;

        let mut client = client(&server.uri());
        client.load("부산사직구장", false).await;
        let refreshed = client.load("부산사직구장", true).await;

        assert_eq!(refreshed.state, LoadState::Fetched);
    }

    #[tokio::test]
    async fn error_status_yields_empty_failed_load() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/weather/forecast"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let mut client = client(&server.uri());
        let load = client.load("없는구장", false).await;

        assert!(load.entries.is_empty());
        assert!(load.failed());
        assert!(client.cache_mut().get("없는구장").is_none());
    }

    #[tokio::test]
    async fn malformed_json_yields_empty_failed_load() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/weather/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let mut client = client(&server.uri());
        let load = client.load("창원NC파크", false).await;

        assert!(load.entries.is_empty());
        match load.state {
            LoadState::Failed(msg) => assert!(msg.contains("parse")),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_server_yields_empty_failed_load() {
        // Nothing listens on port 9 of localhost in the test environment.
        let mut client = client("http://127.0.0.1:9");
        let load = client.load("고척스카이돔", false).await;

        assert!(load.entries.is_empty());
        assert!(load.failed());
    }

    #[tokio::test]
    async fn trailing_slash_in_base_is_ignored() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/weather/stadiums"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!(["창원NC파크", "고척스카이돔"])),
            )
            .mount(&server)
            .await;

        let client = client(&format!("{}/", server.uri()));
        let names = client.remote_stadiums().await.unwrap();

        assert_eq!(names, vec!["고척스카이돔".to_string(), "창원NC파크".to_string()]);
    }
}
