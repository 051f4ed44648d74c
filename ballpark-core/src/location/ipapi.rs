use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{LocationError, truncate_body},
    model::Coordinates,
};

use super::{LocationSource, Position, PositionOptions};

pub const DEFAULT_IPAPI_URL: &str = "http://ip-api.com/json";

/// Approximate position from the public IP address (ip-api.com format).
#[derive(Debug, Clone)]
pub struct IpApiLocation {
    url: String,
    http: Client,
}

impl IpApiLocation {
    pub fn new(url: String) -> Self {
        Self { url, http: Client::new() }
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    message: Option<String>,
}

#[async_trait]
impl LocationSource for IpApiLocation {
    async fn current_position(&self, options: &PositionOptions) -> Result<Position, LocationError> {
        if options.high_accuracy {
            debug!("IP geolocation is city-level; high accuracy is not available");
        }

        let res = self.http.get(&self.url).send().await.map_err(|err| {
            if err.is_timeout() {
                LocationError::Timeout
            } else {
                LocationError::Unavailable(err.to_string())
            }
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|err| LocationError::Unavailable(err.to_string()))?;

        if status == StatusCode::FORBIDDEN {
            return Err(LocationError::PermissionDenied);
        }
        if !status.is_success() {
            return Err(LocationError::Unavailable(format!(
                "status {status}: {}",
                truncate_body(&body)
            )));
        }

        let parsed: IpApiResponse = serde_json::from_str(&body)
            .map_err(|err| LocationError::PositionUnavailable(err.to_string()))?;

        if parsed.status != "success" {
            return Err(LocationError::PositionUnavailable(
                parsed.message.unwrap_or_else(|| parsed.status.clone()),
            ));
        }

        match (parsed.lat, parsed.lon) {
            (Some(lat), Some(lon)) => {
                debug!(city = parsed.city.as_deref().unwrap_or("?"), lat, lon, "IP geolocation");
                Ok(Position::now(Coordinates::new(lat, lon)))
            }
            _ => Err(LocationError::PositionUnavailable("response had no coordinates".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn source_with(response: ResponseTemplate) -> (MockServer, IpApiLocation) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(response)
            .mount(&server)
            .await;
        let source = IpApiLocation::new(format!("{}/json", server.uri()));
        (server, source)
    }

    #[tokio::test]
    async fn success_yields_coordinates() {
        let (_server, source) = source_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"status": "success", "lat": 37.5665, "lon": 126.978, "city": "Seoul"}),
        ))
        .await;

        let pos = source.current_position(&PositionOptions::default()).await.unwrap();
        assert_eq!(pos.coordinates, Coordinates::new(37.5665, 126.978));
    }

    #[tokio::test]
    async fn fail_status_is_position_unavailable() {
        let (_server, source) = source_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"status": "fail", "message": "reserved range"}),
        ))
        .await;

        let err = source.current_position(&PositionOptions::default()).await.unwrap_err();
        assert_eq!(err, LocationError::PositionUnavailable("reserved range".into()));
    }

    #[tokio::test]
    async fn forbidden_is_permission_denied() {
        let (_server, source) = source_with(ResponseTemplate::new(403)).await;

        let err = source.current_position(&PositionOptions::default()).await.unwrap_err();
        assert_eq!(err, LocationError::PermissionDenied);
    }

    #[tokio::test]
    async fn server_error_is_unavailable() {
        let (_server, source) = source_with(ResponseTemplate::new(503).set_body_string("down")).await;

        let err = source.current_position(&PositionOptions::default()).await.unwrap_err();
        assert!(matches!(err, LocationError::Unavailable(_)));
    }
}
