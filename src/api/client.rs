use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;

use crate::api::error::ApiError;
use crate::api::types::{
    CatalogResponse, Health, LivePosition, OrbitQuery, PassQuery, PassWindowResult,
    SatelliteInfo, TleStatus, TleStatusResponse, Track, TrackKind, TrackQuery, TrackResponse,
};

/// Read-only view of the prediction service
#[async_trait]
pub trait PredictionApi: Send + Sync {
    async fn health(&self) -> Result<Health, ApiError>;
    async fn satellites(&self) -> Result<Vec<SatelliteInfo>, ApiError>;
    async fn passes(&self, query: &PassQuery) -> Result<PassWindowResult, ApiError>;
    async fn pass_track(&self, query: &TrackQuery) -> Result<Track, ApiError>;
    async fn orbit_track(&self, query: &OrbitQuery) -> Result<Track, ApiError>;
    async fn position(&self, satellite: &str) -> Result<LivePosition, ApiError>;
    async fn tle_status(&self) -> Result<Vec<TleStatus>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpPredictionApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpPredictionApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidUrl(base_url));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("pass-o-mat/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport {
                resource: base_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `resource` with `params` and decode the JSON body
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, resource);
        log::debug!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                resource: resource.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::Transport {
            resource: resource.to_string(),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                resource: resource.to_string(),
                code: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            resource: resource.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl PredictionApi for HttpPredictionApi {
    async fn health(&self) -> Result<Health, ApiError> {
        self.fetch("/health", &[]).await
    }

    async fn satellites(&self) -> Result<Vec<SatelliteInfo>, ApiError> {
        let catalog: CatalogResponse = self.fetch("/satellites", &[]).await?;
        Ok(catalog.satellites)
    }

    async fn passes(&self, query: &PassQuery) -> Result<PassWindowResult, ApiError> {
        let mut params = vec![
            ("satellite", query.satellite.clone()),
            ("hours", query.hours.to_string()),
            ("min_elevation_deg", query.min_elevation_deg.to_string()),
        ];
        if let Some(start) = query.start {
            params.push(("start_utc", format_instant(start)));
        }
        self.fetch("/passes", &params).await
    }

    async fn pass_track(&self, query: &TrackQuery) -> Result<Track, ApiError> {
        let params = [
            ("satellite", query.satellite.clone()),
            ("start_utc", format_instant(query.start)),
            ("end_utc", format_instant(query.end)),
            ("step_seconds", query.step_seconds.to_string()),
        ];
        let response: TrackResponse = self.fetch("/track", &params).await?;
        response
            .into_track(TrackKind::Pass)
            .map_err(|message| ApiError::Decode {
                resource: "/track".into(),
                message,
            })
    }

    async fn orbit_track(&self, query: &OrbitQuery) -> Result<Track, ApiError> {
        let params = [
            ("satellite", query.satellite.clone()),
            ("minutes", query.minutes.to_string()),
            ("step_seconds", query.step_seconds.to_string()),
        ];
        let response: TrackResponse = self.fetch("/track/now", &params).await?;
        response
            .into_track(TrackKind::Orbit)
            .map_err(|message| ApiError::Decode {
                resource: "/track/now".into(),
                message,
            })
    }

    async fn position(&self, satellite: &str) -> Result<LivePosition, ApiError> {
        self.fetch("/position", &[("satellite", satellite.to_string())])
            .await
    }

    async fn tle_status(&self) -> Result<Vec<TleStatus>, ApiError> {
        let status: TleStatusResponse = self.fetch("/tle/status", &[]).await?;
        Ok(status.satellites)
    }
}

fn format_instant(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}
