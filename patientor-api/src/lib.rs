//! Backend gateway: URL layout plus the fetch operations the client
//! consumes. The URL layout and payload types compile everywhere; the actual
//! fetch calls exist on wasm32 only.

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";

/// Where the backend lives. The path layout underneath is fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    pub fn ping_url(&self) -> String {
        format!("{}/ping", self.base_url)
    }

    pub fn patients_url(&self) -> String {
        format!("{}/patients", self.base_url)
    }

    pub fn diagnoses_url(&self) -> String {
        format!("{}/diagnoses", self.base_url)
    }

    pub fn entries_url(&self, patient_id: &str) -> String {
        format!("{}/patients/{patient_id}/entries", self.base_url)
    }
}

/// Mount-time configuration handed over from JavaScript; every field is
/// optional and falls back to the default.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsApiConfig {
    #[serde(default)]
    pub api_base_url: Option<String>,
}

impl From<JsApiConfig> for ApiConfig {
    fn from(config: JsApiConfig) -> Self {
        match config.api_base_url {
            Some(base_url) => ApiConfig::new(base_url),
            None => ApiConfig::default(),
        }
    }
}

/// Gateway failures, propagated upward as-is: no retry, no recovery.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("backend answered with status {0}")]
    Status(u16),
    #[error("could not decode response: {0}")]
    Decode(String),
}

#[cfg(target_arch = "wasm32")]
mod fetch {
    use gloo_net::http::{Request, Response};
    use patientor_core::{Diagnosis, Entry, EntryDraft, NewPatient, Patient};
    use serde::de::DeserializeOwned;

    use crate::{ApiConfig, ApiError};

    fn network(err: gloo_net::Error) -> ApiError {
        ApiError::Network(err.to_string())
    }

    fn ensure_status(response: &Response) -> Result<(), ApiError> {
        if response.ok() {
            Ok(())
        } else {
            Err(ApiError::Status(response.status()))
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        ensure_status(&response)?;
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    /// Liveness probe issued at startup; the body is ignored.
    pub async fn ping(config: &ApiConfig) -> Result<(), ApiError> {
        let response = Request::get(&config.ping_url())
            .send()
            .await
            .map_err(network)?;
        ensure_status(&response)
    }

    pub async fn fetch_patients(config: &ApiConfig) -> Result<Vec<Patient>, ApiError> {
        let response = Request::get(&config.patients_url())
            .send()
            .await
            .map_err(network)?;
        decode(response).await
    }

    pub async fn fetch_diagnoses(config: &ApiConfig) -> Result<Vec<Diagnosis>, ApiError> {
        let response = Request::get(&config.diagnoses_url())
            .send()
            .await
            .map_err(network)?;
        decode(response).await
    }

    pub async fn create_patient(
        config: &ApiConfig,
        patient: &NewPatient,
    ) -> Result<Patient, ApiError> {
        let response = Request::post(&config.patients_url())
            .json(patient)
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;
        decode(response).await
    }

    /// Submits an id-less draft; the response is the persisted entry with
    /// the server-assigned id.
    pub async fn submit_entry(
        config: &ApiConfig,
        patient_id: &str,
        draft: &EntryDraft,
    ) -> Result<Entry, ApiError> {
        let response = Request::post(&config.entries_url(patient_id))
            .json(draft)
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;
        decode(response).await
    }
}

#[cfg(target_arch = "wasm32")]
pub use fetch::{create_patient, fetch_diagnoses, fetch_patients, ping, submit_entry};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_layout_matches_the_backend() {
        let config = ApiConfig::default();
        assert_eq!(config.ping_url(), "http://localhost:3001/api/ping");
        assert_eq!(config.patients_url(), "http://localhost:3001/api/patients");
        assert_eq!(config.diagnoses_url(), "http://localhost:3001/api/diagnoses");
        assert_eq!(
            config.entries_url("d2773336-f723-11e9-8f0b-362b9e155667"),
            "http://localhost:3001/api/patients/d2773336-f723-11e9-8f0b-362b9e155667/entries"
        );
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let config = ApiConfig::new("https://example.test/api/");
        assert_eq!(config.ping_url(), "https://example.test/api/ping");
    }

    #[test]
    fn js_config_overrides_the_base_url() {
        let parsed: JsApiConfig =
            serde_json::from_str(r#"{ "apiBaseUrl": "https://example.test/api" }"#).unwrap();
        assert_eq!(
            ApiConfig::from(parsed),
            ApiConfig::new("https://example.test/api")
        );

        let empty: JsApiConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(ApiConfig::from(empty), ApiConfig::default());
    }
}
