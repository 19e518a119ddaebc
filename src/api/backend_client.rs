use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::CleaningApi;
use crate::error::{ApiResult, ClientError};
use crate::models::{
    AuthResponse, Booking, BookingRequest, Config, JobStatus, LoginRequest, MetricsSnapshot,
    NewService, PriceEstimate, Service, SignupRequest, StatusUpdate,
};

/// HTTP client for the booking backend
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a new backend client
    pub fn new(config: &Config) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("cleanly/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = Url::parse(&config.backend_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::BaseUrl(config.backend_url.clone()));
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<T> {
        let url = self.endpoint(segments)?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        decode(check_status(response).await?).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> ApiResult<T> {
        let response = self.post(segments, body).await?;
        decode(response).await
    }

    /// POST whose response body is not used
    async fn post_unit<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> ApiResult<()> {
        self.post(segments, body).await?;
        Ok(())
    }

    async fn post<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> ApiResult<Response> {
        let url = self.endpoint(segments)?;
        debug!("POST {}", url);

        let response = self.client.post(url).json(body).send().await?;
        check_status(response).await
    }
}

async fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!("Backend request failed with status {}: {}", status.as_u16(), body);
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let bytes = response.bytes().await?;
    debug!("Response received: {} bytes", bytes.len());
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl CleaningApi for BackendClient {
    async fn admin_metrics(&self) -> ApiResult<MetricsSnapshot> {
        self.get_json(&["api", "admin", "metrics"]).await
    }

    async fn list_services(&self) -> ApiResult<Vec<Service>> {
        self.get_json(&["api", "services"]).await
    }

    async fn create_service(&self, service: &NewService) -> ApiResult<()> {
        self.post_unit(&["api", "services"], service).await
    }

    async fn estimate_booking(&self, request: &BookingRequest) -> ApiResult<PriceEstimate> {
        self.post_json(&["api", "bookings", "estimate"], request).await
    }

    async fn create_booking(&self, request: &BookingRequest) -> ApiResult<PriceEstimate> {
        self.post_json(&["api", "bookings"], request).await
    }

    async fn customer_bookings(&self, customer_id: &str) -> ApiResult<Vec<Booking>> {
        self.get_json(&["api", "customers", customer_id, "bookings"]).await
    }

    async fn cleaner_bookings(&self, cleaner_id: &str) -> ApiResult<Vec<Booking>> {
        self.get_json(&["api", "cleaners", cleaner_id, "bookings"]).await
    }

    async fn update_booking_status(&self, booking_id: &str, status: JobStatus) -> ApiResult<()> {
        self.post_unit(&["api", "bookings", booking_id, "status"], &StatusUpdate { status })
            .await
    }

    async fn signup(&self, request: &SignupRequest) -> ApiResult<AuthResponse> {
        self.post_json(&["api", "auth", "signup"], request).await
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse> {
        self.post_json(&["api", "auth", "login"], request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> BackendClient {
        BackendClient::new(&Config::for_backend(base)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let url = client("http://localhost:8000").endpoint(&["api", "services"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/services");
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let url = client("https://example.test/cleanly/").endpoint(&["api", "auth", "login"]).unwrap();
        assert_eq!(url.as_str(), "https://example.test/cleanly/api/auth/login");
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let url = client("http://localhost:8000")
            .endpoint(&["api", "customers", "a b/c", "bookings"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/customers/a%20b%2Fc/bookings");
    }

    #[test]
    fn test_rejects_non_base_url() {
        let result = BackendClient::new(&Config::for_backend("mailto:ops@cleanly.test"));
        assert!(matches!(result, Err(ClientError::BaseUrl(_))));
        if let Err(err) = result {
            assert_eq!(
                err.to_string(),
                "backend url cannot be used as a base: mailto:ops@cleanly.test"
            );
        }
    }
}
