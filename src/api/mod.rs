use async_trait::async_trait;

use crate::error::ApiResult;
use crate::models::{
    AuthResponse, Booking, BookingRequest, JobStatus, LoginRequest, MetricsSnapshot, NewService,
    PriceEstimate, Service, SignupRequest,
};

pub mod backend_client;
pub use backend_client::BackendClient;

/// Every backend endpoint the client talks to.
///
/// Views hold this as `Arc<dyn CleaningApi>` so tests can swap in a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CleaningApi: Send + Sync {
    /// GET /api/admin/metrics
    async fn admin_metrics(&self) -> ApiResult<MetricsSnapshot>;

    /// GET /api/services
    async fn list_services(&self) -> ApiResult<Vec<Service>>;

    /// POST /api/services
    async fn create_service(&self, service: &NewService) -> ApiResult<()>;

    /// POST /api/bookings/estimate
    async fn estimate_booking(&self, request: &BookingRequest) -> ApiResult<PriceEstimate>;

    /// POST /api/bookings
    async fn create_booking(&self, request: &BookingRequest) -> ApiResult<PriceEstimate>;

    /// GET /api/customers/{id}/bookings
    async fn customer_bookings(&self, customer_id: &str) -> ApiResult<Vec<Booking>>;

    /// GET /api/cleaners/{id}/bookings
    async fn cleaner_bookings(&self, cleaner_id: &str) -> ApiResult<Vec<Booking>>;

    /// POST /api/bookings/{id}/status
    async fn update_booking_status(&self, booking_id: &str, status: JobStatus) -> ApiResult<()>;

    /// POST /api/auth/signup
    async fn signup(&self, request: &SignupRequest) -> ApiResult<AuthResponse>;

    /// POST /api/auth/login
    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse>;
}
