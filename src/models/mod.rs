use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// Who is using the client; decides which affordances render
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Cleaner,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Customer, Role::Cleaner, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Cleaner => "cleaner",
            Role::Admin => "admin",
        }
    }

    /// Unknown or empty strings fall back to customer
    pub fn parse_lenient(value: &str) -> Role {
        match value.trim().to_ascii_lowercase().as_str() {
            "cleaner" => Role::Cleaner,
            "admin" => Role::Admin,
            _ => Role::Customer,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Customer => "Customer",
            Role::Cleaner => "Cleaner",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_active() -> bool {
    true
}

/// Service catalog entry as listed by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub base_price: f64,
    #[serde(default = "default_multiplier")]
    pub hourly_multiplier: f64,
    #[serde(default = "default_multiplier")]
    pub flat_multiplier: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Service record posted by the admin view
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewService {
    pub name: String,
    pub display_name: String,
    /// `None` when the typed price is not a number; sent as null
    pub base_price: Option<f64>,
    pub hourly_multiplier: f64,
    pub flat_multiplier: f64,
    pub is_active: bool,
}

impl NewService {
    pub fn with_default_multipliers(name: String, display_name: String, base_price: Option<f64>) -> Self {
        Self {
            name,
            display_name,
            base_price,
            hourly_multiplier: 1.0,
            flat_multiplier: 1.0,
            is_active: true,
        }
    }
}

/// Payload shared by the estimate and booking-creation endpoints
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BookingRequest {
    pub customer_id: String,
    pub service_type: String,
    /// ISO-8601 UTC timestamp, or null when the date/time inputs don't form one
    pub scheduled_start: Option<String>,
    pub duration_hours: Option<f64>,
    pub home_size: String,
    pub address_line1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// `{price_estimate}` response of estimate and booking creation
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PriceEstimate {
    #[serde(default)]
    pub price_estimate: Option<f64>,
}

/// Booking record as listed for a customer or cleaner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "RawBooking")]
pub struct Booking {
    pub id: String,
    pub service_type: String,
    pub scheduled_start: Option<String>,
    pub status: String,
    pub price_estimate: Option<f64>,
}

/// Booking as the backend sends it; ids may be `_id`, `id` or both, string or number
#[derive(Deserialize)]
struct RawBooking {
    #[serde(default, rename = "_id")]
    mongo_id: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    service_type: String,
    #[serde(default)]
    scheduled_start: Option<String>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    price_estimate: Option<f64>,
}

fn id_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(id) if !id.is_empty() => Some(id),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

impl From<RawBooking> for Booking {
    fn from(raw: RawBooking) -> Self {
        // `_id` wins when both are present
        let id = id_text(raw.mongo_id).or_else(|| id_text(raw.id)).unwrap_or_default();
        Booking {
            id,
            service_type: raw.service_type,
            scheduled_start: raw.scheduled_start,
            status: raw.status,
            price_estimate: raw.price_estimate,
        }
    }
}

/// Status values a cleaner may post for a job
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    OnTheWay,
    InProgress,
    Completed,
}

impl JobStatus {
    pub const ALL: [JobStatus; 3] = [JobStatus::OnTheWay, JobStatus::InProgress, JobStatus::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::OnTheWay => "on_the_way",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
        }
    }

    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusUpdate {
    pub status: JobStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SignupRequest {
    pub email: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LoginRequest {
    pub email: String,
}

/// `{user_id, role}` returned by signup and login
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AuthResponse {
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Role,
}

fn lenient_role<'de, D>(deserializer: D) -> Result<Role, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().map(Role::parse_lenient).unwrap_or_default())
}

/// Aggregate metrics; keys and their order come from the backend
pub type MetricsSnapshot = serde_json::Map<String, Value>;

/// Metric keys shown on the home preview
pub const PREVIEW_METRIC_KEYS: [&str; 4] = ["total_bookings", "revenue_paid", "active_cleaners", "users"];

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub session_path: PathBuf,
    pub request_timeout_secs: u64,
    pub log_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_url = lookup("BACKEND_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        url::Url::parse(&backend_url)
            .map_err(|e| anyhow::anyhow!("BACKEND_URL is not a valid URL ({}): {}", backend_url, e))?;

        Ok(Config {
            backend_url,
            session_path: lookup("CLEANLY_SESSION_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".cleanly_session.json")),
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            log_path: lookup("CLEANLY_LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("cleanly.log")),
        })
    }

    /// Configuration pointing at an explicit backend, everything else default
    pub fn for_backend(backend_url: &str) -> Self {
        Config {
            backend_url: backend_url.to_string(),
            session_path: PathBuf::from(".cleanly_session.json"),
            request_timeout_secs: 30,
            log_path: PathBuf::from("cleanly.log"),
        }
    }
}
