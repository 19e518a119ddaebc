//! JSON bodies shaped like the backend's responses

use serde_json::{json, Value};

pub fn metrics_body() -> Value {
    json!({
        "total_bookings": 12,
        "revenue_paid": 1530.5,
        "active_cleaners": 4,
        "users": 31,
        "cancelled": null
    })
}

pub fn eco_catalog() -> Value {
    json!([{ "name": "eco", "display_name": "Eco Clean" }])
}

pub fn booking_body(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "service_type": "standard",
        "scheduled_start": "2026-03-01T14:30:00.000Z",
        "status": status,
        "price_estimate": 85
    })
}

pub fn auth_body(user_id: &str, role: &str) -> Value {
    json!({ "user_id": user_id, "role": role })
}
