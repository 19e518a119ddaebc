pub mod api;
pub mod error;
pub mod models;
pub mod session;
pub mod ui;
