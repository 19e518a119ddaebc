mod api_client;
mod views;
