use clap::Parser;
use std::net::SocketAddr;
use url::Url;
#[cfg(test)]
pub mod tests;

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long)]
    #[arg(default_value = "0.0.0.0:3030")]
    pub listen_address: SocketAddr,
    #[arg(long)]
    pub jwt_signing_key: String,
    /// Base URL of the laundry REST API.
    #[arg(long)]
    #[arg(default_value = "http://127.0.0.1:8000/api/")]
    pub api_url: Url,
    #[arg(long)]
    #[arg(default_value = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js")]
    pub map_script_url: Url,
    #[arg(long)]
    #[arg(default_value = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css")]
    pub map_stylesheet_url: Url,
    #[arg(long)]
    #[arg(default_value = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png")]
    pub tile_url_template: String,
    #[arg(long)]
    #[arg(default_value = "&copy; OpenStreetMap contributors")]
    pub tile_attribution: String,
    /// Where pickers start when the device location is unknown.
    #[arg(long, allow_negative_numbers = true)]
    #[arg(default_value_t = 13.7563)]
    pub default_latitude: f64,
    #[arg(long, allow_negative_numbers = true)]
    #[arg(default_value_t = 100.5018)]
    pub default_longitude: f64,
    /// Location service answering `{"latitude": .., "longitude": ..}`. Without it the device
    /// location is always unavailable.
    #[arg(long)]
    pub geolocation_url: Option<Url>,
    #[arg(long)]
    #[arg(default_value_t = 8)]
    pub geolocation_timeout_secs: u64,
    /// Sessions without requests or open sockets for this long are unmounted.
    #[arg(long)]
    #[arg(default_value_t = 900)]
    pub session_idle_timeout_secs: u64,
    #[arg(long)]
    #[arg(default_value_t = 60)]
    pub session_sweep_interval_secs: u64,
    /// Creating one more evicts the user's least recently used session.
    #[arg(long)]
    #[arg(default_value_t = 8)]
    pub max_sessions_per_user: usize,
    #[arg(long)]
    #[arg(default_values_t = [
        String::from("http://127.0.0.1:3000"),
        String::from("http://localhost:3000"),
    ])]
    pub allowed_origins: Vec<String>,
    #[arg(long)]
    #[arg(default_value = "laundry_map_server=info")]
    pub log_filter: String,
}
