use crate::cli::Args;
use std::{net::SocketAddr, str::FromStr};
use url::Url;

pub fn fake_args() -> Args {
    Args {
        listen_address: SocketAddr::from_str("0.0.0.0:3030")
            .expect("Failed to construct fake listen address."),
        jwt_signing_key: String::from("testKey"),
        api_url: Url::from_str("http://127.0.0.1:8000/api/")
            .expect("Failed to construct fake API URL."),
        map_script_url: Url::from_str("https://unpkg.com/leaflet@1.9.4/dist/leaflet.js")
            .expect("Failed to construct fake script URL."),
        map_stylesheet_url: Url::from_str("https://unpkg.com/leaflet@1.9.4/dist/leaflet.css")
            .expect("Failed to construct fake stylesheet URL."),
        tile_url_template: String::from("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png"),
        tile_attribution: String::from("&copy; OpenStreetMap contributors"),
        default_latitude: 13.7563,
        default_longitude: 100.5018,
        geolocation_url: None,
        geolocation_timeout_secs: 8,
        session_idle_timeout_secs: 900,
        session_sweep_interval_secs: 60,
        max_sessions_per_user: 8,
        allowed_origins: vec![String::from("http://localhost:3000")],
        log_filter: String::from("laundry_map_server=info"),
    }
}

#[test]
fn defaults_parse() {
    use clap::Parser;

    let args = Args::try_parse_from(["laundry-map-server", "--jwt-signing-key", "k"])
        .expect("Default arguments must parse.");
    assert_eq!(args.geolocation_timeout_secs, 8);
    assert_eq!(args.allowed_origins.len(), 2);
    assert!(args.geolocation_url.is_none());
    assert_eq!(args.session_idle_timeout_secs, 900);
    assert_eq!(args.max_sessions_per_user, 8);
}

#[test]
fn signing_key_is_required() {
    use clap::Parser;

    assert!(Args::try_parse_from(["laundry-map-server"]).is_err());
}
