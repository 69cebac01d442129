use std::net::SocketAddr;
use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use giveaway_api::config::AppConfig;
use giveaway_api::infra::mail::HttpMailer;
use giveaway_api::router::build_router;
use giveaway_api::state::AppState;
use giveaway_auth_types::cookie::CookieSettings;

#[tokio::main]
async fn main() {
    giveaway_core::tracing::init_tracing("info");

    let config = AppConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let mailer = HttpMailer::new(
        config.mail_api_url.clone(),
        config.mail_api_key.clone(),
        config.mail_from.clone(),
        Duration::from_secs(config.mail_timeout_secs),
    )
    .expect("failed to build mail client");

    let state = AppState {
        db,
        mailer,
        public_base_url: config.public_base_url.clone(),
        cookie: CookieSettings {
            domain: config.cookie_domain.clone(),
            secure: config.cookie_secure,
            max_age_secs: config.session_ttl_hours * 3600,
        },
        session_ttl: chrono::Duration::hours(config.session_ttl_hours),
        trust_proxy_headers: config.trust_proxy_headers,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("giveaway service listening on {addr}");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server error");
}
