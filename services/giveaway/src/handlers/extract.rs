//! Request extractors: the authenticated admin and the caller's network metadata.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{HeaderMap, header, request::Parts};
use axum_extra::extract::CookieJar;

use giveaway_auth_types::cookie::SESSION_COOKIE;
use giveaway_domain::hash::hash;

use crate::domain::types::AdminIdentity;
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::session::AuthenticateUseCase;

/// Raw session token from the cookie, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}

/// 401 unless the cookie names a live session of an active admin.
impl FromRequestParts<AppState> for AdminIdentity {
    type Rejection = ApiError;

    // Read the cookie synchronously and hand a 'static future back to axum.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = session_token(&parts.headers);
        let state = state.clone();
        async move {
            let token = token.ok_or(ApiError::Unauthorized)?;
            let usecase = AuthenticateUseCase {
                sessions: state.session_manager(),
                admins: state.admin_repo(),
            };
            usecase.execute(&token).await
        }
    }
}

/// Hashed client IP and the raw user agent.
#[derive(Debug, Clone, Default)]
pub struct ClientMeta {
    pub ip_hash: Option<String>,
    pub user_agent: Option<String>,
}

/// Forwarded headers are only believed behind a trusted proxy; otherwise
/// any client could pick its own address.
fn client_ip(parts: &Parts, trust_proxy_headers: bool) -> Option<String> {
    let peer = || {
        parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
    };
    if !trust_proxy_headers {
        return peer();
    }
    let forwarded = parts
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = parts
        .headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    forwarded.or(real_ip).map(str::to_owned).or_else(peer)
}

impl ClientMeta {
    pub fn from_parts(parts: &Parts, trust_proxy_headers: bool) -> Self {
        Self {
            ip_hash: client_ip(parts, trust_proxy_headers).map(|ip| hash(&ip)),
            user_agent: parts
                .headers
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
        }
    }
}

impl FromRequestParts<AppState> for ClientMeta {
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let meta = ClientMeta::from_parts(parts, state.trust_proxy_headers);
        async move { Ok(meta) }
    }
}
