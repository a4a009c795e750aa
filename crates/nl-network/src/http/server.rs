//! Control-plane HTTP server on the display device.
//!
//! Endpoints: `GET /status` (unauthenticated, non-secret fields only),
//! `POST /open-url` (token-gated open effect), `POST /refresh-token`
//! (loopback/private-subnet callers only). Requests are handled
//! concurrently; the token authority serializes its own mutations.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info, warn};
use tokio::net::TcpListener;

use nl_core::network::{ControlReply, OpenUrlRequest, StatusReport};
use nl_core::ports::{OpenerPort, TokenAuthorityPort};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone)]
struct ServerContext {
    tokens: Arc<dyn TokenAuthorityPort>,
    opener: Arc<dyn OpenerPort>,
    port: u16,
}

pub struct ControlPlaneServer {
    ctx: ServerContext,
}

impl ControlPlaneServer {
    pub fn new(tokens: Arc<dyn TokenAuthorityPort>, opener: Arc<dyn OpenerPort>, port: u16) -> Self {
        Self {
            ctx: ServerContext {
                tokens,
                opener,
                port,
            },
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/status", get(status))
            .route("/open-url", post(open_url))
            .route("/refresh-token", post(refresh_token))
            .fallback(not_found)
            .with_state(self.ctx.clone())
    }

    /// Serve until the listener fails. The caller owns the bind so tests
    /// can use an ephemeral port.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let addr = listener.local_addr().context("listener local_addr failed")?;
        info!("control-plane server listening on {}", addr);
        axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .context("control-plane server terminated")
    }
}

/// The address the display advertises in its status report.
fn advertised_ip() -> String {
    match local_ip_address::local_ip() {
        Ok(ip) => ip.to_string(),
        Err(e) => {
            warn!("local ip lookup failed: {}; advertising loopback", e);
            "127.0.0.1".to_string()
        }
    }
}

/// Refresh is restricted to co-resident callers: loopback or the local
/// private subnet. The paired remote device must never reach it.
fn is_local_source(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_loopback() || v4.is_private() || v4.is_link_local(),
        IpAddr::V6(v6) => {
            if v6.is_loopback() {
                return true;
            }
            let segments = v6.segments();
            // fc00::/7 unique-local, fe80::/10 link-local
            (segments[0] & 0xfe00) == 0xfc00 || (segments[0] & 0xffc0) == 0xfe80
        }
    }
}

fn internal_error(context: &str, err: anyhow::Error) -> Response {
    error!("{}: {:#}", context, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ControlReply::failed("internal error")),
    )
        .into_response()
}

async fn status(State(ctx): State<ServerContext>) -> Response {
    let token = match ctx.tokens.current_token().await {
        Ok(token) => token,
        Err(e) => return internal_error("status: token load failed", e),
    };
    let paired = match ctx.tokens.is_display_paired().await {
        Ok(paired) => paired,
        Err(e) => return internal_error("status: paired flag load failed", e),
    };

    let report = StatusReport {
        ok: true,
        ip: advertised_ip(),
        port: ctx.port,
        paired,
        token_hint: token.hint(),
        version: VERSION.to_string(),
    };
    (StatusCode::OK, Json(report)).into_response()
}

async fn open_url(
    State(ctx): State<ServerContext>,
    payload: Result<Json<OpenUrlRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!("open-url: malformed body: {}", rejection);
            return (
                StatusCode::BAD_REQUEST,
                Json(ControlReply::failed("malformed request body")),
            )
                .into_response();
        }
    };

    let token = match ctx.tokens.current_token().await {
        Ok(token) => token,
        Err(e) => return internal_error("open-url: token load failed", e),
    };
    if !token.matches(&request.token) {
        warn!("open-url: rejected request with non-matching token");
        return (StatusCode::UNAUTHORIZED, Json(ControlReply::denied())).into_response();
    }

    // A failed maps handler gets one retry against the generic
    // browser-capable handler before surfacing an error.
    if let Err(maps_err) = ctx.opener.open_maps(&request.url).await {
        warn!(
            "open-url: maps handler failed ({:#}), retrying with fallback handler",
            maps_err
        );
        if let Err(fallback_err) = ctx.opener.open_fallback(&request.url).await {
            return internal_error("open-url: fallback handler failed", fallback_err);
        }
    }

    // An authenticated open proves a sender holds the current token.
    if let Err(e) = ctx.tokens.mark_display_paired().await {
        warn!("open-url: persisting paired flag failed: {:#}", e);
    }

    info!("open-url: destination opened");
    (StatusCode::OK, Json(ControlReply::ok("destination opened"))).into_response()
}

async fn refresh_token(
    State(ctx): State<ServerContext>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    if !is_local_source(addr.ip()) {
        warn!("refresh-token: denied non-local caller {}", addr);
        return (StatusCode::FORBIDDEN, Json(ControlReply::denied())).into_response();
    }

    match ctx.tokens.refresh_token().await {
        Ok(token) => {
            info!("refresh-token: token rotated (hint {})", token.hint());
            (
                StatusCode::OK,
                Json(ControlReply::ok_with_token(token.as_str())),
            )
                .into_response()
        }
        Err(e) => internal_error("refresh-token: rotation failed", e),
    }
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(ControlReply::denied())).into_response()
}
