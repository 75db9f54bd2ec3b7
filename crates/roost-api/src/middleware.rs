use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Serialize;

use roost_types::api::Claims;

use crate::AppState;

pub const SESSION_COOKIE: &str = "roost_session";

/// The authenticated identity, resolved once per request from the session
/// cookie and passed to handlers explicitly via request extensions.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Decode the session cookie and restore the user it names. A token whose
/// user row no longer exists (deleted account) is treated as no session.
pub fn session_user(state: &AppState, jar: &CookieJar) -> Option<CurrentUser> {
    let token = jar.get(SESSION_COOKIE)?.value().to_string();

    let token_data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.secret_key.as_bytes()),
        &Validation::default(),
    )
    .ok()?;

    let user = state.db.user_by_id(token_data.claims.sub).ok()??;

    Some(CurrentUser {
        id: user.id,
        username: user.username,
        name: user.name,
        email: user.email,
        role: user.role,
    })
}

/// Session guard: anonymous requests are redirected toward login.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    match session_user(&state, &jar) {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        None => Redirect::to("/login").into_response(),
    }
}

/// Admin guard: anyone who is not an admin, logged in or not, is sent back
/// to the home page rather than given an error status.
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    match session_user(&state, &jar) {
        Some(user) if user.role == "admin" => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        _ => Redirect::to("/home").into_response(),
    }
}

/// Site-wide basic-auth gate for the public entry routes: one shared
/// credential pair from config, checked before any session logic.
pub async fn gate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
        .and_then(|encoded| B64.decode(encoded).ok())
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .is_some_and(|pair| {
            pair.split_once(':')
                .is_some_and(|(user, pass)| user == state.gate.username && pass == state.gate.password)
        });

    if authorized {
        next.run(req).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Basic realm=\"roost\"")],
            "Unauthorized",
        )
            .into_response()
    }
}
