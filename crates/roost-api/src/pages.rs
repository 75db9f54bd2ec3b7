use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::AppState;
use crate::error::AppError;
use crate::flash;
use crate::middleware::session_user;
use crate::templates;

/// Landing page: logged-in visitors go straight home.
pub async fn index(State(state): State<AppState>, jar: CookieJar) -> Result<Response, AppError> {
    if session_user(&state, &jar).is_some() {
        return Ok(Redirect::to("/home").into_response());
    }

    let (jar, flash_message) = flash::take(jar);
    let ctx = templates::page_context(None, flash_message);
    Ok((jar, templates::render("index.html", &ctx)?).into_response())
}

pub async fn terms_of_service(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let user = session_user(&state, &jar);
    let ctx = templates::page_context(user.as_ref(), None);
    Ok(templates::render("terms-of-service.html", &ctx)?.into_response())
}

pub async fn privacy_policy(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let user = session_user(&state, &jar);
    let ctx = templates::page_context(user.as_ref(), None);
    Ok(templates::render("privacy-policy.html", &ctx)?.into_response())
}
