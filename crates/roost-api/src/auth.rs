use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Extension, Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use jsonwebtoken::{EncodingKey, Header, encode};

use roost_types::api::{AccountDeletionForm, Claims, LoginForm, SignupForm};

use crate::AppState;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::middleware::{CurrentUser, SESSION_COOKIE, session_user};
use crate::templates;
use crate::validate;

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn create_token(secret: &str, user_id: i64, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .build()
}

fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"))
}

// -- Signup --

pub async fn signup_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    if session_user(&state, &jar).is_some() {
        return Ok(Redirect::to("/home").into_response());
    }

    let (jar, flash_message) = flash::take(jar);
    let ctx = templates::page_context(None, flash_message);
    Ok((jar, templates::render("signup.html", &ctx)?).into_response())
}

pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    if session_user(&state, &jar).is_some() {
        return Ok(Redirect::to("/home").into_response());
    }

    let email = form.email.trim().to_string();
    let email_taken = state.db.user_by_email(&email)?.is_some();
    let username_taken = state.db.user_by_username(&form.username)?.is_some();

    let errors = validate::validate_signup(&form, email_taken, username_taken);
    if !errors.is_empty() {
        let mut ctx = templates::page_context(None, None);
        ctx.insert("errors", &errors);
        return Ok(templates::render("signup.html", &ctx)?.into_response());
    }

    let password_hash = hash_password(&form.password)?;
    let user_id = state
        .db
        .create_user(&email, &form.username, &form.name, &password_hash)?;

    tracing::info!(user_id, username = %form.username, "new signup");

    // Signing up logs the user straight in.
    let token = create_token(&state.secret_key, user_id, &form.username)?;
    let jar = flash::set(jar.add(session_cookie(token)), Flash::SignedUp);
    Ok((jar, Redirect::to("/home")).into_response())
}

// -- Login --

pub async fn login_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    if session_user(&state, &jar).is_some() {
        return Ok(Redirect::to("/home").into_response());
    }

    let (jar, flash_message) = flash::take(jar);
    let ctx = templates::page_context(None, flash_message);
    Ok((jar, templates::render("login.html", &ctx)?).into_response())
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if session_user(&state, &jar).is_some() {
        return Ok(Redirect::to("/home").into_response());
    }

    let errors = validate::validate_login(&form);
    if !errors.is_empty() {
        let mut ctx = templates::page_context(None, None);
        ctx.insert("errors", &errors);
        return Ok(templates::render("login.html", &ctx)?.into_response());
    }

    // Unknown email and wrong password fail identically: one generic
    // message, no hint which field was wrong.
    let user = state.db.user_by_email(form.email.trim())?;
    let verified = user
        .as_ref()
        .is_some_and(|u| verify_password(&u.password, &form.password));

    match (user, verified) {
        (Some(user), true) => {
            let token = create_token(&state.secret_key, user.id, &user.username)?;
            let jar = flash::set(jar.add(session_cookie(token)), Flash::LoggedIn);
            Ok((jar, Redirect::to("/home")).into_response())
        }
        _ => {
            let mut ctx = templates::page_context(None, None);
            ctx.insert("errors", &["Email or password is wrong"]);
            Ok(templates::render("login.html", &ctx)?.into_response())
        }
    }
}

// -- Logout --

pub async fn logout(jar: CookieJar) -> Response {
    let jar = flash::set(clear_session(jar), Flash::LoggedOut);
    (jar, Redirect::to("/")).into_response()
}

// -- Account deletion --

pub async fn delete_account_page(
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let (jar, flash_message) = flash::take(jar);
    let ctx = templates::page_context(Some(&user), flash_message);
    Ok((jar, templates::render("delete.html", &ctx)?).into_response())
}

pub async fn delete_account(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<AccountDeletionForm>,
) -> Result<Response, AppError> {
    let errors = validate::validate_deletion(&form);
    if !errors.is_empty() {
        let mut ctx = templates::page_context(Some(&user), None);
        ctx.insert("errors", &errors);
        return Ok(templates::render("delete.html", &ctx)?.into_response());
    }

    // The submitted email must resolve to the session's own account and the
    // password must re-verify; otherwise nothing is deleted.
    let target = state.db.user_by_email(form.email.trim())?;
    let authorized = target
        .as_ref()
        .is_some_and(|t| t.id == user.id && verify_password(&t.password, &form.password));

    if !authorized {
        let mut ctx = templates::page_context(Some(&user), None);
        ctx.insert("errors", &["Email or password is wrong"]);
        return Ok(templates::render("delete.html", &ctx)?.into_response());
    }

    state.db.delete_user(user.id)?;
    tracing::info!(user_id = user.id, "account deleted");

    let jar = flash::set(clear_session(jar), Flash::AccountDeleted);
    Ok((jar, Redirect::to("/")).into_response())
}
