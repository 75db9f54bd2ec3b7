//! Admin surface: an explicit, enumerated set of operations per entity:
//! list for all four tables, edit for the fields that make sense (user name
//! and role, post/comment text), delete everywhere. No schema reflection.
//! Access is gated by the require_admin middleware; everyone else is
//! redirected home.

use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use roost_types::api::{AdminTextEdit, AdminUserEdit};

use crate::AppState;
use crate::error::AppError;
use crate::flash;
use crate::middleware::CurrentUser;
use crate::templates;

pub async fn index(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let (users, posts, comments, likes) = state.db.table_counts()?;

    let (jar, flash_message) = flash::take(jar);
    let mut ctx = templates::page_context(Some(&user), flash_message);
    ctx.insert(
        "counts",
        &serde_json::json!({
            "users": users,
            "posts": posts,
            "comments": comments,
            "likes": likes,
        }),
    );
    Ok((jar, templates::render("admin/index.html", &ctx)?).into_response())
}

// -- Users --

pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let rows = state.db.list_users()?;

    let (jar, flash_message) = flash::take(jar);
    let mut ctx = templates::page_context(Some(&user), flash_message);
    ctx.insert("rows", &rows);
    Ok((jar, templates::render("admin/users.html", &ctx)?).into_response())
}

pub async fn edit_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<AdminUserEdit>,
) -> Result<Response, AppError> {
    // Role is a closed set; anything else leaves the row untouched.
    if matches!(form.role.as_str(), "user" | "admin") && !form.name.trim().is_empty() {
        state.db.update_user(id, form.name.trim(), &form.role)?;
    }
    Ok(Redirect::to("/admin/users").into_response())
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    state.db.delete_user(id)?;
    Ok(Redirect::to("/admin/users").into_response())
}

// -- Posts --

pub async fn list_posts(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let rows = state.db.list_posts()?;

    let (jar, flash_message) = flash::take(jar);
    let mut ctx = templates::page_context(Some(&user), flash_message);
    ctx.insert("rows", &rows);
    Ok((jar, templates::render("admin/posts.html", &ctx)?).into_response())
}

pub async fn edit_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<AdminTextEdit>,
) -> Result<Response, AppError> {
    if !form.text.trim().is_empty() {
        state.db.update_post_text(id, form.text.trim())?;
    }
    Ok(Redirect::to("/admin/posts").into_response())
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    state.db.delete_post(id)?;
    Ok(Redirect::to("/admin/posts").into_response())
}

// -- Comments --

pub async fn list_comments(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let rows = state.db.list_comments()?;

    let (jar, flash_message) = flash::take(jar);
    let mut ctx = templates::page_context(Some(&user), flash_message);
    ctx.insert("rows", &rows);
    Ok((jar, templates::render("admin/comments.html", &ctx)?).into_response())
}

pub async fn edit_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<AdminTextEdit>,
) -> Result<Response, AppError> {
    if !form.text.trim().is_empty() {
        state.db.update_comment_text(id, form.text.trim())?;
    }
    Ok(Redirect::to("/admin/comments").into_response())
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    state.db.delete_comment(id)?;
    Ok(Redirect::to("/admin/comments").into_response())
}

// -- Likes --

pub async fn list_likes(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let rows = state.db.list_likes()?;

    let (jar, flash_message) = flash::take(jar);
    let mut ctx = templates::page_context(Some(&user), flash_message);
    ctx.insert("rows", &rows);
    Ok((jar, templates::render("admin/likes.html", &ctx)?).into_response())
}

pub async fn delete_like(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    state.db.delete_like(id)?;
    Ok(Redirect::to("/admin/likes").into_response())
}
