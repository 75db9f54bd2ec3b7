use std::collections::HashMap;

use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use roost_db::Database;
use roost_db::models::PostRow;
use roost_types::api::TextForm;

use crate::AppState;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::middleware::CurrentUser;
use crate::templates;
use crate::validate;

#[derive(Debug, Serialize)]
struct CommentView {
    id: i64,
    text: String,
    author: i64,
    author_username: String,
}

#[derive(Debug, Serialize)]
struct PostView {
    id: i64,
    text: String,
    author: i64,
    author_username: String,
    posted_at: String,
    comments: Vec<CommentView>,
    likes: i64,
    liked: bool,
}

/// Decorate post rows with their comments, like counts and whether the
/// viewer has liked each one. Comments and likes are batch-fetched, one
/// query each.
fn post_views(db: &Database, viewer: i64, rows: Vec<PostRow>) -> Result<Vec<PostView>, AppError> {
    let post_ids: Vec<i64> = rows.iter().map(|p| p.id).collect();

    let mut comment_map: HashMap<i64, Vec<CommentView>> = HashMap::new();
    for c in db.comments_for_posts(&post_ids)? {
        comment_map.entry(c.post_id).or_default().push(CommentView {
            id: c.id,
            text: c.text,
            author: c.author,
            author_username: c.author_username,
        });
    }

    let like_counts: HashMap<i64, i64> = db.like_counts_for_posts(&post_ids)?.into_iter().collect();
    let liked: Vec<i64> = db.liked_post_ids(viewer, &post_ids)?;

    let views = rows
        .into_iter()
        .map(|p| PostView {
            likes: like_counts.get(&p.id).copied().unwrap_or(0),
            liked: liked.contains(&p.id),
            comments: comment_map.remove(&p.id).unwrap_or_default(),
            id: p.id,
            text: p.text,
            author: p.author,
            author_username: p.author_username,
            posted_at: p.posted_at,
        })
        .collect();

    Ok(views)
}

/// All posts, newest first.
pub async fn home(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let rows = state.db.list_posts()?;
    let posts = post_views(&state.db, user.id, rows)?;

    let (jar, flash_message) = flash::take(jar);
    let mut ctx = templates::page_context(Some(&user), flash_message);
    ctx.insert("posts", &posts);
    Ok((jar, templates::render("home.html", &ctx)?).into_response())
}

pub async fn create_post_page(
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let (jar, flash_message) = flash::take(jar);
    let ctx = templates::page_context(Some(&user), flash_message);
    Ok((jar, templates::render("create-post.html", &ctx)?).into_response())
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<TextForm>,
) -> Result<Response, AppError> {
    let errors = validate::validate_text(&form.text);
    if !errors.is_empty() {
        let mut ctx = templates::page_context(Some(&user), None);
        ctx.insert("errors", &errors);
        return Ok(templates::render("create-post.html", &ctx)?.into_response());
    }

    state.db.create_post(form.text.trim(), user.id)?;

    let jar = flash::set(jar, Flash::PostCreated);
    Ok((jar, Redirect::to("/home")).into_response())
}

/// Only the author may delete a post. A missing post and someone else's
/// post both come back as a flash + redirect, not an error status.
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let flash_message = match state.db.post_by_id(id)? {
        None => Flash::PostMissing,
        Some(post) if post.author != user.id => Flash::Forbidden,
        Some(post) => {
            state.db.delete_post(post.id)?;
            Flash::PostDeleted
        }
    };

    let jar = flash::set(jar, flash_message);
    Ok((jar, Redirect::to("/home")).into_response())
}

/// One user's posts, by username.
pub async fn user_posts(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    let Some(target) = state.db.user_by_username(&username)? else {
        let jar = flash::set(jar, Flash::UserMissing);
        return Ok((jar, Redirect::to("/home")).into_response());
    };

    let rows = state.db.posts_by_author(target.id)?;
    let posts = post_views(&state.db, user.id, rows)?;

    let (jar, flash_message) = flash::take(jar);
    let mut ctx = templates::page_context(Some(&user), flash_message);
    ctx.insert("posts", &posts);
    ctx.insert("username", &target.username);
    ctx.insert("name", &target.name);
    Ok((jar, templates::render("posts.html", &ctx)?).into_response())
}
