use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use roost_types::api::TextForm;

use crate::AppState;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::middleware::CurrentUser;
use crate::validate;

pub async fn post_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(post_id): Path<i64>,
    Form(form): Form<TextForm>,
) -> Result<Response, AppError> {
    if !validate::validate_text(&form.text).is_empty() {
        // Comment forms are inline on the feed, so an empty comment just
        // bounces back without a rerender of its own.
        return Ok(Redirect::to("/home").into_response());
    }

    let jar = if state.db.post_by_id(post_id)?.is_some() {
        state.db.create_comment(form.text.trim(), user.id, post_id)?;
        jar
    } else {
        flash::set(jar, Flash::PostMissing)
    };

    Ok((jar, Redirect::to("/home")).into_response())
}

/// Only the author may delete a comment; missing and forbidden outcomes
/// both degrade to a flash + redirect.
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let flash_message = match state.db.comment_by_id(id)? {
        None => Flash::CommentMissing,
        Some(comment) if comment.author != user.id => Flash::Forbidden,
        Some(comment) => {
            state.db.delete_comment(comment.id)?;
            Flash::CommentDeleted
        }
    };

    let jar = flash::set(jar, flash_message);
    Ok((jar, Redirect::to("/home")).into_response())
}
