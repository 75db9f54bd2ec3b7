use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use roost_types::api::LikeResponse;

use crate::AppState;
use crate::error::AppError;
use crate::middleware::CurrentUser;

/// Toggle the session user's like on a post. The delete-else-insert runs in
/// one transaction (see roost-db), so duplicate concurrent toggles cannot
/// double-insert. Replies with the resulting count and state.
pub async fn like_post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(post_id): Path<i64>,
) -> Result<Response, AppError> {
    if state.db.post_by_id(post_id)?.is_none() {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "post not found" })),
        )
            .into_response());
    }

    let (liked, likes) = state.db.toggle_like(user.id, post_id)?;

    Ok(Json(LikeResponse { likes, liked }).into_response())
}
