pub mod admin;
pub mod auth;
pub mod comments;
pub mod error;
pub mod flash;
pub mod likes;
pub mod middleware;
pub mod pages;
pub mod posts;
pub mod templates;
pub mod validate;

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use roost_db::Database;

/// Shared credential pair gating the public entry routes while the site is
/// not open yet. Orthogonal to per-user sessions.
pub struct GateConfig {
    pub username: String,
    pub password: String,
}

pub struct AppStateInner {
    pub db: Database,
    pub secret_key: String,
    pub gate: GateConfig,
}

pub type AppState = Arc<AppStateInner>;

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(pages::index))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/terms-of-service", get(pages::terms_of_service))
        .route("/privacy-policy", get(pages::privacy_policy))
        .layer(from_fn_with_state(state.clone(), middleware::gate))
        .with_state(state.clone());

    let session = Router::new()
        .route("/logout", get(auth::logout))
        .route("/delete", get(auth::delete_account_page).post(auth::delete_account))
        .route("/home", get(posts::home))
        .route("/create-post", get(posts::create_post_page).post(posts::create_post))
        .route("/delete-post/{id}", get(posts::delete_post))
        .route("/user/{username}", get(posts::user_posts))
        .route("/post-comment/{id}", post(comments::post_comment))
        .route("/delete-comment/{id}", get(comments::delete_comment))
        .route("/like-post/{id}", post(likes::like_post))
        .layer(from_fn_with_state(state.clone(), middleware::require_session))
        .with_state(state.clone());

    let admin = Router::new()
        .route("/admin", get(admin::index))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{id}/edit", post(admin::edit_user))
        .route("/admin/users/{id}/delete", post(admin::delete_user))
        .route("/admin/posts", get(admin::list_posts))
        .route("/admin/posts/{id}/edit", post(admin::edit_post))
        .route("/admin/posts/{id}/delete", post(admin::delete_post))
        .route("/admin/comments", get(admin::list_comments))
        .route("/admin/comments/{id}/edit", post(admin::edit_comment))
        .route("/admin/comments/{id}/delete", post(admin::delete_comment))
        .route("/admin/likes", get(admin::list_likes))
        .route("/admin/likes/{id}/delete", post(admin::delete_like))
        .layer(from_fn_with_state(state.clone(), middleware::require_admin))
        .with_state(state);

    Router::new()
        .merge(public)
        .merge(session)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
}
