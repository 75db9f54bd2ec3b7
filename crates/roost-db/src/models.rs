//! Database row types. These map directly to SQLite rows.
//! Joined columns (author username) are carried alongside where the
//! queries fetch them in one statement.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub name: String,
    pub password: String,
    pub signed_up_at: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostRow {
    pub id: i64,
    pub text: String,
    pub author: i64,
    pub author_username: String,
    pub posted_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentRow {
    pub id: i64,
    pub text: String,
    pub author: i64,
    pub author_username: String,
    pub post_id: i64,
    pub commented_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LikeRow {
    pub id: i64,
    pub author: i64,
    pub post_id: i64,
    pub liked_at: String,
}
