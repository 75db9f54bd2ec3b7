use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            email         TEXT NOT NULL UNIQUE,
            username      TEXT NOT NULL UNIQUE,
            name          TEXT NOT NULL,
            password      TEXT NOT NULL,
            signed_up_at  TEXT NOT NULL DEFAULT (datetime('now')),
            role          TEXT NOT NULL DEFAULT 'user'
        );

        CREATE TABLE IF NOT EXISTS posts (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            text        TEXT NOT NULL,
            author      INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            posted_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_posts_author
            ON posts(author);

        CREATE TABLE IF NOT EXISTS comments (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            text          TEXT NOT NULL,
            author        INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            post_id       INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            commented_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_comments_post
            ON comments(post_id);

        CREATE TABLE IF NOT EXISTS likes (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            author    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            post_id   INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            liked_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(author, post_id)
        );

        CREATE INDEX IF NOT EXISTS idx_likes_post
            ON likes(post_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
