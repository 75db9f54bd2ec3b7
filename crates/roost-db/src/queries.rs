use crate::Database;
use crate::models::{CommentRow, LikeRow, PostRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        email: &str,
        username: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<i64> {
        self.with_tx(|conn| {
            conn.execute(
                "INSERT INTO users (email, username, name, password) VALUES (?1, ?2, ?3, ?4)",
                (email, username, name, password_hash),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, email, username, name, password, signed_up_at, role
                     FROM users WHERE id = ?1",
                    [id],
                    user_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn update_user(&self, id: i64, name: &str, role: &str) -> Result<bool> {
        self.with_tx(|conn| {
            let n = conn.execute(
                "UPDATE users SET name = ?1, role = ?2 WHERE id = ?3",
                (name, role, id),
            )?;
            Ok(n > 0)
        })
    }

    /// Removes the user and, through the FK cascades, all their posts,
    /// comments and likes, plus everything hanging off their posts.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        self.with_tx(|conn| {
            let n = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, email, username, name, password, signed_up_at, role
                 FROM users ORDER BY id",
            )?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Posts --

    pub fn create_post(&self, text: &str, author: i64) -> Result<i64> {
        self.with_tx(|conn| {
            conn.execute(
                "INSERT INTO posts (text, author) VALUES (?1, ?2)",
                (text, author),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn post_by_id(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT p.id, p.text, p.author, u.username, p.posted_at
                     FROM posts p JOIN users u ON p.author = u.id
                     WHERE p.id = ?1",
                    [id],
                    post_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// All posts, newest first, with the author username joined in.
    pub fn list_posts(&self) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.text, p.author, u.username, p.posted_at
                 FROM posts p JOIN users u ON p.author = u.id
                 ORDER BY p.id DESC",
            )?;
            let rows = stmt
                .query_map([], post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn posts_by_author(&self, author: i64) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.text, p.author, u.username, p.posted_at
                 FROM posts p JOIN users u ON p.author = u.id
                 WHERE p.author = ?1
                 ORDER BY p.id DESC",
            )?;
            let rows = stmt
                .query_map([author], post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_post_text(&self, id: i64, text: &str) -> Result<bool> {
        self.with_tx(|conn| {
            let n = conn.execute("UPDATE posts SET text = ?1 WHERE id = ?2", (text, id))?;
            Ok(n > 0)
        })
    }

    pub fn delete_post(&self, id: i64) -> Result<bool> {
        self.with_tx(|conn| {
            let n = conn.execute("DELETE FROM posts WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    // -- Comments --

    pub fn create_comment(&self, text: &str, author: i64, post_id: i64) -> Result<i64> {
        self.with_tx(|conn| {
            conn.execute(
                "INSERT INTO comments (text, author, post_id) VALUES (?1, ?2, ?3)",
                (text, author, post_id),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn comment_by_id(&self, id: i64) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT c.id, c.text, c.author, u.username, c.post_id, c.commented_at
                     FROM comments c JOIN users u ON c.author = u.id
                     WHERE c.id = ?1",
                    [id],
                    comment_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Batch-fetch comments for a set of post ids, oldest first.
    pub fn comments_for_posts(&self, post_ids: &[i64]) -> Result<Vec<CommentRow>> {
        if post_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (1..=post_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT c.id, c.text, c.author, u.username, c.post_id, c.commented_at
                 FROM comments c JOIN users u ON c.author = u.id
                 WHERE c.post_id IN ({})
                 ORDER BY c.id",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::types::ToSql> = post_ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(params.as_slice(), comment_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_comments(&self) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.text, c.author, u.username, c.post_id, c.commented_at
                 FROM comments c JOIN users u ON c.author = u.id
                 ORDER BY c.id",
            )?;
            let rows = stmt
                .query_map([], comment_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_comment_text(&self, id: i64, text: &str) -> Result<bool> {
        self.with_tx(|conn| {
            let n = conn.execute("UPDATE comments SET text = ?1 WHERE id = ?2", (text, id))?;
            Ok(n > 0)
        })
    }

    pub fn delete_comment(&self, id: i64) -> Result<bool> {
        self.with_tx(|conn| {
            let n = conn.execute("DELETE FROM comments WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    // -- Likes --

    /// Toggle a like: removes the row if present, inserts it if not, and
    /// reports the resulting state. Runs in one transaction so concurrent
    /// toggles by the same user cannot double-insert (the UNIQUE(author,
    /// post_id) constraint backstops this).
    /// Returns (liked, like count for the post).
    pub fn toggle_like(&self, author: i64, post_id: i64) -> Result<(bool, i64)> {
        self.with_tx(|conn| {
            let removed = conn.execute(
                "DELETE FROM likes WHERE author = ?1 AND post_id = ?2",
                (author, post_id),
            )?;

            let liked = if removed == 0 {
                conn.execute(
                    "INSERT INTO likes (author, post_id) VALUES (?1, ?2)",
                    (author, post_id),
                )?;
                true
            } else {
                false
            };

            let likes: i64 = conn.query_row(
                "SELECT COUNT(*) FROM likes WHERE post_id = ?1",
                [post_id],
                |row| row.get(0),
            )?;

            Ok((liked, likes))
        })
    }

    /// Batch like counts for a set of post ids as (post_id, count) pairs.
    /// Posts with no likes are simply absent.
    pub fn like_counts_for_posts(&self, post_ids: &[i64]) -> Result<Vec<(i64, i64)>> {
        if post_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (1..=post_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT post_id, COUNT(*) FROM likes
                 WHERE post_id IN ({})
                 GROUP BY post_id",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::types::ToSql> = post_ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(params.as_slice(), |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Which of these posts the given user has liked.
    pub fn liked_post_ids(&self, author: i64, post_ids: &[i64]) -> Result<Vec<i64>> {
        if post_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (2..=post_ids.len() + 1).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT post_id FROM likes WHERE author = ?1 AND post_id IN ({})",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let mut params: Vec<&dyn rusqlite::types::ToSql> = vec![&author];
            params.extend(post_ids.iter().map(|id| id as &dyn rusqlite::types::ToSql));

            let rows = stmt
                .query_map(params.as_slice(), |row| row.get(0))?
                .collect::<std::result::Result<Vec<i64>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_likes(&self) -> Result<Vec<LikeRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, author, post_id, liked_at FROM likes ORDER BY id",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(LikeRow {
                        id: row.get(0)?,
                        author: row.get(1)?,
                        post_id: row.get(2)?,
                        liked_at: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_like(&self, id: i64) -> Result<bool> {
        self.with_tx(|conn| {
            let n = conn.execute("DELETE FROM likes WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    // -- Admin --

    /// Row counts for the admin index: (users, posts, comments, likes).
    pub fn table_counts(&self) -> Result<(i64, i64, i64, i64)> {
        self.with_conn(|conn| {
            let count = |table: &str| -> Result<i64> {
                let n = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
                Ok(n)
            };
            Ok((count("users")?, count("posts")?, count("comments")?, count("likes")?))
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, email, username, name, password, signed_up_at, role
         FROM users WHERE {} = ?1",
        column
    );
    let row = conn.query_row(&sql, [value], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        name: row.get(3)?,
        password: row.get(4)?,
        signed_up_at: row.get(5)?,
        role: row.get(6)?,
    })
}

fn post_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        text: row.get(1)?,
        author: row.get(2)?,
        author_username: row.get(3)?,
        posted_at: row.get(4)?,
    })
}

fn comment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        text: row.get(1)?,
        author: row.get(2)?,
        author_username: row.get(3)?,
        post_id: row.get(4)?,
        commented_at: row.get(5)?,
    })
}
