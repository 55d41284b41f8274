//! Repository for the `comments` table.

use chrono::Utc;
use smotree_core::status::CommentStatus;
use smotree_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::comment::{CommentRow, CreateComment, UpdateComment};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, parent_id, author, text, frame_number, timecode, \
    status, created_at, updated_at";

/// Provides CRUD operations for comments.
pub struct CommentRepo;

impl CommentRepo {
    /// Insert a new comment, returning the created row.
    pub async fn create(pool: &SqlitePool, input: &CreateComment) -> Result<CommentRow, sqlx::Error> {
        let frame_number =
            i64::try_from(input.frame_number).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let status = input.status.unwrap_or_default();
        let query = format!(
            "INSERT INTO comments
                (project_id, parent_id, author, text, frame_number, timecode, status,
                 created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CommentRow>(&query)
            .bind(input.project_id)
            .bind(input.parent_id)
            .bind(&input.author)
            .bind(&input.text)
            .bind(frame_number)
            .bind(&input.timecode)
            .bind(status.as_str())
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    /// Find a comment by its ID.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<CommentRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = ?1");
        sqlx::query_as::<_, CommentRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's comments in timeline order, ties by insertion.
    pub async fn list_for_project(
        pool: &SqlitePool,
        project_id: DbId,
    ) -> Result<Vec<CommentRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments
             WHERE project_id = ?1
             ORDER BY frame_number ASC, id ASC"
        );
        sqlx::query_as::<_, CommentRow>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// List all replies to a given parent comment (thread), oldest first.
    pub async fn list_thread(
        pool: &SqlitePool,
        parent_id: DbId,
    ) -> Result<Vec<CommentRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments
             WHERE parent_id = ?1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, CommentRow>(&query)
            .bind(parent_id)
            .fetch_all(pool)
            .await
    }

    /// Count the comments attached to a project.
    pub async fn count_for_project(pool: &SqlitePool, project_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE project_id = ?1")
            .bind(project_id)
            .fetch_one(pool)
            .await
    }

    /// Update a comment's text. Returns `None` if the comment does not exist.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateComment,
    ) -> Result<Option<CommentRow>, sqlx::Error> {
        let query = format!(
            "UPDATE comments SET
                text = COALESCE(?2, text),
                updated_at = ?3
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CommentRow>(&query)
            .bind(id)
            .bind(&input.text)
            .bind(Utc::now())
            .fetch_optional(pool)
            .await
    }

    /// Update only the status of a comment (resolve/reopen).
    pub async fn update_status(
        pool: &SqlitePool,
        id: DbId,
        status: CommentStatus,
    ) -> Result<Option<CommentRow>, sqlx::Error> {
        let query = format!(
            "UPDATE comments SET status = ?2, updated_at = ?3
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CommentRow>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(Utc::now())
            .fetch_optional(pool)
            .await
    }

    /// Delete a comment and its replies. Returns `true` if a row was removed.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
