//! Comment row model and DTOs.

use serde::{Deserialize, Serialize};
use smotree_core::error::CoreError;
use smotree_core::review::Comment;
use smotree_core::status::CommentStatus;
use smotree_core::types::{DbId, FrameNumber, Timestamp};
use sqlx::FromRow;

/// A row from the `comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentRow {
    pub id: DbId,
    pub project_id: DbId,
    pub parent_id: Option<DbId>,
    pub author: String,
    pub text: String,
    pub frame_number: i64,
    pub timecode: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<CommentRow> for Comment {
    type Error = CoreError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        let frame_number = FrameNumber::try_from(row.frame_number).map_err(|_| {
            CoreError::Internal(format!(
                "Comment {} has negative frame number {}",
                row.id, row.frame_number
            ))
        })?;

        Ok(Comment {
            id: row.id,
            project_id: row.project_id,
            parent_id: row.parent_id,
            author: row.author,
            text: row.text,
            frame_number,
            timecode: row.timecode,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// DTO for creating a new comment.
///
/// `frame_number` and `timecode` are computed by the caller from the playback
/// position; the store does not re-derive them.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub project_id: DbId,
    pub parent_id: Option<DbId>,
    pub author: String,
    pub text: String,
    pub frame_number: FrameNumber,
    pub timecode: String,
    /// Defaults to `unresolved` if omitted.
    pub status: Option<CommentStatus>,
}

/// DTO for editing a comment's text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateComment {
    pub text: Option<String>,
}
