//! Review projects and timestamped comments.
//!
//! Defines the domain records shared by the store and the exporters, plus
//! the validation helpers applied before anything is persisted.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::status::CommentStatus;
use crate::timecode::seconds_to_frame;
use crate::types::{DbId, FrameNumber, Timestamp};

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Maximum length for a comment's text.
pub const MAX_COMMENT_LENGTH: usize = 10_000;

/// Maximum length for an author name.
pub const MAX_AUTHOR_LENGTH: usize = 100;

/// Maximum length for a project name.
pub const MAX_PROJECT_NAME_LENGTH: usize = 200;

/* --------------------------------------------------------------------------
Records
-------------------------------------------------------------------------- */

/// A video under review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    /// Frames per second. Fixed once the project has comments.
    pub framerate: f64,
    /// Full video length in seconds.
    pub duration: f64,
    pub video_filename: Option<String>,
    pub video_url: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Last frame boundary of the clip: `floor(duration * framerate)`.
    pub fn end_frame(&self) -> FrameNumber {
        seconds_to_frame(self.duration, self.framerate).unwrap_or(0)
    }

    /// Name shown for the clip in exports: the video filename if known.
    pub fn clip_name(&self) -> &str {
        self.video_filename.as_deref().unwrap_or(&self.name)
    }
}

/// A timestamped comment on a project's video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: DbId,
    pub project_id: DbId,
    /// Set on replies; points at the comment that started the thread.
    pub parent_id: Option<DbId>,
    pub author: String,
    pub text: String,
    pub frame_number: FrameNumber,
    /// Display timecode computed alongside `frame_number`.
    pub timecode: String,
    pub status: CommentStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Comments in export order: ascending frame, ties in input order.
pub fn sort_for_export(comments: &[Comment]) -> Vec<&Comment> {
    let mut sorted: Vec<&Comment> = comments.iter().collect();
    sorted.sort_by_key(|c| c.frame_number);
    sorted
}

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Validate a project name: non-blank and at most [`MAX_PROJECT_NAME_LENGTH`] characters.
pub fn validate_project_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Project name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_PROJECT_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Project name exceeds maximum length of {MAX_PROJECT_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a video duration in seconds. Zero is allowed for unknown length.
pub fn validate_duration(duration: f64) -> Result<(), CoreError> {
    if !duration.is_finite() || duration < 0.0 {
        return Err(CoreError::Validation(format!(
            "duration must be a non-negative number of seconds, got {duration}"
        )));
    }
    Ok(())
}

pub fn validate_author(author: &str) -> Result<(), CoreError> {
    if author.trim().is_empty() {
        return Err(CoreError::Validation(
            "Comment author must not be empty".to_string(),
        ));
    }
    if author.chars().count() > MAX_AUTHOR_LENGTH {
        return Err(CoreError::Validation(format!(
            "Comment author exceeds maximum length of {MAX_AUTHOR_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate comment text: non-blank and at most [`MAX_COMMENT_LENGTH`] characters.
pub fn validate_comment_text(text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation(
            "Comment text must not be empty".to_string(),
        ));
    }
    if text.chars().count() > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Comment text exceeds maximum length of {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn project(duration: f64, framerate: f64) -> Project {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        Project {
            id: 1,
            name: "Spot".to_string(),
            description: None,
            framerate,
            duration,
            video_filename: None,
            video_url: None,
            created_by: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn comment(id: DbId, frame_number: FrameNumber) -> Comment {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        Comment {
            id,
            project_id: 1,
            parent_id: None,
            author: "Ann".to_string(),
            text: format!("note {id}"),
            frame_number,
            timecode: String::new(),
            status: CommentStatus::Unresolved,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn end_frame_floors() {
        assert_eq!(project(60.0, 25.0).end_frame(), 1500);
        assert_eq!(project(10.01, 29.97).end_frame(), 299);
        assert_eq!(project(0.0, 24.0).end_frame(), 0);
    }

    #[test]
    fn clip_name_prefers_filename() {
        let mut p = project(1.0, 25.0);
        assert_eq!(p.clip_name(), "Spot");
        p.video_filename = Some("spot_v3.mov".to_string());
        assert_eq!(p.clip_name(), "spot_v3.mov");
    }

    #[test]
    fn export_sort_is_stable() {
        let comments = vec![comment(1, 10), comment(2, 5), comment(3, 10), comment(4, 0)];
        let ids: Vec<DbId> = sort_for_export(&comments).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![4, 2, 1, 3]);
    }

    #[test]
    fn project_name_validation() {
        assert!(validate_project_name("Spot").is_ok());
        assert!(validate_project_name("   ").is_err());
        assert!(validate_project_name(&"x".repeat(MAX_PROJECT_NAME_LENGTH)).is_ok());
        assert!(validate_project_name(&"x".repeat(MAX_PROJECT_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn duration_validation() {
        assert!(validate_duration(0.0).is_ok());
        assert!(validate_duration(93.5).is_ok());
        assert!(validate_duration(-1.0).is_err());
        assert!(validate_duration(f64::INFINITY).is_err());
    }

    #[test]
    fn author_validation() {
        assert!(validate_author("Ann").is_ok());
        assert!(validate_author("").is_err());
        assert!(validate_author(&"a".repeat(MAX_AUTHOR_LENGTH + 1)).is_err());
    }

    #[test]
    fn comment_text_validation() {
        assert!(validate_comment_text("Too dark here").is_ok());
        let err = validate_comment_text(" \n ").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
        let err = validate_comment_text(&"x".repeat(MAX_COMMENT_LENGTH + 1)).unwrap_err();
        assert!(err.to_string().contains("maximum length"));
    }
}
