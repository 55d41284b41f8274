//! Review workflow on top of a [`ReviewStore`].
//!
//! Turns "comment added at the playback position" and "export clicked" into
//! engine and store calls. All validation happens here, before the store is
//! touched.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use smotree_core::error::{CoreError, TimecodeError};
use smotree_core::export::{render, ExportFormat, ExportOptions};
use smotree_core::framerate::validate_framerate;
use smotree_core::naming::export_filename;
use smotree_core::review::{
    validate_author, validate_comment_text, validate_duration, validate_project_name, Comment,
    Project,
};
use smotree_core::status::CommentStatus;
use smotree_core::timecode::{frame_to_timecode, seconds_to_frame, timecode_to_frame};
use smotree_core::types::{DbId, FrameNumber};
use smotree_db::models::comment::{CreateComment, UpdateComment};
use smotree_db::models::project::{CreateProject, UpdateProject};
use smotree_db::{ReviewStore, StoreError};

/// Convenience type alias for service return values.
pub type ServiceResult<T> = Result<T, StoreError>;

/* --------------------------------------------------------------------------
Playback position
-------------------------------------------------------------------------- */

/// Where on the timeline a comment is placed.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackPosition {
    /// Player clock in seconds.
    Seconds(f64),
    /// `HH:MM:SS:FF` typed by the user.
    Timecode(String),
}

impl FromStr for PlaybackPosition {
    type Err = CoreError;

    /// Anything containing `:` is a timecode; everything else must be seconds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains(':') {
            return Ok(Self::Timecode(s.to_string()));
        }
        s.parse::<f64>().map(Self::Seconds).map_err(|_| {
            CoreError::Validation(format!(
                "Invalid position '{s}'. Use seconds (65.04) or a timecode (00:01:05:01)"
            ))
        })
    }
}

impl fmt::Display for PlaybackPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seconds(s) => write!(f, "{s}s"),
            Self::Timecode(tc) => f.write_str(tc),
        }
    }
}

/* --------------------------------------------------------------------------
Export artifact
-------------------------------------------------------------------------- */

/// A rendered export, ready to hand to a sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime_type: &'static str,
    pub content: String,
}

/* --------------------------------------------------------------------------
Service
-------------------------------------------------------------------------- */

pub struct ReviewService<S> {
    store: S,
}

impl<S: ReviewStore> ReviewService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate and create a project.
    pub async fn create_project(&self, mut input: CreateProject) -> ServiceResult<Project> {
        input.name = input.name.trim().to_string();
        validate_project_name(&input.name)?;
        validate_framerate(input.framerate).map_err(CoreError::from)?;
        validate_duration(input.duration)?;

        self.store.create_project(&input).await
    }

    pub async fn project(&self, id: DbId) -> ServiceResult<Project> {
        self.store
            .find_project(id)
            .await?
            .ok_or_else(|| StoreError::not_found("Project", id))
    }

    pub async fn list_projects(&self) -> ServiceResult<Vec<Project>> {
        self.store.list_projects().await
    }

    /// Apply a partial update. The store refuses a framerate change once the
    /// project has comments.
    pub async fn update_project(
        &self,
        id: DbId,
        mut input: UpdateProject,
    ) -> ServiceResult<Project> {
        if let Some(name) = input.name.as_mut() {
            *name = name.trim().to_string();
        }
        let project = self.store.update_project(id, &input).await?;
        tracing::info!(project_id = id, "Project updated");
        Ok(project)
    }

    pub async fn delete_project(&self, id: DbId) -> ServiceResult<()> {
        if !self.store.delete_project(id).await? {
            return Err(StoreError::not_found("Project", id));
        }
        Ok(())
    }

    /// Add a comment at `position`, deriving frame number and timecode.
    ///
    /// Positions before the start land on frame 0; positions past the end
    /// land on the last frame of the clip.
    pub async fn add_comment_at(
        &self,
        project_id: DbId,
        position: &PlaybackPosition,
        author: &str,
        text: &str,
        parent_id: Option<DbId>,
    ) -> ServiceResult<Comment> {
        let author = author.trim();
        validate_author(author)?;
        validate_comment_text(text)?;

        let project = self.project(project_id).await?;
        let frame = resolve_frame(&project, position).map_err(CoreError::from)?;
        let timecode = frame_to_timecode(frame, project.framerate).map_err(CoreError::from)?;

        let input = CreateComment {
            project_id,
            parent_id,
            author: author.to_string(),
            text: text.to_string(),
            frame_number: frame,
            timecode,
            status: None,
        };
        self.store.create_comment(&input).await
    }

    pub async fn list_comments(&self, project_id: DbId) -> ServiceResult<Vec<Comment>> {
        self.project(project_id).await?;
        self.store.list_comments(project_id).await
    }

    /// A project's comments with replies grouped under their parent.
    ///
    /// Top-level comments keep timeline order; replies follow their parent
    /// oldest first. Each entry carries its reply depth (0 for top level).
    pub async fn list_comment_threads(
        &self,
        project_id: DbId,
    ) -> ServiceResult<Vec<(usize, Comment)>> {
        let comments = self.list_comments(project_id).await?;
        Ok(thread_order(comments))
    }

    pub async fn edit_comment(&self, comment_id: DbId, text: &str) -> ServiceResult<Comment> {
        validate_comment_text(text)?;
        let input = UpdateComment {
            text: Some(text.to_string()),
        };
        self.store.update_comment(comment_id, &input).await
    }

    pub async fn set_status(
        &self,
        comment_id: DbId,
        status: CommentStatus,
    ) -> ServiceResult<Comment> {
        self.store.update_comment_status(comment_id, status).await
    }

    pub async fn delete_comment(&self, id: DbId) -> ServiceResult<()> {
        if !self.store.delete_comment(id).await? {
            return Err(StoreError::not_found("Comment", id));
        }
        Ok(())
    }

    /// Render the project's comments in `format`, named for `date`.
    pub async fn export(
        &self,
        project_id: DbId,
        format: ExportFormat,
        options: &ExportOptions,
        date: NaiveDate,
    ) -> ServiceResult<ExportArtifact> {
        let project = self.project(project_id).await?;
        let comments = self.store.list_comments(project_id).await?;

        let artifact = ExportArtifact {
            filename: export_filename(&project.name, format, date),
            mime_type: format.mime_type(),
            content: render(format, &project, &comments, options),
        };

        tracing::info!(
            project_id,
            format = %format,
            comments = comments.len(),
            filename = %artifact.filename,
            "Export rendered",
        );
        Ok(artifact)
    }
}

/// Depth-first walk from each top-level comment. A reply whose parent is
/// missing from `comments` is treated as top level.
fn thread_order(comments: Vec<Comment>) -> Vec<(usize, Comment)> {
    let ids: HashSet<DbId> = comments.iter().map(|c| c.id).collect();
    let mut replies: HashMap<DbId, Vec<Comment>> = HashMap::new();
    let mut roots = Vec::new();
    for comment in comments {
        match comment.parent_id {
            Some(parent) if ids.contains(&parent) => {
                replies.entry(parent).or_default().push(comment)
            }
            _ => roots.push(comment),
        }
    }
    for children in replies.values_mut() {
        children.sort_by_key(|c| c.id);
    }

    let mut ordered = Vec::with_capacity(ids.len());
    let mut stack: Vec<(usize, Comment)> = roots.into_iter().rev().map(|c| (0, c)).collect();
    while let Some((depth, comment)) = stack.pop() {
        if let Some(children) = replies.remove(&comment.id) {
            stack.extend(children.into_iter().rev().map(|c| (depth + 1, c)));
        }
        ordered.push((depth, comment));
    }
    ordered
}

/// Frame for `position`, clamped to the clip.
fn resolve_frame(
    project: &Project,
    position: &PlaybackPosition,
) -> Result<FrameNumber, TimecodeError> {
    let frame = match position {
        PlaybackPosition::Seconds(seconds) => {
            let seconds = *seconds;
            if seconds.is_nan() {
                return Err(TimecodeError::invalid_argument("position must be a number"));
            }
            seconds_to_frame(seconds.max(0.0), project.framerate)?
        }
        PlaybackPosition::Timecode(tc) => timecode_to_frame(tc, project.framerate)?,
    };

    let last_frame = project.end_frame().saturating_sub(1);
    Ok(frame.min(last_frame))
}
