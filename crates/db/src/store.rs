//! Store abstraction over projects and comments.
//!
//! [`ReviewStore`] is the only way the orchestrator touches persistence.
//! Both implementations enforce the same rules:
//!
//! - Deleting a project deletes its comments; deleting a comment deletes its
//!   replies.
//! - Project updates are validated like new projects; a project's framerate
//!   cannot change once it has comments.
//! - A reply's parent must exist and belong to the same project.
//! - Comment listings come back in timeline order (frame, then insertion).

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use smotree_core::error::CoreError;
use smotree_core::framerate::validate_framerate;
use smotree_core::review::{validate_duration, validate_project_name, Comment, Project};
use smotree_core::status::CommentStatus;
use smotree_core::types::DbId;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::comment::{CreateComment, UpdateComment};
use crate::models::project::{CreateProject, UpdateProject};
use crate::repositories::{CommentRepo, ProjectRepo};
use crate::DbPool;

/// Persistence operations needed by the review workflow.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn create_project(&self, input: &CreateProject) -> Result<Project, StoreError>;

    async fn find_project(&self, id: DbId) -> Result<Option<Project>, StoreError>;

    /// All projects, most recently created first.
    async fn list_projects(&self) -> Result<Vec<Project>, StoreError>;

    async fn update_project(&self, id: DbId, input: &UpdateProject)
        -> Result<Project, StoreError>;

    /// Returns `true` if the project existed.
    async fn delete_project(&self, id: DbId) -> Result<bool, StoreError>;

    async fn create_comment(&self, input: &CreateComment) -> Result<Comment, StoreError>;

    async fn find_comment(&self, id: DbId) -> Result<Option<Comment>, StoreError>;

    /// A project's comments in timeline order.
    async fn list_comments(&self, project_id: DbId) -> Result<Vec<Comment>, StoreError>;

    /// Replies to `parent_id`, oldest first.
    async fn list_thread(&self, parent_id: DbId) -> Result<Vec<Comment>, StoreError>;

    async fn update_comment(&self, id: DbId, input: &UpdateComment)
        -> Result<Comment, StoreError>;

    async fn update_comment_status(
        &self,
        id: DbId,
        status: CommentStatus,
    ) -> Result<Comment, StoreError>;

    /// Returns `true` if the comment existed.
    async fn delete_comment(&self, id: DbId) -> Result<bool, StoreError>;
}

/* --------------------------------------------------------------------------
Shared rules
-------------------------------------------------------------------------- */

fn check_project_update(input: &UpdateProject) -> Result<(), CoreError> {
    if let Some(name) = &input.name {
        validate_project_name(name)?;
    }
    if let Some(framerate) = input.framerate {
        validate_framerate(framerate).map_err(|e| CoreError::Validation(e.to_string()))?;
    }
    if let Some(duration) = input.duration {
        validate_duration(duration)?;
    }
    Ok(())
}

fn check_framerate_change(
    project: &Project,
    input: &UpdateProject,
    comment_count: usize,
) -> Result<(), CoreError> {
    match input.framerate {
        Some(framerate) if framerate != project.framerate && comment_count > 0 => {
            Err(CoreError::Conflict(format!(
                "Cannot change framerate of project {} from {} to {framerate}: \
                 it already has {comment_count} comment(s)",
                project.id, project.framerate
            )))
        }
        _ => Ok(()),
    }
}

fn check_parent(parent: Option<&Comment>, input: &CreateComment) -> Result<(), StoreError> {
    let Some(parent_id) = input.parent_id else {
        return Ok(());
    };
    match parent {
        None => Err(StoreError::not_found("Comment", parent_id)),
        Some(parent) if parent.project_id != input.project_id => {
            Err(CoreError::Validation(format!(
                "Parent comment {parent_id} belongs to project {}, not {}",
                parent.project_id, input.project_id
            ))
            .into())
        }
        Some(_) => Ok(()),
    }
}

/* --------------------------------------------------------------------------
SQLite
-------------------------------------------------------------------------- */

/// [`ReviewStore`] backed by a sqlx SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database at `database_url` and apply migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = crate::create_pool(database_url).await?;
        crate::run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl ReviewStore for SqliteStore {
    async fn create_project(&self, input: &CreateProject) -> Result<Project, StoreError> {
        let row = ProjectRepo::create(&self.pool, input).await?;
        tracing::info!(project_id = row.id, name = %row.name, "Project created");
        Ok(row.into())
    }

    async fn find_project(&self, id: DbId) -> Result<Option<Project>, StoreError> {
        Ok(ProjectRepo::find_by_id(&self.pool, id).await?.map(Into::into))
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let rows = ProjectRepo::list(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_project(
        &self,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Project, StoreError> {
        check_project_update(input)?;
        let current: Project = ProjectRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| StoreError::not_found("Project", id))?
            .into();
        let count = CommentRepo::count_for_project(&self.pool, id).await?;
        check_framerate_change(&current, input, usize::try_from(count).unwrap_or(usize::MAX))?;

        let row = ProjectRepo::update(&self.pool, id, input)
            .await?
            .ok_or_else(|| StoreError::not_found("Project", id))?;
        Ok(row.into())
    }

    async fn delete_project(&self, id: DbId) -> Result<bool, StoreError> {
        let deleted = ProjectRepo::delete(&self.pool, id).await?;
        if deleted {
            tracing::info!(project_id = id, "Project deleted");
        }
        Ok(deleted)
    }

    async fn create_comment(&self, input: &CreateComment) -> Result<Comment, StoreError> {
        if ProjectRepo::find_by_id(&self.pool, input.project_id).await?.is_none() {
            return Err(StoreError::not_found("Project", input.project_id));
        }
        if let Some(parent_id) = input.parent_id {
            let parent = self.find_comment(parent_id).await?;
            check_parent(parent.as_ref(), input)?;
        }

        let row = CommentRepo::create(&self.pool, input).await?;
        tracing::info!(
            comment_id = row.id,
            project_id = row.project_id,
            frame = row.frame_number,
            "Comment created",
        );
        Ok(Comment::try_from(row)?)
    }

    async fn find_comment(&self, id: DbId) -> Result<Option<Comment>, StoreError> {
        match CommentRepo::find_by_id(&self.pool, id).await? {
            Some(row) => Ok(Some(Comment::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn list_comments(&self, project_id: DbId) -> Result<Vec<Comment>, StoreError> {
        let rows = CommentRepo::list_for_project(&self.pool, project_id).await?;
        rows_to_comments(rows)
    }

    async fn list_thread(&self, parent_id: DbId) -> Result<Vec<Comment>, StoreError> {
        let rows = CommentRepo::list_thread(&self.pool, parent_id).await?;
        rows_to_comments(rows)
    }

    async fn update_comment(
        &self,
        id: DbId,
        input: &UpdateComment,
    ) -> Result<Comment, StoreError> {
        let row = CommentRepo::update(&self.pool, id, input)
            .await?
            .ok_or_else(|| StoreError::not_found("Comment", id))?;
        Ok(Comment::try_from(row)?)
    }

    async fn update_comment_status(
        &self,
        id: DbId,
        status: CommentStatus,
    ) -> Result<Comment, StoreError> {
        let row = CommentRepo::update_status(&self.pool, id, status)
            .await?
            .ok_or_else(|| StoreError::not_found("Comment", id))?;
        tracing::info!(comment_id = id, status = %status, "Comment status changed");
        Ok(Comment::try_from(row)?)
    }

    async fn delete_comment(&self, id: DbId) -> Result<bool, StoreError> {
        let deleted = CommentRepo::delete(&self.pool, id).await?;
        if deleted {
            tracing::info!(comment_id = id, "Comment deleted");
        }
        Ok(deleted)
    }
}

fn rows_to_comments(
    rows: Vec<crate::models::comment::CommentRow>,
) -> Result<Vec<Comment>, StoreError> {
    rows.into_iter()
        .map(|row| Comment::try_from(row).map_err(StoreError::from))
        .collect()
}

/* --------------------------------------------------------------------------
In-memory
-------------------------------------------------------------------------- */

#[derive(Debug, Default)]
struct MemoryState {
    last_project_id: DbId,
    last_comment_id: DbId,
    projects: BTreeMap<DbId, Project>,
    comments: BTreeMap<DbId, Comment>,
}

impl MemoryState {
    fn comment_count(&self, project_id: DbId) -> usize {
        self.comments
            .values()
            .filter(|c| c.project_id == project_id)
            .count()
    }

    /// Remove `id` and every comment that replies to it, directly or not.
    fn remove_comment_tree(&mut self, id: DbId) -> bool {
        if self.comments.remove(&id).is_none() {
            return false;
        }
        let mut pending = vec![id];
        while let Some(parent) = pending.pop() {
            let replies: Vec<DbId> = self
                .comments
                .values()
                .filter(|c| c.parent_id == Some(parent))
                .map(|c| c.id)
                .collect();
            for reply in replies {
                self.comments.remove(&reply);
                pending.push(reply);
            }
        }
        true
    }
}

/// [`ReviewStore`] kept in process memory.
///
/// IDs start at 1 and are never reused within one store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn create_project(&self, input: &CreateProject) -> Result<Project, StoreError> {
        let mut state = self.state.write().await;
        state.last_project_id += 1;
        let now = Utc::now();
        let project = Project {
            id: state.last_project_id,
            name: input.name.clone(),
            description: input.description.clone(),
            framerate: input.framerate,
            duration: input.duration,
            video_filename: input.video_filename.clone(),
            video_url: input.video_url.clone(),
            created_by: input.created_by.clone(),
            created_at: now,
            updated_at: now,
        };
        state.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn find_project(&self, id: DbId) -> Result<Option<Project>, StoreError> {
        Ok(self.state.read().await.projects.get(&id).cloned())
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let state = self.state.read().await;
        Ok(state.projects.values().rev().cloned().collect())
    }

    async fn update_project(
        &self,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Project, StoreError> {
        check_project_update(input)?;
        let mut state = self.state.write().await;
        let count = state.comment_count(id);
        let project = state
            .projects
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Project", id))?;
        check_framerate_change(project, input, count)?;

        if let Some(name) = &input.name {
            project.name = name.clone();
        }
        if let Some(description) = &input.description {
            project.description = Some(description.clone());
        }
        if let Some(framerate) = input.framerate {
            project.framerate = framerate;
        }
        if let Some(duration) = input.duration {
            project.duration = duration;
        }
        if let Some(video_filename) = &input.video_filename {
            project.video_filename = Some(video_filename.clone());
        }
        if let Some(video_url) = &input.video_url {
            project.video_url = Some(video_url.clone());
        }
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    async fn delete_project(&self, id: DbId) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if state.projects.remove(&id).is_none() {
            return Ok(false);
        }
        state.comments.retain(|_, c| c.project_id != id);
        Ok(true)
    }

    async fn create_comment(&self, input: &CreateComment) -> Result<Comment, StoreError> {
        let mut state = self.state.write().await;
        if !state.projects.contains_key(&input.project_id) {
            return Err(StoreError::not_found("Project", input.project_id));
        }
        if let Some(parent_id) = input.parent_id {
            check_parent(state.comments.get(&parent_id), input)?;
        }

        state.last_comment_id += 1;
        let now = Utc::now();
        let comment = Comment {
            id: state.last_comment_id,
            project_id: input.project_id,
            parent_id: input.parent_id,
            author: input.author.clone(),
            text: input.text.clone(),
            frame_number: input.frame_number,
            timecode: input.timecode.clone(),
            status: input.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        state.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_comment(&self, id: DbId) -> Result<Option<Comment>, StoreError> {
        Ok(self.state.read().await.comments.get(&id).cloned())
    }

    async fn list_comments(&self, project_id: DbId) -> Result<Vec<Comment>, StoreError> {
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.project_id == project_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.frame_number);
        Ok(comments)
    }

    async fn list_thread(&self, parent_id: DbId) -> Result<Vec<Comment>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .comments
            .values()
            .filter(|c| c.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn update_comment(
        &self,
        id: DbId,
        input: &UpdateComment,
    ) -> Result<Comment, StoreError> {
        let mut state = self.state.write().await;
        let comment = state
            .comments
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Comment", id))?;
        if let Some(text) = &input.text {
            comment.text = text.clone();
        }
        comment.updated_at = Utc::now();
        Ok(comment.clone())
    }

    async fn update_comment_status(
        &self,
        id: DbId,
        status: CommentStatus,
    ) -> Result<Comment, StoreError> {
        let mut state = self.state.write().await;
        let comment = state
            .comments
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Comment", id))?;
        comment.status = status;
        comment.updated_at = Utc::now();
        Ok(comment.clone())
    }

    async fn delete_comment(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(self.state.write().await.remove_comment_tree(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn new_project(name: &str) -> CreateProject {
        CreateProject {
            name: name.to_string(),
            description: None,
            framerate: 25.0,
            duration: 60.0,
            video_filename: None,
            video_url: None,
            created_by: None,
        }
    }

    fn new_comment(project_id: DbId, frame: u64, parent_id: Option<DbId>) -> CreateComment {
        CreateComment {
            project_id,
            parent_id,
            author: "Ann".to_string(),
            text: format!("at {frame}"),
            frame_number: frame,
            timecode: String::new(),
            status: None,
        }
    }

    // -- Shared rules ---------------------------------------------------------

    #[tokio::test]
    async fn framerate_change_allowed_without_comments() {
        let store = MemoryStore::new();
        let project = store.create_project(&new_project("a")).await.unwrap();
        let update = UpdateProject {
            framerate: Some(29.97),
            ..UpdateProject::default()
        };
        let updated = store.update_project(project.id, &update).await.unwrap();
        assert_eq!(updated.framerate, 29.97);
    }

    #[tokio::test]
    async fn framerate_locked_once_commented() {
        let store = MemoryStore::new();
        let project = store.create_project(&new_project("a")).await.unwrap();
        store
            .create_comment(&new_comment(project.id, 10, None))
            .await
            .unwrap();

        let update = UpdateProject {
            framerate: Some(24.0),
            ..UpdateProject::default()
        };
        assert_matches!(
            store.update_project(project.id, &update).await,
            Err(StoreError::Core(CoreError::Conflict(_)))
        );

        let same = UpdateProject {
            framerate: Some(25.0),
            name: Some("b".to_string()),
            ..UpdateProject::default()
        };
        assert_eq!(store.update_project(project.id, &same).await.unwrap().name, "b");
    }

    #[tokio::test]
    async fn project_update_rejects_invalid_values() {
        let store = MemoryStore::new();
        let project = store.create_project(&new_project("a")).await.unwrap();

        for update in [
            UpdateProject {
                framerate: Some(-5.0),
                ..UpdateProject::default()
            },
            UpdateProject {
                framerate: Some(f64::NAN),
                ..UpdateProject::default()
            },
            UpdateProject {
                duration: Some(-1.0),
                ..UpdateProject::default()
            },
            UpdateProject {
                name: Some("  ".to_string()),
                ..UpdateProject::default()
            },
        ] {
            assert_matches!(
                store.update_project(project.id, &update).await,
                Err(StoreError::Core(CoreError::Validation(_)))
            );
        }

        let unchanged = store.find_project(project.id).await.unwrap().unwrap();
        assert_eq!(unchanged, project);
    }

    #[tokio::test]
    async fn reply_parent_must_share_project() {
        let store = MemoryStore::new();
        let a = store.create_project(&new_project("a")).await.unwrap();
        let b = store.create_project(&new_project("b")).await.unwrap();
        let root = store.create_comment(&new_comment(a.id, 1, None)).await.unwrap();

        assert_matches!(
            store.create_comment(&new_comment(b.id, 1, Some(root.id))).await,
            Err(StoreError::Core(CoreError::Validation(_)))
        );
        assert_matches!(
            store.create_comment(&new_comment(a.id, 1, Some(999))).await,
            Err(StoreError::Core(CoreError::NotFound { entity: "Comment", id: 999 }))
        );
    }

    // -- MemoryStore ----------------------------------------------------------

    #[tokio::test]
    async fn comments_listed_in_timeline_order() {
        let store = MemoryStore::new();
        let p = store.create_project(&new_project("a")).await.unwrap();
        for frame in [30, 10, 20, 10] {
            store.create_comment(&new_comment(p.id, frame, None)).await.unwrap();
        }
        let listed = store.list_comments(p.id).await.unwrap();
        let order: Vec<(u64, DbId)> = listed.iter().map(|c| (c.frame_number, c.id)).collect();
        assert_eq!(order, vec![(10, 2), (10, 4), (20, 3), (30, 1)]);
    }

    #[tokio::test]
    async fn deleting_project_removes_comments() {
        let store = MemoryStore::new();
        let p = store.create_project(&new_project("a")).await.unwrap();
        let c = store.create_comment(&new_comment(p.id, 1, None)).await.unwrap();

        assert!(store.delete_project(p.id).await.unwrap());
        assert!(store.find_comment(c.id).await.unwrap().is_none());
        assert!(!store.delete_project(p.id).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_comment_removes_replies() {
        let store = MemoryStore::new();
        let p = store.create_project(&new_project("a")).await.unwrap();
        let root = store.create_comment(&new_comment(p.id, 1, None)).await.unwrap();
        let reply = store
            .create_comment(&new_comment(p.id, 1, Some(root.id)))
            .await
            .unwrap();
        let other = store.create_comment(&new_comment(p.id, 2, None)).await.unwrap();

        assert_eq!(store.list_thread(root.id).await.unwrap().len(), 1);
        assert!(store.delete_comment(root.id).await.unwrap());
        assert!(store.find_comment(reply.id).await.unwrap().is_none());
        assert!(store.find_comment(other.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn projects_listed_newest_first() {
        let store = MemoryStore::new();
        store.create_project(&new_project("first")).await.unwrap();
        store.create_project(&new_project("second")).await.unwrap();
        let names: Vec<String> = store
            .list_projects()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn missing_rows_report_not_found() {
        let store = MemoryStore::new();
        assert_matches!(
            store.update_comment_status(5, CommentStatus::Resolved).await,
            Err(StoreError::Core(CoreError::NotFound { entity: "Comment", id: 5 }))
        );
        assert_matches!(
            store.update_project(5, &UpdateProject::default()).await,
            Err(StoreError::Core(CoreError::NotFound { entity: "Project", .. }))
        );
        assert_matches!(
            store.create_comment(&new_comment(5, 0, None)).await,
            Err(StoreError::Core(CoreError::NotFound { entity: "Project", id: 5 }))
        );
    }
}
