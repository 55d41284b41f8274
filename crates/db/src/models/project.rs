//! Project row model and DTOs.

use serde::{Deserialize, Serialize};
use smotree_core::review::Project;
use smotree_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectRow {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub framerate: f64,
    pub duration: f64,
    pub video_filename: Option<String>,
    pub video_url: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            name: row.name,
            description: row.description,
            framerate: row.framerate,
            duration: row.duration,
            video_filename: row.video_filename,
            video_url: row.video_url,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub framerate: f64,
    pub duration: f64,
    pub video_filename: Option<String>,
    pub video_url: Option<String>,
    pub created_by: Option<String>,
}

/// DTO for updating an existing project. All fields are optional.
///
/// Changing `framerate` is refused once the project has comments.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub framerate: Option<f64>,
    pub duration: Option<f64>,
    pub video_filename: Option<String>,
    pub video_url: Option<String>,
}
