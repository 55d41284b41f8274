//! Marker export for non-linear editors.
//!
//! Three renderers share one status-to-color mapping ([`ColorScheme`]):
//!
//! - [`render_xml`]: xmeml v5, one `<marker>` per comment, importable by
//!   DaVinci Resolve and Final Cut Pro 7 era tools.
//! - [`render_edl`]: CMX-style text EDL with `* MARKER:` notes.
//! - [`render_csv`]: semicolon-delimited spreadsheet dump.
//!
//! Renderers are infallible and deterministic: the only timestamps in the
//! output are the comments' own `created_at` values. Comments are written in
//! ascending frame order, ties in input order.

pub mod csv;
pub mod edl;
pub mod import;
pub mod xml;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::review::{Comment, Project};
use crate::status::ColorScheme;

pub use csv::{render_csv, CSV_HEADER};
pub use edl::{render_edl, EdlLayout, EDL_COMMENT_LIMIT};
pub use import::{import_markers, ImportedMarker};
pub use xml::{escape_xml, render_xml};

/// Prefix used for marker names and sequence titles unless overridden.
pub const DEFAULT_MARKER_PREFIX: &str = "SmoTree";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from reading marker documents back in. Rendering never fails.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Invalid marker: {0}")]
    InvalidMarker(String),
}

// ---------------------------------------------------------------------------
// Format
// ---------------------------------------------------------------------------

/// Target document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Xml,
    Edl,
    Csv,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [Self::Xml, Self::Edl, Self::Csv];

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Edl => "edl",
            Self::Csv => "csv",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Xml => "application/xml",
            Self::Edl => "text/plain",
            Self::Csv => "text/csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xml" => Ok(Self::Xml),
            "edl" => Ok(Self::Edl),
            "csv" => Ok(Self::Csv),
            _ => Err(CoreError::Validation(format!(
                "Invalid export format '{s}'. Must be one of: xml, edl, csv"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Knobs shared by the renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// When false, resolved comments are left out of the XML marker list.
    pub include_resolved: bool,
    /// Emit the `<metadata>` block that lets markers be matched back to comments.
    pub include_metadata: bool,
    pub colors: ColorScheme,
    /// Product name used in marker names and titles.
    pub marker_prefix: String,
    pub edl_layout: EdlLayout,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_resolved: true,
            include_metadata: true,
            colors: ColorScheme::default(),
            marker_prefix: DEFAULT_MARKER_PREFIX.to_string(),
            edl_layout: EdlLayout::default(),
        }
    }
}

/// Render `comments` for `project` in the requested format.
pub fn render(
    format: ExportFormat,
    project: &Project,
    comments: &[Comment],
    options: &ExportOptions,
) -> String {
    match format {
        ExportFormat::Xml => render_xml(project, comments, options),
        ExportFormat::Edl => render_edl(project, comments, options),
        ExportFormat::Csv => render_csv(project, comments),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
