//! Comment status and the status-to-marker-color mapping.
//!
//! Statuses form one closed set. Older project data that only knew
//! `open | resolved` parses through the same table, with `open` landing on
//! [`CommentStatus::Unresolved`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Comment status
// ---------------------------------------------------------------------------

/// Review state of a comment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    #[default]
    #[serde(alias = "open")]
    Unresolved,
    InProgress,
    Resolved,
}

/// Accepted status spellings, canonical names first.
const STATUS_TABLE: &[(&str, CommentStatus)] = &[
    ("unresolved", CommentStatus::Unresolved),
    ("in_progress", CommentStatus::InProgress),
    ("resolved", CommentStatus::Resolved),
    ("open", CommentStatus::Unresolved),
];

impl CommentStatus {
    pub const ALL: [CommentStatus; 3] = [Self::Unresolved, Self::InProgress, Self::Resolved];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unresolved => "unresolved",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

impl fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        STATUS_TABLE
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, status)| *status)
            .ok_or_else(|| {
                let names: Vec<&str> = STATUS_TABLE.iter().map(|(name, _)| *name).collect();
                CoreError::Validation(format!(
                    "Invalid comment status '{s}'. Must be one of: {}",
                    names.join(", ")
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Marker colors
// ---------------------------------------------------------------------------

/// Marker colors understood by DaVinci Resolve's xmeml and EDL importers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Red,
    Yellow,
    Green,
    Blue,
    Cyan,
    Pink,
    Purple,
}

impl MarkerColor {
    /// Lowercase name used in xmeml `<color>` elements.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Cyan => "cyan",
            Self::Pink => "pink",
            Self::Purple => "purple",
        }
    }

    /// Uppercase name used on EDL `* MARKER:` lines.
    pub fn edl_name(&self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

impl fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which marker color each status exports as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub unresolved: MarkerColor,
    pub in_progress: MarkerColor,
    pub resolved: MarkerColor,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            unresolved: MarkerColor::Red,
            in_progress: MarkerColor::Yellow,
            resolved: MarkerColor::Green,
        }
    }
}

impl ColorScheme {
    pub fn color_for(&self, status: CommentStatus) -> MarkerColor {
        match status {
            CommentStatus::Unresolved => self.unresolved,
            CommentStatus::InProgress => self.in_progress,
            CommentStatus::Resolved => self.resolved,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
