//! Semicolon-delimited comment dump.
//!
//! Semicolons instead of commas so the file opens cleanly in spreadsheet
//! locales that use the comma as decimal separator. UTF-8, no BOM, every
//! row newline-terminated.

use chrono::SecondsFormat;

use crate::review::{sort_for_export, Comment, Project};
use crate::types::Timestamp;

pub const CSV_HEADER: &str = "CommentID;ParentID;Timecode;Author;Text;Status;CreatedAt";

const DELIMITER: char = ';';

/// `2026-03-14T10:00:03.000Z`: RFC 3339, millisecond precision, `Z` suffix.
pub fn iso_timestamp(at: &Timestamp) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render one row per comment under [`CSV_HEADER`].
///
/// The text column is always quoted. Other columns are quoted only when they
/// contain the delimiter, a quote or a line break.
pub fn render_csv(_project: &Project, comments: &[Comment]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for comment in sort_for_export(comments) {
        let parent_id = comment
            .parent_id
            .map(|id| id.to_string())
            .unwrap_or_default();

        let row = [
            quote_if_needed(&comment.id.to_string()),
            quote_if_needed(&parent_id),
            quote_if_needed(&comment.timecode),
            quote_if_needed(&comment.author),
            quote(&comment.text),
            comment.status.as_str().to_string(),
            iso_timestamp(&comment.created_at),
        ];

        out.push_str(&row.join(&DELIMITER.to_string()));
        out.push('\n');
    }

    out
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn quote_if_needed(field: &str) -> String {
    if field.contains([DELIMITER, '"', '\n', '\r']) {
        quote(field)
    } else {
        field.to_string()
    }
}
