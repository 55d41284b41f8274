//! xmeml v5 marker document.
//!
//! Tag names and nesting are what Resolve's importer looks for; do not
//! rename or reorder them:
//!
//! ```text
//! xmeml > sequence > name, rate, timecode, media > video > track > clipitem
//!   clipitem > name, start, end, in, out, marker*
//!   marker > comment, in, out, name, color, metadata?
//! ```

use crate::review::{sort_for_export, Comment, Project};
use crate::timecode::ZERO_TIMECODE;

use super::ExportOptions;

/// Metadata element names carried on each marker.
pub const META_COMMENT_ID: &str = "smoTreeCommentId";
pub const META_AUTHOR: &str = "smoTreeAuthor";
pub const META_TIMESTAMP: &str = "smoTreeTimestamp";
pub const META_STATUS: &str = "smoTreeStatus";
pub const META_PARENT_ID: &str = "smoTreeParentId";

/// Escape the five XML metacharacters and drop characters XML 1.0 does not
/// allow (C0 controls other than tab, LF and CR; U+FFFE and U+FFFF).
///
/// `&` is replaced first so entities produced by the later replacements are
/// not escaped a second time.
pub fn escape_xml(text: &str) -> String {
    let text: String = text.chars().filter(|&c| is_xml_char(c)).collect();
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Render the xmeml marker document for `project`.
pub fn render_xml(project: &Project, comments: &[Comment], options: &ExportOptions) -> String {
    let end = project.end_frame().to_string();
    let timebase = project.framerate.to_string();
    let prefix = &options.marker_prefix;

    let markers: Vec<&Comment> = sort_for_export(comments)
        .into_iter()
        .filter(|c| options.include_resolved || !c.status.is_resolved())
        .collect();

    let mut w = XmlWriter::new();
    w.declaration();
    w.open("xmeml", &[("version", "5")]);
    w.open("sequence", &[("id", "sequence-1")]);
    w.leaf("name", &format!("{prefix}_Export_{}", project.name));
    write_rate(&mut w, &timebase);
    w.open("timecode", &[]);
    write_rate(&mut w, &timebase);
    w.leaf("string", ZERO_TIMECODE);
    w.close("timecode");
    w.open("media", &[]);
    w.open("video", &[]);
    w.open("track", &[]);
    w.open("clipitem", &[("id", "clipitem-1")]);
    w.leaf("name", project.clip_name());
    w.leaf("start", "0");
    w.leaf("end", &end);
    w.leaf("in", "0");
    w.leaf("out", &end);

    for comment in markers {
        write_marker(&mut w, comment, options);
    }

    w.close("clipitem");
    w.close("track");
    w.close("video");
    w.close("media");
    w.close("sequence");
    w.close("xmeml");
    w.finish()
}

fn write_rate(w: &mut XmlWriter, timebase: &str) {
    w.open("rate", &[]);
    w.leaf("timebase", timebase);
    w.leaf("ntsc", "FALSE");
    w.close("rate");
}

fn write_marker(w: &mut XmlWriter, comment: &Comment, options: &ExportOptions) {
    let color = options.colors.color_for(comment.status);

    w.open("marker", &[]);
    w.leaf("comment", &comment.text);
    w.leaf("in", &comment.frame_number.to_string());
    w.leaf("out", &comment.frame_number.saturating_add(1).to_string());
    w.leaf("name", &format!("{} - {}", options.marker_prefix, comment.author));
    w.leaf("color", color.as_str());

    if options.include_metadata {
        w.open("metadata", &[]);
        w.leaf(META_COMMENT_ID, &comment.id.to_string());
        w.leaf(META_AUTHOR, &comment.author);
        w.leaf(META_TIMESTAMP, &super::csv::iso_timestamp(&comment.created_at));
        w.leaf(META_STATUS, comment.status.as_str());
        if let Some(parent_id) = comment.parent_id {
            w.leaf(META_PARENT_ID, &parent_id.to_string());
        }
        w.close("metadata");
    }

    w.close("marker");
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Minimal indenting writer; every text and attribute value is escaped.
struct XmlWriter {
    out: String,
    depth: usize,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
        }
    }

    fn declaration(&mut self) {
        self.out
            .push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
    }

    fn open(&mut self, tag: &str, attributes: &[(&str, &str)]) {
        self.indent();
        self.out.push('<');
        self.out.push_str(tag);
        for (name, value) in attributes {
            self.out.push_str(&format!(" {name}=\"{}\"", escape_xml(value)));
        }
        self.out.push_str(">\n");
        self.depth += 1;
    }

    fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        self.out.push_str(&format!("</{tag}>\n"));
    }

    fn leaf(&mut self, tag: &str, text: &str) {
        self.indent();
        self.out
            .push_str(&format!("<{tag}>{}</{tag}>\n", escape_xml(text)));
    }

    fn finish(self) -> String {
        self.out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
