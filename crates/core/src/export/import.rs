//! Read markers back out of an xmeml document.
//!
//! Used when a timeline comes back from an NLE: markers written by
//! [`render_xml`](super::render_xml) still carry their metadata block, so
//! they can be matched to the comments they came from. Markers added in the
//! NLE have no metadata and come back with only the timing fields set.

use roxmltree::Node;
use serde::Serialize;

use crate::status::CommentStatus;
use crate::types::FrameNumber;

use super::xml::{META_AUTHOR, META_COMMENT_ID, META_PARENT_ID, META_STATUS, META_TIMESTAMP};
use super::ExportError;

/// A marker recovered from an xmeml document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportedMarker {
    pub name: String,
    pub comment: String,
    pub frame_in: FrameNumber,
    pub frame_out: FrameNumber,
    pub color: Option<String>,
    pub comment_id: Option<String>,
    pub author: Option<String>,
    pub status: Option<CommentStatus>,
    pub created_at: Option<String>,
    pub parent_id: Option<String>,
}

/// Parse every `<marker>` element in document order.
pub fn import_markers(xml: &str) -> Result<Vec<ImportedMarker>, ExportError> {
    let doc = roxmltree::Document::parse(xml)?;

    doc.descendants()
        .filter(|n| n.has_tag_name("marker"))
        .map(parse_marker)
        .collect()
}

fn parse_marker(marker: Node<'_, '_>) -> Result<ImportedMarker, ExportError> {
    let frame_in = parse_frame(marker, "in")?.ok_or_else(|| {
        ExportError::InvalidMarker("marker is missing an <in> frame".to_string())
    })?;
    let frame_out = match parse_frame(marker, "out")? {
        Some(frame) => frame,
        None => frame_in.checked_add(1).ok_or_else(|| {
            ExportError::InvalidMarker(format!("<in> {frame_in} has no room for an out point"))
        })?,
    };

    let name = child_text(marker, "name").unwrap_or_default().to_string();
    let metadata = marker.children().find(|c| c.has_tag_name("metadata"));
    let meta = |tag: &str| metadata.and_then(|m| child_text(m, tag)).map(str::to_string);

    // Markers without metadata still name their author as "<prefix> - <author>".
    let author = meta(META_AUTHOR).or_else(|| {
        name.split_once(" - ")
            .map(|(_, author)| author.to_string())
    });

    Ok(ImportedMarker {
        comment: child_text(marker, "comment").unwrap_or_default().to_string(),
        frame_in,
        frame_out,
        color: child_text(marker, "color").map(str::to_string),
        comment_id: meta(META_COMMENT_ID),
        author,
        status: meta(META_STATUS).and_then(|s| s.parse().ok()),
        created_at: meta(META_TIMESTAMP),
        parent_id: meta(META_PARENT_ID),
        name,
    })
}

fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|c| c.has_tag_name(tag))
        .and_then(|c| c.text())
}

fn parse_frame(marker: Node<'_, '_>, tag: &str) -> Result<Option<FrameNumber>, ExportError> {
    match child_text(marker, tag) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            ExportError::InvalidMarker(format!("<{tag}> must be a frame number, got '{raw}'"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::{comment, project};
    use crate::export::{render_xml, ExportOptions};
    use assert_matches::assert_matches;

    #[test]
    fn round_trips_rendered_markers() {
        let mut reply = comment(2, 40, CommentStatus::InProgress, "a & <b>");
        reply.parent_id = Some(1);
        let comments = vec![reply, comment(1, 12, CommentStatus::Resolved, "first")];
        let xml = render_xml(&project(), &comments, &ExportOptions::default());

        let markers = import_markers(&xml).unwrap();
        assert_eq!(markers.len(), 2);

        assert_eq!(markers[0].frame_in, 12);
        assert_eq!(markers[0].frame_out, 13);
        assert_eq!(markers[0].comment_id.as_deref(), Some("1"));
        assert_eq!(markers[0].status, Some(CommentStatus::Resolved));
        assert_eq!(markers[0].color.as_deref(), Some("green"));
        assert_eq!(markers[0].parent_id, None);

        assert_eq!(markers[1].comment, "a & <b>");
        assert_eq!(markers[1].author.as_deref(), Some("Ann"));
        assert_eq!(markers[1].parent_id.as_deref(), Some("1"));
        assert_eq!(
            markers[1].created_at.as_deref(),
            Some("2026-03-14T10:00:02.000Z")
        );
    }

    #[test]
    fn markers_added_in_the_editor_have_no_metadata() {
        let xml = r#"<xmeml version="5"><sequence><media><video><track><clipitem>
            <marker><comment>Grade this</comment><in>100</in><name>Resolve - Max</name></marker>
        </clipitem></track></video></media></sequence></xmeml>"#;

        let markers = import_markers(xml).unwrap();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].frame_in, 100);
        assert_eq!(markers[0].frame_out, 101);
        assert_eq!(markers[0].author.as_deref(), Some("Max"));
        assert_eq!(markers[0].comment_id, None);
        assert_eq!(markers[0].status, None);
        assert_eq!(markers[0].color, None);
    }

    #[test]
    fn document_without_markers() {
        let xml = render_xml(&project(), &[], &ExportOptions::default());
        assert!(import_markers(&xml).unwrap().is_empty());
    }

    #[test]
    fn malformed_xml_rejected() {
        assert_matches!(import_markers("<xmeml><marker>"), Err(ExportError::Xml(_)));
    }

    #[test]
    fn non_numeric_frame_rejected() {
        let xml = "<xmeml><marker><in>ten</in></marker></xmeml>";
        assert_matches!(import_markers(xml), Err(ExportError::InvalidMarker(_)));
    }

    #[test]
    fn last_frame_without_out_rejected() {
        let xml = format!("<xmeml><marker><in>{}</in></marker></xmeml>", u64::MAX);
        assert_matches!(import_markers(&xml), Err(ExportError::InvalidMarker(_)));

        let xml = format!(
            "<xmeml><marker><in>{max}</in><out>{max}</out></marker></xmeml>",
            max = u64::MAX
        );
        assert_eq!(import_markers(&xml).unwrap()[0].frame_out, u64::MAX);
    }

    #[test]
    fn missing_in_frame_rejected() {
        let xml = "<xmeml><marker><comment>x</comment></marker></xmeml>";
        assert_matches!(import_markers(xml), Err(ExportError::InvalidMarker(_)));
    }
}
