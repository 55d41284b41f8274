//! Text EDL with one zero-duration event per comment.
//!
//! Layout of each event block:
//!
//! ```text
//! 001  AX       V     C        00:00:01:05 00:00:01:05 00:00:01:05 00:00:01:05
//! * FROM CLIP NAME: clip.mp4
//! * COMMENT: Ann - Too dark
//! * MARKER: 00:00:01:05 RED
//! ```
//!
//! Source in/out and record in/out are identical because markers have no
//! duration. Timecode is declared non-drop-frame regardless of framerate.

use serde::{Deserialize, Serialize};

use crate::review::{sort_for_export, Comment, Project};

use super::ExportOptions;

/// Legacy limit on the comment text of a `* COMMENT:` line, in characters.
pub const EDL_COMMENT_LIMIT: usize = 255;

/// Column layout of the event line.
///
/// Widths are minimums; longer values push later columns right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdlLayout {
    pub reel: String,
    pub track: String,
    pub transition: String,
    pub reel_width: usize,
    pub track_width: usize,
    pub transition_width: usize,
}

impl Default for EdlLayout {
    fn default() -> Self {
        Self {
            reel: "AX".to_string(),
            track: "V".to_string(),
            transition: "C".to_string(),
            reel_width: 9,
            track_width: 6,
            transition_width: 9,
        }
    }
}

impl EdlLayout {
    fn event_line(&self, event: usize, timecode: &str) -> String {
        format!(
            "{event:03}  {reel:<rw$}{track:<tw$}{transition:<xw$}{tc} {tc} {tc} {tc}",
            reel = self.reel,
            rw = self.reel_width,
            track = self.track,
            tw = self.track_width,
            transition = self.transition,
            xw = self.transition_width,
            tc = timecode,
        )
    }
}

/// Render the EDL for `comments`, numbering events from 001 in frame order.
pub fn render_edl(project: &Project, comments: &[Comment], options: &ExportOptions) -> String {
    let clip_name = single_line(project.clip_name());
    let mut lines: Vec<String> = vec![
        format!(
            "TITLE: {} Export - {}",
            single_line(&options.marker_prefix),
            single_line(&project.name)
        ),
        "FCM: NON-DROP FRAME".to_string(),
        String::new(),
    ];

    for (index, comment) in sort_for_export(comments).into_iter().enumerate() {
        let timecode = &comment.timecode;
        let text: String = single_line(&comment.text)
            .chars()
            .take(EDL_COMMENT_LIMIT)
            .collect();
        let color = options.colors.color_for(comment.status);

        lines.push(options.edl_layout.event_line(index + 1, timecode));
        lines.push(format!("* FROM CLIP NAME: {clip_name}"));
        lines.push(format!("* COMMENT: {} - {text}", single_line(&comment.author)));
        lines.push(format!("* MARKER: {timecode} {}", color.edl_name()));
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Every value shares a line with its `*` label; line breaks become spaces.
fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::{comment, project};
    use crate::status::CommentStatus;

    #[test]
    fn empty_list_has_header_only() {
        let edl = render_edl(&project(), &[], &ExportOptions::default());
        assert_eq!(edl, "TITLE: SmoTree Export - Brand Film\nFCM: NON-DROP FRAME\n");
    }

    #[test]
    fn event_block_layout() {
        let comments = vec![comment(1, 30, CommentStatus::Unresolved, "Too dark")];
        let edl = render_edl(&project(), &comments, &ExportOptions::default());
        let expected = "\
TITLE: SmoTree Export - Brand Film
FCM: NON-DROP FRAME

001  AX       V     C        00:00:01:05 00:00:01:05 00:00:01:05 00:00:01:05
* FROM CLIP NAME: brand_film_v2.mp4
* COMMENT: Ann - Too dark
* MARKER: 00:00:01:05 RED
";
        assert_eq!(edl, expected);
    }

    #[test]
    fn events_numbered_in_frame_order() {
        let comments = vec![
            comment(1, 50, CommentStatus::Resolved, "b"),
            comment(2, 25, CommentStatus::InProgress, "a"),
        ];
        let edl = render_edl(&project(), &comments, &ExportOptions::default());
        let events: Vec<&str> = edl.lines().filter(|l| l.starts_with("00")).collect();
        assert!(events[0].starts_with("001  AX"));
        assert!(events[0].ends_with("00:00:01:00"));
        assert!(events[1].starts_with("002  AX"));
        assert!(events[1].ends_with("00:00:02:00"));
        assert!(edl.contains("* MARKER: 00:00:01:00 YELLOW"));
        assert!(edl.contains("* MARKER: 00:00:02:00 GREEN"));
    }

    #[test]
    fn comment_truncated_to_exactly_255_characters() {
        let long = "x".repeat(300);
        let comments = vec![comment(1, 0, CommentStatus::Unresolved, &long)];
        let edl = render_edl(&project(), &comments, &ExportOptions::default());

        let line = edl
            .lines()
            .find(|l| l.starts_with("* COMMENT: "))
            .expect("comment line");
        let text = line.trim_start_matches("* COMMENT: Ann - ");
        assert_eq!(text.chars().count(), EDL_COMMENT_LIMIT);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let long = "é".repeat(300);
        let comments = vec![comment(1, 0, CommentStatus::Unresolved, &long)];
        let edl = render_edl(&project(), &comments, &ExportOptions::default());
        let line = edl.lines().find(|l| l.starts_with("* COMMENT: ")).unwrap();
        let text = line.trim_start_matches("* COMMENT: Ann - ");
        assert_eq!(text, "é".repeat(EDL_COMMENT_LIMIT));
    }

    #[test]
    fn short_comment_untouched() {
        let comments = vec![comment(1, 0, CommentStatus::Unresolved, "ok")];
        let edl = render_edl(&project(), &comments, &ExportOptions::default());
        assert!(edl.contains("* COMMENT: Ann - ok\n"));
    }

    #[test]
    fn line_breaks_cannot_split_an_event_block() {
        let text = "line one\n* MARKER: 00:00:09:00 GREEN";
        let mut c = comment(1, 5, CommentStatus::Unresolved, text);
        c.author = "Ann\r\nB".to_string();
        let mut p = project();
        p.name = "Brand\nFilm".to_string();
        p.video_filename = Some("clip\r.mp4".to_string());
        let edl = render_edl(&p, &[c], &ExportOptions::default());

        let markers: Vec<&str> = edl.lines().filter(|l| l.starts_with("* MARKER:")).collect();
        assert_eq!(markers, vec!["* MARKER: 00:00:00:05 RED"]);
        assert!(edl.starts_with("TITLE: SmoTree Export - Brand Film\n"));
        assert!(edl.contains("* FROM CLIP NAME: clip .mp4\n"));
        assert!(edl.contains("* COMMENT: Ann B - line one * MARKER: 00:00:09:00 GREEN\n"));
        assert_eq!(edl.lines().count(), 7);
    }

    #[test]
    fn layout_widths_are_configurable() {
        let layout = EdlLayout {
            reel: "001".to_string(),
            reel_width: 4,
            track_width: 3,
            transition_width: 2,
            ..EdlLayout::default()
        };
        assert_eq!(
            layout.event_line(7, "00:00:00:00"),
            "007  001 V  C 00:00:00:00 00:00:00:00 00:00:00:00 00:00:00:00"
        );
    }
}
