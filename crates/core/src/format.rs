//! Human-readable clock and size strings for display.
//!
//! Neither function is frame-accurate; use [`crate::timecode`] for that.

/// Units used by [`format_file_size`], each 1024 times the previous.
const SIZE_UNITS: &[&str] = &["Bytes", "KB", "MB", "GB"];

/// Format a duration as `M:SS`, or `H:MM:SS` once it reaches an hour.
///
/// Minutes and seconds are zero-padded; hours never are. Negative and
/// non-finite durations format as `0:00`.
///
/// ```
/// use smotree_core::format::format_duration;
///
/// assert_eq!(format_duration(65.9), "1:05");
/// assert_eq!(format_duration(3725.0), "1:02:05");
/// ```
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Format a byte count with binary units, rounded to two decimals.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", SIZE_UNITS[unit])
}
