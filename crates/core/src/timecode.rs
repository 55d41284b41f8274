//! Frame-accurate conversions between seconds, frame numbers and
//! `HH:MM:SS:FF` timecode strings.
//!
//! Timecode is always non-drop-frame. Fields count in the nominal timebase
//! (see [`nominal_timebase`]), so 29.97 fps material is labelled with frames
//! `00..=29` and drifts from the wall clock the same way NDF timecode does on
//! a deck. Frame numbers are derived with `floor`, never `round`.
//!
//! ```
//! use smotree_core::timecode::{seconds_to_timecode, timecode_to_frame};
//!
//! assert_eq!(seconds_to_timecode(65.04, 25.0).unwrap(), "00:01:05:01");
//! assert_eq!(timecode_to_frame("00:01:05:01", 25.0).unwrap(), 1626);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use crate::error::TimecodeError;
use crate::framerate::{nominal_timebase, validate_framerate};
use crate::types::FrameNumber;

/// A `seconds * framerate` product this close to an integer is that integer.
///
/// `frame / framerate * framerate` does not always come back as exactly
/// `frame` in binary floating point; without the snap a plain `floor` would
/// land one frame early.
pub const FRAME_SNAP_EPSILON: f64 = 1e-6;

/// Zero timecode, used for sequence starts.
pub const ZERO_TIMECODE: &str = "00:00:00:00";

// ---------------------------------------------------------------------------
// Timecode value
// ---------------------------------------------------------------------------

/// A parsed `HH:MM:SS:FF` timecode.
///
/// Field order makes the derived `Ord` chronological. Hours are not wrapped
/// at 24; very long media widens the hour field instead.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timecode {
    pub hours: u64,
    pub minutes: u8,
    pub seconds: u8,
    pub frames: u64,
}

impl Timecode {
    /// Decompose a frame number using the nominal timebase of `framerate`.
    pub fn from_frame(frame: FrameNumber, framerate: f64) -> Result<Self, TimecodeError> {
        let timebase = nominal_timebase(framerate)?;

        let total_seconds = frame / timebase;
        Ok(Self {
            hours: total_seconds / 3600,
            minutes: ((total_seconds % 3600) / 60) as u8,
            seconds: (total_seconds % 60) as u8,
            frames: frame % timebase,
        })
    }

    /// Check every field against its limit at `framerate`.
    ///
    /// Parsed values already have minutes and seconds bounded; hand-built
    /// ones may not.
    pub fn validate_for(&self, framerate: f64) -> Result<(), TimecodeError> {
        let timebase = nominal_timebase(framerate)?;

        if self.minutes > 59 {
            return Err(TimecodeError::OutOfRange {
                field: "minutes",
                value: u64::from(self.minutes),
                limit: 60.0,
            });
        }
        if self.seconds > 59 {
            return Err(TimecodeError::OutOfRange {
                field: "seconds",
                value: u64::from(self.seconds),
                limit: 60.0,
            });
        }
        // `frames >= framerate` for integer frames is `frames >= ceil(framerate)`.
        if self.frames >= timebase {
            return Err(TimecodeError::OutOfRange {
                field: "frames",
                value: self.frames,
                limit: framerate,
            });
        }

        Ok(())
    }

    /// Frame number addressed by this timecode at `framerate`.
    pub fn to_frame(&self, framerate: f64) -> Result<FrameNumber, TimecodeError> {
        self.validate_for(framerate)?;
        let timebase = nominal_timebase(framerate)?;

        self.hours
            .checked_mul(3600)
            .and_then(|s| s.checked_add(u64::from(self.minutes) * 60 + u64::from(self.seconds)))
            .and_then(|s| s.checked_mul(timebase))
            .and_then(|f| f.checked_add(self.frames))
            .ok_or(TimecodeError::OutOfRange {
                field: "hours",
                value: self.hours,
                limit: (u64::MAX / 3600 / timebase) as f64,
            })
    }

    /// Seconds by field arithmetic: `H*3600 + M*60 + S + F / framerate`.
    ///
    /// This is the canonical timecode-to-seconds path. For integer rates it
    /// equals `to_frame / framerate`; for fractional rates it reads the
    /// labels as clock time rather than counting elapsed frames.
    pub fn to_seconds(&self, framerate: f64) -> Result<f64, TimecodeError> {
        self.validate_for(framerate)?;

        let whole = self.hours as f64 * 3600.0
            + f64::from(self.minutes) * 60.0
            + f64::from(self.seconds);
        Ok(whole + self.frames as f64 / framerate)
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}

impl FromStr for Timecode {
    type Err = TimecodeError;

    /// Parse the shape `H:M:S:F` (digits only, at least one per field).
    ///
    /// The frame field cannot be checked without a framerate; use
    /// [`Timecode::validate_for`] or [`timecode_to_frame`] for that.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 4 {
            return Err(TimecodeError::format(format!(
                "expected HH:MM:SS:FF, got '{s}' ({} fields)",
                parts.len()
            )));
        }

        let hours = parse_field(s, "hours", parts[0])?;
        let minutes = parse_field(s, "minutes", parts[1])?;
        let seconds = parse_field(s, "seconds", parts[2])?;
        let frames = parse_field(s, "frames", parts[3])?;

        for (field, value) in [("minutes", minutes), ("seconds", seconds)] {
            if value > 59 {
                return Err(TimecodeError::OutOfRange {
                    field,
                    value,
                    limit: 60.0,
                });
            }
        }

        Ok(Self {
            hours,
            minutes: minutes as u8,
            seconds: seconds as u8,
            frames,
        })
    }
}

fn parse_field(input: &str, field: &str, raw: &str) -> Result<u64, TimecodeError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimecodeError::format(format!(
            "{field} field of '{input}' must be numeric, got '{raw}'"
        )));
    }
    raw.parse().map_err(|_| {
        TimecodeError::format(format!("{field} field of '{input}' is too large"))
    })
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// `floor(seconds * framerate)`, snapping products within
/// [`FRAME_SNAP_EPSILON`] of an integer.
///
/// Callers clamp playback positions before calling; negative or non-finite
/// seconds are rejected, as are products past the last representable frame.
pub fn seconds_to_frame(seconds: f64, framerate: f64) -> Result<FrameNumber, TimecodeError> {
    validate_framerate(framerate)?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(TimecodeError::invalid_argument(format!(
            "seconds must be a non-negative finite number, got {seconds}"
        )));
    }

    let product = seconds * framerate;
    let nearest = product.round();
    let frame = if (product - nearest).abs() < FRAME_SNAP_EPSILON {
        nearest
    } else {
        product.floor()
    };
    if frame >= FrameNumber::MAX as f64 {
        return Err(TimecodeError::invalid_argument(format!(
            "{seconds}s at {framerate} fps is past the last frame number"
        )));
    }

    Ok(frame as FrameNumber)
}

/// Wall-clock position of a frame: `frame / framerate`.
pub fn frame_to_seconds(frame: FrameNumber, framerate: f64) -> Result<f64, TimecodeError> {
    validate_framerate(framerate)?;
    Ok(frame as f64 / framerate)
}

pub fn frame_to_timecode(frame: FrameNumber, framerate: f64) -> Result<String, TimecodeError> {
    Ok(Timecode::from_frame(frame, framerate)?.to_string())
}

pub fn seconds_to_timecode(seconds: f64, framerate: f64) -> Result<String, TimecodeError> {
    let frame = seconds_to_frame(seconds, framerate)?;
    frame_to_timecode(frame, framerate)
}

/// Parse a timecode and resolve it to a frame number.
///
/// Fails with [`TimecodeError::Format`] unless the input has exactly four
/// numeric fields, and with [`TimecodeError::OutOfRange`] when the frame
/// field is `>= framerate`.
pub fn timecode_to_frame(timecode: &str, framerate: f64) -> Result<FrameNumber, TimecodeError> {
    validate_framerate(framerate)?;
    timecode.parse::<Timecode>()?.to_frame(framerate)
}

/// See [`Timecode::to_seconds`] for the arithmetic used.
pub fn timecode_to_seconds(timecode: &str, framerate: f64) -> Result<f64, TimecodeError> {
    validate_framerate(framerate)?;
    timecode.parse::<Timecode>()?.to_seconds(framerate)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
