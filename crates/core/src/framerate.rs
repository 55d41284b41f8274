//! Framerate validation, nominal timebase and normalization.
//!
//! A framerate is any positive finite `f64`. Nothing here measures a rate
//! from decoded video; values come from the caller or from a probe string.

use crate::error::TimecodeError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// The rates [`normalize_framerate`] snaps to, in tie-breaking order.
pub const COMMON_FRAMERATES: [f64; 8] = [23.976, 24.0, 25.0, 29.97, 30.0, 50.0, 59.94, 60.0];

/// Framerate assumed when a project does not specify one.
pub const DEFAULT_FRAMERATE: f64 = 25.0;

/// Rates closer than this to an integer count as that integer.
const INTEGER_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reject zero, negative, NaN and infinite framerates.
pub fn validate_framerate(framerate: f64) -> Result<(), TimecodeError> {
    if !framerate.is_finite() || framerate <= 0.0 {
        return Err(TimecodeError::invalid_argument(format!(
            "framerate must be a positive finite number, got {framerate}"
        )));
    }
    Ok(())
}

/// Integer number of frames counted per timecode second.
///
/// Integer rates map to themselves; fractional rates round up, the way
/// non-drop-frame timecode labels 29.97 fps material with a 30-frame second.
///
/// ```
/// use smotree_core::framerate::nominal_timebase;
///
/// assert_eq!(nominal_timebase(25.0).unwrap(), 25);
/// assert_eq!(nominal_timebase(29.97).unwrap(), 30);
/// assert_eq!(nominal_timebase(23.976).unwrap(), 24);
/// ```
pub fn nominal_timebase(framerate: f64) -> Result<u64, TimecodeError> {
    validate_framerate(framerate)?;

    let rounded = framerate.round();
    let timebase = if (framerate - rounded).abs() < INTEGER_TOLERANCE {
        rounded
    } else {
        framerate.ceil()
    };

    Ok((timebase as u64).max(1))
}

// ---------------------------------------------------------------------------
// Normalization and parsing
// ---------------------------------------------------------------------------

/// Snap an arbitrary measured rate to the nearest entry of
/// [`COMMON_FRAMERATES`]. Ties keep the earlier (lower) entry.
pub fn normalize_framerate(measured: f64) -> f64 {
    COMMON_FRAMERATES
        .iter()
        .copied()
        .reduce(|best, candidate| {
            if (candidate - measured).abs() < (best - measured).abs() {
                candidate
            } else {
                best
            }
        })
        .unwrap_or(DEFAULT_FRAMERATE)
}

/// Parse a framerate written as a decimal (`"29.97"`) or a fraction
/// (`"30000/1001"`, as reported by ffprobe's `r_frame_rate`).
pub fn parse_framerate(text: &str) -> Result<f64, TimecodeError> {
    let text = text.trim();

    let rate = match text.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().map_err(|_| {
                TimecodeError::invalid_argument(format!("invalid framerate numerator in '{text}'"))
            })?;
            let den: f64 = den.trim().parse().map_err(|_| {
                TimecodeError::invalid_argument(format!(
                    "invalid framerate denominator in '{text}'"
                ))
            })?;
            if den <= 0.0 {
                return Err(TimecodeError::invalid_argument(format!(
                    "framerate denominator must be > 0 in '{text}'"
                )));
            }
            num / den
        }
        None => text.parse().map_err(|_| {
            TimecodeError::invalid_argument(format!("invalid framerate '{text}'"))
        })?,
    };

    validate_framerate(rate)?;
    Ok(rate)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    // -- validate_framerate --------------------------------------------------

    #[test]
    fn positive_rates_accepted() {
        for rate in COMMON_FRAMERATES {
            assert!(validate_framerate(rate).is_ok());
        }
        assert!(validate_framerate(12.5).is_ok());
        assert!(validate_framerate(0.001).is_ok());
    }

    #[test]
    fn non_positive_rates_rejected() {
        assert_matches!(validate_framerate(0.0), Err(TimecodeError::InvalidArgument(_)));
        assert_matches!(validate_framerate(-25.0), Err(TimecodeError::InvalidArgument(_)));
    }

    #[test]
    fn non_finite_rates_rejected() {
        assert!(validate_framerate(f64::NAN).is_err());
        assert!(validate_framerate(f64::INFINITY).is_err());
    }

    // -- nominal_timebase ----------------------------------------------------

    #[test]
    fn timebase_for_common_rates() {
        let expected = [24, 24, 25, 30, 30, 50, 60, 60];
        for (rate, tb) in COMMON_FRAMERATES.iter().zip(expected) {
            assert_eq!(nominal_timebase(*rate).unwrap(), tb, "rate {rate}");
        }
    }

    #[test]
    fn timebase_tolerates_float_noise() {
        assert_eq!(nominal_timebase(30.000_000_000_01).unwrap(), 30);
        assert_eq!(nominal_timebase(24_000.0 / 1_000.0).unwrap(), 24);
    }

    #[test]
    fn timebase_is_at_least_one() {
        assert_eq!(nominal_timebase(0.25).unwrap(), 1);
    }

    // -- normalize_framerate -------------------------------------------------

    #[test]
    fn normalize_picks_nearest() {
        assert_eq!(normalize_framerate(29.5), 29.97);
        assert_eq!(normalize_framerate(23.9), 23.976);
        assert_eq!(normalize_framerate(25.3), 25.0);
        assert_eq!(normalize_framerate(59.0), 59.94);
        assert_eq!(normalize_framerate(120.0), 60.0);
        assert_eq!(normalize_framerate(1.0), 23.976);
    }

    #[test]
    fn normalize_exact_rates_are_fixed_points() {
        for rate in COMMON_FRAMERATES {
            assert_eq!(normalize_framerate(rate), rate);
        }
    }

    #[test]
    fn normalize_tie_keeps_lower_rate() {
        // Exactly halfway between 24 and 25.
        assert_eq!(normalize_framerate(24.5), 24.0);
        assert_eq!(normalize_framerate(55.0), 59.94);
        assert_eq!(normalize_framerate(54.0), 50.0);
    }

    // -- parse_framerate -----------------------------------------------------

    #[test]
    fn parse_decimal() {
        assert_eq!(parse_framerate("25").unwrap(), 25.0);
        assert_eq!(parse_framerate(" 29.97 ").unwrap(), 29.97);
    }

    #[test]
    fn parse_fraction() {
        let rate = parse_framerate("30000/1001").unwrap();
        assert!((rate - 29.970_03).abs() < 1e-4);
        assert_eq!(normalize_framerate(rate), 29.97);
        assert_eq!(parse_framerate("25/1").unwrap(), 25.0);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_framerate("fast").is_err());
        assert!(parse_framerate("30/0").is_err());
        assert!(parse_framerate("x/1").is_err());
        assert!(parse_framerate("0").is_err());
        assert!(parse_framerate("").is_err());
    }
}
