//! Timestamp label formatting for reports.
//!
//! Two label styles are in use:
//! - `m:ss` for flagged transcript segments (`0:07`, `12:30`)
//! - `MM:SS` for timeline rows in the text report (`00:07`, `12:30`)

/// Whole minutes and remaining whole seconds of a non-negative offset.
fn split_minutes(total_secs: f64) -> (u64, u64) {
    let total_secs = if total_secs.is_finite() {
        total_secs.max(0.0)
    } else {
        0.0
    };
    let minutes = (total_secs / 60.0).floor() as u64;
    let seconds = (total_secs % 60.0).floor() as u64;
    (minutes, seconds)
}

/// Format seconds as `m:ss` (minutes unpadded).
///
/// # Examples
/// ```
/// use engagelens_models::timestamp::format_segment_label;
/// assert_eq!(format_segment_label(7.9), "0:07");
/// assert_eq!(format_segment_label(750.0), "12:30");
/// ```
pub fn format_segment_label(total_secs: f64) -> String {
    let (minutes, seconds) = split_minutes(total_secs);
    format!("{}:{:02}", minutes, seconds)
}

/// Format seconds as `MM:SS`.
///
/// # Examples
/// ```
/// use engagelens_models::timestamp::format_clock;
/// assert_eq!(format_clock(7.0), "00:07");
/// assert_eq!(format_clock(3725.0), "62:05");
/// ```
pub fn format_clock(total_secs: f64) -> String {
    let (minutes, seconds) = split_minutes(total_secs);
    format!("{:02}:{:02}", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_segment_label() {
        assert_eq!(format_segment_label(0.0), "0:00");
        assert_eq!(format_segment_label(10.0), "0:10");
        assert_eq!(format_segment_label(59.99), "0:59");
        assert_eq!(format_segment_label(60.0), "1:00");
        assert_eq!(format_segment_label(3600.0), "60:00");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(90.5), "01:30");
    }

    #[test]
    fn test_invalid_inputs_clamp_to_zero() {
        assert_eq!(format_segment_label(-5.0), "0:00");
        assert_eq!(format_clock(f64::NAN), "00:00");
    }
}
