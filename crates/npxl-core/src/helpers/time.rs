// crates/npxl-core/src/helpers/time.rs
//
// Shared time-formatting helper used for log lines and debug output.

use crate::duration::Duration;

/// Format a duration as a compact human-readable string.
///
/// | Range         | Format       | Example   |
/// |---------------|--------------|-----------|
/// | ≥ 3600 s      | `H:MM:SS`    | `1:04:35` |
/// | ≥ 60 s        | `M:SS`       | `3:07`    |
/// | < 60 s        | `S.Xs`       | `4.2s`    |
///
/// ```
/// use npxl_core::duration::Duration;
/// use npxl_core::helpers::time::format_duration;
/// assert_eq!(format_duration(Duration::from_millis(4_200)),    "4.2s");
/// assert_eq!(format_duration(Duration::from_secs(187)),        "3:07");
/// assert_eq!(format_duration(Duration::from_secs(3_875)),      "1:04:35");
/// ```
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs >= 3600.0 {
        format!(
            "{}:{:02}:{:02}",
            secs as u64 / 3600,
            (secs as u64 % 3600) / 60,
            secs as u64 % 60,
        )
    } else if secs >= 60.0 {
        format!("{}:{:02}", secs as u64 / 60, secs as u64 % 60)
    } else {
        format!("{secs:.1}s")
    }
}
