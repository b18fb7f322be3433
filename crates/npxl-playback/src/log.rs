// crates/npxl-playback/src/log.rs
//
// Logging for the playback crate. This is a library, not a windowed
// application with a suppressed console, so there is no temp-file
// fallback — it writes straight to stderr.
//
// Usage:
//   use crate::nlog;
//   nlog!("[coordinator] state -> Buffering");

#[macro_export]
macro_rules! nlog {
    ($($arg:tt)*) => {
        eprintln!("[playback] {}", format!($($arg)*))
    };
}
