//! Common utilities and helpers

use std::time::Duration;

pub mod logging;

/// Formatting helpers for log output
pub struct Utils;

impl Utils {
    /// Format duration for display
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;
        let milliseconds = duration.subsec_millis();

        if hours > 0 {
            format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds)
        } else {
            format!("{:02}:{:02}.{:03}", minutes, seconds, milliseconds)
        }
    }

    /// Estimate remaining time from the items done so far
    pub fn estimate_remaining_time(current: u64, total: u64, elapsed: Duration) -> Option<Duration> {
        if current == 0 || current >= total || elapsed.is_zero() {
            return None;
        }

        let rate = current as f64 / elapsed.as_secs_f64();
        let remaining = (total - current) as f64 / rate;
        Some(Duration::from_secs_f64(remaining))
    }
}
