// core/src/utils/mod.rs
pub mod config;
pub mod logging;
pub mod models;
pub mod validation;

/// Simulated duration a task holds a server's running slot once started.
pub const DEFAULT_BASE_QUANTUM: f64 = 5.0;
/// Memory capacity of every simulated server, in MB.
pub const SERVER_MEMORY_CAPACITY_MB: f64 = 4096.0;
pub const DEFAULT_SERVER_COUNT: usize = 4;
pub const DEFAULT_HISTORY_WINDOW: usize = 20;

/// Formats simulated seconds as HH:MM:SS.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 { seconds.floor() as u64 } else { 0 };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Rounds to the two-decimal precision used for reported metrics.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0.0), "00:00:00");
        assert_eq!(format_clock(59.9), "00:00:59");
        assert_eq!(format_clock(3725.0), "01:02:05");
        assert_eq!(format_clock(-3.0), "00:00:00");
    }

    #[test]
    fn rounding() {
        assert_eq!(round2(1.006), 1.01);
        assert_eq!(round2(2.0 / 3.0), 0.67);
    }
}
