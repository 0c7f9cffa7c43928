// Human readable time labels for tooltips and axis ticks

/// `MM:SS.mmm`, or `N/A` for a missing or non-positive time
pub fn format_lap_time(seconds: Option<f64>) -> String {
    match seconds {
        Some(seconds) if seconds.is_finite() && seconds > 0. => {
            let total_ms = (seconds * 1000.).round() as u64;
            format!(
                "{:02}:{:02}.{:03}",
                total_ms / 60_000,
                (total_ms / 1000) % 60,
                total_ms % 1000
            )
        }
        _ => "N/A".to_string(),
    }
}

/// `HH:MM:SS` clock label for an offset from session start
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.) as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// `MM:SS` label used for lap time axis ticks
pub fn format_minutes_seconds(seconds: f64) -> String {
    let total = seconds.max(0.) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
