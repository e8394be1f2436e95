use std::time::Instant;

use axum::response::Json;
use once_cell::sync::Lazy;
use serde_json::json;

pub static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": format!("Backend is running! Uptime: {}", format_uptime(START_TIME.elapsed().as_secs()))
    }))
}

fn format_uptime(seconds: u64) -> String {
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours % 24, minutes % 60, seconds % 60)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes % 60, seconds % 60)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::format_uptime;

    #[test]
    fn uptime_uses_largest_unit() {
        assert_eq!(format_uptime(42), "42s");
        assert_eq!(format_uptime(125), "2m 5s");
        assert_eq!(format_uptime(3 * 3600 + 61), "3h 1m 1s");
        assert_eq!(format_uptime(90_061), "1d 1h 1m 1s");
    }
}
