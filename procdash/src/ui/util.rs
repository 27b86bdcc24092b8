//! Small UI helpers: truncation and load colors.

use ratatui::style::Color;

/// Shorten `s` to at most `max` chars, keeping both ends.
pub fn truncate_middle(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        return s.to_string();
    }
    if max <= 3 {
        return "...".into();
    }
    let keep = max - 3;
    let left = keep / 2;
    let right = keep - left;
    let head: String = s.chars().take(left).collect();
    let tail: String = s.chars().skip(len - right).collect();
    format!("{head}...{tail}")
}

pub fn load_color(pct: f64) -> Color {
    match pct {
        x if x < 70.0 => Color::Green,
        x if x < 90.0 => Color::Yellow,
        _ => Color::Red,
    }
}

pub fn gauge_percent(pct: f64) -> u16 {
    pct.clamp(0.0, 100.0).round() as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate_middle("bash", 10), "bash");
    }

    #[test]
    fn truncate_is_char_safe() {
        let s = "ñandú-worker-ñandú";
        let t = truncate_middle(s, 9);
        assert_eq!(t.chars().count(), 9);
        assert!(t.starts_with("ñan"));
        assert!(t.ends_with("ndú"));
        assert_eq!(truncate_middle(s, 2), "...");
    }

    #[test]
    fn colors_follow_thresholds() {
        assert_eq!(load_color(10.0), Color::Green);
        assert_eq!(load_color(75.0), Color::Yellow);
        assert_eq!(load_color(95.0), Color::Red);
        assert_eq!(gauge_percent(140.0), 100);
    }
}
