//! Display formatting for tooltip values

use orbs_common::NAN_MARKER;

/// Whole experience points with en-US thousands separators
pub fn format_xp(xp: f64) -> String {
    let whole = if xp.is_finite() { xp.max(0.0).floor() } else { 0.0 };
    group_thousands(whole as u64)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `h:mm:ss`, or the NaN marker for negative / non-finite input
pub fn format_hms(total_seconds: f64) -> String {
    if !total_seconds.is_finite() || total_seconds < 0.0 {
        return NAN_MARKER.to_string();
    }
    let total = total_seconds.floor() as u64;
    let h = total / 3600;
    let m = (total / 60) % 60;
    let s = total % 60;
    format!("{}:{:02}:{:02}", h, m, s)
}

/// Compact rate figure: `950`, `12.3K`, `1.5M`, `2.1B`, `4T`
pub fn abbreviate(value: f64) -> String {
    if !value.is_finite() {
        return NAN_MARKER.to_string();
    }

    const UNITS: [(f64, &str); 4] = [(1e3, "K"), (1e6, "M"), (1e9, "B"), (1e12, "T")];

    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();
    if magnitude < 1e3 {
        return format!("{}{}", sign, magnitude.floor() as u64);
    }

    let mut idx = UNITS.iter().rposition(|(div, _)| magnitude >= *div).unwrap_or(0);
    let mut scaled = (magnitude / UNITS[idx].0 * 10.0).round() / 10.0;
    // 999_950 rounds to 1000.0K; carry into the next unit
    if scaled >= 1000.0 && idx + 1 < UNITS.len() {
        idx += 1;
        scaled = (magnitude / UNITS[idx].0 * 10.0).round() / 10.0;
    }

    let text = format!("{:.1}", scaled);
    let text = text.strip_suffix(".0").unwrap_or(text.as_str());
    format!("{}{}{}", sign, text, UNITS[idx].1)
}

/// Capitalize the first letter of every word
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.push(ch);
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

/// Glyph shown in the orb when no sprite icon is available
pub fn skill_glyph(skill: &str) -> Option<&'static str> {
    let glyph = match skill.to_ascii_lowercase().as_str() {
        "hitpoints" => "💖",
        "accuracy" => "🎯",
        "strength" => "💪",
        "defense" => "🛡️",
        "magic" => "🔮",
        "range" => "🏹",
        "fishing" => "🎣",
        "mining" => "⛏️",
        "smithing" => "🔨",
        "cooking" => "🍳",
        "forestry" => "🌳",
        "crafting" => "🧵",
        "harvesting" => "🌾",
        "crime" => "🥷",
        "enchanting" => "✨",
        "potionmaking" => "🧪",
        _ => return None,
    };
    Some(glyph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_xp() {
        assert_eq!(format_xp(0.0), "0");
        assert_eq!(format_xp(999.9), "999");
        assert_eq!(format_xp(1_234_567.8), "1,234,567");
        assert_eq!(format_xp(-50.0), "0");
        assert_eq!(format_xp(f64::NAN), "0");
        assert_eq!(format_xp(100_000.0), "100,000");
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0.0), "0:00:00");
        assert_eq!(format_hms(3_725.9), "1:02:05");
        assert_eq!(format_hms(90_000.0), "25:00:00");
        assert_eq!(format_hms(-1.0), "NaN");
        assert_eq!(format_hms(f64::INFINITY), "NaN");
    }

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate(950.7), "950");
        assert_eq!(abbreviate(1_000.0), "1K");
        assert_eq!(abbreviate(12_345.0), "12.3K");
        assert_eq!(abbreviate(1_500_000.0), "1.5M");
        assert_eq!(abbreviate(999_950.0), "1M");
        assert_eq!(abbreviate(2_100_000_000.0), "2.1B");
        assert_eq!(abbreviate(f64::NAN), "NaN");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("potionmaking"), "Potionmaking");
        assert_eq!(title_case("hit points"), "Hit Points");
        assert_eq!(title_case("12"), "12");
    }

    #[test]
    fn test_skill_glyph() {
        assert_eq!(skill_glyph("Fishing"), Some("🎣"));
        assert_eq!(skill_glyph("unknown"), None);
    }
}
