//! Presentation helpers for PDF export: display dates, safe filenames, and
//! accent color parsing.

use chrono::NaiveDate;

/// Brand primary, used whenever no valid accent color is supplied.
pub const DEFAULT_ACCENT_COLOR: &str = "#0E4B8A";
const DEFAULT_ACCENT_RGB: (f64, f64, f64) = (14.0 / 255.0, 75.0 / 255.0, 138.0 / 255.0);

/// Strict `#RRGGBB` check applied at the HTTP boundary.
pub fn is_valid_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Lenient hex parsing used inside the generator: any invalid input falls
/// back to the brand color instead of failing the export.
pub fn parse_hex_color(value: &str) -> (f64, f64, f64) {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return DEFAULT_ACCENT_RGB;
    }
    match (component(hex, 0), component(hex, 2), component(hex, 4)) {
        (Some(r), Some(g), Some(b)) => (
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
        ),
        _ => DEFAULT_ACCENT_RGB,
    }
}

fn component(hex: &str, at: usize) -> Option<u8> {
    u8::from_str_radix(hex.get(at..at + 2)?, 16).ok()
}

/// Formats a stored date string for display: `2024-03-01` and `2024-03`
/// become `Mar 2024`, a bare year stays as-is, anything unparseable passes
/// through verbatim.
pub fn format_display_date(value: &str) -> Option<String> {
    let text = value.trim();
    if text.is_empty() {
        return None;
    }

    let prefix: String = text.chars().take(10).collect();
    for candidate in [text, prefix.as_str()] {
        if let Ok(date) = NaiveDate::parse_from_str(candidate, "%Y-%m-%d") {
            return Some(date.format("%b %Y").to_string());
        }
        if candidate.len() == 7 {
            if let Ok(date) = NaiveDate::parse_from_str(&format!("{candidate}-01"), "%Y-%m-%d") {
                return Some(date.format("%b %Y").to_string());
            }
        }
        if candidate.len() == 4 && candidate.chars().all(|c| c.is_ascii_digit()) {
            return Some(candidate.to_string());
        }
    }

    Some(text.to_string())
}

/// Reduces free-text proficiency labels onto the four display levels.
pub fn normalize_skill_level(raw: Option<&str>) -> &'static str {
    let text = raw.unwrap_or("").trim().to_lowercase();
    if text.is_empty() {
        return "Proficient";
    }
    if ["expert", "master", "principal", "lead"]
        .iter()
        .any(|token| text.contains(token))
    {
        return "Expert";
    }
    if ["advanced", "senior"].iter().any(|token| text.contains(token)) {
        return "Advanced";
    }
    if ["basic", "beginner", "novice", "junior"]
        .iter()
        .any(|token| text.contains(token))
    {
        return "Basic";
    }
    "Proficient"
}

/// Display rank for sorting skills, strongest first.
pub fn skill_level_rank(level: &str) -> usize {
    match level {
        "Expert" => 0,
        "Advanced" => 1,
        "Proficient" => 2,
        _ => 3,
    }
}

/// Sanitizes a filename for safe filesystem usage.
pub fn sanitize_filename(filename: &str) -> String {
    let filtered: String = filename
        .trim()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || *c == '.' || c.is_whitespace())
        .collect();

    let mut collapsed = String::with_capacity(filtered.len());
    let mut in_whitespace = false;
    for c in filtered.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                collapsed.push('_');
                in_whitespace = true;
            }
        } else {
            collapsed.push(c);
            in_whitespace = false;
        }
    }

    let trimmed: String = collapsed
        .trim_matches(|c| c == '.' || c == '_' || c == '-')
        .chars()
        .take(120)
        .collect();

    if trimmed.is_empty() {
        "consultant_profile".to_string()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_hex_color() {
        assert!(is_valid_hex_color("#0E4B8A"));
        assert!(is_valid_hex_color("#abcdef"));
        assert!(!is_valid_hex_color("0E4B8A"));
        assert!(!is_valid_hex_color("#0E4B8"));
        assert!(!is_valid_hex_color("#0E4B8AG"));
        assert!(!is_valid_hex_color("#0E4B8Z"));
    }

    #[test]
    fn test_parse_hex_color_valid() {
        let (r, g, b) = parse_hex_color("#FF0000");
        assert!((r - 1.0).abs() < 1e-9);
        assert_eq!(g, 0.0);
        assert_eq!(b, 0.0);
    }

    #[test]
    fn test_parse_hex_color_invalid_falls_back() {
        assert_eq!(parse_hex_color("nope"), DEFAULT_ACCENT_RGB);
        assert_eq!(parse_hex_color(""), DEFAULT_ACCENT_RGB);
        assert_eq!(parse_hex_color("#12345"), DEFAULT_ACCENT_RGB);
        assert_eq!(parse_hex_color("#GGGGGG"), DEFAULT_ACCENT_RGB);
    }

    #[test]
    fn test_parse_hex_color_without_hash() {
        let (r, _, _) = parse_hex_color("FF0000");
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_format_display_date_full() {
        assert_eq!(format_display_date("2024-03-01").as_deref(), Some("Mar 2024"));
    }

    #[test]
    fn test_format_display_date_year_month() {
        assert_eq!(format_display_date("2024-03").as_deref(), Some("Mar 2024"));
    }

    #[test]
    fn test_format_display_date_year_only() {
        assert_eq!(format_display_date("2024").as_deref(), Some("2024"));
    }

    #[test]
    fn test_format_display_date_timestamp_prefix() {
        assert_eq!(
            format_display_date("2024-03-01T10:30:00Z").as_deref(),
            Some("Mar 2024")
        );
    }

    #[test]
    fn test_format_display_date_passthrough() {
        assert_eq!(format_display_date("circa 1998").as_deref(), Some("circa 1998"));
    }

    #[test]
    fn test_format_display_date_empty() {
        assert_eq!(format_display_date("   "), None);
    }

    #[test]
    fn test_normalize_skill_level() {
        assert_eq!(normalize_skill_level(Some("Expert")), "Expert");
        assert_eq!(normalize_skill_level(Some("principal engineer")), "Expert");
        assert_eq!(normalize_skill_level(Some("Senior")), "Advanced");
        assert_eq!(normalize_skill_level(Some("beginner")), "Basic");
        assert_eq!(normalize_skill_level(Some("solid")), "Proficient");
        assert_eq!(normalize_skill_level(None), "Proficient");
    }

    #[test]
    fn test_sanitize_filename_basic() {
        assert_eq!(
            sanitize_filename("Ada Lovelace_Profile.pdf"),
            "Ada_Lovelace_Profile.pdf"
        );
    }

    #[test]
    fn test_sanitize_filename_strips_specials() {
        assert_eq!(sanitize_filename("a/b\\c:d*e.pdf"), "abcde.pdf");
    }

    #[test]
    fn test_sanitize_filename_collapses_whitespace() {
        assert_eq!(sanitize_filename("a   b\tc"), "a_b_c");
    }

    #[test]
    fn test_sanitize_filename_fallback() {
        assert_eq!(sanitize_filename("///"), "consultant_profile");
        assert_eq!(sanitize_filename("._-"), "consultant_profile");
    }
}
