//! Input validation and sanitization
//!
//! All SQL goes through bound parameters, so injection payloads are stored
//! and matched as literal text. Free text that is rendered back to browsers
//! (reviews, bios) is HTML-escaped before storage; short matchable fields
//! (genres, location) are only cleaned.

/// True for empty or whitespace-only input
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Minimal structural e-mail check: `local@domain.tld`, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2 && !host.starts_with('.'),
        None => false,
    }
}

/// Password strength: minimum length, at least one letter and one digit
pub fn is_strong_password(password: &str, min_len: usize) -> bool {
    password.chars().count() >= min_len
        && password.chars().any(|c| c.is_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// `#rrggbb` colour
pub fn is_valid_hex_color(color: &str) -> bool {
    let Some(hex) = color.strip_prefix('#') else {
        return false;
    };
    hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

/// Trim and drop control characters (newline and tab are kept)
pub fn clean_text(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|&c| c == '\n' || c == '\t' || !c.is_control())
        .collect()
}

/// HTML-escape text and drop control characters (newline and tab are kept)
pub fn sanitize_text(input: &str) -> String {
    let cleaned = clean_text(input);
    let mut out = String::with_capacity(cleaned.len());
    for c in cleaned.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Reverse [`sanitize_text`] for plain-text display
pub fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Case-insensitive equality of two trimmed strings
pub fn same_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// True when text contains no markup or control characters
pub fn is_text_sanitized(text: &str) -> bool {
    !text
        .chars()
        .any(|c| matches!(c, '<' | '>' | '"' | '\'') || (c.is_control() && c != '\n' && c != '\t'))
}

/// Escape `LIKE` wildcards; use with `ESCAPE '\'`
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `%fragment%` pattern for a substring search
pub fn contains_pattern(fragment: &str) -> String {
    format!("%{}%", escape_like(fragment.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("new@email.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email("invalid-email"));
        assert!(!is_valid_email("@email.com"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("user@@email.com"));
        assert!(!is_valid_email("us er@email.com"));
    }

    #[test]
    fn test_password_strength() {
        assert!(is_strong_password("StrongPass123", 8));
        assert!(!is_strong_password("123", 8));
        assert!(!is_strong_password("onlyletters", 8));
        assert!(!is_strong_password("12345678", 8));
    }

    #[test]
    fn test_script_tags_are_escaped() {
        let sanitized = sanitize_text("<script>alert('x')</script>");
        assert_eq!(sanitized, "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;");
        assert!(is_text_sanitized(&sanitized));
        assert!(!is_text_sanitized("<script>alert('x')</script>"));
    }

    #[test]
    fn test_control_characters_dropped() {
        assert_eq!(sanitize_text("a\u{0}b\nc"), "ab\nc");
        assert_eq!(clean_text("  R&B\u{7} "), "R&B");
    }

    #[test]
    fn test_unescape_reverses_sanitize() {
        let original = "Tom & Jerry's <b>\"best\"</b> &amp; more";
        assert_eq!(unescape_html(&sanitize_text(original)), original);
    }

    #[test]
    fn test_same_text_ignores_case() {
        assert!(same_text(" Zürich ", "ZÜRICH"));
        assert!(!same_text("rock", "rocks"));
    }

    #[test]
    fn test_like_wildcards_escaped() {
        assert_eq!(escape_like("100%_\\"), "100\\%\\_\\\\");
        assert_eq!(contains_pattern(" Rum "), "%Rum%");
    }

    #[test]
    fn test_hex_color() {
        assert!(is_valid_hex_color("#1a1a1a"));
        assert!(!is_valid_hex_color("1a1a1a"));
        assert!(!is_valid_hex_color("#12345g"));
    }
}
