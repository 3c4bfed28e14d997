/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Shorten a string for log output, appending an ellipsis if anything was cut.
pub fn ellipsize(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len).collect();
        format!("{truncated}…")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn boolean_flags() {
        assert!(parse_boolean_flag(Some("1".to_string()), false));
        assert!(parse_boolean_flag(Some("Yes".to_string()), false));
        assert!(!parse_boolean_flag(Some("off".to_string()), true));
        assert!(parse_boolean_flag(None, true));
        assert!(parse_boolean_flag(Some("wibble".to_string()), true));
    }

    #[test]
    fn ellipsize_long_strings() {
        assert_eq!(ellipsize("short", 10), "short");
        assert_eq!(ellipsize("a longer string", 8), "a longer…");
    }
}
