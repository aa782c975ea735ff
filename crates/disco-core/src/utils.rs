//! Small helpers shared by the other crates.

use std::path::PathBuf;

/// Directory holding `config.json`. Falls back to `./.disco` without a home.
pub fn get_data_path() -> PathBuf {
    dirs_home().unwrap_or_else(|| PathBuf::from(".")).join(".disco")
}

/// Collapse whitespace runs to single spaces and cap the result at
/// `max_chars` characters, marking a cut with `...`.
///
/// Used to quote provider bodies in one-line error reasons.
pub fn one_line(s: &str, max_chars: usize) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let kept: String = collapsed.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_line_collapses_whitespace() {
        assert_eq!(one_line("  <html>\n  <body>Bad\tGateway</body>\n", 80), "<html> <body>Bad Gateway</body>");
    }

    #[test]
    fn test_one_line_truncates() {
        assert_eq!(one_line("upstream returned an error page", 15), "upstream ret...");
    }

    #[test]
    fn test_one_line_counts_chars_not_bytes() {
        assert_eq!(one_line("こんにちは世界です", 5), "こん...");
    }

    #[test]
    fn test_data_path_ends_with_disco() {
        assert!(get_data_path().ends_with(".disco"));
    }
}
