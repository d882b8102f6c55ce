use regex::Regex;
use std::sync::OnceLock;

/// `http(s)://` or `www.` followed by anything up to whitespace or a closing bracket
fn url_regex() -> &'static Regex {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    URL_REGEX.get_or_init(|| {
        Regex::new(r"(?i)(https?://[^\s\]]+|www\.[^\s\]]+)").expect("URL pattern is valid")
    })
}

/// Extracts the last URL-looking token from a piece of text
///
/// # Arguments
///
/// * `text` - The text to search
///
/// # Returns
///
/// * `Some(String)` - The last match, trimmed
/// * `None` - No URL-looking token was found
///
/// # Example
///
/// ```
/// use bracket_fetch::parser::extract_last_url;
///
/// let url = extract_last_url("see www.a.com or https://b.com/x");
/// assert_eq!(url.as_deref(), Some("https://b.com/x"));
/// ```
pub fn extract_last_url(text: &str) -> Option<String> {
    url_regex()
        .find_iter(text)
        .last()
        .map(|m| m.as_str().trim().to_string())
        .filter(|url| !url.is_empty())
}
