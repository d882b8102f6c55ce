//! Page detail extraction
//!
//! Pulls the page title out of parsed HTML and the first email address out of
//! the raw body text.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;

/// Details found in a fetched page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageDetails {
    /// The page title (from the first <title> tag)
    pub title: Option<String>,

    /// The first email address in the body, in clear text
    pub email: Option<String>,
}

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").expect("email pattern is valid")
    })
}

/// Extracts the title and first email from an HTML body
///
/// # Example
///
/// ```
/// use bracket_fetch::processor::extract_page_details;
///
/// let html = "<html><head><title>Example Domain</title></head></html>";
/// let details = extract_page_details(html);
/// assert_eq!(details.title.as_deref(), Some("Example Domain"));
/// assert_eq!(details.email, None);
/// ```
pub fn extract_page_details(html: &str) -> PageDetails {
    let document = Html::parse_document(html);

    PageDetails {
        title: extract_title(&document),
        email: extract_email(html),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Returns the first email-looking token in the raw text
pub fn extract_email(text: &str) -> Option<String> {
    email_regex().find(text).map(|m| m.as_str().to_string())
}
