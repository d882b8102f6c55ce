use super::url_match::extract_last_url;

/// Streaming scanner for bracketed spans
///
/// The parser keeps its state between calls to [`BracketParser::feed`], so a
/// span opened in one chunk can be closed in a later one. Only top-level spans
/// produce output; nested brackets are kept as plain text of the outer span.
#[derive(Debug, Default, Clone)]
pub struct BracketParser {
    /// Current nesting depth (0 means outside any span)
    depth: usize,

    /// Text collected since the top-level span opened
    buffer: String,

    /// Last character seen, carried across chunks for escape detection
    prev_char: Option<char>,
}

impl BracketParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk of text and returns the URLs of every span it closes
    ///
    /// # Arguments
    ///
    /// * `text` - The next chunk of input
    ///
    /// # Returns
    ///
    /// One URL per closed top-level span that contained a URL-looking token,
    /// in the order the spans closed.
    ///
    /// # Example
    ///
    /// ```
    /// use bracket_fetch::BracketParser;
    ///
    /// let mut parser = BracketParser::new();
    /// assert_eq!(parser.feed("hello [ www.google.com ]"), vec!["www.google.com"]);
    /// ```
    pub fn feed(&mut self, text: &str) -> Vec<String> {
        let mut urls = Vec::new();

        for ch in text.chars() {
            let prev = self.prev_char.replace(ch);

            // Escaped brackets are dropped, not buffered
            if prev == Some('\\') && (ch == '[' || ch == ']') {
                continue;
            }

            match ch {
                '[' => self.open_bracket(),
                ']' => {
                    if let Some(url) = self.close_bracket() {
                        tracing::trace!("Bracket span yielded {}", url);
                        urls.push(url);
                    }
                }
                _ if self.in_span() => self.buffer.push(ch),
                _ => {}
            }
        }

        urls
    }

    /// Returns true while a top-level span is open
    pub fn in_span(&self) -> bool {
        self.depth > 0
    }

    fn open_bracket(&mut self) {
        if self.in_span() {
            self.depth += 1;
            self.buffer.push('[');
        } else {
            self.depth = 1;
            self.buffer.clear();
        }
    }

    fn close_bracket(&mut self) -> Option<String> {
        if !self.in_span() {
            return None;
        }

        self.depth -= 1;
        if self.in_span() {
            self.buffer.push(']');
            return None;
        }

        let url = extract_last_url(&self.buffer);
        self.buffer.clear();
        url
    }
}
