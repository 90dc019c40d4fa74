/// Shortens long text for display, preferring to cut at a word boundary.
#[derive(Debug, Clone, Copy)]
pub struct ContentTruncator {
    enabled: bool,
    max_length: usize,
}

impl ContentTruncator {
    pub fn new(enabled: bool, max_length: usize) -> Self {
        Self {
            enabled,
            max_length,
        }
    }

    /// Cuts `content` to `max_length` characters (or the configured limit).
    ///
    /// Backs up to the last space when it lies past 80% of the limit.
    pub fn truncate_content(&self, content: &str, max_length: Option<usize>) -> String {
        if !self.enabled {
            return content.to_string();
        }
        cut(content, max_length.unwrap_or(self.max_length), 0.8)
    }

    /// Short preview; backs up to a space past 70% of `length`.
    pub fn create_preview(&self, content: &str, length: usize) -> String {
        cut(content, length, 0.7)
    }
}

fn cut(content: &str, limit: usize, boundary_ratio: f64) -> String {
    if content.chars().count() <= limit {
        return content.to_string();
    }

    let head: Vec<char> = content.chars().take(limit).collect();
    let keep = match head.iter().rposition(|ch| *ch == ' ') {
        Some(space) if space as f64 > limit as f64 * boundary_ratio => space,
        _ => head.len(),
    };
    let mut out: String = head[..keep].iter().collect();
    out.push_str("...");
    out
}
