/// Configuration options for visible-text normalization
#[derive(Debug, Clone, Copy)]
pub struct TextOptions {
    /// Keep paragraph structure (exactly one blank line between paragraphs)
    pub preserve_paragraphs: bool,
    /// Maximum number of characters kept; longer text is cut on a char boundary
    pub max_chars: Option<usize>,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            preserve_paragraphs: false,
            max_chars: None,
        }
    }
}

/// Normalizes the visible text of a page
///
/// Lines are trimmed, runs of whitespace collapse to one space and empty lines
/// only survive as paragraph breaks when `preserve_paragraphs` is set.
pub fn normalize(text: &str, options: &TextOptions) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let paragraphs = split_into_paragraphs(text)
        .iter()
        .map(|para| collapse_whitespace(&para.join(" ")))
        .collect::<Vec<_>>();

    let joined = if options.preserve_paragraphs {
        paragraphs.join("\n\n")
    } else {
        paragraphs.join(" ")
    };

    match options.max_chars {
        Some(max) => truncate_chars(&joined, max),
        None => joined,
    }
}

/// Normalizes an element label; returns None for empty or overlong labels
pub fn normalize_label(raw: &str, max_len: usize) -> Option<String> {
    let label = collapse_whitespace(raw);
    if label.is_empty() || label.chars().count() >= max_len {
        return None;
    }
    Some(label)
}

/// Splits text into paragraphs of trimmed, non-empty lines
pub fn split_into_paragraphs(text: &str) -> Vec<Vec<&str>> {
    let mut paragraphs: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            // Empty line marks a paragraph boundary
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(trimmed);
        }
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs
}

/// Collapses every run of whitespace into a single space and trims the ends
pub fn collapse_whitespace(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keeps at most `max` characters of `text`
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
