//! Text chunking for Telegram's message size limit
//!
//! Telegram rejects messages over 4096 characters. Long text is split on
//! paragraph boundaries where possible, then on newlines or spaces, then at
//! the limit itself.

/// Chunk size in bytes, which also bounds the character count under 4096
pub(crate) const CHUNK_LIMIT: usize = 4000;

/// Split `text` into non-empty chunks of at most `limit` bytes
#[must_use]
pub(crate) fn chunk_text(text: &str, limit: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    if text.len() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        let needed = if current.is_empty() {
            paragraph.len()
        } else {
            current.len() + 2 + paragraph.len()
        };

        if needed <= limit {
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(paragraph);
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if paragraph.len() <= limit {
            current.push_str(paragraph);
        } else {
            chunks.extend(chunk_hard(paragraph, limit));
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Split at `limit`, backing off to the last newline or space
fn chunk_hard(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.len() <= limit {
            chunks.push(remaining.to_string());
            break;
        }

        let split_at = find_split_point(remaining, limit);
        let chunk = remaining[..split_at].trim_end();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        remaining = remaining[split_at..].trim_start();
    }

    chunks
}

/// Byte offset to split at: after the last newline or space within `limit`,
/// otherwise the last char boundary at or before `limit`
fn find_split_point(text: &str, limit: usize) -> usize {
    let mut boundary = limit;
    while boundary > 0 && !text.is_char_boundary(boundary) {
        boundary -= 1;
    }
    if boundary == 0 {
        // A single char wider than the limit; take it whole
        return text.chars().next().map_or(text.len(), char::len_utf8);
    }

    match text[..boundary].rfind(['\n', ' ']) {
        Some(pos) if pos > 0 => pos + 1,
        _ => boundary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_returns_empty() {
        assert!(chunk_text("", 100).is_empty());
        assert!(chunk_text("  \n ", 100).is_empty());
    }

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("hi there", CHUNK_LIMIT), vec!["hi there"]);
    }

    #[test]
    fn long_run_splits_at_limit() {
        let chunks = chunk_text(&"a".repeat(5000), CHUNK_LIMIT);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 4000);
        assert_eq!(chunks[1].len(), 1000);
    }

    #[test]
    fn paragraphs_are_merged_then_split() {
        let text = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
        let chunks = chunk_text(text, 36);
        assert_eq!(chunks, vec!["First paragraph.\n\nSecond paragraph.", "Third paragraph."]);
    }

    #[test]
    fn hard_split_prefers_spaces() {
        let chunks = chunk_text("alpha beta gamma delta", 12);
        assert_eq!(chunks, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn multibyte_chars_are_not_cut() {
        let text = "\u{1F600}".repeat(5);
        let chunks = chunk_text(&text, 10);
        assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= 10));
        assert_eq!(chunks.concat(), text);
    }
}
