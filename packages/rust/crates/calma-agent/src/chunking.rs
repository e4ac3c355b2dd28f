//! Split an assistant reply into short chat bubbles for staggered delivery.

use std::sync::LazyLock;

use regex::Regex;

/// Paragraphs up to this many characters are sent as-is.
pub const DEFAULT_PARAGRAPH_MAX_CHARS: usize = 320;
/// Longer paragraphs are regrouped into sentence buffers of at most this many characters.
pub const DEFAULT_SENTENCE_BUFFER_MAX_CHARS: usize = 280;

static SENTENCE_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[.!?]\s+").unwrap_or_else(|err| panic!("invalid SENTENCE_BOUNDARY regex: {err}"))
});

/// Length thresholds for [`split_response`], counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingLimits {
    pub paragraph_max_chars: usize,
    pub sentence_buffer_max_chars: usize,
}

impl Default for ChunkingLimits {
    fn default() -> Self {
        Self {
            paragraph_max_chars: DEFAULT_PARAGRAPH_MAX_CHARS,
            sentence_buffer_max_chars: DEFAULT_SENTENCE_BUFFER_MAX_CHARS,
        }
    }
}

/// [`split_response`] with default limits.
pub fn split_response_chunks(text: &str) -> Vec<String> {
    split_response(text, ChunkingLimits::default())
}

/// Split `text` into trimmed, non-empty chunks, preserving order.
///
/// Paragraphs are separated by blank lines. Short paragraphs pass through unchanged;
/// long ones are cut at sentence ends and greedily packed. A single sentence longer
/// than the buffer limit is kept whole. Blank input yields no chunks.
pub fn split_response(text: &str, limits: ChunkingLimits) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut paragraphs: Vec<&str> = trimmed
        .split("\n\n")
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    if paragraphs.is_empty() {
        paragraphs.push(trimmed);
    }

    let mut chunks = Vec::new();
    for paragraph in paragraphs {
        if char_len(paragraph) <= limits.paragraph_max_chars {
            chunks.push(paragraph.to_string());
            continue;
        }
        pack_sentences(paragraph, limits.sentence_buffer_max_chars, &mut chunks);
    }
    chunks
}

fn pack_sentences(paragraph: &str, max_chars: usize, chunks: &mut Vec<String>) {
    let mut buffer = String::new();
    for sentence in sentences(paragraph) {
        if buffer.is_empty() {
            buffer.push_str(sentence);
            continue;
        }
        if char_len(&buffer) + 1 + char_len(sentence) <= max_chars {
            buffer.push(' ');
            buffer.push_str(sentence);
        } else {
            chunks.push(std::mem::take(&mut buffer));
            buffer.push_str(sentence);
        }
    }
    if !buffer.is_empty() {
        chunks.push(buffer);
    }
}

/// Sentences of a paragraph; each keeps its closing punctuation.
fn sentences(paragraph: &str) -> impl Iterator<Item = &str> {
    let mut start = 0;
    let mut cuts = SENTENCE_BOUNDARY
        .find_iter(paragraph)
        .map(|boundary| {
            // Punctuation marks are single-byte ASCII.
            let sentence = &paragraph[start..=boundary.start()];
            start = boundary.end();
            sentence
        })
        .collect::<Vec<_>>();
    cuts.push(&paragraph[start..]);
    cuts.into_iter()
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentences_keep_punctuation_and_drop_separators() {
        let parts: Vec<_> = sentences("Hola. ¿Cómo vas?  Bien!\nSigue").collect();
        assert_eq!(parts, vec!["Hola.", "¿Cómo vas?", "Bien!", "Sigue"]);
    }

    #[test]
    fn abbreviation_without_trailing_space_is_not_a_boundary() {
        let parts: Vec<_> = sentences("Valor 3.14 exacto. Fin").collect();
        assert_eq!(parts, vec!["Valor 3.14 exacto.", "Fin"]);
    }
}
