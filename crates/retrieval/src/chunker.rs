//! Recursive character chunking.
//!
//! Splits text on a separator hierarchy — paragraph breaks first, then line
//! breaks, then sentence punctuation, then whitespace, finally individual
//! characters — and greedily merges the pieces back into chunks bounded by
//! `chunk_size`, carrying `chunk_overlap` characters of context between
//! consecutive chunks. Sizes are measured in characters, not bytes, so CJK
//! text chunks the same way short ASCII does.

/// Recursive character text chunker.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl TextChunker {
    /// Create a chunker with the given size and overlap (in characters).
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
            separators: ["\n\n", "\n", "。", "、", " ", ""]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Split text into chunks of at most `chunk_size` characters.
    pub fn split(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        let pieces = self.split_recursive(text, 0);
        self.merge(pieces)
    }

    /// Break text into pieces no longer than chunk_size, trying separators
    /// in order and recursing with finer separators on oversized pieces.
    fn split_recursive(&self, text: &str, sep_index: usize) -> Vec<String> {
        if char_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }

        let Some(sep) = self.separators.get(sep_index) else {
            // Ran out of separators; hard-cut by characters
            return hard_cut(text, self.chunk_size);
        };

        if sep.is_empty() {
            return hard_cut(text, self.chunk_size);
        }

        let mut pieces = Vec::new();
        for part in split_with_sep(text, sep) {
            if part.is_empty() {
                continue;
            }
            if char_len(&part) > self.chunk_size {
                pieces.extend(self.split_recursive(&part, sep_index + 1));
            } else {
                pieces.push(part);
            }
        }
        pieces
    }

    /// Greedily merge pieces into chunks, seeding each new chunk with the
    /// overlap tail of the previous one.
    fn merge(&self, pieces: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();

        for piece in pieces {
            let piece_len = char_len(&piece);
            let current_len = char_len(&current);

            if current_len > 0 && current_len + piece_len > self.chunk_size {
                chunks.push(current.trim().to_string());
                current = tail_chars(&current, self.chunk_overlap);
            }
            current.push_str(&piece);
        }

        let last = current.trim();
        if !last.is_empty() {
            chunks.push(last.to_string());
        }
        chunks.retain(|c| !c.is_empty());
        chunks
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(500, 50)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn tail_chars(s: &str, n: usize) -> String {
    let len = char_len(s);
    if len <= n {
        return s.to_string();
    }
    s.chars().skip(len - n).collect()
}

fn hard_cut(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size)
        .map(|c| c.iter().collect::<String>())
        .collect()
}

/// Split on a separator, keeping it attached to the preceding piece so the
/// merge step can concatenate pieces without losing the boundary text.
fn split_with_sep(text: &str, sep: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(pos) = rest.find(sep) {
        let end = pos + sep.len();
        out.push(rest[..end].to_string());
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        out.push(rest.to_string());
    }
    out
}
