use crate::suggest::SuggestionKind;

/// Inline formatting carried by a text leaf.
///
/// Formatting is orthogonal to suggestion marks: a suggestion range may cross
/// any number of formatting boundaries, which is exactly what splits one
/// logical mark into several adjacent leaf instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatSet {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
}

impl FormatSet {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Self::default()
        }
    }
}

/// Suggestion annotation bound to a text leaf.
///
/// The id is the only way accept/reject resolves a suggestion back to a
/// document range, so it travels with every fragment the engine splits the
/// mark into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionTag {
    pub id: String,
    pub kind: SuggestionKind,
}

impl SuggestionTag {
    pub fn new(id: impl Into<String>, kind: SuggestionKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

/// A text-bearing leaf: a run of characters with uniform formatting and at
/// most one suggestion tag.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub format: FormatSet,
    pub tag: Option<SuggestionTag>,
}

impl TextSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: FormatSet::default(),
            tag: None,
        }
    }

    pub fn formatted(text: impl Into<String>, format: FormatSet) -> Self {
        Self {
            text: text.into(),
            format,
            tag: None,
        }
    }

    /// Length in characters (positions are character-based, not byte-based).
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Copy of the `[start, end)` character slice, keeping format and tag.
    pub(crate) fn slice(&self, start: usize, end: usize) -> TextSpan {
        TextSpan {
            text: slice_chars(&self.text, start, end).to_string(),
            format: self.format,
            tag: self.tag.clone(),
        }
    }

    /// Two spans can be merged when their decorations are identical.
    fn mergeable_with(&self, other: &TextSpan) -> bool {
        self.format == other.format && self.tag == other.tag
    }
}

/// Block-level node. The engine supports paragraph and heading blocks; tables
/// and embeds are out of scope.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph { spans: Vec<TextSpan> },
    Heading { level: u8, spans: Vec<TextSpan> },
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph {
            spans: vec![TextSpan::plain(text)],
        }
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level,
            spans: vec![TextSpan::plain(text)],
        }
    }

    pub fn spans(&self) -> &[TextSpan] {
        match self {
            Block::Paragraph { spans } | Block::Heading { spans, .. } => spans,
        }
    }

    pub fn spans_mut(&mut self) -> &mut Vec<TextSpan> {
        match self {
            Block::Paragraph { spans } | Block::Heading { spans, .. } => spans,
        }
    }

    /// Character length of the block's text content.
    pub fn char_len(&self) -> usize {
        self.spans().iter().map(TextSpan::char_len).sum()
    }

    /// Merge adjacent spans with identical decorations and drop empty ones.
    pub(crate) fn normalize(&mut self) {
        let spans = self.spans_mut();
        let old = std::mem::take(spans);
        for span in old {
            if span.text.is_empty() {
                continue;
            }
            match spans.last_mut() {
                Some(prev) if prev.mergeable_with(&span) => prev.text.push_str(&span.text),
                _ => spans.push(span),
            }
        }
    }
}

/// A text leaf located during traversal: which block and span it is, the
/// document position of its first character, and its character length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leaf {
    pub block: usize,
    pub span: usize,
    pub pos: usize,
    pub len: usize,
}

impl Leaf {
    /// Position range `[pos, pos + len)` covered by this leaf.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.pos..self.pos + self.len
    }
}

/// Rebuild a span run, applying `modify` to the segments covered by the local
/// character range `[from, to)`. Partially covered spans are split at the
/// range edges, which is how one mark ends up as several adjacent instances
/// when the range crosses a formatting boundary.
pub(crate) fn map_spans_in_range(
    spans: Vec<TextSpan>,
    from: usize,
    to: usize,
    modify: &dyn Fn(&mut TextSpan),
) -> Vec<TextSpan> {
    let mut out = Vec::with_capacity(spans.len() + 2);
    let mut cursor = 0;
    for span in spans {
        let len = span.char_len();
        let start = cursor;
        let end = cursor + len;
        cursor = end;

        let cov_start = from.max(start);
        let cov_end = to.min(end);
        if cov_start >= cov_end {
            out.push(span);
            continue;
        }
        if cov_start > start {
            out.push(span.slice(0, cov_start - start));
        }
        let mut covered = span.slice(cov_start - start, cov_end - start);
        modify(&mut covered);
        out.push(covered);
        if cov_end < end {
            out.push(span.slice(cov_end - start, len));
        }
    }
    out
}

/// Rebuild a span run with the local character range `[from, to)` removed.
pub(crate) fn delete_chars_in_spans(spans: Vec<TextSpan>, from: usize, to: usize) -> Vec<TextSpan> {
    let mut out = Vec::with_capacity(spans.len());
    let mut cursor = 0;
    for span in spans {
        let len = span.char_len();
        let start = cursor;
        let end = cursor + len;
        cursor = end;

        let cov_start = from.max(start);
        let cov_end = to.min(end);
        if cov_start >= cov_end {
            out.push(span);
            continue;
        }
        if cov_start > start {
            out.push(span.slice(0, cov_start - start));
        }
        if cov_end < end {
            out.push(span.slice(cov_end - start, len));
        }
    }
    out
}

/// Insert `text` at local character offset `at`, carrying the given format
/// and no suggestion tag. Replacement text must never inherit the mark it
/// replaces.
pub(crate) fn insert_text_in_spans(
    spans: Vec<TextSpan>,
    at: usize,
    text: &str,
    format: FormatSet,
) -> Vec<TextSpan> {
    let inserted = TextSpan {
        text: text.to_string(),
        format,
        tag: None,
    };
    let mut out = Vec::with_capacity(spans.len() + 2);
    let mut cursor = 0;
    let mut placed = false;
    for span in spans {
        let len = span.char_len();
        let start = cursor;
        let end = cursor + len;
        cursor = end;

        if !placed && at >= start && at <= end {
            if at == start {
                out.push(inserted.clone());
                out.push(span);
            } else if at == end {
                out.push(span);
                out.push(inserted.clone());
            } else {
                out.push(span.slice(0, at - start));
                out.push(inserted.clone());
                out.push(span.slice(at - start, len));
            }
            placed = true;
        } else {
            out.push(span);
        }
    }
    if !placed {
        out.push(inserted);
    }
    out
}

/// Character-indexed substring, clamped to the string's length.
pub(crate) fn slice_chars(s: &str, start: usize, end: usize) -> &str {
    let byte_start = byte_of_char(s, start);
    let byte_end = byte_of_char(s, end).max(byte_start);
    &s[byte_start..byte_end]
}

fn byte_of_char(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(s.len())
}
