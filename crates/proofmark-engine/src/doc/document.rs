use crate::doc::node::{
    Block, FormatSet, Leaf, SuggestionTag, delete_chars_in_spans, insert_text_in_spans,
    map_spans_in_range, slice_chars,
};

#[derive(Debug, thiserror::Error)]
pub enum DocError {
    #[error("invalid position range {from}..{to} (document ends at {end})")]
    InvalidRange { from: usize, to: usize, end: usize },
}

/// Structured rich-text document: a sequence of block nodes holding text
/// leaves with inline formatting and suggestion marks.
///
/// ## Position addressing
///
/// Positions are monotonically increasing integers assigned to every
/// traversable point, including block boundaries:
///
/// - opening a block costs 1,
/// - every character costs 1,
/// - closing a block costs 1.
///
/// For `Paragraph("Hello")` the text occupies positions 1..6, position 0 is
/// before the paragraph and position 7 is after it. Positions are derived
/// state, recomputed on demand; they are never persisted across mutations.
///
/// ## Mutation model
///
/// All mutations are synchronous and run to completion, bumping `version`
/// once per transactional step. Span runs are re-normalized after every
/// mutation so adjacent leaves with identical decorations merge back into
/// one, keeping the tree canonical.
///
/// ```rust
/// use proofmark_engine::doc::Document;
///
/// let mut doc = Document::from_text("Hello world");
/// assert_eq!(doc.text(), "Hello world");
/// doc.replace_range(1, 6, "Howdy").unwrap();
/// assert_eq!(doc.text(), "Howdy world");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    blocks: Vec<Block>,
    /// Current selection/caret as a position range.
    selection: std::ops::Range<usize>,
    /// Bumped on every mutation, enables change detection by callers.
    version: u64,
}

impl Document {
    /// Single-paragraph document from plain text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_blocks(vec![Block::paragraph(text)])
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut doc = Self {
            blocks,
            selection: 0..0,
            version: 0,
        };
        let end = doc.end_pos();
        doc.selection = end..end;
        doc
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn selection(&self) -> std::ops::Range<usize> {
        self.selection.clone()
    }

    pub fn set_selection(&mut self, selection: std::ops::Range<usize>) {
        let end = self.end_pos();
        let from = selection.start.min(end);
        let to = selection.end.min(end).max(from);
        self.selection = from..to;
    }

    /// Collapse the caret to the end of the document, a neutral spot that is
    /// never inside a marked range. Applied after mark passes so marks do not
    /// leak into subsequently typed characters.
    pub fn normalize_selection(&mut self) {
        let end = self.end_pos();
        self.selection = end..end;
    }

    /// One past the last traversable position.
    pub fn end_pos(&self) -> usize {
        self.blocks.iter().map(|b| b.char_len() + 2).sum()
    }

    /// Plain-text projection: concatenation of all text leaves in document
    /// order. This is the coordinate space AI suggestions are expressed in.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            for span in block.spans() {
                out.push_str(&span.text);
            }
        }
        out
    }

    /// Character length of the plain-text projection.
    pub fn text_len(&self) -> usize {
        self.blocks.iter().map(Block::char_len).sum()
    }

    /// Depth-first traversal over text-bearing leaves with their document
    /// positions and character lengths. Empty leaves are not produced.
    pub fn leaves(&self) -> Vec<Leaf> {
        let mut leaves = Vec::new();
        let mut open = 0;
        for (block_idx, block) in self.blocks.iter().enumerate() {
            let content_start = open + 1;
            let mut offset = 0;
            for (span_idx, span) in block.spans().iter().enumerate() {
                let len = span.char_len();
                if len > 0 {
                    leaves.push(Leaf {
                        block: block_idx,
                        span: span_idx,
                        pos: content_start + offset,
                        len,
                    });
                }
                offset += len;
            }
            open = content_start + block.char_len() + 1;
        }
        leaves
    }

    /// Substring of the document text covered by the position range
    /// `[from, to)`, skipping block boundary positions. Returns an empty
    /// string rather than failing on out-of-range input.
    pub fn text_between(&self, from: usize, to: usize) -> String {
        if from >= to {
            return String::new();
        }
        let mut out = String::new();
        for leaf in self.leaves() {
            let start = from.max(leaf.pos);
            let end = to.min(leaf.pos + leaf.len);
            if start < end {
                let span = &self.blocks[leaf.block].spans()[leaf.span];
                out.push_str(slice_chars(&span.text, start - leaf.pos, end - leaf.pos));
            }
        }
        out
    }

    /// Set a suggestion mark over `[from, to)`. Leaves partially covered are
    /// split at the range edges; a range crossing a formatting boundary
    /// therefore yields several adjacent instances carrying the same tag.
    pub fn set_suggestion_mark(&mut self, from: usize, to: usize, tag: &SuggestionTag) {
        self.map_marked_range(from, to, &|span| span.tag = Some(tag.clone()));
    }

    /// Bulk-unset suggestion marks over `[from, to)`.
    pub fn clear_suggestion_marks(&mut self, from: usize, to: usize) {
        self.map_marked_range(from, to, &|span| span.tag = None);
    }

    fn map_marked_range(
        &mut self,
        from: usize,
        to: usize,
        modify: &dyn Fn(&mut crate::doc::node::TextSpan),
    ) {
        let mut open = 0;
        for block in &mut self.blocks {
            let content_start = open + 1;
            let len = block.char_len();
            open = content_start + len + 1;
            let local_from = from.saturating_sub(content_start).min(len);
            let local_to = to.saturating_sub(content_start).min(len);
            if local_from >= local_to {
                continue;
            }
            let spans = std::mem::take(block.spans_mut());
            *block.spans_mut() = map_spans_in_range(spans, local_from, local_to, modify);
            block.normalize();
        }
        self.version += 1;
    }

    /// Targeted strip of one leaf's mark, used by the clearance verification
    /// second pass.
    pub fn strip_suggestion_mark(&mut self, leaf: Leaf) {
        if let Some(block) = self.blocks.get_mut(leaf.block)
            && let Some(span) = block.spans_mut().get_mut(leaf.span)
        {
            span.tag = None;
            block.normalize();
            self.version += 1;
        }
    }

    /// All leaves currently carrying a suggestion mark, in document order.
    pub fn marked_leaves(&self) -> Vec<(Leaf, SuggestionTag)> {
        self.leaves()
            .into_iter()
            .filter_map(|leaf| {
                self.blocks[leaf.block].spans()[leaf.span]
                    .tag
                    .clone()
                    .map(|tag| (leaf, tag))
            })
            .collect()
    }

    /// Hit test: resolve a pointer position to the suggestion mark covering
    /// it, if any. Click/hover surfaces resolve suggestion ids through this
    /// rather than position heuristics.
    pub fn suggestion_at(&self, pos: usize) -> Option<SuggestionTag> {
        self.leaves()
            .into_iter()
            .find(|leaf| leaf.range().contains(&pos))
            .and_then(|leaf| self.blocks[leaf.block].spans()[leaf.span].tag.clone())
    }

    /// Transactional text replacement over the position range `[from, to)`.
    ///
    /// The replacement inherits the inline formatting of the first covered
    /// leaf and never inherits a suggestion tag. A range spanning block
    /// boundaries deletes the covered text from every block and inserts the
    /// replacement where the range starts; blocks are not merged.
    pub fn replace_range(&mut self, from: usize, to: usize, text: &str) -> Result<(), DocError> {
        let end = self.end_pos();
        if from > to || to > end {
            return Err(DocError::InvalidRange { from, to, end });
        }

        let inherited = self
            .leaves()
            .into_iter()
            .find(|leaf| leaf.pos < to && leaf.pos + leaf.len > from)
            .map(|leaf| self.blocks[leaf.block].spans()[leaf.span].format)
            .unwrap_or_else(FormatSet::default);

        let mut open = 0;
        let mut inserted = false;
        for block in &mut self.blocks {
            let content_start = open + 1;
            let len = block.char_len();
            let close = content_start + len;
            open = close + 1;

            let local_from = from.saturating_sub(content_start).min(len);
            let local_to = to.saturating_sub(content_start).min(len);

            let anchors_here = !inserted && from >= content_start - 1 && from <= close;
            if local_from >= local_to && !anchors_here {
                continue;
            }

            let mut spans = std::mem::take(block.spans_mut());
            if local_from < local_to {
                spans = delete_chars_in_spans(spans, local_from, local_to);
            }
            if anchors_here {
                spans = insert_text_in_spans(spans, local_from, text, inherited);
                inserted = true;
            }
            *block.spans_mut() = spans;
            block.normalize();
        }

        self.version += 1;
        let new_end = self.end_pos();
        let caret = self.selection.start.min(new_end);
        self.selection = caret..caret;
        Ok(())
    }
}
