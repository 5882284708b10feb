//! Span-based serialization of rewrites.
//!
//! A rewrite never reprints the tree. It describes its replacement as a list
//! of segments, each either fresh text or a byte range of the current source
//! that is reused verbatim. Bytes outside every applied edit are copied
//! unchanged, so untouched regions keep their formatting and comments.
//!
//! Nesting rules for edits produced by one pass:
//! - edits are applied outermost first;
//! - an edit nested in another is applied only when it lies strictly inside
//!   one of the outer edit's reused segments (its node survived into the
//!   replacement);
//! - an edit whose range equals a reused segment is dropped: it would have
//!   replaced a slot of the discarded parent.

use std::ops::Range;

use crate::source::LineIndex;

/// One piece of a replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Source(Range<usize>),
}

/// Replacement of one byte range of the current source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub segments: Vec<Segment>,
}

impl Edit {
    pub fn new(range: Range<usize>) -> Self {
        Self {
            range,
            segments: Vec::new(),
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.is_empty() {
            self.segments.push(Segment::Text(text));
        }
        self
    }

    pub fn source(mut self, range: Range<usize>) -> Self {
        debug_assert!(
            range.start >= self.range.start && range.end <= self.range.end,
            "reused range {range:?} escapes edit {:?}",
            self.range
        );
        if !range.is_empty() {
            self.segments.push(Segment::Source(range));
        }
        self
    }

    /// Wrap the whole replacement in parentheses.
    pub fn parenthesized(mut self) -> Self {
        self.segments.insert(0, Segment::Text("(".into()));
        self.segments.push(Segment::Text(")".into()));
        self
    }

    pub fn parenthesized_if(self, wrap: bool) -> Self {
        if wrap {
            self.parenthesized()
        } else {
            self
        }
    }
}

/// Text being rewritten, plus the original line every current line came from.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    lines: LineIndex,
    origins: Vec<u32>,
}

impl Document {
    pub fn new(source: &str) -> Self {
        let lines = LineIndex::new(source);
        let origins = (1..=lines.len() as u32).collect();
        Self {
            text: source.to_string(),
            lines,
            origins,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// 1-based line of the original input that `offset` in the current text
    /// derives from.
    pub fn original_line(&self, offset: usize) -> u32 {
        self.origins[self.lines.line_of(offset)]
    }

    /// Apply one pass's edits. Returns the original line of every applied
    /// edit, in source order.
    pub fn apply(&mut self, mut edits: Vec<Edit>) -> Vec<u32> {
        if edits.is_empty() {
            return Vec::new();
        }
        edits.sort_by(|a, b| {
            a.range
                .start
                .cmp(&b.range.start)
                .then(b.range.end.cmp(&a.range.end))
        });

        let mut splicer = Splicer {
            text: &self.text,
            lines: &self.lines,
            origins: &self.origins,
            edits: &edits,
            applied: vec![false; edits.len()],
            out: String::with_capacity(self.text.len()),
            out_origins: vec![self.origins[0]],
        };
        splicer.render(0..self.text.len(), false);

        let Splicer {
            applied,
            out,
            out_origins,
            ..
        } = splicer;

        let applied_lines = edits
            .iter()
            .zip(&applied)
            .filter(|(_, applied)| **applied)
            .map(|(edit, _)| self.original_line(edit.range.start))
            .collect();

        self.lines = LineIndex::new(&out);
        self.text = out;
        self.origins = out_origins;
        debug_assert_eq!(self.origins.len(), self.lines.len());

        applied_lines
    }
}

struct Splicer<'a> {
    text: &'a str,
    lines: &'a LineIndex,
    origins: &'a [u32],
    edits: &'a [Edit],
    applied: Vec<bool>,
    out: String,
    out_origins: Vec<u32>,
}

impl Splicer<'_> {
    fn render(&mut self, range: Range<usize>, drop_equal: bool) {
        let edits = self.edits;
        let mut cursor = range.start;
        for (idx, edit) in edits.iter().enumerate() {
            let r = &edit.range;
            if r.start < cursor || r.end > range.end {
                continue;
            }
            if drop_equal && *r == range {
                continue;
            }
            self.copy(cursor..r.start);
            self.emit(idx);
            cursor = r.end;
        }
        self.copy(cursor..range.end);
    }

    fn emit(&mut self, idx: usize) {
        let edit = &self.edits[idx];
        let anchor = self.origin_at(edit.range.start);
        self.applied[idx] = true;
        for segment in &edit.segments {
            match segment {
                Segment::Text(text) => {
                    self.out.push_str(text);
                    let breaks = text.bytes().filter(|&b| b == b'\n').count();
                    self.out_origins.extend(std::iter::repeat(anchor).take(breaks));
                }
                Segment::Source(reused) => self.render(reused.clone(), true),
            }
        }
    }

    fn copy(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        let slice = &self.text[range.clone()];
        self.out.push_str(slice);
        for (i, b) in slice.bytes().enumerate() {
            if b == b'\n' {
                let origin = self.origin_at(range.start + i + 1);
                self.out_origins.push(origin);
            }
        }
    }

    fn origin_at(&self, offset: usize) -> u32 {
        self.origins[self.lines.line_of(offset)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_edits_keeps_text() {
        let mut doc = Document::new("a\nb\n");
        assert!(doc.apply(vec![]).is_empty());
        assert_eq!(doc.text(), "a\nb\n");
    }

    #[test]
    fn replaces_ranges_and_keeps_the_rest() {
        let mut doc = Document::new("x = f(a, b);\ny = f(c, d);\n");
        let lines = doc.apply(vec![
            Edit::new(17..24).source(19..20).text(" ** ").source(22..23),
            Edit::new(4..11).source(6..7).text(" ** ").source(9..10),
        ]);
        assert_eq!(doc.text(), "x = a ** b;\ny = c ** d;\n");
        assert_eq!(lines, vec![1, 2]);
    }

    #[test]
    fn nested_edit_equal_to_reused_segment_is_dropped() {
        // f(f(a, b), c): the inner call is exactly the reused first operand.
        let mut doc = Document::new("f(f(a, b), c)");
        let lines = doc.apply(vec![
            Edit::new(0..13).source(2..9).text(" ** ").source(11..12),
            Edit::new(2..9).source(4..5).text(" ** ").source(7..8),
        ]);
        assert_eq!(doc.text(), "f(a, b) ** c");
        assert_eq!(lines, vec![1]);
    }

    #[test]
    fn nested_edit_strictly_inside_reused_segment_applies() {
        // g(h(f(a, b)), c): the inner call sits inside the reused operand.
        let mut doc = Document::new("g(h(f(a, b)), c)");
        let lines = doc.apply(vec![
            Edit::new(0..16).source(2..12).text(" ** ").source(14..15),
            Edit::new(4..11).source(6..7).text(" ** ").source(9..10),
        ]);
        assert_eq!(doc.text(), "h(a ** b) ** c");
        assert_eq!(lines, vec![1, 1]);
    }

    #[test]
    fn lines_stay_anchored_to_the_original_input() {
        let mut doc = Document::new("a;\nb;\nc;\n");
        doc.apply(vec![Edit::new(0..2).text("x;\ny;\nz;")]);
        assert_eq!(doc.text(), "x;\ny;\nz;\nb;\nc;\n");
        // `c;` moved from line 3 to line 5 but still reports line 3.
        assert_eq!(doc.original_line(doc.text().find("c;").unwrap()), 3);
        assert_eq!(doc.original_line(doc.text().find("y;").unwrap()), 1);
    }

    #[test]
    fn parenthesized_wraps_every_segment() {
        let edit = Edit::new(0..3).text("a").parenthesized_if(true);
        assert_eq!(
            edit.segments,
            vec![
                Segment::Text("(".into()),
                Segment::Text("a".into()),
                Segment::Text(")".into())
            ]
        );
    }
}
