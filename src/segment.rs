//! Splitting of formatted XML into segments.
//!
//! A [`Segment`] is either one line or a whole element that spans several
//! lines, from the line with its opening tag to the line with the matching
//! closing tag. The [`Segmenter`] produces segments of one nesting level only:
//! nested elements stay inside the content of their parent segment and are
//! found by running a new segmenter over the parent's inner lines.
//!
//! ```
//! # use pretty_assertions::assert_eq;
//! use xml_fold::segment::{segment, Segment};
//!
//! let segments = segment("<?xml version=\"1.0\"?>\n<a>\n  <b>1</b>\n</a>");
//! assert_eq!(segments, [
//!     Segment::new("<?xml version=\"1.0\"?>", 0),
//!     Segment::new("<a>\n  <b>1</b>\n</a>", 0),
//! ]);
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::iter::FusedIterator;
use std::ops::Range;

use crate::classify::{LineClassifier, Tag, TagScanner};

/// Number of indentation characters per nesting level assumed by [`indent_depth`].
pub const INDENT_STEP: usize = 2;

/// Returns the nesting level of a line: the number of leading whitespace
/// characters divided by [`INDENT_STEP`], rounded down.
///
/// ```
/// # use xml_fold::segment::indent_depth;
/// assert_eq!(indent_depth("<a>"), 0);
/// assert_eq!(indent_depth("   <a>"), 1);
/// assert_eq!(indent_depth("    <a>"), 2);
/// ```
#[inline]
pub fn indent_depth(line: &str) -> usize {
    line.chars().take_while(|ch| ch.is_whitespace()).count() / INDENT_STEP
}

/// One logical unit of formatted XML: a single line or an element spanning
/// several lines.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde-types", derive(serde::Deserialize, serde::Serialize))]
pub struct Segment<'i> {
    /// Exact text of the segment. Lines of a multi-line segment are joined
    /// with `\n`, as in the source text.
    pub content: Cow<'i, str>,
    /// Nesting level of the first line of the segment, see [`indent_depth`]
    pub depth: usize,
}

impl<'i> Segment<'i> {
    /// Creates a new segment
    #[inline]
    pub fn new<C: Into<Cow<'i, str>>>(content: C, depth: usize) -> Self {
        Self {
            content: content.into(),
            depth,
        }
    }

    /// Returns an iterator over the lines of this segment
    #[inline]
    pub fn lines(&self) -> std::str::Split<'_, char> {
        self.content.split('\n')
    }

    /// Returns the number of lines in this segment, at least 1
    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines().count()
    }

    /// Returns `true` if this segment spans more than one line
    #[inline]
    pub fn is_multiline(&self) -> bool {
        self.content.contains('\n')
    }

    /// Returns the first line of the segment
    pub fn first_line(&self) -> &str {
        match self.content.find('\n') {
            Some(end) => &self.content[..end],
            None => &self.content,
        }
    }

    /// Returns the last line of the segment
    pub fn last_line(&self) -> &str {
        match self.content.rfind('\n') {
            Some(start) => &self.content[start + 1..],
            None => &self.content,
        }
    }

    /// Returns the lines strictly between the first and the last one, joined
    /// with `\n`. Empty for segments of one or two lines.
    pub fn inner(&self) -> &str {
        match (self.content.find('\n'), self.content.rfind('\n')) {
            (Some(first), Some(last)) if first < last => &self.content[first + 1..last],
            _ => "",
        }
    }

    /// Ensures that all data is owned to extend the object's lifetime if necessary.
    #[inline]
    pub fn into_owned(self) -> Segment<'static> {
        Segment {
            content: Cow::Owned(self.content.into_owned()),
            depth: self.depth,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// Lines of one element name that contain its tags, with their balance.
#[derive(Clone, Debug, Default)]
struct TagLines {
    /// Indexes of lines with a non-zero balance, ascending
    lines: Vec<usize>,
    /// Opening minus closing tags on each of `lines`
    balance: Vec<isize>,
    /// For each prefix length `p` of `balance`, the first longer prefix whose
    /// sum is lower. `usize::MAX` if there is none
    lower: Vec<usize>,
}

impl TagLines {
    fn add(&mut self, line: usize, delta: isize) {
        match (self.lines.last(), self.balance.last_mut()) {
            (Some(&last), Some(balance)) if last == line => *balance += delta,
            _ => {
                self.lines.push(line);
                self.balance.push(delta);
            }
        }
    }

    /// Drops lines where the tags cancel out and computes `lower` with a
    /// monotonic stack over the prefix sums
    fn finish(&mut self) {
        let mut lines = Vec::with_capacity(self.lines.len());
        let mut balance = Vec::with_capacity(self.balance.len());
        for (&line, &delta) in self.lines.iter().zip(&self.balance) {
            if delta != 0 {
                lines.push(line);
                balance.push(delta);
            }
        }
        self.lines = lines;
        self.balance = balance;

        let mut sums = Vec::with_capacity(self.balance.len() + 1);
        sums.push(0isize);
        for delta in &self.balance {
            let last = sums[sums.len() - 1];
            sums.push(last + delta);
        }

        self.lower = vec![usize::MAX; sums.len()];
        let mut stack: Vec<usize> = Vec::new();
        for prefix in (0..sums.len()).rev() {
            while let Some(&top) = stack.last() {
                if sums[top] < sums[prefix] {
                    break;
                }
                stack.pop();
            }
            if let Some(&top) = stack.last() {
                self.lower[prefix] = top;
            }
            stack.push(prefix);
        }
    }

    /// Returns the first line after `open` where the closing tags of this
    /// name outnumber the opening ones, counting from the line after `open`
    fn close_of(&self, open: usize) -> Option<usize> {
        let prefix = self.lines.partition_point(|&line| line <= open);
        match self.lower.get(prefix) {
            Some(&lower) if lower != usize::MAX => Some(self.lines[lower - 1]),
            _ => None,
        }
    }
}

/// Lines of a text, classified once.
///
/// Every line is scanned for tags a single time when the scanner is created.
/// Looking for the closing line of an element is then a binary search, so
/// segmenting a text at every nesting level costs time proportional to its
/// size, however deep the nesting is.
#[derive(Clone, Debug)]
pub(crate) struct LineScanner<'i, C> {
    text: &'i str,
    /// Byte ranges of lines in `text`, without the `\n` separators
    lines: Vec<Range<usize>>,
    tags: HashMap<&'i str, TagLines>,
    classifier: C,
}

impl<'i, C: LineClassifier> LineScanner<'i, C> {
    pub fn new(text: &'i str, classifier: C) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;
        for line in text.split('\n') {
            lines.push(start..start + line.len());
            start += line.len() + 1;
        }

        let mut tags: HashMap<&'i str, TagLines> = HashMap::new();
        for (index, range) in lines.iter().enumerate() {
            classifier.scan_tags(&text[range.clone()], &mut |tag| match tag {
                Tag::Open(name) => tags.entry(name).or_default().add(index, 1),
                Tag::Close(name) => tags.entry(name).or_default().add(index, -1),
            });
        }
        for lines in tags.values_mut() {
            lines.finish();
        }

        Self {
            text,
            lines,
            tags,
            classifier,
        }
    }

    /// Number of lines in the text
    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    #[inline]
    pub fn line(&self, index: usize) -> &'i str {
        &self.text[self.lines[index].clone()]
    }

    /// Text from the start of the first line to the end of the last line of `lines`
    #[inline]
    pub fn span(&self, lines: Range<usize>) -> &'i str {
        &self.text[self.lines[lines.start].start..self.lines[lines.end - 1].end]
    }

    pub fn into_lines(self) -> Vec<Range<usize>> {
        self.lines
    }

    /// Finds the next segment among lines `from..end`.
    ///
    /// Returns the lines of the segment and its depth, or `None` if only
    /// blank lines remain.
    pub fn next_segment(&self, from: usize, end: usize) -> Option<(Range<usize>, usize)> {
        let index = (from..end).find(|&index| !self.line(index).trim().is_empty())?;
        let line = self.line(index);
        let depth = indent_depth(line);

        let tag = match self.classifier.open_tag(line) {
            Some(tag) if self.classifier.count_closes(tag.rest, tag.name) == 0 => tag,
            _ => return Some((index..index + 1, depth)),
        };

        let close = self
            .tags
            .get(tag.name)
            .and_then(|lines| lines.close_of(index))
            .filter(|&close| close < end);
        match close {
            Some(close) => Some((index..close + 1, depth)),
            None => {
                tracing::debug!(
                    "no closing tag for `<{}>` opened at line {}, keeping the line flat",
                    tag.name,
                    index + 1
                );
                Some((index..index + 1, depth))
            }
        }
    }
}

/// Iterator over the top-level segments of an indented XML text.
///
/// The text is scanned once, line by line:
///
/// - blank lines are skipped;
/// - a line which does not start with an opening tag, or which also contains
///   the matching closing tag, is a segment on its own;
/// - otherwise the following lines are scanned until the number of closing
///   tags with the same name balances the number of opening ones. All lines
///   up to and including that line form one segment;
/// - if the closing tag is never found, the opening line becomes a segment on
///   its own and the scan continues from the next line.
///
/// The depth of every segment comes from the indentation of its first line
/// only, see [`indent_depth`]. Lines left over by an unclosed element keep
/// their own depth: in `"<a>\n  x"` the line `"  x"` has depth 1.
///
/// The segmenter never fails. Malformed nesting just produces flat lines.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use xml_fold::segment::{Segment, Segmenter};
///
/// let segments: Vec<_> = Segmenter::new("<a>\n  x").collect();
/// assert_eq!(segments, [Segment::new("<a>", 0), Segment::new("  x", 1)]);
/// ```
#[derive(Clone, Debug)]
pub struct Segmenter<'i, C = TagScanner> {
    scanner: LineScanner<'i, C>,
    /// Index of the line where the next segment starts
    next: usize,
}

impl<'i> Segmenter<'i, TagScanner> {
    /// Creates a segmenter which recognizes tags with a [`TagScanner`]
    #[inline]
    pub fn new(text: &'i str) -> Self {
        Self::with_classifier(text, TagScanner)
    }
}

impl<'i, C: LineClassifier> Segmenter<'i, C> {
    /// Creates a segmenter which recognizes tags with the specified classifier
    pub fn with_classifier(text: &'i str, classifier: C) -> Self {
        Self {
            scanner: LineScanner::new(text, classifier),
            next: 0,
        }
    }
}

impl<'i, C: LineClassifier> Iterator for Segmenter<'i, C> {
    type Item = Segment<'i>;

    fn next(&mut self) -> Option<Self::Item> {
        let end = self.scanner.len();
        match self.scanner.next_segment(self.next, end) {
            Some((lines, depth)) => {
                self.next = lines.end;
                Some(Segment::new(self.scanner.span(lines), depth))
            }
            None => {
                self.next = end;
                None
            }
        }
    }
}

impl<'i, C: LineClassifier> FusedIterator for Segmenter<'i, C> {}

/// Splits indented XML text into top-level segments.
///
/// Shortcut for `Segmenter::new(text).collect()`.
#[inline]
pub fn segment(text: &str) -> Vec<Segment<'_>> {
    Segmenter::new(text).collect()
}

////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Joins segments back and compares with the text without blank lines
    fn assert_round_trip(text: &str) {
        let expected: Vec<_> = text.split('\n').filter(|l| !l.trim().is_empty()).collect();
        let joined: Vec<String> = segment(text)
            .iter()
            .flat_map(|s| s.lines().map(str::to_string).collect::<Vec<_>>())
            .collect();
        assert_eq!(joined, expected);
    }

    #[test]
    fn empty() {
        assert!(segment("").is_empty());
        assert!(segment("\n\n").is_empty());
        assert!(segment("   \n\t\n  ").is_empty());
    }

    #[test]
    fn single_line() {
        assert_eq!(segment("<a>1</a>"), [Segment::new("<a>1</a>", 0)]);
    }

    #[test]
    fn text_lines() {
        assert_eq!(
            segment("first\n  second\n     third"),
            [
                Segment::new("first", 0),
                Segment::new("  second", 1),
                Segment::new("     third", 2),
            ]
        );
    }

    #[test]
    fn multi_line() {
        let text = "<a>\n  <b>1</b>\n  <c>2</c>\n</a>";
        assert_eq!(segment(text), [Segment::new(text, 0)]);
    }

    #[test]
    fn siblings() {
        assert_eq!(
            segment("  <a>\n    x\n  </a>\n  <a>\n    y\n  </a>"),
            [
                Segment::new("  <a>\n    x\n  </a>", 1),
                Segment::new("  <a>\n    y\n  </a>", 1),
            ]
        );
    }

    #[test]
    fn nested_same_tag() {
        let text = "<a>\n  <a>\n    x\n  </a>\n</a>";
        let segments = segment(text);
        assert_eq!(segments, [Segment::new(text, 0)]);
        assert_eq!(segments[0].line_count(), 5);

        let inner = segments[0].inner();
        assert_eq!(inner, "  <a>\n    x\n  </a>");
        assert_eq!(segment(inner), [Segment::new(inner, 1)]);
    }

    #[test]
    fn several_tags_on_one_line() {
        let text = "<a>\n<a><a></a>\n</a>\n</a>";
        assert_eq!(segment(text), [Segment::new(text, 0)]);
    }

    #[test]
    fn depth_from_first_line_only() {
        let text = "    <a>\n</a>";
        assert_eq!(segment(text), [Segment::new(text, 2)]);
    }

    #[test]
    fn unbalanced() {
        assert_eq!(
            segment("<a>\n  x"),
            [Segment::new("<a>", 0), Segment::new("  x", 1)]
        );
    }

    #[test]
    fn unbalanced_inside() {
        assert_eq!(
            segment("<a>\n  <b>\n  x\n</a>"),
            [Segment::new("<a>\n  <b>\n  x\n</a>", 0)]
        );
        assert_eq!(
            segment("  <b>\n  x"),
            [Segment::new("  <b>", 1), Segment::new("  x", 1)]
        );
    }

    #[test]
    fn extra_closing_tags() {
        let text = "<a>\n</a></a>\n<b/>";
        assert_eq!(
            segment(text),
            [Segment::new("<a>\n</a></a>", 0), Segment::new("<b/>", 0)]
        );
    }

    #[test]
    fn excluded_lines() {
        assert_eq!(
            segment("<br/>\n<!-- note -->\n<?pi x?>\n</a>"),
            [
                Segment::new("<br/>", 0),
                Segment::new("<!-- note -->", 0),
                Segment::new("<?pi x?>", 0),
                Segment::new("</a>", 0),
            ]
        );
    }

    #[test]
    fn blank_lines_inside_element() {
        let text = "<a>\n\n  x\n\n</a>";
        assert_eq!(segment(text), [Segment::new(text, 0)]);
    }

    #[test]
    fn round_trip() {
        assert_round_trip("");
        assert_round_trip("<a>1</a>");
        assert_round_trip("<a>\n  <b>\n    <c/>\n  </b>\n</a>\n<d>");
        assert_round_trip("<a>\n  x\n</a>\n\n  \n<b>\n");
        assert_round_trip("<a>\n  <a>\n  x");
    }

    #[test]
    fn accessors() {
        let segment = Segment::new("<a>\n  x\n  y\n</a>", 0);
        assert!(segment.is_multiline());
        assert_eq!(segment.first_line(), "<a>");
        assert_eq!(segment.last_line(), "</a>");
        assert_eq!(segment.inner(), "  x\n  y");

        let segment = Segment::new("<a>\n</a>", 0);
        assert_eq!(segment.inner(), "");

        let segment = Segment::new("x", 0);
        assert!(!segment.is_multiline());
        assert_eq!(segment.first_line(), "x");
        assert_eq!(segment.last_line(), "x");
        assert_eq!(segment.inner(), "");
    }

    #[test]
    fn nested_closes_stay_inside_range() {
        // `<b>` closes only after the end of `<a>`, so inside `<a>` it is flat
        let text = "<a>\n  <b>\n</a>\n</b>";
        let scanner = LineScanner::new(text, TagScanner);
        assert_eq!(scanner.next_segment(0, 4), Some((0..3, 0)));
        assert_eq!(scanner.next_segment(1, 2), Some((1..2, 1)));
        assert_eq!(scanner.next_segment(1, 4), Some((1..4, 1)));
        assert_eq!(scanner.next_segment(3, 3), None);
    }

    #[test]
    fn balance_cancelled_on_one_line() {
        let text = "<a>\n  <a></a>\n  <a>\n  </a>\n</a>";
        assert_eq!(segment(text), [Segment::new(text, 0)]);
    }

    /// Each line is scanned for tags once, however deep the nesting
    #[test]
    fn scans_each_line_once() {
        use crate::classify::{OpenTag, Tag};
        use std::cell::Cell;

        struct Counting(Cell<usize>);
        impl LineClassifier for Counting {
            fn open_tag<'i>(&self, line: &'i str) -> Option<OpenTag<'i>> {
                TagScanner.open_tag(line)
            }
            fn is_close_tag(&self, line: &str) -> bool {
                TagScanner.is_close_tag(line)
            }
            fn scan_tags<'l>(&self, line: &'l str, found: &mut dyn FnMut(Tag<'l>)) {
                self.0.set(self.0.get() + 1);
                TagScanner.scan_tags(line, found)
            }
        }

        let depth = 2000;
        let text = format!("{}{}", "<a>\n".repeat(depth), "</a>\n".repeat(depth));
        let counting = Counting(Cell::new(0));

        let mut scanner_calls = 0;
        let mut from = 0;
        let mut end = 2 * depth + 1;
        let scanner = LineScanner::new(&text, &counting);
        // Walk down the chain of nested elements
        while let Some((lines, _)) = scanner.next_segment(from, end) {
            scanner_calls += 1;
            if lines.len() < 2 {
                break;
            }
            from = lines.start + 1;
            end = lines.end - 1;
        }

        assert_eq!(scanner_calls, depth);
        // One scan per line when indexing, one per opening line for the
        // same-line check
        assert!(counting.0.get() <= 2 * depth + 1 + depth, "{}", counting.0.get());
    }

    #[test]
    fn fused() {
        let mut segmenter = Segmenter::new("x");
        assert_eq!(segmenter.next(), Some(Segment::new("x", 0)));
        assert_eq!(segmenter.next(), None);
        assert_eq!(segmenter.next(), None);
    }
}
