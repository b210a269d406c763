//! Classification of single lines of formatted XML.
//!
//! The fold tree does not parse XML. It looks at one line at a time and asks
//! a [`LineClassifier`] whether the line opens an element, closes one, and how
//! many tags with a given name it contains. [`TagScanner`] is a deliberately
//! simple implementation: it knows nothing about namespaces, quoted `>` in
//! attribute values or CDATA sections. A real tokenizer can replace it without
//! touching the segmenter or the fold tree.

use memchr::{memchr, memchr_iter, memmem};

/// Opening tag found at the start of a line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OpenTag<'i> {
    /// Name of the element, everything between the `<` that starts the trimmed
    /// line and the first whitespace or `>`
    pub name: &'i str,
    /// Text after the `>` which ends the tag, up to the end of the line
    pub rest: &'i str,
}

/// Tag name reported by [`LineClassifier::scan_tags`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Tag<'l> {
    /// `<name` followed by whitespace or `>`
    Open(&'l str),
    /// `</name>`
    Close(&'l str),
}

/// Answers structural questions about one line of indented XML.
///
/// All methods ignore leading and trailing whitespace of the line.
pub trait LineClassifier {
    /// Returns the opening tag if the line starts with one.
    ///
    /// Lines with self-closing tags (`/>`), processing instructions (`<?`)
    /// and comments (`<!--`) never open an element.
    fn open_tag<'i>(&self, line: &'i str) -> Option<OpenTag<'i>>;

    /// Returns `true` if the line consists of exactly one closing tag.
    fn is_close_tag(&self, line: &str) -> bool;

    /// Reports every opening and closing tag of the line, in order.
    ///
    /// The segmenter calls this once per line and indexes the result by name,
    /// so the cost of matching closing tags does not depend on nesting.
    fn scan_tags<'l>(&self, line: &'l str, found: &mut dyn FnMut(Tag<'l>));

    /// Counts opening tags of the element `name` in the line.
    fn count_opens(&self, line: &str, name: &str) -> usize {
        let mut count = 0;
        self.scan_tags(line, &mut |tag| {
            if tag == Tag::Open(name) {
                count += 1;
            }
        });
        count
    }

    /// Counts closing tags `</name>` in the line.
    fn count_closes(&self, line: &str, name: &str) -> usize {
        let mut count = 0;
        self.scan_tags(line, &mut |tag| {
            if tag == Tag::Close(name) {
                count += 1;
            }
        });
        count
    }
}

impl<C: LineClassifier + ?Sized> LineClassifier for &C {
    #[inline]
    fn open_tag<'i>(&self, line: &'i str) -> Option<OpenTag<'i>> {
        (**self).open_tag(line)
    }

    #[inline]
    fn is_close_tag(&self, line: &str) -> bool {
        (**self).is_close_tag(line)
    }

    #[inline]
    fn scan_tags<'l>(&self, line: &'l str, found: &mut dyn FnMut(Tag<'l>)) {
        (**self).scan_tags(line, found)
    }

    #[inline]
    fn count_opens(&self, line: &str, name: &str) -> usize {
        (**self).count_opens(line, name)
    }

    #[inline]
    fn count_closes(&self, line: &str, name: &str) -> usize {
        (**self).count_closes(line, name)
    }
}

/// Byte-level scanner that recognizes tags with plain text searches.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TagScanner;

impl LineClassifier for TagScanner {
    fn open_tag<'i>(&self, line: &'i str) -> Option<OpenTag<'i>> {
        let line = line.trim();
        let bytes = line.as_bytes();
        if memmem::find(bytes, b"/>").is_some()
            || memmem::find(bytes, b"<?").is_some()
            || memmem::find(bytes, b"<!--").is_some()
        {
            return None;
        }

        let body = line.strip_prefix('<')?;
        let end = body
            .find(|ch: char| matches!(ch, '/' | '>' | '!' | '?') || ch.is_whitespace())
            .unwrap_or(body.len());
        if end == 0 {
            return None;
        }
        let (name, after) = body.split_at(end);

        match after.chars().next()? {
            '>' => Some(OpenTag {
                name,
                rest: &after[1..],
            }),
            ch if ch.is_whitespace() => {
                let attributes = &after[ch.len_utf8()..];
                let gt = memchr(b'>', attributes.as_bytes())?;
                Some(OpenTag {
                    name,
                    rest: &attributes[gt + 1..],
                })
            }
            // `/`, `!` or `?` right after the name
            _ => None,
        }
    }

    fn is_close_tag(&self, line: &str) -> bool {
        line.trim()
            .strip_prefix("</")
            .and_then(|s| s.strip_suffix('>'))
            .map_or(false, |name| !name.is_empty() && !name.contains('>'))
    }

    fn scan_tags<'l>(&self, line: &'l str, found: &mut dyn FnMut(Tag<'l>)) {
        let line = line.trim();
        for start in memchr_iter(b'<', line.as_bytes()) {
            let after = &line[start + 1..];
            match after.strip_prefix('/') {
                // The name of a closing tag runs up to the first `>`
                Some(name) => {
                    if let Some(end) = memchr(b'>', name.as_bytes()) {
                        if end > 0 {
                            found(Tag::Close(&name[..end]));
                        }
                    }
                }
                // An opening tag is counted only when its name is terminated
                None => {
                    if let Some(end) = after.find(|ch: char| ch == '>' || ch.is_whitespace()) {
                        if end > 0 {
                            found(Tag::Open(&after[..end]));
                        }
                    }
                }
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
