//! Pretty-printing of raw XML text.
//!
//! The formatter reads the input with a [`quick_xml::Reader`] and writes every
//! event back through an indenting [`quick_xml::Writer`]. Text content is kept
//! on the same line as the tags around it, so an element that contains only
//! text always takes one line:
//!
//! ```
//! # use pretty_assertions::assert_eq;
//! let formatted = xml_fold::format("<book><title>1984</title><sold/></book>").unwrap();
//! assert_eq!(formatted, "<book>\n  <title>1984</title>\n  <sold/>\n</book>");
//! ```
//!
//! The rest of the crate treats the output as opaque text that uses one
//! indentation step per nesting level.

use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::errors::{FormatError, Result};

/// Options of the formatter.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde-types", derive(serde::Deserialize, serde::Serialize))]
pub struct FormatConfig {
    /// Character used for indentation.
    ///
    /// Default: `b' '`
    pub indent_char: u8,
    /// Number of [`indent_char`]s written per nesting level. The fold tree
    /// computes depths assuming a step of two characters.
    ///
    /// Default: `2`
    ///
    /// [`indent_char`]: Self::indent_char
    pub indent_size: usize,
    /// String inserted between lines.
    ///
    /// Default: `"\n"`
    pub line_separator: String,
}

impl FormatConfig {
    /// Formats `raw` XML text according to this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if `raw` is not well-formed XML or does not
    /// contain any element.
    pub fn format(&self, raw: &str) -> Result<String> {
        let mut reader = Reader::from_str(raw);
        reader.config_mut().trim_text(true);

        let mut writer = Writer::new_with_indent(Vec::new(), self.indent_char, self.indent_size);
        // Names of currently opened elements
        let mut open: Vec<String> = Vec::new();
        let mut has_root = false;
        let mut after_start = false;

        loop {
            let event = reader.read_event()?;
            let is_start = matches!(event, Event::Start(_));
            match event {
                Event::Eof => break,
                Event::Start(e) => {
                    has_root = true;
                    open.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                    writer.write_event(Event::Start(e))?;
                }
                Event::End(e) => {
                    if open.pop().is_none() {
                        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                        return Err(FormatError::UnexpectedEnd(name));
                    }
                    // Keep `<a></a>` on one line
                    if after_start {
                        writer.write_event(Event::Text(BytesText::new("")))?;
                    }
                    writer.write_event(Event::End(e))?;
                }
                Event::Empty(e) => {
                    has_root = true;
                    writer.write_event(Event::Empty(e))?;
                }
                e => writer.write_event(e)?,
            }
            after_start = is_start;
        }

        if let Some(name) = open.pop() {
            return Err(FormatError::UnclosedTag(name));
        }
        if !has_root {
            return Err(FormatError::MissingRoot);
        }

        let formatted = String::from_utf8(writer.into_inner()).map_err(|_| FormatError::NonUtf8)?;
        if self.line_separator == "\n" {
            Ok(formatted)
        } else {
            Ok(formatted.replace('\n', &self.line_separator))
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_char: b' ',
            indent_size: 2,
            line_separator: "\n".to_string(),
        }
    }
}

/// Formats `raw` XML text using the default [`FormatConfig`]: two spaces of
/// indentation and `\n` as the line separator.
///
/// # Errors
///
/// Returns [`FormatError`] if `raw` is not well-formed XML or does not
/// contain any element.
#[inline]
pub fn format(raw: &str) -> Result<String> {
    FormatConfig::default().format(raw)
}
