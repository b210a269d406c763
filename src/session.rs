//! State of an interactive formatting session.
//!
//! A [`Session`] connects the pieces: it keeps the latest input text, defers
//! formatting with a [`Debouncer`] and keeps the result of the last pass,
//! either the formatted text with its [`FoldTree`] or the [`FormatError`].
//! A new pass always builds a new tree, so fold states never survive an input
//! change.
//!
//! ```
//! # use pretty_assertions::assert_eq;
//! use std::time::{Duration, Instant};
//! use xml_fold::Session;
//!
//! let start = Instant::now();
//! let mut session = Session::new();
//!
//! session.set_input(start, "<a><b>1</b></a>");
//! assert!(!session.tick(start + Duration::from_millis(299)));
//! assert!(session.tick(start + Duration::from_millis(300)));
//!
//! assert_eq!(session.output(), "<a>\n  <b>1</b>\n</a>");
//! assert!(session.toggle(&[0]));
//! assert_eq!(session.tree().unwrap().to_string(), "▸ <a>...</a>");
//! ```

use std::time::{Duration, Instant};

use crate::debounce::{Debouncer, DEFAULT_DELAY};
use crate::errors::FormatError;
use crate::fold::FoldTree;
use crate::format::FormatConfig;

/// Sample document offered to users who have nothing to paste.
pub const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bookstore>
  <book id="1">
    <title>The Great Gatsby</title>
    <author>F. Scott Fitzgerald</author>
    <price currency="USD">12.99</price>
  </book>
  <book id="2">
    <title>1984</title>
    <author>George Orwell</author>
    <price currency="USD">9.99</price>
  </book>
</bookstore>"#;

/// Result of the last formatting pass.
#[derive(Clone, Debug)]
pub enum Outcome {
    /// The input was blank, there is nothing to show
    Empty,
    /// The input was formatted successfully. The tree owns the formatted
    /// text, see [`FoldTree::text`]
    Formatted(FoldTree<'static>),
    /// The input is not valid XML. Output is not shown
    Failed(FormatError),
}

/// Input, pending pass and last result of a formatting session.
#[derive(Clone, Debug)]
pub struct Session {
    config: FormatConfig,
    debouncer: Debouncer<String>,
    input: String,
    outcome: Outcome,
    passes: usize,
}

impl Session {
    /// Creates a session with the default formatter configuration and a
    /// quiescence window of [`DEFAULT_DELAY`]
    pub fn new() -> Self {
        Self::with_config(FormatConfig::default(), DEFAULT_DELAY)
    }

    /// Creates a session with the specified formatter configuration and
    /// quiescence window
    pub fn with_config(config: FormatConfig, delay: Duration) -> Self {
        Self {
            config,
            debouncer: Debouncer::new(delay),
            input: String::new(),
            outcome: Outcome::Empty,
            passes: 0,
        }
    }

    /// Configuration of the formatter
    #[inline]
    pub const fn config(&self) -> &FormatConfig {
        &self.config
    }

    /// Latest input text, which may be not formatted yet
    #[inline]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replaces the input text and schedules a formatting pass after the
    /// quiescence window. A pass scheduled earlier and not run yet is cancelled.
    pub fn set_input<S: Into<String>>(&mut self, now: Instant, input: S) {
        self.input = input.into();
        self.debouncer.push(now, self.input.clone());
    }

    /// Replaces the input text with [`SAMPLE`]
    #[inline]
    pub fn load_sample(&mut self, now: Instant) {
        self.set_input(now, SAMPLE);
    }

    /// The moment when the scheduled pass becomes due, if there is one
    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Runs the scheduled formatting pass if its window elapsed at `now`.
    ///
    /// Returns `true` if a pass was run.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(input) => {
                self.run_pass(&input);
                true
            }
            None => false,
        }
    }

    /// Formats the current input immediately, cancelling the scheduled pass
    pub fn format_now(&mut self) {
        self.debouncer.cancel();
        let input = self.input.clone();
        self.run_pass(&input);
    }

    fn run_pass(&mut self, input: &str) {
        self.passes += 1;
        self.outcome = if input.trim().is_empty() {
            Outcome::Empty
        } else {
            match self.config.format(input) {
                Ok(output) => Outcome::Formatted(FoldTree::new(output)),
                Err(error) => Outcome::Failed(error),
            }
        };
        match &self.outcome {
            Outcome::Empty => tracing::debug!("pass {}: blank input", self.passes),
            Outcome::Formatted(tree) => tracing::debug!(
                "pass {}: formatted {} bytes into {} lines, {} nodes",
                self.passes,
                input.len(),
                tree.text().lines().count(),
                tree.node_count()
            ),
            Outcome::Failed(error) => {
                tracing::debug!("pass {}: invalid input: {}", self.passes, error)
            }
        }
    }

    /// Result of the last pass
    #[inline]
    pub const fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Number of passes run since the session was created
    #[inline]
    pub const fn passes(&self) -> usize {
        self.passes
    }

    /// Formatted text of the last pass. Empty if the input was blank or invalid
    pub fn output(&self) -> &str {
        match &self.outcome {
            Outcome::Formatted(tree) => tree.text(),
            _ => "",
        }
    }

    /// Error of the last pass, if the input was invalid
    pub fn error(&self) -> Option<&FormatError> {
        match &self.outcome {
            Outcome::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Foldable view over the formatted text of the last pass
    pub fn tree(&self) -> Option<&FoldTree<'static>> {
        match &self.outcome {
            Outcome::Formatted(tree) => Some(tree),
            _ => None,
        }
    }

    /// Foldable view over the formatted text of the last pass
    pub fn tree_mut(&mut self) -> Option<&mut FoldTree<'static>> {
        match &mut self.outcome {
            Outcome::Formatted(tree) => Some(tree),
            _ => None,
        }
    }

    /// Toggles the node at `path` in the current tree.
    ///
    /// Returns `false` if there is no tree or no foldable node at `path`.
    pub fn toggle(&mut self, path: &[usize]) -> bool {
        self.tree_mut().map_or(false, |tree| tree.toggle(path))
    }
}

impl Default for Session {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn initial() {
        let session = Session::default();
        assert_eq!(session.input(), "");
        assert_eq!(session.output(), "");
        assert!(session.error().is_none());
        assert!(session.tree().is_none());
        assert_eq!(session.passes(), 0);
        assert_eq!(session.deadline(), None);
    }

    #[test]
    fn blank_input() {
        let mut session = Session::new();
        session.set_input(Instant::now(), "  \n\t");
        session.format_now();

        assert!(matches!(session.outcome(), Outcome::Empty));
        assert_eq!(session.passes(), 1);
    }

    #[test]
    fn format_now_cancels_pending() {
        let start = Instant::now();
        let mut session = Session::new();
        session.set_input(start, "<a/>");
        session.format_now();

        assert_eq!(session.output(), "<a/>");
        assert_eq!(session.input(), "<a/>");
        assert_eq!(session.deadline(), None);
        assert!(!session.tick(start + Duration::from_secs(1)));
        assert_eq!(session.passes(), 1);
    }

    #[test]
    fn error_suppresses_output() {
        let mut session = Session::new();
        session.set_input(Instant::now(), "<a>");
        session.format_now();
        assert!(session.error().is_some());
        assert!(session.tree().is_none());

        session.set_input(Instant::now(), "<a></b>");
        session.format_now();
        assert!(session.error().is_some());
        assert_eq!(session.output(), "");
        assert!(session.tree().is_none());
        assert!(!session.toggle(&[0]));
    }

    #[test]
    fn sample() {
        let mut session = Session::new();
        session.load_sample(Instant::now());
        session.format_now();

        assert!(session.error().is_none(), "{:?}", session.error());
        assert_eq!(session.output(), SAMPLE);

        let tree = session.tree().unwrap();
        assert_eq!(tree.nodes().count(), 2);
        assert_eq!(tree.get(&[1]).unwrap().tag_name(), Some("bookstore"));
        assert_eq!(tree.get(&[1, 1]).unwrap().tag_name(), Some("book"));
        assert_eq!(tree.get(&[1, 1, 0]).unwrap().segment().content, "    <title>1984</title>");
    }

    /// The formatted text of a deep document is kept once, next to one node
    /// per element
    #[test]
    fn deep_document() {
        let depth = 600;
        let input = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));

        let mut session = Session::new();
        session.set_input(Instant::now(), input);
        session.format_now();

        let output = session.output();
        assert!(session.error().is_none(), "{:?}", session.error());
        assert_eq!(output.lines().count(), 2 * depth - 1);

        let tree = session.tree().unwrap();
        assert_eq!(tree.node_count(), depth);
        assert_eq!(tree.text().as_ptr(), output.as_ptr());

        let innermost = tree.get(&vec![0; depth]).unwrap();
        assert_eq!(innermost.segment().content.trim_start(), "<a></a>");
        assert!(!innermost.is_foldable());
    }
}
