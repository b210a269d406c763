//! Flattening of a [`FoldTree`] into displayable lines.
//!
//! [`render`] walks the visible part of the tree and produces one [`Line`]
//! per line of output. Lines that belong to a foldable node carry the
//! [`Control`] that toggles it and the identifier of that node, so a user
//! interface can call [`FoldTree::toggle_node`] when the control is activated.
//!
//! The [`Display`] implementation of [`FoldTree`] renders the same lines as
//! plain text:
//!
//! ```
//! # use pretty_assertions::assert_eq;
//! use xml_fold::fold::FoldTree;
//!
//! let mut tree = FoldTree::new("<a>\n  <b>\n    1\n  </b>\n  <c/>\n</a>");
//! assert_eq!(tree.to_string(), "\
//! ▾ <a>
//!   ▾ <b>
//!       1
//!     </b>
//!     <c/>
//!   </a>");
//!
//! tree.toggle(&[0, 0]);
//! assert_eq!(tree.to_string(), "\
//! ▾ <a>
//!   ▸ <b>...</b>
//!     <c/>
//!   </a>");
//! ```
//!
//! [`Display`]: std::fmt::Display

use std::borrow::Cow;
use std::fmt;

use crate::fold::{Children, FoldState, FoldTree, NodeId};

/// Interactive element shown in front of the first line of a foldable node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde-types", derive(serde::Deserialize, serde::Serialize))]
pub enum Control {
    /// The node is collapsed, activating the control expands it
    Expand,
    /// The node is expanded, activating the control collapses it
    Collapse,
}

impl Control {
    /// Marker used in the plain text rendering
    pub const fn marker(&self) -> &'static str {
        match self {
            Self::Expand => "▸",
            Self::Collapse => "▾",
        }
    }
}

/// One displayed line of a [`FoldTree`].
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde-types", derive(serde::Deserialize, serde::Serialize))]
pub struct Line<'t> {
    /// Node this line belongs to, see [`FoldTree::toggle_node`] and
    /// [`FoldTree::path`]
    pub node: NodeId,
    /// Number of foldable ancestors of the node
    pub level: usize,
    /// Control of the node, present on the first line of foldable nodes
    pub control: Option<Control>,
    /// Text of the line. Lines of the formatted text are kept verbatim,
    /// including their indentation.
    pub text: Cow<'t, str>,
}

/// Returns the visible lines of the tree in display order.
///
/// - a leaf shows every line of its segment;
/// - a collapsed node shows one line `<name>...</name>` with [`Control::Expand`];
/// - an expanded node shows its opening line with [`Control::Collapse`], then
///   its children one level deeper, then its closing line.
pub fn render<'t>(tree: &'t FoldTree<'_>) -> Vec<Line<'t>> {
    enum Step<'a> {
        /// Remaining nodes of one level
        Nodes(Children<'a>, usize),
        /// Closing line of an expanded node
        Close(NodeId, &'a str, usize),
    }

    let mut lines = Vec::new();
    let mut stack = vec![Step::Nodes(tree.nodes(), 0)];
    while let Some(step) = stack.pop() {
        let (mut nodes, level) = match step {
            Step::Nodes(nodes, level) => (nodes, level),
            Step::Close(node, text, level) => {
                lines.push(Line {
                    node,
                    level,
                    control: None,
                    text: Cow::Borrowed(text),
                });
                continue;
            }
        };
        let node = match nodes.next() {
            Some(node) => node,
            None => continue,
        };
        stack.push(Step::Nodes(nodes, level));

        let line = |control, text| Line {
            node: node.id(),
            level,
            control,
            text,
        };
        match node.state() {
            FoldState::Leaf => {
                lines.extend(node.lines().map(|text| line(None, Cow::Borrowed(text))));
            }
            FoldState::Collapsed => {
                let name = node.tag_name().unwrap_or_default();
                let text = format!("<{0}>...</{0}>", name);
                lines.push(line(Some(Control::Expand), Cow::Owned(text)));
            }
            FoldState::Expanded => {
                lines.push(line(
                    Some(Control::Collapse),
                    Cow::Borrowed(node.opening_line()),
                ));
                stack.push(Step::Close(node.id(), node.closing_line(), level));
                stack.push(Step::Nodes(node.children(), level + 1));
            }
        }
    }
    lines
}

impl<'i> fmt::Display for FoldTree<'i> {
    /// Writes visible lines, indented by two spaces per level and prefixed
    /// with a marker for foldable nodes. Leading whitespace of the
    /// lines in the formatted text is replaced by the level indentation.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, line) in render(self).iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            let marker = line.control.map_or(" ", |c| c.marker());
            write!(
                f,
                "{:indent$}{} {}",
                "",
                marker,
                line.text.trim_start(),
                indent = line.level * 2
            )?;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
