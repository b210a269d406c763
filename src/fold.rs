//! Tree of foldable elements built over formatted XML.
//!
//! A [`FoldTree`] is built once per formatting pass. Every top-level
//! [`Segment`] becomes a node. A node is foldable when its segment spans
//! several lines, starts with an opening tag and ends with the closing one.
//! Foldable nodes start expanded; their children are the segments of the
//! lines between the opening and the closing tag.
//!
//! Each node owns its own fold state and nothing propagates between nodes:
//! the state of the children of a collapsed node is forgotten, and expanding
//! it again shows them all expanded.
//!
//! ```
//! # use pretty_assertions::assert_eq;
//! use xml_fold::fold::FoldTree;
//!
//! let mut tree = FoldTree::new("<a>\n  <b>\n    <c>1</c>\n  </b>\n</a>");
//! assert_eq!(tree.get(&[0, 0]).unwrap().tag_name(), Some("b"));
//!
//! // Collapse `<b>`, then `<a>`, and expand `<a>` back
//! assert!(tree.toggle(&[0, 0]));
//! assert!(tree.get(&[0, 0]).unwrap().is_collapsed());
//! assert!(tree.toggle(&[0]));
//! assert!(tree.toggle(&[0]));
//! // `<b>` is shown in the initial state
//! assert!(tree.get(&[0, 0]).unwrap().is_expanded());
//! ```
//!
//! The tree keeps the text once and refers to it by line numbers. Nodes are
//! stored in one vector in document order, so no operation on the tree
//! recurses, whatever the nesting depth.

use std::borrow::Cow;
use std::fmt;
use std::iter::FusedIterator;
use std::ops::Range;

use crate::classify::{LineClassifier, TagScanner};
use crate::segment::{LineScanner, Segment};

/// Returns the length of the tag name if the lines start and end a foldable
/// element
fn fold_tag<C: LineClassifier>(classifier: &C, first: &str, last: &str) -> Option<usize> {
    let tag = classifier.open_tag(first)?;
    if classifier.is_close_tag(last) || tag.rest.contains("</") {
        Some(tag.name.len())
    } else {
        None
    }
}

/// Returns `true` if the segment can be collapsed to its opening and closing tags.
///
/// That is the case when the segment:
/// - spans more than one line;
/// - starts with an opening tag, which is not self-closing;
/// - ends with a line that contains only a closing tag, or has a closing tag
///   already after the opening one on the first line.
pub fn is_foldable(segment: &Segment) -> bool {
    // `open_tag` never matches lines with `/>`
    segment.is_multiline()
        && fold_tag(&TagScanner, segment.first_line(), segment.last_line()).is_some()
}

/// Fold state of one [`FoldNode`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde-types", derive(serde::Deserialize, serde::Serialize))]
pub enum FoldState {
    /// The node cannot be folded and is shown as is
    Leaf,
    /// Only the opening and closing tags are shown
    Collapsed,
    /// The opening tag, the nested nodes and the closing tag are shown
    Expanded,
}

/// Identifier of a node in its [`FoldTree`].
///
/// Identifiers are stable for the lifetime of the tree: folding does not
/// create or remove nodes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize),
    serde(transparent)
)]
pub struct NodeId(usize);

#[derive(Clone, Debug, Eq, PartialEq)]
struct Node {
    /// Indexes of the lines of the segment
    lines: Range<usize>,
    depth: usize,
    /// Length of the tag name, present for foldable nodes
    tag: Option<usize>,
    collapsed: bool,
    parent: Option<usize>,
    /// Index of the first node after the descendants of this one
    end: usize,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Layout {
    /// Byte ranges of lines in the text
    lines: Vec<Range<usize>>,
    /// Nodes in document order, each one followed by its descendants
    nodes: Vec<Node>,
}

impl Layout {
    /// Builds nodes of all levels with an explicit stack of open parents
    fn build<C: LineClassifier>(scanner: &LineScanner<C>) -> Vec<Node> {
        struct Frame {
            parent: Option<usize>,
            next: usize,
            end: usize,
        }

        let mut nodes: Vec<Node> = Vec::new();
        let mut stack = vec![Frame {
            parent: None,
            next: 0,
            end: scanner.len(),
        }];
        while let Some(frame) = stack.last_mut() {
            match scanner.next_segment(frame.next, frame.end) {
                Some((lines, depth)) => {
                    frame.next = lines.end;
                    let parent = frame.parent;

                    let id = nodes.len();
                    let tag = if lines.len() > 1 {
                        let first = scanner.line(lines.start);
                        let last = scanner.line(lines.end - 1);
                        fold_tag(scanner.classifier(), first, last)
                    } else {
                        None
                    };
                    if tag.is_some() {
                        stack.push(Frame {
                            parent: Some(id),
                            next: lines.start + 1,
                            end: lines.end - 1,
                        });
                    }
                    nodes.push(Node {
                        lines,
                        depth,
                        tag,
                        collapsed: false,
                        parent,
                        end: id + 1,
                    });
                }
                None => {
                    let parent = frame.parent;
                    stack.pop();
                    if let Some(parent) = parent {
                        nodes[parent].end = nodes.len();
                    }
                }
            }
        }
        nodes
    }

    fn state(&self, id: usize) -> FoldState {
        let node = &self.nodes[id];
        match (node.tag, node.collapsed) {
            (None, _) => FoldState::Leaf,
            (Some(_), true) => FoldState::Collapsed,
            (Some(_), false) => FoldState::Expanded,
        }
    }

    /// Returns `true` if all ancestors of the node are expanded
    fn is_visible(&self, id: usize) -> bool {
        let mut parent = self.nodes[id].parent;
        while let Some(id) = parent {
            if self.nodes[id].collapsed {
                return false;
            }
            parent = self.nodes[id].parent;
        }
        true
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// A node of the [`FoldTree`]: one segment and its fold state.
///
/// This is a cheap view into the tree, it is valid until the tree is changed.
#[derive(Clone, Copy)]
pub struct FoldNode<'t> {
    text: &'t str,
    layout: &'t Layout,
    id: usize,
}

impl<'t> FoldNode<'t> {
    #[inline]
    fn node(&self) -> &'t Node {
        &self.layout.nodes[self.id]
    }

    #[inline]
    fn line(&self, index: usize) -> &'t str {
        &self.text[self.layout.lines[index].clone()]
    }

    /// Identifier of this node in the tree
    #[inline]
    pub fn id(&self) -> NodeId {
        NodeId(self.id)
    }

    /// Segment represented by this node
    pub fn segment(&self) -> Segment<'t> {
        let lines = &self.node().lines;
        let bytes = self.layout.lines[lines.start].start..self.layout.lines[lines.end - 1].end;
        Segment::new(&self.text[bytes], self.node().depth)
    }

    /// Nesting level of the first line, see [`indent_depth`](crate::segment::indent_depth)
    #[inline]
    pub fn depth(&self) -> usize {
        self.node().depth
    }

    /// Lines of the segment of this node
    pub fn lines(&self) -> impl Iterator<Item = &'t str> + 't {
        let node = *self;
        self.node().lines.clone().map(move |index| node.line(index))
    }

    /// Current fold state of this node
    #[inline]
    pub fn state(&self) -> FoldState {
        self.layout.state(self.id)
    }

    /// Returns `true` if this node can be collapsed and expanded
    #[inline]
    pub fn is_foldable(&self) -> bool {
        self.node().tag.is_some()
    }

    /// Returns `true` if this node is foldable and currently expanded
    #[inline]
    pub fn is_expanded(&self) -> bool {
        self.state() == FoldState::Expanded
    }

    /// Returns `true` if this node is foldable and currently collapsed
    #[inline]
    pub fn is_collapsed(&self) -> bool {
        self.state() == FoldState::Collapsed
    }

    /// Nested nodes. Empty unless this node is expanded.
    pub fn children(&self) -> Children<'t> {
        let next = self.id + 1;
        let end = if self.is_expanded() { self.node().end } else { next };
        Children {
            text: self.text,
            layout: self.layout,
            next,
            end,
        }
    }

    /// Name of the element, if this node is foldable
    pub fn tag_name(&self) -> Option<&'t str> {
        let len = self.node().tag?;
        self.opening_line().trim_start().get(1..1 + len)
    }

    /// The line with the opening tag, as it appears in the formatted text
    #[inline]
    pub fn opening_line(&self) -> &'t str {
        self.line(self.node().lines.start)
    }

    /// The line with the closing tag, as it appears in the formatted text
    #[inline]
    pub fn closing_line(&self) -> &'t str {
        self.line(self.node().lines.end - 1)
    }

    /// Lines between the opening and the closing line, from which the
    /// children are built
    pub fn inner_text(&self) -> &'t str {
        let lines = &self.node().lines;
        if lines.len() < 3 {
            return "";
        }
        let first = &self.layout.lines[lines.start + 1];
        let last = &self.layout.lines[lines.end - 2];
        &self.text[first.start..last.end]
    }
}

impl<'t> fmt::Debug for FoldNode<'t> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FoldNode")
            .field("id", &self.id)
            .field("segment", &self.segment())
            .field("state", &self.state())
            .finish()
    }
}

/// Iterator over the visible children of a node, or over the top-level nodes
/// of a tree.
#[derive(Clone)]
pub struct Children<'t> {
    text: &'t str,
    layout: &'t Layout,
    next: usize,
    end: usize,
}

impl<'t> Iterator for Children<'t> {
    type Item = FoldNode<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let id = self.next;
        self.next = self.layout.nodes[id].end;
        Some(FoldNode {
            text: self.text,
            layout: self.layout,
            id,
        })
    }
}

impl<'t> FusedIterator for Children<'t> {}

impl<'t> fmt::Debug for Children<'t> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// Foldable view over a formatted XML text.
///
/// Nodes are addressed by paths: the index of a top-level node followed by
/// the indexes of nested nodes inside expanded parents.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FoldTree<'i> {
    text: Cow<'i, str>,
    layout: Layout,
}

impl<'i> FoldTree<'i> {
    /// Builds a tree from formatted XML text with every foldable node expanded
    #[inline]
    pub fn new<T: Into<Cow<'i, str>>>(text: T) -> Self {
        Self::with_classifier(text, TagScanner)
    }

    /// Builds a tree recognizing tags with the specified classifier
    pub fn with_classifier<T, C>(text: T, classifier: C) -> Self
    where
        T: Into<Cow<'i, str>>,
        C: LineClassifier,
    {
        let text = text.into();
        let layout = {
            let scanner = LineScanner::new(&text, classifier);
            let nodes = Layout::build(&scanner);
            Layout {
                lines: scanner.into_lines(),
                nodes,
            }
        };
        Self { text, layout }
    }

    /// The text this tree was built from
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Top-level nodes
    #[inline]
    pub fn nodes(&self) -> Children<'_> {
        Children {
            text: &self.text,
            layout: &self.layout,
            next: 0,
            end: self.layout.nodes.len(),
        }
    }

    /// Returns `true` if the text had no non-blank lines
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layout.nodes.is_empty()
    }

    /// Number of nodes at all levels, including hidden ones
    #[inline]
    pub fn node_count(&self) -> usize {
        self.layout.nodes.len()
    }

    /// Returns the node at the specified path, if it is visible
    pub fn get(&self, path: &[usize]) -> Option<FoldNode<'_>> {
        let (first, rest) = path.split_first()?;
        let mut node = self.nodes().nth(*first)?;
        for &index in rest {
            node = node.children().nth(index)?;
        }
        Some(node)
    }

    /// Returns the node with the specified identifier, if it is visible
    pub fn node(&self, id: NodeId) -> Option<FoldNode<'_>> {
        if id.0 >= self.layout.nodes.len() || !self.layout.is_visible(id.0) {
            return None;
        }
        Some(FoldNode {
            text: &self.text,
            layout: &self.layout,
            id: id.0,
        })
    }

    /// Returns the path of a visible node, suitable for [`get`](Self::get)
    pub fn path(&self, id: NodeId) -> Option<Vec<usize>> {
        self.node(id)?;
        let nodes = &self.layout.nodes;
        let mut path = Vec::new();
        let mut current = id.0;
        loop {
            let parent = nodes[current].parent;
            let mut sibling = parent.map_or(0, |parent| parent + 1);
            let mut index = 0;
            while sibling != current {
                sibling = nodes[sibling].end;
                index += 1;
            }
            path.push(index);
            match parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        path.reverse();
        Some(path)
    }

    /// Toggles the node at the specified path.
    ///
    /// Returns `false` if there is no visible foldable node at that path.
    pub fn toggle(&mut self, path: &[usize]) -> bool {
        match self.get(path).map(|node| node.id) {
            Some(id) => self.toggle_at(id),
            None => false,
        }
    }

    /// Toggles the node with the specified identifier.
    ///
    /// Returns `false` if the node is hidden or is not foldable.
    pub fn toggle_node(&mut self, id: NodeId) -> bool {
        match self.node(id) {
            Some(_) => self.toggle_at(id.0),
            None => false,
        }
    }

    /// Expands the collapsed node at the specified path. All nodes inside it
    /// are shown expanded.
    ///
    /// Returns `true` if the state was changed.
    pub fn expand(&mut self, path: &[usize]) -> bool {
        match self.get(path).map(|node| node.id) {
            Some(id) => self.expand_at(id),
            None => false,
        }
    }

    /// Collapses the expanded node at the specified path.
    ///
    /// Returns `true` if the state was changed.
    pub fn collapse(&mut self, path: &[usize]) -> bool {
        match self.get(path).map(|node| node.id) {
            Some(id) => self.collapse_at(id),
            None => false,
        }
    }

    fn toggle_at(&mut self, id: usize) -> bool {
        match self.layout.state(id) {
            FoldState::Leaf => false,
            FoldState::Collapsed => self.expand_at(id),
            FoldState::Expanded => self.collapse_at(id),
        }
    }

    fn expand_at(&mut self, id: usize) -> bool {
        if self.layout.state(id) != FoldState::Collapsed {
            return false;
        }
        // Descendants start over in the initial state
        let end = self.layout.nodes[id].end;
        for node in &mut self.layout.nodes[id..end] {
            node.collapsed = false;
        }
        true
    }

    fn collapse_at(&mut self, id: usize) -> bool {
        if self.layout.state(id) != FoldState::Expanded {
            return false;
        }
        self.layout.nodes[id].collapsed = true;
        true
    }

    /// Ensures that all data is owned to extend the object's lifetime if necessary.
    pub fn into_owned(self) -> FoldTree<'static> {
        FoldTree {
            text: Cow::Owned(self.text.into_owned()),
            layout: self.layout,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
