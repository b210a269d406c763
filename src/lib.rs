//! XML pretty-printer with a foldable element tree.
//!
//! # Description
//!
//! xml-fold turns raw XML text into consistently indented text and offers a
//! foldable view over the result, in which each multi-line element can be
//! collapsed to its opening and closing tags.
//!
//! The work is split into several steps:
//!
//! - [`format`]: pretty-prints raw XML using [quick-xml]. This is the only step
//!   that can fail, with a [`FormatError`];
//! - [`Segmenter`]: splits formatted text into [`Segment`]s, each one either a
//!   single line or a whole element from its opening to its closing tag. Tags
//!   are recognized line by line by a [`LineClassifier`];
//! - [`FoldTree`]: builds foldable nodes from segments and keeps the
//!   collapsed/expanded state of each of them;
//! - [`render`]: flattens the visible part of a tree into lines to display;
//! - [`Session`]: connects everything for an interactive editor, deferring
//!   formatting passes with a [`Debouncer`] until the input stops changing.
//!
//! # Example
//!
//! ```
//! # use pretty_assertions::assert_eq;
//! use xml_fold::{format, FoldTree};
//!
//! let formatted = format("<list><item>1</item><item><value>2</value></item></list>").unwrap();
//! let mut tree = FoldTree::new(&formatted);
//! tree.toggle(&[0, 1]);
//!
//! assert_eq!(tree.to_string(), "\
//! ▾ <list>
//!     <item>1</item>
//!   ▸ <item>...</item>
//!   </list>");
//! ```
//!
//! # Features
//!
//! `xml-fold` supports the following features:
//!
//! [quick-xml]: https://docs.rs/quick-xml
//! [`render`]: crate::render::render
#![cfg_attr(
    feature = "document-features",
    cfg_attr(doc, doc = ::document_features::document_features!(
        feature_label = "<a id=\"{feature}\" href=\"#{feature}\"><strong><code>{feature}</code></strong></a>"
    ))
)]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
// Enable feature requirements in the docs from 1.57
// See https://stackoverflow.com/questions/61417452
// docs.rs defines `docsrs` when building documentation
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod classify;
pub mod debounce;
pub mod errors;
pub mod fold;
pub mod format;
pub mod render;
pub mod segment;
pub mod session;

// reexports
pub use crate::classify::{LineClassifier, TagScanner};
pub use crate::debounce::Debouncer;
pub use crate::errors::{FormatError, Result};
pub use crate::fold::{FoldNode, FoldState, FoldTree, NodeId};
pub use crate::format::{format, FormatConfig};
pub use crate::segment::{Segment, Segmenter};
pub use crate::session::Session;
