//! Utility functions for integration tests
// Not all tests use all helpers
#![allow(dead_code)]

use xml_fold::segment::Segment;
use xml_fold::{format, Segmenter};

/// Formats the XML and checks that the result is accepted by the formatter
/// again without changes
pub fn format_stable(raw: &str) -> String {
    // Log XML that we try to format to see it in the failed tests output
    dbg!(raw);
    let formatted = format(raw).unwrap();
    assert_eq!(format(&formatted).unwrap(), formatted, "formatting is not idempotent");
    formatted
}

/// Segments the text and checks that the segments cover all its non-blank lines
pub fn segment_checked(text: &str) -> Vec<Segment<'_>> {
    let segments: Vec<_> = Segmenter::new(text).collect();

    let expected: Vec<_> = text.split('\n').filter(|l| !l.trim().is_empty()).collect();
    let covered: Vec<_> = segments
        .iter()
        .flat_map(|s| s.content.split('\n').filter(|l| !l.trim().is_empty()))
        .collect();
    assert_eq!(covered, expected, "segments must cover all lines in order");

    segments
}

/// Number of leading spaces of a line
pub fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}
