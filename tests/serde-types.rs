use pretty_assertions::assert_eq;
use serde_value::Value;
use std::collections::BTreeMap;
use xml_fold::fold::FoldState;
use xml_fold::render::{render, Control};
use xml_fold::segment::Segment;
use xml_fold::{FoldTree, FormatConfig};

fn map<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::Map(
        entries
            .into_iter()
            .map(|(key, value)| (Value::String(key.to_string()), value))
            .collect::<BTreeMap<_, _>>(),
    )
}

#[test]
fn segment() {
    let value = serde_value::to_value(Segment::new("<a/>", 1)).unwrap();
    assert_eq!(
        value,
        map([
            ("content", Value::String("<a/>".into())),
            ("depth", Value::U64(1)),
        ])
    );
}

#[test]
fn control() {
    assert_eq!(
        serde_value::to_value(Control::Expand).unwrap(),
        Value::String("Expand".into())
    );
}

#[test]
fn fold_state() {
    assert_eq!(
        serde_value::to_value(FoldState::Collapsed).unwrap(),
        Value::String("Collapsed".into())
    );
}

#[test]
fn config() {
    let value = serde_value::to_value(FormatConfig::default()).unwrap();
    assert_eq!(
        value,
        map([
            ("indent_char", Value::U8(b' ')),
            ("indent_size", Value::U64(2)),
            ("line_separator", Value::String("\n".into())),
        ])
    );
}

#[test]
fn rendered_lines() {
    let mut tree = FoldTree::new("<a>\n  x\n</a>");
    tree.toggle(&[0]);
    let value = serde_value::to_value(render(&tree)).unwrap();
    assert_eq!(
        value,
        Value::Seq(vec![map([
            ("node", Value::U64(0)),
            ("level", Value::U64(0)),
            ("control", Value::Option(Some(Box::new(Value::String("Expand".into()))))),
            ("text", Value::String("<a>...</a>".into())),
        ])])
    );
}
