//! End-to-end view tests: JSON view in, rows out

use serde_json::{json, Value};

mod test_support;
use test_support::{keys, rows, rows_for_all, rows_with_options, values};

// 2024-01-05T13:07:09.123Z
const CREATED_AT: i64 = 1_704_460_029_123;

// ============================================================================
// Access patterns
// ============================================================================

#[test]
fn test_property_by_name() {
    let docs = [
        json!({"_id": "a", "foo": "bar"}),
        json!({"_id": "b", "foo": "baz"}),
        json!({"_id": "c", "foo": "bar"}),
    ];
    let rows = rows_for_all(json!({"key": "foo", "reduce": "_count"}), &docs);
    assert_eq!(keys(&rows), vec![json!("bar"), json!("baz"), json!("bar")]);
}

#[test]
fn test_nested_property_with_dot_access() {
    let docs = [
        json!({"_id": "a", "foo": {"bar": "baz"}}),
        json!({"_id": "b", "foo": "fizz"}),
        json!({"_id": "c", "foo": "buzz"}),
    ];
    let rows = rows_for_all(json!({"key": "foo.bar"}), &docs);
    // Unresolvable paths still emit, keyed by null.
    assert_eq!(keys(&rows), vec![json!("baz"), Value::Null, Value::Null]);
}

#[test]
fn test_escaped_dot_in_property_name() {
    let doc = json!({"foo.bar": "literal", "foo": {"bar": "nested"}});
    assert_eq!(keys(&rows(json!({"key": r"foo\.bar"}), doc.clone())), vec![json!("literal")]);
    assert_eq!(keys(&rows(json!({"key": "foo.bar"}), doc)), vec![json!("nested")]);
}

#[test]
fn test_value_pattern() {
    let rows = rows(
        json!({"key": "_id", "value": "stats.views"}),
        json!({"_id": "a", "stats": {"views": 12}}),
    );
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].key, json!("a"));
    assert_eq!(rows[0].value, json!(12));
}

// ============================================================================
// Transforms
// ============================================================================

#[test]
fn test_date_transform() {
    let rows = rows(
        json!({"key": {"access": "createdAt", "transform": "date"}}),
        json!({"createdAt": CREATED_AT}),
    );
    assert_eq!(keys(&rows), vec![json!(["2024", "01", "05"])]);
}

#[test]
fn test_time_and_datetime_transforms() {
    let doc = json!({"createdAt": CREATED_AT});
    let time = rows(json!({"key": {"access": "createdAt", "transform": "time"}}), doc.clone());
    assert_eq!(keys(&time), vec![json!(["13", "07", "09", "123"])]);

    let datetime = rows(
        json!({"key": {"access": "createdAt", "transform": "datetime"}}),
        doc,
    );
    assert_eq!(
        keys(&datetime),
        vec![json!(["2024", "01", "05", "13", "07", "09", "123"])]
    );
}

#[test]
fn test_minute_transform_and_legacy_mode() {
    let spec = json!({"key": {"access": "createdAt", "transform": "minute"}});
    let doc = json!({"createdAt": CREATED_AT});

    assert_eq!(keys(&rows(spec.clone(), doc.clone())), vec![json!("07")]);

    let legacy = rows_with_options(
        spec,
        doc,
        jsonviews_engine::CompileOptions {
            legacy_minute: true,
        },
    );
    assert_eq!(keys(&legacy), vec![json!("13")]);
}

#[test]
fn test_flattened_date_in_composite_key() {
    let rows = rows(
        json!({
            "key": [
                "author",
                {"access": {"access": "createdAt", "transform": "year-month"}, "flatten": true}
            ]
        }),
        json!({"author": "kim", "createdAt": "2023-11-30T08:00:00Z"}),
    );
    assert_eq!(keys(&rows), vec![json!(["kim", "2023", "11"])]);
}

#[test]
fn test_invalid_timestamp_emits_null_key() {
    let rows = rows(
        json!({"key": {"access": "createdAt", "transform": "year"}}),
        json!({"createdAt": "whenever"}),
    );
    assert_eq!(keys(&rows), vec![Value::Null]);
}

#[test]
fn test_malformed_offset_does_not_disturb_other_documents() {
    let docs = [
        json!({"createdAt": "2024-01-05T10:00+a\u{e9}0"}),
        json!({"createdAt": CREATED_AT}),
    ];
    let rows = rows_for_all(
        json!({"key": {"access": "createdAt", "transform": "date"}}),
        &docs,
    );
    assert_eq!(keys(&rows), vec![Value::Null, json!(["2024", "01", "05"])]);
}

#[test]
fn test_words_splayed_into_rows() {
    let rows = rows(
        json!({
            "key": {"access": {"access": "title", "transform": "words"}, "splay": true},
            "value": "_id"
        }),
        json!({"_id": "post-1", "title": "Hermit Goblin's Guide"}),
    );
    assert_eq!(
        keys(&rows),
        vec![json!("hermit"), json!("goblin's"), json!("guide")]
    );
    assert!(values(&rows).iter().all(|v| v == "post-1"));
}

// ============================================================================
// Splay
// ============================================================================

#[test]
fn test_splay_lone_key() {
    let rows = rows(
        json!({"key": {"access": "tags", "splay": true}}),
        json!({"tags": ["a", "b", "c"]}),
    );
    assert_eq!(keys(&rows), vec![json!("a"), json!("b"), json!("c")]);
}

#[test]
fn test_splay_key_array() {
    let rows = rows(
        json!({"key": ["user", {"access": "tags", "splay": true}, "description"]}),
        json!({"user": "garbados", "tags": ["a", "b", "c"], "description": "hermit goblin"}),
    );
    assert_eq!(
        keys(&rows),
        vec![
            json!(["garbados", "a", "hermit goblin"]),
            json!(["garbados", "b", "hermit goblin"]),
            json!(["garbados", "c", "hermit goblin"]),
        ]
    );
}

#[test]
fn test_splay_values() {
    let rows = rows(
        json!({"key": "_id", "value": {"access": "tags", "splay": true}}),
        json!({"_id": "doc", "tags": ["a", "b", "c"]}),
    );
    assert_eq!(rows.len(), 3);
    assert!(keys(&rows).iter().all(|k| k == "doc"));
    assert_eq!(values(&rows), vec![json!("a"), json!("b"), json!("c")]);
}

#[test]
fn test_splay_keys_and_values_multiply() {
    let rows = rows(
        json!({
            "key": [{"access": "authors", "splay": true}],
            "value": {"access": "tags", "splay": true}
        }),
        json!({"authors": ["x", "y"], "tags": [1, 2, 3]}),
    );
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0].key, json!(["x"]));
    assert_eq!(rows[0].value, json!(1));
    assert_eq!(rows[5].key, json!(["y"]));
    assert_eq!(rows[5].value, json!(3));
}

#[test]
fn test_splay_empty_array_emits_nothing() {
    let rows = rows(
        json!({"key": ["user", {"access": "tags", "splay": true}]}),
        json!({"user": "x", "tags": []}),
    );
    assert!(rows.is_empty());
}

#[test]
fn test_splay_missing_array_emits_nothing() {
    let rows = rows(
        json!({"key": {"access": "tags", "splay": true}}),
        json!({"user": "x"}),
    );
    assert!(rows.is_empty());
}

// ============================================================================
// Emit guards
// ============================================================================

#[test]
fn test_guard_filters_documents() {
    let spec = json!({
        "key": [{"access": "type", "emit": true, "equals": "post"}, "createdAt"],
        "value": "_id"
    });
    let docs = [
        json!({"_id": "1", "type": "post", "createdAt": 3}),
        json!({"_id": "2", "type": "page", "createdAt": 1}),
        json!({"_id": "3", "type": "post", "createdAt": 2}),
    ];
    let rows = rows_for_all(spec, &docs);
    assert_eq!(keys(&rows), vec![json!([3]), json!([2])]);
    assert_eq!(values(&rows), vec![json!("1"), json!("3")]);
}

#[test]
fn test_inverted_truthiness_guard() {
    let spec = json!({
        "key": [{"access": "archived", "emit": true, "invert": true}, {"access": "tags", "splay": true}]
    });
    let docs = [
        json!({"archived": true, "tags": ["old"]}),
        json!({"archived": false, "tags": ["a", "b"]}),
        json!({"tags": ["c"]}),
    ];
    let rows = rows_for_all(spec, &docs);
    assert_eq!(keys(&rows), vec![json!(["a"]), json!(["b"]), json!(["c"])]);
}

#[test]
fn test_failing_guard_anywhere_suppresses_rows() {
    let rows = rows(
        json!({
            "key": [
                {"access": "tags", "splay": true},
                "user",
                {"access": "published", "emit": true}
            ]
        }),
        json!({"tags": ["a", "b"], "user": "x", "published": false}),
    );
    assert!(rows.is_empty());
}
