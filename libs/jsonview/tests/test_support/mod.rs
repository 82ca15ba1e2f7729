#![allow(dead_code)]

use jsonviews_engine::{CompileOptions, Row, ViewCompiler};
use serde_json::Value;

/// Compile `spec` with default options and run it over `doc`.
pub fn rows(spec: Value, doc: Value) -> Vec<Row> {
    rows_with_options(spec, doc, CompileOptions::default())
}

pub fn rows_with_options(spec: Value, doc: Value, options: CompileOptions) -> Vec<Row> {
    ViewCompiler::new(options)
        .compile_json(&spec)
        .unwrap_or_else(|e| panic!("failed to compile {}: {}", spec, e))
        .index
        .rows(&doc)
}

/// Run `spec` over every document, concatenating rows in document order.
pub fn rows_for_all(spec: Value, docs: &[Value]) -> Vec<Row> {
    let view = ViewCompiler::default()
        .compile_json(&spec)
        .unwrap_or_else(|e| panic!("failed to compile {}: {}", spec, e));
    docs.iter().flat_map(|doc| view.index.rows(doc)).collect()
}

pub fn keys(rows: &[Row]) -> Vec<Value> {
    rows.iter().map(|row| row.key.clone()).collect()
}

pub fn values(rows: &[Row]) -> Vec<Value> {
    rows.iter().map(|row| row.value.clone()).collect()
}
