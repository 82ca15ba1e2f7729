//! View compilation
//!
//! Packages a [`ViewSpec`] into a self-contained index function. The function captures
//! the pattern tree by value and touches nothing but the document and the sink it is
//! given, so it can be cloned onto other threads and run per document by whatever
//! engine maintains the index.

use crate::error::Result;
use crate::interpret::Interpreter;
use crate::pattern::{KeyPattern, ViewSpec};
use crate::rows::{self, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Reproduce historical output where the `minute` transform yields the hour.
    #[serde(default)]
    pub legacy_minute: bool,
}

/// Receives rows in generation order.
pub trait EmitSink {
    fn emit(&mut self, key: Value, value: Value);
}

impl<F> EmitSink for F
where
    F: FnMut(Value, Value),
{
    fn emit(&mut self, key: Value, value: Value) {
        self(key, value)
    }
}

impl EmitSink for Vec<Row> {
    fn emit(&mut self, key: Value, value: Value) {
        self.push(Row::new(key, value));
    }
}

type IndexFn = dyn Fn(&Value, &mut dyn EmitSink) + Send + Sync;

/// Executable per-document index logic.
#[derive(Clone)]
pub struct IndexFunction {
    inner: Arc<IndexFn>,
}

impl IndexFunction {
    /// Evaluate `document`, calling `sink` once per row.
    pub fn run<S: EmitSink>(&self, document: &Value, sink: &mut S) {
        (self.inner)(document, sink)
    }

    /// Evaluate `document` and collect its rows.
    pub fn rows(&self, document: &Value) -> Vec<Row> {
        let mut rows = Vec::new();
        self.run(document, &mut rows);
        rows
    }
}

impl fmt::Debug for IndexFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexFunction").finish_non_exhaustive()
    }
}

/// Compiler output: the index function plus the uninterpreted reduce definition.
#[derive(Debug, Clone)]
pub struct CompiledView {
    pub index: IndexFunction,
    pub reduce: Option<Value>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ViewCompiler {
    options: CompileOptions,
}

impl ViewCompiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn compile(&self, spec: &ViewSpec) -> CompiledView {
        let key_parts = match &spec.key {
            KeyPattern::Single(_) => 1,
            KeyPattern::Composite(parts) => parts.len(),
        };
        tracing::debug!(
            key_parts,
            has_value = spec.value.is_some(),
            has_reduce = spec.reduce.is_some(),
            legacy_minute = self.options.legacy_minute,
            "Compiling view"
        );

        let key = spec.key.clone();
        let value = spec.value.clone();
        let options = self.options;

        let index = move |document: &Value, sink: &mut dyn EmitSink| {
            let interpreter = Interpreter::new(document, &options);
            let key = interpreter.interpret_key(&key);
            let value = value.as_ref().map(|pattern| interpreter.interpret(pattern));
            for row in rows::generate(key, value) {
                sink.emit(row.key, row.value);
            }
        };

        CompiledView {
            index: IndexFunction {
                inner: Arc::new(index),
            },
            reduce: spec.reduce.clone(),
        }
    }

    /// Parse a JSON view definition and compile it.
    pub fn compile_json(&self, spec: &Value) -> Result<CompiledView> {
        let spec = ViewSpec::from_json(spec)?;
        Ok(self.compile(&spec))
    }
}

/// Compile with default options.
pub fn compile(spec: &ViewSpec) -> CompiledView {
    ViewCompiler::default().compile(spec)
}
