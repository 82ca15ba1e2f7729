//! Pattern interpretation
//!
//! Composes path resolution and value transforms over a pattern tree. Pure: the
//! document is only borrowed, and identical inputs always give identical results.

use crate::compiler::CompileOptions;
use crate::path;
use crate::pattern::{KeyPattern, Pattern};
use crate::rows::InterpretedKey;
use crate::transform::transform;
use crate::value::InterpretedValue;
use serde_json::Value;

/// Evaluates patterns against one document.
#[derive(Debug, Clone, Copy)]
pub struct Interpreter<'a> {
    document: &'a Value,
    options: &'a CompileOptions,
}

impl<'a> Interpreter<'a> {
    pub fn new(document: &'a Value, options: &'a CompileOptions) -> Self {
        Self { document, options }
    }

    pub fn interpret(&self, pattern: &Pattern) -> InterpretedValue {
        match pattern {
            Pattern::Path(path) => {
                InterpretedValue::from_resolved(path::resolve(self.document, path))
            }
            Pattern::Access(access) => {
                let inner = self.interpret(&access.access);
                transform(access, inner, self.options)
            }
        }
    }

    pub fn interpret_key(&self, key: &KeyPattern) -> InterpretedKey {
        match key {
            KeyPattern::Single(pattern) => InterpretedKey::Single(self.interpret(pattern)),
            KeyPattern::Composite(parts) => {
                InterpretedKey::Composite(parts.iter().map(|p| self.interpret(p)).collect())
            }
        }
    }
}

/// Interpret a single pattern with default options.
pub fn interpret(document: &Value, pattern: &Pattern) -> InterpretedValue {
    Interpreter::new(document, &CompileOptions::default()).interpret(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{AccessPattern, TransformKind};
    use serde_json::json;

    #[test]
    fn test_bare_path_is_plain() {
        let doc = json!({"foo": {"bar": [1, 2]}});
        assert_eq!(
            interpret(&doc, &"foo.bar".into()),
            InterpretedValue::Plain(json!([1, 2]))
        );
        assert_eq!(interpret(&doc, &"foo.baz".into()), InterpretedValue::Missing);
    }

    #[test]
    fn test_access_without_modifiers_is_plain() {
        let doc = json!({"foo": "bar"});
        let pattern: Pattern = AccessPattern::new("foo").into();
        assert_eq!(interpret(&doc, &pattern), InterpretedValue::Plain(json!("bar")));
    }

    #[test]
    fn test_nested_descriptors_compose() {
        let doc = json!({"events": ["2024-01-05T10:00:00Z", "2023-06-01"]});
        // Outer splay applies to the inner value after it is resolved.
        let pattern: Pattern = AccessPattern::new(AccessPattern::new("events")).splay().into();
        assert_eq!(
            interpret(&doc, &pattern),
            InterpretedValue::Fanout(vec![json!("2024-01-05T10:00:00Z"), json!("2023-06-01")])
        );

        let doc = json!({"createdAt": "2024-01-05T10:00:00Z"});
        let pattern: Pattern = AccessPattern::new(
            AccessPattern::new("createdAt").transform(TransformKind::Date),
        )
        .flatten()
        .into();
        assert_eq!(
            interpret(&doc, &pattern),
            InterpretedValue::Flattenable(vec![json!("2024"), json!("01"), json!("05")])
        );
    }

    #[test]
    fn test_interpretation_leaves_document_untouched() {
        let doc = json!({"tags": ["a", "b"], "body": "Some Words"});
        let before = doc.clone();
        let _ = interpret(&doc, &AccessPattern::new("tags").splay().into());
        let _ = interpret(
            &doc,
            &AccessPattern::new("body")
                .transform(TransformKind::Words)
                .into(),
        );
        assert_eq!(doc, before);
    }
}
