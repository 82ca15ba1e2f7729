//! Design document and view definition models

use jsonviews_engine::ViewSpec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DESIGN_PREFIX: &str = "_design/";

pub fn design_doc_id(group: &str) -> String {
    format!("{}{}", DESIGN_PREFIX, group)
}

/// A persisted view: the declarative patterns plus the opaque reduce.
///
/// Stored as `{ "map": { "key": ..., "value": ... }, "reduce": ... }`. The index engine
/// compiles `map` with a `ViewCompiler` when it loads the design document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawViewDefinition", into = "RawViewDefinition")]
pub struct ViewDefinition {
    pub spec: ViewSpec,
}

#[derive(Serialize, Deserialize)]
struct RawViewDefinition {
    map: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reduce: Option<Value>,
}

impl TryFrom<RawViewDefinition> for ViewDefinition {
    type Error = jsonviews_engine::Error;

    fn try_from(raw: RawViewDefinition) -> Result<Self, Self::Error> {
        let mut spec = ViewSpec::from_json(&raw.map)?;
        spec.reduce = raw.reduce.filter(|r| !r.is_null());
        Ok(Self { spec })
    }
}

impl From<ViewDefinition> for RawViewDefinition {
    fn from(def: ViewDefinition) -> Self {
        Self {
            map: def.spec.patterns_json(),
            reduce: def.spec.reduce,
        }
    }
}

impl From<ViewSpec> for ViewDefinition {
    fn from(spec: ViewSpec) -> Self {
        Self { spec }
    }
}

impl ViewDefinition {
    pub fn to_json(&self) -> Value {
        let raw = RawViewDefinition::from(self.clone());
        let mut obj = Map::new();
        obj.insert("map".into(), raw.map);
        if let Some(reduce) = raw.reduce {
            obj.insert("reduce".into(), reduce);
        }
        Value::Object(obj)
    }
}

/// `_design/<group>` document.
///
/// Views are kept as raw JSON so entries written by other tools survive a round trip;
/// fields other than `_id`, `_rev` and `views` are preserved as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default)]
    pub views: Map<String, Value>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl DesignDocument {
    /// A bare, never-stored design document.
    pub fn new(group: &str) -> Self {
        Self {
            id: design_doc_id(group),
            rev: None,
            views: Map::new(),
            other: Map::new(),
        }
    }

    pub fn group(&self) -> &str {
        self.id.strip_prefix(DESIGN_PREFIX).unwrap_or(&self.id)
    }

    pub fn has_view(&self, name: &str) -> bool {
        self.views.contains_key(name)
    }

    /// Parse a stored view. `None` when absent.
    pub fn view(&self, name: &str) -> Option<Result<ViewDefinition, serde_json::Error>> {
        self.views
            .get(name)
            .map(|raw| serde_json::from_value(raw.clone()))
    }
}
