//! Tool registration table
//!
//! Skills do not carry executable code. A skill's `tools.yaml` lists function
//! names, and each name resolves to a Rust function registered here at startup.
//! Registrations carry a declared [`Signature`] that [`infer_parameters`] turns
//! into a JSON Schema, or an explicit schema set with
//! [`ToolRegistration::declare`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A callable bundled with a skill
pub trait SkillFunction: Send + Sync {
    /// Execute with a JSON object of arguments
    fn call(&self, args: &Value) -> anyhow::Result<Value>;
}

impl<F> SkillFunction for F
where
    F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync,
{
    fn call(&self, args: &Value) -> anyhow::Result<Value> {
        self(args)
    }
}

/// Shared reference to a registered function
#[derive(Clone)]
pub struct ToolHandle {
    function: Arc<dyn SkillFunction>,
}

impl ToolHandle {
    /// Wrap a closure or fn item
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            function: Arc::new(function),
        }
    }

    /// Call the underlying function
    pub fn call(&self, args: &Value) -> anyhow::Result<Value> {
        self.function.call(args)
    }
}

impl fmt::Debug for ToolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolHandle").finish_non_exhaustive()
    }
}

/// One declared parameter of a function signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Declared type spelling, e.g. `str`, `int`, `Vec`
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    /// Default value; a present `null` still counts as a default
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Ordered parameter list of a function
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature {
    /// Parameters in declaration order
    pub params: Vec<Param>,
}

impl Signature {
    /// Append a parameter without a default
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, annotation: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            annotation: Some(annotation.into()),
            default: None,
        });
        self
    }

    /// Append a parameter with a default
    #[must_use]
    pub fn param_with_default(
        mut self,
        name: impl Into<String>,
        annotation: impl Into<String>,
        default: Value,
    ) -> Self {
        self.params.push(Param {
            name: name.into(),
            annotation: Some(annotation.into()),
            default: Some(default),
        });
        self
    }
}

/// Type spellings mapped to JSON Schema primitive kinds
const TYPE_MAP: &[(&str, &str)] = &[
    ("str", "string"),
    ("string", "string"),
    ("String", "string"),
    ("&str", "string"),
    ("int", "integer"),
    ("integer", "integer"),
    ("i32", "integer"),
    ("i64", "integer"),
    ("isize", "integer"),
    ("u32", "integer"),
    ("u64", "integer"),
    ("usize", "integer"),
    ("float", "number"),
    ("number", "number"),
    ("f32", "number"),
    ("f64", "number"),
    ("bool", "boolean"),
    ("boolean", "boolean"),
    ("list", "array"),
    ("array", "array"),
    ("Vec", "array"),
    ("dict", "object"),
    ("object", "object"),
    ("map", "object"),
    ("HashMap", "object"),
    ("BTreeMap", "object"),
];

const DEFAULT_JSON_TYPE: &str = "string";

/// Receiver parameters that never appear in a schema
const RECEIVERS: &[&str] = &["self", "cls"];

/// Map a declared type spelling to a JSON Schema type
pub fn json_type(annotation: &str) -> &'static str {
    TYPE_MAP
        .iter()
        .find(|(spelling, _)| *spelling == annotation.trim())
        .map_or(DEFAULT_JSON_TYPE, |(_, kind)| *kind)
}

/// Build a JSON Schema object from a declared signature
pub fn infer_parameters(signature: &Signature) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in &signature.params {
        if RECEIVERS.contains(&param.name.as_str()) {
            continue;
        }

        let kind = param.annotation.as_deref().map_or(DEFAULT_JSON_TYPE, json_type);
        let mut property = Map::new();
        property.insert("type".to_string(), json!(kind));

        match &param.default {
            Some(default) => {
                property.insert("default".to_string(), default.clone());
            }
            None => required.push(Value::String(param.name.clone())),
        }

        properties.insert(param.name.clone(), Value::Object(property));
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Explicit tool metadata that bypasses inference
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDeclaration {
    /// Description overriding the function doc
    pub description: Option<String>,
    /// Parameter schema used verbatim
    pub parameters: Value,
}

/// A function registered in the [`ToolTable`]
#[derive(Debug, Clone)]
pub struct ToolRegistration {
    handle: ToolHandle,
    doc: Option<String>,
    signature: Signature,
    declaration: Option<ToolDeclaration>,
}

impl ToolRegistration {
    /// Attach a documentation string
    pub fn doc(&mut self, doc: impl Into<String>) -> &mut Self {
        self.doc = Some(doc.into());
        self
    }

    /// Declare a parameter without a default
    pub fn param(&mut self, name: impl Into<String>, annotation: impl Into<String>) -> &mut Self {
        self.signature = std::mem::take(&mut self.signature).param(name, annotation);
        self
    }

    /// Declare a parameter with a default
    pub fn param_with_default(
        &mut self,
        name: impl Into<String>,
        annotation: impl Into<String>,
        default: Value,
    ) -> &mut Self {
        self.signature =
            std::mem::take(&mut self.signature).param_with_default(name, annotation, default);
        self
    }

    /// Mark as an explicit tool with a verbatim schema
    pub fn declare(&mut self, description: Option<String>, parameters: Value) -> &mut Self {
        self.declaration = Some(ToolDeclaration {
            description,
            parameters,
        });
        self
    }

    /// Registered function
    pub fn handle(&self) -> &ToolHandle {
        &self.handle
    }

    /// Documentation string, if any
    pub fn documentation(&self) -> Option<&str> {
        self.doc.as_deref().filter(|d| !d.trim().is_empty())
    }

    /// Declared signature
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Explicit declaration, if any
    pub fn declaration(&self) -> Option<&ToolDeclaration> {
        self.declaration.as_ref()
    }
}

/// Startup-time table of functions skills can expose as tools
///
/// Keys are conventionally `<skill-name>/<function>`.
#[derive(Debug, Clone, Default)]
pub struct ToolTable {
    entries: BTreeMap<String, ToolRegistration>,
}

impl ToolTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding the functions behind the bundled skills
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        crate::builtin::register(&mut table);
        table
    }

    /// Register a closure or fn item under `key`, replacing any previous entry
    pub fn register<F>(&mut self, key: impl Into<String>, function: F) -> &mut ToolRegistration
    where
        F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.register_handle(key, ToolHandle::new(function))
    }

    /// Register an existing handle under `key`
    pub fn register_handle(
        &mut self,
        key: impl Into<String>,
        handle: ToolHandle,
    ) -> &mut ToolRegistration {
        let registration = ToolRegistration {
            handle,
            doc: None,
            signature: Signature::default(),
            declaration: None,
        };
        match self.entries.entry(key.into()) {
            Entry::Occupied(mut entry) => {
                entry.insert(registration);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(registration),
        }
    }

    /// Look up a registration
    pub fn get(&self, key: &str) -> Option<&ToolRegistration> {
        self.entries.get(key)
    }

    /// Whether `key` is registered
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of registrations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
