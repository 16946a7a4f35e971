//! Skill definition types
//!
//! Each skill is a folder containing SKILL.md with YAML frontmatter. Metadata
//! is always loaded; content and tools are materialized on demand.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, SkillError};
use crate::tools::ToolHandle;

/// Maximum allowed name length (Agent Skills format)
pub const MAX_NAME_LENGTH: usize = 64;
/// Maximum allowed description length (Agent Skills format)
pub const MAX_DESCRIPTION_LENGTH: usize = 1024;

/// Where a skill was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillSource {
    /// Shipped with an installed package
    Builtin,
    /// Personal skills under the home directory
    User,
    /// Skills living in the current project
    Project,
}

impl SkillSource {
    /// Lowercase tag for this source
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SkillSource::Builtin => "builtin",
            SkillSource::User => "user",
            SkillSource::Project => "project",
        }
    }
}

impl fmt::Display for SkillSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lightweight skill descriptor, frozen after construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillMetadata {
    name: String,
    description: String,
    has_tools: bool,
    source: SkillSource,
    path: PathBuf,
}

impl SkillMetadata {
    /// Validate fields and resolve `path` to an absolute, symlink-free directory
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        has_tools: bool,
        source: SkillSource,
        path: &Path,
    ) -> Result<Self> {
        let name = name.into();
        let description = description.into();
        validate_name(&name)?;
        validate_description(&name, &description)?;

        let path = path.canonicalize().map_err(|e| SkillError::io(path, e))?;
        if !path.is_dir() {
            return Err(SkillError::InvalidMetadata(format!(
                "Skill path {} is not a directory",
                path.display()
            )));
        }

        Ok(Self {
            name,
            description,
            has_tools,
            source,
            path,
        })
    }

    /// Skill name (lowercase letters, numbers, hyphens)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What the skill does and when to use it
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the skill ships a tool manifest
    pub fn has_tools(&self) -> bool {
        self.has_tools
    }

    /// Which root the skill came from
    pub fn source(&self) -> SkillSource {
        self.source
    }

    /// Absolute path to the skill directory
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Declared parameter of a skill's instructions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillArgument {
    /// Argument name
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Whether the caller must supply it
    #[serde(default)]
    pub required: bool,
    /// Value used when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Full skill body, loaded on demand
#[derive(Debug, Clone, Serialize)]
pub struct SkillContent {
    /// Markdown instructions from the SKILL.md body
    pub instructions: String,
    /// Directory relative resource paths resolve against
    pub base_path: PathBuf,
    /// Declared instruction arguments, in document order
    pub arguments: Vec<SkillArgument>,
    /// Resource files relative to `base_path`, sorted
    pub resources: Vec<String>,
}

/// Tool bundled with a skill
#[derive(Debug, Clone, Serialize)]
pub struct SkillTool {
    /// Namespaced name: `<skill>__<function>`
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON Schema for the tool's input
    pub parameters: Value,
    /// Registered function backing the tool
    #[serde(skip)]
    pub handle: ToolHandle,
}

impl SkillTool {
    /// Names listed as required in the parameter schema
    pub fn required_parameters(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Schema entry for one parameter
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get("properties").and_then(|p| p.get(name))
    }

    /// Call the tool, filling schema defaults and checking required arguments
    pub fn invoke(&self, args: Value) -> anyhow::Result<Value> {
        let mut args = match args {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(SkillError::InvalidArgument {
                    tool: self.name.clone(),
                    reason: format!("expected an object, got {other}"),
                }
                .into())
            }
        };

        if let Some(properties) = self.parameters.get("properties").and_then(Value::as_object) {
            for (name, schema) in properties {
                if let Some(default) = schema.get("default") {
                    args.entry(name.clone()).or_insert_with(|| default.clone());
                }
            }
        }

        if let Some(missing) = self
            .required_parameters()
            .into_iter()
            .find(|name| !args.contains_key(*name))
        {
            return Err(SkillError::InvalidArgument {
                tool: self.name.clone(),
                reason: format!("missing required argument '{missing}'"),
            }
            .into());
        }

        self.handle.call(&Value::Object(args))
    }
}

/// A complete skill with metadata, and content once loaded
#[derive(Debug, Clone, Serialize)]
pub struct Skill {
    /// Skill metadata
    pub metadata: SkillMetadata,
    /// Full content (loaded on demand)
    pub content: Option<SkillContent>,
    /// Bundled tools (loaded with content)
    pub tools: Vec<SkillTool>,
}

impl Skill {
    /// Metadata-only skill (discovery phase)
    pub fn from_metadata(metadata: SkillMetadata) -> Self {
        Self {
            metadata,
            content: None,
            tools: Vec::new(),
        }
    }

    /// Get the skill name
    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    /// Get the skill description
    pub fn description(&self) -> &str {
        self.metadata.description()
    }

    /// Look up a bundled tool by its namespaced name
    pub fn tool(&self, name: &str) -> Option<&SkillTool> {
        self.tools.iter().find(|t| t.name == name)
    }
}

/// Validate skill name: non-empty, bounded, lowercase letters/numbers/hyphens
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SkillError::InvalidMetadata(
            "Skill name cannot be empty".to_string(),
        ));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(SkillError::InvalidMetadata(format!(
            "Skill name '{name}' exceeds {MAX_NAME_LENGTH} characters"
        )));
    }

    // Name should be lowercase letters, numbers, and hyphens only
    let name_re = Regex::new(r"^[a-z0-9-]+$").map_err(|e| {
        SkillError::InvalidMetadata(format!("Failed to compile name validation regex: {e}"))
    })?;

    if !name_re.is_match(name) {
        return Err(SkillError::InvalidMetadata(format!(
            "Skill name '{name}' must contain only lowercase letters, numbers, and hyphens"
        )));
    }

    Ok(())
}

fn validate_description(name: &str, description: &str) -> Result<()> {
    if description.is_empty() {
        return Err(SkillError::InvalidMetadata(format!(
            "Skill '{name}' description cannot be empty"
        )));
    }

    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(SkillError::InvalidMetadata(format!(
            "Skill '{name}' description exceeds {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }

    Ok(())
}
