//! Serializable views of the registry for protocol bridges

use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::warn;

use crate::error::Result;
use crate::registry::SkillRegistry;
use crate::skill::{Skill, SkillArgument, SkillMetadata, SkillSource, SkillTool};

/// One entry of the skill listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillSummary {
    /// Unique skill identifier
    pub name: String,
    /// When and why to use the skill
    pub description: String,
    /// Whether the skill bundles tools
    pub has_tools: bool,
    /// Root the skill was discovered under
    pub source: SkillSource,
}

impl From<&SkillMetadata> for SkillSummary {
    fn from(metadata: &SkillMetadata) -> Self {
        Self {
            name: metadata.name().to_string(),
            description: metadata.description().to_string(),
            has_tools: metadata.has_tools(),
            source: metadata.source(),
        }
    }
}

/// Fully loaded skill as handed to an agent
#[derive(Debug, Clone, Serialize)]
pub struct SkillDetails {
    /// Skill name
    pub name: String,
    /// Markdown instructions
    pub instructions: String,
    /// Path for resolving relative references (scripts/, *.md)
    pub base_path: PathBuf,
    /// Resource files relative to `base_path`
    pub resources: Vec<String>,
    /// Declared instruction arguments
    pub arguments: Vec<SkillArgument>,
    /// Namespaced names of the bundled tools
    pub available_tool_names: Vec<String>,
}

impl SkillDetails {
    /// Build details from a fully loaded skill, `None` without content
    pub fn from_skill(skill: &Skill) -> Option<Self> {
        let content = skill.content.as_ref()?;
        Some(Self {
            name: skill.name().to_string(),
            instructions: content.instructions.clone(),
            base_path: content.base_path.clone(),
            resources: content.resources.clone(),
            arguments: content.arguments.clone(),
            available_tool_names: skill.tools.iter().map(|t| t.name.clone()).collect(),
        })
    }
}

/// Tool definition as republished by a bridge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    /// Namespaced tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON Schema for the input
    #[serde(rename = "inputSchema")]
    pub parameters: Value,
}

impl SkillTool {
    /// Protocol-facing definition of this tool
    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
        }
    }
}

impl SkillRegistry {
    /// Summaries of every discovered skill, ordered by name
    pub fn catalog(&self) -> Vec<SkillSummary> {
        self.list_skills().into_iter().map(SkillSummary::from).collect()
    }

    /// Load a skill and describe it, `Ok(None)` when unknown
    pub fn describe(&self, name: &str) -> Result<Option<SkillDetails>> {
        Ok(self
            .get_skill(name)?
            .as_ref()
            .and_then(SkillDetails::from_skill))
    }

    /// Instructions to publish as a prompt, or a not-found message
    pub fn prompt(&self, name: &str) -> Result<String> {
        match self.describe(name)? {
            Some(details) => Ok(details.instructions),
            None => {
                let _enter = self.span().enter();
                warn!("Prompt requested for unknown skill '{}'", name);
                Ok(format!("Skill '{name}' not found or has no content."))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::tools::ToolHandle;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn registry_with_skill() -> (TempDir, SkillRegistry) {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("notes");
        fs::create_dir_all(dir.join("resources")).unwrap();
        fs::write(
            dir.join("SKILL.md"),
            "---\nname: notes\ndescription: Take notes\n---\n# Notes\n",
        )
        .unwrap();
        fs::write(dir.join("resources/template.md"), "- item").unwrap();

        let mut registry = SkillRegistry::default()
            .with_home(None)
            .add_directory(temp.path());
        registry.discover();
        (temp, registry)
    }

    #[test]
    fn test_catalog_lists_summaries() {
        let (_temp, registry) = registry_with_skill();
        assert_eq!(
            registry.catalog(),
            vec![SkillSummary {
                name: "notes".to_string(),
                description: "Take notes".to_string(),
                has_tools: false,
                source: SkillSource::Project,
            }]
        );
    }

    #[test]
    fn test_describe_known_and_unknown() {
        let (_temp, registry) = registry_with_skill();

        let details = registry.describe("notes").unwrap().unwrap();
        assert_eq!(details.instructions, "# Notes");
        assert_eq!(details.resources, vec!["resources/template.md"]);
        assert!(details.available_tool_names.is_empty());

        assert!(registry.describe("nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_prompt_text() {
        let (_temp, registry) = registry_with_skill();
        assert_eq!(registry.prompt("notes").unwrap(), "# Notes");
        assert_eq!(
            registry.prompt("ghost").unwrap(),
            "Skill 'ghost' not found or has no content."
        );
    }

    #[test]
    fn test_tool_descriptor_wire_shape() {
        let tool = SkillTool {
            name: "notes__append".to_string(),
            description: "Append a note".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {"text": {"type": "string"}},
                "required": ["text"]
            }),
            handle: ToolHandle::new(|_: &Value| Ok(Value::Null)),
        };

        let descriptor = tool.descriptor();
        assert_eq!(descriptor.name, "notes__append");
        assert_eq!(descriptor.parameters, tool.parameters);

        let wire = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(
            wire,
            json!({
                "name": "notes__append",
                "description": "Append a note",
                "inputSchema": {
                    "type": "object",
                    "properties": {"text": {"type": "string"}},
                    "required": ["text"]
                }
            })
        );
        assert!(wire.get("parameters").is_none());
    }

    #[test]
    fn test_summary_serialization() {
        let (_temp, registry) = registry_with_skill();
        let json = serde_json::to_value(registry.catalog()).unwrap();
        assert_eq!(json[0]["source"], "project");
        assert_eq!(json[0]["has_tools"], false);
    }
}
