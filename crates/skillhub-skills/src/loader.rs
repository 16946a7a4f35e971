//! Skill loader for a single skill directory
//!
//! Progressive disclosure:
//! - Phase 1: `load_metadata` reads only the SKILL.md header
//! - Phase 2: `load_content` and `load_tools` materialize the rest on demand

use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Component, Path};
use std::sync::Arc;
use tracing::{debug, error, warn};
use walkdir::WalkDir;

use crate::error::{Result, SkillError};
use crate::frontmatter::Document;
use crate::skill::{Skill, SkillArgument, SkillContent, SkillMetadata, SkillSource, SkillTool};
use crate::tools::{infer_parameters, Signature, ToolTable};

/// Marker document identifying a skill directory
pub const SKILL_FILE: &str = "SKILL.md";
/// Companion manifest listing the skill's tools
pub const TOOLS_FILE: &str = "tools.yaml";
/// Subdirectories enumerated as resources
pub const RESOURCE_DIRS: &[&str] = &["scripts", "resources"];
/// Separator between skill name and function name in tool names
pub const TOOL_NAME_SEPARATOR: &str = "__";

/// Contents of `tools.yaml`
#[derive(Debug, Deserialize)]
struct ToolManifest {
    #[serde(default)]
    tools: Vec<ToolEntry>,
}

#[derive(Debug, Deserialize)]
struct ToolEntry {
    function: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    handler: Option<String>,
    #[serde(default)]
    parameters: Option<Signature>,
    #[serde(default)]
    schema: Option<Value>,
}

/// Loads skills from directories, resolving tools against a [`ToolTable`]
#[derive(Debug, Clone, Default)]
pub struct SkillLoader {
    tools: Arc<ToolTable>,
}

impl SkillLoader {
    /// Create a loader backed by `tools`
    pub fn new(tools: Arc<ToolTable>) -> Self {
        Self { tools }
    }

    /// Load only metadata (Phase 1: Discovery)
    ///
    /// Returns `None` for directories without SKILL.md and for malformed
    /// skills; the latter are logged and never abort the caller's scan.
    pub fn load_metadata(&self, skill_dir: &Path, source: SkillSource) -> Option<SkillMetadata> {
        let skill_file = skill_dir.join(SKILL_FILE);
        if !skill_file.is_file() {
            return None;
        }

        match read_metadata(skill_dir, &skill_file, source) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Error loading skill metadata from {:?}: {}", skill_dir, e);
                None
            }
        }
    }

    /// Load the full content of a skill (Phase 2: Activation)
    ///
    /// Assumes `skill_dir` already passed [`SkillLoader::load_metadata`].
    pub fn load_content(&self, skill_dir: &Path) -> Result<SkillContent> {
        let document = read_document(&skill_dir.join(SKILL_FILE))?;
        let arguments: Vec<SkillArgument> = document.field("arguments")?.unwrap_or_default();

        let base_path = skill_dir
            .canonicalize()
            .map_err(|e| SkillError::io(skill_dir, e))?;
        let resources = discover_resources(&base_path)?;

        Ok(SkillContent {
            instructions: document.body().to_string(),
            base_path,
            arguments,
            resources,
        })
    }

    /// Resolve the tools listed in `tools.yaml`
    ///
    /// An unreadable or malformed manifest yields no tools.
    pub fn load_tools(&self, skill_dir: &Path, skill_name: &str) -> Vec<SkillTool> {
        let manifest_path = skill_dir.join(TOOLS_FILE);
        if !manifest_path.is_file() {
            return Vec::new();
        }

        let manifest = match read_manifest(&manifest_path) {
            Ok(manifest) => manifest,
            Err(e) => {
                error!("Error loading tools from {:?}: {}", manifest_path, e);
                return Vec::new();
            }
        };

        let mut entries = manifest.tools;
        // Stable sort keeps the first listing of a function ahead of repeats
        entries.sort_by(|a, b| a.function.cmp(&b.function));
        entries.dedup_by(|repeat, kept| {
            let duplicate = repeat.function == kept.function;
            if duplicate {
                error!(
                    "Duplicate function '{}' in {:?}, keeping the first entry",
                    repeat.function, manifest_path
                );
            }
            duplicate
        });

        entries
            .into_iter()
            .filter_map(|entry| match self.build_tool(skill_name, entry) {
                Ok(tool) => tool,
                Err(e) => {
                    error!("Skipping tool in {:?}: {}", manifest_path, e);
                    None
                }
            })
            .collect()
    }

    /// Load a skill, with content and tools when `load_content` is set
    pub fn load_skill(
        &self,
        skill_dir: &Path,
        source: SkillSource,
        load_content: bool,
    ) -> Result<Option<Skill>> {
        let Some(metadata) = self.load_metadata(skill_dir, source) else {
            return Ok(None);
        };

        if !load_content {
            return Ok(Some(Skill::from_metadata(metadata)));
        }

        let content = self.load_content(skill_dir)?;
        let tools = if metadata.has_tools() {
            self.load_tools(skill_dir, metadata.name())
        } else {
            Vec::new()
        };

        Ok(Some(Skill {
            metadata,
            content: Some(content),
            tools,
        }))
    }

    /// Turn one manifest entry into a tool, `None` when it is not a tool
    fn build_tool(&self, skill_name: &str, entry: ToolEntry) -> Result<Option<SkillTool>> {
        if entry.function.starts_with('_') {
            debug!("Skipping private function '{}' in skill '{}'", entry.function, skill_name);
            return Ok(None);
        }

        let key = entry
            .handler
            .clone()
            .unwrap_or_else(|| format!("{skill_name}/{}", entry.function));
        let registration = self.tools.get(&key).ok_or_else(|| SkillError::ToolNotFound {
            skill: skill_name.to_string(),
            handler: key.clone(),
        })?;

        let entry_doc = entry
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());
        let name = format!("{skill_name}{TOOL_NAME_SEPARATOR}{}", entry.function);

        // Explicit declarations win over inference
        if entry.schema.is_some() || registration.declaration().is_some() {
            let declared = registration.declaration();
            let description = declared
                .and_then(|d| d.description.as_deref())
                .or(entry_doc)
                .or(registration.documentation())
                .unwrap_or_default()
                .to_string();
            let parameters = entry
                .schema
                .or_else(|| declared.map(|d| d.parameters.clone()))
                .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

            return Ok(Some(SkillTool {
                name,
                description,
                parameters,
                handle: registration.handle().clone(),
            }));
        }

        let Some(doc) = entry_doc.or(registration.documentation()) else {
            warn!(
                "Function '{}' in skill '{}' has no description and no declaration, not exposed as a tool",
                entry.function, skill_name
            );
            return Ok(None);
        };

        let signature = entry.parameters.as_ref().unwrap_or(registration.signature());

        Ok(Some(SkillTool {
            name,
            description: doc.to_string(),
            parameters: infer_parameters(signature),
            handle: registration.handle().clone(),
        }))
    }
}

fn read_document(path: &Path) -> Result<Document> {
    let content = fs::read_to_string(path).map_err(|e| SkillError::io(path, e))?;
    Document::parse(&content)
}

fn read_manifest(path: &Path) -> Result<ToolManifest> {
    let content = fs::read_to_string(path).map_err(|e| SkillError::io(path, e))?;
    if content.trim().is_empty() {
        return Ok(ToolManifest { tools: Vec::new() });
    }
    Ok(serde_yaml::from_str(&content)?)
}

fn read_metadata(
    skill_dir: &Path,
    skill_file: &Path,
    source: SkillSource,
) -> Result<Option<SkillMetadata>> {
    let document = read_document(skill_file)?;

    let (Some(name), Some(description)) =
        (document.text_field("name"), document.text_field("description"))
    else {
        warn!("Skill at {:?} missing name or description", skill_dir);
        return Ok(None);
    };

    let has_tools = skill_dir.join(TOOLS_FILE).is_file();
    SkillMetadata::new(name, description, has_tools, source, skill_dir).map(Some)
}

/// Resource files relative to `base_path`: everything under the resource
/// directories plus sibling markdown files, sorted
fn discover_resources(base_path: &Path) -> Result<Vec<String>> {
    let mut resources = Vec::new();

    for dir in RESOURCE_DIRS {
        let root = base_path.join(dir);
        if !root.is_dir() {
            continue;
        }

        for entry in WalkDir::new(&root).into_iter().filter_map(|e| e.ok()) {
            // Follows symlinks; dangling links are not files
            if !entry.path().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(base_path) {
                resources.push(to_resource_string(relative));
            }
        }
    }

    let entries = fs::read_dir(base_path).map_err(|e| SkillError::io(base_path, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| SkillError::io(base_path, e))?;
        let path = entry.path();
        let is_markdown = path.extension().is_some_and(|ext| ext == "md");
        let is_marker = path.file_name().is_some_and(|n| n == SKILL_FILE);

        if path.is_file() && is_markdown && !is_marker {
            resources.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    resources.sort();
    resources.dedup();
    Ok(resources)
}

fn to_resource_string(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
