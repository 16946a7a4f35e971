use crate::config::Config;
use anyhow::Result;
use skillhub_skills::{SkillLoader, SkillRegistry, ToolTable};
use std::sync::Arc;
use tracing::{info, info_span};

/// Gateway service - wires config, logging and the skill registry
pub struct GatewayService {
    config: Config,
}

impl GatewayService {
    /// Create a new gateway service
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Registry over the configured roots, tools resolved against the builtin table
    pub fn build_registry(&self) -> SkillRegistry {
        let tools = ToolTable::with_builtins();
        info!("Tool table initialized with {} built-in functions", tools.len());

        let paths = self.config.skills.skill_paths();
        SkillRegistry::new(SkillLoader::new(Arc::new(tools)))
            .with_span(info_span!("skill_registry", roots = paths.len()))
            .with_directories(paths)
    }

    /// Discover skills and print the catalog as JSON on stdout
    pub fn run(self) -> Result<()> {
        // Initialize logging
        skillhub_logging::init_logging(&self.config.logging)?;
        info!("Starting SkillHub Gateway");

        let mut registry = self.build_registry();
        for dir in registry.directories() {
            info!("Skills directory: {}", dir.display());
        }

        // Discover skills (Phase 1: Load metadata only)
        registry.discover();

        let catalog = registry.catalog();
        println!("{}", serde_json::to_string_pretty(&catalog)?);

        info!("Gateway finished with {} skills", registry.skill_count());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::SkillsConfig;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_registry_from_config() {
        let temp = TempDir::new().unwrap();
        let user = temp.path().join("user");
        let project = temp.path().join("project");
        for root in [&user, &project] {
            let dir = root.join("greeter");
            fs::create_dir_all(&dir).unwrap();
            fs::write(
                dir.join("SKILL.md"),
                format!("---\nname: greeter\ndescription: from {}\n---\nHi", root.display()),
            )
            .unwrap();
        }

        let config = Config {
            skills: SkillsConfig {
                builtin_dir: None,
                user_dir: user.display().to_string(),
                project_dir: project.display().to_string(),
            },
            ..Config::default()
        };

        let mut registry = GatewayService::new(config).build_registry();
        assert_eq!(registry.directories().len(), 2);
        assert_eq!(registry.discover(), 1);

        let greeter = registry.get_metadata("greeter").unwrap();
        assert!(greeter.description().ends_with("project"));
    }

    #[test]
    fn test_bundled_skills_get_builtin_tools() {
        let skills = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../skills");
        let config = Config {
            skills: SkillsConfig {
                builtin_dir: None,
                user_dir: String::new(),
                project_dir: skills.display().to_string(),
            },
            ..Config::default()
        };

        let mut registry = GatewayService::new(config).build_registry();
        registry.discover();

        let skill = registry.get_skill("code-review").unwrap().unwrap();
        assert_eq!(skill.tools.len(), 2);
    }
}
