use serde::Deserialize;
use skillhub_logging::LoggingConfig;
use std::env;
use std::path::PathBuf;

/// Convenience environment variables and the config keys they override
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("SKILLHUB_USER_DIR", "skills.user_dir"),
    ("SKILLHUB_PROJECT_DIR", "skills.project_dir"),
    ("SKILLHUB_BUILTIN_DIR", "skills.builtin_dir"),
    ("SKILLHUB_LOG_LEVEL", "logging.level"),
];

#[derive(Debug, Deserialize, Clone)]
pub struct SkillsConfig {
    /// Packaged skills, lowest priority
    ///
    /// Skills are tagged `builtin` only when this path contains `builtin` or
    /// `site-packages`; any other location is tagged `user` (under the home
    /// directory) or `project`.
    #[serde(default)]
    pub builtin_dir: Option<String>,
    #[serde(default = "default_user_dir")]
    pub user_dir: String,
    #[serde(default = "default_project_dir")]
    pub project_dir: String,
}

fn default_user_dir() -> String {
    "~/.skillhub/skills".to_string()
}

fn default_project_dir() -> String {
    "skills".to_string()
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            builtin_dir: None,
            user_dir: default_user_dir(),
            project_dir: default_project_dir(),
        }
    }
}

impl SkillsConfig {
    /// Skill roots in priority order (later overrides earlier)
    pub fn skill_paths(&self) -> Vec<PathBuf> {
        self.builtin_dir
            .iter()
            .chain([&self.user_dir, &self.project_dir])
            .filter(|dir| !dir.trim().is_empty())
            .map(|dir| expand_home(dir))
            .collect()
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub skills: SkillsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Get the global config path: ~/.skillhub/skillhub.toml
    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".skillhub").join("skillhub.toml"))
    }

    /// Load configuration with layered approach:
    /// 1. Global config: ~/.skillhub/skillhub.toml (optional)
    /// 2. Local override: ./skillhub.toml (workspace, optional)
    /// 3. Environment variables with SKILLHUB__ prefix
    /// 4. Convenience variables such as SKILLHUB_USER_DIR (highest priority)
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file from current directory
        dotenvy::dotenv().ok();

        let mut config_builder = config::Config::builder();

        // Layer 1: Global config
        if let Some(global_config_path) = Self::global_config_path() {
            config_builder =
                config_builder.add_source(config::File::from(global_config_path).required(false));
        }

        config_builder = config_builder
            // Layer 2: Local workspace config (optional override)
            .add_source(config::File::with_name("skillhub").required(false))
            // Layer 3: Environment variables with SKILLHUB__ prefix
            .add_source(config::Environment::with_prefix("SKILLHUB").separator("__"));

        // Layer 4: Apply convenience env var overrides
        let config_builder = apply_overrides(config_builder, |key| env::var(key).ok())?;

        Self::from_builder(config_builder)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> anyhow::Result<Self> {
        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }
}

fn apply_overrides<F>(
    mut builder: config::ConfigBuilder<config::builder::DefaultState>,
    lookup: F,
) -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>>
where
    F: Fn(&str) -> Option<String>,
{
    for (var, key) in ENV_OVERRIDES {
        if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
            builder = builder.set_override(*key, value)?;
        }
    }
    Ok(builder)
}

/// Expand a bare `~` or a leading `~/` to the home directory
fn expand_home(dir: &str) -> PathBuf {
    let rest = match dir.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with(['/', '\\']) => rest.trim_start_matches(['/', '\\']),
        _ => return PathBuf::from(dir),
    };
    dirs::home_dir().map_or_else(|| PathBuf::from(dir), |home| home.join(rest))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn from_toml(toml: &str) -> config::ConfigBuilder<config::builder::DefaultState> {
        config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml))
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_builder(from_toml("")).unwrap();
        assert_eq!(config.skills.project_dir, "skills");
        assert_eq!(config.logging.level, "info");

        let paths = config.skills.skill_paths();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[1], PathBuf::from("skills"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(paths[0], home.join(".skillhub/skills"));
        }
    }

    #[test]
    fn test_file_values() {
        let toml = r#"
            [skills]
            builtin_dir = "/opt/skillhub/builtin"
            user_dir = "/srv/user-skills"
            project_dir = "/work/skills"

            [logging]
            level = "debug"
            json = true
        "#;
        let config = Config::from_builder(from_toml(toml)).unwrap();
        assert_eq!(
            config.skills.skill_paths(),
            vec![
                PathBuf::from("/opt/skillhub/builtin"),
                PathBuf::from("/srv/user-skills"),
                PathBuf::from("/work/skills"),
            ]
        );
        assert!(config.logging.json);
    }

    #[test]
    fn test_convenience_overrides_win() {
        let builder = from_toml("[skills]\nproject_dir = \"from-file\"\n");
        let builder = apply_overrides(builder, |key| match key {
            "SKILLHUB_PROJECT_DIR" => Some("/env/skills".to_string()),
            "SKILLHUB_LOG_LEVEL" => Some("trace".to_string()),
            "SKILLHUB_USER_DIR" => Some(String::new()),
            _ => None,
        })
        .unwrap();

        let config = Config::from_builder(builder).unwrap();
        assert_eq!(config.skills.project_dir, "/env/skills");
        assert_eq!(config.logging.level, "trace");
        assert_eq!(config.skills.user_dir, "~/.skillhub/skills");
        assert!(config.skills.builtin_dir.is_none());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_home("~alice/x"), PathBuf::from("~alice/x"));
        assert_eq!(expand_home("dir/~"), PathBuf::from("dir/~"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~"), home);
            assert_eq!(expand_home("~/x"), home.join("x"));
        }
    }
}
