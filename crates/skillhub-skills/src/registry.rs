//! Skills registry for managing multiple skill roots
//!
//! Implements progressive disclosure architecture:
//! - Phase 1: Scan directories and load metadata only
//! - Phase 2: Load full skill content on demand
//!
//! Roots are scanned in order and a later root's skill replaces an earlier
//! root's skill of the same name.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn, Span};

use crate::error::Result;
use crate::loader::SkillLoader;
use crate::skill::{Skill, SkillMetadata, SkillSource};

/// Path fragments marking a packaged, read-only skills location
const BUILTIN_MARKERS: &[&str] = &["builtin", "site-packages"];

/// Skills registry indexing every discovered skill by name
#[derive(Debug)]
pub struct SkillRegistry {
    /// Discovered skill metadata, keyed by name
    skills: BTreeMap<String, SkillMetadata>,
    /// Skills directories to scan, lowest priority first
    directories: Vec<PathBuf>,
    loader: SkillLoader,
    home: Option<PathBuf>,
    span: Span,
}

impl SkillRegistry {
    /// Create a new empty registry
    pub fn new(loader: SkillLoader) -> Self {
        Self {
            skills: BTreeMap::new(),
            directories: Vec::new(),
            loader,
            home: dirs::home_dir(),
            span: info_span!("skill_registry"),
        }
    }

    /// Add a skills directory to scan (overrides directories added before it)
    #[must_use]
    pub fn add_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directories.push(dir.into());
        self
    }

    /// Add several directories in priority order
    #[must_use]
    pub fn with_directories<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.directories.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Override the home directory used to tag user skills
    #[must_use]
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// Span every registry operation logs under
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Rebuild the index from every configured directory (Phase 1: Discovery)
    ///
    /// Missing directories are skipped; malformed skills are logged and
    /// skipped. Returns the number of skills indexed.
    pub fn discover(&mut self) -> usize {
        let span = self.span.clone();
        let _enter = span.enter();

        info!(
            "Starting skills discovery in {} directories",
            self.directories.len()
        );
        self.skills.clear();

        let directories = self.directories.clone();
        for dir in &directories {
            if !dir.exists() {
                debug!("Skills directory does not exist: {:?}", dir);
                continue;
            }

            if !dir.is_dir() {
                warn!("Skills path is not a directory: {:?}", dir);
                continue;
            }

            let source = self.infer_source(dir);
            if let Err(e) = self.scan_directory(dir, source) {
                warn!("Failed to scan skills directory {:?}: {}", dir, e);
            }
        }

        info!("Discovered {} skills", self.skills.len());
        self.skills.len()
    }

    /// Scan a single directory for skills
    fn scan_directory(&mut self, dir: &Path, source: SkillSource) -> std::io::Result<()> {
        let mut candidates = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    warn!("Skipping unreadable entry in {:?}: {}", dir, e);
                    continue;
                }
            };
            if path.is_dir() {
                candidates.push(path);
            }
        }
        // Directory order decides nothing, but keeps logs stable
        candidates.sort();

        for path in candidates {
            let Some(metadata) = self.loader.load_metadata(&path, source) else {
                debug!("Skipping {:?}: not a valid skill", path);
                continue;
            };

            let name = metadata.name().to_string();
            if let Some(previous) = self.skills.get(&name) {
                debug!(
                    "Skill '{}' from {:?} overridden by {:?}",
                    name,
                    previous.path(),
                    metadata.path()
                );
            } else {
                debug!("Discovered skill: {} at {:?}", name, path);
            }
            self.skills.insert(name, metadata);
        }

        Ok(())
    }

    /// Classify a root as builtin, user or project
    fn infer_source(&self, dir: &Path) -> SkillSource {
        let path_str = dir.to_string_lossy();
        if BUILTIN_MARKERS.iter().any(|m| path_str.contains(m)) {
            return SkillSource::Builtin;
        }

        let under_home = self.home.as_deref().is_some_and(|home| {
            dir.starts_with(home)
                || dir
                    .canonicalize()
                    .ok()
                    .zip(home.canonicalize().ok())
                    .is_some_and(|(dir, home)| dir.starts_with(home))
        });

        if under_home {
            SkillSource::User
        } else {
            SkillSource::Project
        }
    }

    /// Re-scan directories, replacing the whole index
    pub fn refresh(&mut self) -> usize {
        self.discover()
    }

    /// Load full content and tools for a skill (Phase 2: Activation)
    ///
    /// Unknown names are `Ok(None)`. Content is re-read on every call.
    pub fn get_skill(&self, name: &str) -> Result<Option<Skill>> {
        let _enter = self.span.enter();
        let Some(metadata) = self.skills.get(name) else {
            debug!("Skill '{}' not found", name);
            return Ok(None);
        };

        self.loader
            .load_skill(metadata.path(), metadata.source(), true)
    }

    /// Get skill metadata by name
    pub fn get_metadata(&self, name: &str) -> Option<&SkillMetadata> {
        self.skills.get(name)
    }

    /// Metadata for all discovered skills, ordered by name
    pub fn list_skills(&self) -> Vec<&SkillMetadata> {
        self.skills.values().collect()
    }

    /// Get all skill names, sorted
    pub fn skill_names(&self) -> Vec<&str> {
        self.skills.keys().map(String::as_str).collect()
    }

    /// Get number of skills
    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Configured directories, lowest priority first
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    pub(crate) fn span(&self) -> &Span {
        &self.span
    }
}

impl Default for SkillRegistry {
    fn default() -> Self {
        Self::new(SkillLoader::default())
    }
}
