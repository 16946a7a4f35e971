//! `SkillHub` Skills System
//!
//! Discovers skill bundles (a directory with a SKILL.md, optional `tools.yaml`,
//! optional `scripts/` and `resources/`) across layered roots and exposes them
//! to an agent with progressive disclosure.
//!
//! ## Features
//!
//! - Progressive disclosure: Load skill metadata at discovery, full content on demand
//! - YAML frontmatter support for skill metadata (name, description, arguments)
//! - Multiple skills directories (builtin, personal, project), later roots override earlier ones
//! - Bundled tools resolved from a declarative manifest against a startup-time [`ToolTable`]
//! - Parameter schemas inferred from declared signatures
//!
//! ## Architecture
//!
//! Phase 1 (Discovery): [`SkillRegistry::discover`] loads only name and description from each SKILL.md
//! Phase 2 (Activation): [`SkillRegistry::get_skill`] loads instructions, resources and tools
//! Phase 3 (Execution): the caller invokes [`SkillTool`]s and reads resources as needed

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod builtin;
pub mod catalog;
pub mod error;
pub mod frontmatter;
pub mod loader;
pub mod registry;
pub mod skill;
pub mod tools;

pub use catalog::{SkillDetails, SkillSummary, ToolDescriptor};
pub use error::{Result, SkillError};
pub use loader::SkillLoader;
pub use registry::SkillRegistry;
pub use skill::{Skill, SkillArgument, SkillContent, SkillMetadata, SkillSource, SkillTool};
pub use tools::{infer_parameters, Signature, SkillFunction, ToolHandle, ToolTable};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Skill, SkillLoader, SkillRegistry, SkillSource, SkillTool, ToolTable};
}
