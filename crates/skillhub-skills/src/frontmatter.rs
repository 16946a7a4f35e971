//! Marker document parsing
//!
//! A SKILL.md file is a YAML header between `---` fences followed by a
//! markdown body. Documents without a header parse to an empty header.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_yaml::Value;

use crate::error::{Result, SkillError};

/// Parsed marker document
#[derive(Debug, Clone)]
pub struct Document {
    header: Value,
    body: String,
}

impl Document {
    /// Split a document into its YAML header and body
    pub fn parse(content: &str) -> Result<Self> {
        let frontmatter_re =
            Regex::new(r"^---[ \t]*\r?\n(?:([\s\S]*?)\r?\n)?---[ \t]*(?:\r?\n([\s\S]*))?$")
                .map_err(|e| SkillError::Frontmatter(format!("Failed to compile regex: {e}")))?;

        let Some(captures) = frontmatter_re.captures(content) else {
            return Ok(Self {
                header: Value::Null,
                body: content.trim().to_string(),
            });
        };

        let yaml_str = captures.get(1).map_or("", |m| m.as_str());
        let body = captures.get(2).map_or("", |m| m.as_str());

        let header: Value = if yaml_str.trim().is_empty() {
            Value::Null
        } else {
            serde_yaml::from_str(yaml_str)?
        };

        if !matches!(header, Value::Null | Value::Mapping(_)) {
            return Err(SkillError::Frontmatter(
                "front matter must be a mapping".to_string(),
            ));
        }

        Ok(Self {
            header,
            body: body.trim().to_string(),
        })
    }

    /// Non-empty string value of a header field
    pub fn text_field(&self, key: &str) -> Option<&str> {
        self.header
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Deserialize an optional header field, `None` when absent or null
    pub fn field<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.header.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_yaml::from_value(value.clone())?)),
        }
    }

    /// Document body with the header stripped
    pub fn body(&self) -> &str {
        &self.body
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skill_content() {
        let content = r#"---
name: code-reviewer
description: Reviews code for best practices and security. Use when reviewing or analyzing code.
---

# Code Reviewer

This skill helps review code.
"#;

        let doc = Document::parse(content).unwrap();
        assert_eq!(doc.text_field("name"), Some("code-reviewer"));
        assert_eq!(
            doc.text_field("description"),
            Some("Reviews code for best practices and security. Use when reviewing or analyzing code.")
        );
        assert!(doc.body().starts_with("# Code Reviewer"));
    }

    #[test]
    fn test_header_without_body() {
        let doc = Document::parse("---\nname: bare\n---").unwrap();
        assert_eq!(doc.text_field("name"), Some("bare"));
        assert_eq!(doc.body(), "");
    }

    #[test]
    fn test_empty_header() {
        let doc = Document::parse("---\n---\nJust a body\n").unwrap();
        assert_eq!(doc.text_field("name"), None);
        assert_eq!(doc.body(), "Just a body");
    }

    #[test]
    fn test_no_frontmatter_is_all_body() {
        let doc = Document::parse("# Title\n\nText").unwrap();
        assert_eq!(doc.text_field("name"), None);
        assert_eq!(doc.body(), "# Title\n\nText");
    }

    #[test]
    fn test_non_string_fields_are_ignored() {
        let doc = Document::parse("---\nname: 42\ndescription: \"  \"\n---\n").unwrap();
        assert_eq!(doc.text_field("name"), None);
        assert_eq!(doc.text_field("description"), None);
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let result = Document::parse("---\nname: [unclosed\n---\nbody\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_scalar_header_is_error() {
        let result = Document::parse("---\njust a string\n---\nbody\n");
        assert!(matches!(result, Err(SkillError::Frontmatter(_))));
    }

    #[test]
    fn test_missing_field_is_none() {
        let doc = Document::parse("---\nname: x\n---\n").unwrap();
        let args: Option<Vec<String>> = doc.field("arguments").unwrap();
        assert!(args.is_none());
    }
}
