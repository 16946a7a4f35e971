//! Functions behind the bundled `code-review` skill

use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use crate::tools::ToolTable;

const MAX_LINE_LENGTH: usize = 120;

/// Register every builtin function under `<skill>/<function>` keys
pub(crate) fn register(table: &mut ToolTable) {
    table
        .register("code-review/analyze_complexity", analyze_complexity)
        .doc("Analyze code complexity metrics: line counts and, for Python, function, class and import counts.")
        .param("code", "str")
        .param_with_default("language", "str", json!("python"));

    table
        .register("code-review/check_style", check_style)
        .doc("Check code for style issues: long lines, trailing whitespace and, for Python, tabs.")
        .param("code", "str")
        .param_with_default("language", "str", json!("python"));
}

fn code_and_language(args: &Value) -> Result<(&str, &str)> {
    let code = args
        .get("code")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("Missing 'code' argument"))?;
    let language = args
        .get("language")
        .and_then(Value::as_str)
        .unwrap_or("python");
    Ok((code, language))
}

fn count_prefixed(lines: &[&str], prefixes: &[&str]) -> usize {
    lines
        .iter()
        .filter(|line| {
            let line = line.trim();
            prefixes.iter().any(|p| line.starts_with(p))
        })
        .count()
}

/// Line counts, plus structure counts for Python
pub fn analyze_complexity(args: &Value) -> Result<Value> {
    let (code, language) = code_and_language(args)?;

    let lines: Vec<&str> = code.trim().split('\n').collect();
    let code_lines = lines.iter().filter(|l| !l.trim().is_empty()).count();

    let mut metrics = json!({
        "total_lines": lines.len(),
        "code_lines": code_lines,
        "blank_lines": lines.len() - code_lines,
        "language": language,
    });

    if language == "python" {
        metrics["functions"] = json!(count_prefixed(&lines, &["def "]));
        metrics["classes"] = json!(count_prefixed(&lines, &["class "]));
        metrics["imports"] = json!(count_prefixed(&lines, &["import ", "from "]));
    }

    Ok(metrics)
}

fn issue(line: usize, kind: &str, message: String) -> Value {
    json!({ "line": line, "issue": kind, "message": message })
}

/// Per-line style issues
pub fn check_style(args: &Value) -> Result<Value> {
    let (code, language) = code_and_language(args)?;
    let mut issues = Vec::new();

    for (index, line) in code.split('\n').enumerate() {
        let number = index + 1;
        let length = line.chars().count();

        if length > MAX_LINE_LENGTH {
            issues.push(issue(
                number,
                "line_too_long",
                format!("Line exceeds {MAX_LINE_LENGTH} characters ({length})"),
            ));
        }

        if line != line.trim_end() {
            issues.push(issue(
                number,
                "trailing_whitespace",
                "Trailing whitespace".to_string(),
            ));
        }

        if language == "python" && line.contains('\t') {
            issues.push(issue(
                number,
                "tabs",
                "Use spaces instead of tabs".to_string(),
            ));
        }
    }

    Ok(Value::Array(issues))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_single_function() {
        let metrics =
            analyze_complexity(&json!({"code": "def foo(): pass", "language": "python"})).unwrap();
        assert_eq!(metrics["total_lines"], 1);
        assert_eq!(metrics["code_lines"], 1);
        assert_eq!(metrics["blank_lines"], 0);
        assert_eq!(metrics["functions"], 1);
        assert_eq!(metrics["classes"], 0);
    }

    #[test]
    fn test_analyze_counts_structures() {
        let code = "import os\nfrom sys import argv\n\nclass A:\n    def m(self):\n        pass\n";
        let metrics = analyze_complexity(&json!({"code": code})).unwrap();
        assert_eq!(metrics["total_lines"], 6);
        assert_eq!(metrics["blank_lines"], 1);
        assert_eq!(metrics["imports"], 2);
        assert_eq!(metrics["classes"], 1);
        assert_eq!(metrics["functions"], 1);
        assert_eq!(metrics["language"], "python");
    }

    #[test]
    fn test_analyze_other_language_skips_structure() {
        let metrics =
            analyze_complexity(&json!({"code": "fn main() {}", "language": "rust"})).unwrap();
        assert!(metrics.get("functions").is_none());
        assert_eq!(metrics["language"], "rust");
    }

    #[test]
    fn test_missing_code_is_error() {
        assert!(analyze_complexity(&json!({})).is_err());
        assert!(check_style(&json!({"language": "python"})).is_err());
    }

    #[test]
    fn test_check_style_issues() {
        let long = "x".repeat(121);
        let code = format!("ok\ntrailing  \n\tindented\n{long}");
        let issues = check_style(&json!({"code": code})).unwrap();
        let kinds: Vec<(u64, &str)> = issues
            .as_array()
            .unwrap()
            .iter()
            .map(|i| (i["line"].as_u64().unwrap(), i["issue"].as_str().unwrap()))
            .collect();
        assert_eq!(
            kinds,
            vec![(2, "trailing_whitespace"), (3, "tabs"), (4, "line_too_long")]
        );
    }

    #[test]
    fn test_tabs_only_flagged_for_python() {
        let issues = check_style(&json!({"code": "\tx", "language": "go"})).unwrap();
        assert_eq!(issues, json!([]));
    }

    #[test]
    fn test_registered_in_table() {
        let table = ToolTable::with_builtins();
        assert!(table.contains("code-review/analyze_complexity"));
        assert!(table.contains("code-review/check_style"));
    }
}
