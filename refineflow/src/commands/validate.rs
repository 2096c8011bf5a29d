//! Validate command - Check a Jira export file's structure

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::export::{validate_structure, JiraExporter};

/// Prints the verdict; returns whether the file is valid. A leading
/// `# Jira Export:` header is not part of the checked breakdown.
pub fn run(path: &Path) -> Result<bool> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let (valid, warnings) = validate_structure(Some(JiraExporter::strip_header(&content)));

    if valid {
        println!("{} {} is a complete Jira export", "✓".green(), path.display());
    } else {
        println!("{} {} has structure problems:", "✗".red(), path.display());
    }
    for warning in &warnings {
        println!("  {} {}", "!".yellow(), warning);
    }
    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_reports_invalid_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("jira_export.md");
        fs::write(&path, "# Tarefa Pai\n\nSó uma descrição.\n").unwrap();
        assert!(!run(&path).unwrap());
    }

    #[test]
    fn test_validate_skips_export_header() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("jira_export.md");
        let mut text = String::from(
            "# Jira Export: Backend gateway\n\n**Generated**: agora\n**Status**: in_progress\n\n---\n\n",
        );
        for (side, count) in [("Backend", 7), ("Frontend", 2)] {
            for n in 1..=count {
                text.push_str(&format!(
                    "## Subtarefa {side} {n}\n**Estimativa:** M / 2 weeks\nTestes unitários.\n**Dependências:** Task 1\n\n"
                ));
            }
        }
        fs::write(&path, text).unwrap();
        assert!(run(&path).unwrap());
    }

    #[test]
    fn test_validate_missing_file_errors() {
        assert!(run(Path::new("/nonexistent/jira_export.md")).is_err());
    }
}
