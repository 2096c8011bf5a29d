//! Multi-line text input for entries

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use colored::Colorize;

/// Read free text from `$VISUAL`/`$EDITOR` when one is set, else from stdin.
/// `None` means the user gave up or entered nothing.
pub fn read_text(prompt: &str) -> Result<Option<String>> {
    let has_editor = ["VISUAL", "EDITOR"]
        .iter()
        .any(|var| std::env::var(var).is_ok_and(|v| !v.trim().is_empty()));

    let text = if has_editor {
        dialoguer::Editor::new()
            .extension(".md")
            .edit("")
            .context("Failed to run editor")?
    } else {
        println!("{}", prompt.bold());
        println!(
            "{}",
            "Finish with a line containing only '.' (or Ctrl-D)".dimmed()
        );
        io::stdout().flush().ok();
        Some(read_until_terminator(io::stdin().lock())?)
    };

    Ok(text.filter(|t| !t.trim().is_empty()).map(|t| t.trim().to_string()))
}

/// Collect lines until one that is exactly `.` or until EOF.
pub fn read_until_terminator<R: BufRead>(reader: R) -> io::Result<String> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim_end() == "." {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}
