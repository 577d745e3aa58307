use std::io::Write;
use std::path::Path;

use nombra_core::RenameOutcome;
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Print the title the model came up with.
pub fn print_title(w: &mut dyn Write, title: &str, color: ColorMode) -> std::io::Result<()> {
    writeln!(w)?;
    if color.enabled() {
        writeln!(w, "{} {}", "Generated title:".bold(), title.cyan())?;
    } else {
        writeln!(w, "Generated title: {}", title)?;
    }
    writeln!(w)?;
    Ok(())
}

/// Print what happened to the file on disk.
pub fn print_rename(
    w: &mut dyn Write,
    outcome: &RenameOutcome,
    color: ColorMode,
) -> std::io::Result<()> {
    match outcome {
        RenameOutcome::Renamed { from, to } => {
            let from = display_name(from);
            let to = display_name(to);
            if color.enabled() {
                writeln!(w, "{}", "Successfully renamed:".green().bold())?;
                writeln!(w, "  {}", from.dimmed())?;
                writeln!(w, "  → {}", to.bold())?;
            } else {
                writeln!(w, "Successfully renamed:")?;
                writeln!(w, "  {}", from)?;
                writeln!(w, "  → {}", to)?;
            }
        }
        RenameOutcome::Unchanged { path } => {
            let name = display_name(path);
            if color.enabled() {
                writeln!(
                    w,
                    "{} {}",
                    "Already named:".yellow().bold(),
                    name
                )?;
            } else {
                writeln!(w, "Already named: {}", name)?;
            }
        }
    }
    writeln!(w)?;
    Ok(())
}
