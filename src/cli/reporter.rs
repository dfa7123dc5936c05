// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use super::runner::RenderOutcome;
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Summary of a generated scene, on stderr so the SCAD text can be piped
    pub fn report_scene(name: &str, scad: &str, duration: Duration) {
        eprintln!("\n{}", "━".repeat(80).bright_black());
        eprintln!("{} {}", "Scene:".bold(), name.cyan());
        eprintln!("{}", "━".repeat(80).bright_black());
        eprintln!(
            "  {} {}",
            "Statements:".bright_black(),
            statement_count(scad).to_string().cyan()
        );
        eprintln!(
            "  {} {}",
            "Bytes:".bright_black(),
            scad.len().to_string().cyan()
        );
        eprintln!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        eprintln!("{}", "━".repeat(80).bright_black());
    }

    pub fn report_render(outcome: &RenderOutcome, duration: Duration) {
        let target = outcome
            .output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(no output)".to_string());

        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Rendered:".bold(), target.cyan());
        println!("{}", "━".repeat(80).bright_black());
        if outcome.command.is_empty() {
            println!("  {} {}", "Mode:".bright_black(), "scad text".cyan());
        } else {
            println!(
                "  {} {}",
                "Command:".bright_black(),
                outcome.command.join(" ").bright_black()
            );
        }
        match outcome.status {
            Some(0) | None => println!("  {} {}", "Status:".bright_black(), "ok".green()),
            Some(code) => println!(
                "  {} {}",
                "Status:".bright_black(),
                format!("exit code {code}").red()
            ),
        }
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }

    pub fn progress(message: &str) {
        println!("{} {}...", "⏳".bright_blue(), message.bright_black());
    }

    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }
}

/// Leaf statements in generated text: lines ending in `;`
fn statement_count(scad: &str) -> usize {
    scad.lines().filter(|line| line.trim_end().ends_with(';')).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(
            Reporter::format_duration(Duration::from_micros(500)),
            "500µs"
        );
        assert_eq!(
            Reporter::format_duration(Duration::from_millis(5)),
            "5.00ms"
        );
        assert_eq!(Reporter::format_duration(Duration::from_secs(2)), "2.00s");
    }

    #[test]
    fn test_statement_count() {
        let scad = "union() {\n    cube([1.0, 1.0, 1.0], center=false);\n    sphere(r=1.0);\n}";
        assert_eq!(statement_count(scad), 2);
    }
}
