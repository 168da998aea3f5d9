// Colored terminal output for alignment reports.
//
// This module handles all terminal-specific formatting. main.rs delegates
// here; the library core never prints.

use colored::Colorize;

use crate::gap::GapStatus;
use crate::report::{AlignmentReport, SkillMatch};

/// Display an alignment report in the terminal.
pub fn display_report(report: &AlignmentReport) {
    println!(
        "\n{}",
        format!(
            "=== Skill Gap Report ({} job skills, {}) ===",
            report.total_targets(),
            report.policy
        )
        .bold()
    );
    println!();

    println!(
        "  Overall alignment: {}",
        colorize_score(report.overall_score)
    );
    println!(
        "  {}",
        format!(
            "Thresholds: matched >= {:.2}, partial >= {:.2}",
            report.thresholds.high(),
            report.thresholds.low()
        )
        .dimmed()
    );
    println!();

    print_bucket(GapStatus::Matched, &report.matched);
    print_bucket(GapStatus::Partial, &report.partial);

    if !report.missing.is_empty() {
        println!(
            "  {} ({})",
            colorize_status(GapStatus::Missing),
            report.missing.len()
        );
        for skill in &report.missing {
            println!("      {}", skill);
        }
        println!();
    }

    if let Some(top) = &report.top_matches {
        println!("{}", "=== Closest resume skills ===".bold());
        println!();
        for entry in top {
            let ranked: Vec<String> = entry
                .candidates
                .iter()
                .map(|c| format!("{} ({:.2})", c.skill, c.score))
                .collect();
            println!(
                "  {:<32} {}",
                super::truncate_chars(&entry.skill, 30),
                ranked.join(", ").dimmed()
            );
        }
        println!();
    }

    if let Some(recs) = report.recommendations.as_ref().filter(|r| !r.is_empty()) {
        println!("{}", "=== Upskilling recommendations ===".bold());
        println!();
        for rec in recs {
            println!("  {}", rec.title.cyan().bold());
            println!("      {}", rec.action);
        }
        println!();
    }
}

fn print_bucket(status: GapStatus, items: &[SkillMatch]) {
    if items.is_empty() {
        return;
    }

    println!("  {} ({})", colorize_status(status), items.len());
    for m in items {
        println!(
            "      {:<32} <- {:<32} {:>5.2}",
            super::truncate_chars(&m.skill, 30),
            super::truncate_chars(&m.best_match, 30),
            m.score
        );
    }
    println!();
}

/// Colorize a gap bucket label.
fn colorize_status(status: GapStatus) -> colored::ColoredString {
    match status {
        GapStatus::Matched => status.as_str().green().bold(),
        GapStatus::Partial => status.as_str().yellow().bold(),
        GapStatus::Missing => status.as_str().red().bold(),
    }
}

/// Colorize the overall percentage by band.
fn colorize_score(score: f64) -> colored::ColoredString {
    let text = format!("{score:.2}%");
    if score >= 75.0 {
        text.bright_green().bold()
    } else if score >= 40.0 {
        text.bright_yellow().bold()
    } else {
        text.bright_red().bold()
    }
}
