//! The `gutscore compare` command.

use std::path::PathBuf;

use anyhow::Result;

use gutscore_core::report::AssessmentReport;

use super::CompareFormat;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: u32,
    fail_on_regression: bool,
    format: CompareFormat,
) -> Result<()> {
    let baseline = AssessmentReport::load_json(&baseline_path)?;
    let current = AssessmentReport::load_json(&current_path)?;

    if baseline.assessment.id != current.assessment.id {
        eprintln!(
            "Warning: comparing different assessments ({} vs {})",
            baseline.assessment.id, current.assessment.id
        );
    }

    let report = current.compare(&baseline, threshold);

    match format {
        CompareFormat::Markdown => {
            println!("{}", report.to_markdown());
        }
        CompareFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        CompareFormat::Text => {
            println!(
                "Total: {} -> {} ({:+})",
                report.baseline_total, report.current_total, report.total_delta
            );
            if report.level_changed() {
                println!(
                    "Level: {} -> {}",
                    report.baseline_level, report.current_level
                );
            } else {
                println!("Level: {} (unchanged)", report.current_level);
            }
            println!(
                "Comparison: {} regressions, {} improvements, {} unchanged",
                report.regressions.len(),
                report.improvements.len(),
                report.unchanged
            );

            if !report.regressions.is_empty() {
                println!("\nRegressions:");
                for r in &report.regressions {
                    println!(
                        "  {} ({}) {} -> {} ({:+})",
                        r.title, r.section_id, r.baseline_score, r.current_score, r.delta
                    );
                }
            }

            if !report.improvements.is_empty() {
                println!("\nImprovements:");
                for i in &report.improvements {
                    println!(
                        "  {} ({}) {} -> {} ({:+})",
                        i.title, i.section_id, i.baseline_score, i.current_score, i.delta
                    );
                }
            }

            if report.new_sections > 0 {
                println!("\n{} new section(s)", report.new_sections);
            }
            if report.removed_sections > 0 {
                println!("{} removed section(s)", report.removed_sections);
            }
        }
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}
