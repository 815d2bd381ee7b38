//! The `gutscore validate` command.

use std::path::PathBuf;

use anyhow::Result;

use gutscore_core::{dataset, parser};

pub fn execute(assessment_path: Option<PathBuf>) -> Result<()> {
    let assessments = match &assessment_path {
        Some(path) if path.is_dir() => parser::load_assessment_directory(path)?,
        Some(path) => vec![parser::parse_assessment(path)?],
        None => vec![dataset::gut_health()?],
    };

    let mut total_warnings = 0;

    for assessment in &assessments {
        println!(
            "Assessment: {} ({} sections, {} questions, max {})",
            assessment.name,
            assessment.sections.len(),
            assessment.question_count(),
            assessment.max_total()
        );

        let warnings = parser::validate_assessment(assessment);
        for w in &warnings {
            let prefix = w
                .section_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All assessments valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
