//! The `gutscore show` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use gutscore_core::config::load_config_from;

pub fn execute(assessment_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let assessment = super::resolve_assessment(assessment_path.as_deref(), &config)?;

    println!("{} ({})", assessment.name, assessment.id);
    if !assessment.description.is_empty() {
        println!("{}", assessment.description);
    }

    for section in &assessment.sections {
        println!();
        println!("[{}] {} (max {})", section.id, section.title, section.max_score);
        if !section.subtitle.is_empty() {
            println!("    {}", section.subtitle);
        }
        for (i, question) in section.questions.iter().enumerate() {
            println!("  {:<6} {question}", section.key(i).to_string());
        }
    }

    let mut table = Table::new();
    table.set_header(vec!["Range", "Level", "Color", "Description"]);
    for band in &assessment.bands {
        table.add_row(vec![
            Cell::new(format!("{}-{}", band.range_low, band.range_high)),
            Cell::new(format!("{} {}", band.icon_or_default(), band.level)),
            Cell::new(&band.color),
            Cell::new(&band.description),
        ]);
    }

    println!();
    println!("Interpretation (max total {}):", assessment.max_total());
    println!("{table}");

    Ok(())
}
