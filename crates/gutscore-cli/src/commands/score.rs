//! The `gutscore score` command.

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Result};

use gutscore_core::config::load_config_from;
use gutscore_core::engine::AssessmentEngine;
use gutscore_core::parser;
use gutscore_core::report::AssessmentReport;

use super::PrintFormat;
use crate::output::render_results;

pub fn execute(
    answers_path: PathBuf,
    assessment_path: Option<PathBuf>,
    output: Option<PathBuf>,
    format: Option<super::SaveFormat>,
    print: PrintFormat,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let assessment = super::resolve_assessment(assessment_path.as_deref(), &config)?;
    let answers = parser::parse_answers(&answers_path)?;

    let mut engine = AssessmentEngine::new(assessment)?;
    let mut rejected = Vec::new();
    for (key, score) in &answers {
        match engine.record_answer(key, *score) {
            Ok(()) => {}
            Err(e) if e.is_input_error() => rejected.push(e.to_string()),
            Err(e) => return Err(e.into()),
        }
    }
    if !rejected.is_empty() {
        bail!(
            "{} has {} invalid answer(s):\n  {}",
            answers_path.display(),
            rejected.len(),
            rejected.join("\n  ")
        );
    }
    while !engine.is_complete() {
        engine.advance_section();
    }
    tracing::debug!(answers = answers.len(), total = engine.grand_total(), "scored answer sheet");

    let report = AssessmentReport::from_engine(&engine)?;

    match print {
        PrintFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        PrintFormat::Text => render_results(&engine, &mut io::stdout().lock())?,
    }

    if let Some(dir) = super::output_dir(output, &config) {
        let format = super::save_format(format, &config)?;
        for path in super::save_report(&report, &dir, format)? {
            eprintln!("Results saved to: {}", path.display());
        }
    }

    Ok(())
}
