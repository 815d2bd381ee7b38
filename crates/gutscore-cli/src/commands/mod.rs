//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;

use gutscore_core::config::GutscoreConfig;
use gutscore_core::model::Assessment;
use gutscore_core::report::AssessmentReport;
use gutscore_core::{dataset, parser};
use gutscore_report::html::write_html_report;

pub mod compare;
pub mod init;
pub mod score;
pub mod show;
pub mod take;
pub mod validate;

/// Format of saved result files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SaveFormat {
    Json,
    Html,
    /// Both JSON and HTML.
    All,
}

/// What `score` prints to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PrintFormat {
    Text,
    Json,
}

/// Output format of `compare`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompareFormat {
    Text,
    Json,
    #[value(alias = "md")]
    Markdown,
}

/// Pick the assessment: explicit flag, then config, then the built-in one.
pub fn resolve_assessment(flag: Option<&Path>, config: &GutscoreConfig) -> Result<Assessment> {
    match flag.or(config.assessment.as_deref()) {
        Some(path) => parser::parse_assessment(path),
        None => dataset::gut_health().context("built-in assessment is invalid"),
    }
}

/// Where results should be saved, if anywhere.
pub fn output_dir(flag: Option<PathBuf>, config: &GutscoreConfig) -> Option<PathBuf> {
    flag.or_else(|| config.save_results.then(|| config.output_dir.clone()))
}

/// The `--format` flag, else the config `format`.
pub fn save_format(flag: Option<SaveFormat>, config: &GutscoreConfig) -> Result<SaveFormat> {
    match flag {
        Some(format) => Ok(format),
        None => SaveFormat::from_str(config.format.trim(), true).map_err(|_| {
            anyhow!(
                "unknown format '{}' in config, expected json, html or all",
                config.format
            )
        }),
    }
}

/// Save `report` in the requested format; returns the written paths.
pub fn save_report(
    report: &AssessmentReport,
    dir: &Path,
    format: SaveFormat,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;

    let stem = format!(
        "report-{}-{}",
        report.created_at.format("%Y-%m-%dT%H%M%S"),
        &report.id.simple().to_string()[..8]
    );

    let mut written = Vec::new();
    if matches!(format, SaveFormat::Json | SaveFormat::All) {
        let path = dir.join(format!("{stem}.json"));
        report.save_json(&path)?;
        written.push(path);
    }
    if matches!(format, SaveFormat::Html | SaveFormat::All) {
        let path = dir.join(format!("{stem}.html"));
        write_html_report(report, &path)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gutscore_core::engine::AssessmentEngine;

    fn completed_report() -> AssessmentReport {
        let mut engine = AssessmentEngine::new(dataset::gut_health().unwrap()).unwrap();
        while !engine.is_complete() {
            engine.advance_section();
        }
        AssessmentReport::from_engine(&engine).unwrap()
    }

    #[test]
    fn output_dir_prefers_flag_then_config() {
        let mut config = GutscoreConfig::default();
        assert_eq!(output_dir(None, &config), None);
        assert_eq!(
            output_dir(Some(PathBuf::from("out")), &config),
            Some(PathBuf::from("out"))
        );
        config.save_results = true;
        assert_eq!(
            output_dir(None, &config),
            Some(PathBuf::from("./gutscore-results"))
        );
    }

    #[test]
    fn save_all_formats() {
        let dir = tempfile::tempdir().unwrap();
        let written = save_report(&completed_report(), dir.path(), SaveFormat::All).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|p| p.exists()));
        assert!(written[0].to_string_lossy().ends_with(".json"));
        assert!(written[1].to_string_lossy().ends_with(".html"));
    }

    #[test]
    fn save_format_prefers_flag_then_config() {
        let mut config = GutscoreConfig::default();
        assert_eq!(save_format(None, &config).unwrap(), SaveFormat::Json);
        assert_eq!(
            save_format(Some(SaveFormat::Html), &config).unwrap(),
            SaveFormat::Html
        );
        config.format = "ALL".into();
        assert_eq!(save_format(None, &config).unwrap(), SaveFormat::All);
    }

    #[test]
    fn unknown_config_format_is_an_error() {
        let config = GutscoreConfig {
            format: "pdf".into(),
            ..Default::default()
        };
        let err = save_format(None, &config).unwrap_err();
        assert!(err.to_string().contains("unknown format 'pdf'"));
    }

    #[test]
    fn save_single_format() {
        let dir = tempfile::tempdir().unwrap();
        let written = save_report(&completed_report(), dir.path(), SaveFormat::Html).unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].to_string_lossy().ends_with(".html"));
    }
}
