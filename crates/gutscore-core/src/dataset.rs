//! The built-in reference assessment.
//!
//! The gut health questionnaire ships inside the binary so `gutscore take`
//! works without any files on disk. The same TOML lives under
//! `assessments/` at the repository root.

use std::path::Path;

use anyhow::Result;

use crate::model::Assessment;
use crate::parser::parse_assessment_str;

/// Source of the reference gut health assessment.
pub const GUT_HEALTH_TOML: &str = include_str!("../../../assessments/gut-health.toml");

/// Parse the reference gut health assessment.
pub fn gut_health() -> Result<Assessment> {
    parse_assessment_str(GUT_HEALTH_TOML, Path::new("<builtin>/gut-health.toml"))
}
