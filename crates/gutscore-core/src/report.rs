//! Assessment results report with JSON persistence and attempt comparison.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::AssessmentEngine;
use crate::error::AssessmentError;
use crate::model::InterpretationBand;

/// The results of one completed attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the assessment taken.
    pub assessment: AssessmentSummary,
    /// Grand total.
    pub total: u32,
    /// Highest reachable total.
    pub max_total: u32,
    /// The band the total was classified into.
    pub band: InterpretationBand,
    /// Per-section breakdown, in section order.
    pub sections: Vec<SectionBreakdown>,
    /// Every recorded score keyed by `<section>-<index>`.
    pub answers: BTreeMap<String, u8>,
    pub share_text: String,
}

/// Summary of an assessment (without the question texts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentSummary {
    pub id: String,
    pub name: String,
    pub question_count: usize,
}

/// Score of one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionBreakdown {
    pub id: String,
    pub title: String,
    pub score: u32,
    pub max_score: u32,
}

impl AssessmentReport {
    /// Build a report from a completed session.
    ///
    /// # Errors
    ///
    /// `NotComplete` if the session has not reached the results yet.
    pub fn from_engine(engine: &AssessmentEngine) -> Result<Self, AssessmentError> {
        let outcome = engine.outcome().ok_or(AssessmentError::NotComplete)?;
        let assessment = engine.assessment();

        let sections = assessment
            .sections
            .iter()
            .zip(engine.section_totals())
            .map(|(section, &score)| SectionBreakdown {
                id: section.id.clone(),
                title: section.title.clone(),
                score,
                max_score: section.max_score,
            })
            .collect();

        let answers = engine
            .scores()
            .iter()
            .map(|(key, &score)| (key.to_string(), score))
            .collect();

        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            assessment: AssessmentSummary {
                id: assessment.id.clone(),
                name: assessment.name.clone(),
                question_count: assessment.question_count(),
            },
            total: outcome.total,
            max_total: outcome.max_total,
            band: outcome.band.clone(),
            sections,
            answers,
            share_text: engine.share_text(),
        })
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AssessmentReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this attempt against an earlier one.
    ///
    /// Higher scores mean more severe symptoms, so a section whose score
    /// rose by more than `threshold` points counts as a regression.
    pub fn compare(&self, baseline: &AssessmentReport, threshold: u32) -> AttemptComparison {
        let threshold = i64::from(threshold);
        let baseline_scores: HashMap<&str, &SectionBreakdown> = baseline
            .sections
            .iter()
            .map(|s| (s.id.as_str(), s))
            .collect();

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_sections = 0usize;

        for current in &self.sections {
            let Some(base) = baseline_scores.get(current.id.as_str()) else {
                new_sections += 1;
                continue;
            };
            let change = SectionChange {
                section_id: current.id.clone(),
                title: current.title.clone(),
                baseline_score: base.score,
                current_score: current.score,
                delta: i64::from(current.score) - i64::from(base.score),
            };
            if change.delta > threshold {
                regressions.push(change);
            } else if change.delta < -threshold {
                improvements.push(change);
            } else {
                unchanged += 1;
            }
        }

        let removed_sections = baseline
            .sections
            .iter()
            .filter(|b| !self.sections.iter().any(|c| c.id == b.id))
            .count();

        AttemptComparison {
            baseline_total: baseline.total,
            current_total: self.total,
            total_delta: i64::from(self.total) - i64::from(baseline.total),
            baseline_level: baseline.band.level.clone(),
            current_level: self.band.level.clone(),
            regressions,
            improvements,
            unchanged,
            new_sections,
            removed_sections,
        }
    }
}

/// Result of comparing two attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptComparison {
    pub baseline_total: u32,
    pub current_total: u32,
    /// Current minus baseline; positive means worse.
    pub total_delta: i64,
    pub baseline_level: String,
    pub current_level: String,
    /// Sections whose score went up.
    pub regressions: Vec<SectionChange>,
    /// Sections whose score went down.
    pub improvements: Vec<SectionChange>,
    /// Sections with no significant change.
    pub unchanged: usize,
    /// Sections in current but not baseline.
    pub new_sections: usize,
    /// Sections in baseline but not current.
    pub removed_sections: usize,
}

/// A per-section score change between two attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionChange {
    pub section_id: String,
    pub title: String,
    pub baseline_score: u32,
    pub current_score: u32,
    pub delta: i64,
}

impl AttemptComparison {
    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Total:** {} -> {} ({:+}), {} -> {}\n\n",
            self.baseline_total,
            self.current_total,
            self.total_delta,
            self.baseline_level,
            self.current_level
        ));
        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        ));

        for (heading, changes) in [
            ("Regressions", &self.regressions),
            ("Improvements", &self.improvements),
        ] {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {heading}\n\n"));
            md.push_str("| Section | Baseline | Current | Delta |\n");
            md.push_str("|---------|----------|---------|-------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {} | {} | {:+} |\n",
                    c.title, c.baseline_score, c.current_score, c.delta
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if any section got worse.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }

    /// Returns true if the attempt landed in a different band.
    pub fn level_changed(&self) -> bool {
        self.baseline_level != self.current_level
    }
}
