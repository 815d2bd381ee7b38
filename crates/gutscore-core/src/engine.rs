//! Assessment session engine.
//!
//! Owns one assessment definition and the mutable state of a single attempt:
//! recorded scores, the active section, cached totals, and the completion
//! flag. The presentation layer drives it one call at a time and reads the
//! derived values back after each call.

use std::collections::{BTreeMap, HashSet};

use crate::error::AssessmentError;
use crate::model::{Assessment, InterpretationBand, QuestionKey, Section, MAX_QUESTION_SCORE};

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationResult {
    /// The session moved to the section at this index.
    MovedToSection(usize),
    /// The session is showing results.
    ReachedResults,
    /// Already on the first section; nothing changed.
    AtStart,
}

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    InProgress(usize),
    Complete,
}

/// Position within the assessment, for progress bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// 1-based number of the active section.
    pub section_number: usize,
    pub section_count: usize,
    /// Share of sections reached, 0-100.
    pub percent: f64,
}

impl Progress {
    /// e.g. "Section 2 of 5".
    pub fn label(&self) -> String {
        format!("Section {} of {}", self.section_number, self.section_count)
    }
}

/// Final result of a completed session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome<'a> {
    pub total: u32,
    pub max_total: u32,
    pub band: &'a InterpretationBand,
}

/// Mutable state of one assessment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub current_section: usize,
    /// Every question key of the assessment, 0 until answered.
    pub scores: BTreeMap<QuestionKey, u8>,
    /// One entry per section, kept equal to the sum of its scores.
    pub section_totals: Vec<u32>,
    pub grand_total: u32,
    pub is_complete: bool,
}

impl SessionState {
    /// Fresh state for `assessment`: first section, every score 0.
    pub fn initial(assessment: &Assessment) -> Self {
        Self {
            current_section: 0,
            scores: assessment.question_keys().map(|k| (k, 0)).collect(),
            section_totals: vec![0; assessment.sections.len()],
            grand_total: 0,
            is_complete: false,
        }
    }
}

/// Drives a single user through an assessment.
#[derive(Debug, Clone)]
pub struct AssessmentEngine {
    assessment: Assessment,
    state: SessionState,
}

impl AssessmentEngine {
    /// Create an engine for `assessment`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAssessment` when the assessment has no sections, no
    /// interpretation bands, or repeats a section id.
    pub fn new(assessment: Assessment) -> Result<Self, AssessmentError> {
        if assessment.sections.is_empty() {
            return Err(AssessmentError::InvalidAssessment(format!(
                "'{}' has no sections",
                assessment.id
            )));
        }
        if assessment.bands.is_empty() {
            return Err(AssessmentError::InvalidAssessment(format!(
                "'{}' has no interpretation bands",
                assessment.id
            )));
        }
        {
            let mut seen = HashSet::new();
            if let Some(dup) = assessment.sections.iter().find(|s| !seen.insert(&s.id)) {
                return Err(AssessmentError::InvalidAssessment(format!(
                    "duplicate section id '{}'",
                    dup.id
                )));
            }
        }

        let state = SessionState::initial(&assessment);
        Ok(Self { assessment, state })
    }

    pub fn assessment(&self) -> &Assessment {
        &self.assessment
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_section_index(&self) -> usize {
        self.state.current_section
    }

    pub fn current_section(&self) -> &Section {
        &self.assessment.sections[self.state.current_section]
    }

    pub fn section_count(&self) -> usize {
        self.assessment.sections.len()
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_complete
    }

    pub fn phase(&self) -> SessionPhase {
        if self.state.is_complete {
            SessionPhase::Complete
        } else {
            SessionPhase::InProgress(self.state.current_section)
        }
    }

    /// Recorded score for `key`, or `None` if the key is not in the assessment.
    pub fn score(&self, key: &QuestionKey) -> Option<u8> {
        self.state.scores.get(key).copied()
    }

    pub fn scores(&self) -> &BTreeMap<QuestionKey, u8> {
        &self.state.scores
    }

    /// Cached per-section totals, in section order.
    pub fn section_totals(&self) -> &[u32] {
        &self.state.section_totals
    }

    /// Record `score` for `key`, overwriting any previous answer.
    ///
    /// # Errors
    ///
    /// `UnknownQuestion` if the key is not part of the assessment,
    /// `InvalidScore` if `score` exceeds the 0-4 scale, and
    /// `AlreadyComplete` once the results have been reached.
    pub fn record_answer(&mut self, key: &QuestionKey, score: u8) -> Result<(), AssessmentError> {
        if self.state.is_complete {
            return Err(AssessmentError::AlreadyComplete);
        }
        let section_index = self
            .assessment
            .section_index(&key.section_id)
            .filter(|&i| key.index < self.assessment.sections[i].questions.len())
            .ok_or_else(|| AssessmentError::UnknownQuestion(key.to_string()))?;
        if score > MAX_QUESTION_SCORE {
            return Err(AssessmentError::InvalidScore {
                key: key.to_string(),
                score,
                max: MAX_QUESTION_SCORE,
            });
        }

        self.state.scores.insert(key.clone(), score);
        self.state.section_totals[section_index] = self.sum_section(section_index);
        self.state.grand_total = self.state.section_totals.iter().sum();

        tracing::debug!(
            question = %key,
            score,
            section_total = self.state.section_totals[section_index],
            grand_total = self.state.grand_total,
            "answer recorded"
        );
        Ok(())
    }

    /// Like [`record_answer`](Self::record_answer) with a `"<section>-<index>"` key.
    pub fn record_answer_str(&mut self, key: &str, score: u8) -> Result<(), AssessmentError> {
        let key: QuestionKey = key.parse()?;
        self.record_answer(&key, score)
    }

    /// Move to the next section, or to the results after the last one.
    ///
    /// Unanswered questions keep their initial score of 0.
    pub fn advance_section(&mut self) -> NavigationResult {
        if self.state.is_complete {
            return NavigationResult::ReachedResults;
        }
        let last = self.assessment.sections.len() - 1;
        if self.state.current_section < last {
            self.state.current_section += 1;
            tracing::debug!(section = self.state.current_section, "advanced");
            NavigationResult::MovedToSection(self.state.current_section)
        } else {
            self.state.is_complete = true;
            tracing::debug!(total = self.state.grand_total, "reached results");
            NavigationResult::ReachedResults
        }
    }

    /// Move to the previous section. No-op on the first section.
    pub fn retreat_section(&mut self) -> NavigationResult {
        if self.state.is_complete {
            return NavigationResult::ReachedResults;
        }
        if self.state.current_section == 0 {
            return NavigationResult::AtStart;
        }
        self.state.current_section -= 1;
        tracing::debug!(section = self.state.current_section, "retreated");
        NavigationResult::MovedToSection(self.state.current_section)
    }

    /// Sum of the recorded scores of the section at `index`.
    ///
    /// # Errors
    ///
    /// `UnknownSection` if `index` is out of range.
    pub fn section_total(&self, index: usize) -> Result<u32, AssessmentError> {
        if index >= self.assessment.sections.len() {
            return Err(AssessmentError::UnknownSection {
                index,
                count: self.assessment.sections.len(),
            });
        }
        Ok(self.sum_section(index))
    }

    /// Sum of every section total, recomputed from the recorded scores.
    pub fn grand_total(&self) -> u32 {
        (0..self.assessment.sections.len())
            .map(|i| self.sum_section(i))
            .sum()
    }

    /// First band, in declaration order, whose range contains `total`.
    ///
    /// Falls back to the first band when nothing matches.
    pub fn classify(&self, total: u32) -> &InterpretationBand {
        match self.assessment.bands.iter().find(|b| b.contains(total)) {
            Some(band) => band,
            None => {
                tracing::warn!(
                    total,
                    assessment = %self.assessment.id,
                    "no interpretation band matches, using first band"
                );
                &self.assessment.bands[0]
            }
        }
    }

    /// Total and interpretation, once the session is complete.
    pub fn outcome(&self) -> Option<Outcome<'_>> {
        if !self.state.is_complete {
            return None;
        }
        let total = self.grand_total();
        Some(Outcome {
            total,
            max_total: self.assessment.max_total(),
            band: self.classify(total),
        })
    }

    pub fn progress(&self) -> Progress {
        let count = self.assessment.sections.len();
        let number = self.state.current_section + 1;
        Progress {
            section_number: number,
            section_count: count,
            percent: number as f64 * 100.0 / count as f64,
        }
    }

    /// Whether leaving now would discard progress worth warning about.
    pub fn warns_on_exit(&self) -> bool {
        !self.state.is_complete && self.state.current_section > 0
    }

    /// One-line summary suitable for sharing.
    pub fn share_text(&self) -> String {
        let total = self.grand_total();
        let band = self.classify(total);
        let mut text = format!(
            "I just completed a comprehensive {} and scored {}/{} - {}! 🌟",
            self.assessment.name.to_lowercase(),
            total,
            self.assessment.max_total(),
            band.level
        );
        if let Some(tagline) = &self.assessment.share_tagline {
            text.push(' ');
            text.push_str(tagline);
        }
        text
    }

    /// Start over: first section, every score 0, not complete.
    pub fn reset(&mut self) {
        self.state = SessionState::initial(&self.assessment);
        tracing::debug!(assessment = %self.assessment.id, "session reset");
    }

    fn sum_section(&self, index: usize) -> u32 {
        self.assessment.sections[index]
            .question_keys()
            .map(|k| u32::from(self.state.scores.get(&k).copied().unwrap_or(0)))
            .sum()
    }
}
