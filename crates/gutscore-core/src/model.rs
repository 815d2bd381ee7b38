//! Core data model types for gutscore.
//!
//! These are the immutable dataset types: an assessment is an ordered list
//! of sections plus the interpretation bands its grand total is classified
//! against.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AssessmentError;

/// Highest score a single question can receive (0 = never ... 4 = almost daily).
pub const MAX_QUESTION_SCORE: u8 = 4;

/// A themed group of questions sharing a scoring scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Unique identifier (e.g. "1A").
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Scoring guidance shown under the title.
    #[serde(default)]
    pub subtitle: String,
    /// Maximum possible score for this section.
    pub max_score: u32,
    /// Question texts, in display order.
    pub questions: Vec<String>,
}

impl Section {
    /// Key of the question at `index` within this section.
    pub fn key(&self, index: usize) -> QuestionKey {
        QuestionKey::new(&self.id, index)
    }

    /// Keys of every question in this section, in order.
    pub fn question_keys(&self) -> impl Iterator<Item = QuestionKey> + '_ {
        (0..self.questions.len()).map(move |i| self.key(i))
    }
}

/// Identifies a question by its section and position within that section.
///
/// The string form is `<section_id>-<index>`, e.g. `1A-0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuestionKey {
    pub section_id: String,
    pub index: usize,
}

impl QuestionKey {
    pub fn new(section_id: impl Into<String>, index: usize) -> Self {
        Self {
            section_id: section_id.into(),
            index,
        }
    }
}

impl fmt::Display for QuestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.section_id, self.index)
    }
}

impl FromStr for QuestionKey {
    type Err = AssessmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Section ids may themselves contain '-', so split on the last one.
        let (section_id, index) = s
            .trim()
            .rsplit_once('-')
            .ok_or_else(|| AssessmentError::InvalidQuestionKey(s.to_string()))?;
        if section_id.is_empty() {
            return Err(AssessmentError::InvalidQuestionKey(s.to_string()));
        }
        let index = index
            .parse::<usize>()
            .map_err(|_| AssessmentError::InvalidQuestionKey(s.to_string()))?;
        Ok(QuestionKey::new(section_id, index))
    }
}

/// A scoring range mapped to a severity label, colour, and recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretationBand {
    /// Lowest total in this band (inclusive).
    pub range_low: u32,
    /// Highest total in this band (inclusive).
    pub range_high: u32,
    /// Severity label (e.g. "Optimal").
    pub level: String,
    /// Display colour as a CSS hex string.
    pub color: String,
    /// Optional emoji shown next to the level.
    #[serde(default)]
    pub icon: Option<String>,
    pub description: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl InterpretationBand {
    /// Whether `total` falls inside this band, both ends inclusive.
    pub fn contains(&self, total: u32) -> bool {
        (self.range_low..=self.range_high).contains(&total)
    }

    /// The band icon, or a generic celebration icon when none is set.
    pub fn icon_or_default(&self) -> &str {
        self.icon.as_deref().unwrap_or("🎉")
    }
}

/// A complete questionnaire definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// Unique identifier for this assessment.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Closing sentence appended to the share text.
    #[serde(default)]
    pub share_tagline: Option<String>,
    pub sections: Vec<Section>,
    /// Interpretation bands, matched in declaration order.
    pub bands: Vec<InterpretationBand>,
}

impl Assessment {
    /// Sum of every section's `max_score`.
    pub fn max_total(&self) -> u32 {
        self.sections.iter().map(|s| s.max_score).sum()
    }

    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    /// Position of the section with the given id.
    pub fn section_index(&self, section_id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == section_id)
    }

    /// Text of the question a key refers to, if the key is part of this assessment.
    pub fn question(&self, key: &QuestionKey) -> Option<&str> {
        self.section_index(&key.section_id)
            .and_then(|i| self.sections[i].questions.get(key.index))
            .map(String::as_str)
    }

    /// Keys of every question across all sections, in order.
    pub fn question_keys(&self) -> impl Iterator<Item = QuestionKey> + '_ {
        self.sections.iter().flat_map(Section::question_keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(low: u32, high: u32) -> InterpretationBand {
        InterpretationBand {
            range_low: low,
            range_high: high,
            level: "Level".into(),
            color: "#000000".into(),
            icon: None,
            description: String::new(),
            recommendations: vec![],
        }
    }

    #[test]
    fn question_key_display_and_parse() {
        let key = QuestionKey::new("1A", 3);
        assert_eq!(key.to_string(), "1A-3");
        assert_eq!("1A-3".parse::<QuestionKey>().unwrap(), key);
        assert_eq!(
            "pre-op-2".parse::<QuestionKey>().unwrap(),
            QuestionKey::new("pre-op", 2)
        );
        assert!("1A".parse::<QuestionKey>().is_err());
        assert!("1A-x".parse::<QuestionKey>().is_err());
        assert!("-2".parse::<QuestionKey>().is_err());
    }

    #[test]
    fn band_contains_is_inclusive() {
        let b = band(51, 100);
        assert!(!b.contains(50));
        assert!(b.contains(51));
        assert!(b.contains(100));
        assert!(!b.contains(101));
        assert_eq!(b.icon_or_default(), "🎉");
    }

    #[test]
    fn assessment_lookups() {
        let assessment = Assessment {
            id: "a".into(),
            name: "A".into(),
            description: String::new(),
            share_tagline: None,
            sections: vec![
                Section {
                    id: "s1".into(),
                    title: "One".into(),
                    subtitle: String::new(),
                    max_score: 8,
                    questions: vec!["q1".into(), "q2".into()],
                },
                Section {
                    id: "s2".into(),
                    title: "Two".into(),
                    subtitle: String::new(),
                    max_score: 4,
                    questions: vec!["q3".into()],
                },
            ],
            bands: vec![band(0, 12)],
        };

        assert_eq!(assessment.max_total(), 12);
        assert_eq!(assessment.question_count(), 3);
        assert_eq!(assessment.section_index("s2"), Some(1));
        assert_eq!(assessment.question(&QuestionKey::new("s1", 1)), Some("q2"));
        assert_eq!(assessment.question(&QuestionKey::new("s2", 1)), None);
        assert_eq!(assessment.question(&QuestionKey::new("s9", 0)), None);

        let keys: Vec<String> = assessment.question_keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["s1-0", "s1-1", "s2-0"]);
    }
}
