//! TOML assessment parser.
//!
//! Loads assessments and answer sheets from TOML files and directories,
//! and validates assessment definitions.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Assessment, InterpretationBand, QuestionKey, Section, MAX_QUESTION_SCORE};

/// Intermediate TOML structure for parsing assessment files.
#[derive(Debug, Deserialize)]
struct TomlAssessmentFile {
    assessment: TomlAssessmentHeader,
    #[serde(default)]
    sections: Vec<TomlSection>,
    #[serde(default)]
    bands: Vec<TomlBand>,
}

#[derive(Debug, Deserialize)]
struct TomlAssessmentHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    share_tagline: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlSection {
    id: String,
    title: String,
    #[serde(default)]
    subtitle: String,
    /// Defaults to four points per question.
    #[serde(default)]
    max_score: Option<u32>,
    #[serde(default)]
    questions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TomlBand {
    range: [u32; 2],
    level: String,
    color: String,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    recommendations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TomlAnswersFile {
    #[serde(default)]
    answers: BTreeMap<String, i64>,
}

/// Parse a single TOML file into an `Assessment`.
pub fn parse_assessment(path: &Path) -> Result<Assessment> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read assessment file: {}", path.display()))?;

    parse_assessment_str(&content, path)
}

/// Parse a TOML string into an `Assessment` (useful for testing).
pub fn parse_assessment_str(content: &str, source_path: &Path) -> Result<Assessment> {
    let parsed: TomlAssessmentFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    anyhow::ensure!(
        !parsed.sections.is_empty(),
        "assessment '{}' has no sections",
        parsed.assessment.id
    );
    anyhow::ensure!(
        !parsed.bands.is_empty(),
        "assessment '{}' has no interpretation bands",
        parsed.assessment.id
    );

    let sections = parsed
        .sections
        .into_iter()
        .map(|s| Section {
            max_score: s
                .max_score
                .unwrap_or(s.questions.len() as u32 * u32::from(MAX_QUESTION_SCORE)),
            id: s.id,
            title: s.title,
            subtitle: s.subtitle,
            questions: s.questions,
        })
        .collect();

    let bands = parsed
        .bands
        .into_iter()
        .map(|b| {
            let [range_low, range_high] = b.range;
            anyhow::ensure!(
                range_low <= range_high,
                "band '{}' has an inverted range [{range_low}, {range_high}]",
                b.level
            );
            Ok(InterpretationBand {
                range_low,
                range_high,
                level: b.level,
                color: b.color,
                icon: b.icon,
                description: b.description,
                recommendations: b.recommendations,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Assessment {
        id: parsed.assessment.id,
        name: parsed.assessment.name,
        description: parsed.assessment.description,
        share_tagline: parsed.assessment.share_tagline,
        sections,
        bands,
    })
}

/// Recursively load all `.toml` assessment files from a directory.
pub fn load_assessment_directory(dir: &Path) -> Result<Vec<Assessment>> {
    let mut assessments = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            assessments.extend(load_assessment_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_assessment(&path) {
                Ok(assessment) => assessments.push(assessment),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(assessments)
}

/// Parse an answer sheet file into `(key, score)` pairs.
pub fn parse_answers(path: &Path) -> Result<Vec<(QuestionKey, u8)>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers file: {}", path.display()))?;

    parse_answers_str(&content, path)
}

/// Parse an answer sheet of the form `[answers]` / `"1A-0" = 3`.
///
/// Pairs are returned sorted by key. Range checking against the scale is
/// left to the engine; only values that cannot be a score at all are refused.
/// Two spellings of the same question (`"1A-0"` and `"1A-00"`) are an error.
pub fn parse_answers_str(content: &str, source_path: &Path) -> Result<Vec<(QuestionKey, u8)>> {
    let parsed: TomlAnswersFile = toml::from_str(content)
        .with_context(|| format!("failed to parse answers: {}", source_path.display()))?;

    let mut answers: BTreeMap<QuestionKey, (String, u8)> = BTreeMap::new();
    for (raw, value) in parsed.answers {
        let key: QuestionKey = raw.parse()?;
        let score = u8::try_from(value).map_err(|_| {
            anyhow::anyhow!("score {value} for {raw} is out of range 0-{MAX_QUESTION_SCORE}")
        })?;
        if let Some((first, _)) = answers.get(&key) {
            anyhow::bail!(
                "duplicate answer for {key} in {}: '{first}' and '{raw}'",
                source_path.display()
            );
        }
        answers.insert(key, (raw, score));
    }

    Ok(answers
        .into_iter()
        .map(|(key, (_, score))| (key, score))
        .collect())
}

/// A warning from assessment validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The section ID (if applicable).
    pub section_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate an assessment for common authoring issues.
pub fn validate_assessment(assessment: &Assessment) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let scale = u32::from(MAX_QUESTION_SCORE);

    let mut seen_ids = HashSet::new();
    for section in &assessment.sections {
        if !seen_ids.insert(&section.id) {
            warnings.push(ValidationWarning {
                section_id: Some(section.id.clone()),
                message: format!("duplicate section ID: {}", section.id),
            });
        }
    }

    for section in &assessment.sections {
        if section.questions.is_empty() {
            warnings.push(ValidationWarning {
                section_id: Some(section.id.clone()),
                message: "section has no questions".into(),
            });
            continue;
        }
        let reachable = section.questions.len() as u32 * scale;
        if section.max_score != reachable {
            warnings.push(ValidationWarning {
                section_id: Some(section.id.clone()),
                message: format!(
                    "max_score is {} but {} questions score at most {reachable}",
                    section.max_score,
                    section.questions.len()
                ),
            });
        }
    }

    for section in &assessment.sections {
        for (i, question) in section.questions.iter().enumerate() {
            if question.trim().is_empty() {
                warnings.push(ValidationWarning {
                    section_id: Some(section.id.clone()),
                    message: format!("question {i} is empty"),
                });
            }
        }
    }

    let max_total = assessment.max_total();

    if let Some(first) = assessment.bands.first() {
        if first.range_low > 0 {
            warnings.push(ValidationWarning {
                section_id: None,
                message: format!(
                    "totals below {} match no band; '{}' starts there",
                    first.range_low, first.level
                ),
            });
        }
    }

    for pair in assessment.bands.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.range_low <= prev.range_high {
            warnings.push(ValidationWarning {
                section_id: None,
                message: format!(
                    "bands '{}' and '{}' overlap; the earlier band wins",
                    prev.level, next.level
                ),
            });
        } else if next.range_low > prev.range_high + 1 {
            warnings.push(ValidationWarning {
                section_id: None,
                message: format!(
                    "totals {}-{} fall between bands '{}' and '{}'",
                    prev.range_high + 1,
                    next.range_low - 1,
                    prev.level,
                    next.level
                ),
            });
        }
    }

    for band in &assessment.bands {
        if band.range_low > max_total {
            warnings.push(ValidationWarning {
                section_id: None,
                message: format!(
                    "band '{}' starts at {} but the highest possible total is {max_total}",
                    band.level, band.range_low
                ),
            });
        } else if band.range_high > max_total {
            warnings.push(ValidationWarning {
                section_id: None,
                message: format!(
                    "band '{}' extends to {} but the highest possible total is {max_total}",
                    band.level, band.range_high
                ),
            });
        }
    }

    if let Some(top) = assessment.bands.iter().map(|b| b.range_high).max() {
        if top < max_total {
            warnings.push(ValidationWarning {
                section_id: None,
                message: format!("totals {}-{max_total} match no band", top + 1),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r##"
[assessment]
id = "sleep"
name = "Sleep Check"
description = "A short sleep questionnaire"
share_tagline = "Time for bed."

[[sections]]
id = "night"
title = "Night"
subtitle = "0 = Never ... 4 = Always"
max_score = 8
questions = ["Trouble falling asleep", "Waking during the night"]

[[sections]]
id = "day"
title = "Day"
questions = ["Daytime sleepiness"]

[[bands]]
range = [0, 6]
level = "Rested"
color = "#22c55e"
description = "All good."
recommendations = ["Keep it up"]

[[bands]]
range = [7, 12]
level = "Tired"
color = "#ef4444"
icon = "😴"
description = "Get more sleep."
"##;

    #[test]
    fn parse_valid_toml() {
        let a = parse_assessment_str(VALID_TOML, &PathBuf::from("sleep.toml")).unwrap();
        assert_eq!(a.id, "sleep");
        assert_eq!(a.name, "Sleep Check");
        assert_eq!(a.share_tagline.as_deref(), Some("Time for bed."));
        assert_eq!(a.sections.len(), 2);
        assert_eq!(a.sections[0].max_score, 8);
        assert_eq!(a.bands[1].range_low, 7);
        assert_eq!(a.bands[1].icon.as_deref(), Some("😴"));
        assert!(validate_assessment(&a).is_empty());
    }

    #[test]
    fn missing_max_score_defaults_to_scale() {
        let a = parse_assessment_str(VALID_TOML, &PathBuf::from("sleep.toml")).unwrap();
        assert_eq!(a.sections[1].max_score, 4);
        assert_eq!(a.sections[1].subtitle, "");
    }

    #[test]
    fn reject_assessment_without_sections_or_bands() {
        let no_sections = r##"
[assessment]
id = "empty"
name = "Empty"

[[bands]]
range = [0, 1]
level = "Any"
color = "#000"
"##;
        let err = parse_assessment_str(no_sections, &PathBuf::from("e.toml")).unwrap_err();
        assert!(err.to_string().contains("no sections"));

        let no_bands = r##"
[assessment]
id = "empty"
name = "Empty"

[[sections]]
id = "s"
title = "S"
questions = ["q"]
"##;
        let err = parse_assessment_str(no_bands, &PathBuf::from("e.toml")).unwrap_err();
        assert!(err.to_string().contains("no interpretation bands"));
    }

    #[test]
    fn reject_inverted_band_range() {
        let toml = r##"
[assessment]
id = "bad"
name = "Bad"

[[sections]]
id = "s"
title = "S"
questions = ["q"]

[[bands]]
range = [4, 0]
level = "Backwards"
color = "#000"
"##;
        let err = parse_assessment_str(toml, &PathBuf::from("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("inverted range"));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_assessment_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn validate_flags_authoring_issues() {
        let toml = r##"
[assessment]
id = "messy"
name = "Messy"

[[sections]]
id = "s"
title = "S"
max_score = 10
questions = ["q1", " "]

[[sections]]
id = "s"
title = "Again"
questions = []

[[bands]]
range = [1, 3]
level = "Low"
color = "#000"

[[bands]]
range = [3, 4]
level = "Mid"
color = "#111"

[[bands]]
range = [6, 20]
level = "High"
color = "#222"
"##;
        let a = parse_assessment_str(toml, &PathBuf::from("messy.toml")).unwrap();
        let messages: Vec<String> = validate_assessment(&a)
            .into_iter()
            .map(|w| w.message)
            .collect();

        let has = |needle: &str| messages.iter().any(|m| m.contains(needle));
        assert!(has("duplicate section ID"));
        assert!(has("no questions"));
        assert!(has("max_score is 10"));
        assert!(has("question 1 is empty"));
        assert!(has("totals below 1"));
        assert!(has("overlap"));
        assert!(has("totals 5-5 fall between"));
        assert!(has("extends to 20"));
    }

    #[test]
    fn validate_reports_uncovered_top_range() {
        let toml = r##"
[assessment]
id = "short"
name = "Short"

[[sections]]
id = "s"
title = "S"
questions = ["q1", "q2"]

[[bands]]
range = [0, 5]
level = "Only"
color = "#000"
"##;
        let a = parse_assessment_str(toml, &PathBuf::from("short.toml")).unwrap();
        let warnings = validate_assessment(&a);
        assert!(warnings
            .iter()
            .any(|w| w.message == "totals 6-8 match no band"));
    }

    #[test]
    fn parse_answer_sheet() {
        let toml = r#"
[answers]
"1A-0" = 3
"1A-1" = 0
"pre-op-2" = 4
"#;
        let answers = parse_answers_str(toml, &PathBuf::from("answers.toml")).unwrap();
        assert_eq!(answers.len(), 3);
        assert_eq!(answers[0], (QuestionKey::new("1A", 0), 3));
        assert!(answers.contains(&(QuestionKey::new("pre-op", 2), 4)));
    }

    #[test]
    fn answer_sheet_rejects_bad_keys_and_negative_scores() {
        let bad_key = "[answers]\nbloating = 2\n";
        assert!(parse_answers_str(bad_key, &PathBuf::from("a.toml")).is_err());

        let negative = "[answers]\n\"1A-0\" = -1\n";
        let err = parse_answers_str(negative, &PathBuf::from("a.toml")).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn answer_sheet_rejects_two_spellings_of_one_question() {
        let toml = "[answers]\n\"1A-0\" = 4\n\"1A-00\" = 1\n";
        let err = parse_answers_str(toml, &PathBuf::from("a.toml")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("duplicate answer for 1A-0"), "{msg}");
        assert!(msg.contains("'1A-0' and '1A-00'"), "{msg}");

        let padded = "[answers]\n\"1A-0\" = 4\n\" 1A-0\" = 1\n";
        assert!(parse_answers_str(padded, &PathBuf::from("a.toml")).is_err());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sleep.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not = [valid").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let assessments = load_assessment_directory(dir.path()).unwrap();
        assert_eq!(assessments.len(), 1);
        assert_eq!(assessments[0].id, "sleep");
    }

    #[test]
    fn load_directory_rejects_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sleep.toml");
        std::fs::write(&file, VALID_TOML).unwrap();
        assert!(load_assessment_directory(&file).is_err());
    }
}
