//! HTML results page generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::Result;
use std::path::Path;

use gutscore_core::report::{AssessmentReport, SectionBreakdown};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Only `#rgb` / `#rrggbb` colours reach the stylesheet.
fn css_color(color: &str) -> &str {
    let hex = color.strip_prefix('#').unwrap_or("");
    if matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        color
    } else {
        "currentColor"
    }
}

/// Generate an HTML results page from a report.
pub fn generate_html(report: &AssessmentReport) -> String {
    let mut html = String::new();
    let color = css_color(&report.band.color);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>{} results</title>\n",
        html_escape(&report.assessment.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!(
        "<div class=\"icon\">{}</div>\n",
        html_escape(report.band.icon_or_default())
    ));
    html.push_str(&format!(
        "<h1>{}</h1>\n",
        html_escape(&report.assessment.name)
    ));
    html.push_str(&format!(
        "<p class=\"meta\">{} questions | {}</p>\n",
        report.assessment.question_count,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str(&format!(
        "<p class=\"total\"><span>{}</span> / {}</p>\n",
        report.total, report.max_total
    ));
    html.push_str("</header>\n");

    // Interpretation card
    html.push_str(&format!(
        "<section class=\"interpretation\" style=\"border-color: {color}; color: {color};\">\n"
    ));
    html.push_str(&format!("<h2>{}</h2>\n", html_escape(&report.band.level)));
    html.push_str(&format!(
        "<p>{}</p>\n",
        html_escape(&report.band.description)
    ));
    html.push_str("</section>\n");

    // Recommendations
    if !report.band.recommendations.is_empty() {
        html.push_str("<section class=\"recommendations\">\n");
        html.push_str("<h2>Recommendations</h2>\n<ul>\n");
        for rec in &report.band.recommendations {
            html.push_str(&format!("<li>{}</li>\n", html_escape(rec)));
        }
        html.push_str("</ul>\n</section>\n");
    }

    // Section breakdown
    html.push_str("<section class=\"breakdown\">\n");
    html.push_str("<h2>Section Breakdown</h2>\n");
    html.push_str("<table>\n");
    html.push_str("<thead><tr><th>Section</th><th>Score</th><th></th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for section in &report.sections {
        html.push_str(&breakdown_row(section, color));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    html.push_str(&format!(
        "<p class=\"share\">{}</p>\n",
        html_escape(&report.share_text)
    ));

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

fn breakdown_row(section: &SectionBreakdown, color: &str) -> String {
    let max_width = 200;
    let width = if section.max_score == 0 {
        0
    } else {
        (section.score.min(section.max_score) as usize * max_width) / section.max_score as usize
    };
    format!(
        "<tr><td>{}</td><td>{} / {}</td><td><svg width=\"{max_width}\" height=\"12\" xmlns=\"http://www.w3.org/2000/svg\"><rect width=\"{max_width}\" height=\"12\" rx=\"6\" class=\"track\"/><rect width=\"{width}\" height=\"12\" rx=\"6\" fill=\"{color}\"/></svg></td></tr>\n",
        html_escape(&section.title),
        section.score,
        section.max_score,
    )
}

/// Write an HTML results page to a file.
pub fn write_html_report(report: &AssessmentReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0 auto; max-width: 48rem; padding: 2rem; background: var(--bg); color: var(--fg); }
header { text-align: center; }
.icon { font-size: 3rem; }
.meta { color: #6b7280; }
.total { font-size: 1.5rem; }
.total span { font-size: 3rem; font-weight: bold; }
.interpretation { border: 2px solid; border-radius: 12px; padding: 1rem 1.5rem; margin: 2rem 0; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.track { fill: var(--border); }
.share { font-style: italic; color: #6b7280; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use gutscore_core::model::InterpretationBand;
    use gutscore_core::report::*;
    use std::collections::BTreeMap;

    fn make_test_report() -> AssessmentReport {
        AssessmentReport {
            id: uuid::Uuid::nil(),
            created_at: chrono::Utc::now(),
            assessment: AssessmentSummary {
                id: "gut-health".into(),
                name: "Gut Health Assessment".into(),
                question_count: 2,
            },
            total: 5,
            max_total: 8,
            band: InterpretationBand {
                range_low: 5,
                range_high: 8,
                level: "Moderate Concern".into(),
                color: "#f97316".into(),
                icon: Some("⚠️".into()),
                description: "Active management required.".into(),
                recommendations: vec!["Consult <healthcare> professional".into()],
            },
            sections: vec![SectionBreakdown {
                id: "1A".into(),
                title: "Digestive Symptoms".into(),
                score: 5,
                max_score: 8,
            }],
            answers: BTreeMap::from([("1A-0".to_string(), 4), ("1A-1".to_string(), 1)]),
            share_text: "I scored 5/8 - Moderate Concern!".into(),
        }
    }

    #[test]
    fn html_report_contains_required_elements() {
        let report = make_test_report();
        let html = generate_html(&report);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Gut Health Assessment"));
        assert!(html.contains("Moderate Concern"));
        assert!(html.contains("border-color: #f97316"));
        assert!(html.contains("Digestive Symptoms"));
        assert!(html.contains("5 / 8"));
        assert!(html.contains("width=\"125\""));
    }

    #[test]
    fn html_report_escapes_text() {
        let html = generate_html(&make_test_report());
        assert!(html.contains("Consult &lt;healthcare&gt; professional"));
        assert!(!html.contains("<healthcare>"));
    }

    #[test]
    fn untrusted_color_is_not_injected() {
        let mut report = make_test_report();
        report.band.color = "red; background: url(x)".into();
        let html = generate_html(&report);
        assert!(html.contains("border-color: currentColor"));
        assert!(!html.contains("border-color: red"));
    }

    #[test]
    fn html_report_write_to_file() {
        let report = make_test_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");

        write_html_report(&report, &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
