//! Terminal rendering of sections and results.

use std::io::{self, Write};

use comfy_table::{Cell, Table};

use gutscore_core::engine::AssessmentEngine;

const BAR_WIDTH: usize = 20;

/// A `[#####...............]` bar for `percent` in 0-100.
pub fn progress_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// Header for the active section: progress, title, running score, guidance.
pub fn render_section(engine: &AssessmentEngine, out: &mut impl Write) -> io::Result<()> {
    let progress = engine.progress();
    let section = engine.current_section();
    let index = engine.current_section_index();

    writeln!(out)?;
    writeln!(
        out,
        "{}  {} {:.0}%",
        progress.label(),
        progress_bar(progress.percent),
        progress.percent
    )?;
    writeln!(
        out,
        "{} (score {} / {})",
        section.title,
        engine.section_totals()[index],
        section.max_score
    )?;
    if !section.subtitle.is_empty() {
        writeln!(out, "{}", section.subtitle)?;
    }
    Ok(())
}

/// Results screen: total, interpretation, recommendations, breakdown, share text.
pub fn render_results(engine: &AssessmentEngine, out: &mut impl Write) -> io::Result<()> {
    let Some(outcome) = engine.outcome() else {
        return writeln!(out, "Assessment not complete yet.");
    };
    let band = outcome.band;

    writeln!(out)?;
    writeln!(out, "{} Your results", band.icon_or_default())?;
    writeln!(out, "Total score: {} / {}", outcome.total, outcome.max_total)?;
    writeln!(out, "Level: {} ({})", band.level, band.color)?;
    writeln!(out, "{}", band.description)?;

    if !band.recommendations.is_empty() {
        writeln!(out)?;
        writeln!(out, "Recommendations:")?;
        for rec in &band.recommendations {
            writeln!(out, "  • {rec}")?;
        }
    }

    let mut table = Table::new();
    table.set_header(vec!["Section", "Score", "Max"]);
    for (section, total) in engine
        .assessment()
        .sections
        .iter()
        .zip(engine.section_totals())
    {
        table.add_row(vec![
            Cell::new(&section.title),
            Cell::new(total),
            Cell::new(section.max_score),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(outcome.total),
        Cell::new(outcome.max_total),
    ]);

    writeln!(out)?;
    writeln!(out, "Section breakdown:")?;
    writeln!(out, "{table}")?;
    writeln!(out)?;
    writeln!(out, "Share: {}", engine.share_text())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gutscore_core::dataset::gut_health;

    #[test]
    fn progress_bar_widths() {
        assert_eq!(progress_bar(0.0), format!("[{}]", ".".repeat(20)));
        assert_eq!(progress_bar(100.0), format!("[{}]", "#".repeat(20)));
        assert_eq!(progress_bar(20.0), format!("[####{}]", ".".repeat(16)));
        assert_eq!(progress_bar(250.0), format!("[{}]", "#".repeat(20)));
    }

    #[test]
    fn section_header_shows_progress_and_score() {
        let mut engine = AssessmentEngine::new(gut_health().unwrap()).unwrap();
        engine.record_answer_str("1A-0", 3).unwrap();

        let mut buf = Vec::new();
        render_section(&engine, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Section 1 of 5"));
        assert!(text.contains("20%"));
        assert!(text.contains("Digestive Symptoms (score 3 / 32)"));
    }

    #[test]
    fn results_screen() {
        let mut engine = AssessmentEngine::new(gut_health().unwrap()).unwrap();
        let mut buf = Vec::new();
        render_results(&engine, &mut buf).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("not complete"));

        while !engine.is_complete() {
            engine.advance_section();
        }
        let mut buf = Vec::new();
        render_results(&engine, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("🌟 Your results"));
        assert!(text.contains("Total score: 0 / 116"));
        assert!(text.contains("Level: Optimal (#22c55e)"));
        assert!(text.contains("Continue your healthy habits"));
        assert!(text.contains("Quality of Life Impact"));
        assert!(text.contains("scored 0/116 - Optimal"));
    }
}
