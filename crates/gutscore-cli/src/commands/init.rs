//! The `gutscore init` command.

use std::path::Path;

use anyhow::{Context, Result};

use gutscore_core::dataset::GUT_HEALTH_TOML;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("gutscore.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("assessments").context("failed to create assessments/")?;
    write_if_missing(Path::new("assessments/example.toml"), GUT_HEALTH_TOML)?;
    write_if_missing(Path::new("answers-example.toml"), EXAMPLE_ANSWERS)?;

    println!("\nNext steps:");
    println!("  1. Edit assessments/example.toml to adjust questions or bands");
    println!("  2. Run: gutscore validate --assessment assessments/example.toml");
    println!("  3. Run: gutscore take --assessment assessments/example.toml");
    println!("  4. Or score a prepared sheet: gutscore score --answers answers-example.toml");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
        return Ok(());
    }
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gutscore configuration

# Assessment to use instead of the built-in gut health assessment.
# assessment = "assessments/example.toml"

output_dir = "./gutscore-results"
format = "json"     # json, html, or all
save_results = false
"#;

const EXAMPLE_ANSWERS: &str = r#"# Scores from 0 (never) to 4 (always), keyed "<section>-<question index>".
# Questions left out count as 0.

[answers]
"1A-0" = 2
"1A-1" = 1
"1A-3" = 3
"1B-2" = 1
"1B-3" = 2
"2-0" = 1
"2-4" = 2
"3-1" = 3
"4-0" = 1
"#;
