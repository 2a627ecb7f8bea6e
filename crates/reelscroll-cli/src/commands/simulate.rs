use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use reelscroll_core::{
    sim::{run_script, Script, SimulationReport},
    AppConfig, AppliedEffect,
};

use crate::OutputFormat;

pub fn run(config: &AppConfig, script_path: &Path, format: OutputFormat, fps: u32) -> Result<()> {
    let script = Script::from_path(script_path)
        .with_context(|| format!("Failed to load script {}", script_path.display()))?;
    let report = run_script(&script, config, fps)?;
    info!(
        "Replayed {} events in {} frames",
        script.events.len(),
        report.frames_run
    );

    match format {
        OutputFormat::Table => print!("{}", render_table(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

/// One row per frame that ran, followed by reveal and boundary events
pub fn render_table(report: &SimulationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>9}  {:>9}  {:>9}  {:>9}  {:<5}  effects",
        "time_ms", "raw", "target", "current", "flags"
    );

    for sample in report.ticks() {
        let mut flags = String::new();
        flags.push(if sample.at_start { 'S' } else { '-' });
        flags.push(if sample.at_end { 'E' } else { '-' });
        flags.push(if sample.settling { '~' } else { '-' });

        let effects: Vec<String> = sample
            .effects
            .iter()
            .map(|(name, effect)| format!("{}={}", name, describe(effect)))
            .collect();

        let _ = writeln!(
            out,
            "{:>9.1}  {:>9.2}  {:>9.2}  {:>9.2}  {:<5}  {}",
            sample.time_ms,
            sample.raw,
            sample.target,
            sample.current,
            flags,
            effects.join(" ")
        );
    }

    if !report.reveals.is_empty() {
        let _ = writeln!(out, "\nRevealed:");
        for (name, animation) in &report.reveals {
            let _ = writeln!(out, "  {} ({})", name, animation);
        }
    }
    if !report.boundaries.is_empty() {
        let _ = writeln!(out, "\nBoundaries:");
        for (edge, reached) in &report.boundaries {
            let verb = if *reached { "reached" } else { "left" };
            let _ = writeln!(out, "  {:?} {}", edge, verb);
        }
    }
    if !report.restored.is_empty() {
        let _ = writeln!(out, "\nRestored: {}", report.restored.join(", "));
    }
    let _ = writeln!(out, "\n{} frames at {} fps", report.frames_run, report.fps);
    out
}

fn describe(effect: &AppliedEffect) -> String {
    match effect {
        AppliedEffect::Translation { x, y } if *x == 0.0 => format!("y{:+.1}", y),
        AppliedEffect::Translation { x, y } => format!("({:+.1},{:+.1})", x, y),
        AppliedEffect::OpacityScale { opacity, scale } => {
            format!("o{:.2}/s{:.3}", opacity, scale)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
        content_extent = 1500.0
        viewport_extent = 500.0

        [[layers]]
        name = "sky"
        category = "background"
        speed = 0.2

        [[reveals]]
        name = "lineup"
        offset = 600.0

        [[events]]
        at_ms = 0
        action = "scroll"
        position = 400.0
    "#;

    #[test]
    fn test_table_lists_frames_and_reveals() {
        let script = Script::from_toml_str(SCRIPT).unwrap();
        let report = run_script(&script, &AppConfig::default(), 60).unwrap();
        let table = render_table(&report);

        assert!(table.starts_with("  time_ms"));
        assert!(table.contains("sky=y-"));
        assert!(table.contains("lineup (fade-in)"));
        assert!(table.contains("Start left"));
        assert!(table.trim_end().ends_with("at 60 fps"));
    }

    #[test]
    fn test_json_output_parses() {
        let script = Script::from_toml_str(SCRIPT).unwrap();
        let report = run_script(&script, &AppConfig::default(), 30).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["fps"], 30);
        assert!(value["samples"].as_array().unwrap().len() > 1);
    }
}
