//! List rules command implementation.

use anyhow::Result;
use grain_lint::rules::{all_rules, Preset, ALL_PRESETS};

/// Runs the list-rules command.
///
/// With a preset, only the rules that preset enables are listed.
pub fn run(preset: Option<&str>) -> Result<()> {
    let preset = preset.map(str::parse::<Preset>).transpose()?;
    let enabled = preset.map(Preset::rule_names);

    match preset {
        Some(p) => println!("Rules enabled by the {p} preset:\n"),
        None => println!("Available rules:\n"),
    }
    println!("{:<34} {:<9} Description", "Rule", "Severity");
    println!("{}", "-".repeat(96));

    for rule in all_rules() {
        if enabled.as_ref().is_some_and(|names| !names.contains(&rule.name())) {
            continue;
        }
        println!(
            "{:<34} {:<9} {}",
            rule.id(),
            rule.default_severity().to_string(),
            rule.description()
        );
        let ids: Vec<&str> = rule.messages().iter().map(|m| m.id).collect();
        println!("{:<34} messages: {}", "", ids.join(", "));
    }

    println!("\nPresets:");
    for p in ALL_PRESETS {
        let marker = if p == Preset::default() { " (default)" } else { "" };
        println!(
            "  {:<12} - {} rules{}",
            p.as_str(),
            p.rule_names().len(),
            marker
        );
    }

    println!("\nSuppress a rule on the next line with:");
    println!("  // grain-lint: allow(no-try-catch) reason=\"SDK throws on cancel\"");

    Ok(())
}
