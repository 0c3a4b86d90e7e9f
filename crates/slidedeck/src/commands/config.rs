use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load_or_default();
            config.set(&key, &value)?;
            let path = config.save()?;
            println!(
                "{} {key} = {value} ({})",
                "Saved".green().bold(),
                path.display().to_string().dimmed()
            );
            Ok(())
        }
    }
}

fn show() -> Result<()> {
    let config = Config::load_or_default();
    let path = Config::path()?;

    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "(not created yet, showing defaults)".dimmed());
    }
    println!();

    for (key, value) in effective_values(&config) {
        println!("  {:<24} {}", key.cyan(), value);
    }
    Ok(())
}

/// Every key with the value the presenter will actually use.
fn effective_values(config: &Config) -> Vec<(&'static str, String)> {
    vec![
        (
            "defaults.theme",
            config.default_theme().unwrap_or("light").to_string(),
        ),
        (
            "defaults.transition",
            config.default_transition().unwrap_or("fade").to_string(),
        ),
        (
            "defaults.transition_ms",
            config.transition_duration().as_millis().to_string(),
        ),
        (
            "defaults.aspect",
            config
                .default_aspect()
                .map_or_else(|| "screen".to_string(), |a| a.to_string()),
        ),
        (
            "defaults.start_slide",
            config.start_index().map_or(1, |i| i + 1).to_string(),
        ),
        (
            "controls.hide_after_ms",
            config.controls_hide_delay().as_millis().to_string(),
        ),
        (
            "precache.background",
            config.background_precache().to_string(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_values_reflect_overrides() {
        let mut config = Config::default();
        config.set("defaults.transition_ms", "500").unwrap();
        let values = effective_values(&config);
        let lookup = |key: &str| {
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
        };
        assert_eq!(lookup("defaults.transition_ms").as_deref(), Some("500"));
        assert_eq!(lookup("defaults.theme").as_deref(), Some("light"));
        assert_eq!(lookup("controls.hide_after_ms").as_deref(), Some("2000"));
        assert_eq!(values.len(), 7);
    }
}
