//! Config command implementation.

use crate::cli::ConfigArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use faris_engine::EngineConfig;

/// Render the engine settings the command asks for as TOML.
pub fn render_engine_config(args: &ConfigArgs, config: &Config) -> Result<String> {
    let engine = match args.preset {
        Some(preset) => EngineConfig::preset(preset.as_str())
            .ok_or_else(|| CliError::Config(format!("Unknown preset '{}'", preset.as_str())))?,
        None => config.engine.clone(),
    };
    engine.to_toml().map_err(CliError::Config)
}

/// Execute the config command.
pub fn execute_config(args: ConfigArgs, config: &Config) -> Result<()> {
    print!("{}", render_engine_config(&args, config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::PresetArg;

    #[test]
    fn test_preset_rendered() {
        let args = ConfigArgs {
            preset: Some(PresetArg::Aggressive),
        };
        let rendered = render_engine_config(&args, &Config::default()).unwrap();
        let parsed = EngineConfig::from_toml(&rendered).unwrap();
        assert_eq!(parsed, EngineConfig::aggressive());
    }

    #[test]
    fn test_configured_engine_rendered() {
        let mut config = Config::default();
        config.engine.max_claims = 7;
        let rendered = render_engine_config(&ConfigArgs { preset: None }, &config).unwrap();
        assert!(rendered.contains("max_claims = 7"));
    }
}
