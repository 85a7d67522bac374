//! Config command implementation.

use crate::cli::{mask_secret, ConfigAction};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let mut display = settings;
            display.api.api_key = display.api.api_key.as_deref().map(mask_secret);

            let toml_str = toml::to_string_pretty(&display)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            let config_path = Settings::default_config_path();
            println!("{}", config_path.display());
        }
    }

    Ok(())
}
