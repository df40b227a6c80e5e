use crate::config::{BlogConfig, CONFIG_FILE_NAME, StoreSettings};
use crate::error::BlogError;
use anyhow::Result;
use colored::Colorize;

pub fn handle_init() -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config_path = cwd.join(CONFIG_FILE_NAME);

    if config_path.exists() {
        return Err(BlogError::AlreadyInitialized(config_path.display().to_string()).into());
    }

    let config = BlogConfig {
        store: StoreSettings {
            data_file: Some(".blogql/data.json".to_string()),
        },
        ..BlogConfig::default()
    };
    config.save(&config_path)?;

    println!("{} blogql project in {}", "Initialized".green(), cwd.display());
    println!("  Config: {}", config_path.display());
    if let Some(data_file) = config.data_file(&cwd) {
        println!("  Data:   {}", data_file.display());
    }

    Ok(())
}
