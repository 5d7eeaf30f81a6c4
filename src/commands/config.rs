//! Config subcommands handler

use anyhow::{Context, Result};

use dsx::Config;

/// Show the effective configuration as TOML.
#[cfg(not(tarpaulin_include))]
pub fn handle_show() -> Result<()> {
    let config = Config::load()?;
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Print where the configuration file lives (whether or not it exists).
#[cfg(not(tarpaulin_include))]
pub fn handle_path() -> Result<()> {
    println!("{}", Config::config_path()?.display());
    Ok(())
}

/// Write the default configuration.
///
/// An existing file is left alone unless `force` is set.
#[cfg(not(tarpaulin_include))]
pub fn handle_init(force: bool) -> Result<()> {
    let config_path = Config::config_path()?;

    if config_path.exists() && !force {
        println!(
            "Config file already exists: {} (use --force to overwrite)",
            config_path.display()
        );
        return Ok(());
    }

    Config::default()
        .save_to(&config_path)
        .with_context(|| format!("Failed to initialize {}", config_path.display()))?;
    println!("Wrote default config to {}", config_path.display());
    Ok(())
}
