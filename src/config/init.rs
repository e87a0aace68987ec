use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::{get_config_path, Config};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Serialize `config` as YAML to `path`, creating parent directories.
pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    std::fs::write(path, &yaml)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    Ok(())
}

/// Write the built-in configuration, asking for the default domain and list length.
///
/// With `force` an existing file is overwritten without asking. With `accept_defaults`
/// nothing is prompted at all.
pub fn run_init_wizard(path: Option<PathBuf>, force: bool, accept_defaults: bool) -> Result<PathBuf> {
    let config_path = match path {
        Some(path) => path,
        None => get_config_path()?,
    };

    if config_path.exists() && !force {
        if accept_defaults {
            anyhow::bail!(
                "Config already exists at {}. Use --force to overwrite",
                config_path.display()
            );
        }
        let overwrite = prompt_yes_no(
            &format!("Config already exists at {}. Overwrite?", config_path.display()),
            false,
        )?;
        if !overwrite {
            anyhow::bail!("Aborted");
        }
    }

    let mut config = Config::default();

    if !accept_defaults {
        println!("PlaceRank configuration");
        println!("=======================");
        println!();
        let domains: Vec<&str> = config.domains.keys().map(String::as_str).collect();
        println!("Domains: {}", domains.join(", "));

        let current = config.default_domain().unwrap_or_default().to_string();
        let domain = loop {
            let input = prompt_with_default("Default domain", &current)?;
            if config.domains.contains_key(&input) {
                break input;
            }
            println!("  Unknown domain '{}'. Try again.", input);
        };

        let top = loop {
            let input = prompt_with_default("Entries to list", "10")?;
            match input.parse::<usize>() {
                Ok(n) if n > 0 => break n,
                _ => println!("  Invalid: must be a positive number. Try again."),
            }
        };

        config.default_domain = Some(domain);
        config.top = Some(top);
    }

    write_config(&config_path, &config)?;
    Ok(config_path)
}
