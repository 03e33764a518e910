use super::CommandContext;
use crate::ConfigCommands;
use crate::config::RolegateConfig;
use anyhow::Result;
use rolegate_client::crypto::DEFAULT_PERMISSION_SECRET;

pub fn handle_config_command(ctx: &CommandContext, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show_config(ctx),
        ConfigCommands::Set { key, value } => set_config(ctx, &key, &value),
    }
}

fn show_config(ctx: &CommandContext) -> Result<()> {
    let config = &ctx.config;
    println!("Current Configuration");
    println!("====================");

    match &ctx.config_path {
        Some(path) => println!("Config File: {}", path.display()),
        None => println!("Config File: (defaults)"),
    }
    println!("Data Directory: {}", config.data_dir.display());
    println!();

    println!("API Settings:");
    println!("  Base URL: {}", config.api.base_url);
    match config.api.request_timeout_secs {
        Some(secs) => println!("  Request Timeout: {}s", secs),
        None => println!("  Request Timeout: none"),
    }
    println!("  Audit Fetch Size: {}", config.api.audit_fetch_size);
    println!();

    println!("Auth Settings:");
    if config.auth.allowed_domain.is_empty() {
        println!("  Allowed Domain: any");
    } else {
        println!("  Allowed Domain: {}", config.auth.allowed_domain);
    }
    if config.auth.permission_secret == DEFAULT_PERMISSION_SECRET {
        println!("  Permission Secret: (default)");
    } else {
        println!("  Permission Secret: (custom)");
    }
    println!();

    println!("UI Settings:");
    println!("  Refresh Rate: {}ms", config.ui.refresh_rate_ms);
    println!("  Toast Duration: {}s", config.ui.toast_secs);
    println!("  Audit Page Size: {}", config.ui.audit_page_size);

    Ok(())
}

fn set_config(ctx: &CommandContext, key: &str, value: &str) -> Result<()> {
    let path = ctx.config_path.clone().unwrap_or_else(RolegateConfig::default_path);

    // start from the file on disk so flag and env overrides are not persisted
    let mut config = if path.exists() {
        RolegateConfig::load_from_file(&path)?
    } else {
        RolegateConfig::default()
    };
    config.set_value(key, value)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    config.save_to_file(&path)?;
    println!("Set {} = {} in {}", key, value, path.display());
    Ok(())
}
