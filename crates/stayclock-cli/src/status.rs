//! `stayclock status` — show configuration status.

use anyhow::Result;
use colored::Colorize;

use stayclock_core::config::{get_config_path, load_config, Config};

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "⏱ Stayclock Status".cyan().bold());
    println!();

    println!(
        "  {:<14} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );
    println!("  {:<14} {}円/h", "Rate:".bold(), config.billing.rate_per_hour);
    println!(
        "  {:<14} UTC{}",
        "Display zone:".bold(),
        format_offset(config.billing.utc_offset_minutes)
    );
    println!("  {:<14} {}", "Admins:".bold(), config.access.admins.len());
    println!(
        "  {:<14} {}",
        "Commands:".bold(),
        command_summary(&config).dimmed()
    );

    println!();
    let line = &config.channels.line;
    let line_status = if line.is_configured() {
        format!("{} (token and secret set)", "✓".green())
    } else {
        format!("{}", "· not configured".dimmed())
    };
    println!("  {:<14} {}", "LINE:".bold(), line_status);
    println!(
        "  {:<14} {}:{}{}",
        "Webhook:".bold(),
        config.gateway.host,
        config.gateway.port,
        line.webhook_path
    );
    println!();

    Ok(())
}

fn command_summary(config: &Config) -> String {
    let c = &config.commands;
    format!(
        "enter={} exit={} discount={} history={}",
        c.enter, c.exit, c.discount, c.history
    )
}

/// `540` → `+09:00`.
fn format_offset(minutes: i32) -> String {
    let sign = if minutes < 0 { '-' } else { '+' };
    let abs = minutes.unsigned_abs();
    format!("{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets() {
        assert_eq!(format_offset(540), "+09:00");
        assert_eq!(format_offset(0), "+00:00");
        assert_eq!(format_offset(-330), "-05:30");
    }

    #[test]
    fn default_command_summary() {
        let summary = command_summary(&Config::default());
        assert_eq!(summary, "enter=入室 exit=退室 discount=割引 history=利用履歴");
    }
}
