//! Gateway command — wires the LINE channel, command router and dispatcher.
//!
//! Startup sequence:
//! 1. Load config
//! 2. Create message bus and session store
//! 3. Create command router
//! 4. Create channel manager, register LINE (fails without credentials)
//! 5. Run: `tokio::select!` of router + channel manager; a failed channel ends the run
//! 6. Handle Ctrl+C for graceful shutdown

use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::{error, info};

use stayclock_channels::{ChannelManager, LineChannel};
use stayclock_core::bus::queue::MessageBus;
use stayclock_core::config::{get_config_path, load_config, Config};
use stayclock_core::{SessionStore, SystemClock};
use stayclock_router::CommandRouter;

use crate::helpers;

/// Run the gateway until Ctrl+C.
pub async fn run() -> Result<()> {
    helpers::print_banner();
    println!("  Mode: Gateway");
    println!();

    let config = load_config(None);

    let bus = Arc::new(MessageBus::new(100));
    let sessions = Arc::new(SessionStore::new());
    let router = CommandRouter::from_config(&config, sessions, Arc::new(SystemClock));

    let channel_manager = build_channels(&config, bus.clone())?;
    let line = &config.channels.line;

    info!(
        rate_per_hour = config.billing.rate_per_hour,
        admins = config.access.admins.len(),
        channels = ?channel_manager.channel_names(),
        "gateway starting"
    );

    println!("  Rate:      {}円/h", config.billing.rate_per_hour);
    println!("  Commands:  {}", router.keywords().join(" / "));
    println!(
        "  Webhook:   {}:{}{}",
        config.gateway.host, config.gateway.port, line.webhook_path
    );
    println!();

    println!("  Ctrl+C to stop");
    println!();

    let outcome = tokio::select! {
        _ = router.run(bus.clone()) => {
            info!("command router exited");
            Ok(())
        }
        result = channel_manager.start_all() => result,
        _ = tokio::signal::ctrl_c() => {
            println!();
            println!("  Shutting down...");
            info!("received Ctrl+C, shutting down");
            channel_manager.stop_all().await;
            Ok(())
        }
    };

    if let Err(e) = &outcome {
        error!(error = %e, "gateway stopped on channel failure");
    }
    println!("  Gateway stopped.");
    outcome
}

/// Register the LINE channel. Without credentials there is nothing to serve,
/// so this fails instead of starting an idle gateway.
fn build_channels(config: &Config, bus: Arc<MessageBus>) -> Result<ChannelManager> {
    let line = &config.channels.line;
    if !line.is_configured() {
        bail!(
            "LINE is not configured: set channels.line.channelAccessToken and \
             channelSecret in {} or export LINE_CHANNEL_ACCESS_TOKEN / LINE_CHANNEL_SECRET",
            get_config_path().display()
        );
    }

    let mut channel_manager = ChannelManager::new(bus.clone());
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    channel_manager.register(Arc::new(LineChannel::new(line.clone(), addr, bus)));
    Ok(channel_manager)
}
