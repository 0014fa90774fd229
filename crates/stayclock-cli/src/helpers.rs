//! Shared CLI helpers — banner and delivery printing.

use colored::Colorize;

use stayclock_core::bus::types::OutboundMessage;

/// Print the banner shown at startup.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "⏱ Stayclock".cyan().bold(), version.dimmed());
    println!();
}

/// Label describing how a delivery would reach the user.
pub fn delivery_label(msg: &OutboundMessage) -> String {
    if msg.is_reply() {
        "reply".to_string()
    } else {
        format!("push → {}", msg.chat_id)
    }
}

/// Print an outbound delivery, one bubble per line block.
pub fn print_delivery(msg: &OutboundMessage) {
    println!();
    println!("{}", format!("[{}]", delivery_label(msg)).dimmed());
    for text in &msg.contents {
        println!("{}", text.trim_end());
    }
    println!();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
