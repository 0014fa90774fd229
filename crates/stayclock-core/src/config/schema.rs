//! Configuration schema.
//!
//! Hierarchy: `Config` → `BillingConfig`, `AccessConfig`, `CommandsConfig`,
//! `ChannelsConfig`, `GatewayConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};

use crate::billing::DEFAULT_RATE_PER_HOUR;

/// Keyword that opens a session.
pub const ENTER_COMMAND: &str = "入室";
/// Keyword that closes a session and reports the fee.
pub const EXIT_COMMAND: &str = "退室";
/// Keyword that shows the current discount.
pub const DISCOUNT_COMMAND: &str = "割引";
/// Admin-only keyword that lists open sessions.
pub const HISTORY_COMMAND: &str = "利用履歴";

/// Default discount announcement.
pub const DEFAULT_DISCOUNT_NOTICE: &str = "現在、3時間以上の利用で10%割引中です！";

/// Japan Standard Time, in minutes east of UTC.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 9 * 60;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.stayclock/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub billing: BillingConfig,
    pub access: AccessConfig,
    pub commands: CommandsConfig,
    pub channels: ChannelsConfig,
    pub gateway: GatewayConfig,
}

// ─────────────────────────────────────────────
// Billing
// ─────────────────────────────────────────────

/// Fee and display settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillingConfig {
    /// Fee per hour of use, in whole currency units.
    pub rate_per_hour: u64,
    /// Offset used when rendering timestamps to users.
    pub utc_offset_minutes: i32,
    /// Text sent for the discount command.
    pub discount_notice: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            rate_per_hour: DEFAULT_RATE_PER_HOUR,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            discount_notice: DEFAULT_DISCOUNT_NOTICE.to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Access
// ─────────────────────────────────────────────

/// Privileged users.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessConfig {
    /// User ids allowed to run admin-only commands. Empty = nobody.
    pub admins: Vec<String>,
}

// ─────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────

/// Command keywords. Each must equal the whole message body to match.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandsConfig {
    pub enter: String,
    pub exit: String,
    pub discount: String,
    pub history: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            enter: ENTER_COMMAND.to_string(),
            exit: EXIT_COMMAND.to_string(),
            discount: DISCOUNT_COMMAND.to_string(),
            history: HISTORY_COMMAND.to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Channels
// ─────────────────────────────────────────────

/// Chat channel configurations.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelsConfig {
    #[serde(default)]
    pub line: LineConfig,
}

/// LINE Messaging API channel config.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineConfig {
    /// Long-lived channel access token (bearer auth for push/reply).
    #[serde(default)]
    pub channel_access_token: String,
    /// Channel secret used to sign webhook bodies.
    #[serde(default)]
    pub channel_secret: String,
    /// Path the webhook listens on.
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
    /// Messaging API base URL.
    #[serde(default = "default_line_api_base")]
    pub api_base: String,
}

fn default_webhook_path() -> String { "/callback".to_string() }
fn default_line_api_base() -> String { "https://api.line.me".to_string() }

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_access_token: String::new(),
            channel_secret: String::new(),
            webhook_path: default_webhook_path(),
            api_base: default_line_api_base(),
        }
    }
}

impl LineConfig {
    /// Whether both credentials are present.
    pub fn is_configured(&self) -> bool {
        !self.channel_access_token.is_empty() && !self.channel_secret.is_empty()
    }
}

// ─────────────────────────────────────────────
// Gateway
// ─────────────────────────────────────────────

/// HTTP gateway configuration (for incoming webhooks).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayConfig {
    /// Listen address.
    pub host: String,
    /// Listen port.
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
