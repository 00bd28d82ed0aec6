pub mod terminal;

use clap::Parser;
use crate::config::{ BrandingPatch, ConfigPatch, Position, ThemePatch };
use crate::config::embed::EmbedConfig;
use crate::transport::ClientContext;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Terminal host for the Landmark Africa chat widget", long_about = None)]
pub struct Args {
    // --- Backend Args ---
    /// Base URL of the chat backend (e.g., https://your-api.com/api)
    #[arg(long, env = "API_URL")]
    pub api_url: Option<String>,

    /// Bearer token sent with every backend request
    #[arg(long, env = "API_KEY")]
    pub api_key: Option<String>,

    /// Use the offline demo responder instead of the backend (true/false)
    #[arg(long, env = "DEMO")]
    pub demo: Option<bool>,

    /// Seconds before a backend request is abandoned
    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    // --- Display Args ---
    /// Corner the widget is anchored to (bottom-right, bottom-left, top-right, top-left)
    #[arg(long, env = "POSITION")]
    pub position: Option<Position>,

    /// Open the panel shortly after start-up (true/false)
    #[arg(long, env = "AUTO_OPEN")]
    pub auto_open: Option<bool>,

    #[arg(long, env = "PRIMARY_COLOR")]
    pub primary_color: Option<String>,

    #[arg(long, env = "SECONDARY_COLOR")]
    pub secondary_color: Option<String>,

    #[arg(long, env = "WIDGET_TITLE")]
    pub title: Option<String>,

    #[arg(long, env = "WIDGET_SUBTITLE")]
    pub subtitle: Option<String>,

    // --- Client Context Args ---
    /// Page URL reported to the backend
    #[arg(long, env = "PAGE_URL", default_value = "")]
    pub page_url: String,

    /// Referrer reported to the backend
    #[arg(long, env = "REFERRER", default_value = "")]
    pub referrer: String,

    /// Embed-style data attribute (e.g., --attr data-api-url=https://...). Repeatable.
    /// Explicit flags take precedence over attributes.
    #[arg(long = "attr", value_name = "NAME=VALUE")]
    pub attributes: Vec<String>,
}

impl Args {
    /// Overrides given as flags or environment variables.
    pub fn to_patch(&self) -> ConfigPatch {
        let theme = if self.primary_color.is_some() || self.secondary_color.is_some() {
            Some(ThemePatch {
                primary_color: self.primary_color.clone(),
                secondary_color: self.secondary_color.clone(),
            })
        } else {
            None
        };
        let branding = if self.title.is_some() || self.subtitle.is_some() {
            Some(BrandingPatch {
                title: self.title.clone(),
                subtitle: self.subtitle.clone(),
            })
        } else {
            None
        };

        ConfigPatch {
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            demo: self.demo,
            theme,
            branding,
            position: self.position,
            auto_open: self.auto_open,
            request_timeout_secs: self.request_timeout_secs,
        }
    }

    /// Defaults, then embed attributes, then explicit flags.
    pub fn resolve_patch(&self) -> ConfigPatch {
        EmbedConfig::from_pairs(&self.attributes).patch.overlay(self.to_patch())
    }

    pub fn client_context(&self) -> ClientContext {
        ClientContext {
            page: self.page_url.clone(),
            referrer: self.referrer.clone(),
            ..ClientContext::default()
        }
    }
}
