pub mod embed;

use serde::{ Deserialize, Serialize };
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://your-api.com/api";
pub const DEFAULT_PRIMARY_COLOR: &str = "#6366f1";
pub const DEFAULT_SECONDARY_COLOR: &str = "#8b5cf6";
pub const DEFAULT_TITLE: &str = "Landmark Africa";
pub const DEFAULT_SUBTITLE: &str = "AI Assistant";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid widget position: '{0}'")]
    InvalidPosition(String),
    #[error("Invalid value for '{key}': {reason}")]
    InvalidAttribute { key: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

impl Position {
    pub fn is_bottom(&self) -> bool {
        matches!(self, Position::BottomRight | Position::BottomLeft)
    }

    pub fn is_right(&self) -> bool {
        matches!(self, Position::BottomRight | Position::TopRight)
    }
}

impl FromStr for Position {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bottom-right" => Ok(Position::BottomRight),
            "bottom-left" => Ok(Position::BottomLeft),
            "top-right" => Ok(Position::TopRight),
            "top-left" => Ok(Position::TopLeft),
            _ => Err(ConfigError::InvalidPosition(s.to_string())),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Position::BottomRight => "bottom-right",
            Position::BottomLeft => "bottom-left",
            Position::TopRight => "top-right",
            Position::TopLeft => "top-left",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub primary_color: String,
    pub secondary_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            secondary_color: DEFAULT_SECONDARY_COLOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branding {
    pub title: String,
    pub subtitle: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            subtitle: DEFAULT_SUBTITLE.to_string(),
        }
    }
}

/// Immutable configuration snapshot. A change always produces a new snapshot
/// through [`WidgetConfig::merged`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub api_url: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub demo: bool,
    pub theme: Theme,
    pub branding: Branding,
    pub position: Position,
    pub auto_open: bool,
    #[serde(skip)]
    pub request_timeout: Duration,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            demo: true,
            theme: Theme::default(),
            branding: Branding::default(),
            position: Position::default(),
            auto_open: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl WidgetConfig {
    pub fn from_patch(patch: &ConfigPatch) -> Self {
        Self::default().merged(patch)
    }

    /// Returns a new snapshot with every key present in `patch` applied.
    pub fn merged(&self, patch: &ConfigPatch) -> Self {
        let mut next = self.clone();
        if let Some(url) = &patch.api_url {
            next.api_url = url.clone();
        }
        if let Some(key) = &patch.api_key {
            next.api_key = key.clone();
        }
        if let Some(demo) = patch.demo {
            next.demo = demo;
        }
        if let Some(theme) = &patch.theme {
            if let Some(c) = &theme.primary_color {
                next.theme.primary_color = c.clone();
            }
            if let Some(c) = &theme.secondary_color {
                next.theme.secondary_color = c.clone();
            }
        }
        if let Some(branding) = &patch.branding {
            if let Some(t) = &branding.title {
                next.branding.title = t.clone();
            }
            if let Some(s) = &branding.subtitle {
                next.branding.subtitle = s.clone();
            }
        }
        if let Some(position) = patch.position {
            next.position = position;
        }
        if let Some(auto_open) = patch.auto_open {
            next.auto_open = auto_open;
        }
        if let Some(secs) = patch.request_timeout_secs {
            next.request_timeout = Duration::from_secs(secs);
        }
        next
    }

    /// True when `other` would need a different transport than `self`.
    pub fn transport_differs(&self, other: &WidgetConfig) -> bool {
        self.api_url != other.api_url ||
            self.api_key != other.api_key ||
            self.demo != other.demo ||
            self.request_timeout != other.request_timeout
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePatch {
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BrandingPatch {
    pub title: Option<String>,
    pub subtitle: Option<String>,
}

/// Partial configuration supplied by the host: construction overrides,
/// `updateConfig` calls and embed attributes all resolve to one of these.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub demo: Option<bool>,
    pub theme: Option<ThemePatch>,
    pub branding: Option<BrandingPatch>,
    pub position: Option<Position>,
    pub auto_open: Option<bool>,
    pub request_timeout_secs: Option<u64>,
}

impl ConfigPatch {
    /// Layers `other` on top of `self`; keys set in `other` win.
    pub fn overlay(mut self, other: ConfigPatch) -> Self {
        self.api_url = other.api_url.or(self.api_url);
        self.api_key = other.api_key.or(self.api_key);
        self.demo = other.demo.or(self.demo);
        self.position = other.position.or(self.position);
        self.auto_open = other.auto_open.or(self.auto_open);
        self.request_timeout_secs = other.request_timeout_secs.or(self.request_timeout_secs);

        if let Some(theme) = other.theme {
            let current = self.theme.get_or_insert_with(ThemePatch::default);
            if theme.primary_color.is_some() {
                current.primary_color = theme.primary_color;
            }
            if theme.secondary_color.is_some() {
                current.secondary_color = theme.secondary_color;
            }
        }
        if let Some(branding) = other.branding {
            let current = self.branding.get_or_insert_with(BrandingPatch::default);
            if branding.title.is_some() {
                current.title = branding.title;
            }
            if branding.subtitle.is_some() {
                current.subtitle = branding.subtitle;
            }
        }
        self
    }
}
