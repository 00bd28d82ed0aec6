use std::collections::BTreeMap;
use log::{ debug, warn };
use crate::config::{ BrandingPatch, ConfigError, ConfigPatch, ThemePatch };

/// A data-attribute value after coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl AttrValue {
    /// `"true"`/`"false"` become booleans, numeric-looking strings become
    /// numbers, everything else stays text.
    pub fn coerce(raw: &str) -> Self {
        match raw {
            "true" => return AttrValue::Bool(true),
            "false" => return AttrValue::Bool(false),
            _ => {}
        }
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            if let Ok(n) = trimmed.parse::<f64>() {
                if !n.is_nan() {
                    return AttrValue::Number(n);
                }
            }
        }
        AttrValue::Text(raw.to_string())
    }

    fn into_bool(self, key: &str) -> Result<bool, ConfigError> {
        match self {
            AttrValue::Bool(b) => Ok(b),
            other =>
                Err(ConfigError::InvalidAttribute {
                    key: key.to_string(),
                    reason: format!("expected true or false, got {:?}", other),
                }),
        }
    }

    fn into_seconds(self, key: &str) -> Result<u64, ConfigError> {
        match self {
            AttrValue::Number(n) if n >= 0.0 && n.is_finite() => Ok(n.round() as u64),
            other =>
                Err(ConfigError::InvalidAttribute {
                    key: key.to_string(),
                    reason: format!("expected a number of seconds, got {:?}", other),
                }),
        }
    }
}

/// Converts `data-api-url` / `api-url` to `apiUrl`.
pub fn attribute_key(name: &str) -> String {
    let name = name.trim();
    let name = name.strip_prefix("data-").unwrap_or(name);
    let mut key = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '-' {
            match chars.peek() {
                Some(next) if next.is_ascii_lowercase() => {
                    key.push(next.to_ascii_uppercase());
                    chars.next();
                }
                _ => key.push(c),
            }
        } else {
            key.push(c);
        }
    }
    key
}

/// Configuration recovered from a script tag's data attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbedConfig {
    pub patch: ConfigPatch,
    /// Attributes that do not name a configuration key.
    pub extra: BTreeMap<String, AttrValue>,
}

impl EmbedConfig {
    pub fn from_attributes<I, K, V>(attributes: I) -> Self
        where I: IntoIterator<Item = (K, V)>, K: AsRef<str>, V: AsRef<str>
    {
        let mut config = EmbedConfig::default();
        for (name, raw) in attributes {
            let key = attribute_key(name.as_ref());
            if let Err(e) = config.apply(&key, raw.as_ref()) {
                warn!("Ignoring embed attribute: {}", e);
            }
        }
        config
    }

    /// Parses `name=value` pairs as typed on a command line.
    pub fn from_pairs<S: AsRef<str>>(pairs: &[S]) -> Self {
        let attributes = pairs.iter().filter_map(|pair| {
            let pair = pair.as_ref();
            match pair.split_once('=') {
                Some((k, v)) => Some((k.to_string(), v.to_string())),
                None => {
                    warn!("Ignoring embed attribute without a value: {}", pair);
                    None
                }
            }
        });
        Self::from_attributes(attributes)
    }

    /// Text keys take the attribute verbatim; only typed keys and extras go
    /// through [`AttrValue::coerce`].
    fn apply(&mut self, key: &str, raw: &str) -> Result<(), ConfigError> {
        let patch = &mut self.patch;
        match key {
            "apiUrl" | "baseUrl" => {
                patch.api_url = Some(raw.to_string());
            }
            "apiKey" => {
                patch.api_key = Some(raw.to_string());
            }
            "demo" => {
                patch.demo = Some(AttrValue::coerce(raw).into_bool(key)?);
            }
            "autoOpen" => {
                patch.auto_open = Some(AttrValue::coerce(raw).into_bool(key)?);
            }
            "position" => {
                patch.position = Some(raw.parse()?);
            }
            "requestTimeoutSecs" | "requestTimeout" => {
                patch.request_timeout_secs = Some(AttrValue::coerce(raw).into_seconds(key)?);
            }
            "primaryColor" => {
                patch.theme.get_or_insert_with(ThemePatch::default).primary_color = Some(
                    raw.to_string()
                );
            }
            "secondaryColor" => {
                patch.theme.get_or_insert_with(ThemePatch::default).secondary_color = Some(
                    raw.to_string()
                );
            }
            "title" => {
                patch.branding.get_or_insert_with(BrandingPatch::default).title = Some(
                    raw.to_string()
                );
            }
            "subtitle" => {
                patch.branding.get_or_insert_with(BrandingPatch::default).subtitle = Some(
                    raw.to_string()
                );
            }
            _ => {
                debug!("Unrecognised embed attribute '{}' kept as extra", key);
                self.extra.insert(key.to_string(), AttrValue::coerce(raw));
            }
        }
        Ok(())
    }
}
