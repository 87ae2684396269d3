use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::interaction::UserId;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Configuration {
    pub bot: Bot,
}

impl Default for Configuration {
    fn default() -> Self {
        Self { bot: Bot::default() }
    }
}

impl Configuration {
    const FILENAME: &str = "config.toml";

    pub fn load() -> anyhow::Result<Self> {
        let config = if let Ok(file) = std::fs::read_to_string(Self::FILENAME) {
            toml::from_str(&file).context("failed to load config")?
        } else {
            Self::default()
        };
        config.save()?;

        Ok(config)
    }

    fn save(&self) -> anyhow::Result<()> {
        Ok(std::fs::write(
            Self::FILENAME,
            toml::to_string_pretty(self)?,
        )?)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Bot {
    /// The user allowed through owner-only guards. When unset,
    /// owner-only commands deny everyone.
    pub owner_id: Option<UserId>,
}

impl Default for Bot {
    fn default() -> Self {
        Self { owner_id: None }
    }
}
