use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use edt_core::constants::{DEFAULT_DAYS_AFTER, DEFAULT_DAYS_BEFORE, DEFAULT_PRODID};
use edt_core::{CalendarOptions, DateWindow, EntityType, FetchPlan};
use serde::Deserialize;
use url::Url;

/// Environment variable holding the portal username
pub const USERNAME_VAR: &str = "CELCAT_USERNAME";
/// Environment variable holding the portal password
pub const PASSWORD_VAR: &str = "CELCAT_PASSWORD";

/// Config file read from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "edt-ics.toml";

/// Settings for one run. Every field has a default, so the config file is
/// optional and may set only what differs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the calendar is published
    pub output: PathBuf,
    pub prodid: String,
    /// IANA zone for portal times that carry no offset
    pub timezone: String,
    /// Portal id whose timetable is fetched
    pub entity_id: String,
    /// Tried in order until one yields events
    pub base_urls: Vec<String>,
    /// Tried in order for each base URL
    pub entity_types: Vec<EntityType>,
    pub days_before: i64,
    pub days_after: i64,
    pub include_holidays: bool,
    pub exhaustive_entity_types: bool,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output: PathBuf::from("docs/edt.ics"),
            prodid: DEFAULT_PRODID.to_string(),
            timezone: "Europe/Paris".to_string(),
            entity_id: "22304921".to_string(),
            base_urls: vec![
                "https://services-web.cyu.fr".to_string(),
                "https://services-web.cyu.fr/calendar".to_string(),
            ],
            entity_types: EntityType::ALL.to_vec(),
            days_before: DEFAULT_DAYS_BEFORE,
            days_after: DEFAULT_DAYS_AFTER,
            include_holidays: true,
            exhaustive_entity_types: false,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load config from `path`, or from ./edt-ics.toml if it exists.
    ///
    /// An explicit path must exist; the implicit one falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if explicit {
                anyhow::bail!("Config file not found at {}", path.display());
            }
            return Ok(Config::default());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Config> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.timezone()?;

        if self.entity_id.trim().is_empty() {
            anyhow::bail!("entity_id must not be empty");
        }
        if self.base_urls.is_empty() {
            anyhow::bail!("base_urls must list at least one URL");
        }
        for base_url in &self.base_urls {
            Url::parse(base_url).with_context(|| format!("Invalid base URL '{}'", base_url))?;
        }
        if self.entity_types.is_empty() {
            anyhow::bail!("entity_types must list at least one type");
        }
        if self.days_before < 0 || self.days_after < 0 {
            anyhow::bail!("days_before and days_after must not be negative");
        }

        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("Unknown timezone '{}': {}", self.timezone, e))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn calendar_options(&self) -> Result<CalendarOptions> {
        Ok(CalendarOptions {
            prodid: self.prodid.clone(),
            timezone: self.timezone()?,
        })
    }

    /// The fetch search space, with the window anchored on `today`.
    pub fn fetch_plan(&self, today: NaiveDate) -> FetchPlan {
        FetchPlan {
            base_urls: self.base_urls.clone(),
            entity_types: self.entity_types.clone(),
            entity_id: self.entity_id.clone(),
            window: DateWindow::sliding(today, self.days_before, self.days_after),
            include_holidays: self.include_holidays,
            exhaustive_entity_types: self.exhaustive_entity_types,
        }
    }
}
