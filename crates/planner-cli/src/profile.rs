//! Settings profile: the semester anchor, block-out rules and timezone.
//!
//! ```toml
//! week_anchor = "2026-09-06"
//! timezone = "Europe/Helsinki"
//!
//! [[block_out]]
//! from = "00:00"
//! to = "08:00"
//! day = "all"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use planner_engine::BlockOutRule;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    /// First day of week-number 1.
    pub week_anchor: NaiveDate,
    /// IANA timezone the system clock is read in when `--now` is not given.
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default, rename = "block_out")]
    pub block_outs: Vec<BlockOutRule>,
}

impl Profile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse profile: {}", path.display()))
    }

    /// Current wall-clock time in the profile's timezone, or local time when
    /// none is set.
    pub fn current_time(&self) -> Result<NaiveDateTime> {
        match self.timezone.as_deref() {
            Some(name) => {
                let tz: Tz = name
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid timezone in profile: '{}'", name))?;
                Ok(Utc::now().with_timezone(&tz).naive_local())
            }
            None => Ok(chrono::Local::now().naive_local()),
        }
    }
}
