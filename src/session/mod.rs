//! Local login session and permission tiers.
//!
//! The session lives under the `user` key of `~/.xndrc`; other keys in that
//! file are preserved.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::runtime::{Runtime, write_atomic};

/// File name of the user configuration in the home directory.
pub const SESSION_FILE: &str = ".xndrc";

/// Permission tier of a user, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    #[default]
    User,
    PackageMaker,
    Moderator,
    Creator,
}

impl Tier {
    pub const ALL: [Tier; 4] = [
        Tier::User,
        Tier::PackageMaker,
        Tier::Moderator,
        Tier::Creator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::User => "user",
            Tier::PackageMaker => "package-maker",
            Tier::Moderator => "moderator",
            Tier::Creator => "creator",
        }
    }

    pub fn can_publish(&self) -> bool {
        *self >= Tier::PackageMaker
    }

    pub fn can_set_tiers(&self) -> bool {
        *self == Tier::Creator
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid tier: {}. Valid tiers are: {}",
                    s,
                    Tier::ALL.map(|t| t.as_str()).join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    #[serde(default)]
    pub tier: Tier,
}

/// Contents of `~/.xndrc`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Session>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub struct SessionStore<'a, R: Runtime> {
    runtime: &'a R,
    path: PathBuf,
}

impl<'a, R: Runtime> SessionStore<'a, R> {
    /// Session store in the user's home directory.
    pub fn new(runtime: &'a R) -> Result<Self> {
        let home = runtime
            .home_dir()
            .context("Could not determine home directory")?;
        Ok(Self::with_path(runtime, home.join(SESSION_FILE)))
    }

    pub fn with_path(runtime: &'a R, path: PathBuf) -> Self {
        Self { runtime, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the user configuration. A missing file yields the default.
    #[tracing::instrument(skip(self))]
    pub fn load(&self) -> Result<UserConfig> {
        if !self.runtime.exists(&self.path) {
            return Ok(UserConfig::default());
        }
        let content = self.runtime.read_to_string(&self.path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    #[tracing::instrument(skip(self, config))]
    pub fn save(&self, config: &UserConfig) -> Result<()> {
        let content = serde_json::to_string_pretty(config)?;
        write_atomic(self.runtime, &self.path, content.as_bytes())
            .with_context(|| format!("Failed to save {}", self.path.display()))
    }

    pub fn current(&self) -> Result<Option<Session>> {
        Ok(self.load()?.user)
    }

    /// Record `username` as logged in with the default tier.
    pub fn login(&self, username: &str) -> Result<Session> {
        let mut config = self.load()?;
        let session = Session {
            username: username.to_string(),
            tier: Tier::default(),
        };
        config.user = Some(session.clone());
        self.save(&config)?;
        debug!("Logged in as {}", username);
        Ok(session)
    }

    /// Forget the current session. Returns the session that was removed, if any.
    pub fn logout(&self) -> Result<Option<Session>> {
        let mut config = self.load()?;
        let previous = config.user.take();
        self.save(&config)?;
        Ok(previous)
    }
}
