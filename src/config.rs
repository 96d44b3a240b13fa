// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, Context, Result};
use std::env;
use url::Url;

/// How the bot authenticates against Mattermost
#[derive(Clone)]
pub enum Credentials {
    /// Log in with a username and password to obtain a session token
    Login { user: String, password: String },
    /// Use a personal access token directly
    Token(String),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Login { user, .. } => write!(f, "Login {{ user: {user:?} }}"),
            Credentials::Token(_) => write!(f, "Token(..)"),
        }
    }
}

/// Informer configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Mattermost server endpoint
    pub url: Url,
    /// Mattermost team (workspace) name
    pub team: String,
    /// Channel that receives alerts
    pub channel: String,
    pub credentials: Credentials,
    /// Namespace to watch; `None` watches all namespaces
    pub namespace: Option<String>,
    /// Number of reconciliation workers
    pub threadiness: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .with_context(|| format!("{name} environment variable not set"))
        };

        let url = required("MATTERMOST_URL")?;
        let url = Url::parse(&url).with_context(|| format!("MATTERMOST_URL is not a valid URL: {url}"))?;
        let team = required("MATTERMOST_TEAM")?;
        let channel = required("MATTERMOST_CHANNEL")?;

        let credentials = match lookup("MATTERMOST_TOKEN").filter(|t| !t.is_empty()) {
            Some(token) => Credentials::Token(token),
            None => Credentials::Login {
                user: required("MATTERMOST_USER")?,
                password: required("MATTERMOST_PASSWORD")?,
            },
        };

        let namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.is_empty());

        let threadiness = match lookup("THREADINESS") {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("THREADINESS must be a positive integer, got {raw:?}"))?,
            None => 1,
        };
        if threadiness == 0 {
            bail!("THREADINESS must be at least 1");
        }

        Ok(Config {
            url,
            team,
            channel,
            credentials,
            namespace,
            threadiness,
        })
    }
}
