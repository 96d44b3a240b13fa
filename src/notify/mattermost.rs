// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Mattermost REST client posting alerts as message attachments.

use crate::config::{Config, Credentials};
use crate::error::{InformerError, Result};
use crate::notify::{Alert, Notifier};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct MattermostClient {
    http: Client,
    base_url: Url,
    token: String,
    channel_id: String,
}

#[derive(Deserialize)]
struct Channel {
    id: String,
}

impl MattermostClient {
    /// Authenticate and resolve the alert channel. Any failure here is fatal
    /// for the informer, there is no degraded mode without a channel.
    #[instrument(skip(config), fields(url = %config.url, team = %config.team, channel = %config.channel))]
    pub async fn connect(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Self::connect_with(http, config).await
    }

    async fn connect_with(http: Client, config: &Config) -> Result<Self> {
        let token = match &config.credentials {
            Credentials::Token(token) => token.clone(),
            Credentials::Login { user, password } => {
                login(&http, &config.url, user, password).await?
            }
        };

        let channel_url = api_url(
            &config.url,
            &format!("teams/name/{}/channels/name/{}", config.team, config.channel),
        )?;
        let response = http.get(channel_url).bearer_auth(&token).send().await?;
        let channel: Channel = check_status(response).await?.json().await?;

        info!("Resolved Mattermost channel {} to id {}", config.channel, channel.id);

        Ok(Self {
            http,
            base_url: config.url.clone(),
            token,
            channel_id: channel.id,
        })
    }
}

#[async_trait]
impl Notifier for MattermostClient {
    async fn send_alert(&self, alert: &Alert) -> Result<()> {
        let url = api_url(&self.base_url, "posts")?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&post_body(&self.channel_id, alert))
            .send()
            .await?;
        check_status(response).await?;

        debug!("Posted alert '{}' to channel {}", alert.title, self.channel_id);
        Ok(())
    }
}

/// Log in with username and password; the session token comes back as a header
async fn login(http: &Client, base_url: &Url, user: &str, password: &str) -> Result<String> {
    let response = http
        .post(api_url(base_url, "users/login")?)
        .json(&json!({ "login_id": user, "password": password }))
        .send()
        .await?;
    let response = check_status(response).await?;

    response
        .headers()
        .get("Token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| InformerError::MattermostError {
            status: response.status().as_u16(),
            body: "login response carries no Token header".to_string(),
        })
}

fn api_url(base_url: &Url, path: &str) -> Result<Url> {
    let raw = format!("{}/api/v4/{}", base_url.as_str().trim_end_matches('/'), path);
    Url::parse(&raw).map_err(|e| InformerError::ConfigError(format!("Invalid Mattermost URL {}: {}", raw, e)))
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(InformerError::MattermostError {
        status: status.as_u16(),
        body,
    })
}

fn post_body(channel_id: &str, alert: &Alert) -> Value {
    json!({
        "channel_id": channel_id,
        "message": "",
        "props": {
            "attachments": [{
                "fallback": alert.text,
                "color": alert.color,
                "title": alert.title,
                "text": alert.text,
                "fields": alert.fields,
            }]
        }
    })
}
