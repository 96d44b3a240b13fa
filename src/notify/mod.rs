// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Alert payloads and the collaborators that deliver them.

pub mod mattermost;

use crate::constants::alert;
use crate::error::Result;
use crate::types::pod::last_termination_reason;
use crate::types::ResourceKey;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ContainerStatus;
use serde::Serialize;
use tracing::warn;

pub use mattermost::MattermostClient;

/// A message attachment sent to the chat channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub title: String,
    pub color: String,
    pub text: String,
    pub fields: Vec<AlertField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

impl AlertField {
    pub fn new(title: &str, value: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            value: value.into(),
            short: false,
        }
    }
}

/// Delivers alerts to the external channel
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_alert(&self, alert: &Alert) -> Result<()>;
}

/// Source of container logs attached to alerts
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn container_logs(&self, key: &ResourceKey, container: &str) -> Result<String>;
}

/// Build the crash loop alert for one container. Logs are best effort: a
/// failed fetch leaves the logs field empty instead of failing the alert.
pub async fn crash_alert(
    logs: &dyn LogSource,
    key: &ResourceKey,
    container: &ContainerStatus,
) -> Alert {
    let output = match logs.container_logs(key, &container.name).await {
        Ok(output) => output,
        Err(e) => {
            warn!(
                "Failed to fetch logs of container {} in pod {}: {}",
                container.name, key, e
            );
            String::new()
        }
    };

    let mut fields = vec![AlertField::new("Logs", format!("```\n{}```", output))];
    if let Some(reason) = last_termination_reason(container) {
        fields.push(AlertField::new("Reason", reason));
    }

    Alert {
        title: alert::TITLE.to_string(),
        color: alert::COLOR.to_string(),
        text: format!(
            "Container {} of pod {} keeps crashing, maybe its time to intervene.",
            container.name,
            key.name()
        ),
        fields,
    }
}
