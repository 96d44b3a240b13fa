// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InformerError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("HTTP transport error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Mattermost API returned {status}: {body}")]
    MattermostError { status: u16, body: String },

    #[error("Invalid annotation: {0}")]
    InvalidAnnotation(String),

    #[error("Cache sync failed: {0}")]
    CacheSyncError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, InformerError>;
