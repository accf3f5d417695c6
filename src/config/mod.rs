// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Pipeline configuration
//!
//! A [`PipelineConfig`] is an explicit value handed to each job. Nothing here
//! is process-wide, so jobs with different settings can run side by side.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use thiserror::Error;

use crate::content::ContentFetchConfig;
use crate::pipeline::RetryPolicy;
use crate::search::SearchConfig;
use crate::summarize::{LlmConfig, SummarizeConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid {section} configuration: {reason}")]
    Invalid { section: &'static str, reason: String },
    #[error("Failed to initialise {component}: {reason}")]
    Component {
        component: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub search: SearchConfig,
    pub content: ContentFetchConfig,
    pub summarize: SummarizeConfig,
    pub llm: LlmConfig,
    pub retry: RetryPolicy,
}

impl PipelineConfig {
    /// Load every section from environment variables, reading `.env` first
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self {
            search: SearchConfig::from_env(),
            content: ContentFetchConfig::from_env(),
            summarize: SummarizeConfig::from_env(),
            llm: LlmConfig::from_env(),
            retry: RetryPolicy::from_env(),
        }
    }

    /// Load from a TOML file; missing sections and fields take their defaults
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Fill credentials absent from the loaded configuration from the environment
    pub fn with_env_credentials(mut self) -> Self {
        dotenv::dotenv().ok();
        let providers = &mut self.search.providers;
        if providers.brave_api_key.is_none() {
            providers.brave_api_key = env::var("BRAVE_API_KEY").ok();
        }
        if providers.bing_api_key.is_none() {
            providers.bing_api_key = env::var("BING_API_KEY")
                .or_else(|_| env::var("BING_SEARCH_V7_SUBSCRIPTION_KEY"))
                .ok();
        }
        if self.llm.api_key.is_none() {
            self.llm.api_key = env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search.validate().map_err(invalid("search"))?;
        self.content.validate().map_err(invalid("content"))?;
        self.summarize.validate().map_err(invalid("summarize"))?;
        self.llm.validate().map_err(invalid("llm"))?;
        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(ConfigError::Invalid {
                section: "retry",
                reason: "initial_backoff_ms exceeds max_backoff_ms".to_string(),
            });
        }
        Ok(())
    }

    /// Render as TOML; credentials are never included
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn invalid(section: &'static str) -> impl FnOnce(String) -> ConfigError {
    move |reason| ConfigError::Invalid { section, reason }
}
