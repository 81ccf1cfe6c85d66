use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::types::Config;
use crate::normalizer::DialPlan;
use crate::router::{Route, RoutingPolicy};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
    Toml,
}

impl Format {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Format::Yaml),
            "json" => Some(Format::Json),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }
}

impl Config {
    /// Load configuration from a file, format chosen by extension (YAML if unknown)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = Format::from_path(path).unwrap_or(Format::Yaml);

        debug!(path = %path.display(), format = ?format, "loading configuration");

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        Self::parse(&contents, format)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Parse and validate configuration in the given format
    pub fn parse(contents: &str, format: Format) -> Result<Self> {
        let config = Self::parse_unvalidated(contents, format)?;

        config.validate()?;

        Ok(config)
    }

    /// Deserialize configuration without validating it.
    ///
    /// Patterns and cross references are left for the caller to check.
    pub fn parse_unvalidated(contents: &str, format: Format) -> Result<Self> {
        let config: Config = match format {
            Format::Yaml => {
                serde_yaml::from_str(contents).context("failed to parse YAML configuration")?
            }
            Format::Json => {
                serde_json::from_str(contents).context("failed to parse JSON configuration")?
            }
            Format::Toml => toml::from_str(contents).context("failed to parse TOML configuration")?,
        };

        Ok(config)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::parse(yaml, Format::Yaml)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Self::parse(json, Format::Json)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(s: &str) -> Result<Self> {
        Self::parse(s, Format::Toml)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let dir = &self.directory;

        let mut plan_names = HashSet::new();
        for plan in &dir.dial_plans {
            if !plan_names.insert(plan.name.as_str()) {
                anyhow::bail!("duplicate dial plan name: {}", plan.name);
            }
            DialPlan::compile(plan)?;
        }

        let mut policy_names = HashSet::new();
        for policy in &dir.policies {
            if !policy_names.insert(policy.name.as_str()) {
                anyhow::bail!("duplicate policy name: {}", policy.name);
            }
            RoutingPolicy::compile(policy)?;
        }

        let mut route_names = HashSet::new();
        for route in &dir.routes {
            if !route_names.insert(route.name.as_str()) {
                anyhow::bail!("duplicate route name: {}", route.name);
            }
            Route::compile(route)?;
        }

        let mut identities = HashSet::new();
        for subscriber in &dir.subscribers {
            if !identities.insert(subscriber.identity.as_str()) {
                anyhow::bail!("duplicate subscriber: {}", subscriber.identity);
            }

            if let Some(ref policy) = subscriber.policy {
                if !policy_names.contains(policy.as_str()) {
                    anyhow::bail!(
                        "subscriber '{}' references unknown policy: {}",
                        subscriber.identity,
                        policy
                    );
                }
            }

            if let Some(ref plan) = subscriber.dial_plan {
                if !plan_names.contains(plan.as_str()) {
                    anyhow::bail!(
                        "subscriber '{}' references unknown dial plan: {}",
                        subscriber.identity,
                        plan
                    );
                }
            }
        }

        info!(
            subscribers = dir.subscribers.len(),
            dial_plans = dir.dial_plans.len(),
            policies = dir.policies.len(),
            routes = dir.routes.len(),
            "configuration validated successfully"
        );
        Ok(())
    }
}
