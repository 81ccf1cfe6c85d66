use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::router::PriorityOrder;

/// Name of the tenant-wide policy and dial plan used when a subscriber has none.
pub const GLOBAL: &str = "Global";

/// Root configuration for dialroute
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Resolver behaviour
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Directory snapshot (subscribers, dial plans, policies, routes)
    #[serde(default)]
    pub directory: DirectoryConfig,
}

/// Global settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Enable structured JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            json_logs: false,
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Resolver configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    /// Direction of the priority sort inside the chosen usage group
    #[serde(default)]
    pub priority_order: PriorityOrder,

    /// Policy applied to subscribers without an assigned policy
    #[serde(default = "default_global")]
    pub default_policy: String,

    /// Dial plan applied to subscribers without an assigned dial plan
    #[serde(default = "default_global")]
    pub default_dial_plan: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            priority_order: PriorityOrder::default(),
            default_policy: default_global(),
            default_dial_plan: default_global(),
        }
    }
}

fn default_global() -> String {
    GLOBAL.to_string()
}

/// Directory snapshot and access settings
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    /// Upper bound for a single directory lookup
    #[serde(default = "default_fetch_timeout", with = "humantime_serde")]
    pub fetch_timeout: Duration,

    /// Subscriber records
    #[serde(default)]
    pub subscribers: Vec<SubscriberConfig>,

    /// Dial plans
    #[serde(default)]
    pub dial_plans: Vec<DialPlanConfig>,

    /// Routing policies
    #[serde(default)]
    pub policies: Vec<PolicyConfig>,

    /// Route catalog
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: default_fetch_timeout(),
            subscribers: Vec::new(),
            dial_plans: Vec::new(),
            policies: Vec::new(),
            routes: Vec::new(),
        }
    }
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Subscriber record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberConfig {
    /// Subscriber identity (SIP address, UPN, ...)
    pub identity: String,

    /// Assigned routing policy name
    #[serde(default)]
    pub policy: Option<String>,

    /// Assigned dial plan name
    #[serde(default)]
    pub dial_plan: Option<String>,
}

/// Dial plan record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialPlanConfig {
    /// Dial plan name
    pub name: String,

    /// Translation rules, evaluated in list order
    #[serde(default)]
    pub rules: Vec<TranslationRuleConfig>,
}

/// Translation rule record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRuleConfig {
    /// Rule name (defaults to its position when omitted)
    #[serde(default)]
    pub name: Option<String>,

    /// Regex matched against the dialed number
    pub pattern: String,

    /// Replacement template (`$1`, `${name}`)
    pub translation: String,
}

/// Routing policy record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Policy name
    pub name: String,

    /// Usage groups in the order they are tried
    #[serde(default)]
    pub usages: Vec<String>,
}

/// Route record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Route name
    pub name: String,

    /// Regex matched against the normalized number
    pub pattern: String,

    /// Gateways, in the order they are tried
    #[serde(default)]
    pub gateways: Vec<String>,

    /// Route priority (lower = higher priority)
    #[serde(default)]
    pub priority: i32,

    /// Usage groups this route belongs to
    #[serde(default)]
    pub usages: Vec<String>,
}

/// Humantime serde support module
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
