//! Call routing service.
//!
//! Fetches a subscriber's effective dial plan, routing policy and the route
//! catalog from a [`Directory`], then runs normalization and route resolution.

use futures::future::join_all;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, instrument};

use crate::config::{Config, SubscriberConfig, GLOBAL};
use crate::directory::{BoxDirectory, Directory, DirectoryError};
use crate::error::RoutingError;
use crate::normalizer::{normalize, DialPlan, Normalization};
use crate::router::{PriorityOrder, ResolutionResult, Resolver, Route, RoutesByUsage, RoutingPolicy};

/// Where the effective routing policy came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicySource {
    /// Assigned to the subscriber
    Assigned,
    /// Tenant default, subscriber has no assignment
    Default,
}

/// A single resolution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    /// Dialed number as entered
    pub number: String,
    /// Calling subscriber identity
    pub identity: String,
}

impl CallRequest {
    pub fn new(number: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            identity: identity.into(),
        }
    }
}

/// Full outcome of a call routing resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Subscriber identity
    pub identity: String,
    /// Effective dial plan name
    pub dial_plan: String,
    /// Effective routing policy name
    pub policy: String,
    /// Whether the policy was assigned or defaulted
    pub policy_source: PolicySource,
    /// Number normalization
    pub normalization: Normalization,
    /// Route resolution
    pub result: ResolutionResult,
}

impl Resolution {
    pub fn normalized_number(&self) -> &str {
        &self.normalization.normalized
    }

    pub fn routes(&self) -> &[Route] {
        self.result.routes()
    }
}

/// Call routing service.
pub struct RoutingService {
    directory: BoxDirectory,
    resolver: Resolver,
    default_policy: String,
    default_dial_plan: String,
    fetch_timeout: Duration,
}

impl RoutingService {
    /// Create a service with default settings.
    pub fn new(directory: BoxDirectory) -> Self {
        Self {
            directory,
            resolver: Resolver::default(),
            default_policy: GLOBAL.to_string(),
            default_dial_plan: GLOBAL.to_string(),
            fetch_timeout: Duration::from_secs(5),
        }
    }

    /// Create a service using the resolver and directory settings of a config.
    pub fn from_config(directory: BoxDirectory, config: &Config) -> Self {
        Self {
            directory,
            resolver: Resolver::new(config.resolver.priority_order),
            default_policy: config.resolver.default_policy.clone(),
            default_dial_plan: config.resolver.default_dial_plan.clone(),
            fetch_timeout: config.directory.fetch_timeout,
        }
    }

    /// Set priority sort direction.
    pub fn with_priority_order(mut self, order: PriorityOrder) -> Self {
        self.resolver = Resolver::new(order);
        self
    }

    /// Set the per-lookup directory timeout.
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Set the default policy name.
    pub fn with_default_policy(mut self, name: impl Into<String>) -> Self {
        self.default_policy = name.into();
        self
    }

    /// Set the default dial plan name.
    pub fn with_default_dial_plan(mut self, name: impl Into<String>) -> Self {
        self.default_dial_plan = name.into();
        self
    }

    /// Resolve which routes a subscriber's call to `raw_number` would use.
    #[instrument(skip(self), fields(directory = self.directory.name()))]
    pub async fn resolve_call_routing(
        &self,
        raw_number: &str,
        identity: &str,
    ) -> Result<Resolution, RoutingError> {
        // Every lookup of this request reads from the same view
        let view = self.fetch(self.directory.snapshot()).await?;
        let directory: &dyn Directory = match view {
            Some(ref view) => view.as_ref(),
            None => self.directory.as_ref(),
        };

        let subscriber = self
            .fetch(directory.subscriber(identity))
            .await?
            .ok_or_else(|| RoutingError::SubscriberNotFound(identity.to_string()))?;

        let (plan, (policy, policy_source), routes) = futures::try_join!(
            self.effective_dial_plan(directory, &subscriber),
            self.effective_policy(directory, &subscriber),
            self.route_catalog(directory),
        )?;

        let (normalization, result) = self.resolve_number(raw_number, &plan, &policy, &routes);

        info!(
            identity,
            raw = raw_number,
            normalized = %normalization.normalized,
            rule = normalization.matched_rule.as_ref().map(|r| r.name.as_str()).unwrap_or("-"),
            policy = %policy.name,
            usage = result.usage().map(|u| u.name()).unwrap_or("-"),
            routes = result.routes().len(),
            "call routing resolved"
        );

        Ok(Resolution {
            identity: subscriber.identity,
            dial_plan: plan.name,
            policy: policy.name,
            policy_source,
            normalization,
            result,
        })
    }

    /// Resolve many independent requests concurrently, results in request order.
    pub async fn resolve_batch(
        &self,
        requests: &[CallRequest],
    ) -> Vec<Result<Resolution, RoutingError>> {
        debug!(requests = requests.len(), "resolving batch");

        join_all(
            requests
                .iter()
                .map(|req| self.resolve_call_routing(&req.number, &req.identity)),
        )
        .await
    }

    /// Run normalization then route resolution over already-loaded data.
    pub fn resolve_number(
        &self,
        raw_number: &str,
        plan: &DialPlan,
        policy: &RoutingPolicy,
        routes: &RoutesByUsage,
    ) -> (Normalization, ResolutionResult) {
        let normalization = normalize(raw_number, plan);
        let result = self
            .resolver
            .resolve(&normalization.normalized, policy, routes);
        (normalization, result)
    }

    async fn effective_dial_plan(
        &self,
        directory: &dyn Directory,
        subscriber: &SubscriberConfig,
    ) -> Result<DialPlan, RoutingError> {
        match subscriber.dial_plan {
            Some(ref name) => {
                let config = self
                    .fetch(directory.dial_plan(name))
                    .await?
                    .ok_or_else(|| RoutingError::DialPlanNotFound(name.clone()))?;
                DialPlan::compile(&config)
            }
            None => match self
                .fetch(directory.dial_plan(&self.default_dial_plan))
                .await?
            {
                Some(config) => DialPlan::compile(&config),
                None => {
                    debug!(plan = %self.default_dial_plan, "no default dial plan, numbers pass through");
                    Ok(DialPlan::empty(&self.default_dial_plan))
                }
            },
        }
    }

    async fn effective_policy(
        &self,
        directory: &dyn Directory,
        subscriber: &SubscriberConfig,
    ) -> Result<(RoutingPolicy, PolicySource), RoutingError> {
        let (name, source) = match subscriber.policy {
            Some(ref name) => (name.as_str(), PolicySource::Assigned),
            None => (self.default_policy.as_str(), PolicySource::Default),
        };

        let config = self
            .fetch(directory.policy(name))
            .await?
            .ok_or_else(|| RoutingError::PolicyNotFound(name.to_string()))?;

        debug!(policy = name, source = ?source, usages = config.usages.len(), "effective policy");

        Ok((RoutingPolicy::compile(&config)?, source))
    }

    async fn route_catalog(&self, directory: &dyn Directory) -> Result<RoutesByUsage, RoutingError> {
        let routes = self
            .fetch(directory.routes())
            .await?
            .iter()
            .map(Route::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RoutesByUsage::from_routes(routes))
    }

    async fn fetch<T, F>(&self, lookup: F) -> Result<T, RoutingError>
    where
        F: Future<Output = Result<T, DirectoryError>>,
    {
        match timeout(self.fetch_timeout, lookup).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(DirectoryError::Timeout(self.fetch_timeout).into()),
        }
    }
}
