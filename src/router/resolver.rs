//! Policy-ordered route resolution.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use crate::config::{PolicyConfig, RouteConfig};
use crate::error::{PatternKind, RoutingError};

use super::matcher::Pattern;

/// A named bucket of routes. Identity is the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UsageGroup(String);

impl UsageGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UsageGroup {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for UsageGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A compiled voice route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Route name
    pub name: String,
    /// Pattern matched against the normalized number
    pub pattern: Pattern,
    /// Gateways, in the order they are tried
    pub gateways: Vec<String>,
    /// Priority (lower = higher priority under the default order)
    pub priority: i32,
    /// Usage groups this route belongs to
    pub usage_groups: Vec<UsageGroup>,
}

impl Route {
    /// Create a route with no gateways and no usage groups.
    pub fn new(name: impl Into<String>, pattern: &str, priority: i32) -> Result<Self, RoutingError> {
        let name = name.into();
        let pattern = Pattern::new(pattern).map_err(|source| RoutingError::InvalidPattern {
            kind: PatternKind::Route,
            name: name.clone(),
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            name,
            pattern,
            gateways: Vec::new(),
            priority,
            usage_groups: Vec::new(),
        })
    }

    /// Compile a route record.
    pub fn compile(config: &RouteConfig) -> Result<Self, RoutingError> {
        Ok(Self::new(&config.name, &config.pattern, config.priority)?
            .with_gateways(config.gateways.iter().cloned())
            .with_usages(config.usages.iter().map(String::as_str)))
    }

    /// Set gateways.
    pub fn with_gateways<I, S>(mut self, gateways: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.gateways = gateways.into_iter().map(Into::into).collect();
        self
    }

    /// Add usage group memberships. Repeated names are kept once.
    pub fn with_usages<'a, I>(mut self, usages: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        for usage in usages {
            let group = UsageGroup::new(usage);
            if !self.usage_groups.contains(&group) {
                self.usage_groups.push(group);
            }
        }
        self
    }

    /// Check if the route carries the number.
    pub fn matches(&self, number: &str) -> bool {
        self.pattern.matches(number)
    }
}

/// A routing policy: usage groups in the order they are tried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingPolicy {
    /// Policy name
    pub name: String,
    /// Usage groups, first = tried first
    usage_order: Vec<UsageGroup>,
}

impl RoutingPolicy {
    /// Create a policy. Fails if a usage group is listed twice.
    pub fn new<I, S>(name: impl Into<String>, usages: I) -> Result<Self, RoutingError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let mut usage_order: Vec<UsageGroup> = Vec::new();

        for usage in usages {
            let group = UsageGroup::new(usage);
            if usage_order.contains(&group) {
                return Err(RoutingError::DuplicateUsage {
                    policy: name,
                    usage: group.0,
                });
            }
            usage_order.push(group);
        }

        Ok(Self { name, usage_order })
    }

    /// Compile a policy record.
    pub fn compile(config: &PolicyConfig) -> Result<Self, RoutingError> {
        Self::new(&config.name, config.usages.iter().cloned())
    }

    /// Usage groups in evaluation order.
    pub fn usage_order(&self) -> &[UsageGroup] {
        &self.usage_order
    }
}

/// Routes grouped by usage, each group in catalog order.
#[derive(Debug, Clone, Default)]
pub struct RoutesByUsage {
    groups: HashMap<UsageGroup, Vec<Route>>,
}

impl RoutesByUsage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group a route catalog by usage. A route appears under every group it belongs to.
    pub fn from_routes<I>(routes: I) -> Self
    where
        I: IntoIterator<Item = Route>,
    {
        let mut by_usage = Self::new();
        for route in routes {
            for group in route.usage_groups.clone() {
                by_usage.insert(group, route.clone());
            }
        }
        by_usage
    }

    /// Append a route to a group.
    pub fn insert(&mut self, group: UsageGroup, route: Route) {
        self.groups.entry(group).or_default().push(route);
    }

    /// Routes of a group; empty if the group is unknown.
    pub fn get(&self, group: &UsageGroup) -> &[Route] {
        self.groups.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of groups with at least one route.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

/// Direction of the priority sort within the chosen usage group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityOrder {
    /// Lower priority value first
    #[default]
    Ascending,
    /// Higher priority value first
    Descending,
}

impl PriorityOrder {
    /// Compare two priorities; `Less` means `a` is preferred.
    pub fn compare(self, a: i32, b: i32) -> Ordering {
        match self {
            PriorityOrder::Ascending => a.cmp(&b),
            PriorityOrder::Descending => b.cmp(&a),
        }
    }
}

/// Outcome of route resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolutionResult {
    /// A usage group matched; `routes` is never empty.
    Routed {
        usage: UsageGroup,
        routes: Vec<Route>,
    },
    /// No usage group in the policy carries the number.
    NoRouteFound,
}

impl ResolutionResult {
    /// Chosen usage group, if any.
    pub fn usage(&self) -> Option<&UsageGroup> {
        match self {
            ResolutionResult::Routed { usage, .. } => Some(usage),
            ResolutionResult::NoRouteFound => None,
        }
    }

    /// Ordered routes; empty only for `NoRouteFound`.
    pub fn routes(&self) -> &[Route] {
        match self {
            ResolutionResult::Routed { routes, .. } => routes,
            ResolutionResult::NoRouteFound => &[],
        }
    }

    /// Preferred route, if any.
    pub fn first(&self) -> Option<&Route> {
        self.routes().first()
    }

    pub fn is_routed(&self) -> bool {
        matches!(self, ResolutionResult::Routed { .. })
    }
}

/// Route resolver.
///
/// Walks the policy's usage groups in order and stops at the first group with
/// a matching route; later groups are never evaluated, even if they would
/// also match.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    order: PriorityOrder,
}

impl Resolver {
    pub fn new(order: PriorityOrder) -> Self {
        Self { order }
    }

    pub fn priority_order(&self) -> PriorityOrder {
        self.order
    }

    /// Resolve the routes for a normalized number.
    pub fn resolve(
        &self,
        number: &str,
        policy: &RoutingPolicy,
        routes: &RoutesByUsage,
    ) -> ResolutionResult {
        for usage in policy.usage_order() {
            let mut candidates: Vec<Route> = routes
                .get(usage)
                .iter()
                .filter(|route| route.matches(number))
                .cloned()
                .collect();

            if candidates.is_empty() {
                trace!(policy = %policy.name, usage = %usage, number, "usage has no matching route");
                continue;
            }

            // sort_by is stable: equal priorities keep catalog order
            candidates.sort_by(|a, b| self.order.compare(a.priority, b.priority));

            debug!(
                policy = %policy.name,
                usage = %usage,
                number,
                routes = candidates.len(),
                first = %candidates[0].name,
                "usage matched"
            );

            return ResolutionResult::Routed {
                usage: usage.clone(),
                routes: candidates,
            };
        }

        debug!(
            policy = %policy.name,
            usages = policy.usage_order().len(),
            number,
            "no route matched"
        );

        ResolutionResult::NoRouteFound
    }
}
