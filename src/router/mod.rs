//! Outbound route resolution.
//!
//! Given a normalized number and a routing policy, picks the first usage group
//! (in policy order) that has a matching route and returns that group's
//! matching routes ordered by priority.

mod matcher;
mod resolver;

pub use matcher::Pattern;
pub use resolver::{
    PriorityOrder, ResolutionResult, Resolver, Route, RoutesByUsage, RoutingPolicy, UsageGroup,
};
