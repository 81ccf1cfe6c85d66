//! End-to-end resolution tests
//!
//! Loads a directory snapshot from disk and resolves calls through the public API.
//!
//! Run with: cargo test --test resolution

use std::io::Write;
use std::sync::Arc;

use dialroute::config::Config;
use dialroute::directory::{FileDirectory, MemoryDirectory};
use dialroute::normalizer::{normalize, DialPlan};
use dialroute::router::{PriorityOrder, ResolutionResult, Resolver, Route, RoutesByUsage, RoutingPolicy};
use dialroute::{CallRequest, PolicySource, RoutingError, RoutingService};
use tempfile::NamedTempFile;

const SNAPSHOT: &str = r#"
settings:
  log_level: warn

resolver:
  priority_order: ascending

directory:
  fetch_timeout: 2s
  subscribers:
    - identity: alice@contoso.com
      policy: Intl
    - identity: bob@contoso.com
    - identity: dave@contoso.com
      policy: Blocked

  dial_plans:
    - name: Global
      rules:
        - name: intl-prefix
          pattern: '^00(\d+)$'
          translation: '+$1'
        - name: national
          pattern: '^0(\d{9,10})$'
          translation: '+44$1'

  policies:
    - name: Global
      usages: [Internal, International]
    - name: Intl
      usages: [Internal, International]
    - name: Blocked
      usages: []

  routes:
    - name: internal
      pattern: '^\+1425'
      gateways: [sbc-sea.contoso.com]
      priority: 0
      usages: [Internal]
    - name: uk-backup
      pattern: '^\+44'
      gateways: [sbc-lon2.contoso.com, sbc-lon3.contoso.com]
      priority: 2
      usages: [International]
    - name: uk-primary
      pattern: '^\+44\d+$'
      gateways: [sbc-lon1.contoso.com]
      priority: 1
      usages: [International]
    - name: everywhere
      pattern: '.*'
      gateways: [sbc-any.contoso.com]
      priority: 9
      usages: [Fallback]
"#;

fn snapshot_file() -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
    write!(file, "{}", SNAPSHOT).unwrap();
    file
}

fn route_names(result: &ResolutionResult) -> Vec<&str> {
    result.routes().iter().map(|r| r.name.as_str()).collect()
}

#[tokio::test]
async fn test_file_snapshot_international_call() {
    let file = snapshot_file();
    let config = Config::load(file.path()).unwrap();
    let directory = FileDirectory::new(file.path()).unwrap();
    let service = RoutingService::from_config(Arc::new(directory), &config);

    let res = service
        .resolve_call_routing("0044123456789", "alice@contoso.com")
        .await
        .unwrap();

    assert_eq!(res.normalized_number(), "+44123456789");
    assert_eq!(res.normalization.matched_rule.as_ref().unwrap().name, "intl-prefix");
    assert_eq!(res.policy, "Intl");
    assert_eq!(res.result.usage().unwrap().name(), "International");
    assert_eq!(route_names(&res.result), vec!["uk-primary", "uk-backup"]);
    assert_eq!(res.routes()[1].gateways, vec!["sbc-lon2.contoso.com", "sbc-lon3.contoso.com"]);
}

#[tokio::test]
async fn test_second_rule_applies_when_first_does_not_match() {
    let file = snapshot_file();
    let directory = FileDirectory::new(file.path()).unwrap();
    let service = RoutingService::new(Arc::new(directory));

    let res = service.resolve_call_routing("02071234567", "bob@contoso.com").await.unwrap();

    assert_eq!(res.normalized_number(), "+442071234567");
    assert_eq!(res.normalization.matched_rule.as_ref().unwrap().name, "national");
    assert_eq!(res.policy_source, PolicySource::Default);
    assert_eq!(res.result.first().unwrap().name, "uk-primary");
}

#[tokio::test]
async fn test_usage_outside_policy_is_never_used() {
    let file = snapshot_file();
    let directory = FileDirectory::new(file.path()).unwrap();
    let service = RoutingService::new(Arc::new(directory));

    // Only the Fallback usage would carry this number, and no policy lists it
    let res = service.resolve_call_routing("+33123456789", "alice@contoso.com").await.unwrap();
    assert_eq!(res.result, ResolutionResult::NoRouteFound);
}

#[tokio::test]
async fn test_empty_policy_has_no_route() {
    let directory = MemoryDirectory::from_yaml(SNAPSHOT).unwrap();
    let service = RoutingService::new(Arc::new(directory));

    let res = service.resolve_call_routing("+14255550100", "dave@contoso.com").await.unwrap();
    assert_eq!(res.policy, "Blocked");
    assert!(!res.result.is_routed());
}

#[tokio::test]
async fn test_file_snapshot_invalid_route_pattern() {
    let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
    write!(
        file,
        "{}    - name: broken-fr\n      pattern: '^\\+33('\n      usages: [International]\n",
        SNAPSHOT
    )
    .unwrap();

    // The bad record fails validation up front
    assert!(Config::load(file.path()).is_err());

    // Served as-is, it surfaces as a data error on the request
    let directory = FileDirectory::new(file.path()).unwrap();
    let service = RoutingService::new(Arc::new(directory));
    let err = service
        .resolve_call_routing("0044123456789", "alice@contoso.com")
        .await
        .unwrap_err();

    match &err {
        RoutingError::InvalidPattern { name, pattern, .. } => {
            assert_eq!(name, "broken-fr");
            assert_eq!(pattern, r"^\+33(");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_data_error());
}

#[tokio::test]
async fn test_file_snapshot_bad_subscriber_is_isolated() {
    let contents = SNAPSHOT.replace(
        "    - identity: dave@contoso.com\n      policy: Blocked\n",
        "    - identity: dave@contoso.com\n      policy: Blocked\n    - identity: erin@contoso.com\n      policy: Missing\n",
    );
    let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
    write!(file, "{}", contents).unwrap();

    let directory = FileDirectory::new(file.path()).unwrap();
    let service = RoutingService::new(Arc::new(directory));

    let res = service
        .resolve_call_routing("0044123456789", "alice@contoso.com")
        .await
        .unwrap();
    assert_eq!(route_names(&res.result), vec!["uk-primary", "uk-backup"]);

    let err = service
        .resolve_call_routing("0044123456789", "erin@contoso.com")
        .await
        .unwrap_err();
    assert!(matches!(err, RoutingError::PolicyNotFound(ref name) if name == "Missing"));
}

#[tokio::test]
async fn test_batch_resolution() {
    let directory = MemoryDirectory::from_yaml(SNAPSHOT).unwrap();
    let service = RoutingService::new(Arc::new(directory)).with_priority_order(PriorityOrder::Descending);

    let requests: Vec<CallRequest> = (0..16)
        .map(|i| {
            let who = if i % 2 == 0 { "alice@contoso.com" } else { "eve@contoso.com" };
            CallRequest::new("0044123456789", who)
        })
        .collect();

    let results = service.resolve_batch(&requests).await;
    for (i, result) in results.iter().enumerate() {
        if i % 2 == 0 {
            let res = result.as_ref().unwrap();
            assert_eq!(route_names(&res.result), vec!["uk-backup", "uk-primary"]);
        } else {
            assert!(matches!(result, Err(RoutingError::SubscriberNotFound(_))));
        }
    }
}

#[test]
fn test_pure_pipeline_without_directory() {
    let plan = DialPlan::from_rules("Global", [("intl", r"^00(\d+)$", "+$1")]).unwrap();
    let policy = RoutingPolicy::new("Global", ["Internal", "International"]).unwrap();
    let routes = RoutesByUsage::from_routes([
        Route::new("internal", r"^\+1425", 0).unwrap().with_usages(["Internal"]),
        Route::new("r1", r"^\+44", 2).unwrap().with_usages(["International"]),
        Route::new("r2", r"^\+44", 1).unwrap().with_usages(["International"]),
    ]);

    let normalization = normalize("0044123456789", &plan);
    let result = Resolver::default().resolve(&normalization.normalized, &policy, &routes);

    assert_eq!(normalization.normalized, "+44123456789");
    assert_eq!(route_names(&result), vec!["r2", "r1"]);

    // Already-normalized input takes the same path without a rule
    let passthrough = normalize("+44123456789", &plan);
    assert!(passthrough.matched_rule.is_none());
    assert_eq!(
        Resolver::default().resolve(&passthrough.normalized, &policy, &routes),
        result
    );
}
