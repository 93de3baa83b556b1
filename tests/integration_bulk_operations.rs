//! Bulk clone and refresh driven through stub providers

mod common;

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use common::mock_providers::{calls, new_call_log, StubFactory, StubProvider};
use common::test_fixtures::{repo, two_by_two_config, two_provider_config};
use synclone::application::use_cases::{BulkCloneUseCase, BulkOperationConfig, BulkRefreshUseCase};
use synclone::domain::entities::synclone_config::OrganizationConfig;
use synclone::domain::value_objects::clone_strategy::CloneStrategy;
use synclone::domain::value_objects::provider_type::ProviderType;
use synclone::SyncloneError;

fn assert_counters_balance(result: &synclone::domain::entities::bulk_result::BulkOperationResult) {
    assert_eq!(
        result.successful_targets + result.failed_targets + result.skipped_targets,
        result.total_targets
    );
}

#[tokio::test]
async fn test_clone_every_configured_target() {
    let temp = TempDir::new().unwrap();
    let log = new_call_log();
    let factory = StubFactory::new()
        .with_provider(
            "github",
            StubProvider::new(ProviderType::Github, log.clone()).with_repositories(vec![
                repo("acme", "api-server", false),
                repo("acme", "web-ui", true),
            ]),
        )
        .with_provider("gitlab", StubProvider::new(ProviderType::Gitlab, log.clone()));

    let use_case = BulkCloneUseCase::new(Arc::new(factory), two_provider_config(temp.path()));
    let result = use_case
        .execute(&BulkOperationConfig::default())
        .await
        .unwrap();

    assert_eq!(result.total_targets, 3);
    assert_eq!(result.successful_targets, 3);
    assert!(result.is_success());
    assert_counters_balance(&result);

    let order: Vec<(&str, &str)> = result
        .results
        .iter()
        .map(|r| (r.provider.as_str(), r.name.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![("github", "acme"), ("github", "widgets"), ("gitlab", "platform")]
    );

    let acme_dir = temp.path().join("github").join("acme");
    assert_eq!(result.results[0].clone_dir, acme_dir.display().to_string());
    assert!(acme_dir.join("api-server").is_dir());
    assert!(acme_dir.join("web-ui").is_dir());

    assert_eq!(
        calls(&log),
        vec!["clone:acme:reset", "clone:widgets:reset", "clone:platform:reset"]
    );
}

#[tokio::test]
async fn test_failed_target_keeps_the_batch_going() {
    let temp = TempDir::new().unwrap();
    let log = new_call_log();
    let factory = StubFactory::new()
        .with_provider(
            "github",
            StubProvider::new(ProviderType::Github, log.clone()).failing_for("acme"),
        )
        .with_provider("gitlab", StubProvider::new(ProviderType::Gitlab, log.clone()));

    let use_case = BulkCloneUseCase::new(Arc::new(factory), two_provider_config(temp.path()));
    let result = use_case
        .execute(&BulkOperationConfig::default())
        .await
        .unwrap();

    assert_eq!(result.successful_targets, 2);
    assert_eq!(result.failed_targets, 1);
    assert_eq!(result.error_summary.get("network"), Some(&1));
    assert!(!result.is_success());
    assert_counters_balance(&result);

    let failure = result.failures().next().unwrap();
    assert_eq!(failure.name, "acme");
    assert_eq!(
        failure.error.as_deref(),
        Some("Network error: connection reset while reading acme")
    );
    assert_eq!(calls(&log).len(), 3);
}

#[tokio::test]
async fn test_one_failure_in_two_by_two_batch() {
    let temp = TempDir::new().unwrap();
    let log = new_call_log();
    let factory = StubFactory::new()
        .with_provider("github", StubProvider::new(ProviderType::Github, log.clone()))
        .with_provider(
            "gitlab",
            StubProvider::new(ProviderType::Gitlab, log.clone()).failing_for("infra"),
        );

    let result = BulkCloneUseCase::new(Arc::new(factory), two_by_two_config(temp.path()))
        .execute(&BulkOperationConfig::default())
        .await
        .unwrap();

    assert_eq!(result.total_targets, 4);
    assert_eq!(result.successful_targets, 3);
    assert_eq!(result.failed_targets, 1);
    assert_eq!(result.results.len(), 4);
    assert_counters_balance(&result);

    let failures: Vec<_> = result.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].provider, "gitlab");
    assert_eq!(failures[0].name, "infra");
    assert!(failures[0].error.as_deref().is_some_and(|e| !e.is_empty()));
    assert!(result
        .results
        .iter()
        .filter(|r| r.name != "infra")
        .all(|r| r.success && r.error.is_none()));
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let temp = TempDir::new().unwrap();
    let log = new_call_log();
    let mut config = two_provider_config(temp.path());
    config.providers.remove("gitlab");
    config.global.max_retries = 2;

    let factory = StubFactory::new().with_provider(
        "github",
        StubProvider::new(ProviderType::Github, log.clone()).flaky_for("acme", 2),
    );

    let result = BulkCloneUseCase::new(Arc::new(factory), config)
        .execute(&BulkOperationConfig::default().with_retry_backoff(Duration::from_millis(5)))
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.successful_targets, 2);
    assert_eq!(
        calls(&log),
        vec![
            "clone:acme:reset",
            "clone:acme:reset",
            "clone:acme:reset",
            "clone:widgets:reset"
        ]
    );
}

#[tokio::test]
async fn test_retry_limit_from_options_overrides_config() {
    let temp = TempDir::new().unwrap();
    let log = new_call_log();
    let mut config = two_provider_config(temp.path());
    config.providers.remove("gitlab");
    config.global.max_retries = 5;

    let factory = StubFactory::new().with_provider(
        "github",
        StubProvider::new(ProviderType::Github, log.clone()).failing_for("widgets"),
    );

    let options = BulkOperationConfig::default()
        .with_organizations(vec!["widgets".to_string()])
        .with_max_retries(1)
        .with_retry_backoff(Duration::from_millis(5));
    let result = BulkCloneUseCase::new(Arc::new(factory), config)
        .execute(&options)
        .await
        .unwrap();

    assert_eq!(result.failed_targets, 1);
    assert_eq!(result.error_summary.get("network"), Some(&1));
    assert_eq!(calls(&log), vec!["clone:widgets:reset", "clone:widgets:reset"]);
}

#[tokio::test]
async fn test_orphan_cleanup_reaches_provider_except_in_shared_root() {
    let temp = TempDir::new().unwrap();
    let mut config = two_provider_config(temp.path());
    config.providers.remove("gitlab");
    config.providers.get_mut("github").unwrap().organizations = vec![
        OrganizationConfig::new("acme").with_cleanup_orphans(true),
        OrganizationConfig::new("widgets").with_flatten(true),
    ];

    let log = new_call_log();
    let factory =
        StubFactory::new().with_provider("github", StubProvider::new(ProviderType::Github, log.clone()));
    let use_case = BulkCloneUseCase::new(Arc::new(factory), config);

    use_case.execute(&BulkOperationConfig::default()).await.unwrap();
    assert_eq!(calls(&log), vec!["clone:acme:reset:cleanup", "clone:widgets:reset"]);

    log.lock().unwrap().clear();
    use_case
        .execute(&BulkOperationConfig::default().with_cleanup_orphans(true))
        .await
        .unwrap();
    assert_eq!(calls(&log), vec!["clone:acme:reset:cleanup", "clone:widgets:reset"]);
}

#[tokio::test]
async fn test_dry_run_only_lists_repositories() {
    let temp = TempDir::new().unwrap();
    let log = new_call_log();
    let factory = StubFactory::new()
        .with_provider("github", StubProvider::new(ProviderType::Github, log.clone()))
        .with_provider("gitlab", StubProvider::new(ProviderType::Gitlab, log.clone()));

    let use_case = BulkCloneUseCase::new(Arc::new(factory), two_provider_config(temp.path()));
    let result = use_case
        .execute(&BulkOperationConfig::default().with_dry_run(true))
        .await
        .unwrap();

    assert!(result.dry_run);
    assert_eq!(result.total_targets, 3);
    assert_eq!(result.successful_targets, 3);
    assert!(result.results.is_empty());
    assert!(calls(&log).iter().all(|c| c.starts_with("list:")));
    assert!(!temp.path().join("github").exists());
}

#[tokio::test]
async fn test_provider_and_organization_selection() {
    let temp = TempDir::new().unwrap();
    let log = new_call_log();
    let factory = StubFactory::new()
        .with_provider("github", StubProvider::new(ProviderType::Github, log.clone()))
        .with_provider("gitlab", StubProvider::new(ProviderType::Gitlab, log.clone()));
    let use_case = BulkCloneUseCase::new(Arc::new(factory), two_provider_config(temp.path()));

    let options = BulkOperationConfig::default()
        .with_providers(vec!["github".to_string()])
        .with_organizations(vec!["widgets".to_string()])
        .with_strategy(CloneStrategy::Fetch);
    let result = use_case.execute(&options).await.unwrap();

    assert_eq!(result.total_targets, 1);
    assert_eq!(result.results[0].strategy, CloneStrategy::Fetch);
    assert_eq!(calls(&log), vec!["clone:widgets:fetch"]);
}

#[tokio::test]
async fn test_selection_matching_nothing_fails() {
    let temp = TempDir::new().unwrap();
    let use_case = BulkCloneUseCase::new(
        Arc::new(StubFactory::new()),
        two_provider_config(temp.path()),
    );

    let options = BulkOperationConfig::default().with_providers(vec!["gitea".to_string()]);
    let err = use_case.execute(&options).await.unwrap_err();
    assert!(matches!(err, SyncloneError::BulkOperationError { .. }));
}

#[tokio::test]
async fn test_broken_provider_fails_its_targets_only() {
    let temp = TempDir::new().unwrap();
    let log = new_call_log();
    let factory = StubFactory::new()
        .with_broken("github", "bad credentials")
        .with_provider("gitlab", StubProvider::new(ProviderType::Gitlab, log.clone()));

    let use_case = BulkCloneUseCase::new(Arc::new(factory), two_provider_config(temp.path()));
    let result = use_case
        .execute(&BulkOperationConfig::default())
        .await
        .unwrap();

    assert_eq!(result.failed_targets, 2);
    assert_eq!(result.successful_targets, 1);
    assert_eq!(result.error_summary.get("auth"), Some(&2));
    assert_eq!(calls(&log), vec!["clone:platform:reset"]);
}

#[tokio::test]
async fn test_operation_timeout_is_recorded() {
    let temp = TempDir::new().unwrap();
    let log = new_call_log();
    let mut config = two_provider_config(temp.path());
    config.global.timeouts.operation_secs = Some(1);
    config.providers.remove("gitlab");
    config
        .providers
        .get_mut("github")
        .unwrap()
        .organizations
        .retain(|o| o.name == "acme");

    let factory = StubFactory::new().with_provider(
        "github",
        StubProvider::new(ProviderType::Github, log.clone()).with_delay(Duration::from_secs(5)),
    );

    let result = BulkCloneUseCase::new(Arc::new(factory), config)
        .execute(&BulkOperationConfig::default())
        .await
        .unwrap();

    assert_eq!(result.failed_targets, 1);
    assert_eq!(result.error_summary.get("timeout"), Some(&1));
    assert!(result.results[0].duration_ms >= 900);
}

#[tokio::test]
async fn test_refresh_skips_missing_clone_directories() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("github").join("acme")).unwrap();

    let log = new_call_log();
    let factory = StubFactory::new()
        .with_provider("github", StubProvider::new(ProviderType::Github, log.clone()))
        .with_provider("gitlab", StubProvider::new(ProviderType::Gitlab, log.clone()));

    let result = BulkRefreshUseCase::new(Arc::new(factory), two_provider_config(temp.path()))
        .execute(&BulkOperationConfig::default())
        .await
        .unwrap();

    assert_eq!(result.total_targets, 3);
    assert_eq!(result.successful_targets, 1);
    assert_eq!(result.skipped_targets, 2);
    assert!(result.is_success());
    assert_counters_balance(&result);

    let skipped: Vec<&str> = result
        .results
        .iter()
        .filter(|r| !r.success && r.error.is_none())
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(skipped, vec!["widgets", "platform"]);
    assert_eq!(calls(&log), vec!["refresh:acme:reset"]);
}

#[tokio::test]
async fn test_refresh_uses_organization_strategy_and_flatten() {
    let temp = TempDir::new().unwrap();
    let flat_root = temp.path().join("flat");
    std::fs::create_dir_all(&flat_root).unwrap();

    let mut config = two_provider_config(temp.path());
    config.providers.remove("gitlab");
    config.providers.get_mut("github").unwrap().organizations = vec![OrganizationConfig::new("acme")
        .with_clone_dir(flat_root.display().to_string())
        .with_flatten(true)
        .with_strategy(CloneStrategy::Pull)];

    let log = new_call_log();
    let factory =
        StubFactory::new().with_provider("github", StubProvider::new(ProviderType::Github, log.clone()));

    let result = BulkRefreshUseCase::new(Arc::new(factory), config)
        .execute(&BulkOperationConfig::default())
        .await
        .unwrap();

    assert_eq!(result.successful_targets, 1);
    assert_eq!(result.results[0].clone_dir, flat_root.display().to_string());
    assert_eq!(calls(&log), vec!["refresh:acme:pull"]);
}

#[tokio::test]
async fn test_refresh_dry_run_reports_unhealthy_provider() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("gitlab").join("platform")).unwrap();

    let log = new_call_log();
    let mut config = two_provider_config(temp.path());
    config.providers.remove("github");

    let factory = StubFactory::new().with_provider(
        "gitlab",
        StubProvider::new(ProviderType::Gitlab, log.clone()).unhealthy(),
    );

    let result = BulkRefreshUseCase::new(Arc::new(factory), config)
        .execute(&BulkOperationConfig::default().with_dry_run(true))
        .await
        .unwrap();

    assert_eq!(result.failed_targets, 1);
    assert_eq!(result.error_summary.get("network"), Some(&1));
    assert!(result.results.is_empty());
    assert_eq!(calls(&log), vec!["health"]);
}
