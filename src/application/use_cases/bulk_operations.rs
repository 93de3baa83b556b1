use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::common::error::SyncloneError;
use crate::common::result::{async_helpers, OptionExt, SyncloneResult};
use crate::domain::entities::bulk_result::{
    BulkCloneResult, BulkOperationResult, BulkRefreshResult, TargetResult,
};
use crate::domain::entities::synclone_config::{
    OrganizationConfig, ProviderConfig, SyncloneConfig,
};
use crate::domain::value_objects::clone_strategy::CloneStrategy;
use crate::infrastructure::provider::{
    CloneOptions, GitProvider, ProviderClientFactory, ProviderError,
};

/// Selection and behaviour of a bulk run
#[derive(Debug, Clone)]
pub struct BulkOperationConfig {
    /// Only these providers (None means every configured provider)
    pub providers: Option<Vec<String>>,

    /// Only these organizations (None means every configured organization)
    pub organizations: Option<Vec<String>>,

    /// Overrides the per-organization strategy
    pub strategy: Option<CloneStrategy>,

    /// Check providers without touching the filesystem
    pub dry_run: bool,

    /// Overrides `global.max_retries`
    pub max_retries: Option<u32>,

    /// Delay before the first retry, doubled for every further one
    pub retry_backoff: Duration,

    /// Remove orphaned working copies of every cloned organization
    pub cleanup_orphans: bool,
}

impl Default for BulkOperationConfig {
    fn default() -> Self {
        Self {
            providers: None,
            organizations: None,
            strategy: None,
            dry_run: false,
            max_retries: None,
            retry_backoff: Duration::from_secs(1),
            cleanup_orphans: false,
        }
    }
}

impl BulkOperationConfig {
    pub fn with_providers(mut self, providers: Vec<String>) -> Self {
        self.providers = Some(providers).filter(|p| !p.is_empty());
        self
    }

    pub fn with_organizations(mut self, organizations: Vec<String>) -> Self {
        self.organizations = Some(organizations).filter(|o| !o.is_empty());
        self
    }

    pub fn with_strategy(mut self, strategy: CloneStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_cleanup_orphans(mut self, cleanup: bool) -> Self {
        self.cleanup_orphans = cleanup;
        self
    }

    /// Number of provider/organization targets this selection picks from `config`
    pub fn selected_target_count(&self, config: &SyncloneConfig) -> usize {
        config
            .providers
            .iter()
            .filter(|(name, _)| self.wants_provider(name))
            .flat_map(|(_, provider)| &provider.organizations)
            .filter(|org| self.wants_organization(&org.name))
            .count()
    }

    fn wants_provider(&self, name: &str) -> bool {
        self.providers
            .as_ref()
            .map_or(true, |selected| selected.iter().any(|p| p == name))
    }

    fn wants_organization(&self, name: &str) -> bool {
        self.organizations
            .as_ref()
            .map_or(true, |selected| selected.iter().any(|o| o == name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BulkMode {
    Clone,
    Refresh,
}

impl BulkMode {
    fn verb(self) -> &'static str {
        match self {
            BulkMode::Clone => "clone",
            BulkMode::Refresh => "refresh",
        }
    }
}

/// One provider/organization pair scheduled for a run
struct Target<'a> {
    provider: &'a str,
    organization: &'a OrganizationConfig,
    clone_dir: String,
    strategy: CloneStrategy,
}

impl Target<'_> {
    fn result(&self, success: bool, error: Option<String>, duration_ms: i64) -> TargetResult {
        TargetResult {
            provider: self.provider.to_string(),
            name: self.organization.name.clone(),
            clone_dir: self.clone_dir.clone(),
            strategy: self.strategy,
            success,
            error,
            duration_ms,
        }
    }
}

/// Classify a failure for the error summary
fn error_kind(error: &SyncloneError) -> &'static str {
    match error {
        SyncloneError::Provider(e) => e.kind(),
        SyncloneError::Timeout { .. } => "timeout",
        SyncloneError::Filter(_) | SyncloneError::Config(_) => "config",
        _ => "internal",
    }
}

/// Await `operation`, bounded by `deadline_secs` when set
async fn run_bounded<F>(operation: F, deadline_secs: Option<u64>) -> SyncloneResult<()>
where
    F: Future<Output = Result<(), ProviderError>>,
{
    let operation = async { operation.await.map_err(SyncloneError::from) };
    match deadline_secs {
        Some(secs) => async_helpers::with_timeout(operation, secs).await,
        None => operation.await,
    }
}

#[derive(Debug, Clone, Copy)]
struct RetryPolicy {
    max_retries: u32,
    backoff: Duration,
}

impl RetryPolicy {
    fn delay(&self, retry: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(retry))
    }
}

/// Run `attempt` until it succeeds, fails permanently or runs out of retries.
/// Only network and rate-limit failures are retried; the deadline applies per attempt.
async fn run_with_retries<F, Fut>(
    attempt: F,
    deadline_secs: Option<u64>,
    policy: RetryPolicy,
    label: &str,
) -> SyncloneResult<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<(), ProviderError>>,
{
    let mut retries = 0;
    loop {
        match run_bounded(attempt(), deadline_secs).await {
            Err(SyncloneError::Provider(e)) if e.is_transient() && retries < policy.max_retries => {
                let delay = policy.delay(retries);
                retries += 1;
                tracing::warn!(
                    "{}: {} (retry {}/{} in {:?})",
                    label,
                    e,
                    retries,
                    policy.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            outcome => return outcome,
        }
    }
}

/// Shared driver for clone and refresh runs
struct BulkExecutor {
    factory: Arc<dyn ProviderClientFactory>,
    config: SyncloneConfig,
    mode: BulkMode,
}

impl BulkExecutor {
    async fn run(&self, options: &BulkOperationConfig) -> SyncloneResult<BulkOperationResult> {
        let selected: Vec<&str> = self
            .config
            .provider_names()
            .into_iter()
            .filter(|name| options.wants_provider(name))
            .collect();

        if selected.is_empty() && options.providers.is_some() {
            return Err(SyncloneError::bulk_operation_error(format!(
                "No configured provider matches the selection (configured: {})",
                self.config.provider_names().join(", ")
            )));
        }

        let mut result = BulkOperationResult::new(options.dry_run);

        tracing::info!(
            "Starting bulk {} across {} provider(s){}",
            self.mode.verb(),
            selected.len(),
            if options.dry_run { " (dry run)" } else { "" }
        );

        for provider_name in selected {
            let provider_config = self
                .config
                .providers
                .get(provider_name)
                .ok_or_internal_error(format!("Provider '{}' is not configured", provider_name))?;
            self.run_provider(provider_name, provider_config, options, &mut result)
                .await;
        }

        result.finish();
        tracing::info!("Bulk {} finished: {}", self.mode.verb(), result.summary());
        Ok(result)
    }

    async fn run_provider(
        &self,
        provider_name: &str,
        provider_config: &ProviderConfig,
        options: &BulkOperationConfig,
        result: &mut BulkOperationResult,
    ) {
        let targets: Vec<Target<'_>> = provider_config
            .organizations
            .iter()
            .filter(|org| options.wants_organization(&org.name))
            .map(|org| Target {
                provider: provider_name,
                organization: org,
                clone_dir: org
                    .resolve_clone_dir(provider_name, &self.config.global)
                    .display()
                    .to_string(),
                strategy: options
                    .strategy
                    .unwrap_or_else(|| org.effective_strategy(&self.config.global)),
            })
            .collect();

        if targets.is_empty() {
            tracing::debug!("{}: no organizations selected", provider_name);
            return;
        }

        let provider = match self.factory.create(provider_name, provider_config) {
            Ok(provider) => provider,
            Err(e) => {
                tracing::error!("{}: cannot create client: {}", provider_name, e);
                let message = e.to_string();
                for target in &targets {
                    let record = (!options.dry_run)
                        .then(|| target.result(false, Some(message.clone()), 0));
                    result.record_failure(e.kind(), record);
                }
                return;
            }
        };

        for target in &targets {
            self.run_target(provider.as_ref(), target, options, result)
                .await;
        }
    }

    fn clone_options(&self, target: &Target<'_>, options: &BulkOperationConfig) -> CloneOptions {
        let org = target.organization;
        let mut cleanup = options.cleanup_orphans || org.cleanup_orphans;
        if cleanup && org.shares_clone_root() {
            tracing::warn!(
                "{}/{}: not removing orphans from the shared clone root {}",
                target.provider,
                org.name,
                target.clone_dir
            );
            cleanup = false;
        }
        CloneOptions::new(target.strategy).with_cleanup_orphans(cleanup)
    }

    fn retry_policy(&self, options: &BulkOperationConfig) -> RetryPolicy {
        RetryPolicy {
            max_retries: options.max_retries.unwrap_or(self.config.global.max_retries),
            backoff: options.retry_backoff,
        }
    }

    async fn run_target(
        &self,
        provider: &dyn GitProvider,
        target: &Target<'_>,
        options: &BulkOperationConfig,
        result: &mut BulkOperationResult,
    ) {
        let dry_run = options.dry_run;
        let org = target.organization;
        let clone_dir = Path::new(&target.clone_dir);

        if self.mode == BulkMode::Refresh && !clone_dir.is_dir() {
            tracing::info!(
                "{}/{}: {} does not exist, skipping",
                target.provider,
                org.name,
                clone_dir.display()
            );
            result.record_skipped((!dry_run).then(|| target.result(false, None, 0)));
            return;
        }

        if dry_run {
            let outcome = match self.mode {
                BulkMode::Clone => provider
                    .list_repositories(&org.name)
                    .await
                    .map(|repos| {
                        tracing::info!(
                            "[dry-run] {}/{}: {} repositories visible",
                            target.provider,
                            org.name,
                            repos.len()
                        );
                    }),
                BulkMode::Refresh => {
                    if provider.is_healthy().await {
                        Ok(())
                    } else {
                        Err(ProviderError::network(format!(
                            "{} API is not reachable",
                            target.provider
                        )))
                    }
                }
            };

            match outcome {
                Ok(()) => result.record_success(None),
                Err(e) => {
                    tracing::warn!("[dry-run] {}/{}: {}", target.provider, org.name, e);
                    result.record_failure(e.kind(), None);
                }
            }
            return;
        }

        let filter = match org.repository_filter(&self.config.global) {
            Ok(filter) => filter,
            Err(e) => {
                let error = SyncloneError::from(e);
                result.record_failure(
                    error_kind(&error),
                    Some(target.result(false, Some(error.to_string()), 0)),
                );
                return;
            }
        };

        tracing::info!(
            "{} {}/{} into {} ({})",
            self.mode.verb(),
            target.provider,
            org.name,
            clone_dir.display(),
            target.strategy
        );

        let deadline = self.config.global.timeouts.operation_secs;
        let policy = self.retry_policy(options);
        let label = format!("{}/{}", target.provider, org.name);
        let owner = org.name.as_str();
        let strategy = target.strategy;

        let started = Instant::now();
        let outcome = match self.mode {
            BulkMode::Clone => {
                let clone_options = self.clone_options(target, options);
                let (clone_options, filter) = (&clone_options, &filter);
                run_with_retries(
                    move || provider.clone_organization(owner, clone_dir, clone_options, filter),
                    deadline,
                    policy,
                    &label,
                )
                .await
            }
            BulkMode::Refresh => {
                run_with_retries(
                    move || provider.refresh_all(clone_dir, owner, strategy),
                    deadline,
                    policy,
                    &label,
                )
                .await
            }
        };
        let duration_ms = started.elapsed().as_millis() as i64;

        match outcome {
            Ok(()) => {
                tracing::info!("{}/{} done in {}ms", target.provider, org.name, duration_ms);
                result.record_success(Some(target.result(true, None, duration_ms)));
            }
            Err(e) => {
                tracing::error!("{}/{} failed: {}", target.provider, org.name, e);
                result.record_failure(
                    error_kind(&e),
                    Some(target.result(false, Some(e.to_string()), duration_ms)),
                );
            }
        }
    }
}

/// Clone every selected organization of every selected provider
pub struct BulkCloneUseCase {
    executor: BulkExecutor,
}

impl BulkCloneUseCase {
    pub fn new(factory: Arc<dyn ProviderClientFactory>, config: SyncloneConfig) -> Self {
        Self {
            executor: BulkExecutor {
                factory,
                config,
                mode: BulkMode::Clone,
            },
        }
    }

    /// Run the batch. Per-target failures are recorded in the result; only a
    /// provider selection that matches nothing configured is an error.
    pub async fn execute(&self, options: &BulkOperationConfig) -> SyncloneResult<BulkCloneResult> {
        self.executor.run(options).await
    }
}

/// Update existing clones of every selected organization
pub struct BulkRefreshUseCase {
    executor: BulkExecutor,
}

impl BulkRefreshUseCase {
    pub fn new(factory: Arc<dyn ProviderClientFactory>, config: SyncloneConfig) -> Self {
        Self {
            executor: BulkExecutor {
                factory,
                config,
                mode: BulkMode::Refresh,
            },
        }
    }

    /// Run the batch; targets whose clone directory is missing are skipped
    pub async fn execute(
        &self,
        options: &BulkOperationConfig,
    ) -> SyncloneResult<BulkRefreshResult> {
        self.executor.run(options).await
    }
}
