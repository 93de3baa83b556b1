//! In-memory providers and factory for driving the bulk use cases

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use synclone::domain::entities::repository::ProviderRepository;
use synclone::domain::entities::repository_filter::RepositoryFilter;
use synclone::domain::entities::synclone_config::ProviderConfig;
use synclone::domain::value_objects::clone_strategy::CloneStrategy;
use synclone::domain::value_objects::provider_type::ProviderType;
use synclone::infrastructure::provider::{
    CloneOptions, GitProvider, ProviderClientFactory, ProviderCloner, ProviderError,
    ProviderService,
};

/// Ordered log of provider calls shared between stubs and assertions
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub struct StubProvider {
    provider_type: ProviderType,
    repositories: Vec<ProviderRepository>,
    failing_orgs: Vec<String>,
    flaky_orgs: Mutex<HashMap<String, u32>>,
    healthy: bool,
    delay: Option<Duration>,
    calls: CallLog,
}

impl StubProvider {
    pub fn new(provider_type: ProviderType, calls: CallLog) -> Self {
        Self {
            provider_type,
            repositories: Vec::new(),
            failing_orgs: Vec::new(),
            flaky_orgs: Mutex::new(HashMap::new()),
            healthy: true,
            delay: None,
            calls,
        }
    }

    pub fn with_repositories(mut self, repositories: Vec<ProviderRepository>) -> Self {
        self.repositories = repositories;
        self
    }

    pub fn failing_for(mut self, org: &str) -> Self {
        self.failing_orgs.push(org.to_string());
        self
    }

    /// The first `failures` clone or refresh calls for `org` fail with a network error
    pub fn flaky_for(self, org: &str, failures: u32) -> Self {
        self.flaky_orgs.lock().unwrap().insert(org.to_string(), failures);
        self
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, owner: &str) -> Result<(), ProviderError> {
        let reset = || {
            Err(ProviderError::network(format!(
                "connection reset while reading {}",
                owner
            )))
        };

        if self.failing_orgs.iter().any(|o| o == owner) {
            return reset();
        }

        let mut flaky = self.flaky_orgs.lock().unwrap();
        match flaky.get_mut(owner) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                reset()
            }
            _ => Ok(()),
        }
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ProviderService for StubProvider {
    fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    async fn list_repositories(&self, owner: &str) -> Result<Vec<ProviderRepository>, ProviderError> {
        self.record(format!("list:{}", owner));
        self.check(owner)?;
        Ok(self
            .repositories
            .iter()
            .filter(|r| r.owner == owner)
            .cloned()
            .collect())
    }

    async fn get_default_branch(&self, _owner: &str, _repo: &str) -> Result<String, ProviderError> {
        Ok("main".to_string())
    }

    async fn validate_token(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        self.record("health".to_string());
        self.healthy
    }
}

#[async_trait]
impl ProviderCloner for StubProvider {
    async fn clone_organization(
        &self,
        owner: &str,
        target: &Path,
        options: &CloneOptions,
        filter: &RepositoryFilter,
    ) -> Result<(), ProviderError> {
        let mut call = format!("clone:{}:{}", owner, options.strategy);
        if options.cleanup_orphans {
            call.push_str(":cleanup");
        }
        self.record(call);
        self.pause().await;
        self.check(owner)?;

        for repo in self.repositories.iter().filter(|r| r.owner == owner) {
            if filter.should_include_repository(&repo.to_visibility_repository()) {
                std::fs::create_dir_all(target.join(&repo.name))
                    .map_err(|e| ProviderError::config(e.to_string()))?;
            }
        }
        Ok(())
    }

    async fn refresh_all(
        &self,
        _target: &Path,
        owner: &str,
        strategy: CloneStrategy,
    ) -> Result<(), ProviderError> {
        self.record(format!("refresh:{}:{}", owner, strategy));
        self.pause().await;
        self.check(owner)
    }
}

/// Factory handing out pre-built stubs by provider name
#[derive(Default)]
pub struct StubFactory {
    providers: HashMap<String, Arc<StubProvider>>,
    broken: HashMap<String, String>,
}

impl StubFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, name: &str, provider: StubProvider) -> Self {
        self.providers.insert(name.to_string(), Arc::new(provider));
        self
    }

    /// `create` fails with an authentication error for `name`
    pub fn with_broken(mut self, name: &str, message: &str) -> Self {
        self.broken.insert(name.to_string(), message.to_string());
        self
    }
}

impl ProviderClientFactory for StubFactory {
    fn create(
        &self,
        name: &str,
        _config: &ProviderConfig,
    ) -> Result<Arc<dyn GitProvider>, ProviderError> {
        if let Some(message) = self.broken.get(name) {
            return Err(ProviderError::auth(message.clone()));
        }
        match self.providers.get(name) {
            Some(provider) => Ok(Arc::clone(provider) as Arc<dyn GitProvider>),
            None => Err(ProviderError::unsupported(name)),
        }
    }
}

pub fn new_call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}
