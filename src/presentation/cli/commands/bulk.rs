use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;
use std::time::Duration;

use super::render_structured;
use crate::application::use_cases::{BulkCloneUseCase, BulkOperationConfig, BulkRefreshUseCase};
use crate::domain::entities::bulk_result::{BulkOperationResult, TargetResult};
use crate::infrastructure::filesystem::config_store::ConfigStore;
use crate::infrastructure::provider::ProviderFactory;
use crate::presentation::cli::{BulkArgs, OutputFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkKind {
    Clone,
    Refresh,
}

/// Handler for the clone and refresh commands
pub struct BulkCommand {
    pub kind: BulkKind,
    pub args: BulkArgs,
}

impl BulkCommand {
    pub fn new(kind: BulkKind, args: BulkArgs) -> Self {
        Self { kind, args }
    }

    pub async fn execute(&self) -> Result<()> {
        let (path, config) = ConfigStore::new()
            .load(self.args.config.as_deref())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
        tracing::debug!("Using configuration {}", path.display());

        let factory = Arc::new(
            ProviderFactory::new()
                .with_http_timeout(Duration::from_secs(config.global.timeouts.http_secs)),
        );

        let mut options = BulkOperationConfig::default()
            .with_providers(self.args.provider.clone())
            .with_organizations(self.args.org.clone())
            .with_dry_run(self.args.dry_run)
            .with_cleanup_orphans(self.args.cleanup_orphans && self.kind == BulkKind::Clone);
        if let Some(strategy) = self.args.strategy {
            options = options.with_strategy(strategy);
        }
        if let Some(retries) = self.args.max_retries {
            options = options.with_max_retries(retries);
        }

        if self.args.output == OutputFormat::Text {
            let verb = match self.kind {
                BulkKind::Clone => "Cloning",
                BulkKind::Refresh => "Refreshing",
            };
            let mut header = format!(
                "{} {} organizations",
                verb,
                options.selected_target_count(&config)
            );
            if let Some(strategy) = self.args.strategy {
                header.push_str(&format!(" with strategy {}", strategy));
                if !strategy.touches_working_tree() {
                    header.push_str(" (working trees left untouched)");
                }
            }
            if options.cleanup_orphans {
                header.push_str(", removing orphans");
            }
            if self.args.dry_run {
                header.push_str(" [dry-run]");
            }
            println!("{} {}", "::".blue().bold(), header);
        }

        let result = match self.kind {
            BulkKind::Clone => BulkCloneUseCase::new(factory, config).execute(&options).await,
            BulkKind::Refresh => {
                BulkRefreshUseCase::new(factory, config)
                    .execute(&options)
                    .await
            }
        }
        .map_err(|e| anyhow::anyhow!("{}", e))?;

        match render_structured(&result, self.args.output)? {
            Some(rendered) => println!("{}", rendered),
            None => print_result(&result),
        }

        if result.is_success() {
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "{} of {} targets failed",
                result.failed_targets,
                result.total_targets
            ))
        }
    }
}

fn print_target(target: &TargetResult) {
    let label = format!("{}/{}", target.provider, target.name);
    match (&target.error, target.success) {
        (_, true) => println!(
            "{} {} -> {} ({}ms)",
            "✓".green().bold(),
            label.bold(),
            target.clone_dir,
            target.duration_ms
        ),
        (Some(error), false) => println!("{} {}: {}", "✗".red().bold(), label.bold(), error.red()),
        (None, false) => println!(
            "{} {}: {} does not exist, skipped",
            "-".yellow().bold(),
            label.bold(),
            target.clone_dir
        ),
    }
}

fn print_result(result: &BulkOperationResult) {
    for target in &result.results {
        print_target(target);
    }

    let summary = result.summary();
    if result.is_success() {
        println!("{} {}", "✓".green().bold(), summary);
    } else {
        println!("{} {}", "⚠".yellow().bold(), summary);
    }
}
