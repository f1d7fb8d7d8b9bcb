//! Start command implementation.
//!
//! Orchestrates the local development loop:
//! - settings and platform variables from flags, `.env` and the environment
//! - optional build command that produces the bundle
//! - the service process launched from the bundle
//! - discovery of the service's handlers
//! - the relay with injected platform headers
//! - restart and rediscovery when the bundle changes
//! - graceful shutdown on Ctrl+C

use crate::cli::StartArgs;
use crate::commands::utils;
use crate::config::{ConfigOverrides, EnvFile, FlexEnvironment, ScriptsConfig};
use crate::dev::service::{development_env, spawn_build_command, wait_for_file};
use crate::dev::{
    discover_with_retry, relay_client, BundleWatcher, DevConfig, FileChange, FlexHeaders,
    ProxyServer, ProxyState, RetryPolicy, ServiceLauncher, ServiceProcess,
};
use crate::error::{Result, ResultExt};
use crate::ui;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Execute the start command.
///
/// # Errors
///
/// Returns errors for:
/// - Missing entry file or invalid settings
/// - No free port in range
/// - Bundle not produced in time
/// - Service process that cannot be launched
pub async fn execute(args: StartArgs) -> Result<()> {
    let root = utils::resolve_project_root(args.cwd.as_deref())?;

    let env_path = root.join(".env");
    let env_file = EnvFile::load(&env_path)?;
    if env_file.is_none() {
        ui::error("No .env file found.");
    }

    let overrides = ConfigOverrides {
        port: args.port,
        host: args.host.clone(),
        flex_url: args.flex_url.clone(),
        bundle: args.bundle.clone(),
        build_command: args.build_command.clone(),
        watch: args.no_watch.then_some(false),
    };
    let config = ScriptsConfig::load(&root, env_file.as_ref(), &overrides)?;

    let host_is_explicit = args.host.is_some()
        || std::env::var("HOST").is_ok_and(|h| !h.is_empty())
        || env_file
            .as_ref()
            .and_then(|f| f.get("HOST"))
            .is_some_and(|h| !h.is_empty());
    if host_is_explicit {
        ui::info(&format!(
            "Attempting to bind to HOST environment variable: {}",
            config.host
        ));
        eprintln!("If this was unintentional, check that you haven't mistakenly set it in your shell.");
        eprintln!();
    }

    let dev = DevConfig::resolve(&root, &config)?;
    ui::info(&format!("Working directory: {}", dev.cwd.display()));

    let platform = FlexEnvironment::load(env_file.as_ref());
    let headers = FlexHeaders::new(&platform, utils::package_version(&root).as_deref())?;

    let child_env = development_env();
    let _build = match &dev.build_command {
        Some(command) => Some(spawn_build_command(command, &root, &child_env)?),
        None => None,
    };

    let spinner = ui::Spinner::new(&format!("Waiting for {}...", dev.bundle.display()));
    match wait_for_file(&dev.bundle, dev.bundle_timeout, Duration::from_millis(250)).await {
        Ok(()) => spinner.finish("Bundle ready"),
        Err(e) => {
            spinner.fail("No bundle");
            return Err(e).with_hint(
                "Build the service first, or pass --build-command to run your bundler in watch mode",
            );
        }
    }

    let launcher = ServiceLauncher::new(dev.node.clone(), dev.bundle.clone(), root.clone(), child_env);
    let mut service = Some(launcher.spawn()?);

    let client = relay_client()?;
    let policy = RetryPolicy::new(dev.discovery_attempts, dev.discovery_interval);
    let mut discovery = spawn_discovery(client.clone(), dev.flex_url.clone(), policy);

    let state = Arc::new(ProxyState::new(client.clone(), dev.flex_url.clone(), headers));
    let server = ProxyServer::new(dev.addr, state);
    let mut server_handle = tokio::spawn(async move {
        if let Err(e) = server.start().await {
            ui::error(&format!("Server error: {}", e));
        }
    });

    let (_watcher, mut changes) = if dev.watch {
        let (watcher, rx) = BundleWatcher::new(&dev.bundle, dev.debounce_ms)?;
        ui::info(&format!("Watching {}", watcher.target().display()));
        (Some(watcher), Some(rx))
    } else {
        (None, None)
    };

    ui::info("Press Ctrl+C to stop");

    loop {
        tokio::select! {
            Some(change) = next_change(&mut changes) => {
                service = handle_bundle_change(change, &launcher, service).await;
                if service.is_some() {
                    discovery.abort();
                    discovery = spawn_discovery(client.clone(), dev.flex_url.clone(), policy);
                }
            }

            _ = signal::ctrl_c() => {
                ui::info("Shutting down development server...");
                break;
            }

            _ = &mut server_handle => {
                ui::warning("Server task completed unexpectedly");
                break;
            }
        }
    }

    discovery.abort();
    if let Some(process) = service {
        process.stop().await;
    }
    ui::success("Development server stopped");
    Ok(())
}

async fn next_change(changes: &mut Option<mpsc::Receiver<FileChange>>) -> Option<FileChange> {
    match changes {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Restarts the service for a new bundle. Returns the running process, if any.
async fn handle_bundle_change(
    change: FileChange,
    launcher: &ServiceLauncher,
    current: Option<ServiceProcess>,
) -> Option<ServiceProcess> {
    if change.is_removal() {
        ui::warning(&format!(
            "Bundle removed: {}. Waiting for the next build...",
            change.path().display()
        ));
        return current;
    }

    ui::info(&format!("Bundle changed: {}", change.path().display()));
    let restarted = match current {
        Some(process) => launcher.restart(process).await,
        None => launcher.spawn(),
    };

    match restarted {
        Ok(process) => {
            ui::success("Service restarted");
            Some(process)
        }
        Err(e) => {
            ui::error(&format!("Service restart failed: {}", e));
            None
        }
    }
}

/// Runs discovery off the command loop so Ctrl+C is never blocked behind the retries.
fn spawn_discovery(
    client: reqwest::Client,
    flex_url: String,
    policy: RetryPolicy,
) -> JoinHandle<()> {
    tokio::spawn(report_discovery(client, flex_url, policy))
}

/// Prints every registered endpoint. Failure only warns; the relay still runs.
async fn report_discovery(client: reqwest::Client, flex_url: String, policy: RetryPolicy) {
    match discover_with_retry(&client, &flex_url, policy).await {
        Ok(discovery) => {
            if discovery.is_empty() {
                ui::warning("The service registered no handlers");
            }
            for url in discovery.endpoints(&flex_url) {
                ui::line(&url);
            }
        }
        Err(e) => {
            ui::warning(&format!(
                "Service discovery failed after {} attempts: {}",
                policy.attempts, e
            ));
        }
    }
}
