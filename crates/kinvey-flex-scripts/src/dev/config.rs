//! Development server configuration.
//!
//! Resolves [`ScriptsConfig`] against a project root into the concrete
//! addresses and paths `start` works with.

use crate::config::ScriptsConfig;
use crate::error::{ConfigError, Result};
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Ports tried after the requested one.
const PORT_SEARCH_SPAN: u16 = 10;

/// Development server configuration.
#[derive(Debug, Clone)]
pub struct DevConfig {
    /// Project root
    pub cwd: PathBuf,

    /// Proxy socket address (host + first free port)
    pub addr: SocketAddr,

    /// Local service base url
    pub flex_url: String,

    /// Absolute entry file
    pub entry: PathBuf,

    /// Absolute bundle path
    pub bundle: PathBuf,

    pub build_command: Option<String>,
    pub node: String,
    pub watch: bool,
    pub bundle_timeout: Duration,
    pub discovery_attempts: u32,
    pub discovery_interval: Duration,

    /// Debounce delay in milliseconds for bundle changes
    pub debounce_ms: u64,
}

impl DevConfig {
    /// Resolve `config` for the project at `cwd`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EntryNotFound`] when the entry file is missing
    /// and [`ConfigError::InvalidValue`] when no port can be bound.
    pub fn resolve(cwd: &Path, config: &ScriptsConfig) -> Result<Self> {
        let entry = absolute(cwd, &config.entry);
        if !entry.is_file() {
            return Err(ConfigError::EntryNotFound(entry).into());
        }

        let addr = find_available_port(&config.host, config.port)?;

        Ok(Self {
            cwd: cwd.to_path_buf(),
            addr,
            flex_url: config.flex_url.trim_end_matches('/').to_string(),
            entry,
            bundle: absolute(cwd, &config.bundle),
            build_command: config.build_command.clone().filter(|c| !c.trim().is_empty()),
            node: config.node.clone(),
            watch: config.watch,
            bundle_timeout: Duration::from_secs(config.bundle_timeout_secs),
            discovery_attempts: config.discovery_attempts,
            discovery_interval: Duration::from_millis(config.discovery_interval_ms),
            debounce_ms: 100,
        })
    }

    /// Get the server URL as a string.
    pub fn server_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

fn absolute(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Find an available port on `host` starting from `requested_port`.
///
/// Tries the requested port first, then the next ten.
pub fn find_available_port(host: &str, requested_port: u16) -> Result<SocketAddr> {
    if requested_port != 0 && requested_port < 1024 {
        crate::ui::warning(&format!(
            "Port {} is in privileged range, may require root access",
            requested_port
        ));
    }

    let ip = (host, 0)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| addr.ip())
        .ok_or_else(|| ConfigError::InvalidValue {
            field: "host".to_string(),
            value: host.to_string(),
            hint: "Use an IP address or a resolvable host name, e.g. HOST=0.0.0.0".to_string(),
        })?;

    for offset in 0..=PORT_SEARCH_SPAN {
        let Some(port) = requested_port.checked_add(offset) else {
            break;
        };
        let addr = SocketAddr::new(ip, port);
        if TcpListener::bind(addr).is_ok() {
            if offset > 0 {
                crate::ui::warning(&format!(
                    "Port {} is busy, using port {} instead",
                    requested_port, port
                ));
            }
            return Ok(addr);
        }
    }

    Err(ConfigError::InvalidValue {
        field: "port".to_string(),
        value: requested_port.to_string(),
        hint: format!(
            "Ports {}-{} are all in use. Set PORT to another value.",
            requested_port,
            requested_port.saturating_add(PORT_SEARCH_SPAN)
        ),
    }
    .into())
}
