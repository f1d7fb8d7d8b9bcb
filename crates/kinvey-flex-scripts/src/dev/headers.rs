//! Platform headers injected into every relayed request.
//!
//! A deployed flex service receives requests from the Kinvey backend with
//! app metadata and the caller's original headers attached. The dev proxy
//! recreates those headers from [`FlexEnvironment`] so the service behaves
//! the same locally.

use crate::config::FlexEnvironment;
use crate::error::{CliError, Result};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

pub const APP_METADATA: &str = "x-kinvey-app-metadata";
pub const ORIGINAL_REQUEST_HEADERS: &str = "x-kinvey-original-request-headers";
pub const USERNAME: &str = "x-kinvey-username";
pub const USER_ID: &str = "x-kinvey-user-id";
pub const AUTH_KEY: &str = "x-auth-key";

#[derive(Debug, Serialize)]
struct AppMetadata<'a> {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    appsecret: Option<&'a str>,
    #[serde(rename = "baasUrl", skip_serializing_if = "Option::is_none")]
    baas_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mastersecret: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct OriginalRequestHeaders<'a> {
    #[serde(rename = "x-kinvey-api-version")]
    api_version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    authorization: Option<String>,
    #[serde(rename = "x-kinvey-client-app-version")]
    client_app_version: &'a str,
    host: String,
}

/// Precomputed header template shared by all relayed requests.
#[derive(Debug, Clone)]
pub struct FlexHeaders {
    headers: HeaderMap,
}

impl FlexHeaders {
    /// Builds the template.
    ///
    /// `client_app_version` is the service's package.json version.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::InvalidArgument`] when a variable holds characters
    /// that are not allowed in an HTTP header.
    pub fn new(env: &FlexEnvironment, client_app_version: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();

        let metadata = AppMetadata {
            id: env.app_id.as_deref(),
            appsecret: env.app_secret.as_deref(),
            baas_url: env.baas_url.as_deref(),
            mastersecret: env.master_secret.as_deref(),
        };
        insert(&mut headers, APP_METADATA, &serde_json::to_string(&metadata)?)?;

        let original = OriginalRequestHeaders {
            api_version: env.api_version.as_deref().unwrap_or("3"),
            authorization: authorization(env),
            client_app_version: client_app_version.filter(|v| !v.is_empty()).unwrap_or("1"),
            host: env
                .baas_url
                .as_deref()
                .unwrap_or("baas")
                .replacen("https://", "", 1),
        };
        insert(
            &mut headers,
            ORIGINAL_REQUEST_HEADERS,
            &serde_json::to_string(&original)?,
        )?;

        if let Some(user_name) = &env.user_name {
            insert(&mut headers, USERNAME, user_name)?;
        }
        if let Some(user_id) = &env.user_id {
            insert(&mut headers, USER_ID, user_id)?;
        }
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        if let Some(secret) = &env.shared_secret {
            insert(&mut headers, AUTH_KEY, secret)?;
        }

        Ok(Self { headers })
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Copies `incoming` minus connection-level headers, then overlays the template.
    pub fn merge_into(&self, incoming: &HeaderMap) -> HeaderMap {
        let mut merged = HeaderMap::with_capacity(incoming.len() + self.headers.len());
        for (name, value) in incoming {
            if !is_connection_header(name) {
                merged.append(name.clone(), value.clone());
            }
        }
        for (name, value) in &self.headers {
            merged.insert(name.clone(), value.clone());
        }
        merged
    }
}

/// `KINVEY_AUTH_HEADER`, or Basic auth from the app and master secrets.
fn authorization(env: &FlexEnvironment) -> Option<String> {
    if let Some(auth) = &env.auth_header {
        return Some(auth.clone());
    }
    match (&env.app_secret, &env.master_secret) {
        (Some(app), Some(master)) => Some(format!(
            "Basic {}",
            STANDARD.encode(format!("{app}:{master}"))
        )),
        _ => None,
    }
}

/// Hop-by-hop headers plus the ones the HTTP client recomputes.
pub fn is_connection_header(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "host"
            | "content-length"
            | "connection"
            | "keep-alive"
            | "proxy-connection"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<()> {
    let value = HeaderValue::from_str(value).map_err(|_| {
        CliError::InvalidArgument(format!("value for header '{name}' contains invalid characters"))
    })?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}
