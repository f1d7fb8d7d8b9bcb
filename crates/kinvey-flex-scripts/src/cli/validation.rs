use regex::Regex;
use std::sync::LazyLock;

static PACKAGE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:@[a-z0-9\-*~][a-z0-9\-*._~]*/)?[a-z0-9\-~][a-z0-9\-._~]*$")
        .expect("package name pattern compiles")
});

/// Names npm refuses, plus files the generator writes.
const RESERVED_NAMES: &[&str] = &[
    "node_modules",
    "favicon.ico",
    "package.json",
    "kinvey-flex-sdk",
    "kinvey-flex-scripts",
];

const MAX_NAME_LENGTH: usize = 214;

/// Validate a service name against npm package naming rules.
///
/// # Errors
///
/// Returns a message describing the first rule the name breaks.
pub fn validate_package_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Service name cannot be empty".to_string());
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(format!(
            "Service name cannot be longer than {} characters",
            MAX_NAME_LENGTH
        ));
    }

    if RESERVED_NAMES.contains(&name) {
        return Err(format!(
            "Service name '{}' is reserved and cannot be used",
            name
        ));
    }

    if name.starts_with('.') || name.starts_with('_') {
        return Err("Service name cannot start with a dot or underscore".to_string());
    }

    if name.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Service name cannot contain capital letters".to_string());
    }

    if !PACKAGE_NAME.is_match(name) {
        return Err(format!(
            "Service name '{}' can only contain URL-friendly characters",
            name
        ));
    }

    Ok(())
}

/// clap value parser wrapping [`validate_package_name`].
pub fn parse_package_name(s: &str) -> Result<String, String> {
    validate_package_name(s)?;
    Ok(s.to_string())
}
