//! Rewrites the service's `package.json` for the flex scripts.

use crate::error::{GeneratorError, Result, ResultExt};
use serde_json::{json, Map, Value};
use std::path::Path;

/// Browsers targeted by the bundler preset.
pub const DEFAULT_BROWSERS: &[&str] = &[">0.2%", "not dead", "not ie <= 11", "not op_mini all"];

/// Points `scripts`, `eslintConfig` and `browserslist` at the flex tooling.
///
/// Other keys keep their values and order.
pub fn apply_flex_scripts(fields: &mut Map<String, Value>) {
    fields
        .entry("dependencies")
        .or_insert_with(|| Value::Object(Map::new()));
    fields.insert(
        "scripts".to_string(),
        json!({
            "start": "kinvey-flex-scripts start",
            "build": "kinvey-flex-scripts build",
            "deploy": "kinvey-flex-scripts deploy"
        }),
    );
    fields.insert(
        "eslintConfig".to_string(),
        json!({ "extends": "kinvey-flex-service" }),
    );
    fields.insert("browserslist".to_string(), json!(DEFAULT_BROWSERS));
}

/// Loads, updates and writes back `<svc_path>/package.json`.
pub fn update(svc_path: &Path) -> Result<()> {
    let path = svc_path.join("package.json");
    if !path.is_file() {
        return Err(GeneratorError::MissingPackageJson(svc_path.to_path_buf()).into());
    }

    let text = std::fs::read_to_string(&path).with_path(&path)?;
    let mut fields = match serde_json::from_str::<Value>(&text)? {
        Value::Object(fields) => fields,
        _ => return Err(GeneratorError::MissingPackageJson(svc_path.to_path_buf()).into()),
    };

    apply_flex_scripts(&mut fields);
    write_json(&path, &Value::Object(fields))
}

/// Minimal manifest for a freshly created service.
pub fn minimal(name: &str) -> Value {
    json!({
        "name": name,
        "version": "0.1.0",
        "private": true
    })
}

pub(crate) fn write_json(path: &Path, value: &Value) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    std::fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_update_keeps_existing_fields() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"name":"svc","version":"1.0.0","scripts":{"test":"jest"},"dependencies":{"lodash":"^4"}}"#,
        )
        .unwrap();

        update(dir.path()).unwrap();

        let text = std::fs::read_to_string(dir.path().join("package.json")).unwrap();
        assert!(text.ends_with("}\n"));
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["name"], "svc");
        assert_eq!(value["dependencies"]["lodash"], "^4");
        assert_eq!(
            value["scripts"],
            json!({
                "start": "kinvey-flex-scripts start",
                "build": "kinvey-flex-scripts build",
                "deploy": "kinvey-flex-scripts deploy"
            })
        );
        assert_eq!(value["eslintConfig"]["extends"], "kinvey-flex-service");
        assert_eq!(value["browserslist"], json!(DEFAULT_BROWSERS));
    }

    #[test]
    fn test_adds_empty_dependencies() {
        let mut fields = Map::new();
        apply_flex_scripts(&mut fields);
        assert_eq!(fields["dependencies"], json!({}));
    }

    #[test]
    fn test_missing_package_json() {
        let dir = TempDir::new().unwrap();
        let err = update(dir.path()).unwrap_err();
        assert!(err.to_string().contains("No package.json found"));
    }
}
