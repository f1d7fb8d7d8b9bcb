//! Normalized result of one CLI invocation.

use crate::runner::RawOutput;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

/// What a CLI command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// stdout was valid JSON.
    Parsed(Value),
    /// stdout was not JSON; kept as-is.
    Raw(String),
    /// The command failed. Holds the last non-empty stderr line.
    Failed(String),
}

impl CommandOutcome {
    /// Folds captured process output into an outcome.
    ///
    /// Any stderr output counts as failure, even with a zero exit code.
    pub fn from_output(program: &str, output: &RawOutput) -> Self {
        if let Some(line) = last_non_empty_line(&output.stderr) {
            return Self::Failed(line.to_string());
        }

        match output.status {
            Some(0) => {}
            Some(code) => return Self::Failed(format!("{program} exited with status {code}")),
            None => return Self::Failed(format!("{program} was terminated by a signal")),
        }

        match serde_json::from_str::<Value>(&output.stdout) {
            Ok(value) => Self::Parsed(value),
            Err(_) => Self::Raw(output.stdout.clone()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The failure message, if the command failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// The `result` member of parsed output.
    ///
    /// The CLI wraps its JSON answers as `{"result": ...}`.
    pub fn result(&self) -> Option<&Value> {
        match self {
            Self::Parsed(value) => value.get("result"),
            _ => None,
        }
    }

    /// Deserializes the `result` member into `T`.
    ///
    /// Returns `Ok(None)` when there is no `result` member.
    pub fn parse_result<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        self.result()
            .map(|value| T::deserialize(value))
            .transpose()
    }

    /// Renders the record shape `{error: null, ...fields}`.
    ///
    /// ```
    /// use kinvey_cli_wrapper::CommandOutcome;
    /// use serde_json::json;
    ///
    /// let ok = CommandOutcome::Parsed(json!({"result": {"id": "job-1"}}));
    /// assert_eq!(ok.to_record(), json!({"error": null, "result": {"id": "job-1"}}));
    ///
    /// let failed = CommandOutcome::Failed("[error] NotFound".into());
    /// assert_eq!(failed.to_record(), json!({"error": "[error] NotFound"}));
    /// ```
    pub fn to_record(&self) -> Value {
        match self {
            Self::Parsed(Value::Object(fields)) => {
                // Parsed members, `error` included, replace the defaults.
                let mut record = Map::with_capacity(fields.len() + 1);
                record.insert("error".into(), Value::Null);
                record.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                Value::Object(record)
            }
            Self::Parsed(other) => json!({ "error": null, "result": other }),
            Self::Raw(text) => json!({ "error": null, "result": text }),
            Self::Failed(message) => json!({ "error": message }),
        }
    }
}

fn last_non_empty_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty()).last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn outcome(output: RawOutput) -> CommandOutcome {
        CommandOutcome::from_output("kinvey", &output)
    }

    #[test]
    fn test_json_stdout_is_parsed() {
        let result = outcome(RawOutput::success("{\"result\":{\"name\":\"dev\"}}\n"));
        assert_eq!(result, CommandOutcome::Parsed(json!({"result": {"name": "dev"}})));
        assert_eq!(result.to_record(), json!({"error": null, "result": {"name": "dev"}}));
    }

    #[test]
    fn test_plain_stdout_is_raw() {
        let result = outcome(RawOutput::success("kinvey-cli 4.1.0\n"));
        assert_eq!(result, CommandOutcome::Raw("kinvey-cli 4.1.0\n".into()));
        assert_eq!(result.to_record()["error"], Value::Null);
    }

    #[test]
    fn test_stderr_wins_over_stdout() {
        let result = outcome(RawOutput {
            status: Some(0),
            stdout: "{\"result\":{}}".into(),
            stderr: "warning: old\n[error] InvalidCredentials: Credentials are invalid. Please authenticate.\n\n"
                .into(),
        });
        assert_eq!(
            result.error(),
            Some("[error] InvalidCredentials: Credentials are invalid. Please authenticate.")
        );
        assert_eq!(
            result.to_record(),
            json!({"error": "[error] InvalidCredentials: Credentials are invalid. Please authenticate."})
        );
    }

    #[test]
    fn test_nonzero_exit_without_stderr_fails() {
        let result = outcome(RawOutput {
            status: Some(2),
            stdout: String::new(),
            stderr: String::new(),
        });
        assert_eq!(result.error(), Some("kinvey exited with status 2"));
    }

    #[test]
    fn test_whitespace_stderr_is_ignored() {
        let result = outcome(RawOutput {
            status: Some(0),
            stdout: "{\"result\":[]}".into(),
            stderr: "  \n".into(),
        });
        assert!(!result.is_failed());
    }

    #[test]
    fn test_parse_result() {
        #[derive(Deserialize)]
        struct Job {
            id: String,
        }

        let result = CommandOutcome::Parsed(json!({"result": {"id": "abc"}}));
        let job: Job = result.parse_result().unwrap().unwrap();
        assert_eq!(job.id, "abc");

        let missing = CommandOutcome::Parsed(json!({"other": 1}));
        assert!(missing.parse_result::<Job>().unwrap().is_none());
    }

    #[test]
    fn test_parsed_error_member_is_kept() {
        let result = outcome(RawOutput::success(
            "{\"error\":\"quota exceeded\",\"result\":null}",
        ));
        assert!(!result.is_failed());
        assert_eq!(
            result.to_record(),
            json!({"error": "quota exceeded", "result": null})
        );
    }

    #[test]
    fn test_non_object_json_goes_under_result() {
        let result = CommandOutcome::Parsed(json!([1, 2]));
        assert_eq!(result.to_record(), json!({"error": null, "result": [1, 2]}));
    }
}
