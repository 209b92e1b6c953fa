use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// How the hosting command is using attribute values.
///
/// Only `Exec` enforces required attributes and warns about missing values.
/// Every other pass (linting, archiving, vendoring) must run without input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    /// Checks are being executed against a target.
    Exec,
    /// Static analysis of a profile; missing input is tolerated.
    #[default]
    Check,
}

impl EvaluationMode {
    pub fn is_exec(self) -> bool {
        self == EvaluationMode::Exec
    }
}

impl FromStr for EvaluationMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "exec" => Ok(EvaluationMode::Exec),
            "check" => Ok(EvaluationMode::Check),
            other => Err(format!("unknown evaluation mode '{}', expected 'exec' or 'check'", other)),
        }
    }
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationMode::Exec => f.write_str("exec"),
            EvaluationMode::Check => f.write_str("check"),
        }
    }
}
