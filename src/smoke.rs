// 🧪 Smoke test - GET every read endpoint of a running server
//
// A failed request is a failed check, never a crash.

use std::time::Duration;

use crate::endpoints::{count_items, error_message, smoke_endpoints};
use crate::error::{Result, SeedError};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// 200 with a list of this many items (None when `data` was not a list)
    Passed { items: Option<usize> },
    /// Any non-200 status
    Failed { status: u16, error: Option<String> },
    /// No response at all
    Unreachable { reason: String },
}

#[derive(Debug, Clone)]
pub struct EndpointCheck {
    pub description: String,
    pub url: String,
    pub outcome: CheckOutcome,
}

impl EndpointCheck {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, CheckOutcome::Passed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct SmokeSummary {
    pub base_url: String,
    pub checks: Vec<EndpointCheck>,
}

impl SmokeSummary {
    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|c| c.passed()).count()
    }

    pub fn total(&self) -> usize {
        self.checks.len()
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == self.total()
    }
}

/// Interpret one HTTP response
pub fn classify(status: u16, body: &serde_json::Value) -> CheckOutcome {
    if status == 200 {
        CheckOutcome::Passed {
            items: count_items(body),
        }
    } else {
        CheckOutcome::Failed {
            status,
            error: error_message(body),
        }
    }
}

pub struct SmokeTester {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl SmokeTester {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SeedError::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(SmokeTester {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn check(&self, path: &str, description: &str) -> EndpointCheck {
        let url = format!("{}{}", self.base_url, path);

        let outcome = match self.client.get(&url).send() {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response
                    .json::<serde_json::Value>()
                    .unwrap_or(serde_json::Value::Null);
                classify(status, &body)
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "request failed");
                let reason = if e.is_connect() {
                    format!("connection refused; is the server running on {}?", self.base_url)
                } else {
                    e.to_string()
                };
                CheckOutcome::Unreachable { reason }
            }
        };

        EndpointCheck {
            description: description.to_string(),
            url,
            outcome,
        }
    }

    pub fn run(&self) -> SmokeSummary {
        let checks = smoke_endpoints()
            .iter()
            .map(|(path, description)| self.check(path, description))
            .collect();

        SmokeSummary {
            base_url: self.base_url.clone(),
            checks,
        }
    }
}
