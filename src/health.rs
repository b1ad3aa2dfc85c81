use std::time::Duration;

use serde::Deserialize;

use crate::error::HealthError;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Body returned by the API health endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct HealthStatus {
    pub(crate) status: String,
    pub(crate) database: String,
}

impl HealthStatus {
    pub(crate) fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Raw health check result: HTTP status and body
#[derive(Debug)]
pub(crate) struct HealthResponse {
    pub(crate) status: u16,
    pub(crate) body: String,
}

pub(crate) fn fetch(url: &str) -> Result<HealthResponse, HealthError> {
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(HEALTH_TIMEOUT))
        .http_status_as_error(false)
        .build()
        .into();

    let transport = |e: ureq::Error| HealthError::Transport {
        url: url.to_string(),
        reason: e.to_string(),
    };
    let response = agent.get(url).call().map_err(transport)?;
    let status = response.status().as_u16();
    let body = response.into_body().read_to_string().map_err(transport)?;
    tracing::debug!(url, status, "health check");
    Ok(HealthResponse { status, body })
}

/// Interpret a response: 200 with `"status": "ok"` is healthy, anything else
/// is an error carrying the body
pub(crate) fn evaluate(response: &HealthResponse) -> Result<HealthStatus, HealthError> {
    if response.status != 200 {
        return Err(HealthError::Unhealthy {
            status: response.status,
            body: response.body.trim().to_string(),
        });
    }
    let parsed: HealthStatus =
        serde_json::from_str(&response.body).map_err(|e| HealthError::Decode(e.to_string()))?;
    if !parsed.is_ok() {
        return Err(HealthError::Unhealthy {
            status: response.status,
            body: response.body.trim().to_string(),
        });
    }
    Ok(parsed)
}
