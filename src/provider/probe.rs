//! Connectivity diagnostics.
//!
//! The probe walks an ordered list of strategies: the current-generation API
//! with `Key` authentication, then the legacy API path with the `Basic`
//! scheme. First success wins; when every strategy fails the report carries
//! each attempt's outcome plus a remediation hint. This is operator tooling,
//! never part of the delivery path.

use reqwest::header;
use serde::Serialize;

use super::gateway::ProviderGateway;

const REMEDIATION_HINT: &str = "Verify ONESIGNAL_APP_ID and ONESIGNAL_API_KEY; \
current-generation API keys start with os_v2_";

pub(super) struct ProbeStrategy {
    pub name: &'static str,
    pub url: String,
    pub auth: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeAttempt {
    pub strategy: &'static str,
    pub ok: bool,
    pub outcome: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<&'static str>,
    pub attempts: Vec<ProbeAttempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ProviderGateway {
    fn probe_strategies(&self) -> Vec<ProbeStrategy> {
        vec![
            ProbeStrategy {
                name: "current-api",
                url: format!("{}/apps/{}", self.api_url, self.app_id),
                auth: self.auth_header(),
            },
            ProbeStrategy {
                name: "legacy-api",
                url: format!("{}/apps/{}", self.legacy_api_url, self.app_id),
                auth: format!("Basic {}", self.api_key),
            },
        ]
    }

    /// Try each probe strategy in order; stop at the first success.
    pub async fn probe_connectivity(&self) -> ProbeReport {
        let mut attempts = Vec::new();

        for strategy in self.probe_strategies() {
            let result = self
                .http
                .get(strategy.url.as_str())
                .header(header::AUTHORIZATION, strategy.auth.as_str())
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => {
                    tracing::info!(strategy = strategy.name, "connectivity probe succeeded");
                    attempts.push(ProbeAttempt {
                        strategy: strategy.name,
                        ok: true,
                        outcome: format!("HTTP {}", response.status().as_u16()),
                    });
                    return ProbeReport {
                        reachable: true,
                        via: Some(strategy.name),
                        attempts,
                        hint: None,
                    };
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    tracing::warn!(
                        strategy = strategy.name,
                        status,
                        "connectivity probe rejected"
                    );
                    attempts.push(ProbeAttempt {
                        strategy: strategy.name,
                        ok: false,
                        outcome: format!("HTTP {status}"),
                    });
                }
                Err(e) => {
                    tracing::warn!(strategy = strategy.name, error = %e, "connectivity probe failed");
                    attempts.push(ProbeAttempt {
                        strategy: strategy.name,
                        ok: false,
                        outcome: e.to_string(),
                    });
                }
            }
        }

        ProbeReport {
            reachable: false,
            via: None,
            attempts,
            hint: Some(REMEDIATION_HINT.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OneSignalConfig;

    #[test]
    fn test_strategy_order_and_auth_schemes() {
        let gateway = ProviderGateway::new(&OneSignalConfig {
            app_id: "app-1".to_string(),
            api_key: "os_v2_secret".to_string(),
            api_url: "https://api.onesignal.com".to_string(),
            legacy_api_url: "https://onesignal.com/api/v1".to_string(),
        })
        .unwrap();

        let strategies = gateway.probe_strategies();
        assert_eq!(strategies.len(), 2);

        assert_eq!(strategies[0].name, "current-api");
        assert_eq!(strategies[0].url, "https://api.onesignal.com/apps/app-1");
        assert_eq!(strategies[0].auth, "Key os_v2_secret");

        assert_eq!(strategies[1].name, "legacy-api");
        assert_eq!(strategies[1].url, "https://onesignal.com/api/v1/apps/app-1");
        assert_eq!(strategies[1].auth, "Basic os_v2_secret");
    }
}
