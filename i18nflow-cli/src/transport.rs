//! HTTP implementation of [`RemoteTransport`] on top of `ureq`.
//!
//! Base URL is `<server_url>/api`; every request carries the `X-API-Key`
//! header and a 30 second overall timeout.

use std::time::Duration;

use serde::Deserialize;

use i18nflow_core::{Config, LocaleSet};
use i18nflow_sync::transport::{decode_push_response, decode_translations};
use i18nflow_sync::{PushRequest, PushResponse, RemoteTransport, TransportError};

const TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpTransport {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct AuthStatus {
    #[serde(default)]
    status: String,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(TIMEOUT).build();
        Self {
            agent,
            base_url: format!("{}/api", config.server_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
        }
    }

    /// Probe `GET /cli/auth`; `Ok(false)` when the server answers but does
    /// not accept the credentials.
    pub fn check_auth(&self) -> Result<bool, TransportError> {
        let url = self.url("/cli/auth");
        let request = self.agent.get(&url).set("X-API-Key", &self.api_key);
        match read_body(&url, request.call()) {
            Ok(body) => Ok(serde_json::from_str::<AuthStatus>(&body)
                .map(|auth| auth.status == "ok")
                .unwrap_or(false)),
            Err(TransportError::Status { status, .. }) if status == 401 || status == 403 => {
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl RemoteTransport for HttpTransport {
    fn fetch_translations(
        &self,
        project_id: &str,
        locale: Option<&str>,
    ) -> Result<LocaleSet, TransportError> {
        let url = self.url("/cli/translations");
        let mut request = self
            .agent
            .get(&url)
            .set("X-API-Key", &self.api_key)
            .query("project_id", project_id);
        if let Some(locale) = locale {
            request = request.query("locale", locale);
        }
        tracing::debug!("GET {url}");

        let body = read_body(&url, request.call())?;
        decode_translations(&body).map_err(|e| TransportError::Decode {
            url,
            message: e.to_string(),
        })
    }

    fn push_keys(&self, request: &PushRequest) -> Result<PushResponse, TransportError> {
        let url = self.url("/cli/keys");
        tracing::debug!("POST {url} ({} keys)", request.keys.len());
        let response = self
            .agent
            .post(&url)
            .set("X-API-Key", &self.api_key)
            .send_json(request);

        let body = read_body(&url, response)?;
        decode_push_response(&body).map_err(|e| TransportError::Decode {
            url,
            message: e.to_string(),
        })
    }
}

fn read_body(
    url: &str,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<String, TransportError> {
    match result {
        Ok(response) => response.into_string().map_err(|e| TransportError::Network {
            url: url.to_string(),
            message: e.to_string(),
        }),
        Err(ureq::Error::Status(status, response)) => Err(TransportError::Status {
            url: url.to_string(),
            status,
            body: response.into_string().unwrap_or_default(),
        }),
        Err(ureq::Error::Transport(transport)) => Err(TransportError::Network {
            url: url.to_string(),
            message: transport.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_has_api_prefix_and_no_double_slash() {
        let config = Config {
            server_url: "https://i18n.example.com/".into(),
            ..Config::default()
        };
        let transport = HttpTransport::new(&config);
        assert_eq!(
            transport.url("/cli/keys"),
            "https://i18n.example.com/api/cli/keys"
        );
    }

    #[test]
    fn unreachable_server_is_a_network_error() {
        let config = Config {
            server_url: "http://127.0.0.1:1".into(),
            ..Config::default()
        };
        let err = HttpTransport::new(&config)
            .fetch_translations("7", None)
            .unwrap_err();
        assert!(matches!(err, TransportError::Network { .. }));
    }
}
