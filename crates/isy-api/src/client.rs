// REST client for the controller's `/rest` surface.
//
// Every request carries HTTP Basic credentials. Read endpoints return
// XML bodies decoded through `crate::xml`; command endpoints only care
// about the status code.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::xml::{self, ElkStatus, ElkTopology, NodesDocument, VariableDefinitions, VariableValues};

/// The two variable namespaces the controller keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Integer,
    State,
}

impl VariableKind {
    pub const ALL: [Self; 2] = [Self::Integer, Self::State];

    /// Wire code used in REST paths and event payloads.
    pub fn code(self) -> &'static str {
        match self {
            Self::Integer => "1",
            Self::State => "2",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::State => "state",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" => Some(Self::Integer),
            "2" => Some(Self::State),
            _ => None,
        }
    }
}

/// Raw HTTP client for the controller's REST API.
///
/// Holds the base URL (scheme + host, e.g. `http://10.0.0.5`) and the
/// credentials. Paths passed to the helpers are relative to `/rest/`.
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
}

impl RestClient {
    /// Create a client, building the HTTP stack from `transport`.
    pub fn new(
        base_url: Url,
        username: String,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, username, password))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        username: String,
        password: SecretString,
    ) -> Self {
        Self {
            http,
            base_url,
            username,
            password,
        }
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `Authorization` header value for the event-stream upgrade.
    pub fn authorization_header(&self) -> Result<String, Error> {
        let request = self
            .http
            .get(self.base_url.clone())
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .build()?;
        request
            .headers()
            .get(reqwest::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or_else(|| Error::Authentication {
                path: self.base_url.to_string(),
            })
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/rest/{path}`
    pub(crate) fn rest_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/rest/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET a path and return the body text on 2xx.
    pub async fn get_text(&self, path: &str) -> Result<String, Error> {
        let url = self.rest_url(path)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                path: path.to_owned(),
            });
        }
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                path: path.to_owned(),
            });
        }
        Ok(resp.text().await?)
    }

    /// GET a path and decode the XML body into `T`.
    pub async fn get_xml<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let body = self.get_text(path).await?;
        xml::parse(&body)
    }

    /// Fire a command path. Any 2xx response counts as success.
    pub async fn send_command(&self, path: &str) -> Result<(), Error> {
        self.get_text(path).await.map(|_| ())
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Full node and scene snapshot.
    pub async fn nodes(&self) -> Result<NodesDocument, Error> {
        self.get_xml("nodes").await
    }

    /// Variable names for one namespace.
    pub async fn variable_definitions(
        &self,
        kind: VariableKind,
    ) -> Result<VariableDefinitions, Error> {
        self.get_xml(&format!("vars/definitions/{}", kind.code()))
            .await
    }

    /// Current values for every variable in one namespace.
    pub async fn variable_values(&self, kind: VariableKind) -> Result<VariableValues, Error> {
        self.get_xml(&format!("vars/get/{}", kind.code())).await
    }

    /// Current value of a single variable.
    pub async fn variable(&self, kind: VariableKind, id: &str) -> Result<VariableValues, Error> {
        let body = self
            .get_text(&format!("vars/get/{}/{id}", kind.code()))
            .await?;
        // A single-variable response is a bare `<var>`; wrap it so both
        // shapes decode through `VariableValues`.
        let trimmed = strip_declaration(&body);
        if trimmed.starts_with("<vars") {
            xml::parse(trimmed)
        } else {
            xml::parse(&format!("<vars>{trimmed}</vars>"))
        }
    }

    /// Security-system areas and zones.
    pub async fn elk_topology(&self) -> Result<ElkTopology, Error> {
        self.get_xml("elk/get/topology").await
    }

    /// Current security-system status as area/zone event records.
    pub async fn elk_status(&self) -> Result<ElkStatus, Error> {
        self.get_xml("elk/get/status").await
    }
}

fn strip_declaration(body: &str) -> &str {
    let body = body.trim_start();
    if body.starts_with("<?xml") {
        body.find("?>").map_or(body, |end| body[end + 2..].trim_start())
    } else {
        body
    }
}

// ── Tests ────────────────────────────────────────────────────────────
