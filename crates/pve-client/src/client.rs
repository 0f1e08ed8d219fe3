//! HTTPS implementation of [`PveApi`].

use reqwest::header::{AUTHORIZATION, COOKIE, HeaderName, HeaderValue};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use pve_core::{Credentials, GuestKind, ModuleConfig, Record};

use crate::api::PveApi;
use crate::error::{ApiError, ApiResult};

/// Longest error body echoed back in [`ApiError::Status`].
const MAX_REASON_LEN: usize = 200;

/// Authenticated client bound to one PVE host.
///
/// Built fresh for every scrape; nothing is pooled across scrapes.
#[derive(Debug, Clone)]
pub struct PveClient {
    http: reqwest::Client,
    base_url: String,
    auth: (HeaderName, HeaderValue),
}

/// Response envelope wrapping every API payload.
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
struct Ticket {
    ticket: String,
}

impl PveClient {
    /// Build a client for `host` and authenticate with the module's credentials.
    ///
    /// Token auth needs no round trip; password auth requests a ticket first.
    pub async fn connect(host: &str, module: &ModuleConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(module.timeout())
            .danger_accept_invalid_certs(!module.verify_ssl)
            .user_agent(concat!("pve-exporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;
        let base_url = base_url(host, module.port());

        let auth = match module.credentials() {
            Some(Credentials::Token { name, value }) => {
                let token = format!("PVEAPIToken={}!{}={}", module.user, name, value);
                (AUTHORIZATION, sensitive_header(&token)?)
            }
            Some(Credentials::Password(password)) => {
                let ticket = request_ticket(&http, &base_url, &module.user, password).await?;
                let cookie = format!("PVEAuthCookie={}", ticket.ticket);
                (COOKIE, sensitive_header(&cookie)?)
            }
            None => return Err(ApiError::Auth("module has no credentials".to_string())),
        };

        debug!(%base_url, user = %module.user, "PVE API client ready");
        Ok(Self {
            http,
            base_url,
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> ApiResult<Value> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%path, "GET");

        let mut req = self
            .http
            .get(&url)
            .header(self.auth.0.clone(), self.auth.1.clone());
        if !query.is_empty() {
            req = req.query(query);
        }

        let resp = req.send().await.map_err(|source| ApiError::Transport {
            path: path.to_string(),
            source,
        })?;
        unwrap_envelope(path, resp).await
    }

    async fn get_records(&self, path: &str, query: &[(&str, &str)]) -> ApiResult<Vec<Record>> {
        let data = self.get(path, query).await?;
        into_records(path, data)
    }

    async fn get_record(&self, path: &str) -> ApiResult<Record> {
        let data = self.get(path, &[]).await?;
        into_record(path, data)
    }
}

impl PveApi for PveClient {
    async fn cluster_status(&self) -> ApiResult<Vec<Record>> {
        self.get_records("cluster/status", &[]).await
    }

    async fn cluster_resources(&self, kind: Option<&str>) -> ApiResult<Vec<Record>> {
        match kind {
            Some(kind) => self.get_records("cluster/resources", &[("type", kind)]).await,
            None => self.get_records("cluster/resources", &[]).await,
        }
    }

    async fn cluster_options(&self) -> ApiResult<Record> {
        self.get_record("cluster/options").await
    }

    async fn version(&self) -> ApiResult<Record> {
        self.get_record("version").await
    }

    async fn nodes(&self) -> ApiResult<Vec<Record>> {
        self.get_records("nodes", &[]).await
    }

    async fn node_guests(&self, node: &str, kind: GuestKind) -> ApiResult<Vec<Record>> {
        self.get_records(&format!("nodes/{node}/{kind}"), &[]).await
    }

    async fn guest_config(&self, node: &str, kind: GuestKind, vmid: &str) -> ApiResult<Record> {
        self.get_record(&format!("nodes/{node}/{kind}/{vmid}/config"))
            .await
    }

    async fn node_storages(&self, node: &str) -> ApiResult<Vec<Record>> {
        self.get_records(&format!("nodes/{node}/storage"), &[]).await
    }

    async fn storage_content(&self, node: &str, storage: &str) -> ApiResult<Vec<Record>> {
        self.get_records(&format!("nodes/{node}/storage/{storage}/content"), &[])
            .await
    }
}

async fn request_ticket(
    http: &reqwest::Client,
    base_url: &str,
    user: &str,
    password: &str,
) -> ApiResult<Ticket> {
    let path = "access/ticket";
    let resp = http
        .post(format!("{base_url}/{path}"))
        .form(&[("username", user), ("password", password)])
        .send()
        .await
        .map_err(|source| ApiError::Transport {
            path: path.to_string(),
            source,
        })?;

    let data = unwrap_envelope(path, resp).await.map_err(|e| match e {
        ApiError::Status { status, reason, .. } => {
            ApiError::Auth(format!("ticket request for {user} rejected ({status}): {reason}"))
        }
        other => other,
    })?;

    serde_json::from_value(data).map_err(|e| ApiError::Auth(format!("malformed ticket: {e}")))
}

async fn unwrap_envelope(path: &str, resp: reqwest::Response) -> ApiResult<Value> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let reason = match body.trim() {
            "" => status.canonical_reason().unwrap_or("unknown").to_string(),
            text => text.chars().take(MAX_REASON_LEN).collect(),
        };
        return Err(ApiError::Status {
            path: path.to_string(),
            status: status.as_u16(),
            reason,
        });
    }

    let envelope: Envelope = resp.json().await.map_err(|e| ApiError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    Ok(envelope.data)
}

fn into_records(path: &str, data: Value) -> ApiResult<Vec<Record>> {
    match data {
        Value::Null => Ok(Vec::new()),
        other => serde_json::from_value(other).map_err(|e| ApiError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn into_record(path: &str, data: Value) -> ApiResult<Record> {
    match data {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Record::new()),
        other => Err(ApiError::Decode {
            path: path.to_string(),
            reason: format!("expected an object, got {other}"),
        }),
    }
}

fn sensitive_header(value: &str) -> ApiResult<HeaderValue> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|e| ApiError::Auth(format!("credentials are not a valid header value: {e}")))?;
    header.set_sensitive(true);
    Ok(header)
}

/// API root for `host`, which may carry its own `:port`.
pub fn base_url(host: &str, default_port: u16) -> String {
    let host = host.trim().trim_end_matches('/');

    if let Some((addr, tail)) = host.strip_prefix('[').and_then(|rest| rest.split_once(']')) {
        let port = tail
            .strip_prefix(':')
            .and_then(|p| p.parse().ok())
            .unwrap_or(default_port);
        return format!("https://[{addr}]:{port}/api2/json");
    }

    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') => match port.parse::<u16>() {
            Ok(port) => format!("https://{name}:{port}/api2/json"),
            Err(_) => format!("https://{host}:{default_port}/api2/json"),
        },
        // Bare IPv6 address without brackets.
        Some(_) => format!("https://[{host}]:{default_port}/api2/json"),
        None => format!("https://{host}:{default_port}/api2/json"),
    }
}
