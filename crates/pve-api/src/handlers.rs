//! HTTP handlers.
//!
//! Scrapes answer in the Prometheus text format; failures answer with a
//! plain-text reason.

use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use pve_core::config::DEFAULT_MODULE;
use pve_metrics::prometheus::CONTENT_TYPE;
use serde::Deserialize;
use tracing::{debug, error};

use crate::ApiState;

/// Query string of `GET /pve`.
#[derive(Debug, Deserialize)]
pub struct ScrapeParams {
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default = "default_module")]
    pub module: String,
}

fn default_target() -> String {
    "localhost".to_string()
}

fn default_module() -> String {
    DEFAULT_MODULE.to_string()
}

// ── Scrape ─────────────────────────────────────────────────────

/// GET /pve?target=<host>&module=<name>
pub async fn scrape(
    State(state): State<ApiState>,
    Query(params): Query<ScrapeParams>,
) -> impl IntoResponse {
    let Some(module) = state.config.module(&params.module) else {
        return (
            StatusCode::BAD_REQUEST,
            format!("Module '{}' not found in config file\n", params.module),
        )
            .into_response();
    };

    let started = Instant::now();
    let result = pve_collector::collect_pve(module, &params.target, state.options).await;
    state
        .metrics
        .observe_collection(&params.module, started.elapsed())
        .await;

    match result {
        Ok(body) => {
            debug!(host = %params.target, module = %params.module, "scrape served");
            (StatusCode::OK, [("content-type", CONTENT_TYPE)], body).into_response()
        }
        Err(e) => {
            error!(host = %params.target, module = %params.module, error = %e, "scrape failed");
            state.metrics.record_error(&params.module).await;
            (StatusCode::INTERNAL_SERVER_ERROR, format!("{e}\n")).into_response()
        }
    }
}

// ── Self-metrics ───────────────────────────────────────────────

/// GET /metrics
pub async fn self_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let body = state.metrics.render().await;
    (StatusCode::OK, [("content-type", CONTENT_TYPE)], body)
}

// ── Index ──────────────────────────────────────────────────────

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(
        "<html>\n\
         <head><title>Proxmox VE Exporter</title></head>\n\
         <body>\n\
         <h1>Proxmox VE Exporter</h1>\n\
         <p>Visit <code>/pve?target=1.2.3.4</code> to use.</p>\n\
         <p><a href=\"/metrics\">Exporter metrics</a></p>\n\
         </body>\n\
         </html>\n",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::response::Response;
    use pve_core::{CollectorsOptions, ExporterConfig};

    fn test_state() -> ApiState {
        let config = ExporterConfig::from_toml_str(
            r#"
[modules.default]
user = "prometheus@pve"
token_name = "exporter"
token_value = "secret"
verify_ssl = false
timeout_secs = 1
"#,
        )
        .unwrap();
        ApiState::new(config, CollectorsOptions::default())
    }

    fn params(target: &str, module: &str) -> Query<ScrapeParams> {
        Query(ScrapeParams {
            target: target.to_string(),
            module: module.to_string(),
        })
    }

    async fn body_text(resp: Response) -> String {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn unknown_module_is_bad_request() {
        let state = test_state();
        let resp = scrape(State(state.clone()), params("pve1", "lab")).await.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(resp).await.contains("'lab'"));
        assert_eq!(state.metrics.error_count("lab").await, 0);
    }

    #[tokio::test]
    async fn failed_scrape_is_server_error_and_counted() {
        let state = test_state();
        let resp = scrape(State(state.clone()), params("127.0.0.1:1", "default"))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(state.metrics.error_count("default").await, 1);

        let rendered = state.metrics.render().await;
        assert!(rendered.contains("pve_collection_duration_seconds_count{module=\"default\"} 1\n"));
        assert!(rendered.contains("pve_request_errors_total{module=\"default\"} 1\n"));
    }

    #[tokio::test]
    async fn self_metrics_returns_text() {
        let state = test_state();
        let resp = self_metrics(State(state)).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.starts_with("text/plain; version=0.0.4"));
        assert!(body_text(resp).await.contains("# TYPE pve_request_errors_total counter\n"));
    }

    #[tokio::test]
    async fn index_links_endpoints() {
        let Html(page) = index().await;
        assert!(page.contains("/pve?target="));
        assert!(page.contains("href=\"/metrics\""));
    }
}
