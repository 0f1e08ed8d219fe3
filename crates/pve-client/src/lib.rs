//! pve-client — read access to the PVE REST API.
//!
//! Collectors are written against the [`PveApi`] trait; [`PveClient`] is
//! the HTTPS implementation used for real scrapes.
//!
//! # Architecture
//!
//! ```text
//! PveClient::connect(host, module)
//!   ├── API token  → Authorization: PVEAPIToken=...
//!   └── password   → POST access/ticket → PVEAuthCookie
//!
//! PveApi
//!   ├── cluster_status() / cluster_resources() / cluster_options()
//!   ├── version() / nodes()
//!   └── node_guests() / guest_config() / node_storages() / storage_content()
//! ```
//!
//! Every call is a GET against `https://{host}:{port}/api2/json/...` and
//! unwraps the `{"data": ...}` envelope. Request timeouts come from the
//! module configuration.

pub mod api;
pub mod client;
pub mod error;

pub use api::PveApi;
pub use client::{PveClient, base_url};
pub use error::{ApiError, ApiResult};
