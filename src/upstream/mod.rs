//! Clients for the two backends behind the gateway. Each inbound request
//! makes exactly one upstream call; there is no retry.

pub mod netbox;
pub mod zabbix;

use std::time::Duration;

pub use netbox::{NetboxClient, Site, SiteList, SiteQuery};
pub use zabbix::{HostQuery, InventorySelection, ZabbixClient};

pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared outbound client. Built once and cloned into each upstream call so
/// connections are pooled.
pub fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(UPSTREAM_TIMEOUT).build()
}
