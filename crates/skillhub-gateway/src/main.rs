mod config;
mod service;

use anyhow::Result;
use crate::config::Config;
use crate::service::GatewayService;

fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Discover skills and print the catalog
    let gateway = GatewayService::new(config);
    gateway.run()
}
