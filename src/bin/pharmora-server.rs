// ABOUTME: Server binary for the Pharmora meal estimation API
// ABOUTME: Loads environment configuration, initializes logging, and serves HTTP until shutdown
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Pharmora Server Binary
//!
//! Starts the stateless meal estimation API.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use pharmora_server::{
    config::environment::ServerConfig, logging, resources::ServerResources,
    server::PharmoraServer,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "pharmora-server")]
#[command(about = "Pharmora - meal macro estimation and conservative bolus suggestions")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    info!("Starting Pharmora server");
    info!("{}", config.summary());

    let resources = Arc::new(ServerResources::new(Arc::new(config)));
    PharmoraServer::new(resources).run().await?;

    info!("Pharmora server shut down cleanly");
    Ok(())
}
