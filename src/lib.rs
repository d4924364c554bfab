pub mod config;
pub mod delay;
pub mod server;

use std::sync::Arc;

use self::{config::Config, server::Server};

/// In order to let the integration tests directly use the stun-server
/// crate and start the server, a function is opened to replace the main
/// function to directly start the server.
pub async fn start_server(config: Arc<Config>) -> anyhow::Result<()> {
    let server = Server::bind(&config).await?;

    tokio::select! {
        res = server.run() => res,
        _ = tokio::signal::ctrl_c() => {
            log::info!("received stop signal, stopping server...");

            Ok(())
        }
    }
}
