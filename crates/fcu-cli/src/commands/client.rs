use anyhow::{Context, Result};
use clap::Args;
use fcu_application::{CLIENT_NAME, ClientContext, ClientDeps};
use fcu_core::config::ClientConfig;
use fcu_core::context::LaunchContext;
use fcu_infrastructure::{FsEngineEditor, FtrackRestClient, TcpTransport};
use std::path::PathBuf;
use std::sync::Arc;

use crate::console::{ConsoleDialogFactory, PublishPreset};

/// Publish form for the console publish dialog.
#[derive(Args, Debug, Default)]
pub struct PublishArgs {
    /// Asset name; the Publish dialog then submits without asking
    #[arg(long = "publish-name", requires = "asset_type")]
    pub asset_name: Option<String>,
    /// Asset type tag (geo, rig, anim, img)
    #[arg(long = "publish-type", requires = "asset_name")]
    pub asset_type: Option<String>,
    /// Task status to set once published
    #[arg(long, default_value = "")]
    pub status: String,
    #[arg(long, default_value = "")]
    pub comment: String,
}

impl PublishArgs {
    fn preset(&self) -> Option<PublishPreset> {
        let (Some(asset_name), Some(asset_type)) = (&self.asset_name, &self.asset_type) else {
            return None;
        };
        Some(PublishPreset {
            asset_name: asset_name.clone(),
            asset_type: asset_type.clone(),
            status: self.status.clone(),
            comment: self.comment.clone(),
        })
    }
}

/// Connects to the editor and serves it until it goes away or Ctrl-C.
pub async fn run(project: PathBuf, publish: &PublishArgs, config: ClientConfig) -> Result<()> {
    let context = LaunchContext::from_env();

    let mut tracking =
        FtrackRestClient::from_context(&context, config.tracking.server_url.as_deref())
            .context("Failed to set up the ftrack client")?;
    if let Some(location) = &config.tracking.location {
        tracking = tracking.with_location(location.clone());
    }

    let transport = TcpTransport::new(config.connection.address(), CLIENT_NAME)
        .with_call_timeout(config.connection.call_timeout());

    println!("🔌 Connecting to Unity at {}...", config.connection.address());
    let client = ClientContext::new(ClientDeps {
        transport: Arc::new(transport),
        dialog_factory: Arc::new(ConsoleDialogFactory::new(context.clone(), publish.preset())),
        tracking: Arc::new(tracking),
        editor: Arc::new(FsEngineEditor::new(project)),
        config,
        context,
    });

    client
        .start()
        .await
        .context("Could not connect to the Unity editor")?;
    println!("✅ Connected. Waiting for the editor (Ctrl-C to quit).");

    tokio::select! {
        outcome = client.run() => outcome.context("Client loop failed")?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("[Client] Interrupted");
            client.dialogs().close_all().await;
            client.keeper().close().await;
        }
    }

    println!("👋 Client stopped");
    Ok(())
}
