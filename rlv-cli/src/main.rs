use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use rlv_core::config::EngineConfig;
use rlv_core::forced_actions::AttachItem;
use rlv_core::getters::HostCameraSettings;
use rlv_core::inventory::{FolderSnapshot, ItemSnapshot};
use rlv_core::{HostActions, HostQuery, InventorySnapshot, RlvEngine};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "rlv-cli", about = "Send RLV command lines to an in-memory engine instance")]
struct Cli {
    /// Path to an rlv.toml config file's directory; defaults to the current
    /// directory's EngineConfig::default() if no rlv.toml is present there.
    #[arg(long, default_value = ".")]
    config_dir: String,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Feed one comma-separated RLV message to the engine and print every
    /// reply it emits on its own channel.
    Send {
        message: String,
        #[arg(long, default_value_t = Uuid::new_v4())]
        sender: Uuid,
        #[arg(long, default_value = "demo object")]
        sender_name: String,
    },
}

/// An in-memory stand-in for the viewer, printing every action to stdout and
/// serving a small fixed inventory tree so `@getinv`/`@attach*` have
/// something to resolve against.
struct DemoHost {
    replies: Mutex<Vec<(i32, String)>>,
    inventory: InventorySnapshot,
}

impl DemoHost {
    fn new() -> Self {
        let hat = ItemSnapshot { id: Uuid::new_v4(), name: "Party Hat".to_string(), ..Default::default() };
        let shirt = ItemSnapshot { id: Uuid::new_v4(), name: "Plain Shirt".to_string(), ..Default::default() };
        let root = FolderSnapshot {
            id: Uuid::new_v4(),
            name: "#RLV".to_string(),
            folders: vec![
                FolderSnapshot { id: Uuid::new_v4(), name: "Hats".to_string(), folders: vec![], items: vec![hat] },
                FolderSnapshot { id: Uuid::new_v4(), name: "Shirts".to_string(), folders: vec![], items: vec![shirt] },
            ],
            items: vec![],
        };
        Self {
            replies: Mutex::new(Vec::new()),
            inventory: InventorySnapshot { shared_root: root, external_items: Vec::new() },
        }
    }
}

#[async_trait]
impl HostQuery for DemoHost {
    async fn object_exists(&self, _id: Uuid, _cancel: &CancellationToken) -> Result<bool> {
        Ok(true)
    }

    async fn is_sitting(&self, _cancel: &CancellationToken) -> Result<bool> {
        Ok(false)
    }

    async fn try_get_env(&self, _name: &str, _cancel: &CancellationToken) -> Result<Option<String>> {
        Ok(None)
    }

    async fn try_get_debug(&self, _name: &str, _cancel: &CancellationToken) -> Result<Option<String>> {
        Ok(None)
    }

    async fn try_get_sit_id(&self, _cancel: &CancellationToken) -> Result<Option<Uuid>> {
        Ok(None)
    }

    async fn try_get_camera_settings(&self, _cancel: &CancellationToken) -> Result<Option<HostCameraSettings>> {
        Ok(Some(HostCameraSettings {
            zoom_min: 0.5,
            fov: 1.0,
            fov_min: 0.2,
            fov_max: 3.0,
            avdist_min: 0.0,
            avdist_max: 10.0,
        }))
    }

    async fn try_get_active_group_name(&self, _cancel: &CancellationToken) -> Result<Option<String>> {
        Ok(Some("Demo Group".to_string()))
    }

    async fn try_get_inventory_map(&self, _cancel: &CancellationToken) -> Result<Option<InventorySnapshot>> {
        Ok(Some(self.inventory.clone()))
    }
}

#[async_trait]
impl HostActions for DemoHost {
    async fn send_reply(&self, channel: i32, text: &str, _cancel: &CancellationToken) -> Result<()> {
        self.replies.lock().unwrap().push((channel, text.to_string()));
        println!("[reply ch={channel}] {text}");
        Ok(())
    }

    async fn send_instant_message(&self, target: Uuid, text: &str, _cancel: &CancellationToken) -> Result<()> {
        println!("[im -> {target}] {text}");
        Ok(())
    }

    async fn set_rot(&self, rad: f64, _cancel: &CancellationToken) -> Result<()> {
        println!("[action] set_rot {rad}");
        Ok(())
    }

    async fn adjust_height(&self, distance: f64, factor: f64, delta: f64, _cancel: &CancellationToken) -> Result<()> {
        println!("[action] adjust_height distance={distance} factor={factor} delta={delta}");
        Ok(())
    }

    async fn set_cam_fov(&self, rad: f64, _cancel: &CancellationToken) -> Result<()> {
        println!("[action] set_cam_fov {rad}");
        Ok(())
    }

    async fn tp_to(
        &self,
        x: f64,
        y: f64,
        z: f64,
        region: Option<&str>,
        lookat_rad: Option<f64>,
        _cancel: &CancellationToken,
    ) -> Result<()> {
        println!("[action] tp_to ({x}, {y}, {z}) region={region:?} lookat={lookat_rad:?}");
        Ok(())
    }

    async fn sit(&self, target: Uuid, _cancel: &CancellationToken) -> Result<()> {
        println!("[action] sit {target}");
        Ok(())
    }

    async fn unsit(&self, _cancel: &CancellationToken) -> Result<()> {
        println!("[action] unsit");
        Ok(())
    }

    async fn sit_ground(&self, _cancel: &CancellationToken) -> Result<()> {
        println!("[action] sit_ground");
        Ok(())
    }

    async fn rem_outfit(&self, ids: &[Uuid], _cancel: &CancellationToken) -> Result<()> {
        println!("[action] rem_outfit {ids:?}");
        Ok(())
    }

    async fn attach(&self, requests: &[AttachItem], replace: bool, _cancel: &CancellationToken) -> Result<()> {
        println!("[action] attach {requests:?} replace={replace}");
        Ok(())
    }

    async fn detach(&self, ids: &[Uuid], _cancel: &CancellationToken) -> Result<()> {
        println!("[action] detach {ids:?}");
        Ok(())
    }

    async fn set_group(&self, group: &str, role: Option<&str>, _cancel: &CancellationToken) -> Result<()> {
        println!("[action] set_group {group} role={role:?}");
        Ok(())
    }

    async fn set_env(&self, name: &str, value: &str, _cancel: &CancellationToken) -> Result<()> {
        println!("[action] set_env {name}={value}");
        Ok(())
    }

    async fn set_debug(&self, name: &str, value: &str, _cancel: &CancellationToken) -> Result<()> {
        println!("[action] set_debug {name}={value}");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let config = EngineConfig::load(std::path::Path::new(&cli.config_dir))?;
    let engine = RlvEngine::new(config, DemoHost::new());
    let cancel = CancellationToken::new();

    match cli.cmd {
        Cmd::Send { message, sender, sender_name } => {
            tracing::info!(%sender, sender_name, message, "sending RLV message");
            let ok = engine.process_message(&message, sender, &sender_name, &cancel).await?;
            println!("overall: {ok}");
        }
    }

    Ok(())
}
