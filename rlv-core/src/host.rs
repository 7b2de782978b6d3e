//! The host capability boundary: the two trait objects the embedding viewer
//! implements so the engine can query world state and carry out forced
//! actions (spec.md §6 "Host query callbacks" / "Host action callbacks").
//!
//! Per SPEC_FULL.md §11, every method is `async` and takes a
//! [`CancellationToken`] propagated verbatim from the caller; the engine
//! never holds its internal locks across one of these calls.

use crate::forced_actions::{AttachItem, HostAction as ForcedHostAction};
use crate::getters::HostCameraSettings;
use crate::inventory::{FolderSnapshot, ItemSnapshot};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// What `try_get_inventory_map` hands back (spec.md §6).
#[derive(Debug, Clone)]
pub struct InventorySnapshot {
    pub shared_root: FolderSnapshot,
    pub external_items: Vec<ItemSnapshot>,
}

/// The Query capability set (spec.md §6).
#[async_trait]
pub trait HostQuery: Send + Sync {
    async fn object_exists(&self, id: Uuid, cancel: &CancellationToken) -> anyhow::Result<bool>;
    async fn is_sitting(&self, cancel: &CancellationToken) -> anyhow::Result<bool>;
    async fn try_get_env(&self, name: &str, cancel: &CancellationToken) -> anyhow::Result<Option<String>>;
    async fn try_get_debug(&self, name: &str, cancel: &CancellationToken) -> anyhow::Result<Option<String>>;
    async fn try_get_sit_id(&self, cancel: &CancellationToken) -> anyhow::Result<Option<Uuid>>;
    async fn try_get_camera_settings(&self, cancel: &CancellationToken) -> anyhow::Result<Option<HostCameraSettings>>;
    async fn try_get_active_group_name(&self, cancel: &CancellationToken) -> anyhow::Result<Option<String>>;
    async fn try_get_inventory_map(&self, cancel: &CancellationToken) -> anyhow::Result<Option<InventorySnapshot>>;
}

/// The Action capability set (spec.md §6). Named `HostActions` (plural) to
/// avoid colliding with [`crate::forced_actions::HostAction`], the pure plan
/// type this trait executes.
#[async_trait]
pub trait HostActions: Send + Sync {
    async fn send_reply(&self, channel: i32, text: &str, cancel: &CancellationToken) -> anyhow::Result<()>;
    async fn send_instant_message(&self, target: Uuid, text: &str, cancel: &CancellationToken) -> anyhow::Result<()>;
    async fn set_rot(&self, rad: f64, cancel: &CancellationToken) -> anyhow::Result<()>;
    async fn adjust_height(&self, distance: f64, factor: f64, delta: f64, cancel: &CancellationToken) -> anyhow::Result<()>;
    async fn set_cam_fov(&self, rad: f64, cancel: &CancellationToken) -> anyhow::Result<()>;
    async fn tp_to(
        &self,
        x: f64,
        y: f64,
        z: f64,
        region: Option<&str>,
        lookat_rad: Option<f64>,
        cancel: &CancellationToken,
    ) -> anyhow::Result<()>;
    async fn sit(&self, target: Uuid, cancel: &CancellationToken) -> anyhow::Result<()>;
    async fn unsit(&self, cancel: &CancellationToken) -> anyhow::Result<()>;
    async fn sit_ground(&self, cancel: &CancellationToken) -> anyhow::Result<()>;
    async fn rem_outfit(&self, ids: &[Uuid], cancel: &CancellationToken) -> anyhow::Result<()>;
    async fn attach(&self, requests: &[AttachItem], replace: bool, cancel: &CancellationToken) -> anyhow::Result<()>;
    async fn detach(&self, ids: &[Uuid], cancel: &CancellationToken) -> anyhow::Result<()>;
    async fn set_group(&self, group: &str, role: Option<&str>, cancel: &CancellationToken) -> anyhow::Result<()>;
    async fn set_env(&self, name: &str, value: &str, cancel: &CancellationToken) -> anyhow::Result<()>;
    async fn set_debug(&self, name: &str, value: &str, cancel: &CancellationToken) -> anyhow::Result<()>;
}

/// Replay one [`forced_actions::HostAction`](ForcedHostAction) through a
/// [`HostActions`] implementation. Split out of the facade so the
/// forced-action executor stays synchronous and the await points live in one
/// place.
pub async fn dispatch_forced_action(
    action: &ForcedHostAction,
    host: &dyn HostActions,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    match action {
        ForcedHostAction::SetRot(rad) => host.set_rot(*rad, cancel).await,
        ForcedHostAction::AdjustHeight { distance, factor, delta } => {
            host.adjust_height(*distance, *factor, *delta, cancel).await
        }
        ForcedHostAction::SetCamFov(rad) => host.set_cam_fov(*rad, cancel).await,
        ForcedHostAction::TpTo { x, y, z, look_at_yaw } => host.tp_to(*x, *y, *z, None, *look_at_yaw, cancel).await,
        ForcedHostAction::Sit(target) => host.sit(*target, cancel).await,
        ForcedHostAction::Unsit => host.unsit(cancel).await,
        ForcedHostAction::SitGround => host.sit_ground(cancel).await,
        ForcedHostAction::SetGroup(group) => host.set_group(group, None, cancel).await,
        ForcedHostAction::SetDebug { name, value } => host.set_debug(name, value, cancel).await,
        ForcedHostAction::SetEnv { name, value } => host.set_env(name, value, cancel).await,
        ForcedHostAction::Attach { items, replace } => host.attach(items, *replace, cancel).await,
        ForcedHostAction::Detach { items } => host.detach(items, cancel).await,
    }
}
