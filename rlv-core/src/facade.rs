//! The service facade: the single entry point the host talks to (spec.md
//! §4.8). Wires the grammar, restriction store, locked-folder map,
//! permission evaluator, get-request handler, forced-action executor, and
//! notification fan-out together behind the concurrency model of spec.md §5
//! / SPEC_FULL.md §11: one `tokio::sync::Mutex` per store, released before
//! every host callback.

use crate::behaviors::Behavior;
use crate::blacklist::Blacklist;
use crate::config::EngineConfig;
use crate::constants::{AttachmentPoint, WearableType};
use crate::error::{EngineError, EngineResult};
use crate::forced_actions::{self, ForceContext};
use crate::getters;
use crate::grammar::{self, tokenizer, Args, Dispatch};
use crate::host::{dispatch_forced_action, HostActions, HostQuery};
use crate::inventory::InventoryMap;
use crate::locked_folders::LockedFolderMap;
use crate::notify::{self, Report};
use crate::permissions;
use crate::restriction::{Restriction, RestrictionEvent, RestrictionStore};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Running counters for operational telemetry (SPEC_FULL.md §13). Not part
/// of the wire protocol; a host may poll [`RlvEngine::stats`] for
/// diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineStats {
    pub segments_processed: u64,
    pub restrictions_added: u64,
    pub restrictions_removed: u64,
    pub forced_actions_dispatched: u64,
}

/// The eight folder-lock behaviors, duplicated here as a `match` rather than
/// imported from `locked_folders` because that module keeps `LockKind`
/// private — the facade only needs to know *whether* a rebuild is owed, not
/// which kind.
fn is_lock_behavior(b: Behavior) -> bool {
    matches!(
        b,
        Behavior::AttachThis
            | Behavior::AttachAllThis
            | Behavior::DetachThis
            | Behavior::DetachAllThis
            | Behavior::AttachThisExcept
            | Behavior::AttachAllThisExcept
            | Behavior::DetachThisExcept
            | Behavior::DetachAllThisExcept
    )
}

/// A secure-kind restriction posted with an argument doesn't fit the
/// bare-toggle shape the secure-deny phase expects, so it degrades to an
/// exception of its normal counterpart instead (spec.md §3: `sendchannel_sec:N`
/// stores as a `sendchannel` exception, `shownames_sec:UUID` as a `shownames`
/// exception) — applied generally to any secure kind, not just those two.
fn degrade_secure_exception(behavior: Behavior, args: Args) -> (Behavior, Args) {
    if args.is_argumented() {
        if let Some(normal) = behavior.meta().secure_of {
            return (normal, args);
        }
    }
    (behavior, args)
}

pub struct RlvEngine<H>
where
    H: HostQuery + HostActions,
{
    store: Mutex<RestrictionStore>,
    locks: Mutex<LockedFolderMap>,
    blacklist: Mutex<Blacklist>,
    stats: Mutex<EngineStats>,
    config: EngineConfig,
    host: H,
}

impl<H> RlvEngine<H>
where
    H: HostQuery + HostActions,
{
    pub fn new(config: EngineConfig, host: H) -> Self {
        let blacklist = Blacklist::from_names(&config.blacklist.names);
        Self {
            store: Mutex::new(RestrictionStore::new()),
            locks: Mutex::new(LockedFolderMap::new()),
            blacklist: Mutex::new(blacklist),
            stats: Mutex::new(EngineStats::default()),
            config,
            host,
        }
    }

    pub async fn stats(&self) -> EngineStats {
        *self.stats.lock().await
    }

    /// `ProcessMessage` (spec.md §4.8, §4.1): splits on `,`, resolves and
    /// dispatches each segment left to right, ANDs the per-segment results.
    pub async fn process_message(
        &self,
        msg: &str,
        sender_id: Uuid,
        sender_name: &str,
        cancel: &CancellationToken,
    ) -> EngineResult<bool> {
        let mut overall = true;
        for raw in tokenizer::split_message(msg) {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            overall &= self.process_segment(raw, sender_id, sender_name, cancel).await?;
        }
        Ok(overall)
    }

    /// `ProcessInstantMessage` (spec.md §4.8): a distinct entry point from
    /// `ProcessMessage`, since IM delivery has no chat-channel context of its
    /// own, but the segment grammar and every handler are identical.
    pub async fn process_instant_message(
        &self,
        msg: &str,
        sender_id: Uuid,
        sender_name: &str,
        cancel: &CancellationToken,
    ) -> EngineResult<bool> {
        self.process_message(msg, sender_id, sender_name, cancel).await
    }

    async fn process_segment(
        &self,
        raw: &str,
        sender_id: Uuid,
        sender_name: &str,
        cancel: &CancellationToken,
    ) -> EngineResult<bool> {
        self.stats.lock().await.segments_processed += 1;

        let Some(segment) = tokenizer::parse_segment(raw) else {
            debug!(raw, "segment failed to tokenize");
            return Ok(false);
        };
        let Some(dispatch) = grammar::resolve_segment(raw) else {
            debug!(raw, "segment failed to resolve to a dispatch");
            return Ok(false);
        };

        match dispatch {
            Dispatch::Clear { filter } => Ok(self.handle_clear(sender_id, &filter, cancel).await?),
            Dispatch::Add { behavior, args, .. } => {
                self.handle_restriction_change(behavior, &segment.behavior_name, args, sender_id, sender_name, true, cancel)
                    .await
            }
            Dispatch::Remove { behavior, args, .. } => {
                self.handle_restriction_change(behavior, &segment.behavior_name, args, sender_id, sender_name, false, cancel)
                    .await
            }
            Dispatch::Force { behavior, suffix, raw_option } => {
                self.handle_force(behavior, suffix.as_deref(), &raw_option, sender_id, cancel).await
            }
            Dispatch::Get { behavior, suffix, channel, raw_option } => {
                self.handle_get(behavior, suffix.as_deref(), channel, &raw_option, sender_id, cancel).await
            }
        }
    }

    async fn handle_clear(&self, issuer: Uuid, filter: &str, cancel: &CancellationToken) -> EngineResult<bool> {
        let events = {
            let mut store = self.store.lock().await;
            store.clear(issuer, filter)
        };
        self.emit_restriction_events(events, cancel).await?;
        Ok(true)
    }

    async fn handle_restriction_change(
        &self,
        behavior: Behavior,
        original_name: &str,
        args: Args,
        issuer: Uuid,
        issuer_name: &str,
        adding: bool,
        cancel: &CancellationToken,
    ) -> EngineResult<bool> {
        if self.blacklist.lock().await.contains(behavior.canonical_name()) {
            warn!(behavior = behavior.canonical_name(), "blacklisted restriction dropped");
            return Ok(false);
        }

        let (behavior, args) = degrade_secure_exception(behavior, args);
        let restriction = Restriction {
            behavior,
            original_behavior: original_name.to_string(),
            issuer,
            issuer_name: issuer_name.to_string(),
            args,
        };

        let event = {
            let mut store = self.store.lock().await;
            if adding { store.add(restriction) } else { store.remove(&restriction) }
        };

        let Some(event) = event else {
            // Idempotent no-op: the command is still well-formed and honored.
            return Ok(true);
        };

        {
            let mut stats = self.stats.lock().await;
            if adding {
                stats.restrictions_added += 1;
            } else {
                stats.restrictions_removed += 1;
            }
        }
        info!(behavior = behavior.canonical_name(), issuer = %issuer, adding, "restriction changed");

        self.emit_restriction_events(vec![event], cancel).await?;
        Ok(true)
    }

    /// Post-mutation bookkeeping shared by add/remove/clear (spec.md §5):
    /// rebuild or extend the locked-folder map synchronously, then fan out
    /// notifications — both after the lock that did the mutation is
    /// released.
    async fn emit_restriction_events(&self, events: Vec<RestrictionEvent>, cancel: &CancellationToken) -> EngineResult<()> {
        if events.is_empty() {
            return Ok(());
        }
        self.rebuild_locks_if_needed(&events, cancel).await?;

        let notifications = {
            let store = self.store.lock().await;
            notify::notifications_for_events(&store, &events)
        };
        for (channel, text) in notifications {
            self.host.send_reply(channel, &text, cancel).await?;
        }
        Ok(())
    }

    async fn rebuild_locks_if_needed(&self, events: &[RestrictionEvent], cancel: &CancellationToken) -> EngineResult<()> {
        if !events.iter().any(|e| is_lock_behavior(e.restriction.behavior)) {
            return Ok(());
        }
        let Some(inv) = self.inventory_map(cancel).await? else {
            warn!("inventory snapshot unavailable; locked-folder map left stale");
            return Ok(());
        };

        let any_removed = events.iter().any(|e| e.is_deleted);
        if any_removed {
            let store = self.store.lock().await;
            let mut locks = self.locks.lock().await;
            *locks = LockedFolderMap::rebuild(&store, &inv);
        } else {
            let mut locks = self.locks.lock().await;
            for event in events {
                if is_lock_behavior(event.restriction.behavior) {
                    locks.extend_with(&event.restriction, &inv);
                }
            }
        }
        Ok(())
    }

    async fn inventory_map(&self, cancel: &CancellationToken) -> EngineResult<Option<InventoryMap>> {
        match self.host.try_get_inventory_map(cancel).await? {
            Some(snapshot) => Ok(Some(InventoryMap::build(&snapshot.shared_root, &snapshot.external_items))),
            None => Ok(None),
        }
    }

    async fn handle_force(
        &self,
        behavior: Behavior,
        suffix: Option<&str>,
        raw_option: &str,
        issuer: Uuid,
        cancel: &CancellationToken,
    ) -> EngineResult<bool> {
        if self.blacklist.lock().await.contains(behavior.canonical_name()) {
            warn!(behavior = behavior.canonical_name(), "blacklisted force command dropped");
            return Ok(false);
        }

        // Missing inventory snapshot short-circuits to false without mutating
        // state (spec.md §7) — every force family needs the tree to resolve
        // its target, even the scalar ones, since `ForceContext` always
        // carries it.
        let Some(inv) = self.inventory_map(cancel).await? else {
            return Ok(false);
        };

        let currently_sitting = self.host.try_get_sit_id(cancel).await?;
        let (permissive, camera_locked) = {
            let store = self.store.lock().await;
            (
                permissions::permissive_mode(&store, self.config.permissive.default_enabled),
                permissions::camera_snapshot(&store).locked,
            )
        };

        let actions = {
            let store = self.store.lock().await;
            let locks = self.locks.lock().await;
            let ctx = ForceContext {
                store: &store,
                locks: &locks,
                inv: &inv,
                issuer,
                permissive,
                currently_sitting,
                camera_locked,
            };
            forced_actions::execute(behavior, suffix, raw_option, &ctx)
        };

        if actions.is_empty() {
            return Ok(false);
        }
        if actions.len() >= self.config.limits.forced_action_warn_threshold {
            warn!(count = actions.len(), "unusually large forced-action batch");
        }

        for action in &actions {
            dispatch_forced_action(action, &self.host, cancel).await?;
        }
        self.stats.lock().await.forced_actions_dispatched += actions.len() as u64;
        Ok(true)
    }

    async fn handle_get(
        &self,
        behavior: Behavior,
        suffix: Option<&str>,
        channel: i32,
        raw_option: &str,
        sender_id: Uuid,
        cancel: &CancellationToken,
    ) -> EngineResult<bool> {
        if self.blacklist.lock().await.contains(behavior.canonical_name()) {
            warn!(behavior = behavior.canonical_name(), "blacklisted query answered empty");
            self.host.send_reply(channel, "", cancel).await?;
            return Ok(false);
        }

        let Some(reply) = self.compute_get_reply(behavior, suffix, raw_option, sender_id, cancel).await? else {
            return Ok(false);
        };
        self.host.send_reply(channel, &reply, cancel).await?;
        Ok(true)
    }

    async fn compute_get_reply(
        &self,
        behavior: Behavior,
        suffix: Option<&str>,
        raw_option: &str,
        sender_id: Uuid,
        cancel: &CancellationToken,
    ) -> EngineResult<Option<String>> {
        use Behavior::*;
        let reply = match behavior {
            Version | VersionNew => getters::version_reply(),
            VersionNum => getters::version_num_reply(),
            VersionNumBl => getters::version_num_bl_reply(&*self.blacklist.lock().await),
            GetBlacklist => getters::get_blacklist_reply(&*self.blacklist.lock().await, raw_option),
            GetStatus => getters::get_status_reply(&*self.store.lock().await, raw_option, Some(sender_id)),
            GetStatusAll => getters::get_status_reply(&*self.store.lock().await, raw_option, None),
            GetSitId => getters::get_sit_id_reply(self.host.try_get_sit_id(cancel).await?),
            GetCamZoomMin | GetCamFov | GetCamFovMin | GetCamFovMax | GetCamAvDistMin | GetCamAvDistMax => {
                let Some(cam) = self.host.try_get_camera_settings(cancel).await? else { return Ok(None) };
                match behavior {
                    GetCamZoomMin => getters::get_cam_zoom_min_reply(&cam),
                    GetCamFov => getters::get_cam_fov_reply(&cam),
                    GetCamFovMin => getters::get_cam_fov_min_reply(&cam),
                    GetCamFovMax => getters::get_cam_fov_max_reply(&cam),
                    GetCamAvDistMin => getters::get_cam_avdist_min_reply(&cam),
                    GetCamAvDistMax => getters::get_cam_avdist_max_reply(&cam),
                    _ => unreachable!(),
                }
            }
            GetGroup => getters::get_group_reply(&self.host.try_get_active_group_name(cancel).await?.unwrap_or_default()),
            GetOutfit => {
                let Some(inv) = self.inventory_map(cancel).await? else { return Ok(None) };
                let layer = (!raw_option.is_empty()).then(|| WearableType::from_name(raw_option)).flatten();
                getters::get_outfit_reply(&inv, layer)
            }
            GetAttach => {
                let Some(inv) = self.inventory_map(cancel).await? else { return Ok(None) };
                let point = (!raw_option.is_empty()).then(|| AttachmentPoint::from_name(raw_option)).flatten();
                getters::get_attach_reply(&inv, point)
            }
            GetInv => {
                let Some(inv) = self.inventory_map(cancel).await? else { return Ok(None) };
                getters::get_inv_reply(&inv, raw_option)
            }
            GetInvWorn => {
                let Some(inv) = self.inventory_map(cancel).await? else { return Ok(None) };
                getters::get_inv_worn_reply(&inv, raw_option)
            }
            FindFolder => {
                let Some(inv) = self.inventory_map(cancel).await? else { return Ok(None) };
                getters::find_folder_reply(&inv, raw_option)
            }
            FindFolders => {
                let Some(inv) = self.inventory_map(cancel).await? else { return Ok(None) };
                getters::find_folders_reply(&inv, raw_option)
            }
            GetPath => {
                let Some(inv) = self.inventory_map(cancel).await? else { return Ok(None) };
                getters::get_path_reply(&inv, raw_option, sender_id)
            }
            GetPathNew => {
                let Some(inv) = self.inventory_map(cancel).await? else { return Ok(None) };
                getters::get_path_new_reply(&inv, raw_option, sender_id)
            }
            GetEnvDynamic => {
                let Some(name) = suffix else { return Ok(None) };
                getters::passthrough_reply(&self.host.try_get_env(name, cancel).await?.unwrap_or_default())
            }
            GetDebugDynamic => {
                let Some(name) = suffix else { return Ok(None) };
                getters::passthrough_reply(&self.host.try_get_debug(name, cancel).await?.unwrap_or_default())
            }
            _ => return Ok(None),
        };
        Ok(Some(reply))
    }

    // -------------------------------------------------------------------
    // Host-called reporters (spec.md §4.8 "ReportSit, ReportItemAttached,
    // etc.") — pure fan-out, no store mutation.
    // -------------------------------------------------------------------

    pub async fn report_worn(&self, wearable: WearableType, legal: bool, cancel: &CancellationToken) -> EngineResult<()> {
        self.dispatch_report(Report::Worn(wearable), legal, cancel).await
    }

    pub async fn report_unworn(&self, wearable: WearableType, legal: bool, cancel: &CancellationToken) -> EngineResult<()> {
        self.dispatch_report(Report::Unworn(wearable), legal, cancel).await
    }

    pub async fn report_attached(&self, point: AttachmentPoint, legal: bool, cancel: &CancellationToken) -> EngineResult<()> {
        self.dispatch_report(Report::Attached(point), legal, cancel).await
    }

    pub async fn report_detached(&self, point: AttachmentPoint, legal: bool, cancel: &CancellationToken) -> EngineResult<()> {
        self.dispatch_report(Report::Detached(point), legal, cancel).await
    }

    pub async fn report_sat(&self, object: Uuid, legal: bool, cancel: &CancellationToken) -> EngineResult<()> {
        self.dispatch_report(Report::Sat(object), legal, cancel).await
    }

    pub async fn report_stood(&self, legal: bool, cancel: &CancellationToken) -> EngineResult<()> {
        self.dispatch_report(Report::Stood, legal, cancel).await
    }

    async fn dispatch_report(&self, report: Report, legal: bool, cancel: &CancellationToken) -> EngineResult<()> {
        let notifications = {
            let store = self.store.lock().await;
            notify::notifications_for_report(&store, &report, legal)
        };
        for (channel, text) in notifications {
            self.host.send_reply(channel, &text, cancel).await?;
        }
        Ok(())
    }

    /// The host reports that issuer `who` (a scripted object) no longer
    /// exists — every restriction it posted is withdrawn (spec.md §3
    /// "Lifecycle", §4.2 "Remove-by-issuer").
    pub async fn report_object_removed(&self, who: Uuid, cancel: &CancellationToken) -> EngineResult<()> {
        let events = {
            let mut store = self.store.lock().await;
            store.remove_by_issuer(who)
        };
        self.stats.lock().await.restrictions_removed += events.len() as u64;
        self.emit_restriction_events(events, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::InventorySnapshot;
    use crate::inventory::{FolderSnapshot, ItemSnapshot};
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct MockHost {
        replies: StdMutex<Vec<(i32, String)>>,
        inventory: Option<InventorySnapshot>,
        sit_id: Option<Uuid>,
    }

    impl MockHost {
        fn with_inventory(root: FolderSnapshot) -> Self {
            Self { inventory: Some(InventorySnapshot { shared_root: root, external_items: vec![] }), ..Default::default() }
        }
    }

    #[async_trait]
    impl HostQuery for MockHost {
        async fn object_exists(&self, _id: Uuid, _cancel: &CancellationToken) -> anyhow::Result<bool> {
            Ok(true)
        }
        async fn is_sitting(&self, _cancel: &CancellationToken) -> anyhow::Result<bool> {
            Ok(self.sit_id.is_some())
        }
        async fn try_get_env(&self, _name: &str, _cancel: &CancellationToken) -> anyhow::Result<Option<String>> {
            Ok(None)
        }
        async fn try_get_debug(&self, _name: &str, _cancel: &CancellationToken) -> anyhow::Result<Option<String>> {
            Ok(None)
        }
        async fn try_get_sit_id(&self, _cancel: &CancellationToken) -> anyhow::Result<Option<Uuid>> {
            Ok(self.sit_id)
        }
        async fn try_get_camera_settings(&self, _cancel: &CancellationToken) -> anyhow::Result<Option<getters::HostCameraSettings>> {
            Ok(None)
        }
        async fn try_get_active_group_name(&self, _cancel: &CancellationToken) -> anyhow::Result<Option<String>> {
            Ok(None)
        }
        async fn try_get_inventory_map(&self, _cancel: &CancellationToken) -> anyhow::Result<Option<InventorySnapshot>> {
            Ok(self.inventory.clone())
        }
    }

    #[async_trait]
    impl HostActions for MockHost {
        async fn send_reply(&self, channel: i32, text: &str, _cancel: &CancellationToken) -> anyhow::Result<()> {
            self.replies.lock().unwrap().push((channel, text.to_string()));
            Ok(())
        }
        async fn send_instant_message(&self, _target: Uuid, _text: &str, _cancel: &CancellationToken) -> anyhow::Result<()> {
            Ok(())
        }
        async fn set_rot(&self, _rad: f64, _cancel: &CancellationToken) -> anyhow::Result<()> {
            Ok(())
        }
        async fn adjust_height(&self, _d: f64, _f: f64, _delta: f64, _cancel: &CancellationToken) -> anyhow::Result<()> {
            Ok(())
        }
        async fn set_cam_fov(&self, _rad: f64, _cancel: &CancellationToken) -> anyhow::Result<()> {
            Ok(())
        }
        async fn tp_to(
            &self,
            _x: f64,
            _y: f64,
            _z: f64,
            _region: Option<&str>,
            _lookat: Option<f64>,
            _cancel: &CancellationToken,
        ) -> anyhow::Result<()> {
            Ok(())
        }
        async fn sit(&self, _target: Uuid, _cancel: &CancellationToken) -> anyhow::Result<()> {
            Ok(())
        }
        async fn unsit(&self, _cancel: &CancellationToken) -> anyhow::Result<()> {
            Ok(())
        }
        async fn sit_ground(&self, _cancel: &CancellationToken) -> anyhow::Result<()> {
            Ok(())
        }
        async fn rem_outfit(&self, _ids: &[Uuid], _cancel: &CancellationToken) -> anyhow::Result<()> {
            Ok(())
        }
        async fn attach(
            &self,
            _requests: &[crate::forced_actions::AttachItem],
            _replace: bool,
            _cancel: &CancellationToken,
        ) -> anyhow::Result<()> {
            Ok(())
        }
        async fn detach(&self, _ids: &[Uuid], _cancel: &CancellationToken) -> anyhow::Result<()> {
            Ok(())
        }
        async fn set_group(&self, _group: &str, _role: Option<&str>, _cancel: &CancellationToken) -> anyhow::Result<()> {
            Ok(())
        }
        async fn set_env(&self, _name: &str, _value: &str, _cancel: &CancellationToken) -> anyhow::Result<()> {
            Ok(())
        }
        async fn set_debug(&self, _name: &str, _value: &str, _cancel: &CancellationToken) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn folder(name: &str, children: Vec<FolderSnapshot>, items: Vec<ItemSnapshot>) -> FolderSnapshot {
        FolderSnapshot { id: Uuid::new_v4(), name: name.to_string(), folders: children, items }
    }

    #[tokio::test]
    async fn add_then_remove_restriction_is_idempotent_and_notifies() {
        let engine = RlvEngine::new(EngineConfig::default(), MockHost::default());
        let issuer = Uuid::new_v4();
        let cancel = CancellationToken::new();

        assert!(engine.process_message("@fly=n", issuer, "x", &cancel).await.unwrap());
        assert!(engine.process_message("@fly=n", issuer, "x", &cancel).await.unwrap());
        assert!(engine.store.lock().await.by_behavior(Behavior::Fly).len() == 1);

        assert!(engine.process_message("@fly=y", issuer, "x", &cancel).await.unwrap());
        assert!(engine.store.lock().await.is_empty());
        assert_eq!(engine.stats().await.restrictions_added, 1);
        assert_eq!(engine.stats().await.restrictions_removed, 1);
    }

    #[tokio::test]
    async fn blacklisted_behavior_is_silently_dropped() {
        let mut config = EngineConfig::default();
        config.blacklist.names.push("fly".to_string());
        let engine = RlvEngine::new(config, MockHost::default());
        let cancel = CancellationToken::new();
        let ok = engine.process_message("@fly=n", Uuid::new_v4(), "x", &cancel).await.unwrap();
        assert!(!ok);
        assert!(engine.store.lock().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_segment_is_local_failure_rest_of_batch_still_runs() {
        let engine = RlvEngine::new(EngineConfig::default(), MockHost::default());
        let issuer = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let ok = engine.process_message("@notabehavior=n,@jump=n", issuer, "x", &cancel).await.unwrap();
        assert!(!ok);
        assert_eq!(engine.store.lock().await.by_behavior(Behavior::Jump).len(), 1);
    }

    #[tokio::test]
    async fn version_query_sends_reply_on_requested_channel() {
        let engine = RlvEngine::new(EngineConfig::default(), MockHost::default());
        let cancel = CancellationToken::new();
        assert!(engine.process_message("@version=1234", Uuid::new_v4(), "x", &cancel).await.unwrap());
        let replies = engine.host.replies.lock().unwrap();
        assert_eq!(replies.as_slice(), [(1234, getters::version_reply())]);
    }

    #[tokio::test]
    async fn force_sit_dispatches_host_sit_when_not_restricted() {
        let host = MockHost::with_inventory(folder("#RLV", vec![], vec![]));
        let engine = RlvEngine::new(EngineConfig::default(), host);
        let issuer = Uuid::new_v4();
        let target = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let ok = engine.process_message(&format!("@sit:{target}=force"), issuer, "x", &cancel).await.unwrap();
        assert!(ok);
        assert_eq!(engine.stats().await.forced_actions_dispatched, 1);
    }

    #[tokio::test]
    async fn attachallthis_locks_folder_and_blocks_force_attach_of_locked_item() {
        let hat_id = Uuid::new_v4();
        let root = folder(
            "#RLV",
            vec![folder("Hats", vec![], vec![ItemSnapshot { id: hat_id, name: "Party Hat".into(), ..Default::default() }])],
            vec![],
        );
        let host = MockHost::with_inventory(root);
        let engine = RlvEngine::new(EngineConfig::default(), host);
        let issuer = Uuid::new_v4();
        let cancel = CancellationToken::new();

        assert!(engine.process_message("@attachallthis:Hats=n", issuer, "Party Hat", &cancel).await.unwrap());
        assert_eq!(engine.store.lock().await.by_behavior(Behavior::AttachAllThis).len(), 1);
        let locks = engine.locks.lock().await;
        assert!(!locks.locked_folders().collect::<Vec<_>>().is_empty());
    }

    #[tokio::test]
    async fn clear_removes_only_matching_issuer() {
        let engine = RlvEngine::new(EngineConfig::default(), MockHost::default());
        let i1 = Uuid::new_v4();
        let i2 = Uuid::new_v4();
        let cancel = CancellationToken::new();
        engine.process_message("@fly=n", i1, "a", &cancel).await.unwrap();
        engine.process_message("@fly=n", i2, "b", &cancel).await.unwrap();
        engine.process_message("@clear", i1, "a", &cancel).await.unwrap();
        let store = engine.store.lock().await;
        assert_eq!(store.by_behavior(Behavior::Fly).len(), 1);
        assert_eq!(store.by_behavior(Behavior::Fly)[0].issuer, i2);
    }

    #[tokio::test]
    async fn report_sat_notifies_matching_notify_channel() {
        let engine = RlvEngine::new(EngineConfig::default(), MockHost::default());
        let issuer = Uuid::new_v4();
        let cancel = CancellationToken::new();
        engine.process_message("@notify:5;sat=add", issuer, "x", &cancel).await.unwrap();
        let object = Uuid::new_v4();
        engine.report_sat(object, true, &cancel).await.unwrap();
        let replies = engine.host.replies.lock().unwrap();
        assert!(replies.iter().any(|(c, t)| *c == 5 && t.contains("sat object legally")));
    }

    #[tokio::test]
    async fn secure_sendchannel_with_argument_degrades_to_exception() {
        let engine = RlvEngine::new(EngineConfig::default(), MockHost::default());
        let issuer = Uuid::new_v4();
        let cancel = CancellationToken::new();
        engine.process_message("@sendchannel_sec:7=n", issuer, "x", &cancel).await.unwrap();
        let store = engine.store.lock().await;
        assert!(store.by_behavior(Behavior::SendChannelSec).is_empty());
        assert_eq!(store.by_behavior(Behavior::SendChannel).len(), 1);
    }
}
