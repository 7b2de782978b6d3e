//! The behavior-kind taxonomy (spec.md §3 "Behavior kind", §4.3).
//!
//! Per DESIGN NOTES (spec.md §9): "Avoid duplicated kinds by modeling each
//! family as a descriptor `{normal, secure?, from_to?}` and routing all three
//! through one evaluator." We go one step further and make the whole
//! taxonomy table-driven: one static table maps each [`Behavior`] to its wire
//! name, option grammar, and pairing metadata, instead of scattering that
//! information across several `match` blocks.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The option grammar groups of spec.md §4.1, plus `None` for bare toggles
/// and `Composite` for forced actions whose argument shape is bespoke enough
/// that the executor parses it directly rather than through this table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionGrammar {
    None,
    FloatRequired,
    /// `camdrawmin`/`camdrawmax`: required float, rejected below 0.40.
    FloatRequiredMin040,
    FloatOptional,
    IntRequired,
    IntOptional,
    Uuid,
    UuidOrString,
    UuidOptional,
    WearableType,
    AttachmentPoint,
    FolderPathOrLayer,
    Notify,
    ColorTriple,
    Path,
    Composite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(clippy::enum_variant_names)]
pub enum Behavior {
    // movement
    Fly,
    Jump,
    TempRun,
    AlwaysRun,
    Unsit,
    Sit,
    StandTp,
    // teleport
    TpLm,
    TpLoc,
    SitTp,
    TpLocal,
    TpLure,
    TpLureSec,
    TpRequest,
    TpRequestSec,
    AcceptTp,
    AcceptTpRequest,
    // chat
    SendChat,
    ChatShout,
    ChatNormal,
    ChatWhisper,
    Emote,
    SendGesture,
    RedirChat,
    RedirEmote,
    RecvChat,
    RecvChatSec,
    RecvChatFrom,
    RecvEmote,
    RecvEmoteSec,
    RecvEmoteFrom,
    SendChannel,
    SendChannelSec,
    SendChannelExcept,
    // IM
    SendIm,
    SendImSec,
    SendImTo,
    RecvIm,
    RecvImSec,
    RecvImFrom,
    StartIm,
    StartImTo,
    // inventory / outfit
    Detach,
    AddAttach,
    RemAttach,
    AddOutfit,
    RemOutfit,
    DefaultWear,
    UnsharedWear,
    UnsharedUnwear,
    SharedWear,
    SharedUnwear,
    // folder locks
    DetachThis,
    DetachAllThis,
    AttachThis,
    AttachAllThis,
    DetachThisExcept,
    DetachAllThisExcept,
    AttachThisExcept,
    AttachAllThisExcept,
    // touch
    TouchAll,
    TouchWorld,
    TouchThis,
    TouchMe,
    TouchAttach,
    TouchAttachSelf,
    TouchAttachOther,
    TouchHud,
    Interact,
    TouchFar,
    // visibility
    ShowInv,
    ShowNames,
    ShowNamesSec,
    ShowNameTags,
    ShowNearby,
    ShowLoc,
    ShowWorldMap,
    ShowMiniMap,
    ShowHoverText,
    ShowHoverTextAll,
    ShowHoverTextHud,
    ShowHoverTextWorld,
    // edit / rez
    Edit,
    EditObj,
    EditWorld,
    EditAttach,
    Rez,
    // env / debug / group
    SetEnv,
    SetDebug,
    SetGroup,
    AllowIdle,
    Share,
    ShareSec,
    Permissive,
    // camera
    CamZoomMin,
    CamZoomMax,
    CamDrawMin,
    CamDrawMax,
    CamFovMin,
    CamFovMax,
    CamAvDistMin,
    CamAvDistMax,
    CamDrawColor,
    CamTextures,
    CamUnlock,
    // notifier
    Notify,
    // forced-action-only
    SetRot,
    AdjustHeight,
    SetCamFov,
    TpTo,
    SitGround,
    DetachMe,
    DetachAll,
    Attach,
    AttachAll,
    AttachOver,
    AttachAllOver,
    AddOutfitAll,
    AddOutfitOver,
    AddOutfitAllOver,
    SetDebugDynamic,
    SetEnvDynamic,
    // getters
    Version,
    VersionNew,
    VersionNum,
    VersionNumBl,
    GetBlacklist,
    GetStatus,
    GetStatusAll,
    GetSitId,
    GetCamZoomMin,
    GetCamFov,
    GetCamFovMin,
    GetCamFovMax,
    GetCamAvDistMin,
    GetCamAvDistMax,
    GetGroup,
    GetOutfit,
    GetAttach,
    GetInv,
    GetInvWorn,
    FindFolder,
    FindFolders,
    GetPath,
    GetPathNew,
    GetEnvDynamic,
    GetDebugDynamic,
}

#[derive(Debug, Clone, Copy)]
pub struct BehaviorMeta {
    pub canonical: &'static str,
    pub grammar: OptionGrammar,
    /// `true` if an argument-bearing instance of this behavior widens a
    /// sibling bare restriction rather than acting as its own restriction.
    pub admits_exception: bool,
    /// The `_sec` counterpart of a normal restriction, if any.
    pub secure_pair: Option<Behavior>,
    /// The bare `N` this is the secure variant of, if this *is* a `_sec` kind.
    pub secure_of: Option<Behavior>,
    pub is_notifier: bool,
    pub is_forced_action: bool,
    pub is_getter: bool,
}

/// Builder for one table row; keeps the table below readable despite the
/// metadata struct having eight fields, most of which default to "no".
struct Entry {
    meta: BehaviorMeta,
}

impl Entry {
    fn new(canonical: &'static str, grammar: OptionGrammar) -> Self {
        Self {
            meta: BehaviorMeta {
                canonical,
                grammar,
                admits_exception: false,
                secure_pair: None,
                secure_of: None,
                is_notifier: false,
                is_forced_action: false,
                is_getter: false,
            },
        }
    }

    fn exception(mut self) -> Self {
        self.meta.admits_exception = true;
        self
    }

    fn secure(mut self, pair: Behavior) -> Self {
        self.meta.secure_pair = Some(pair);
        self
    }

    fn notifier(mut self) -> Self {
        self.meta.is_notifier = true;
        self
    }

    fn force(mut self) -> Self {
        self.meta.is_forced_action = true;
        self
    }

    fn getter(mut self) -> Self {
        self.meta.is_getter = true;
        self
    }
}

fn table() -> Vec<(Behavior, BehaviorMeta)> {
    use Behavior::*;
    use OptionGrammar::*;

    vec![
        (Fly, Entry::new("fly", None).meta),
        (Jump, Entry::new("jump", None).meta),
        (TempRun, Entry::new("temprun", None).meta),
        (AlwaysRun, Entry::new("alwaysrun", None).meta),
        (Unsit, Entry::new("unsit", None).force().meta),
        (Sit, Entry::new("sit", None).force().meta),
        (StandTp, Entry::new("standtp", None).meta),
        (TpLm, Entry::new("tplm", None).meta),
        (TpLoc, Entry::new("tploc", None).meta),
        (SitTp, Entry::new("sittp", FloatOptional).meta),
        (TpLocal, Entry::new("tplocal", FloatOptional).meta),
        (
            TpLure,
            Entry::new("tplure", UuidOptional).exception().secure(TpLureSec).meta,
        ),
        (TpLureSec, Entry::new("tplure_sec", UuidOptional).meta),
        (
            TpRequest,
            Entry::new("tprequest", UuidOptional)
                .exception()
                .secure(TpRequestSec)
                .meta,
        ),
        (TpRequestSec, Entry::new("tprequest_sec", UuidOptional).meta),
        (AcceptTp, Entry::new("accepttp", UuidOptional).exception().meta),
        (
            AcceptTpRequest,
            Entry::new("accepttprequest", UuidOptional).exception().meta,
        ),
        (SendChat, Entry::new("sendchat", None).meta),
        (ChatShout, Entry::new("chatshout", None).meta),
        (ChatNormal, Entry::new("chatnormal", None).meta),
        (ChatWhisper, Entry::new("chatwhisper", None).meta),
        (Emote, Entry::new("emote", None).meta),
        (SendGesture, Entry::new("sendgesture", None).meta),
        (RedirChat, Entry::new("redirchat", IntRequired).meta),
        (RedirEmote, Entry::new("rediremote", IntRequired).meta),
        (
            RecvChat,
            Entry::new("recvchat", UuidOptional).exception().secure(RecvChatSec).meta,
        ),
        (RecvChatSec, Entry::new("recvchat_sec", UuidOptional).meta),
        (RecvChatFrom, Entry::new("recvchatfrom", Uuid).meta),
        (
            RecvEmote,
            Entry::new("recvemote", UuidOptional)
                .exception()
                .secure(RecvEmoteSec)
                .meta,
        ),
        (RecvEmoteSec, Entry::new("recvemote_sec", UuidOptional).meta),
        (RecvEmoteFrom, Entry::new("recvemotefrom", Uuid).meta),
        (
            SendChannel,
            Entry::new("sendchannel", IntOptional)
                .exception()
                .secure(SendChannelSec)
                .meta,
        ),
        (SendChannelSec, Entry::new("sendchannel_sec", IntOptional).meta),
        (
            SendChannelExcept,
            Entry::new("sendchannel_except", IntRequired).exception().meta,
        ),
        (
            SendIm,
            Entry::new("sendim", UuidOrString).exception().secure(SendImSec).meta,
        ),
        (SendImSec, Entry::new("sendim_sec", UuidOrString).meta),
        (SendImTo, Entry::new("sendimto", UuidOrString).meta),
        (
            RecvIm,
            Entry::new("recvim", UuidOrString).exception().secure(RecvImSec).meta,
        ),
        (RecvImSec, Entry::new("recvim_sec", UuidOrString).meta),
        (RecvImFrom, Entry::new("recvimfrom", UuidOrString).meta),
        (StartIm, Entry::new("startim", UuidOptional).exception().meta),
        (StartImTo, Entry::new("startimto", Uuid).meta),
        (Detach, Entry::new("detach", AttachmentPoint).exception().force().meta),
        (AddAttach, Entry::new("addattach", AttachmentPoint).exception().meta),
        (
            RemAttach,
            Entry::new("remattach", AttachmentPoint).exception().force().meta,
        ),
        (AddOutfit, Entry::new("addoutfit", WearableType).exception().force().meta),
        (RemOutfit, Entry::new("remoutfit", WearableType).exception().force().meta),
        (DefaultWear, Entry::new("defaultwear", None).meta),
        (UnsharedWear, Entry::new("unsharedwear", None).meta),
        (UnsharedUnwear, Entry::new("unsharedunwear", None).meta),
        (SharedWear, Entry::new("sharedwear", None).meta),
        (SharedUnwear, Entry::new("sharedunwear", None).meta),
        (DetachThis, Entry::new("detachthis", FolderPathOrLayer).force().meta),
        (DetachAllThis, Entry::new("detachallthis", FolderPathOrLayer).force().meta),
        (AttachThis, Entry::new("attachthis", FolderPathOrLayer).force().meta),
        (AttachAllThis, Entry::new("attachallthis", FolderPathOrLayer).force().meta),
        (
            DetachThisExcept,
            Entry::new("detachthis_except", Path).exception().meta,
        ),
        (
            DetachAllThisExcept,
            Entry::new("detachallthis_except", Path).exception().meta,
        ),
        (
            AttachThisExcept,
            Entry::new("attachthis_except", Path).exception().meta,
        ),
        (
            AttachAllThisExcept,
            Entry::new("attachallthis_except", Path).exception().meta,
        ),
        (TouchAll, Entry::new("touchall", None).meta),
        (TouchWorld, Entry::new("touchworld", UuidOptional).exception().meta),
        (TouchThis, Entry::new("touchthis", Uuid).meta),
        (TouchMe, Entry::new("touchme", None).meta),
        (TouchAttach, Entry::new("touchattach", None).meta),
        (TouchAttachSelf, Entry::new("touchattachself", None).meta),
        (
            TouchAttachOther,
            Entry::new("touchattachother", UuidOptional).exception().meta,
        ),
        (TouchHud, Entry::new("touchhud", UuidOptional).exception().meta),
        (Interact, Entry::new("interact", None).meta),
        (TouchFar, Entry::new("touchfar", FloatOptional).meta),
        (ShowInv, Entry::new("showinv", None).meta),
        (
            ShowNames,
            Entry::new("shownames", UuidOptional).exception().secure(ShowNamesSec).meta,
        ),
        (
            ShowNamesSec,
            Entry::new("shownames_sec", UuidOptional).exception().meta,
        ),
        (
            ShowNameTags,
            Entry::new("shownametags", UuidOptional).exception().meta,
        ),
        (ShowNearby, Entry::new("shownearby", None).meta),
        (ShowLoc, Entry::new("showloc", None).meta),
        (ShowWorldMap, Entry::new("showworldmap", None).meta),
        (ShowMiniMap, Entry::new("showminimap", None).meta),
        (ShowHoverText, Entry::new("showhovertext", Uuid).meta),
        (ShowHoverTextAll, Entry::new("showhovertextall", None).meta),
        (ShowHoverTextHud, Entry::new("showhovertexthud", None).meta),
        (ShowHoverTextWorld, Entry::new("showhovertextworld", None).meta),
        (Edit, Entry::new("edit", UuidOptional).exception().meta),
        (EditObj, Entry::new("editobj", Uuid).meta),
        (EditWorld, Entry::new("editworld", None).meta),
        (EditAttach, Entry::new("editattach", None).meta),
        (Rez, Entry::new("rez", None).meta),
        (SetEnv, Entry::new("setenv", None).meta),
        (SetDebug, Entry::new("setdebug", None).meta),
        (SetGroup, Entry::new("setgroup", None).force().meta),
        (AllowIdle, Entry::new("allowidle", None).meta),
        (Share, Entry::new("share", UuidOptional).exception().secure(ShareSec).meta),
        (ShareSec, Entry::new("share_sec", UuidOptional).meta),
        (Permissive, Entry::new("permissive", None).meta),
        (CamZoomMin, Entry::new("camzoommin", FloatOptional).meta),
        (CamZoomMax, Entry::new("camzoommax", FloatOptional).meta),
        (CamDrawMin, Entry::new("camdrawmin", FloatRequiredMin040).meta),
        (CamDrawMax, Entry::new("camdrawmax", FloatRequiredMin040).meta),
        (CamFovMin, Entry::new("camfovmin", FloatOptional).meta),
        (CamFovMax, Entry::new("camfovmax", FloatOptional).meta),
        (CamAvDistMin, Entry::new("setcam_avdistmin", FloatOptional).meta),
        (CamAvDistMax, Entry::new("setcam_avdistmax", FloatOptional).meta),
        (CamDrawColor, Entry::new("setcam_drawcolor", ColorTriple).meta),
        (CamTextures, Entry::new("setcam_textures", UuidOptional).meta),
        (CamUnlock, Entry::new("setcam_unlock", None).meta),
        (Notify, Entry::new("notify", Notify).notifier().meta),
        (SetRot, Entry::new("setrot", Composite).force().meta),
        (AdjustHeight, Entry::new("adjustheight", Composite).force().meta),
        (SetCamFov, Entry::new("setcam_fov", FloatRequired).force().meta),
        (TpTo, Entry::new("tpto", Composite).force().meta),
        (SitGround, Entry::new("sitground", None).force().meta),
        (DetachMe, Entry::new("detachme", None).force().meta),
        (DetachAll, Entry::new("detachall", Path).force().meta),
        (Attach, Entry::new("attach", Path).force().meta),
        (AttachAll, Entry::new("attachall", Path).force().meta),
        (AttachOver, Entry::new("attachover", Path).force().meta),
        (AttachAllOver, Entry::new("attachallover", Path).force().meta),
        (AddOutfitAll, Entry::new("addoutfitall", Path).force().meta),
        (AddOutfitOver, Entry::new("addoutfitover", Path).force().meta),
        (AddOutfitAllOver, Entry::new("addoutfitallover", Path).force().meta),
        (SetDebugDynamic, Entry::new("setdebug_", Composite).force().meta),
        (SetEnvDynamic, Entry::new("setenv_", Composite).force().meta),
        (Version, Entry::new("version", None).getter().meta),
        (VersionNew, Entry::new("versionnew", None).getter().meta),
        (VersionNum, Entry::new("versionnum", None).getter().meta),
        (VersionNumBl, Entry::new("versionnumbl", None).getter().meta),
        (GetBlacklist, Entry::new("getblacklist", Path).getter().meta),
        (GetStatus, Entry::new("getstatus", Path).getter().meta),
        (GetStatusAll, Entry::new("getstatusall", Path).getter().meta),
        (GetSitId, Entry::new("getsitid", None).getter().meta),
        (GetCamZoomMin, Entry::new("getcam_zoommin", None).getter().meta),
        (GetCamFov, Entry::new("getcam_fov", None).getter().meta),
        (GetCamFovMin, Entry::new("getcam_fovmin", None).getter().meta),
        (GetCamFovMax, Entry::new("getcam_fovmax", None).getter().meta),
        (GetCamAvDistMin, Entry::new("getcam_avdistmin", None).getter().meta),
        (GetCamAvDistMax, Entry::new("getcam_avdistmax", None).getter().meta),
        (GetGroup, Entry::new("getgroup", None).getter().meta),
        (GetOutfit, Entry::new("getoutfit", FolderPathOrLayer).getter().meta),
        (GetAttach, Entry::new("getattach", FolderPathOrLayer).getter().meta),
        (GetInv, Entry::new("getinv", Path).getter().meta),
        (GetInvWorn, Entry::new("getinvworn", Path).getter().meta),
        (FindFolder, Entry::new("findfolder", Path).getter().meta),
        (FindFolders, Entry::new("findfolders", Path).getter().meta),
        (GetPath, Entry::new("getpath", Path).getter().meta),
        (GetPathNew, Entry::new("getpathnew", Path).getter().meta),
        (GetEnvDynamic, Entry::new("getenv_", None).getter().meta),
        (GetDebugDynamic, Entry::new("getdebug_", None).getter().meta),
    ]
}

static BY_NAME: Lazy<HashMap<&'static str, Behavior>> =
    Lazy::new(|| table().iter().map(|(b, m)| (m.canonical, *b)).collect());

static BY_BEHAVIOR: Lazy<HashMap<Behavior, BehaviorMeta>> = Lazy::new(|| {
    let mut map: HashMap<Behavior, BehaviorMeta> = table().into_iter().collect();
    // Backfill secure_of from the forward secure_pair links so lookups work
    // from either side of the pair.
    let links: Vec<(Behavior, Behavior)> = map
        .iter()
        .filter_map(|(b, m)| m.secure_pair.map(|s| (*b, s)))
        .collect();
    for (normal, secure) in links {
        if let Some(m) = map.get_mut(&secure) {
            m.secure_of = Some(normal);
        }
    }
    map
});

/// Aliases collapsing at ingress (spec.md §3).
static ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("fartouch", "touchfar"),
        ("camdistmax", "setcam_avdistmax"),
        ("camunlock", "setcam_unlock"),
        ("camtextures", "setcam_textures"),
        ("camdistmin", "setcam_avdistmin"),
    ])
});

impl Behavior {
    pub fn meta(self) -> BehaviorMeta {
        *BY_BEHAVIOR.get(&self).expect("every variant is in the table")
    }

    pub fn canonical_name(self) -> &'static str {
        self.meta().canonical
    }

    /// Resolve a lowercased wire-form behavior name to a [`Behavior`],
    /// applying alias collapsing and the `setdebug_`/`setenv_`/`getdebug_`/
    /// `getenv_` dynamic-suffix families first.
    ///
    /// Returns the resolved behavior plus, for the dynamic families, the
    /// captured suffix (the specific debug/env setting name).
    pub fn resolve(name: &str) -> Option<(Behavior, Option<String>)> {
        let name = ALIASES.get(name).copied().unwrap_or(name);
        for (prefix, behavior) in [
            ("setdebug_", Behavior::SetDebugDynamic),
            ("setenv_", Behavior::SetEnvDynamic),
            ("getdebug_", Behavior::GetDebugDynamic),
            ("getenv_", Behavior::GetEnvDynamic),
        ] {
            if let Some(suffix) = name.strip_prefix(prefix) {
                if !suffix.is_empty() {
                    return Some((behavior, Some(suffix.to_string())));
                }
            }
        }
        BY_NAME.get(name).map(|b| (*b, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_collapses() {
        assert_eq!(
            Behavior::resolve("fartouch").map(|(b, _)| b),
            Some(Behavior::TouchFar)
        );
        assert_eq!(
            Behavior::resolve("camdistmax").map(|(b, _)| b),
            Some(Behavior::CamAvDistMax)
        );
    }

    #[test]
    fn secure_pairing_is_bidirectional() {
        let meta = Behavior::RecvIm.meta();
        assert_eq!(meta.secure_pair, Some(Behavior::RecvImSec));
        let secure_meta = Behavior::RecvImSec.meta();
        assert_eq!(secure_meta.secure_of, Some(Behavior::RecvIm));
    }

    #[test]
    fn dynamic_debug_family() {
        let (b, suffix) = Behavior::resolve("setdebug_renderresolutiondivisor").unwrap();
        assert_eq!(b, Behavior::SetDebugDynamic);
        assert_eq!(suffix.as_deref(), Some("renderresolutiondivisor"));
    }

    #[test]
    fn every_behavior_resolves_its_own_canonical_name() {
        for (behavior, meta) in BY_BEHAVIOR.iter() {
            if meta.canonical.ends_with('_') {
                continue; // dynamic-suffix families, covered separately
            }
            assert_eq!(Behavior::resolve(meta.canonical).map(|(b, _)| b), Some(*behavior));
        }
    }
}
