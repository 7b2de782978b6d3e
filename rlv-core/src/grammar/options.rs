//! Option-grammar parsing (spec.md §4.1's option-grammar table).
//!
//! Each [`Behavior`](crate::behaviors::Behavior) carries an [`OptionGrammar`]
//! tag; [`parse_option`] turns the segment's raw `option` string into a typed
//! [`Args`] value according to that tag. A `None` return means the segment
//! fails to parse and the whole segment is discarded per spec.md §7.

use crate::behaviors::OptionGrammar;
use crate::constants::{AttachmentPoint, WearableType};
use uuid::Uuid;

/// The special group name that matches any group restriction, regardless of
/// the specific group id or name (spec.md §4.3 "IM").
pub const ALL_GROUPS: &str = "allgroups";

#[derive(Debug, Clone, PartialEq)]
pub enum UuidOrString {
    Id(Uuid),
    Name(String),
    AllGroups,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FolderPathOrLayerKind {
    Wearable(WearableType),
    Attachment(AttachmentPoint),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FolderPathOrLayer {
    Typed(FolderPathOrLayerKind),
    Path(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Args {
    None,
    Float(f64),
    Int(i64),
    Uuid(Uuid),
    UuidOrString(UuidOrString),
    WearableType(WearableType),
    AttachmentPoint(AttachmentPoint),
    FolderPathOrLayer(FolderPathOrLayer),
    Notify { channel: i32, filter: Option<String> },
    ColorTriple([f64; 3]),
    Path(String),
}

impl Args {
    /// `true` for every shape except [`Args::None`] — presence of an argument
    /// is what turns a bare restriction into its exception form (spec.md §3).
    pub fn is_argumented(&self) -> bool {
        !matches!(self, Args::None)
    }
}

pub fn parse_option(grammar: OptionGrammar, raw: Option<&str>) -> Option<Args> {
    let raw = raw.unwrap_or("");
    match grammar {
        OptionGrammar::None => {
            if raw.is_empty() {
                Some(Args::None)
            } else {
                None
            }
        }
        OptionGrammar::FloatRequired => raw.parse::<f64>().ok().map(Args::Float),
        OptionGrammar::FloatRequiredMin040 => {
            let v: f64 = raw.parse().ok()?;
            if v < 0.40 {
                None
            } else {
                Some(Args::Float(v))
            }
        }
        OptionGrammar::FloatOptional => {
            if raw.is_empty() {
                Some(Args::None)
            } else {
                raw.parse::<f64>().ok().map(Args::Float)
            }
        }
        OptionGrammar::IntRequired => raw.parse::<i64>().ok().map(Args::Int),
        OptionGrammar::IntOptional => {
            if raw.is_empty() {
                Some(Args::None)
            } else {
                raw.parse::<i64>().ok().map(Args::Int)
            }
        }
        OptionGrammar::Uuid => Uuid::parse_str(raw).ok().map(Args::Uuid),
        OptionGrammar::UuidOrString => Some(Args::UuidOrString(parse_uuid_or_string(raw))),
        OptionGrammar::UuidOptional => {
            if raw.is_empty() {
                Some(Args::None)
            } else {
                Uuid::parse_str(raw).ok().map(Args::Uuid)
            }
        }
        OptionGrammar::WearableType => WearableType::from_name(raw).map(Args::WearableType),
        OptionGrammar::AttachmentPoint => AttachmentPoint::from_name(raw).map(Args::AttachmentPoint),
        OptionGrammar::FolderPathOrLayer => Some(Args::FolderPathOrLayer(parse_folder_path_or_layer(raw))),
        OptionGrammar::Notify => parse_notify(raw),
        OptionGrammar::ColorTriple => parse_color_triple(raw),
        OptionGrammar::Path => Some(Args::Path(raw.to_string())),
        OptionGrammar::Composite => None,
    }
}

fn parse_uuid_or_string(raw: &str) -> UuidOrString {
    if raw.eq_ignore_ascii_case(ALL_GROUPS) {
        return UuidOrString::AllGroups;
    }
    match Uuid::parse_str(raw) {
        Ok(id) => UuidOrString::Id(id),
        Err(_) => UuidOrString::Name(raw.to_string()),
    }
}

/// "first try wearable name, then attachment-point name, else treat as path"
/// (spec.md §4.1).
fn parse_folder_path_or_layer(raw: &str) -> FolderPathOrLayer {
    if let Some(w) = WearableType::from_name(raw) {
        return FolderPathOrLayer::Typed(FolderPathOrLayerKind::Wearable(w));
    }
    if let Some(p) = AttachmentPoint::from_name(raw) {
        return FolderPathOrLayer::Typed(FolderPathOrLayerKind::Attachment(p));
    }
    FolderPathOrLayer::Path(raw.to_string())
}

fn parse_notify(raw: &str) -> Option<Args> {
    let mut parts = raw.splitn(2, ';');
    let channel = parts.next()?.parse::<i32>().ok()?;
    let filter = parts.next().filter(|s| !s.is_empty()).map(|s| s.to_string());
    Some(Args::Notify { channel, filter })
}

fn parse_color_triple(raw: &str) -> Option<Args> {
    let parts: Vec<&str> = raw.split(';').collect();
    if parts.len() != 3 {
        return None;
    }
    let mut out = [0.0f64; 3];
    for (i, p) in parts.iter().enumerate() {
        out[i] = p.parse().ok()?;
    }
    Some(Args::ColorTriple(out))
}


impl From<FolderPathOrLayerKind> for FolderPathOrLayer {
    fn from(k: FolderPathOrLayerKind) -> Self {
        FolderPathOrLayer::Typed(k)
    }
}
