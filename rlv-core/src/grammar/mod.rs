//! Command grammar: tokenizing, option parsing, and behavior/dispatch
//! resolution (spec.md §4.1).

pub mod options;
pub mod tokenizer;

pub use options::{Args, FolderPathOrLayer, FolderPathOrLayerKind, UuidOrString};
pub use tokenizer::Segment;

use crate::behaviors::Behavior;

/// What a resolved segment instructs the facade to do (spec.md §4.1 "Dispatch
/// by `param`").
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// `option` carries the name-substring filter, or `""` for no filter.
    Clear { filter: String },
    Force { behavior: Behavior, suffix: Option<String>, raw_option: String },
    Add { behavior: Behavior, suffix: Option<String>, args: Args },
    Remove { behavior: Behavior, suffix: Option<String>, args: Args },
    Get { behavior: Behavior, suffix: Option<String>, channel: i32, raw_option: String },
}

/// Resolve one raw segment all the way to a [`Dispatch`], or `None` if the
/// segment is malformed, names an unknown behavior, or fails option parsing —
/// any of which mean the segment is simply dropped (spec.md §7).
pub fn resolve_segment(raw: &str) -> Option<Dispatch> {
    let seg = tokenizer::parse_segment(raw)?;

    if seg.param == "clear" {
        return Some(Dispatch::Clear { filter: seg.option.unwrap_or_default() });
    }

    let (behavior, suffix) = Behavior::resolve(&seg.behavior_name)?;

    match seg.param.as_str() {
        "force" => Some(Dispatch::Force {
            behavior,
            suffix,
            raw_option: seg.option.unwrap_or_default(),
        }),
        "n" | "add" => {
            let args = options::parse_option(behavior.meta().grammar, seg.option.as_deref())?;
            Some(Dispatch::Add { behavior, suffix, args })
        }
        "y" | "rem" => {
            let args = options::parse_option(behavior.meta().grammar, seg.option.as_deref())?;
            Some(Dispatch::Remove { behavior, suffix, args })
        }
        param => match param.parse::<i32>() {
            Ok(0) => None,
            Ok(channel) => Some(Dispatch::Get {
                behavior,
                suffix,
                channel,
                raw_option: seg.option.unwrap_or_default(),
            }),
            Err(_) => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::Behavior;

    #[test]
    fn resolves_add_restriction() {
        match resolve_segment("fly=n").unwrap() {
            Dispatch::Add { behavior, args, .. } => {
                assert_eq!(behavior, Behavior::Fly);
                assert_eq!(args, Args::None);
            }
            other => panic!("unexpected dispatch: {other:?}"),
        }
    }

    #[test]
    fn resolves_force() {
        match resolve_segment("sit=force").unwrap() {
            Dispatch::Force { behavior, .. } => assert_eq!(behavior, Behavior::Sit),
            other => panic!("unexpected dispatch: {other:?}"),
        }
    }

    #[test]
    fn resolves_get_channel() {
        match resolve_segment("version=1234").unwrap() {
            Dispatch::Get { behavior, channel, .. } => {
                assert_eq!(behavior, Behavior::Version);
                assert_eq!(channel, 1234);
            }
            other => panic!("unexpected dispatch: {other:?}"),
        }
    }

    #[test]
    fn rejects_channel_zero() {
        assert!(resolve_segment("version=0").is_none());
    }

    #[test]
    fn bare_clear_dispatches_with_empty_filter() {
        assert_eq!(resolve_segment("clear"), Some(Dispatch::Clear { filter: String::new() }));
    }

    #[test]
    fn clear_param_on_any_behavior_uses_option_as_filter() {
        assert_eq!(
            resolve_segment("ignored:sendim=clear"),
            Some(Dispatch::Clear { filter: "sendim".to_string() })
        );
    }

    #[test]
    fn unknown_behavior_drops_segment() {
        assert!(resolve_segment("notabehavior=n").is_none());
    }

    #[test]
    fn alias_resolves_through_dispatch() {
        match resolve_segment("fartouch=n").unwrap() {
            Dispatch::Add { behavior, .. } => assert_eq!(behavior, Behavior::TouchFar),
            other => panic!("unexpected dispatch: {other:?}"),
        }
    }
}
