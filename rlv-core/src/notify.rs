//! Notification fan-out: restriction-change events and host `Report*` calls
//! both resolve to a chat-style string, matched against every active
//! `notify` restriction's optional filter substring (spec.md §4.8, §6
//! "Outbound notification chat").

use crate::behaviors::Behavior;
use crate::constants::{AttachmentPoint, WearableType};
use crate::getters::format_restriction;
use crate::grammar::Args;
use crate::restriction::{RestrictionEvent, RestrictionStore};
use uuid::Uuid;

/// `"/"+behavior[:args]+"=n"` on add, `"=y"` on removal (spec.md §4.8).
pub fn restriction_change_text(event: &RestrictionEvent) -> String {
    let suffix = if event.is_new { "n" } else { "y" };
    format!("/{}={}", format_restriction(&event.restriction), suffix)
}

/// The host-reported facts that get turned into a `Report*` chat line
/// (spec.md §4.8: "Reporters format a notification string...").
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Worn(WearableType),
    Unworn(WearableType),
    Attached(AttachmentPoint),
    Detached(AttachmentPoint),
    Sat(Uuid),
    Stood,
}

pub fn report_text(report: &Report, legal: bool) -> String {
    let legality = if legal { "legally" } else { "illegally" };
    match report {
        Report::Worn(w) => format!("/worn {legality} {}", w.as_str()),
        Report::Unworn(w) => format!("/unworn {legality} {}", w.as_str()),
        Report::Attached(p) => format!("/attached {legality} {}", p.as_str()),
        Report::Detached(p) => format!("/detached {legality} {}", p.as_str()),
        Report::Sat(object) => format!("/sat object {legality} {object}"),
        Report::Stood => format!("/stood {legality}"),
    }
}

/// Every reply channel of a live `notify` restriction whose filter substring
/// (if any) is contained in `message`, in no particular order — the facade
/// sends `message` to each (spec.md §6).
pub fn matching_channels(store: &RestrictionStore, message: &str) -> Vec<i32> {
    store
        .by_behavior(Behavior::Notify)
        .iter()
        .filter_map(|r| match &r.args {
            Args::Notify { channel, filter } => {
                let matches = filter.as_deref().map(|f| message.contains(f)).unwrap_or(true);
                matches.then_some(*channel)
            }
            _ => None,
        })
        .collect()
}

/// Notifications for one batch of restriction-change events, each paired
/// with the channels that should receive it — ordering follows event order,
/// matching spec.md §5's "notifications to in-world listeners are emitted
/// after all events for that command."
pub fn notifications_for_events(store: &RestrictionStore, events: &[RestrictionEvent]) -> Vec<(i32, String)> {
    let mut out = Vec::new();
    for event in events {
        let text = restriction_change_text(event);
        for channel in matching_channels(store, &text) {
            out.push((channel, text.clone()));
        }
    }
    out
}

pub fn notifications_for_report(store: &RestrictionStore, report: &Report, legal: bool) -> Vec<(i32, String)> {
    let text = report_text(report, legal);
    matching_channels(store, &text).into_iter().map(|c| (c, text.clone())).collect()
}
