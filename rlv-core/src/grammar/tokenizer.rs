//! Splits an inbound chat/IM string into `@behavior[:option]=param` segments
//! (spec.md §4.1, §6).

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub raw: String,
    /// Lowercased wire-form behavior name, *before* alias/suffix resolution.
    pub behavior_name: String,
    /// Case-preserved option string (may be a path), if the segment had one.
    pub option: Option<String>,
    /// Lowercased param.
    pub param: String,
}

static SEGMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<behavior>[^:=]+)(:(?P<option>[^=]*))?=(?P<param>.+)$").unwrap());

/// Split a command string into its comma-separated segments, stripping the
/// leading `@` if present. Does not validate segment grammar.
pub fn split_message(msg: &str) -> Vec<&str> {
    let body = msg.strip_prefix('@').unwrap_or(msg);
    body.split(',').collect()
}

/// Parse one segment. Returns `None` on malformed input — per spec.md §7 that
/// failure is local to the segment and never an error the caller sees.
pub fn parse_segment(raw: &str) -> Option<Segment> {
    if raw == "clear" {
        return Some(Segment {
            raw: raw.to_string(),
            behavior_name: "clear".to_string(),
            option: None,
            param: "clear".to_string(),
        });
    }
    let caps = SEGMENT_RE.captures(raw)?;
    let behavior_name = caps.name("behavior")?.as_str().to_ascii_lowercase();
    let option = caps.name("option").map(|m| m.as_str().to_string());
    let param = caps.name("param")?.as_str().to_ascii_lowercase();
    Some(Segment { raw: raw.to_string(), behavior_name, option, param })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_comma_and_strips_at() {
        assert_eq!(split_message("@fly=n,jump=n"), vec!["fly=n", "jump=n"]);
        assert_eq!(split_message("fly=n"), vec!["fly=n"]);
    }

    #[test]
    fn parses_behavior_option_param() {
        let seg = parse_segment("sittp:2.5=n").unwrap();
        assert_eq!(seg.behavior_name, "sittp");
        assert_eq!(seg.option.as_deref(), Some("2.5"));
        assert_eq!(seg.param, "n");
    }

    #[test]
    fn parses_no_option() {
        let seg = parse_segment("fly=n").unwrap();
        assert_eq!(seg.behavior_name, "fly");
        assert_eq!(seg.option, None);
        assert_eq!(seg.param, "n");
    }

    #[test]
    fn option_case_is_preserved_behavior_and_param_are_lowered() {
        let seg = parse_segment("GETINV:Clothing/Hats=123").unwrap();
        assert_eq!(seg.behavior_name, "getinv");
        assert_eq!(seg.option.as_deref(), Some("Clothing/Hats"));
        assert_eq!(seg.param, "123");
    }

    #[test]
    fn bare_clear_is_special_cased() {
        let seg = parse_segment("clear").unwrap();
        assert_eq!(seg.behavior_name, "clear");
        assert_eq!(seg.param, "clear");
        assert_eq!(seg.option, None);
    }

    #[test]
    fn malformed_segment_fails_locally() {
        assert!(parse_segment("no_equals_sign_here").is_none());
        assert!(parse_segment("=noparam").is_none());
    }
}
