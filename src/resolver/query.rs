//! Startup query-parameter parsing.
//!
//! A standalone pure function: `input` and `depthmap` are extracted raw
//! (undecoded), so pre-encoded URLs survive a round-trip through a history
//! entry byte-for-byte. `displayMode` is matched against the enumerated
//! modes, with an invalid value silently falling back to the default.

use crate::viewer::DisplayMode;

/// Parameters recognized at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartupParams {
    /// Raw (undecoded) image URL from `?input=`.
    pub input: Option<String>,
    /// Raw (undecoded) depth map URL from `?depthmap=`.
    pub depthmap: Option<String>,
    /// Display mode from `?displayMode=`; `Some(default)` when the value
    /// is present but not a known mode, `None` when absent.
    pub display_mode: Option<DisplayMode>,
}

/// Parses a query string (with or without the leading `?`).
pub fn parse_query(query: &str) -> StartupParams {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut params = StartupParams::default();

    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        if key.eq_ignore_ascii_case("input") {
            params.input = Some(value.to_string());
        } else if key.eq_ignore_ascii_case("depthmap") {
            params.depthmap = Some(value.to_string());
        } else if key == "displayMode" {
            params.display_mode = Some(DisplayMode::parse_or_default(value));
        }
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_raw_undecoded_values() {
        let params = parse_query("?input=https%3A%2F%2Fx%2Fa.jpg&depthmap=https%3A%2F%2Fx%2Fd.png");
        assert_eq!(params.input.as_deref(), Some("https%3A%2F%2Fx%2Fa.jpg"));
        assert_eq!(params.depthmap.as_deref(), Some("https%3A%2F%2Fx%2Fd.png"));
    }

    #[test]
    fn missing_params_are_none() {
        let params = parse_query("");
        assert_eq!(params, StartupParams::default());
    }

    #[test]
    fn keys_match_case_insensitively() {
        let params = parse_query("Input=a&DEPTHMAP=b");
        assert_eq!(params.input.as_deref(), Some("a"));
        assert_eq!(params.depthmap.as_deref(), Some("b"));
    }

    #[test]
    fn invalid_display_mode_falls_back_silently() {
        let params = parse_query("displayMode=sideways");
        assert_eq!(params.display_mode, Some(DisplayMode::Full));
    }

    #[test]
    fn valid_display_modes_parse() {
        assert_eq!(
            parse_query("displayMode=hsbs").display_mode,
            Some(DisplayMode::HalfSideBySide)
        );
        assert_eq!(
            parse_query("displayMode=anaglyph").display_mode,
            Some(DisplayMode::Anaglyph)
        );
        assert_eq!(parse_query("input=a").display_mode, None);
    }
}
