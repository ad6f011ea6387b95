//! SVG fragments for icon sheets.
//!
//! Renders the `<image>`/`<text>` pair for each icon and splices the
//! collected fragments into the sheet template.

use crate::config::SheetConfig;
use crate::layout::Cell;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::Write as _;
use tracing::warn;

/// Closing group tag targeted by [`InjectionPoint::FirstGroupClose`].
pub const GROUP_CLOSE: &str = "</g>";

/// Where generated icon elements are placed in the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InjectionPoint {
    /// Insert just before the first `</g>`, leaving the tag in place.
    #[default]
    FirstGroupClose,
    /// Replace the first occurrence of this placeholder text.
    Marker(String),
}

impl std::fmt::Display for InjectionPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstGroupClose => write!(f, "first {GROUP_CLOSE}"),
            Self::Marker(marker) => write!(f, "marker {marker:?}"),
        }
    }
}

/// Render the image and caption for one icon.
///
/// `href` is written as given; `name` becomes the caption. Both are escaped.
pub fn render_icon(cell: Cell, href: &str, name: &str, config: &SheetConfig) -> String {
    let Cell { x, y } = cell;
    let size = u64::from(config.icon_size);
    let resolution = config.resolution;
    let href = escape_xml(href);
    let name = escape_xml(name);
    let style = escape_xml(&config.label_style);
    let label_x = x + size / 2;
    let label_y = y + size + 3;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n<image xlink:href=\"{href}\" y=\"{y}\" x=\"{x}\" preserveAspectRatio=\"none\" \
         inkscape:svg-dpi=\"{resolution}\" width=\"{size}\" height=\"{size}\" \
         style=\"image-rendering:optimizeQuality\" id=\"image_{x}_{y}\" />"
    );
    let _ = writeln!(
        out,
        "<text style=\"{style}\" x=\"{label_x}\" y=\"{label_y}\" \
         id=\"text_{x}_{y}\"><tspan>{name}</tspan></text>"
    );
    out
}

/// Splice `elements` into `template` at the configured point.
///
/// Only the first match is touched. A template without any `</g>` is
/// returned unchanged; a configured marker that is missing is an error.
pub fn inject(
    template: &str,
    elements: &str,
    point: &InjectionPoint,
) -> Result<String, SheetError> {
    let (needle, keep_needle) = match point {
        InjectionPoint::FirstGroupClose => (GROUP_CLOSE, true),
        InjectionPoint::Marker(marker) => (marker.as_str(), false),
    };

    let Some(at) = template.find(needle) else {
        if keep_needle {
            warn!("Template has no {GROUP_CLOSE}, icons not inserted");
            return Ok(template.to_string());
        }
        return Err(SheetError::MissingInjectionPoint(point.clone()));
    };

    let tail = if keep_needle {
        &template[at..]
    } else {
        &template[at + needle.len()..]
    };

    let mut out = String::with_capacity(template.len() + elements.len());
    out.push_str(&template[..at]);
    out.push_str(elements);
    out.push_str(tail);
    Ok(out)
}

/// Escape text for use in XML attribute values and character data.
pub fn escape_xml(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Errors from assembling a sheet.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("Template has no injection point ({0})")]
    MissingInjectionPoint(InjectionPoint),
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    const TEMPLATE: &str = "<svg><g id=\"layer1\"><rect/></g></svg>";

    #[test]
    fn test_render_icon() {
        let config = SheetConfig::default();
        let out = render_icon(
            Cell { x: 21, y: 26 },
            "./hicolor/symbolic/actions/edit-copy.svg",
            "edit-copy.svg",
            &config,
        );
        assert_snapshot!(out.trim(), @r#"
<image xlink:href="./hicolor/symbolic/actions/edit-copy.svg" y="26" x="21" preserveAspectRatio="none" inkscape:svg-dpi="900" width="16" height="16" style="image-rendering:optimizeQuality" id="image_21_26" />
<text style="font-size:1.46667px;text-align:center;text-anchor:middle;white-space:pre;inline-size:13.3136;fill:#333333;stroke:none" x="29" y="45" id="text_21_26"><tspan>edit-copy.svg</tspan></text>
"#);
    }

    #[test]
    fn test_render_icon_escapes_names() {
        let config = SheetConfig::default();
        let out = render_icon(Cell { x: 0, y: 26 }, "./a&b/x.svg", "<x>.svg", &config);
        assert!(out.contains("xlink:href=\"./a&amp;b/x.svg\""));
        assert!(out.contains("<tspan>&lt;x&gt;.svg</tspan>"));
    }

    #[test]
    fn test_inject_before_first_group_close() {
        let out = inject(TEMPLATE, "<image/>", &InjectionPoint::FirstGroupClose).unwrap();
        assert_eq!(out, "<svg><g id=\"layer1\"><rect/><image/></g></svg>");
        assert!(out.len() > TEMPLATE.len());
    }

    #[test]
    fn test_inject_touches_only_first_group() {
        let template = "<svg><g id=\"a\"></g><g id=\"b\"></g></svg>";
        let out = inject(template, "X", &InjectionPoint::FirstGroupClose).unwrap();
        assert_eq!(out, "<svg><g id=\"a\">X</g><g id=\"b\"></g></svg>");
    }

    #[test]
    fn test_inject_empty_leaves_template() {
        let out = inject(TEMPLATE, "", &InjectionPoint::FirstGroupClose).unwrap();
        assert_eq!(out, TEMPLATE);
    }

    #[test]
    fn test_inject_marker() {
        let template = "<svg><g id=\"title\"></g><g><!-- icons --></g></svg>";
        let point = InjectionPoint::Marker("<!-- icons -->".into());
        let out = inject(template, "<image/>", &point).unwrap();
        assert_eq!(out, "<svg><g id=\"title\"></g><g><image/></g></svg>");
    }

    #[test]
    fn test_inject_without_group_keeps_template() {
        let out = inject("<svg/>", "X", &InjectionPoint::FirstGroupClose).unwrap();
        assert_eq!(out, "<svg/>");
    }

    #[test]
    fn test_inject_missing_marker() {
        let point = InjectionPoint::Marker("<!-- icons -->".into());
        assert!(inject(TEMPLATE, "X", &point).is_err());
    }

    #[test]
    fn test_escape_xml_borrows_clean_text() {
        assert!(matches!(escape_xml("plain.svg"), Cow::Borrowed(_)));
        assert_eq!(escape_xml("a\"b'c"), "a&quot;b&apos;c");
    }
}
