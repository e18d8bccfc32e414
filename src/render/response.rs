//! Render service responses

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};
use crate::linker::LineMap;

pub const LINE_MAP_HEADER: &str = "X-Element-Line-Map";
pub const WARNINGS_HEADER: &str = "X-Warnings";
pub const WARNINGS_COUNT_HEADER: &str = "X-Warnings-Count";

/// A successful `/render-xml` answer
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderResponse {
    /// MusicXML, BOM and surrounding whitespace removed
    pub xml: String,
    /// Element id → program line reported by the service
    pub line_map: LineMap,
    /// The first few warnings raised while running the program
    pub warnings: Vec<String>,
    /// Total number of warnings, which may exceed `warnings.len()`
    pub warning_count: usize,
}

impl RenderResponse {
    /// Validate a raw HTTP answer
    ///
    /// `header` looks a header up by name and returns its value, if present.
    pub fn from_parts<F>(status: u16, body: &str, header: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !(200..300).contains(&status) {
            let message = if body.trim().is_empty() { "server error".to_string() } else { body.to_string() };
            return Err(EditorError::Server { status, message });
        }

        let xml = body.trim_start_matches('\u{feff}').trim();
        if !xml.starts_with("<?xml") && !xml.starts_with("<score-partwise") {
            return Err(EditorError::UnexpectedResponse("body is not MusicXML".to_string()));
        }

        let line_map = match header(LINE_MAP_HEADER) {
            Some(raw) => parse_line_map(&raw),
            None => {
                log::warn!("render: no {} header in response", LINE_MAP_HEADER);
                LineMap::new()
            }
        };

        let warnings: Vec<String> = header(WARNINGS_HEADER)
            .map(|raw| {
                raw.split("; ")
                    .map(str::trim)
                    .filter(|w| !w.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let warning_count = header(WARNINGS_COUNT_HEADER)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(warnings.len());

        log::info!(
            "render: {} bytes of MusicXML, {} mapped id(s), {} warning(s)",
            xml.len(),
            line_map.len(),
            warning_count
        );
        Ok(Self {
            xml: xml.to_string(),
            line_map,
            warnings,
            warning_count,
        })
    }
}

/// Parse the id → line header; malformed JSON yields an empty map
pub fn parse_line_map(raw: &str) -> LineMap {
    match serde_json::from_str::<LineMap>(raw) {
        Ok(map) => map,
        Err(e) => {
            log::error!("render: malformed {} header: {}", LINE_MAP_HEADER, e);
            LineMap::new()
        }
    }
}
