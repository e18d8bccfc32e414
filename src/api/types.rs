//! Shared types for the WASM API
//!
//! Result shapes that combine several core values for a single round trip.

use serde::{Deserialize, Serialize};

use crate::editor::MountReport;
use crate::models::EditOutcome;

/// Result of `renderProgram`
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RenderResult {
    /// MusicXML for the notation renderer
    pub xml: String,
    pub warnings: Vec<String>,
    pub warning_count: usize,
    /// Number of ids the service mapped to program lines
    pub mapped_ids: usize,
}

/// Result of `mountRenderedScore` and `remountAfterReload`
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MountResult {
    #[serde(flatten)]
    pub report: MountReport,
    /// Whether stored edits were found and re-applied
    pub restored: bool,
}

/// Result of `beginTextEdit`
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TextEditStart {
    /// Current text, to prefill the input
    pub text: String,
    pub outcome: EditOutcome,
}

/// Result of `copySelection`
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CopyResult {
    pub copied: usize,
}

/// Result of `exportMusicXml`
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub file_name: String,
    pub xml: String,
}
