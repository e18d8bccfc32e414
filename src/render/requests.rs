//! Request and response bodies of the score service

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::edit::EditMap;

pub const RENDER_XML: &str = "/render-xml";
pub const EXPORT_XML: &str = "/export-xml";
pub const EXPORT_MIDI: &str = "/export-midi";
pub const VALIDATE_CHORD: &str = "/validate-chord";
pub const VALIDATE_NOTE: &str = "/validate-note";
pub const APPLY_EDITS_XML: &str = "/apply-edits-xml";

/// Body of `/render-xml` and `/export-xml`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProgramRequest {
    pub code: String,
}

impl ProgramRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// Body of `/export-midi`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MidiExportRequest {
    pub code: String,
    /// Add an accompaniment track generated from the chord symbols
    pub include_chords: bool,
    /// `auto`, `whole`, `half` or `quarter`
    pub chord_rhythm: String,
    pub chord_octave: u8,
    /// 0.0 to 1.0
    pub chord_velocity: f64,
}

impl MidiExportRequest {
    pub fn new(code: impl Into<String>, include_chords: bool) -> Self {
        Self {
            code: code.into(),
            include_chords,
            chord_rhythm: "auto".to_string(),
            chord_octave: 3,
            chord_velocity: 0.5,
        }
    }
}

/// Body of `/validate-chord` and `/validate-note`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ValidateRequest {
    pub text: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ValidateResponse {
    pub valid: bool,
    /// Normalized spelling when it differs from the input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Edit as sent to `/apply-edits-xml`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TenthsEdit {
    pub x_tenths: i64,
    pub y_tenths: i64,
    pub scale: f64,
}

/// Body of `/apply-edits-xml`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ApplyEditsRequest {
    pub xml_content: String,
    pub edits: std::collections::BTreeMap<String, TenthsEdit>,
}

impl ApplyEditsRequest {
    pub fn new(xml: impl Into<String>, edits: &EditMap) -> Self {
        Self {
            xml_content: xml.into(),
            edits: edits
                .iter()
                .map(|(id, e)| {
                    let tenths = TenthsEdit {
                        x_tenths: e.x_tenths,
                        y_tenths: e.y_tenths,
                        scale: e.scale,
                    };
                    (id.clone(), tenths)
                })
                .collect(),
        }
    }
}

/// Download name for an exported score, e.g. `score_edited_20240131_154502.musicxml`
pub fn export_file_name(now: NaiveDateTime) -> String {
    format!("score_edited_{}.musicxml", now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::edit::EditRecord;
    use chrono::NaiveDate;

    #[test]
    fn midi_request_defaults() {
        let json = serde_json::to_value(MidiExportRequest::new("s = 1", true)).unwrap();
        assert_eq!(json["include_chords"], true);
        assert_eq!(json["chord_rhythm"], "auto");
        assert_eq!(json["chord_octave"], 3);
        assert_eq!(json["chord_velocity"], 0.5);
    }

    #[test]
    fn validate_response_tolerates_missing_fields() {
        let resp: ValidateResponse = serde_json::from_str(r#"{"valid": true}"#).unwrap();
        assert!(resp.valid);
        assert_eq!(resp.normalized, None);
        let resp: ValidateResponse = serde_json::from_str(r#"{"valid": false, "error": "bad"}"#).unwrap();
        assert_eq!(resp.error.as_deref(), Some("bad"));
    }

    #[test]
    fn apply_edits_body_uses_tenths() {
        let mut edits = EditMap::new();
        edits.insert("rit.-0".into(), EditRecord::at(4.0, 2.0, 2.5));
        let json = serde_json::to_value(ApplyEditsRequest::new("<x/>", &edits)).unwrap();
        assert_eq!(json["xml_content"], "<x/>");
        assert_eq!(json["edits"]["rit.-0"]["xTenths"], 10);
        assert_eq!(json["edits"]["rit.-0"]["yTenths"], 5);
    }

    #[test]
    fn export_name_is_timestamped() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap().and_hms_opt(15, 45, 2).unwrap();
        assert_eq!(export_file_name(now), "score_edited_20240131_154502.musicxml");
    }
}
