//! Render driver
//!
//! Everything between the program text and an editable scene: request
//! bodies for the score service, validation of its answers, reading the
//! rendered SVG, post-render cleanup and MusicXML rewriting. Network calls
//! themselves live in the WASM API layer.

pub mod cleanup;
pub mod musicxml;
pub mod requests;
pub mod response;
pub mod svg_scene;

pub use cleanup::{remove_duplicate_texts, staff_children};
pub use musicxml::{apply_tenths_edits, dedupe_direction_words};
pub use requests::{export_file_name, MidiExportRequest, ProgramRequest, ValidateRequest, ValidateResponse};
pub use response::RenderResponse;
pub use svg_scene::{estimated_text_box, parse_svg, ParsedSvg};
