//! Id/line linker
//!
//! After every render the rendered texts are tied back to the program lines
//! that produced them, so that later edits know which statement to rewrite.

pub mod assign;
pub mod scan;

pub use assign::{
    assign_fallback_ids, assign_stable_ids, link_from_backend, map_notes_globally, LineMap, StableEntry,
    StableIdMap,
};
pub use scan::{measure_for_line, scan_program, Declaration};
