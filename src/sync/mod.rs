//! Code synchronizer
//!
//! Keeps the music21 program in step with visual edits: moved, scaled and
//! retyped elements get their statements rewritten, deleted ones are
//! commented out, and annotations created in the editor get new statements.
//! All matching is textual; the program is never executed here.

pub mod deletions;
pub mod insert;
pub mod locate;
pub mod program;
pub mod rewrite;

pub use deletions::comment_out_deleted;
pub use insert::{insert_new_element, variable_name};
pub use locate::{locate, Location, StatementKind};
pub use program::Program;
pub use rewrite::update_element;
