#![forbid(unsafe_code)]

//! Curriculum model + prerequisite state engine (headless).
//!
//! `trailhead-core` holds the static side of a learning-pathway sim: the
//! concept table and the prerequisite DAG derived from it. The mutable
//! learning state (`known` / `unlockable` / goal / study set) layers on top.
//! Layout lives in `trailhead-layout` and rendering in `trailhead-render`;
//! the interactive session loop is in the `trailhead` facade.
//!
//! Design goals:
//! - the concept table is fixed at construction and validated once
//! - every derived flag comes out of one explicit recompute pass
//! - mutations that the teaching rules forbid are no-ops, never errors

pub mod curriculum;
pub mod error;
pub mod progress;

pub use curriculum::{
    Concept, ConceptId, ConceptSpec, Curriculum, CurriculumSpec, arithmetic_basics,
};
pub use error::{Error, Result};
pub use progress::Progress;
