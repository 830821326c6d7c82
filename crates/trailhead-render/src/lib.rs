#![forbid(unsafe_code)]

//! Scene building, hit-testing, and SVG output for learning-pathway sessions.

pub mod hit;
pub mod scene;
pub mod svg;

pub use hit::{pick, pick_body};
pub use scene::{NodeTier, Scene, SceneEdge, SceneNode};
pub use svg::{SvgRenderOptions, Theme, render_svg};
