#![forbid(unsafe_code)]

//! `trailhead` is a headless learning-pathway visualization engine.
//!
//! A curriculum is a prerequisite DAG of concepts. [`Session`] bundles
//! learner progress with the force-layout simulation and per-frame scene
//! building: the host calls [`Session::frame`] once per display frame and
//! forwards pointer events; everything else (gated learning, goal paths,
//! drag pinning, hover) happens inside.
//!
//! The crates underneath are usable on their own:
//! - `trailhead-core`: curriculum model + prerequisite state engine
//! - `trailhead-layout`: budgeted force simulation
//! - `trailhead-render`: scenes, hit-testing, SVG

mod session;

pub use session::{PointerButton, Session, SessionOptions};
pub use trailhead_core::*;

pub mod layout {
    pub use trailhead_layout::{
        Body, Point, Simulation, SimulationOptions, Vector, Viewport, point, vector,
    };
}

pub mod render {
    pub use trailhead_render::{
        NodeTier, Scene, SceneEdge, SceneNode, SvgRenderOptions, Theme, pick, render_svg,
    };
}
