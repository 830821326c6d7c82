#![forbid(unsafe_code)]

//! Force-directed layout simulation for prerequisite graphs.
//!
//! [`Simulation`] owns one body per curriculum concept and advances them a
//! tick at a time: pairwise repulsion, linear edge attraction, and a vertical
//! bias that pulls each body toward the row for its prerequisite depth. The
//! run is budgeted, not converged: after a fixed number of ticks `step()`
//! goes quiet until the simulation is restarted. Scatter positions come from
//! a seedable generator, so a seed fully determines a settle.

pub mod geom;
mod rng;
pub mod sim;

pub use geom::{Point, Unit, Vector, point, vector};
pub use sim::{Body, Simulation, SimulationOptions, Viewport};
