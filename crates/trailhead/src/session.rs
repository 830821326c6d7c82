//! The frame-driven session object.

use trailhead_core::{ConceptId, Curriculum, Progress};
use trailhead_layout::{Point, Simulation, SimulationOptions, Viewport};
use trailhead_render::Scene;
use trailhead_render::hit::pick_body;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub viewport: Viewport,
    /// Node circle radius, shared by hit-testing and rendering.
    pub node_radius: f64,
    /// Pointer travel beyond this distance turns a press into a drag
    /// (primary) or cancels the click (secondary).
    pub drag_slop: f64,
    pub simulation: SimulationOptions,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            node_radius: 26.0,
            drag_slop: 4.0,
            simulation: SimulationOptions::default(),
        }
    }
}

/// An in-flight pointer press, from press to release.
#[derive(Debug, Clone)]
struct PointerCapture {
    index: usize,
    button: PointerButton,
    origin: Point,
    /// Set once the pointer travels beyond the slop radius; from then on the
    /// gesture is a drag (primary) or an abandoned click (secondary).
    moved: bool,
}

/// One interactive pathway: learner progress, the layout simulation, and
/// pointer state, driven by the host a frame at a time.
///
/// Single-threaded and cooperative: [`frame`](Self::frame) runs once per
/// display frame, and pointer callbacks interleave between frames on the
/// same thread. Nothing here blocks or spawns. Dragging always wins over
/// the simulation: the dragged node is pinned and follows the pointer while
/// everything else keeps settling around it.
#[derive(Debug, Clone)]
pub struct Session {
    options: SessionOptions,
    progress: Progress,
    sim: Simulation,
    hovered: Option<ConceptId>,
    pointer: Option<PointerCapture>,
}

impl Session {
    fn frame_timing_enabled() -> bool {
        static ENABLED: std::sync::OnceLock<bool> = std::sync::OnceLock::new();
        *ENABLED.get_or_init(|| {
            match std::env::var("TRAILHEAD_FRAME_TIMING").as_deref() {
                Ok("1") | Ok("true") => true,
                _ => false,
            }
        })
    }

    pub fn new(curriculum: Curriculum, options: SessionOptions) -> Self {
        let progress = Progress::new(curriculum);
        let sim = Simulation::new(
            progress.curriculum(),
            options.viewport,
            options.simulation.clone(),
        );
        Self {
            options,
            progress,
            sim,
            hovered: None,
            pointer: None,
        }
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Mutable learner state, for hosts that drive progress programmatically
    /// (e.g. a CLI selecting a goal). All mutations stay gated.
    pub fn progress_mut(&mut self) -> &mut Progress {
        &mut self.progress
    }

    pub fn curriculum(&self) -> &Curriculum {
        self.progress.curriculum()
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn viewport(&self) -> Viewport {
        self.sim.viewport()
    }

    pub fn hovered(&self) -> Option<ConceptId> {
        self.hovered
    }

    pub fn is_dragging(&self) -> bool {
        self.pointer
            .as_ref()
            .is_some_and(|c| c.moved && c.button == PointerButton::Primary)
    }

    /// Advances the simulation one tick and snapshots the scene. Stepping
    /// goes quiet once the layout budget is spent; the scene is still rebuilt
    /// every frame so progress and hover changes always show.
    pub fn frame(&mut self) -> Scene {
        let timing_enabled = Self::frame_timing_enabled();
        let total_start = timing_enabled.then(std::time::Instant::now);

        let step_start = timing_enabled.then(std::time::Instant::now);
        self.sim.step();
        let step = step_start.map(|s| s.elapsed());

        let scene_start = timing_enabled.then(std::time::Instant::now);
        let scene = Scene::build(
            &self.progress,
            &self.sim,
            self.hovered,
            self.options.node_radius,
        );
        let build = scene_start.map(|s| s.elapsed());

        if let Some(start) = total_start {
            eprintln!(
                "[frame-timing] total={:?} step={:?} scene={:?} nodes={} settled={}",
                start.elapsed(),
                step.unwrap_or_default(),
                build.unwrap_or_default(),
                scene.nodes.len(),
                self.sim.is_settled(),
            );
        }
        scene
    }

    /// Pointer pressed. Captures the node under the pointer (if any); what
    /// the press means is decided at release time, once slop is known.
    pub fn press(&mut self, p: Point, button: PointerButton) {
        // A second press while one is captured means the host lost a release
        // somewhere; drop the stale capture cleanly.
        if let Some(stale) = self.pointer.take() {
            if stale.moved && stale.button == PointerButton::Primary {
                self.sim.release(stale.index);
            }
        }

        self.pointer = self.pick_at(p).map(|index| PointerCapture {
            index,
            button,
            origin: p,
            moved: false,
        });
        self.hovered = self.concept_at(p);
    }

    /// Pointer moved. Outside a press this tracks hover; inside a primary
    /// press it promotes to a drag beyond the slop radius and then drives the
    /// pinned node directly.
    pub fn move_to(&mut self, p: Point) {
        if let Some(capture) = self.pointer.as_mut() {
            if !capture.moved && (p - capture.origin).length() > self.options.drag_slop {
                capture.moved = true;
                if capture.button == PointerButton::Primary {
                    self.sim.pin(capture.index);
                    tracing::trace!(index = capture.index, "drag started");
                }
            }
            if capture.moved && capture.button == PointerButton::Primary {
                let index = capture.index;
                self.sim.set_position(index, p);
            }
        }
        self.hovered = self.concept_at(p);
    }

    /// Pointer released. A press that never left the slop radius is a click:
    /// primary toggles `known` (gated), secondary toggles the goal. A drag
    /// just hands the node back to the simulation.
    pub fn release(&mut self, p: Point) {
        let Some(capture) = self.pointer.take() else {
            return;
        };

        if capture.moved {
            if capture.button == PointerButton::Primary {
                self.sim.release(capture.index);
            }
        } else {
            let id = self.progress.curriculum().concepts()[capture.index].id;
            match capture.button {
                PointerButton::Primary => {
                    let target = !self.progress.is_known(id);
                    self.progress.set_known(id, target);
                }
                PointerButton::Secondary => {
                    self.progress.set_goal(id);
                }
            }
        }
        self.hovered = self.concept_at(p);
    }

    /// Tracks the host surface: width follows the container, height stays as
    /// configured. Resize reinitializes the layout (fresh scatter, fresh step
    /// budget) and cancels any in-flight gesture; learner state is untouched.
    pub fn resize(&mut self, width: f64) {
        self.cancel_pointer();
        let height = self.sim.viewport().height;
        self.sim.resize(Viewport::new(width, height));
    }

    /// Everything back to its initial default: layout rescattered from the
    /// seed, only the initially-known concepts known, no goal, no gesture.
    pub fn reset(&mut self) {
        self.cancel_pointer();
        self.progress.reset();
        self.sim.restart();
    }

    fn cancel_pointer(&mut self) {
        if let Some(capture) = self.pointer.take() {
            if capture.moved && capture.button == PointerButton::Primary {
                self.sim.release(capture.index);
            }
        }
        self.hovered = None;
    }

    fn pick_at(&self, p: Point) -> Option<usize> {
        pick_body(&self.sim, self.options.node_radius, p)
    }

    fn concept_at(&self, p: Point) -> Option<ConceptId> {
        self.pick_at(p)
            .map(|i| self.progress.curriculum().concepts()[i].id)
    }
}
