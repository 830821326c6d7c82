//! The budgeted force simulation.

use trailhead_core::Curriculum;

use crate::geom::{Point, Vector, point, vector};
use crate::rng::XorShift64Star;

/// The rectangle positions are confined to, in layout units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 520.0,
        }
    }
}

/// Tuning knobs for the simulation. The defaults settle a few dozen nodes
/// into a readable top-to-bottom hierarchy inside the default viewport.
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    /// Seed for deterministic scatter. Coerced to 1 internally when 0.
    pub random_seed: u64,
    /// Pairwise push, applied as `repulsion / d²` per unordered pair.
    pub repulsion: f64,
    /// Linear spring pull per edge, applied as `d * attraction`. No rest
    /// length: connected bodies are always pulled, repulsion holds them
    /// apart.
    pub attraction: f64,
    /// Gain of the vertical pull toward a body's depth row.
    pub layering: f64,
    /// Velocity multiplier per tick, `< 1`.
    pub damping: f64,
    /// Ticks per run. After this many steps `step()` is a no-op until
    /// `restart`. A fixed budget, not a convergence threshold: the settle
    /// time is part of the visual behavior.
    pub max_steps: u32,
    /// Inset from the viewport edge that positions clamp to.
    pub margin: f64,
    /// Y of the depth-0 row.
    pub top_margin: f64,
    /// Vertical distance between consecutive depth rows.
    pub layer_gap: f64,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            random_seed: 0,
            repulsion: 6000.0,
            attraction: 0.02,
            layering: 0.05,
            damping: 0.9,
            max_steps: 200,
            margin: 40.0,
            top_margin: 60.0,
            layer_gap: 80.0,
        }
    }
}

/// One simulated node. Order matches the curriculum's table order.
#[derive(Debug, Clone)]
pub struct Body {
    pos: Point,
    vel: Vector,
    depth: u32,
    pinned: bool,
}

impl Body {
    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn velocity(&self) -> Vector {
        self.vel
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }
}

/// Budgeted force-directed simulation over a curriculum's concepts.
///
/// Construction scatters bodies across the viewport from the seed and arms
/// the step budget; the caller then drives it one [`step`](Self::step) per
/// display frame. The graph itself never changes after construction; only
/// the per-body motion state and pins do.
#[derive(Debug, Clone)]
pub struct Simulation {
    bodies: Vec<Body>,
    /// `(prereq, dependent)` index pairs in table order.
    edges: Vec<(usize, usize)>,
    options: SimulationOptions,
    viewport: Viewport,
    rng: XorShift64Star,
    steps_taken: u32,
}

impl Simulation {
    pub fn new(curriculum: &Curriculum, viewport: Viewport, options: SimulationOptions) -> Self {
        let bodies = curriculum
            .concepts()
            .iter()
            .map(|c| Body {
                pos: point(0.0, 0.0),
                vel: vector(0.0, 0.0),
                depth: c.depth,
                pinned: false,
            })
            .collect();
        let edges = curriculum
            .edges()
            .iter()
            .filter_map(|(p, c)| Some((curriculum.index_of(*p)?, curriculum.index_of(*c)?)))
            .collect();
        let mut sim = Self {
            bodies,
            edges,
            options,
            viewport,
            rng: XorShift64Star::new(1),
            steps_taken: 0,
        };
        sim.restart();
        sim
    }

    /// Bodies in table order.
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn steps_taken(&self) -> u32 {
        self.steps_taken
    }

    /// Whether the step budget is spent.
    pub fn is_settled(&self) -> bool {
        self.steps_taken >= self.options.max_steps
    }

    /// Advances one tick: accumulate repulsion, attraction and layering into
    /// velocity, damp, integrate, clamp to the viewport. A no-op once the
    /// budget is spent.
    pub fn step(&mut self) {
        if self.is_settled() {
            return;
        }

        let n = self.bodies.len();

        // Pairwise repulsion over every unordered pair. O(n²) on purpose: n
        // is at most a few dozen here, and a grid pass would reorder the
        // floating-point accumulation and change settles for a given seed.
        for i in 0..n {
            for j in (i + 1)..n {
                let delta = self.bodies[j].pos - self.bodies[i].pos;
                // Clamp keeps the magnitude finite; exactly coincident bodies
                // feel nothing, the scatter jitter keeps pairs distinct.
                let dist = delta.length().max(1.0);
                let dir = delta / dist;
                let push = self.options.repulsion / (dist * dist);
                if !self.bodies[i].pinned {
                    self.bodies[i].vel -= dir * push;
                }
                if !self.bodies[j].pinned {
                    self.bodies[j].vel += dir * push;
                }
            }
        }

        // Edge attraction: linear spring toward the other endpoint.
        for &(a, b) in &self.edges {
            let delta = self.bodies[b].pos - self.bodies[a].pos;
            let dist = delta.length();
            if dist == 0.0 {
                continue;
            }
            let dir = delta / dist;
            let pull = dist * self.options.attraction;
            if !self.bodies[a].pinned {
                self.bodies[a].vel += dir * pull;
            }
            if !self.bodies[b].pinned {
                self.bodies[b].vel -= dir * pull;
            }
        }

        // Layering bias: vertical pull toward this body's depth row.
        for body in &mut self.bodies {
            if body.pinned {
                continue;
            }
            let row_y = self.options.top_margin + f64::from(body.depth) * self.options.layer_gap;
            body.vel.y += (row_y - body.pos.y) * self.options.layering;
        }

        // Damp, integrate, confine. Pinned bodies hold still; the passes
        // above still let them push and pull their neighbors.
        let (min_x, max_x, min_y, max_y) = self.bounds();
        for body in &mut self.bodies {
            if body.pinned {
                continue;
            }
            body.vel *= self.options.damping;
            body.pos += body.vel;
            body.pos.x = body.pos.x.clamp(min_x, max_x);
            body.pos.y = body.pos.y.clamp(min_y, max_y);
        }

        self.steps_taken += 1;
        if self.is_settled() {
            tracing::trace!(steps = self.steps_taken, "layout settled");
        }
    }

    /// Reseeds the generator, rescatters every body, clears pins, and re-arms
    /// the step budget. The same options always yield the same scatter.
    pub fn restart(&mut self) {
        self.rng = XorShift64Star::new(self.options.random_seed);
        let (min_x, max_x, min_y, max_y) = self.bounds();
        for body in &mut self.bodies {
            body.pos = point(
                min_x + self.rng.next_f64_unit() * (max_x - min_x),
                min_y + self.rng.next_f64_unit() * (max_y - min_y),
            );
            body.vel = vector(0.0, 0.0);
            body.pinned = false;
        }
        self.steps_taken = 0;
        tracing::debug!(
            seed = self.options.random_seed,
            width = self.viewport.width,
            height = self.viewport.height,
            bodies = self.bodies.len(),
            "layout restarted"
        );
    }

    /// Swaps the viewport and restarts. Resize is reinitialize, not rescale:
    /// positions are rescattered rather than mapped into the new rectangle.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.restart();
    }

    /// Freezes a body in place until [`release`](Self::release). Its velocity
    /// is dropped so releasing never flings it. Out-of-range indices are
    /// ignored.
    pub fn pin(&mut self, index: usize) {
        if let Some(body) = self.bodies.get_mut(index) {
            body.pinned = true;
            body.vel = vector(0.0, 0.0);
        }
    }

    /// Hands a body back to the simulation. Out-of-range indices are ignored.
    pub fn release(&mut self, index: usize) {
        if let Some(body) = self.bodies.get_mut(index) {
            body.pinned = false;
        }
    }

    /// Moves a body directly, clamped to the viewport, dropping its velocity.
    /// This is the drag path: it works whether or not the body is pinned and
    /// whether or not the budget is spent. Out-of-range indices are ignored.
    pub fn set_position(&mut self, index: usize, pos: Point) {
        let (min_x, max_x, min_y, max_y) = self.bounds();
        if let Some(body) = self.bodies.get_mut(index) {
            body.pos = point(pos.x.clamp(min_x, max_x), pos.y.clamp(min_y, max_y));
            body.vel = vector(0.0, 0.0);
        }
    }

    /// Clamp rectangle as `(min_x, max_x, min_y, max_y)`. Degenerate
    /// viewports collapse to a point rather than inverting the range.
    fn bounds(&self) -> (f64, f64, f64, f64) {
        let m = self.options.margin;
        let max_x = (self.viewport.width - m).max(m);
        let max_y = (self.viewport.height - m).max(m);
        (m, max_x, m, max_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailhead_core::{ConceptId, ConceptSpec, Curriculum, CurriculumSpec, arithmetic_basics};

    fn chain(names: &[&str]) -> Curriculum {
        let concepts = names
            .iter()
            .enumerate()
            .map(|(i, name)| ConceptSpec {
                id: ConceptId(i as u32),
                name: (*name).to_string(),
                prereqs: if i == 0 {
                    Vec::new()
                } else {
                    vec![ConceptId(i as u32 - 1)]
                },
            })
            .collect();
        Curriculum::new(CurriculumSpec {
            concepts,
            initially_known: Vec::new(),
        })
        .unwrap()
    }

    fn opts(seed: u64, max_steps: u32) -> SimulationOptions {
        SimulationOptions {
            random_seed: seed,
            max_steps,
            ..SimulationOptions::default()
        }
    }

    fn positions(sim: &Simulation) -> Vec<(f64, f64)> {
        sim.bodies().iter().map(|b| (b.pos().x, b.pos().y)).collect()
    }

    #[test]
    fn budget_spends_then_steps_go_quiet() {
        let mut sim = Simulation::new(&arithmetic_basics(), Viewport::default(), opts(3, 40));
        for _ in 0..40 {
            assert!(!sim.is_settled());
            sim.step();
        }
        assert!(sim.is_settled());
        let settled = positions(&sim);
        for _ in 0..10 {
            sim.step();
        }
        assert_eq!(positions(&sim), settled, "post-budget steps must not move anything");
        assert_eq!(sim.steps_taken(), 40);
    }

    #[test]
    fn same_seed_same_settle() {
        let cur = arithmetic_basics();
        let mut a = Simulation::new(&cur, Viewport::default(), opts(11, 60));
        let mut b = Simulation::new(&cur, Viewport::default(), opts(11, 60));
        for _ in 0..60 {
            a.step();
            b.step();
        }
        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn different_seeds_scatter_differently() {
        let cur = arithmetic_basics();
        let a = Simulation::new(&cur, Viewport::default(), opts(11, 60));
        let b = Simulation::new(&cur, Viewport::default(), opts(12, 60));
        assert_ne!(positions(&a), positions(&b));
    }

    #[test]
    fn positions_stay_inside_the_margin() {
        let viewport = Viewport::new(600.0, 400.0);
        let mut sim = Simulation::new(&arithmetic_basics(), viewport, opts(5, 60));
        for _ in 0..60 {
            sim.step();
            for body in sim.bodies() {
                let p = body.pos();
                assert!(p.x >= 40.0 && p.x <= 560.0, "x escaped: {}", p.x);
                assert!(p.y >= 40.0 && p.y <= 360.0, "y escaped: {}", p.y);
            }
        }
    }

    #[test]
    fn first_tick_velocity_is_damped_layering_pull() {
        // A single body feels only the layering force, so the first tick is
        // exactly damping * gain * (row - y).
        let mut sim = Simulation::new(&chain(&["only"]), Viewport::default(), opts(9, 40));
        let o = SimulationOptions::default();
        let y0 = sim.bodies()[0].pos().y;
        sim.step();
        let expected = o.damping * (o.top_margin - y0) * o.layering;
        let vel = sim.bodies()[0].velocity();
        assert!((vel.y - expected).abs() < 1e-12, "vy {} vs {}", vel.y, expected);
        assert_eq!(vel.x, 0.0);
    }

    #[test]
    fn body_on_its_row_never_picks_up_speed() {
        // The row is a fixed point: a body with no velocity on it feels no
        // force, and damping alone never sets one moving.
        let mut sim = Simulation::new(&chain(&["only"]), Viewport::default(), opts(9, 200));
        let o = SimulationOptions::default();
        let rest = point(300.0, o.top_margin);
        sim.set_position(0, rest);
        for _ in 0..20 {
            sim.step();
            assert_eq!(sim.bodies()[0].velocity(), vector(0.0, 0.0));
            assert_eq!(sim.bodies()[0].pos(), rest);
        }
    }

    #[test]
    fn displaced_body_comes_to_rest_within_the_budget() {
        // Damping bleeds the layering oscillation away; the budget ends with
        // the body back on its row and its velocity gone.
        let mut sim = Simulation::new(&chain(&["only"]), Viewport::default(), opts(9, 200));
        let o = SimulationOptions::default();
        sim.set_position(0, point(300.0, 300.0));
        while !sim.is_settled() {
            sim.step();
        }
        let body = &sim.bodies()[0];
        assert_eq!(body.pos().x, 300.0, "layering never pushes sideways");
        assert!((body.pos().y - o.top_margin).abs() < 0.1, "off row: {}", body.pos().y);
        assert!(body.velocity().length() < 0.1, "still moving: {:?}", body.velocity());
    }

    #[test]
    fn deeper_bodies_settle_lower() {
        let mut sim = Simulation::new(&chain(&["a", "b", "c"]), Viewport::default(), opts(2, 200));
        while !sim.is_settled() {
            sim.step();
        }
        let ys: Vec<f64> = sim.bodies().iter().map(|b| b.pos().y).collect();
        assert!(ys[0] < ys[1] && ys[1] < ys[2], "rows out of order: {ys:?}");
    }

    #[test]
    fn pinned_body_holds_still_but_neighbors_keep_moving() {
        let mut sim = Simulation::new(&arithmetic_basics(), Viewport::default(), opts(4, 200));
        sim.pin(0);
        sim.set_position(0, point(400.0, 260.0));
        let before = positions(&sim);
        for _ in 0..20 {
            sim.step();
        }
        let after = positions(&sim);
        assert_eq!(after[0], (400.0, 260.0), "pinned body moved");
        assert_ne!(after[1..], before[1..], "the rest of the graph froze");

        // Released, the body feels the field again on the next tick.
        sim.release(0);
        sim.step();
        assert_ne!(positions(&sim)[0], (400.0, 260.0));
    }

    #[test]
    fn set_position_clamps_into_the_viewport() {
        let mut sim =
            Simulation::new(&arithmetic_basics(), Viewport::new(600.0, 400.0), opts(4, 40));
        sim.set_position(2, point(-1000.0, 9999.0));
        assert_eq!(sim.bodies()[2].pos(), point(40.0, 360.0));
    }

    #[test]
    fn out_of_range_indices_are_ignored() {
        let mut sim = Simulation::new(&arithmetic_basics(), Viewport::default(), opts(4, 40));
        let before = positions(&sim);
        sim.pin(99);
        sim.release(99);
        sim.set_position(99, point(1.0, 1.0));
        assert_eq!(positions(&sim), before);
    }

    #[test]
    fn restart_reproduces_a_fresh_instance() {
        let cur = arithmetic_basics();
        let mut sim = Simulation::new(&cur, Viewport::default(), opts(21, 40));
        for _ in 0..15 {
            sim.step();
        }
        sim.pin(3);
        sim.set_position(3, point(100.0, 100.0));
        sim.restart();

        let fresh = Simulation::new(&cur, Viewport::default(), opts(21, 40));
        assert_eq!(positions(&sim), positions(&fresh));
        assert_eq!(sim.steps_taken(), 0);
        assert!(!sim.bodies()[3].is_pinned(), "restart must clear pins");
    }

    #[test]
    fn resize_rescatters_into_the_new_rectangle() {
        let mut sim = Simulation::new(&arithmetic_basics(), Viewport::default(), opts(6, 40));
        for _ in 0..40 {
            sim.step();
        }
        sim.resize(Viewport::new(300.0, 200.0));
        assert_eq!(sim.steps_taken(), 0);
        assert!(!sim.is_settled());
        for body in sim.bodies() {
            let p = body.pos();
            assert!(p.x >= 40.0 && p.x <= 260.0);
            assert!(p.y >= 40.0 && p.y <= 160.0);
        }
    }
}
