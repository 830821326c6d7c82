//! Pointer-to-node resolution.

use trailhead_core::ConceptId;
use trailhead_layout::{Point, Simulation};

use crate::scene::Scene;

/// Topmost scene node whose circle contains `p`, or `None`. Nodes draw in
/// table order, so the scan runs back-to-front and later nodes win overlaps.
pub fn pick(scene: &Scene, p: Point) -> Option<ConceptId> {
    let r2 = scene.node_radius * scene.node_radius;
    scene
        .nodes
        .iter()
        .rev()
        .find(|n| {
            let dx = n.x - p.x;
            let dy = n.y - p.y;
            dx * dx + dy * dy <= r2
        })
        .map(|n| n.id)
}

/// Same scan against live simulation bodies, for callers that have not built
/// a scene yet (pointer presses land between frames). Returns the table
/// index.
pub fn pick_body(sim: &Simulation, radius: f64, p: Point) -> Option<usize> {
    let r2 = radius * radius;
    sim.bodies()
        .iter()
        .enumerate()
        .rev()
        .find(|(_, b)| (b.pos() - p).square_length() <= r2)
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{NodeTier, SceneNode};
    use trailhead_layout::point;

    fn node(id: u32, x: f64, y: f64) -> SceneNode {
        SceneNode {
            id: ConceptId(id),
            label: format!("n{id}"),
            x,
            y,
            tier: NodeTier::Locked,
            is_goal: false,
            on_path: false,
            hovered: false,
        }
    }

    fn scene(nodes: Vec<SceneNode>) -> Scene {
        Scene {
            width: 800.0,
            height: 520.0,
            node_radius: 20.0,
            nodes,
            edges: Vec::new(),
        }
    }

    #[test]
    fn hit_inside_the_circle_misses_outside() {
        let s = scene(vec![node(0, 100.0, 100.0)]);
        assert_eq!(pick(&s, point(100.0, 100.0)), Some(ConceptId(0)));
        assert_eq!(pick(&s, point(120.0, 120.0)), None, "bbox corner, outside the circle");
        assert_eq!(pick(&s, point(100.0, 120.0)), Some(ConceptId(0)), "on the rim");
        assert_eq!(pick(&s, point(100.0, 120.1)), None);
    }

    #[test]
    fn overlapping_nodes_resolve_to_the_topmost() {
        // Drawn in table order, so the later node covers the earlier one.
        let s = scene(vec![node(0, 100.0, 100.0), node(1, 110.0, 100.0)]);
        assert_eq!(pick(&s, point(105.0, 100.0)), Some(ConceptId(1)));
        assert_eq!(pick(&s, point(85.0, 100.0)), Some(ConceptId(0)));
    }

    #[test]
    fn empty_scene_picks_nothing() {
        let s = scene(Vec::new());
        assert_eq!(pick(&s, point(0.0, 0.0)), None);
    }
}
