//! Per-frame view model derived from learner state and body positions.

use serde::Serialize;
use trailhead_core::{ConceptId, Progress};
use trailhead_layout::Simulation;

/// Visual tier of a node, in increasing distance from the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeTier {
    Known,
    Unlockable,
    Locked,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode {
    pub id: ConceptId,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub tier: NodeTier,
    pub is_goal: bool,
    pub on_path: bool,
    pub hovered: bool,
}

/// One prerequisite edge, endpoint coordinates already resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneEdge {
    pub from: ConceptId,
    pub to: ConceptId,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub on_path: bool,
}

/// Everything a renderer needs for one frame, nodes and edges in table
/// order. Hosts can hand it to [`crate::render_svg`], draw it natively, or
/// serialize it (camelCase JSON) across an embedding boundary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub node_radius: f64,
    pub nodes: Vec<SceneNode>,
    pub edges: Vec<SceneEdge>,
}

impl Scene {
    /// Snapshots the current frame. Derived state (tiers, goal path) is
    /// recomputed here, once per frame, rather than cached across frames.
    ///
    /// `progress` and `sim` are expected to come from the same curriculum;
    /// anything dangling is skipped rather than reported.
    pub fn build(
        progress: &Progress,
        sim: &Simulation,
        hovered: Option<ConceptId>,
        node_radius: f64,
    ) -> Self {
        let curriculum = progress.curriculum();
        let goal = progress.goal();

        let mut on_path = vec![false; curriculum.len()];
        for id in progress.path_to_goal() {
            if let Some(i) = curriculum.index_of(id) {
                on_path[i] = true;
            }
        }

        let nodes = curriculum
            .concepts()
            .iter()
            .zip(sim.bodies())
            .enumerate()
            .map(|(i, (concept, body))| {
                let tier = if progress.known()[i] {
                    NodeTier::Known
                } else if progress.unlockable()[i] {
                    NodeTier::Unlockable
                } else {
                    NodeTier::Locked
                };
                SceneNode {
                    id: concept.id,
                    label: concept.name.clone(),
                    x: body.pos().x,
                    y: body.pos().y,
                    tier,
                    is_goal: goal == Some(concept.id),
                    on_path: on_path[i],
                    hovered: hovered == Some(concept.id),
                }
            })
            .collect();

        let mut edges = Vec::with_capacity(curriculum.edges().len());
        for (from, to) in curriculum.edges() {
            let Some(fi) = curriculum.index_of(*from) else {
                continue;
            };
            let Some(ti) = curriculum.index_of(*to) else {
                continue;
            };
            let (Some(fb), Some(tb)) = (sim.bodies().get(fi), sim.bodies().get(ti)) else {
                continue;
            };
            // An edge joins the goal path once its dependent end is on it;
            // the prereq end may be on the path or already behind the
            // learner.
            let edge_on_path = on_path[ti] && (on_path[fi] || progress.known()[fi]);
            edges.push(SceneEdge {
                from: *from,
                to: *to,
                x1: fb.pos().x,
                y1: fb.pos().y,
                x2: tb.pos().x,
                y2: tb.pos().y,
                on_path: edge_on_path,
            });
        }

        let viewport = sim.viewport();
        Self {
            width: viewport.width,
            height: viewport.height,
            node_radius,
            nodes,
            edges,
        }
    }
}
