//! Headless SVG writer for scenes.

use std::fmt::Write as _;

use crate::scene::{NodeTier, Scene};

/// Colors for the stock pathway look. Hosts that draw scenes natively can
/// read these instead of re-inventing the palette.
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: String,
    pub known_fill: String,
    pub unlockable_fill: String,
    pub locked_fill: String,
    pub node_stroke: String,
    pub edge_stroke: String,
    pub path_stroke: String,
    pub goal_stroke: String,
    pub label_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            known_fill: "#43a06b".to_string(),
            unlockable_fill: "#f2b134".to_string(),
            locked_fill: "#b6bec9".to_string(),
            node_stroke: "#ffffff".to_string(),
            edge_stroke: "#94a3b2".to_string(),
            path_stroke: "#e4572e".to_string(),
            goal_stroke: "#6f42c1".to_string(),
            label_color: "#22303c".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    /// Adds extra space around the scene's viewport in the viewBox.
    pub viewbox_padding: f64,
    /// Optional diagram id used for the root element and marker ids.
    pub diagram_id: Option<String>,
    /// When false, node labels are omitted (dot mode).
    pub include_labels: bool,
    pub theme: Theme,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            viewbox_padding: 8.0,
            diagram_id: None,
            include_labels: true,
            theme: Theme::default(),
        }
    }
}

fn tier_class(tier: NodeTier) -> &'static str {
    match tier {
        NodeTier::Known => "known",
        NodeTier::Unlockable => "unlockable",
        NodeTier::Locked => "locked",
    }
}

/// Renders one scene to a standalone SVG document string.
///
/// The writer is infallible: scenes are already validated, and numeric noise
/// is absorbed by [`fmt`]. Output is a single line, styled via CSS classes so
/// hosts can restyle without re-rendering.
pub fn render_svg(scene: &Scene, options: &SvgRenderOptions) -> String {
    let t = &options.theme;
    let pad = options.viewbox_padding;
    let id_esc = escape_xml(options.diagram_id.as_deref().unwrap_or("pathway"));

    let mut out = String::new();
    let _ = write!(
        &mut out,
        r#"<svg id="{id}" width="100%" xmlns="http://www.w3.org/2000/svg" class="pathwayDiagram" style="background-color: {bg};" viewBox="{x} {y} {w} {h}" role="graphics-document document" aria-roledescription="learning-pathway">"#,
        id = id_esc,
        bg = t.background,
        x = fmt(-pad),
        y = fmt(-pad),
        w = fmt(scene.width + 2.0 * pad),
        h = fmt(scene.height + 2.0 * pad),
    );

    out.push_str("<style>");
    let _ = write!(&mut out, ".edge{{stroke:{};stroke-width:2;}}", t.edge_stroke);
    let _ = write!(
        &mut out,
        ".edge.onPath{{stroke:{};stroke-width:3.5;}}",
        t.path_stroke
    );
    let _ = write!(
        &mut out,
        ".node circle.body{{stroke:{};stroke-width:1.5;}}",
        t.node_stroke
    );
    let _ = write!(&mut out, ".node.known circle.body{{fill:{};}}", t.known_fill);
    let _ = write!(
        &mut out,
        ".node.unlockable circle.body{{fill:{};}}",
        t.unlockable_fill
    );
    let _ = write!(
        &mut out,
        ".node.locked circle.body{{fill:{};fill-opacity:0.8;}}",
        t.locked_fill
    );
    let _ = write!(
        &mut out,
        ".node.onPath circle.body{{stroke:{};}}",
        t.path_stroke
    );
    out.push_str(".node.hovered circle.body{stroke-width:3;}");
    let _ = write!(
        &mut out,
        ".goalRing{{fill:none;stroke:{};stroke-width:2.5;stroke-dasharray:6 4;}}",
        t.goal_stroke
    );
    let _ = write!(
        &mut out,
        r#".label{{font-family:"trebuchet ms",verdana,arial,sans-serif;font-size:13px;text-anchor:middle;fill:{};}}"#,
        t.label_color
    );
    out.push_str("</style>");

    let _ = write!(
        &mut out,
        r#"<defs><marker id="{id}_arrowEnd" class="marker" viewBox="0 0 10 10" refX="9" refY="5" markerUnits="userSpaceOnUse" markerWidth="7" markerHeight="7" orient="auto"><path d="M 0 0 L 10 5 L 0 10 z" style="fill: {fill};"/></marker><marker id="{id}_arrowEndPath" class="marker" viewBox="0 0 10 10" refX="9" refY="5" markerUnits="userSpaceOnUse" markerWidth="7" markerHeight="7" orient="auto"><path d="M 0 0 L 10 5 L 0 10 z" style="fill: {path_fill};"/></marker></defs>"#,
        id = id_esc,
        fill = t.edge_stroke,
        path_fill = t.path_stroke,
    );

    out.push_str(r#"<g class="edges">"#);
    for e in &scene.edges {
        // Trim endpoints to the circle rims so the arrowhead stays visible;
        // pairs too close to trim fall back to center-to-center.
        let dx = e.x2 - e.x1;
        let dy = e.y2 - e.y1;
        let len = (dx * dx + dy * dy).sqrt();
        let r = scene.node_radius;
        let (x1, y1, x2, y2) = if len > 2.0 * r + 4.0 {
            let ux = dx / len;
            let uy = dy / len;
            (
                e.x1 + ux * r,
                e.y1 + uy * r,
                e.x2 - ux * (r + 2.0),
                e.y2 - uy * (r + 2.0),
            )
        } else {
            (e.x1, e.y1, e.x2, e.y2)
        };
        let class = if e.on_path { "edge onPath" } else { "edge" };
        let marker = if e.on_path { "_arrowEndPath" } else { "_arrowEnd" };
        let _ = write!(
            &mut out,
            r#"<line class="{class}" data-from="{from}" data-to="{to}" x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" marker-end="url(#{id}{marker})"/>"#,
            class = class,
            from = e.from,
            to = e.to,
            x1 = fmt(x1),
            y1 = fmt(y1),
            x2 = fmt(x2),
            y2 = fmt(y2),
            id = id_esc,
            marker = marker,
        );
    }
    out.push_str("</g>");

    out.push_str(r#"<g class="nodes">"#);
    for n in &scene.nodes {
        let mut class = String::from("node ");
        class.push_str(tier_class(n.tier));
        if n.on_path {
            class.push_str(" onPath");
        }
        if n.hovered {
            class.push_str(" hovered");
        }
        if n.is_goal {
            class.push_str(" goal");
        }
        let _ = write!(
            &mut out,
            r#"<g class="{class}" data-id="{id}" transform="translate({x}, {y})">"#,
            class = class,
            id = n.id,
            x = fmt(n.x),
            y = fmt(n.y),
        );
        if n.is_goal {
            let _ = write!(
                &mut out,
                r#"<circle class="goalRing" r="{r}"/>"#,
                r = fmt(scene.node_radius + 6.0),
            );
        }
        let _ = write!(
            &mut out,
            r#"<circle class="body" r="{r}"/>"#,
            r = fmt(scene.node_radius),
        );
        if options.include_labels {
            let _ = write!(
                &mut out,
                r#"<text class="label" y="4">{label}</text>"#,
                label = escape_xml(&n.label),
            );
        }
        out.push_str("</g>");
    }
    out.push_str("</g>");

    out.push_str("</svg>\n");
    out
}

fn fmt(v: f64) -> String {
    // Round-trippable decimal form for attribute values, minus `-0` and the
    // tiny float noise the force accumulation leaves behind.
    if !v.is_finite() {
        return "0".to_string();
    }

    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    let s = v.to_string();
    if s == "-0" { "0".to_string() } else { s }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
