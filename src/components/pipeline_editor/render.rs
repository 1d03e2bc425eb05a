use std::collections::HashMap;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::editor::types::{
	LABEL_WRAP_WIDTH, NODE_CORNER_RADIUS, NODE_HEIGHT, NODE_OFFSET, NODE_WIDTH,
};
use crate::editor::{EditorSession, Node, NodeId, taxonomy, wrap_words};

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
];

const TITLE_Y: f64 = 20.0;
const SUBTITLE_Y: f64 = 50.0;
const TEXT_X: f64 = 10.0;
const FONT_PX: f64 = 12.0;
const LINE_HEIGHT: f64 = 1.4;

const LINK_WIDTH: f64 = 1.5;
const DASH: f64 = 8.0;
const GAP: f64 = 4.0;
const ARROW_SIZE: f64 = 10.0;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Stroke width in graph units; never thinner than one screen pixel.
fn link_width(k: f64) -> f64 {
	LINK_WIDTH.max(1.0 / k)
}

fn category_color(kind: &str) -> &'static str {
	let category = taxonomy::reverse_lookup(kind);
	taxonomy::categories()
		.position(|(c, _)| Some(c) == category)
		.map(|i| COLORS[i % COLORS.len()])
		.unwrap_or(COLORS[COLORS.len() - 1])
}

/// Where the segment from `from` into `node` crosses the node's rectangle.
fn rect_boundary(node: &Node, from: (f64, f64)) -> (f64, f64) {
	let (dx, dy) = (from.0 - node.x, from.1 - node.y);
	let (left, top) = (node.x - NODE_OFFSET.0, node.y - NODE_OFFSET.1);
	let (right, bottom) = (left + NODE_WIDTH, top + NODE_HEIGHT);
	let mut t = 1.0_f64;
	if dx > 0.0 {
		t = t.min((right - node.x) / dx);
	} else if dx < 0.0 {
		t = t.min((left - node.x) / dx);
	}
	if dy > 0.0 {
		t = t.min((bottom - node.y) / dy);
	} else if dy < 0.0 {
		t = t.min((top - node.y) / dy);
	}
	(node.x + dx * t, node.y + dy * t)
}

pub fn render(session: &EditorSession, flow_time: f64, ctx: &CanvasRenderingContext2d) {
	let (width, height) = session.viewport();
	let transform = session.interaction().transform();
	ctx.set_fill_style_str("#f4f6fb");
	ctx.fill_rect(0.0, 0.0, width, height);
	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);

	let nodes: HashMap<NodeId, &Node> = session.graph().nodes().iter().map(|n| (n.id, n)).collect();
	draw_links(session, &nodes, flow_time, ctx);
	draw_nodes(session, &nodes, ctx);
	ctx.restore();
}

fn draw_links(
	session: &EditorSession,
	nodes: &HashMap<NodeId, &Node>,
	flow_time: f64,
	ctx: &CanvasRenderingContext2d,
) {
	let k = session.interaction().transform().k;
	let dash_offset = -(flow_time * 30.0) % (DASH + GAP);
	ctx.set_line_width(link_width(k));

	for visual in session.scene().links() {
		let (Some(source), Some(target)) = (nodes.get(&visual.key.0), nodes.get(&visual.key.1))
		else {
			continue;
		};
		let (x1, y1) = (source.x, source.y);
		let (tip_x, tip_y) = rect_boundary(target, (x1, y1));
		let (dx, dy) = (tip_x - x1, tip_y - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		let alpha = 0.7 * ease_out_cubic(visual.enter_t);
		ctx.set_stroke_style_str(&format!("rgba(60, 90, 140, {})", alpha));
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(DASH),
			&JsValue::from_f64(GAP),
		));
		ctx.set_line_dash_offset(dash_offset);

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(tip_x - ux * ARROW_SIZE, tip_y - uy * ARROW_SIZE);
		ctx.stroke();

		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.set_fill_style_str(&format!("rgba(60, 90, 140, {})", alpha));
		let (back_x, back_y) = (tip_x - ux * ARROW_SIZE, tip_y - uy * ARROW_SIZE);
		let (px, py) = (-uy * ARROW_SIZE * 0.5, ux * ARROW_SIZE * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

fn draw_label(ctx: &CanvasRenderingContext2d, text: &str, x: f64, y: f64) {
	let measure = |s: &str| ctx.measure_text(s).map(|m| m.width()).unwrap_or(0.0);
	for (i, line) in wrap_words(text, LABEL_WRAP_WIDTH, measure).iter().enumerate() {
		let _ = ctx.fill_text(line, x, y + i as f64 * FONT_PX * LINE_HEIGHT);
	}
}

fn draw_nodes(session: &EditorSession, nodes: &HashMap<NodeId, &Node>, ctx: &CanvasRenderingContext2d) {
	let dragged = session.interaction().dragged_node();
	ctx.set_font(&format!("{}px sans-serif", FONT_PX));

	for visual in session.scene().nodes() {
		let Some(node) = nodes.get(&visual.key) else {
			continue;
		};
		let (left, top) = (node.x - NODE_OFFSET.0, node.y - NODE_OFFSET.1);
		let t = ease_out_cubic(visual.enter_t);

		ctx.set_global_alpha(t);
		rounded_rect(ctx, left, top, NODE_WIDTH, NODE_HEIGHT, NODE_CORNER_RADIUS);
		ctx.set_fill_style_str(category_color(&node.kind));
		ctx.fill();
		if dragged == Some(node.id) {
			ctx.set_stroke_style_str("#222");
			ctx.set_line_width(2.0);
			ctx.stroke();
		}

		ctx.set_fill_style_str("white");
		draw_label(ctx, &visual.title, left + TEXT_X, top + TITLE_Y);
		draw_label(ctx, &visual.subtitle, left + TEXT_X, top + SUBTITLE_Y);
		ctx.set_global_alpha(1.0);
	}
}
