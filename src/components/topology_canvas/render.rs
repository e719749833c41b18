use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::TopologyCanvasState;
use crate::layout::{DisplaySettings, LinkStatus, RenderEdge, RenderNode};

const BACKGROUND: &str = "#f4f5f7";
const REACHABLE: &str = "#3b7dd8";
const UNREACHABLE: &str = "#ba0e00";

pub fn render(state: &TopologyCanvasState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	// Settings arrive with each snapshot and are only read here.
	let settings = state.session.settings();
	let frame = state.session.frame();
	for edge in &frame.edges {
		draw_edge(edge, settings, state.transform.k, ctx);
	}
	let radius = state.session.config().node_radius;
	for node in &frame.nodes {
		draw_node(node, radius, settings, state.transform.k, ctx);
	}
	ctx.restore();
}

fn draw_edge(
	edge: &RenderEdge,
	settings: &DisplaySettings,
	k: f64,
	ctx: &CanvasRenderingContext2d,
) {
	let Some((first, rest)) = edge.curve.points.split_first() else {
		return;
	};
	let status = LinkStatus::of(&edge.connection);

	ctx.set_stroke_style_str(status.color());
	ctx.set_line_width(settings.link_width(edge.connection.weight));
	if status == LinkStatus::Inactive {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(8.0),
			&JsValue::from_f64(4.0),
		));
	}
	ctx.begin_path();
	ctx.move_to(first.x, first.y);
	for p in rest {
		ctx.line_to(p.x, p.y);
	}
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	if let Some(label) = settings.link_label(&edge.connection) {
		let anchor = edge.curve.label_anchor;
		ctx.set_font(&format!("bold {}px sans-serif", 12.0 / k.max(0.5)));
		ctx.set_stroke_style_str("#ffffff");
		ctx.set_line_width(4.0 / k.max(0.5));
		let _ = ctx.stroke_text(&label, anchor.x, anchor.y);
		ctx.set_fill_style_str("#000000");
		let _ = ctx.fill_text(&label, anchor.x, anchor.y);
	}
}

fn draw_node(
	node: &RenderNode,
	radius: f64,
	settings: &DisplaySettings,
	k: f64,
	ctx: &CanvasRenderingContext2d,
) {
	let (x, y) = (node.position.x, node.position.y);
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(if node.reachable { REACHABLE } else { UNREACHABLE });
	ctx.fill();

	if node.pinned {
		ctx.set_stroke_style_str("#1a1a2e");
		ctx.set_line_width(1.5 / k);
		ctx.stroke();
	}

	if settings.show_labels {
		ctx.set_fill_style_str("#1a1a2e");
		ctx.set_font(&format!("{}px sans-serif", 12.0 / k.max(0.5)));
		let _ = ctx.fill_text(&node.name, x - radius, y - radius - 4.0);
	}
}
