use log::{debug, error};

use crate::layout::{ElementId, GraphSnapshot, LayoutConfig, LayoutSession, Point};

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<ElementId>,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Host-side state of one canvas: the layout session plus view and pointer state.
pub struct TopologyCanvasState {
	pub session: LayoutSession,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
}

impl TopologyCanvasState {
	pub fn new(data: &GraphSnapshot, width: f64, height: f64) -> Self {
		let mut state = Self {
			session: LayoutSession::new(LayoutConfig::default().with_canvas(width, height)),
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
		};
		state.load(data);
		state
	}

	pub fn load(&mut self, data: &GraphSnapshot) {
		if let Err(err) = self.session.ingest(data.clone()) {
			error!("failed to lay out topology: {err}");
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		Point::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<ElementId> {
		let p = self.screen_to_graph(sx, sy);
		let radius = self.session.config().node_radius;
		// Later nodes are drawn on top, so they win.
		self.session
			.frame()
			.nodes
			.iter()
			.rev()
			.find(|node| node.position.distance(p) < radius)
			.map(|node| node.id.clone())
	}

	pub fn begin_drag(&mut self, sx: f64, sy: f64) -> bool {
		let Some(id) = self.node_at_position(sx, sy) else {
			return false;
		};
		if self.session.drag_start(&id).is_err() {
			return false;
		}
		self.drag.node = Some(id);
		true
	}

	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let Some(id) = self.drag.node.clone() else {
			return;
		};
		let to = self.screen_to_graph(sx, sy);
		if let Err(err) = self.session.drag_to(&id, to) {
			error!("drag failed: {err}");
		}
	}

	pub fn end_drag(&mut self) {
		if self.drag.node.take().is_none() {
			return;
		}
		let positions = self.session.drag_end();
		match positions.to_json() {
			Ok(json) => debug!("layout ready to save: {json}"),
			Err(err) => error!("failed to encode positions: {err}"),
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.session.resize(width, height);
	}
}
