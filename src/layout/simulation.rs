use std::collections::BTreeSet;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::{debug, warn};

use super::settings::LayoutConfig;
use super::types::Point;

/// Lifecycle of the force simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationPhase {
	Uninitialized,
	Simulating,
	Settled,
}

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub slot: usize,
}

/// Starting state of one node. `fixed` pins it for the lifetime of the layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
	pub start: Point,
	pub fixed: Option<Point>,
}

/// Force-directed placement over `force_graph`, with link distance, centering and
/// canvas clamping applied after every step.
///
/// Nodes are addressed by slot, the index of their [`Placement`].
pub struct ForceLayout {
	graph: ForceGraph<NodeInfo, ()>,
	positions: Vec<Point>,
	fixed: Vec<Option<Point>>,
	links: Vec<(usize, usize)>,
	config: LayoutConfig,
	phase: SimulationPhase,
	dragging: Option<usize>,
}

impl ForceLayout {
	pub fn empty(config: LayoutConfig) -> Self {
		Self::new(config, &[], &[])
	}

	/// Builds the simulation. Self links and repeated pairs add a single spring.
	pub fn new(config: LayoutConfig, placements: &[Placement], links: &[(usize, usize)]) -> Self {
		if config.width < 2.0 * config.node_radius || config.height < 2.0 * config.node_radius {
			warn!(
				"canvas {}x{} is smaller than one node; free nodes collapse to its centre",
				config.width, config.height
			);
		}

		let fixed: Vec<Option<Point>> = placements.iter().map(|p| p.fixed).collect();
		let mut positions: Vec<Point> = placements.iter().map(|p| p.fixed.unwrap_or(p.start)).collect();
		clamp_free(&mut positions, &fixed, &config);

		let links: Vec<(usize, usize)> = links
			.iter()
			.filter(|(a, b)| a != b && *a < placements.len() && *b < placements.len())
			.map(|&(a, b)| (a.min(b), a.max(b)))
			.collect::<BTreeSet<_>>()
			.into_iter()
			.collect();

		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: config.force_charge,
			force_spring: config.force_spring,
			force_max: config.force_max,
			node_speed: config.node_speed,
			damping_factor: config.damping_factor,
		});
		let mut indices: Vec<DefaultNodeIdx> = Vec::with_capacity(positions.len());
		for (slot, p) in positions.iter().enumerate() {
			indices.push(graph.add_node(NodeData {
				x: p.x as f32,
				y: p.y as f32,
				mass: config.node_mass,
				is_anchor: fixed[slot].is_some(),
				user_data: NodeInfo { slot },
			}));
		}
		for &(a, b) in &links {
			graph.add_edge(indices[a], indices[b], EdgeData::default());
		}

		Self {
			graph,
			positions,
			fixed,
			links,
			config,
			phase: SimulationPhase::Uninitialized,
			dragging: None,
		}
	}

	pub fn phase(&self) -> SimulationPhase {
		self.phase
	}

	pub fn positions(&self) -> &[Point] {
		&self.positions
	}

	pub fn position(&self, slot: usize) -> Option<Point> {
		self.positions.get(slot).copied()
	}

	pub fn is_pinned(&self, slot: usize) -> bool {
		self.fixed.get(slot).is_some_and(Option::is_some)
	}

	pub fn dragging(&self) -> Option<usize> {
		self.dragging
	}

	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	/// Runs the full iteration budget and returns the number of steps taken.
	pub fn settle(&mut self) -> usize {
		self.phase = SimulationPhase::Simulating;
		let iterations = self.config.iterations;
		for _ in 0..iterations {
			self.step();
		}
		self.phase = SimulationPhase::Settled;
		debug!(
			"settled {} nodes and {} springs after {} steps",
			self.positions.len(),
			self.links.len(),
			iterations
		);
		iterations
	}

	pub fn step(&mut self) {
		if self.positions.is_empty() {
			return;
		}
		self.graph.update(self.config.time_step);
		self.read_back();
		self.apply_links();
		self.apply_centering();
		self.apply_bounds();
		self.write_back();
	}

	pub fn begin_drag(&mut self, slot: usize) -> bool {
		if slot >= self.positions.len() {
			return false;
		}
		self.dragging = Some(slot);
		self.phase = SimulationPhase::Simulating;
		true
	}

	/// Moves `slot` straight to `to` and pins it there. Other nodes are untouched.
	pub fn drag_to(&mut self, slot: usize, to: Point) -> bool {
		if slot >= self.positions.len() || !to.is_finite() {
			return false;
		}
		self.fixed[slot] = Some(to);
		self.positions[slot] = to;
		self.graph.visit_nodes_mut(|node| {
			if node.data.user_data.slot == slot {
				node.data.x = to.x as f32;
				node.data.y = to.y as f32;
				node.data.is_anchor = true;
			}
		});
		true
	}

	pub fn end_drag(&mut self) {
		self.dragging = None;
		if self.phase == SimulationPhase::Simulating {
			self.phase = SimulationPhase::Settled;
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.config.width = width;
		self.config.height = height;
		self.apply_bounds();
		self.write_back();
	}

	fn read_back(&mut self) {
		let (positions, fixed) = (&mut self.positions, &self.fixed);
		self.graph.visit_nodes(|node| {
			let slot = node.data.user_data.slot;
			positions[slot] = match fixed[slot] {
				Some(p) => p,
				None => Point::new(node.x() as f64, node.y() as f64),
			};
		});
	}

	fn write_back(&mut self) {
		let (positions, fixed) = (&self.positions, &self.fixed);
		self.graph.visit_nodes_mut(|node| {
			let slot = node.data.user_data.slot;
			let p = positions[slot];
			node.data.x = p.x as f32;
			node.data.y = p.y as f32;
			node.data.is_anchor = fixed[slot].is_some();
		});
	}

	fn apply_links(&mut self) {
		let (target, strength) = (self.config.link_distance, self.config.link_strength);
		for &(a, b) in &self.links {
			let (pa, pb) = (self.positions[a], self.positions[b]);
			let dist = pa.distance(pb);
			if dist < 1e-6 {
				continue;
			}
			let (free_a, free_b) = (self.fixed[a].is_none(), self.fixed[b].is_none());
			let share = match (free_a, free_b) {
				(true, true) => 0.5,
				(false, false) => continue,
				_ => 1.0,
			};
			let k = (dist - target) / dist * strength * share;
			let (dx, dy) = ((pb.x - pa.x) * k, (pb.y - pa.y) * k);
			if free_a {
				self.positions[a].x += dx;
				self.positions[a].y += dy;
			}
			if free_b {
				self.positions[b].x -= dx;
				self.positions[b].y -= dy;
			}
		}
	}

	fn apply_centering(&mut self) {
		let mut sum = Point::default();
		let mut count = 0usize;
		for (p, fixed) in self.positions.iter().zip(&self.fixed) {
			if fixed.is_none() && p.is_finite() {
				sum.x += p.x;
				sum.y += p.y;
				count += 1;
			}
		}
		if count == 0 {
			return;
		}
		let strength = self.config.center_strength;
		let shift_x = (self.config.width / 2.0 - sum.x / count as f64) * strength;
		let shift_y = (self.config.height / 2.0 - sum.y / count as f64) * strength;
		for (p, fixed) in self.positions.iter_mut().zip(&self.fixed) {
			if fixed.is_none() {
				p.x += shift_x;
				p.y += shift_y;
			}
		}
	}

	fn apply_bounds(&mut self) {
		clamp_free(&mut self.positions, &self.fixed, &self.config);
	}
}

/// Hard-clips every free node into the canvas, inset by the node radius.
fn clamp_free(positions: &mut [Point], fixed: &[Option<Point>], config: &LayoutConfig) {
	let margin = config.node_radius;
	let (min_x, max_x) = clamp_range(config.width, margin);
	let (min_y, max_y) = clamp_range(config.height, margin);
	for (p, fixed) in positions.iter_mut().zip(fixed) {
		if fixed.is_some() {
			continue;
		}
		p.x = if p.x.is_finite() {
			p.x.clamp(min_x, max_x)
		} else {
			(min_x + max_x) / 2.0
		};
		p.y = if p.y.is_finite() {
			p.y.clamp(min_y, max_y)
		} else {
			(min_y + max_y) / 2.0
		};
	}
}

/// Allowed coordinate range along one axis of length `extent`.
fn clamp_range(extent: f64, margin: f64) -> (f64, f64) {
	if extent >= 2.0 * margin {
		(margin, extent - margin)
	} else {
		let mid = extent.max(0.0) / 2.0;
		(mid, mid)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn free(x: f64, y: f64) -> Placement {
		Placement {
			start: Point::new(x, y),
			fixed: None,
		}
	}

	fn pinned(x: f64, y: f64) -> Placement {
		Placement {
			start: Point::new(x, y),
			fixed: Some(Point::new(x, y)),
		}
	}

	fn config() -> LayoutConfig {
		LayoutConfig::default().with_canvas(400.0, 300.0)
	}

	fn within_bounds(layout: &ForceLayout) -> bool {
		let r = layout.config().node_radius;
		layout
			.positions()
			.iter()
			.enumerate()
			.filter(|(slot, _)| !layout.is_pinned(*slot))
			.all(|(_, p)| p.x >= r && p.x <= 400.0 - r && p.y >= r && p.y <= 300.0 - r)
	}

	#[test]
	fn pinned_nodes_never_move() {
		let placements = [pinned(37.5, 12.25), free(200.0, 150.0), free(210.0, 140.0)];
		let mut layout = ForceLayout::new(config(), &placements, &[(0, 1), (1, 2), (0, 2)]);
		layout.settle();
		for _ in 0..50 {
			layout.step();
		}
		assert_eq!(layout.position(0), Some(Point::new(37.5, 12.25)));
	}

	#[test]
	fn free_nodes_are_clamped_to_canvas() {
		let placements = [
			free(-500.0, 9000.0),
			free(1e6, -1e6),
			free(f64::NAN, 10.0),
			pinned(-20.0, -20.0),
		];
		let mut layout = ForceLayout::new(config(), &placements, &[(0, 1), (1, 2), (2, 3)]);
		assert!(within_bounds(&layout));
		for _ in 0..10 {
			layout.step();
			assert!(within_bounds(&layout));
		}
		assert_eq!(layout.position(3), Some(Point::new(-20.0, -20.0)));
	}

	#[test]
	fn identical_inputs_settle_identically() {
		let placements = [free(100.0, 100.0), free(300.0, 120.0), free(200.0, 250.0), pinned(50.0, 50.0)];
		let links = [(0, 1), (1, 2), (2, 0), (2, 3)];
		let mut first = ForceLayout::new(config(), &placements, &links);
		let mut second = ForceLayout::new(config(), &placements, &links);
		first.settle();
		second.settle();
		assert_eq!(first.positions(), second.positions());
	}

	#[test]
	fn drag_reopens_and_closes_the_simulation() {
		let mut layout = ForceLayout::new(config(), &[free(100.0, 100.0), free(200.0, 100.0)], &[(0, 1)]);
		assert_eq!(layout.phase(), SimulationPhase::Uninitialized);
		layout.settle();
		assert_eq!(layout.phase(), SimulationPhase::Settled);
		let settled = layout.position(1);

		assert!(layout.begin_drag(0));
		assert_eq!(layout.phase(), SimulationPhase::Simulating);
		assert!(layout.drag_to(0, Point::new(150.0, 120.0)));
		assert!(!layout.drag_to(0, Point::new(f64::NAN, 0.0)));
		assert_eq!(layout.position(0), Some(Point::new(150.0, 120.0)));
		assert_eq!(layout.position(1), settled);
		assert!(layout.is_pinned(0));

		layout.end_drag();
		assert_eq!(layout.phase(), SimulationPhase::Settled);
		assert_eq!(layout.dragging(), None);
		assert!(!layout.begin_drag(7));
	}

	#[test]
	fn tiny_canvas_does_not_panic() {
		let mut layout = ForceLayout::new(
			LayoutConfig::default().with_canvas(10.0, 10.0),
			&[free(0.0, 0.0), free(3.0, 4.0)],
			&[(0, 1)],
		);
		layout.settle();
		assert!(layout.positions().iter().all(|p| *p == Point::new(5.0, 5.0)));
	}

	#[test]
	fn empty_layout_settles() {
		let mut layout = ForceLayout::empty(config());
		assert_eq!(layout.settle(), 100);
		assert!(layout.positions().is_empty());
	}
}
