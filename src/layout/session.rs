use std::collections::HashMap;
use std::f64::consts::PI;

use log::{debug, info};
use serde::Serialize;

use super::error::LayoutError;
use super::geometry::{ArcOptions, CurveDescriptor, describe_curve};
use super::grouping::{ParallelGroup, annotate};
use super::refresh::RefreshQueue;
use super::settings::{DisplaySettings, LayoutConfig};
use super::simulation::{ForceLayout, Placement, SimulationPhase};
use super::types::{Connection, ElementId, GraphSnapshot, NodePosition, Point, PositionSnapshot};

/// A device as handed to the renderer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderNode {
	pub id: ElementId,
	pub name: String,
	pub position: Point,
	pub reachable: bool,
	pub pinned: bool,
}

/// A connection as handed to the renderer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderEdge {
	pub connection: Connection,
	pub group: ParallelGroup,
	pub curve: CurveDescriptor,
}

/// Everything emitted by one layout pass, in snapshot order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LayoutFrame {
	pub nodes: Vec<RenderNode>,
	pub edges: Vec<RenderEdge>,
}

impl LayoutFrame {
	pub fn node(&self, id: &ElementId) -> Option<&RenderNode> {
		self.nodes.iter().find(|n| &n.id == id)
	}

	pub fn edge(&self, id: &ElementId) -> Option<&RenderEdge> {
		self.edges.iter().find(|e| &e.connection.id == id)
	}
}

/// What changed during one pointer move.
#[derive(Clone, Debug, PartialEq)]
pub struct DragUpdate {
	pub node: RenderNode,
	pub edges: Vec<RenderEdge>,
}

/// Owns the working graph between refreshes and drives every layout pass.
///
/// Each [`ingest`](Self::ingest) replaces the graph wholesale: groups, ranks and
/// the snapshot-wide curvature scale are recomputed before the simulation runs.
pub struct LayoutSession {
	config: LayoutConfig,
	arc: ArcOptions,
	snapshot: GraphSnapshot,
	slots: HashMap<ElementId, usize>,
	edge_slots: Vec<(usize, usize)>,
	incident: Vec<Vec<usize>>,
	groups: Vec<ParallelGroup>,
	layout: ForceLayout,
	frame: LayoutFrame,
	saved: PositionSnapshot,
}

impl LayoutSession {
	pub fn new(config: LayoutConfig) -> Self {
		Self {
			arc: ArcOptions::from(&config),
			layout: ForceLayout::empty(config.clone()),
			config,
			snapshot: GraphSnapshot::default(),
			slots: HashMap::new(),
			edge_slots: Vec::new(),
			incident: Vec::new(),
			groups: Vec::new(),
			frame: LayoutFrame::default(),
			saved: PositionSnapshot::default(),
		}
	}

	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	pub fn settings(&self) -> &DisplaySettings {
		&self.snapshot.settings
	}

	pub fn frame(&self) -> &LayoutFrame {
		&self.frame
	}

	pub fn phase(&self) -> SimulationPhase {
		self.layout.phase()
	}

	/// Positions as of the last ingest or drag end.
	pub fn position_snapshot(&self) -> &PositionSnapshot {
		&self.saved
	}

	pub fn ingest(&mut self, snapshot: GraphSnapshot) -> Result<&LayoutFrame, LayoutError> {
		snapshot.validate()?;

		let slots: HashMap<ElementId, usize> = snapshot
			.nodes
			.iter()
			.enumerate()
			.map(|(slot, node)| (node.id.clone(), slot))
			.collect();
		let edge_slots = snapshot
			.edges
			.iter()
			.map(|edge| Ok((slot_of(&slots, edge, &edge.node_a)?, slot_of(&slots, edge, &edge.node_b)?)))
			.collect::<Result<Vec<_>, LayoutError>>()?;

		let mut incident = vec![Vec::new(); snapshot.nodes.len()];
		for (i, &(a, b)) in edge_slots.iter().enumerate() {
			incident[a].push(i);
			if b != a {
				incident[b].push(i);
			}
		}

		let count = snapshot.nodes.len();
		let placements: Vec<Placement> = snapshot
			.nodes
			.iter()
			.enumerate()
			.map(|(slot, node)| Placement {
				start: ring_position(slot, count, &self.config),
				fixed: node.fixed_position(),
			})
			.collect();

		let mut layout = ForceLayout::new(self.config.clone(), &placements, &edge_slots);
		layout.settle();

		self.groups = annotate(&snapshot.edges);
		self.snapshot = snapshot;
		self.slots = slots;
		self.edge_slots = edge_slots;
		self.incident = incident;
		self.layout = layout;
		self.rebuild_frame();
		self.saved = self.current_positions();

		info!(
			"laid out {} nodes and {} edges (max group half {})",
			self.frame.nodes.len(),
			self.frame.edges.len(),
			self.groups.first().map_or(0, |g| g.max_group_half)
		);
		Ok(&self.frame)
	}

	/// Ingests the newest accepted snapshot in `queue`, if any.
	pub fn ingest_from(
		&mut self,
		queue: &mut RefreshQueue,
	) -> Result<Option<&LayoutFrame>, LayoutError> {
		match queue.take_latest() {
			Some((ticket, snapshot)) => {
				debug!("ingesting snapshot #{}", ticket.sequence());
				self.ingest(snapshot).map(Some)
			}
			None => Ok(None),
		}
	}

	/// Drops one connection and lays out the remaining graph from scratch.
	pub fn remove_edge(&mut self, id: &ElementId) -> Result<&LayoutFrame, LayoutError> {
		let mut snapshot = self.snapshot.clone();
		let before = snapshot.edges.len();
		snapshot.edges.retain(|edge| &edge.id != id);
		if snapshot.edges.len() == before {
			return Err(LayoutError::UnknownEdge(id.clone()));
		}
		self.ingest(snapshot)
	}

	pub fn drag_start(&mut self, id: &ElementId) -> Result<(), LayoutError> {
		let slot = self.slot(id)?;
		self.layout.begin_drag(slot);
		Ok(())
	}

	/// Moves the node to the pointer and recomputes only the curves touching it.
	/// The simulation is not stepped, so every other node and curve stays put.
	pub fn drag_to(&mut self, id: &ElementId, to: Point) -> Result<DragUpdate, LayoutError> {
		let slot = self.slot(id)?;
		if !to.is_finite() {
			return Err(LayoutError::InvalidPosition {
				node: id.clone(),
				x: to.x,
				y: to.y,
			});
		}
		if self.layout.dragging() != Some(slot) {
			self.layout.begin_drag(slot);
		}
		self.layout.drag_to(slot, to);

		let node = &mut self.frame.nodes[slot];
		node.position = to;
		node.pinned = self.layout.is_pinned(slot);
		let node = node.clone();

		let mut edges = Vec::with_capacity(self.incident[slot].len());
		for &edge_idx in &self.incident[slot] {
			let curve = self.curve_for(edge_idx);
			let edge = &mut self.frame.edges[edge_idx];
			edge.curve = curve;
			edges.push(edge.clone());
		}
		Ok(DragUpdate { node, edges })
	}

	/// Finishes a drag and refreshes the position hand-off.
	pub fn drag_end(&mut self) -> &PositionSnapshot {
		self.layout.end_drag();
		self.saved = self.current_positions();
		&self.saved
	}

	pub fn resize(&mut self, width: f64, height: f64) -> &LayoutFrame {
		self.config.width = width;
		self.config.height = height;
		self.layout.resize(width, height);
		self.rebuild_frame();
		&self.frame
	}

	fn slot(&self, id: &ElementId) -> Result<usize, LayoutError> {
		self.slots
			.get(id)
			.copied()
			.ok_or_else(|| LayoutError::UnknownNode(id.clone()))
	}

	fn curve_for(&self, edge_idx: usize) -> CurveDescriptor {
		let (a, b) = self.edge_slots[edge_idx];
		let positions = self.layout.positions();
		describe_curve(&self.groups[edge_idx], positions[a], positions[b], &self.arc)
	}

	fn rebuild_frame(&mut self) {
		let nodes = self
			.snapshot
			.nodes
			.iter()
			.enumerate()
			.map(|(slot, node)| RenderNode {
				id: node.id.clone(),
				name: node.name.clone(),
				position: self.layout.position(slot).unwrap_or_default(),
				reachable: node.reachable,
				pinned: self.layout.is_pinned(slot),
			})
			.collect();
		let edges = self
			.snapshot
			.edges
			.iter()
			.enumerate()
			.map(|(i, connection)| RenderEdge {
				connection: connection.clone(),
				group: self.groups[i],
				curve: self.curve_for(i),
			})
			.collect();
		self.frame = LayoutFrame { nodes, edges };
	}

	fn current_positions(&self) -> PositionSnapshot {
		PositionSnapshot::new(
			self.frame
				.nodes
				.iter()
				.map(|node| NodePosition {
					id: node.id.clone(),
					x: node.position.x,
					y: node.position.y,
				})
				.collect(),
		)
	}
}

fn slot_of(
	slots: &HashMap<ElementId, usize>,
	edge: &Connection,
	node: &ElementId,
) -> Result<usize, LayoutError> {
	slots
		.get(node)
		.copied()
		.ok_or_else(|| LayoutError::UnknownEndpoint {
			edge: edge.id.clone(),
			node: node.clone(),
		})
}

/// Starting spot of a free node. Depends only on its slot, so re-ingesting an
/// unchanged snapshot reproduces the same layout.
fn ring_position(slot: usize, count: usize, config: &LayoutConfig) -> Point {
	let angle = slot as f64 * 2.0 * PI / count.max(1) as f64;
	let radius = config.width.min(config.height) / 4.0;
	Point::new(
		config.width / 2.0 + radius * angle.cos(),
		config.height / 2.0 + radius * angle.sin(),
	)
}
