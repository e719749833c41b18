use router_map_layout::layout::{
	Connection, DeviceNode, ElementId, GraphSnapshot, LayoutConfig, LayoutError, LayoutSession,
	Point, RefreshQueue, SimulationPhase,
};

fn id(s: &str) -> ElementId {
	ElementId::from(s)
}

fn config() -> LayoutConfig {
	LayoutConfig::default().with_canvas(800.0, 600.0)
}

fn offset(p: Point, a: Point, b: Point) -> f64 {
	((b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)) / a.distance(b)
}

fn pinned_pair_with_bundle(links: usize) -> GraphSnapshot {
	GraphSnapshot {
		nodes: vec![
			DeviceNode::new("R1", "R1").pinned_at(100.0, 300.0),
			DeviceNode::new("R2", "R2").pinned_at(400.0, 300.0),
		],
		edges: (1..=links)
			.map(|i| Connection::new(i.to_string().as_str(), "R1", "R2"))
			.collect(),
		..Default::default()
	}
}

fn mixed_topology() -> GraphSnapshot {
	GraphSnapshot {
		nodes: vec![
			DeviceNode::new("R1", "R1").pinned_at(100.0, 100.0),
			DeviceNode::new("R2", "R2"),
			DeviceNode::new("R3", "R3").pinned_at(600.0, 450.0),
			DeviceNode::new("R4", "R4"),
			DeviceNode::new("R5", "R5"),
		],
		edges: vec![
			Connection::new("a", "R1", "R2"),
			Connection::new("b", "R2", "R1"),
			Connection::new("c", "R3", "R4"),
			Connection::new("d", "R4", "R3"),
			Connection::new("e", "R4", "R3"),
			Connection::new("f", "R5", "R2"),
		],
		..Default::default()
	}
}

#[test]
fn three_links_three_hundred_units_apart() {
	let mut session = LayoutSession::new(config());
	let frame = session.ingest(pinned_pair_with_bundle(3)).unwrap();
	let (a, b) = (Point::new(100.0, 300.0), Point::new(400.0, 300.0));

	let median = frame.edge(&id("2")).unwrap();
	assert_eq!(median.group.rank, 2);
	assert_eq!(median.curve.radius, 0.0);
	assert_eq!(median.curve.points, vec![a, b]);

	let first = frame.edge(&id("1")).unwrap();
	let third = frame.edge(&id("3")).unwrap();
	assert!(first.curve.radius > 0.0);
	assert_eq!(first.curve.radius, third.curve.radius);
	assert_ne!(first.curve.sweep_flag, third.curve.sweep_flag);

	let (d1, d3) = (
		offset(first.curve.label_anchor, a, b),
		offset(third.curve.label_anchor, a, b),
	);
	assert!(d1 * d3 < 0.0);
	assert!((d1 + d3).abs() < 1e-6);
}

#[test]
fn empty_edge_set_still_emits_nodes() {
	let mut session = LayoutSession::new(config());
	let frame = session
		.ingest(GraphSnapshot {
			nodes: vec![DeviceNode::new("R1", "R1"), DeviceNode::new("R2", "R2")],
			..Default::default()
		})
		.unwrap();
	assert!(frame.edges.is_empty());
	assert_eq!(frame.nodes.len(), 2);
	assert_eq!(session.phase(), SimulationPhase::Settled);
}

#[test]
fn max_group_half_follows_the_largest_bundle() {
	let mut session = LayoutSession::new(config());
	let mut snapshot = mixed_topology();
	let frame = session.ingest(snapshot.clone()).unwrap();
	assert!(frame.edges.iter().all(|e| e.group.max_group_half == 1));

	for extra in ["x", "y"] {
		snapshot.edges.push(Connection::new(extra, "R3", "R4"));
	}
	let frame = session.ingest(snapshot).unwrap();
	assert!(frame.edges.iter().all(|e| e.group.max_group_half == 2));
	assert_eq!(frame.edge(&id("f")).unwrap().group.group_size, 1);
}

#[test]
fn dragging_touches_only_incident_curves() {
	let mut session = LayoutSession::new(config());
	session.ingest(mixed_topology()).unwrap();
	let before = session.frame().clone();

	session.drag_start(&id("R1")).unwrap();
	session.drag_to(&id("R1"), Point::new(120.0, 110.0)).unwrap();
	let update = session.drag_to(&id("R1"), Point::new(150.0, 120.0)).unwrap();

	assert_eq!(update.node.position, Point::new(150.0, 120.0));
	let mut touched: Vec<&str> = update
		.edges
		.iter()
		.map(|e| e.connection.id.as_str())
		.collect();
	touched.sort_unstable();
	assert_eq!(touched, ["a", "b"]);
	assert!(update.edges.iter().all(|e| e.curve.source == Point::new(150.0, 120.0)
		|| e.curve.target == Point::new(150.0, 120.0)));

	let after = session.frame();
	for unrelated in ["c", "d", "e", "f"] {
		assert_eq!(
			before.edge(&id(unrelated)).unwrap().curve.points,
			after.edge(&id(unrelated)).unwrap().curve.points
		);
	}
	for other in ["R2", "R3", "R4", "R5"] {
		assert_eq!(before.node(&id(other)), after.node(&id(other)));
	}
	assert_eq!(session.phase(), SimulationPhase::Simulating);

	let saved = session.drag_end();
	assert_eq!(saved.get(&id("R1")), Some(Point::new(150.0, 120.0)));
	assert_eq!(session.phase(), SimulationPhase::Settled);
}

#[test]
fn pinned_nodes_hold_and_free_nodes_stay_inside() {
	let config = config();
	let r = config.node_radius;
	let mut session = LayoutSession::new(config.clone());
	session.ingest(mixed_topology()).unwrap();

	session.drag_start(&id("R5")).unwrap();
	for step in 0..25 {
		let to = Point::new(300.0 + 4.0 * step as f64, 200.0);
		session.drag_to(&id("R5"), to).unwrap();
	}
	session.drag_end();

	let frame = session.frame();
	assert_eq!(frame.node(&id("R1")).unwrap().position, Point::new(100.0, 100.0));
	assert_eq!(frame.node(&id("R3")).unwrap().position, Point::new(600.0, 450.0));
	for node in frame.nodes.iter().filter(|n| !n.pinned) {
		let p = node.position;
		assert!(p.x >= r && p.x <= config.width - r, "{} at {p:?}", node.id);
		assert!(p.y >= r && p.y <= config.height - r, "{} at {p:?}", node.id);
	}
}

#[test]
fn identical_snapshots_converge_identically() {
	let mut first = LayoutSession::new(config());
	let mut second = LayoutSession::new(config());
	let a = first.ingest(mixed_topology()).unwrap().clone();
	let b = second.ingest(mixed_topology()).unwrap().clone();
	assert_eq!(a, b);
}

#[test]
fn refreshing_unchanged_data_keeps_the_layout() {
	let mut session = LayoutSession::new(config());
	let first = session.ingest(mixed_topology()).unwrap().clone();
	let first_saved = session.position_snapshot().clone();
	for _ in 0..3 {
		assert_eq!(session.ingest(mixed_topology()).unwrap(), &first);
		assert_eq!(session.position_snapshot(), &first_saved);
	}

	let mut queue = RefreshQueue::new();
	let ticket = queue.begin_fetch();
	assert!(queue.complete(ticket, mixed_topology()));
	assert_eq!(session.ingest_from(&mut queue).unwrap(), Some(&first));
}

#[test]
fn saved_positions_reproduce_the_layout() {
	let mut session = LayoutSession::new(config());
	session.ingest(mixed_topology()).unwrap();
	let saved = session.position_snapshot().clone();

	let json = saved.to_json().unwrap();
	let restored: router_map_layout::PositionSnapshot = serde_json::from_str(&json).unwrap();
	let mut snapshot = mixed_topology();
	restored.apply_to(&mut snapshot);

	let mut fresh = LayoutSession::new(config());
	let frame = fresh.ingest(snapshot).unwrap();
	for node in &frame.nodes {
		assert!(node.pinned);
		assert_eq!(Some(node.position), saved.get(&node.id));
	}
}

#[test]
fn removing_an_edge_reranks_its_group() {
	let mut session = LayoutSession::new(config());
	session.ingest(pinned_pair_with_bundle(3)).unwrap();

	let frame = session.remove_edge(&id("1")).unwrap();
	assert_eq!(frame.edges.len(), 2);
	let ranks: Vec<(usize, usize)> = frame
		.edges
		.iter()
		.map(|e| (e.group.rank, e.group.group_size))
		.collect();
	assert_eq!(ranks, [(1, 2), (2, 2)]);
	assert!(frame.edges.iter().all(|e| e.curve.radius > 0.0));
}

#[test]
fn malformed_snapshots_are_rejected_whole() {
	let mut session = LayoutSession::new(config());
	session.ingest(mixed_topology()).unwrap();

	let mut broken = mixed_topology();
	broken.edges.push(Connection::new("z", "R1", "R9"));
	let err = session.ingest(broken).unwrap_err();
	assert!(matches!(err, LayoutError::UnknownEndpoint { ref node, .. } if node.as_str() == "R9"));
	assert_eq!(session.frame().edges.len(), 6);

	let json = r#"{"devices": [{"id": 1}, {"id": "1"}], "connections": []}"#;
	let snapshot = GraphSnapshot::from_json(json).unwrap();
	assert!(matches!(
		session.ingest(snapshot),
		Err(LayoutError::DuplicateNode(_))
	));
	assert!(matches!(
		GraphSnapshot::from_json("{\"devices\": 3}"),
		Err(LayoutError::Json(_))
	));
}

#[test]
fn non_finite_pointer_is_rejected() {
	let mut session = LayoutSession::new(config());
	session.ingest(mixed_topology()).unwrap();
	let before = session.frame().clone();

	let err = session
		.drag_to(&id("R2"), Point::new(f64::NAN, 3.0))
		.unwrap_err();
	assert!(matches!(err, LayoutError::InvalidPosition { ref node, .. } if node.as_str() == "R2"));
	assert_eq!(session.frame(), &before);
	assert!(!session.frame().node(&id("R2")).unwrap().pinned);
}

#[test]
fn stale_fetches_never_reach_the_session() {
	let mut session = LayoutSession::new(config());
	let mut queue = RefreshQueue::new();
	let slow = queue.begin_fetch();
	let fast = queue.begin_fetch();

	assert!(queue.complete(fast, pinned_pair_with_bundle(2)));
	let frame = session.ingest_from(&mut queue).unwrap().unwrap();
	assert_eq!(frame.edges.len(), 2);

	assert!(!queue.complete(slow, pinned_pair_with_bundle(5)));
	assert!(session.ingest_from(&mut queue).unwrap().is_none());
	assert_eq!(session.frame().edges.len(), 2);
}

#[test]
fn resize_reclamps_free_nodes() {
	let mut session = LayoutSession::new(config());
	session.ingest(mixed_topology()).unwrap();
	let r = session.config().node_radius;

	let frame = session.resize(200.0, 150.0);
	for node in frame.nodes.iter().filter(|n| !n.pinned) {
		assert!(node.position.x <= 200.0 - r);
		assert!(node.position.y <= 150.0 - r);
	}
	assert_eq!(
		frame.node(&id("R3")).unwrap().position,
		Point::new(600.0, 450.0)
	);
}
