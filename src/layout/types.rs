use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::error::LayoutError;
use super::settings::DisplaySettings;

/// Identifier of a device or connection.
///
/// The backend emits integers for devices and strings for connections, so both
/// forms are accepted. Ordering is numeric when both ids are numeric, which keeps
/// `"9"` before `"10"` when ranks are assigned.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	fn numeric(&self) -> Option<u64> {
		self.0.parse().ok()
	}
}

impl Ord for ElementId {
	fn cmp(&self, other: &Self) -> Ordering {
		let by_kind = match (self.numeric(), other.numeric()) {
			(Some(a), Some(b)) => a.cmp(&b),
			(Some(_), None) => Ordering::Less,
			(None, Some(_)) => Ordering::Greater,
			(None, None) => Ordering::Equal,
		};
		by_kind.then_with(|| self.0.cmp(&other.0))
	}
}

impl PartialOrd for ElementId {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl fmt::Display for ElementId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ElementId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

impl From<u64> for ElementId {
	fn from(id: u64) -> Self {
		Self(id.to_string())
	}
}

impl<'de> Deserialize<'de> for ElementId {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum RawId {
			Text(String),
			Unsigned(u64),
			Signed(i64),
		}

		Ok(match RawId::deserialize(deserializer)? {
			RawId::Text(text) => Self(text),
			RawId::Unsigned(n) => Self(n.to_string()),
			RawId::Signed(n) => Self(n.to_string()),
		})
	}
}

/// A position in canvas space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		(other.x - self.x).hypot(other.y - self.y)
	}

	pub fn midpoint(self, other: Point) -> Point {
		Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
	}

	pub fn lerp(self, other: Point, t: f64) -> Point {
		Point::new(
			self.x + (other.x - self.x) * t,
			self.y + (other.y - self.y) * t,
		)
	}

	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}
}

fn default_reachable() -> bool {
	true
}

/// A network device as delivered by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceNode {
	pub id: ElementId,
	#[serde(default)]
	pub name: String,
	/// Saved position. A node is pinned only when both components are present.
	#[serde(default)]
	pub coordinates: Option<[Option<f64>; 2]>,
	/// Rendering only; has no influence on layout.
	#[serde(
		default = "default_reachable",
		alias = "snmp_connection",
		alias = "connection_is_active"
	)]
	pub reachable: bool,
}

impl DeviceNode {
	pub fn new(id: impl Into<ElementId>, name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			coordinates: None,
			reachable: true,
		}
	}

	pub fn pinned_at(mut self, x: f64, y: f64) -> Self {
		self.coordinates = Some([Some(x), Some(y)]);
		self
	}

	pub fn fixed_position(&self) -> Option<Point> {
		match self.coordinates {
			Some([Some(x), Some(y)]) if x.is_finite() && y.is_finite() => Some(Point::new(x, y)),
			_ => None,
		}
	}
}

/// A physical link (or aggregate of links) between two devices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Connection {
	pub id: ElementId,
	#[serde(alias = "source")]
	pub node_a: ElementId,
	#[serde(alias = "target")]
	pub node_b: ElementId,
	/// Capacity in Gbit/s. Drives line width only.
	#[serde(default, alias = "speed")]
	pub weight: f64,
	#[serde(default, alias = "number_of_active_links")]
	pub active_links: Option<u32>,
	#[serde(default, alias = "number_of_links")]
	pub total_links: Option<u32>,
}

impl Connection {
	pub fn new(
		id: impl Into<ElementId>,
		node_a: impl Into<ElementId>,
		node_b: impl Into<ElementId>,
	) -> Self {
		Self {
			id: id.into(),
			node_a: node_a.into(),
			node_b: node_b.into(),
			weight: 0.0,
			active_links: None,
			total_links: None,
		}
	}

	pub fn with_weight(mut self, weight: f64) -> Self {
		self.weight = weight;
		self
	}

	pub fn touches(&self, node: &ElementId) -> bool {
		&self.node_a == node || &self.node_b == node
	}
}

/// A full topology as fetched from the backend.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
	#[serde(default, alias = "devices")]
	pub nodes: Vec<DeviceNode>,
	#[serde(default, alias = "connections")]
	pub edges: Vec<Connection>,
	#[serde(default)]
	pub settings: DisplaySettings,
}

impl GraphSnapshot {
	pub fn from_json(json: &str) -> Result<Self, LayoutError> {
		Ok(serde_json::from_str(json)?)
	}

	/// Rejects duplicate ids and dangling endpoint references.
	pub fn validate(&self) -> Result<(), LayoutError> {
		let mut node_ids = HashSet::with_capacity(self.nodes.len());
		for node in &self.nodes {
			if !node_ids.insert(&node.id) {
				return Err(LayoutError::DuplicateNode(node.id.clone()));
			}
		}

		let mut edge_ids = HashSet::with_capacity(self.edges.len());
		for edge in &self.edges {
			if !edge_ids.insert(&edge.id) {
				return Err(LayoutError::DuplicateEdge(edge.id.clone()));
			}
			for endpoint in [&edge.node_a, &edge.node_b] {
				if !node_ids.contains(endpoint) {
					return Err(LayoutError::UnknownEndpoint {
						edge: edge.id.clone(),
						node: endpoint.clone(),
					});
				}
			}
		}
		Ok(())
	}
}

/// One entry of the position hand-off to the persistence collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
	pub id: ElementId,
	pub x: f64,
	pub y: f64,
}

/// Node positions keyed by id, in the same space as [`DeviceNode::coordinates`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionSnapshot(Vec<NodePosition>);

impl PositionSnapshot {
	pub fn new(positions: Vec<NodePosition>) -> Self {
		Self(positions)
	}

	pub fn get(&self, id: &ElementId) -> Option<Point> {
		self.0
			.iter()
			.find(|p| &p.id == id)
			.map(|p| Point::new(p.x, p.y))
	}

	pub fn iter(&self) -> impl Iterator<Item = &NodePosition> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn to_json(&self) -> Result<String, LayoutError> {
		Ok(serde_json::to_string(self)?)
	}

	/// Writes every stored position into the matching node's coordinates,
	/// pinning it there on the next ingest.
	pub fn apply_to(&self, snapshot: &mut GraphSnapshot) {
		for node in &mut snapshot.nodes {
			if let Some(p) = self.get(&node.id) {
				node.coordinates = Some([Some(p.x), Some(p.y)]);
			}
		}
	}
}
