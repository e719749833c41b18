use serde::{Deserialize, Serialize};

use super::types::Connection;

/// Simulation and geometry parameters. Loaded once per session; every field has a default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	pub width: f64,
	pub height: f64,
	pub node_radius: f64,
	/// Synchronous steps run on every ingest.
	pub iterations: usize,
	pub time_step: f32,
	/// Target separation between linked devices.
	pub link_distance: f64,
	pub link_strength: f64,
	pub center_strength: f64,
	pub force_charge: f32,
	pub force_spring: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping_factor: f32,
	pub node_mass: f32,
	/// Larger values flatten every arc.
	pub curvature: f64,
	/// Smallest distance an arc may bow away from the straight line.
	pub min_bulge: f64,
	/// Radius of the loop drawn for non-straight edges between coincident endpoints.
	pub loop_radius: f64,
	/// Points per sampled curve, endpoints included.
	pub curve_samples: usize,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			width: 960.0,
			height: 640.0,
			node_radius: 21.0,
			iterations: 100,
			time_step: 0.016,
			link_distance: 150.0,
			link_strength: 0.1,
			center_strength: 0.5,
			force_charge: 1500.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			node_mass: 10.0,
			curvature: 1.3,
			min_bulge: 4.0,
			loop_radius: 12.0,
			curve_samples: 51,
		}
	}
}

impl LayoutConfig {
	pub fn with_canvas(mut self, width: f64, height: f64) -> Self {
		self.width = width;
		self.height = height;
		self
	}
}

/// User-configurable display options, supplied with each snapshot.
///
/// Read-only input to rendering; layout never consults it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
	#[serde(alias = "display_link_descriptions")]
	pub show_labels: bool,
	#[serde(alias = "links_default_width")]
	pub default_width: f64,
	#[serde(alias = "highlighted_links_width")]
	pub featured_width: Option<f64>,
	#[serde(alias = "highlighted_links_range_min")]
	pub featured_min: Option<f64>,
	#[serde(alias = "highlighted_links_range_max")]
	pub featured_max: Option<f64>,
}

impl Default for DisplaySettings {
	fn default() -> Self {
		Self {
			show_labels: true,
			default_width: 3.0,
			featured_width: None,
			featured_min: None,
			featured_max: None,
		}
	}
}

/// Operational state of an aggregated connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkStatus {
	Active,
	PartiallyActive,
	Inactive,
}

impl LinkStatus {
	pub fn of(edge: &Connection) -> Self {
		match (edge.active_links, edge.total_links) {
			(Some(active), Some(total)) if active == total => LinkStatus::Active,
			(Some(0), _) => LinkStatus::Inactive,
			(Some(_), Some(_)) => LinkStatus::PartiallyActive,
			_ => LinkStatus::Active,
		}
	}

	pub fn color(self) -> &'static str {
		match self {
			LinkStatus::Active => "#666b6d",
			LinkStatus::PartiallyActive => "#ff9f00",
			LinkStatus::Inactive => "#ba0e00",
		}
	}
}

impl DisplaySettings {
	/// Line width for a link of the given capacity.
	pub fn link_width(&self, weight: f64) -> f64 {
		match (self.featured_width, self.featured_min, self.featured_max) {
			(Some(width), Some(min), Some(max)) if width > 0.0 && (min..=max).contains(&weight) => {
				width
			}
			_ => self.default_width,
		}
	}

	/// Label such as `3/4×10G`, or `None` when labels are switched off.
	pub fn link_label(&self, edge: &Connection) -> Option<String> {
		if !self.show_labels {
			return None;
		}
		Some(match (edge.active_links, edge.total_links) {
			(Some(active), Some(total)) => format!("{active}/{total}\u{d7}{}G", edge.weight),
			_ => format!("{}G", edge.weight),
		})
	}
}
