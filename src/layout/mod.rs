//! Layout engine for network topology diagrams.
//!
//! Parallel connections between the same pair of devices are grouped and ranked,
//! each rank is turned into a distinct arc, and devices are placed by a
//! force-directed simulation that honours pinned positions and canvas bounds.

pub mod curve;
pub mod error;
pub mod geometry;
pub mod grouping;
pub mod refresh;
pub mod session;
pub mod settings;
pub mod simulation;
pub mod types;

pub use error::LayoutError;
pub use geometry::{ArcOptions, CurveDescriptor, build_curve, describe_curve};
pub use grouping::{ParallelGroup, annotate, group_edges, resolve_max_group_half};
pub use refresh::{FetchTicket, RefreshQueue};
pub use session::{DragUpdate, LayoutFrame, LayoutSession, RenderEdge, RenderNode};
pub use settings::{DisplaySettings, LayoutConfig, LinkStatus};
pub use simulation::{ForceLayout, SimulationPhase};
pub use types::{
	Connection, DeviceNode, ElementId, GraphSnapshot, NodePosition, Point, PositionSnapshot,
};
