use super::types::ElementId;

/// Errors raised while ingesting or manipulating a topology snapshot.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
	#[error("duplicate node id: {0}")]
	DuplicateNode(ElementId),
	#[error("duplicate edge id: {0}")]
	DuplicateEdge(ElementId),
	#[error("edge {edge} references unknown node {node}")]
	UnknownEndpoint { edge: ElementId, node: ElementId },
	#[error("unknown node: {0}")]
	UnknownNode(ElementId),
	#[error("unknown edge: {0}")]
	UnknownEdge(ElementId),
	#[error("node {node} cannot move to ({x}, {y})")]
	InvalidPosition { node: ElementId, x: f64, y: f64 },
	#[error("failed to parse graph snapshot: {0}")]
	Json(#[from] serde_json::Error),
}
