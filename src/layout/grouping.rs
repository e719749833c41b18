//! Partitioning of connections into parallel groups.
//!
//! Connections sharing an unordered device pair form one group. Each member gets
//! a stable 1-based rank (ordered by connection id) from which the side and
//! ordinal of its arc follow.

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use super::types::{Connection, ElementId};

/// Per-edge annotation derived from its parallel group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ParallelGroup {
	pub rank: usize,
	pub group_size: usize,
	pub is_odd: bool,
	/// The odd-median member, drawn as a straight line.
	pub is_center_edge: bool,
	pub is_lower_half: bool,
	/// `0` for the lower half, `1` for the upper half.
	pub sweep_flag: u8,
	pub rank_within_half: usize,
	/// `floor(M / 2)` for the largest group size `M` in the snapshot.
	pub max_group_half: usize,
}

impl ParallelGroup {
	/// Annotation for the member at `rank` (1-based) of a group of `group_size`.
	/// `max_group_half` is left at zero until resolved for the whole snapshot.
	pub fn new(rank: usize, group_size: usize) -> Self {
		debug_assert!((1..=group_size).contains(&rank));
		let is_odd = group_size % 2 == 1;
		let upper_start = group_size.div_ceil(2);
		let is_lower_half = rank * 2 <= group_size;
		Self {
			rank,
			group_size,
			is_odd,
			is_center_edge: is_odd && upper_start == rank,
			is_lower_half,
			sweep_flag: if is_lower_half { 0 } else { 1 },
			rank_within_half: if is_lower_half {
				rank
			} else {
				rank - upper_start
			},
			max_group_half: 0,
		}
	}

	/// A lone connection between two devices.
	pub fn single() -> Self {
		Self::new(1, 1)
	}
}

/// Unordered device pair; `(a, b)` and `(b, a)` produce the same key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
	low: ElementId,
	high: ElementId,
}

impl PairKey {
	pub fn new(a: &ElementId, b: &ElementId) -> Self {
		if a <= b {
			Self {
				low: a.clone(),
				high: b.clone(),
			}
		} else {
			Self {
				low: b.clone(),
				high: a.clone(),
			}
		}
	}

	pub fn of(edge: &Connection) -> Self {
		Self::new(&edge.node_a, &edge.node_b)
	}
}

/// Annotates every edge with its rank and group shape, in input order.
///
/// `max_group_half` stays zero; see [`annotate`] for the complete pass.
pub fn group_edges(edges: &[Connection]) -> Vec<ParallelGroup> {
	let mut groups: BTreeMap<PairKey, Vec<usize>> = BTreeMap::new();
	for (i, edge) in edges.iter().enumerate() {
		groups.entry(PairKey::of(edge)).or_default().push(i);
	}

	let mut out = vec![ParallelGroup::single(); edges.len()];
	for members in groups.values_mut() {
		members.sort_by(|&a, &b| edges[a].id.cmp(&edges[b].id).then(a.cmp(&b)));
		let size = members.len();
		for (position, &edge_idx) in members.iter().enumerate() {
			out[edge_idx] = ParallelGroup::new(position + 1, size);
		}
	}
	debug!("grouped {} edges into {} device pairs", edges.len(), groups.len());
	out
}

/// `floor(max group size / 2)`, or zero when there are no edges.
pub fn resolve_max_group_half(groups: &[ParallelGroup]) -> usize {
	groups.iter().map(|g| g.group_size).max().unwrap_or(0) / 2
}

/// Groups the edges and stamps the snapshot-wide `max_group_half` on each.
pub fn annotate(edges: &[Connection]) -> Vec<ParallelGroup> {
	let mut groups = group_edges(edges);
	let max_group_half = resolve_max_group_half(&groups);
	for group in &mut groups {
		group.max_group_half = max_group_half;
	}
	groups
}
