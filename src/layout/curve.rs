//! Per-edge arc parameters.
//!
//! The radius follows the circular-arc form used for SVG paths:
//! `R = chord * max_group_half / (curvature * w)` where `w` is the edge's ordinal
//! within its half (shifted by one half for even groups so both halves stay
//! symmetric). The sampled curve uses the sagitta of that arc as its
//! semi-minor axis, so both renderings bow by the same amount.

use super::grouping::ParallelGroup;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveParams {
	/// Arc radius divided by the chord length; zero for straight edges.
	pub radius_ratio: f64,
	/// Semi-minor axis divided by half the chord length, in `(0, 1]`.
	pub bulge_ratio: f64,
	pub sweep_flag: u8,
	pub straight: bool,
}

impl CurveParams {
	pub const STRAIGHT: CurveParams = CurveParams {
		radius_ratio: 0.0,
		bulge_ratio: 0.0,
		sweep_flag: 0,
		straight: true,
	};

	pub fn resolve(group: &ParallelGroup, curvature: f64) -> Self {
		if group.is_center_edge {
			return Self::STRAIGHT;
		}
		let correction = if group.is_odd { 0.0 } else { 0.5 };
		let ordinal = group.rank_within_half as f64 - correction;
		if ordinal <= 0.0 {
			return Self::STRAIGHT;
		}
		// A snapshot-wide scale of zero would flatten every arc.
		let scale = group.max_group_half.max(1) as f64;
		let curvature = if curvature > 0.0 { curvature } else { 1.0 };
		let radius_ratio = scale / (curvature * ordinal);

		// Radius relative to half the chord; below 1 the SVG arc degenerates to a semicircle.
		let rho = 2.0 * radius_ratio;
		let bulge_ratio = if rho <= 1.0 {
			1.0
		} else {
			rho - (rho * rho - 1.0).sqrt()
		};

		Self {
			radius_ratio,
			bulge_ratio,
			sweep_flag: group.sweep_flag,
			straight: false,
		}
	}

	pub fn radius(&self, chord: f64) -> f64 {
		if self.straight {
			0.0
		} else {
			self.radius_ratio * chord
		}
	}

	/// `+1` bows towards the left-hand normal of A→B in a y-down frame, `-1` away from it.
	pub fn side(&self) -> f64 {
		if self.sweep_flag == 0 { 1.0 } else { -1.0 }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn params(rank: usize, size: usize, max_group_half: usize) -> CurveParams {
		let mut group = ParallelGroup::new(rank, size);
		group.max_group_half = max_group_half;
		CurveParams::resolve(&group, 1.3)
	}

	#[test]
	fn median_and_single_edges_are_straight() {
		assert!(params(1, 1, 0).straight);
		assert!(params(2, 3, 1).straight);
		assert_eq!(params(2, 3, 1).radius(300.0), 0.0);
	}

	#[test]
	fn mirrored_members_share_magnitude() {
		let lower = params(1, 3, 1);
		let upper = params(3, 3, 1);
		assert_eq!(lower.radius(300.0), upper.radius(300.0));
		assert_eq!(lower.side(), -upper.side());
		assert!((lower.radius(300.0) - 300.0 / 1.3).abs() < 1e-9);
	}

	#[test]
	fn outer_members_bow_further() {
		let inner = params(1, 4, 2);
		let outer = params(2, 4, 2);
		assert!(outer.radius_ratio < inner.radius_ratio);
		assert!(outer.bulge_ratio > inner.bulge_ratio);
		assert!(outer.bulge_ratio <= 1.0);
	}

	#[test]
	fn zero_scale_still_curves() {
		let mut group = ParallelGroup::new(1, 2);
		group.max_group_half = 0;
		let p = CurveParams::resolve(&group, 1.3);
		assert!(!p.straight);
		assert!(p.bulge_ratio > 0.0);
	}
}
