//! Curve construction between two device positions.

use std::f64::consts::PI;

use serde::Serialize;

use super::curve::CurveParams;
use super::grouping::ParallelGroup;
use super::settings::LayoutConfig;
use super::types::Point;

const COINCIDENT_EPSILON: f64 = 1e-9;

/// Shape options shared by every curve of a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcOptions {
	pub curvature: f64,
	pub min_bulge: f64,
	pub loop_radius: f64,
	pub samples: usize,
}

impl Default for ArcOptions {
	fn default() -> Self {
		Self::from(&LayoutConfig::default())
	}
}

impl From<&LayoutConfig> for ArcOptions {
	fn from(config: &LayoutConfig) -> Self {
		Self {
			curvature: config.curvature,
			min_bulge: config.min_bulge,
			loop_radius: config.loop_radius,
			samples: config.curve_samples.max(3),
		}
	}
}

/// Everything a renderer needs to draw one connection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CurveDescriptor {
	pub source: Point,
	pub target: Point,
	/// Radius of the circular arc with the same endpoints and apex. Zero for a straight line.
	pub radius: f64,
	/// Set when the arc bows out by more than half its chord.
	pub large_arc: bool,
	pub sweep_flag: u8,
	/// Polyline from `source` to `target`.
	pub points: Vec<Point>,
	/// Point at half the curve's length.
	pub label_anchor: Point,
}

impl CurveDescriptor {
	pub fn is_straight(&self) -> bool {
		self.radius == 0.0
	}

	/// Closed-form SVG path for the same curve.
	pub fn svg_path(&self) -> String {
		let (s, t) = (self.source, self.target);
		if self.is_straight() {
			return format!("M{},{}L{},{}", s.x, s.y, t.x, t.y);
		}
		if s.distance(t) < COINCIDENT_EPSILON {
			// An arc with identical endpoints is not drawn at all; split the loop in two.
			let apex = self.label_anchor;
			let r = self.radius;
			let f = self.sweep_flag;
			return format!(
				"M{},{}A{r},{r} 0 1,{f} {},{}A{r},{r} 0 1,{f} {},{}",
				s.x, s.y, apex.x, apex.y, t.x, t.y
			);
		}
		format!(
			"M{},{}A{},{} 0 {},{} {},{}",
			s.x,
			s.y,
			self.radius,
			self.radius,
			u8::from(self.large_arc),
			self.sweep_flag,
			t.x,
			t.y
		)
	}
}

/// Samples the curve for `group` between `a` and `b`.
///
/// Straight edges yield `[a, b]`. Other edges trace a half-ellipse whose major
/// axis is the segment itself, rotated into place about the segment's midpoint.
pub fn build_curve(group: &ParallelGroup, a: Point, b: Point, options: &ArcOptions) -> Vec<Point> {
	let params = CurveParams::resolve(group, options.curvature);
	if params.straight {
		return vec![a, b];
	}

	let q = a.distance(b) / 2.0;
	if q < COINCIDENT_EPSILON {
		return self_loop(a, loop_radius(group, options), params.side(), options.samples);
	}

	let r = sagitta(&params, q, options);
	let center = a.midpoint(b);
	let angle = (b.y - a.y).atan2(b.x - a.x);
	half_ellipse(q, r * params.side(), options.samples)
		.into_iter()
		.map(|p| rotate_about(p, angle, center))
		.collect()
}

/// Builds the full descriptor, including the closed-form radius and label anchor.
pub fn describe_curve(
	group: &ParallelGroup,
	a: Point,
	b: Point,
	options: &ArcOptions,
) -> CurveDescriptor {
	let params = CurveParams::resolve(group, options.curvature);
	let points = build_curve(group, a, b, options);
	let q = a.distance(b) / 2.0;
	let (radius, large_arc) = if params.straight {
		(0.0, false)
	} else if q < COINCIDENT_EPSILON {
		(loop_radius(group, options), true)
	} else {
		let s = sagitta(&params, q, options);
		if s > params.bulge_ratio * q {
			// Floored bulge: the circle through both endpoints with its apex at `s`.
			((q * q + s * s) / (2.0 * s), s > q)
		} else {
			(params.radius(2.0 * q), false)
		}
	};
	CurveDescriptor {
		source: a,
		target: b,
		radius,
		large_arc,
		sweep_flag: params.sweep_flag,
		label_anchor: point_at_half_length(&points),
		points,
	}
}

/// The point at half the polyline's arc length.
pub fn point_at_half_length(points: &[Point]) -> Point {
	let Some(&first) = points.first() else {
		return Point::default();
	};
	let total: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
	let mut remaining = total / 2.0;
	for w in points.windows(2) {
		let len = w[0].distance(w[1]);
		if len >= remaining && len > 0.0 {
			return w[0].lerp(w[1], remaining / len);
		}
		remaining -= len;
	}
	points.last().copied().unwrap_or(first)
}

/// Distance from the chord's midpoint to the apex, floored at `min_bulge`.
fn sagitta(params: &CurveParams, q: f64, options: &ArcOptions) -> f64 {
	(params.bulge_ratio * q).max(options.min_bulge)
}

fn loop_radius(group: &ParallelGroup, options: &ArcOptions) -> f64 {
	options.loop_radius * group.rank_within_half.max(1) as f64
}

/// Half-ellipse in a local frame: from `(-q, 0)` through `(0, r)` to `(q, 0)`.
fn half_ellipse(q: f64, r: f64, samples: usize) -> Vec<Point> {
	let last = (samples - 1) as f64;
	(0..samples)
		.map(|i| {
			let theta = PI * i as f64 / last;
			Point::new(-q * theta.cos(), r * theta.sin())
		})
		.collect()
}

fn rotate_about(p: Point, angle: f64, center: Point) -> Point {
	let (sin, cos) = angle.sin_cos();
	Point::new(
		center.x + p.x * cos - p.y * sin,
		center.y + p.x * sin + p.y * cos,
	)
}

/// Closed loop of radius `radius` leaving `at` towards `side`.
fn self_loop(at: Point, radius: f64, side: f64, samples: usize) -> Vec<Point> {
	let last = (samples - 1) as f64;
	let center = Point::new(at.x, at.y + side * radius);
	(0..samples)
		.map(|i| {
			let theta = 2.0 * PI * i as f64 / last;
			Point::new(
				center.x + radius * theta.sin(),
				center.y - side * radius * theta.cos(),
			)
		})
		.collect()
}
