use leptos::prelude::*;

use crate::components::topology_canvas::TopologyCanvas;
use crate::layout::{Connection, DeviceNode, GraphSnapshot};

/// Sample backbone: a ring of routers, some pinned, with bundles of parallel links.
fn generate_sample_topology(routers: usize) -> GraphSnapshot {
	let nodes: Vec<DeviceNode> = (0..routers)
		.map(|i| {
			let mut node = DeviceNode::new(format!("r{i}").as_str(), format!("R{}", i + 1));
			if i % 4 == 0 {
				node = node.pinned_at(120.0 + 90.0 * i as f64, 120.0);
			}
			node.reachable = rand_simple(i) > 0.1;
			node
		})
		.collect();

	let mut edges = Vec::new();
	for i in 0..routers {
		let (a, b) = (format!("r{i}"), format!("r{}", (i + 1) % routers));
		// 1 to 4 parallel links per neighbouring pair.
		let bundle = 1 + (rand_simple(i * 7) * 4.0) as usize;
		for j in 0..bundle {
			let mut edge = Connection::new(format!("{i}_{j}").as_str(), a.as_str(), b.as_str())
				.with_weight([10.0, 40.0, 100.0][j % 3]);
			edge.total_links = Some(2);
			edge.active_links = Some(if rand_simple(i + j) < 0.2 { 1 } else { 2 });
			edges.push(edge);
		}
	}

	GraphSnapshot {
		nodes,
		edges,
		..Default::default()
	}
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let topology = Signal::derive(move || generate_sample_topology(8));

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<TopologyCanvas data=topology fullscreen=true />
				<div class="graph-overlay">
					<h1>"Router Map"</h1>
					<p class="subtitle">"Drag routers to reposition. Scroll to zoom. Drag background to pan."</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sample_topology_is_valid() {
		let topology = generate_sample_topology(8);
		topology.validate().unwrap();
		assert_eq!(topology.nodes.len(), 8);
		assert!(topology.edges.len() >= 8);
	}
}
