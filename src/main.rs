use leptos::prelude::*;
use router_map_layout::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App);
}
