//! Leptos components hosting the layout engine.

pub mod topology_canvas;
