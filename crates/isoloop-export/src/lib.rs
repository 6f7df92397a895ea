//! isoloop-export: Pure format serializers (sans-IO)
//!
//! Renders reconstructed loops for inspection. Currently supports SVG.

pub mod svg;

pub use svg::{SvgMetadata, build_path_data, to_svg};
