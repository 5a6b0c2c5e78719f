use super::types::GraphNode;

pub const BACKGROUND_ID: &str = "bg-gradient";
pub const GLOW_ID: &str = "glow";
pub const TOOLTIP_GRADIENT_ID: &str = "gradient-purple";
pub const CENTER_LINK_ID: &str = "gradient-blue";
pub const OUTER_LINK_ID: &str = "gradient-orange";

/// `(offset, color, opacity)` stops of the page background.
pub const BACKGROUND_STOPS: &[(&str, &str, Option<&str>)] = &[
	("0%", "#0b0f2a", None),
	("50%", "#121d42", Some("0.8")),
	("100%", "#000", None),
];

pub const CENTER_NODE_COLORS: (&str, &str) = ("#00A6FF", "#003366");
pub const OUTER_NODE_COLORS: (&str, &str) = ("#FF8800", "#662200");
pub const TOOLTIP_COLORS: (&str, &str) = ("#A855F7", "#440055");
pub const CENTER_LINK_COLORS: (&str, &str) = ("#00E6E6", "#0055FF");
pub const OUTER_LINK_COLORS: (&str, &str) = ("#FF8800", "#FF3300");

pub const LINK_WIDTH: &str = "3";
pub const LINK_OPACITY: &str = "0.8";
pub const GLOW_BLUR: &str = "6";
pub const LABEL_FONT_SIZE: &str = "12px";

fn label_len(node: &GraphNode) -> f64 {
	node.label.chars().count() as f64
}

/// Full radius of a node circle.
pub fn node_size(node: &GraphNode) -> f64 {
	if node.is_center() {
		label_len(node) * 5.0 + 30.0
	} else {
		label_len(node) * 4.0 + 15.0
	}
}

/// Radius a node shrinks to at the low point of its pulse.
pub fn rest_radius(node: &GraphNode) -> f64 {
	if node.is_center() {
		label_len(node) * 5.0
	} else {
		label_len(node) * 4.0
	}
}

pub fn node_colors(node: &GraphNode) -> (&'static str, &'static str) {
	if node.is_center() {
		CENTER_NODE_COLORS
	} else {
		OUTER_NODE_COLORS
	}
}
