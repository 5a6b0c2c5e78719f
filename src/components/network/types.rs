use serde::{Deserialize, Serialize};

/// Id of the node pinned to the middle of the viewport.
pub const CENTER_ID: &str = "center";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	pub id: String,
	pub label: String,
	#[serde(default)]
	pub info: Option<String>,
	#[serde(default)]
	pub url: Option<String>,
}

impl GraphNode {
	pub fn is_center(&self) -> bool {
		self.id == CENTER_ID
	}

	/// Tooltip body, empty when the dataset carries no info.
	pub fn info(&self) -> &str {
		self.info.as_deref().unwrap_or_default()
	}

	pub fn gradient_id(&self) -> String {
		format!("gradient-{}", self.id)
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl GraphData {
	pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(raw)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}
}
