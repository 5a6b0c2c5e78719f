//! Errors raised while loading, validating or mounting a network.

use thiserror::Error;

pub type NetworkResult<T> = Result<T, NetworkError>;

/// Everything that can refuse a network before the simulation starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
	/// Two nodes share the same id.
	#[error("duplicate node id: {id}")]
	DuplicateNodeId { id: String },

	/// A link endpoint names a node that is not in the dataset.
	#[error("link {from} -> {to} references unknown node {missing}")]
	UnknownEndpoint {
		from: String,
		to: String,
		missing: String,
	},

	/// No node carries the center id.
	#[error("dataset has no \"center\" node")]
	MissingCenter,

	/// The id cannot be used to reference its `gradient-<id>` definition.
	#[error("node id {id:?} cannot name a gradient")]
	InvalidGradientId { id: String },

	/// The zoom bounds are not a usable scale range.
	#[error("invalid zoom extent [{min_scale}, {max_scale}]")]
	InvalidZoomExtent { min_scale: f64, max_scale: f64 },

	/// The bundled or supplied dataset is not valid JSON.
	#[error("dataset parse error: {0}")]
	Parse(String),

	/// The browser refused a DOM operation.
	#[error("surface error: {0}")]
	Surface(String),
}

impl From<serde_json::Error> for NetworkError {
	fn from(err: serde_json::Error) -> Self {
		NetworkError::Parse(err.to_string())
	}
}

impl From<wasm_bindgen::JsValue> for NetworkError {
	fn from(value: wasm_bindgen::JsValue) -> Self {
		NetworkError::Surface(value.as_string().unwrap_or_else(|| format!("{value:?}")))
	}
}
