//! Validated, index-resolved view of a [`GraphData`].

use std::collections::HashMap;

use super::error::{NetworkError, NetworkResult};
use super::theme::{CENTER_LINK_ID, OUTER_LINK_ID, TOOLTIP_GRADIENT_ID};
use super::types::{CENTER_ID, GraphData, GraphNode};

/// A link resolved into node indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
	pub source: usize,
	pub target: usize,
}

#[derive(Clone, Debug)]
pub struct Graph {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<Edge>,
	pub center: usize,
}

impl Graph {
	/// Checks every dataset invariant and resolves link ids to indices.
	/// Nothing is rendered or simulated for a dataset that fails here.
	pub fn new(data: &GraphData) -> NetworkResult<Self> {
		let mut id_to_idx = HashMap::with_capacity(data.nodes.len());
		for (i, node) in data.nodes.iter().enumerate() {
			let reserved = RESERVED_GRADIENTS.contains(&node.gradient_id().as_str());
			if reserved || !is_gradient_safe(&node.id) {
				return Err(NetworkError::InvalidGradientId {
					id: node.id.clone(),
				});
			}
			if id_to_idx.insert(node.id.as_str(), i).is_some() {
				return Err(NetworkError::DuplicateNodeId {
					id: node.id.clone(),
				});
			}
		}

		let center = *id_to_idx.get(CENTER_ID).ok_or(NetworkError::MissingCenter)?;

		let edges = data
			.links
			.iter()
			.map(|link| {
				let lookup = |id: &String| {
					id_to_idx
						.get(id.as_str())
						.copied()
						.ok_or_else(|| NetworkError::UnknownEndpoint {
							from: link.source.clone(),
							to: link.target.clone(),
							missing: id.clone(),
						})
				};
				Ok(Edge {
					source: lookup(&link.source)?,
					target: lookup(&link.target)?,
				})
			})
			.collect::<NetworkResult<Vec<_>>>()?;

		Ok(Self {
			nodes: data.nodes.clone(),
			edges,
			center,
		})
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn touches_center(&self, edge: &Edge) -> bool {
		edge.source == self.center || edge.target == self.center
	}

	/// Number of link endpoints at each node.
	pub fn degrees(&self) -> Vec<usize> {
		let mut degrees = vec![0; self.nodes.len()];
		for edge in &self.edges {
			degrees[edge.source] += 1;
			degrees[edge.target] += 1;
		}
		degrees
	}
}

/// Gradients the scene defines for itself; no node may shadow them.
const RESERVED_GRADIENTS: [&str; 3] = [TOOLTIP_GRADIENT_ID, CENTER_LINK_ID, OUTER_LINK_ID];

/// `url(#gradient-<id>)` only resolves for ids made of name characters.
fn is_gradient_safe(id: &str) -> bool {
	!id.is_empty()
		&& id
			.chars()
			.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
