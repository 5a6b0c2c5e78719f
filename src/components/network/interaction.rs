//! Pointer handling: zoom/pan of the view, hover tooltips and click-through.

use log::warn;

use super::config::ZoomConfig;
use super::graph::Graph;
use super::scene::Scene;
use super::simulation::SimNode;
use super::surface::Surface;
use super::theme;

/// Translate-then-scale transform applied to the zoomable container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn to_svg(&self) -> String {
		format!("translate({},{}) scale({})", self.x, self.y, self.k)
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Scales by `factor` around the screen point `(sx, sy)`, keeping the
	/// resulting scale inside the configured extent.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64, extent: &ZoomConfig) {
		let lo = extent.min_scale.min(extent.max_scale);
		let hi = extent.min_scale.max(extent.max_scale);
		if lo.is_nan() || hi.is_nan() {
			return;
		}
		let new_k = (self.k * factor).clamp(lo, hi);
		if !new_k.is_finite() || new_k <= 0.0 {
			return;
		}
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}
}

/// Zoom factor for one wheel event, following the browser's delta units
/// (0 pixels, 1 lines, 2 pages).
pub fn wheel_factor(delta_y: f64, delta_mode: u32, ctrl: bool) -> f64 {
	let unit = match delta_mode {
		0 => 0.002,
		1 => 0.05,
		_ => 1.0,
	};
	let boost = if ctrl { 10.0 } else { 1.0 };
	2f64.powf(-delta_y * unit * boost)
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

pub struct Interaction {
	pub transform: ViewTransform,
	pub pan: PanState,
	hovered: Option<usize>,
	extent: ZoomConfig,
}

impl Interaction {
	pub fn new(extent: ZoomConfig) -> Self {
		Self {
			transform: ViewTransform::default(),
			pan: PanState::default(),
			hovered: None,
			extent,
		}
	}

	#[cfg(test)]
	pub fn hovered(&self) -> Option<usize> {
		self.hovered
	}

	/// Topmost node whose circle covers the screen point.
	pub fn node_at(&self, sx: f64, sy: f64, graph: &Graph, positions: &[SimNode]) -> Option<usize> {
		let (gx, gy) = self.transform.screen_to_graph(sx, sy);
		graph
			.nodes
			.iter()
			.zip(positions)
			.enumerate()
			.rev()
			.find(|(_, (node, pos))| {
				let (dx, dy) = (pos.x - gx, pos.y - gy);
				(dx * dx + dy * dy).sqrt() <= theme::node_size(node)
			})
			.map(|(idx, _)| idx)
	}

	/// Moves between `Idle` and `Hovered`, swapping the tooltip as needed.
	pub fn set_hover<S: Surface>(
		&mut self,
		node: Option<usize>,
		graph: &Graph,
		positions: &[SimNode],
		scene: &mut Scene<S>,
		now_ms: f64,
	) {
		if self.hovered == node {
			return;
		}
		self.hovered = node;
		match node {
			Some(idx) => {
				let (Some(data), Some(pos)) = (graph.nodes.get(idx), positions.get(idx)) else {
					return;
				};
				if let Err(err) = scene.show_tooltip(idx, data, pos, now_ms) {
					warn!("tooltip for {} not shown: {err}", data.id);
				}
			}
			None => scene.hide_tooltip(now_ms),
		}
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			moved: false,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn pointer_move<S: Surface>(
		&mut self,
		sx: f64,
		sy: f64,
		graph: &Graph,
		positions: &[SimNode],
		scene: &mut Scene<S>,
		now_ms: f64,
	) {
		if self.pan.active {
			if sx != self.pan.start_x || sy != self.pan.start_y {
				self.pan.moved = true;
			}
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
			scene.set_transform(&self.transform);
		} else {
			let hit = self.node_at(sx, sy, graph, positions);
			self.set_hover(hit, graph, positions, scene, now_ms);
		}
	}

	pub fn pointer_up(&mut self) {
		self.pan.active = false;
	}

	pub fn pointer_leave<S: Surface>(
		&mut self,
		graph: &Graph,
		positions: &[SimNode],
		scene: &mut Scene<S>,
		now_ms: f64,
	) {
		self.pan.active = false;
		self.set_hover(None, graph, positions, scene, now_ms);
	}

	pub fn wheel<S: Surface>(&mut self, sx: f64, sy: f64, factor: f64, scene: &mut Scene<S>) {
		self.transform.zoom_at(sx, sy, factor, &self.extent);
		scene.set_transform(&self.transform);
	}

	pub fn double_click<S: Surface>(
		&mut self,
		sx: f64,
		sy: f64,
		zoom_out: bool,
		scene: &mut Scene<S>,
	) {
		let factor = if zoom_out { 0.5 } else { 2.0 };
		self.wheel(sx, sy, factor, scene);
	}

	/// Resolves a click to the url of the node under the pointer, if any,
	/// and hands it to `open`. Clicks that ended a drag are ignored.
	pub fn click(
		&self,
		sx: f64,
		sy: f64,
		graph: &Graph,
		positions: &[SimNode],
		open: impl FnOnce(&str),
	) -> bool {
		if self.pan.moved {
			return false;
		}
		let url = self
			.node_at(sx, sy, graph, positions)
			.and_then(|idx| graph.nodes[idx].url.as_deref());
		match url {
			Some(url) => {
				open(url);
				true
			}
			None => false,
		}
	}

	/// Back to the identity view, as after a rebuild.
	pub fn reset(&mut self) {
		self.transform = ViewTransform::default();
		self.pan = PanState::default();
		self.hovered = None;
	}
}
