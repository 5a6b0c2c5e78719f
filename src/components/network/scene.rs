//! Builds the drawable scene for a graph and keeps it in step with the layout.

use log::debug;

use super::animation::{Pulsation, Tween};
use super::config::{NetworkConfig, TooltipConfig};
use super::error::NetworkResult;
use super::graph::Graph;
use super::interaction::ViewTransform;
use super::simulation::SimNode;
use super::surface::Surface;
use super::theme;
use super::types::{GraphNode, Viewport};

struct LinkLine<E> {
	line: E,
	source: usize,
	target: usize,
}

struct NodeGroup<E> {
	group: E,
	circle: E,
	pulse: Pulsation,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TooltipPhase {
	Entering,
	Leaving,
}

struct Tooltip<E> {
	group: E,
	rect: E,
	node: usize,
	width: f64,
	phase: TooltipPhase,
	fade: Tween,
}

/// Owns everything drawn on a [`Surface`] for one (graph, viewport) pair.
pub struct Scene<S: Surface> {
	surface: S,
	owned: Vec<S::Element>,
	container: Option<S::Element>,
	links: Vec<LinkLine<S::Element>>,
	nodes: Vec<NodeGroup<S::Element>>,
	gradient_ids: Vec<String>,
	tooltip: Option<Tooltip<S::Element>>,
	tooltip_config: TooltipConfig,
}

impl<S: Surface> Scene<S> {
	pub fn new(surface: S) -> Self {
		Self {
			surface,
			owned: Vec::new(),
			container: None,
			links: Vec::new(),
			nodes: Vec::new(),
			gradient_ids: Vec::new(),
			tooltip: None,
			tooltip_config: TooltipConfig::default(),
		}
	}

	pub fn surface_mut(&mut self) -> &mut S {
		&mut self.surface
	}

	#[cfg(test)]
	pub fn surface_ref(&self) -> &S {
		&self.surface
	}

	/// Discards whatever is on the surface, then draws `graph` for `viewport`.
	/// A failed build leaves the surface empty.
	pub fn build(
		&mut self,
		graph: &Graph,
		viewport: Viewport,
		config: &NetworkConfig,
		now_ms: f64,
	) -> NetworkResult<()> {
		self.destroy();
		self.surface.clear();
		self.tooltip_config = config.tooltip.clone();

		if let Err(err) = self.draw(graph, viewport, config, now_ms) {
			self.destroy();
			self.surface.clear();
			return Err(err);
		}
		debug!(
			"scene built: {} nodes, {} links, {} gradients at {}x{}",
			self.nodes.len(),
			self.links.len(),
			self.gradient_ids.len(),
			viewport.width,
			viewport.height
		);
		Ok(())
	}

	fn draw(
		&mut self,
		graph: &Graph,
		viewport: Viewport,
		config: &NetworkConfig,
		now_ms: f64,
	) -> NetworkResult<()> {
		let root = self.surface.root();
		let defs = self.surface.append(&root, "defs", &[])?;
		self.owned.push(defs.clone());

		self.draw_background_gradient(&defs)?;
		self.draw_glow(&defs)?;
		for node in &graph.nodes {
			let (inner, outer) = theme::node_colors(node);
			self.radial_gradient(&defs, &node.gradient_id(), inner, outer, "80%", &[])?;
		}
		self.radial_gradient(
			&defs,
			theme::TOOLTIP_GRADIENT_ID,
			theme::TOOLTIP_COLORS.0,
			theme::TOOLTIP_COLORS.1,
			"100%",
			&[("cx", "50%"), ("cy", "50%"), ("r", "80%")],
		)?;
		self.linear_gradient(&defs, theme::CENTER_LINK_ID, theme::CENTER_LINK_COLORS)?;
		self.linear_gradient(&defs, theme::OUTER_LINK_ID, theme::OUTER_LINK_COLORS)?;

		let (w, h) = (viewport.width.to_string(), viewport.height.to_string());
		let background = self.surface.append(
			&root,
			"rect",
			&[
				("width", w.as_str()),
				("height", h.as_str()),
				("fill", url(theme::BACKGROUND_ID).as_str()),
			],
		)?;
		self.owned.push(background);

		let container = self.surface.append(&root, "g", &[])?;
		self.owned.push(container.clone());
		self.container = Some(container.clone());

		let glow = url(theme::GLOW_ID);
		let link_layer = self.surface.append(&container, "g", &[("class", "links")])?;
		for edge in &graph.edges {
			let stroke = if graph.touches_center(edge) {
				url(theme::CENTER_LINK_ID)
			} else {
				url(theme::OUTER_LINK_ID)
			};
			let line = self.surface.append(
				&link_layer,
				"line",
				&[
					("stroke", stroke.as_str()),
					("stroke-width", theme::LINK_WIDTH),
					("opacity", theme::LINK_OPACITY),
					("filter", glow.as_str()),
				],
			)?;
			self.links.push(LinkLine {
				line,
				source: edge.source,
				target: edge.target,
			});
		}

		let node_layer = self.surface.append(&container, "g", &[("class", "nodes")])?;
		for node in &graph.nodes {
			let group = self.surface.append(&node_layer, "g", &[("class", "node")])?;
			let size = theme::node_size(node);
			let circle = self.surface.append(
				&group,
				"circle",
				&[
					("r", size.to_string().as_str()),
					("fill", url(&node.gradient_id()).as_str()),
					("filter", glow.as_str()),
					("cursor", "pointer"),
				],
			)?;
			self.draw_label(&group, node)?;
			self.nodes.push(NodeGroup {
				group,
				circle,
				pulse: Pulsation::new(now_ms, size, theme::rest_radius(node), &config.pulse),
			});
		}
		Ok(())
	}

	fn draw_background_gradient(&mut self, defs: &S::Element) -> NetworkResult<()> {
		let gradient = self.surface.append(
			defs,
			"radialGradient",
			&[
				("id", theme::BACKGROUND_ID),
				("cx", "50%"),
				("cy", "50%"),
				("r", "70%"),
			],
		)?;
		for &(offset, color, opacity) in theme::BACKGROUND_STOPS {
			let stop = self.surface.append(
				&gradient,
				"stop",
				&[("offset", offset), ("stop-color", color)],
			)?;
			if let Some(opacity) = opacity {
				self.surface.set_attribute(&stop, "stop-opacity", opacity);
			}
		}
		Ok(())
	}

	fn draw_glow(&mut self, defs: &S::Element) -> NetworkResult<()> {
		let filter = self.surface.append(
			defs,
			"filter",
			&[
				("id", theme::GLOW_ID),
				("x", "-50%"),
				("y", "-50%"),
				("width", "200%"),
				("height", "200%"),
			],
		)?;
		self.surface.append(
			&filter,
			"feGaussianBlur",
			&[("stdDeviation", theme::GLOW_BLUR), ("result", "coloredBlur")],
		)?;
		let merge = self.surface.append(&filter, "feMerge", &[])?;
		self.surface.append(&merge, "feMergeNode", &[("in", "coloredBlur")])?;
		self.surface.append(&merge, "feMergeNode", &[("in", "SourceGraphic")])?;
		Ok(())
	}

	fn radial_gradient(
		&mut self,
		defs: &S::Element,
		id: &str,
		inner: &str,
		outer: &str,
		outer_offset: &str,
		extra: &[(&str, &str)],
	) -> NetworkResult<()> {
		let gradient = self.surface.append(defs, "radialGradient", &[("id", id)])?;
		self.surface.set_attributes(&gradient, extra);
		self.surface.append(
			&gradient,
			"stop",
			&[("offset", "0%"), ("stop-color", inner)],
		)?;
		self.surface.append(
			&gradient,
			"stop",
			&[("offset", outer_offset), ("stop-color", outer)],
		)?;
		self.gradient_ids.push(id.to_string());
		Ok(())
	}

	fn linear_gradient(
		&mut self,
		defs: &S::Element,
		id: &str,
		(from, to): (&str, &str),
	) -> NetworkResult<()> {
		let gradient = self.surface.append(
			defs,
			"linearGradient",
			&[
				("id", id),
				("x1", "0%"),
				("y1", "0%"),
				("x2", "100%"),
				("y2", "0%"),
			],
		)?;
		self.surface.append(&gradient, "stop", &[("offset", "0%"), ("stop-color", from)])?;
		self.surface.append(&gradient, "stop", &[("offset", "100%"), ("stop-color", to)])?;
		self.gradient_ids.push(id.to_string());
		Ok(())
	}

	fn draw_label(&mut self, group: &S::Element, node: &GraphNode) -> NetworkResult<()> {
		let text = self.surface.append(
			group,
			"text",
			&[
				("class", "title-text"),
				("text-anchor", "middle"),
				("dy", "0.35em"),
				("fill", "#FFF"),
				("font-size", theme::LABEL_FONT_SIZE),
				("font-weight", "bold"),
				("cursor", "pointer"),
			],
		)?;
		self.surface.set_text(&text, &node.label);
		Ok(())
	}

	/// Moves link endpoints and node groups to the latest layout.
	pub fn update_positions(&mut self, positions: &[SimNode]) {
		for link in &self.links {
			let (Some(s), Some(t)) = (positions.get(link.source), positions.get(link.target)) else {
				continue;
			};
			self.surface.set_attributes(
				&link.line,
				&[
					("x1", s.x.to_string().as_str()),
					("y1", s.y.to_string().as_str()),
					("x2", t.x.to_string().as_str()),
					("y2", t.y.to_string().as_str()),
				],
			);
		}
		for (node, pos) in self.nodes.iter().zip(positions) {
			let transform = format!("translate({},{})", pos.x, pos.y);
			self.surface.set_attribute(&node.group, "transform", &transform);
		}
	}

	pub fn set_transform(&mut self, transform: &ViewTransform) {
		if let Some(container) = &self.container {
			self.surface
				.set_attribute(container, "transform", &transform.to_svg());
		}
	}

	/// Advances every running animation to `now_ms`.
	pub fn animate(&mut self, now_ms: f64) {
		for node in &self.nodes {
			let r = node.pulse.radius_at(now_ms);
			self.surface.set_attribute(&node.circle, "r", &r.to_string());
		}
		self.animate_tooltip(now_ms);
	}

	fn animate_tooltip(&mut self, now_ms: f64) {
		let Some(tooltip) = &self.tooltip else {
			return;
		};
		let t = tooltip.fade.value_at(now_ms);
		let mut attrs = vec![("style", format!("opacity: {t}"))];
		if tooltip.phase == TooltipPhase::Entering {
			attrs.push(("width", (tooltip.width * t).to_string()));
			attrs.push(("height", (self.tooltip_config.height * t).to_string()));
		}
		for (name, value) in &attrs {
			self.surface.set_attribute(&tooltip.rect, name, value);
		}

		if tooltip.phase == TooltipPhase::Leaving && tooltip.fade.is_done(now_ms) {
			self.remove_tooltip();
		}
	}

	/// Replaces any tooltip with one for `node` next to its position.
	pub fn show_tooltip(
		&mut self,
		idx: usize,
		node: &GraphNode,
		at: &SimNode,
		now_ms: f64,
	) -> NetworkResult<()> {
		self.remove_tooltip();
		let Some(container) = self.container.clone() else {
			return Ok(());
		};
		let cfg = self.tooltip_config.clone();
		let (x, y) = (at.x + cfg.offset_x, at.y + cfg.offset_y);
		let group = self.surface.append(
			&container,
			"g",
			&[("class", "tooltip"), ("transform", format!("translate({x}, {y})").as_str())],
		)?;
		let corner = cfg.corner_radius.to_string();
		let rect = self.surface.append(
			&group,
			"rect",
			&[
				("width", "0"),
				("height", "0"),
				("rx", corner.as_str()),
				("ry", corner.as_str()),
				("fill", url(theme::TOOLTIP_GRADIENT_ID).as_str()),
				("filter", url(theme::GLOW_ID).as_str()),
				("style", "opacity: 0"),
			],
		)?;
		let title = self.surface.append(
			&group,
			"text",
			&[
				("class", "tooltip-title"),
				("x", "10"),
				("y", "25"),
				("fill", "#FFF"),
				("font-size", "12px"),
				("font-weight", "bold"),
			],
		)?;
		self.surface.set_text(&title, &node.label);
		let info = self.surface.append(
			&group,
			"text",
			&[
				("class", "tooltip-info"),
				("x", "10"),
				("y", "45"),
				("fill", "#EEE"),
				("font-size", "12px"),
			],
		)?;
		self.surface.set_text(&info, node.info());

		self.tooltip = Some(Tooltip {
			group,
			rect,
			node: idx,
			width: cfg.char_width * node.info().chars().count() as f64,
			phase: TooltipPhase::Entering,
			fade: Tween::new(now_ms, cfg.fade_in_ms, 0.0, 1.0),
		});
		Ok(())
	}

	/// Starts fading the tooltip out; it is removed once the fade ends.
	pub fn hide_tooltip(&mut self, now_ms: f64) {
		let fade_out_ms = self.tooltip_config.fade_out_ms;
		let Some(tooltip) = &mut self.tooltip else {
			return;
		};
		if tooltip.phase == TooltipPhase::Entering {
			debug!("hiding tooltip for node {}", tooltip.node);
			let from = tooltip.fade.value_at(now_ms);
			tooltip.phase = TooltipPhase::Leaving;
			tooltip.fade = Tween::new(now_ms, fade_out_ms, from, 0.0);
		}
	}

	fn remove_tooltip(&mut self) {
		if let Some(tooltip) = self.tooltip.take() {
			self.surface.remove(&tooltip.group);
		}
	}

	#[cfg(test)]
	pub fn tooltip_node(&self) -> Option<usize> {
		self.tooltip.as_ref().map(|t| t.node)
	}

	#[cfg(test)]
	pub fn gradient_ids(&self) -> &[String] {
		&self.gradient_ids
	}

	pub fn is_built(&self) -> bool {
		self.container.is_some()
	}

	/// Removes everything this scene drew. Safe to call repeatedly.
	pub fn destroy(&mut self) {
		self.remove_tooltip();
		for element in self.owned.drain(..) {
			self.surface.remove(&element);
		}
		self.container = None;
		self.links.clear();
		self.nodes.clear();
		self.gradient_ids.clear();
	}
}

fn url(id: &str) -> String {
	format!("url(#{id})")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network::surface::memory::MemorySurface;
	use crate::components::network::types::{GraphData, GraphLink, GraphNode};

	fn sample_graph() -> Graph {
		let node = |id: &str, label: &str, info: Option<&str>| GraphNode {
			id: id.into(),
			label: label.into(),
			info: info.map(String::from),
			url: None,
		};
		let link = |s: &str, t: &str| GraphLink {
			source: s.into(),
			target: t.into(),
		};
		Graph::new(&GraphData {
			nodes: vec![
				node("center", "Me", Some("Hello there")),
				node("games", "Games", Some("Things I play")),
				node("two-cars", "Two Cars", None),
				node("puzzle", "Puzzle", Some("A puzzle")),
			],
			links: vec![
				link("center", "games"),
				link("games", "two-cars"),
				link("center", "puzzle"),
			],
		})
		.unwrap()
	}

	fn built(viewport: Viewport) -> (Graph, Scene<MemorySurface>) {
		let graph = sample_graph();
		let mut scene = Scene::new(MemorySurface::default());
		scene
			.build(&graph, viewport, &NetworkConfig::default(), 0.0)
			.unwrap();
		(graph, scene)
	}

	fn at(x: f64, y: f64) -> SimNode {
		SimNode {
			x,
			y,
			..Default::default()
		}
	}

	#[test]
	fn defines_one_gradient_per_node_plus_fixed_ones() {
		let (graph, mut scene) = built(Viewport::new(800.0, 600.0));

		let mut expected: Vec<String> = graph.nodes.iter().map(GraphNode::gradient_id).collect();
		let fixed = ["bg-gradient", "gradient-purple", "gradient-blue", "gradient-orange"];
		expected.extend(fixed.map(String::from));
		expected.sort();
		assert_eq!(scene.surface_mut().gradient_ids(), expected);

		let mut reported = scene.gradient_ids().to_vec();
		reported.push("bg-gradient".into());
		reported.sort();
		assert_eq!(reported, expected);
	}

	#[test]
	fn colors_links_by_whether_they_touch_center() {
		let (_, mut scene) = built(Viewport::new(800.0, 600.0));
		let surface = scene.surface_mut();

		assert_eq!(surface.count("line"), 3);
		assert_eq!(surface.with_attr("stroke", "url(#gradient-blue)").len(), 2);
		assert_eq!(surface.with_attr("stroke", "url(#gradient-orange)").len(), 1);
		for line in surface.with_attr("stroke", "url(#gradient-blue)") {
			assert_eq!(surface.attr(line, "filter"), Some("url(#glow)"));
			assert_eq!(surface.attr(line, "stroke-width"), Some("3"));
		}
	}

	#[test]
	fn draws_sized_circle_and_label_per_node() {
		let (graph, mut scene) = built(Viewport::new(800.0, 600.0));
		let surface = scene.surface_mut();
		let groups = surface.with_attr("class", "node");
		assert_eq!(groups.len(), graph.len());

		for (group, node) in groups.into_iter().zip(&graph.nodes) {
			let children = surface.children(group);
			let circle = children[0];
			assert_eq!(surface.nodes[circle].tag, "circle");
			assert_eq!(
				surface.attr(circle, "r"),
				Some(theme::node_size(node).to_string().as_str())
			);
			assert_eq!(
				surface.attr(circle, "fill").map(String::from),
				Some(format!("url(#gradient-{})", node.id))
			);
			let label = children[1];
			assert_eq!(surface.nodes[label].text.as_deref(), Some(node.label.as_str()));
		}
	}

	#[test]
	fn background_covers_viewport() {
		let (_, mut scene) = built(Viewport::new(1024.0, 768.0));
		let surface = scene.surface_mut();
		let bg = surface.with_attr("fill", "url(#bg-gradient)");
		assert_eq!(bg.len(), 1);
		assert_eq!(surface.attr(bg[0], "width"), Some("1024"));
		assert_eq!(surface.attr(bg[0], "height"), Some("768"));
	}

	#[test]
	fn rebuild_replaces_previous_scene() {
		let (graph, mut scene) = built(Viewport::new(800.0, 600.0));
		let first_count = scene.surface_mut().live().len();
		let first_ids = scene.surface_mut().gradient_ids();

		scene
			.build(&graph, Viewport::new(800.0, 600.0), &NetworkConfig::default(), 10.0)
			.unwrap();
		assert_eq!(scene.surface_mut().live().len(), first_count);
		assert_eq!(scene.surface_mut().gradient_ids(), first_ids);

		scene
			.build(&graph, Viewport::new(1200.0, 900.0), &NetworkConfig::default(), 20.0)
			.unwrap();
		let surface = scene.surface_mut();
		assert_eq!(surface.count("line"), 3);
		assert_eq!(surface.with_attr("class", "node").len(), 4);
		assert_eq!(surface.count("defs"), 1);
	}

	#[test]
	fn updates_geometry_from_positions() {
		let (_, mut scene) = built(Viewport::new(800.0, 600.0));
		let positions = [at(400.0, 300.0), at(10.0, 20.0), at(30.5, 40.0), at(-5.0, 7.0)];
		scene.update_positions(&positions);

		let surface = scene.surface_mut();
		let first_line = surface.with_attr("stroke", "url(#gradient-blue)")[0];
		assert_eq!(surface.attr(first_line, "x1"), Some("400"));
		assert_eq!(surface.attr(first_line, "y2"), Some("20"));
		let orange = surface.with_attr("stroke", "url(#gradient-orange)")[0];
		assert_eq!(surface.attr(orange, "x2"), Some("30.5"));

		let groups = surface.with_attr("class", "node");
		assert_eq!(surface.attr(groups[3], "transform"), Some("translate(-5,7)"));
	}

	#[test]
	fn pulses_circles_between_full_and_rest() {
		let (graph, mut scene) = built(Viewport::new(800.0, 600.0));
		scene.animate(3500.0);
		let surface = scene.surface_mut();
		let circle = surface.children(surface.with_attr("class", "node")[1])[0];
		assert_eq!(
			surface.attr(circle, "r"),
			Some(theme::rest_radius(&graph.nodes[1]).to_string().as_str())
		);
	}

	#[test]
	fn keeps_at_most_one_tooltip() {
		let (graph, mut scene) = built(Viewport::new(800.0, 600.0));
		scene.show_tooltip(1, &graph.nodes[1], &at(50.0, 60.0), 0.0).unwrap();
		scene.show_tooltip(3, &graph.nodes[3], &at(200.0, 100.0), 5.0).unwrap();

		assert_eq!(scene.tooltip_node(), Some(3));
		let surface = scene.surface_mut();
		let tips = surface.with_attr("class", "tooltip");
		assert_eq!(tips.len(), 1);
		assert_eq!(surface.attr(tips[0], "transform"), Some("translate(300, 80)"));
		let title = surface.with_attr("class", "tooltip-title")[0];
		assert_eq!(surface.nodes[title].text.as_deref(), Some("Puzzle"));
		let info = surface.with_attr("class", "tooltip-info")[0];
		assert_eq!(surface.nodes[info].text.as_deref(), Some("A puzzle"));
	}

	#[test]
	fn tooltip_grows_in_and_fades_out() {
		let (graph, mut scene) = built(Viewport::new(800.0, 600.0));
		scene.show_tooltip(1, &graph.nodes[1], &at(0.0, 0.0), 100.0).unwrap();
		scene.animate(200.0);
		{
			let surface = scene.surface_mut();
			let rect = surface.children(surface.with_attr("class", "tooltip")[0])[0];
			// "Things I play" is 13 characters
			assert_eq!(surface.attr(rect, "width"), Some("78"));
			assert_eq!(surface.attr(rect, "height"), Some("70"));
			assert_eq!(surface.attr(rect, "style"), Some("opacity: 1"));
		}

		scene.hide_tooltip(300.0);
		scene.animate(320.0);
		assert_eq!(scene.tooltip_node(), Some(1));
		scene.animate(400.0);
		assert_eq!(scene.tooltip_node(), None);
		assert!(scene.surface_mut().with_attr("class", "tooltip").is_empty());
	}

	#[test]
	fn missing_info_gives_empty_tooltip_body() {
		let (graph, mut scene) = built(Viewport::new(800.0, 600.0));
		scene.show_tooltip(2, &graph.nodes[2], &at(0.0, 0.0), 0.0).unwrap();
		scene.animate(100.0);
		let surface = scene.surface_mut();
		let info = surface.with_attr("class", "tooltip-info")[0];
		assert_eq!(surface.nodes[info].text.as_deref(), Some(""));
		let rect = surface.children(surface.with_attr("class", "tooltip")[0])[0];
		assert_eq!(surface.attr(rect, "width"), Some("0"));
	}

	#[test]
	fn destroy_empties_surface_and_is_idempotent() {
		let (graph, mut scene) = built(Viewport::new(800.0, 600.0));
		scene.show_tooltip(0, &graph.nodes[0], &at(0.0, 0.0), 0.0).unwrap();

		scene.destroy();
		scene.destroy();
		assert!(!scene.is_built());
		assert!(scene.gradient_ids().is_empty());
		assert!(scene.surface_mut().live().is_empty());

		// nothing left to animate or move
		scene.animate(1000.0);
		scene.update_positions(&[at(1.0, 1.0)]);
		assert!(scene.surface_mut().live().is_empty());
	}

	#[test]
	fn failed_build_at_any_point_leaves_surface_empty() {
		let graph = sample_graph();
		let config = NetworkConfig::default();
		let mut failures = 0;
		for budget in 0..200 {
			let mut scene = Scene::new(MemorySurface::failing_after(budget));
			if scene.build(&graph, Viewport::new(800.0, 600.0), &config, 0.0).is_ok() {
				assert!(failures > 0);
				assert!(scene.is_built());
				return;
			}
			failures += 1;
			assert!(!scene.is_built(), "budget {budget}");
			assert!(scene.surface_mut().live().is_empty(), "budget {budget}");

			scene.destroy();
			scene.destroy();
			scene.animate(100.0);
			assert!(scene.surface_mut().live().is_empty(), "budget {budget}");
		}
		panic!("scene never finished building");
	}

	#[test]
	fn applies_view_transform_to_container() {
		let (_, mut scene) = built(Viewport::new(800.0, 600.0));
		scene.set_transform(&ViewTransform {
			x: 12.0,
			y: -4.0,
			k: 1.5,
		});
		let surface = scene.surface_mut();
		let groups = surface.with_attr("transform", "translate(12,-4) scale(1.5)");
		assert_eq!(groups.len(), 1);
		assert_eq!(surface.nodes[groups[0]].parent, Some(0));
	}
}
