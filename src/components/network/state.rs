use std::cell::RefCell;
use std::rc::Rc;

use log::info;

use super::config::NetworkConfig;
use super::error::NetworkResult;
use super::graph::Graph;
use super::interaction::Interaction;
use super::scene::Scene;
use super::simulation::Simulation;
use super::surface::Surface;
use super::types::Viewport;

/// A mounted network: layout, scene and pointer state for one surface.
pub struct NetworkState<S: Surface> {
	graph: Graph,
	config: NetworkConfig,
	viewport: Viewport,
	simulation: Simulation,
	scene: Rc<RefCell<Scene<S>>>,
	interaction: Interaction,
}

impl<S: Surface + 'static> NetworkState<S> {
	pub fn new(
		graph: Graph,
		surface: S,
		viewport: Viewport,
		config: NetworkConfig,
		now_ms: f64,
	) -> NetworkResult<Self> {
		config.zoom.validate()?;
		let mut scene = Scene::new(surface);
		scene.build(&graph, viewport, &config, now_ms)?;
		let simulation = Self::start_layout(&graph, viewport, &config);
		let scene = Rc::new(RefCell::new(scene));
		let mut state = Self {
			interaction: Interaction::new(config.zoom.clone()),
			graph,
			config,
			viewport,
			simulation,
			scene,
		};
		state.bind_ticks();
		info!(
			"network mounted with {} nodes at {}x{}",
			state.graph.len(),
			viewport.width,
			viewport.height
		);
		Ok(state)
	}

	fn start_layout(graph: &Graph, viewport: Viewport, config: &NetworkConfig) -> Simulation {
		Simulation::start(graph, viewport.center(), config.simulation.clone())
	}

	fn bind_ticks(&mut self) {
		let scene = self.scene.clone();
		self.scene.borrow_mut().update_positions(self.simulation.nodes());
		self.simulation
			.on_tick(move |nodes| scene.borrow_mut().update_positions(nodes));
	}

	pub fn viewport(&self) -> Viewport {
		self.viewport
	}

	pub fn scene(&self) -> &Rc<RefCell<Scene<S>>> {
		&self.scene
	}

	/// One animation frame: a layout step, then pulses and tooltip fades.
	pub fn frame(&mut self, now_ms: f64) {
		self.simulation.tick();
		self.scene.borrow_mut().animate(now_ms);
	}

	/// Tears down layout and scene and rebuilds both for the new viewport.
	pub fn resize(&mut self, viewport: Viewport, now_ms: f64) -> NetworkResult<()> {
		if viewport == self.viewport && self.scene.borrow().is_built() {
			return Ok(());
		}
		info!(
			"viewport {}x{} -> {}x{}, rebuilding",
			self.viewport.width, self.viewport.height, viewport.width, viewport.height
		);
		self.simulation.stop();
		self.interaction.reset();
		self.viewport = viewport;
		self.scene
			.borrow_mut()
			.build(&self.graph, viewport, &self.config, now_ms)?;
		self.simulation = Self::start_layout(&self.graph, viewport, &self.config);
		self.bind_ticks();
		Ok(())
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		self.interaction.pointer_down(sx, sy);
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64, now_ms: f64) {
		let mut scene = self.scene.borrow_mut();
		self.interaction
			.pointer_move(sx, sy, &self.graph, self.simulation.nodes(), &mut scene, now_ms);
	}

	pub fn pointer_up(&mut self) {
		self.interaction.pointer_up();
	}

	pub fn pointer_leave(&mut self, now_ms: f64) {
		let mut scene = self.scene.borrow_mut();
		self.interaction
			.pointer_leave(&self.graph, self.simulation.nodes(), &mut scene, now_ms);
	}

	pub fn wheel(&mut self, sx: f64, sy: f64, factor: f64) {
		self.interaction
			.wheel(sx, sy, factor, &mut self.scene.borrow_mut());
	}

	pub fn double_click(&mut self, sx: f64, sy: f64, zoom_out: bool) {
		self.interaction
			.double_click(sx, sy, zoom_out, &mut self.scene.borrow_mut());
	}

	pub fn click(&self, sx: f64, sy: f64, open: impl FnOnce(&str)) -> bool {
		self.interaction
			.click(sx, sy, &self.graph, self.simulation.nodes(), open)
	}

	/// Stops the layout and clears the surface. Safe to call repeatedly.
	pub fn teardown(&mut self) {
		self.simulation.stop();
		self.scene.borrow_mut().destroy();
	}
}
