//! Force-directed layout: link springs, many-body repulsion and a centering
//! force, integrated with velocity damping while alpha cools down.

use std::f64::consts::PI;

use super::config::SimulationParameters;
use super::graph::{Edge, Graph};

const INITIAL_RADIUS: f64 = 10.0;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimNode {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub fx: Option<f64>,
	pub fy: Option<f64>,
}

type TickCallback = Box<dyn FnMut(&[SimNode])>;

pub struct Simulation {
	nodes: Vec<SimNode>,
	edges: Vec<Edge>,
	link_strength: Vec<f64>,
	link_bias: Vec<f64>,
	params: SimulationParameters,
	center: (f64, f64),
	alpha: f64,
	rng: Lcg,
	on_tick: Vec<TickCallback>,
	stopped: bool,
}

impl Simulation {
	/// Lays the nodes out on a spiral around `center`, pins the center node
	/// there and returns a running simulation.
	pub fn start(graph: &Graph, center: (f64, f64), params: SimulationParameters) -> Self {
		let angle_step = PI * (3.0 - 5f64.sqrt());
		let nodes = (0..graph.len())
			.map(|i| {
				if i == graph.center {
					return SimNode {
						x: center.0,
						y: center.1,
						fx: Some(center.0),
						fy: Some(center.1),
						..Default::default()
					};
				}
				let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
				let angle = i as f64 * angle_step;
				SimNode {
					x: center.0 + radius * angle.cos(),
					y: center.1 + radius * angle.sin(),
					..Default::default()
				}
			})
			.collect();

		let degrees = graph.degrees();
		let (link_strength, link_bias) = graph
			.edges
			.iter()
			.map(|e| {
				let (ds, dt) = (degrees[e.source] as f64, degrees[e.target] as f64);
				(1.0 / ds.min(dt), ds / (ds + dt))
			})
			.unzip();

		Self {
			nodes,
			edges: graph.edges.clone(),
			link_strength,
			link_bias,
			params,
			center,
			alpha: 1.0,
			rng: Lcg::default(),
			on_tick: Vec::new(),
			stopped: false,
		}
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	#[cfg(test)]
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn is_running(&self) -> bool {
		!self.stopped && self.alpha >= self.params.alpha_min
	}

	pub fn on_tick(&mut self, callback: impl FnMut(&[SimNode]) + 'static) {
		if !self.stopped {
			self.on_tick.push(Box::new(callback));
		}
	}

	/// Advances one step and notifies tick listeners. Returns `false` once
	/// the simulation is stopped or has cooled below `alpha_min`.
	pub fn tick(&mut self) -> bool {
		if !self.is_running() {
			return false;
		}
		self.alpha += (self.params.alpha_target - self.alpha) * self.params.alpha_decay;

		self.apply_links();
		self.apply_charge();
		self.apply_center();
		self.integrate();

		for callback in &mut self.on_tick {
			callback(&self.nodes);
		}
		true
	}

	/// Halts the simulation for good. Safe to call repeatedly.
	pub fn stop(&mut self) {
		if self.stopped {
			return;
		}
		self.stopped = true;
		self.on_tick.clear();
	}

	fn apply_links(&mut self) {
		for (i, edge) in self.edges.iter().enumerate() {
			let (s, t) = (&self.nodes[edge.source], &self.nodes[edge.target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			let mut y = t.y + t.vy - s.y - s.vy;
			if x == 0.0 {
				x = self.rng.jiggle();
			}
			if y == 0.0 {
				y = self.rng.jiggle();
			}
			let mut l = (x * x + y * y).sqrt();
			l = (l - self.params.link_distance) / l * self.alpha * self.link_strength[i];
			x *= l;
			y *= l;

			let b = self.link_bias[i];
			let t = &mut self.nodes[edge.target];
			t.vx -= x * b;
			t.vy -= y * b;
			let s = &mut self.nodes[edge.source];
			s.vx += x * (1.0 - b);
			s.vy += y * (1.0 - b);
		}
	}

	fn apply_charge(&mut self) {
		let min2 = self.params.charge_distance_min * self.params.charge_distance_min;
		let weight = self.params.charge_strength * self.alpha;
		let mut deltas = vec![(0.0, 0.0); self.nodes.len()];

		for (i, delta) in deltas.iter_mut().enumerate() {
			for j in 0..self.nodes.len() {
				if i == j {
					continue;
				}
				let mut x = self.nodes[j].x - self.nodes[i].x;
				let mut y = self.nodes[j].y - self.nodes[i].y;
				let mut l = x * x + y * y;
				if x == 0.0 {
					x = self.rng.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.rng.jiggle();
					l += y * y;
				}
				if l < min2 {
					l = (min2 * l).sqrt();
				}
				delta.0 += x * weight / l;
				delta.1 += y * weight / l;
			}
		}

		for (node, (dx, dy)) in self.nodes.iter_mut().zip(deltas) {
			node.vx += dx;
			node.vy += dy;
		}
	}

	fn apply_center(&mut self) {
		if self.nodes.is_empty() {
			return;
		}
		let n = self.nodes.len() as f64;
		let (sx, sy) = self
			.nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let (sx, sy) = (sx / n - self.center.0, sy / n - self.center.1);
		for node in &mut self.nodes {
			node.x -= sx;
			node.y -= sy;
		}
	}

	fn integrate(&mut self) {
		let keep = 1.0 - self.params.velocity_decay;
		for node in &mut self.nodes {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= keep;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= keep;
					node.y += node.vy;
				}
			}
		}
	}
}

/// Deterministic generator used to separate coincident nodes.
struct Lcg(u64);

impl Default for Lcg {
	fn default() -> Self {
		Lcg(1)
	}
}

impl Lcg {
	const A: u64 = 1_664_525;
	const C: u64 = 1_013_904_223;
	const M: u64 = 1 << 32;

	fn next_unit(&mut self) -> f64 {
		self.0 = (Self::A * self.0 + Self::C) % Self::M;
		self.0 as f64 / Self::M as f64
	}

	fn jiggle(&mut self) -> f64 {
		(self.next_unit() - 0.5) * 1e-6
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::rc::Rc;

	use super::*;
	use crate::components::network::types::{GraphData, GraphLink, GraphNode};

	fn star(satellites: &[&str]) -> Graph {
		let mut nodes = vec![GraphNode {
			id: "center".into(),
			label: "Home".into(),
			info: None,
			url: None,
		}];
		let mut links = Vec::new();
		for id in satellites {
			nodes.push(GraphNode {
				id: (*id).into(),
				label: (*id).into(),
				info: None,
				url: None,
			});
			links.push(GraphLink {
				source: "center".into(),
				target: (*id).into(),
			});
		}
		Graph::new(&GraphData { nodes, links }).unwrap()
	}

	fn distance(a: &SimNode, b: &SimNode) -> f64 {
		((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
	}

	#[test]
	fn center_stays_pinned_on_every_tick() {
		let graph = star(&["games", "portfolio", "puzzle", "blog"]);
		let mut sim = Simulation::start(&graph, (400.0, 300.0), SimulationParameters::default());
		let ticks = Rc::new(Cell::new(0));
		let counter = ticks.clone();
		sim.on_tick(move |nodes| {
			counter.set(counter.get() + 1);
			assert_eq!((nodes[0].x, nodes[0].y), (400.0, 300.0));
		});

		while sim.tick() {}
		assert!(ticks.get() > 250);
		assert_eq!((sim.nodes()[0].x, sim.nodes()[0].y), (400.0, 300.0));
	}

	#[test]
	fn settles_and_stops_ticking() {
		let graph = star(&["games", "portfolio"]);
		let mut sim = Simulation::start(&graph, (0.0, 0.0), SimulationParameters::default());
		let mut ticks = 0;
		while sim.tick() {
			ticks += 1;
		}
		assert!((299..=301).contains(&ticks), "settled after {ticks} ticks");
		assert!(sim.alpha() < 0.001);
		assert!(!sim.is_running());
	}

	#[test]
	fn spreads_satellites_around_center() {
		let graph = star(&["games", "portfolio", "puzzle"]);
		let mut sim = Simulation::start(&graph, (600.0, 450.0), SimulationParameters::default());
		while sim.tick() {}

		let nodes = sim.nodes();
		for satellite in &nodes[1..] {
			let d = distance(&nodes[0], satellite);
			assert!(d > 200.0, "satellite too close to center: {d}");
			assert!(d < 2000.0, "satellite drifted away: {d}");
		}
		assert!(distance(&nodes[1], &nodes[2]) > 200.0);
		assert!(distance(&nodes[2], &nodes[3]) > 200.0);
	}

	#[test]
	fn identical_inputs_give_identical_layouts() {
		let graph = star(&["games", "portfolio", "puzzle"]);
		let run = || {
			let params = SimulationParameters::default();
			let mut sim = Simulation::start(&graph, (100.0, 100.0), params);
			for _ in 0..50 {
				sim.tick();
			}
			sim.nodes().to_vec()
		};
		assert_eq!(run(), run());
	}

	#[test]
	fn stop_is_terminal_and_idempotent() {
		let graph = star(&["games"]);
		let mut sim = Simulation::start(&graph, (0.0, 0.0), SimulationParameters::default());
		let ticks = Rc::new(Cell::new(0));
		let counter = ticks.clone();
		sim.on_tick(move |_| counter.set(counter.get() + 1));

		assert!(sim.tick());
		sim.stop();
		sim.stop();
		let frozen = sim.nodes().to_vec();

		assert!(!sim.tick());
		assert_eq!(ticks.get(), 1);
		assert_eq!(sim.nodes(), frozen.as_slice());

		sim.on_tick(|_| panic!("listener registered after stop"));
		assert!(!sim.tick());
	}
}
