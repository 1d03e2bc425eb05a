//! Iterative force-directed relaxation over the graph model.
//!
//! Each tick cools `alpha` toward `alpha_target`, accumulates many-body
//! repulsion and link springs, integrates velocities scaled by `alpha`,
//! then translates the free nodes so their centroid sits on the centre
//! point. Pinned nodes snap to their pin instead of moving freely.

use log::{debug, warn};

use super::model::GraphModel;

/// Tunables of the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutParameters {
	/// Many-body strength; negative values repel.
	pub charge_strength: f64,
	/// Distances below this are softened to avoid exploding forces.
	pub distance_min: f64,
	/// Rest length of every link spring.
	pub link_distance: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// The simulation stops once `alpha` drops below this.
	pub alpha_min: f64,
	/// Rate at which `alpha` approaches `alpha_target` per tick.
	pub alpha_decay: f64,
	/// Sustained energy while a node is dragged.
	pub drag_alpha_target: f64,
}

impl Default for LayoutParameters {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			charge_strength: -15000.0,
			distance_min: 1.0,
			link_distance: 30.0,
			velocity_decay: 0.4,
			alpha_min,
			// Reaches alpha_min from 1 in ~300 ticks.
			alpha_decay: 1.0 - f64::powf(alpha_min, 1.0 / 300.0),
			drag_alpha_target: 0.3,
		}
	}
}

/// Result of one cooperative step of the layout task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
	/// A tick ran and the layout still has energy.
	Running,
	/// A tick ran and the layout came to rest; the task stopped itself.
	Settled,
	/// The task is stopped; nothing ran.
	Idle,
}

/// Link endpoints resolved to indices into the model's node slice.
#[derive(Clone, Debug)]
struct ResolvedLink {
	source: usize,
	target: usize,
	strength: f64,
	bias: f64,
}

/// Continuous layout with a decaying energy scalar.
#[derive(Clone, Debug)]
pub struct LayoutEngine {
	parameters: LayoutParameters,
	alpha: f64,
	alpha_target: f64,
	running: bool,
	center: (f64, f64),
	links: Vec<ResolvedLink>,
	attached_revision: Option<u64>,
	forces: Vec<(f64, f64)>,
}

impl Default for LayoutEngine {
	fn default() -> Self {
		Self::with_parameters(LayoutParameters::default())
	}
}

/// Tiny deterministic offset used to separate coincident points.
fn jiggle(seed: usize) -> f64 {
	((seed % 13) as f64 - 6.5) * 1e-6
}

impl LayoutEngine {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_parameters(parameters: LayoutParameters) -> Self {
		Self {
			parameters,
			alpha: 1.0,
			alpha_target: 0.0,
			running: false,
			center: (0.0, 0.0),
			links: Vec::new(),
			attached_revision: None,
			forces: Vec::new(),
		}
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn center(&self) -> (f64, f64) {
		self.center
	}

	/// Number of links whose endpoints resolved at the last attach.
	pub fn attached_links(&self) -> usize {
		self.links.len()
	}

	/// Resolves link endpoints against the model's current node order.
	pub fn attach(&mut self, graph: &GraphModel) {
		let nodes = graph.nodes();
		let mut degree = vec![0usize; nodes.len()];
		let mut resolved = Vec::with_capacity(graph.links().len());

		for link in graph.links() {
			match (graph.index_of(link.source), graph.index_of(link.target)) {
				(Some(source), Some(target)) => {
					degree[source] += 1;
					degree[target] += 1;
					resolved.push((source, target));
				}
				_ => warn!("Layout skipped unresolved link {}", link.key()),
			}
		}

		self.links = resolved
			.into_iter()
			.map(|(source, target)| {
				let (ds, dt) = (degree[source] as f64, degree[target] as f64);
				ResolvedLink {
					source,
					target,
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
				}
			})
			.collect();
		self.attached_revision = Some(graph.revision());
	}

	/// Resumes ticking without touching `alpha`.
	pub fn restart(&mut self) {
		self.running = true;
	}

	/// Cancels the task until the next restart.
	pub fn stop(&mut self) {
		self.running = false;
	}

	/// Topology changed: re-attach and run at full energy.
	pub fn reheat(&mut self, graph: &GraphModel) {
		self.attach(graph);
		self.alpha = 1.0;
		self.restart();
		debug!(
			"Layout reheated with {} nodes, {} links",
			graph.nodes().len(),
			self.links.len()
		);
	}

	/// Keeps the layout warm while a node follows the pointer.
	pub fn drag_started(&mut self) {
		self.alpha_target = self.parameters.drag_alpha_target;
		self.restart();
	}

	/// Lets the layout cool back to rest.
	pub fn drag_ended(&mut self) {
		self.alpha_target = 0.0;
	}

	/// Moves the point the centroid is pulled to. Energy is unchanged.
	pub fn set_center(&mut self, x: f64, y: f64) {
		self.center = (x, y);
	}

	/// One frame of the cooperative layout task.
	pub fn step(&mut self, graph: &mut GraphModel) -> TickOutcome {
		if !self.running {
			return TickOutcome::Idle;
		}
		self.tick(graph);
		if self.alpha < self.parameters.alpha_min {
			self.running = false;
			debug!("Layout settled");
			TickOutcome::Settled
		} else {
			TickOutcome::Running
		}
	}

	/// Advances the simulation by one tick regardless of `running`.
	pub fn tick(&mut self, graph: &mut GraphModel) {
		if self.attached_revision != Some(graph.revision()) {
			self.attach(graph);
		}
		let p = &self.parameters;
		self.alpha += (self.alpha_target - self.alpha) * p.alpha_decay;
		let alpha = self.alpha;

		let nodes = graph.nodes_mut();
		let n = nodes.len();
		self.forces.clear();
		self.forces.resize(n, (0.0, 0.0));
		let forces = &mut self.forces;

		let distance_min2 = p.distance_min * p.distance_min;
		for i in 0..n {
			for j in (i + 1)..n {
				let (mut dx, mut dy) = (nodes[j].x - nodes[i].x, nodes[j].y - nodes[i].y);
				if dx == 0.0 && dy == 0.0 {
					(dx, dy) = (jiggle(i * 7 + j), jiggle(i + j * 5 + 3));
				}
				let mut l = dx * dx + dy * dy;
				if l < distance_min2 {
					l = (distance_min2 * l).sqrt();
				}
				let w = p.charge_strength / l;
				forces[i].0 += dx * w;
				forces[i].1 += dy * w;
				forces[j].0 -= dx * w;
				forces[j].1 -= dy * w;
			}
		}

		for link in &self.links {
			let (s, t) = (&nodes[link.source], &nodes[link.target]);
			let (mut dx, mut dy) = (t.x + t.vx - s.x - s.vx, t.y + t.vy - s.y - s.vy);
			if dx == 0.0 && dy == 0.0 {
				(dx, dy) = (jiggle(link.source), jiggle(link.target + 1));
			}
			let l = (dx * dx + dy * dy).sqrt();
			let k = (l - p.link_distance) / l * link.strength;
			let (fx, fy) = (dx * k, dy * k);
			forces[link.target].0 -= fx * link.bias;
			forces[link.target].1 -= fy * link.bias;
			forces[link.source].0 += fx * (1.0 - link.bias);
			forces[link.source].1 += fy * (1.0 - link.bias);
		}

		let damping = 1.0 - p.velocity_decay;
		for (node, &(fx, fy)) in nodes.iter_mut().zip(forces.iter()) {
			match node.fx {
				Some(pin) => {
					node.x = pin;
					node.vx = 0.0;
				}
				None => {
					node.vx += fx * alpha;
					node.x += node.vx;
					node.vx *= damping;
				}
			}
			match node.fy {
				Some(pin) => {
					node.y = pin;
					node.vy = 0.0;
				}
				None => {
					node.vy += fy * alpha;
					node.y += node.vy;
					node.vy *= damping;
				}
			}
		}

		if n > 0 {
			let (sx, sy) = nodes
				.iter()
				.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
			let (shift_x, shift_y) = (sx / n as f64 - self.center.0, sy / n as f64 - self.center.1);
			for node in nodes.iter_mut() {
				if node.fx.is_none() {
					node.x -= shift_x;
				}
				if node.fy.is_none() {
					node.y -= shift_y;
				}
			}
		}
	}
}
