//! One editing session: the graph plus everything that observes it.

use log::info;

use super::error::GraphResult;
use super::interaction::{InteractionController, ModeKind};
use super::layout::{LayoutEngine, TickOutcome};
use super::model::GraphModel;
use super::sync::{ReconcileReport, Scene};
use super::types::{NodeId, NodeOption};

/// Read-only projection of the session for the surrounding UI.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphSnapshot {
	pub nodes: Vec<NodeOption>,
	pub description: Vec<String>,
	pub mode: ModeKind,
}

/// Owns the graph and lends it to the layout, interaction and scene.
#[derive(Debug)]
pub struct EditorSession {
	graph: GraphModel,
	layout: LayoutEngine,
	interaction: InteractionController,
	scene: Scene,
	viewport: (f64, f64),
}

impl EditorSession {
	/// Starts a session over `graph` in drag mode with the layout running.
	pub fn new(graph: GraphModel, width: f64, height: f64) -> Self {
		Self::with_layout(graph, LayoutEngine::new(), width, height)
	}

	pub fn with_layout(graph: GraphModel, layout: LayoutEngine, width: f64, height: f64) -> Self {
		let mut session = Self {
			graph,
			layout,
			interaction: InteractionController::new(),
			scene: Scene::new(),
			viewport: (0.0, 0.0),
		};
		session.resize(width, height);
		session.sync();
		session.toggle_drag();
		info!(
			"Editor session started with {} nodes ({}x{})",
			session.graph.nodes().len(),
			width,
			height
		);
		session
	}

	pub fn graph(&self) -> &GraphModel {
		&self.graph
	}

	pub fn layout(&self) -> &LayoutEngine {
		&self.layout
	}

	pub fn interaction(&self) -> &InteractionController {
		&self.interaction
	}

	pub fn scene(&self) -> &Scene {
		&self.scene
	}

	pub fn viewport(&self) -> (f64, f64) {
		self.viewport
	}

	/// Reconciles the scene, re-attaches interaction and reheats the layout.
	fn sync(&mut self) -> ReconcileReport {
		let report = self.scene.reconcile(&self.graph);
		self.interaction.refresh(&self.graph, &mut self.layout);
		self.layout.reheat(&self.graph);
		report
	}

	pub fn add_node(&mut self, kind: &str, description: &str, source: NodeId) -> GraphResult<NodeId> {
		let id = self.graph.add_node(kind, description, source)?.id;
		self.sync();
		Ok(id)
	}

	pub fn add_link(&mut self, source: NodeId, target: NodeId) -> GraphResult<()> {
		self.graph.add_link(source, target)?;
		self.sync();
		Ok(())
	}

	/// Returns whether a node was removed.
	pub fn remove_node(&mut self, id: NodeId) -> bool {
		let removed = self.graph.remove_node(id).is_some();
		if removed {
			self.sync();
		}
		removed
	}

	pub fn toggle_drag(&mut self) -> ModeKind {
		self.interaction.toggle_drag(&mut self.graph, &mut self.layout);
		self.interaction.mode_kind()
	}

	pub fn toggle_zoom(&mut self) -> ModeKind {
		self.interaction.toggle_zoom(&mut self.graph, &mut self.layout);
		self.interaction.mode_kind()
	}

	pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
		self.interaction
			.pointer_down((x, y), &mut self.graph, &mut self.layout)
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
		self.interaction.pointer_move((x, y), &mut self.graph)
	}

	pub fn pointer_up(&mut self) -> bool {
		self.interaction.pointer_up(&mut self.graph, &mut self.layout)
	}

	pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
		self.interaction.wheel((x, y), delta_y)
	}

	/// New viewport size: re-centres the layout without reheating it.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.viewport = (width, height);
		self.layout.set_center(width / 2.0, height / 2.0);
		self.graph.set_spawn_point(width / 2.0, height / 2.0);
	}

	/// Per-frame work: one layout step and the enter animations.
	pub fn frame(&mut self, dt: f64) -> TickOutcome {
		let outcome = self.layout.step(&mut self.graph);
		self.scene.advance(dt);
		outcome
	}

	pub fn snapshot(&self) -> GraphSnapshot {
		GraphSnapshot {
			nodes: self.graph.options(),
			description: self.graph.describe(),
			mode: self.interaction.mode_kind(),
		}
	}
}
