//! Mutually exclusive pointer modes: node dragging or canvas pan/zoom.
//!
//! The gesture in flight lives inside its mode, so switching modes
//! drops the other mode's bindings along with any half-finished gesture.

use log::{debug, info};

use super::layout::LayoutEngine;
use super::model::GraphModel;
use super::types::NodeId;

/// Allowed range of the zoom scale factor.
pub const ZOOM_EXTENT: (f64, f64) = (0.5, 4.0);
/// Scale multiplier applied per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 1.1;

/// Translate + uniform scale applied to the whole drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl ViewTransform {
	pub const IDENTITY: Self = Self {
		x: 0.0,
		y: 0.0,
		k: 1.0,
	};

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}
}

/// A node following the pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct DragGesture {
	pub node: NodeId,
	start: (f64, f64),
	node_start: (f64, f64),
}

/// The canvas following the pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct PanGesture {
	start: (f64, f64),
	transform_start: (f64, f64),
}

/// Which pointer bindings are active, with the gesture in flight if any.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionMode {
	#[default]
	Idle,
	Drag(Option<DragGesture>),
	Zoom(Option<PanGesture>),
}

/// Data-free view of [`InteractionMode`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModeKind {
	#[default]
	Idle,
	Drag,
	Zoom,
}

/// Topmost node under a screen point.
pub fn hit_test(graph: &GraphModel, transform: &ViewTransform, sx: f64, sy: f64) -> Option<NodeId> {
	let (gx, gy) = transform.screen_to_graph(sx, sy);
	// Later nodes are drawn on top.
	graph
		.nodes()
		.iter()
		.rev()
		.find(|node| node.contains(gx, gy))
		.map(|node| node.id)
}

#[derive(Clone, Debug, Default)]
pub struct InteractionController {
	mode: InteractionMode,
	transform: ViewTransform,
}

impl InteractionController {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn mode_kind(&self) -> ModeKind {
		match self.mode {
			InteractionMode::Idle => ModeKind::Idle,
			InteractionMode::Drag(_) => ModeKind::Drag,
			InteractionMode::Zoom(_) => ModeKind::Zoom,
		}
	}

	pub fn is_drag_bound(&self) -> bool {
		self.mode_kind() == ModeKind::Drag
	}

	pub fn is_zoom_bound(&self) -> bool {
		self.mode_kind() == ModeKind::Zoom
	}

	pub fn dragged_node(&self) -> Option<NodeId> {
		match &self.mode {
			InteractionMode::Drag(Some(gesture)) => Some(gesture.node),
			_ => None,
		}
	}

	pub fn is_panning(&self) -> bool {
		matches!(self.mode, InteractionMode::Zoom(Some(_)))
	}

	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	/// Places the view, e.g. to centre the drawing on first layout.
	pub fn set_transform(&mut self, transform: ViewTransform) {
		self.transform = transform;
	}

	pub fn node_at(&self, graph: &GraphModel, sx: f64, sy: f64) -> Option<NodeId> {
		hit_test(graph, &self.transform, sx, sy)
	}

	/// Enters drag mode, or returns to idle if it is already active.
	pub fn toggle_drag(&mut self, graph: &mut GraphModel, layout: &mut LayoutEngine) {
		let entering = !self.is_drag_bound();
		self.teardown(graph, layout);
		if entering {
			self.mode = InteractionMode::Drag(None);
		}
		info!("Interaction mode: {:?}", self.mode_kind());
	}

	/// Enters pan/zoom mode, or returns to idle if it is already active.
	pub fn toggle_zoom(&mut self, graph: &mut GraphModel, layout: &mut LayoutEngine) {
		let entering = !self.is_zoom_bound();
		self.teardown(graph, layout);
		if entering {
			self.mode = InteractionMode::Zoom(None);
		}
		info!("Interaction mode: {:?}", self.mode_kind());
	}

	/// Unbinds the current mode, releasing a node that is mid-drag.
	fn teardown(&mut self, graph: &mut GraphModel, layout: &mut LayoutEngine) {
		if let InteractionMode::Drag(Some(gesture)) = std::mem::take(&mut self.mode) {
			release(graph, layout, gesture.node);
		}
	}

	/// Returns whether the active mode consumed the event.
	pub fn pointer_down(
		&mut self,
		(sx, sy): (f64, f64),
		graph: &mut GraphModel,
		layout: &mut LayoutEngine,
	) -> bool {
		match &mut self.mode {
			InteractionMode::Idle => false,
			InteractionMode::Drag(gesture) => {
				let Some(id) = hit_test(graph, &self.transform, sx, sy) else {
					return false;
				};
				// A second button can go down mid-drag without an up in between.
				if let Some(prev) = gesture.take().filter(|prev| prev.node != id) {
					release(graph, layout, prev.node);
				}
				let Some(node) = graph.node_mut(id) else {
					return false;
				};
				node.pin(node.x, node.y);
				*gesture = Some(DragGesture {
					node: id,
					start: (sx, sy),
					node_start: (node.x, node.y),
				});
				layout.drag_started();
				debug!("Drag started on node {id}");
				true
			}
			InteractionMode::Zoom(pan) => {
				*pan = Some(PanGesture {
					start: (sx, sy),
					transform_start: (self.transform.x, self.transform.y),
				});
				true
			}
		}
	}

	pub fn pointer_move(&mut self, (sx, sy): (f64, f64), graph: &mut GraphModel) -> bool {
		match &mut self.mode {
			InteractionMode::Drag(slot) => {
				let Some(gesture) = slot.as_mut() else {
					return false;
				};
				let (dx, dy) = (
					(sx - gesture.start.0) / self.transform.k,
					(sy - gesture.start.1) / self.transform.k,
				);
				match graph.node_mut(gesture.node) {
					Some(node) => {
						node.pin(gesture.node_start.0 + dx, gesture.node_start.1 + dy);
						true
					}
					None => {
						*slot = None;
						false
					}
				}
			}
			InteractionMode::Zoom(Some(pan)) => {
				self.transform.x = pan.transform_start.0 + (sx - pan.start.0);
				self.transform.y = pan.transform_start.1 + (sy - pan.start.1);
				true
			}
			_ => false,
		}
	}

	/// Ends the gesture in flight. Also used when the pointer leaves the canvas.
	pub fn pointer_up(&mut self, graph: &mut GraphModel, layout: &mut LayoutEngine) -> bool {
		match &mut self.mode {
			InteractionMode::Drag(slot) => match slot.take() {
				Some(gesture) => {
					release(graph, layout, gesture.node);
					true
				}
				None => false,
			},
			InteractionMode::Zoom(pan) => pan.take().is_some(),
			InteractionMode::Idle => false,
		}
	}

	/// Zooms about the pointer. Only bound in zoom mode.
	pub fn wheel(&mut self, (sx, sy): (f64, f64), delta_y: f64) -> bool {
		if !self.is_zoom_bound() {
			return false;
		}
		let factor = if delta_y > 0.0 {
			1.0 / WHEEL_ZOOM_STEP
		} else {
			WHEEL_ZOOM_STEP
		};
		let t = &mut self.transform;
		let new_k = (t.k * factor).clamp(ZOOM_EXTENT.0, ZOOM_EXTENT.1);
		let ratio = new_k / t.k;
		t.x = sx - (sx - t.x) * ratio;
		t.y = sy - (sy - t.y) * ratio;
		t.k = new_k;
		true
	}

	/// Re-attaches to a mutated graph, dropping a drag whose node is gone.
	pub fn refresh(&mut self, graph: &GraphModel, layout: &mut LayoutEngine) {
		if let InteractionMode::Drag(slot) = &mut self.mode {
			if slot.as_ref().is_some_and(|g| graph.node(g.node).is_none()) {
				debug!("Dragged node vanished; gesture dropped");
				*slot = None;
				layout.drag_ended();
			}
		}
	}
}

fn release(graph: &mut GraphModel, layout: &mut LayoutEngine, id: NodeId) {
	if let Some(node) = graph.node_mut(id) {
		node.unpin();
	}
	layout.drag_ended();
	debug!("Drag ended on node {id}");
}
