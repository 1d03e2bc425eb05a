//! Plain data carried by the editor: ids, nodes, links and node geometry.

use std::fmt;

/// Rendered node rectangle width, in graph units.
pub const NODE_WIDTH: f64 = 120.0;
/// Rendered node rectangle height, in graph units.
pub const NODE_HEIGHT: f64 = 120.0;
/// Offset from a node's position to the top-left corner of its rectangle.
pub const NODE_OFFSET: (f64, f64) = (60.0, 30.0);
/// Corner radius of the node rectangle.
pub const NODE_CORNER_RADIUS: f64 = 10.0;
/// Maximum width of a wrapped label line.
pub const LABEL_WRAP_WIDTH: f64 = 100.0;

/// Identifier of a pipeline step. Assigned by the model, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// A processing step. `x`/`y` belong to the layout unless `fx`/`fy` pin it.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: NodeId,
	pub name: String,
	pub kind: String,
	pub description: String,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub fx: Option<f64>,
	pub fy: Option<f64>,
}

impl Node {
	/// Builds an unpinned node at rest at `(x, y)`.
	pub fn new(
		id: NodeId,
		name: impl Into<String>,
		kind: impl Into<String>,
		description: impl Into<String>,
		(x, y): (f64, f64),
	) -> Self {
		Self {
			id,
			name: name.into(),
			kind: kind.into(),
			description: description.into(),
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			fx: None,
			fy: None,
		}
	}

	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}

	/// Fixes the node at `(x, y)` until [`Node::unpin`].
	pub fn pin(&mut self, x: f64, y: f64) {
		self.fx = Some(x);
		self.fy = Some(y);
	}

	pub fn unpin(&mut self) {
		self.fx = None;
		self.fy = None;
	}

	/// Whether a graph-space point falls inside the node's rectangle.
	pub fn contains(&self, gx: f64, gy: f64) -> bool {
		let (left, top) = (self.x - NODE_OFFSET.0, self.y - NODE_OFFSET.1);
		gx >= left && gx <= left + NODE_WIDTH && gy >= top && gy <= top + NODE_HEIGHT
	}
}

/// Directed dependency between two steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Link {
	pub source: NodeId,
	pub target: NodeId,
}

impl Link {
	pub fn new(source: NodeId, target: NodeId) -> Self {
		Self { source, target }
	}

	pub fn key(&self) -> LinkKey {
		LinkKey(self.source, self.target)
	}

	pub fn touches(&self, id: NodeId) -> bool {
		self.source == id || self.target == id
	}
}

/// Identity of a link visual, printed as `"{source}-{target}"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LinkKey(pub NodeId, pub NodeId);

impl fmt::Display for LinkKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-{}", self.0, self.1)
	}
}

/// Entry of the source/target pickers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeOption {
	pub id: NodeId,
	pub name: String,
}
