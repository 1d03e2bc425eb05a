//! Authoritative node and link collections with their mutation rules.

use std::collections::HashSet;

use log::{debug, warn};

use super::error::{GraphError, GraphResult};
use super::taxonomy;
use super::types::{Link, Node, NodeId, NodeOption};

/// Radius of the jitter applied around the spawn point so fresh nodes
/// never sit exactly on top of each other.
const SPAWN_JITTER: f64 = 20.0;

/// Deterministic pseudo-random value in `[0, 1)`.
fn rand_simple(seed: u32) -> f64 {
	let x = ((seed as u64 + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// The pipeline graph. Ids grow monotonically; links never dangle.
#[derive(Clone, Debug, Default)]
pub struct GraphModel {
	nodes: Vec<Node>,
	links: Vec<Link>,
	last_id: u32,
	revision: u64,
	spawn: (f64, f64),
}

impl GraphModel {
	pub fn new() -> Self {
		Self::default()
	}

	/// Initial batch creation. Repeated ids and links that would dangle or
	/// loop are dropped; the first node with a given id wins.
	pub fn seeded(nodes: Vec<Node>, links: Vec<Link>) -> Self {
		let mut seen = HashSet::with_capacity(nodes.len());
		let nodes: Vec<Node> = nodes
			.into_iter()
			.filter(|node| {
				let fresh = seen.insert(node.id);
				if !fresh {
					warn!("Dropping seed node {} ({}): id already taken", node.id, node.name);
				}
				fresh
			})
			.collect();
		let last_id = nodes.iter().map(|n| n.id.0).max().unwrap_or(0);
		let mut model = Self {
			nodes,
			links: Vec::with_capacity(links.len()),
			last_id,
			revision: 1,
			spawn: (0.0, 0.0),
		};
		for link in links {
			if link.source == link.target
				|| model.node(link.source).is_none()
				|| model.node(link.target).is_none()
			{
				warn!("Dropping seed link {}", link.key());
				continue;
			}
			model.links.push(link);
		}
		model
	}

	/// Seed graph the editor opens with: a data source feeding a filter.
	pub fn demo() -> Self {
		let nodes = vec![
			Node::new(NodeId(1), "Datos 1", "Data JSON", "Descripción del Nodo 1", (-100.0, 0.0)),
			Node::new(NodeId(2), "Filtros 2", "Pasa banda", "Descripción del Nodo 2", (100.0, 0.0)),
		];
		Self::seeded(nodes, vec![Link::new(NodeId(1), NodeId(2))])
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn links(&self) -> &[Link] {
		&self.links
	}

	pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
		&mut self.nodes
	}

	pub fn node(&self, id: NodeId) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}

	pub fn index_of(&self, id: NodeId) -> Option<usize> {
		self.nodes.iter().position(|n| n.id == id)
	}

	pub fn last_id(&self) -> NodeId {
		NodeId(self.last_id)
	}

	/// Bumped on every topology change.
	pub fn revision(&self) -> u64 {
		self.revision
	}

	/// Where new nodes appear, normally the viewport centre.
	pub fn set_spawn_point(&mut self, x: f64, y: f64) {
		self.spawn = (x, y);
	}

	/// Appends a step of type `kind` fed by `source`.
	///
	/// The name is `"{category} {id}"`. Unknown types and unknown sources
	/// are rejected before anything is mutated.
	pub fn add_node(
		&mut self,
		kind: &str,
		description: &str,
		source: NodeId,
	) -> GraphResult<&Node> {
		let Some(category) = taxonomy::reverse_lookup(kind) else {
			warn!("Rejected node of unknown type {kind:?}");
			return Err(GraphError::UnknownType { kind: kind.to_owned() });
		};
		if self.node(source).is_none() {
			warn!("Rejected node fed by missing node {source}");
			return Err(GraphError::UnknownNode { id: source });
		}

		self.last_id += 1;
		let id = NodeId(self.last_id);
		let angle = rand_simple(id.0) * std::f64::consts::TAU;
		let position = (
			self.spawn.0 + SPAWN_JITTER * angle.cos(),
			self.spawn.1 + SPAWN_JITTER * angle.sin(),
		);
		self.nodes.push(Node::new(
			id,
			format!("{category} {id}"),
			kind,
			description,
			position,
		));
		self.links.push(Link::new(source, id));
		self.revision += 1;
		debug!("Added node {id} ({kind}) linked from {source}");

		Ok(&self.nodes[self.nodes.len() - 1])
	}

	/// Appends `source → target`. Duplicates are allowed, self loops are not.
	pub fn add_link(&mut self, source: NodeId, target: NodeId) -> GraphResult<&Link> {
		if source == target {
			warn!("Rejected self loop on node {source}");
			return Err(GraphError::SelfLoop { id: source });
		}
		for id in [source, target] {
			if self.node(id).is_none() {
				warn!("Rejected link {source}-{target}: node {id} is missing");
				return Err(GraphError::UnknownNode { id });
			}
		}

		self.links.push(Link::new(source, target));
		self.revision += 1;
		debug!("Added link {source}-{target}");

		Ok(&self.links[self.links.len() - 1])
	}

	/// Removes the node and every link touching it. `None` if absent.
	pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
		let index = self.index_of(id)?;
		let node = self.nodes.remove(index);
		let before = self.links.len();
		self.links.retain(|link| !link.touches(id));
		self.revision += 1;
		debug!(
			"Removed node {id} and {} link(s)",
			before - self.links.len()
		);
		Some(node)
	}

	/// Id and name of every node, for the source/target pickers.
	pub fn options(&self) -> Vec<NodeOption> {
		self.nodes
			.iter()
			.map(|n| NodeOption {
				id: n.id,
				name: n.name.clone(),
			})
			.collect()
	}

	/// Plain-text step list shown beside the canvas.
	pub fn describe(&self) -> Vec<String> {
		let steps = self
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| format!("Paso {} / {} / {}", i + 1, n.name, n.kind));
		let links = self
			.links
			.iter()
			.map(|l| format!("Enlace desde Nodo {} a Nodo {}", l.source, l.target));
		steps.chain(links).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn keys(model: &GraphModel) -> Vec<String> {
		model.links().iter().map(|l| l.key().to_string()).collect()
	}

	fn two_nodes() -> GraphModel {
		GraphModel::seeded(
			vec![
				Node::new(NodeId(1), "Nodo 1", "Data JSON", "", (0.0, 0.0)),
				Node::new(NodeId(2), "Nodo 2", "Pasa banda", "", (10.0, 0.0)),
			],
			vec![Link::new(NodeId(1), NodeId(2))],
		)
	}

	fn assert_links_resolve(model: &GraphModel) {
		for link in model.links() {
			assert!(model.node(link.source).is_some(), "{}", link.key());
			assert!(model.node(link.target).is_some(), "{}", link.key());
			assert_ne!(link.source, link.target);
		}
	}

	#[test]
	fn seeding_keeps_the_first_node_of_a_repeated_id() {
		let model = GraphModel::seeded(
			vec![
				Node::new(NodeId(1), "Nodo 1", "Data JSON", "", (0.0, 0.0)),
				Node::new(NodeId(2), "Nodo 2", "Pasa banda", "", (10.0, 0.0)),
				Node::new(NodeId(1), "Otro 1", "SVM", "", (20.0, 0.0)),
			],
			vec![Link::new(NodeId(1), NodeId(2))],
		);
		let names: Vec<_> = model.nodes().iter().map(|n| n.name.as_str()).collect();
		assert_eq!(names, ["Nodo 1", "Nodo 2"]);
		assert_eq!(model.last_id(), NodeId(2));
		assert_eq!(keys(&model), ["1-2"]);
	}

	#[test]
	fn add_node_names_by_category_and_links_from_source() {
		let mut model = two_nodes();
		let node = model.add_node("Pasa bajo", "", NodeId(1)).unwrap();
		assert_eq!(node.id, NodeId(3));
		assert_eq!(node.name, "Filtros 3");
		assert_eq!(node.kind, "Pasa bajo");
		assert_eq!(keys(&model), ["1-2", "1-3"]);
	}

	#[test]
	fn remove_node_cascades_links() {
		let mut model = two_nodes();
		model.add_node("Pasa bajo", "", NodeId(1)).unwrap();
		let removed = model.remove_node(NodeId(2)).unwrap();
		assert_eq!(removed.name, "Nodo 2");
		let ids: Vec<_> = model.nodes().iter().map(|n| n.id.0).collect();
		assert_eq!(ids, [1, 3]);
		assert_eq!(keys(&model), ["1-3"]);
	}

	#[test]
	fn add_node_grows_counts_by_one() {
		let mut model = two_nodes();
		for i in 0..5 {
			let (nodes, links) = (model.nodes().len(), model.links().len());
			let expected = model.nodes().iter().map(|n| n.id.0).max().unwrap() + 1;
			let id = model.add_node("SVM", "", NodeId(1 + i)).unwrap().id;
			assert_eq!(id, NodeId(expected));
			assert_eq!(model.nodes().len(), nodes + 1);
			assert_eq!(model.links().len(), links + 1);
		}
	}

	#[test]
	fn first_node_of_empty_graph_needs_a_source() {
		let mut model = GraphModel::new();
		assert_eq!(
			model.add_node("LDA", "", NodeId(1)).unwrap_err(),
			GraphError::UnknownNode { id: NodeId(1) }
		);
		assert!(model.nodes().is_empty());
		assert_eq!(model.last_id(), NodeId(0));
	}

	#[test]
	fn ids_are_never_reused_after_removal() {
		let mut model = two_nodes();
		model.add_node("KNN", "", NodeId(2)).unwrap();
		model.remove_node(NodeId(3));
		let id = model.add_node("KNN", "", NodeId(2)).unwrap().id;
		assert_eq!(id, NodeId(4));
	}

	#[test]
	fn unknown_type_is_rejected_without_mutation() {
		let mut model = two_nodes();
		let revision = model.revision();
		let err = model.add_node("Filtro Pasa Banda", "", NodeId(1)).unwrap_err();
		assert_eq!(
			err,
			GraphError::UnknownType {
				kind: "Filtro Pasa Banda".into()
			}
		);
		assert_eq!(model.nodes().len(), 2);
		assert_eq!(model.links().len(), 1);
		assert_eq!(model.last_id(), NodeId(2));
		assert_eq!(model.revision(), revision);
	}

	#[test]
	fn self_loop_is_rejected() {
		let mut model = two_nodes();
		for id in [1, 2, 99] {
			let err = model.add_link(NodeId(id), NodeId(id)).unwrap_err();
			assert_eq!(err, GraphError::SelfLoop { id: NodeId(id) });
			assert_eq!(model.links().len(), 1);
		}
	}

	#[test]
	fn add_link_allows_duplicates_but_not_missing_endpoints() {
		let mut model = two_nodes();
		model.add_link(NodeId(1), NodeId(2)).unwrap();
		model.add_link(NodeId(2), NodeId(1)).unwrap();
		assert_eq!(keys(&model), ["1-2", "1-2", "2-1"]);
		assert_eq!(
			model.add_link(NodeId(1), NodeId(7)).unwrap_err(),
			GraphError::UnknownNode { id: NodeId(7) }
		);
		assert_eq!(model.links().len(), 3);
	}

	#[test]
	fn remove_node_keeps_unrelated_links_in_order() {
		let mut model = two_nodes();
		model.add_node("CAR", "", NodeId(2)).unwrap(); // 3, 2-3
		model.add_node("LDA", "", NodeId(3)).unwrap(); // 4, 3-4
		model.add_link(NodeId(4), NodeId(1)).unwrap();
		model.add_link(NodeId(2), NodeId(4)).unwrap();
		model.remove_node(NodeId(3));
		assert_eq!(keys(&model), ["1-2", "4-1", "2-4"]);
		assert_links_resolve(&model);
	}

	#[test]
	fn remove_missing_node_is_a_no_op() {
		let mut model = two_nodes();
		let revision = model.revision();
		assert!(model.remove_node(NodeId(42)).is_none());
		assert_eq!(model.nodes().len(), 2);
		assert_eq!(model.revision(), revision);
	}

	#[test]
	fn cascade_keeps_links_consistent_over_mixed_sequences() {
		let mut model = GraphModel::demo();
		let kinds = ["Normalizar", "Hjorth", "SVM", "Hold out validation"];
		for step in 0u32..40 {
			let ids: Vec<_> = model.nodes().iter().map(|n| n.id).collect();
			let pick = ids[(rand_simple(step) * ids.len() as f64) as usize];
			if step % 3 == 2 && ids.len() > 1 {
				model.remove_node(pick);
			} else {
				model
					.add_node(kinds[step as usize % kinds.len()], "", pick)
					.unwrap();
			}
			assert_links_resolve(&model);
		}
	}

	#[test]
	fn seeded_drops_dangling_links_and_continues_ids() {
		let model = GraphModel::seeded(
			vec![
				Node::new(NodeId(4), "Datos 4", "Data CSV", "", (0.0, 0.0)),
				Node::new(NodeId(9), "Filtros 9", "CAR", "", (0.0, 0.0)),
			],
			vec![
				Link::new(NodeId(4), NodeId(9)),
				Link::new(NodeId(4), NodeId(5)),
				Link::new(NodeId(9), NodeId(9)),
			],
		);
		assert_eq!(model.last_id(), NodeId(9));
		assert_eq!(keys(&model), ["4-9"]);
	}

	#[test]
	fn new_nodes_spawn_near_the_spawn_point() {
		let mut model = two_nodes();
		model.set_spawn_point(400.0, 300.0);
		let node = model.add_node("Wavelets", "", NodeId(2)).unwrap();
		let (dx, dy) = (node.x - 400.0, node.y - 300.0);
		assert!((dx * dx + dy * dy).sqrt() <= SPAWN_JITTER + 1e-9);
		assert!(!node.is_pinned());
	}

	#[test]
	fn describe_lists_steps_then_links() {
		let mut model = GraphModel::demo();
		model.add_node("LDA", "clasificar", NodeId(2)).unwrap();
		assert_eq!(
			model.describe(),
			[
				"Paso 1 / Datos 1 / Data JSON",
				"Paso 2 / Filtros 2 / Pasa banda",
				"Paso 3 / Clasificadores 3 / LDA",
				"Enlace desde Nodo 1 a Nodo 2",
				"Enlace desde Nodo 2 a Nodo 3",
			]
		);
		let names: Vec<_> = model.options().into_iter().map(|o| o.name).collect();
		assert_eq!(names, ["Datos 1", "Filtros 2", "Clasificadores 3"]);
	}
}
