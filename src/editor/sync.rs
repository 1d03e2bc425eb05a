//! Keyed reconciliation of the visual set against the graph.
//!
//! Visuals are matched to graph entities by identity key: node id, or
//! `"{source}-{target}"` for links. Retained visuals keep their backing
//! object untouched so their enter animation does not replay.

use std::collections::HashMap;
use std::hash::Hash;

use log::debug;

use super::model::GraphModel;
use super::types::{LinkKey, Node, NodeId};

/// Seconds an entering visual takes to fade in.
pub const ENTER_DURATION: f64 = 0.3;

/// Fate of one item of the new set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
	/// Bound to the old item at this index.
	Retained(usize),
	/// No old item had this key.
	Entered,
}

impl Slot {
	pub fn retained(self) -> Option<usize> {
		match self {
			Slot::Retained(i) => Some(i),
			Slot::Entered => None,
		}
	}
}

/// Result of [`keyed_diff`]: one slot per new item plus the old leftovers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyedDiff {
	pub slots: Vec<Slot>,
	pub exited: Vec<usize>,
}

impl KeyedDiff {
	pub fn entered(&self) -> usize {
		self.slots.iter().filter(|s| **s == Slot::Entered).count()
	}

	pub fn retained(&self) -> usize {
		self.slots.len() - self.entered()
	}
}

/// Matches `new` against the `old` keys.
///
/// Each old key is claimed at most once, by its first occurrence, so a
/// repeated key in `new` enters and a repeated key in `old` exits.
pub fn keyed_diff<K, T, F>(old: &[K], new: &[T], key: F) -> KeyedDiff
where
	K: Eq + Hash + Clone,
	F: Fn(&T) -> K,
{
	let mut by_key: HashMap<K, usize> = HashMap::with_capacity(old.len());
	for (i, k) in old.iter().enumerate() {
		by_key.entry(k.clone()).or_insert(i);
	}

	let mut claimed = vec![false; old.len()];
	let slots = new
		.iter()
		.map(|item| match by_key.remove(&key(item)) {
			Some(i) => {
				claimed[i] = true;
				Slot::Retained(i)
			}
			None => Slot::Entered,
		})
		.collect();
	let exited = (0..old.len()).filter(|&i| !claimed[i]).collect();

	KeyedDiff { slots, exited }
}

/// Drawn representation of a node: rounded rectangle, name and type.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeVisual {
	pub key: NodeId,
	/// Creation counter; unchanged for as long as the visual is retained.
	pub serial: u64,
	pub title: String,
	pub subtitle: String,
	/// Fade-in progress in `[0, 1]`.
	pub enter_t: f64,
}

/// Drawn representation of a link: a line with an arrow head.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkVisual {
	pub key: LinkKey,
	pub serial: u64,
	pub enter_t: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
	pub entered_nodes: usize,
	pub retained_nodes: usize,
	pub exited_nodes: usize,
	pub entered_links: usize,
	pub retained_links: usize,
	pub exited_links: usize,
}

/// The rendered visual set, in draw order.
#[derive(Clone, Debug, Default)]
pub struct Scene {
	nodes: Vec<NodeVisual>,
	links: Vec<LinkVisual>,
	next_serial: u64,
}

impl Scene {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn nodes(&self) -> &[NodeVisual] {
		&self.nodes
	}

	pub fn links(&self) -> &[LinkVisual] {
		&self.links
	}

	fn serial(&mut self) -> u64 {
		self.next_serial += 1;
		self.next_serial
	}

	fn enter_node(&mut self, node: &Node) -> NodeVisual {
		NodeVisual {
			key: node.id,
			serial: self.serial(),
			title: node.name.clone(),
			subtitle: node.kind.clone(),
			enter_t: 0.0,
		}
	}

	fn enter_link(&mut self, key: LinkKey) -> LinkVisual {
		LinkVisual {
			key,
			serial: self.serial(),
			enter_t: 0.0,
		}
	}

	/// Brings the visual set in line with `graph`.
	pub fn reconcile(&mut self, graph: &GraphModel) -> ReconcileReport {
		let old_keys: Vec<NodeId> = self.nodes.iter().map(|v| v.key).collect();
		let node_diff = keyed_diff(&old_keys, graph.nodes(), |n| n.id);
		let mut old: Vec<Option<NodeVisual>> =
			std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
		let mut nodes = Vec::with_capacity(graph.nodes().len());
		for (node, slot) in graph.nodes().iter().zip(&node_diff.slots) {
			let visual = match slot.retained().and_then(|i| old[i].take()) {
				Some(visual) => visual,
				None => self.enter_node(node),
			};
			nodes.push(visual);
		}
		self.nodes = nodes;

		let old_keys: Vec<LinkKey> = self.links.iter().map(|v| v.key).collect();
		let link_diff = keyed_diff(&old_keys, graph.links(), |l| l.key());
		let mut old: Vec<Option<LinkVisual>> =
			std::mem::take(&mut self.links).into_iter().map(Some).collect();
		let mut links = Vec::with_capacity(graph.links().len());
		for (link, slot) in graph.links().iter().zip(&link_diff.slots) {
			let visual = match slot.retained().and_then(|i| old[i].take()) {
				Some(visual) => visual,
				None => self.enter_link(link.key()),
			};
			links.push(visual);
		}
		self.links = links;

		let report = ReconcileReport {
			entered_nodes: node_diff.entered(),
			retained_nodes: node_diff.retained(),
			exited_nodes: node_diff.exited.len(),
			entered_links: link_diff.entered(),
			retained_links: link_diff.retained(),
			exited_links: link_diff.exited.len(),
		};
		debug!("Reconciled scene: {report:?}");
		report
	}

	/// Advances enter animations by `dt` seconds.
	pub fn advance(&mut self, dt: f64) {
		let step = dt / ENTER_DURATION;
		for v in &mut self.nodes {
			v.enter_t = (v.enter_t + step).min(1.0);
		}
		for v in &mut self.links {
			v.enter_t = (v.enter_t + step).min(1.0);
		}
	}
}

/// Greedy word wrap. A word wider than `max_width` gets a line of its own.
pub fn wrap_words(text: &str, max_width: f64, measure: impl Fn(&str) -> f64) -> Vec<String> {
	let mut lines = Vec::new();
	let mut line = String::new();
	for word in text.split_whitespace() {
		if line.is_empty() {
			line.push_str(word);
			continue;
		}
		let candidate = format!("{line} {word}");
		if measure(&candidate) > max_width {
			lines.push(std::mem::replace(&mut line, word.to_owned()));
		} else {
			line = candidate;
		}
	}
	if !line.is_empty() {
		lines.push(line);
	}
	lines
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::editor::types::NodeId;

	fn serials(scene: &Scene) -> Vec<(u32, u64)> {
		scene.nodes().iter().map(|v| (v.key.0, v.serial)).collect()
	}

	#[test]
	fn diff_matches_by_key_regardless_of_order() {
		let diff = keyed_diff(&[1, 2, 3], &[2, 4, 1], |k: &i32| *k);
		assert_eq!(
			diff.slots,
			[Slot::Retained(1), Slot::Entered, Slot::Retained(0)]
		);
		assert_eq!(diff.exited, [2]);
		assert_eq!((diff.entered(), diff.retained()), (1, 2));
	}

	#[test]
	fn diff_claims_each_old_key_once() {
		let diff = keyed_diff(&["a", "a"], &["a", "a", "a"], |k: &&str| *k);
		assert_eq!(
			diff.slots,
			[Slot::Retained(0), Slot::Entered, Slot::Entered]
		);
		assert_eq!(diff.exited, [1]);
	}

	#[test]
	fn diff_of_empty_sets() {
		let diff = keyed_diff::<u8, u8, _>(&[], &[], |k| *k);
		assert_eq!(diff, KeyedDiff::default());
		let diff = keyed_diff(&[1u8, 2], &[], |k: &u8| *k);
		assert_eq!(diff.exited, [0, 1]);
	}

	#[test]
	fn first_reconcile_enters_everything() {
		let graph = GraphModel::demo();
		let mut scene = Scene::new();
		let report = scene.reconcile(&graph);
		assert_eq!(report.entered_nodes, 2);
		assert_eq!(report.entered_links, 1);
		assert_eq!(scene.nodes()[0].title, "Datos 1");
		assert_eq!(scene.nodes()[1].subtitle, "Pasa banda");
		assert_eq!(scene.links()[0].key.to_string(), "1-2");
	}

	#[test]
	fn retained_visuals_keep_identity_and_animation() {
		let mut graph = GraphModel::demo();
		let mut scene = Scene::new();
		scene.reconcile(&graph);
		scene.advance(1.0);
		let before = serials(&scene);

		graph.add_node("Hjorth", "", NodeId(2)).unwrap();
		let report = scene.reconcile(&graph);
		assert_eq!(
			report,
			ReconcileReport {
				entered_nodes: 1,
				retained_nodes: 2,
				exited_nodes: 0,
				entered_links: 1,
				retained_links: 1,
				exited_links: 0,
			}
		);
		assert_eq!(&serials(&scene)[..2], before.as_slice());
		assert_eq!(scene.nodes()[0].enter_t, 1.0);
		assert_eq!(scene.nodes()[2].enter_t, 0.0);
		assert_eq!(scene.nodes()[2].title, "Extracción de características 3");
	}

	#[test]
	fn removed_nodes_and_cascaded_links_exit() {
		let mut graph = GraphModel::demo();
		graph.add_node("Pasa bajo", "", NodeId(1)).unwrap();
		let mut scene = Scene::new();
		scene.reconcile(&graph);

		graph.remove_node(NodeId(2));
		let report = scene.reconcile(&graph);
		assert_eq!((report.exited_nodes, report.exited_links), (1, 1));
		let keys: Vec<_> = scene.links().iter().map(|l| l.key.to_string()).collect();
		assert_eq!(keys, ["1-3"]);
		let ids: Vec<_> = scene.nodes().iter().map(|v| v.key.0).collect();
		assert_eq!(ids, [1, 3]);
	}

	#[test]
	fn reconcile_without_changes_is_stable() {
		let graph = GraphModel::demo();
		let mut scene = Scene::new();
		scene.reconcile(&graph);
		let before = serials(&scene);
		let report = scene.reconcile(&graph);
		assert_eq!(report.entered_nodes + report.entered_links, 0);
		assert_eq!(serials(&scene), before);
	}

	#[test]
	fn advance_caps_enter_progress() {
		let mut scene = Scene::new();
		scene.reconcile(&GraphModel::demo());
		scene.advance(ENTER_DURATION / 2.0);
		assert!((scene.nodes()[0].enter_t - 0.5).abs() < 1e-9);
		scene.advance(10.0);
		assert_eq!(scene.links()[0].enter_t, 1.0);
	}

	#[test]
	fn wrap_words_breaks_on_width() {
		let measure = |s: &str| s.chars().count() as f64 * 10.0;
		assert_eq!(
			wrap_words("Extracción de características 3", 100.0, measure),
			["Extracción", "de", "características", "3"]
		);
		assert_eq!(
			wrap_words("Pasa  bajo", 100.0, measure),
			["Pasa bajo"]
		);
		assert!(wrap_words("   ", 100.0, measure).is_empty());
	}
}
