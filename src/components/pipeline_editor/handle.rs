use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;

use crate::editor::{EditorSession, GraphSnapshot};

/// Copyable handle to the session shared by the canvas and the controls.
///
/// The session itself is created by the canvas once its size is known;
/// until then every access is a no-op.
#[derive(Clone, Copy)]
pub struct EditorHandle {
	session: StoredValue<Rc<RefCell<Option<EditorSession>>>, LocalStorage>,
	snapshot: RwSignal<GraphSnapshot>,
}

impl EditorHandle {
	pub fn new() -> Self {
		Self {
			session: StoredValue::new_local(Rc::new(RefCell::new(None))),
			snapshot: RwSignal::new(GraphSnapshot::default()),
		}
	}

	/// Read-only projection, refreshed after every mutation.
	pub fn snapshot(&self) -> RwSignal<GraphSnapshot> {
		self.snapshot
	}

	pub(crate) fn shared(&self) -> Rc<RefCell<Option<EditorSession>>> {
		self.session.with_value(Rc::clone)
	}

	pub(crate) fn install(&self, session: EditorSession) {
		let snapshot = session.snapshot();
		*self.shared().borrow_mut() = Some(session);
		self.snapshot.set(snapshot);
	}

	/// Runs `f` without republishing the snapshot (pointer traffic).
	pub fn with_session<R>(&self, f: impl FnOnce(&mut EditorSession) -> R) -> Option<R> {
		let shared = self.shared();
		let mut guard = shared.borrow_mut();
		guard.as_mut().map(f)
	}

	/// Runs a mutation and republishes the snapshot.
	pub fn mutate<R>(&self, f: impl FnOnce(&mut EditorSession) -> R) -> Option<R> {
		let shared = self.shared();
		let (result, snapshot) = {
			let mut guard = shared.borrow_mut();
			let Some(session) = guard.as_mut() else {
				return None;
			};
			let result = f(session);
			(result, session.snapshot())
		};
		self.snapshot.set(snapshot);
		Some(result)
	}
}

impl Default for EditorHandle {
	fn default() -> Self {
		Self::new()
	}
}
