use leptos::prelude::*;
use log::warn;

use super::handle::EditorHandle;
use crate::editor::{GraphError, ModeKind, NodeId, NodeOption, taxonomy};

fn alert(err: &GraphError) {
	warn!("{err}");
	if let Some(win) = web_sys::window() {
		let _ = win.alert_with_message(&err.to_string());
	}
}

/// Node a picker currently shows: the chosen one while it still exists,
/// otherwise the first option, which is what the browser displays.
fn picked(choice: Option<u32>, options: &[NodeOption]) -> Option<NodeId> {
	choice
		.map(NodeId)
		.filter(|id| options.iter().any(|o| o.id == *id))
		.or_else(|| options.first().map(|o| o.id))
}

/// Side panel: add steps and links, switch pointer mode, list and remove
/// nodes, and the plain-text description of the pipeline.
#[component]
pub fn EditorControls(editor: EditorHandle) -> impl IntoView {
	let snapshot = editor.snapshot();
	let default_kind = taxonomy::categories()
		.next()
		.and_then(|(_, kinds)| kinds.first().copied())
		.unwrap_or_default();
	let (kind, set_kind) = signal(default_kind.to_owned());
	let (description, set_description) = signal(String::new());
	let (source, set_source) = signal(None::<u32>);
	let (target, set_target) = signal(None::<u32>);

	let resolve = move |choice: ReadSignal<Option<u32>>| {
		snapshot.with_untracked(|s| picked(choice.get_untracked(), &s.nodes))
	};

	let add_node = move |_| {
		let Some(source) = resolve(source) else {
			return;
		};
		let result = editor.mutate(|s| {
			s.add_node(&kind.get_untracked(), &description.get_untracked(), source)
		});
		match result {
			Some(Ok(_)) => set_description.set(String::new()),
			Some(Err(err)) => alert(&err),
			None => {}
		}
	};

	let add_link = move |_| {
		let (Some(source), Some(target)) = (resolve(source), resolve(target)) else {
			return;
		};
		if let Some(Err(err)) = editor.mutate(|s| s.add_link(source, target)) {
			alert(&err);
		}
	};

	let mode_class = move |mode: ModeKind| {
		move || {
			if snapshot.with(|s| s.mode) == mode {
				"button-active"
			} else {
				""
			}
		}
	};

	let node_picker = move |selected: ReadSignal<Option<u32>>| {
		move || {
			let nodes = snapshot.get().nodes;
			let shown = picked(selected.get(), &nodes);
			nodes
				.into_iter()
				.map(|n| {
					let is_selected = shown == Some(n.id);
					view! {
						<option value={n.id.0.to_string()} selected=is_selected>
							{n.name}
						</option>
					}
				})
				.collect_view()
		}
	};

	view! {
		<aside class="editor-controls">
			<section>
				<h2>"Agregar paso"</h2>
				<label>
					"Tipo"
					<select on:change=move |ev| set_kind.set(event_target_value(&ev))>
						{taxonomy::categories()
							.map(|(category, kinds)| {
								view! {
									<optgroup label=category>
										{kinds
											.iter()
											.map(|k| {
												view! {
													<option value={*k} selected={*k == default_kind}>
														{*k}
													</option>
												}
											})
											.collect_view()}
									</optgroup>
								}
							})
							.collect_view()}
					</select>
				</label>
				<label>
					"Descripción"
					<input
						type="text"
						prop:value=move || description.get()
						on:input=move |ev| set_description.set(event_target_value(&ev))
					/>
				</label>
				<label>
					"Origen"
					<select on:change=move |ev| set_source.set(event_target_value(&ev).parse().ok())>
						{node_picker(source)}
					</select>
				</label>
				<button on:click=add_node>"Agregar nodo"</button>
			</section>

			<section>
				<h2>"Agregar enlace"</h2>
				<label>
					"Destino"
					<select on:change=move |ev| set_target.set(event_target_value(&ev).parse().ok())>
						{node_picker(target)}
					</select>
				</label>
				<button on:click=add_link>"Agregar enlace"</button>
			</section>

			<section class="mode-toggles">
				<button
					class={mode_class(ModeKind::Drag)}
					on:click=move |_| {
						editor.mutate(|s| s.toggle_drag());
					}
				>
					"Arrastrar"
				</button>
				<button
					class={mode_class(ModeKind::Zoom)}
					on:click=move |_| {
						editor.mutate(|s| s.toggle_zoom());
					}
				>
					"Zoom"
				</button>
			</section>

			<section>
				<h2>"Nodos"</h2>
				<ul class="node-list">
					{move || {
						snapshot
							.get()
							.nodes
							.into_iter()
							.map(|n| {
								let id = n.id;
								view! {
									<li>
										{n.name}
										<button on:click=move |_| {
											editor.mutate(|s| s.remove_node(id));
										}>"Eliminar Nodo"</button>
									</li>
								}
							})
							.collect_view()
					}}
				</ul>
			</section>

			<section class="description">
				<h2>"Descripción"</h2>
				{move || {
					snapshot
						.get()
						.description
						.into_iter()
						.map(|line| view! { <p>{line}</p> })
						.collect_view()
				}}
			</section>
		</aside>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn options(ids: &[u32]) -> Vec<NodeOption> {
		ids.iter()
			.map(|&id| NodeOption {
				id: NodeId(id),
				name: format!("Nodo {id}"),
			})
			.collect()
	}

	#[test]
	fn untouched_pickers_resolve_to_the_first_option() {
		let nodes = options(&[1, 2]);
		assert_eq!(picked(None, &nodes), Some(NodeId(1)));
		assert_eq!(picked(Some(2), &nodes), Some(NodeId(2)));
		assert_eq!(picked(None, &[]), None);
	}

	#[test]
	fn removed_choice_falls_back_to_the_first_option() {
		let nodes = options(&[1, 3]);
		assert_eq!(picked(Some(2), &nodes), Some(NodeId(1)));
		assert_eq!(picked(Some(2), &[]), None);
	}

	#[test]
	fn fresh_pickers_agree_so_linking_reports_a_self_loop() {
		let mut model = crate::editor::GraphModel::demo();
		let nodes = model.options();
		let (source, target) = (picked(None, &nodes), picked(None, &nodes));
		assert_eq!(source, target);
		let (Some(source), Some(target)) = (source, target) else {
			panic!("demo graph has nodes");
		};
		assert_eq!(
			model.add_link(source, target),
			Err(GraphError::SelfLoop { id: NodeId(1) })
		);
	}
}
