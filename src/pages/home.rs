use leptos::prelude::*;

use crate::components::pipeline_editor::{EditorControls, EditorHandle, PipelineCanvas};

/// Editor page: the graph canvas beside its control panel.
#[component]
pub fn Home() -> impl IntoView {
	let editor = EditorHandle::new();

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"¡Algo salió mal!"</h1>

				<p>"Errores: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="editor-layout">
				<div class="graph-container">
					<PipelineCanvas editor=editor />
				</div>
				<EditorControls editor=editor />
			</div>
		</ErrorBoundary>
	}
}
