use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::debug;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::handle::EditorHandle;
use super::render;
use crate::editor::{EditorSession, GraphModel, ModeKind, TickOutcome};

const FRAME_DT: f64 = 0.016;

fn canvas_size(
	canvas: &HtmlCanvasElement,
	window: &Window,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> (f64, f64) {
	if fullscreen {
		(
			window
				.inner_width()
				.ok()
				.and_then(|v| v.as_f64())
				.unwrap_or(800.0),
			window
				.inner_height()
				.ok()
				.and_then(|v| v.as_f64())
				.unwrap_or(600.0),
		)
	} else {
		(
			width.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_width() as f64)
					.unwrap_or(800.0)
			}),
			height.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_height() as f64)
					.unwrap_or(600.0)
			}),
		)
	}
}

/// Pointer position relative to the canvas' top-left corner.
fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Canvas view of the pipeline graph. Creates the editor session once
/// the canvas is mounted and drives the layout from the animation frame.
#[component]
pub fn PipelineCanvas(
	editor: EditorHandle,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (animate_init, resize_cb_init) = (animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = canvas_size(&canvas, &window, fullscreen, width, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			return;
		};
		editor.install(EditorSession::new(GraphModel::demo(), w, h));

		let canvas_resize = canvas.clone();
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = canvas_size(&canvas_resize, &win, fullscreen, width, height);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			editor.with_session(|s| s.resize(nw, nh));
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let shared = editor.shared();
		let animate_inner = animate_init.clone();
		let mut flow_time = 0.0;
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *shared.borrow_mut() {
				if s.frame(FRAME_DT) == TickOutcome::Settled {
					debug!("Layout at rest");
				}
				flow_time += FRAME_DT;
				render::render(s, flow_time, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = local_point(canvas_ref, &ev) {
			editor.with_session(|s| s.pointer_down(x, y));
		}
	};

	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = local_point(canvas_ref, &ev) {
			editor.with_session(|s| s.pointer_move(x, y));
		}
	};

	let on_mouseup = move |_: MouseEvent| {
		editor.with_session(|s| s.pointer_up());
	};

	let on_mouseleave = move |_: MouseEvent| {
		editor.with_session(|s| s.pointer_up());
	};

	let on_wheel = move |ev: WheelEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if editor
			.with_session(|s| s.wheel(x, y, ev.delta_y()))
			.unwrap_or(false)
		{
			ev.prevent_default();
		}
	};

	let snapshot = editor.snapshot();
	let cursor = move || match snapshot.with(|s| s.mode) {
		ModeKind::Drag => "display: block; cursor: move;",
		ModeKind::Zoom => "display: block; cursor: grab;",
		ModeKind::Idle => "display: block; cursor: default;",
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="pipeline-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style=cursor
		/>
	}
}
