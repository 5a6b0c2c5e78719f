use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Element, MouseEvent, WheelEvent, Window};

use super::config::NetworkConfig;
use super::error::NetworkResult;
use super::graph::Graph;
use super::interaction::wheel_factor;
use super::state::NetworkState;
use super::surface::{DomSurface, Surface};
use super::types::{GraphData, Viewport};

/// Everything a mounted network keeps alive between browser callbacks.
#[derive(Clone, Default)]
struct Handles {
	state: Rc<RefCell<Option<NetworkState<DomSurface>>>>,
	animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
	frame: Rc<Cell<Option<i32>>>,
	resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl Handles {
	/// Cancels the frame loop, drops the resize listener and clears the surface.
	fn unmount(&self) {
		if let Some(window) = web_sys::window() {
			if let Some(id) = self.frame.take() {
				let _ = window.cancel_animation_frame(id);
			}
			if let Some(cb) = self.resize_cb.borrow_mut().take() {
				let listener = cb.as_ref().unchecked_ref();
				let _ = window.remove_event_listener_with_callback("resize", listener);
			}
		}
		self.animate.borrow_mut().take();
		if let Some(mut state) = self.state.borrow_mut().take() {
			state.teardown();
			state.scene().borrow_mut().surface_mut().unmount();
			info!("network unmounted");
		}
	}
}

fn now(window: &Window) -> f64 {
	window
		.performance()
		.map(|p| p.now())
		.unwrap_or_else(js_sys::Date::now)
}

fn measure(
	window: &Window,
	host: &Element,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> Viewport {
	let inner = |v: Result<JsValue, JsValue>, fallback: f64| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	if fullscreen {
		Viewport::new(
			inner(window.inner_width(), 800.0),
			inner(window.inner_height(), 600.0),
		)
	} else {
		Viewport::new(
			width.unwrap_or_else(|| match host.client_width() {
				0 => 800.0,
				w => w as f64,
			}),
			height.unwrap_or_else(|| match host.client_height() {
				0 => 600.0,
				h => h as f64,
			}),
		)
	}
}

fn mount(
	host: &Element,
	data: &GraphData,
	viewport: Viewport,
	config: NetworkConfig,
	now_ms: f64,
) -> NetworkResult<NetworkState<DomSurface>> {
	let graph = Graph::new(data)?;
	let mut surface = DomSurface::mount(host)?;
	surface.resize(viewport.width, viewport.height);
	let svg = surface.root();
	NetworkState::new(graph, surface, viewport, config, now_ms).inspect_err(|_| svg.remove())
}

/// Pointer position relative to the host element.
fn local(host: &Element, ev: &MouseEvent) -> (f64, f64) {
	let rect = host.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

#[component]
pub fn NetworkGraph(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(optional)] config: NetworkConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let host_ref = NodeRef::<leptos::html::Div>::new();
	let handles = Handles::default();
	let failure = RwSignal::new(None::<String>);

	let cleanup = StoredValue::new_local(handles.clone());
	on_cleanup(move || {
		cleanup.try_with_value(Handles::unmount);
	});

	let handles_init = handles.clone();
	Effect::new(move |_| {
		let data = data.get();
		let Some(host) = host_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};
		let host: Element = host.into();
		let h = handles_init.clone();
		h.unmount();
		while let Some(child) = host.first_child() {
			let _ = host.remove_child(&child);
		}

		let viewport = measure(&window, &host, fullscreen, width, height);
		match mount(&host, &data, viewport, config.clone(), now(&window)) {
			Ok(state) => {
				failure.set(None);
				*h.state.borrow_mut() = Some(state);
			}
			Err(err) => {
				error!("network not started: {err}");
				failure.set(Some(err.to_string()));
				return;
			}
		}

		let (state_resize, host_resize) = (h.state.clone(), host.clone());
		*h.resize_cb.borrow_mut() = Some(Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let viewport = measure(&win, &host_resize, fullscreen, width, height);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				if s.viewport() == viewport {
					return;
				}
				s.scene().borrow_mut().surface_mut().resize(viewport.width, viewport.height);
				if let Err(err) = s.resize(viewport, now(&win)) {
					error!("rebuild after resize failed: {err}");
				}
			}
		}));
		if let Some(ref cb) = *h.resize_cb.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner, frame_inner) =
			(h.state.clone(), h.animate.clone(), h.frame.clone());
		*h.animate.borrow_mut() = Some(Closure::new(move |now_ms: f64| {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.frame(now_ms);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				frame_inner.set(win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let Some(ref cb) = *h.animate.borrow() {
			h.frame
				.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	});

	let with_state = {
		let state = handles.state.clone();
		move |ev: &MouseEvent, f: &dyn Fn(&mut NetworkState<DomSurface>, (f64, f64), f64)| {
			let (Some(host), Some(window)) = (host_ref.get(), web_sys::window()) else {
				return;
			};
			let host: Element = host.into();
			let pos = local(&host, ev);
			if let Some(ref mut s) = *state.borrow_mut() {
				f(s, pos, now(&window));
			}
		}
	};

	let on_mousedown = {
		let with_state = with_state.clone();
		move |ev: MouseEvent| with_state(&ev, &|s, (x, y), _| s.pointer_down(x, y))
	};

	let on_mousemove = {
		let with_state = with_state.clone();
		move |ev: MouseEvent| with_state(&ev, &|s, (x, y), t| s.pointer_move(x, y, t))
	};

	let on_mouseup = {
		let with_state = with_state.clone();
		move |ev: MouseEvent| with_state(&ev, &|s, _, _| s.pointer_up())
	};

	let on_mouseleave = {
		let with_state = with_state.clone();
		move |ev: MouseEvent| with_state(&ev, &|s, _, t| s.pointer_leave(t))
	};

	let on_click = {
		let with_state = with_state.clone();
		move |ev: MouseEvent| {
			with_state(&ev, &|s, (x, y), _| {
				s.click(x, y, |url| {
					let opened = web_sys::window()
						.map(|w| w.open_with_url_and_target(url, "_blank"));
					match opened {
						Some(Ok(_)) => info!("opened {url}"),
						_ => warn!("could not open {url}"),
					}
				});
			})
		}
	};

	let on_dblclick = {
		let with_state = with_state.clone();
		move |ev: MouseEvent| {
			ev.prevent_default();
			let zoom_out = ev.shift_key();
			with_state(&ev, &|s, (x, y), _| s.double_click(x, y, zoom_out))
		}
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let factor = wheel_factor(ev.delta_y(), ev.delta_mode(), ev.ctrl_key());
		let mouse: &MouseEvent = &ev;
		with_state(mouse, &|s, (x, y), _| s.wheel(x, y, factor));
	};

	let style = if fullscreen {
		"position: fixed; inset: 0; width: 100vw; height: 100vh; cursor: grab;"
	} else {
		"position: relative; width: 100%; height: 100%; cursor: grab;"
	};

	view! {
		<div
			node_ref=host_ref
			class="network-graph"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:click=on_click
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			style=style
		/>
		<Show when=move || failure.with(Option::is_some)>
			<p class="network-error">{move || failure.get().unwrap_or_default()}</p>
		</Show>
	}
}

#[cfg(all(test, target_arch = "wasm32"))]
mod dom_tests {
	use wasm_bindgen_test::*;

	use super::*;
	use crate::components::network::error::NetworkError;
	use crate::components::network::types::{GraphLink, GraphNode};

	wasm_bindgen_test_configure!(run_in_browser);

	#[wasm_bindgen_test]
	fn failed_mount_detaches_its_svg() {
		let window = web_sys::window().unwrap();
		let document = window.document().unwrap();
		let host = document.create_element("div").unwrap();
		document.body().unwrap().append_child(&host).unwrap();

		let node = |id: &str| GraphNode {
			id: id.into(),
			label: id.into(),
			info: None,
			url: None,
		};
		let data = GraphData {
			nodes: vec![node("center"), node("games")],
			links: vec![GraphLink {
				source: "center".into(),
				target: "games".into(),
			}],
		};
		let config: NetworkConfig =
			serde_json::from_str(r#"{ "zoom": { "min_scale": 3.0, "max_scale": 1.0 } }"#).unwrap();

		let result = mount(&host, &data, Viewport::new(800.0, 600.0), config, 0.0);
		assert!(matches!(result, Err(NetworkError::InvalidZoomExtent { .. })));
		assert_eq!(host.child_element_count(), 0);

		let state = mount(&host, &data, Viewport::new(800.0, 600.0), NetworkConfig::default(), 0.0);
		assert!(state.is_ok());
		assert_eq!(host.child_element_count(), 1);
	}
}
