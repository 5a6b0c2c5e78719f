use leptos::prelude::*;

use crate::components::network::{Graph, GraphData, NetworkGraph, NetworkResult};

const DATASET: &str = include_str!("../../assets/network.json");

/// Parse the bundled dataset, refusing it if it breaks any graph invariant.
fn load_dataset() -> NetworkResult<GraphData> {
	let data = GraphData::from_json(DATASET)?;
	Graph::new(&data)?;
	Ok(data)
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let network = move || {
		load_dataset().map(|data| {
			let data = Signal::derive(move || data.clone());
			view! { <NetworkGraph data=data fullscreen=true /> }
		})
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
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

			<div class="fullscreen-graph">{network}</div>
		</ErrorBoundary>
	}
}
