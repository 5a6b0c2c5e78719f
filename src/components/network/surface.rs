//! The drawable surface a scene is built on.

use log::warn;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use super::error::NetworkResult;

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// A tree of drawable elements rooted at one full-viewport surface.
pub trait Surface {
	type Element: Clone;

	fn root(&self) -> Self::Element;

	fn create(&mut self, parent: &Self::Element, tag: &str) -> NetworkResult<Self::Element>;

	fn set_attribute(&mut self, element: &Self::Element, name: &str, value: &str);

	fn set_text(&mut self, element: &Self::Element, text: &str);

	fn remove(&mut self, element: &Self::Element);

	/// Removes every child of the root.
	fn clear(&mut self);

	/// Sets several attributes at once.
	fn set_attributes(&mut self, element: &Self::Element, attrs: &[(&str, &str)]) {
		for (name, value) in attrs {
			self.set_attribute(element, name, value);
		}
	}

	fn append(
		&mut self,
		parent: &Self::Element,
		tag: &str,
		attrs: &[(&str, &str)],
	) -> NetworkResult<Self::Element> {
		let element = self.create(parent, tag)?;
		self.set_attributes(&element, attrs);
		Ok(element)
	}
}

/// An `<svg>` element owned by the network, mounted inside a host element.
pub struct DomSurface {
	document: Document,
	svg: Element,
}

impl DomSurface {
	pub fn mount(host: &Element) -> NetworkResult<Self> {
		let document = host
			.owner_document()
			.ok_or_else(|| wasm_bindgen::JsValue::from_str("host element has no document"))?;
		let svg = document.create_element_ns(Some(SVG_NS), "svg")?;
		svg.set_attribute("class", "network-surface")?;
		svg.set_attribute("style", "display: block; width: 100%; height: 100%;")?;
		host.append_child(&svg)?;
		Ok(Self { document, svg })
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		let (svg, w, h) = (self.svg.clone(), width.to_string(), height.to_string());
		self.set_attributes(&svg, &[("width", w.as_str()), ("height", h.as_str())]);
	}

	/// Clears and detaches the `<svg>` from its host.
	pub fn unmount(&mut self) {
		self.clear();
		self.svg.remove();
	}
}

impl Surface for DomSurface {
	type Element = Element;

	fn root(&self) -> Element {
		self.svg.clone()
	}

	fn create(&mut self, parent: &Element, tag: &str) -> NetworkResult<Element> {
		let element = self.document.create_element_ns(Some(SVG_NS), tag)?;
		parent.append_child(&element)?;
		Ok(element)
	}

	fn set_attribute(&mut self, element: &Element, name: &str, value: &str) {
		if let Err(err) = element.set_attribute(name, value) {
			warn!("ignoring {name}={value:?}: {err:?}");
		}
	}

	fn set_text(&mut self, element: &Element, text: &str) {
		element.set_text_content(Some(text));
	}

	fn remove(&mut self, element: &Element) {
		element.remove();
	}

	fn clear(&mut self) {
		while let Some(child) = self.svg.first_child() {
			match child.dyn_into::<Element>() {
				Ok(element) => element.remove(),
				Err(node) => {
					if self.svg.remove_child(&node).is_err() {
						break;
					}
				}
			}
		}
	}
}
