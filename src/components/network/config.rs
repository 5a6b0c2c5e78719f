use serde::Deserialize;

use super::error::{NetworkError, NetworkResult};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
	/// Rest length of every link spring.
	pub link_distance: f64,
	/// Many-body strength; negative repels.
	pub charge_strength: f64,
	/// Pairs closer than this are treated as this far apart.
	pub charge_distance_min: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	pub alpha_target: f64,
	pub velocity_decay: f64,
}

impl Default for SimulationParameters {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			link_distance: 400.0,
			charge_strength: -5000.0,
			charge_distance_min: 1.0,
			alpha_min,
			alpha_decay: 1.0 - f64::powf(alpha_min, 1.0 / 300.0),
			alpha_target: 0.0,
			velocity_decay: 0.4,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
	pub min_scale: f64,
	pub max_scale: f64,
}

impl Default for ZoomConfig {
	fn default() -> Self {
		Self {
			min_scale: 0.5,
			max_scale: 2.0,
		}
	}
}

impl ZoomConfig {
	/// Both bounds must be positive and finite, with `min_scale <= max_scale`.
	pub fn validate(&self) -> NetworkResult<()> {
		let positive = |k: f64| k.is_finite() && k > 0.0;
		let (min, max) = (self.min_scale, self.max_scale);
		if positive(min) && positive(max) && min <= max {
			Ok(())
		} else {
			Err(NetworkError::InvalidZoomExtent {
				min_scale: self.min_scale,
				max_scale: self.max_scale,
			})
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TooltipConfig {
	pub offset_x: f64,
	pub offset_y: f64,
	pub char_width: f64,
	pub height: f64,
	pub corner_radius: f64,
	pub fade_in_ms: f64,
	pub fade_out_ms: f64,
}

impl Default for TooltipConfig {
	fn default() -> Self {
		Self {
			offset_x: 100.0,
			offset_y: -20.0,
			char_width: 6.0,
			height: 70.0,
			corner_radius: 10.0,
			fade_in_ms: 50.0,
			fade_out_ms: 50.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
	pub grow_ms: f64,
	pub shrink_ms: f64,
}

impl Default for PulseConfig {
	fn default() -> Self {
		Self {
			grow_ms: 1500.0,
			shrink_ms: 2000.0,
		}
	}
}

/// Tunables for one mounted network. Every field falls back to its default
/// when omitted from a serialized config.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
	pub simulation: SimulationParameters,
	pub zoom: ZoomConfig,
	pub tooltip: TooltipConfig,
	pub pulse: PulseConfig,
}
