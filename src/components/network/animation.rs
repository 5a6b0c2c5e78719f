use std::f64::consts::PI;

use super::config::PulseConfig;

pub fn ease_sin_in_out(t: f64) -> f64 {
	(1.0 - (PI * t).cos()) / 2.0
}

pub fn ease_cubic_in_out(t: f64) -> f64 {
	let t = t * 2.0;
	if t <= 1.0 {
		t * t * t / 2.0
	} else {
		let t = t - 2.0;
		(t * t * t + 2.0) / 2.0
	}
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
	from + (to - from) * t
}

/// A single eased transition between two values.
#[derive(Clone, Copy, Debug)]
pub struct Tween {
	start_ms: f64,
	duration_ms: f64,
	from: f64,
	to: f64,
}

impl Tween {
	pub fn new(start_ms: f64, duration_ms: f64, from: f64, to: f64) -> Self {
		Self {
			start_ms,
			duration_ms,
			from,
			to,
		}
	}

	fn progress(&self, now_ms: f64) -> f64 {
		if self.duration_ms <= 0.0 {
			return 1.0;
		}
		((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
	}

	pub fn value_at(&self, now_ms: f64) -> f64 {
		lerp(self.from, self.to, ease_cubic_in_out(self.progress(now_ms)))
	}

	pub fn is_done(&self, now_ms: f64) -> bool {
		self.progress(now_ms) >= 1.0
	}
}

/// Endless breathing of a node circle between its full and rest radius.
///
/// The circle is created at full size, eases toward full size for one grow
/// period (a hold, since it is already there), then alternates shrink and
/// grow for as long as the owning scene lives.
#[derive(Clone, Copy, Debug)]
pub struct Pulsation {
	started_ms: f64,
	full: f64,
	rest: f64,
	grow_ms: f64,
	shrink_ms: f64,
}

impl Pulsation {
	pub fn new(started_ms: f64, full: f64, rest: f64, timing: &PulseConfig) -> Self {
		Self {
			started_ms,
			full,
			rest,
			grow_ms: timing.grow_ms,
			shrink_ms: timing.shrink_ms,
		}
	}

	pub fn radius_at(&self, now_ms: f64) -> f64 {
		let elapsed = (now_ms - self.started_ms).max(0.0);
		let period = self.grow_ms + self.shrink_ms;
		if elapsed < self.grow_ms || period <= 0.0 {
			return self.full;
		}
		let t = (elapsed - self.grow_ms) % period;
		if t < self.shrink_ms {
			lerp(self.full, self.rest, ease_sin_in_out(t / self.shrink_ms))
		} else {
			lerp(self.rest, self.full, ease_sin_in_out((t - self.shrink_ms) / self.grow_ms))
		}
	}
}
