use crate::node::error::ConfigError;
use crate::node::grid::{Color, BOUNDARY_COLOR};

pub const DEFAULT_MAX_DEPTH: u32 = 12;
pub const DEFAULT_THRESHOLD: f64 = 2000.;

/// Settings for building and redrawing a tree.
///
/// Passed by reference into every build so that nothing about a build is
/// global. The random source for split coordinates is passed separately.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
	/// Deepest level at which a region may still be split.
	/// 0 means the root is always a leaf.
	pub max_depth: u32,
	/// Variance below which a region counts as homogeneous.
	pub threshold: f64,
	/// Whether to draw a line over each split after its halves are filled.
	pub draw_boundaries: bool,
	pub boundary_color: Color,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			max_depth: DEFAULT_MAX_DEPTH,
			threshold: DEFAULT_THRESHOLD,
			draw_boundaries: true,
			boundary_color: BOUNDARY_COLOR,
		}
	}
}

impl Config {
	pub fn with_max_depth(self, max_depth: u32) -> Self {
		Config { max_depth, ..self }
	}

	pub fn with_threshold(self, threshold: f64) -> Self {
		Config { threshold, ..self }
	}

	pub fn with_boundaries(self, draw_boundaries: bool) -> Self {
		Config { draw_boundaries, ..self }
	}

	pub fn with_boundary_color(self, boundary_color: Color) -> Self {
		Config { boundary_color, ..self }
	}

	/// Checks that the configuration can drive a build.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if !self.threshold.is_finite() || self.threshold < 0. {
			return Err(ConfigError::InvalidThreshold(self.threshold));
		}
		Ok(())
	}
}
