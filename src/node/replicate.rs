use tracing::{debug, trace};

use super::error::BuildError;
use super::grid::{fill_region, Color, PixelGrid};
use super::homogeneity::average_color;
use super::{KdNode, Region};
use crate::config::Config;

impl KdNode {
	/// Deep copy sharing nothing with `self`.
	///
	/// Children are owned `Box`es, so the derived `Clone` already allocates
	/// every node afresh.
	pub fn copy(&self) -> KdNode {
		self.clone()
	}

	/// Repaints the whole of `grid` with this tree's geometry.
	pub fn redraw<G: PixelGrid + ?Sized>(
		&self,
		grid: &mut G,
		config: &Config
	) -> Result<(), BuildError> {
		let region = grid.region();
		debug!(%region, height = self.height(), leaves = self.leaf_count(), "redrawing tree");
		self.rebuild_on(grid, region, config.draw_boundaries.then_some(config.boundary_color))
	}

	/// Paints every leaf region, reached from `region` through this tree's
	/// splits, with its average color taken from `grid`.
	///
	/// Unlike `build_from_template`, homogeneity and depth are not
	/// re-evaluated. With a `boundary` color, each split line is drawn
	/// after its subtree is painted.
	pub fn rebuild_on<G: PixelGrid + ?Sized>(
		&self,
		grid: &mut G,
		region: Region,
		boundary: Option<Color>
	) -> Result<(), BuildError> {
		match self {
			KdNode::Leaf => {
				let avg = average_color(grid, region);
				trace!(%region, "repaint leaf");
				fill_region(grid, region, avg);
			},
			KdNode::Internal { orientation, split, left, right } => {
				if !region.splits_at(*orientation, *split) {
					return Err(BuildError::SplitOutsideRegion {
						split: *split,
						region,
						orientation: *orientation,
					});
				}
				let (lregion, rregion) = region.split(*orientation, *split);
				left.rebuild_on(grid, lregion, boundary)?;
				right.rebuild_on(grid, rregion, boundary)?;
				if let Some(color) = boundary {
					fill_region(grid, region.boundary(*orientation, *split), color);
				}
			},
		}
		Ok(())
	}
}
