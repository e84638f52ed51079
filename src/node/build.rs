use rand::Rng;

use tracing::{debug, trace};

use super::error::BuildError;
use super::grid::{fill_region, PixelGrid};
use super::homogeneity::{average_color, is_homogeneous};
use super::{KdNode, Orientation, Region};
use crate::config::Config;

/// Picks a coordinate to split `region` at along `orientation`.
///
/// The coordinate is drawn uniformly from the integers strictly inside the
/// middle third of the axis. When the middle third holds no integer (an
/// extent of 1 or 3), the midpoint is used instead if it lies strictly
/// inside the region.
///
/// Fails with `InvalidRegion` when the axis is too thin to bisect.
pub fn pick_split<R: Rng>(
	region: Region,
	orientation: Orientation,
	rng: &mut R
) -> Result<u32, BuildError> {
	let (low, high) = region.bounds(orientation);
	if low >= high {
		return Err(BuildError::InvalidRegion { region, orientation });
	}
	let span = high - low;
	// Integers in the open interval (low + span/3, low + 2*span/3), in u64
	// so wide spans can't overflow; both ends stay below `high`.
	let first = low as u64 + span as u64 / 3 + 1;
	let last = (low as u64 + (2 * span as u64 + 2) / 3).saturating_sub(1);
	if first <= last {
		return Ok(rng.random_range(first as u32..=last as u32));
	}
	let mid = low + span / 2;
	if region.splits_at(orientation, mid) {
		Ok(mid)
	} else {
		Err(BuildError::InvalidRegion { region, orientation })
	}
}

/// Fills `region` with its own average color.
fn flatten<G: PixelGrid + ?Sized>(grid: &mut G, region: Region) {
	let avg = average_color(grid, region);
	fill_region(grid, region, avg);
}

/// Whether a node at `depth` must stop splitting `region`.
fn is_terminal<G: PixelGrid + ?Sized>(
	grid: &G,
	region: Region,
	depth: u32,
	orientation: Orientation,
	config: &Config
) -> bool {
	depth >= config.max_depth ||
		region.extent(orientation) < 2 ||
		is_homogeneous(grid, region, config.threshold)
}

impl KdNode {
	/// Partitions the whole of `grid` into a tree, painting each leaf
	/// region with its average color as it goes.
	pub fn from_grid<G: PixelGrid + ?Sized, R: Rng>(
		grid: &mut G,
		config: &Config,
		rng: &mut R
	) -> Result<KdNode, BuildError> {
		let region = grid.region();
		debug!(%region, max_depth = config.max_depth, threshold = config.threshold, "building tree");
		let tree = Self::build(grid, region, 0, Orientation::X, config, rng)?;
		debug!(height = tree.height(), leaves = tree.leaf_count(), "built tree");
		Ok(tree)
	}

	/// Recursively partitions `region` of `grid`.
	///
	/// A region becomes a leaf, filled with its average color, once `depth`
	/// reaches `config.max_depth`, once it is homogeneous, or when it is
	/// too thin to split along `orientation`. Otherwise it is cut at a
	/// random coordinate in the middle third of the active axis and both
	/// halves are built with the other orientation. Boundary lines are
	/// drawn after both halves so the fills don't paint over them.
	///
	/// For outside callers: `from_grid` supplies the root arguments.
	pub fn build<G: PixelGrid + ?Sized, R: Rng>(
		grid: &mut G,
		region: Region,
		depth: u32,
		orientation: Orientation,
		config: &Config,
		rng: &mut R
	) -> Result<KdNode, BuildError> {
		if is_terminal(grid, region, depth, orientation, config) {
			trace!(depth, %region, "leaf");
			flatten(grid, region);
			return Ok(KdNode::Leaf);
		}
		let split = pick_split(region, orientation, rng)?;
		trace!(depth, %region, %orientation, split, "split");
		let (lregion, rregion) = region.split(orientation, split);
		let left = Self::build(grid, lregion, depth + 1, orientation.flip(), config, rng)?;
		let right = Self::build(grid, rregion, depth + 1, orientation.flip(), config, rng)?;
		if config.draw_boundaries {
			fill_region(grid, region.boundary(orientation, split), config.boundary_color);
		}
		Ok(KdNode::internal(orientation, split, left, right))
	}

	/// Partitions the whole of `grid` reusing this tree's splits.
	pub fn replay_on<G: PixelGrid + ?Sized>(
		&self,
		grid: &mut G,
		config: &Config
	) -> Result<KdNode, BuildError> {
		let region = grid.region();
		debug!(%region, template_height = self.height(), "replaying template");
		let tree = Self::build_from_template(self, grid, region, 0, config)?;
		debug!(height = tree.height(), leaves = tree.leaf_count(), "replayed template");
		Ok(tree)
	}

	/// Like `build`, but the decision to split and the split coordinate
	/// come from `template` instead of being sampled.
	///
	/// Termination is still checked against `grid`, so a template node may
	/// collapse to a leaf when the new image is homogeneous there. A
	/// template split that doesn't fall strictly inside `region` fails with
	/// `SplitOutsideRegion`, and a template node whose orientation isn't the
	/// one for `depth` fails with `OrientationMismatch`.
	pub fn build_from_template<G: PixelGrid + ?Sized>(
		template: &KdNode,
		grid: &mut G,
		region: Region,
		depth: u32,
		config: &Config
	) -> Result<KdNode, BuildError> {
		let (orientation, split, tleft, tright) = match template {
			KdNode::Internal { orientation, split, left, right }
				if !is_terminal(grid, region, depth, *orientation, config) =>
					(*orientation, *split, left, right),
			_ => {
				trace!(depth, %region, "leaf");
				flatten(grid, region);
				return Ok(KdNode::Leaf);
			}
		};
		let expected = Orientation::at_depth(depth);
		if orientation != expected {
			return Err(BuildError::OrientationMismatch { depth, expected, found: orientation });
		}
		if !region.splits_at(orientation, split) {
			return Err(BuildError::SplitOutsideRegion { split, region, orientation });
		}
		trace!(depth, %region, %orientation, split, "template split");
		let (lregion, rregion) = region.split(orientation, split);
		let left = Self::build_from_template(tleft, grid, lregion, depth + 1, config)?;
		let right = Self::build_from_template(tright, grid, rregion, depth + 1, config)?;
		if config.draw_boundaries {
			fill_region(grid, region.boundary(orientation, split), config.boundary_color);
		}
		Ok(KdNode::internal(orientation, split, left, right))
	}
}
