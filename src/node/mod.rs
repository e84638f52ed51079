pub mod error;
pub mod grid;
pub mod homogeneity;

pub use grid::{Color, PixelGrid};

use std::fmt;

/// Axis-aligned rectangle of pixel coordinates.
///
/// Half-open on the max edges: column `x_max` and row `y_max` are not part
/// of the region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
	pub x_min: u32,
	pub y_min: u32,
	pub x_max: u32,
	pub y_max: u32,
}

impl Region {
	/// Makes a region, swapping bounds where needed so that `min <= max`.
	pub fn new(x_min: u32, y_min: u32, x_max: u32, y_max: u32) -> Self {
		Self {
			x_min: x_min.min(x_max),
			y_min: y_min.min(y_max),
			x_max: x_max.max(x_min),
			y_max: y_max.max(y_min),
		}
	}

	/// The region covering a whole `width` by `height` grid.
	pub fn full(width: u32, height: u32) -> Self {
		Self::new(0, 0, width, height)
	}

	pub fn width(&self) -> u32 {
		self.x_max - self.x_min
	}

	pub fn height(&self) -> u32 {
		self.y_max - self.y_min
	}

	/// Pixel count used for averaging; a degenerate dimension counts as 1.
	pub fn size(&self) -> u64 {
		self.width().max(1) as u64 * self.height().max(1) as u64
	}

	/// Bounds `(low, high)` on the axis `orientation` splits along.
	pub fn bounds(&self, orientation: Orientation) -> (u32, u32) {
		match orientation {
			Orientation::X => (self.x_min, self.x_max),
			Orientation::Y => (self.y_min, self.y_max),
		}
	}

	/// Extent of the region on the axis `orientation` splits along.
	pub fn extent(&self, orientation: Orientation) -> u32 {
		let (low, high) = self.bounds(orientation);
		high - low
	}

	/// Whether `at` lies strictly inside the region on the active axis.
	pub fn splits_at(&self, orientation: Orientation, at: u32) -> bool {
		let (low, high) = self.bounds(orientation);
		low < at && at < high
	}

	/// Cuts the region in two at `at`.
	///
	/// For `X` the halves are left and right of column `at`; for `Y` they
	/// are above and below row `at`. The caller is responsible for `at`
	/// lying inside the region.
	pub fn split(&self, orientation: Orientation, at: u32) -> (Region, Region) {
		match orientation {
			Orientation::X => (
				Region { x_max: at, ..*self },
				Region { x_min: at, ..*self },
			),
			Orientation::Y => (
				Region { y_max: at, ..*self },
				Region { y_min: at, ..*self },
			),
		}
	}

	/// The one pixel wide line drawn over a split at `at`.
	pub fn boundary(&self, orientation: Orientation, at: u32) -> Region {
		match orientation {
			Orientation::X => Region { x_min: at, x_max: at + 1, ..*self },
			Orientation::Y => Region { y_min: at, y_max: at + 1, ..*self },
		}
	}
}

impl fmt::Display for Region {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{},{})x[{},{})", self.x_min, self.x_max, self.y_min, self.y_max)
	}
}

/// Axis a node splits along.
///
/// `X` cuts the region with a vertical line (a column), `Y` with a
/// horizontal line (a row). Orientation alternates with depth, starting at
/// `X` for the root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
	X,
	Y,
}

impl Orientation {
	/// Orientation of a node at `depth`.
	pub fn at_depth(depth: u32) -> Self {
		if depth % 2 == 0 { Orientation::X } else { Orientation::Y }
	}

	pub fn flip(self) -> Self {
		match self {
			Orientation::X => Orientation::Y,
			Orientation::Y => Orientation::X,
		}
	}
}

impl fmt::Display for Orientation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Orientation::X => "X",
			Orientation::Y => "Y",
		})
	}
}

/// Node in a k-d tree partitioning an image.
///
/// A `Leaf` is a region that was not subdivided and is drawn with its
/// average color. An `Internal` node always has both children; a tree that
/// is only a `Leaf` is the empty tree (the whole image was homogeneous).
///
/// Neither regions nor colors are stored; regions follow from the root
/// region and the split coordinates on the way down.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum KdNode {
	#[default]
	Leaf,
	Internal {
		orientation: Orientation,
		split: u32,
		left: Box<KdNode>,
		right: Box<KdNode>,
	},
}

impl KdNode {
	pub fn internal(orientation: Orientation, split: u32, left: KdNode, right: KdNode) -> Self {
		KdNode::Internal {
			orientation,
			split,
			left: Box::new(left),
			right: Box::new(right),
		}
	}

	pub fn is_leaf(&self) -> bool {
		matches!(self, KdNode::Leaf)
	}

	/// Number of internal levels: 0 for a leaf, otherwise one more than the
	/// taller child.
	pub fn height(&self) -> u32 {
		match self {
			KdNode::Leaf => 0,
			KdNode::Internal { left, right, .. } => 1 + left.height().max(right.height()),
		}
	}

	pub fn leaf_count(&self) -> usize {
		match self {
			KdNode::Leaf => 1,
			KdNode::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
		}
	}

	pub fn internal_count(&self) -> usize {
		match self {
			KdNode::Leaf => 0,
			KdNode::Internal { left, right, .. } => 1 + left.internal_count() + right.internal_count(),
		}
	}

	/// Split coordinate of an internal node.
	pub fn split(&self) -> Option<u32> {
		match self {
			KdNode::Leaf => None,
			KdNode::Internal { split, .. } => Some(*split),
		}
	}

	/// Mutable access to the split coordinate of an internal node.
	pub fn split_mut(&mut self) -> Option<&mut u32> {
		match self {
			KdNode::Leaf => None,
			KdNode::Internal { split, .. } => Some(split),
		}
	}

	/// Both children of an internal node.
	pub fn children(&self) -> Option<(&KdNode, &KdNode)> {
		match self {
			KdNode::Leaf => None,
			KdNode::Internal { left, right, .. } => Some((&**left, &**right)),
		}
	}

	/// Leaf regions in left-to-right pre-order, starting from `region`.
	pub fn leaf_regions(&self, region: Region) -> Vec<Region> {
		let mut out = Vec::new();
		self.collect_leaves(region, &mut out);
		out
	}

	fn collect_leaves(&self, region: Region, out: &mut Vec<Region>) {
		match self {
			KdNode::Leaf => out.push(region),
			KdNode::Internal { orientation, split, left, right } => {
				let (l, r) = region.split(*orientation, *split);
				left.collect_leaves(l, out);
				right.collect_leaves(r, out);
			}
		}
	}
}

pub mod build;
pub mod codec;
pub mod replicate;
