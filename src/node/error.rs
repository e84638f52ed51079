use thiserror::Error;

use super::{Orientation, Region};

/// Reason why a region couldn't be partitioned into a tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
	/// The region is too thin on the axis it was asked to split along; an
	/// axis needs an extent of at least 2 to be cut.
	#[error("cannot split {region} along {orientation}: axis too thin to bisect")]
	InvalidRegion {
		region: Region,
		orientation: Orientation,
	},
	/// A split taken from an existing tree does not fall strictly inside
	/// the region it is applied to (for instance, a tree replayed onto a
	/// smaller image).
	#[error("split {split} along {orientation} lies outside {region}")]
	SplitOutsideRegion {
		split: u32,
		region: Region,
		orientation: Orientation,
	},
	/// A template node splits along a different axis than its depth calls
	/// for; orientation must alternate starting with `X` at the root.
	#[error("template node at depth {depth} splits along {found}, expected {expected}")]
	OrientationMismatch {
		depth: u32,
		expected: Orientation,
		found: Orientation,
	},
}

/// Reason why tree file data couldn't be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
	/// There was no valid tree file header.
	#[error("missing tree file header")]
	MissingHeader,
	/// The header names a format version this build can't read.
	#[error("unsupported tree file version {0}")]
	UnsupportedVersion(u8),
	/// A field was expected but the data ran out.
	#[error("tree data truncated at byte {offset}")]
	Truncated { offset: usize },
	/// A node tag was neither leaf nor internal.
	#[error("unknown node tag {tag:#04x} at byte {offset}")]
	UnknownTag { tag: u8, offset: usize },
	/// An internal node sits at or below the declared height.
	#[error("internal node at depth {depth} exceeds declared height {height}")]
	DepthExceeded { depth: u32, height: u32 },
	/// The decoded tree is shorter than the header claims.
	#[error("declared height {declared} but decoded tree has height {actual}")]
	HeightMismatch { declared: u32, actual: u32 },
	/// A split coordinate does not fall strictly inside its region.
	#[error("split {split} along {orientation} lies outside {region}")]
	SplitOutOfRange {
		split: u32,
		region: Region,
		orientation: Orientation,
	},
	/// Bytes were left over after the last node.
	#[error("{remaining} trailing byte(s) after tree data")]
	TrailingData { remaining: usize },
}

/// Reason why a tree file couldn't be saved or loaded.
#[derive(Debug, Error)]
pub enum TreeFileError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("invalid tree file: {0}")]
	Decode(#[from] DecodeError),
}

/// Reason why a build configuration was rejected.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
	/// The homogeneity threshold must be a finite number `>= 0`.
	#[error("homogeneity threshold must be finite and non-negative, got {0}")]
	InvalidThreshold(f64),
}
