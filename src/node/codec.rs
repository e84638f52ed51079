use std::io::Write;
use std::path::Path;

use tracing::debug;

use super::error::*;
use super::{KdNode, Orientation, Region};

/// Tree file magic number.
const MAGIC: &[u8; 6] = b"KdTrIm";
/// Tree file format version.
const VERSION: u8 = 1;
/// Magic, version and height.
const HEADER_LEN: usize = 11;

const TAG_LEAF: u8 = 0;
const TAG_INTERNAL: u8 = 1;

fn read_u8(buffer: &[u8], at: usize) -> Result<u8, DecodeError> {
	buffer.get(at).copied().ok_or(DecodeError::Truncated { offset: at })
}

/// Big-endian `u32` at `at`.
fn read_u32(buffer: &[u8], at: usize) -> Result<u32, DecodeError> {
	match buffer.get(at..at + 4) {
		Some(b) => Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]])),
		None => Err(DecodeError::Truncated { offset: at }),
	}
}

impl KdNode {
	/// Appends the pre-order encoding of this subtree to `buffer`.
	///
	/// Each node is one tag byte, 0 for a leaf and 1 for an internal node;
	/// an internal node's tag is followed by its split coordinate as a
	/// big-endian `u32`, then by its left and right subtrees. Orientation
	/// isn't stored because it follows from depth.
	pub fn encode(&self, buffer: &mut Vec<u8>) {
		match self {
			KdNode::Leaf => buffer.push(TAG_LEAF),
			KdNode::Internal { split, left, right, .. } => {
				buffer.push(TAG_INTERNAL);
				buffer.extend_from_slice(&split.to_be_bytes());
				left.encode(buffer);
				right.encode(buffer);
			}
		}
	}

	/// Parses a subtree of the sort `encode` writes, starting at `curr_ind`.
	///
	/// `region` and `depth` describe the position being decoded; they are
	/// used to rebuild orientations and to check that every split lies
	/// inside its region. Internal nodes at or below `height` are refused.
	///
	/// Successful return value includes the index to which the parser has
	/// progressed, to assist with the recursive algorithm.
	pub fn decode(
		buffer: &[u8],
		curr_ind: usize,
		region: Region,
		depth: u32,
		height: u32
	) -> Result<(KdNode, usize), DecodeError> {
		match read_u8(buffer, curr_ind)? {
			TAG_LEAF => Ok((KdNode::Leaf, curr_ind + 1)),
			TAG_INTERNAL => {
				if depth >= height {
					return Err(DecodeError::DepthExceeded { depth, height });
				}
				let split = read_u32(buffer, curr_ind + 1)?;
				let orientation = Orientation::at_depth(depth);
				if !region.splits_at(orientation, split) {
					return Err(DecodeError::SplitOutOfRange { split, region, orientation });
				}
				let (lregion, rregion) = region.split(orientation, split);
				let (left, curr_ind) = Self::decode(buffer, curr_ind + 5, lregion, depth + 1, height)?;
				let (right, curr_ind) = Self::decode(buffer, curr_ind, rregion, depth + 1, height)?;
				Ok((KdNode::internal(orientation, split, left, right), curr_ind))
			},
			tag => Err(DecodeError::UnknownTag { tag, offset: curr_ind }),
		}
	}

	/// Encodes the tree into tree file data: header, height, then nodes.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut ret = Vec::with_capacity(HEADER_LEN + 5 * self.internal_count() + self.leaf_count());
		ret.extend_from_slice(MAGIC);
		ret.push(VERSION);
		ret.extend_from_slice(&self.height().to_be_bytes());
		self.encode(&mut ret);
		ret
	}

	/// Decodes tree file data for an image covering `root`.
	pub fn from_bytes(source: &[u8], root: Region) -> Result<KdNode, DecodeError> {
		if source.len() < MAGIC.len() + 1 || &source[..MAGIC.len()] != MAGIC {
			return Err(DecodeError::MissingHeader);
		}
		if source[MAGIC.len()] != VERSION {
			return Err(DecodeError::UnsupportedVersion(source[MAGIC.len()]));
		}
		let height = read_u32(source, MAGIC.len() + 1)?;
		let (tree, end) = Self::decode(source, HEADER_LEN, root, 0, height)?;
		if end != source.len() {
			return Err(DecodeError::TrailingData { remaining: source.len() - end });
		}
		let actual = tree.height();
		if actual != height {
			return Err(DecodeError::HeightMismatch { declared: height, actual });
		}
		Ok(tree)
	}

	/// Writes the tree to `path`.
	///
	/// Data is staged in a temporary file next to `path` and moved into
	/// place once fully written, so an existing file is either replaced
	/// whole or left untouched.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), TreeFileError> {
		let path = path.as_ref();
		let data = self.to_bytes();
		let dir = match path.parent() {
			Some(p) if !p.as_os_str().is_empty() => p,
			_ => Path::new("."),
		};
		let mut staged = tempfile::NamedTempFile::new_in(dir)?;
		staged.write_all(&data)?;
		staged.as_file().sync_all()?;
		staged.persist(path).map_err(|e| e.error)?;
		debug!(path = %path.display(), bytes = data.len(), height = self.height(), "saved tree");
		Ok(())
	}

	/// Reads a tree file written by `save` for an image covering `root`.
	pub fn load<P: AsRef<Path>>(path: P, root: Region) -> Result<KdNode, TreeFileError> {
		let path = path.as_ref();
		let data = std::fs::read(path)?;
		let tree = Self::from_bytes(&data, root)?;
		debug!(path = %path.display(), bytes = data.len(), height = tree.height(), "loaded tree");
		Ok(tree)
	}
}
