use super::grid::{Color, PixelGrid};
use super::Region;

/// Regions with fewer pixels than this are never subdivided.
pub const MIN_SPLIT_SIZE: u64 = 4;

/// Per-channel sums over `region`.
fn channel_sums<G: PixelGrid + ?Sized>(grid: &G, region: Region) -> [u64; 3] {
	let mut sums = [0u64; 3];
	for row in region.y_min..region.y_max {
		for col in region.x_min..region.x_max {
			let pix = grid.get(row, col);
			for (sum, channel) in sums.iter_mut().zip(pix.0.iter()) {
				*sum += *channel as u64;
			}
		}
	}
	sums
}

/// Average color of `region`, truncated per channel.
///
/// Divides by `Region::size`, so a degenerate region averages to black.
pub fn average_color<G: PixelGrid + ?Sized>(grid: &G, region: Region) -> Color {
	let size = region.size();
	let sums = channel_sums(grid, region);
	image::Rgb([
		(sums[0] / size) as u8,
		(sums[1] / size) as u8,
		(sums[2] / size) as u8,
	])
}

/// Sum of the three per-channel population variances of `region` around
/// `avg`.
pub fn variance<G: PixelGrid + ?Sized>(grid: &G, region: Region, avg: Color) -> f64 {
	let size = region.size() as f64;
	let mut var = 0.;
	for row in region.y_min..region.y_max {
		for col in region.x_min..region.x_max {
			let pix = grid.get(row, col);
			for (channel, mean) in pix.0.iter().zip(avg.0.iter()) {
				let d = *channel as f64 - *mean as f64;
				var += d * d / size;
			}
		}
	}
	var
}

/// Whether `region` is close enough to a single color to stop splitting.
///
/// Regions under `MIN_SPLIT_SIZE` pixels always count as homogeneous.
pub fn is_homogeneous<G: PixelGrid + ?Sized>(grid: &G, region: Region, threshold: f64) -> bool {
	if region.size() < MIN_SPLIT_SIZE {
		return true;
	}
	variance(grid, region, average_color(grid, region)) < threshold
}
