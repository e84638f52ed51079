use super::Region;

pub type Color = image::Rgb<u8>;

/// Color of the lines drawn over split coordinates.
pub const BOUNDARY_COLOR: Color = image::Rgb([255, 255, 255]);

/// Trait for pixel buffers a tree can be built from and drawn into.
///
/// Coordinates are `(row, col)`; callers keep them inside
/// `height() x width()`.
pub trait PixelGrid {
	fn width(&self) -> u32;
	fn height(&self) -> u32;
	fn get(&self, row: u32, col: u32) -> Color;
	fn set(&mut self, row: u32, col: u32, color: Color);

	/// Region covering the whole grid.
	fn region(&self) -> Region {
		Region::full(self.width(), self.height())
	}
}

impl PixelGrid for image::RgbImage {
	fn width(&self) -> u32 {
		image::RgbImage::width(self)
	}
	fn height(&self) -> u32 {
		image::RgbImage::height(self)
	}
	fn get(&self, row: u32, col: u32) -> Color {
		*self.get_pixel(col, row)
	}
	fn set(&mut self, row: u32, col: u32, color: Color) {
		self.put_pixel(col, row, color);
	}
}

/// Paints every pixel of `region` with `color`.
///
/// The region is clipped to the grid, so a boundary line on the last
/// column or row can't write out of bounds.
pub fn fill_region<G: PixelGrid + ?Sized>(grid: &mut G, region: Region, color: Color) {
	let x_max = region.x_max.min(grid.width());
	let y_max = region.y_max.min(grid.height());
	for row in region.y_min..y_max {
		for col in region.x_min..x_max {
			grid.set(row, col, color);
		}
	}
}
