use kdtree_img::homogeneity::{average_color, is_homogeneous, variance};
use kdtree_img::build::pick_split;
use kdtree_img::{Config, KdNode, Orientation, PixelGrid, Region};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn arb_image(max_side: u32) -> impl Strategy<Value = image::RgbImage> {
	(1..=max_side, 1..=max_side).prop_flat_map(|(w, h)| {
		prop::collection::vec(any::<[u8; 3]>(), (w * h) as usize).prop_map(move |pixels| {
			image::RgbImage::from_fn(w, h, |x, y| image::Rgb(pixels[(y * w + x) as usize]))
		})
	})
}

/// Images made of a few flat blocks, so thresholds actually stop splitting.
fn arb_blocky_image(max_side: u32) -> impl Strategy<Value = image::RgbImage> {
	(2..=max_side, 2..=max_side, any::<[[u8; 3]; 4]>()).prop_map(|(w, h, colors)| {
		image::RgbImage::from_fn(w, h, |x, y| {
			image::Rgb(colors[((x * 2 / w) + 2 * (y * 2 / h)) as usize])
		})
	})
}

fn arb_config() -> impl Strategy<Value = Config> {
	(0u32..8, 0f64..3000., any::<bool>()).prop_map(|(depth, threshold, lines)| {
		Config::default()
			.with_max_depth(depth)
			.with_threshold(threshold)
			.with_boundaries(lines)
	})
}

/// Checks depth bound, orientation alternation and that splits lie inside
/// their regions.
fn check_shape(node: &KdNode, region: Region, depth: u32, max_depth: u32) -> Result<(), TestCaseError> {
	if let KdNode::Internal { orientation, split, left, right } = node {
		prop_assert!(depth < max_depth, "internal node at depth {} with max {}", depth, max_depth);
		prop_assert_eq!(*orientation, Orientation::at_depth(depth));
		prop_assert!(region.splits_at(*orientation, *split), "split {} outside {}", split, region);
		let (l, r) = region.split(*orientation, *split);
		check_shape(left, l, depth + 1, max_depth)?;
		check_shape(right, r, depth + 1, max_depth)?;
	}
	Ok(())
}

proptest! {
	#[test]
	fn tiny_regions_are_always_homogeneous(img in arb_image(8), threshold in 0f64..1e6) {
		let region = Region::new(0, 0, img.width().min(3), 1);
		prop_assert!(is_homogeneous(&img, region, threshold));
		let column = Region::new(0, 0, 1, img.height().min(3));
		prop_assert!(is_homogeneous(&img, column, threshold));
	}

	#[test]
	fn flat_regions_average_to_their_color(
		w in 1u32..16,
		h in 1u32..16,
		color in any::<[u8; 3]>()
	) {
		let img = image::RgbImage::from_pixel(w, h, image::Rgb(color));
		let region = img.region();
		let avg = average_color(&img, region);
		prop_assert_eq!(avg, image::Rgb(color));
		prop_assert_eq!(variance(&img, region, avg), 0.);
	}

	#[test]
	fn splits_stay_strictly_inside(low in 0u32..1000, span in 2u32..1000, seed in any::<u64>()) {
		let region = Region::new(low, 0, low + span, 1);
		let split = pick_split(region, Orientation::X, &mut StdRng::seed_from_u64(seed)).unwrap();
		prop_assert!(low < split && split < low + span);
		let (third, two_thirds) = (low as f64 + span as f64 / 3., low as f64 + 2. * span as f64 / 3.);
		if (third.floor() as u32 + 1) as f64 <= two_thirds.ceil() - 1. {
			prop_assert!((split as f64) > third && (split as f64) < two_thirds);
		}
	}

	#[test]
	fn build_respects_depth_and_shape(
		img in arb_image(20),
		config in arb_config(),
		seed in any::<u64>()
	) {
		let root = img.region();
		let mut img = img;
		let tree = KdNode::from_grid(&mut img, &config, &mut StdRng::seed_from_u64(seed)).unwrap();
		prop_assert!(tree.height() <= config.max_depth);
		prop_assert_eq!(tree.leaf_count(), tree.internal_count() + 1);
		check_shape(&tree, root, 0, config.max_depth)?;
	}

	#[test]
	fn leaves_tile_the_image(img in arb_blocky_image(24), seed in any::<u64>()) {
		let root = img.region();
		let mut img = img;
		let config = Config::default().with_threshold(1.);
		let tree = KdNode::from_grid(&mut img, &config, &mut StdRng::seed_from_u64(seed)).unwrap();
		let mut coverage = vec![0u8; (root.width() * root.height()) as usize];
		for leaf in tree.leaf_regions(root) {
			for row in leaf.y_min..leaf.y_max {
				for col in leaf.x_min..leaf.x_max {
					coverage[(row * root.width() + col) as usize] += 1;
				}
			}
		}
		prop_assert!(coverage.iter().all(|c| *c == 1));
	}

	#[test]
	fn encoding_round_trips(img in arb_image(20), config in arb_config(), seed in any::<u64>()) {
		let root = img.region();
		let mut img = img;
		let tree = KdNode::from_grid(&mut img, &config, &mut StdRng::seed_from_u64(seed)).unwrap();
		let decoded = KdNode::from_bytes(&tree.to_bytes(), root).unwrap();
		prop_assert_eq!(decoded, tree);
	}

	#[test]
	fn copies_are_independent(img in arb_blocky_image(24), seed in any::<u64>()) {
		let mut img = img;
		let config = Config::default().with_threshold(1.);
		let tree = KdNode::from_grid(&mut img, &config, &mut StdRng::seed_from_u64(seed)).unwrap();
		let mut copy = tree.copy();
		prop_assert_eq!(&copy, &tree);
		if let Some(split) = copy.split_mut() {
			*split += 1;
			prop_assert_ne!(&copy, &tree);
			prop_assert_eq!(copy.split(), tree.split().map(|s| s + 1));
		}
	}

	#[test]
	fn replay_on_identical_image_reproduces_tree(img in arb_image(16), seed in any::<u64>()) {
		let config = Config::default().with_threshold(500.);
		let mut first = img.clone();
		let mut second = img;
		let tree = KdNode::from_grid(&mut first, &config, &mut StdRng::seed_from_u64(seed)).unwrap();
		let replayed = tree.replay_on(&mut second, &config).unwrap();
		prop_assert_eq!(replayed, tree);
		prop_assert_eq!(first, second);
	}

	#[test]
	fn replay_respects_a_shallower_max_depth(
		img in arb_image(20),
		template_depth in 3u32..10,
		replay_depth in 0u32..3,
		seed in any::<u64>()
	) {
		let root = img.region();
		let source = Config::default().with_threshold(0.).with_max_depth(template_depth);
		let tree = KdNode::from_grid(&mut img.clone(), &source, &mut StdRng::seed_from_u64(seed)).unwrap();
		let shallow = source.with_max_depth(replay_depth);
		let mut target = img;
		let replayed = tree.replay_on(&mut target, &shallow).unwrap();
		prop_assert!(replayed.height() <= replay_depth);
		prop_assert!(replayed.height() <= tree.height());
		check_shape(&replayed, root, 0, replay_depth)?;
	}

	#[test]
	fn redraw_matches_fresh_build_without_lines(img in arb_image(16), seed in any::<u64>()) {
		let config = Config::default().with_threshold(500.).with_boundaries(false);
		let mut built = img.clone();
		let mut redrawn = img;
		let tree = KdNode::from_grid(&mut built, &config, &mut StdRng::seed_from_u64(seed)).unwrap();
		tree.copy().redraw(&mut redrawn, &config).unwrap();
		prop_assert_eq!(built, redrawn);
	}
}

#[test]
fn saved_tree_replays_onto_another_image() {
	let dir = tempfile::tempdir().expect("create temp dir");
	let path = dir.path().join("tree.kdt");
	let config = Config::default().with_threshold(1.);

	let mut first = image::RgbImage::from_fn(32, 24, |x, y| image::Rgb([(x * 8) as u8, (y * 10) as u8, 0]));
	let tree = KdNode::from_grid(&mut first, &config, &mut StdRng::seed_from_u64(42)).expect("build");
	tree.save(&path).expect("save tree");

	let mut second = image::RgbImage::from_fn(32, 24, |x, y| image::Rgb([0, (x * 8) as u8, (y * 10) as u8]));
	let loaded = KdNode::load(&path, second.region()).expect("load tree");
	assert_eq!(loaded, tree);
	loaded.redraw(&mut second, &config).expect("redraw");
	let split = tree.split().expect("root splits");
	for row in 0..24 {
		assert_eq!(second.get(row, split), config.boundary_color);
	}
}

#[test]
fn tree_does_not_load_for_smaller_image() {
	let dir = tempfile::tempdir().expect("create temp dir");
	let path = dir.path().join("tree.kdt");
	let tree = KdNode::internal(Orientation::X, 20, KdNode::Leaf, KdNode::Leaf);
	tree.save(&path).expect("save tree");
	assert!(KdNode::load(&path, Region::full(10, 10)).is_err());
	assert_eq!(KdNode::load(&path, Region::full(30, 10)).expect("load"), tree);
}
