use clap::{Args, Parser, Subcommand};

use image::error::ImageError;

use kdtree_img::config::{DEFAULT_MAX_DEPTH, DEFAULT_THRESHOLD};
use kdtree_img::error::{BuildError, TreeFileError};
use kdtree_img::{Config, KdNode, PixelGrid};

use rand::rngs::StdRng;
use rand::SeedableRng;

use std::path::{Path, PathBuf};

use tracing::{info, Level};

/// Helper function for `main`.
fn error_exit(msg: &str, code: i32) -> ! {
	eprintln!("{}", msg);
	std::process::exit(code)
}

/// Approximates images by partitioning them with k-d trees.
///
/// May exit process with status code if there are errors:
///
/// 2: invalid arguments
///
/// 3: file I/O issues
///
/// 4: invalid image or tree data
///
/// 5: computation limits exceeded
///
/// 10: other, potentially unknown error
#[derive(Parser)]
#[command(name = "kdtree_img", version, author = "vkcz")]
struct Cli {
	/// Log more (-v info, -vv debug, -vvv trace)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbose: u8,
	#[command(subcommand)]
	command: Command,
}

#[derive(Args)]
struct BuildOpts {
	/// Deepest tree level that may still be split
	#[arg(short = 'd', long, default_value_t = DEFAULT_MAX_DEPTH)]
	max_depth: u32,
	/// Color variance below which a region is left whole
	#[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
	threshold: f64,
	/// Don't draw lines over partition boundaries
	#[arg(long)]
	hide_partitions: bool,
	/// Seed for split placement; random if absent
	#[arg(short, long)]
	seed: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
	/// Partition an image and write its approximation as PNG
	Build {
		/// Path to input image
		input: PathBuf,
		/// Path to output image; defaults to INPUT with a `_kd.png` suffix
		output: Option<PathBuf>,
		/// Also save the tree to this file
		#[arg(long)]
		tree: Option<PathBuf>,
		#[command(flatten)]
		opts: BuildOpts,
	},
	/// Apply a saved tree to an image
	Replay {
		/// Path to tree file
		tree: PathBuf,
		/// Path to input image
		input: PathBuf,
		/// Path to output image; defaults to INPUT with a `_replay.png` suffix
		output: Option<PathBuf>,
		/// Repaint the tree's exact geometry instead of re-testing homogeneity
		#[arg(long)]
		geometry: bool,
		#[command(flatten)]
		opts: BuildOpts,
	},
	/// Partition an image once per maximum depth
	Sweep {
		/// Path to input image
		input: PathBuf,
		/// Maximum depth to render; repeatable
		#[arg(long = "depth", required = true)]
		depths: Vec<u32>,
		#[command(flatten)]
		opts: BuildOpts,
	},
}

impl BuildOpts {
	fn config(&self) -> Config {
		let config = Config::default()
			.with_max_depth(self.max_depth)
			.with_threshold(self.threshold)
			.with_boundaries(!self.hide_partitions);
		if let Err(e) = config.validate() {
			error_exit(&e.to_string(), 2)
		}
		config
	}

	fn rng(&self) -> StdRng {
		match self.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_os_rng(),
		}
	}
}

/// `INPUT` with its extension swapped for `suffix`.
fn derived_path(input: &Path, suffix: &str) -> PathBuf {
	let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
	input.with_file_name(stem + suffix)
}

fn open_image(path: &Path) -> image::RgbImage {
	match image::open(path) {
		Ok(i) => i.into_rgb8(),
		Err(e) => {
			let (msg, code) = match e {
				ImageError::Decoding(_) => ("Invalid image data", 4),
				ImageError::Limits(_) => ("Computation limits exceeded", 5),
				ImageError::IoError(_) => ("File not found or could not be read", 3),
				ImageError::Unsupported(_) => ("Unsupported image format", 4),
				_ => ("An error occurred", 10)
			};
			error_exit(msg, code)
		}
	}
}

fn save_image(img: &image::RgbImage, path: &Path) {
	match img.save(path) {
		Ok(_) => info!(path = %path.display(), "wrote image"),
		Err(_) => error_exit("Could not save output", 3)
	}
}

fn build_error_exit(e: BuildError) -> ! {
	match e {
		BuildError::SplitOutsideRegion { .. } => error_exit(&format!("Tree does not fit the image: {}", e), 4),
		BuildError::OrientationMismatch { .. } => error_exit(&format!("Invalid tree: {}", e), 4),
		BuildError::InvalidRegion { .. } => error_exit(&e.to_string(), 10),
	}
}

fn main() {
	let cli = Cli::parse();
	let level = match cli.verbose {
		0 => Level::WARN,
		1 => Level::INFO,
		2 => Level::DEBUG,
		_ => Level::TRACE,
	};
	tracing_subscriber::fmt()
		.with_max_level(level)
		.with_writer(std::io::stderr)
		.init();

	match cli.command {
		Command::Build { input, output, tree, opts } => {
			let mut img = open_image(&input);
			let config = opts.config();
			let kd = KdNode::from_grid(&mut img, &config, &mut opts.rng())
				.unwrap_or_else(|e| build_error_exit(e));
			info!(height = kd.height(), leaves = kd.leaf_count(), "partitioned {}", input.display());
			if let Some(tree_path) = tree {
				if let Err(e) = kd.save(&tree_path) {
					error_exit(&format!("Could not write tree file: {}", e), 3)
				}
			}
			save_image(&img, &output.unwrap_or_else(|| derived_path(&input, "_kd.png")));
		},
		Command::Replay { tree, input, output, geometry, opts } => {
			let mut img = open_image(&input);
			let config = opts.config();
			let kd = match KdNode::load(&tree, img.region()) {
				Ok(t) => t,
				Err(TreeFileError::Io(_)) => error_exit("Tree file not found or could not be read", 3),
				Err(e @ TreeFileError::Decode(_)) => error_exit(&e.to_string(), 4),
			};
			if geometry {
				kd.redraw(&mut img, &config).unwrap_or_else(|e| build_error_exit(e));
			} else {
				let replayed = kd.replay_on(&mut img, &config).unwrap_or_else(|e| build_error_exit(e));
				info!(height = replayed.height(), leaves = replayed.leaf_count(), "replayed {}", tree.display());
			}
			save_image(&img, &output.unwrap_or_else(|| derived_path(&input, "_replay.png")));
		},
		Command::Sweep { input, depths, opts } => {
			let source = open_image(&input);
			let base = opts.config();
			let mut rng = opts.rng();
			for depth in depths {
				let mut img = source.clone();
				let config = base.with_max_depth(depth);
				let kd = KdNode::from_grid(&mut img, &config, &mut rng)
					.unwrap_or_else(|e| build_error_exit(e));
				info!(depth, height = kd.height(), leaves = kd.leaf_count(), "partitioned");
				save_image(&img, &derived_path(&input, &format!("_d{}.png", depth)));
			}
		},
	}
}
