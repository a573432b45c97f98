use clap::{Parser, ValueEnum};
use dominance::{BandPolicy, DominanceBuilder};
use std::{path::PathBuf, process};

#[derive(Parser)]
#[command(name = "dominance")]
#[command(version, about = "Check an image's dominant colors against the 60-30-10 rule", long_about = None)]
struct Cli {
    /// Image file to analyse
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Number of color clusters
    #[arg(short = 'k', long, value_name = "N", default_value_t = dominance::DEFAULT_CLUSTER_COUNT)]
    clusters: usize,

    /// Seed for the cluster initialisation
    #[arg(long, value_name = "N", default_value_t = dominance::DEFAULT_SEED)]
    seed: u64,

    /// How role percentages are checked
    #[arg(long, value_enum, default_value = "fixed-band")]
    policy: Policy,

    /// Allowed distance from each target, in percentage points (symmetric policy only)
    #[arg(long, value_name = "POINTS", default_value = "10.0")]
    tolerance: f64,

    /// Scale the image down to at most this many pixels before clustering (0 keeps the full image)
    #[arg(long, value_name = "PIXELS", default_value_t = dominance::DEFAULT_RESIZE_IMAGE_AREA)]
    resize_area: u32,

    /// Print the result on a single line
    #[arg(long)]
    compact: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    Strict,
    FixedBand,
    Symmetric,
}

impl Cli {
    fn band_policy(&self) -> BandPolicy {
        match self.policy {
            Policy::Strict => BandPolicy::StrictThreshold,
            Policy::FixedBand => BandPolicy::FixedBand,
            Policy::Symmetric => BandPolicy::SymmetricTolerance(self.tolerance),
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        log::error!("{}: {}", cli.image.display(), err);
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(&cli.image)?;
    log::debug!("read {} bytes from {}", bytes.len(), cli.image.display());

    let builder = DominanceBuilder::from_bytes(&bytes)?;
    log::debug!("decoded image, clustering into {} colors with seed {}", cli.clusters, cli.seed);

    let result = builder
        .cluster_count(cli.clusters)
        .seed(cli.seed)
        .band_policy(cli.band_policy())
        .resize_image_area(cli.resize_area)
        .generate()?;
    log::info!("rule followed: {}", result.rule_followed());

    let json = if cli.compact {
        serde_json::to_string(&result)?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{json}");

    Ok(())
}
