use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use resize_cache::cache::{CacheStats, CacheSurvey};
use resize_cache::imaging::{Quality, ResizePolicy, RustBackend, TargetSpec};
use resize_cache::negotiate::ClientHints;
use resize_cache::resolve::Resolver;
use resize_cache::types::{DEFAULT_SIDE, ResizeRequest};
use resize_cache::{config, output};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("RESIZE_CACHE_ON_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("RESIZE_CACHE_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "resize-cache")]
#[command(about = "Resize images on demand and cache the results on disk")]
#[command(long_about = "\
Resize images on demand and cache the results on disk

Image URLs map onto files below the content root. Resized copies are written
to a cache directory next to each source:

  site/uploads/dawn.jpg
  site/uploads/cache/<key>.jpg         # resized
  site/uploads/cache/<key>.jpg.webp    # WebP alternate (JPEG and PNG only)

The first request for a size returns the original URL and fills the cache.
Later requests return the cached file, or the WebP alternate when the client
sends both an Accept header listing image/webp and a Chrome User-Agent.

Set RUST_LOG=info to see cache writes, RUST_LOG=debug for hits.

Run 'resize-cache gen-config' to generate a documented resize.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content root that image URLs resolve against
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Config file (defaults to <root>/resize.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Target size and encoding flags.
#[derive(Args, Clone)]
struct TargetArgs {
    /// Requested width in pixels
    #[arg(short = 'w', long, default_value_t = DEFAULT_SIDE)]
    width: u32,

    /// Requested height in pixels
    #[arg(short = 'H', long, default_value_t = DEFAULT_SIDE)]
    height: u32,

    /// exact, portrait, landscape, auto or crop (default from config)
    #[arg(long)]
    policy: Option<ResizePolicy>,

    /// JPEG quality 0-100 (default from config)
    #[arg(long)]
    quality: Option<u32>,
}

impl TargetArgs {
    fn target(&self, defaults: &config::DefaultsConfig) -> TargetSpec {
        TargetSpec::new(
            self.width,
            self.height,
            self.policy.unwrap_or(defaults.policy),
            self.quality.map(Quality::new).unwrap_or_else(|| defaults.quality()),
        )
    }
}

/// Client headers used to decide whether the WebP alternate may be served.
#[derive(Args, Clone)]
struct ClientArgs {
    /// Value of the client's Accept header
    #[arg(long)]
    accept: Option<String>,

    /// Value of the client's User-Agent header
    #[arg(long)]
    user_agent: Option<String>,
}

impl ClientArgs {
    fn hints(&self, negotiation: &config::NegotiationConfig) -> ClientHints {
        ClientHints::from_headers(self.accept.as_deref(), self.user_agent.as_deref(), negotiation)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Resolve one image URL, resizing on a cache miss
    Resolve {
        /// Image URL (site-relative or under the configured site_url)
        url: String,
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Print the cache key and cache file locations without resizing
    Key {
        url: String,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Resolve every request in a JSON file, in parallel
    Batch {
        /// JSON array of {"url", "width", "height", "policy", "quality"}
        file: PathBuf,
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Count cache files below the content root
    Stats,
    /// Print a stock resize.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("warn"));
    let cli = Cli::parse();

    let load = || load_site_config(&cli.root, cli.config.as_deref());

    match cli.command {
        Command::Resolve {
            url,
            target,
            client,
        } => {
            let site_config = load()?;
            let target = target.target(&site_config.defaults);
            let hints = client.hints(&site_config.negotiation);
            let resolver = Resolver::new(RustBackend::new(), &cli.root, site_config);
            let resolution = resolver.resolve(&url, &target, hints);
            output::print_resolution(None, &url, &target, &resolution);
        }
        Command::Key { url, target } => {
            let site_config = load()?;
            let target = target.target(&site_config.defaults);
            let resolver = Resolver::new(RustBackend::new(), &cli.root, site_config);
            output::print_key(&url, resolver.plan(&url, &target).as_ref());
        }
        Command::Batch { file, client } => {
            let site_config = load()?;
            let content = std::fs::read_to_string(&file)?;
            let requests: Vec<ResizeRequest> = serde_json::from_str(&content)?;
            init_thread_pool(&site_config.processing);
            let hints = client.hints(&site_config.negotiation);
            let resolver = Resolver::new(RustBackend::new(), &cli.root, site_config);

            let results: Vec<_> = requests
                .par_iter()
                .map(|request| (request, resolver.resolve_request(request, hints)))
                .collect();

            let stats = results
                .par_iter()
                .fold(CacheStats::default, |mut stats, (_, resolution)| {
                    resolution.record(&mut stats);
                    stats
                })
                .reduce(CacheStats::default, CacheStats::merge);

            for (i, (request, resolution)) in results.iter().enumerate() {
                let target = request.target(&resolver.config().defaults);
                output::print_resolution(Some(i + 1), &request.url, &target, resolution);
            }
            println!("Cache: {}", stats);
        }
        Command::Stats => {
            let site_config = load()?;
            let survey = CacheSurvey::scan(&cli.root, &site_config.cache.dir_name);
            println!("{}", survey);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load_site_config(
    root: &Path,
    explicit: Option<&Path>,
) -> Result<config::ResizeConfig, config::ConfigError> {
    match explicit {
        Some(path) => config::load_config_file(path),
        None => config::load_config(root),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
