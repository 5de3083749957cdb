use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use marksift_core::{
    Converted, Pipeline, ProfileTable, RenderRules, fetch_file, fetch_stdin, fetch_url, validate_url,
};
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url::Url;

mod echo;

use echo::{format_size, print_banner, print_detail, print_info, print_step, print_success, print_timing, print_warning};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Source URL assumed for files and stdin when `--url` is not given
const UNKNOWN_SOURCE: &str = "about:blank";

/// Output format for converted articles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Markdown,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: markdown, json", s)),
        }
    }
}

/// Convert article web pages into clean Markdown
#[derive(Parser, Debug)]
#[command(name = "marksift")]
#[command(version)]
#[command(about = "Convert article web pages into clean Markdown", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(short, long, default_value = "markdown", value_name = "FORMAT")]
    format: OutputFormat,

    /// Source URL used to pick a site profile for file or stdin input
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "15", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Minimum profile content length before the generic fallback is used
    #[arg(long, default_value = "100", value_name = "NUM")]
    threshold: usize,

    /// JSON file of extra site profiles, tried before the built-in ones
    #[arg(long, value_name = "FILE")]
    profiles: Option<PathBuf>,

    /// Prefix the output with the title as a level-one heading
    #[arg(long)]
    title_heading: bool,

    /// Disable tables and task-list checkboxes
    #[arg(long)]
    no_gfm: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn is_url(&self) -> bool {
        self.input.starts_with("http://") || self.input.starts_with("https://")
    }

    fn pipeline(&self) -> anyhow::Result<Pipeline> {
        let mut table = ProfileTable::builtin();
        if let Some(path) = &self.profiles {
            let overrides = ProfileTable::load_json(path)
                .with_context(|| format!("Failed to load profiles: {}", path.display()))?;
            table = table.with_overrides(overrides);
        }

        let mut builder = Pipeline::builder()
            .profiles(table)
            .timeout(self.timeout)
            .fallback_threshold(self.threshold)
            .rules(RenderRules { gfm: !self.no_gfm, ..Default::default() });
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        Ok(builder.build())
    }

    fn source_url(&self) -> anyhow::Result<Url> {
        match &self.url {
            Some(url) => validate_url(url).with_context(|| format!("Invalid --url: {url}")),
            None => Url::parse(UNKNOWN_SOURCE).context("Failed to build placeholder source URL"),
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "marksift_core=debug,marksift=debug" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn format_output(converted: &Converted, args: &Args) -> anyhow::Result<String> {
    match args.format {
        OutputFormat::Markdown => {
            if args.title_heading && !converted.title.is_empty() {
                Ok(format!("# {}\n\n{}\n", converted.title, converted.markdown))
            } else {
                Ok(format!("{}\n", converted.markdown))
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "title": converted.title,
                "content": converted.markdown,
                "used_fallback": converted.used_fallback,
                "profile": converted.profile,
            });
            let mut out = serde_json::to_string_pretty(&json).context("Failed to serialize JSON")?;
            out.push('\n');
            Ok(out)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    let pipeline = args.pipeline()?;
    debug!(input = %args.input, profiles = pipeline.profiles().len(), "starting conversion");

    let (html, source) = if args.is_url() {
        let url = validate_url(&args.input).with_context(|| format!("Invalid URL: {}", args.input))?;
        if args.verbose {
            print_step(1, 3, &format!("Fetching from {}", url.as_str().bright_white().underline()));
        }
        let html = fetch_url(&url, pipeline.fetch_config())
            .await
            .with_context(|| format!("Failed to fetch URL: {url}"))?;
        (html, url)
    } else if args.input == "-" {
        if args.verbose {
            print_step(1, 3, "Reading from stdin");
        }
        (fetch_stdin().context("Failed to read from stdin")?, args.source_url()?)
    } else {
        if args.verbose {
            print_step(1, 3, &format!("Reading from file {}", args.input.bright_white()));
        }
        let html = fetch_file(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?;
        (html, args.source_url()?)
    };

    if args.verbose {
        print_detail("Size", &format_size(html.len()));
        eprintln!();
        print_step(2, 3, "Extracting and rendering");
    }

    let started = Instant::now();
    let converted = pipeline
        .convert_html(&html, &source)
        .with_context(|| format!("Failed to convert {}", args.input))?;

    if args.verbose {
        print_detail("Title", &converted.title);
        print_detail("Profile", converted.profile.as_deref().unwrap_or("none"));
        if converted.used_fallback {
            print_warning("Profile result missing or too short, used generic extraction");
        }
        print_timing("Convert", started.elapsed());
        eprintln!();
        print_step(3, 3, "Writing output");
    }

    let output = format_output(&converted, &args)?;

    match &args.output {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            print!("{}", output);
        }
    }

    Ok(())
}
