//! html-to-pdf: render HTML files to PDF with headless Chrome.
//!
//! Usage:
//!   html-to-pdf report.html                  # writes ./report.pdf
//!   html-to-pdf a.html b.html -d out/ -j 2   # two engines, converted concurrently
//!   cat page.html | html-to-pdf - -o page.pdf

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use html_to_pdf::{Converter, ConverterConfig, Insets, PageConfiguration, PageSize};
use log::error;
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Paper {
    A4,
    Letter,
}

impl From<Paper> for PageSize {
    fn from(p: Paper) -> Self {
        match p {
            Paper::A4 => PageSize::A4,
            Paper::Letter => PageSize::LETTER,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "html-to-pdf", version, about = "Render HTML files to PDF")]
struct Args {
    /// HTML files to convert (`-` reads standard input)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file (single input only)
    #[arg(short, long, conflicts_with_all = ["out_dir", "title"])]
    output: Option<PathBuf>,

    /// Directory PDFs are written to, named after each input
    #[arg(short = 'd', long, default_value = ".")]
    out_dir: PathBuf,

    /// PDF file name without extension (single input only)
    #[arg(short, long)]
    title: Option<String>,

    #[arg(long, value_enum, default_value = "a4")]
    page_size: Paper,

    /// Margin on every side in points; negative values print past the page edge
    #[arg(long, default_value_t = -36.0, allow_negative_numbers = true)]
    margin: f64,

    /// JSON file with converter settings
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Number of browser engines to run in parallel
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Chrome/Chromium binary
    #[arg(long)]
    chrome: Option<PathBuf>,

    #[arg(long)]
    no_sandbox: bool,
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut html = String::new();
        std::io::stdin()
            .read_to_string(&mut html)
            .context("Failed to read HTML from stdin")?;
        return Ok(html);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn destination_for(args: &Args, input: &Path) -> PathBuf {
    if let Some(output) = &args.output {
        return output.clone();
    }
    let title = args.title.clone().unwrap_or_else(|| {
        input
            .file_stem()
            .filter(|_| input != Path::new("-"))
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string())
    });
    args.out_dir.join(format!("{}.pdf", title))
}

/// Output path for every input, refusing two inputs that map to one file.
fn destinations(args: &Args) -> anyhow::Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        let destination = destination_for(args, input);
        if !seen.insert(destination.clone()) {
            bail!(
                "{} and another input would both be written to {}",
                input.display(),
                destination.display()
            );
        }
        out.push(destination);
    }
    Ok(out)
}

fn build_config(args: &Args) -> anyhow::Result<ConverterConfig> {
    let mut config = match &args.config {
        Some(path) => ConverterConfig::from_json_file(path)?,
        None => ConverterConfig::default(),
    };
    if let Some(ms) = args.timeout_ms {
        config.timeout_ms = ms;
    }
    if let Some(chrome) = &args.chrome {
        config.chrome_path = Some(chrome.clone());
    }
    if args.no_sandbox {
        config.sandbox = false;
    }
    config.pool_size = match args.jobs {
        Some(jobs) => jobs,
        None if args.config.is_some() => config.pool_size,
        None => num_cpus::get().min(args.inputs.len()).max(1),
    };
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.inputs.len() > 1 && (args.output.is_some() || args.title.is_some()) {
        bail!("--output and --title need exactly one input");
    }

    let page = PageConfiguration::new(args.page_size.into(), Insets::uniform(args.margin));
    page.validate()?;

    let destinations = destinations(&args)?;
    let config = build_config(&args)?;
    let converter = Converter::new(config).await.context("Failed to start browser")?;

    let jobs = args.inputs.iter().zip(&destinations).map(|(input, destination)| {
        let converter = &converter;
        let page = &page;
        async move {
            let html = read_input(input)?;
            converter.convert(&html, destination, page).await?;
            println!("{}", destination.display());
            anyhow::Ok(())
        }
    });

    let results = futures::future::join_all(jobs).await;
    converter.close().await?;

    let mut failed = 0;
    for (input, res) in args.inputs.iter().zip(results) {
        if let Err(e) = res {
            error!("{}: {:#}", input.display(), e);
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{} of {} conversions failed", failed, args.inputs.len());
    }
    Ok(())
}
