use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use cr_renderer::{
    FontResolver, FontStore, FontStyle, FontWeight, OutputFormat, RenderOpts, Renderer,
};

#[derive(Parser, Debug)]
#[command(name = "cr-render", version)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a document JSON (current or legacy format) to an image.
    Render(RenderArgs),
    /// Pack a directory of TTF/OTF files into a font store blob.
    PackFonts(PackFontsArgs),
    /// Print the face a family/weight/style query resolves to.
    Resolve(ResolveArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Font store blob, or a directory of font files.
    #[arg(long)]
    fonts: PathBuf,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Longest output edge in pixels; 0 renders at canvas size.
    #[arg(long, default_value_t = 360)]
    max_size: u32,

    /// Draw text elements from their image payload instead of laying out text.
    #[arg(long, default_value_t = false)]
    no_text: bool,

    /// Treat the input as a legacy document instead of detecting the format.
    #[arg(long, default_value_t = false)]
    legacy: bool,

    /// Output format (`jpeg` or `png`); defaults to the output file extension.
    #[arg(long)]
    format: Option<OutputFormat>,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = 90)]
    quality: u8,

    /// Family used when a requested one is not stored.
    #[arg(long)]
    default_family: Option<String>,
}

#[derive(Parser, Debug)]
struct PackFontsArgs {
    /// Directory scanned for font files.
    #[arg(long)]
    dir: PathBuf,

    /// Output blob path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ResolveArgs {
    /// Font store blob, or a directory of font files.
    #[arg(long)]
    fonts: PathBuf,

    /// Requested family name.
    family: String,

    /// Requested weight keyword.
    #[arg(long, default_value = "regular")]
    weight: String,

    /// Requested style keyword.
    #[arg(long, default_value = "regular")]
    style: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::PackFonts(args) => cmd_pack_fonts(args),
        Command::Resolve(args) => cmd_resolve(args),
    }
}

fn load_fonts(path: &Path) -> anyhow::Result<Arc<FontStore>> {
    let store = if path.is_dir() {
        FontStore::from_font_dir(path)?
    } else {
        FontStore::from_path(path)?
    };
    Ok(Arc::new(store))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read document '{}'", args.in_path.display()))?;
    let doc = if args.legacy {
        cr_renderer::LegacyDocumentRecord::from_json(&json)?.convert_to_current()
    } else {
        cr_renderer::parse_document_json(&json)?
    };

    let format = match args.format {
        Some(f) => f,
        None => args
            .out
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
            .unwrap_or_default(),
    };
    let opts = RenderOpts::default()
        .with_max_size((args.max_size > 0).then_some(args.max_size))
        .with_render_text(!args.no_text)
        .with_format(format)
        .with_jpeg_quality(args.quality);

    let store = load_fonts(&args.fonts)?;
    let mut renderer = Renderer::new(store.clone())?;
    if let Some(family) = args.default_family {
        renderer = renderer.with_resolver(FontResolver::new(store).with_default_family(family))?;
    }
    let bytes = renderer.render(&doc, &opts)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &bytes)
        .with_context(|| format!("write {} '{}'", format, args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_pack_fonts(args: PackFontsArgs) -> anyhow::Result<()> {
    let store = FontStore::from_font_dir(&args.dir)?;
    if store.is_empty() {
        anyhow::bail!("no fonts found in '{}'", args.dir.display());
    }
    store.save(&args.out)?;
    eprintln!(
        "packed {} families into {}",
        store.len(),
        args.out.display()
    );
    Ok(())
}

fn cmd_resolve(args: ResolveArgs) -> anyhow::Result<()> {
    let store = load_fonts(&args.fonts)?;
    let weight: FontWeight = args.weight.parse()?;
    let style: FontStyle = args.style.parse()?;
    let resolver = FontResolver::new(store);
    let face = resolver.resolve_typed(&args.family, weight, style)?;
    println!(
        "{}\t{}\t{}\t{} bytes",
        face.font_family,
        face.font_weight,
        face.font_style,
        face.bytes.len()
    );
    Ok(())
}
