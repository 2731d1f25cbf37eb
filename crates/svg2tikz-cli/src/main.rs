use std::io::{Read, Write};
use std::path::PathBuf;
use std::thread;

use clap::Parser;
use miette::{IntoDiagnostic, Result, WrapErr};
use svg2tikz::{ArrowTip, CodeOutput, ConvertOptions, Markings, TexMode, Unit, convert};
use tracing_subscriber::EnvFilter;

/// Stack for the conversion thread; the scene walk recurses once per group.
const STACK_SIZE: usize = 64 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "svg2tikz", version)]
#[command(about = "Convert SVG drawings into TikZ code")]
struct Cli {
    /// SVG file to convert (stdin when absent or `-`)
    input: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output wrapper: standalone, figonly or codeonly
    #[arg(long, default_value = "standalone")]
    codeoutput: CodeOutput,

    /// Crop the standalone page to the picture
    #[arg(long)]
    crop: bool,

    /// Break long commands at 80 columns
    #[arg(long)]
    wrap: bool,

    /// Do not indent nested scopes
    #[arg(long)]
    no_indent: bool,

    /// Decimal places kept in coordinates
    #[arg(long = "round-number", default_value_t = 4)]
    precision: usize,

    /// Global scale factor
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Output unit: px, pt, pc, mm, cm, m, in or Q
    #[arg(long, default_value = "cm")]
    output_unit: Unit,

    /// Keep the SVG origin (top left, y down)
    #[arg(long)]
    noreversey: bool,

    /// Leave out all text
    #[arg(long)]
    notext: bool,

    /// How text is written: escape, math or raw
    #[arg(short, long, default_value = "escape")]
    texmode: TexMode,

    /// Attribute overriding the text mode per element
    #[arg(long)]
    texmode_attribute: Option<String>,

    /// Marker handling: ignore, include, interpret or arrows
    #[arg(long, default_value = "ignore")]
    markings: Markings,

    /// Arrow tip used with `--markings arrows`: latex, stealth, to or >
    #[arg(long, default_value = "latex")]
    arrow: ArrowTip,

    /// Prefix removed from image paths
    #[arg(long = "removeabsolute")]
    remove_absolute: Option<String>,

    /// Only convert these ids (comma separated)
    #[arg(long, value_delimiter = ',')]
    select: Vec<String>,

    /// Comment every node with its id and log debug output
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> ConvertOptions {
        let mut options = ConvertOptions::new()
            .with_output(self.codeoutput)
            .with_crop(self.crop)
            .with_wrap(self.wrap)
            .with_indent(!self.no_indent)
            .with_precision(self.precision)
            .with_scale(self.scale)
            .with_output_unit(self.output_unit)
            .with_keep_source_origin(self.noreversey)
            .with_notext(self.notext)
            .with_texmode(self.texmode)
            .with_markings(self.markings)
            .with_arrow(self.arrow)
            .with_verbose(self.verbose);
        if let Some(attribute) = &self.texmode_attribute {
            options = options.with_texmode_attribute(attribute);
        }
        if let Some(prefix) = &self.remove_absolute {
            options = options.with_remove_absolute(prefix);
        }
        if !self.select.is_empty() {
            options = options.with_selection(&self.select);
        }
        options
    }

    fn read_input(&self) -> Result<String> {
        match &self.input {
            Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("reading {}", path.display())),
            _ => {
                let mut source = String::new();
                std::io::stdin()
                    .read_to_string(&mut source)
                    .into_diagnostic()
                    .wrap_err("reading stdin")?;
                Ok(source)
            }
        }
    }

    fn write_output(&self, tikz: &str) -> Result<()> {
        match &self.output {
            Some(path) => std::fs::write(path, tikz)
                .into_diagnostic()
                .wrap_err_with(|| format!("writing {}", path.display())),
            None => std::io::stdout()
                .write_all(tikz.as_bytes())
                .into_diagnostic()
                .wrap_err("writing stdout"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never mix with the generated code
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let source = cli.read_input()?;
    let options = cli.options();
    tracing::debug!(?options, "converting");

    let tikz = thread::Builder::new()
        .name("convert".to_string())
        .stack_size(STACK_SIZE)
        .spawn(move || convert(&source, &options))
        .into_diagnostic()?
        .join()
        .map_err(|_| miette::miette!("conversion thread panicked"))??;

    cli.write_output(&tikz)
}
