//! Build a TrueType font from a directory of single-glyph PDF drawings.
//!
//! Writes `<fontName>.ttf` and `<fontName>-glyphs.html` into the source
//! directory.

use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::Parser;
use glyphtrace::{
    pipeline::GlyphOutcome, Config, ConfigError, ConfigFile, FailurePolicy, Pipeline,
    PipelineError,
};
use outline_fonts::UnsupportedCommands;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory containing one PDF per glyph, named after the glyph.
    #[arg(long)]
    dir: PathBuf,

    /// Name of the output font file and the preview title.
    #[arg(long = "fontName", value_name = "NAME")]
    font_name: Option<String>,

    /// Family name recorded in the font.
    #[arg(long = "fontFamily", value_name = "NAME")]
    font_family: Option<String>,

    /// TOML file with further settings; flags take precedence.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// What to do when a glyph cannot be rasterized, traced or parsed.
    #[arg(long, value_enum, value_name = "POLICY")]
    on_glyph_error: Option<FailurePolicy>,

    /// Time limit for each external program, in seconds.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Keep intermediate rasters and traces in this directory.
    #[arg(long, value_name = "DIR")]
    keep_rasters: Option<PathBuf>,

    /// Fail on path commands other than moves, lines, curves and closes.
    #[arg(long)]
    reject_unsupported: bool,

    /// Write the font and preview here instead of the source directory.
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Log each step.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(self) -> Result<Config, ConfigError> {
        let mut config = Config::new(self.dir);
        if let Some(path) = &self.config {
            ConfigFile::load(path)?.apply_to(&mut config);
        }
        if let Some(name) = self.font_name {
            config.font_name = name;
        }
        if let Some(family) = self.font_family {
            config.metrics.family_name = family;
        }
        if let Some(policy) = self.on_glyph_error {
            config.failure_policy = policy;
        }
        if let Some(secs) = self.timeout {
            config.stage_timeout = Duration::from_secs(secs);
        }
        if self.reject_unsupported {
            config.parse_options.unsupported = UnsupportedCommands::Reject;
        }
        if self.keep_rasters.is_some() {
            config.keep_rasters = self.keep_rasters;
        }
        if self.output_dir.is_some() {
            config.output_dir = self.output_dir;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let result = args
        .config()
        .map_err(PipelineError::from)
        .and_then(|config| Pipeline::from_config(config).run());

    match result {
        Ok(report) => {
            let appended = report.count(|o| matches!(o, GlyphOutcome::Appended));
            let empty = report.count(|o| matches!(o, GlyphOutcome::Empty));
            let skipped = report.count(|o| matches!(o, GlyphOutcome::Skipped(_)));
            println!(
                "{appended} glyphs traced, {empty} empty, {skipped} skipped\nfont: {}\npreview: {}",
                report.font_path.display(),
                report.preview_path.display()
            );
            for glyph in &report.glyphs {
                if let GlyphOutcome::Skipped(fault) = &glyph.outcome {
                    eprintln!("skipped '{}' ({}): {fault}", glyph.name, glyph.file.display());
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            // messages already include their causes
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
