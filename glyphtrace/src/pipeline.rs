//! Driving source documents through the collaborators into a font.
//!
//! Each source file becomes a [`GlyphJob`] that moves through
//! [`GlyphState`]s one step at a time. Jobs run one after another in
//! discovery order, all appending to a single [`FontAssembler`].

use std::{
    collections::HashMap,
    fs, mem,
    path::{Path, PathBuf},
};

use outline_fonts::{
    path::interpret_str, preview::render_preview, AssemblyError, DrawingOp, FontAssembler,
    FontDocument, GlyphBuilder, GlyphIdentity, ParseOptions,
};
use tempfile::TempDir;

use crate::{
    collaborators::{extract_path_data, Encode, PdfToCairo, Potrace, Rasterize, Trace, TrueTypeEncoder},
    config::{Config, FailurePolicy},
    error::{FaultKind, GlyphFault, PipelineError, Stage},
    source::{self, SourceFile},
};

/// Where a glyph is in the pipeline.
#[derive(Debug)]
pub enum GlyphState {
    Pending,
    Rasterized { image: PathBuf },
    Traced { svg: String },
    Parsed { ops: Vec<DrawingOp> },
    /// In the font; `empty` if the glyph has no outline.
    Appended { empty: bool },
    Faulted(GlyphFault),
}

impl GlyphState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GlyphState::Appended { .. } | GlyphState::Faulted(_))
    }
}

/// One source document on its way into the font.
#[derive(Debug)]
pub struct GlyphJob {
    source: SourceFile,
    state: GlyphState,
}

/// What a job needs from the run to make progress.
struct Stages<'a> {
    rasterizer: &'a dyn Rasterize,
    tracer: &'a dyn Trace,
    scratch: &'a Path,
    parse_options: ParseOptions,
    assembler: &'a mut FontAssembler,
}

impl GlyphJob {
    pub fn new(source: SourceFile) -> Self {
        GlyphJob {
            source,
            state: GlyphState::Pending,
        }
    }

    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    pub fn state(&self) -> &GlyphState {
        &self.state
    }

    /// Perform exactly one transition. Terminal states are left alone.
    fn advance(&mut self, stages: &mut Stages) {
        let name = self.source.name.as_str();
        self.state = match mem::replace(&mut self.state, GlyphState::Pending) {
            GlyphState::Pending => {
                log::debug!("rasterizing '{}'", self.source.path.display());
                match stages.rasterizer.rasterize(&self.source.path, stages.scratch) {
                    Ok(image) => GlyphState::Rasterized { image },
                    Err(e) => GlyphState::Faulted(GlyphFault::new(Stage::Rasterize, e)),
                }
            }
            GlyphState::Rasterized { image } => {
                log::debug!("tracing '{}'", image.display());
                match stages.tracer.trace(&image, stages.scratch) {
                    Ok(svg) => GlyphState::Traced { svg },
                    Err(e) => GlyphState::Faulted(GlyphFault::new(Stage::Trace, e)),
                }
            }
            GlyphState::Traced { svg } => match extract_path_data(&svg) {
                None => {
                    log::warn!("no path data traced for '{name}', it will be empty");
                    GlyphState::Parsed { ops: Vec::new() }
                }
                Some(data) => match interpret_str(&data, stages.parse_options) {
                    Ok(interpretation) => GlyphState::Parsed {
                        ops: interpretation.ops,
                    },
                    Err(e) => GlyphState::Faulted(GlyphFault::new(Stage::Parse, e)),
                },
            },
            GlyphState::Parsed { ops } => {
                let advance_width = stages.assembler.metrics().default_advance_width;
                let outline = GlyphBuilder::new(GlyphIdentity::new(name, advance_width)).build(&ops);
                let empty = outline.is_empty();
                match stages.assembler.append(outline) {
                    Ok(()) => GlyphState::Appended { empty },
                    Err(e) => GlyphState::Faulted(GlyphFault::new(Stage::Append, e)),
                }
            }
            terminal => terminal,
        };
    }

    /// Advance until the job is appended or faulted.
    fn finish(mut self, stages: &mut Stages) -> (SourceFile, Result<bool, GlyphFault>) {
        loop {
            match self.state {
                GlyphState::Appended { empty } => return (self.source, Ok(empty)),
                GlyphState::Faulted(fault) => return (self.source, Err(fault)),
                _ => self.advance(stages),
            }
        }
    }
}

/// How a glyph ended up.
#[derive(Debug)]
pub enum GlyphOutcome {
    Appended,
    /// Appended with an empty outline.
    Empty,
    /// Left out of the font.
    Skipped(GlyphFault),
}

#[derive(Debug)]
pub struct GlyphReport {
    pub name: String,
    pub file: PathBuf,
    pub outcome: GlyphOutcome,
}

/// The result of a successful run.
#[derive(Debug)]
pub struct RunReport {
    pub glyphs: Vec<GlyphReport>,
    pub font_path: PathBuf,
    pub preview_path: PathBuf,
}

impl RunReport {
    pub fn count(&self, pred: impl Fn(&GlyphOutcome) -> bool) -> usize {
        self.glyphs.iter().filter(|glyph| pred(&glyph.outcome)).count()
    }
}

enum Scratch {
    Temporary(TempDir),
    Kept(PathBuf),
}

impl Scratch {
    fn new(keep: Option<&Path>) -> Result<Self, PipelineError> {
        match keep {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(|source| PipelineError::Scratch {
                    path: dir.to_owned(),
                    source,
                })?;
                Ok(Scratch::Kept(dir.to_owned()))
            }
            None => tempfile::Builder::new()
                .prefix("glyphtrace-")
                .tempdir()
                .map(Scratch::Temporary)
                .map_err(|source| PipelineError::Scratch {
                    path: std::env::temp_dir(),
                    source,
                }),
        }
    }

    fn path(&self) -> &Path {
        match self {
            Scratch::Temporary(dir) => dir.path(),
            Scratch::Kept(path) => path,
        }
    }
}

/// A configured run.
pub struct Pipeline<R = PdfToCairo, T = Potrace, E = TrueTypeEncoder> {
    config: Config,
    rasterizer: R,
    tracer: T,
    encoder: E,
}

impl Pipeline {
    /// A run using `pdftocairo`, `potrace` and the built-in TrueType encoder.
    pub fn from_config(config: Config) -> Self {
        let rasterizer = PdfToCairo::from_config(&config);
        let tracer = Potrace::from_config(&config);
        Pipeline::new(config, rasterizer, tracer, TrueTypeEncoder)
    }
}

impl<R: Rasterize, T: Trace, E: Encode> Pipeline<R, T, E> {
    pub fn new(config: Config, rasterizer: R, tracer: T, encoder: E) -> Self {
        Pipeline {
            config,
            rasterizer,
            tracer,
            encoder,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process every source document and collect the font.
    ///
    /// Nothing is written outside the scratch directory.
    pub fn assemble(&self) -> Result<(FontDocument, Vec<GlyphReport>), PipelineError> {
        self.config.validate()?;
        let dir = &self.config.source_dir;
        let sources = source::discover(dir, &self.config.extension).map_err(|source| {
            PipelineError::SourceDir {
                path: dir.clone(),
                source,
            }
        })?;
        if sources.is_empty() {
            log::warn!(
                "no .{} files in '{}', the font will only contain the fallback glyph",
                self.config.extension,
                dir.display()
            );
        }
        log::info!("building a font from {} source files", sources.len());

        let scratch = Scratch::new(self.config.keep_rasters.as_deref())?;
        let mut assembler = FontAssembler::new(self.config.metrics.clone());
        let mut stages = Stages {
            rasterizer: &self.rasterizer,
            tracer: &self.tracer,
            scratch: scratch.path(),
            parse_options: self.config.parse_options,
            assembler: &mut assembler,
        };
        // glyph name -> the file it came from
        let mut files = HashMap::new();
        let mut reports = Vec::with_capacity(sources.len());

        for source in sources {
            log::debug!("processing '{}'", source.name);
            let (source, result) = GlyphJob::new(source).finish(&mut stages);
            let outcome = match result {
                Ok(false) => GlyphOutcome::Appended,
                Ok(true) => GlyphOutcome::Empty,
                Err(fault)
                    if fault.is_recoverable()
                        && self.config.failure_policy == FailurePolicy::Skip =>
                {
                    log::warn!(
                        "skipping glyph '{}' from '{}': {fault}",
                        source.name,
                        source.path.display()
                    );
                    GlyphOutcome::Skipped(fault)
                }
                Err(fault) => return Err(run_error(source, fault, &files)),
            };
            if !matches!(outcome, GlyphOutcome::Skipped(_)) {
                files.insert(source.name.clone(), source.path.clone());
            }
            reports.push(GlyphReport {
                name: source.name,
                file: source.path,
                outcome,
            });
        }

        Ok((assembler.finalize(), reports))
    }

    /// Build the font and write it, with its preview page, to the output
    /// directory.
    ///
    /// On error nothing is written.
    pub fn run(&self) -> Result<RunReport, PipelineError> {
        let (font, glyphs) = self.assemble()?;
        let bytes = self.encoder.encode(&font).map_err(PipelineError::Encode)?;

        let font_file = self.config.font_file_name();
        let preview = render_preview(&font, &self.config.font_name, &font_file);

        let out_dir = self.config.output_dir();
        fs::create_dir_all(out_dir).map_err(|source| PipelineError::Output {
            path: out_dir.to_owned(),
            source,
        })?;
        let font_path = out_dir.join(&font_file);
        write_output(&font_path, &bytes)?;
        let preview_path = out_dir.join(self.config.preview_file_name());
        write_output(&preview_path, preview.as_bytes())?;

        log::info!(
            "wrote {} glyphs to '{}'",
            font.glyph_count(),
            font_path.display()
        );
        log::info!("wrote preview to '{}'", preview_path.display());
        Ok(RunReport {
            glyphs,
            font_path,
            preview_path,
        })
    }
}

fn write_output(path: &Path, contents: &[u8]) -> Result<(), PipelineError> {
    fs::write(path, contents).map_err(|source| PipelineError::Output {
        path: path.to_owned(),
        source,
    })
}

fn run_error(
    source: SourceFile,
    fault: GlyphFault,
    files: &HashMap<String, PathBuf>,
) -> PipelineError {
    match fault.kind {
        FaultKind::Assembly(error @ AssemblyError::DuplicateGlyph { .. }) => {
            let existing_file = match &error {
                AssemblyError::DuplicateGlyph { existing, .. } => files.get(existing).cloned(),
                _ => None,
            };
            PipelineError::Duplicate {
                error,
                existing_file: existing_file.unwrap_or_default(),
                duplicate_file: source.path,
            }
        }
        kind => PipelineError::Glyph {
            name: source.name,
            file: source.path,
            fault: GlyphFault {
                stage: fault.stage,
                kind,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use outline_fonts::FontMetrics;

    use super::*;
    use crate::error::CollaboratorError;

    struct FixedRaster;

    impl Rasterize for FixedRaster {
        fn rasterize(&self, document: &Path, scratch: &Path) -> Result<PathBuf, CollaboratorError> {
            Ok(scratch.join(document.file_stem().unwrap()).with_extension("png"))
        }
    }

    struct FixedTrace(&'static str);

    impl Trace for FixedTrace {
        fn trace(&self, _: &Path, _: &Path) -> Result<String, CollaboratorError> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenTrace;

    impl Trace for BrokenTrace {
        fn trace(&self, image: &Path, _: &Path) -> Result<String, CollaboratorError> {
            Err(CollaboratorError::MissingOutput(image.with_extension("svg")))
        }
    }

    fn job(name: &str) -> GlyphJob {
        GlyphJob::new(SourceFile {
            name: name.into(),
            path: PathBuf::from(format!("in/{name}.pdf")),
        })
    }

    #[test]
    fn one_transition_at_a_time() {
        let mut assembler = FontAssembler::new(FontMetrics::default());
        let mut stages = Stages {
            rasterizer: &FixedRaster,
            tracer: &FixedTrace(r#"<svg><path d="M0 0 l100 0 0 100 z"/></svg>"#),
            scratch: Path::new("scratch"),
            parse_options: ParseOptions::default(),
            assembler: &mut assembler,
        };
        let mut job = job("A");

        job.advance(&mut stages);
        assert!(
            matches!(job.state(), GlyphState::Rasterized { image } if image == Path::new("scratch/A.png"))
        );
        job.advance(&mut stages);
        assert!(matches!(job.state(), GlyphState::Traced { .. }));
        job.advance(&mut stages);
        assert!(matches!(job.state(), GlyphState::Parsed { ops } if ops.len() == 4));
        assert!(!job.state().is_terminal());
        job.advance(&mut stages);
        assert!(matches!(job.state(), GlyphState::Appended { empty: false }));
        assert!(job.state().is_terminal());

        // terminal states stay put
        job.advance(&mut stages);
        assert!(matches!(job.state(), GlyphState::Appended { empty: false }));
        assert_eq!(assembler.glyph_count(), 2);
    }

    #[test]
    fn fault_records_stage() {
        let mut assembler = FontAssembler::new(FontMetrics::default());
        let mut stages = Stages {
            rasterizer: &FixedRaster,
            tracer: &BrokenTrace,
            scratch: Path::new("scratch"),
            parse_options: ParseOptions::default(),
            assembler: &mut assembler,
        };
        let (_, result) = job("A").finish(&mut stages);
        let fault = result.unwrap_err();
        assert_eq!(fault.stage, Stage::Trace);
        assert!(fault.is_recoverable());
        assert_eq!(assembler.glyph_count(), 1);
    }

    #[test]
    fn no_path_data_is_empty_glyph() {
        let mut assembler = FontAssembler::new(FontMetrics::default());
        let mut stages = Stages {
            rasterizer: &FixedRaster,
            tracer: &FixedTrace("<svg></svg>"),
            scratch: Path::new("scratch"),
            parse_options: ParseOptions::default(),
            assembler: &mut assembler,
        };
        let (_, result) = job("space").finish(&mut stages);
        assert!(result.unwrap());
    }

    #[test]
    fn malformed_path_faults_in_parse() {
        let mut assembler = FontAssembler::new(FontMetrics::default());
        let mut stages = Stages {
            rasterizer: &FixedRaster,
            tracer: &FixedTrace(r#"<path d="M0 0 L10"/>"#),
            scratch: Path::new("scratch"),
            parse_options: ParseOptions::default(),
            assembler: &mut assembler,
        };
        let (_, result) = job("A").finish(&mut stages);
        let fault = result.unwrap_err();
        assert_eq!(fault.stage, Stage::Parse);
        assert!(matches!(fault.kind, FaultKind::Path(_)));
    }
}
