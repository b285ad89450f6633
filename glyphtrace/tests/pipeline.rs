//! Running the pipeline with in-process collaborators.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use glyphtrace::{
    collaborators::{Rasterize, Trace, TrueTypeEncoder},
    CollaboratorError, Config, FailurePolicy, GlyphOutcome, Pipeline, PipelineError, Stage,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use write_fonts::{
    read::{FontRef, TableProvider},
    types::GlyphId,
};

const SQUARE: &str = r#"<svg><g><path d="M100 0 l300 0 0 600 -300 0 z"/></g></svg>"#;
const CURVE: &str =
    r#"<svg><path d="M50 0 c0 200 100 400 300 400 C400 400 450 200 450 0 z"/></svg>"#;

/// Writes a placeholder image into the scratch directory.
struct FakeRaster;

impl Rasterize for FakeRaster {
    fn rasterize(&self, document: &Path, scratch: &Path) -> Result<PathBuf, CollaboratorError> {
        let stem = document.file_stem().unwrap();
        let image = scratch.join(stem).with_extension("png");
        fs::write(&image, b"raster").unwrap();
        Ok(image)
    }
}

/// Returns canned SVG by image stem, failing for anything unknown.
struct FakeTrace(HashMap<&'static str, &'static str>);

impl FakeTrace {
    fn new(svgs: &[(&'static str, &'static str)]) -> Self {
        FakeTrace(svgs.iter().copied().collect())
    }
}

impl Trace for FakeTrace {
    fn trace(&self, image: &Path, _scratch: &Path) -> Result<String, CollaboratorError> {
        assert!(image.is_file(), "tracing a raster that does not exist");
        let stem = image.file_stem().unwrap().to_str().unwrap();
        self.0
            .get(stem)
            .map(|svg| svg.to_string())
            .ok_or_else(|| CollaboratorError::MissingOutput(image.with_extension("svg")))
    }
}

fn source_dir(names: &[&str]) -> TempDir {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    for name in names {
        fs::write(dir.path().join(name), b"%PDF-1.4").unwrap();
    }
    dir
}

fn pipeline(config: Config, tracer: FakeTrace) -> Pipeline<FakeRaster, FakeTrace, TrueTypeEncoder> {
    Pipeline::new(config, FakeRaster, tracer, TrueTypeEncoder)
}

#[test]
fn two_glyphs_end_to_end() {
    let dir = source_dir(&["B.pdf", "A.pdf", "notes.txt"]);
    let config = Config::new(dir.path());
    let report = pipeline(config, FakeTrace::new(&[("A", SQUARE), ("B", CURVE)]))
        .run()
        .unwrap();

    let names = report.glyphs.iter().map(|g| g.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, ["A", "B"]);
    assert!(report
        .glyphs
        .iter()
        .all(|g| matches!(g.outcome, GlyphOutcome::Appended)));
    assert_eq!(report.font_path, dir.path().join("CustomFont.ttf"));
    assert_eq!(report.preview_path, dir.path().join("CustomFont-glyphs.html"));

    let bytes = fs::read(&report.font_path).unwrap();
    let font = FontRef::new(&bytes).unwrap();
    assert_eq!(font.maxp().unwrap().num_glyphs(), 3);
    let cmap = font.cmap().unwrap();
    assert_eq!(cmap.map_codepoint('A'), Some(GlyphId::new(1)));
    assert_eq!(cmap.map_codepoint('B'), Some(GlyphId::new(2)));
    let advances = font
        .hmtx()
        .unwrap()
        .h_metrics()
        .iter()
        .map(|m| m.advance())
        .collect::<Vec<_>>();
    assert_eq!(advances, [512, 512, 512]);

    let html = fs::read_to_string(&report.preview_path).unwrap();
    assert!(html.contains("Glyphs from CustomFont"));
    assert!(html.contains("U+0041"));
    assert!(html.contains("U+0042"));
    assert!(html.contains("N/A"));
}

#[test]
fn duplicate_codepoints_name_both_files() {
    let dir = source_dir(&["A.pdf", "uni0041.pdf"]);
    let config = Config::new(dir.path());
    let err = pipeline(config, FakeTrace::new(&[("A", SQUARE), ("uni0041", SQUARE)]))
        .run()
        .unwrap_err();

    assert_eq!(err.exit_code(), 4);
    match err {
        PipelineError::Duplicate {
            existing_file,
            duplicate_file,
            ..
        } => {
            assert_eq!(existing_file, dir.path().join("A.pdf"));
            assert_eq!(duplicate_file, dir.path().join("uni0041.pdf"));
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(!dir.path().join("CustomFont.ttf").exists());
}

#[test]
fn trace_failure_aborts_by_default() {
    let dir = source_dir(&["A.pdf", "B.pdf"]);
    let config = Config::new(dir.path());
    let err = pipeline(config, FakeTrace::new(&[("A", SQUARE)]))
        .run()
        .unwrap_err();

    assert_eq!(err.exit_code(), 3);
    match err {
        PipelineError::Glyph { name, file, fault } => {
            assert_eq!(name, "B");
            assert_eq!(file, dir.path().join("B.pdf"));
            assert_eq!(fault.stage, Stage::Trace);
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(!dir.path().join("CustomFont.ttf").exists());
    assert!(!dir.path().join("CustomFont-glyphs.html").exists());
}

#[test]
fn trace_failure_skipped_when_asked() {
    let dir = source_dir(&["A.pdf", "B.pdf", "C.pdf"]);
    let mut config = Config::new(dir.path());
    config.failure_policy = FailurePolicy::Skip;
    let report = pipeline(config, FakeTrace::new(&[("A", SQUARE), ("C", CURVE)]))
        .run()
        .unwrap();

    assert!(matches!(report.glyphs[1].outcome, GlyphOutcome::Skipped(ref f) if f.stage == Stage::Trace));
    let bytes = fs::read(&report.font_path).unwrap();
    let font = FontRef::new(&bytes).unwrap();
    assert_eq!(font.maxp().unwrap().num_glyphs(), 3);
    let cmap = font.cmap().unwrap();
    assert_eq!(cmap.map_codepoint('B'), None);
    assert_eq!(cmap.map_codepoint('C'), Some(GlyphId::new(2)));
}

#[test]
fn duplicates_are_fatal_even_when_skipping() {
    let dir = source_dir(&["A.pdf", "uni0041.pdf"]);
    let mut config = Config::new(dir.path());
    config.failure_policy = FailurePolicy::Skip;
    let err = pipeline(config, FakeTrace::new(&[("A", SQUARE), ("uni0041", SQUARE)]))
        .run()
        .unwrap_err();
    assert!(matches!(err, PipelineError::Duplicate { .. }));
}

#[test]
fn no_path_gives_empty_glyph() {
    let dir = source_dir(&["space.pdf"]);
    let config = Config::new(dir.path());
    let (font, glyphs) = pipeline(config, FakeTrace::new(&[("space", "<svg></svg>")]))
        .assemble()
        .unwrap();

    assert!(matches!(glyphs[0].outcome, GlyphOutcome::Empty));
    assert_eq!(font.glyph_count(), 2);
    assert!(font.glyphs()[1].is_empty());
    assert_eq!(font.glyphs()[1].codepoint(), Some('s' as u32));
}

#[test]
fn empty_directory_gives_fallback_only() {
    let dir = source_dir(&[]);
    let config = Config::new(dir.path());
    let report = pipeline(config, FakeTrace::new(&[])).run().unwrap();
    assert!(report.glyphs.is_empty());
    let bytes = fs::read(&report.font_path).unwrap();
    assert_eq!(FontRef::new(&bytes).unwrap().maxp().unwrap().num_glyphs(), 1);
}

#[test]
fn artifacts_go_to_output_dir() {
    let dir = source_dir(&["A.pdf"]);
    let out = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let mut config = Config::new(dir.path());
    config.font_name = "Hand".into();
    config.output_dir = Some(out.path().join("fonts"));
    config.keep_rasters = Some(scratch.path().join("kept"));

    let report = pipeline(config, FakeTrace::new(&[("A", SQUARE)]))
        .run()
        .unwrap();
    assert_eq!(report.font_path, out.path().join("fonts/Hand.ttf"));
    assert!(report.font_path.is_file());
    assert!(out.path().join("fonts/Hand-glyphs.html").is_file());
    assert!(scratch.path().join("kept/A.png").is_file());
    assert!(!dir.path().join("Hand.ttf").exists());
}

#[test]
fn missing_source_dir() {
    let dir = source_dir(&[]);
    let config = Config::new(dir.path().join("nope"));
    let err = pipeline(config, FakeTrace::new(&[])).run().unwrap_err();
    assert!(matches!(err, PipelineError::SourceDir { .. }));
    assert_eq!(err.exit_code(), 1);
}
