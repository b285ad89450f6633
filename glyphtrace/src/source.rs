//! Finding the source documents of a run

use std::{
    io,
    path::{Path, PathBuf},
};

/// One source document; its file stem is the glyph name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub path: PathBuf,
}

/// List the files in `dir` with the given extension, sorted by file name.
///
/// The extension is matched ignoring ASCII case. Subdirectories are not
/// searched, and files whose stem is not valid UTF-8 are skipped.
pub fn discover(dir: &Path, extension: &str) -> io::Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if !matches {
            continue;
        }
        match path.file_stem().and_then(|stem| stem.to_str()) {
            Some(name) if !name.is_empty() => files.push(SourceFile {
                name: name.to_owned(),
                path,
            }),
            _ => log::warn!("skipping '{}': no usable glyph name", path.display()),
        }
    }
    files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    log::debug!("found {} source files in '{}'", files.len(), dir.display());
    Ok(files)
}
