//! Collecting glyph outlines into a font document.

use std::collections::HashMap;

use crate::{
    error::AssemblyError,
    glyph::{GlyphIdentity, GlyphOutline},
};

/// The name of the fallback glyph, always at index 0.
pub const NOTDEF: &str = ".notdef";

/// Font-wide names and vertical metrics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontMetrics {
    pub family_name: String,
    pub style_name: String,
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    /// The advance width given to every glyph, including the fallback.
    pub default_advance_width: u16,
}

impl Default for FontMetrics {
    fn default() -> Self {
        FontMetrics {
            family_name: "CustomFontFamily".into(),
            style_name: "Regular".into(),
            units_per_em: 1000,
            ascender: 800,
            descender: -200,
            default_advance_width: 512,
        }
    }
}

/// Accumulates glyphs for a font.
///
/// The assembler owns the document while it is being built. Glyphs keep the
/// order in which they were appended, after the fallback glyph.
#[derive(Clone, Debug)]
pub struct FontAssembler {
    metrics: FontMetrics,
    glyphs: Vec<GlyphOutline>,
    // codepoint -> index into glyphs
    codepoints: HashMap<u32, usize>,
}

impl FontAssembler {
    /// Start a font containing only the fallback glyph.
    pub fn new(metrics: FontMetrics) -> Self {
        let notdef = GlyphOutline::empty(GlyphIdentity::new(NOTDEF, metrics.default_advance_width));
        FontAssembler {
            metrics,
            glyphs: vec![notdef],
            codepoints: HashMap::new(),
        }
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// The number of glyphs so far, including the fallback.
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Add a glyph, assigning its codepoint from its name.
    ///
    /// Fails if another glyph already claims the same codepoint, or if the
    /// glyph is named [`NOTDEF`]. A failed append leaves the font unchanged.
    pub fn append(&mut self, mut outline: GlyphOutline) -> Result<(), AssemblyError> {
        if outline.name() == NOTDEF {
            return Err(AssemblyError::ReservedName(NOTDEF.into()));
        }
        let codepoint = codepoint_for_name(outline.name());
        if let Some(codepoint) = codepoint {
            if let Some(&existing) = self.codepoints.get(&codepoint) {
                return Err(AssemblyError::DuplicateGlyph {
                    codepoint,
                    existing: self.glyphs[existing].name().to_owned(),
                    duplicate: outline.name().to_owned(),
                });
            }
            self.codepoints.insert(codepoint, self.glyphs.len());
        }
        outline.set_codepoint(codepoint);
        log::debug!(
            "glyph {} is '{}' ({})",
            self.glyphs.len(),
            outline.name(),
            DisplayCodepoint(codepoint)
        );
        self.glyphs.push(outline);
        Ok(())
    }

    /// Freeze the font.
    pub fn finalize(self) -> FontDocument {
        FontDocument {
            metrics: self.metrics,
            glyphs: self.glyphs,
        }
    }
}

/// A finished font: metrics plus glyphs, with the fallback glyph first.
#[derive(Clone, Debug, PartialEq)]
pub struct FontDocument {
    metrics: FontMetrics,
    glyphs: Vec<GlyphOutline>,
}

impl FontDocument {
    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    pub fn family_name(&self) -> &str {
        &self.metrics.family_name
    }

    pub fn style_name(&self) -> &str {
        &self.metrics.style_name
    }

    pub fn units_per_em(&self) -> u16 {
        self.metrics.units_per_em
    }

    pub fn ascender(&self) -> i16 {
        self.metrics.ascender
    }

    pub fn descender(&self) -> i16 {
        self.metrics.descender
    }

    /// All glyphs in glyph id order.
    pub fn glyphs(&self) -> &[GlyphOutline] {
        &self.glyphs
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// The fallback glyph.
    pub fn notdef(&self) -> &GlyphOutline {
        &self.glyphs[0]
    }

    /// Iterate over `(character, glyph index)` pairs for every mapped glyph.
    pub fn mappings(&self) -> impl Iterator<Item = (char, usize)> + '_ {
        self.glyphs.iter().enumerate().filter_map(|(gid, glyph)| {
            glyph
                .codepoint()
                .and_then(char::from_u32)
                .map(|ch| (ch, gid))
        })
    }
}

/// The codepoint a glyph name stands for.
///
/// A single character names itself. `uniXXXX` (four upper case hex digits)
/// and `uXXXX` to `uXXXXXX` (four to six) name the encoded scalar value,
/// which lets glyphs exist for characters that cannot appear in file names.
/// Any other name maps to its first character. The empty name maps to nothing.
pub fn codepoint_for_name(name: &str) -> Option<u32> {
    let mut chars = name.chars();
    let first = chars.next()?;
    if chars.next().is_none() {
        return Some(first as u32);
    }
    if let Some(codepoint) = parse_unicode_name(name) {
        return Some(codepoint);
    }
    log::warn!(
        "glyph name '{name}' is longer than one character, mapping it to '{first}' (U+{:04X})",
        first as u32
    );
    Some(first as u32)
}

fn parse_unicode_name(name: &str) -> Option<u32> {
    let hex = match name.strip_prefix("uni") {
        Some(hex) if hex.len() == 4 => hex,
        _ => name
            .strip_prefix('u')
            .filter(|hex| (4..=6).contains(&hex.len()))?,
    };
    // upper case hex only
    if !hex
        .bytes()
        .all(|b| b.is_ascii_hexdigit() && !b.is_ascii_lowercase())
    {
        return None;
    }
    u32::from_str_radix(hex, 16)
        .ok()
        .filter(|cp| char::from_u32(*cp).is_some())
}

struct DisplayCodepoint(Option<u32>);

impl std::fmt::Display for DisplayCodepoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(cp) => write!(f, "U+{cp:04X}"),
            None => f.write_str("unmapped"),
        }
    }
}
