//! Compiling a [`FontDocument`] into a TrueType font.
//!
//! The font gets the tables a renderer needs to use it: `glyf`/`loca`,
//! `cmap`, `hmtx`, `hhea`, `maxp`, `head`, `OS/2`, `name` and `post`. Cubic
//! segments are approximated with quadratic splines.

use kurbo::{BezPath, CubicBez, PathEl, Point};
use write_fonts::{
    tables::{
        cmap::Cmap,
        glyf::{Bbox, GlyfLocaBuilder, SimpleGlyph},
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::Os2,
        post::Post,
    },
    types::{FWord, Fixed, GlyphId, NameId, UfWord},
    FontBuilder,
};

use crate::{error::CompileError, font::FontDocument, glyph::GlyphOutline};

/// The maximum distance, in font units, between a cubic and its quadratic
/// approximation.
const CUBIC_TOLERANCE: f64 = 1.0;

const WINDOWS_PLATFORM: u16 = 3;
const WINDOWS_UNICODE_BMP: u16 = 1;
const WINDOWS_ENGLISH_US: u16 = 0x409;

const WEIGHT_REGULAR: u16 = 400;
const WIDTH_MEDIUM: u16 = 5;

/// Compile `font` into the bytes of a TrueType font file.
pub fn compile_font(font: &FontDocument) -> Result<Vec<u8>, CompileError> {
    let num_glyphs = u16::try_from(font.glyph_count())
        .map_err(|_| CompileError::TooManyGlyphs(font.glyph_count()))?;

    let glyphs = font
        .glyphs()
        .iter()
        .map(|outline| simple_glyph(outline).map(|glyph| (outline, glyph)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut glyf_builder = GlyfLocaBuilder::new();
    for (outline, glyph) in &glyphs {
        glyf_builder
            .add_glyph(glyph)
            .map_err(|e| CompileError::Outline {
                glyph: outline.name().to_owned(),
                reason: e.to_string(),
            })?;
    }
    let (glyf, loca, loca_format) = glyf_builder.build();

    let metrics = HorizontalMetrics::new(&glyphs);
    let font_bbox = glyphs
        .iter()
        .filter(|(_, glyph)| !glyph.contours.is_empty())
        .map(|(_, glyph)| glyph.bbox)
        .reduce(Bbox::union)
        .unwrap_or_default();

    let cmap = Cmap::from_mappings(
        font.mappings()
            .map(|(ch, gid)| (ch, GlyphId::new(gid as u32))),
    )?;

    let head = Head {
        font_revision: Fixed::from_f64(1.0),
        units_per_em: font.units_per_em(),
        x_min: font_bbox.x_min,
        y_min: font_bbox.y_min,
        x_max: font_bbox.x_max,
        y_max: font_bbox.y_max,
        lowest_rec_ppem: 8,
        index_to_loc_format: loca_format as i16,
        ..Default::default()
    };

    let hhea = Hhea {
        ascender: FWord::new(font.ascender()),
        descender: FWord::new(font.descender()),
        line_gap: FWord::new(0),
        advance_width_max: UfWord::new(metrics.advance_width_max),
        min_left_side_bearing: FWord::new(metrics.min_left_side_bearing),
        min_right_side_bearing: FWord::new(metrics.min_right_side_bearing),
        x_max_extent: FWord::new(metrics.x_max_extent),
        caret_slope_rise: 1,
        caret_slope_run: 0,
        caret_offset: 0,
        number_of_h_metrics: num_glyphs,
    };

    let hmtx = Hmtx {
        h_metrics: metrics.long_metrics,
        left_side_bearings: Vec::new(),
    };

    let maxp = Maxp {
        num_glyphs,
        max_points: Some(max_of(&glyphs, |glyph| {
            glyph.contours.iter().map(|c| c.len()).sum()
        })),
        max_contours: Some(max_of(&glyphs, |glyph| glyph.contours.len())),
        max_composite_points: Some(0),
        max_composite_contours: Some(0),
        max_zones: Some(1),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(0),
        max_component_depth: Some(0),
    };

    let (first_char, last_char) = char_range(font);
    let os2 = Os2 {
        x_avg_char_width: metrics.average_advance,
        us_weight_class: WEIGHT_REGULAR,
        us_width_class: WIDTH_MEDIUM,
        s_typo_ascender: font.ascender(),
        s_typo_descender: font.descender(),
        s_typo_line_gap: 0,
        us_win_ascent: font.ascender().max(font_bbox.y_max).max(0) as u16,
        us_win_descent: font
            .descender()
            .min(font_bbox.y_min)
            .min(0)
            .unsigned_abs(),
        us_first_char_index: first_char,
        us_last_char_index: last_char,
        ..Default::default()
    };

    let post = Post::default().with_glyph_names(font.glyphs().iter().map(GlyphOutline::name));

    let mut builder = FontBuilder::new();
    builder
        .add_table(&head)?
        .add_table(&hhea)?
        .add_table(&maxp)?
        .add_table(&os2)?
        .add_table(&hmtx)?
        .add_table(&cmap)?
        .add_table(&loca)?
        .add_table(&glyf)?
        .add_table(&name_table(font))?
        .add_table(&post)?;
    Ok(builder.build())
}

fn simple_glyph(outline: &GlyphOutline) -> Result<SimpleGlyph, CompileError> {
    if outline.is_empty() {
        return Ok(SimpleGlyph::default());
    }
    let path = quadratic_path(outline.path());
    let bounds = path.control_box();
    if ![bounds.x0, bounds.y0, bounds.x1, bounds.y1]
        .into_iter()
        .all(fits_font_units)
    {
        return Err(CompileError::Outline {
            glyph: outline.name().to_owned(),
            reason: format!(
                "outline spans ({}, {})..({}, {}), outside the 16-bit coordinate range",
                bounds.x0, bounds.y0, bounds.x1, bounds.y1
            ),
        });
    }
    SimpleGlyph::from_bezpath(&path).map_err(|e| CompileError::Outline {
        glyph: outline.name().to_owned(),
        reason: format!("{e:?}"),
    })
}

/// `true` if `value` rounds to a coordinate `glyf` can store.
fn fits_font_units(value: f64) -> bool {
    let rounded = (value + 0.5).floor();
    (i16::MIN as f64..=i16::MAX as f64).contains(&rounded)
}

/// Replace every cubic segment of `path` with quadratic segments.
fn quadratic_path(path: &BezPath) -> BezPath {
    let mut quads = BezPath::new();
    let mut current = Point::ORIGIN;
    let mut start = Point::ORIGIN;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                quads.move_to(p);
                start = p;
                current = p;
            }
            PathEl::LineTo(p) => {
                quads.line_to(p);
                current = p;
            }
            PathEl::QuadTo(c0, p) => {
                quads.quad_to(c0, p);
                current = p;
            }
            PathEl::CurveTo(c0, c1, p) => {
                for (_, _, quad) in CubicBez::new(current, c0, c1, p).to_quads(CUBIC_TOLERANCE) {
                    quads.quad_to(quad.p1, quad.p2);
                }
                current = p;
            }
            PathEl::ClosePath => {
                quads.close_path();
                current = start;
            }
        }
    }
    quads
}

/// The values `hmtx`, `hhea` and `OS/2` derive from glyph extents.
struct HorizontalMetrics {
    long_metrics: Vec<LongMetric>,
    advance_width_max: u16,
    min_left_side_bearing: i16,
    min_right_side_bearing: i16,
    x_max_extent: i16,
    average_advance: i16,
}

impl HorizontalMetrics {
    fn new(glyphs: &[(&GlyphOutline, SimpleGlyph)]) -> Self {
        let long_metrics = glyphs
            .iter()
            .map(|(outline, glyph)| LongMetric {
                advance: outline.advance_width(),
                // the side bearing of a glyph with contours is where its outline starts
                side_bearing: if glyph.contours.is_empty() {
                    outline.left_side_bearing()
                } else {
                    glyph.bbox.x_min
                },
            })
            .collect::<Vec<_>>();

        // extents only count glyphs that draw something
        let inked = glyphs
            .iter()
            .filter(|(_, glyph)| !glyph.contours.is_empty())
            .map(|(outline, glyph)| {
                let lsb = glyph.bbox.x_min as i32;
                let width = glyph.bbox.x_max as i32 - lsb;
                let rsb = outline.advance_width() as i32 - lsb - width;
                (lsb, rsb, lsb + width)
            })
            .collect::<Vec<_>>();

        let advances = long_metrics
            .iter()
            .map(|metric| metric.advance as u32)
            .filter(|advance| *advance > 0)
            .collect::<Vec<_>>();
        let average_advance = match advances.len() as u32 {
            0 => 0,
            n => (advances.iter().sum::<u32>() + n / 2) / n,
        };

        HorizontalMetrics {
            advance_width_max: long_metrics
                .iter()
                .map(|metric| metric.advance)
                .max()
                .unwrap_or_default(),
            min_left_side_bearing: clamp_i16(inked.iter().map(|m| m.0).min().unwrap_or(0)),
            min_right_side_bearing: clamp_i16(inked.iter().map(|m| m.1).min().unwrap_or(0)),
            x_max_extent: clamp_i16(inked.iter().map(|m| m.2).max().unwrap_or(0)),
            average_advance: clamp_i16(average_advance as i32),
            long_metrics,
        }
    }
}

fn clamp_i16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

fn max_of(
    glyphs: &[(&GlyphOutline, SimpleGlyph)],
    count: impl Fn(&SimpleGlyph) -> usize,
) -> u16 {
    glyphs
        .iter()
        .map(|(_, glyph)| count(glyph))
        .max()
        .unwrap_or_default()
        .min(u16::MAX as usize) as u16
}

/// The smallest and largest mapped codepoints, as stored in `OS/2`.
fn char_range(font: &FontDocument) -> (u16, u16) {
    let codepoints = font.mappings().map(|(ch, _)| ch as u32);
    let (min, max) = codepoints.fold(None, |range, cp| match range {
        None => Some((cp, cp)),
        Some((min, max)) => Some((cp.min(min), cp.max(max))),
    })
    .unwrap_or((0, 0));
    (min.min(0xFFFF) as u16, max.min(0xFFFF) as u16)
}

fn name_table(font: &FontDocument) -> Name {
    let family = font.family_name();
    let style = font.style_name();
    let postscript_name = postscript_name(family, style);
    let version = "Version 1.000";

    let mut records = [
        (NameId::FAMILY_NAME, family.to_owned()),
        (NameId::SUBFAMILY_NAME, style.to_owned()),
        (NameId::UNIQUE_ID, format!("1.000;{postscript_name}")),
        (NameId::FULL_NAME, format!("{family} {style}")),
        (NameId::VERSION_STRING, version.to_owned()),
        (NameId::POSTSCRIPT_NAME, postscript_name),
    ]
    .into_iter()
    .map(|(name_id, string)| {
        NameRecord::new(
            WINDOWS_PLATFORM,
            WINDOWS_UNICODE_BMP,
            WINDOWS_ENGLISH_US,
            name_id,
            string.into(),
        )
    })
    .collect::<Vec<_>>();
    records.sort();

    let mut name = Name::default();
    name.name_record = records;
    name
}

/// A PostScript name: printable ASCII without spaces or delimiters, at most
/// 63 characters.
fn postscript_name(family: &str, style: &str) -> String {
    format!("{family}-{style}")
        .chars()
        .filter(|c| c.is_ascii_graphic() && !"[](){}<>/%".contains(*c))
        .take(63)
        .collect()
}
