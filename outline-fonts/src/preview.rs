//! An HTML page showing every glyph of a font.

use std::fmt::Write;

use crate::font::FontDocument;

const STYLE: &str = "    body {
      font-family: Arial, sans-serif;
      padding: 20px;
    }
    .glyph {
      display: inline-block;
      text-align: center;
      margin: 10px;
      padding: 10px;
      border: 1px solid #ccc;
      width: 100px;
    }
    .glyph-name {
      color: #666;
      font-size: 12px;
      overflow-wrap: anywhere;
    }
";

/// Render a page that loads `font_file` (relative to the page) and shows
/// each glyph of `font` with its codepoint.
pub fn render_preview(font: &FontDocument, font_name: &str, font_file: &str) -> String {
    let title = escape_html(font_name);
    let mut html = String::new();

    // writing to a String cannot fail
    let _ = write!(
        html,
        "<!DOCTYPE html>
<html lang=\"en\">
<head>
  <meta charset=\"UTF-8\">
  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">
  <title>Glyphs from {title}</title>
  <style>
    @font-face {{
      font-family: {family};
      src: url({src});
    }}
    .glyph-char {{
      font-family: {family}, sans-serif;
      font-size: 48px;
      min-height: 64px;
    }}
{style}  </style>
</head>
<body>
  <h1>Glyphs from {title}</h1>
  <div class=\"glyphs\">
",
        family = css_string(font_name),
        src = css_string(font_file),
        style = STYLE,
    );

    for glyph in font.glyphs() {
        let character = glyph
            .codepoint()
            .and_then(char::from_u32)
            .map(|ch| escape_html(ch.encode_utf8(&mut [0; 4])))
            .unwrap_or_default();
        let code = match glyph.codepoint() {
            Some(cp) => format!("U+{cp:04X}"),
            None => "N/A".to_string(),
        };
        let _ = write!(
            html,
            "    <div class=\"glyph\">
      <div class=\"glyph-char\">{character}</div>
      <div class=\"glyph-code\">{code}</div>
      <div class=\"glyph-name\">{name}</div>
    </div>
",
            name = escape_html(glyph.name()),
        );
    }

    html.push_str("  </div>\n</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// A quoted CSS string that is also safe inside a `<style>` element.
fn css_string(text: &str) -> String {
    let mut quoted = String::from("'");
    for c in text.chars() {
        match c {
            '\'' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '<' => quoted.push_str("\\3C "),
            '\n' | '\r' => quoted.push_str("\\A "),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}
