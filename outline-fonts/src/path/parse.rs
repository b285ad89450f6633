//! Splitting path data into raw commands

use super::{CommandKind, RawCommand};
use crate::error::{MalformedReason, PathError};

/// What to do with path commands outside the supported alphabet.
///
/// Tracers only ever emit moves, lines, curves and closes, but hand-written
/// path data may contain arcs or shorthand curves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum UnsupportedCommands {
    /// Drop the command and its operands.
    #[default]
    Skip,
    /// Fail with [`PathError::UnsupportedCommand`].
    Reject,
}

/// Options controlling [`parse_with`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseOptions {
    pub unsupported: UnsupportedCommands,
}

impl ParseOptions {
    pub fn new(unsupported: UnsupportedCommands) -> Self {
        ParseOptions { unsupported }
    }
}

/// Parse path data with the default options.
pub fn parse(path: &str) -> Result<Vec<RawCommand>, PathError> {
    parse_with(path, ParseOptions::default())
}

/// Parse path data into the sequence of commands it contains.
///
/// Every ASCII letter other than `e` and `E` starts a new command; the text up
/// to the next such letter holds its operands, separated by whitespace and/or
/// commas.
pub fn parse_with(path: &str, options: ParseOptions) -> Result<Vec<RawCommand>, PathError> {
    let mut commands = Vec::new();
    let chunks = Chunks::new(path);

    let leading = chunks.leading().trim();
    if !leading.is_empty() {
        log::warn!("ignoring '{leading}' before the first path command");
    }

    for chunk in chunks {
        let Some((kind, coordinates)) = CommandKind::from_letter(chunk.letter) else {
            match options.unsupported {
                UnsupportedCommands::Skip => {
                    log::debug!(
                        "skipping unsupported path command '{}' at offset {}",
                        chunk.letter,
                        chunk.offset
                    );
                    continue;
                }
                UnsupportedCommands::Reject => {
                    return Err(PathError::UnsupportedCommand {
                        letter: chunk.letter,
                        offset: chunk.offset,
                    })
                }
            }
        };
        let operands = chunk.operands()?;
        check_operand_count(&chunk, kind.arity(), operands.len())?;
        commands.push(RawCommand::new(kind, coordinates, operands));
    }
    Ok(commands)
}

fn check_operand_count(chunk: &Chunk, arity: usize, found: usize) -> Result<(), PathError> {
    let reason = if arity == 0 {
        (found != 0).then_some(MalformedReason::UnexpectedOperands(found))
    } else {
        (found == 0 || found % arity != 0)
            .then_some(MalformedReason::OperandCount { arity, found })
    };
    match reason {
        Some(reason) => Err(chunk.malformed(reason)),
        None => Ok(()),
    }
}

fn is_command_letter(byte: u8) -> bool {
    byte.is_ascii_alphabetic() && !matches!(byte, b'e' | b'E')
}

/// A command letter and the text following it.
struct Chunk<'a> {
    letter: char,
    offset: usize,
    body: &'a str,
}

impl Chunk<'_> {
    fn operands(&self) -> Result<Vec<f64>, PathError> {
        self.body
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<f64>()
                    .map_err(|_| self.malformed(MalformedReason::BadNumber(token.to_owned())))
            })
            .collect()
    }

    fn malformed(&self, reason: MalformedReason) -> PathError {
        PathError::Malformed {
            letter: self.letter,
            offset: self.offset,
            reason,
        }
    }
}

/// Iterates the command chunks of a path string.
struct Chunks<'a> {
    path: &'a str,
    pos: usize,
}

impl<'a> Chunks<'a> {
    fn new(path: &'a str) -> Self {
        let pos = next_letter(path.as_bytes(), 0);
        Chunks { path, pos }
    }

    /// Any text before the first command letter.
    fn leading(&self) -> &'a str {
        &self.path[..self.pos]
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.path.as_bytes();
        let offset = self.pos;
        let letter = *bytes.get(offset)?;
        let end = next_letter(bytes, offset + 1);
        self.pos = end;
        Some(Chunk {
            letter: letter as char,
            offset,
            // command letters are ascii, so both ends are char boundaries
            body: &self.path[offset + 1..end],
        })
    }
}

fn next_letter(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|b| is_command_letter(*b))
        .map(|i| i + from)
        .unwrap_or(bytes.len())
}
