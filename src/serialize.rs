//! Grid to text. Plain output is the bare characters; markup output wraps
//! each run of equally-tagged cells in one `<span class="...">`.

use crate::raster::{Cell, Grid, Style};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Full-screen colored terminal output.
    Ansi,
    Plain,
    Markup,
}

pub fn to_plain(grid: &Grid) -> String {
    let mut out = String::with_capacity((grid.width() + 1) * grid.height());
    for (i, row) in grid.rows().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.extend(row.iter().map(|c| c.ch));
    }
    out
}

pub fn to_markup(grid: &Grid) -> String {
    let mut out = String::new();
    for (i, row) in grid.rows().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for run in row.chunk_by(|a, b| a.style == b.style) {
            match run[0].style {
                Some(style) => {
                    out.push_str("<span class=\"");
                    out.push_str(style.class());
                    out.push_str("\">");
                    run.iter().for_each(|c| escape_into(&mut out, c.ch));
                    out.push_str("</span>");
                }
                None => run.iter().for_each(|c| escape_into(&mut out, c.ch)),
            }
        }
    }
    out
}

fn escape_into(out: &mut String, ch: char) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(ch),
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("line {line}: malformed tag")]
    BadTag { line: usize },
    #[error("line {line}: unknown style class `{class}`")]
    UnknownClass { line: usize, class: String },
    #[error("line {line}: unknown entity `&{entity};`")]
    BadEntity { line: usize, entity: String },
    #[error("line {line}: span left open at end of row")]
    Unclosed { line: usize },
}

/// Reads markup produced by [`to_markup`] back into rows of cells.
pub fn decode_markup(markup: &str) -> Result<Vec<Vec<Cell>>, DecodeError> {
    markup
        .split('\n')
        .enumerate()
        .map(|(line, text)| decode_row(line + 1, text))
        .collect()
}

fn decode_row(line: usize, mut rest: &str) -> Result<Vec<Cell>, DecodeError> {
    let mut cells = Vec::new();
    let mut style: Option<Style> = None;

    while let Some(ch) = rest.chars().next() {
        match ch {
            '<' if rest.starts_with("</span>") => {
                if style.take().is_none() {
                    return Err(DecodeError::BadTag { line });
                }
                rest = &rest["</span>".len()..];
            }
            '<' => {
                let open = rest
                    .strip_prefix("<span class=\"")
                    .ok_or(DecodeError::BadTag { line })?;
                let end = open.find("\">").ok_or(DecodeError::BadTag { line })?;
                if style.is_some() {
                    return Err(DecodeError::BadTag { line });
                }
                let class = &open[..end];
                style = Some(Style::from_class(class).ok_or_else(|| {
                    DecodeError::UnknownClass {
                        line,
                        class: class.to_string(),
                    }
                })?);
                rest = &open[end + 2..];
            }
            '&' => {
                let end = rest.find(';').ok_or_else(|| DecodeError::BadEntity {
                    line,
                    entity: rest[1..].to_string(),
                })?;
                let entity = &rest[1..end];
                let ch = match entity {
                    "amp" => '&',
                    "lt" => '<',
                    "gt" => '>',
                    "quot" => '"',
                    "#39" => '\'',
                    _ => {
                        return Err(DecodeError::BadEntity {
                            line,
                            entity: entity.to_string(),
                        })
                    }
                };
                cells.push(Cell { ch, style });
                rest = &rest[end + 1..];
            }
            _ => {
                cells.push(Cell { ch, style });
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    if style.is_some() {
        return Err(DecodeError::Unclosed { line });
    }
    Ok(cells)
}
