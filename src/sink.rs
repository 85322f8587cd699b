use crate::config::PaletteName;
use crate::error::TankError;
use crate::raster::{Grid, Style};
use crate::serialize::{to_markup, to_plain, Format};
use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, IsTerminal, Stdout, Write};

/// Where finished frames go.
pub trait FrameSink {
    fn present(&mut self, grid: &Grid) -> io::Result<()>;
}

/// Writes every frame as serialized text.
pub struct WriterSink<W: Write> {
    out: W,
    format: Format,
    frames: u64,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W, format: Format) -> Self {
        Self {
            out,
            format,
            frames: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for WriterSink<W> {
    fn present(&mut self, grid: &Grid) -> io::Result<()> {
        match self.format {
            Format::Markup => {
                writeln!(self.out, "<pre class=\"tidepool\">")?;
                writeln!(self.out, "{}", to_markup(grid))?;
                writeln!(self.out, "</pre>")?;
            }
            Format::Plain | Format::Ansi => {
                if self.frames > 0 {
                    writeln!(self.out, "\u{000C}")?;
                }
                writeln!(self.out, "{}", to_plain(grid))?;
            }
        }
        self.frames += 1;
        self.out.flush()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TermCell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl TermCell {
    fn blank(bg: Color) -> Self {
        Self {
            ch: ' ',
            fg: Color::Reset,
            bg,
        }
    }
}

#[derive(Clone, Copy)]
struct Theme {
    bg: Color,
    sand: Color,
    weed: Color,
    star: Color,
    chest: Color,
    bubble: Color,
    fish: Color,
    gold: Color,
    coral: Color,
    blue: Color,
    shark: Color,
    crab: Color,
    jelly: Color,
    eel: Color,
    border: Color,
    title: Color,
}

impl Theme {
    fn for_palette(name: PaletteName) -> Self {
        match name {
            PaletteName::Classic => Theme {
                bg: Color::AnsiValue(17),
                sand: Color::AnsiValue(180),
                weed: Color::AnsiValue(41),
                star: Color::AnsiValue(209),
                chest: Color::AnsiValue(178),
                bubble: Color::AnsiValue(159),
                fish: Color::AnsiValue(229),
                gold: Color::AnsiValue(220),
                coral: Color::AnsiValue(209),
                blue: Color::AnsiValue(81),
                shark: Color::AnsiValue(250),
                crab: Color::AnsiValue(196),
                jelly: Color::AnsiValue(213),
                eel: Color::AnsiValue(106),
                border: Color::AnsiValue(67),
                title: Color::AnsiValue(153),
            },
            PaletteName::Reef => Theme {
                bg: Color::AnsiValue(23),
                sand: Color::AnsiValue(223),
                weed: Color::AnsiValue(71),
                star: Color::AnsiValue(203),
                chest: Color::AnsiValue(136),
                bubble: Color::AnsiValue(195),
                fish: Color::AnsiValue(255),
                gold: Color::AnsiValue(214),
                coral: Color::AnsiValue(204),
                blue: Color::AnsiValue(45),
                shark: Color::AnsiValue(247),
                crab: Color::AnsiValue(202),
                jelly: Color::AnsiValue(219),
                eel: Color::AnsiValue(149),
                border: Color::AnsiValue(37),
                title: Color::AnsiValue(122),
            },
        }
    }

    fn color(&self, style: Style) -> Color {
        match style {
            Style::Sand => self.sand,
            Style::Weed => self.weed,
            Style::Starfish => self.star,
            Style::Chest => self.chest,
            Style::Bubble => self.bubble,
            Style::Fish => self.fish,
            Style::FishGold => self.gold,
            Style::FishCoral => self.coral,
            Style::FishBlue => self.blue,
            Style::Shark => self.shark,
            Style::Crab => self.crab,
            Style::Jelly => self.jelly,
            Style::Eel => self.eel,
            Style::Border => self.border,
            Style::Title => self.title,
        }
    }
}

/// Full-screen crossterm output with a diffed double buffer.
pub struct TerminalSink {
    out: Stdout,
    theme: Theme,
    w: u16,
    h: u16,
    front: Vec<TermCell>,
    back: Vec<TermCell>,
    full_redraw: bool,
}

impl TerminalSink {
    pub fn begin(palette: PaletteName) -> Result<Self, TankError> {
        let mut out = io::stdout();
        if !out.is_terminal() {
            return Err(TankError::NoOutputSink);
        }
        let (w, h) = terminal::size()?;

        terminal::enable_raw_mode()?;
        queue!(
            out,
            EnterAlternateScreen,
            DisableLineWrap,
            cursor::Hide,
            Clear(ClearType::All)
        )?;
        out.flush()?;

        let theme = Theme::for_palette(palette);
        let n = w as usize * h as usize;
        Ok(Self {
            out,
            theme,
            w,
            h,
            front: vec![TermCell::blank(theme.bg); n],
            back: vec![TermCell::blank(theme.bg); n],
            full_redraw: true,
        })
    }

    fn resize_if_needed(&mut self) -> io::Result<()> {
        let (w, h) = terminal::size()?;
        if (w, h) == (self.w, self.h) {
            return Ok(());
        }
        self.w = w;
        self.h = h;
        let n = w as usize * h as usize;
        self.front = vec![TermCell::blank(self.theme.bg); n];
        self.back = vec![TermCell::blank(self.theme.bg); n];
        self.full_redraw = true;
        queue!(self.out, ResetColor, Clear(ClearType::All))?;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let w = self.w as usize;
        let mut last_fg = None;
        let mut last_bg = None;
        for (i, (b, f)) in self.back.iter().zip(self.front.iter_mut()).enumerate() {
            if !self.full_redraw && b == f {
                continue;
            }
            if last_bg != Some(b.bg) {
                queue!(self.out, SetBackgroundColor(b.bg))?;
                last_bg = Some(b.bg);
            }
            if last_fg != Some(b.fg) {
                queue!(self.out, SetForegroundColor(b.fg))?;
                last_fg = Some(b.fg);
            }
            let (x, y) = ((i % w) as u16, (i / w) as u16);
            queue!(self.out, cursor::MoveTo(x, y), Print(b.ch))?;
            *f = *b;
        }
        self.full_redraw = false;

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()
    }
}

impl FrameSink for TerminalSink {
    fn present(&mut self, grid: &Grid) -> io::Result<()> {
        self.resize_if_needed()?;
        let bg = self.theme.bg;
        self.back.fill(TermCell::blank(Color::Reset));

        // Center the tank; whatever does not fit is cut off.
        let (tw, th) = (self.w as usize, self.h as usize);
        let ox = tw.saturating_sub(grid.width()) / 2;
        let oy = th.saturating_sub(grid.height()) / 2;
        for (y, row) in grid.rows().enumerate() {
            let ty = oy + y;
            if ty >= th {
                break;
            }
            for (x, cell) in row.iter().enumerate() {
                let tx = ox + x;
                if tx >= tw {
                    break;
                }
                let fg = cell
                    .style
                    .map(|s| self.theme.color(s))
                    .unwrap_or(Color::Reset);
                self.back[ty * tw + tx] = TermCell { ch: cell.ch, fg, bg };
            }
        }
        self.flush()
    }
}

impl Drop for TerminalSink {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Leaves the alternate screen; safe to call more than once.
pub fn restore_terminal() {
    let mut out = io::stdout();
    let _ = queue!(
        out,
        EndSynchronizedUpdate,
        ResetColor,
        cursor::Show,
        EnableLineWrap,
        LeaveAlternateScreen
    );
    let _ = out.flush();
    let _ = terminal::disable_raw_mode();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_frames_are_separated() {
        let mut sink = WriterSink::new(Vec::new(), Format::Plain);
        let grid = Grid::new(3, 2);
        sink.present(&grid).unwrap();
        sink.present(&grid).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "   \n   \n\u{000C}\n   \n   \n");
    }

    #[test]
    fn markup_frames_are_wrapped_in_pre() {
        let mut sink = WriterSink::new(Vec::new(), Format::Markup);
        let mut grid = Grid::new(4, 3);
        grid.stamp(1, 1, 'o', Style::Bubble);
        sink.present(&grid).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.starts_with("<pre class=\"tidepool\">\n"));
        assert!(text.contains("<span class=\"bubble\">o</span>"));
        assert!(text.ends_with("</pre>\n"));
    }

    #[test]
    fn every_style_has_a_color_in_each_palette() {
        for name in [PaletteName::Classic, PaletteName::Reef] {
            let theme = Theme::for_palette(name);
            for style in Style::ALL {
                assert_ne!(theme.color(style), Color::Reset);
            }
        }
    }
}
