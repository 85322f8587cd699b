use crate::tank::Tank;

/// Style tag carried by a cell. Blank water has none.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Style {
    Sand,
    Weed,
    Starfish,
    Chest,
    Bubble,
    Fish,
    FishGold,
    FishCoral,
    FishBlue,
    Shark,
    Crab,
    Jelly,
    Eel,
    Border,
    Title,
}

impl Style {
    pub const ALL: [Style; 15] = [
        Style::Sand,
        Style::Weed,
        Style::Starfish,
        Style::Chest,
        Style::Bubble,
        Style::Fish,
        Style::FishGold,
        Style::FishCoral,
        Style::FishBlue,
        Style::Shark,
        Style::Crab,
        Style::Jelly,
        Style::Eel,
        Style::Border,
        Style::Title,
    ];

    pub fn class(self) -> &'static str {
        match self {
            Style::Sand => "sand",
            Style::Weed => "weed",
            Style::Starfish => "star",
            Style::Chest => "chest",
            Style::Bubble => "bubble",
            Style::Fish => "fish",
            Style::FishGold => "fish-gold",
            Style::FishCoral => "fish-coral",
            Style::FishBlue => "fish-blue",
            Style::Shark => "shark",
            Style::Crab => "crab",
            Style::Jelly => "jelly",
            Style::Eel => "eel",
            Style::Border => "border",
            Style::Title => "title",
        }
    }

    pub fn from_class(class: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.class() == class)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Option<Style>,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        style: None,
    };

    pub fn new(ch: char, style: Style) -> Self {
        Self {
            ch,
            style: Some(style),
        }
    }
}

/// One frame of character cells. Built fresh for every frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y * self.width + x])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1))
    }

    // Unclipped write, reserved for the frame itself.
    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    /// Writes one cell if it lands inside the border; anything else is dropped.
    pub fn stamp(&mut self, x: i32, y: i32, ch: char, style: Style) {
        if x < 1 || y < 1 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x + 1 >= self.width || y + 1 >= self.height {
            return;
        }
        self.cells[y * self.width + x] = Cell::new(ch, style);
    }

    /// Stamps a glyph left to right. Spaces inside a glyph are transparent.
    pub fn stamp_str(&mut self, x: i32, y: i32, glyph: &str, style: Style) {
        for (i, ch) in glyph.chars().enumerate() {
            if ch != ' ' {
                self.stamp(x + i as i32, y, ch, style);
            }
        }
    }
}

const SAND: [char; 8] = ['.', ',', '_', '.', '`', '_', ',', '.'];

/// Composites the whole tank, floor first, border last.
pub fn rasterize(tank: &Tank) -> Grid {
    let geom = tank.geometry();
    let tick = tank.tick();
    let mut grid = Grid::new(geom.width, geom.height);

    let floor = geom.height as i32 - 2;
    for x in 1..geom.width as i32 - 1 {
        let ch = SAND[(x as usize * 7 + x as usize / 3) % SAND.len()];
        grid.stamp(x, floor, ch, Style::Sand);
    }

    for weed in tank.weeds() {
        weed.stamp(&mut grid, tick, floor - 1);
    }
    for star in tank.starfish() {
        star.stamp(&mut grid, floor);
    }
    tank.chest().stamp(&mut grid, floor);
    for bubble in tank.bubbles() {
        bubble.stamp(&mut grid);
    }
    for creature in tank.creatures() {
        creature.stamp(&mut grid, tick);
    }

    frame(&mut grid, &tank.config().title);
    grid
}

fn frame(grid: &mut Grid, title: &str) {
    let (w, h) = (grid.width, grid.height);
    if w < 2 || h < 2 {
        return;
    }
    let border = |ch| Cell::new(ch, Style::Border);
    for x in 0..w {
        grid.set(x, 0, border('-'));
        grid.set(x, h - 1, border('-'));
    }
    for y in 0..h {
        grid.set(0, y, border('|'));
        grid.set(w - 1, y, border('|'));
    }
    for (x, y) in [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)] {
        grid.set(x, y, border('+'));
    }

    let caption: Vec<char> = title
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .take(w.saturating_sub(2))
        .collect();
    let start = ((w - caption.len()) / 2).max(1);
    for (i, ch) in caption.into_iter().enumerate() {
        grid.set(start + i, 0, Cell::new(ch, Style::Title));
    }
}
