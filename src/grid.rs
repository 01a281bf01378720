use crate::error::MazeError;
use crate::{MAZE_HEIGHT, MAZE_WIDTH};

/// A cell coordinate. Row 0 is the top of the maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    /// Neighbor order used when the search expands a frontier cell.
    pub const SEARCH_ORDER: [Dir; 4] = [Dir::Down, Dir::Right, Dir::Up, Dir::Left];

    fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (-1, 0),
            Dir::Down => (1, 0),
            Dir::Left => (0, -1),
            Dir::Right => (0, 1),
        }
    }
}

/// Walls owned by a cell. The bottom and right edges belong to the
/// neighbors below and to the right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Walls {
    pub top: bool,
    pub left: bool,
}

impl Walls {
    pub const OPEN: Walls = Walls {
        top: false,
        left: false,
    };
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum CellState {
    #[default]
    Empty,
    Start,
    /// Reached by the search. `next` is one step closer to the entry and
    /// `weight` is the brightness in `[0, 1]`.
    Path { weight: f32, next: Pos },
    /// On the discharge route.
    Strike { next: Pos },
    Flash,
}

impl CellState {
    pub fn weight(&self) -> Option<f32> {
        match *self {
            CellState::Path { weight, .. } => Some(weight),
            _ => None,
        }
    }

    pub fn next(&self) -> Option<Pos> {
        match *self {
            CellState::Path { next, .. } | CellState::Strike { next } => Some(next),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub walls: Walls,
    pub state: CellState,
}

/// Dimensions, entry point and wall density of a maze.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: usize,
    pub height: usize,
    pub entry: Pos,
    /// Probability that a cell gets a top wall. Wide grids favor horizontal
    /// walls and tall grids favor vertical ones.
    pub p_top: f64,
}

impl Layout {
    pub fn new(width: usize, height: usize) -> Result<Self, MazeError> {
        if width == 0 {
            return Err(MazeError::InvalidLayout("width must be at least 1"));
        }
        if height < 2 {
            return Err(MazeError::InvalidLayout("height must be at least 2"));
        }
        Ok(Self::derive(width, height))
    }

    fn derive(width: usize, height: usize) -> Self {
        let w = (width as f64).sqrt();
        let h = (height as f64).sqrt();
        Self {
            width,
            height,
            entry: Pos::new(0, width / 2),
            p_top: w / (w + h),
        }
    }

    pub fn bottom_row(&self) -> usize {
        self.height - 1
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::derive(MAZE_WIDTH, MAZE_HEIGHT)
    }
}

/// Row-major grid of cells. Wall geometry is fixed at construction; only
/// cell state changes afterwards.
#[derive(Debug, Clone)]
pub struct Grid {
    layout: Layout,
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds a grid with the walls returned by `walls_at`, reset so that
    /// only the entry cell is marked.
    pub fn from_fn(layout: Layout, mut walls_at: impl FnMut(Pos) -> Walls) -> Self {
        let mut walls = Vec::with_capacity(layout.width * layout.height);
        for row in 0..layout.height {
            for col in 0..layout.width {
                walls.push(walls_at(Pos::new(row, col)));
            }
        }
        Self::from_walls(layout, walls)
    }

    pub(crate) fn from_walls(layout: Layout, walls: Vec<Walls>) -> Self {
        debug_assert_eq!(walls.len(), layout.width * layout.height);
        let cells = walls
            .into_iter()
            .map(|walls| Cell {
                walls,
                state: CellState::Empty,
            })
            .collect();
        let mut grid = Self { layout, cells };
        grid.reset();
        grid
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// `(width, height)` in cells.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.layout.width, self.layout.height)
    }

    pub fn height(&self) -> usize {
        self.layout.height
    }

    pub fn entry(&self) -> Pos {
        self.layout.entry
    }

    fn index(&self, pos: Pos) -> usize {
        debug_assert!(pos.row < self.layout.height && pos.col < self.layout.width);
        pos.row * self.layout.width + pos.col
    }

    /// Panics when `(row, col)` lies outside the grid.
    pub fn cell_at(&self, row: usize, col: usize) -> &Cell {
        assert!(
            row < self.layout.height && col < self.layout.width,
            "cell ({row}, {col}) outside {}x{} grid",
            self.layout.width,
            self.layout.height
        );
        &self.cells[row * self.layout.width + col]
    }

    pub fn get(&self, pos: Pos) -> Option<&Cell> {
        if pos.row < self.layout.height && pos.col < self.layout.width {
            Some(&self.cells[self.index(pos)])
        } else {
            None
        }
    }

    pub fn state(&self, pos: Pos) -> CellState {
        self.cells[self.index(pos)].state
    }

    pub fn walls(&self, pos: Pos) -> Walls {
        self.cells[self.index(pos)].walls
    }

    pub(crate) fn set_state(&mut self, pos: Pos, state: CellState) {
        let idx = self.index(pos);
        self.cells[idx].state = state;
    }

    /// The in-bounds neighbor of `pos` in direction `dir`.
    pub fn neighbor(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let (dr, dc) = dir.delta();
        let row = pos.row.checked_add_signed(dr)?;
        let col = pos.col.checked_add_signed(dc)?;
        if row >= self.layout.height || col >= self.layout.width {
            return None;
        }
        Some(Pos::new(row, col))
    }

    /// Whether the edge between `pos` and its neighbor in `dir` is open.
    /// Moving down or right reads the neighbor's walls; moving up or left
    /// reads the walls of `pos` itself.
    pub fn can_move(&self, pos: Pos, dir: Dir) -> bool {
        let Some(next) = self.neighbor(pos, dir) else {
            return false;
        };
        match dir {
            Dir::Down => !self.walls(next).top,
            Dir::Right => !self.walls(next).left,
            Dir::Up => !self.walls(pos).top,
            Dir::Left => !self.walls(pos).left,
        }
    }

    /// Clears every cell back to `Empty` and marks the entry as `Start`.
    /// Walls are untouched.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.state = CellState::Empty;
        }
        let entry = self.layout.entry;
        self.set_state(entry, CellState::Start);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pos, &Cell)> + '_ {
        let width = self.layout.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, cell)| (Pos::new(idx / width, idx % width), cell))
    }

    /// Number of cells whose state satisfies `pred`.
    pub fn count(&self, pred: impl Fn(&CellState) -> bool) -> usize {
        self.cells.iter().filter(|cell| pred(&cell.state)).count()
    }
}
