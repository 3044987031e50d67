use std::fmt;

use rand::Rng;

use crate::Point;
use crate::agent::Board;

/// The visible state of a single cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Hidden,
    Revealed(u8), // The u8 is the number of adjacent mines.
    Flagged,
    /// A revealed mine. The game is lost.
    Exploded,
}

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// An in-memory Minesweeper board with a fixed, hidden mine layout.
pub struct Game {
    pub width: usize,
    pub height: usize,
    /// The visible state of the board.
    pub board: Vec<Vec<Cell>>,
    pub total_mines: usize,
    mines: Vec<Vec<bool>>,
    initial_safe: Vec<Point>,
    game_state: GameState,
}

// --- Construction ---

impl Game {
    /// Creates a board with `total_mines` mines placed at random.
    ///
    /// `safe_multiplier` scales the number of safe cells handed to the player
    /// up front: round(sqrt(width * height)) * `safe_multiplier`, capped by
    /// the number of safe cells on the board.
    pub fn new(
        width: usize,
        height: usize,
        total_mines: usize,
        safe_multiplier: usize,
        rng: &mut impl Rng,
    ) -> Self {
        if total_mines >= width * height {
            panic!("Total mines must be less than the number of cells on the board.");
        }

        let mut mines = vec![vec![false; width]; height];
        let mut placed = 0;
        while placed < total_mines {
            let (x, y) = (rng.random_range(0..width), rng.random_range(0..height));
            if !mines[y][x] {
                mines[y][x] = true;
                placed += 1;
            }
        }

        let wanted = ((width * height) as f64).sqrt().round() as usize * safe_multiplier;
        let wanted = wanted.min(width * height - total_mines);
        let mut initial_safe = Vec::with_capacity(wanted);
        while initial_safe.len() < wanted {
            let at = Point {
                x: rng.random_range(0..width),
                y: rng.random_range(0..height),
            };
            if !mines[at.y][at.x] && !initial_safe.contains(&at) {
                initial_safe.push(at);
            }
        }

        Game::with_mines(mines, initial_safe)
    }

    /// Builds a board from rows of text, `*` marking a mine. No safe cells are
    /// handed out; see [`Game::with_initial_safe_cells`].
    pub fn from_layout(rows: &[&str]) -> Self {
        let mines: Vec<Vec<bool>> = rows
            .iter()
            .map(|row| row.chars().map(|c| c == '*').collect())
            .collect();
        let width = mines.first().map_or(0, Vec::len);
        if mines.iter().any(|row| row.len() != width) {
            panic!("All rows of a layout must have the same width.");
        }
        Game::with_mines(mines, Vec::new())
    }

    #[must_use]
    pub fn with_initial_safe_cells(mut self, cells: Vec<Point>) -> Self {
        self.initial_safe = cells;
        self
    }

    fn with_mines(mines: Vec<Vec<bool>>, initial_safe: Vec<Point>) -> Self {
        let height = mines.len();
        let width = mines.first().map_or(0, Vec::len);
        let total_mines = mines.iter().flatten().filter(|&&m| m).count();
        Game {
            width,
            height,
            board: vec![vec![Cell::Hidden; width]; height],
            total_mines,
            mines,
            initial_safe,
            game_state: GameState::Playing,
        }
    }
}

// --- Game rules ---

impl Game {
    pub fn state(&self) -> GameState {
        self.game_state
    }

    pub fn is_mine(&self, at: Point) -> bool {
        self.mines[at.y][at.x]
    }

    /// A revealed mine loses the game.
    pub fn has_lost(&self) -> bool {
        self.board.iter().flatten().any(|c| *c == Cell::Exploded)
    }

    /// Every cell is revealed or flagged, and every mine is flagged.
    pub fn has_won(&self) -> bool {
        if self.has_lost() || self.board.iter().flatten().any(|c| *c == Cell::Hidden) {
            return false;
        }
        let flagged_mines = self
            .points()
            .filter(|&at| self.board[at.y][at.x] == Cell::Flagged && self.is_mine(at))
            .count();
        flagged_mines == self.total_mines
    }

    fn update_state(&mut self) {
        if self.game_state != GameState::Playing {
            return;
        }
        if self.has_lost() {
            self.game_state = GameState::Lost;
        } else if self.has_won() {
            self.game_state = GameState::Won;
        }
    }

    /// Counts the mines around a point, whatever their visible state.
    fn count_adjacent_mines(&self, point: Point) -> u8 {
        self.get_neighbors(point).filter(|&n| self.is_mine(n)).count() as u8
    }

    fn points(&self) -> impl Iterator<Item = Point> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Point { x, y }))
    }

    /// A helper function to get all valid neighbor coordinates for a given point.
    /// It correctly handles board edges and corners.
    fn get_neighbors(&self, point: Point) -> impl Iterator<Item = Point> {
        let width = self.width;
        let height = self.height;

        // Define potential neighbor offsets (from -1 to 1 in both x and y)
        (-1..=1).flat_map(move |dy| {
            (-1..=1).filter_map(move |dx| {
                // Skip the center point itself (dx=0, dy=0)
                if dx == 0 && dy == 0 {
                    return None;
                }

                let nx = point.x as isize + dx;
                let ny = point.y as isize + dy;

                if nx >= 0 && nx < width as isize && ny >= 0 && ny < height as isize {
                    Some(Point {
                        x: nx as usize,
                        y: ny as usize,
                    })
                } else {
                    None
                }
            })
        })
    }
}

impl Board for Game {
    fn initial_safe_cells(&self) -> Vec<Point> {
        self.initial_safe.clone()
    }

    fn mark_safe(&mut self, at: Point) {
        if self.board[at.y][at.x] != Cell::Hidden {
            return;
        }
        self.board[at.y][at.x] = if self.is_mine(at) {
            Cell::Exploded
        } else {
            Cell::Revealed(self.count_adjacent_mines(at))
        };
        self.update_state();
    }

    fn mark_mine(&mut self, at: Point) {
        if self.board[at.y][at.x] != Cell::Hidden {
            return;
        }
        self.board[at.y][at.x] = Cell::Flagged;
        self.update_state();
    }

    fn unmarked_neighbors_and_mine_count(&self, at: Point) -> (Vec<Point>, usize) {
        let neighbors: Vec<Point> = self
            .get_neighbors(at)
            .filter(|n| self.board[n.y][n.x] == Cell::Hidden)
            .collect();
        let mines = neighbors.iter().filter(|&&n| self.is_mine(n)).count();
        (neighbors, mines)
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Print header
        write!(f, "   ")?;
        for x in 0..self.width {
            write!(f, "{:^3}", x)?;
        }
        writeln!(f, "\n  +{}", "---".repeat(self.width))?;

        for (y, row) in self.board.iter().enumerate() {
            write!(f, "{:^2}|", y)?;
            for cell in row {
                let display = match cell {
                    Cell::Hidden => " ■ ".to_string(),
                    Cell::Revealed(n) => format!(" {} ", n),
                    Cell::Flagged => " F ".to_string(),
                    Cell::Exploded => " X ".to_string(),
                };
                write!(f, "{}", display)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
