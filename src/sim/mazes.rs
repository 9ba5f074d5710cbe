//! Maze layouts for the chase game
//!
//! `#` wall, `.` pellet, space empty, `P` player start, `G` ghost start.
//! Rows whose outer columns are open wrap horizontally (tunnels).

use serde::{Deserialize, Serialize};

pub const MAZE_COLS: usize = 19;
pub const MAZE_ROWS: usize = 21;

#[rustfmt::skip]
const CLASSIC: [&str; MAZE_ROWS] = [
    "###################",
    "#........#........#",
    "#.##.###.#.###.##.#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#...#...#....#",
    "####.### # ###.####",
    "####.#       #.####",
    "####.# ##G## #.####",
    "    .  #GGG#  .    ",
    "####.# ##### #.####",
    "####.#       #.####",
    "####.# ##### #.####",
    "#........#........#",
    "#.##.###.#.###.##.#",
    "#..#.....P.....#..#",
    "##.#.#.#####.#.#.##",
    "#....#...#...#....#",
    "#.######.#.######.#",
    "#.................#",
    "###################",
];

#[rustfmt::skip]
const GALLERY: [&str; MAZE_ROWS] = [
    "###################",
    "#........#........#",
    "#.##.###.#.###.##.#",
    "#.##.###.#.###.##.#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#.......#....#",
    "####.#.##G##.#.####",
    "    . .#GGG#. .    ",
    "####.#.#####.#.####",
    "####.#.......#.####",
    "####.#.#####.#.####",
    "#........#........#",
    "#.###.##.#.##.###.#",
    "#...#....P....#...#",
    "###.#.#.###.#.#.###",
    "#.....#..#..#.....#",
    "#.###.##.#.##.###.#",
    "#.#.............#.#",
    "#...#.#######.#...#",
    "###################",
];

/// Generic fallback for every course past the second
#[rustfmt::skip]
const SPINE: [&str; MAZE_ROWS] = [
    "###################",
    "#.................#",
    "#.#.###.###.###.#.#",
    "#.#.#.........#.#.#",
    "#...#.###.###.#...#",
    "###.#.........#.###",
    "#...###.#G#.###...#",
    "#.#.....#G#.....#.#",
    "#.#.###.#G#.###.#.#",
    " ...#....G....#... ",
    "#.#.#.#######.#.#.#",
    "#.#.............#.#",
    "#.###.###.###.###.#",
    "#.................#",
    "#.#.###.#.#.###.#.#",
    "#.#.....#P#.....#.#",
    "#.#####.#.#.#####.#",
    "#.......#.#.......#",
    "#.###.#######.###.#",
    "#.................#",
    "###################",
];

pub const MAZES: [&[&str; MAZE_ROWS]; 3] = [&CLASSIC, &GALLERY, &SPINE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Wall,
    Pellet,
    Empty,
}

/// Parsed maze grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeLayout {
    pub cols: usize,
    pub rows: usize,
    tiles: Vec<Tile>,
    pub player_start: (usize, usize),
    pub ghost_starts: Vec<(usize, usize)>,
}

impl MazeLayout {
    /// Layout for a maze index; out of range indices use the last maze
    pub fn load(index: usize) -> Self {
        let rows = MAZES[index.min(MAZES.len() - 1)];
        Self::parse(rows)
    }

    pub fn parse(lines: &[&str]) -> Self {
        let rows = lines.len();
        let cols = lines.iter().map(|l| l.len()).max().unwrap_or(0);
        let mut tiles = vec![Tile::Wall; cols * rows];
        let mut player_start = (1, 1);
        let mut ghost_starts = Vec::new();

        for (row, line) in lines.iter().enumerate() {
            for (col, ch) in line.bytes().enumerate() {
                tiles[row * cols + col] = match ch {
                    b'#' => Tile::Wall,
                    b'.' => Tile::Pellet,
                    b'P' => {
                        player_start = (col, row);
                        Tile::Empty
                    }
                    b'G' => {
                        ghost_starts.push((col, row));
                        Tile::Empty
                    }
                    _ => Tile::Empty,
                };
            }
        }

        Self {
            cols,
            rows,
            tiles,
            player_start,
            ghost_starts,
        }
    }

    /// Tile at a signed coordinate. Columns wrap (tunnels), rows outside the
    /// grid read as wall.
    pub fn tile(&self, col: i32, row: i32) -> Tile {
        if row < 0 || row as usize >= self.rows || self.cols == 0 {
            return Tile::Wall;
        }
        let col = col.rem_euclid(self.cols as i32) as usize;
        self.tiles[row as usize * self.cols + col]
    }

    #[inline]
    pub fn is_wall(&self, col: i32, row: i32) -> bool {
        self.tile(col, row) == Tile::Wall
    }

    /// Eat the pellet at a tile; returns true if there was one
    pub fn eat(&mut self, col: i32, row: i32) -> bool {
        if row < 0 || row as usize >= self.rows || self.cols == 0 {
            return false;
        }
        let col = col.rem_euclid(self.cols as i32) as usize;
        let idx = row as usize * self.cols + col;
        if self.tiles[idx] == Tile::Pellet {
            self.tiles[idx] = Tile::Empty;
            true
        } else {
            false
        }
    }

    pub fn pellets_left(&self) -> usize {
        self.tiles.iter().filter(|t| **t == Tile::Pellet).count()
    }

    /// Open neighbours of a tile, used for junction detection
    pub fn exits(&self, col: i32, row: i32) -> usize {
        [(1, 0), (-1, 0), (0, 1), (0, -1)]
            .iter()
            .filter(|(dc, dr)| !self.is_wall(col + dc, row + dr))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashSet, VecDeque};

    #[test]
    fn test_all_mazes_have_expected_shape() {
        for (i, maze) in MAZES.iter().enumerate() {
            assert!(maze.iter().all(|row| row.len() == MAZE_COLS), "maze {i} width");
            let layout = MazeLayout::load(i);
            assert_eq!((layout.cols, layout.rows), (MAZE_COLS, MAZE_ROWS));
            assert!(!layout.ghost_starts.is_empty());
            assert!(layout.pellets_left() > 100);
            let (pc, pr) = layout.player_start;
            assert_eq!(layout.tile(pc as i32, pr as i32), Tile::Empty);
        }
    }

    #[test]
    fn test_every_pellet_reachable() {
        for i in 0..MAZES.len() {
            let layout = MazeLayout::load(i);
            let start = (layout.player_start.0 as i32, layout.player_start.1 as i32);
            let mut seen = HashSet::from([start]);
            let mut queue = VecDeque::from([start]);
            while let Some((c, r)) = queue.pop_front() {
                for (dc, dr) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                    let next = ((c + dc).rem_euclid(MAZE_COLS as i32), r + dr);
                    if !layout.is_wall(next.0, next.1) && seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
            for row in 0..MAZE_ROWS as i32 {
                for col in 0..MAZE_COLS as i32 {
                    if layout.tile(col, row) == Tile::Pellet {
                        assert!(seen.contains(&(col, row)), "maze {i} pellet at {col},{row}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_tunnel_wraps_and_rows_clamp() {
        let layout = MazeLayout::load(0);
        // Row 9 is open at both edges
        assert!(!layout.is_wall(-1, 9));
        assert!(!layout.is_wall(MAZE_COLS as i32, 9));
        assert!(layout.is_wall(3, -1));
        assert!(layout.is_wall(3, MAZE_ROWS as i32));
    }

    #[test]
    fn test_exits_count_open_neighbours() {
        let layout = MazeLayout::load(0);
        // Corner, crossroads, tunnel mouth (wraps to the far column)
        assert_eq!(layout.exits(1, 1), 2);
        assert_eq!(layout.exits(4, 3), 4);
        assert_eq!(layout.exits(0, 9), 2);
    }

    #[test]
    fn test_eat_pellet_once() {
        let mut layout = MazeLayout::load(0);
        let before = layout.pellets_left();
        assert!(layout.eat(1, 1));
        assert!(!layout.eat(1, 1));
        assert!(!layout.eat(0, 0));
        assert_eq!(layout.pellets_left(), before - 1);
    }

    #[test]
    fn test_out_of_range_index_falls_back() {
        assert_eq!(MazeLayout::load(99), MazeLayout::load(MAZES.len() - 1));
    }
}
