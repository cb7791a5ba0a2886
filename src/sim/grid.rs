//! Grid model: tiles, atoms and critical masses
//!
//! Tiles are stored column-major (x outer, y inner), the same order the
//! KSF save format walks them.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use super::player::PlayerId;
use crate::consts::*;

/// Neighbor offsets in their fixed priority order: down, up, right, left.
///
/// Both the chain-reaction criticality scan and explosion overflow
/// distribution walk neighbors in this order.
pub const NEIGHBOR_ORDER: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Grid construction failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid size is above maximum ({cells} > {max} tiles)")]
    TooLarge { cells: usize, max: usize },
    #[error("grid must be at least 1x1 (got {width}x{height})")]
    Empty { width: usize, height: usize },
}

/// Integer tile coordinate; may point outside the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// A single visible atom, animated from `pos` toward `target` (tile-relative pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Atom {
    pub pos: Vec2,
    pub target: Vec2,
}

impl Atom {
    fn resting(x: f32, y: f32) -> Self {
        let p = Vec2::new(x, y);
        Self { pos: p, target: p }
    }

    fn moving(from: Vec2, to: Vec2) -> Self {
        Self {
            pos: from,
            target: to,
        }
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.pos != self.target
    }

    /// Move toward the target by at most `max_step` per axis
    fn step(&mut self, max_step: f32) {
        let delta = (self.target - self.pos).clamp(Vec2::splat(-max_step), Vec2::splat(max_step));
        self.pos += delta;
    }
}

fn jitter_coord(rng: &mut impl Rng) -> f32 {
    rng.random_range(ATOM_JITTER_MIN..=ATOM_JITTER_MAX) as f32
}

/// One grid cell
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    owner: Option<PlayerId>,
    atom_count: u32,
    /// Positions of the first `MAX_VISIBLE_ATOMS` atoms
    atoms: Vec<Atom>,
    explode_timer: f32,
    critical_mass: u32,
}

impl Tile {
    fn new(critical_mass: u32) -> Self {
        Self {
            owner: None,
            atom_count: 0,
            atoms: Vec::with_capacity(MAX_VISIBLE_ATOMS),
            explode_timer: 0.0,
            critical_mass,
        }
    }

    /// Owner, `None` exactly when the tile holds no atoms
    #[inline]
    pub fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    #[inline]
    pub fn atom_count(&self) -> u32 {
        self.atom_count
    }

    #[inline]
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    #[inline]
    pub fn explode_timer(&self) -> f32 {
        self.explode_timer
    }

    #[inline]
    pub fn critical_mass(&self) -> u32 {
        self.critical_mass
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.atom_count == 0
    }

    /// Mid-explosion tiles are skipped by tallies and animation
    #[inline]
    pub fn is_exploding(&self) -> bool {
        self.explode_timer > 0.0
    }

    /// Owned and at or above critical mass
    #[inline]
    pub fn is_critical(&self) -> bool {
        self.owner.is_some() && self.atom_count >= self.critical_mass
    }

    /// Add `count` atoms for `owner`, animating new atoms into their slots.
    ///
    /// Returns true if an existing atom was sent to a new slot.
    pub(crate) fn add_atoms(&mut self, owner: PlayerId, count: u32, rng: &mut impl Rng) -> bool {
        let mid = Vec2::splat(ATOM_MID_POS);
        let mut animating = false;
        self.owner = Some(owner);
        for _ in 0..count {
            if self.atoms.len() >= MAX_VISIBLE_ATOMS {
                self.atom_count += 1;
                continue;
            }
            match self.atoms.len() {
                0 => self.atoms.push(Atom::resting(ATOM_MID_POS, ATOM_MID_POS)),
                1 => {
                    self.atoms[0].target.x = ATOM_END_POS;
                    self.atoms
                        .push(Atom::moving(mid, Vec2::new(ATOM_START_POS, ATOM_MID_POS)));
                    animating = true;
                }
                2 => {
                    self.atoms[0].target.y = ATOM_START_POS;
                    self.atoms[1].target.y = ATOM_START_POS;
                    self.atoms
                        .push(Atom::moving(mid, Vec2::new(ATOM_MID_POS, ATOM_END_POS)));
                    animating = true;
                }
                3 => {
                    self.atoms[2].target.x = ATOM_START_POS;
                    self.atoms.push(Atom::moving(
                        Vec2::new(ATOM_MID_POS, ATOM_END_POS),
                        Vec2::splat(ATOM_END_POS),
                    ));
                    animating = true;
                }
                _ => {
                    let target = Vec2::new(jitter_coord(rng), jitter_coord(rng));
                    self.atoms.push(Atom::moving(mid, target));
                }
            }
            self.atom_count += 1;
        }
        animating
    }

    /// Overwrite the tile without animation. `owner` must be set when `count > 0`.
    pub(crate) fn set_direct(&mut self, owner: Option<PlayerId>, count: u32, rng: &mut impl Rng) {
        const S: f32 = ATOM_START_POS;
        const M: f32 = ATOM_MID_POS;
        const E: f32 = ATOM_END_POS;

        self.explode_timer = 0.0;
        self.atom_count = count;
        self.owner = if count == 0 { None } else { owner };
        self.atoms.clear();
        let fixed: &[(f32, f32)] = match count {
            0 => &[],
            1 => &[(M, M)],
            2 => &[(S, M), (E, M)],
            3 => &[(S, S), (E, S), (M, E)],
            _ => &[(S, E), (E, E), (S, S), (E, S)],
        };
        self.atoms
            .extend(fixed.iter().map(|&(x, y)| Atom::resting(x, y)));
        let visible = (count as usize).min(MAX_VISIBLE_ATOMS);
        while self.atoms.len() < visible {
            let (x, y) = (jitter_coord(rng), jitter_coord(rng));
            self.atoms.push(Atom::resting(x, y));
        }
    }

    /// Remove every atom; the explosion timer is left alone
    pub(crate) fn clear_atoms(&mut self) {
        self.owner = None;
        self.atom_count = 0;
        self.atoms.clear();
    }

    pub(crate) fn reset(&mut self) {
        self.clear_atoms();
        self.explode_timer = 0.0;
    }

    pub(crate) fn start_explosion(&mut self, duration: f32) {
        self.explode_timer = duration;
    }

    /// Count the explosion timer down; returns true while it is still running
    pub(crate) fn tick_explosion(&mut self, dt: f32) -> bool {
        self.explode_timer -= dt;
        if self.explode_timer <= 0.0 {
            self.explode_timer = 0.0;
            false
        } else {
            true
        }
    }

    /// Advance atom animation; returns true if any atom was still moving
    pub(crate) fn step_atoms(&mut self, max_step: f32) -> bool {
        let mut moved = false;
        for atom in self.atoms.iter_mut().filter(|a| a.is_moving()) {
            atom.step(max_step);
            moved = true;
        }
        moved
    }
}

/// Critical mass for a tile: 4 minus one per grid border the tile touches
pub fn critical_mass_at(x: usize, y: usize, width: usize, height: usize) -> u32 {
    let mut mass = BASE_CRITICAL_MASS;
    if x == 0 || x == width - 1 {
        mass -= 1;
    }
    if y == 0 || y == height - 1 {
        mass -= 1;
    }
    mass
}

/// Fixed-size tile grid for one session
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Allocate an empty grid and compute every tile's critical mass
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty { width, height });
        }
        let cells = width * height;
        if cells > MAX_GRID_CELLS {
            return Err(GridError::TooLarge {
                cells,
                max: MAX_GRID_CELLS,
            });
        }
        let tiles = (0..width)
            .flat_map(|x| (0..height).map(move |y| Tile::new(critical_mass_at(x, y, width, height))))
            .collect();
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.x as usize * self.height + pos.y as usize)
    }

    pub fn tile(&self, pos: TilePos) -> Option<&Tile> {
        self.index(pos).map(|i| &self.tiles[i])
    }

    pub(crate) fn tile_mut(&mut self, pos: TilePos) -> Option<&mut Tile> {
        self.index(pos).map(move |i| &mut self.tiles[i])
    }

    /// Every position in storage order (x outer, y inner)
    pub fn positions(&self) -> impl Iterator<Item = TilePos> + use<> {
        let (w, h) = (self.width as i32, self.height as i32);
        (0..w).flat_map(move |x| (0..h).map(move |y| TilePos::new(x, y)))
    }

    /// Tiles with their positions in storage order
    pub fn tiles(&self) -> impl Iterator<Item = (TilePos, &Tile)> {
        self.positions().zip(self.tiles.iter())
    }

    pub(crate) fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    /// In-bounds neighbors in [`NEIGHBOR_ORDER`]
    pub fn neighbors(&self, pos: TilePos) -> impl Iterator<Item = TilePos> + '_ {
        NEIGHBOR_ORDER
            .into_iter()
            .map(move |(dx, dy)| pos.offset(dx, dy))
            .filter(|n| self.contains(*n))
    }

    /// Sum of atoms over all tiles
    pub fn total_atoms(&self) -> u64 {
        self.tiles.iter().map(|t| u64::from(t.atom_count)).sum()
    }

    pub(crate) fn clear(&mut self) {
        for tile in &mut self.tiles {
            tile.reset();
        }
    }
}
