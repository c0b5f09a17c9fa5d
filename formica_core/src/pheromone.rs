//! Pheromone field: the medium ants write trails into and read them from.
//!
//! Ants only depend on the [`PheromoneField`] contract. [`PheromoneGrid`] is
//! the stock implementation: a toroidal grid of non-negative concentrations
//! with its own evaporation and diffusion step, run by the world between
//! ticks.

use crate::geometry::Vec2;

/// Concentrations below this are flushed to zero after evaporation.
const CONCENTRATION_FLOOR: f32 = 1e-4;

/// Scalar field ants deposit into and sample from.
///
/// Fields are shared read-only between ants during a tick, hence the
/// `Send + Sync` bound.
pub trait PheromoneField: Send + Sync {
    /// Accumulates `amount` at the cell under `position`.
    ///
    /// Amounts that are negative, zero or not finite are ignored, so the
    /// field can never go negative through deposits.
    fn add_concentration(&mut self, position: Vec2, amount: f64);

    /// Aggregate concentration within `radius` of `position`.
    ///
    /// Non-negative, and zero when nothing was deposited nearby.
    fn get_concentration(&self, position: Vec2, radius: f64) -> f64;

    /// Field dynamics between ticks (decay, diffusion). No-op by default.
    fn step(&mut self, _dt: f64) {}
}

/// A pending write to the field, produced by an ant during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deposit {
    /// Where the pheromone lands (the ant's tail)
    pub position: Vec2,

    /// Amount to add
    pub amount: f64,
}

impl Deposit {
    /// Writes this deposit into `field`.
    pub fn apply<F: PheromoneField + ?Sized>(&self, field: &mut F) {
        field.add_concentration(self.position, self.amount);
    }
}

/// Toroidal grid implementation of [`PheromoneField`].
///
/// The grid covers the arena `[-w/2, w/2) x [-h/2, h/2)` with `resolution`
/// cells per world unit. Cell indices wrap, so positions slightly outside
/// the arena map onto the opposite edge.
#[derive(Debug, Clone)]
pub struct PheromoneGrid {
    dimensions: Vec2,
    resolution: f64,
    cols: usize,
    rows: usize,
    evaporation_rate: f64,
    diffusion_rate: f64,

    /// Row-major concentrations, `rows * cols` long
    data: Vec<f32>,

    /// Scratch buffer reused by `diffuse`
    scratch: Vec<f32>,
}

impl PheromoneGrid {
    /// Creates an empty grid.
    ///
    /// # Arguments
    /// * `dimensions` - Arena width and height (world units, > 0)
    /// * `resolution` - Cells per world unit (> 0)
    /// * `evaporation_rate` - Exponential decay rate per second
    /// * `diffusion_rate` - Blend rate toward the neighbour mean per second
    pub fn new(dimensions: Vec2, resolution: f64, evaporation_rate: f64, diffusion_rate: f64) -> Self {
        let cols = ((dimensions.x * resolution).ceil() as usize).max(1);
        let rows = ((dimensions.y * resolution).ceil() as usize).max(1);
        Self {
            dimensions,
            resolution,
            cols,
            rows,
            evaporation_rate,
            diffusion_rate,
            data: vec![0.0; rows * cols],
            scratch: vec![0.0; rows * cols],
        }
    }

    /// Cells per world unit.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Grid shape as `[rows, cols]`.
    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.cols]
    }

    /// Row-major view of all concentrations.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Concentrations as a vector of rows.
    pub fn rows(&self) -> Vec<Vec<f32>> {
        self.data.chunks(self.cols).map(<[f32]>::to_vec).collect()
    }

    /// Concentration of a single cell.
    pub fn cell(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// Sum over the whole grid.
    pub fn total(&self) -> f64 {
        self.data.iter().map(|&c| f64::from(c)).sum()
    }

    /// Resets every cell to zero.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    /// Changes the decay and diffusion rates.
    pub fn set_rates(&mut self, evaporation_rate: f64, diffusion_rate: f64) {
        self.evaporation_rate = evaporation_rate;
        self.diffusion_rate = diffusion_rate;
    }

    /// Multiplies every cell by `exp(-evaporation_rate * dt)`.
    ///
    /// Cells that fall under the flush floor are zeroed. With a zero rate
    /// the grid is left untouched.
    pub fn evaporate(&mut self, dt: f64) {
        let factor = (-self.evaporation_rate * dt).exp() as f32;
        if !(0.0..1.0).contains(&factor) {
            return;
        }
        for cell in &mut self.data {
            *cell *= factor;
            if *cell < CONCENTRATION_FLOOR {
                *cell = 0.0;
            }
        }
    }

    /// Blends every cell toward the mean of its four toroidal neighbours.
    ///
    /// The blend weight is `min(diffusion_rate * dt, 1)`; the grid total is
    /// preserved.
    pub fn diffuse(&mut self, dt: f64) {
        let weight = (self.diffusion_rate * dt).clamp(0.0, 1.0) as f32;
        if weight == 0.0 {
            return;
        }
        let (rows, cols) = (self.rows, self.cols);
        for row in 0..rows {
            let up = (row + rows - 1) % rows;
            let down = (row + 1) % rows;
            for col in 0..cols {
                let left = (col + cols - 1) % cols;
                let right = (col + 1) % cols;
                let mean = (self.data[up * cols + col]
                    + self.data[down * cols + col]
                    + self.data[row * cols + left]
                    + self.data[row * cols + right])
                    / 4.0;
                let here = self.data[row * cols + col];
                self.scratch[row * cols + col] = (1.0 - weight) * here + weight * mean;
            }
        }
        std::mem::swap(&mut self.data, &mut self.scratch);
    }

    /// Continuous cell coordinates (column, row) of a world position, wrapped
    /// onto the grid.
    fn grid_coords(&self, position: Vec2) -> (f64, f64) {
        (
            ((position.x + self.dimensions.x / 2.0) * self.resolution).rem_euclid(self.cols as f64),
            ((position.y + self.dimensions.y / 2.0) * self.resolution).rem_euclid(self.rows as f64),
        )
    }

    /// First cell and cell count along one axis for a sampling window of
    /// `r_cells` around `g`. A window wider than the axis is centered on
    /// `home` and covers each cell once.
    fn window(g: f64, r_cells: f64, home: i64, len: usize) -> (i64, i64) {
        let lo = (g - r_cells).floor() as i64;
        let span = (g + r_cells).floor() as i64 - lo + 1;
        let len = len as i64;
        if span >= len {
            (home - len / 2, len)
        } else {
            (lo, span)
        }
    }

    fn wrap_index(index: i64, len: usize) -> usize {
        index.rem_euclid(len as i64) as usize
    }

    /// Flat index of the cell under `position`, or `None` for non-finite input.
    fn cell_index(&self, position: Vec2) -> Option<usize> {
        if !position.x.is_finite() || !position.y.is_finite() {
            return None;
        }
        let (gx, gy) = self.grid_coords(position);
        let col = Self::wrap_index(gx.floor() as i64, self.cols);
        let row = Self::wrap_index(gy.floor() as i64, self.rows);
        Some(row * self.cols + col)
    }
}

impl PheromoneField for PheromoneGrid {
    fn add_concentration(&mut self, position: Vec2, amount: f64) {
        if !(amount.is_finite() && amount > 0.0) {
            return;
        }
        if let Some(index) = self.cell_index(position) {
            self.data[index] += amount as f32;
        }
    }

    /// Diffusion, then evaporation.
    fn step(&mut self, dt: f64) {
        self.diffuse(dt);
        self.evaporate(dt);
    }

    /// Mean over the cells whose centers lie within `radius`; the cell under
    /// `position` always counts.
    fn get_concentration(&self, position: Vec2, radius: f64) -> f64 {
        if !position.x.is_finite() || !position.y.is_finite() {
            return 0.0;
        }
        let radius = if radius.is_finite() && radius > 0.0 { radius } else { 0.0 };
        let (gx, gy) = self.grid_coords(position);
        // Beyond the grid perimeter every cell is in range.
        let r_cells = (radius * self.resolution).min(2.0 * (self.cols + self.rows) as f64);
        let r_cells_sq = r_cells * r_cells;

        let home_col = gx.floor() as i64;
        let home_row = gy.floor() as i64;
        let (col_lo, col_span) = Self::window(gx, r_cells, home_col, self.cols);
        let (row_lo, row_span) = Self::window(gy, r_cells, home_row, self.rows);

        let mut sum = 0.0f64;
        let mut count = 0usize;
        for row in row_lo..row_lo + row_span {
            for col in col_lo..col_lo + col_span {
                let dx = col as f64 + 0.5 - gx;
                let dy = row as f64 + 0.5 - gy;
                let is_home = row == home_row && col == home_col;
                if is_home || dx * dx + dy * dy <= r_cells_sq {
                    let index = Self::wrap_index(row, self.rows) * self.cols
                        + Self::wrap_index(col, self.cols);
                    sum += f64::from(self.data[index]);
                    count += 1;
                }
            }
        }

        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }
}
