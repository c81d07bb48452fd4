use rayon::prelude::*;

use crate::{
    core::Extent,
    error::{FluxelError, FluxelResult},
    pool::SurfacePool,
};

/// One cell of the jump-flood buffer.
///
/// Invalid cells carry an infinite sentinel distance, but validity is always
/// checked explicitly; no comparison relies on the sentinel's magnitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistCell {
    pub seed_x: f32,
    pub seed_y: f32,
    pub dist: f32,
    pub valid: bool,
}

impl Default for DistCell {
    fn default() -> Self {
        Self {
            seed_x: 0.0,
            seed_y: 0.0,
            dist: f32::INFINITY,
            valid: false,
        }
    }
}

/// Per-pixel nearest-seed distance and outward flow direction.
#[derive(Clone, Debug)]
pub struct DistanceField {
    extent: Extent,
    cells: Vec<DistCell>,
    flow: Vec<[f32; 2]>,
    max_dist: f32,
}

impl DistanceField {
    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn cell(&self, x: u32, y: u32) -> DistCell {
        self.cells[self.index(x, y)]
    }

    pub fn distance(&self, x: u32, y: u32) -> f32 {
        self.cells[self.index(x, y)].dist
    }

    /// Unit direction pointing away from the nearest seed; zero for seeds
    /// themselves and for cells no seed reached.
    pub fn flow(&self, x: u32, y: u32) -> [f32; 2] {
        self.flow[self.index(x, y)]
    }

    /// Largest valid recorded distance; 0 when nothing propagated.
    pub fn max_distance(&self) -> f32 {
        self.max_dist
    }

    /// Distance scaled into `[0,1]` against the field maximum.
    pub fn normalized_distance(&self, x: u32, y: u32) -> f32 {
        let cell = self.cells[self.index(x, y)];
        if !cell.valid || self.max_dist <= 0.0 {
            return 0.0;
        }
        (cell.dist / self.max_dist).clamp(0.0, 1.0)
    }

    /// Hand the cell storage back to a pool for the next frame.
    pub fn recycle(self, pool: &mut SurfacePool<DistCell>) -> FluxelResult<()> {
        pool.release(self.extent, self.cells)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.extent.width && y < self.extent.height);
        (y as usize) * (self.extent.width as usize) + (x as usize)
    }
}

/// Build a distance field from the alpha channel of a premultiplied RGBA8
/// buffer, allocating scratch targets internally.
pub fn generate_distance_field(
    src: &[u8],
    extent: Extent,
    threshold: f32,
) -> FluxelResult<DistanceField> {
    let mut pool = SurfacePool::new();
    generate_distance_field_pooled(src, extent, threshold, &mut pool)
}

/// Jump-flood distance field generation over pooled ping-pong buffers.
///
/// Seed pass, then `ceil(log2(max(w,h)))` propagation passes with step sizes
/// halving from `next_power_of_two(max(w,h)) / 2` down to 1, then the flow
/// derivation pass. Each propagation pass reads the previous buffer in full
/// and writes a fresh one; mutating in place would corrupt neighbor reads.
///
/// Jump flooding is exact for a single seed cluster and for well-separated
/// seeds; with dense adversarial seeds it can record a slightly farther seed.
/// That is a property of the algorithm, not a defect.
#[tracing::instrument(skip(src, pool), fields(w = extent.width, h = extent.height))]
pub fn generate_distance_field_pooled(
    src: &[u8],
    extent: Extent,
    threshold: f32,
    pool: &mut SurfacePool<DistCell>,
) -> FluxelResult<DistanceField> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(FluxelError::validation(
            "distance field threshold must be within [0, 1]",
        ));
    }
    if src.len() != extent.rgba8_len()? {
        return Err(FluxelError::evaluation(
            "distance field source must match width*height*4",
        ));
    }

    let w = extent.width as usize;
    let h = extent.height as usize;

    let mut front = pool.acquire(extent);
    let mut back = pool.acquire(extent);

    seed_pass(src, &mut front, w, threshold);

    let mut step = extent.max_dim().next_power_of_two() / 2;
    while step >= 1 {
        propagate_pass(&front, &mut back, w, h, step as i64);
        std::mem::swap(&mut front, &mut back);
        step /= 2;
    }
    pool.release(extent, back)?;

    let flow = derive_flow(&front, w);
    let max_dist = front
        .iter()
        .filter(|c| c.valid && c.dist.is_finite())
        .fold(0.0f32, |acc, c| acc.max(c.dist));

    Ok(DistanceField {
        extent,
        cells: front,
        flow,
        max_dist,
    })
}

fn seed_pass(src: &[u8], out: &mut [DistCell], w: usize, threshold: f32) {
    out.par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                let alpha = f32::from(src[(y * w + x) * 4 + 3]) / 255.0;
                *cell = if alpha > threshold {
                    DistCell {
                        seed_x: x as f32,
                        seed_y: y as f32,
                        dist: 0.0,
                        valid: true,
                    }
                } else {
                    DistCell::default()
                };
            }
        });
}

fn propagate_pass(prev: &[DistCell], out: &mut [DistCell], w: usize, h: usize, step: i64) {
    out.par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, slot) in row.iter_mut().enumerate() {
                let own_x = x as f32;
                let own_y = y as f32;
                let mut best = prev[y * w + x];

                for dy in [-step, 0, step] {
                    for dx in [-step, 0, step] {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = x as i64 + dx;
                        let ny = y as i64 + dy;
                        if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                            continue;
                        }
                        let cand = prev[(ny as usize) * w + nx as usize];
                        if !cand.valid {
                            continue;
                        }
                        // Distance of the candidate's seed to *this* pixel,
                        // not to the neighbor that recorded it.
                        let d = (cand.seed_x - own_x).hypot(cand.seed_y - own_y);
                        if !best.valid || d < best.dist {
                            best = DistCell {
                                seed_x: cand.seed_x,
                                seed_y: cand.seed_y,
                                dist: d,
                                valid: true,
                            };
                        }
                    }
                }

                *slot = best;
            }
        });
}

fn derive_flow(cells: &[DistCell], w: usize) -> Vec<[f32; 2]> {
    cells
        .par_iter()
        .enumerate()
        .map(|(idx, cell)| {
            if !cell.valid {
                return [0.0, 0.0];
            }
            let own_x = (idx % w) as f32;
            let own_y = (idx / w) as f32;
            let dx = own_x - cell.seed_x;
            let dy = own_y - cell.seed_y;
            let len = dx.hypot(dy);
            if len <= 0.0 {
                // The pixel is its own seed: degenerate zero-length direction.
                return [0.0, 0.0];
            }
            [dx / len, dy / len]
        })
        .collect()
}
