use std::collections::HashMap;

use crate::{
    core::Extent,
    error::{FluxelError, FluxelResult},
};

/// Explicit arena of same-size scratch buffers, keyed by `(width, height)`.
///
/// Multi-pass pipelines check a target out, write it, and return it for the
/// next frame instead of reallocating. Nothing is collected implicitly; the
/// pool lives as long as its owner wants the buffers to.
#[derive(Debug)]
pub struct SurfacePool<T> {
    free: HashMap<(u32, u32), Vec<Vec<T>>>,
}

impl<T> Default for SurfacePool<T> {
    fn default() -> Self {
        Self {
            free: HashMap::new(),
        }
    }
}

impl<T> SurfacePool<T>
where
    T: Clone + Default,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Check out a zeroed buffer covering `extent`, reusing a returned one
    /// of the same size when available.
    pub fn acquire(&mut self, extent: Extent) -> Vec<T> {
        let key = (extent.width, extent.height);
        match self.free.get_mut(&key).and_then(Vec::pop) {
            Some(mut buf) => {
                buf.fill(T::default());
                buf
            }
            None => vec![T::default(); extent.pixels()],
        }
    }

    /// Return a buffer to the pool. The length must match the extent it was
    /// acquired for.
    pub fn release(&mut self, extent: Extent, buf: Vec<T>) -> FluxelResult<()> {
        if buf.len() != extent.pixels() {
            return Err(FluxelError::evaluation(
                "released buffer length does not match its extent",
            ));
        }
        self.free
            .entry((extent.width, extent.height))
            .or_default()
            .push(buf);
        Ok(())
    }

    /// Number of idle buffers held for `extent`.
    pub fn idle_count(&self, extent: Extent) -> usize {
        self.free
            .get(&(extent.width, extent.height))
            .map_or(0, Vec::len)
    }
}
