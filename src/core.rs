use crate::error::{FluxelError, FluxelResult};

pub use kurbo::{Point, Vec2};

/// Pixel dimensions of a source or target buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub fn new(width: u32, height: u32) -> FluxelResult<Self> {
        if width == 0 || height == 0 {
            return Err(FluxelError::validation("Extent width/height must be > 0"));
        }
        Ok(Self { width, height })
    }

    pub fn pixels(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Expected length of an RGBA8 buffer covering this extent.
    pub fn rgba8_len(self) -> FluxelResult<usize> {
        self.pixels()
            .checked_mul(4)
            .ok_or_else(|| FluxelError::evaluation("rgba8 buffer size overflow"))
    }

    pub fn max_dim(self) -> u32 {
        self.width.max(self.height)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_rejects_zero_dims() {
        assert!(Extent::new(0, 4).is_err());
        assert!(Extent::new(4, 0).is_err());
        assert!(Extent::new(4, 4).is_ok());
    }

    #[test]
    fn extent_rgba8_len_counts_channels() {
        let e = Extent::new(10, 3).unwrap();
        assert_eq!(e.rgba8_len().unwrap(), 120);
        assert_eq!(e.max_dim(), 10);
    }

    #[test]
    fn straight_to_premul_scales_channels() {
        let px = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
        assert_eq!(px.a, 128);
        assert_eq!(px.r, 128);
        assert_eq!(px.g, 64);
        assert_eq!(px.b, 0);
    }

    #[test]
    fn opaque_straight_is_unchanged() {
        let px = Rgba8Premul::from_straight_rgba(10, 20, 30, 255);
        assert_eq!(px.to_array(), [10, 20, 30, 255]);
    }
}
