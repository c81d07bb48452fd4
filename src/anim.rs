use crate::{
    anim_ease::Ease,
    core::Vec2,
    error::{FluxelError, FluxelResult},
};

/// Linear interpolation between two values of the same type.
pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

/// Clamp capability for track min/max bounds.
pub trait Bounded: Sized {
    fn clamp_to(self, min: &Self, max: &Self) -> Self;
}

impl Bounded for f64 {
    fn clamp_to(self, min: &Self, max: &Self) -> Self {
        self.clamp(*min, *max)
    }
}

impl Bounded for Vec2 {
    fn clamp_to(self, min: &Self, max: &Self) -> Self {
        Vec2::new(self.x.clamp(min.x, max.x), self.y.clamp(min.y, max.y))
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(bound(
    serialize = "T: serde::Serialize",
    deserialize = "T: serde::Deserialize<'de>"
))]
pub struct Keyframe<T> {
    pub time: f64, // seconds, >= 0
    pub value: T,
    #[serde(default)]
    pub ease: Ease, // ease governing the transition arriving at this key
    // Reserved for Bezier interpolation; carried, not consulted.
    #[serde(default)]
    pub in_tangent: Option<T>,
    #[serde(default)]
    pub out_tangent: Option<T>,
}

impl<T> Keyframe<T> {
    pub fn new(time: f64, value: T) -> Self {
        Self {
            time,
            value,
            ease: Ease::Linear,
            in_tangent: None,
            out_tangent: None,
        }
    }

    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }
}

/// One animatable property: a default value, optional clamp bounds, and a
/// time-sorted keyframe sequence. Never shared between entities.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Track<T> {
    pub default: T,
    pub min: Option<T>,
    pub max: Option<T>,
    keys: Vec<Keyframe<T>>, // sorted by time, equal times keep insertion order
}

impl<T> Track<T>
where
    T: Lerp + Clone,
{
    pub fn new(default: T) -> Self {
        Self {
            default,
            min: None,
            max: None,
            keys: Vec::new(),
        }
    }

    pub fn with_bounds(mut self, min: T, max: T) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn keys(&self) -> &[Keyframe<T>] {
        &self.keys
    }

    /// Insert a keyframe and re-sort by time. The sort is stable, so a key
    /// added at an already-occupied time lands after the existing entries and
    /// governs lookups at exactly that time.
    pub fn add_key(&mut self, key: Keyframe<T>) -> FluxelResult<()> {
        if !key.time.is_finite() || key.time < 0.0 {
            return Err(FluxelError::animation(
                "keyframe time must be finite and >= 0",
            ));
        }
        self.keys.push(key);
        self.keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(())
    }

    /// Remove every keyframe; the default value is untouched.
    pub fn clear_keys(&mut self) {
        self.keys.clear();
    }

    pub fn validate(&self) -> FluxelResult<()> {
        for key in &self.keys {
            if !key.time.is_finite() || key.time < 0.0 {
                return Err(FluxelError::animation(
                    "keyframe time must be finite and >= 0",
                ));
            }
        }
        if !self.keys.windows(2).all(|w| w[0].time <= w[1].time) {
            return Err(FluxelError::animation("keyframes must be sorted by time"));
        }
        Ok(())
    }

    /// Sample the track at a query time.
    ///
    /// Flat extrapolation outside the keyed range; between keys the easing of
    /// the *arrival* keyframe shapes the transition (the first key's ease is
    /// never consulted). Never clamps; see [`Track::clamp`].
    pub fn value_at(&self, time: f64) -> T {
        if self.keys.is_empty() {
            return self.default.clone();
        }

        let idx = self.keys.partition_point(|k| k.time <= time);
        if idx == 0 {
            return self.keys[0].value.clone();
        }
        if idx >= self.keys.len() {
            return self.keys[self.keys.len() - 1].value.clone();
        }

        let a = &self.keys[idx - 1];
        let b = &self.keys[idx];
        let span = b.time - a.time;
        // Coincident keys: defined progress 0 rather than 0/0.
        let progress = if span > 0.0 { (time - a.time) / span } else { 0.0 };
        let eased = b.ease.apply(progress);
        T::lerp(&a.value, &b.value, eased)
    }
}

impl<T> Track<T>
where
    T: Bounded + Clone,
{
    /// Bound a sampled value to `[min, max]` when both bounds are set.
    /// Sampling and clamping are separate on purpose: `value_at` never clamps.
    pub fn clamp(&self, value: T) -> T {
        match (&self.min, &self.max) {
            (Some(min), Some(max)) => value.clamp_to(min, max),
            _ => value,
        }
    }
}
