use crate::{
    anim::Track,
    core::{Rgba8Premul, Vec2},
    error::{FluxelError, FluxelResult},
};

/// Growth direction of a fill effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FillDirection {
    CenterOut,
    EdgeIn,
    LeftRight,
    TopBottom,
    /// Radial growth around a caller-chosen anchor.
    Custom,
}

/// Static configuration of a fill effect.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FillConfig {
    pub direction: FillDirection,
    /// Normalized 0..1 origin; meaningful for center-out, edge-in and custom.
    pub anchor: Vec2,
    /// Alpha cut separating "filled source" from "transparent", 0..1.
    pub alpha_threshold: f32,
    pub color: Rgba8Premul,
}

impl FillConfig {
    pub fn new(direction: FillDirection, color: Rgba8Premul) -> Self {
        Self {
            direction,
            anchor: Vec2::new(0.5, 0.5),
            alpha_threshold: 0.0,
            color,
        }
    }

    pub fn validate(&self) -> FluxelResult<()> {
        if !self.alpha_threshold.is_finite()
            || self.alpha_threshold < 0.0
            || self.alpha_threshold > 1.0
        {
            return Err(FluxelError::validation(
                "fill alpha_threshold must be within [0, 1]",
            ));
        }
        if !self.anchor.x.is_finite() || !self.anchor.y.is_finite() {
            return Err(FluxelError::validation("fill anchor must be finite"));
        }
        Ok(())
    }
}

/// A fill effect instance: static config plus its two animatable scalars.
///
/// `progress` is clamped to 0..1 at evaluation. `speed` is a reserved
/// time-remapping multiplier for an external driving clock; the fill math
/// itself does not consume it.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct FillEffect {
    pub config: FillConfig,
    pub progress: Track<f64>,
    pub speed: Track<f64>,
}

impl FillEffect {
    pub fn new(config: FillConfig) -> Self {
        Self {
            config,
            progress: Track::new(0.0).with_bounds(0.0, 1.0),
            speed: Track::new(1.0),
        }
    }

    /// Dynamic parameter lookup for host-scripting entry points.
    ///
    /// The parameter set is a closed struct; an unknown name is a usage error
    /// in the calling code and fails loudly rather than defaulting.
    pub fn param(&self, name: &str) -> FluxelResult<&Track<f64>> {
        match name {
            "progress" => Ok(&self.progress),
            "speed" => Ok(&self.speed),
            other => Err(FluxelError::evaluation(format!(
                "unknown fill parameter '{other}'"
            ))),
        }
    }

    /// Mutable variant of [`FillEffect::param`].
    pub fn param_mut(&mut self, name: &str) -> FluxelResult<&mut Track<f64>> {
        match name {
            "progress" => Ok(&mut self.progress),
            "speed" => Ok(&mut self.speed),
            other => Err(FluxelError::evaluation(format!(
                "unknown fill parameter '{other}'"
            ))),
        }
    }

    pub fn validate(&self) -> FluxelResult<()> {
        self.config.validate()?;
        self.progress.validate()?;
        self.speed.validate()
    }
}

/// Parse a dynamic effect description into a [`FillConfig`].
///
/// This is the lenient JSON-facing entry for hosts that describe effects by
/// kind + parameter object; anything unknown or malformed errors out.
pub fn parse_fill(kind: &str, params: &serde_json::Value) -> FluxelResult<FillConfig> {
    let kind = kind.trim().to_ascii_lowercase();
    if kind.is_empty() {
        return Err(FluxelError::validation("effect kind must be non-empty"));
    }
    if kind != "fill" {
        return Err(FluxelError::validation(format!(
            "unknown effect kind '{kind}'"
        )));
    }

    let params = if params.is_null() {
        None
    } else {
        Some(
            params
                .as_object()
                .ok_or_else(|| FluxelError::validation("fill params must be an object"))?,
        )
    };

    let direction = match params.and_then(|p| p.get("dir")).and_then(|v| v.as_str()) {
        None => FillDirection::CenterOut,
        Some(s) => match s.trim().to_ascii_lowercase().as_str() {
            "center_out" | "centerout" | "center" => FillDirection::CenterOut,
            "edge_in" | "edgein" | "edges" => FillDirection::EdgeIn,
            "left_right" | "leftright" | "ltr" => FillDirection::LeftRight,
            "top_bottom" | "topbottom" | "ttb" => FillDirection::TopBottom,
            "custom" => FillDirection::Custom,
            other => {
                return Err(FluxelError::validation(format!(
                    "unknown fill.dir '{other}'"
                )));
            }
        },
    };

    let anchor = match params.and_then(|p| p.get("anchor")) {
        None => Vec2::new(0.5, 0.5),
        Some(v) => {
            let arr = v
                .as_array()
                .ok_or_else(|| FluxelError::validation("fill.anchor must be [x, y]"))?;
            if arr.len() != 2 {
                return Err(FluxelError::validation("fill.anchor must be [x, y]"));
            }
            let x = arr[0]
                .as_f64()
                .ok_or_else(|| FluxelError::validation("fill.anchor x must be a number"))?;
            let y = arr[1]
                .as_f64()
                .ok_or_else(|| FluxelError::validation("fill.anchor y must be a number"))?;
            Vec2::new(x, y)
        }
    };

    let alpha_threshold = match params.and_then(|p| p.get("threshold")) {
        None => 0.0,
        Some(v) => {
            let f = v
                .as_f64()
                .ok_or_else(|| FluxelError::validation("fill.threshold must be a number"))?
                as f32;
            if !f.is_finite() || !(0.0..=1.0).contains(&f) {
                return Err(FluxelError::validation(
                    "fill.threshold must be within [0, 1]",
                ));
            }
            f
        }
    };

    let color = match params.and_then(|p| p.get("color")) {
        None => Rgba8Premul::from_straight_rgba(255, 255, 255, 255),
        Some(v) => {
            let arr = v
                .as_array()
                .ok_or_else(|| FluxelError::validation("fill.color must be [r, g, b, a]"))?;
            if arr.len() != 4 {
                return Err(FluxelError::validation("fill.color must be [r, g, b, a]"));
            }
            let mut ch = [0u8; 4];
            for (i, v) in arr.iter().enumerate() {
                let n = v
                    .as_u64()
                    .ok_or_else(|| FluxelError::validation("fill.color entries must be 0..=255"))?;
                ch[i] = u8::try_from(n).map_err(|_| {
                    FluxelError::validation("fill.color entries must be 0..=255")
                })?;
            }
            Rgba8Premul::from_straight_rgba(ch[0], ch[1], ch[2], ch[3])
        }
    };

    let config = FillConfig {
        direction,
        anchor,
        alpha_threshold,
        color,
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fill_defaults() {
        let c = parse_fill("fill", &serde_json::Value::Null).unwrap();
        assert_eq!(c.direction, FillDirection::CenterOut);
        assert_eq!(c.anchor, Vec2::new(0.5, 0.5));
        assert_eq!(c.alpha_threshold, 0.0);
    }

    #[test]
    fn parse_fill_full_params() {
        let c = parse_fill(
            " Fill ",
            &serde_json::json!({
                "dir": "left_right",
                "anchor": [0.25, 0.75],
                "threshold": 0.5,
                "color": [255, 0, 0, 255],
            }),
        )
        .unwrap();
        assert_eq!(c.direction, FillDirection::LeftRight);
        assert_eq!(c.anchor, Vec2::new(0.25, 0.75));
        assert_eq!(c.alpha_threshold, 0.5);
        assert_eq!(c.color, Rgba8Premul::from_straight_rgba(255, 0, 0, 255));
    }

    #[test]
    fn parse_fill_rejects_unknowns() {
        assert!(parse_fill("sparkle", &serde_json::Value::Null).is_err());
        assert!(parse_fill("", &serde_json::Value::Null).is_err());
        assert!(parse_fill("fill", &serde_json::json!({ "dir": "sideways" })).is_err());
        assert!(parse_fill("fill", &serde_json::json!({ "threshold": 2.0 })).is_err());
        assert!(parse_fill("fill", &serde_json::json!({ "color": [1, 2, 3] })).is_err());
    }

    #[test]
    fn unknown_param_name_fails_loudly() {
        let fx = FillEffect::new(FillConfig::new(
            FillDirection::CenterOut,
            Rgba8Premul::from_straight_rgba(0, 0, 0, 255),
        ));
        assert!(fx.param("progress").is_ok());
        assert!(fx.param("speed").is_ok());
        let err = fx.param("wobble").unwrap_err();
        assert!(err.to_string().contains("unknown fill parameter"));
    }

    #[test]
    fn progress_track_is_bounded_0_1() {
        let fx = FillEffect::new(FillConfig::new(
            FillDirection::CenterOut,
            Rgba8Premul::transparent(),
        ));
        assert_eq!(fx.progress.clamp(3.0), 1.0);
        assert_eq!(fx.progress.clamp(-3.0), 0.0);
    }

    #[test]
    fn config_validate_rejects_bad_threshold() {
        let mut c = FillConfig::new(FillDirection::EdgeIn, Rgba8Premul::transparent());
        c.alpha_threshold = f32::NAN;
        assert!(c.validate().is_err());
        c.alpha_threshold = 1.5;
        assert!(c.validate().is_err());
    }
}
