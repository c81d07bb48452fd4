use std::collections::BTreeSet;

use crate::{
    anim::Track,
    core::Vec2,
    error::{FluxelError, FluxelResult},
    fx::FillEffect,
};

/// A scene is an ordered stack of layers; later layers sit on top.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    pub layers: Vec<Layer>,
}

/// One visual element. A layer owns its effects, each effect owns its
/// parameter tracks; nothing else holds references into this tree.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    pub id: String,
    pub props: LayerProps,
    pub effects: Vec<Effect>,
}

/// The fixed set of animatable transform properties of a layer.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LayerProps {
    pub position: Track<Vec2>,
    pub scale: Track<Vec2>,
    pub rotation: Track<f64>, // radians
    pub opacity: Track<f64>,  // 0..1, clamped in eval
}

impl Default for LayerProps {
    fn default() -> Self {
        Self {
            position: Track::new(Vec2::ZERO),
            scale: Track::new(Vec2::new(1.0, 1.0)),
            rotation: Track::new(0.0),
            opacity: Track::new(1.0).with_bounds(0.0, 1.0),
        }
    }
}

/// Closed effect set; each entity type enumerates its parameters statically.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum Effect {
    Fill(FillEffect),
}

impl Layer {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            props: LayerProps::default(),
            effects: Vec::new(),
        }
    }

    pub fn validate(&self) -> FluxelResult<()> {
        if self.id.trim().is_empty() {
            return Err(FluxelError::validation("layer id must be non-empty"));
        }
        self.props.position.validate()?;
        self.props.scale.validate()?;
        self.props.rotation.validate()?;
        self.props.opacity.validate()?;
        for effect in &self.effects {
            match effect {
                Effect::Fill(fx) => fx.validate()?,
            }
        }
        Ok(())
    }
}

impl Scene {
    pub fn validate(&self) -> FluxelResult<()> {
        let mut seen = BTreeSet::new();
        for layer in &self.layers {
            layer.validate()?;
            if !seen.insert(layer.id.as_str()) {
                return Err(FluxelError::validation(format!(
                    "duplicate layer id '{}'",
                    layer.id
                )));
            }
        }
        Ok(())
    }
}
