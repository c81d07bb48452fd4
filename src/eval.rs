use crate::{
    core::Vec2,
    error::{FluxelError, FluxelResult},
    fx::FillConfig,
    model::{Effect, Layer, Scene},
};

/// Fully resolved scene state at one query time.
#[derive(Clone, Debug, serde::Serialize)]
pub struct EvaluatedScene {
    pub time: f64,
    pub nodes: Vec<LayerSnapshot>,
}

/// Per-layer property snapshot. Recomputed on every query; the evaluator
/// never caches, since layer time cursors are mutated externally and a
/// snapshot is a handful of track samples.
#[derive(Clone, Debug, serde::Serialize)]
pub struct LayerSnapshot {
    pub layer_id: String,
    pub position: Vec2,
    pub scale: Vec2,
    pub rotation: f64,
    pub opacity: f64, // clamped 0..1
    pub fills: Vec<ResolvedFill>,
}

/// A fill effect with its animatable scalars sampled and clamped.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ResolvedFill {
    pub config: FillConfig,
    pub progress: f64, // 0..1
    pub speed: f64,
}

pub struct Evaluator;

impl Evaluator {
    /// Resolve every layer's tracks at `time`, in scene order.
    ///
    /// The returned snapshot is complete before any compositor pass consumes
    /// it; nothing downstream re-samples tracks mid-frame.
    #[tracing::instrument(skip(scene))]
    pub fn eval_scene(scene: &Scene, time: f64) -> FluxelResult<EvaluatedScene> {
        scene.validate()?;
        if !time.is_finite() || time < 0.0 {
            return Err(FluxelError::evaluation(
                "query time must be finite and >= 0",
            ));
        }

        let nodes = scene
            .layers
            .iter()
            .map(|layer| eval_layer(layer, time))
            .collect::<FluxelResult<Vec<_>>>()?;

        Ok(EvaluatedScene { time, nodes })
    }
}

fn eval_layer(layer: &Layer, time: f64) -> FluxelResult<LayerSnapshot> {
    let props = &layer.props;
    let opacity = props
        .opacity
        .clamp(props.opacity.value_at(time))
        .clamp(0.0, 1.0);

    let fills = layer
        .effects
        .iter()
        .map(|effect| match effect {
            Effect::Fill(fx) => {
                let progress = fx.progress.value_at(time).clamp(0.0, 1.0);
                let speed = fx.speed.value_at(time);
                if !progress.is_finite() || !speed.is_finite() {
                    return Err(FluxelError::evaluation(format!(
                        "layer '{}' fill resolved to a non-finite scalar",
                        layer.id
                    )));
                }
                Ok(ResolvedFill {
                    config: fx.config,
                    progress,
                    speed,
                })
            }
        })
        .collect::<FluxelResult<Vec<_>>>()?;

    Ok(LayerSnapshot {
        layer_id: layer.id.clone(),
        position: props.position.value_at(time),
        scale: props.scale.value_at(time),
        rotation: props.rotation.value_at(time),
        opacity,
        fills,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        anim::{Keyframe, Track},
        core::Rgba8Premul,
        fx::{FillConfig, FillDirection, FillEffect},
        model::LayerProps,
    };

    fn fill_layer(progress: Track<f64>) -> Scene {
        let mut fx = FillEffect::new(FillConfig::new(
            FillDirection::LeftRight,
            Rgba8Premul::from_straight_rgba(0, 255, 0, 255),
        ));
        fx.progress = progress;
        let mut layer = Layer::new("l0");
        layer.effects.push(Effect::Fill(fx));
        Scene { layers: vec![layer] }
    }

    #[test]
    fn snapshot_samples_all_props() {
        let mut props = LayerProps::default();
        props
            .position
            .add_key(Keyframe::new(0.0, Vec2::ZERO))
            .unwrap();
        props
            .position
            .add_key(Keyframe::new(2.0, Vec2::new(10.0, 20.0)))
            .unwrap();
        props.rotation.add_key(Keyframe::new(0.0, 0.0)).unwrap();
        props
            .rotation
            .add_key(Keyframe::new(2.0, std::f64::consts::PI))
            .unwrap();

        let mut layer = Layer::new("l0");
        layer.props = props;
        let scene = Scene { layers: vec![layer] };

        let g = Evaluator::eval_scene(&scene, 1.0).unwrap();
        assert_eq!(g.nodes.len(), 1);
        assert_eq!(g.nodes[0].position, Vec2::new(5.0, 10.0));
        assert_eq!(g.nodes[0].rotation, std::f64::consts::PI / 2.0);
        assert_eq!(g.nodes[0].scale, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn opacity_is_clamped() {
        let mut layer = Layer::new("l0");
        layer.props.opacity = Track::new(2.0);
        let scene = Scene { layers: vec![layer] };
        let g = Evaluator::eval_scene(&scene, 0.0).unwrap();
        assert_eq!(g.nodes[0].opacity, 1.0);
    }

    #[test]
    fn fill_progress_is_clamped() {
        let mut progress = Track::new(0.0);
        progress.add_key(Keyframe::new(0.0, -4.0)).unwrap();
        progress.add_key(Keyframe::new(1.0, 4.0)).unwrap();
        let scene = fill_layer(progress);

        let g0 = Evaluator::eval_scene(&scene, 0.0).unwrap();
        assert_eq!(g0.nodes[0].fills[0].progress, 0.0);
        let g1 = Evaluator::eval_scene(&scene, 1.0).unwrap();
        assert_eq!(g1.nodes[0].fills[0].progress, 1.0);
    }

    #[test]
    fn snapshots_recompute_per_query() {
        let mut progress = Track::new(0.0);
        progress.add_key(Keyframe::new(0.0, 0.0)).unwrap();
        progress.add_key(Keyframe::new(2.0, 1.0)).unwrap();
        let scene = fill_layer(progress);

        let a = Evaluator::eval_scene(&scene, 0.5).unwrap();
        let b = Evaluator::eval_scene(&scene, 1.5).unwrap();
        assert_eq!(a.nodes[0].fills[0].progress, 0.25);
        assert_eq!(b.nodes[0].fills[0].progress, 0.75);
    }

    #[test]
    fn negative_time_is_an_error() {
        let scene = Scene {
            layers: vec![Layer::new("l0")],
        };
        assert!(Evaluator::eval_scene(&scene, -0.1).is_err());
        assert!(Evaluator::eval_scene(&scene, f64::NAN).is_err());
    }

    #[test]
    fn nodes_follow_scene_order() {
        let scene = Scene {
            layers: vec![Layer::new("bg"), Layer::new("mid"), Layer::new("top")],
        };
        let g = Evaluator::eval_scene(&scene, 0.0).unwrap();
        let ids: Vec<&str> = g.nodes.iter().map(|n| n.layer_id.as_str()).collect();
        assert_eq!(ids, vec!["bg", "mid", "top"]);
    }
}
