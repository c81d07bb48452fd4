//! Fluxel is a motion-graphics compositor core.
//!
//! It turns a scene of animated layers into per-frame pixel effects in three
//! stages:
//!
//! 1. **Evaluate**: `Scene + time -> EvaluatedScene` (keyframe tracks sampled
//!    into a fully resolved property snapshot)
//! 2. **Field** (optional): `alpha source -> DistanceField` via jump flooding
//! 3. **Fill**: snapshot + source pixels -> masked fill compositing
//!
//! The key design constraints in v0.1.0:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: evaluation and compositing are pure and
//!   stable for a given input; nothing here retries or caches.
//! - **No IO**: sources arrive as in-memory premultiplied RGBA8 buffers.
//! - **Explicit time**: the [`Timeline`] is driven by host-provided deltas,
//!   there is no internal frame-callback loop.
#![forbid(unsafe_code)]

pub mod anim;
pub mod anim_ease;
pub mod core;
pub mod error;
pub mod eval;
pub mod fill;
pub mod fx;
pub mod model;
pub mod pipeline;
pub mod pool;
pub mod sdf;
pub mod timeline;

pub use anim::{Bounded, Keyframe, Lerp, Track};
pub use anim_ease::Ease;
pub use crate::core::{Extent, Rgba8Premul, Vec2};
pub use error::{FluxelError, FluxelResult};
pub use eval::{EvaluatedScene, Evaluator, LayerSnapshot, ResolvedFill};
pub use fill::{FillDistance, apply_fill, blend_keep_alpha, over};
pub use fx::{FillConfig, FillDirection, FillEffect, parse_fill};
pub use model::{Effect, Layer, LayerProps, Scene};
pub use pipeline::{DistanceMode, render_fills, render_fills_with};
pub use pool::SurfacePool;
pub use sdf::{DistCell, DistanceField, generate_distance_field, generate_distance_field_pooled};
pub use timeline::{LoopMode, Timeline};
