//! Scene file interpretation and the runtime scene driven by the event loop.

pub mod config;
pub mod error;
pub mod input;
pub mod lights;
pub mod model;
pub mod object_line;
pub mod state;

pub use config::{CameraConfig, LightConfig, ObjectConfig, SceneConfig};
pub use error::{SceneError, SceneResult};
pub use input::{Control, ControlTarget, Key, KeyAction, TransformMode};
pub use lights::{LightRig, LightRole, flicker_intensity};
pub use model::{Model, load_model};
pub use state::Scene;
