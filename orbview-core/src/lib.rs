/// orbview core: mesh generation, transforms, camera controls and the
/// backend-agnostic frame renderer.
///
/// Nothing in this crate talks to a real graphics API; front-ends plug in a
/// [`RenderBackend`] and feed key presses to the [`Scene`].
pub mod backend;
pub mod config;
pub mod controls;
pub mod error;
pub mod frame;
pub mod geometry;
#[cfg(feature = "env_logger")]
pub mod logging;
pub mod model;
pub mod projection;
pub mod scene;
pub mod shaders;
pub mod transform;

// Re-export commonly used types
pub use backend::{PipelineState, RenderBackend, ShaderSource, Topology};
pub use config::{CameraConfig, ModelConfig, SceneConfig};
pub use controls::{CameraController, CameraLimits, Key, KeyEvent};
pub use error::{ConfigError, GeometryError, RenderError, ShaderError};
pub use frame::{FrameStats, Renderer};
pub use geometry::{Mesh, Shape};
pub use model::{Color, FillStyle, Model};
pub use projection::{Camera, CameraDrive, ProjectionMode};
pub use scene::Scene;
pub use shaders::{BuiltinShaders, ShaderSourceProvider};
pub use transform::{RotationState, Transform};
