pub mod args;
pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod language;
pub mod region;

pub use args::{CommonEngineArgs, ServerBindArgs, build_config_overrides};
pub use backend::{ClassicalBackend, EngineResult, RawOutput, VisionBackend};
pub use config::{
    AppConfig, ClassicalOverride, ClassicalSettings, ConfigDescriptor, ConfigOverrides,
    ServerOverride, ServerSettings, TrainingOverride, TrainingSettings, VisionOverride,
    VisionSettings,
};
pub use engine::{EngineKind, EngineStatus, OcrMode};
pub use error::EngineError;
pub use language::LanguageHint;
pub use region::{BoundingBox, TextRegion};
