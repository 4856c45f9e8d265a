/// ### English
/// Render view internals (render thread, context lifecycle, capability strategies, host adapter).
///
/// ### 中文
/// 渲染 view 内部模块（渲染线程、上下文生命周期、能力策略、宿主适配层等）。
pub mod config;
pub(crate) mod context_manager;
pub mod error;
pub mod flags;
pub mod handles;
pub mod host;
pub mod renderer;
pub mod runtime;
pub mod strategy;

pub use config::ViewConfig;
pub use error::{BoxError, ConfigError, RenderStage, RenderThreadError};
pub use handles::{NativeConfig, NativeContext, NativeSurface, NativeWindow};
pub use host::HostEvent;
pub use renderer::{RenderMode, Renderer, Task};
pub use runtime::{RenderCoordinator, RenderHandle};
pub use strategy::{
    ConfigAttributes, ConfigChooser, ConfigCriteria, ContextFactory, PresentOutcome, Strategies,
    WindowSurfaceFactory,
};
