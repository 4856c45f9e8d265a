/// ### English
/// `gl_render_view` crate root.
/// Exposes the Rust API via `engine` and the C ABI via `ffi` (cdylib).
///
/// ### 中文
/// `gl_render_view` 的 crate 根。
/// 通过 `engine` 提供 Rust API，通过 `ffi` 导出 C ABI（cdylib）。
pub mod engine;
pub mod ffi;

pub use engine::{
    BoxError, ConfigAttributes, ConfigChooser, ConfigCriteria, ConfigError, ContextFactory,
    HostEvent, NativeConfig, NativeContext, NativeSurface, NativeWindow, PresentOutcome,
    RenderCoordinator, RenderHandle, RenderMode, RenderStage, RenderThreadError, Renderer,
    Strategies, Task, ViewConfig, WindowSurfaceFactory,
};
