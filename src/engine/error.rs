//! ### English
//! Error types reported by the render view.
//!
//! Configuration errors are returned synchronously to the calling (UI) thread.
//! Render-thread errors are fatal to the worker thread and are recorded for observers.
//!
//! ### 中文
//! 渲染 view 对外报告的错误类型。
//!
//! 配置错误会同步返回给调用方（UI）线程；渲染线程错误对工作线程是致命的，并会被记录下来供观察者读取。

use std::fmt;

use thiserror::Error;

/// ### English
/// Boxed error used at the renderer/strategy boundary.
///
/// ### 中文
/// 渲染回调/能力策略边界上使用的装箱错误类型。
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// ### English
/// Synchronous configuration errors. The view state is left unchanged when one is returned.
///
/// ### 中文
/// 同步返回的配置错误；返回该错误时 view 状态保持不变。
#[derive(Debug, Error)]
pub enum ConfigError {
    /// ### English
    /// A renderer was already configured for this view.
    ///
    /// ### 中文
    /// 该 view 已经配置过渲染器。
    #[error("a renderer has already been configured for this view")]
    AlreadyConfigured,

    /// ### English
    /// A set-once setting was changed after the renderer was configured.
    ///
    /// ### 中文
    /// 在配置渲染器之后尝试修改只能设置一次的配置项。
    #[error("{what} cannot be changed after a renderer has been configured")]
    ConfigLocked { what: &'static str },

    /// ### English
    /// A capability strategy was not supplied before configuring the renderer.
    ///
    /// ### 中文
    /// 配置渲染器之前缺少必需的能力策略。
    #[error("no {what} was supplied before configuring the renderer")]
    MissingStrategy { what: &'static str },

    /// ### English
    /// The OS refused to spawn the render thread.
    ///
    /// ### 中文
    /// 操作系统无法创建渲染线程。
    #[error("failed to spawn the render thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// ### English
/// Renderer callback that raised an error.
///
/// ### 中文
/// 发生错误的渲染回调。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    SurfaceCreated,
    SurfaceChanged,
    DrawFrame,
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SurfaceCreated => "on_surface_created",
            Self::SurfaceChanged => "on_surface_changed",
            Self::DrawFrame => "on_draw_frame",
        })
    }
}

/// ### English
/// Fatal render-thread errors. Any of these terminates the worker thread; there is no retry.
///
/// ### 中文
/// 渲染线程的致命错误；任意一种都会终止工作线程，且不会自动重试。
#[derive(Debug, Error)]
pub enum RenderThreadError {
    #[error("config chooser failed: {0}")]
    ChooseConfig(#[source] BoxError),

    #[error("context creation failed: {0}")]
    CreateContext(#[source] BoxError),

    #[error("window surface creation failed: {0}")]
    CreateSurface(#[source] BoxError),

    #[error("making the context current failed: {0}")]
    MakeCurrent(#[source] BoxError),

    #[error("frame presentation failed: {0}")]
    Present(#[source] BoxError),

    /// ### English
    /// The user renderer returned an error.
    ///
    /// ### 中文
    /// 用户渲染器返回了错误。
    #[error("renderer {stage} failed: {source}")]
    Renderer {
        stage: RenderStage,
        #[source]
        source: BoxError,
    },

    /// ### English
    /// A renderer callback, strategy or queued task panicked on the render thread.
    ///
    /// ### 中文
    /// 渲染回调、能力策略或排队任务在渲染线程上 panic。
    #[error("render thread panicked: {message}")]
    Panicked { message: String },
}
