//! ### English
//! C ABI surface for `gl_render_view`.
//!
//! All exported symbols are `extern "C"` functions; structs are `#[repr(C)]`.
//! The host UI toolkit owns the lifecycle calls (`gl_render_view_*` on its UI thread) and may hand a
//! `GlRenderViewHandle` to any other thread for task queueing and render requests.
//! Renderer and strategy callbacks always run on the render thread, never under an internal lock.
//!
//! ### 中文
//! `gl_render_view` 的 C ABI 接口层。
//!
//! 所有导出符号均为 `extern "C"` 函数；结构体使用 `#[repr(C)]`。
//! 生命周期调用（`gl_render_view_*`）由宿主 UI 工具包在其 UI 线程上发起；`GlRenderViewHandle` 可交给任意其它线程，
//! 用于排队任务与请求绘制。渲染回调与策略回调总是在渲染线程上执行，且从不在内部锁内执行。
mod abi;
mod callbacks;
mod handle;
mod host;
mod view;

use std::ffi::c_void;

use crate::engine::{ConfigAttributes, ConfigError, RenderCoordinator, RenderHandle};

#[repr(C)]
/// ### English
/// Opaque view handle owning the render coordinator (and through it the render thread).
///
/// ### 中文
/// 不透明 view 句柄，持有渲染协调器（并由其持有渲染线程）。
pub struct GlRenderView {
    /// ### English
    /// Coordinator driven by the host UI thread.
    ///
    /// ### 中文
    /// 由宿主 UI 线程驱动的协调器。
    coordinator: RenderCoordinator,
}

#[repr(C)]
/// ### English
/// Opaque thread-safe handle (queue tasks, request frames, switch render mode from any thread).
///
/// ### 中文
/// 不透明的线程安全句柄（可在任意线程排队任务、请求绘制、切换渲染模式）。
pub struct GlRenderViewHandle {
    handle: RenderHandle,
}

/// ### English
/// Success.
///
/// ### 中文
/// 成功。
pub const GL_RENDER_VIEW_OK: i32 = 0;
/// ### English
/// Returned by the `present` strategy callback when the context was lost.
///
/// ### 中文
/// 当上下文丢失时，由 `present` 策略回调返回。
pub const GL_RENDER_VIEW_CONTEXT_LOST: i32 = 1;
pub const GL_RENDER_VIEW_ERR_NULL_POINTER: i32 = -1;
pub const GL_RENDER_VIEW_ERR_INVALID_ARGUMENT: i32 = -2;
pub const GL_RENDER_VIEW_ERR_ALREADY_CONFIGURED: i32 = -3;
pub const GL_RENDER_VIEW_ERR_CONFIG_LOCKED: i32 = -4;
pub const GL_RENDER_VIEW_ERR_MISSING_STRATEGY: i32 = -5;
pub const GL_RENDER_VIEW_ERR_SPAWN_FAILED: i32 = -6;

/// ### English
/// C ABI version for `gl_render_view`.
///
/// ### 中文
/// `gl_render_view` 的 C ABI 版本号。
const GL_RENDER_VIEW_ABI_VERSION: u32 = 1;

/// ### English
/// Task callback executed once on the render thread.
///
/// ### 中文
/// 在渲染线程上执行一次的任务回调。
pub type GlRenderViewTaskFn = unsafe extern "C" fn(user_data: *mut c_void);

#[repr(C)]
#[derive(Clone, Copy)]
/// ### English
/// Renderer callback table.
///
/// Every callback returns `GL_RENDER_VIEW_OK` on success; any other value terminates the render
/// thread. `on_draw_frame` is required, the other entries may be NULL.
///
/// Ownership: `user_data` belongs to the view from `gl_render_view_set_renderer` on (even when that
/// call fails); `release` is invoked exactly once when the renderer is dropped.
///
/// ### 中文
/// 渲染回调表。
///
/// 每个回调成功时返回 `GL_RENDER_VIEW_OK`；其它任何值都会终止渲染线程。`on_draw_frame` 必须提供，其余条目可为 NULL。
///
/// 所有权：从 `gl_render_view_set_renderer` 起（即使该调用失败）`user_data` 归 view 所有；渲染器被 drop 时
/// 会恰好调用一次 `release`。
pub struct GlRenderViewRenderer {
    pub user_data: *mut c_void,
    pub on_surface_created:
        Option<unsafe extern "C" fn(user_data: *mut c_void, config: u64) -> i32>,
    pub on_surface_changed:
        Option<unsafe extern "C" fn(user_data: *mut c_void, width: u32, height: u32) -> i32>,
    pub on_draw_frame: Option<unsafe extern "C" fn(user_data: *mut c_void) -> i32>,
    pub release: Option<unsafe extern "C" fn(user_data: *mut c_void)>,
}

#[repr(C)]
#[derive(Clone, Copy)]
/// ### English
/// Capability strategy table (config chooser, context factory, window surface factory).
///
/// Native handles travel as `u64` (`EGLConfig`/`EGLContext`/`EGLSurface`/window pointers cast to
/// integers). Output handles are written through the `out_*` pointers on success.
/// All entries except `release` are required. `release` is invoked exactly once, after the last
/// native object was destroyed and the strategies are dropped.
///
/// `present` returns `GL_RENDER_VIEW_OK`, `GL_RENDER_VIEW_CONTEXT_LOST`, or an error status.
///
/// ### 中文
/// 能力策略表（配置选择器、上下文工厂、窗口 surface 工厂）。
///
/// 原生句柄以 `u64` 传递（`EGLConfig`/`EGLContext`/`EGLSurface`/窗口指针转换为整数）；成功时通过 `out_*`
/// 指针写出输出句柄。除 `release` 外所有条目都必须提供。`release` 会在最后一个原生对象销毁、策略被 drop 之后
/// 恰好调用一次。
///
/// `present` 返回 `GL_RENDER_VIEW_OK`、`GL_RENDER_VIEW_CONTEXT_LOST` 或错误状态码。
pub struct GlRenderViewStrategies {
    pub user_data: *mut c_void,
    pub choose_config: Option<
        unsafe extern "C" fn(
            user_data: *mut c_void,
            attributes: *const ConfigAttributes,
            out_config: *mut u64,
        ) -> i32,
    >,
    pub create_context: Option<
        unsafe extern "C" fn(
            user_data: *mut c_void,
            config: u64,
            client_version: u32,
            out_context: *mut u64,
        ) -> i32,
    >,
    pub destroy_context: Option<unsafe extern "C" fn(user_data: *mut c_void, context: u64) -> i32>,
    pub create_window_surface: Option<
        unsafe extern "C" fn(
            user_data: *mut c_void,
            config: u64,
            context: u64,
            window: u64,
            out_surface: *mut u64,
        ) -> i32,
    >,
    pub destroy_surface: Option<unsafe extern "C" fn(user_data: *mut c_void, surface: u64) -> i32>,
    pub make_current:
        Option<unsafe extern "C" fn(user_data: *mut c_void, context: u64, surface: u64) -> i32>,
    pub present:
        Option<unsafe extern "C" fn(user_data: *mut c_void, context: u64, surface: u64) -> i32>,
    pub release: Option<unsafe extern "C" fn(user_data: *mut c_void)>,
}

/// ### English
/// Maps a configuration result onto a C status code.
///
/// ### 中文
/// 将配置结果映射为 C 状态码。
fn status_of(result: Result<(), ConfigError>) -> i32 {
    match result {
        Ok(()) => GL_RENDER_VIEW_OK,
        Err(ConfigError::AlreadyConfigured) => GL_RENDER_VIEW_ERR_ALREADY_CONFIGURED,
        Err(ConfigError::ConfigLocked { .. }) => GL_RENDER_VIEW_ERR_CONFIG_LOCKED,
        Err(ConfigError::MissingStrategy { .. }) => GL_RENDER_VIEW_ERR_MISSING_STRATEGY,
        Err(ConfigError::Spawn(_)) => GL_RENDER_VIEW_ERR_SPAWN_FAILED,
    }
}
