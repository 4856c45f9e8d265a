//! ### English
//! User render callback and deferred task types.
//!
//! ### 中文
//! 用户渲染回调与延迟任务类型。

use dpi::PhysicalSize;

use crate::engine::error::BoxError;
use crate::engine::handles::NativeConfig;

/// ### English
/// Rendering callback driven exclusively by the render thread.
///
/// Per surface lifecycle the order is `on_surface_created` (only when a context was created),
/// `on_surface_changed`, then `on_draw_frame` once per frame. Returning an error terminates the
/// render thread.
///
/// ### 中文
/// 只由渲染线程驱动的渲染回调。
///
/// 每个 surface 生命周期内的调用顺序为：`on_surface_created`（仅在新建上下文时）、`on_surface_changed`，
/// 之后每帧调用一次 `on_draw_frame`。返回错误会终止渲染线程。
pub trait Renderer: Send + 'static {
    /// ### English
    /// A new context exists and is current. GL objects from a previous context are gone.
    ///
    /// ### 中文
    /// 新上下文已创建并处于 current 状态；之前上下文中的 GL 对象均已失效。
    fn on_surface_created(&mut self, config: NativeConfig) -> Result<(), BoxError>;

    fn on_surface_changed(&mut self, size: PhysicalSize<u32>) -> Result<(), BoxError>;

    fn on_draw_frame(&mut self) -> Result<(), BoxError>;
}

/// ### English
/// Unit of work queued from any thread and executed once on the render thread.
///
/// ### 中文
/// 可从任意线程排队、在渲染线程上执行一次的工作单元。
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// ### English
/// Drawing cadence of the render thread.
///
/// ### 中文
/// 渲染线程的绘制节奏。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum RenderMode {
    /// ### English
    /// Draw a frame on every loop iteration while drawable.
    ///
    /// ### 中文
    /// 在可绘制期间每次循环都绘制一帧。
    #[default]
    Continuous = 0,
    /// ### English
    /// Draw only after `request_render` or when queued tasks are drained while drawable.
    ///
    /// ### 中文
    /// 仅在 `request_render` 之后，或在可绘制状态下 drain 排队任务时绘制。
    OnDemand = 1,
}

impl RenderMode {
    /// ### English
    /// Converts the C ABI value; unknown values yield `None`.
    ///
    /// ### 中文
    /// 从 C ABI 数值转换；未知值返回 `None`。
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Continuous),
            1 => Some(Self::OnDemand),
            _ => None,
        }
    }
}
