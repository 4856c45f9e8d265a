//! ### English
//! Pluggable capability strategies: choosing a configuration, creating the context, and creating
//! the window surface.
//!
//! Every method is invoked on the render thread only. A returned error is fatal to the render
//! thread (see [`RenderThreadError`](crate::engine::RenderThreadError)), except for the
//! `destroy_*` methods whose errors are logged and otherwise ignored so teardown always completes.
//!
//! ### 中文
//! 可插拔的能力策略：选择图形配置、创建上下文、创建窗口 surface。
//!
//! 所有方法都只会在渲染线程上调用。返回错误对渲染线程是致命的（见
//! [`RenderThreadError`](crate::engine::RenderThreadError)）；`destroy_*` 方法例外：其错误只记录日志，
//! 以保证销毁流程总能完成。

use crate::engine::error::BoxError;
use crate::engine::handles::{NativeConfig, NativeContext, NativeSurface, NativeWindow};

/// ### English
/// Desired bit depths of the drawing configuration.
///
/// ### 中文
/// 期望的绘制配置各通道位深。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct ConfigAttributes {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
    pub depth: u8,
    pub stencil: u8,
}

impl ConfigAttributes {
    /// ### English
    /// RGB888 without alpha or stencil, with the given depth-buffer size.
    ///
    /// ### 中文
    /// RGB888、无 alpha 与 stencil，深度缓冲位数由参数指定。
    pub const fn rgb888(depth: u8) -> Self {
        Self {
            red: 8,
            green: 8,
            blue: 8,
            alpha: 0,
            depth,
            stencil: 0,
        }
    }
}

/// ### English
/// Criteria handed to the config chooser.
///
/// `DepthBuffer(true)` selects RGB888 with a 16-bit depth buffer, `DepthBuffer(false)` selects
/// RGB888 without depth. The default is `DepthBuffer(true)`.
///
/// ### 中文
/// 传给配置选择器的选择条件。
///
/// `DepthBuffer(true)` 选择 RGB888 + 16 位深度缓冲；`DepthBuffer(false)` 选择无深度的 RGB888。
/// 默认值为 `DepthBuffer(true)`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigCriteria {
    Explicit(ConfigAttributes),
    DepthBuffer(bool),
}

impl ConfigCriteria {
    /// ### English
    /// Resolves the criteria into an explicit attribute tuple.
    ///
    /// ### 中文
    /// 将选择条件解析为显式的位深元组。
    pub const fn attributes(&self) -> ConfigAttributes {
        match *self {
            Self::Explicit(attributes) => attributes,
            Self::DepthBuffer(true) => ConfigAttributes::rgb888(16),
            Self::DepthBuffer(false) => ConfigAttributes::rgb888(0),
        }
    }
}

impl Default for ConfigCriteria {
    fn default() -> Self {
        Self::DepthBuffer(true)
    }
}

/// ### English
/// Picks the native configuration matching the requested attributes.
///
/// Called at most once per render thread; the result is cached by the context manager.
///
/// ### 中文
/// 选择与期望位深匹配的原生配置。
///
/// 每个渲染线程最多调用一次；结果由上下文管理器缓存。
pub trait ConfigChooser: Send {
    fn choose_config(&mut self, attributes: &ConfigAttributes) -> Result<NativeConfig, BoxError>;
}

impl<F> ConfigChooser for F
where
    F: FnMut(&ConfigAttributes) -> Result<NativeConfig, BoxError> + Send,
{
    fn choose_config(&mut self, attributes: &ConfigAttributes) -> Result<NativeConfig, BoxError> {
        self(attributes)
    }
}

/// ### English
/// Creates and destroys graphics contexts.
///
/// `client_version == 0` means "let the factory decide" (typically the highest version it
/// supports).
///
/// ### 中文
/// 创建与销毁图形上下文。
///
/// `client_version == 0` 表示“由工厂自行决定”（通常是其支持的最高版本）。
pub trait ContextFactory: Send {
    fn create_context(
        &mut self,
        config: NativeConfig,
        client_version: u32,
    ) -> Result<NativeContext, BoxError>;

    fn destroy_context(&mut self, context: NativeContext) -> Result<(), BoxError>;
}

/// ### English
/// Result of presenting one frame.
///
/// ### 中文
/// 单帧呈现的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    /// ### English
    /// The frame reached the surface.
    ///
    /// ### 中文
    /// 帧已成功提交到 surface。
    Presented,
    /// ### English
    /// The context was lost (e.g. GPU reset); context and surface are recreated before the next
    /// frame.
    ///
    /// ### 中文
    /// 上下文已丢失（例如 GPU reset）；下一帧之前会重建上下文与 surface。
    ContextLost,
}

/// ### English
/// Creates, binds, presents, and destroys window surfaces.
///
/// A surface is always created for the context and config it is later bound to; the context
/// manager never pairs a surface with a different context.
///
/// ### 中文
/// 创建、绑定、呈现并销毁窗口 surface。
///
/// surface 总是针对之后要绑定的那一组 config/上下文创建；上下文管理器不会把 surface 与其它上下文配对。
pub trait WindowSurfaceFactory: Send {
    fn create_window_surface(
        &mut self,
        config: NativeConfig,
        context: NativeContext,
        window: NativeWindow,
    ) -> Result<NativeSurface, BoxError>;

    fn destroy_surface(&mut self, surface: NativeSurface) -> Result<(), BoxError>;

    /// ### English
    /// Makes `context` current on the calling (render) thread with `surface` as draw/read target.
    ///
    /// ### 中文
    /// 在调用方（渲染）线程上使 `context` 成为 current，并以 `surface` 作为绘制/读取目标。
    fn make_current(
        &mut self,
        context: NativeContext,
        surface: NativeSurface,
    ) -> Result<(), BoxError>;

    /// ### English
    /// Presents the frame drawn into `surface` (buffer swap).
    ///
    /// ### 中文
    /// 呈现绘制到 `surface` 上的帧（交换缓冲）。
    fn present(
        &mut self,
        context: NativeContext,
        surface: NativeSurface,
    ) -> Result<PresentOutcome, BoxError>;
}

/// ### English
/// The three capability strategies, bundled once they are all known.
///
/// ### 中文
/// 三个能力策略的打包（在全部就绪之后组装）。
pub struct Strategies {
    pub config_chooser: Box<dyn ConfigChooser>,
    pub context_factory: Box<dyn ContextFactory>,
    pub window_surface_factory: Box<dyn WindowSurfaceFactory>,
}
