//! ### English
//! Opaque native handles exchanged with the capability strategies.
//!
//! The render view never interprets these values; they are produced by the strategies and handed
//! back to them. Integer newtypes keep them `Copy`, `Send`, and trivially passable through the C ABI
//! (an `EGLConfig`/`EGLContext`/`EGLSurface` pointer or a GLFW/ANativeWindow pointer cast to `u64`).
//!
//! ### 中文
//! 与能力策略交换的不透明原生句柄。
//!
//! 渲染 view 从不解释这些值：它们由策略产生，再交还给策略使用。整数 newtype 使其保持 `Copy`、`Send`，
//! 并且可直接穿过 C ABI（例如将 `EGLConfig`/`EGLContext`/`EGLSurface` 指针或 GLFW/ANativeWindow 指针转换为 `u64`）。

/// ### English
/// Graphics configuration selected by the config chooser.
///
/// ### 中文
/// 由配置选择器选出的图形配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NativeConfig(pub u64);

/// ### English
/// Graphics context created by the context factory.
///
/// ### 中文
/// 由上下文工厂创建的图形上下文。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NativeContext(pub u64);

/// ### English
/// Drawable window surface created by the window-surface factory.
///
/// ### 中文
/// 由窗口 surface 工厂创建的可绘制 surface。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NativeSurface(pub u64);

/// ### English
/// Host-owned native window (or surface texture) delivered with the surface-created notification.
///
/// ### 中文
/// 宿主持有的原生窗口（或 surface texture），随 surface-created 通知一起传入。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NativeWindow(pub u64);
