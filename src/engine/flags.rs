//! ### English
//! Debug bitflags controlling optional render-thread diagnostics.
//!
//! These are passed through the C ABI as a `u32` bitmask. They only affect logging; the render
//! thread state machine behaves identically with or without them.
//!
//! ### 中文
//! 控制渲染线程可选诊断输出的调试位标志（bitflags）。
//!
//! 通过 C ABI 以 `u32` 位掩码传入。它们只影响日志输出；无论是否设置，渲染线程状态机的行为都完全一致。

/// ### English
/// Log every renderer callback and capability-strategy call at `trace` level.
///
/// ### 中文
/// 以 `trace` 级别记录每一次渲染回调与能力策略调用。
pub const GL_RENDER_VIEW_DEBUG_LOG_CALLS: u32 = 1 << 0;

/// ### English
/// Log per-frame counters and frame durations at `trace` level.
///
/// ### 中文
/// 以 `trace` 级别记录每帧计数与帧耗时。
pub const GL_RENDER_VIEW_DEBUG_CHECK_FRAMES: u32 = 1 << 1;

/// ### English
/// Returns whether `flag` is set in `flags`.
///
/// ### 中文
/// 返回 `flags` 中是否设置了 `flag`。
#[inline]
pub(crate) const fn enabled(flags: u32, flag: u32) -> bool {
    (flags & flag) != 0
}
