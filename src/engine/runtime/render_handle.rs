//! ### English
//! Thread-safe control handle for a configured render view.
//!
//! Cloneable and `Send + Sync`: any thread may queue tasks on the render thread, request frames,
//! or switch the render mode through it. Only handed out once a renderer is configured, so every
//! call here acts on a real render thread.
//!
//! ### 中文
//! 已配置渲染 view 的线程安全控制句柄。
//!
//! 可克隆且 `Send + Sync`：任意线程都可以通过它向渲染线程排队任务、请求绘制或切换渲染模式。
//! 只有在渲染器配置之后才会发放，因此这里的每个调用都作用于真实存在的渲染线程。

use std::sync::Arc;

use dpi::PhysicalSize;
use log::debug;

use crate::engine::handles::NativeWindow;
use crate::engine::renderer::{RenderMode, Task};

use super::monitor::Monitor;

#[derive(Clone)]
pub struct RenderHandle {
    monitor: Arc<Monitor>,
}

impl RenderHandle {
    pub(super) fn new(monitor: Arc<Monitor>) -> Self {
        Self { monitor }
    }

    /// ### English
    /// Sets the drawing cadence. Switching to `Continuous` wakes the render thread.
    ///
    /// ### 中文
    /// 设置绘制节奏；切换为 `Continuous` 时唤醒渲染线程。
    pub fn set_render_mode(&self, mode: RenderMode) {
        let mut state = self.monitor.lock();
        state.render_mode = mode;
        if mode == RenderMode::Continuous {
            self.monitor.notify_all();
        }
    }

    pub fn render_mode(&self) -> RenderMode {
        self.monitor.read(|state| state.render_mode)
    }

    /// ### English
    /// Requests one more frame (sticky until a frame is produced).
    ///
    /// ### 中文
    /// 请求再绘制一帧（在产生一帧之前保持有效）。
    pub fn request_render(&self) {
        self.monitor.update(|state| state.request_render = true);
    }

    /// ### English
    /// Queues `task` to run once on the render thread, after every task queued before it.
    ///
    /// Returns `false` and drops `task` unrun once the view was shut down or its render thread
    /// failed; such a task could never run.
    ///
    /// ### 中文
    /// 将 `task` 排队到渲染线程执行一次，位于其之前排队的所有任务之后。
    ///
    /// view 已 shutdown 或渲染线程已失败时返回 `false`，并直接丢弃 `task` 而不执行；这类任务永远不会被执行。
    pub fn queue_event(&self, task: impl FnOnce() + Send + 'static) -> bool {
        self.queue_boxed(Box::new(task))
    }

    pub(crate) fn queue_boxed(&self, task: Task) -> bool {
        let rejected = self.monitor.update(|state| {
            if state.closed {
                return Some(task);
            }
            state.events.push(task);
            None
        });
        match rejected {
            Some(task) => {
                // Dropped outside the lock: captured values may run arbitrary `Drop` code.
                drop(task);
                debug!("queue_event rejected: render thread no longer accepts tasks");
                false
            }
            None => true,
        }
    }

    pub(crate) fn pause(&self) {
        self.monitor.update(|state| state.request_paused = true);
    }

    pub(crate) fn resume(&self) {
        self.monitor.update(|state| state.request_paused = false);
    }

    pub(crate) fn surface_created(&self, window: NativeWindow) {
        self.monitor.update(|state| {
            state.has_surface = true;
            state.native_window = Some(window);
            state.surface_generation += 1;
        });
        debug!("host surface created ({window:?})");
    }

    /// ### English
    /// Surface creation and its initial size, published in one update so the render thread never
    /// sees the new surface with a stale size.
    ///
    /// ### 中文
    /// 在一次更新中同时发布 surface 创建与初始尺寸，避免渲染线程看到新 surface 却拿到过期尺寸。
    pub(crate) fn surface_available(&self, window: NativeWindow, size: PhysicalSize<u32>) {
        self.monitor.update(|state| {
            state.has_surface = true;
            state.native_window = Some(window);
            state.surface_generation += 1;
            state.surface_size = size;
            state.size_changed = true;
        });
        debug!("host surface available ({window:?}, {size:?})");
    }

    pub(crate) fn surface_changed(&self, size: PhysicalSize<u32>) {
        self.monitor.update(|state| {
            state.surface_size = size;
            state.size_changed = true;
        });
    }

    /// ### English
    /// The host surface is gone. A context preserved across its destruction is not reused: it is
    /// recreated, with `on_surface_created`, before the next draw.
    ///
    /// ### 中文
    /// 宿主 surface 已销毁。在销毁期间被保留的上下文不会被复用：下一次绘制前会重建，并再次调用
    /// `on_surface_created`。
    pub(crate) fn surface_destroyed(&self) {
        self.monitor.update(|state| {
            state.has_surface = false;
            state.native_window = None;
            if state.preserve_context_on_pause {
                state.context_lost = true;
            }
        });
        debug!("host surface destroyed");
    }

    pub(crate) fn set_preserve_context_on_pause(&self, preserve: bool) {
        self.monitor
            .update(|state| state.preserve_context_on_pause = preserve);
    }

    pub(crate) fn set_debug_flags(&self, debug_flags: u32) {
        self.monitor.update(|state| state.debug_flags = debug_flags);
    }
}
