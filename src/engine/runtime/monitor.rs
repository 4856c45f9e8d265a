//! ### English
//! The render-thread monitor: one mutex-guarded state record plus one condition variable.
//!
//! Every cross-thread field lives in [`RenderState`] and is only touched with the lock held.
//! Every mutation goes through [`Monitor::update`], which notifies all waiters before the lock is
//! released.
//!
//! ### 中文
//! 渲染线程 monitor：一个受互斥锁保护的状态记录加一个条件变量。
//!
//! 所有跨线程字段都位于 [`RenderState`] 中，且只在持锁时访问；所有修改都通过 [`Monitor::update`] 完成，
//! 该方法会在释放锁之前唤醒全部等待者。

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use dpi::PhysicalSize;

use crate::engine::error::RenderThreadError;
use crate::engine::handles::NativeWindow;
use crate::engine::renderer::RenderMode;

use super::task_queue::TaskQueue;

/// ### English
/// Shared state record of one render view.
///
/// ### 中文
/// 单个渲染 view 的共享状态记录。
pub(crate) struct RenderState {
    /// ### English
    /// A live host surface exists.
    ///
    /// ### 中文
    /// 宿主 surface 当前存活。
    pub(super) has_surface: bool,
    /// ### English
    /// Host window handle delivered with the latest surface-created notification.
    ///
    /// ### 中文
    /// 最近一次 surface-created 通知携带的宿主窗口句柄。
    pub(super) native_window: Option<NativeWindow>,
    /// ### English
    /// Bumped on every surface-created notification so a replaced host surface is never reused.
    ///
    /// ### 中文
    /// 每次 surface-created 通知时递增，确保被替换的宿主 surface 不会被复用。
    pub(super) surface_generation: u64,
    pub(super) surface_size: PhysicalSize<u32>,
    /// ### English
    /// Set by size notifications, consumed by the next frame.
    ///
    /// ### 中文
    /// 由尺寸通知设置，由下一帧消费。
    pub(super) size_changed: bool,
    pub(super) request_paused: bool,
    pub(super) is_paused: bool,
    pub(super) render_mode: RenderMode,
    /// ### English
    /// Sticky "draw one more frame" request.
    ///
    /// ### 中文
    /// 粘性的“再绘制一帧”请求。
    pub(super) request_render: bool,
    pub(super) should_exit: bool,
    pub(super) exited: bool,
    /// ### English
    /// The held context may no longer be used: the host destroyed the surface while the context
    /// was preserved, or the last presentation reported a lost context. Context and surface are
    /// recreated before the next draw.
    ///
    /// ### 中文
    /// 当前持有的上下文不可再用：宿主在保留上下文期间销毁了 surface，或上一次呈现报告上下文丢失。
    /// 下一次绘制前会重建上下文与 surface。
    pub(super) context_lost: bool,
    pub(super) preserve_context_on_pause: bool,
    pub(super) debug_flags: u32,
    pub(super) events: TaskQueue,
    /// ### English
    /// The queue no longer accepts tasks: shutdown was requested or the render thread failed.
    ///
    /// ### 中文
    /// 队列不再接收任务：已请求 shutdown，或渲染线程已失败。
    pub(super) closed: bool,
    pub(super) frames_drawn: u64,
    /// ### English
    /// Fatal error that terminated the most recent render thread.
    ///
    /// ### 中文
    /// 终止最近一个渲染线程的致命错误。
    pub(super) failure: Option<Arc<RenderThreadError>>,
}

impl RenderState {
    fn new() -> Self {
        Self {
            has_surface: false,
            native_window: None,
            surface_generation: 0,
            surface_size: PhysicalSize::new(0, 0),
            size_changed: false,
            request_paused: false,
            is_paused: false,
            render_mode: RenderMode::default(),
            request_render: false,
            should_exit: false,
            exited: false,
            context_lost: false,
            preserve_context_on_pause: false,
            debug_flags: 0,
            events: TaskQueue::default(),
            closed: false,
            frames_drawn: 0,
            failure: None,
        }
    }

    /// ### English
    /// Resets the per-thread fields before a render thread (re)starts.
    ///
    /// Host-driven fields (surface, size, pause request, render mode, queued tasks) are kept so the
    /// new thread picks up exactly where the host currently is.
    ///
    /// ### 中文
    /// 在渲染线程（重新）启动前重置与线程相关的字段。
    ///
    /// 由宿主驱动的字段（surface、尺寸、暂停请求、渲染模式、排队任务）保持不变，使新线程从宿主当前状态继续。
    pub(super) fn begin_generation(&mut self) {
        self.should_exit = false;
        self.exited = false;
        self.is_paused = false;
        self.context_lost = false;
        self.size_changed = true;
        self.failure = None;
    }

    /// ### English
    /// Whether the host reported a size with two non-zero dimensions. Frames are never drawn into an
    /// empty surface.
    ///
    /// ### 中文
    /// 宿主上报的尺寸是否两个维度都非零；永远不会向空 surface 绘制。
    pub(super) fn has_drawable_size(&self) -> bool {
        self.surface_size.width > 0 && self.surface_size.height > 0
    }

    /// ### English
    /// True when the render thread has nothing to do and must block.
    ///
    /// ### 中文
    /// 当渲染线程无事可做、需要阻塞等待时返回 true。
    pub(super) fn should_wait(&self) -> bool {
        self.events.is_empty()
            && (!self.has_surface
                || self.is_paused
                || !self.has_drawable_size()
                || (self.render_mode == RenderMode::OnDemand && !self.request_render))
    }
}

pub(crate) struct Monitor {
    state: Mutex<RenderState>,
    cond: Condvar,
}

impl Monitor {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(RenderState::new()),
            cond: Condvar::new(),
        }
    }

    /// ### English
    /// Locks the state record.
    ///
    /// No user code ever runs with this lock held, so a poisoned lock still guards a consistent
    /// record and is recovered.
    ///
    /// ### 中文
    /// 锁定状态记录。
    ///
    /// 持有该锁时从不执行用户代码，因此即使锁被 poison，记录依然一致，直接恢复使用。
    pub(super) fn lock(&self) -> MutexGuard<'_, RenderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// ### English
    /// Blocks on the condition until notified.
    ///
    /// ### 中文
    /// 在条件变量上阻塞直至被唤醒。
    pub(super) fn wait<'a>(&self, guard: MutexGuard<'a, RenderState>) -> MutexGuard<'a, RenderState> {
        self.cond
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// ### English
    /// Mutates the record and wakes every waiter.
    ///
    /// ### 中文
    /// 修改状态记录并唤醒全部等待者。
    pub(super) fn update<R>(&self, mutate: impl FnOnce(&mut RenderState) -> R) -> R {
        let mut guard = self.lock();
        let result = mutate(&mut *guard);
        self.cond.notify_all();
        drop(guard);
        result
    }

    /// ### English
    /// Wakes every waiter; used when the record was mutated through a guard from [`Self::lock`].
    ///
    /// ### 中文
    /// 唤醒全部等待者；用于通过 [`Self::lock`] 返回的 guard 修改记录之后。
    pub(super) fn notify_all(&self) {
        self.cond.notify_all();
    }

    /// ### English
    /// Reads the record without notifying.
    ///
    /// ### 中文
    /// 只读访问状态记录（不唤醒）。
    pub(super) fn read<R>(&self, read: impl FnOnce(&RenderState) -> R) -> R {
        let guard = self.lock();
        read(&*guard)
    }

    /// ### English
    /// Waits until `done` holds or `timeout` elapses. Returns whether `done` holds.
    ///
    /// ### 中文
    /// 等待直到 `done` 成立或超时；返回 `done` 是否成立。
    pub(super) fn wait_until(
        &self,
        timeout: Duration,
        mut done: impl FnMut(&RenderState) -> bool,
    ) -> bool {
        let deadline = Instant::now() + timeout;
        let mut guard = self.lock();
        loop {
            if done(&*guard) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            guard = self
                .cond
                .wait_timeout(guard, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
    }
}
