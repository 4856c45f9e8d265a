//! ### English
//! Render thread coordinator: the control surface consumed by the hosting view.
//!
//! The coordinator is either `Unconfigured` (collecting set-once configuration, no thread) or
//! `Configured` (renderer locked in, one render thread per attached generation). The transition is
//! irreversible. Every control call made while unconfigured is a no-op that leaves the state record
//! untouched.
//!
//! ### 中文
//! 渲染线程协调器：供宿主 view 使用的控制接口。
//!
//! 协调器处于 `Unconfigured`（收集只能设置一次的配置，无线程）或 `Configured`（渲染器已锁定，每个挂载代次一个渲染线程）
//! 两种状态之一，且该转换不可逆。未配置状态下的所有控制调用均为空操作，不会改动状态记录。

use std::sync::Arc;
use std::time::Duration;

use dpi::PhysicalSize;
use log::{debug, warn};

use crate::engine::config::ViewConfig;
use crate::engine::context_manager::ContextManager;
use crate::engine::error::{ConfigError, RenderThreadError};
use crate::engine::handles::NativeWindow;
use crate::engine::renderer::{RenderMode, Renderer};
use crate::engine::strategy::{
    ConfigAttributes, ConfigChooser, ConfigCriteria, ContextFactory, Strategies,
    WindowSurfaceFactory,
};

use super::monitor::Monitor;
use super::render_handle::RenderHandle;
use super::render_loop::WorkerParts;
use super::render_thread::RenderThread;

/// ### English
/// Configuration collected before the renderer exists.
///
/// ### 中文
/// 渲染器创建之前收集的配置。
#[derive(Default)]
struct Pending {
    config: ViewConfig,
    config_chooser: Option<Box<dyn ConfigChooser>>,
    context_factory: Option<Box<dyn ContextFactory>>,
    window_surface_factory: Option<Box<dyn WindowSurfaceFactory>>,
}

/// ### English
/// Runtime side of a configured coordinator.
///
/// ### 中文
/// 已配置协调器的运行时部分。
struct Configured {
    /// ### English
    /// Render thread of the current generation, if one was started and not yet joined.
    ///
    /// ### 中文
    /// 当前代次的渲染线程（已启动且尚未 join 时存在）。
    thread: Option<RenderThread>,
    /// ### English
    /// Parts returned by a cleanly exited thread, kept for the next attach.
    ///
    /// ### 中文
    /// 正常退出的线程交还的工作对象，留待下一次 attach 使用。
    parked: Option<WorkerParts>,
    /// ### English
    /// `shutdown()` was called; the view never starts another thread.
    ///
    /// ### 中文
    /// 已调用 `shutdown()`；该 view 不会再启动新的线程。
    shut_down: bool,
}

enum Lifecycle {
    Unconfigured(Pending),
    Configured(Configured),
}

/// ### English
/// Coordinates the host view, the render thread, and the renderer of one GL view.
///
/// Dropping the coordinator performs the same teardown as detaching: it requests exit and joins
/// the render thread, releasing every native object deterministically.
///
/// ### 中文
/// 协调单个 GL view 的宿主 view、渲染线程与渲染器。
///
/// drop 协调器时执行与 detach 相同的清理：请求退出并 join 渲染线程，确定性地释放所有原生对象。
pub struct RenderCoordinator {
    monitor: Arc<Monitor>,
    handle: RenderHandle,
    lifecycle: Lifecycle,
    /// ### English
    /// The host view is detached from its window.
    ///
    /// ### 中文
    /// 宿主 view 已从其窗口分离。
    detached: bool,
}

impl Default for RenderCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderCoordinator {
    pub fn new() -> Self {
        Self::with_config(ViewConfig::default())
    }

    /// ### English
    /// Creates an unconfigured coordinator with the given initial configuration.
    ///
    /// ### 中文
    /// 以给定的初始配置创建一个未配置的协调器。
    pub fn with_config(config: ViewConfig) -> Self {
        let monitor = Arc::new(Monitor::new());
        Self {
            handle: RenderHandle::new(monitor.clone()),
            monitor,
            lifecycle: Lifecycle::Unconfigured(Pending {
                config,
                ..Pending::default()
            }),
            detached: false,
        }
    }

    fn pending_mut(&mut self, what: &'static str) -> Result<&mut Pending, ConfigError> {
        match &mut self.lifecycle {
            Lifecycle::Unconfigured(pending) => Ok(pending),
            Lifecycle::Configured(_) => Err(ConfigError::ConfigLocked { what }),
        }
    }

    fn configured(&self) -> Option<&Configured> {
        match &self.lifecycle {
            Lifecycle::Configured(configured) => Some(configured),
            Lifecycle::Unconfigured(_) => None,
        }
    }

    /// ### English
    /// Control handle, only available when a renderer is configured.
    ///
    /// ### 中文
    /// 控制句柄；仅在渲染器配置后可用。
    fn live(&self) -> Option<&RenderHandle> {
        self.configured().map(|_| &self.handle)
    }

    // ---------------------------------------------------------------------------------------------
    // Set-once configuration
    // ---------------------------------------------------------------------------------------------

    /// ### English
    /// Sets the context client version (`0` = factory default). Locked once a renderer exists.
    ///
    /// ### 中文
    /// 设置上下文 client 版本（`0` 表示工厂默认）；渲染器存在后锁定。
    pub fn set_client_version(&mut self, client_version: u32) -> Result<(), ConfigError> {
        self.pending_mut("client version")?.config.client_version = client_version;
        Ok(())
    }

    /// ### English
    /// Requests explicit bit depths from the config chooser. Locked once a renderer exists.
    ///
    /// ### 中文
    /// 向配置选择器请求显式位深；渲染器存在后锁定。
    pub fn set_config_attributes(&mut self, attributes: ConfigAttributes) -> Result<(), ConfigError> {
        self.pending_mut("config criteria")?.config.criteria = ConfigCriteria::Explicit(attributes);
        Ok(())
    }

    /// ### English
    /// Shorthand for RGB888 with (`true`) or without (`false`) a 16-bit depth buffer.
    ///
    /// ### 中文
    /// RGB888 的简写：带（`true`）或不带（`false`）16 位深度缓冲。
    pub fn set_depth_buffer(&mut self, needs_depth: bool) -> Result<(), ConfigError> {
        self.pending_mut("config criteria")?.config.criteria = ConfigCriteria::DepthBuffer(needs_depth);
        Ok(())
    }

    pub fn set_config_chooser(
        &mut self,
        chooser: impl ConfigChooser + 'static,
    ) -> Result<(), ConfigError> {
        self.pending_mut("config chooser")?.config_chooser = Some(Box::new(chooser));
        Ok(())
    }

    pub fn set_context_factory(
        &mut self,
        factory: impl ContextFactory + 'static,
    ) -> Result<(), ConfigError> {
        self.pending_mut("context factory")?.context_factory = Some(Box::new(factory));
        Ok(())
    }

    pub fn set_window_surface_factory(
        &mut self,
        factory: impl WindowSurfaceFactory + 'static,
    ) -> Result<(), ConfigError> {
        self.pending_mut("window surface factory")?.window_surface_factory = Some(Box::new(factory));
        Ok(())
    }

    /// ### English
    /// Installs all three strategies at once.
    ///
    /// ### 中文
    /// 一次性安装全部三个能力策略。
    pub fn set_strategies(&mut self, strategies: Strategies) -> Result<(), ConfigError> {
        let pending = self.pending_mut("capability strategies")?;
        pending.config_chooser = Some(strategies.config_chooser);
        pending.context_factory = Some(strategies.context_factory);
        pending.window_surface_factory = Some(strategies.window_surface_factory);
        Ok(())
    }

    // ---------------------------------------------------------------------------------------------
    // Settings that may change at any time
    // ---------------------------------------------------------------------------------------------

    /// ### English
    /// Keeps the context alive across pause (only the surface is released).
    ///
    /// ### 中文
    /// 暂停期间保留上下文（只释放 surface）。
    pub fn set_preserve_context_on_pause(&mut self, preserve: bool) {
        match &mut self.lifecycle {
            Lifecycle::Unconfigured(pending) => pending.config.preserve_context_on_pause = preserve,
            Lifecycle::Configured(_) => self.handle.set_preserve_context_on_pause(preserve),
        }
    }

    pub fn preserve_context_on_pause(&self) -> bool {
        match &self.lifecycle {
            Lifecycle::Unconfigured(pending) => pending.config.preserve_context_on_pause,
            Lifecycle::Configured(_) => self.monitor.read(|state| state.preserve_context_on_pause),
        }
    }

    /// ### English
    /// Sets the debug bitmask (see [`crate::engine::flags`]). Observability only.
    ///
    /// ### 中文
    /// 设置调试位掩码（见 [`crate::engine::flags`]）；只影响可观测性。
    pub fn set_debug_flags(&mut self, debug_flags: u32) {
        match &mut self.lifecycle {
            Lifecycle::Unconfigured(pending) => pending.config.debug_flags = debug_flags,
            Lifecycle::Configured(_) => self.handle.set_debug_flags(debug_flags),
        }
    }

    pub fn debug_flags(&self) -> u32 {
        match &self.lifecycle {
            Lifecycle::Unconfigured(pending) => pending.config.debug_flags,
            Lifecycle::Configured(_) => self.monitor.read(|state| state.debug_flags),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Renderer
    // ---------------------------------------------------------------------------------------------

    /// ### English
    /// Locks in `renderer` and the configuration, and starts the render thread.
    ///
    /// The thread starts waiting for a surface. Fails with [`ConfigError::AlreadyConfigured`] on a
    /// second call, and with [`ConfigError::MissingStrategy`] when a capability strategy was never
    /// supplied; in both cases nothing changes.
    ///
    /// ### 中文
    /// 锁定 `renderer` 与配置，并启动渲染线程。
    ///
    /// 线程启动后等待 surface。第二次调用返回 [`ConfigError::AlreadyConfigured`]；若缺少能力策略则返回
    /// [`ConfigError::MissingStrategy`]；两种情况下状态都不变。
    pub fn configure_renderer(&mut self, renderer: impl Renderer) -> Result<(), ConfigError> {
        let Lifecycle::Unconfigured(pending) = &mut self.lifecycle else {
            return Err(ConfigError::AlreadyConfigured);
        };
        let strategies = match (
            pending.config_chooser.take(),
            pending.context_factory.take(),
            pending.window_surface_factory.take(),
        ) {
            (Some(config_chooser), Some(context_factory), Some(window_surface_factory)) => {
                Strategies {
                    config_chooser,
                    context_factory,
                    window_surface_factory,
                }
            }
            (config_chooser, context_factory, window_surface_factory) => {
                let what = if config_chooser.is_none() {
                    "config chooser"
                } else if context_factory.is_none() {
                    "context factory"
                } else {
                    "window surface factory"
                };
                pending.config_chooser = config_chooser;
                pending.context_factory = context_factory;
                pending.window_surface_factory = window_surface_factory;
                return Err(ConfigError::MissingStrategy { what });
            }
        };

        let config = pending.config;
        let context = ContextManager::new(strategies, config.criteria, config.client_version);
        let parts = WorkerParts {
            renderer: Box::new(renderer),
            context,
        };
        match RenderThread::spawn(self.monitor.clone(), parts) {
            Ok(thread) => {
                // Surface notifications were ignored until now, so the new thread holds nothing these affect.
                self.monitor.update(|state| {
                    state.preserve_context_on_pause = config.preserve_context_on_pause;
                    state.debug_flags = config.debug_flags;
                });
                debug!("renderer configured ({config:?})");
                self.lifecycle = Lifecycle::Configured(Configured {
                    thread: Some(thread),
                    parked: None,
                    shut_down: false,
                });
                Ok(())
            }
            Err((err, parts)) => {
                let strategies = parts.context.into_strategies();
                pending.config_chooser = Some(strategies.config_chooser);
                pending.context_factory = Some(strategies.context_factory);
                pending.window_surface_factory = Some(strategies.window_surface_factory);
                Err(ConfigError::Spawn(err))
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.configured().is_some()
    }

    /// ### English
    /// Thread-safe control handle for other threads; `None` until a renderer is configured.
    ///
    /// ### 中文
    /// 供其它线程使用的线程安全控制句柄；渲染器配置之前为 `None`。
    pub fn handle(&self) -> Option<RenderHandle> {
        self.live().cloned()
    }

    // ---------------------------------------------------------------------------------------------
    // Control surface
    // ---------------------------------------------------------------------------------------------

    pub fn set_render_mode(&self, mode: RenderMode) {
        if let Some(handle) = self.live() {
            handle.set_render_mode(mode);
        }
    }

    pub fn render_mode(&self) -> RenderMode {
        self.monitor.read(|state| state.render_mode)
    }

    pub fn request_render(&self) {
        if let Some(handle) = self.live() {
            handle.request_render();
        }
    }

    /// ### English
    /// Requests pause and returns immediately; the render thread releases its surface (and its
    /// context unless preserved) and then acknowledges via [`Self::is_paused`].
    ///
    /// ### 中文
    /// 请求暂停并立即返回；渲染线程释放 surface（未保留时也释放上下文）后，通过 [`Self::is_paused`] 确认。
    pub fn pause(&self) {
        if let Some(handle) = self.live() {
            handle.pause();
        }
    }

    pub fn resume(&self) {
        if let Some(handle) = self.live() {
            handle.resume();
        }
    }

    /// ### English
    /// Queues `task` for the render thread and reports whether it was accepted.
    ///
    /// Without a renderer, after `shutdown()`, or once the render thread failed, the task is dropped
    /// unrun and `false` is returned. Tasks queued while detached wait for the next attach.
    ///
    /// ### 中文
    /// 将 `task` 排队到渲染线程，并返回是否被接收。
    ///
    /// 没有渲染器、已调用 `shutdown()` 或渲染线程已失败时，任务会被直接丢弃而不执行，并返回 `false`。
    /// detach 期间排队的任务会等到下一次 attach 再执行。
    pub fn queue_event(&self, task: impl FnOnce() + Send + 'static) -> bool {
        match self.live() {
            Some(handle) => handle.queue_event(task),
            None => {
                debug!("queue_event ignored: no renderer configured");
                false
            }
        }
    }

    pub fn notify_surface_created(&self, window: NativeWindow) {
        if let Some(handle) = self.live() {
            handle.surface_created(window);
        }
    }

    /// ### English
    /// Surface created together with its initial size (one wake-up for both).
    ///
    /// ### 中文
    /// surface 连同初始尺寸一起创建（两者只触发一次唤醒）。
    pub fn notify_surface_available(&self, window: NativeWindow, width: u32, height: u32) {
        if let Some(handle) = self.live() {
            handle.surface_available(window, PhysicalSize::new(width, height));
        }
    }

    pub fn notify_surface_changed(&self, width: u32, height: u32) {
        if let Some(handle) = self.live() {
            handle.surface_changed(PhysicalSize::new(width, height));
        }
    }

    pub fn notify_surface_destroyed(&self) {
        if let Some(handle) = self.live() {
            handle.surface_destroyed();
        }
    }

    /// ### English
    /// The host view was attached to a window: clears `detached` and makes sure a render thread is
    /// running (restarting it after a detach). No-op while unconfigured or after `shutdown()`.
    ///
    /// ### 中文
    /// 宿主 view 已挂载到窗口：清除 `detached` 并确保渲染线程在运行（detach 之后会重新启动）。
    /// 未配置或已 `shutdown()` 时为空操作。
    pub fn on_window_attached(&mut self) {
        self.detached = false;
        let Lifecycle::Configured(configured) = &mut self.lifecycle else {
            return;
        };
        if configured.shut_down {
            debug!("window attached after shutdown; render thread stays stopped");
            return;
        }
        if configured.thread.as_ref().is_some_and(RenderThread::is_alive) {
            return;
        }
        if let Some(finished) = configured.thread.take() {
            if let Some(parts) = finished.join() {
                configured.parked = Some(parts);
            }
        }
        let Some(parts) = configured.parked.take() else {
            warn!("render thread failed earlier; it is not restarted on attach");
            return;
        };
        match RenderThread::spawn(self.monitor.clone(), parts) {
            Ok(thread) => configured.thread = Some(thread),
            Err((err, parts)) => {
                warn!("restarting the render thread failed: {err}");
                configured.parked = Some(parts);
            }
        }
    }

    /// ### English
    /// The host view was detached from its window: sets `detached`, asks the render thread to exit,
    /// and blocks until it has released its native objects and terminated. The render mode and the
    /// renderer are kept for a later attach.
    ///
    /// ### 中文
    /// 宿主 view 已从窗口分离：设置 `detached`，请求渲染线程退出，并阻塞直到其释放原生对象并结束。
    /// 渲染模式与渲染器会保留，供之后重新 attach 使用。
    pub fn on_window_detached(&mut self) {
        self.detached = true;
        let Lifecycle::Configured(configured) = &mut self.lifecycle else {
            return;
        };
        if let Some(thread) = configured.thread.take() {
            if let Some(parts) = thread.stop() {
                configured.parked = Some(parts);
            }
            debug!("render thread stopped on detach");
        }
    }

    /// ### English
    /// Requests render-thread exit without blocking. Idempotent; the view never restarts the thread
    /// afterwards. Use [`Self::wait_for_exit`] to synchronize later.
    ///
    /// Tasks queued before the call still run on a live thread before it exits. The queue is closed
    /// from here on, and tasks left over from a detach (no thread to run them) are dropped unrun.
    ///
    /// ### 中文
    /// 请求渲染线程退出，不阻塞；可重复调用，之后该 view 不会再重启线程。需要同步时请使用 [`Self::wait_for_exit`]。
    ///
    /// 调用之前排队的任务仍会在存活线程退出前执行。此后队列关闭；detach 遗留的任务（已无线程执行）会被直接丢弃。
    pub fn shutdown(&mut self) {
        let Lifecycle::Configured(configured) = &mut self.lifecycle else {
            return;
        };
        configured.shut_down = true;
        configured.parked = None;
        close_queue(&self.monitor, configured.thread.is_none());
        if let Some(thread) = &configured.thread {
            thread.request_exit();
        }
    }

    /// ### English
    /// Waits up to `timeout` for the render thread to confirm exit. Returns `true` when no render
    /// thread is running afterwards.
    ///
    /// ### 中文
    /// 最多等待 `timeout`，直到渲染线程确认退出；之后若没有正在运行的渲染线程则返回 `true`。
    pub fn wait_for_exit(&self, timeout: Duration) -> bool {
        match self.configured().and_then(|configured| configured.thread.as_ref()) {
            Some(_) => self.monitor.wait_until(timeout, |state| state.exited),
            None => true,
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Observers
    // ---------------------------------------------------------------------------------------------

    /// ### English
    /// Whether the render thread of the current generation is running.
    ///
    /// ### 中文
    /// 当前代次的渲染线程是否在运行。
    pub fn is_alive(&self) -> bool {
        self.configured()
            .and_then(|configured| configured.thread.as_ref())
            .is_some_and(RenderThread::is_alive)
    }

    pub fn has_exited(&self) -> bool {
        self.monitor.read(|state| state.exited)
    }

    /// ### English
    /// Acknowledged pause state (lags [`Self::pause`] until the render thread has released).
    ///
    /// ### 中文
    /// 已确认的暂停状态（在渲染线程完成释放之前会滞后于 [`Self::pause`]）。
    pub fn is_paused(&self) -> bool {
        self.monitor.read(|state| state.is_paused)
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn surface_size(&self) -> PhysicalSize<u32> {
        self.monitor.read(|state| state.surface_size)
    }

    pub fn has_surface(&self) -> bool {
        self.monitor.read(|state| state.has_surface)
    }

    /// ### English
    /// Number of frames drawn and presented so far, across generations.
    ///
    /// ### 中文
    /// 目前为止（跨代次）已绘制并呈现的帧数。
    pub fn frames_drawn(&self) -> u64 {
        self.monitor.read(|state| state.frames_drawn)
    }

    /// ### English
    /// Number of tasks still waiting in the queue.
    ///
    /// ### 中文
    /// 队列中仍在等待的任务数量。
    pub fn queued_events(&self) -> usize {
        self.monitor.read(|state| state.events.len())
    }

    /// ### English
    /// Fatal error that terminated the render thread, if any.
    ///
    /// ### 中文
    /// 终止渲染线程的致命错误（若有）。
    pub fn failure(&self) -> Option<Arc<RenderThreadError>> {
        self.monitor.read(|state| state.failure.clone())
    }

    /// ### English
    /// Blocks up to `timeout` until the render thread acknowledged the requested pause state.
    ///
    /// ### 中文
    /// 最多阻塞 `timeout`，直到渲染线程确认了所请求的暂停状态。
    pub fn wait_for_pause_ack(&self, timeout: Duration) -> bool {
        self.monitor.wait_until(timeout, |state| {
            state.exited || state.request_paused == state.is_paused
        })
    }
}

impl Drop for RenderCoordinator {
    /// ### English
    /// Stops and joins the render thread so native objects are released before the view goes away.
    ///
    /// ### 中文
    /// 停止并 join 渲染线程，确保在 view 消失之前释放原生对象。
    fn drop(&mut self) {
        if let Lifecycle::Configured(configured) = &mut self.lifecycle {
            if let Some(thread) = configured.thread.take() {
                thread.stop();
            }
            // Handles may outlive the view; nothing would ever run what they queue.
            close_queue(&self.monitor, true);
        }
    }
}

/// ### English
/// Closes the task queue for good. With `drain`, tasks still queued are dropped unrun.
///
/// ### 中文
/// 永久关闭任务队列；`drain` 为真时，仍在队列中的任务会被直接丢弃而不执行。
fn close_queue(monitor: &Monitor, drain: bool) {
    let abandoned = monitor.update(|state| {
        state.closed = true;
        drain.then(|| state.events.take_batch())
    });
    if let Some(tasks) = abandoned.filter(|tasks| !tasks.is_empty()) {
        debug!("dropping {} queued task(s) that can no longer run", tasks.len());
        drop(tasks);
    }
}
