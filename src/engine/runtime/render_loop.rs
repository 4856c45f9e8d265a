//! ### English
//! Render thread body: the wait/wake state machine that owns the context manager and the renderer.
//!
//! Each iteration plans one step with the monitor lock held, then executes it with the lock
//! released. Renderer callbacks, capability strategies, and queued tasks therefore never run under
//! the lock and may call back into the control surface.
//!
//! ### 中文
//! 渲染线程主体：持有上下文管理器与渲染器的等待/唤醒状态机。
//!
//! 每次循环先在持锁状态下规划一步，再在释放锁后执行。因此渲染回调、能力策略与排队任务都不会在持锁时运行，
//! 可以安全地回调控制接口。

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use dpi::PhysicalSize;
use log::{debug, error, trace, warn};

use crate::engine::context_manager::ContextManager;
use crate::engine::error::{RenderStage, RenderThreadError};
use crate::engine::flags::{self, GL_RENDER_VIEW_DEBUG_CHECK_FRAMES, GL_RENDER_VIEW_DEBUG_LOG_CALLS};
use crate::engine::handles::NativeWindow;
use crate::engine::renderer::Renderer;
use crate::engine::strategy::PresentOutcome;

use super::monitor::{Monitor, RenderState};
use super::task_queue::TaskBatch;

/// ### English
/// Everything a render thread owns; handed back on a clean exit so the view can restart it.
///
/// ### 中文
/// 渲染线程持有的全部对象；正常退出时交还，使 view 可以重新启动线程。
pub(crate) struct WorkerParts {
    pub renderer: Box<dyn Renderer>,
    pub context: ContextManager,
}

/// ### English
/// Inputs of one frame, captured under the lock.
///
/// ### 中文
/// 单帧输入，在持锁时采集。
struct FramePlan {
    window: NativeWindow,
    generation: u64,
    size: PhysicalSize<u32>,
    size_changed: bool,
    context_lost: bool,
    tasks: TaskBatch,
}

enum Step {
    /// ### English
    /// Exit requested: run leftover tasks, release everything, stop.
    ///
    /// ### 中文
    /// 收到退出请求：执行剩余任务、释放全部资源、停止。
    Exit(TaskBatch),
    /// ### English
    /// Pause requested: release resources, then acknowledge.
    ///
    /// ### 中文
    /// 收到暂停请求：先释放资源，再确认暂停。
    EnterPause { preserve_context: bool },
    /// ### English
    /// Not drawable but still holding native objects.
    ///
    /// ### 中文
    /// 当前不可绘制但仍持有原生对象。
    Release { preserve_context: bool },
    RunTasks(TaskBatch),
    Frame(FramePlan),
}

enum Plan {
    Run(Step),
    Again,
    Wait,
}

pub(super) struct RenderLoop {
    monitor: Arc<Monitor>,
    renderer: Box<dyn Renderer>,
    context: ContextManager,
}

impl RenderLoop {
    pub(super) fn new(monitor: Arc<Monitor>, parts: WorkerParts) -> Self {
        Self {
            monitor,
            renderer: parts.renderer,
            context: parts.context,
        }
    }

    pub(super) fn into_parts(self) -> WorkerParts {
        WorkerParts {
            renderer: self.renderer,
            context: self.context,
        }
    }

    /// ### English
    /// Runs until exit is requested or a fatal error occurs.
    ///
    /// ### 中文
    /// 持续运行，直到收到退出请求或发生致命错误。
    pub(super) fn run(&mut self) -> Result<(), RenderThreadError> {
        loop {
            let step = self.next_step();
            match step {
                Step::Exit(tasks) => {
                    if !tasks.is_empty() {
                        debug!("running {} queued task(s) before exit", tasks.len());
                    }
                    tasks.run();
                    self.context.release_all();
                    return Ok(());
                }
                Step::EnterPause { preserve_context } => {
                    self.context.release(preserve_context);
                    // A resume may have arrived while releasing; acknowledge the current request.
                    let paused = self.monitor.update(|state| {
                        state.is_paused = state.request_paused;
                        state.is_paused
                    });
                    if paused {
                        debug!("render thread paused (context preserved: {preserve_context})");
                    }
                }
                Step::Release { preserve_context } => {
                    self.context.release(preserve_context);
                }
                Step::RunTasks(tasks) => tasks.run(),
                Step::Frame(frame) => self.draw_frame(frame)?,
            }
        }
    }

    /// ### English
    /// Blocks until there is a step to execute.
    ///
    /// ### 中文
    /// 阻塞直到有可执行的步骤。
    fn next_step(&mut self) -> Step {
        let monitor = self.monitor.clone();
        let mut state = monitor.lock();
        loop {
            match self.plan(&mut state) {
                Plan::Run(step) => return step,
                // `plan` mutated the record in place; wake observers of `is_paused`.
                Plan::Again => monitor.notify_all(),
                Plan::Wait => state = monitor.wait(state),
            }
        }
    }

    fn plan(&mut self, state: &mut RenderState) -> Plan {
        self.context.set_debug_flags(state.debug_flags);

        if state.should_exit {
            return Plan::Run(Step::Exit(state.events.take_batch()));
        }

        if state.request_paused != state.is_paused {
            if state.request_paused {
                return Plan::Run(Step::EnterPause {
                    preserve_context: state.preserve_context_on_pause,
                });
            }
            state.is_paused = false;
            debug!("render thread resumed");
            return Plan::Again;
        }

        let drawable = state.has_surface && !state.is_paused;
        let window = state.native_window.filter(|_| drawable);

        if window.is_none()
            && (self.context.has_surface()
                || (self.context.has_context() && !state.preserve_context_on_pause))
        {
            return Plan::Run(Step::Release {
                preserve_context: state.preserve_context_on_pause,
            });
        }

        if state.should_wait() {
            return Plan::Wait;
        }

        match window {
            // A surface without area only gets tasks; the frame waits for a real size.
            Some(window) if state.has_drawable_size() => {
                state.request_render = false;
                Plan::Run(Step::Frame(FramePlan {
                    window,
                    generation: state.surface_generation,
                    size: state.surface_size,
                    size_changed: std::mem::take(&mut state.size_changed),
                    context_lost: std::mem::take(&mut state.context_lost),
                    tasks: state.events.take_batch(),
                }))
            }
            _ => Plan::Run(Step::RunTasks(state.events.take_batch())),
        }
    }

    fn draw_frame(&mut self, frame: FramePlan) -> Result<(), RenderThreadError> {
        let debug_flags = self.monitor.read(|state| state.debug_flags);
        let log_calls = flags::enabled(debug_flags, GL_RENDER_VIEW_DEBUG_LOG_CALLS);
        let started = Instant::now();

        let ensured = self
            .context
            .ensure(frame.window, frame.generation, frame.context_lost)?;

        if ensured.context_created {
            if let Some(config) = self.context.config() {
                if log_calls {
                    trace!("renderer.on_surface_created({config:?})");
                }
                self.renderer
                    .on_surface_created(config)
                    .map_err(|source| RenderThreadError::Renderer {
                        stage: RenderStage::SurfaceCreated,
                        source,
                    })?;
            }
        }

        if ensured.surface_created || frame.size_changed {
            if log_calls {
                trace!("renderer.on_surface_changed({:?})", frame.size);
            }
            self.renderer
                .on_surface_changed(frame.size)
                .map_err(|source| RenderThreadError::Renderer {
                    stage: RenderStage::SurfaceChanged,
                    source,
                })?;
        }

        frame.tasks.run();

        if log_calls {
            trace!("renderer.on_draw_frame()");
        }
        self.renderer
            .on_draw_frame()
            .map_err(|source| RenderThreadError::Renderer {
                stage: RenderStage::DrawFrame,
                source,
            })?;

        let outcome = self.context.present()?;
        if outcome == PresentOutcome::ContextLost {
            warn!("presentation reported a lost context");
        }
        let frames_drawn = self.monitor.update(|state| {
            state.frames_drawn += 1;
            if outcome == PresentOutcome::ContextLost {
                state.context_lost = true;
            }
            state.frames_drawn
        });

        if flags::enabled(debug_flags, GL_RENDER_VIEW_DEBUG_CHECK_FRAMES) {
            trace!(
                "frame {frames_drawn} took {:?} ({outcome:?})",
                started.elapsed()
            );
        }
        Ok(())
    }

    /// ### English
    /// Best-effort release after a failure; never panics out.
    ///
    /// ### 中文
    /// 失败后的尽力释放；不会向外 panic。
    fn release_after_failure(&mut self) {
        let released = panic::catch_unwind(AssertUnwindSafe(|| self.context.release_all()));
        if released.is_err() {
            error!("releasing native resources panicked; some handles may leak");
        }
    }
}

/// ### English
/// Marks the generation as exited when dropped, including during unwinding.
///
/// After a failure the queue is closed and every task still in it is dropped unrun: a failed
/// render thread is never restarted, so nothing would ever run them.
///
/// ### 中文
/// drop 时（包括栈展开期间）将当前代次标记为已退出。
///
/// 失败后会关闭队列，并丢弃其中所有未执行的任务：失败的渲染线程永远不会被重启，这些任务也就不会再被执行。
struct ExitGuard {
    monitor: Arc<Monitor>,
    failure: Option<RenderThreadError>,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        let failure = self.failure.take().map(Arc::new);
        let abandoned = self.monitor.update(|state| {
            state.exited = true;
            let failed = failure.is_some();
            state.failure = failure;
            if failed {
                state.closed = true;
                Some(state.events.take_batch())
            } else {
                None
            }
        });
        if let Some(tasks) = abandoned.filter(|tasks| !tasks.is_empty()) {
            debug!("dropping {} queued task(s) after render thread failure", tasks.len());
            drop(tasks);
        }
    }
}

/// ### English
/// Render thread entry function.
///
/// Returns the worker parts on a clean exit, `None` after a fatal error (the failed renderer is
/// never restarted).
///
/// ### 中文
/// 渲染线程入口函数。
///
/// 正常退出时返回工作对象；发生致命错误后返回 `None`（失败的渲染器不会再被重启）。
pub(super) fn run_render_thread(monitor: Arc<Monitor>, parts: WorkerParts) -> Option<WorkerParts> {
    let mut guard = ExitGuard {
        monitor: monitor.clone(),
        failure: None,
    };
    let mut render_loop = RenderLoop::new(monitor, parts);
    debug!("render thread started");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| render_loop.run()));
    let failure = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(err)) => Some(err),
        Err(payload) => Some(RenderThreadError::Panicked {
            message: panic_message(payload.as_ref()),
        }),
    };

    match failure {
        None => {
            debug!("render thread exited");
            Some(render_loop.into_parts())
        }
        Some(err) => {
            error!("render thread terminated: {err}");
            render_loop.release_after_failure();
            guard.failure = Some(err);
            None
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
