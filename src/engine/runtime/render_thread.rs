//! ### English
//! Owner of one render-thread generation (spawn, exit request, join).
//!
//! ### 中文
//! 单个渲染线程代次的持有者（创建、请求退出、join）。

use std::io;
use std::sync::Arc;
use std::thread;

use crossbeam_channel as channel;
use log::{debug, warn};

use super::monitor::Monitor;
use super::render_loop::{self, WorkerParts};

/// ### English
/// Name given to every render thread.
///
/// ### 中文
/// 所有渲染线程使用的线程名。
const RENDER_THREAD_NAME: &str = "gl-render-thread";

pub(super) struct RenderThread {
    /// ### English
    /// Shared monitor; also held by the thread itself.
    ///
    /// ### 中文
    /// 共享 monitor；渲染线程自身也持有一份。
    monitor: Arc<Monitor>,
    /// ### English
    /// Join handle; yields the worker parts after a clean exit.
    ///
    /// ### 中文
    /// join handle；正常退出后返回工作对象。
    thread: thread::JoinHandle<Option<WorkerParts>>,
}

impl RenderThread {
    /// ### English
    /// Spawns a render thread that takes ownership of `parts`.
    ///
    /// The parts are handed over through a channel after the spawn succeeded, so a failed spawn
    /// gives them back to the caller untouched. The monitor is only reset for the new generation
    /// once the OS thread exists; a failed spawn leaves it as it was.
    ///
    /// #### Parameters
    /// - `monitor`: Monitor shared with the control surface.
    /// - `parts`: Renderer and context manager to run.
    ///
    /// ### 中文
    /// 创建一个接管 `parts` 的渲染线程。
    ///
    /// 工作对象在线程创建成功后才通过 channel 交给线程，因此创建失败时会原样交还给调用方。
    /// 只有在操作系统线程创建成功后才会为新代次重置 monitor；创建失败时 monitor 保持原样。
    ///
    /// #### 参数
    /// - `monitor`：与控制接口共享的 monitor。
    /// - `parts`：要运行的渲染器与上下文管理器。
    pub(super) fn spawn(
        monitor: Arc<Monitor>,
        parts: WorkerParts,
    ) -> Result<Self, (io::Error, WorkerParts)> {
        let builder = thread::Builder::new().name(RENDER_THREAD_NAME.to_string());
        Self::spawn_with(builder, monitor, parts)
    }

    fn spawn_with(
        builder: thread::Builder,
        monitor: Arc<Monitor>,
        parts: WorkerParts,
    ) -> Result<Self, (io::Error, WorkerParts)> {
        let (parts_tx, parts_rx) = channel::bounded::<WorkerParts>(1);
        let monitor_for_thread = monitor.clone();
        let spawned = builder.spawn(move || {
            let Ok(parts) = parts_rx.recv() else {
                monitor_for_thread.update(|state| state.exited = true);
                return None;
            };
            render_loop::run_render_thread(monitor_for_thread, parts)
        });

        let thread = match spawned {
            Ok(thread) => thread,
            Err(err) => return Err((err, parts)),
        };

        // The thread blocks on the channel until the generation is reset.
        monitor.update(|state| state.begin_generation());
        if let Err(channel::SendError(_parts)) = parts_tx.send(parts) {
            warn!("render thread went away before receiving its renderer");
        }
        debug!("spawned {RENDER_THREAD_NAME}");
        Ok(Self { monitor, thread })
    }

    /// ### English
    /// Whether the OS thread is still running.
    ///
    /// ### 中文
    /// 操作系统线程是否仍在运行。
    pub(super) fn is_alive(&self) -> bool {
        !self.thread.is_finished()
    }

    /// ### English
    /// Asks the thread to exit at its next loop evaluation. Does not block.
    ///
    /// ### 中文
    /// 请求线程在下一次循环判定时退出；不阻塞。
    pub(super) fn request_exit(&self) {
        self.monitor.update(|state| state.should_exit = true);
    }

    /// ### English
    /// Blocks until the thread has finished and returns its parts (`None` after a fatal error).
    ///
    /// ### 中文
    /// 阻塞直到线程结束，并返回其工作对象（发生致命错误后为 `None`）。
    pub(super) fn join(self) -> Option<WorkerParts> {
        match self.thread.join() {
            Ok(parts) => parts,
            Err(_) => {
                warn!("render thread unwound past its exit guard");
                None
            }
        }
    }

    /// ### English
    /// Requests exit and joins.
    ///
    /// ### 中文
    /// 请求退出并 join。
    pub(super) fn stop(self) -> Option<WorkerParts> {
        self.request_exit();
        self.join()
    }
}
