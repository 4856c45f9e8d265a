//! ### English
//! Render thread orchestration (public API).
//!
//! ### 中文
//! 渲染线程编排（对外公开 API）。

mod monitor;
mod render_loop;
mod render_thread;
mod task_queue;

mod coordinator;
mod render_handle;

pub use coordinator::RenderCoordinator;
pub use render_handle::RenderHandle;
