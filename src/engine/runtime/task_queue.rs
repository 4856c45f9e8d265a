//! ### English
//! FIFO of deferred tasks waiting to run on the render thread.
//!
//! The queue lives inside the monitor-guarded state record; producers push under the lock and the
//! render thread takes the whole batch under the lock, then runs it with the lock released.
//!
//! ### 中文
//! 等待在渲染线程上执行的延迟任务 FIFO。
//!
//! 队列位于受 monitor 保护的状态记录中：生产者在持锁时 push，渲染线程在持锁时整批取走，再在释放锁后执行。

use std::collections::VecDeque;

use crate::engine::renderer::Task;

#[derive(Default)]
pub(super) struct TaskQueue {
    tasks: VecDeque<Task>,
}

impl TaskQueue {
    pub(super) fn push(&mut self, task: Task) {
        self.tasks.push_back(task);
    }

    pub(super) fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub(super) fn len(&self) -> usize {
        self.tasks.len()
    }

    /// ### English
    /// Takes every queued task, preserving submission order.
    ///
    /// ### 中文
    /// 取走全部排队任务，保持提交顺序。
    pub(super) fn take_batch(&mut self) -> TaskBatch {
        TaskBatch {
            tasks: std::mem::take(&mut self.tasks),
        }
    }
}

/// ### English
/// Tasks taken out of the queue, ready to run without the lock held.
///
/// ### 中文
/// 已从队列取出、可在不持锁时执行的一批任务。
#[derive(Default)]
pub(super) struct TaskBatch {
    tasks: VecDeque<Task>,
}

impl TaskBatch {
    pub(super) fn len(&self) -> usize {
        self.tasks.len()
    }

    pub(super) fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// ### English
    /// Runs every task once, in submission order.
    ///
    /// ### 中文
    /// 按提交顺序逐个执行每个任务一次。
    pub(super) fn run(self) {
        for task in self.tasks {
            task();
        }
    }
}
