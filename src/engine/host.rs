//! ### English
//! Host lifecycle adapter.
//!
//! A UI toolkit reports the life of its drawing surface and of the view itself through a handful of
//! callbacks. [`HostEvent`] names them and [`RenderCoordinator::handle_host_event`] maps each one onto
//! exactly one coordinator call, so toolkit glue stays a thin forwarder.
//!
//! ### 中文
//! 宿主生命周期适配层。
//!
//! UI 工具包通过少量回调报告其绘制 surface 以及 view 自身的生命周期。[`HostEvent`] 为这些回调命名，
//! [`RenderCoordinator::handle_host_event`] 将每个事件一对一映射到协调器调用，使工具包胶水代码保持为简单的转发。

use crate::engine::handles::NativeWindow;
use crate::engine::runtime::RenderCoordinator;

/// ### English
/// Lifecycle notification raised by the host UI toolkit (always on its UI thread).
///
/// ### 中文
/// 宿主 UI 工具包发出的生命周期通知（总是在其 UI 线程上）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// ### English
    /// The drawing surface became available with its initial size.
    ///
    /// ### 中文
    /// 绘制 surface 已可用，并携带初始尺寸。
    SurfaceAvailable {
        window: NativeWindow,
        width: u32,
        height: u32,
    },
    SurfaceSizeChanged {
        width: u32,
        height: u32,
    },
    /// ### English
    /// The drawing surface is gone; the host may reclaim it once this call returns.
    ///
    /// ### 中文
    /// 绘制 surface 已销毁；该调用返回后宿主即可回收它。
    SurfaceDestroyed,
    /// ### English
    /// The view's layout size changed (may arrive before or without a surface change).
    ///
    /// ### 中文
    /// view 的布局尺寸发生变化（可能早于 surface 变化到达，也可能单独到达）。
    LayoutChanged {
        width: u32,
        height: u32,
    },
    AttachedToWindow,
    DetachedFromWindow,
}

impl RenderCoordinator {
    /// ### English
    /// Forwards one host notification to the matching control operation.
    ///
    /// `DetachedFromWindow` blocks until the render thread has exited.
    ///
    /// #### Parameters
    /// - `event`: Notification raised by the host toolkit.
    ///
    /// ### 中文
    /// 将一个宿主通知转发给对应的控制操作。
    ///
    /// `DetachedFromWindow` 会阻塞直到渲染线程退出。
    ///
    /// #### 参数
    /// - `event`：宿主工具包发出的通知。
    pub fn handle_host_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::SurfaceAvailable {
                window,
                width,
                height,
            } => self.notify_surface_available(window, width, height),
            HostEvent::SurfaceSizeChanged { width, height }
            | HostEvent::LayoutChanged { width, height } => {
                self.notify_surface_changed(width, height);
            }
            HostEvent::SurfaceDestroyed => self.notify_surface_destroyed(),
            HostEvent::AttachedToWindow => self.on_window_attached(),
            HostEvent::DetachedFromWindow => self.on_window_detached(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_events_are_no_ops_without_a_renderer() {
        let mut coordinator = RenderCoordinator::new();
        coordinator.handle_host_event(HostEvent::SurfaceAvailable {
            window: NativeWindow(7),
            width: 640,
            height: 480,
        });
        coordinator.handle_host_event(HostEvent::LayoutChanged {
            width: 800,
            height: 600,
        });
        assert!(!coordinator.has_surface());
        assert_eq!(coordinator.surface_size(), dpi::PhysicalSize::new(0, 0));
        assert!(!coordinator.is_alive());
    }

    #[test]
    fn detach_and_attach_toggle_the_detached_flag() {
        let mut coordinator = RenderCoordinator::new();
        coordinator.handle_host_event(HostEvent::DetachedFromWindow);
        assert!(coordinator.is_detached());
        coordinator.handle_host_event(HostEvent::AttachedToWindow);
        assert!(!coordinator.is_detached());
    }
}
