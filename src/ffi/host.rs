//! ### English
//! C ABI bindings for host toolkit lifecycle notifications (UI thread only).
//!
//! ### 中文
//! 宿主工具包生命周期通知的 C ABI 绑定（仅限 UI 线程）。

use crate::engine::{HostEvent, NativeWindow};

use super::GlRenderView;

/// ### English
/// Forwards one host event to the view's coordinator; NULL views are ignored.
///
/// # Safety
/// `view` must be NULL or a live pointer returned by `gl_render_view_create`.
///
/// ### 中文
/// 将一个宿主事件转发给 view 的协调器；NULL view 会被忽略。
///
/// # Safety
/// `view` 必须为 NULL，或是由 `gl_render_view_create` 返回且仍存活的指针。
unsafe fn dispatch(view: *mut GlRenderView, event: HostEvent) {
    if view.is_null() {
        return;
    }
    unsafe { (*view).coordinator.handle_host_event(event) };
}

#[unsafe(no_mangle)]
/// ### English
/// The drawing surface became available.
///
/// `window` is the native window handle (e.g. an `ANativeWindow*` or GLFW window pointer cast to
/// `u64`) later passed to the window-surface strategy.
///
/// ### 中文
/// 绘制 surface 已可用。
///
/// `window` 为原生窗口句柄（例如 `ANativeWindow*` 或 GLFW 窗口指针转换为 `u64`），之后会传给窗口 surface 策略。
pub unsafe extern "C" fn gl_render_view_surface_available(
    view: *mut GlRenderView,
    window: u64,
    width: u32,
    height: u32,
) {
    unsafe {
        dispatch(
            view,
            HostEvent::SurfaceAvailable {
                window: NativeWindow(window),
                width,
                height,
            },
        )
    };
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn gl_render_view_surface_size_changed(
    view: *mut GlRenderView,
    width: u32,
    height: u32,
) {
    unsafe { dispatch(view, HostEvent::SurfaceSizeChanged { width, height }) };
}

#[unsafe(no_mangle)]
/// ### English
/// The drawing surface was destroyed. Returns immediately; the render thread releases its window
/// surface asynchronously.
///
/// ### 中文
/// 绘制 surface 已销毁。立即返回；渲染线程会异步释放其窗口 surface。
pub unsafe extern "C" fn gl_render_view_surface_destroyed(view: *mut GlRenderView) {
    unsafe { dispatch(view, HostEvent::SurfaceDestroyed) };
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn gl_render_view_layout_changed(
    view: *mut GlRenderView,
    width: u32,
    height: u32,
) {
    unsafe { dispatch(view, HostEvent::LayoutChanged { width, height }) };
}

#[unsafe(no_mangle)]
/// ### English
/// The view was attached to a window; restarts the render thread after a detach.
///
/// ### 中文
/// view 已挂载到窗口；在 detach 之后会重新启动渲染线程。
pub unsafe extern "C" fn gl_render_view_attached_to_window(view: *mut GlRenderView) {
    unsafe { dispatch(view, HostEvent::AttachedToWindow) };
}

#[unsafe(no_mangle)]
/// ### English
/// The view was detached from its window. Blocks until the render thread has exited.
///
/// ### 中文
/// view 已从窗口分离。阻塞直到渲染线程退出。
pub unsafe extern "C" fn gl_render_view_detached_from_window(view: *mut GlRenderView) {
    unsafe { dispatch(view, HostEvent::DetachedFromWindow) };
}
