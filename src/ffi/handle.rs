//! ### English
//! C ABI bindings for the thread-safe render handle.
//!
//! A handle stays valid after its view is destroyed; calls then have no effect.
//!
//! ### 中文
//! 线程安全渲染句柄的 C ABI 绑定。
//!
//! view 销毁之后句柄依然有效，只是调用不再产生任何效果。

use std::ffi::c_void;

use crate::engine::RenderMode;

use super::callbacks::ForeignTask;
use super::{
    GL_RENDER_VIEW_ERR_INVALID_ARGUMENT, GL_RENDER_VIEW_ERR_NULL_POINTER, GL_RENDER_VIEW_OK,
    GlRenderView, GlRenderViewHandle, GlRenderViewTaskFn,
};

#[unsafe(no_mangle)]
/// ### English
/// Creates a thread-safe handle for `view`. Returns NULL until a renderer is configured.
///
/// ### 中文
/// 为 `view` 创建线程安全句柄；渲染器配置之前返回 NULL。
pub unsafe extern "C" fn gl_render_view_handle_create(
    view: *const GlRenderView,
) -> *mut GlRenderViewHandle {
    if view.is_null() {
        return std::ptr::null_mut();
    }
    let Some(handle) = (unsafe { (*view).coordinator.handle() }) else {
        return std::ptr::null_mut();
    };
    Box::into_raw(Box::new(GlRenderViewHandle { handle }))
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn gl_render_view_handle_destroy(handle: *mut GlRenderViewHandle) {
    if handle.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(handle));
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn gl_render_view_handle_request_render(handle: *const GlRenderViewHandle) {
    if handle.is_null() {
        return;
    }
    unsafe { (*handle).handle.request_render() };
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn gl_render_view_handle_set_render_mode(
    handle: *const GlRenderViewHandle,
    mode: u32,
) -> i32 {
    if handle.is_null() {
        return GL_RENDER_VIEW_ERR_NULL_POINTER;
    }
    let Some(mode) = RenderMode::from_raw(mode) else {
        return GL_RENDER_VIEW_ERR_INVALID_ARGUMENT;
    };
    unsafe { (*handle).handle.set_render_mode(mode) };
    GL_RENDER_VIEW_OK
}

#[unsafe(no_mangle)]
/// ### English
/// Queues `callback(user_data)` to run once on the render thread, from any thread.
///
/// Returns `false` without calling `callback` once the view was shut down or its render thread
/// failed; `user_data` then stays with the caller.
///
/// ### 中文
/// 可在任意线程调用：将 `callback(user_data)` 排队到渲染线程执行一次。
///
/// view 已 shutdown 或渲染线程已失败时返回 `false` 且不调用 `callback`；此时 `user_data` 仍归调用方所有。
pub unsafe extern "C" fn gl_render_view_handle_queue_event(
    handle: *const GlRenderViewHandle,
    callback: Option<GlRenderViewTaskFn>,
    user_data: *mut c_void,
) -> bool {
    if handle.is_null() {
        return false;
    }
    let Some(callback) = callback else {
        return false;
    };
    let task = ForeignTask::new(callback, user_data);
    unsafe { (*handle).handle.queue_event(move || task.run()) }
}
