//! ### English
//! C ABI bindings for view lifecycle, configuration, and render control.
//!
//! ### 中文
//! view 生命周期、配置与渲染控制的 C ABI 绑定。

use std::ffi::c_void;
use std::time::Duration;

use crate::engine::{ConfigAttributes, RenderCoordinator, RenderMode, ViewConfig};

use super::callbacks::{ForeignRenderer, ForeignTask, foreign_strategies, strategies_complete};
use super::{
    GL_RENDER_VIEW_ERR_INVALID_ARGUMENT, GL_RENDER_VIEW_ERR_NULL_POINTER, GL_RENDER_VIEW_OK,
    GlRenderView, GlRenderViewRenderer, GlRenderViewStrategies, GlRenderViewTaskFn, status_of,
};

#[unsafe(no_mangle)]
/// ### English
/// Creates one unconfigured view (no render thread yet).
///
/// `client_version = 0` lets the context factory pick its default; `debug_flags` is a bitmask of
/// `GL_RENDER_VIEW_DEBUG_*`.
///
/// ### 中文
/// 创建一个未配置的 view（尚无渲染线程）。
///
/// `client_version = 0` 表示由上下文工厂选择默认值；`debug_flags` 为 `GL_RENDER_VIEW_DEBUG_*` 位掩码。
pub extern "C" fn gl_render_view_create(client_version: u32, debug_flags: u32) -> *mut GlRenderView {
    let config = ViewConfig::default()
        .with_client_version(client_version)
        .with_debug_flags(debug_flags);
    Box::into_raw(Box::new(GlRenderView {
        coordinator: RenderCoordinator::with_config(config),
    }))
}

#[unsafe(no_mangle)]
/// ### English
/// Destroys a view created by `gl_render_view_create`.
///
/// Blocks until the render thread has released every native object and exited; afterwards the
/// renderer and strategy tables have been released.
///
/// ### 中文
/// 销毁由 `gl_render_view_create` 创建的 view。
///
/// 会阻塞直到渲染线程释放所有原生对象并退出；返回时渲染器与策略表均已释放。
pub unsafe extern "C" fn gl_render_view_destroy(view: *mut GlRenderView) {
    if view.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(view));
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn gl_render_view_set_client_version(
    view: *mut GlRenderView,
    client_version: u32,
) -> i32 {
    if view.is_null() {
        return GL_RENDER_VIEW_ERR_NULL_POINTER;
    }
    let coordinator = unsafe { &mut (*view).coordinator };
    status_of(coordinator.set_client_version(client_version))
}

#[unsafe(no_mangle)]
/// ### English
/// Requests explicit bit depths from the config chooser.
///
/// ### 中文
/// 向配置选择器请求显式位深。
pub unsafe extern "C" fn gl_render_view_set_config_attributes(
    view: *mut GlRenderView,
    attributes: *const ConfigAttributes,
) -> i32 {
    if view.is_null() || attributes.is_null() {
        return GL_RENDER_VIEW_ERR_NULL_POINTER;
    }
    let attributes = unsafe { *attributes };
    let coordinator = unsafe { &mut (*view).coordinator };
    status_of(coordinator.set_config_attributes(attributes))
}

#[unsafe(no_mangle)]
/// ### English
/// RGB888 with (`needs_depth != 0`) or without a 16-bit depth buffer.
///
/// ### 中文
/// RGB888，带（`needs_depth != 0`）或不带 16 位深度缓冲。
pub unsafe extern "C" fn gl_render_view_set_depth_buffer(
    view: *mut GlRenderView,
    needs_depth: u8,
) -> i32 {
    if view.is_null() {
        return GL_RENDER_VIEW_ERR_NULL_POINTER;
    }
    let coordinator = unsafe { &mut (*view).coordinator };
    status_of(coordinator.set_depth_buffer(needs_depth != 0))
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn gl_render_view_set_preserve_context_on_pause(
    view: *mut GlRenderView,
    preserve: u8,
) {
    if view.is_null() {
        return;
    }
    unsafe { (*view).coordinator.set_preserve_context_on_pause(preserve != 0) };
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn gl_render_view_set_debug_flags(view: *mut GlRenderView, debug_flags: u32) {
    if view.is_null() {
        return;
    }
    unsafe { (*view).coordinator.set_debug_flags(debug_flags) };
}

#[unsafe(no_mangle)]
/// ### English
/// Installs the capability strategy table (copied; `user_data` is owned by the view afterwards).
///
/// Returns `GL_RENDER_VIEW_ERR_INVALID_ARGUMENT` without taking ownership when a required entry
/// is NULL, `GL_RENDER_VIEW_ERR_CONFIG_LOCKED` once a renderer is configured (the table is then
/// released immediately).
///
/// ### 中文
/// 安装能力策略表（按值复制；之后 `user_data` 归 view 所有）。
///
/// 必需条目为 NULL 时返回 `GL_RENDER_VIEW_ERR_INVALID_ARGUMENT` 且不接管所有权；渲染器配置之后返回
/// `GL_RENDER_VIEW_ERR_CONFIG_LOCKED`（此时该表会被立即释放）。
pub unsafe extern "C" fn gl_render_view_set_strategies(
    view: *mut GlRenderView,
    strategies: *const GlRenderViewStrategies,
) -> i32 {
    if view.is_null() || strategies.is_null() {
        return GL_RENDER_VIEW_ERR_NULL_POINTER;
    }
    let table = unsafe { *strategies };
    if !strategies_complete(&table) {
        return GL_RENDER_VIEW_ERR_INVALID_ARGUMENT;
    }
    let coordinator = unsafe { &mut (*view).coordinator };
    status_of(coordinator.set_strategies(foreign_strategies(table)))
}

#[unsafe(no_mangle)]
/// ### English
/// Configures the renderer and starts the render thread.
///
/// Requires `on_draw_frame` (`GL_RENDER_VIEW_ERR_INVALID_ARGUMENT` otherwise, ownership not taken).
/// A second call fails with `GL_RENDER_VIEW_ERR_ALREADY_CONFIGURED` and releases the new table.
///
/// ### 中文
/// 配置渲染器并启动渲染线程。
///
/// 必须提供 `on_draw_frame`（否则返回 `GL_RENDER_VIEW_ERR_INVALID_ARGUMENT`，且不接管所有权）。
/// 第二次调用返回 `GL_RENDER_VIEW_ERR_ALREADY_CONFIGURED`，并释放新传入的表。
pub unsafe extern "C" fn gl_render_view_set_renderer(
    view: *mut GlRenderView,
    renderer: *const GlRenderViewRenderer,
) -> i32 {
    if view.is_null() || renderer.is_null() {
        return GL_RENDER_VIEW_ERR_NULL_POINTER;
    }
    let table = unsafe { *renderer };
    if table.on_draw_frame.is_none() {
        return GL_RENDER_VIEW_ERR_INVALID_ARGUMENT;
    }
    let coordinator = unsafe { &mut (*view).coordinator };
    status_of(coordinator.configure_renderer(ForeignRenderer::new(table)))
}

#[unsafe(no_mangle)]
/// ### English
/// Sets the render mode (`0` = continuous, `1` = on demand). Unknown values are rejected.
///
/// ### 中文
/// 设置渲染模式（`0` = 连续，`1` = 按需）；未知值会被拒绝。
pub unsafe extern "C" fn gl_render_view_set_render_mode(view: *mut GlRenderView, mode: u32) -> i32 {
    if view.is_null() {
        return GL_RENDER_VIEW_ERR_NULL_POINTER;
    }
    let Some(mode) = RenderMode::from_raw(mode) else {
        return GL_RENDER_VIEW_ERR_INVALID_ARGUMENT;
    };
    unsafe { (*view).coordinator.set_render_mode(mode) };
    GL_RENDER_VIEW_OK
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn gl_render_view_get_render_mode(view: *const GlRenderView) -> u32 {
    if view.is_null() {
        return RenderMode::default() as u32;
    }
    unsafe { (*view).coordinator.render_mode() as u32 }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn gl_render_view_request_render(view: *mut GlRenderView) {
    if view.is_null() {
        return;
    }
    unsafe { (*view).coordinator.request_render() };
}

#[unsafe(no_mangle)]
/// ### English
/// Requests pause; returns immediately (see `gl_render_view_is_paused`).
///
/// ### 中文
/// 请求暂停；立即返回（参见 `gl_render_view_is_paused`）。
pub unsafe extern "C" fn gl_render_view_pause(view: *mut GlRenderView) {
    if view.is_null() {
        return;
    }
    unsafe { (*view).coordinator.pause() };
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn gl_render_view_resume(view: *mut GlRenderView) {
    if view.is_null() {
        return;
    }
    unsafe { (*view).coordinator.resume() };
}

#[unsafe(no_mangle)]
/// ### English
/// Queues `callback(user_data)` to run once on the render thread.
///
/// Returns `false` and never calls `callback` when no renderer is configured, after shutdown, or
/// once the render thread failed; `user_data` then stays with the caller. A task accepted earlier
/// but still queued when the render thread fails is dropped without running.
///
/// ### 中文
/// 将 `callback(user_data)` 排队到渲染线程执行一次。
///
/// 未配置渲染器、已 shutdown 或渲染线程已失败时返回 `false`，且永不调用 `callback`；此时 `user_data`
/// 仍归调用方所有。先前已接收、但在渲染线程失败时仍在队列中的任务会被丢弃而不执行。
pub unsafe extern "C" fn gl_render_view_queue_event(
    view: *mut GlRenderView,
    callback: Option<GlRenderViewTaskFn>,
    user_data: *mut c_void,
) -> bool {
    if view.is_null() {
        return false;
    }
    let Some(callback) = callback else {
        return false;
    };
    let task = ForeignTask::new(callback, user_data);
    unsafe { (*view).coordinator.queue_event(move || task.run()) }
}

#[unsafe(no_mangle)]
/// ### English
/// Requests render-thread exit without blocking. Idempotent.
///
/// ### 中文
/// 请求渲染线程退出，不阻塞；可重复调用。
pub unsafe extern "C" fn gl_render_view_shutdown(view: *mut GlRenderView) {
    if view.is_null() {
        return;
    }
    unsafe { (*view).coordinator.shutdown() };
}

#[unsafe(no_mangle)]
/// ### English
/// Waits up to `timeout_ms` for the render thread to exit. Returns `true` when it has exited.
///
/// ### 中文
/// 最多等待 `timeout_ms` 毫秒直到渲染线程退出；已退出时返回 `true`。
pub unsafe extern "C" fn gl_render_view_wait_for_exit(
    view: *const GlRenderView,
    timeout_ms: u32,
) -> bool {
    if view.is_null() {
        return true;
    }
    unsafe {
        (*view)
            .coordinator
            .wait_for_exit(Duration::from_millis(u64::from(timeout_ms)))
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn gl_render_view_is_alive(view: *const GlRenderView) -> bool {
    if view.is_null() {
        return false;
    }
    unsafe { (*view).coordinator.is_alive() }
}

#[unsafe(no_mangle)]
/// ### English
/// Acknowledged pause state.
///
/// ### 中文
/// 已确认的暂停状态。
pub unsafe extern "C" fn gl_render_view_is_paused(view: *const GlRenderView) -> bool {
    if view.is_null() {
        return false;
    }
    unsafe { (*view).coordinator.is_paused() }
}

#[unsafe(no_mangle)]
/// ### English
/// Whether the render thread terminated because of an error (details are logged).
///
/// ### 中文
/// 渲染线程是否因错误而终止（详情见日志）。
pub unsafe extern "C" fn gl_render_view_has_failed(view: *const GlRenderView) -> bool {
    if view.is_null() {
        return false;
    }
    unsafe { (*view).coordinator.failure().is_some() }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn gl_render_view_frames_drawn(view: *const GlRenderView) -> u64 {
    if view.is_null() {
        return 0;
    }
    unsafe { (*view).coordinator.frames_drawn() }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    use super::*;
    use crate::ffi::host::gl_render_view_surface_available;
    use crate::ffi::{GL_RENDER_VIEW_ERR_ALREADY_CONFIGURED, GL_RENDER_VIEW_ERR_CONFIG_LOCKED};

    #[derive(Default)]
    struct Counters {
        draws: AtomicU32,
        surfaces_created: AtomicU32,
        surfaces_destroyed: AtomicU32,
        contexts_destroyed: AtomicU32,
        renderer_released: AtomicU32,
        strategies_released: AtomicU32,
        tasks: AtomicU32,
    }

    fn counters(user_data: *mut c_void) -> &'static Counters {
        unsafe { &*(user_data as *const Counters) }
    }

    unsafe extern "C" fn choose(_: *mut c_void, _: *const ConfigAttributes, out: *mut u64) -> i32 {
        unsafe { *out = 11 };
        GL_RENDER_VIEW_OK
    }
    unsafe extern "C" fn create_context(_: *mut c_void, _: u64, _: u32, out: *mut u64) -> i32 {
        unsafe { *out = 22 };
        GL_RENDER_VIEW_OK
    }
    unsafe extern "C" fn destroy_context(user_data: *mut c_void, _: u64) -> i32 {
        counters(user_data)
            .contexts_destroyed
            .fetch_add(1, Ordering::SeqCst);
        GL_RENDER_VIEW_OK
    }
    unsafe extern "C" fn create_surface(
        user_data: *mut c_void,
        _: u64,
        _: u64,
        _: u64,
        out: *mut u64,
    ) -> i32 {
        counters(user_data)
            .surfaces_created
            .fetch_add(1, Ordering::SeqCst);
        unsafe { *out = 33 };
        GL_RENDER_VIEW_OK
    }
    unsafe extern "C" fn destroy_surface(user_data: *mut c_void, _: u64) -> i32 {
        counters(user_data)
            .surfaces_destroyed
            .fetch_add(1, Ordering::SeqCst);
        GL_RENDER_VIEW_OK
    }
    unsafe extern "C" fn make_current(_: *mut c_void, _: u64, _: u64) -> i32 {
        GL_RENDER_VIEW_OK
    }
    unsafe extern "C" fn present(_: *mut c_void, _: u64, _: u64) -> i32 {
        GL_RENDER_VIEW_OK
    }
    unsafe extern "C" fn release_strategies(user_data: *mut c_void) {
        counters(user_data)
            .strategies_released
            .fetch_add(1, Ordering::SeqCst);
    }
    unsafe extern "C" fn draw(user_data: *mut c_void) -> i32 {
        counters(user_data).draws.fetch_add(1, Ordering::SeqCst);
        GL_RENDER_VIEW_OK
    }
    unsafe extern "C" fn release_renderer(user_data: *mut c_void) {
        counters(user_data)
            .renderer_released
            .fetch_add(1, Ordering::SeqCst);
    }
    unsafe extern "C" fn task(user_data: *mut c_void) {
        counters(user_data).tasks.fetch_add(1, Ordering::SeqCst);
    }

    fn strategy_table(user_data: *mut c_void) -> GlRenderViewStrategies {
        GlRenderViewStrategies {
            user_data,
            choose_config: Some(choose),
            create_context: Some(create_context),
            destroy_context: Some(destroy_context),
            create_window_surface: Some(create_surface),
            destroy_surface: Some(destroy_surface),
            make_current: Some(make_current),
            present: Some(present),
            release: Some(release_strategies),
        }
    }

    fn renderer_table(user_data: *mut c_void) -> GlRenderViewRenderer {
        GlRenderViewRenderer {
            user_data,
            on_surface_created: None,
            on_surface_changed: None,
            on_draw_frame: Some(draw),
            release: Some(release_renderer),
        }
    }

    fn wait_for(mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if done() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        done()
    }

    #[test]
    fn null_pointers_are_rejected() {
        unsafe {
            assert_eq!(
                gl_render_view_set_client_version(std::ptr::null_mut(), 2),
                GL_RENDER_VIEW_ERR_NULL_POINTER
            );
            assert!(!gl_render_view_queue_event(
                std::ptr::null_mut(),
                Some(task),
                std::ptr::null_mut()
            ));
            assert!(!gl_render_view_is_alive(std::ptr::null()));
            gl_render_view_destroy(std::ptr::null_mut());
        }
    }

    #[test]
    fn renderer_without_draw_callback_is_invalid() {
        let counters: &'static Counters = Box::leak(Box::new(Counters::default()));
        let user_data = counters as *const Counters as *mut c_void;
        let view = gl_render_view_create(0, 0);
        let mut table = renderer_table(user_data);
        table.on_draw_frame = None;
        unsafe {
            assert_eq!(
                gl_render_view_set_renderer(view, &table),
                GL_RENDER_VIEW_ERR_INVALID_ARGUMENT
            );
            gl_render_view_destroy(view);
        }
        assert_eq!(counters.renderer_released.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn full_lifecycle_through_the_c_abi() {
        let counters: &'static Counters = Box::leak(Box::new(Counters::default()));
        let user_data = counters as *const Counters as *mut c_void;
        let view = gl_render_view_create(2, 0);
        unsafe {
            assert!(!gl_render_view_queue_event(view, Some(task), user_data));
            assert_eq!(
                gl_render_view_set_strategies(view, &strategy_table(user_data)),
                GL_RENDER_VIEW_OK
            );
            assert_eq!(
                gl_render_view_set_renderer(view, &renderer_table(user_data)),
                GL_RENDER_VIEW_OK
            );
            assert_eq!(
                gl_render_view_set_renderer(view, &renderer_table(user_data)),
                GL_RENDER_VIEW_ERR_ALREADY_CONFIGURED
            );
            assert_eq!(counters.renderer_released.load(Ordering::SeqCst), 1);
            assert_eq!(
                gl_render_view_set_client_version(view, 3),
                GL_RENDER_VIEW_ERR_CONFIG_LOCKED
            );

            gl_render_view_surface_available(view, 0x1000, 320, 240);
            assert!(wait_for(|| counters.draws.load(Ordering::SeqCst) > 0));

            assert!(gl_render_view_queue_event(view, Some(task), user_data));
            assert!(wait_for(|| counters.tasks.load(Ordering::SeqCst) == 1));

            gl_render_view_shutdown(view);
            assert!(gl_render_view_wait_for_exit(view, 5_000));
            assert!(!gl_render_view_has_failed(view));
            // Refused after shutdown: the callback never runs and `user_data` stays ours.
            assert!(!gl_render_view_queue_event(view, Some(task), user_data));
            gl_render_view_destroy(view);
        }

        assert_eq!(counters.tasks.load(Ordering::SeqCst), 1);

        assert_eq!(counters.surfaces_created.load(Ordering::SeqCst), 1);
        assert_eq!(counters.surfaces_destroyed.load(Ordering::SeqCst), 1);
        assert_eq!(counters.contexts_destroyed.load(Ordering::SeqCst), 1);
        assert_eq!(counters.renderer_released.load(Ordering::SeqCst), 2);
        assert_eq!(counters.strategies_released.load(Ordering::SeqCst), 1);
    }
}
