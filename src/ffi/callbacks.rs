//! ### English
//! Adapters that run C callback tables behind the Rust renderer and strategy traits.
//!
//! ### 中文
//! 将 C 回调表适配为 Rust 渲染器与能力策略 trait 的适配器。

use std::ffi::c_void;
use std::sync::Arc;

use dpi::PhysicalSize;
use thiserror::Error;

use crate::engine::{
    BoxError, ConfigAttributes, ConfigChooser, ContextFactory, NativeConfig, NativeContext,
    NativeSurface, NativeWindow, PresentOutcome, Renderer, Strategies, WindowSurfaceFactory,
};

use super::{
    GL_RENDER_VIEW_CONTEXT_LOST, GL_RENDER_VIEW_OK, GlRenderViewRenderer, GlRenderViewStrategies,
    GlRenderViewTaskFn,
};

/// ### English
/// Failure reported by a foreign callback.
///
/// ### 中文
/// 外部回调报告的失败。
#[derive(Debug, Error)]
pub(super) enum ForeignCallError {
    #[error("{call} returned status {status}")]
    Status { call: &'static str, status: i32 },
    #[error("{call} is not provided")]
    Missing { call: &'static str },
}

fn check(call: &'static str, status: i32) -> Result<(), BoxError> {
    if status == GL_RENDER_VIEW_OK {
        Ok(())
    } else {
        Err(Box::new(ForeignCallError::Status { call, status }))
    }
}

fn missing(call: &'static str) -> BoxError {
    Box::new(ForeignCallError::Missing { call })
}

// -------------------------------------------------------------------------------------------------
// Renderer
// -------------------------------------------------------------------------------------------------

pub(super) struct ForeignRenderer {
    table: GlRenderViewRenderer,
}

// SAFETY: the C side promises the callbacks and `user_data` may be used from the render thread.
unsafe impl Send for ForeignRenderer {}

impl ForeignRenderer {
    /// ### English
    /// Takes ownership of `table.user_data`.
    ///
    /// ### 中文
    /// 接管 `table.user_data` 的所有权。
    pub(super) fn new(table: GlRenderViewRenderer) -> Self {
        Self { table }
    }
}

impl Renderer for ForeignRenderer {
    fn on_surface_created(&mut self, config: NativeConfig) -> Result<(), BoxError> {
        match self.table.on_surface_created {
            Some(callback) => check("on_surface_created", unsafe {
                callback(self.table.user_data, config.0)
            }),
            None => Ok(()),
        }
    }

    fn on_surface_changed(&mut self, size: PhysicalSize<u32>) -> Result<(), BoxError> {
        match self.table.on_surface_changed {
            Some(callback) => check("on_surface_changed", unsafe {
                callback(self.table.user_data, size.width, size.height)
            }),
            None => Ok(()),
        }
    }

    fn on_draw_frame(&mut self) -> Result<(), BoxError> {
        let callback = self
            .table
            .on_draw_frame
            .ok_or_else(|| missing("on_draw_frame"))?;
        check("on_draw_frame", unsafe { callback(self.table.user_data) })
    }
}

impl Drop for ForeignRenderer {
    fn drop(&mut self) {
        if let Some(release) = self.table.release {
            unsafe { release(self.table.user_data) };
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Strategies
// -------------------------------------------------------------------------------------------------

/// ### English
/// Strategy table shared by the three strategy adapters; released when the last one drops.
///
/// ### 中文
/// 由三个策略适配器共享的策略表；最后一个适配器 drop 时释放。
struct StrategyTable {
    table: GlRenderViewStrategies,
}

// SAFETY: the strategies are only ever called from one render thread at a time.
unsafe impl Send for StrategyTable {}
unsafe impl Sync for StrategyTable {}

impl Drop for StrategyTable {
    fn drop(&mut self) {
        if let Some(release) = self.table.release {
            unsafe { release(self.table.user_data) };
        }
    }
}

impl StrategyTable {
    fn call_out(
        &self,
        call: &'static str,
        invoke: impl FnOnce(*mut c_void, *mut u64) -> i32,
    ) -> Result<u64, BoxError> {
        let mut out: u64 = 0;
        check(call, invoke(self.table.user_data, &raw mut out))?;
        Ok(out)
    }
}

struct ForeignConfigChooser(Arc<StrategyTable>);
struct ForeignContextFactory(Arc<StrategyTable>);
struct ForeignWindowSurfaceFactory(Arc<StrategyTable>);

impl ConfigChooser for ForeignConfigChooser {
    fn choose_config(&mut self, attributes: &ConfigAttributes) -> Result<NativeConfig, BoxError> {
        let choose = self
            .0
            .table
            .choose_config
            .ok_or_else(|| missing("choose_config"))?;
        let config = self.0.call_out("choose_config", |user_data, out| unsafe {
            choose(user_data, attributes, out)
        })?;
        Ok(NativeConfig(config))
    }
}

impl ContextFactory for ForeignContextFactory {
    fn create_context(
        &mut self,
        config: NativeConfig,
        client_version: u32,
    ) -> Result<NativeContext, BoxError> {
        let create = self
            .0
            .table
            .create_context
            .ok_or_else(|| missing("create_context"))?;
        let context = self.0.call_out("create_context", |user_data, out| unsafe {
            create(user_data, config.0, client_version, out)
        })?;
        Ok(NativeContext(context))
    }

    fn destroy_context(&mut self, context: NativeContext) -> Result<(), BoxError> {
        let destroy = self
            .0
            .table
            .destroy_context
            .ok_or_else(|| missing("destroy_context"))?;
        check("destroy_context", unsafe {
            destroy(self.0.table.user_data, context.0)
        })
    }
}

impl WindowSurfaceFactory for ForeignWindowSurfaceFactory {
    fn create_window_surface(
        &mut self,
        config: NativeConfig,
        context: NativeContext,
        window: NativeWindow,
    ) -> Result<NativeSurface, BoxError> {
        let create = self
            .0
            .table
            .create_window_surface
            .ok_or_else(|| missing("create_window_surface"))?;
        let surface = self
            .0
            .call_out("create_window_surface", |user_data, out| unsafe {
                create(user_data, config.0, context.0, window.0, out)
            })?;
        Ok(NativeSurface(surface))
    }

    fn destroy_surface(&mut self, surface: NativeSurface) -> Result<(), BoxError> {
        let destroy = self
            .0
            .table
            .destroy_surface
            .ok_or_else(|| missing("destroy_surface"))?;
        check("destroy_surface", unsafe {
            destroy(self.0.table.user_data, surface.0)
        })
    }

    fn make_current(
        &mut self,
        context: NativeContext,
        surface: NativeSurface,
    ) -> Result<(), BoxError> {
        let make_current = self
            .0
            .table
            .make_current
            .ok_or_else(|| missing("make_current"))?;
        check("make_current", unsafe {
            make_current(self.0.table.user_data, context.0, surface.0)
        })
    }

    fn present(
        &mut self,
        context: NativeContext,
        surface: NativeSurface,
    ) -> Result<PresentOutcome, BoxError> {
        let present = self.0.table.present.ok_or_else(|| missing("present"))?;
        match unsafe { present(self.0.table.user_data, context.0, surface.0) } {
            GL_RENDER_VIEW_OK => Ok(PresentOutcome::Presented),
            GL_RENDER_VIEW_CONTEXT_LOST => Ok(PresentOutcome::ContextLost),
            status => Err(Box::new(ForeignCallError::Status {
                call: "present",
                status,
            })),
        }
    }
}

/// ### English
/// Whether every required strategy entry is present.
///
/// ### 中文
/// 是否提供了全部必需的策略条目。
pub(super) fn strategies_complete(table: &GlRenderViewStrategies) -> bool {
    table.choose_config.is_some()
        && table.create_context.is_some()
        && table.destroy_context.is_some()
        && table.create_window_surface.is_some()
        && table.destroy_surface.is_some()
        && table.make_current.is_some()
        && table.present.is_some()
}

/// ### English
/// Splits one C strategy table into the three strategy objects. Takes ownership of `user_data`.
///
/// ### 中文
/// 将一张 C 策略表拆分为三个策略对象；接管 `user_data` 的所有权。
pub(super) fn foreign_strategies(table: GlRenderViewStrategies) -> Strategies {
    let shared = Arc::new(StrategyTable { table });
    Strategies {
        config_chooser: Box::new(ForeignConfigChooser(shared.clone())),
        context_factory: Box::new(ForeignContextFactory(shared.clone())),
        window_surface_factory: Box::new(ForeignWindowSurfaceFactory(shared)),
    }
}

// -------------------------------------------------------------------------------------------------
// Tasks
// -------------------------------------------------------------------------------------------------

pub(super) struct ForeignTask {
    callback: GlRenderViewTaskFn,
    user_data: *mut c_void,
}

// SAFETY: the caller hands `user_data` over to the render thread.
unsafe impl Send for ForeignTask {}

impl ForeignTask {
    pub(super) fn new(callback: GlRenderViewTaskFn, user_data: *mut c_void) -> Self {
        Self {
            callback,
            user_data,
        }
    }

    pub(super) fn run(self) {
        unsafe { (self.callback)(self.user_data) };
    }
}
