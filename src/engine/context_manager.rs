//! ### English
//! Context manager: owns the native config/context/surface handles of one render thread.
//!
//! Lives on the render thread only. It turns "make sure a context and a surface exist for this
//! window", "release the surface", and "release everything" into calls against the capability
//! strategies, and remembers what currently exists.
//!
//! ### 中文
//! 上下文管理器：持有单个渲染线程的原生 config/上下文/surface 句柄。
//!
//! 只存在于渲染线程。它把“确保该窗口的上下文与 surface 存在”“释放 surface”“释放全部资源”转换为对能力策略的调用，
//! 并记录当前已存在的资源。

use log::{debug, trace, warn};

use crate::engine::error::RenderThreadError;
use crate::engine::flags::{self, GL_RENDER_VIEW_DEBUG_LOG_CALLS};
use crate::engine::handles::{NativeConfig, NativeContext, NativeSurface, NativeWindow};
use crate::engine::strategy::{ConfigCriteria, PresentOutcome, Strategies};

/// ### English
/// What `ensure` had to create for the upcoming frame.
///
/// ### 中文
/// `ensure` 为即将到来的帧新建了哪些资源。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Ensured {
    pub context_created: bool,
    pub surface_created: bool,
}

/// ### English
/// A live surface together with the host surface generation it was created for.
///
/// ### 中文
/// 存活的 surface，以及创建它时对应的宿主 surface 代次。
#[derive(Debug, Clone, Copy)]
struct BoundSurface {
    handle: NativeSurface,
    generation: u64,
}

pub(crate) struct ContextManager {
    /// ### English
    /// Injected capability strategies.
    ///
    /// ### 中文
    /// 注入的能力策略。
    strategies: Strategies,
    /// ### English
    /// Locked selection criteria.
    ///
    /// ### 中文
    /// 已锁定的配置选择条件。
    criteria: ConfigCriteria,
    /// ### English
    /// Locked client version (`0` = factory default).
    ///
    /// ### 中文
    /// 已锁定的 client 版本（`0` 表示工厂默认）。
    client_version: u32,
    /// ### English
    /// Chosen config, cached after the first successful choice.
    ///
    /// ### 中文
    /// 首次选择成功后缓存的 config。
    config: Option<NativeConfig>,
    context: Option<NativeContext>,
    surface: Option<BoundSurface>,
    /// ### English
    /// Debug bitmask snapshot used for call tracing.
    ///
    /// ### 中文
    /// 用于调用追踪的调试位掩码快照。
    debug_flags: u32,
}

impl ContextManager {
    pub(crate) fn new(strategies: Strategies, criteria: ConfigCriteria, client_version: u32) -> Self {
        Self {
            strategies,
            criteria,
            client_version,
            config: None,
            context: None,
            surface: None,
            debug_flags: 0,
        }
    }

    /// ### English
    /// Returns the strategies; only called on a manager that holds no native objects.
    ///
    /// ### 中文
    /// 取回能力策略；只会在未持有任何原生对象的管理器上调用。
    pub(crate) fn into_strategies(self) -> Strategies {
        debug_assert!(self.context.is_none() && self.surface.is_none());
        self.strategies
    }

    pub(crate) fn set_debug_flags(&mut self, debug_flags: u32) {
        self.debug_flags = debug_flags;
    }

    pub(crate) fn has_context(&self) -> bool {
        self.context.is_some()
    }

    pub(crate) fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    pub(crate) fn config(&self) -> Option<NativeConfig> {
        self.config
    }

    fn log_calls(&self) -> bool {
        flags::enabled(self.debug_flags, GL_RENDER_VIEW_DEBUG_LOG_CALLS)
    }

    /// ### English
    /// Returns the cached config, choosing it on first use.
    ///
    /// ### 中文
    /// 返回缓存的 config；首次使用时进行选择。
    fn choose_config(&mut self) -> Result<NativeConfig, RenderThreadError> {
        if let Some(config) = self.config {
            return Ok(config);
        }
        let attributes = self.criteria.attributes();
        if self.log_calls() {
            trace!("choose_config({attributes:?})");
        }
        let config = self
            .strategies
            .config_chooser
            .choose_config(&attributes)
            .map_err(RenderThreadError::ChooseConfig)?;
        debug!("chose config {config:?} for {attributes:?}");
        self.config = Some(config);
        Ok(config)
    }

    /// ### English
    /// Ensures a context and a surface for `window` exist and are current.
    ///
    /// A surface created for an older host surface generation is replaced. When `context_lost` is
    /// set (the context was lost, or preserved across a destroyed host surface), the existing
    /// context and surface are discarded and recreated.
    ///
    /// #### Parameters
    /// - `window`: Host window the surface must target.
    /// - `generation`: Host surface generation; bumps every time the host reports a new surface.
    /// - `context_lost`: Whether the held context must be discarded.
    ///
    /// ### 中文
    /// 确保 `window` 对应的上下文与 surface 已存在并处于 current 状态。
    ///
    /// 针对旧宿主 surface 代次创建的 surface 会被替换；若 `context_lost` 为真（上下文丢失，或在宿主 surface
    /// 销毁期间被保留），则丢弃并重建现有上下文与 surface。
    ///
    /// #### 参数
    /// - `window`：surface 需要指向的宿主窗口。
    /// - `generation`：宿主 surface 代次；宿主每报告一次新 surface 就递增。
    /// - `context_lost`：是否必须丢弃当前持有的上下文。
    pub(crate) fn ensure(
        &mut self,
        window: NativeWindow,
        generation: u64,
        context_lost: bool,
    ) -> Result<Ensured, RenderThreadError> {
        if context_lost && self.context.is_some() {
            debug!("held context invalidated; recreating context and surface");
            self.release_all();
        }
        if self
            .surface
            .is_some_and(|surface| surface.generation != generation)
        {
            debug!("host surface replaced; recreating window surface");
            self.release_surface();
        }

        let config = self.choose_config()?;
        let mut ensured = Ensured::default();

        let context = match self.context {
            Some(context) => context,
            None => {
                if self.log_calls() {
                    trace!("create_context({config:?}, version {})", self.client_version);
                }
                let context = self
                    .strategies
                    .context_factory
                    .create_context(config, self.client_version)
                    .map_err(RenderThreadError::CreateContext)?;
                debug!("created context {context:?}");
                self.context = Some(context);
                ensured.context_created = true;
                context
            }
        };

        if self.surface.is_none() {
            if self.log_calls() {
                trace!("create_window_surface({config:?}, {context:?}, {window:?})");
            }
            let handle = self
                .strategies
                .window_surface_factory
                .create_window_surface(config, context, window)
                .map_err(RenderThreadError::CreateSurface)?;
            debug!("created window surface {handle:?}");
            self.surface = Some(BoundSurface { handle, generation });
            ensured.surface_created = true;

            self.strategies
                .window_surface_factory
                .make_current(context, handle)
                .map_err(RenderThreadError::MakeCurrent)?;
        }

        Ok(ensured)
    }

    /// ### English
    /// Presents the current frame.
    ///
    /// ### 中文
    /// 呈现当前帧。
    pub(crate) fn present(&mut self) -> Result<PresentOutcome, RenderThreadError> {
        let (Some(context), Some(surface)) = (self.context, self.surface) else {
            return Ok(PresentOutcome::Presented);
        };
        if self.log_calls() {
            trace!("present({context:?}, {:?})", surface.handle);
        }
        self.strategies
            .window_surface_factory
            .present(context, surface.handle)
            .map_err(RenderThreadError::Present)
    }

    /// ### English
    /// Releases the surface, and the context too unless `preserve_context` is set.
    ///
    /// ### 中文
    /// 释放 surface；若未设置 `preserve_context`，同时释放上下文。
    pub(crate) fn release(&mut self, preserve_context: bool) {
        self.release_surface();
        if !preserve_context {
            self.release_context();
        }
    }

    /// ### English
    /// Releases surface then context.
    ///
    /// ### 中文
    /// 先释放 surface，再释放上下文。
    pub(crate) fn release_all(&mut self) {
        self.release_surface();
        self.release_context();
    }

    fn release_surface(&mut self) {
        let Some(surface) = self.surface.take() else {
            return;
        };
        if self.log_calls() {
            trace!("destroy_surface({:?})", surface.handle);
        }
        match self
            .strategies
            .window_surface_factory
            .destroy_surface(surface.handle)
        {
            Ok(()) => debug!("released window surface {:?}", surface.handle),
            Err(err) => warn!("destroying window surface {:?} failed: {err}", surface.handle),
        }
    }

    fn release_context(&mut self) {
        self.release_surface();
        let Some(context) = self.context.take() else {
            return;
        };
        if self.log_calls() {
            trace!("destroy_context({context:?})");
        }
        match self.strategies.context_factory.destroy_context(context) {
            Ok(()) => debug!("released context {context:?}"),
            Err(err) => warn!("destroying context {context:?} failed: {err}"),
        }
    }
}
