//! ### English
//! View configuration applied before a renderer is configured.
//!
//! `client_version` and `criteria` are locked once the renderer exists. `preserve_context_on_pause`
//! and `debug_flags` are only initial values; they can be changed later through the coordinator.
//!
//! ### 中文
//! 在配置渲染器之前生效的 view 配置。
//!
//! 渲染器配置之后 `client_version` 与 `criteria` 即被锁定；`preserve_context_on_pause` 与 `debug_flags`
//! 只是初始值，之后仍可通过 coordinator 修改。

use crate::engine::strategy::{ConfigAttributes, ConfigCriteria};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfig {
    /// ### English
    /// Requested context client version (`0` = factory default).
    ///
    /// ### 中文
    /// 请求的上下文 client 版本（`0` 表示使用工厂默认值）。
    pub client_version: u32,
    /// ### English
    /// Config selection criteria (explicit bit depths or depth-buffer shorthand).
    ///
    /// ### 中文
    /// 配置选择条件（显式位深或深度缓冲简写）。
    pub criteria: ConfigCriteria,
    /// ### English
    /// Keep the context alive across pause, releasing only the surface.
    ///
    /// ### 中文
    /// 暂停期间保留上下文，只释放 surface。
    pub preserve_context_on_pause: bool,
    /// ### English
    /// Debug bitmask (see [`crate::engine::flags`]).
    ///
    /// ### 中文
    /// 调试位掩码（见 [`crate::engine::flags`]）。
    pub debug_flags: u32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            client_version: 0,
            criteria: ConfigCriteria::default(),
            preserve_context_on_pause: false,
            debug_flags: 0,
        }
    }
}

impl ViewConfig {
    pub fn with_client_version(mut self, client_version: u32) -> Self {
        self.client_version = client_version;
        self
    }

    pub fn with_depth_buffer(mut self, needs_depth: bool) -> Self {
        self.criteria = ConfigCriteria::DepthBuffer(needs_depth);
        self
    }

    pub fn with_attributes(mut self, attributes: ConfigAttributes) -> Self {
        self.criteria = ConfigCriteria::Explicit(attributes);
        self
    }

    pub fn with_preserve_context_on_pause(mut self, preserve: bool) -> Self {
        self.preserve_context_on_pause = preserve;
        self
    }

    pub fn with_debug_flags(mut self, debug_flags: u32) -> Self {
        self.debug_flags = debug_flags;
        self
    }
}
