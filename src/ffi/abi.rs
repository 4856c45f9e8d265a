//! ### English
//! ABI version negotiation with the host.
//!
//! The version is bumped whenever a `#[repr(C)]` layout, an exported signature, or the ownership
//! rule of a `user_data` pointer changes. A host compiled against one header should refuse to drive
//! a library reporting another.
//!
//! ### 中文
//! 与宿主协商 ABI 版本。
//!
//! 任何 `#[repr(C)]` 布局、导出函数签名或 `user_data` 指针所有权规则发生变化时，版本号都会递增。
//! 依据某一版头文件编译的宿主，应拒绝驱动报告其它版本的库。

use super::GL_RENDER_VIEW_ABI_VERSION;

#[unsafe(no_mangle)]
pub extern "C" fn gl_render_view_abi_version() -> u32 {
    GL_RENDER_VIEW_ABI_VERSION
}

#[unsafe(no_mangle)]
/// ### English
/// Whether a host built against `host_abi_version` can use this library.
///
/// Versions are only compatible when equal; there is no backward-compatible range.
///
/// ### 中文
/// 依据 `host_abi_version` 构建的宿主能否使用本库。
///
/// 只有版本完全相同才兼容；不存在向后兼容的区间。
pub extern "C" fn gl_render_view_abi_compatible(host_abi_version: u32) -> bool {
    host_abi_version == GL_RENDER_VIEW_ABI_VERSION
}
