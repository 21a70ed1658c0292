//! # Tween Core
//!
//! 基于时间的数值补间引擎。
//!
//! ## 架构概述
//!
//! `tween-core` 是纯逻辑核心，不依赖任何 IO、时钟或渲染引擎。
//! 宿主每帧把经过的时间交给补间组，补间组推进其中的补间并直接写回目标对象：
//!
//! ```text
//! Host                         TweenGroup
//!   │                              │
//!   │──── to(obj, time, vars) ────►│  创建 Tween（Pending）
//!   │                              │
//!   │──── update(dt) ─────────────►│  推进 → 写入字段 → 回调
//!   │                              │  完成的补间移出，后继补间入组
//! ```
//!
//! ## 核心类型
//!
//! - [`Tween`]：单个补间（目标、字段、时长、延迟、缓动、回调、后继）
//! - [`TweenGroup`]：补间组，负责持有与调度
//! - [`EasingFunction`]：缓动函数表
//! - [`Animatable`]：目标对象接口（按名称读写数值字段）
//! - [`GroupConfig`]：补间组默认值
//!
//! ## 使用示例
//!
//! ```ignore
//! use tween_core::FieldMap;
//!
//! let sprite = FieldMap::shared([("x", 0.0), ("alpha", 0.0)]);
//!
//! tween_core::to(&sprite, 2.0, [("x", 10.0)])?
//!     .ease("linear")?
//!     .delay(0.5)?
//!     .on_complete(|_| println!("到达终点"));
//!
//! // 主循环
//! loop {
//!     tween_core::update(dt)?;
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`easing`]：缓动函数
//! - [`target`]：目标对象接口与现成实现
//! - [`tween`]：补间与生命周期
//! - [`group`]：补间组
//! - [`config`]：补间组配置
//! - [`error`]：错误类型定义
//! - 顶层函数：默认补间组的便捷入口

pub mod config;
pub mod easing;
pub mod error;
mod global;
pub mod group;
pub mod target;
pub mod tween;

// 重导出核心类型
pub use config::{ConfigError, GroupConfig};
pub use easing::EasingFunction;
pub use error::{TweenError, TweenResult};
pub use global::{add, clear, default_group, group, remove, to, update};
pub use group::{TweenGroup, WeakTweenGroup};
pub use target::{Accessors, Animatable, FieldMap, FnAccessor, PropertyAccessor, SharedValue};
pub use tween::{Listener, Tween, TweenId, TweenState};
