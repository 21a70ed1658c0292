//! # Tween CLI
//!
//! 无头场景运行器：从 JSON 读取对象与补间描述，按固定帧长驱动
//! `tween-core` 的补间组，输出逐帧字段值。
//!
//! - [`scene`]：场景文件格式与校验
//! - [`runner`]：帧循环与运行报告

pub mod runner;
pub mod scene;

pub use runner::{EventCounts, Frame, Report, RunOptions, Runner};
pub use scene::{ChainSpec, Fields, Scene, TweenSpec};
