//! # Scene 模块
//!
//! JSON 场景描述：一组具名对象（字段 → 初始值）和作用于它们的补间。
//!
//! ```json
//! {
//!   "group": { "default_easing": "linear" },
//!   "frame_dt": 0.1,
//!   "objects": { "ball": { "x": 0, "y": 0 } },
//!   "tweens": [
//!     { "target": "ball", "duration": 1.0, "to": { "x": 10 }, "ease": "quadout",
//!       "after": [ { "duration": 0.5, "to": { "y": 5 } } ] }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tween_core::{EasingFunction, GroupConfig};

/// 字段名 → 数值
pub type Fields = BTreeMap<String, f64>;

/// 场景
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// 补间组配置
    #[serde(default)]
    pub group: GroupConfig,

    /// 每帧时长（秒）
    #[serde(default = "default_frame_dt")]
    pub frame_dt: f64,

    /// 最多运行的帧数（缺省时运行到所有补间结束）
    #[serde(default)]
    pub frames: Option<u32>,

    /// 具名对象
    #[serde(default)]
    pub objects: BTreeMap<String, Fields>,

    /// 补间列表
    #[serde(default)]
    pub tweens: Vec<TweenSpec>,
}

/// 补间描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweenSpec {
    /// 目标对象名
    pub target: String,
    /// 时长（秒）
    pub duration: f64,
    /// 字段终点值
    pub to: Fields,
    #[serde(default)]
    pub ease: Option<String>,
    #[serde(default)]
    pub delay: Option<f64>,
    /// 依次链接的后继补间
    #[serde(default)]
    pub after: Vec<ChainSpec>,
}

/// 后继补间描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSpec {
    /// 目标对象名（缺省时沿用前一个补间的目标）
    #[serde(default)]
    pub target: Option<String>,
    pub duration: f64,
    pub to: Fields,
    #[serde(default)]
    pub ease: Option<String>,
    #[serde(default)]
    pub delay: Option<f64>,
}

fn default_frame_dt() -> f64 {
    1.0 / 60.0
}

impl Scene {
    /// 读取并解析场景文件
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取场景文件失败: {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("解析场景文件失败: {}", path.display()))
    }

    /// 从 JSON 字符串解析
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// 检查场景，返回所有问题（为空表示有效）
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if !self.frame_dt.is_finite() || self.frame_dt < 0.0 {
            problems.push(format!("frame_dt 必须是非负有限数值，实际为 {}", self.frame_dt));
        }
        if let Err(e) = self.group.validate() {
            problems.push(e.to_string());
        }

        for (i, tween) in self.tweens.iter().enumerate() {
            let at = format!("tweens[{i}]");
            self.check_step(
                &mut problems,
                &at,
                &tween.target,
                tween.duration,
                &tween.to,
                tween.ease.as_deref(),
                tween.delay,
            );

            let mut target = tween.target.as_str();
            for (j, chain) in tween.after.iter().enumerate() {
                if let Some(next) = chain.target.as_deref() {
                    target = next;
                }
                self.check_step(
                    &mut problems,
                    &format!("{at}.after[{j}]"),
                    target,
                    chain.duration,
                    &chain.to,
                    chain.ease.as_deref(),
                    chain.delay,
                );
            }
        }

        problems
    }

    #[allow(clippy::too_many_arguments)]
    fn check_step(
        &self,
        problems: &mut Vec<String>,
        at: &str,
        target: &str,
        duration: f64,
        to: &Fields,
        ease: Option<&str>,
        delay: Option<f64>,
    ) {
        match self.objects.get(target) {
            None => problems.push(format!("{at}: 未定义的对象 '{target}'")),
            Some(fields) => {
                for name in to.keys() {
                    if !fields.contains_key(name) {
                        problems.push(format!("{at}: 对象 '{target}' 没有字段 '{name}'"));
                    }
                }
            }
        }
        if !duration.is_finite() || duration < 0.0 {
            problems.push(format!("{at}: duration 必须是非负有限数值，实际为 {duration}"));
        }
        if let Some(delay) = delay {
            if !delay.is_finite() || delay < 0.0 {
                problems.push(format!("{at}: delay 必须是非负有限数值，实际为 {delay}"));
            }
        }
        if let Some(ease) = ease {
            if let Err(e) = EasingFunction::from_name(ease) {
                problems.push(format!("{at}: {e}"));
            }
        }
    }
}
