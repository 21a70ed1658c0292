//! # Easing 模块
//!
//! 缓动函数表，用于补间的时间插值。
//!
//! 所有曲线都由一条基础 "in" 曲线派生：
//! - `out(p) = 1 - in(1 - p)`
//! - `inout(p) = p < 0.5 ? in(2p) / 2 : 1 - in(2(1 - p)) / 2`

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TweenError;

/// 缓动函数类型
///
/// 名称固定为小写形式（如 `"quadout"`），未知名称在解析时立即报错。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EasingFunction {
    /// 线性（匀速）
    Linear,
    QuadIn,
    /// 二次缓出（默认）
    #[default]
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuartInOut,
    QuintIn,
    QuintOut,
    QuintInOut,
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    SineIn,
    SineOut,
    SineInOut,
    CircIn,
    CircOut,
    CircInOut,
    /// 回弹（会短暂越出 [0, 1]）
    BackIn,
    BackOut,
    BackInOut,
    /// 弹性（会短暂越出 [0, 1]）
    ElasticIn,
    ElasticOut,
    ElasticInOut,
}

/// 基础曲线
#[derive(Debug, Clone, Copy)]
enum Curve {
    Linear,
    Quad,
    Cubic,
    Quart,
    Quint,
    Expo,
    Sine,
    Circ,
    Back,
    Elastic,
}

/// 曲线方向
#[derive(Debug, Clone, Copy)]
enum Mode {
    In,
    Out,
    InOut,
}

impl Curve {
    fn ease_in(self, p: f64) -> f64 {
        match self {
            Curve::Linear => p,
            Curve::Quad => p * p,
            Curve::Cubic => p * p * p,
            Curve::Quart => p.powi(4),
            Curve::Quint => p.powi(5),
            Curve::Expo => 2.0_f64.powf(10.0 * (p - 1.0)),
            Curve::Sine => 1.0 - (p * (PI / 2.0)).cos(),
            Curve::Circ => 1.0 - (1.0 - p * p).sqrt(),
            Curve::Back => p * p * (2.7 * p - 1.7),
            Curve::Elastic => {
                -(2.0_f64.powf(10.0 * (p - 1.0)) * ((p - 1.075) * (PI * 2.0) / 0.3).sin())
            }
        }
    }
}

impl EasingFunction {
    /// 全部缓动函数（按名称表顺序）
    pub const ALL: [EasingFunction; 28] = [
        Self::Linear,
        Self::QuadIn,
        Self::QuadOut,
        Self::QuadInOut,
        Self::CubicIn,
        Self::CubicOut,
        Self::CubicInOut,
        Self::QuartIn,
        Self::QuartOut,
        Self::QuartInOut,
        Self::QuintIn,
        Self::QuintOut,
        Self::QuintInOut,
        Self::ExpoIn,
        Self::ExpoOut,
        Self::ExpoInOut,
        Self::SineIn,
        Self::SineOut,
        Self::SineInOut,
        Self::CircIn,
        Self::CircOut,
        Self::CircInOut,
        Self::BackIn,
        Self::BackOut,
        Self::BackInOut,
        Self::ElasticIn,
        Self::ElasticOut,
        Self::ElasticInOut,
    ];

    /// 名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::QuadIn => "quadin",
            Self::QuadOut => "quadout",
            Self::QuadInOut => "quadinout",
            Self::CubicIn => "cubicin",
            Self::CubicOut => "cubicout",
            Self::CubicInOut => "cubicinout",
            Self::QuartIn => "quartin",
            Self::QuartOut => "quartout",
            Self::QuartInOut => "quartinout",
            Self::QuintIn => "quintin",
            Self::QuintOut => "quintout",
            Self::QuintInOut => "quintinout",
            Self::ExpoIn => "expoin",
            Self::ExpoOut => "expoout",
            Self::ExpoInOut => "expoinout",
            Self::SineIn => "sinein",
            Self::SineOut => "sineout",
            Self::SineInOut => "sineinout",
            Self::CircIn => "circin",
            Self::CircOut => "circout",
            Self::CircInOut => "circinout",
            Self::BackIn => "backin",
            Self::BackOut => "backout",
            Self::BackInOut => "backinout",
            Self::ElasticIn => "elasticin",
            Self::ElasticOut => "elasticout",
            Self::ElasticInOut => "elasticinout",
        }
    }

    /// 按名称查找缓动函数
    ///
    /// # 返回
    /// - `Err(TweenError::InvalidArgument)`: 名称不在缓动表中
    pub fn from_name(name: &str) -> Result<Self, TweenError> {
        Self::ALL
            .iter()
            .copied()
            .find(|easing| easing.name() == name)
            .ok_or_else(|| TweenError::invalid_argument(format!("未知的缓动函数 '{name}'")))
    }

    fn parts(&self) -> (Curve, Mode) {
        use Curve::*;
        use Mode::*;
        match self {
            Self::Linear => (Linear, In),
            Self::QuadIn => (Quad, In),
            Self::QuadOut => (Quad, Out),
            Self::QuadInOut => (Quad, InOut),
            Self::CubicIn => (Cubic, In),
            Self::CubicOut => (Cubic, Out),
            Self::CubicInOut => (Cubic, InOut),
            Self::QuartIn => (Quart, In),
            Self::QuartOut => (Quart, Out),
            Self::QuartInOut => (Quart, InOut),
            Self::QuintIn => (Quint, In),
            Self::QuintOut => (Quint, Out),
            Self::QuintInOut => (Quint, InOut),
            Self::ExpoIn => (Expo, In),
            Self::ExpoOut => (Expo, Out),
            Self::ExpoInOut => (Expo, InOut),
            Self::SineIn => (Sine, In),
            Self::SineOut => (Sine, Out),
            Self::SineInOut => (Sine, InOut),
            Self::CircIn => (Circ, In),
            Self::CircOut => (Circ, Out),
            Self::CircInOut => (Circ, InOut),
            Self::BackIn => (Back, In),
            Self::BackOut => (Back, Out),
            Self::BackInOut => (Back, InOut),
            Self::ElasticIn => (Elastic, In),
            Self::ElasticOut => (Elastic, Out),
            Self::ElasticInOut => (Elastic, InOut),
        }
    }

    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度，会被限制在 0.0 - 1.0
    ///
    /// # 返回
    /// - 缓动后的进度值（back/elastic 可能短暂越出 0.0 - 1.0）
    pub fn apply(&self, t: f64) -> f64 {
        let p = t.clamp(0.0, 1.0);
        let (curve, mode) = self.parts();

        match mode {
            Mode::In => curve.ease_in(p),
            Mode::Out => 1.0 - curve.ease_in(1.0 - p),
            Mode::InOut => {
                if p < 0.5 {
                    curve.ease_in(p * 2.0) / 2.0
                } else {
                    1.0 - curve.ease_in((1.0 - p) * 2.0) / 2.0
                }
            }
        }
    }
}

impl FromStr for EasingFunction {
    type Err = TweenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for EasingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
