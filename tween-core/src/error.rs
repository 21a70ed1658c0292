//! # Error 模块
//!
//! 定义 tween-core 中使用的错误类型。

use thiserror::Error;

use crate::tween::TweenId;

/// 补间错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TweenError {
    /// 无效参数（负数/非有限的时长、延迟、dt，未知缓动名，非法字段表）
    #[error("无效参数: {message}")]
    InvalidArgument { message: String },

    /// 当前状态不允许此操作
    #[error("无效的状态操作: {message}")]
    InvalidState { message: String },

    /// 更新时目标字段不可读写
    #[error("补间 {tween} 的目标字段 '{field}' 不存在或不可写")]
    FieldMissing { tween: TweenId, field: String },

    /// 单帧内一个或多个补间更新失败
    #[error("本帧有 {} 个补间更新失败", failures.len())]
    Update { failures: Vec<TweenError> },
}

impl TweenError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }
}

/// Result 类型别名
pub type TweenResult<T> = Result<T, TweenError>;

/// 检查时间参数：必须是有限且非负的秒数
pub(crate) fn check_seconds(what: &str, value: f64) -> TweenResult<f64> {
    if !value.is_finite() {
        return Err(TweenError::invalid_argument(format!(
            "{what} 必须是有限数值，实际为 {value}"
        )));
    }
    if value < 0.0 {
        return Err(TweenError::invalid_argument(format!(
            "{what} 不能为负数，实际为 {value}"
        )));
    }
    Ok(value)
}
