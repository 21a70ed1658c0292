//! # Global 模块
//!
//! 默认补间组与顶层便捷函数。
//!
//! 默认补间组在第一次使用时创建，此后在整个线程生命周期内存在，无需显式初始化。
//! 补间句柄是单线程共享的（`Rc`），因此默认补间组按线程划分：
//! 驱动帧循环的线程拥有它自己的默认补间组。
//!
//! 测试或需要独立暂停的场景应使用 `group()` 创建自己的补间组。

use std::rc::Rc;

use crate::error::TweenResult;
use crate::group::TweenGroup;
use crate::target::Animatable;
use crate::tween::Tween;

thread_local! {
    static DEFAULT_GROUP: TweenGroup = TweenGroup::new();
}

/// 默认补间组的句柄
pub fn default_group() -> TweenGroup {
    DEFAULT_GROUP.with(TweenGroup::clone)
}

/// 创建一个新的独立补间组
pub fn group() -> TweenGroup {
    TweenGroup::new()
}

/// 在默认补间组中创建补间，见 [`TweenGroup::to`]
pub fn to<T: Animatable, K: Into<String>>(
    target: &Rc<T>,
    duration: f64,
    vars: impl IntoIterator<Item = (K, f64)>,
) -> TweenResult<Tween> {
    default_group().to(target, duration, vars)
}

/// 推进默认补间组，见 [`TweenGroup::update`]
pub fn update(dt: f64) -> TweenResult<()> {
    default_group().update(dt)
}

/// 将补间加入默认补间组，见 [`TweenGroup::add`]
pub fn add(tween: &Tween) -> TweenResult<Tween> {
    default_group().add(tween)
}

/// 将补间移出默认补间组，见 [`TweenGroup::remove`]
pub fn remove(tween: &Tween) -> Tween {
    default_group().remove(tween)
}

/// 清除默认补间组中对象的指定字段，见 [`TweenGroup::clear`]
pub fn clear<T, S>(target: &Rc<T>, fields: impl IntoIterator<Item = S>)
where
    T: Animatable + ?Sized,
    S: AsRef<str>,
{
    default_group().clear(target, fields)
}
