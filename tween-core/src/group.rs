//! # Group 模块
//!
//! 补间组：持有一组活跃补间，每帧统一推进。
//!
//! 补间组之间互不影响，暂停一组补间只需不再调用它的 `update()`；
//! 补间组被销毁时，其中的补间一并丢弃，不触发完成回调。
//!
//! ```rust,ignore
//! let group = TweenGroup::new();
//! group.to(&sprite, 2.0, [("x", 10.0), ("y", 20.0)])?;
//!
//! // 每帧
//! group.update(dt)?;
//! ```
//!
//! 补间组持有补间，补间持有回调。回调若要在补间组中创建补间，
//! 应捕获 [`TweenGroup::downgrade`] 得到的弱句柄；直接捕获 `TweenGroup`
//! 会形成引用环，补间结束前补间组都不会被释放。

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::config::GroupConfig;
use crate::error::{TweenError, TweenResult, check_seconds};
use crate::target::{Animatable, Target, target_addr};
use crate::tween::{Step, Tween, TweenState};

pub(crate) struct GroupInner {
    /// 活跃补间，按加入顺序更新
    tweens: Vec<Tween>,
    config: GroupConfig,
}

/// 补间组
///
/// 共享句柄，克隆后指向同一个补间组。
#[derive(Clone)]
pub struct TweenGroup {
    inner: Rc<RefCell<GroupInner>>,
}

impl Default for TweenGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TweenGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TweenGroup")
            .field("tweens", &inner.tweens.len())
            .field("config", &inner.config)
            .finish()
    }
}

impl TweenGroup {
    /// 创建新的补间组
    pub fn new() -> Self {
        Self::with_config(GroupConfig::default())
    }

    /// 使用指定配置创建补间组
    pub fn with_config(config: GroupConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(GroupInner {
                tweens: Vec::new(),
                config,
            })),
        }
    }

    pub(crate) fn from_inner(inner: Rc<RefCell<GroupInner>>) -> Self {
        Self { inner }
    }

    // ========== 补间控制 ==========

    /// 创建补间并加入本组
    ///
    /// # 参数
    /// - `target`: 目标对象
    /// - `duration`: 时长（秒），必须是非负有限数值
    /// - `vars`: 字段名 → 终点值
    ///
    /// # 返回
    /// 新补间（`vars` 为空时返回一个未入组的已完成补间）
    pub fn to<T: Animatable, K: Into<String>>(
        &self,
        target: &Rc<T>,
        duration: f64,
        vars: impl IntoIterator<Item = (K, f64)>,
    ) -> TweenResult<Tween> {
        let target: Target = target.clone();
        let tween = Tween::new(target, duration, vars, &self.inner.borrow().config)?;
        if tween.is_complete() {
            debug!(tween = %tween.id(), "字段表为空，返回惰性补间");
            return Ok(tween);
        }

        self.attach(&tween);
        debug!(
            tween = %tween.id(),
            duration = duration,
            fields = ?tween.field_names(),
            "创建补间"
        );
        Ok(tween)
    }

    /// 推进所有补间 `dt` 秒
    ///
    /// 遍历的是调用时刻的快照：回调中新加入的补间（包括后继补间）
    /// 从下一次 `update` 开始推进，回调中被移除的补间立即跳过。
    ///
    /// 单个补间失败不影响其他补间：失败的补间被移出本组，
    /// 所有失败汇总在 `TweenError::Update` 中返回。
    pub fn update(&self, dt: f64) -> TweenResult<()> {
        let dt = check_seconds("dt", dt)?;

        let mut failures = Vec::new();
        let mut successors = Vec::new();

        for tween in self.tweens() {
            if !tween.is_owned_by(&self.inner) {
                continue;
            }

            match tween.advance(dt) {
                Ok(Step::Completed) => {
                    self.detach(&tween);
                    if let Some(next) = tween.finish() {
                        successors.push((tween.id(), next));
                    }
                }
                Ok(Step::Idle | Step::Pending | Step::Running) => {}
                Err(e) => {
                    warn!(tween = %tween.id(), error = %e, "补间更新失败，已移出补间组");
                    self.detach(&tween);
                    failures.push(e);
                }
            }
        }

        for (previous, next) in successors {
            match self.add(&next) {
                Ok(_) => debug!(previous = %previous, next = %next.id(), "后继补间入组"),
                Err(e) => failures.push(e),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(TweenError::Update { failures })
        }
    }

    /// 将补间加入本组
    ///
    /// 已属于其他补间组的补间会先从原组移除；已在本组中则不做任何事。
    ///
    /// # 返回
    /// - `Err(TweenError::InvalidState)`: 补间已完成
    pub fn add(&self, tween: &Tween) -> TweenResult<Tween> {
        if tween.is_complete() {
            return Err(TweenError::invalid_state(format!(
                "补间 {} 已完成，不能再加入补间组",
                tween.id()
            )));
        }

        if let Some(owner) = tween.owner() {
            if owner.ptr_eq(self) {
                return Ok(tween.clone());
            }
            owner.detach(tween);
            debug!(tween = %tween.id(), "补间从原补间组转移");
        }

        self.attach(tween);
        Ok(tween.clone())
    }

    /// 将补间移出本组
    ///
    /// 不属于本组的补间不受影响。被移出的补间保留当前进度，可以重新加入。
    pub fn remove(&self, tween: &Tween) -> Tween {
        if self.detach(tween) {
            debug!(tween = %tween.id(), "补间移出补间组");
        }
        tween.clone()
    }

    /// 停止对象的指定字段的补间
    ///
    /// 本组中所有以 `target` 为目标的补间都会移除这些字段；
    /// 字段被移空的补间直接停止（不触发完成回调）。
    pub fn clear<T, S>(&self, target: &Rc<T>, fields: impl IntoIterator<Item = S>)
    where
        T: Animatable + ?Sized,
        S: AsRef<str>,
    {
        let names: Vec<String> = fields.into_iter().map(|s| s.as_ref().to_string()).collect();
        let stopped = self.clear_fields(target_addr(target), &names, None);
        debug!(fields = ?names, stopped = stopped, "清除补间字段");
    }

    /// 新开始的补间接管其字段：同组中已开始的其他补间让出这些字段
    pub(crate) fn override_fields(&self, started: &Tween) {
        let names = started.field_names();
        let stopped = self.clear_fields(started.target_addr(), &names, Some(started));
        if stopped > 0 {
            debug!(tween = %started.id(), stopped = stopped, "新补间接管字段，旧补间已停止");
        }
    }

    /// 返回被停止的补间数量
    fn clear_fields(&self, addr: *const (), names: &[String], started: Option<&Tween>) -> usize {
        let mut stopped = 0;
        for tween in self.tweens() {
            if tween.target_addr() != addr {
                continue;
            }
            if let Some(started) = started {
                // 只影响已开始的其他补间，等待中的补间开始时会自行接管
                if tween.ptr_eq(started) || tween.state() != TweenState::Running {
                    continue;
                }
            }
            if tween.remove_fields(names) {
                tween.stop();
                stopped += 1;
            }
        }
        stopped
    }

    fn attach(&self, tween: &Tween) {
        tween.set_owner(Rc::downgrade(&self.inner));
        self.inner.borrow_mut().tweens.push(tween.clone());
    }

    /// 从活跃列表移除并解除归属
    ///
    /// # 返回
    /// - `true`: 补间原本在本组中
    pub(crate) fn detach(&self, tween: &Tween) -> bool {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            let before = inner.tweens.len();
            inner.tweens.retain(|t| !t.ptr_eq(tween));
            inner.tweens.len() != before
        };
        if removed {
            tween.clear_owner();
        }
        removed
    }

    // ========== 查询方法 ==========

    /// 活跃补间数量
    pub fn len(&self) -> usize {
        self.inner.borrow().tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().tweens.is_empty()
    }

    /// 补间是否在本组中
    pub fn contains(&self, tween: &Tween) -> bool {
        tween.is_owned_by(&self.inner)
    }

    /// 活跃补间快照（按加入顺序）
    pub fn tweens(&self) -> Vec<Tween> {
        self.inner.borrow().tweens.clone()
    }

    pub fn config(&self) -> GroupConfig {
        self.inner.borrow().config.clone()
    }

    /// 是否指向同一个补间组
    pub fn ptr_eq(&self, other: &TweenGroup) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// 弱句柄，供回调捕获
    pub fn downgrade(&self) -> WeakTweenGroup {
        WeakTweenGroup {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

/// 补间组的弱句柄
///
/// 不阻止补间组被释放。
#[derive(Clone, Default)]
pub struct WeakTweenGroup {
    inner: Weak<RefCell<GroupInner>>,
}

impl WeakTweenGroup {
    /// 补间组仍存在时返回强句柄
    pub fn upgrade(&self) -> Option<TweenGroup> {
        self.inner.upgrade().map(TweenGroup::from_inner)
    }
}

impl fmt::Debug for WeakTweenGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakTweenGroup")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}
