//! # Tween 模块
//!
//! 单个补间实例：一个目标对象、一组 (字段 → 终点值)、时长、延迟、
//! 缓动函数、生命周期回调，以及可选的后继补间。
//!
//! `Tween` 是共享句柄（克隆开销很小），补间组与调用方持有同一个实例。
//!
//! ## 状态机
//!
//! ```text
//! Pending ──(elapsed >= delay)──► Running ──(progress >= 1)──► Completed
//! ```
//!
//! 从补间组中移除（`stop`/`remove`）与状态正交：被移除的 Pending/Running
//! 补间保留自己的时钟，重新加入补间组后从原处继续。

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::config::GroupConfig;
use crate::easing::EasingFunction;
use crate::error::{TweenError, TweenResult, check_seconds};
use crate::group::{GroupInner, TweenGroup};
use crate::target::{Animatable, Target, target_addr};

/// 进度与 1 的差距小于该值时视为已完成，延迟同理（按延迟长度缩放）
///
/// 多次 `dt` 累加的浮点误差不应让补间多拖一帧。
const COMPLETION_EPSILON: f64 = 1e-9;

static NEXT_TWEEN_ID: AtomicU64 = AtomicU64::new(1);

/// 补间 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(u64);

impl TweenId {
    fn next() -> Self {
        Self(NEXT_TWEEN_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TweenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 补间状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TweenState {
    /// 等待开始（延迟中，或尚未被更新过）
    #[default]
    Pending,
    /// 已开始插值
    Running,
    /// 已到达终点
    Completed,
}

/// 生命周期回调
///
/// 回调收到触发它的补间句柄，可以在回调中调用 `stop()` 等方法，
/// 无需在闭包里捕获补间自身。
pub type Listener = Box<dyn FnMut(&Tween)>;

#[derive(Debug, Clone, Copy)]
enum Event {
    Start,
    Update,
    Complete,
}

#[derive(Default)]
struct Listeners {
    start: Vec<Listener>,
    update: Vec<Listener>,
    complete: Vec<Listener>,
}

impl Listeners {
    fn slot_mut(&mut self, event: Event) -> &mut Vec<Listener> {
        match event {
            Event::Start => &mut self.start,
            Event::Update => &mut self.update,
            Event::Complete => &mut self.complete,
        }
    }
}

/// 被补间的字段
#[derive(Debug, Clone, PartialEq)]
struct Field {
    name: String,
    /// 起始值，补间开始（延迟结束）时从目标读取
    start: f64,
    destination: f64,
}

/// 单步推进的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// 本次未推进（正在被外层调用推进，或已完成）
    Idle,
    /// 仍在延迟中
    Pending,
    /// 插值进行中
    Running,
    /// 已到达终点，等待补间组收尾
    Completed,
}

struct TweenInner {
    id: TweenId,
    target: Target,
    fields: Vec<Field>,
    duration: f64,
    delay: f64,
    /// 自第一次更新起累计的时间（包含延迟阶段）
    elapsed: f64,
    easing: EasingFunction,
    /// 创建时所用的补间组默认值，未入组时后继补间沿用
    defaults: GroupConfig,
    state: TweenState,
    listeners: Listeners,
    /// 后继补间（完成后加入同一补间组）
    chained: Option<Tween>,
    owner: Weak<RefCell<GroupInner>>,
    /// 被 `stop()` 过；未入组的后继补间因此不会再被加入
    cancelled: bool,
    /// 正在被推进（防止回调中的嵌套 update 重复推进）
    advancing: bool,
}

impl TweenInner {
    fn delay_over(&self) -> bool {
        self.elapsed >= self.delay - COMPLETION_EPSILON * self.delay.max(1.0)
    }

    fn progress(&self) -> f64 {
        match self.state {
            TweenState::Pending => 0.0,
            TweenState::Completed => 1.0,
            TweenState::Running => {
                if self.duration <= 0.0 {
                    return 1.0;
                }
                let raw = ((self.elapsed - self.delay) / self.duration).clamp(0.0, 1.0);
                if raw >= 1.0 - COMPLETION_EPSILON {
                    1.0
                } else {
                    raw
                }
            }
        }
    }
}

/// 补间
///
/// 通过 `TweenGroup::to`（或顶层 `tween_core::to`）创建，配置方法可链式调用：
///
/// ```rust,ignore
/// let tween = group.to(&sprite, 2.0, [("x", 10.0)])?;
/// tween.ease("linear")?.delay(0.5)?.on_complete(|_| println!("done"));
/// ```
#[derive(Clone)]
pub struct Tween {
    inner: Rc<RefCell<TweenInner>>,
}

impl Tween {
    /// 创建补间（不加入任何补间组）
    ///
    /// `vars` 为空时得到一个已完成的惰性补间。
    pub(crate) fn new<K: Into<String>>(
        target: Target,
        duration: f64,
        vars: impl IntoIterator<Item = (K, f64)>,
        config: &GroupConfig,
    ) -> TweenResult<Self> {
        let duration = check_seconds("duration", duration)?;

        let mut fields: Vec<Field> = Vec::new();
        for (name, destination) in vars {
            let name = name.into();
            if !destination.is_finite() {
                return Err(TweenError::invalid_argument(format!(
                    "字段 '{name}' 的终点值必须是有限数值，实际为 {destination}"
                )));
            }
            match fields.iter_mut().find(|field| field.name == name) {
                Some(field) => field.destination = destination,
                None => fields.push(Field {
                    name,
                    start: 0.0,
                    destination,
                }),
            }
        }

        let state = if fields.is_empty() {
            TweenState::Completed
        } else {
            TweenState::Pending
        };

        Ok(Self {
            inner: Rc::new(RefCell::new(TweenInner {
                id: TweenId::next(),
                target,
                fields,
                duration,
                delay: config.default_delay,
                elapsed: 0.0,
                easing: config.default_easing,
                defaults: config.clone(),
                state,
                listeners: Listeners::default(),
                chained: None,
                owner: Weak::new(),
                cancelled: false,
                advancing: false,
            })),
        })
    }

    // ========== 配置 ==========

    /// 按名称设置缓动函数
    ///
    /// 名称未知时返回 `InvalidArgument`，原缓动函数保持不变。
    pub fn ease(&self, name: &str) -> TweenResult<&Self> {
        let easing = EasingFunction::from_name(name)?;
        Ok(self.ease_with(easing))
    }

    /// 设置缓动函数
    pub fn ease_with(&self, easing: EasingFunction) -> &Self {
        self.inner.borrow_mut().easing = easing;
        self
    }

    /// 设置（覆盖）开始前的延迟，单位秒
    pub fn delay(&self, seconds: f64) -> TweenResult<&Self> {
        let seconds = check_seconds("delay", seconds)?;
        self.inner.borrow_mut().delay = seconds;
        Ok(self)
    }

    /// 追加开始回调（延迟结束、第一次插值前触发一次）
    pub fn on_start(&self, listener: impl FnMut(&Tween) + 'static) -> &Self {
        self.listen(Event::Start, Box::new(listener))
    }

    /// 追加更新回调（每次写入字段后触发）
    pub fn on_update(&self, listener: impl FnMut(&Tween) + 'static) -> &Self {
        self.listen(Event::Update, Box::new(listener))
    }

    /// 追加完成回调（到达终点时触发一次；`stop()` 不会触发）
    pub fn on_complete(&self, listener: impl FnMut(&Tween) + 'static) -> &Self {
        self.listen(Event::Complete, Box::new(listener))
    }

    fn listen(&self, event: Event, listener: Listener) -> &Self {
        self.inner
            .borrow_mut()
            .listeners
            .slot_mut(event)
            .push(listener);
        self
    }

    /// 链接一个作用于同一目标的后继补间
    ///
    /// 后继补间在本补间完成后加入同一补间组。每个补间只有一个后继槽位，
    /// 再次调用会覆盖之前的后继。返回后继补间以便继续配置。
    pub fn after<K: Into<String>>(
        &self,
        duration: f64,
        vars: impl IntoIterator<Item = (K, f64)>,
    ) -> TweenResult<Tween> {
        let target = self.inner.borrow().target.clone();
        self.chain(target, duration, vars)
    }

    /// 链接一个作用于其他目标的后继补间
    pub fn after_with<T: Animatable, K: Into<String>>(
        &self,
        target: &Rc<T>,
        duration: f64,
        vars: impl IntoIterator<Item = (K, f64)>,
    ) -> TweenResult<Tween> {
        let target: Target = target.clone();
        self.chain(target, duration, vars)
    }

    fn chain<K: Into<String>>(
        &self,
        target: Target,
        duration: f64,
        vars: impl IntoIterator<Item = (K, f64)>,
    ) -> TweenResult<Tween> {
        let config = match self.owner() {
            Some(group) => group.config(),
            None => self.inner.borrow().defaults.clone(),
        };
        let successor = Tween::new(target, duration, vars, &config)?;

        let mut inner = self.inner.borrow_mut();
        if let Some(previous) = inner.chained.replace(successor.clone()) {
            debug!(
                tween = %inner.id,
                previous = %previous.id(),
                next = %successor.id(),
                "覆盖已有的后继补间"
            );
        }
        Ok(successor)
    }

    /// 停止补间
    ///
    /// 立即从所属补间组移除，不触发完成回调，字段保持当前值。
    /// 重复调用无副作用。尚未入组的后继补间被停止后不会再被加入。
    pub fn stop(&self) {
        let owner = {
            let mut inner = self.inner.borrow_mut();
            inner.cancelled = true;
            inner.owner.upgrade()
        };
        if let Some(owner) = owner {
            if TweenGroup::from_inner(owner).detach(self) {
                debug!(tween = %self.id(), "补间已停止");
            }
        }
    }

    // ========== 查询 ==========

    pub fn id(&self) -> TweenId {
        self.inner.borrow().id
    }

    pub fn state(&self) -> TweenState {
        self.inner.borrow().state
    }

    /// 是否在某个补间组中且尚未完成
    pub fn is_active(&self) -> bool {
        let inner = self.inner.borrow();
        inner.state != TweenState::Completed && inner.owner.strong_count() > 0
    }

    pub fn is_complete(&self) -> bool {
        self.state() == TweenState::Completed
    }

    /// 当前进度（0.0 - 1.0，未应用缓动）
    pub fn progress(&self) -> f64 {
        self.inner.borrow().progress()
    }

    /// 已累计的时间（包含延迟阶段）
    pub fn elapsed(&self) -> f64 {
        self.inner.borrow().elapsed
    }

    pub fn duration(&self) -> f64 {
        self.inner.borrow().duration
    }

    /// 开始前的延迟
    pub fn start_delay(&self) -> f64 {
        self.inner.borrow().delay
    }

    pub fn easing(&self) -> EasingFunction {
        self.inner.borrow().easing
    }

    /// 仍由本补间控制的字段名
    pub fn field_names(&self) -> Vec<String> {
        self.inner
            .borrow()
            .fields
            .iter()
            .map(|field| field.name.clone())
            .collect()
    }

    /// 字段的终点值
    pub fn destination(&self, field: &str) -> Option<f64> {
        self.inner
            .borrow()
            .fields
            .iter()
            .find(|f| f.name == field)
            .map(|f| f.destination)
    }

    /// 后继补间
    pub fn chained(&self) -> Option<Tween> {
        self.inner.borrow().chained.clone()
    }

    /// 所属补间组
    pub fn owner(&self) -> Option<TweenGroup> {
        self.inner
            .borrow()
            .owner
            .upgrade()
            .map(TweenGroup::from_inner)
    }

    /// 是否指向同一个补间实例
    pub fn ptr_eq(&self, other: &Tween) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // ========== 补间组内部接口 ==========

    pub(crate) fn target_addr(&self) -> *const () {
        target_addr(&self.inner.borrow().target)
    }

    pub(crate) fn is_owned_by(&self, group: &Rc<RefCell<GroupInner>>) -> bool {
        std::ptr::eq(self.inner.borrow().owner.as_ptr(), Rc::as_ptr(group))
    }

    pub(crate) fn set_owner(&self, owner: Weak<RefCell<GroupInner>>) {
        let mut inner = self.inner.borrow_mut();
        inner.owner = owner;
        inner.cancelled = false;
    }

    pub(crate) fn clear_owner(&self) {
        self.inner.borrow_mut().owner = Weak::new();
    }

    /// 移除指定字段
    ///
    /// # 返回
    /// - `true`: 本次移除后补间已没有任何字段
    pub(crate) fn remove_fields(&self, names: &[String]) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.fields.len();
        inner.fields.retain(|field| !names.contains(&field.name));
        inner.fields.len() != before && inner.fields.is_empty()
    }

    /// 推进补间 `dt` 秒
    pub(crate) fn advance(&self, dt: f64) -> TweenResult<Step> {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.advancing || inner.state == TweenState::Completed {
                return Ok(Step::Idle);
            }
            inner.advancing = true;
        }

        let result = self.advance_inner(dt);
        self.inner.borrow_mut().advancing = false;
        result
    }

    fn advance_inner(&self, dt: f64) -> TweenResult<Step> {
        // 回调中被 stop/remove 时立即中止本次推进
        let was_owned = self.owner().is_some();
        let detached = || was_owned && self.owner().is_none();

        let started_now = {
            let mut inner = self.inner.borrow_mut();
            inner.elapsed += dt;
            if !inner.delay_over() {
                return Ok(Step::Pending);
            }

            let started_now = inner.state == TweenState::Pending;
            if started_now {
                let id = inner.id;
                let target = inner.target.clone();
                for field in inner.fields.iter_mut() {
                    field.start =
                        target
                            .get_field(&field.name)
                            .ok_or_else(|| TweenError::FieldMissing {
                                tween: id,
                                field: field.name.clone(),
                            })?;
                }
                inner.state = TweenState::Running;
            }
            started_now
        };

        if started_now {
            // 新开始的补间接管这些字段，同组中已开始的旧补间让出
            if let Some(owner) = self.owner() {
                owner.override_fields(self);
            }
            debug!(tween = %self.id(), fields = ?self.field_names(), "补间开始");
            self.emit(Event::Start);
            if detached() {
                return Ok(Step::Running);
            }
        }

        let (target, writes, finished) = {
            let inner = self.inner.borrow();
            let progress = inner.progress();
            let finished = progress >= 1.0;
            let eased = inner.easing.apply(progress);
            let writes: Vec<(String, f64)> = inner
                .fields
                .iter()
                .map(|field| {
                    let value = if finished {
                        field.destination
                    } else {
                        field.start + (field.destination - field.start) * eased
                    };
                    (field.name.clone(), value)
                })
                .collect();
            (inner.target.clone(), writes, finished)
        };

        for (name, value) in writes {
            if !target.set_field(&name, value) {
                return Err(TweenError::FieldMissing {
                    tween: self.id(),
                    field: name,
                });
            }
        }

        self.emit(Event::Update);

        if !finished || detached() {
            return Ok(Step::Running);
        }
        self.inner.borrow_mut().state = TweenState::Completed;
        Ok(Step::Completed)
    }

    /// 完成收尾：触发完成回调，返回需要入组的后继补间
    pub(crate) fn finish(&self) -> Option<Tween> {
        debug!(tween = %self.id(), "补间完成");
        self.emit(Event::Complete);

        let successor = self.inner.borrow().chained.clone()?;
        let skip = {
            let next = successor.inner.borrow();
            next.cancelled || next.state == TweenState::Completed
        };
        if skip { None } else { Some(successor) }
    }

    /// 按注册顺序触发回调
    ///
    /// 回调执行期间不持有任何借用；执行中新注册的回调追加在原有回调之后。
    fn emit(&self, event: Event) {
        let mut listeners = std::mem::take(self.inner.borrow_mut().listeners.slot_mut(event));
        if listeners.is_empty() {
            return;
        }

        for listener in listeners.iter_mut() {
            listener(self);
        }

        let mut inner = self.inner.borrow_mut();
        let slot = inner.listeners.slot_mut(event);
        listeners.append(slot);
        *slot = listeners;
    }
}

impl PartialEq for Tween {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Tween {}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Tween")
            .field("id", &inner.id)
            .field("state", &inner.state)
            .field("fields", &inner.fields)
            .field("duration", &inner.duration)
            .field("delay", &inner.delay)
            .field("elapsed", &inner.elapsed)
            .field("easing", &inner.easing)
            .finish()
    }
}
