//! # Target 模块
//!
//! 补间目标的能力接口：按名称读写数值字段。
//!
//! ## 核心概念
//!
//! - `Animatable`: 可补间对象接口（按名称 get/set f64 字段）
//! - `FieldMap`: 最简单的实现，一张字段名 → 数值的表
//! - `PropertyAccessor`: 单个字段的 getter/setter
//! - `Accessors`: 由若干具名访问器拼出的目标对象
//!
//! 目标对象由宿主持有，补间只通过 `Rc` 共享句柄访问它们；
//! 对象的"身份"是其分配地址，而不是字段内容。

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// 可补间对象接口
///
/// 对象通过实现此 trait 声明自己有哪些数值字段可以被补间。
/// 方法都接收 `&self`，实现方自行使用内部可变性（`Cell`/`RefCell`）。
///
/// ## 实现示例
///
/// ```rust,ignore
/// struct Sprite {
///     x: Cell<f64>,
///     alpha: Cell<f64>,
/// }
///
/// impl Animatable for Sprite {
///     fn get_field(&self, name: &str) -> Option<f64> {
///         match name {
///             "x" => Some(self.x.get()),
///             "alpha" => Some(self.alpha.get()),
///             _ => None,
///         }
///     }
///
///     fn set_field(&self, name: &str, value: f64) -> bool {
///         match name {
///             "x" => { self.x.set(value); true }
///             "alpha" => { self.alpha.set(value); true }
///             _ => false,
///         }
///     }
/// }
/// ```
pub trait Animatable: 'static {
    /// 获取字段当前值
    ///
    /// # 返回
    /// - `Some(value)`: 字段存在
    /// - `None`: 字段不存在
    fn get_field(&self, name: &str) -> Option<f64>;

    /// 设置字段值
    ///
    /// # 返回
    /// - `true`: 设置成功
    /// - `false`: 字段不存在或不可写
    fn set_field(&self, name: &str, value: f64) -> bool;
}

/// 补间内部持有的目标句柄
pub(crate) type Target = Rc<dyn Animatable>;

/// 目标对象的身份（分配地址）
pub(crate) fn target_addr<T: ?Sized>(target: &Rc<T>) -> *const () {
    Rc::as_ptr(target).cast::<()>()
}

/// 字段表
///
/// 字段名 → 数值的简单目标对象，适合测试与数据驱动场景。
#[derive(Debug, Default)]
pub struct FieldMap {
    fields: RefCell<BTreeMap<String, f64>>,
}

impl FieldMap {
    /// 创建空字段表
    pub fn new() -> Self {
        Self::default()
    }

    /// 由 (字段名, 值) 列表创建，直接返回共享句柄
    pub fn shared<K: Into<String>>(fields: impl IntoIterator<Item = (K, f64)>) -> Rc<Self> {
        Rc::new(fields.into_iter().collect())
    }

    /// 读取字段
    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields.borrow().get(name).copied()
    }

    /// 写入字段（不存在时新建）
    pub fn set(&self, name: impl Into<String>, value: f64) {
        self.fields.borrow_mut().insert(name.into(), value);
    }

    /// 删除字段
    pub fn remove(&self, name: &str) -> Option<f64> {
        self.fields.borrow_mut().remove(name)
    }

    /// 当前所有字段的快照（按名称排序）
    pub fn snapshot(&self) -> BTreeMap<String, f64> {
        self.fields.borrow().clone()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            fields: RefCell::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }
}

impl Animatable for FieldMap {
    fn get_field(&self, name: &str) -> Option<f64> {
        self.get(name)
    }

    /// 只允许写入已存在的字段，补间不会凭空创建字段
    fn set_field(&self, name: &str, value: f64) -> bool {
        match self.fields.borrow_mut().get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

/// 属性访问器接口
///
/// 提供对单个 f64 值的 getter/setter 访问。
pub trait PropertyAccessor {
    /// 获取当前值
    fn get(&self) -> f64;

    /// 设置新值
    fn set(&self, value: f64);
}

/// 共享 f64 值
///
/// 使用 `Rc<Cell<f64>>` 包装单个值，克隆后指向同一个槽位。
#[derive(Debug, Clone, Default)]
pub struct SharedValue {
    value: Rc<Cell<f64>>,
}

impl SharedValue {
    /// 创建新的共享值
    pub fn new(initial_value: f64) -> Self {
        Self {
            value: Rc::new(Cell::new(initial_value)),
        }
    }
}

impl PropertyAccessor for SharedValue {
    fn get(&self) -> f64 {
        self.value.get()
    }

    fn set(&self, value: f64) {
        self.value.set(value);
    }
}

/// 由一对闭包组成的访问器
pub struct FnAccessor<G, S> {
    getter: G,
    setter: S,
}

impl<G, S> FnAccessor<G, S>
where
    G: Fn() -> f64,
    S: Fn(f64),
{
    pub fn new(getter: G, setter: S) -> Self {
        Self { getter, setter }
    }
}

impl<G, S> PropertyAccessor for FnAccessor<G, S>
where
    G: Fn() -> f64,
    S: Fn(f64),
{
    fn get(&self) -> f64 {
        (self.getter)()
    }

    fn set(&self, value: f64) {
        (self.setter)(value)
    }
}

/// 由具名访问器组成的目标对象
///
/// 适用于宿主的数据结构无法直接实现 `Animatable` 的情况：
/// 为每个需要补间的字段提供一个访问器即可。
#[derive(Default)]
pub struct Accessors {
    entries: Vec<(String, Box<dyn PropertyAccessor>)>,
}

impl Accessors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册字段访问器（同名时覆盖）
    pub fn with(
        mut self,
        name: impl Into<String>,
        accessor: impl PropertyAccessor + 'static,
    ) -> Self {
        let name = name.into();
        self.entries.retain(|(existing, _)| *existing != name);
        self.entries.push((name, Box::new(accessor)));
        self
    }

    /// 已注册的字段名
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    fn find(&self, name: &str) -> Option<&dyn PropertyAccessor> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, accessor)| accessor.as_ref())
    }
}

impl fmt::Debug for Accessors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.field_names()).finish()
    }
}

impl Animatable for Accessors {
    fn get_field(&self, name: &str) -> Option<f64> {
        self.find(name).map(|accessor| accessor.get())
    }

    fn set_field(&self, name: &str, value: f64) -> bool {
        match self.find(name) {
            Some(accessor) => {
                accessor.set(value);
                true
            }
            None => false,
        }
    }
}
