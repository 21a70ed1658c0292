//! # Runner 模块
//!
//! 按固定帧长驱动场景中的补间组，并记录每帧的字段值。

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::{Context, bail};
use serde::Serialize;
use tracing::{debug, info, warn};
use tween_core::{FieldMap, Tween, TweenError, TweenGroup};

use crate::scene::{ChainSpec, Fields, Scene, TweenSpec};

/// 未指定帧数时的上限，防止场景永远不结束
const MAX_FRAMES: u32 = 100_000;

/// 一帧的快照
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub index: u32,
    /// 累计时间（秒）
    pub time: f64,
    pub values: BTreeMap<String, Fields>,
}

/// 生命周期事件计数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventCounts {
    pub started: usize,
    pub updated: usize,
    pub completed: usize,
    pub failed: usize,
}

/// 运行结果
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub frames: Vec<Frame>,
    pub events: EventCounts,
    /// 运行结束时补间组是否已清空
    pub finished: bool,
}

impl Report {
    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

#[derive(Default)]
struct Counters {
    started: Cell<usize>,
    updated: Cell<usize>,
    completed: Cell<usize>,
}

/// 运行选项
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// 覆盖场景的帧数
    pub frames: Option<u32>,
    /// 覆盖场景的帧长
    pub frame_dt: Option<f64>,
    /// 每隔多少帧记录一次（最后一帧总会记录）
    pub every: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            frames: None,
            frame_dt: None,
            every: 1,
        }
    }
}

/// 场景运行器
pub struct Runner {
    scene: Scene,
    objects: BTreeMap<String, Rc<FieldMap>>,
    group: TweenGroup,
    counters: Rc<Counters>,
}

impl Runner {
    /// 构建场景中的对象和补间
    pub fn new(scene: Scene) -> anyhow::Result<Self> {
        let problems = scene.validate();
        if !problems.is_empty() {
            bail!("场景无效:\n  - {}", problems.join("\n  - "));
        }

        let objects = scene
            .objects
            .iter()
            .map(|(name, fields)| (name.clone(), FieldMap::shared(fields.clone())))
            .collect();

        let runner = Self {
            group: TweenGroup::with_config(scene.group.clone()),
            scene,
            objects,
            counters: Rc::new(Counters::default()),
        };

        for (i, spec) in runner.scene.tweens.iter().enumerate() {
            runner
                .spawn(spec)
                .with_context(|| format!("创建补间 tweens[{i}] 失败"))?;
        }
        info!(tweens = runner.group.len(), "场景已加载");
        Ok(runner)
    }

    fn object(&self, name: &str) -> anyhow::Result<&Rc<FieldMap>> {
        self.objects
            .get(name)
            .with_context(|| format!("未定义的对象 '{name}'"))
    }

    fn spawn(&self, spec: &TweenSpec) -> anyhow::Result<()> {
        let target = self.object(&spec.target)?;
        let tween = self.group.to(target, spec.duration, spec.to.clone())?;
        self.configure(&tween, spec.ease.as_deref(), spec.delay)?;

        let mut previous = tween;
        for chain in &spec.after {
            previous = self.chain(&previous, chain)?;
        }
        Ok(())
    }

    fn chain(&self, previous: &Tween, spec: &ChainSpec) -> anyhow::Result<Tween> {
        let next = match spec.target.as_deref() {
            Some(name) => {
                previous.after_with(self.object(name)?, spec.duration, spec.to.clone())?
            }
            None => previous.after(spec.duration, spec.to.clone())?,
        };
        self.configure(&next, spec.ease.as_deref(), spec.delay)?;
        Ok(next)
    }

    fn configure(
        &self,
        tween: &Tween,
        ease: Option<&str>,
        delay: Option<f64>,
    ) -> anyhow::Result<()> {
        if let Some(ease) = ease {
            tween.ease(ease)?;
        }
        if let Some(delay) = delay {
            tween.delay(delay)?;
        }

        let counters = self.counters.clone();
        tween.on_start(move |t| {
            counters.started.set(counters.started.get() + 1);
            debug!(tween = %t.id(), "开始");
        });
        let counters = self.counters.clone();
        tween.on_update(move |_| counters.updated.set(counters.updated.get() + 1));
        let counters = self.counters.clone();
        tween.on_complete(move |t| {
            counters.completed.set(counters.completed.get() + 1);
            debug!(tween = %t.id(), "完成");
        });
        Ok(())
    }

    fn snapshot(&self, index: u32, time: f64) -> Frame {
        Frame {
            index,
            time,
            values: self
                .objects
                .iter()
                .map(|(name, obj)| (name.clone(), obj.snapshot()))
                .collect(),
        }
    }

    /// 运行场景
    pub fn run(&self, options: &RunOptions) -> anyhow::Result<Report> {
        let dt = options.frame_dt.unwrap_or(self.scene.frame_dt);
        if !dt.is_finite() || dt < 0.0 {
            bail!("帧长必须是非负有限数值，实际为 {dt}");
        }
        let limit = options.frames.or(self.scene.frames);
        let every = options.every.max(1);

        let mut frames = vec![self.snapshot(0, 0.0)];
        let mut failed = 0;
        let mut index = 0;

        while !self.group.is_empty() {
            if limit.is_some_and(|limit| index >= limit) {
                break;
            }
            if index >= MAX_FRAMES {
                warn!(frames = index, "达到帧数上限，停止运行");
                break;
            }

            index += 1;
            match self.group.update(dt) {
                Ok(()) => {}
                Err(TweenError::Update { failures }) => {
                    for failure in &failures {
                        warn!(frame = index, error = %failure, "补间更新失败");
                    }
                    failed += failures.len();
                }
                Err(e) => return Err(e.into()),
            }

            if index % every == 0 || self.group.is_empty() {
                frames.push(self.snapshot(index, f64::from(index) * dt));
            }
        }

        let events = EventCounts {
            started: self.counters.started.get(),
            updated: self.counters.updated.get(),
            completed: self.counters.completed.get(),
            failed,
        };
        info!(frames = index, completed = events.completed, "场景运行结束");

        Ok(Report {
            frames,
            events,
            finished: self.group.is_empty(),
        })
    }

    /// 对象当前的字段值
    pub fn values(&self, object: &str) -> Option<Fields> {
        self.objects.get(object).map(|obj| obj.snapshot())
    }
}
