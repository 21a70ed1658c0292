//! # 补间生命周期集成测试
//!
//! 通过公开 API 测试 TweenGroup → Tween → 目标对象 的完整链路：
//! 回调次数与顺序、越界 dt、后继补间、清除、回调中的重入操作。

use std::cell::RefCell;
use std::rc::Rc;

use tween_core::{
    EasingFunction, FieldMap, GroupConfig, Tween, TweenError, TweenGroup, TweenState,
};

/// 记录回调事件
#[derive(Default)]
struct EventLog {
    events: RefCell<Vec<&'static str>>,
}

impl EventLog {
    fn attach(self: &Rc<Self>, tween: &Tween) {
        let log = self.clone();
        tween.on_start(move |_| log.events.borrow_mut().push("start"));
        let log = self.clone();
        tween.on_update(move |_| log.events.borrow_mut().push("update"));
        let log = self.clone();
        tween.on_complete(move |_| log.events.borrow_mut().push("complete"));
    }

    fn count(&self, name: &str) -> usize {
        self.events.borrow().iter().filter(|e| **e == name).count()
    }

    fn events(&self) -> Vec<&'static str> {
        self.events.borrow().clone()
    }
}

fn linear_group() -> TweenGroup {
    TweenGroup::with_config(GroupConfig {
        default_easing: EasingFunction::Linear,
        default_delay: 0.0,
    })
}

/// 场景：obj.x = 0，2 秒补间到 10，默认缓动
#[test]
fn test_basic_scenario() {
    let group = TweenGroup::new();
    let obj = FieldMap::shared([("x", 0.0)]);
    let log = Rc::new(EventLog::default());

    let tween = group.to(&obj, 2.0, [("x", 10.0)]).unwrap();
    log.attach(&tween);

    group.update(1.0).unwrap();
    // quadout 在一半时间处已走完 3/4
    assert_eq!(obj.get("x"), Some(7.5));

    group.update(1.0).unwrap();
    assert_eq!(obj.get("x"), Some(10.0));
    assert_eq!(log.count("complete"), 1);

    group.update(1.0).unwrap();
    assert_eq!(obj.get("x"), Some(10.0));
    assert_eq!(log.count("complete"), 1);
    assert_eq!(log.count("update"), 2);
    assert!(group.is_empty());
}

#[test]
fn test_lands_exactly_for_any_split() {
    let splits: [&[f64]; 4] = [
        &[3.0],
        &[1.5, 1.5],
        &[0.5, 1.0, 1.5],
        &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.9],
    ];

    for easing in EasingFunction::ALL {
        for split in splits {
            let group = TweenGroup::new();
            let obj = FieldMap::shared([("x", 1.0), ("y", -4.0)]);
            let log = Rc::new(EventLog::default());

            let tween = group.to(&obj, 3.0, [("x", 7.25), ("y", 3.0)]).unwrap();
            tween.ease_with(easing);
            log.attach(&tween);

            for dt in split {
                group.update(*dt).unwrap();
            }

            assert_eq!(obj.get("x"), Some(7.25), "{easing} {split:?}");
            assert_eq!(obj.get("y"), Some(3.0), "{easing} {split:?}");
            assert_eq!(log.count("complete"), 1, "{easing} {split:?}");
            assert_eq!(tween.state(), TweenState::Completed);
        }
    }
}

#[test]
fn test_start_fires_once_before_first_update_after_delay() {
    let group = linear_group();
    let obj = FieldMap::shared([("x", 0.0)]);
    let log = Rc::new(EventLog::default());

    let tween = group.to(&obj, 1.0, [("x", 1.0)]).unwrap();
    tween.delay(0.5).unwrap();
    log.attach(&tween);

    group.update(0.2).unwrap();
    group.update(0.2).unwrap();
    assert!(log.events().is_empty());
    assert_eq!(obj.get("x"), Some(0.0));
    assert_eq!(tween.state(), TweenState::Pending);

    group.update(0.2).unwrap();
    group.update(0.2).unwrap();
    assert_eq!(log.events(), ["start", "update", "update"]);

    group.update(1.0).unwrap();
    assert_eq!(log.count("start"), 1);
    assert_eq!(log.events().last(), Some(&"complete"));
}

#[test]
fn test_delay_reached_by_accumulated_steps() {
    let group = linear_group();
    let obj = FieldMap::shared([("x", 0.0)]);
    let log = Rc::new(EventLog::default());

    let tween = group.to(&obj, 1.0, [("x", 1.0)]).unwrap();
    tween.delay(1.0).unwrap();
    log.attach(&tween);

    // 十次 0.1 累加得到 0.9999999999999999，仍应视为延迟已结束
    for _ in 0..10 {
        group.update(0.1).unwrap();
    }
    assert_eq!(tween.state(), TweenState::Running);
    assert_eq!(log.events(), ["start", "update"]);
    assert!(obj.get("x").unwrap().abs() < 1e-9);

    group.update(0.5).unwrap();
    assert!((obj.get("x").unwrap() - 0.5).abs() < 1e-9);
}

#[test]
fn test_delay_excess_counts_toward_progress() {
    let group = linear_group();
    let obj = FieldMap::shared([("x", 0.0)]);

    group
        .to(&obj, 1.0, [("x", 10.0)])
        .unwrap()
        .delay(1.0)
        .unwrap();

    group.update(1.5).unwrap();
    assert_eq!(obj.get("x"), Some(5.0));
}

#[test]
fn test_overshoot_fires_each_event_once() {
    let group = TweenGroup::new();
    let obj = FieldMap::shared([("x", 0.0)]);
    let log = Rc::new(EventLog::default());

    let tween = group.to(&obj, 1.0, [("x", 3.0)]).unwrap();
    tween.delay(0.5).unwrap().ease("elasticout").unwrap();
    log.attach(&tween);

    group.update(100.0).unwrap();

    assert_eq!(obj.get("x"), Some(3.0));
    assert_eq!(log.events(), ["start", "update", "complete"]);
    assert!(group.is_empty());
}

#[test]
fn test_zero_duration_completes_in_one_step() {
    let group = TweenGroup::new();
    let obj = FieldMap::shared([("x", 0.0)]);
    let log = Rc::new(EventLog::default());
    let seen = Rc::new(RefCell::new(Vec::new()));

    let tween = group.to(&obj, 0.0, [("x", 5.0)]).unwrap();
    log.attach(&tween);
    let values = seen.clone();
    let target = obj.clone();
    tween.on_update(move |_| values.borrow_mut().push(target.get("x")));

    group.update(0.0).unwrap();

    assert_eq!(*seen.borrow(), [Some(5.0)]);
    assert_eq!(log.events(), ["start", "update", "complete"]);
}

#[test]
fn test_stop_is_idempotent() {
    let group = linear_group();
    let obj = FieldMap::shared([("x", 0.0)]);
    let log = Rc::new(EventLog::default());

    let tween = group.to(&obj, 1.0, [("x", 10.0)]).unwrap();
    log.attach(&tween);
    group.update(0.5).unwrap();

    tween.stop();
    let after_first = (obj.get("x"), group.len(), log.events());
    tween.stop();
    let after_second = (obj.get("x"), group.len(), log.events());

    assert_eq!(after_first, after_second);
    assert_eq!(obj.get("x"), Some(5.0));

    group.update(1.0).unwrap();
    assert_eq!(obj.get("x"), Some(5.0));
    assert_eq!(log.count("complete"), 0);
}

#[test]
fn test_after_starts_on_later_update_from_completion_values() {
    let group = linear_group();
    let obj = FieldMap::shared([("x", 0.0)]);
    let log = Rc::new(EventLog::default());

    let first = group.to(&obj, 1.0, [("x", 10.0)]).unwrap();
    let second = first.after(2.0, [("x", 20.0)]).unwrap();
    second.ease("linear").unwrap();
    log.attach(&second);

    assert!(!second.is_active());

    // 完成帧：后继补间入组但不推进
    group.update(1.5).unwrap();
    assert_eq!(obj.get("x"), Some(10.0));
    assert!(first.is_complete());
    assert!(group.contains(&second));
    assert_eq!(second.state(), TweenState::Pending);
    assert_eq!(second.elapsed(), 0.0);
    assert!(log.events().is_empty());

    group.update(1.0).unwrap();
    assert_eq!(obj.get("x"), Some(15.0));

    group.update(1.0).unwrap();
    assert_eq!(obj.get("x"), Some(20.0));
    assert_eq!(log.count("complete"), 1);
    assert!(group.is_empty());
}

#[test]
fn test_after_with_other_target() {
    let group = linear_group();
    let a = FieldMap::shared([("x", 0.0)]);
    let b = FieldMap::shared([("y", 0.0)]);

    let first = group.to(&a, 1.0, [("x", 1.0)]).unwrap();
    first
        .after_with(&b, 1.0, [("y", 4.0)])
        .unwrap()
        .ease("linear")
        .unwrap();

    group.update(1.0).unwrap();
    group.update(0.5).unwrap();
    assert_eq!(a.get("x"), Some(1.0));
    assert_eq!(b.get("y"), Some(2.0));
}

#[test]
fn test_chain_of_three() {
    let group = linear_group();
    let obj = FieldMap::shared([("x", 0.0)]);

    let a = group.to(&obj, 1.0, [("x", 1.0)]).unwrap();
    let b = a.after(1.0, [("x", 2.0)]).unwrap();
    let c = b.after(1.0, [("x", 3.0)]).unwrap();

    // 每个完成帧最多推进一段链
    group.update(10.0).unwrap();
    assert_eq!(obj.get("x"), Some(1.0));
    group.update(10.0).unwrap();
    assert_eq!(obj.get("x"), Some(2.0));
    group.update(10.0).unwrap();
    assert_eq!(obj.get("x"), Some(3.0));

    assert!(a.is_complete() && b.is_complete() && c.is_complete());
    assert!(group.is_empty());
}

#[test]
fn test_stopped_successor_is_not_enqueued() {
    let group = linear_group();
    let obj = FieldMap::shared([("x", 0.0)]);

    let first = group.to(&obj, 1.0, [("x", 1.0)]).unwrap();
    let second = first.after(1.0, [("x", 5.0)]).unwrap();
    second.stop();

    group.update(1.0).unwrap();
    assert!(group.is_empty());
    group.update(1.0).unwrap();
    assert_eq!(obj.get("x"), Some(1.0));
}

#[test]
fn test_clear_keeps_other_field_running() {
    let group = linear_group();
    let obj = FieldMap::shared([("field", 0.0), ("other", 0.0)]);

    let tween = group
        .to(&obj, 1.0, [("field", 10.0), ("other", 10.0)])
        .unwrap();
    group.update(0.5).unwrap();

    group.clear(&obj, ["field"]);
    assert!(group.contains(&tween));
    assert_eq!(tween.field_names(), ["other"]);

    group.update(0.5).unwrap();
    assert_eq!(obj.get("field"), Some(5.0));
    assert_eq!(obj.get("other"), Some(10.0));
}

#[test]
fn test_bogus_easing_rejected() {
    let group = TweenGroup::new();
    let obj = FieldMap::shared([("x", 0.0)]);
    let tween = group.to(&obj, 1.0, [("x", 1.0)]).unwrap();

    let before = tween.easing();
    let err = tween.ease("bogus").unwrap_err();
    assert!(matches!(err, TweenError::InvalidArgument { .. }));
    assert_eq!(tween.easing(), before);
}

#[test]
fn test_invalid_arguments() {
    let group = TweenGroup::new();
    let obj = FieldMap::shared([("x", 0.0)]);

    assert!(group.to(&obj, -1.0, [("x", 1.0)]).is_err());
    assert!(group.to(&obj, f64::NAN, [("x", 1.0)]).is_err());
    assert!(group.to(&obj, 1.0, [("x", f64::INFINITY)]).is_err());
    assert!(group.is_empty());

    let tween = group.to(&obj, 1.0, [("x", 1.0)]).unwrap();
    assert!(matches!(
        tween.delay(-2.0),
        Err(TweenError::InvalidArgument { .. })
    ));
    assert!(tween.after(-1.0, [("x", 0.0)]).is_err());
    assert!(tween.chained().is_none());
}

// ========== 回调中的重入操作 ==========

#[test]
fn test_stop_from_on_update() {
    let group = linear_group();
    let obj = FieldMap::shared([("x", 0.0)]);
    let log = Rc::new(EventLog::default());

    let tween = group.to(&obj, 1.0, [("x", 10.0)]).unwrap();
    log.attach(&tween);
    tween.on_update(|t| {
        if t.progress() >= 0.5 {
            t.stop();
        }
    });

    group.update(0.25).unwrap();
    group.update(0.25).unwrap();
    assert!(!tween.is_active());
    assert_eq!(obj.get("x"), Some(5.0));

    group.update(1.0).unwrap();
    assert_eq!(log.count("complete"), 0);
    assert_eq!(obj.get("x"), Some(5.0));
}

#[test]
fn test_stop_from_on_start_skips_writes() {
    let group = linear_group();
    let obj = FieldMap::shared([("x", 0.0)]);
    let log = Rc::new(EventLog::default());

    let tween = group.to(&obj, 1.0, [("x", 10.0)]).unwrap();
    tween.on_start(|t| t.stop());
    log.attach(&tween);

    group.update(0.5).unwrap();
    assert_eq!(obj.get("x"), Some(0.0));
    assert_eq!(log.events(), ["start"]);
    assert!(group.is_empty());
}

#[test]
fn test_listener_stops_later_tween_in_same_frame() {
    let group = linear_group();
    let obj = FieldMap::shared([("a", 0.0), ("b", 0.0)]);

    let first = group.to(&obj, 1.0, [("a", 1.0)]).unwrap();
    let second = group.to(&obj, 1.0, [("b", 1.0)]).unwrap();

    let victim = second.clone();
    first.on_start(move |_| victim.stop());

    group.update(0.5).unwrap();
    assert_eq!(obj.get("a"), Some(0.5));
    assert_eq!(obj.get("b"), Some(0.0));
    assert_eq!(group.len(), 1);
}

#[test]
fn test_to_from_listener_joins_next_frame() {
    let group = linear_group();
    let obj = FieldMap::shared([("x", 0.0), ("y", 0.0)]);

    let spawner = group.downgrade();
    let target = obj.clone();
    let tween = group.to(&obj, 1.0, [("x", 1.0)]).unwrap();
    tween.on_complete(move |_| {
        if let Some(group) = spawner.upgrade() {
            group.to(&target, 1.0, [("y", 2.0)]).unwrap();
        }
    });

    group.update(1.0).unwrap();
    assert_eq!(group.len(), 1);
    assert_eq!(obj.get("y"), Some(0.0));

    group.update(0.5).unwrap();
    assert_eq!(obj.get("y"), Some(1.0));
}

#[test]
fn test_nested_update_from_listener() {
    let group = linear_group();
    let obj = FieldMap::shared([("x", 0.0), ("y", 0.0)]);

    let x = group.to(&obj, 1.0, [("x", 1.0)]).unwrap();
    group.to(&obj, 1.0, [("y", 1.0)]).unwrap();

    let inner = group.downgrade();
    let nested = Rc::new(RefCell::new(false));
    let once = nested.clone();
    x.on_update(move |_| {
        if !once.replace(true)
            && let Some(group) = inner.upgrade()
        {
            group.update(0.25).unwrap();
        }
    });

    group.update(0.25).unwrap();

    // x 正在推进时嵌套的 update 不会重复推进 x
    assert_eq!(obj.get("x"), Some(0.25));
    assert_eq!(obj.get("y"), Some(0.5));
    assert_eq!(group.len(), 2);
}

#[test]
fn test_moving_tween_between_groups() {
    let running = linear_group();
    let paused = linear_group();
    let obj = FieldMap::shared([("x", 0.0)]);

    let tween = running.to(&obj, 1.0, [("x", 10.0)]).unwrap();
    running.update(0.5).unwrap();

    paused.add(&tween).unwrap();
    running.update(0.5).unwrap();
    assert_eq!(obj.get("x"), Some(5.0));

    paused.update(0.5).unwrap();
    assert_eq!(obj.get("x"), Some(10.0));
    assert!(paused.is_empty() && running.is_empty());
}
