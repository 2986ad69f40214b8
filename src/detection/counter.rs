//! 过线计数
//! Line counter: counts each track identity at most once when its centroid
//! crosses a horizontal reference line.
//!
//! 过线判定 (半开区间, 上下两个方向对称):
//! - 向下: prev_y < line_y <= curr_y
//! - 向上: prev_y > line_y >= curr_y

use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;
use serde::Serialize;

use super::tracker::TrackedObject;
use super::types::{CategoryId, FrameGeometry, TrackId};
use crate::error::{CounterError, Result};

// ========== 计数线 ==========

/// 过线方向
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CrossingDirection {
    Down,
    Up,
}

/// 水平计数线
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CountingLine {
    y: f32,
}

impl CountingLine {
    /// 由帧高度和相对位置计算: line_y = floor(height * position)
    pub fn from_geometry(geometry: FrameGeometry, position: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&position) {
            return Err(CounterError::config(format!(
                "line position must be within [0, 1], got {}",
                position
            )));
        }
        let y = (geometry.height as f64 * position).floor() as f32;
        Ok(Self { y })
    }

    /// 直接指定像素坐标
    pub fn at(y: f32) -> Self {
        Self { y }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    /// 判断两次观测之间是否过线
    pub fn crossing(&self, prev_y: f32, curr_y: f32) -> Option<CrossingDirection> {
        if prev_y < self.y && self.y <= curr_y {
            Some(CrossingDirection::Down)
        } else if prev_y > self.y && self.y >= curr_y {
            Some(CrossingDirection::Up)
        } else {
            None
        }
    }
}

// ========== 计数状态 ==========

/// 一次有效计数事件
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CrossingEvent {
    pub track_id: TrackId,
    pub class_id: CategoryId,
    pub direction: CrossingDirection,
}

/// 计数状态 (整个会话内有效, 可重置)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CountState {
    /// 类别 → 计数
    counts: BTreeMap<CategoryId, u64>,

    /// 已计数的跟踪ID
    counted: HashSet<TrackId>,

    /// 方向统计 (仅统计有效计数)
    downward: u64,
    upward: u64,
}

impl CountState {
    /// 所有类别初始化为0
    pub fn new(categories: impl IntoIterator<Item = CategoryId>) -> Self {
        Self {
            counts: categories.into_iter().map(|id| (id, 0)).collect(),
            ..Default::default()
        }
    }

    pub fn count(&self, class_id: CategoryId) -> u64 {
        self.counts.get(&class_id).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &BTreeMap<CategoryId, u64> {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_counted(&self, id: TrackId) -> bool {
        self.counted.contains(&id)
    }

    pub fn counted_ids(&self) -> &HashSet<TrackId> {
        &self.counted
    }

    pub fn downward(&self) -> u64 {
        self.downward
    }

    pub fn upward(&self) -> u64 {
        self.upward
    }

    /// 记录一次过线; 同一ID只计一次, 返回是否计数
    fn record(&mut self, id: TrackId, class_id: CategoryId, direction: CrossingDirection) -> bool {
        if !self.counted.insert(id) {
            return false;
        }
        *self.counts.entry(class_id).or_insert(0) += 1;
        match direction {
            CrossingDirection::Down => self.downward += 1,
            CrossingDirection::Up => self.upward += 1,
        }
        true
    }

    fn clear(&mut self) {
        self.counted.clear();
        self.counts.values_mut().for_each(|c| *c = 0);
        self.downward = 0;
        self.upward = 0;
    }
}

// ========== 计数器 ==========

/// 过线计数器
pub struct LineCounter {
    line: CountingLine,
    state: CountState,

    /// 各轨迹上一次记录的 y 坐标
    previous_y: HashMap<TrackId, f32>,

    /// 最近一帧产生的计数事件
    last_crossings: Vec<CrossingEvent>,
}

impl LineCounter {
    pub fn new(line: CountingLine, categories: impl IntoIterator<Item = CategoryId>) -> Self {
        Self {
            line,
            state: CountState::new(categories),
            previous_y: HashMap::new(),
            last_crossings: Vec::new(),
        }
    }

    pub fn line(&self) -> CountingLine {
        self.line
    }

    /// 更换计数线 (帧尺寸变化); 旧坐标系下的位置作废
    pub fn set_line(&mut self, line: CountingLine) {
        if line != self.line {
            self.line = line;
            self.previous_y.clear();
        }
    }

    pub fn state(&self) -> &CountState {
        &self.state
    }

    pub fn last_crossings(&self) -> &[CrossingEvent] {
        &self.last_crossings
    }

    /// 上一次记录的 y 坐标
    pub fn previous_y(&self, id: TrackId) -> Option<f32> {
        self.previous_y.get(&id).copied()
    }

    /// 处理一帧跟踪结果
    pub fn process(&mut self, tracked: &BTreeMap<TrackId, TrackedObject>) -> &CountState {
        self.last_crossings.clear();

        for (&id, obj) in tracked {
            let curr_y = obj.centroid.y;

            if let Some(prev_y) = self.previous_y.insert(id, curr_y) {
                if let Some(direction) = self.line.crossing(prev_y, curr_y) {
                    if self.state.record(id, obj.class_id, direction) {
                        debug!(
                            "✅ 计数: 类别 {} (ID: {}, {:?})",
                            obj.class_id, id, direction
                        );
                        self.last_crossings.push(CrossingEvent {
                            track_id: id,
                            class_id: obj.class_id,
                            direction,
                        });
                    }
                }
            }
        }

        &self.state
    }

    /// 丢弃已不存在的轨迹的历史位置
    pub fn retain_tracks<F>(&mut self, mut is_live: F)
    where
        F: FnMut(TrackId) -> bool,
    {
        self.previous_y.retain(|id, _| is_live(*id));
    }

    /// 清零计数 (不影响跟踪器中的轨迹)
    pub fn reset(&mut self) {
        self.state.clear();
        self.previous_y.clear();
        self.last_crossings.clear();
    }
}
