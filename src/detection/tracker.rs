//! 质心跟踪器
//! Centroid tracker: greedy nearest-centroid association across frames
//!
//! 每帧流程:
//! 1. 无检测: 所有轨迹丢失计数+1,超过阈值的轨迹注销
//! 2. 无轨迹: 所有检测直接注册为新轨迹
//! 3. 否则: 计算 轨迹×检测 距离矩阵,贪心匹配 (非全局最优),
//!    未匹配轨迹丢失计数+1,未匹配检测注册为新轨迹

use std::collections::BTreeMap;

use log::debug;
use ndarray::Array2;

use super::types::{BBox, CategoryId, Centroid, Detection, TrackId};
use crate::error::{CounterError, Result};

// ========== 公共数据结构 ==========

/// 跟踪对象 (单帧输出)
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedObject {
    /// 唯一跟踪ID
    pub id: TrackId,

    /// 当前中心点
    pub centroid: Centroid,

    /// 类别 (由首次匹配的检测决定,之后不变)
    pub class_id: CategoryId,

    /// 当前边界框
    pub bbox: BBox,

    /// 最近一次匹配检测的置信度
    pub confidence: f32,
}

/// 活跃轨迹 (跟踪器内部状态)
#[derive(Clone, Debug)]
pub struct Track {
    pub id: TrackId,
    pub centroid: Centroid,
    pub bbox: BBox,
    pub class_id: CategoryId,
    pub confidence: f32,

    /// 连续丢失帧数
    pub disappeared: u32,
}

impl Track {
    fn new(id: TrackId, det: &Detection) -> Self {
        Self {
            id,
            centroid: det.centroid(),
            bbox: det.bbox,
            class_id: det.class_id,
            confidence: det.confidence,
            disappeared: 0,
        }
    }

    /// 融合新检测 (类别保持不变)
    fn observe(&mut self, det: &Detection) {
        self.centroid = det.centroid();
        self.bbox = det.bbox;
        self.confidence = det.confidence;
        self.disappeared = 0;
    }

    pub fn to_tracked(&self) -> TrackedObject {
        TrackedObject {
            id: self.id,
            centroid: self.centroid,
            class_id: self.class_id,
            bbox: self.bbox,
            confidence: self.confidence,
        }
    }
}

// ========== 跟踪器统一接口 ==========

/// 多目标跟踪器 Trait
///
/// 计数会话只依赖此接口,可替换为其他关联算法 (例如匈牙利最优匹配)
pub trait Tracker {
    /// 更新跟踪器
    ///
    /// # 返回
    /// 本帧匹配或新注册的轨迹 (已注销的ID不会出现)
    fn update(&mut self, detections: &[Detection]) -> BTreeMap<TrackId, TrackedObject>;

    /// 重置跟踪器 (清除所有跟踪, ID序列不回退)
    fn reset(&mut self);

    /// 获取当前跟踪数量
    fn track_count(&self) -> usize;

    /// ID是否仍在跟踪中
    fn is_live(&self, id: TrackId) -> bool;
}

// ========== 质心跟踪器 ==========

/// 质心跟踪器
pub struct CentroidTracker {
    /// 活跃轨迹 (ID → 状态; 中心点与丢失计数共用同一键集合)
    tracks: BTreeMap<TrackId, Track>,

    /// 下一个分配的ID
    next_id: TrackId,

    /// 最大允许丢失帧数 (超过即注销)
    max_disappeared: u32,

    /// 最大匹配距离 (像素)
    max_distance: f32,
}

impl CentroidTracker {
    /// 创建跟踪器, 两个阈值都必须为正
    pub fn new(max_disappeared: u32, max_distance: f32) -> Result<Self> {
        if max_disappeared == 0 {
            return Err(CounterError::config("max_disappeared must be positive"));
        }
        if !(max_distance.is_finite() && max_distance > 0.0) {
            return Err(CounterError::config(format!(
                "max_distance must be a positive number, got {}",
                max_distance
            )));
        }
        Ok(Self {
            tracks: BTreeMap::new(),
            next_id: 0,
            max_disappeared,
            max_distance,
        })
    }

    pub fn max_disappeared(&self) -> u32 {
        self.max_disappeared
    }

    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// 按ID查询活跃轨迹
    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    /// 所有活跃轨迹 (按ID升序)
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// 已分配的ID总数
    pub fn total_registered(&self) -> u32 {
        self.next_id
    }

    /// 注册新轨迹, 返回其单帧输出
    fn register(&mut self, det: &Detection) -> TrackedObject {
        let id = self.next_id;
        let track = Track::new(id, det);
        let tracked = track.to_tracked();
        self.tracks.insert(id, track);
        self.next_id += 1;
        debug!("🆕 注册轨迹 ID:{} 类别:{}", id, det.class_id);
        tracked
    }

    fn deregister(&mut self, id: TrackId) {
        if self.tracks.remove(&id).is_some() {
            debug!("🗑️  注销轨迹 ID:{}", id);
        }
    }

    /// 丢失计数+1, 超过阈值则注销
    fn mark_disappeared(&mut self, id: TrackId) {
        let expired = match self.tracks.get_mut(&id) {
            Some(track) => {
                track.disappeared += 1;
                track.disappeared > self.max_disappeared
            }
            None => false,
        };
        if expired {
            self.deregister(id);
        }
    }
}

impl Tracker for CentroidTracker {
    fn update(&mut self, detections: &[Detection]) -> BTreeMap<TrackId, TrackedObject> {
        let mut result = BTreeMap::new();

        // 1. 无检测: 全部轨迹老化
        if detections.is_empty() {
            let ids: Vec<TrackId> = self.tracks.keys().copied().collect();
            for id in ids {
                self.mark_disappeared(id);
            }
            return result;
        }

        // 2. 无轨迹: 全部注册
        if self.tracks.is_empty() {
            for det in detections {
                let tracked = self.register(det);
                result.insert(tracked.id, tracked);
            }
            return result;
        }

        // 3. 距离矩阵 (行: 轨迹, 列: 检测)
        let track_ids: Vec<TrackId> = self.tracks.keys().copied().collect();
        let track_centroids: Vec<Centroid> = self.tracks.values().map(|t| t.centroid).collect();
        let input_centroids: Vec<Centroid> = detections.iter().map(Detection::centroid).collect();
        let distances = distance_matrix(&track_centroids, &input_centroids);

        // 4. 贪心匹配
        let mut used_rows = vec![false; track_ids.len()];
        let mut used_cols = vec![false; detections.len()];

        for (row, col) in greedy_assign(&distances, self.max_distance) {
            let id = track_ids[row];
            if let Some(track) = self.tracks.get_mut(&id) {
                track.observe(&detections[col]);
                result.insert(id, track.to_tracked());
            }
            used_rows[row] = true;
            used_cols[col] = true;
        }

        // 5. 未匹配轨迹 → 标记丢失
        for (row, &used) in used_rows.iter().enumerate() {
            if !used {
                self.mark_disappeared(track_ids[row]);
            }
        }

        // 6. 未匹配检测 → 新建轨迹
        for (col, &used) in used_cols.iter().enumerate() {
            if !used {
                let tracked = self.register(&detections[col]);
                result.insert(tracked.id, tracked);
            }
        }

        result
    }

    fn reset(&mut self) {
        self.tracks.clear();
    }

    fn track_count(&self) -> usize {
        self.tracks.len()
    }

    fn is_live(&self, id: TrackId) -> bool {
        self.tracks.contains_key(&id)
    }
}

// ========== 工具函数 ==========

/// 计算两组中心点的欧氏距离矩阵
pub fn distance_matrix(rows: &[Centroid], cols: &[Centroid]) -> Array2<f32> {
    Array2::from_shape_fn((rows.len(), cols.len()), |(r, c)| rows[r].distance(&cols[c]))
}

/// 贪心匹配
///
/// 各行按自身最小距离升序处理 (稳定排序, 并列时行号小者优先),
/// 每行只考虑其最近的列 (并列时列号最小)。若该列已被占用或距离超过
/// `max_distance`,本行不匹配。结果不保证总距离最小。
pub fn greedy_assign(distances: &Array2<f32>, max_distance: f32) -> Vec<(usize, usize)> {
    let (n_rows, n_cols) = distances.dim();
    if n_rows == 0 || n_cols == 0 {
        return Vec::new();
    }

    // 每行最近的列
    let best: Vec<(usize, f32)> = distances
        .outer_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f32::INFINITY), |acc, (col, &d)| {
                    if d < acc.1 {
                        (col, d)
                    } else {
                        acc
                    }
                })
        })
        .collect();

    let mut order: Vec<usize> = (0..n_rows).collect();
    order.sort_by(|&a, &b| best[a].1.total_cmp(&best[b].1));

    let mut used_cols = vec![false; n_cols];
    let mut assignments = Vec::new();

    for row in order {
        let (col, dist) = best[row];
        if used_cols[col] || dist > max_distance {
            continue;
        }
        used_cols[col] = true;
        assignments.push((row, col));
    }

    assignments
}

/// 根据ID生成不同颜色
pub fn id_to_color(id: TrackId) -> (u8, u8, u8) {
    let hue = (id as f32 * 137.508) % 360.0; // 黄金角度采样
    hsv_to_rgb(hue, 0.8, 0.9)
}

/// HSV转RGB
fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}
