//! 计数会话
//! Counting session: filter → tracker → line counter, one call per processed frame
//!
//! 会话拥有跟踪器和计数器的全部可变状态, 多路视频流各自创建独立会话即可互不干扰。

use log::{info, warn};
use serde::Serialize;

use crate::config::CounterConfig;
use crate::detection::tracker::id_to_color;
use crate::detection::{
    BBox, CategoryId, CategoryTable, Centroid, CentroidTracker, CountState, CountingLine,
    CrossingEvent, Detection, DetectionFilter, FrameGeometry, LineCounter, TrackId, Tracker,
};
use crate::error::Result;
use crate::report::CountReport;

// ========== 渲染/输出快照 ==========

/// 单个轨迹的显示信息
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrackSnapshot {
    pub id: TrackId,
    pub bbox: BBox,
    pub centroid: Centroid,
    pub class_id: CategoryId,
    pub label: String,
    pub confidence: f32,
    pub color: (u8, u8, u8),
    pub counted: bool,
}

/// 类别计数
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub class_id: CategoryId,
    pub label: String,
    pub count: u64,
}

/// 单帧处理结果 (会话 → 渲染/记录)
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub frame_index: u64,
    pub line_y: f32,
    pub tracks: Vec<TrackSnapshot>,
    pub counts: Vec<CategoryCount>,
    pub new_crossings: Vec<CrossingEvent>,
}

impl FrameSnapshot {
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|c| c.count).sum()
    }
}

// ========== 跳帧策略 ==========

/// 跳帧采样: 帧序号从1开始, 第 n 帧在 n % (skip+1) == 0 时处理
#[derive(Clone, Debug)]
pub struct FrameSampler {
    skip_frames: u32,
    frames_read: u64,
}

impl FrameSampler {
    pub fn new(skip_frames: u32) -> Self {
        Self {
            skip_frames,
            frames_read: 0,
        }
    }

    /// 读取一帧, 返回是否需要处理
    pub fn should_process(&mut self) -> bool {
        self.frames_read += 1;
        self.frames_read % (self.skip_frames as u64 + 1) == 0
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }
}

// ========== 会话 ==========

/// 计数会话
pub struct CountingSession<T: Tracker = CentroidTracker> {
    filter: DetectionFilter,
    tracker: T,
    counter: LineCounter,
    line_position: f64,
    geometry: FrameGeometry,
    frames_processed: u64,
}

impl CountingSession<CentroidTracker> {
    /// 按配置创建质心跟踪会话
    pub fn from_config(config: &CounterConfig) -> Result<Self> {
        config.validate()?;
        let tracker = CentroidTracker::new(config.max_disappeared, config.max_distance)?;
        let filter = DetectionFilter::new(config.categories()?, config.confidence_threshold)?;
        Self::with_tracker(tracker, filter, config.geometry(), config.line_position)
    }
}

impl<T: Tracker> CountingSession<T> {
    pub fn with_tracker(
        tracker: T,
        filter: DetectionFilter,
        geometry: FrameGeometry,
        line_position: f64,
    ) -> Result<Self> {
        let line = CountingLine::from_geometry(geometry, line_position)?;
        let counter = LineCounter::new(line, filter.categories().ids());
        info!(
            "🎯 计数会话启动: {}x{}, 计数线 y={}",
            geometry.width,
            geometry.height,
            line.y()
        );
        Ok(Self {
            filter,
            tracker,
            counter,
            line_position,
            geometry,
            frames_processed: 0,
        })
    }

    pub fn categories(&self) -> &CategoryTable {
        self.filter.categories()
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn counts(&self) -> &CountState {
        self.counter.state()
    }

    pub fn line(&self) -> CountingLine {
        self.counter.line()
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// 帧尺寸变化时重新计算计数线
    pub fn set_geometry(&mut self, geometry: FrameGeometry) -> Result<()> {
        if geometry == self.geometry {
            return Ok(());
        }
        if geometry.width == 0 || geometry.height == 0 {
            warn!("⚠️  忽略非法帧尺寸: {}x{}", geometry.width, geometry.height);
            return Ok(());
        }
        let line = CountingLine::from_geometry(geometry, self.line_position)?;
        info!(
            "📐 帧尺寸变化: {}x{} → {}x{}, 计数线 y={}",
            self.geometry.width,
            self.geometry.height,
            geometry.width,
            geometry.height,
            line.y()
        );
        self.geometry = geometry;
        self.counter.set_line(line);
        Ok(())
    }

    /// 处理一帧检测结果
    pub fn process_frame(&mut self, frame_index: u64, detections: &[Detection]) -> FrameSnapshot {
        let detections = self.filter.apply(detections);
        let tracked = self.tracker.update(&detections);
        self.counter.process(&tracked);

        let tracker = &self.tracker;
        self.counter.retain_tracks(|id| tracker.is_live(id));
        self.frames_processed += 1;

        let state = self.counter.state();
        let tracks = tracked
            .values()
            .map(|obj| TrackSnapshot {
                id: obj.id,
                bbox: obj.bbox,
                centroid: obj.centroid,
                class_id: obj.class_id,
                label: self.label(obj.class_id),
                confidence: obj.confidence,
                color: id_to_color(obj.id),
                counted: state.is_counted(obj.id),
            })
            .collect();

        FrameSnapshot {
            frame_index,
            line_y: self.counter.line().y(),
            tracks,
            counts: self.labeled_counts(),
            new_crossings: self.counter.last_crossings().to_vec(),
        }
    }

    /// 按类别ID排序的计数
    pub fn labeled_counts(&self) -> Vec<CategoryCount> {
        self.counter
            .state()
            .counts()
            .iter()
            .map(|(&class_id, &count)| CategoryCount {
                class_id,
                label: self.label(class_id),
                count,
            })
            .collect()
    }

    /// 仅清零计数, 保留活跃轨迹
    pub fn reset_counts(&mut self) {
        self.counter.reset();
        info!("🔄 计数器已重置");
    }

    /// 完整重置: 清空轨迹与计数 (ID序列继续递增)
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.counter.reset();
        self.frames_processed = 0;
        info!("🔄 会话已重置");
    }

    /// 生成最终报告
    pub fn finish(&self, frames_read: u64) -> CountReport {
        let state = self.counter.state();
        CountReport::new(
            frames_read,
            self.frames_processed,
            self.labeled_counts(),
            state.downward(),
            state.upward(),
        )
    }

    fn label(&self, class_id: CategoryId) -> String {
        self.filter
            .categories()
            .label(class_id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("class_{}", class_id))
    }
}
