// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
pub mod config; // 计数配置参数
pub mod detection; // 跟踪与过线计数核心
pub mod error; // 错误类型
pub mod input; // 检测输入系统
pub mod pipeline; // 数据源线程 + 计数主循环
pub mod report; // 最终统计报告
pub mod session; // 计数会话

pub use crate::config::CounterConfig;
pub use crate::detection::{
    BBox, CategoryTable, Centroid, CentroidTracker, CountState, CountingLine, Detection,
    DetectionFilter, FrameGeometry, LineCounter, TrackedObject, Tracker,
};
pub use crate::error::{CounterError, Result};
pub use crate::input::{DetectionSource, JsonlSource, SourceFrame};
pub use crate::pipeline::{FrameSink, JsonSink, LogSink};
pub use crate::report::CountReport;
pub use crate::session::{CountingSession, FrameSampler, FrameSnapshot, TrackSnapshot};
