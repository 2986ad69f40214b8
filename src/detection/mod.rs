/// 计数核心 (Counting Core)
///
/// 单线程、按帧顺序调用
/// - Filter:  检测过滤
/// - Tracker: 质心跟踪
/// - Counter: 过线计数
pub mod category;
pub mod counter;
pub mod filter;
pub mod tracker;
pub mod types;

pub use category::CategoryTable;
pub use counter::{CountState, CountingLine, CrossingDirection, CrossingEvent, LineCounter};
pub use filter::DetectionFilter;
pub use tracker::{CentroidTracker, Track, TrackedObject, Tracker};
pub use types::{BBox, CategoryId, Centroid, Detection, FrameGeometry, TrackId};
