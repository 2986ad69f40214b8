/// 检测输入系统 (Detection Input System)
///
/// 检测器与视频采集属于外部协作方, 计数核心只依赖 `DetectionSource`:
/// 按帧顺序产出 (帧序号, 可选帧尺寸, 检测框列表)。
/// - JsonlSource: 回放预先记录的逐帧检测结果 (每行一个JSON对象)
pub mod replay;

pub use replay::{FrameRecord, JsonlSource};

use crate::detection::{Detection, FrameGeometry};
use crate::error::Result;

/// 一帧检测结果
#[derive(Clone, Debug, PartialEq)]
pub struct SourceFrame {
    pub index: u64,
    pub geometry: Option<FrameGeometry>,
    pub detections: Vec<Detection>,
}

/// 检测数据源
///
/// 采集或检测失败时返回 `SourceUnavailable` / `DetectorFailure`,
/// 计数核心不解释这些错误, 直接向上传递。
pub trait DetectionSource: Send {
    /// 读取下一帧, 数据结束时返回 `Ok(None)`
    fn next_frame(&mut self) -> Result<Option<SourceFrame>>;

    /// 数据源名称 (用于日志)
    fn name(&self) -> &str;
}
