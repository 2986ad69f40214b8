//! 检测过滤 - 在进入跟踪器之前剔除无效检测框

use log::{debug, warn};

use super::category::CategoryTable;
use super::types::Detection;
use crate::error::{CounterError, Result};

/// 检测过滤器
///
/// 剔除:
/// - 非法框 (x1>=x2 / y1>=y2 / 非有限坐标)
/// - 不在计数类别表中的类别
/// - 置信度低于阈值的检测
#[derive(Clone, Debug)]
pub struct DetectionFilter {
    categories: CategoryTable,
    confidence_threshold: f32,
}

impl DetectionFilter {
    pub fn new(categories: CategoryTable, confidence_threshold: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(CounterError::config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                confidence_threshold
            )));
        }
        Ok(Self {
            categories,
            confidence_threshold,
        })
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    /// 单个检测是否保留
    pub fn accepts(&self, det: &Detection) -> bool {
        det.bbox.is_well_formed()
            && self.categories.contains(det.class_id)
            && det.confidence >= self.confidence_threshold
    }

    /// 过滤一帧的检测结果
    pub fn apply(&self, detections: &[Detection]) -> Vec<Detection> {
        let mut kept = Vec::with_capacity(detections.len());
        for det in detections {
            if !det.bbox.is_well_formed() {
                warn!("⚠️  丢弃非法检测框: {:?}", det.bbox);
                continue;
            }
            if self.accepts(det) {
                kept.push(*det);
            }
        }
        if kept.len() != detections.len() {
            debug!("过滤检测: {} → {}", detections.len(), kept.len());
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::types::BBox;

    fn det(x1: f32, y1: f32, x2: f32, y2: f32, class_id: u32, conf: f32) -> Detection {
        Detection::new(BBox::new(x1, y1, x2, y2), class_id, conf)
    }

    #[test]
    fn test_filters_category_confidence_and_shape() {
        let filter = DetectionFilter::new(CategoryTable::default(), 0.5).unwrap();
        let input = vec![
            det(0.0, 0.0, 10.0, 10.0, 2, 0.9),   // 保留
            det(0.0, 0.0, 10.0, 10.0, 4, 0.9),   // 类别不在表中
            det(0.0, 0.0, 10.0, 10.0, 2, 0.3),   // 置信度过低
            det(10.0, 0.0, 10.0, 10.0, 2, 0.9),  // x1 == x2
            det(0.0, 20.0, 10.0, 10.0, 0, 0.95), // y1 > y2
            det(5.0, 5.0, 6.0, 6.0, 0, 0.5),     // 阈值边界保留
        ];
        let kept = filter.apply(&input);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].class_id, 2);
        assert_eq!(kept[1].class_id, 0);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(DetectionFilter::new(CategoryTable::default(), 1.5).is_err());
        assert!(DetectionFilter::new(CategoryTable::default(), -0.1).is_err());
        assert!(DetectionFilter::new(CategoryTable::default(), 0.0).is_ok());
    }
}
