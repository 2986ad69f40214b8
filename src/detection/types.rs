/// 计数系统数据结构定义
/// Data structures shared by the tracker and the line counter
use serde::{Deserialize, Serialize};

// ========== 类型别名 ==========

/// 目标类别ID (COCO类别编号)
pub type CategoryId = u32;

/// 跟踪ID (单调递增,永不复用)
pub type TrackId = u32;

// ========== 几何结构 ==========

/// 中心点 (像素坐标)
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Centroid {
    pub x: f32,
    pub y: f32,
}

impl Centroid {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// 欧氏距离
    pub fn distance(&self, other: &Centroid) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// 边界框 (x1,y1 左上角; x2,y2 右下角)
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// 获取中心点
    pub fn centroid(&self) -> Centroid {
        Centroid {
            x: (self.x1 + self.x2) / 2.0,
            y: (self.y1 + self.y2) / 2.0,
        }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// 坐标有限且 x1<x2, y1<y2
    pub fn is_well_formed(&self) -> bool {
        let finite = [self.x1, self.y1, self.x2, self.y2]
            .iter()
            .all(|v| v.is_finite());
        finite && self.x1 < self.x2 && self.y1 < self.y2
    }
}

impl From<[f32; 4]> for BBox {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [f32; 4] {
    fn from(b: BBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// 单帧检测结果 (检测器 → 跟踪器)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BBox,
    pub class_id: CategoryId,
    pub confidence: f32,
}

impl Detection {
    pub fn new(bbox: BBox, class_id: CategoryId, confidence: f32) -> Self {
        Self {
            bbox,
            class_id,
            confidence,
        }
    }

    pub fn centroid(&self) -> Centroid {
        self.bbox.centroid()
    }
}

/// 帧尺寸 (像素)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
}

impl FrameGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centroid_of_box() {
        let bbox = BBox::new(10.0, 20.0, 30.0, 60.0);
        assert_eq!(bbox.centroid(), Centroid::new(20.0, 40.0));
        assert_eq!(bbox.width(), 20.0);
        assert_eq!(bbox.height(), 40.0);
    }

    #[test]
    fn test_malformed_boxes() {
        assert!(BBox::new(0.0, 0.0, 1.0, 1.0).is_well_formed());
        assert!(!BBox::new(5.0, 0.0, 5.0, 1.0).is_well_formed());
        assert!(!BBox::new(0.0, 3.0, 1.0, 2.0).is_well_formed());
        assert!(!BBox::new(0.0, 0.0, f32::NAN, 1.0).is_well_formed());
    }

    #[test]
    fn test_detection_json_shape() {
        let json = r#"{"bbox":[1.0,2.0,3.0,4.0],"class_id":2,"confidence":0.9}"#;
        let det: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(det.bbox, BBox::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(det.class_id, 2);
    }

    #[test]
    fn test_distance() {
        let a = Centroid::new(0.0, 0.0);
        let b = Centroid::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);
    }
}
