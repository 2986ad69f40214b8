//! 类别表 - 类别ID到显示名称的只读映射
//! Category lookup table: which detector classes are counted and how they are labelled

use std::collections::BTreeMap;

use phf::phf_map;

use super::types::CategoryId;
use crate::error::{CounterError, Result};

/// COCO 数据集类别名称
static COCO_LABELS: phf::Map<u32, &'static str> = phf_map! {
    0u32 => "person", 1u32 => "bicycle", 2u32 => "car", 3u32 => "motorcycle",
    4u32 => "airplane", 5u32 => "bus", 6u32 => "train", 7u32 => "truck",
    8u32 => "boat", 9u32 => "traffic light", 10u32 => "fire hydrant",
    11u32 => "stop sign", 12u32 => "parking meter", 13u32 => "bench",
    14u32 => "bird", 15u32 => "cat", 16u32 => "dog", 17u32 => "horse",
    18u32 => "sheep", 19u32 => "cow", 20u32 => "elephant", 21u32 => "bear",
    22u32 => "zebra", 23u32 => "giraffe", 24u32 => "backpack", 25u32 => "umbrella",
    26u32 => "handbag", 27u32 => "tie", 28u32 => "suitcase", 29u32 => "frisbee",
    30u32 => "skis", 31u32 => "snowboard", 32u32 => "sports ball", 33u32 => "kite",
    34u32 => "baseball bat", 35u32 => "baseball glove", 36u32 => "skateboard",
    37u32 => "surfboard", 38u32 => "tennis racket", 39u32 => "bottle",
    40u32 => "wine glass", 41u32 => "cup", 42u32 => "fork", 43u32 => "knife",
    44u32 => "spoon", 45u32 => "bowl", 46u32 => "banana", 47u32 => "apple",
    48u32 => "sandwich", 49u32 => "orange", 50u32 => "broccoli", 51u32 => "carrot",
    52u32 => "hot dog", 53u32 => "pizza", 54u32 => "donut", 55u32 => "cake",
    56u32 => "chair", 57u32 => "couch", 58u32 => "potted plant", 59u32 => "bed",
    60u32 => "dining table", 61u32 => "toilet", 62u32 => "tv", 63u32 => "laptop",
    64u32 => "mouse", 65u32 => "remote", 66u32 => "keyboard", 67u32 => "cell phone",
    68u32 => "microwave", 69u32 => "oven", 70u32 => "toaster", 71u32 => "sink",
    72u32 => "refrigerator", 73u32 => "book", 74u32 => "clock", 75u32 => "vase",
    76u32 => "scissors", 77u32 => "teddy bear", 78u32 => "hair drier",
    79u32 => "toothbrush",
};

/// 默认计数类别: 行人、自行车、汽车、摩托车、公交车、卡车
pub const DEFAULT_COUNT_CLASSES: [CategoryId; 6] = [0, 1, 2, 3, 5, 7];

/// COCO类别名称 (未知ID返回 None)
pub fn coco_label(id: CategoryId) -> Option<&'static str> {
    COCO_LABELS.get(&id).copied()
}

/// 计数类别表 (构造后不可变)
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryTable {
    labels: BTreeMap<CategoryId, String>,
}

impl CategoryTable {
    /// 从 id→名称 映射创建,至少需要一个类别
    pub fn new(labels: BTreeMap<CategoryId, String>) -> Result<Self> {
        if labels.is_empty() {
            return Err(CounterError::config("category table must not be empty"));
        }
        Ok(Self { labels })
    }

    /// 仅给出ID,名称取自COCO表 (未知ID使用 "class_<id>")
    pub fn from_ids(ids: &[CategoryId]) -> Result<Self> {
        let labels = ids
            .iter()
            .map(|&id| {
                let label = coco_label(id)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("class_{}", id));
                (id, label)
            })
            .collect();
        Self::new(labels)
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.labels.contains_key(&id)
    }

    pub fn label(&self, id: CategoryId) -> Option<&str> {
        self.labels.get(&id).map(String::as_str)
    }

    /// 按ID顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (CategoryId, &str)> {
        self.labels.iter().map(|(id, label)| (*id, label.as_str()))
    }

    pub fn ids(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.labels.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        let labels = DEFAULT_COUNT_CLASSES
            .iter()
            .map(|&id| (id, coco_label(id).unwrap_or_default().to_string()))
            .collect();
        Self { labels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = CategoryTable::default();
        assert_eq!(table.len(), 6);
        assert_eq!(table.label(2), Some("car"));
        assert_eq!(table.label(7), Some("truck"));
        assert!(!table.contains(4));
    }

    #[test]
    fn test_from_ids_unknown_label() {
        let table = CategoryTable::from_ids(&[0, 500]).unwrap();
        assert_eq!(table.label(0), Some("person"));
        assert_eq!(table.label(500), Some("class_500"));
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(CategoryTable::new(BTreeMap::new()).is_err());
        assert!(CategoryTable::from_ids(&[]).is_err());
    }

    #[test]
    fn test_iteration_order() {
        let table = CategoryTable::from_ids(&[7, 0, 2]).unwrap();
        let ids: Vec<_> = table.ids().collect();
        assert_eq!(ids, vec![0, 2, 7]);
    }
}
