//! 检测结果回放 - 从JSON Lines文件逐帧读取检测框
//!
//! 每行格式:
//! {"frame": 12, "width": 1280, "height": 720,
//!  "detections": [{"bbox": [x1, y1, x2, y2], "class_id": 2, "confidence": 0.87}]}
//! `frame` / `width` / `height` 可省略, 省略帧序号时按行顺序编号 (从1开始)。

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use super::{DetectionSource, SourceFrame};
use crate::detection::{Detection, FrameGeometry};
use crate::error::{CounterError, Result};

/// 单行记录
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// JSON Lines 回放源
pub struct JsonlSource<R = BufReader<File>> {
    name: String,
    reader: R,
    line: String,
    frames_read: u64,
}

impl JsonlSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            CounterError::source_unavailable(format!("{}: {}", path.display(), e))
        })?;
        info!("🎥 检测数据源: {}", path.display());
        Ok(Self::from_reader(path.display().to_string(), BufReader::new(file)))
    }
}

impl<R: BufRead> JsonlSource<R> {
    pub fn from_reader(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            reader,
            line: String::new(),
            frames_read: 0,
        }
    }
}

impl<R: BufRead + Send> DetectionSource for JsonlSource<R> {
    fn next_frame(&mut self) -> Result<Option<SourceFrame>> {
        loop {
            self.line.clear();
            let n = self.reader.read_line(&mut self.line).map_err(|e| {
                CounterError::source_unavailable(format!("{}: {}", self.name, e))
            })?;
            if n == 0 {
                return Ok(None);
            }
            if self.line.trim().is_empty() {
                continue;
            }

            self.frames_read += 1;
            let record: FrameRecord = serde_json::from_str(self.line.trim())
                .map_err(|e| CounterError::detector(self.frames_read, e.to_string()))?;

            let geometry = match (record.width, record.height) {
                (Some(w), Some(h)) => Some(FrameGeometry::new(w, h)),
                _ => None,
            };

            return Ok(Some(SourceFrame {
                index: record.frame.unwrap_or(self.frames_read),
                geometry,
                detections: record.detections,
            }));
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_frames_in_order() {
        let data = concat!(
            r#"{"frame": 3, "width": 640, "height": 480, "#,
            r#""detections": [{"bbox": [0, 0, 10, 10], "class_id": 2, "confidence": 0.9}]}"#,
            "\n\n",
            r#"{"detections": []}"#,
            "\n",
        );
        let mut source = JsonlSource::from_reader("mem", Cursor::new(data));

        let first = source.next_frame().unwrap().unwrap();
        assert_eq!(first.index, 3);
        assert_eq!(first.geometry, Some(FrameGeometry::new(640, 480)));
        assert_eq!(first.detections.len(), 1);
        assert_eq!(first.detections[0].class_id, 2);

        let second = source.next_frame().unwrap().unwrap();
        assert_eq!(second.index, 2);
        assert_eq!(second.geometry, None);
        assert!(second.detections.is_empty());

        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_bad_line_is_detector_failure() {
        let data = "{\"detections\": []}\n{\"detections\": [oops]}\n";
        let mut source = JsonlSource::from_reader("mem", Cursor::new(data));
        assert!(source.next_frame().unwrap().is_some());
        match source.next_frame() {
            Err(CounterError::DetectorFailure { frame, .. }) => assert_eq!(frame, 2),
            other => panic!("unexpected: {:?}", other.map(|f| f.map(|f| f.index))),
        }
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let result = JsonlSource::open("/nonexistent/detections.jsonl");
        assert!(matches!(result, Err(CounterError::SourceUnavailable(_))));
    }
}
