//! 最终统计报告

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::session::CategoryCount;

/// 会话结束时的统计结果
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CountReport {
    pub timestamp: String,
    pub frames_read: u64,
    pub frames_processed: u64,
    pub total: u64,
    pub downward: u64,
    pub upward: u64,
    pub counts: Vec<CategoryCount>,
}

impl CountReport {
    pub fn new(
        frames_read: u64,
        frames_processed: u64,
        counts: Vec<CategoryCount>,
        downward: u64,
        upward: u64,
    ) -> Self {
        Self {
            timestamp: gen_time_string(),
            frames_read,
            frames_processed,
            total: counts.iter().map(|c| c.count).sum(),
            downward,
            upward,
            counts,
        }
    }

    /// 指定类别名称的计数
    pub fn count_of(&self, label: &str) -> Option<u64> {
        self.counts.iter().find(|c| c.label == label).map(|c| c.count)
    }

    /// 追加一行JSON到报告文件 (每次运行一行)
    pub fn append_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        serde_json::to_writer(&mut file, self)?;
        file.write_all(b"\n")?;
        info!("✅ 统计已保存: {}", path.display());
        Ok(())
    }

    /// 打印最终统计
    pub fn print_summary(&self) {
        info!("📈 最终统计 ({}):", self.timestamp);
        for c in &self.counts {
            info!("   {}: {}", c.label, c.count);
        }
        info!(
            "   合计: {} (↓{} ↑{}) | 帧: {}/{}",
            self.total, self.downward, self.upward, self.frames_processed, self.frames_read
        );
    }
}

/// 本地时间戳
pub fn gen_time_string() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample() -> CountReport {
        CountReport::new(
            90,
            30,
            vec![
                CategoryCount {
                    class_id: 0,
                    label: "person".to_string(),
                    count: 3,
                },
                CategoryCount {
                    class_id: 2,
                    label: "car".to_string(),
                    count: 5,
                },
            ],
            6,
            2,
        )
    }

    #[test]
    fn test_totals_and_lookup() {
        let report = sample();
        assert_eq!(report.total, 8);
        assert_eq!(report.count_of("car"), Some(5));
        assert_eq!(report.count_of("bus"), None);
        assert_eq!(report.timestamp.len(), "2024-01-01 00:00:00".len());
    }

    #[test]
    fn test_append_one_row_per_call() {
        let path =
            std::env::temp_dir().join(format!("counter-report-{}.jsonl", std::process::id()));
        let _ = fs::remove_file(&path);

        let report = sample();
        report.append_to(&path).unwrap();
        report.append_to(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let rows: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["total"], 8);
        assert_eq!(rows[1]["counts"][1]["label"], "car");
        let _ = fs::remove_file(&path);
    }
}
