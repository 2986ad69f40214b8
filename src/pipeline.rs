//! 计数流水线 (Counting Pipeline)
//!
//! 两线程架构:
//! 1. 数据源线程: 读取/检测 → 通过有界通道发送 SourceFrame
//! 2. 调用线程:   接收 SourceFrame → 跳帧 → 会话处理 → 输出快照
//!
//! 会话只在调用线程中被访问, 对核心的调用始终按帧顺序串行。

use std::io::Write;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver};
use log::{debug, info, warn};

use crate::detection::Tracker;
use crate::error::Result;
use crate::input::{DetectionSource, SourceFrame};
use crate::report::CountReport;
use crate::session::{CountingSession, FrameSampler, FrameSnapshot};

/// 进度日志间隔 (帧)
const PROGRESS_INTERVAL: u64 = 30;

// ========== 输出接口 ==========

/// 帧快照接收方 (渲染 / 记录)
pub trait FrameSink {
    fn on_frame(&mut self, snapshot: &FrameSnapshot) -> Result<()>;
}

/// 日志输出
#[derive(Default)]
pub struct LogSink;

impl FrameSink for LogSink {
    fn on_frame(&mut self, snapshot: &FrameSnapshot) -> Result<()> {
        debug!(
            "帧 {}: 跟踪 {} 个, 合计 {}",
            snapshot.frame_index,
            snapshot.tracks.len(),
            snapshot.total()
        );
        for event in &snapshot.new_crossings {
            let label = snapshot
                .tracks
                .iter()
                .find(|t| t.id == event.track_id)
                .map(|t| t.label.as_str())
                .unwrap_or("?");
            info!(
                "✅ 过线: {} (ID: {}, {:?}) @ 帧 {}",
                label, event.track_id, event.direction, snapshot.frame_index
            );
        }
        Ok(())
    }
}

/// JSON Lines 输出 (每帧一行)
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FrameSink for JsonSink<W> {
    fn on_frame(&mut self, snapshot: &FrameSnapshot) -> Result<()> {
        serde_json::to_writer(&mut self.writer, snapshot)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

// ========== 数据源线程 ==========

/// 启动数据源线程
///
/// 出错后发送错误并结束; 接收端关闭时线程自动退出。
pub fn spawn_source<S>(
    mut source: S,
    capacity: usize,
) -> (Receiver<Result<SourceFrame>>, JoinHandle<()>)
where
    S: DetectionSource + 'static,
{
    let (tx, rx) = bounded(capacity);
    let handle = thread::spawn(move || {
        info!("🔍 数据源线程启动: {}", source.name());
        loop {
            let item = source.next_frame().transpose();
            let Some(item) = item else {
                break;
            };
            let failed = item.is_err();
            if tx.send(item).is_err() || failed {
                break;
            }
        }
        debug!("数据源线程结束");
    });
    (rx, handle)
}

// ========== 主循环 ==========

/// 运行完整会话, 返回最终报告
pub fn run<S, T, K>(
    source: S,
    session: &mut CountingSession<T>,
    sampler: &mut FrameSampler,
    sink: &mut K,
) -> Result<CountReport>
where
    S: DetectionSource + 'static,
    T: Tracker,
    K: FrameSink + ?Sized,
{
    let (rx, handle) = spawn_source(source, 2);
    let result = drive(&rx, session, sampler, sink);

    drop(rx);
    if handle.join().is_err() {
        warn!("⚠️  数据源线程异常退出");
    }
    result?;

    info!(
        "✅ 处理完成: 读取 {} 帧, 处理 {} 帧",
        sampler.frames_read(),
        session.frames_processed()
    );
    Ok(session.finish(sampler.frames_read()))
}

fn drive<T, K>(
    rx: &Receiver<Result<SourceFrame>>,
    session: &mut CountingSession<T>,
    sampler: &mut FrameSampler,
    sink: &mut K,
) -> Result<()>
where
    T: Tracker,
    K: FrameSink + ?Sized,
{
    for item in rx.iter() {
        let frame = item?;

        if let Some(geometry) = frame.geometry {
            session.set_geometry(geometry)?;
        }

        if sampler.should_process() {
            let snapshot = session.process_frame(frame.index, &frame.detections);
            sink.on_frame(&snapshot)?;
        }

        if sampler.frames_read() % PROGRESS_INTERVAL == 0 {
            info!(
                "⏳ 进度: {} 帧 | 活跃轨迹 {} | 合计 {}",
                sampler.frames_read(),
                session.tracker().track_count(),
                session.counts().total()
            );
        }
    }
    Ok(())
}
