/// 过线计数 (Object Counter)
///
/// 回放逐帧检测结果, 跟踪目标并统计穿过计数线的数量
///
/// 系统架构:
/// 1. 数据源线程: 读取检测记录 (JSON Lines)
/// 2. 主线程:     跟踪 + 过线计数 + 输出
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use object_counter::pipeline::{self, FrameSink, JsonSink, LogSink};
use object_counter::{CounterConfig, CountingSession, FrameSampler, FrameSnapshot, JsonlSource};

/// 过线计数参数
#[derive(Parser, Debug)]
#[command(author, version, about = "过线计数 - 目标跟踪与分类计数", long_about = None)]
struct Args {
    /// 逐帧检测结果文件 (JSON Lines)
    #[arg(short, long)]
    detections: PathBuf,

    /// 配置文件 (不存在时自动创建)
    #[arg(short, long, default_value = "counter_config.json")]
    config: PathBuf,

    /// 置信度阈值
    #[arg(long)]
    confidence: Option<f32>,

    /// 计数线位置 (0.0-1.0)
    #[arg(short, long)]
    line_position: Option<f64>,

    /// 跳帧数 (每 N+1 帧处理一帧)
    #[arg(short, long)]
    skip_frames: Option<u32>,

    /// 最大匹配距离 (像素)
    #[arg(long)]
    max_distance: Option<f32>,

    /// 最大丢失帧数
    #[arg(long)]
    max_disappeared: Option<u32>,

    /// 逐帧快照输出 (JSON Lines)
    #[arg(short, long)]
    events: Option<PathBuf>,

    /// 统计报告文件 (每次运行追加一行)
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

/// 命令行输出: 日志 + 可选JSON快照
struct CliSink {
    log: LogSink,
    events: Option<JsonSink<BufWriter<File>>>,
}

impl FrameSink for CliSink {
    fn on_frame(&mut self, snapshot: &FrameSnapshot) -> object_counter::Result<()> {
        self.log.on_frame(snapshot)?;
        if let Some(events) = self.events.as_mut() {
            events.on_frame(snapshot)?;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    info!("🚀 过线计数系统启动");

    // ========== 加载配置 ==========
    let mut config = CounterConfig::load(&args.config)
        .with_context(|| format!("加载配置失败: {}", args.config.display()))?;
    if let Some(v) = args.confidence {
        config.confidence_threshold = v;
    }
    if let Some(v) = args.line_position {
        config.line_position = v;
    }
    if let Some(v) = args.skip_frames {
        config.skip_frames = v;
    }
    if let Some(v) = args.max_distance {
        config.max_distance = v;
    }
    if let Some(v) = args.max_disappeared {
        config.max_disappeared = v;
    }
    config.validate().context("配置参数无效")?;
    config.print_summary();

    // ========== 数据源与会话 ==========
    let source = JsonlSource::open(&args.detections)?;
    let mut session = CountingSession::from_config(&config)?;
    let mut sampler = FrameSampler::new(config.skip_frames);

    let events = match &args.events {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("无法创建快照文件: {}", path.display()))?;
            info!("💾 逐帧快照保存到: {}", path.display());
            Some(JsonSink::new(BufWriter::new(file)))
        }
        None => None,
    };
    let mut sink = CliSink {
        log: LogSink,
        events,
    };

    // ========== 运行 ==========
    let report = pipeline::run(source, &mut session, &mut sampler, &mut sink)?;
    if let Some(events) = sink.events.take() {
        events.into_inner().flush().context("写入快照文件失败")?;
    }
    report.print_summary();

    if let Some(path) = &args.report {
        report
            .append_to(path)
            .with_context(|| format!("保存统计失败: {}", path.display()))?;
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
