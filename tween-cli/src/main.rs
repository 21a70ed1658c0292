//! # Tween CLI
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p tween-cli -- run demos/bounce.json
//! cargo run -p tween-cli -- run demos/chain.json --dt 0.1 --every 5
//! cargo run -p tween-cli -- run demos/chain.json --json > trace.json
//! cargo run -p tween-cli -- check demos/chain.json
//! cargo run -p tween-cli -- easings
//! cargo run -p tween-cli -- -vv run demos/bounce.json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::bail;
use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;
use tween_cli::{Report, RunOptions, Runner, Scene};
use tween_core::EasingFunction;

#[derive(Parser)]
#[command(name = "tween-cli")]
#[command(about = "补间场景运行器 - 逐帧驱动 JSON 场景中的补间")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 日志详细程度（-v info，-vv debug，-vvv trace）
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行场景并输出逐帧字段值
    Run {
        /// 场景文件路径
        scene: PathBuf,

        /// 最多运行的帧数（覆盖场景设置）
        #[arg(long)]
        frames: Option<u32>,

        /// 每帧时长，单位秒（覆盖场景设置）
        #[arg(long)]
        dt: Option<f64>,

        /// 以 JSON 输出完整报告
        #[arg(long)]
        json: bool,

        /// 每隔多少帧输出一次
        #[arg(long, default_value = "1")]
        every: u32,
    },

    /// 检查场景文件
    Check {
        /// 场景文件路径
        scene: PathBuf,
    },

    /// 列出所有缓动函数
    Easings,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match real_main(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("错误: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn real_main(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run {
            scene,
            frames,
            dt,
            json,
            every,
        } => {
            if every == 0 {
                bail!("--every 必须大于 0");
            }
            let runner = Runner::new(Scene::load(&scene)?)?;
            let report = runner.run(&RunOptions {
                frames,
                frame_dt: dt,
                every,
            })?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(())
        }
        Commands::Check { scene } => {
            let path = scene.display().to_string();
            let problems = Scene::load(&scene)?.validate();
            if problems.is_empty() {
                println!("✓ {path}");
                return Ok(());
            }
            for problem in &problems {
                println!("✗ {problem}");
            }
            bail!("{path}: 发现 {} 个问题", problems.len());
        }
        Commands::Easings => {
            for easing in EasingFunction::ALL {
                let samples: Vec<String> = [0.25, 0.5, 0.75]
                    .iter()
                    .map(|&t| format!("{:.3}", easing.apply(t)))
                    .collect();
                println!("{:<14} {}", easing.name(), samples.join("  "));
            }
            Ok(())
        }
    }
}

fn print_report(report: &Report) {
    for frame in &report.frames {
        let values: Vec<String> = frame
            .values
            .iter()
            .flat_map(|(object, fields)| {
                fields
                    .iter()
                    .map(move |(field, value)| format!("{object}.{field}={value:.4}"))
            })
            .collect();
        println!("[{:>5}] t={:<8.3} {}", frame.index, frame.time, values.join(" "));
    }

    let events = &report.events;
    println!();
    println!(
        "开始 {}，更新 {}，完成 {}，失败 {}",
        events.started, events.updated, events.completed, events.failed
    );
    if !report.finished {
        println!("（仍有未完成的补间）");
    }
}
