//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov`: 运行 tween-core 覆盖率
//! - `scene-check`: 检查场景文件

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use anyhow::{Context, bail};
use tween_cli::Scene;
use walkdir::WalkDir;

const HELP: &str = "\
xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all            fmt --check、clippy、test
  cov                  tween-core 覆盖率报告（需要 cargo-llvm-cov）
  scene-check [path]   检查场景文件（默认 demos/）
";

fn main() -> ExitCode {
    match real_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("xtask error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next();

    match sub.as_deref() {
        Some("check-all") => {
            cargo(&["fmt", "--all", "--", "--check"])?;
            cargo(&["clippy", "--workspace", "--all-targets"])?;
            cargo(&["test", "--workspace"])?;
        }
        Some("cov") => {
            cargo(&["llvm-cov", "--version"]).context(
                "cargo llvm-cov 不可用，请先安装：cargo install cargo-llvm-cov \
                 && rustup component add llvm-tools-preview",
            )?;
            cargo(&["llvm-cov", "-p", "tween-core", "--html"])?;
            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        Some("scene-check") => scene_check(args.next().as_deref())?,
        None | Some("help" | "-h" | "--help") => eprint!("{HELP}"),
        Some(other) => bail!("unknown xtask subcommand: {other}"),
    }
    Ok(())
}

/// 运行一条 cargo 命令，失败时返回错误
fn cargo(args: &[&str]) -> anyhow::Result<()> {
    let step = format!("cargo {}", args.join(" "));
    eprintln!("\n==> {step}");
    let status = Command::new("cargo")
        .args(args)
        .status()
        .with_context(|| format!("无法启动 {step}"))?;
    if !status.success() {
        bail!("{step} failed with {status}");
    }
    Ok(())
}

//=============================================================================
// scene-check 命令实现
//=============================================================================

/// 默认场景目录（相对于 workspace root）
const DEFAULT_SCENES_DIR: &str = "demos";

fn scene_check(path: Option<&str>) -> anyhow::Result<()> {
    let files = match path {
        Some(p) => {
            let path = PathBuf::from(p);
            if path.is_file() {
                vec![path]
            } else if path.is_dir() {
                collect_scene_files(&path)?
            } else {
                bail!("路径不存在: {}", p);
            }
        }
        None => {
            let dir = Path::new(DEFAULT_SCENES_DIR);
            if !dir.exists() {
                bail!(
                    "默认场景目录不存在: {}\n请在 workspace 根目录运行，或指定场景路径",
                    dir.display()
                );
            }
            collect_scene_files(dir)?
        }
    };

    if files.is_empty() {
        eprintln!("未找到场景文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个场景文件...\n", files.len());

    let mut failed = 0;
    for file in &files {
        let id = file.display();
        match Scene::load(file) {
            Ok(scene) => {
                let problems = scene.validate();
                for problem in &problems {
                    eprintln!("[ERROR] {id}: {problem}");
                }
                if !problems.is_empty() {
                    failed += 1;
                }
            }
            Err(e) => {
                eprintln!("[ERROR] {id}: {e:#}");
                failed += 1;
            }
        }
    }

    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个场景", files.len());
    if failed > 0 {
        bail!("{failed} 个场景存在问题");
    }
    eprintln!("✅ 检查通过，无错误");
    Ok(())
}

/// 收集目录下的所有场景文件
fn collect_scene_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}
