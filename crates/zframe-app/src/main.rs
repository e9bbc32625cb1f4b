//! ZFrame 命令行程序
//!
//! 检查模型文件、把旧版类型名的文件升级为当前写法，或用建模工具生成示例模型。

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use zframe_core::entity::EntityType;
use zframe_core::math::{format_point3, Point3};
use zframe_core::repository::Repository;
use zframe_ui::{Editor, EditorConfig, ToolType};

#[derive(Parser)]
#[command(name = "zframe")]
#[command(about = "ZFrame - structural frame model files")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a summary of a model file
    Info {
        /// Model file
        file: PathBuf,

        /// List every node and element
        #[arg(short, long)]
        list: bool,
    },

    /// Rewrite a model file using the current record type names
    Upgrade {
        /// Input model file (either naming generation)
        input: PathBuf,

        /// Output file (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build a one-bay, two-storey demo frame with the modeling tools
    Demo {
        /// Output model file
        output: PathBuf,

        /// Editor configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Bay width
        #[arg(long, default_value_t = 6.0)]
        width: f64,

        /// Storey height
        #[arg(long, default_value_t = 3.0)]
        height: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing::subscriber::set_global_default(FmtSubscriber::builder().with_max_level(level).finish())?;

    match cli.command {
        Commands::Info { file, list } => info_command(&file, list),
        Commands::Upgrade { input, output } => {
            let output = output.unwrap_or_else(|| input.clone());
            upgrade_command(&input, &output)
        }
        Commands::Demo {
            output,
            config,
            width,
            height,
        } => demo_command(&output, config.as_deref(), width, height),
    }
}

fn info_command(file: &Path, list: bool) -> Result<()> {
    let repo = zframe_file::load(file).with_context(|| format!("Failed to load {}", file.display()))?;

    println!("{}", file.display());
    for entity_type in EntityType::ALL {
        let count = repo
            .iter()
            .filter(|(_, e)| e.entity_type() == entity_type)
            .count();
        println!("  {:<10} {}", entity_type.name(), count);
    }

    println!("  Layers:");
    let shown = repo.layers().shown_index();
    for (index, layer) in repo.layers().layers().iter().enumerate() {
        let marker = if Some(index) == shown { "*" } else { " " };
        println!("   {marker} {:<8} {}", layer.name, layer.elevation);
    }

    if list {
        print_entities(&repo);
    }
    Ok(())
}

fn print_entities(repo: &Repository) {
    for (id, entity) in repo.iter() {
        let detail = match repo.node(id) {
            Some(node) => format_point3(&node.position),
            None => entity
                .kind
                .node_refs()
                .iter()
                .filter_map(|n| repo.number(*n))
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(" - "),
        };
        let mark = if entity.selected { " (selected)" } else { "" };
        println!(
            "  {} {}: {}{}",
            entity.entity_type().name(),
            entity.number(),
            detail,
            mark
        );
    }
}

fn upgrade_command(input: &Path, output: &Path) -> Result<()> {
    let repo = zframe_file::load(input).with_context(|| format!("Failed to load {}", input.display()))?;
    zframe_file::save(&repo, output).with_context(|| format!("Failed to save {}", output.display()))?;
    info!("Upgraded {} -> {}", input.display(), output.display());
    Ok(())
}

fn demo_command(output: &Path, config: Option<&Path>, width: f64, height: f64) -> Result<()> {
    let config = match config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EditorConfig::default(),
    };
    let mut editor = Editor::new(config);
    // 坐标直接给出，只需要把 Z 放到当前图层
    if editor.config().snap_enabled {
        editor.toggle_snap();
    }

    for (index, name) in ["1F", "2F", "RF"].iter().enumerate() {
        editor
            .add_layer(name, index as f64 * height)
            .with_context(|| format!("Failed to add layer {name}"))?;
    }

    let corners = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(width, 0.0, 0.0),
        Point3::new(width, width, 0.0),
        Point3::new(0.0, width, 0.0),
    ];

    // 自上而下：先画楼层梁和楼板，再在下面一层布柱，柱顶落在上层节点
    for storey in (1..=2).rev() {
        editor.show_layer(storey)?;

        editor.set_tool(ToolType::AddBeam);
        for (i, start) in corners.iter().enumerate() {
            editor.click(*start, 0);
            editor.click(corners[(i + 1) % corners.len()], 0);
        }

        editor.set_tool(ToolType::AddFloor);
        editor.click(corners[0], 0);
        editor.click(corners[2], 0);

        editor.show_layer(storey - 1)?;
        editor.set_tool(ToolType::AddColumn);
        for corner in &corners {
            editor.click(*corner, 0);
        }
    }

    // 一面剪力墙
    editor.show_layer(0)?;
    editor.set_tool(ToolType::AddShearWall);
    editor.click(corners[0], 0);
    editor.click(corners[1], 0);

    for notice in editor.take_notices() {
        tracing::warn!("{}", notice);
    }
    // 没有属性编辑器可打开
    editor.take_pending_edits();

    editor
        .save(output)
        .with_context(|| format!("Failed to save {}", output.display()))?;

    let repo = editor.repo();
    info!(
        "Demo frame: {} nodes, {} members, {} planar elements",
        repo.node_count(),
        repo.member_count(),
        repo.planar_count()
    );
    Ok(())
}
