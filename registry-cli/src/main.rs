//! # 组件注册表命令行
//!
//! 列出、查看和新增流水线组件，结果以 JSON 输出到标准输出，日志输出到标准错误。

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use component_common::{AddComponentRequest, FILE_SOURCE_TYPE, URL_SOURCE_TYPE};
use registry_composition::{
    ComponentRegistry, LoggingConfig, RegistryBuilder, RegistryInfrastructure, SettingsLoader,
    DEFAULT_ENV_PREFIX,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "component-registry")]
#[command(about = "流水线组件注册表")]
struct Args {
    /// 配置文件路径（TOML / JSON / YAML）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 组件根目录，覆盖配置
    #[arg(long)]
    component_root: Option<PathBuf>,

    /// 日志级别
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 列出处理器类型下的组件
    List {
        /// 处理器类型（generic / kfp / airflow）
        processor_type: String,
    },
    /// 查看组件属性
    Properties {
        processor_type: String,
        component_id: String,
    },
    /// 查看完整组件
    Get {
        processor_type: String,
        component_id: String,
    },
    /// 查看组件执行说明
    Details {
        processor_type: String,
        component_id: String,
    },
    /// 新增组件到目录
    Add {
        processor_type: String,
        /// 显示名称
        #[arg(long)]
        name: String,
        /// 本地文件路径
        #[arg(long, conflicts_with = "url")]
        file: Option<String>,
        /// 网络地址
        #[arg(long)]
        url: Option<String>,
    },
    /// 查看注册表状态
    Status,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // 在加载配置之前安装，配置阶段的日志也能输出
    logging_config(&args.log_level).try_init()?;

    let infrastructure = build_infrastructure(&args)?;
    run(&infrastructure, args.command)
}

/// 构建注册表
fn build_infrastructure(args: &Args) -> Result<RegistryInfrastructure> {
    let mut loader = SettingsLoader::new();
    if let Some(config) = &args.config {
        loader = loader
            .add_file(config, 100)
            .with_context(|| format!("无法使用配置文件 {}", config.display()))?;
    } else {
        info!("未指定配置文件，使用默认配置和环境变量");
    }
    loader = loader.add_environment(DEFAULT_ENV_PREFIX, 50);

    let mut builder = RegistryBuilder::new()
        .load_settings(&loader)
        .context("加载配置失败")?;
    if let Some(root) = &args.component_root {
        builder = builder.with_component_root(root.clone());
    }

    let infrastructure = builder.build().context("构建组件注册表失败")?;
    debug!("注册表状态: {:?}", infrastructure.status());
    Ok(infrastructure)
}

fn run(infrastructure: &RegistryInfrastructure, command: Command) -> Result<()> {
    let registry = infrastructure.registry();
    match command {
        Command::List { processor_type } => {
            print_json(registry.list_components_shared(&processor_type)?.as_slice())
        }
        Command::Properties {
            processor_type,
            component_id,
        } => print_json(&registry.get_properties(&processor_type, &component_id)?),
        Command::Get {
            processor_type,
            component_id,
        } => print_json(&registry.get_component(&processor_type, &component_id)?),
        Command::Details {
            processor_type,
            component_id,
        } => print_json(&registry.get_execution_details(&processor_type, &component_id)?),
        Command::Add {
            processor_type,
            name,
            file,
            url,
        } => {
            let request = match (file, url) {
                (Some(path), None) => AddComponentRequest::new(name, FILE_SOURCE_TYPE, path),
                (None, Some(url)) => AddComponentRequest::new(name, URL_SOURCE_TYPE, url),
                _ => bail!("必须且只能指定 --file 或 --url 之一"),
            };
            print_json(&registry.add_component(&processor_type, &request)?)
        }
        Command::Status => print_json(&infrastructure.status()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 命令行日志配置，无法识别的级别按 warn 处理
fn logging_config(level: &str) -> LoggingConfig {
    LoggingConfig::default()
        .with_level(tracing::Level::WARN)
        .with_level_name(level)
}
