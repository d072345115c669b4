//! 聊天 CLI 客户端
//!
//! 启动后按固定周期轮询消息并打印，标准输入的每一行作为一条消息发送

use anyhow::Result;
use chat_sync_core_rust::im::client::{ChatClient, ClientConfig};
use chat_sync_core_rust::im::message::{AttributionResolver, ViewProjector};
use chat_sync_core_rust::{MessageListener, MessageRecord, SendError};
use clap::Parser;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

/// 聊天 CLI 客户端
#[derive(Parser, Debug)]
#[command(name = "chat-cli")]
#[command(about = "聊天 CLI 客户端 - 轮询同步消息并从标准输入发送", long_about = None)]
struct Args {
    /// 运行时长（秒），0 表示直到标准输入关闭
    #[arg(short, long, default_value = "0")]
    duration: u64,

    /// 日志级别（默认: info,chat_sync_core_rust=debug）
    #[arg(long, default_value = "info,chat_sync_core_rust=debug")]
    log_level: String,
}

/// 初始化日志（输出到 stderr 和文件，stdout 留给消息视图）
fn init_logger(log_level: &str) {
    use std::fs::OpenOptions;
    use std::io;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    // 优先使用环境变量 RUST_LOG（如果设置了），否则使用命令行参数
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(true);

    // 日志文件打不开时只输出到 stderr
    let file_layer = OpenOptions::new()
        .create(true)
        .append(true)
        .open("chat-cli.log")
        .ok()
        .map(|log_file| {
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_ansi(false)
        });

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}

/// 视图变化时重绘整个会话
struct CliMessageListener {
    projector: ViewProjector,
}

#[async_trait::async_trait]
impl MessageListener for CliMessageListener {
    async fn on_messages_changed(&self, messages: Vec<MessageRecord>) {
        println!("──────── {} 条消息 ────────", messages.len());
        for msg in self.projector.project(&messages) {
            if msg.is_mine() {
                println!("{:>60} > [{}]", msg.text, msg.time_label);
            } else {
                println!("[{}] < {}", msg.time_label, msg.text);
            }
        }
    }

    async fn on_sync_failed(&self, error: String) {
        warn!("[CLI/Message] ⚠️ 同步失败: {}", error);
    }

    async fn on_send_failed(&self, error: String) {
        error!("[CLI/Message] ❌ 发送失败: {}", error);
    }
}

/// 逐行读取标准输入并发送
async fn read_and_send(client: &ChatClient) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        client.set_draft(line);
        match client.send_draft().await {
            Ok(()) => {}
            Err(SendError::EmptyMessage) => {}
            Err(e) => warn!("[CLI] 输入内容已保留: {:?}（{}）", client.draft(), e),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志
    init_logger(&args.log_level);

    info!("[CLI] 🚀 聊天 CLI 客户端");
    info!("[CLI] ⏱️  运行时长: {} 秒（0=直到输入结束）", args.duration);

    // 地址和轮询间隔是部署常量，不从命令行读取
    let config = ClientConfig::new();
    info!("[CLI] 🌐 API: {}", config.api_base_url);

    let listener = Arc::new(CliMessageListener {
        projector: ViewProjector::new(AttributionResolver::new(config.author_marker.clone())),
    });
    let client = ChatClient::with_listener(config, listener)?;
    let handle = client.start();

    if args.duration > 0 {
        info!("[CLI] ⏰ {} 秒后自动退出", args.duration);
        tokio::select! {
            _ = sleep(Duration::from_secs(args.duration)) => {}
            res = read_and_send(&client) => res?,
        }
    } else {
        read_and_send(&client).await?;
    }

    handle.stop().await;
    info!("[CLI] 👋 程序退出");
    Ok(())
}
