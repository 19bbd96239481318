mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cdnflow")]
#[command(about = "S3 + CloudFront の静的サイト配信スタックを設定ファイルから合成する", long_about = None)]
struct Cli {
    /// 設定ファイルのパス（省略時は自動検出、CDNFLOW_CONFIG_PATH）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// デプロイ環境（CDNFLOW_ENV 環境変数でも指定可）
    #[arg(short, long, global = true)]
    env: Option<String>,

    /// デバッグログを表示
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// エッジ関数をビルドし、テンプレートを書き出す
    Synth {
        /// 出力ディレクトリ
        #[arg(short, long, default_value = "cdk.out")]
        out: PathBuf,
        /// ビルドコマンドを実行するシェル
        #[arg(long, env = "SHELL")]
        shell: Option<String>,
    },
    /// 作成・参照されるリソースを表示
    Plan {
        /// ビルドコマンドを実行するシェル
        #[arg(long, env = "SHELL")]
        shell: Option<String>,
        /// JSON形式で出力
        #[arg(long)]
        json: bool,
    },
    /// 設定を検証
    Validate,
    /// エッジ関数のURI書き換え結果を表示
    Rewrite {
        /// 書き換えるURI
        #[arg(required = true)]
        uris: Vec<String>,
    },
    /// バージョン情報を表示
    Version,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // 設定ファイル不要なコマンド
    match &cli.command {
        Commands::Version => {
            println!("cdnflow {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Rewrite { uris } => {
            commands::rewrite::handle(uris);
            return Ok(());
        }
        _ => {}
    }

    let project = commands::load_project(cli.config.as_deref(), cli.env.as_deref())?;

    match cli.command {
        Commands::Validate => commands::validate::handle(&project)?,
        Commands::Synth { out, shell } => {
            commands::synth::handle(&project, &out, shell, !cli.verbose).await?
        }
        Commands::Plan { shell, json } => commands::plan::handle(&project, shell, json)?,
        Commands::Version | Commands::Rewrite { .. } => {
            unreachable!("handled before config loading")
        }
    }

    Ok(())
}
