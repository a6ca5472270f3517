//! 페어 트레이딩 통계 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 전체 기간 통계
//! pairstats stats -i trades.json
//!
//! # 최근 7일 통계 (JSON)
//! pairstats stats -i trades.json -r 7days -f json
//!
//! # 이번 달 누적 손익 곡선 (일별)
//! pairstats curve -i trades.json -r month -t daily
//!
//! # 월별 통계
//! pairstats periods -i trades.json -t monthly
//! ```

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, error};

use pairstats_analytics::TimeFrame;
use pairstats_cli::commands::{
    build_options, curve::run_curve, load_trades, periods::run_periods, resolve_window,
    stats::run_stats, FilterArgs, OutputFormat,
};
use pairstats_core::{init_logging, AppConfig, LogConfig};

#[derive(Parser)]
#[command(name = "pairstats")]
#[command(about = "Pair trading statistics - 거래 내역 통계 리포트", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (TOML)
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: PathBuf,

    /// 디버그 로그 출력
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// 명령어 공통 입력 인자
#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// 거래 기록 JSON 파일 (`-` = 표준 입력)
    #[arg(short, long)]
    input: String,

    /// 범위 (today, 7days, 30days, month, quarter, all)
    #[arg(short, long, conflicts_with_all = ["from", "to"])]
    range: Option<String>,

    /// 시작 날짜 (YYYY-MM-DD 또는 ISO 8601)
    #[arg(long)]
    from: Option<String>,

    /// 종료 날짜 (YYYY-MM-DD 또는 ISO 8601, 날짜만 주면 그날 끝까지)
    #[arg(long)]
    to: Option<String>,

    /// 수수료 제외 (총손익 기준)
    #[arg(long, default_value = "false")]
    no_fees: bool,

    /// 출력 형식 (table, json)
    #[arg(short, long, default_value = "table")]
    format: String,
}

impl InputArgs {
    fn filter(&self) -> FilterArgs {
        FilterArgs {
            range: self.range.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            no_fees: self.no_fees,
        }
    }

    fn output_format(&self) -> Result<OutputFormat> {
        OutputFormat::from_str(&self.format).ok_or_else(|| {
            anyhow!(
                "Invalid format: {}. Supported: table, json",
                self.format
            )
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// 거래 통계 (승률, Profit Factor, R 배수, 낙폭 등)
    Stats {
        #[command(flatten)]
        input: InputArgs,
    },

    /// 누적 손익 곡선과 낙폭 구간
    Curve {
        #[command(flatten)]
        input: InputArgs,

        /// 집계 단위 (daily, weekly, monthly, quarterly, yearly)
        #[arg(short, long)]
        timeframe: Option<String>,
    },

    /// 기간별 통계
    Periods {
        #[command(flatten)]
        input: InputArgs,

        /// 집계 단위 (daily, weekly, monthly, quarterly, yearly)
        #[arg(short, long, default_value = "daily")]
        timeframe: String,
    },
}

fn parse_timeframe(s: &str) -> Result<TimeFrame> {
    s.parse::<TimeFrame>().map_err(|e| {
        anyhow!(
            "{}. Supported: daily, weekly, monthly, quarterly, yearly",
            e
        )
    })
}

fn main() -> Result<()> {
    // .env 파일은 선택 사항
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let app_config = AppConfig::load(Some(cli.config.as_path()))?;

    let mut log_config = LogConfig::from(&app_config.logging);
    if cli.verbose {
        log_config.level = "debug".to_string();
    }
    if let Err(e) = init_logging(log_config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let tz = app_config.analytics.tz()?;
    let now = Utc::now().with_timezone(&tz);
    debug!(timezone = %tz, %now, "Configuration loaded");

    let input = match &cli.command {
        Commands::Stats { input }
        | Commands::Curve { input, .. }
        | Commands::Periods { input, .. } => input,
    };

    let format = input.output_format()?;
    let filter = input.filter();
    let window = resolve_window(&filter, &app_config.analytics.default_range, &now)?;
    let opts = build_options(app_config.analytics.include_fees, &filter, window);
    let trades = load_trades(&input.input)?;

    let result = match &cli.command {
        Commands::Stats { .. } => run_stats(&trades, &opts, format).map(|_| ()),
        Commands::Curve { timeframe, .. } => {
            let timeframe = timeframe.as_deref().map(parse_timeframe).transpose()?;
            run_curve(&trades, &opts, timeframe, &tz, format).map(|_| ())
        }
        Commands::Periods { timeframe, .. } => {
            let timeframe = parse_timeframe(timeframe)?;
            run_periods(&trades, &opts, timeframe, &tz, format).map(|_| ())
        }
    };

    if let Err(e) = &result {
        error!("Command failed: {}", e);
    }
    result
}
