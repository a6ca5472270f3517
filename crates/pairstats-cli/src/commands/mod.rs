//! CLI 명령어 구현 모듈.
//!
//! 입력 로드, 날짜 범위 해석, 출력 형식 같은 명령어 공통 처리를 포함합니다.

pub mod curve;
pub mod periods;
pub mod stats;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, TimeZone};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use pairstats_analytics::{resolve_date_range, DateWindow, RangeTag, StatsOptions};
use pairstats_core::{parse_date_string, parse_end_date_string, parse_records, TradeRecord};

/// 출력 형식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// 사람이 읽기 쉬운 표
    #[default]
    Table,
    /// JSON
    Json,
}

impl OutputFormat {
    /// 문자열에서 출력 형식 파싱.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "table" | "text" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// 명령어 공통 필터 설정.
#[derive(Debug, Clone, Default)]
pub struct FilterArgs {
    /// 범위 태그 (today, 7days, month, quarter, all ...)
    pub range: Option<String>,
    /// 시작 날짜 (지정 시 사용자 지정 범위)
    pub from: Option<String>,
    /// 종료 날짜
    pub to: Option<String>,
    /// 수수료 제외 여부
    pub no_fees: bool,
}

/// 거래 기록 파일을 읽습니다.
///
/// 경로가 `-`이면 표준 입력에서 읽습니다.
pub fn load_trades(path: &str) -> Result<Vec<TradeRecord>> {
    let json = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read trades from stdin")?;
        buf
    } else {
        std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("Failed to read trades file: {}", path))?
    };

    let trades = parse_records(&json)?;
    info!("Loaded {} trade records from {}", trades.len(), path);
    Ok(trades)
}

/// 필터 인자를 청산 시각 윈도우로 변환합니다.
///
/// `from`/`to`가 있으면 사용자 지정 범위, 없으면 `range` (또는 `default_range`) 태그를 사용합니다.
pub fn resolve_window<Tz: TimeZone>(
    args: &FilterArgs,
    default_range: &str,
    now: &DateTime<Tz>,
) -> Result<DateWindow> {
    let tz = now.timezone();

    let tag = match (&args.from, &args.to) {
        (Some(from), to) => RangeTag::Custom {
            from: parse_date_string(from, &tz)?,
            to: to
                .as_deref()
                .map(|to| parse_end_date_string(to, &tz))
                .transpose()?,
        },
        (None, Some(to)) => {
            return Ok(DateWindow {
                start: None,
                end: Some(parse_end_date_string(to, &tz)?),
            })
        }
        (None, None) => args
            .range
            .as_deref()
            .unwrap_or(default_range)
            .parse::<RangeTag>()
            .map_err(|e| anyhow!(e))?,
    };

    let window = resolve_date_range(now, &tag);
    if let (Some(start), Some(end)) = (window.start, window.end) {
        if start > end {
            return Err(anyhow!("Start date must be before end date"));
        }
    }

    debug!(range = %tag, ?window, "Resolved date window");
    Ok(window)
}

/// 통계 옵션을 만듭니다.
pub fn build_options(include_fees: bool, args: &FilterArgs, window: DateWindow) -> StatsOptions {
    let opts = StatsOptions::new(include_fees && !args.no_fees);
    if window.is_unbounded() {
        opts
    } else {
        opts.with_window(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc};

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 20, 15, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("table"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("csv"), None);
    }

    #[test]
    fn test_default_range_used() {
        let window = resolve_window(&FilterArgs::default(), "all", &now()).unwrap();
        assert!(window.is_unbounded());

        let window = resolve_window(&FilterArgs::default(), "7days", &now()).unwrap();
        assert_eq!(
            window.end.unwrap() - window.start.unwrap(),
            Duration::days(7)
        );
    }

    #[test]
    fn test_custom_dates_are_local() {
        let args = FilterArgs {
            from: Some("2024-05-01".to_string()),
            to: Some("2024-05-10".to_string()),
            ..Default::default()
        };
        let window = resolve_window(&args, "all", &now()).unwrap();

        assert_eq!(
            window.start,
            Some(Utc.with_ymd_and_hms(2024, 4, 30, 16, 0, 0).unwrap())
        );
        assert_eq!(
            window.end,
            Some(Utc.with_ymd_and_hms(2024, 5, 10, 16, 0, 0).unwrap() - Duration::nanoseconds(1))
        );
    }

    #[test]
    fn test_reversed_dates_rejected() {
        let args = FilterArgs {
            from: Some("2024-05-10".to_string()),
            to: Some("2024-05-01".to_string()),
            ..Default::default()
        };
        assert!(resolve_window(&args, "all", &now()).is_err());
    }

    #[test]
    fn test_unknown_range_rejected() {
        let args = FilterArgs {
            range: Some("fortnight".to_string()),
            ..Default::default()
        };
        assert!(resolve_window(&args, "all", &now()).is_err());
    }

    #[test]
    fn test_build_options() {
        let args = FilterArgs {
            no_fees: true,
            ..Default::default()
        };
        let opts = build_options(true, &args, DateWindow::all());
        assert!(!opts.include_fees);
        assert!(opts.window.is_none());
    }
}
