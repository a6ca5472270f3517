//! 기간별 통계 명령어.
//!
//! # 사용 예시
//!
//! ```bash
//! # 주별 통계 (월요일 시작)
//! pairstats periods -i trades.json -t weekly
//!
//! # 이번 분기의 월별 통계
//! pairstats periods -i trades.json -t monthly -r quarter
//! ```

use anyhow::Result;
use chrono::TimeZone;
use serde_json::json;
use std::fmt::{self, Write};
use tracing::info;

use pairstats_analytics::{compute_period_statistics, PeriodStatistics, StatsOptions, TimeFrame};
use pairstats_core::TradeRecord;

use super::OutputFormat;

/// 기간별 통계 명령을 실행하고 결과를 출력합니다.
pub fn run_periods<Tz: TimeZone>(
    trades: &[TradeRecord],
    opts: &StatsOptions,
    timeframe: TimeFrame,
    tz: &Tz,
    format: OutputFormat,
) -> Result<Vec<PeriodStatistics>>
where
    Tz::Offset: std::fmt::Display,
{
    let periods = compute_period_statistics(trades, opts, timeframe, tz);

    info!(
        timeframe = %timeframe,
        periods = periods.len(),
        "Period statistics computed"
    );

    match format {
        OutputFormat::Table => print!("{}", render_table(&periods, timeframe, tz)?),
        OutputFormat::Json => {
            let output = json!({
                "timeframe": timeframe,
                "periods": periods,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(periods)
}

/// 기간별 통계를 표 형식 문자열로 만듭니다.
pub fn render_table<Tz: TimeZone>(
    periods: &[PeriodStatistics],
    timeframe: TimeFrame,
    tz: &Tz,
) -> Result<String, fmt::Error>
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    let line = "═══════════════════════════════════════════════════════════════";

    writeln!(out, "\n📅 {} 통계", timeframe.display_name())?;
    writeln!(out, "{}", line)?;
    writeln!(
        out,
        "  {:<12} {:>6} {:>8} {:>12} {:>8} {:>8}",
        "기간", "거래", "승률%", "순손익", "PF", "일평균"
    )?;

    for period in periods {
        let stats = &period.stats;
        writeln!(
            out,
            "  {:<12} {:>6} {:>8.2} {:>12.2} {:>8} {:>8.2}",
            period.start.with_timezone(tz).format("%Y-%m-%d"),
            stats.total_trades,
            stats.win_rate,
            stats.net_profit,
            format!("{:.2}", stats.profit_factor),
            period.avg_trades_per_day()
        )?;
    }

    if periods.is_empty() {
        writeln!(out, "  (거래 없음)")?;
    }

    writeln!(out, "{}", line)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn test_render_table_rows() {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 3, 0, 0).unwrap();
        let trades = vec![
            TradeRecord::closed("a", base, base + Duration::hours(1), dec!(10), dec!(0)),
            TradeRecord::closed(
                "b",
                base + Duration::days(1),
                base + Duration::days(1) + Duration::hours(1),
                dec!(-5),
                dec!(0),
            ),
        ];
        let periods =
            compute_period_statistics(&trades, &StatsOptions::new(true), TimeFrame::Daily, &Utc);

        let table = render_table(&periods, TimeFrame::Daily, &Utc).unwrap();
        assert!(table.contains("일별"));
        assert!(table.contains("2024-05-01"));
        assert!(table.contains("2024-05-02"));
    }

    #[test]
    fn test_render_empty() {
        let table = render_table(&[], TimeFrame::Weekly, &Utc).unwrap();
        assert!(table.contains("거래 없음"));
    }
}
