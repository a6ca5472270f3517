//! 누적 손익 곡선 명령어.
//!
//! # 사용 예시
//!
//! ```bash
//! # 거래별 곡선
//! pairstats curve -i trades.json
//!
//! # 일별 마지막 값만, 이번 달
//! pairstats curve -i trades.json -r month -t daily
//! ```

use anyhow::Result;
use chrono::TimeZone;
use serde_json::json;
use std::fmt::{self, Write};
use tracing::info;

use pairstats_analytics::{compute_equity_curve, EquityCurve, EquityPoint, StatsOptions, TimeFrame};
use pairstats_core::TradeRecord;

use super::OutputFormat;

/// 상위 낙폭 구간 표시 개수
const TOP_DRAWDOWNS: usize = 3;

/// 곡선 명령을 실행하고 결과를 출력합니다.
pub fn run_curve<Tz: TimeZone>(
    trades: &[TradeRecord],
    opts: &StatsOptions,
    timeframe: Option<TimeFrame>,
    tz: &Tz,
    format: OutputFormat,
) -> Result<EquityCurve>
where
    Tz::Offset: std::fmt::Display,
{
    let curve = compute_equity_curve(trades, opts);
    let points = match timeframe {
        Some(tf) => curve.aggregate(tf, tz),
        None => curve.points().to_vec(),
    };

    info!(
        points = points.len(),
        max_drawdown = %curve.max_drawdown(),
        "Equity curve computed"
    );

    match format {
        OutputFormat::Table => print!("{}", render_table(&curve, &points, tz)?),
        OutputFormat::Json => {
            let output = json!({
                "points": points,
                "max_drawdown": curve.max_drawdown(),
                "max_drawdown_amount": curve.max_drawdown_amount(),
                "recovery_factor": curve.recovery_factor(),
                "final_cumulative": curve.final_cumulative(),
                "drawdown_periods": curve.drawdown_periods(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(curve)
}

/// 곡선을 표 형식 문자열로 만듭니다.
///
/// 시각은 주어진 시간대로 표시합니다.
pub fn render_table<Tz: TimeZone>(
    curve: &EquityCurve,
    points: &[EquityPoint],
    tz: &Tz,
) -> Result<String, fmt::Error>
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    let line = "═══════════════════════════════════════════════════════════════";

    writeln!(out, "\n📈 누적 손익 곡선")?;
    writeln!(out, "{}", line)?;
    writeln!(
        out,
        "  {:<17} {:<12} {:>10} {:>11} {:>8}",
        "청산 시각", "거래", "손익", "누적", "낙폭%"
    )?;

    for p in points {
        writeln!(
            out,
            "  {:<17} {:<12} {:>10.2} {:>11.2} {:>8.2}",
            p.timestamp.with_timezone(tz).format("%Y-%m-%d %H:%M"),
            p.trade_id,
            p.pnl,
            p.cumulative,
            p.drawdown_pct
        )?;
    }

    writeln!(out, "  ───────────────────────────────────────────────────────────")?;
    writeln!(out, "  최종 누적 손익   {:>10.2}", curve.final_cumulative())?;
    writeln!(
        out,
        "  최대 낙폭        {:>9.2}% ({:.2})",
        curve.max_drawdown(),
        curve.max_drawdown_amount()
    )?;
    writeln!(out, "  회복 계수        {:>10.2}", curve.recovery_factor())?;

    let top = curve.top_drawdowns(TOP_DRAWDOWNS);
    if !top.is_empty() {
        writeln!(out, "  ───────────────────────────────────────────────────────────")?;
        writeln!(out, "  주요 낙폭 구간")?;
        for period in &top {
            let end = period
                .end
                .map(|e| e.with_timezone(tz).format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "진행 중".to_string());
            writeln!(
                out,
                "  {} ~ {:<10} {:>8.2}% ({:.2}, {} 거래)",
                period.start.with_timezone(tz).format("%Y-%m-%d"),
                end,
                period.max_drawdown_pct,
                period.depth,
                period.trade_count
            )?;
        }
    }

    writeln!(out, "{}", line)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use pairstats_analytics::EquityCurveBuilder;
    use rust_decimal_macros::dec;

    #[test]
    fn test_render_table_lists_points_and_drawdowns() {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let mut builder = EquityCurveBuilder::new();
        builder
            .add_pnl(base, "t1", dec!(100))
            .add_pnl(base + Duration::days(1), "t2", dec!(-40));
        let curve = builder.build();

        let table = render_table(&curve, curve.points(), &Utc).unwrap();
        assert!(table.contains("t1"));
        assert!(table.contains("t2"));
        assert!(table.contains("진행 중"));
        assert!(table.contains("40.00%"));
    }
}
