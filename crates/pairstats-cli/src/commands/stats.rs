//! 거래 통계 명령어.
//!
//! # 사용 예시
//!
//! ```bash
//! # 전체 기간 통계 (수수료 포함)
//! pairstats stats -i trades.json
//!
//! # 최근 30일, 수수료 제외
//! pairstats stats -i trades.json -r 30days --no-fees
//!
//! # 사용자 지정 범위, JSON 출력
//! pairstats stats -i trades.json --from 2024-05-01 --to 2024-05-31 -f json
//! ```

use anyhow::Result;
use rust_decimal::Decimal;
use serde_json::json;
use std::fmt::{self, Write};
use tracing::info;

use pairstats_analytics::{
    close_reason_breakdown, compute_statistics, CloseReasonSummary, StatsOptions, TradeStatistics,
};
use pairstats_core::TradeRecord;

use super::OutputFormat;

/// 통계 명령을 실행하고 결과를 출력합니다.
pub fn run_stats(
    trades: &[TradeRecord],
    opts: &StatsOptions,
    format: OutputFormat,
) -> Result<TradeStatistics> {
    let stats = compute_statistics(trades, opts);
    let reasons = close_reason_breakdown(trades, opts);

    info!(
        total_trades = stats.total_trades,
        net_profit = %stats.net_profit,
        "Statistics computed"
    );

    match format {
        OutputFormat::Table => print!("{}", render_table(&stats, &reasons)?),
        OutputFormat::Json => {
            let output = json!({
                "include_fees": opts.include_fees,
                "window": opts.window,
                "statistics": stats,
                "close_reasons": reasons,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(stats)
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}

fn format_holding(secs: i64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours >= 24 {
        format!("{}d {}h", hours / 24, hours % 24)
    } else {
        format!("{}h {}m", hours, minutes)
    }
}

/// 통계를 표 형식 문자열로 만듭니다.
pub fn render_table(
    stats: &TradeStatistics,
    reasons: &[CloseReasonSummary],
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let line = "═══════════════════════════════════════════════════════════════";

    writeln!(out, "\n📊 거래 통계")?;
    writeln!(out, "{}", line)?;
    writeln!(
        out,
        "  총 거래          {:>10}   (수익 {} / 손실 {} / 본전 {})",
        stats.total_trades,
        stats.winning_trades,
        stats.losing_trades,
        stats.flat_trades()
    )?;
    writeln!(out, "  승률             {:>9.2}%", stats.win_rate)?;
    writeln!(out, "  순손익           {:>10}", money(stats.net_profit))?;
    writeln!(
        out,
        "  총 수익 / 손실   {:>10} / {}",
        money(stats.total_profit),
        money(stats.total_loss)
    )?;
    writeln!(
        out,
        "  평균 수익 / 손실 {:>10} / {}",
        money(stats.avg_profit),
        money(stats.avg_loss)
    )?;
    writeln!(
        out,
        "  최대 수익 / 손실 {:>10} / {}",
        money(stats.largest_profit),
        money(stats.largest_loss)
    )?;
    writeln!(
        out,
        "  Profit Factor    {:>10}",
        format!("{:.2}", stats.profit_factor)
    )?;
    writeln!(out, "  기대값           {:>10}", money(stats.expectancy))?;
    writeln!(out, "  총 수수료        {:>10}", money(stats.total_fees))?;
    writeln!(out, "  ───────────────────────────────────────────────────────────")?;
    writeln!(out, "  총 R             {:>10.2}", stats.total_r)?;
    writeln!(
        out,
        "  수익 R / 손실 R  {:>10.2} / {:.2}",
        stats.total_win_r, stats.total_loss_r
    )?;
    writeln!(
        out,
        "  평균 손익비      {:>10}",
        format!("{:.2}", stats.avg_risk_reward_ratio)
    )?;
    writeln!(out, "  ───────────────────────────────────────────────────────────")?;
    writeln!(out, "  최대 낙폭        {:>9.2}%", stats.max_drawdown)?;
    writeln!(out, "  회복 계수        {:>10.2}", stats.recovery_factor)?;
    writeln!(out, "  변동성           {:>10.2}", stats.volatility)?;
    writeln!(
        out,
        "  샤프 / 소르티노  {:>10.2} / {:.2}",
        stats.sharpe_ratio, stats.sortino_ratio
    )?;
    writeln!(
        out,
        "  최대 연속 수익/손실 {:>7} / {}",
        stats.max_consecutive_wins, stats.max_consecutive_losses
    )?;
    writeln!(
        out,
        "  평균 보유 시간   {:>10}",
        format_holding(stats.avg_holding_secs)
    )?;
    if !stats.max_mae.is_zero() || !stats.max_mfe.is_zero() {
        writeln!(
            out,
            "  평균 MAE / MFE   {:>9.2}% / {:.2}%",
            stats.avg_mae, stats.avg_mfe
        )?;
    }

    if !reasons.is_empty() {
        writeln!(out, "  ───────────────────────────────────────────────────────────")?;
        writeln!(out, "  청산 사유         거래   수익   손실        순손익")?;
        for r in reasons {
            writeln!(
                out,
                "  {:<16} {:>5} {:>6} {:>6} {:>13}",
                r.reason.as_str(),
                r.count,
                r.wins,
                r.losses,
                money(r.net_pnl)
            )?;
        }
    }

    writeln!(out, "{}", line)?;
    Ok(out)
}
