//! 거래 통계 집계.
//!
//! 대시보드, 거래 내역, 선물 통계 화면이 공통으로 사용하는 유일한 통계 계산 경로입니다.
//! 모든 함수는 순수 함수이며 같은 입력에 대해 항상 같은 결과를 반환합니다.
//!
//! # 계산 규칙
//!
//! - 청산 시각이 없는 거래(미청산)와 진입 시각이 없는 거래(잘못된 기록)는 제외
//! - 손익 = 수수료 포함 시 `net_pnl ?? gross_pnl - fee`, 아니면 `gross_pnl`
//! - 손익 > 0 수익, < 0 손실, == 0 본전 (본전은 총 거래 수, 수수료, 변동성에만 반영)
//! - 0으로 나누는 경우 0 또는 [`Ratio::Infinite`]
//! - 합계와 비율이 표현 범위를 넘으면 `Decimal::MAX`/`Decimal::MIN`으로 포화
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use pairstats_analytics::{compute_statistics, StatsOptions};
//!
//! let stats = compute_statistics(&trades, &StatsOptions::new(true));
//! println!("승률: {}%", stats.win_rate);
//! println!("Profit Factor: {}", stats.profit_factor);
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use pairstats_core::{
    decimal_sqrt, population_std_dev, ratio_or_zero, saturating_sum, Ratio, TradeRecord,
};

use crate::equity_curve::EquityCurve;
use crate::window::DateWindow;

/// 통계 계산 옵션.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsOptions {
    /// 수수료 포함 여부 (true = 순손익 기준)
    pub include_fees: bool,
    /// 청산 시각 범위 (없으면 전체 기간)
    pub window: Option<DateWindow>,
}

impl StatsOptions {
    /// 전체 기간 옵션을 생성합니다.
    pub fn new(include_fees: bool) -> Self {
        Self {
            include_fees,
            window: None,
        }
    }

    /// 청산 시각 범위를 설정합니다.
    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = Some(window);
        self
    }
}

/// 필터를 통과한 청산 거래와 그 손익.
#[derive(Debug, Clone)]
pub(crate) struct ClosedTrade<'a> {
    pub record: &'a TradeRecord,
    pub closed_at: DateTime<Utc>,
    pub pnl: Decimal,
}

/// 통계 대상 거래를 고르고 손익을 계산합니다.
///
/// 입력 순서를 유지합니다.
pub(crate) fn select_closed<'a>(
    trades: &'a [TradeRecord],
    opts: &StatsOptions,
) -> Vec<ClosedTrade<'a>> {
    trades
        .iter()
        .filter(|t| t.is_valid())
        .filter_map(|record| {
            let closed_at = record.closed_at?;
            if let Some(window) = &opts.window {
                if !window.contains(closed_at) {
                    return None;
                }
            }
            Some(ClosedTrade {
                record,
                closed_at,
                pnl: record.pnl(opts.include_fees),
            })
        })
        .collect()
}

/// 거래 통계 요약.
///
/// 입력이 바뀔 때마다 새로 계산되는 값 객체입니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeStatistics {
    /// 총 거래 횟수 (청산 거래, 본전 포함)
    pub total_trades: usize,
    /// 수익 거래 횟수
    pub winning_trades: usize,
    /// 손실 거래 횟수
    pub losing_trades: usize,
    /// 승률 (백분율, 예: 65.5 = 65.5%)
    pub win_rate: Decimal,

    /// 총 수익 (수익 거래 합계)
    pub total_profit: Decimal,
    /// 총 손실 (손실 거래 합계, 양수)
    pub total_loss: Decimal,
    /// 순손익 (총 수익 - 총 손실)
    pub net_profit: Decimal,
    /// 평균 수익 (수익 거래만)
    pub avg_profit: Decimal,
    /// 평균 손실 (손실 거래만, 양수)
    pub avg_loss: Decimal,
    /// Profit Factor (총 수익 / 총 손실)
    pub profit_factor: Ratio,
    /// 총 수수료
    pub total_fees: Decimal,

    /// R 배수 합계 (부호 있음)
    pub total_r: Decimal,
    /// 수익 거래 R 합계
    pub total_win_r: Decimal,
    /// 손실 거래 R 합계 (양수)
    pub total_loss_r: Decimal,
    /// 수익 거래 평균 R
    pub avg_win_r: Decimal,
    /// 손실 거래 평균 R (양수)
    pub avg_loss_r: Decimal,
    /// 평균 손익비 (평균 수익 R / 평균 손실 R)
    pub avg_risk_reward_ratio: Ratio,
    /// 거래당 평균 R
    pub avg_r: Decimal,

    /// 최대 낙폭 (%)
    pub max_drawdown: Decimal,
    /// 최대 낙폭 (금액)
    pub max_drawdown_amount: Decimal,
    /// 회복 계수 (max(최종 누적 손익, 0) / 최대 낙폭%)
    pub recovery_factor: Decimal,
    /// 변동성 (거래별 손익의 모표준편차)
    pub volatility: Decimal,

    /// 최대 단일 수익
    pub largest_profit: Decimal,
    /// 최대 단일 손실 (양수)
    pub largest_loss: Decimal,
    /// 거래당 평균 손익
    pub avg_trade_pnl: Decimal,
    /// 기대값 (승률×평균수익 - 패률×평균손실)
    pub expectancy: Decimal,
    /// 최대 연속 수익 횟수
    pub max_consecutive_wins: usize,
    /// 최대 연속 손실 횟수
    pub max_consecutive_losses: usize,
    /// 평균 보유 시간 (초)
    pub avg_holding_secs: i64,

    /// 샤프 비율 (거래당 평균 손익 / 변동성)
    pub sharpe_ratio: Decimal,
    /// 소르티노 비율 (거래당 평균 손익 / 하방 편차)
    pub sortino_ratio: Decimal,
    /// 칼마 비율 (순손익 / 최대 낙폭 금액)
    pub calmar_ratio: Decimal,

    /// 평균 최대 불리 변동 (%, MAE가 기록된 거래만)
    pub avg_mae: Decimal,
    /// 평균 최대 유리 변동 (%, MFE가 기록된 거래만)
    pub avg_mfe: Decimal,
    /// 최대 불리 변동 중 최댓값 (%)
    pub max_mae: Decimal,
    /// 최대 유리 변동 중 최댓값 (%)
    pub max_mfe: Decimal,
}

impl TradeStatistics {
    /// 본전 거래 횟수.
    pub fn flat_trades(&self) -> usize {
        self.total_trades - self.winning_trades - self.losing_trades
    }

    /// 손실 거래 비율 (백분율).
    pub fn losing_rate(&self) -> Decimal {
        ratio_or_zero(
            Decimal::from(self.losing_trades),
            Decimal::from(self.total_trades),
        ) * Decimal::ONE_HUNDRED
    }

    /// 수익성이 있는지 확인합니다 (순손익 > 0).
    pub fn is_profitable(&self) -> bool {
        self.net_profit > Decimal::ZERO
    }
}

/// 거래 목록으로부터 통계를 계산합니다.
///
/// 빈 입력을 포함한 모든 입력에 대해 정의되어 있으며 패닉하지 않습니다.
pub fn compute_statistics(trades: &[TradeRecord], opts: &StatsOptions) -> TradeStatistics {
    let closed = select_closed(trades, opts);

    debug!(
        input = trades.len(),
        closed = closed.len(),
        include_fees = opts.include_fees,
        windowed = opts.window.is_some(),
        "Computing trade statistics"
    );

    statistics_from_closed(closed, opts.include_fees)
}

/// 이미 선별된 청산 거래로부터 통계를 계산합니다.
pub(crate) fn statistics_from_closed(
    closed: Vec<ClosedTrade<'_>>,
    include_fees: bool,
) -> TradeStatistics {
    if closed.is_empty() {
        return TradeStatistics::default();
    }

    let mut stats = TradeStatistics {
        total_trades: closed.len(),
        ..Default::default()
    };

    let mut pnls = Vec::with_capacity(closed.len());
    let mut loss_squares = Decimal::ZERO;
    let mut holding_secs: i64 = 0;
    let mut maes = Vec::new();
    let mut mfes = Vec::new();

    for trade in &closed {
        let pnl = trade.pnl;
        let r = trade.record.r_multiple(include_fees);

        pnls.push(pnl);
        stats.total_fees = stats.total_fees.saturating_add(trade.record.fee);
        stats.total_r = stats.total_r.saturating_add(r);

        if pnl > Decimal::ZERO {
            stats.winning_trades += 1;
            stats.total_profit = stats.total_profit.saturating_add(pnl);
            stats.total_win_r = stats.total_win_r.saturating_add(r);
            stats.largest_profit = stats.largest_profit.max(pnl);
        } else if pnl < Decimal::ZERO {
            let loss = pnl.abs();
            stats.losing_trades += 1;
            stats.total_loss = stats.total_loss.saturating_add(loss);
            stats.total_loss_r = stats.total_loss_r.saturating_add(r.abs());
            stats.largest_loss = stats.largest_loss.max(loss);
            loss_squares = loss_squares.saturating_add(loss.saturating_mul(loss));
        }

        maes.extend(trade.record.mae.map(|v| v.abs()));
        mfes.extend(trade.record.mfe.map(|v| v.abs()));

        if let Some(duration) = trade.record.holding_duration() {
            holding_secs = holding_secs.saturating_add(duration.num_seconds());
        }
    }

    let total = Decimal::from(stats.total_trades);
    let winners = Decimal::from(stats.winning_trades);
    let losers = Decimal::from(stats.losing_trades);

    stats.net_profit = stats.total_profit.saturating_sub(stats.total_loss);
    stats.win_rate = winners / total * Decimal::ONE_HUNDRED;
    stats.avg_profit = ratio_or_zero(stats.total_profit, winners);
    stats.avg_loss = ratio_or_zero(stats.total_loss, losers);
    stats.profit_factor = Ratio::of(stats.total_profit, stats.total_loss);

    stats.avg_win_r = ratio_or_zero(stats.total_win_r, winners);
    stats.avg_loss_r = ratio_or_zero(stats.total_loss_r, losers);
    stats.avg_risk_reward_ratio = if stats.winning_trades == 0 || stats.losing_trades == 0 {
        Ratio::ZERO
    } else {
        Ratio::of(stats.avg_win_r, stats.avg_loss_r)
    };
    stats.avg_r = ratio_or_zero(stats.total_r, total);

    stats.volatility = population_std_dev(&pnls);
    stats.avg_trade_pnl = ratio_or_zero(stats.net_profit, total);
    stats.expectancy = (winners / total)
        .saturating_mul(stats.avg_profit)
        .saturating_sub((losers / total).saturating_mul(stats.avg_loss));
    stats.avg_holding_secs = holding_secs / stats.total_trades as i64;

    stats.avg_mae = average(&maes);
    stats.avg_mfe = average(&mfes);
    stats.max_mae = maes.into_iter().max().unwrap_or(Decimal::ZERO);
    stats.max_mfe = mfes.into_iter().max().unwrap_or(Decimal::ZERO);

    // 낙폭과 연속 기록은 청산 시각 순서가 필요하므로 자산 곡선에서 얻음
    let curve = EquityCurve::from_closed(closed);
    stats.max_drawdown = curve.max_drawdown();
    stats.max_drawdown_amount = curve.max_drawdown_amount();
    stats.recovery_factor = curve.recovery_factor();
    let (wins, losses) = curve.max_streaks();
    stats.max_consecutive_wins = wins;
    stats.max_consecutive_losses = losses;

    stats.sharpe_ratio = ratio_or_zero(stats.avg_trade_pnl, stats.volatility);
    let downside_deviation = ratio_or_zero(loss_squares, losers);
    stats.sortino_ratio = ratio_or_zero(stats.avg_trade_pnl, decimal_sqrt(downside_deviation));
    stats.calmar_ratio = ratio_or_zero(stats.net_profit, stats.max_drawdown_amount);

    stats
}

/// 평균 (비어 있으면 0).
fn average(values: &[Decimal]) -> Decimal {
    ratio_or_zero(
        saturating_sum(values.iter().copied()),
        Decimal::from(values.len()),
    )
}
