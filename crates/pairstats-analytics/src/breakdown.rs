//! 청산 사유별 요약.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pairstats_core::{CloseReason, TradeRecord};

use crate::statistics::{select_closed, StatsOptions};

/// 청산 사유 하나에 대한 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseReasonSummary {
    /// 청산 사유
    pub reason: CloseReason,
    /// 거래 수
    pub count: usize,
    /// 수익 거래 수
    pub wins: usize,
    /// 손실 거래 수
    pub losses: usize,
    /// 순손익 합계
    pub net_pnl: Decimal,
}

impl CloseReasonSummary {
    fn empty(reason: CloseReason) -> Self {
        Self {
            reason,
            count: 0,
            wins: 0,
            losses: 0,
            net_pnl: Decimal::ZERO,
        }
    }
}

/// 청산 사유별로 거래를 요약합니다.
///
/// [`CloseReason::ALL`] 순서를 따르며 거래가 없는 사유는 생략합니다.
pub fn close_reason_breakdown(
    trades: &[TradeRecord],
    opts: &StatsOptions,
) -> Vec<CloseReasonSummary> {
    let mut summaries = CloseReason::ALL.map(CloseReasonSummary::empty);

    for trade in select_closed(trades, opts) {
        let Some(summary) = summaries
            .iter_mut()
            .find(|s| s.reason == trade.record.close_reason)
        else {
            continue;
        };

        summary.count += 1;
        summary.net_pnl = summary.net_pnl.saturating_add(trade.pnl);
        if trade.pnl > Decimal::ZERO {
            summary.wins += 1;
        } else if trade.pnl < Decimal::ZERO {
            summary.losses += 1;
        }
    }

    summaries.into_iter().filter(|s| s.count > 0).collect()
}
