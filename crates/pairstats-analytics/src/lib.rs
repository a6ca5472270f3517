//! 페어 트레이딩 통계 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 거래 통계 집계 (승률, Profit Factor, R 배수, 변동성 등)
//! - 누적 손익 곡선과 낙폭 분석
//! - 대시보드 날짜 범위 해석
//! - 기간별 통계와 청산 사유별 요약
//!
//! 모든 계산은 순수 함수이며 I/O나 공유 상태가 없습니다.
//!
//! # Re-exports
//!
//! - [`statistics`]: 통계 집계 (TradeStatistics, StatsOptions)
//! - [`equity_curve`]: 누적 손익 곡선 (EquityCurve, DrawdownPeriod)
//! - [`window`]: 날짜 범위 (DateWindow, RangeTag)
//! - [`period`]: 기간별 통계 (PeriodStatistics, TimeFrame)

pub mod breakdown;
pub mod equity_curve;
pub mod period;
pub mod statistics;
pub mod window;

pub use breakdown::{close_reason_breakdown, CloseReasonSummary};
pub use equity_curve::{
    compute_equity_curve, DrawdownPeriod, EquityCurve, EquityCurveBuilder, EquityPoint,
};
pub use period::{compute_period_statistics, PeriodStatistics, TimeFrame};
pub use statistics::{compute_statistics, StatsOptions, TradeStatistics};
pub use window::{resolve_date_range, DateWindow, RangeTag};
