//! 누적 손익 곡선(Equity Curve).
//!
//! 청산 거래를 청산 시각 순으로 누적하여 손익 곡선과 낙폭을 계산합니다.
//!
//! # 계산 규칙
//!
//! - 정렬 기준: 청산 시각 (같은 시각이면 입력 순서 유지)
//! - 고점(high-water mark)은 0에서 시작하며 누적 손익이 고점보다 클 때만 갱신
//! - 낙폭(%) = (고점 - 누적) / 고점 × 100, 고점 ≤ 0 이면 0
//! - 회복 계수 = max(최종 누적 손익, 0) / 최대 낙폭(%), 낙폭이 0이면 0
//! - 누적 손익과 낙폭은 표현 범위를 넘으면 포화

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use pairstats_core::{ratio_or_zero, TradeRecord};

use crate::period::TimeFrame;
use crate::statistics::{select_closed, ClosedTrade, StatsOptions};

/// 곡선의 한 점 (거래 하나당 하나).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    /// 청산 시각 (UTC)
    pub timestamp: DateTime<Utc>,

    /// 거래 식별자
    pub trade_id: String,

    /// 이 거래의 손익
    pub pnl: Decimal,

    /// 누적 손익
    pub cumulative: Decimal,

    /// 이 시점까지의 고점
    pub high_water_mark: Decimal,

    /// 고점 대비 낙폭 (%)
    /// 0 이상의 값 (0 = 고점, 양수 = 하락 중)
    pub drawdown_pct: Decimal,
}

/// 낙폭 구간.
///
/// 누적 손익이 고점 아래로 처음 내려간 거래에서 시작해, 고점을 회복한 거래에서 끝납니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownPeriod {
    /// 고점 시각 (첫 거래 전 0 고점이면 None)
    pub peak_at: Option<DateTime<Utc>>,

    /// 낙폭 시작 시각 (고점 아래로 내려간 첫 거래)
    pub start: DateTime<Utc>,

    /// 최저점 시각
    pub trough: DateTime<Utc>,

    /// 회복 시각, 미회복시 None
    pub end: Option<DateTime<Utc>>,

    /// 고점 누적 손익
    pub peak_value: Decimal,

    /// 최저점 누적 손익
    pub trough_value: Decimal,

    /// 구간 최대 낙폭 (%)
    pub max_drawdown_pct: Decimal,

    /// 구간 최대 낙폭 (금액)
    pub depth: Decimal,

    /// 구간에 포함된 거래 수 (회복 거래 제외)
    pub trade_count: usize,
}

impl DrawdownPeriod {
    /// 구간이 회복되었는지 확인합니다.
    pub fn is_recovered(&self) -> bool {
        self.end.is_some()
    }
}

/// 누적 손익 곡선.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquityCurve {
    /// 시계열 데이터 포인트 (청산 시각순)
    points: Vec<EquityPoint>,

    /// 최대 낙폭 (%)
    max_drawdown: Decimal,

    /// 최대 낙폭 (금액)
    max_drawdown_amount: Decimal,

    /// 회복 계수
    recovery_factor: Decimal,

    /// 낙폭 구간 (시간순)
    drawdown_periods: Vec<DrawdownPeriod>,
}

impl EquityCurve {
    /// 필터를 통과한 청산 거래로 곡선을 만듭니다.
    pub(crate) fn from_closed(mut closed: Vec<ClosedTrade<'_>>) -> Self {
        // sort_by_key는 안정 정렬
        closed.sort_by_key(|t| t.record.effective_close_time());

        let mut builder = EquityCurveBuilder::new();
        for trade in &closed {
            builder.add_pnl(trade.closed_at, trade.record.id.clone(), trade.pnl);
        }
        builder.build()
    }

    /// 모든 데이터 포인트를 반환합니다.
    pub fn points(&self) -> &[EquityPoint] {
        &self.points
    }

    /// 데이터 포인트 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 데이터가 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 최대 낙폭을 반환합니다 (%).
    pub fn max_drawdown(&self) -> Decimal {
        self.max_drawdown
    }

    /// 최대 낙폭 금액을 반환합니다.
    pub fn max_drawdown_amount(&self) -> Decimal {
        self.max_drawdown_amount
    }

    /// 회복 계수를 반환합니다.
    pub fn recovery_factor(&self) -> Decimal {
        self.recovery_factor
    }

    /// 낙폭 구간을 시간순으로 반환합니다.
    pub fn drawdown_periods(&self) -> &[DrawdownPeriod] {
        &self.drawdown_periods
    }

    /// 최종 누적 손익 (비어 있으면 0).
    pub fn final_cumulative(&self) -> Decimal {
        self.points
            .last()
            .map(|p| p.cumulative)
            .unwrap_or(Decimal::ZERO)
    }

    /// 최고 고점 (비어 있으면 0).
    pub fn peak(&self) -> Decimal {
        self.points
            .last()
            .map(|p| p.high_water_mark)
            .unwrap_or(Decimal::ZERO)
    }

    /// 현재 낙폭을 반환합니다 (%).
    pub fn current_drawdown(&self) -> Decimal {
        self.points
            .last()
            .map(|p| p.drawdown_pct)
            .unwrap_or(Decimal::ZERO)
    }

    /// 낙폭 시계열.
    pub fn drawdown_series(&self) -> Vec<(DateTime<Utc>, Decimal)> {
        self.points
            .iter()
            .map(|p| (p.timestamp, p.drawdown_pct))
            .collect()
    }

    /// 누적 손익 시계열.
    pub fn cumulative_series(&self) -> Vec<(DateTime<Utc>, Decimal)> {
        self.points
            .iter()
            .map(|p| (p.timestamp, p.cumulative))
            .collect()
    }

    /// 낙폭이 큰 순서로 상위 N개 구간을 반환합니다.
    pub fn top_drawdowns(&self, n: usize) -> Vec<DrawdownPeriod> {
        let mut periods = self.drawdown_periods.clone();
        periods.sort_by(|a, b| {
            b.max_drawdown_pct
                .cmp(&a.max_drawdown_pct)
                .then_with(|| b.depth.cmp(&a.depth))
        });
        periods.truncate(n);
        periods
    }

    /// 최대 연속 (수익, 손실) 횟수.
    ///
    /// 본전 거래는 양쪽 연속 기록을 모두 끊습니다.
    pub fn max_streaks(&self) -> (usize, usize) {
        let mut max_wins = 0;
        let mut max_losses = 0;
        let mut wins = 0;
        let mut losses = 0;

        for point in &self.points {
            if point.pnl > Decimal::ZERO {
                wins += 1;
                losses = 0;
            } else if point.pnl < Decimal::ZERO {
                losses += 1;
                wins = 0;
            } else {
                wins = 0;
                losses = 0;
            }
            max_wins = max_wins.max(wins);
            max_losses = max_losses.max(losses);
        }

        (max_wins, max_losses)
    }

    /// 시간 프레임별로 데이터를 집계합니다.
    ///
    /// 각 기간(주어진 시간대 기준)의 마지막 포인트만 남깁니다.
    pub fn aggregate<Tz: TimeZone>(&self, timeframe: TimeFrame, tz: &Tz) -> Vec<EquityPoint> {
        let mut grouped: BTreeMap<chrono::NaiveDate, &EquityPoint> = BTreeMap::new();

        for point in &self.points {
            let local_date = point.timestamp.with_timezone(tz).date_naive();
            grouped.insert(timeframe.period_start(local_date), point);
        }

        grouped.into_values().cloned().collect()
    }
}

/// 누적 손익 곡선 빌더.
///
/// 청산 시각순으로 거래 손익을 추가하여 곡선과 낙폭 구간을 구축합니다.
#[derive(Debug, Clone, Default)]
pub struct EquityCurveBuilder {
    points: Vec<EquityPoint>,
    cumulative: Decimal,
    high_water_mark: Decimal,
    high_water_at: Option<DateTime<Utc>>,
    max_drawdown: Decimal,
    max_drawdown_amount: Decimal,
    open_period: Option<DrawdownPeriod>,
    periods: Vec<DrawdownPeriod>,
}

impl EquityCurveBuilder {
    /// 새로운 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 거래 손익을 추가합니다.
    ///
    /// # 매개변수
    ///
    /// * `timestamp` - 청산 시각
    /// * `trade_id` - 거래 식별자
    /// * `pnl` - 손익 (양수 = 수익, 음수 = 손실)
    pub fn add_pnl(
        &mut self,
        timestamp: DateTime<Utc>,
        trade_id: impl Into<String>,
        pnl: Decimal,
    ) -> &mut Self {
        self.cumulative = self.cumulative.saturating_add(pnl);

        if self.cumulative >= self.high_water_mark {
            if self.cumulative > self.high_water_mark {
                self.high_water_mark = self.cumulative;
                self.high_water_at = Some(timestamp);
            }
            // 회복
            if let Some(mut period) = self.open_period.take() {
                period.end = Some(timestamp);
                self.periods.push(period);
            }
        } else {
            let depth = self.high_water_mark.saturating_sub(self.cumulative);
            let pct = drawdown_pct(self.high_water_mark, self.cumulative);
            let period = self.open_period.get_or_insert_with(|| DrawdownPeriod {
                peak_at: self.high_water_at,
                start: timestamp,
                trough: timestamp,
                end: None,
                peak_value: self.high_water_mark,
                trough_value: self.cumulative,
                max_drawdown_pct: Decimal::ZERO,
                depth: Decimal::ZERO,
                trade_count: 0,
            });

            period.trade_count += 1;
            if self.cumulative < period.trough_value {
                period.trough = timestamp;
                period.trough_value = self.cumulative;
            }
            period.max_drawdown_pct = period.max_drawdown_pct.max(pct);
            period.depth = period.depth.max(depth);

            self.max_drawdown_amount = self.max_drawdown_amount.max(depth);
        }

        let pct = drawdown_pct(self.high_water_mark, self.cumulative);
        self.max_drawdown = self.max_drawdown.max(pct);

        self.points.push(EquityPoint {
            timestamp,
            trade_id: trade_id.into(),
            pnl,
            cumulative: self.cumulative,
            high_water_mark: self.high_water_mark,
            drawdown_pct: pct,
        });

        self
    }

    /// 곡선을 빌드합니다.
    ///
    /// 회복되지 않은 낙폭 구간은 `end = None`으로 포함됩니다.
    pub fn build(mut self) -> EquityCurve {
        if let Some(period) = self.open_period.take() {
            self.periods.push(period);
        }

        let recovery_factor =
            ratio_or_zero(self.cumulative.max(Decimal::ZERO), self.max_drawdown);

        EquityCurve {
            points: self.points,
            max_drawdown: self.max_drawdown,
            max_drawdown_amount: self.max_drawdown_amount,
            recovery_factor,
            drawdown_periods: self.periods,
        }
    }
}

fn drawdown_pct(high_water_mark: Decimal, cumulative: Decimal) -> Decimal {
    if high_water_mark > Decimal::ZERO {
        ratio_or_zero(high_water_mark.saturating_sub(cumulative), high_water_mark)
            .saturating_mul(Decimal::ONE_HUNDRED)
    } else {
        Decimal::ZERO
    }
}

/// 거래 목록으로부터 누적 손익 곡선을 계산합니다.
///
/// 통계와 같은 필터(청산 여부, 기간, 수수료 포함 여부)를 사용합니다.
pub fn compute_equity_curve(trades: &[TradeRecord], opts: &StatsOptions) -> EquityCurve {
    let curve = EquityCurve::from_closed(select_closed(trades, opts));

    debug!(
        points = curve.len(),
        max_drawdown = %curve.max_drawdown(),
        drawdown_periods = curve.drawdown_periods().len(),
        "Computed equity curve"
    );

    curve
}
