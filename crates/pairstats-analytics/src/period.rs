//! 기간별 거래 통계.
//!
//! 청산 시각의 로컬 달력 기간(일/주/월/분기/연)으로 거래를 묶고 기간마다 통계를 계산합니다.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use pairstats_core::{end_of_local_day, start_of_local_day, TradeRecord};

use crate::statistics::{select_closed, statistics_from_closed, StatsOptions, TradeStatistics};

/// 시간 프레임 (데이터 집계 단위)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFrame {
    /// 일별 집계
    Daily,
    /// 주별 집계 (월요일 시작)
    Weekly,
    /// 월별 집계
    Monthly,
    /// 분기별 집계
    Quarterly,
    /// 연간 집계
    Yearly,
}

impl TimeFrame {
    /// 시간 프레임의 표시 이름
    pub fn display_name(&self) -> &'static str {
        match self {
            TimeFrame::Daily => "일별",
            TimeFrame::Weekly => "주별",
            TimeFrame::Monthly => "월별",
            TimeFrame::Quarterly => "분기별",
            TimeFrame::Yearly => "연간",
        }
    }

    /// 날짜가 속한 기간의 첫날.
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        let first_of_month = date - Days::new(u64::from(date.day0()));
        match self {
            TimeFrame::Daily => date,
            TimeFrame::Weekly => {
                date - Days::new(u64::from(date.weekday().num_days_from_monday()))
            }
            TimeFrame::Monthly => first_of_month,
            TimeFrame::Quarterly => first_of_month
                .checked_sub_months(Months::new(date.month0() % 3))
                .unwrap_or(first_of_month),
            TimeFrame::Yearly => first_of_month
                .checked_sub_months(Months::new(date.month0()))
                .unwrap_or(first_of_month),
        }
    }

    /// 다음 기간의 첫날 (달력 범위를 넘으면 None).
    pub fn next_period_start(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            TimeFrame::Daily => start.checked_add_days(Days::new(1)),
            TimeFrame::Weekly => start.checked_add_days(Days::new(7)),
            TimeFrame::Monthly => start.checked_add_months(Months::new(1)),
            TimeFrame::Quarterly => start.checked_add_months(Months::new(3)),
            TimeFrame::Yearly => start.checked_add_months(Months::new(12)),
        }
    }
}

impl FromStr for TimeFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "1d" => Ok(TimeFrame::Daily),
            "weekly" | "week" | "1w" => Ok(TimeFrame::Weekly),
            "monthly" | "month" | "1m" => Ok(TimeFrame::Monthly),
            "quarterly" | "quarter" | "1q" => Ok(TimeFrame::Quarterly),
            "yearly" | "year" | "1y" => Ok(TimeFrame::Yearly),
            _ => Err(format!("Unknown timeframe: {}", s)),
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeFrame::Daily => "daily",
            TimeFrame::Weekly => "weekly",
            TimeFrame::Monthly => "monthly",
            TimeFrame::Quarterly => "quarterly",
            TimeFrame::Yearly => "yearly",
        };
        f.write_str(name)
    }
}

/// 기간별 통계.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStatistics {
    /// 기간 시작 (로컬 자정, UTC로 표현)
    pub start: DateTime<Utc>,
    /// 기간 종료 (마지막 날의 마지막 순간)
    pub end: DateTime<Utc>,
    /// 거래 통계
    pub stats: TradeStatistics,
}

impl PeriodStatistics {
    /// 기간 길이 (일수).
    pub fn period_days(&self) -> i64 {
        self.end.signed_duration_since(self.start).num_days() + 1
    }

    /// 일평균 거래 횟수.
    pub fn avg_trades_per_day(&self) -> f64 {
        let days = self.period_days().max(1) as f64;
        self.stats.total_trades as f64 / days
    }
}

/// 기간별 거래 통계를 계산합니다.
///
/// 거래가 있는 기간만 포함하며 기간 시작 순으로 정렬됩니다.
pub fn compute_period_statistics<Tz: TimeZone>(
    trades: &[TradeRecord],
    opts: &StatsOptions,
    timeframe: TimeFrame,
    tz: &Tz,
) -> Vec<PeriodStatistics> {
    let mut buckets: BTreeMap<NaiveDate, Vec<_>> = BTreeMap::new();

    for trade in select_closed(trades, opts) {
        let local_date = trade.closed_at.with_timezone(tz).date_naive();
        buckets
            .entry(timeframe.period_start(local_date))
            .or_default()
            .push(trade);
    }

    debug!(
        timeframe = %timeframe,
        periods = buckets.len(),
        "Computing period statistics"
    );

    buckets
        .into_iter()
        .map(|(first_day, closed)| {
            let end = timeframe
                .next_period_start(first_day)
                .and_then(|next| next.pred_opt())
                .map(|last_day| end_of_local_day(tz, last_day))
                .unwrap_or(DateTime::<Utc>::MAX_UTC);

            PeriodStatistics {
                start: start_of_local_day(tz, first_day),
                end,
                stats: statistics_from_closed(closed, opts.include_fees),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn trade(id: &str, closed: DateTime<Utc>, gross: rust_decimal::Decimal) -> TradeRecord {
        TradeRecord::closed(id, closed - Duration::hours(1), closed, gross, dec!(0))
    }

    #[test]
    fn test_period_start() {
        // 2024-05-15 (수요일)
        let d = date(2024, 5, 15);
        assert_eq!(TimeFrame::Daily.period_start(d), d);
        assert_eq!(TimeFrame::Weekly.period_start(d), date(2024, 5, 13));
        assert_eq!(TimeFrame::Monthly.period_start(d), date(2024, 5, 1));
        assert_eq!(TimeFrame::Quarterly.period_start(d), date(2024, 4, 1));
        assert_eq!(TimeFrame::Yearly.period_start(d), date(2024, 1, 1));

        // 일요일은 그 주 월요일로
        assert_eq!(TimeFrame::Weekly.period_start(date(2024, 5, 19)), date(2024, 5, 13));
    }

    #[test]
    fn test_timeframe_parse() {
        assert_eq!("weekly".parse::<TimeFrame>().unwrap(), TimeFrame::Weekly);
        assert_eq!("1M".parse::<TimeFrame>().unwrap(), TimeFrame::Monthly);
        assert!("hourly".parse::<TimeFrame>().is_err());
        assert_eq!(TimeFrame::Quarterly.to_string(), "quarterly");
    }

    #[test]
    fn test_daily_buckets_in_local_zone() {
        let tz = FixedOffset::east_opt(8 * 3600).unwrap();
        let trades = vec![
            // 로컬 5/1 10:00
            trade("a", Utc.with_ymd_and_hms(2024, 5, 1, 2, 0, 0).unwrap(), dec!(10)),
            // 로컬 5/2 01:00 (UTC로는 5/1)
            trade("b", Utc.with_ymd_and_hms(2024, 5, 1, 17, 0, 0).unwrap(), dec!(-4)),
            trade("c", Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap(), dec!(6)),
        ];

        let periods =
            compute_period_statistics(&trades, &StatsOptions::new(false), TimeFrame::Daily, &tz);

        assert_eq!(periods.len(), 2);
        assert_eq!(
            periods[0].start,
            Utc.with_ymd_and_hms(2024, 4, 30, 16, 0, 0).unwrap()
        );
        assert_eq!(
            periods[0].end,
            Utc.with_ymd_and_hms(2024, 5, 1, 16, 0, 0).unwrap() - Duration::nanoseconds(1)
        );
        assert_eq!(periods[0].stats.total_trades, 1);
        assert_eq!(periods[1].stats.total_trades, 2);
        assert_eq!(periods[1].stats.net_profit, dec!(2));
        assert_eq!(periods[1].period_days(), 1);
        assert_eq!(periods[1].avg_trades_per_day(), 2.0);
    }

    #[test]
    fn test_monthly_periods() {
        let trades = vec![
            trade("a", Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap(), dec!(5)),
            trade("b", Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap(), dec!(7)),
            trade("c", Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap(), dec!(-3)),
        ];

        let periods =
            compute_period_statistics(&trades, &StatsOptions::new(false), TimeFrame::Monthly, &Utc);

        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].stats.net_profit, dec!(5));
        assert_eq!(periods[1].stats.net_profit, dec!(4));
        assert_eq!(periods[1].period_days(), 29);
    }

    #[test]
    fn test_empty_input() {
        let periods =
            compute_period_statistics(&[], &StatsOptions::new(true), TimeFrame::Weekly, &Utc);
        assert!(periods.is_empty());
    }
}
