//! 날짜 범위 윈도우.
//!
//! 대시보드의 범위 선택값(`today`, `30days`, `month` 등)을 구체적인 `[start, end]`로 바꿉니다.
//! 현재 시각은 항상 인자로 받으며 시스템 시계를 읽지 않습니다.

use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use pairstats_core::{end_of_local_day, local_midnight, start_of_local_day};

/// 통계에 포함할 청산 시각 범위.
///
/// 양 끝 모두 포함이며, `None`인 쪽은 제한이 없습니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// 시작 시각 (포함)
    pub start: Option<DateTime<Utc>>,
    /// 종료 시각 (포함)
    pub end: Option<DateTime<Utc>>,
}

impl DateWindow {
    /// 제한 없는 윈도우 (전체 기간).
    pub fn all() -> Self {
        Self::default()
    }

    /// 양 끝이 있는 윈도우.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// 시작만 있는 윈도우.
    pub fn since(start: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// 시각이 윈도우 안에 있는지 확인합니다.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| ts >= start) && self.end.map_or(true, |end| ts <= end)
    }

    /// 양쪽 모두 제한이 없는지 확인합니다.
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// 범위 선택값.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeTag {
    /// 오늘 (로컬 자정 ~ 현재)
    Today,
    /// 최근 N일 (현재 - N일 ~ 현재)
    LastDays(u32),
    /// 이번 달 (1일 ~ 말일)
    Month,
    /// 이번 분기 (분기 첫날 ~ 분기 말일)
    Quarter,
    /// 사용자 지정 (`to`가 없으면 현재까지)
    Custom {
        from: DateTime<Utc>,
        to: Option<DateTime<Utc>>,
    },
    /// 전체 기간
    All,
}

impl FromStr for RangeTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        match key.as_str() {
            "today" => Ok(RangeTag::Today),
            "month" => Ok(RangeTag::Month),
            "quarter" => Ok(RangeTag::Quarter),
            "all" => Ok(RangeTag::All),
            "custom" => Err("custom range requires explicit from/to bounds".to_string()),
            _ => key
                .strip_suffix("days")
                .and_then(|n| n.parse::<u32>().ok())
                .filter(|n| *n > 0)
                .map(RangeTag::LastDays)
                .ok_or_else(|| format!("Unknown range tag: {}", s)),
        }
    }
}

impl fmt::Display for RangeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeTag::Today => f.write_str("today"),
            RangeTag::LastDays(n) => write!(f, "{}days", n),
            RangeTag::Month => f.write_str("month"),
            RangeTag::Quarter => f.write_str("quarter"),
            RangeTag::Custom { .. } => f.write_str("custom"),
            RangeTag::All => f.write_str("all"),
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// `[first, first + months)` 구간을 UTC 윈도우로 만듭니다.
fn calendar_window<Tz: TimeZone>(tz: &Tz, first: NaiveDate, months: u32) -> DateWindow {
    let start = start_of_local_day(tz, first);
    let end = first
        .checked_add_months(Months::new(months))
        .and_then(|next| next.pred_opt())
        .map(|last| end_of_local_day(tz, last))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    DateWindow::between(start, end)
}

/// 범위 선택값을 구체적인 윈도우로 변환합니다.
///
/// "로컬"은 `now`의 시간대를 뜻합니다. 같은 `(now, range)`에 대해 항상 같은 결과를 냅니다.
///
/// # 예시
///
/// ```
/// use chrono::{FixedOffset, TimeZone, Utc};
/// use pairstats_analytics::{resolve_date_range, RangeTag};
///
/// let tz = FixedOffset::east_opt(8 * 3600).unwrap();
/// let now = tz.with_ymd_and_hms(2024, 5, 20, 15, 0, 0).unwrap();
/// let window = resolve_date_range(&now, &RangeTag::Today);
///
/// assert_eq!(window.start, Some(Utc.with_ymd_and_hms(2024, 5, 19, 16, 0, 0).unwrap()));
/// assert_eq!(window.end, Some(now.with_timezone(&Utc)));
/// ```
pub fn resolve_date_range<Tz: TimeZone>(now: &DateTime<Tz>, range: &RangeTag) -> DateWindow {
    let tz = now.timezone();
    let now_utc = now.with_timezone(&Utc);
    let today = now.date_naive();

    match range {
        RangeTag::Today => DateWindow::between(local_midnight(now), now_utc),
        RangeTag::LastDays(n) => {
            let start = now_utc
                .checked_sub_signed(Duration::days(i64::from(*n)))
                .unwrap_or(DateTime::<Utc>::MIN_UTC);
            DateWindow::between(start, now_utc)
        }
        RangeTag::Month => calendar_window(&tz, first_of_month(today), 1),
        RangeTag::Quarter => {
            let month_in_quarter = today.month0() % 3;
            let first = first_of_month(today)
                .checked_sub_months(Months::new(month_in_quarter))
                .unwrap_or_else(|| first_of_month(today));
            calendar_window(&tz, first, 3)
        }
        RangeTag::Custom { from, to } => DateWindow::between(*from, to.unwrap_or(now_utc)),
        RangeTag::All => DateWindow::all(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc8() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!("today".parse::<RangeTag>().unwrap(), RangeTag::Today);
        assert_eq!("7days".parse::<RangeTag>().unwrap(), RangeTag::LastDays(7));
        assert_eq!("180DAYS".parse::<RangeTag>().unwrap(), RangeTag::LastDays(180));
        assert_eq!("quarter".parse::<RangeTag>().unwrap(), RangeTag::Quarter);
        assert!("0days".parse::<RangeTag>().is_err());
        assert!("custom".parse::<RangeTag>().is_err());
        assert!("fortnight".parse::<RangeTag>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for tag in ["today", "30days", "month", "quarter", "all"] {
            assert_eq!(tag.parse::<RangeTag>().unwrap().to_string(), tag);
        }
    }

    #[test]
    fn test_last_days() {
        let now = utc8().with_ymd_and_hms(2024, 5, 20, 15, 0, 0).unwrap();
        let window = resolve_date_range(&now, &RangeTag::LastDays(30));
        assert_eq!(window.start, Some(utc(2024, 4, 20, 7, 0, 0)));
        assert_eq!(window.end, Some(utc(2024, 5, 20, 7, 0, 0)));
    }

    #[test]
    fn test_last_days_beyond_calendar_range() {
        let now = utc8().with_ymd_and_hms(2024, 5, 20, 15, 0, 0).unwrap();
        let window = resolve_date_range(&now, &RangeTag::LastDays(u32::MAX));
        assert_eq!(window.start, Some(DateTime::<Utc>::MIN_UTC));
        assert_eq!(window.end, Some(utc(2024, 5, 20, 7, 0, 0)));
    }

    #[test]
    fn test_month_bounds() {
        let now = utc8().with_ymd_and_hms(2024, 2, 10, 9, 0, 0).unwrap();
        let window = resolve_date_range(&now, &RangeTag::Month);
        // 2024-02-01 00:00 (UTC+8) ~ 2024-02-29 23:59:59.999999999 (UTC+8)
        assert_eq!(window.start, Some(utc(2024, 1, 31, 16, 0, 0)));
        assert_eq!(
            window.end,
            Some(utc(2024, 2, 29, 16, 0, 0) - Duration::nanoseconds(1))
        );
    }

    #[test]
    fn test_december_month_rolls_year() {
        let now = Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap();
        let window = resolve_date_range(&now, &RangeTag::Month);
        assert_eq!(window.start, Some(utc(2023, 12, 1, 0, 0, 0)));
        assert_eq!(
            window.end,
            Some(utc(2024, 1, 1, 0, 0, 0) - Duration::nanoseconds(1))
        );
    }

    #[test]
    fn test_quarter_bounds() {
        let now = Utc.with_ymd_and_hms(2024, 8, 15, 12, 0, 0).unwrap();
        let window = resolve_date_range(&now, &RangeTag::Quarter);
        assert_eq!(window.start, Some(utc(2024, 7, 1, 0, 0, 0)));
        assert_eq!(
            window.end,
            Some(utc(2024, 10, 1, 0, 0, 0) - Duration::nanoseconds(1))
        );

        let now = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();
        let window = resolve_date_range(&now, &RangeTag::Quarter);
        assert_eq!(window.start, Some(utc(2024, 10, 1, 0, 0, 0)));
    }

    #[test]
    fn test_custom_defaults_to_now() {
        let now = Utc.with_ymd_and_hms(2024, 5, 20, 0, 0, 0).unwrap();
        let from = utc(2024, 5, 1, 0, 0, 0);
        let window = resolve_date_range(&now, &RangeTag::Custom { from, to: None });
        assert_eq!(window, DateWindow::between(from, now));
    }

    #[test]
    fn test_all_is_unbounded() {
        let now = Utc::now();
        let window = resolve_date_range(&now, &RangeTag::All);
        assert!(window.is_unbounded());
        assert!(window.contains(utc(1999, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_contains_inclusive() {
        let start = utc(2024, 1, 1, 0, 0, 0);
        let end = utc(2024, 1, 31, 0, 0, 0);
        let window = DateWindow::between(start, end);
        assert!(window.contains(start));
        assert!(window.contains(end));
        assert!(!window.contains(end + Duration::seconds(1)));

        let open_ended = DateWindow::since(start);
        assert!(open_ended.contains(utc(2030, 1, 1, 0, 0, 0)));
        assert!(!open_ended.contains(start - Duration::seconds(1)));
    }
}
