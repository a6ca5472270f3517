//! 날짜/시간 유틸리티.
//!
//! 모든 함수는 시간대를 명시적으로 받으며 시스템 시계를 읽지 않습니다.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::error::{PairStatsError, PairStatsResult};

/// 로컬 날짜/시각을 주어진 시간대의 시각으로 변환합니다.
///
/// 서머타임 전환으로 모호한 시각은 이른 쪽을, 존재하지 않는 시각은
/// 한 시간 뒤를 사용합니다.
pub fn localize<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// 해당 로컬 날짜의 시작 시각(00:00:00)을 반환합니다.
pub fn start_of_local_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    localize(tz, date.and_time(NaiveTime::MIN)).with_timezone(&Utc)
}

/// 해당 로컬 날짜의 마지막 시각(다음 날 자정 - 1ns)을 반환합니다.
pub fn end_of_local_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    match date.succ_opt() {
        Some(next) => start_of_local_day(tz, next) - Duration::nanoseconds(1),
        None => DateTime::<Utc>::MAX_UTC,
    }
}

/// 시각이 속한 로컬 날짜의 자정을 반환합니다.
pub fn local_midnight<Tz: TimeZone>(dt: &DateTime<Tz>) -> DateTime<Utc> {
    start_of_local_day(&dt.timezone(), dt.date_naive())
}

/// 날짜 문자열을 UTC 시각으로 해석합니다.
///
/// 지원 형식:
/// - `YYYY-MM-DD` → 해당 로컬 날짜의 자정
/// - RFC 3339 (`Z` 또는 오프셋 포함) → 그대로
/// - 오프셋 없는 `YYYY-MM-DDTHH:MM:SS[.fff]` → 로컬 시각으로 간주
///
/// URL 인코딩된 `:`(`%3A`)와 `+`(`%2B`)는 미리 복원합니다.
pub fn parse_date_string<Tz: TimeZone>(input: &str, tz: &Tz) -> PairStatsResult<DateTime<Utc>> {
    let s = input.trim().replace("%3A", ":").replace("%2B", "+");

    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&s, fmt) {
            return Ok(localize(tz, naive).with_timezone(&Utc));
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .map(|date| start_of_local_day(tz, date))
        .map_err(|e| PairStatsError::InvalidDate(format!("'{}': {}", input, e)))
}

/// 종료 날짜 문자열을 해석합니다.
///
/// 날짜만 주어지면 그날의 마지막 시각으로 확장합니다.
pub fn parse_end_date_string<Tz: TimeZone>(
    input: &str,
    tz: &Tz,
) -> PairStatsResult<DateTime<Utc>> {
    match NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d") {
        Ok(date) => Ok(end_of_local_day(tz, date)),
        Err(_) => parse_date_string(input, tz),
    }
}
