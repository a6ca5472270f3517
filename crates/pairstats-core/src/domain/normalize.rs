//! 백엔드 거래 기록 정규화.
//!
//! 백엔드와 이전 버전 프론트엔드는 같은 값을 여러 필드 이름으로 보냅니다
//! (`closed_at`/`close_time`, `total_pnl`/`gross_pnl`, `total_fee`/`fee` 등).
//! 별칭 해석은 이 모듈에서 한 번만 수행하고, 이후 계산은 [`TradeRecord`]만 사용합니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, warn};

use super::trade::{CloseReason, TradeRecord};
use crate::error::{PairStatsError, PairStatsResult};
use crate::time::parse_date_string;

/// 시각 필드의 원시 표현.
///
/// 문자열(ISO 8601, 오프셋 없으면 UTC로 간주) 또는 밀리초 단위 epoch.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// epoch 밀리초
    Millis(i64),
    /// 날짜 문자열
    Text(String),
}

impl RawTimestamp {
    fn resolve(&self, field: &str) -> PairStatsResult<DateTime<Utc>> {
        match self {
            RawTimestamp::Millis(ms) => DateTime::from_timestamp_millis(*ms).ok_or_else(|| {
                PairStatsError::InvalidDate(format!("{}: epoch 범위 초과 {}", field, ms))
            }),
            RawTimestamp::Text(s) => parse_date_string(s, &Utc),
        }
    }
}

/// 식별자 필드의 원시 표현 (문자열 또는 숫자).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// 문자열 식별자
    Text(String),
    /// 숫자 식별자
    Number(serde_json::Number),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Text(s) => f.write_str(s),
            RawId::Number(n) => write!(f, "{}", n),
        }
    }
}

/// 백엔드가 보내는 거래 기록 원본.
///
/// 별칭 필드를 각각 따로 받아 두고 [`RawTradeRecord::normalize`]에서 우선순위대로 고릅니다.
/// 한 기록에 여러 별칭이 동시에 들어와도 실패하지 않습니다.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTradeRecord {
    pub id: Option<RawId>,
    #[serde(rename = "_id")]
    pub object_id: Option<RawId>,
    pub trade_id: Option<RawId>,

    pub opened_at: Option<RawTimestamp>,
    pub created_at: Option<RawTimestamp>,
    pub entry_time: Option<RawTimestamp>,
    pub open_time: Option<RawTimestamp>,

    pub closed_at: Option<RawTimestamp>,
    pub close_time: Option<RawTimestamp>,
    pub exit_time: Option<RawTimestamp>,

    pub gross_pnl: Option<Decimal>,
    pub total_pnl: Option<Decimal>,
    pub pnl: Option<Decimal>,

    pub fee: Option<Decimal>,
    pub total_fee: Option<Decimal>,
    pub fees: Option<Decimal>,
    pub total_entry_fee: Option<Decimal>,
    pub total_exit_fee: Option<Decimal>,

    pub net_pnl: Option<Decimal>,
    pub max_loss: Option<Decimal>,
    pub close_reason: Option<String>,

    pub mae: Option<Decimal>,
    pub mfe: Option<Decimal>,
}

/// 첫 번째로 존재하는 시각 필드를 해석합니다.
fn first_timestamp(
    candidates: &[(&str, &Option<RawTimestamp>)],
) -> PairStatsResult<Option<DateTime<Utc>>> {
    for (field, value) in candidates {
        if let Some(raw) = value {
            return raw.resolve(field).map(Some);
        }
    }
    Ok(None)
}

impl RawTradeRecord {
    /// 정규화된 [`TradeRecord`]로 변환합니다.
    ///
    /// 시각 문자열을 해석할 수 없으면 에러를 반환합니다.
    pub fn normalize(&self) -> PairStatsResult<TradeRecord> {
        let id = self
            .id
            .as_ref()
            .or(self.object_id.as_ref())
            .or(self.trade_id.as_ref())
            .map(RawId::to_string)
            .unwrap_or_default();

        let opened_at = first_timestamp(&[
            ("opened_at", &self.opened_at),
            ("created_at", &self.created_at),
            ("entry_time", &self.entry_time),
            ("open_time", &self.open_time),
        ])?;

        let closed_at = first_timestamp(&[
            ("closed_at", &self.closed_at),
            ("close_time", &self.close_time),
            ("exit_time", &self.exit_time),
        ])?;

        let gross_pnl = self
            .gross_pnl
            .or(self.total_pnl)
            .or(self.pnl)
            .unwrap_or(Decimal::ZERO);

        // 분리된 진입/청산 수수료는 합계 필드가 없을 때만 사용
        let split_fee = match (self.total_entry_fee, self.total_exit_fee) {
            (Some(entry), Some(exit)) => Some(entry + exit),
            _ => None,
        };
        let fee = self
            .fee
            .or(self.total_fee)
            .or(self.fees)
            .or(split_fee)
            .unwrap_or(Decimal::ZERO);

        Ok(TradeRecord {
            id,
            opened_at,
            closed_at,
            gross_pnl,
            fee,
            net_pnl: self.net_pnl,
            max_loss: self.max_loss,
            close_reason: self
                .close_reason
                .as_deref()
                .map(CloseReason::parse_lenient)
                .unwrap_or_default(),
            mae: self.mae,
            mfe: self.mfe,
        })
    }
}

/// 원본 기록 목록을 정규화합니다.
///
/// 해석할 수 없는 기록은 경고를 남기고 건너뜁니다.
pub fn normalize_records(raws: &[RawTradeRecord]) -> Vec<TradeRecord> {
    let records: Vec<TradeRecord> = raws
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| match raw.normalize() {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed trade record");
                None
            }
        })
        .collect();

    debug!(
        received = raws.len(),
        normalized = records.len(),
        "Normalized trade records"
    );

    records
}

/// JSON 문자열에서 거래 기록을 읽습니다.
///
/// 최상위 배열, 또는 `trades` / `data` / `items` 배열을 가진 객체를 받습니다.
/// 필드 타입이 맞지 않는 기록은 경고를 남기고 건너뜁니다.
pub fn parse_records(json: &str) -> PairStatsResult<Vec<TradeRecord>> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => ["trades", "data", "items"]
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(serde_json::Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| {
                PairStatsError::InvalidInput(
                    "거래 목록 배열(trades/data/items)을 찾을 수 없습니다".to_string(),
                )
            })?,
        _ => {
            return Err(PairStatsError::InvalidInput(
                "거래 목록은 배열 또는 객체여야 합니다".to_string(),
            ))
        }
    };

    let raws: Vec<RawTradeRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!(index, error = %e, "Skipping undecodable trade record");
                None
            }
        })
        .collect();

    Ok(normalize_records(&raws))
}
