//! 페어 트레이드 거래 기록.
//!
//! 백엔드에서 받은 거래 기록을 정규화한 형태입니다. 통계 엔진은 이 타입만 읽으며
//! 절대 수정하지 않습니다.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::calculations::{net_pnl, r_multiple};

/// 청산 사유.
///
/// 화면 표시용이며 수치 계산에는 사용되지 않습니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// 익절
    TakeProfit,
    /// 손절
    StopLoss,
    /// 트레일링 스탑
    TrailingStop,
    /// 수동 청산
    Manual,
    /// 알 수 없음
    #[default]
    Unknown,
}

impl CloseReason {
    /// 모든 청산 사유 (표시 순서).
    pub const ALL: [CloseReason; 5] = [
        CloseReason::TakeProfit,
        CloseReason::StopLoss,
        CloseReason::TrailingStop,
        CloseReason::Manual,
        CloseReason::Unknown,
    ];

    /// 자유 형식 문자열을 청산 사유로 해석합니다.
    ///
    /// 대소문자, 공백, 하이픈 차이는 무시하며 알 수 없는 값은 `Unknown`입니다.
    pub fn parse_lenient(s: &str) -> Self {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();

        match key.as_str() {
            "take_profit" | "tp" | "takeprofit" => CloseReason::TakeProfit,
            "stop_loss" | "sl" | "stoploss" => CloseReason::StopLoss,
            "trailing_stop" | "trailing" | "trailingstop" => CloseReason::TrailingStop,
            "manual" | "manual_close" => CloseReason::Manual,
            _ => CloseReason::Unknown,
        }
    }

    /// 표시 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            CloseReason::TakeProfit => "take_profit",
            CloseReason::StopLoss => "stop_loss",
            CloseReason::TrailingStop => "trailing_stop",
            CloseReason::Manual => "manual",
            CloseReason::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 정규화된 거래 기록.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// 고유 식별자
    pub id: String,

    /// 진입 시각 (없으면 잘못된 기록으로 간주)
    pub opened_at: Option<DateTime<Utc>>,

    /// 청산 시각 (없으면 미청산 거래)
    pub closed_at: Option<DateTime<Utc>>,

    /// 총손익 (수수료 차감 전, 부호 있음)
    pub gross_pnl: Decimal,

    /// 총 수수료 (진입 + 청산)
    pub fee: Decimal,

    /// 미리 계산된 순손익 (없으면 `gross_pnl - fee`)
    #[serde(default)]
    pub net_pnl: Option<Decimal>,

    /// 1R 금액 (계획된 최대 손실). 0 또는 없음 = R 정규화 안 함
    #[serde(default)]
    pub max_loss: Option<Decimal>,

    /// 청산 사유
    #[serde(default)]
    pub close_reason: CloseReason,

    /// 최대 불리 변동 (MAE, 진입 비율 대비 %)
    #[serde(default)]
    pub mae: Option<Decimal>,

    /// 최대 유리 변동 (MFE, 진입 비율 대비 %)
    #[serde(default)]
    pub mfe: Option<Decimal>,
}

impl TradeRecord {
    /// 청산된 거래 기록을 생성합니다.
    pub fn closed(
        id: impl Into<String>,
        opened_at: DateTime<Utc>,
        closed_at: DateTime<Utc>,
        gross_pnl: Decimal,
        fee: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            opened_at: Some(opened_at),
            closed_at: Some(closed_at),
            gross_pnl,
            fee,
            net_pnl: None,
            max_loss: None,
            close_reason: CloseReason::Unknown,
            mae: None,
            mfe: None,
        }
    }

    /// 미청산 거래 기록을 생성합니다.
    pub fn open(id: impl Into<String>, opened_at: DateTime<Utc>, gross_pnl: Decimal) -> Self {
        Self {
            closed_at: None,
            ..Self::closed(id, opened_at, opened_at, gross_pnl, Decimal::ZERO)
        }
    }

    /// 1R 금액을 설정합니다.
    pub fn with_max_loss(mut self, max_loss: Decimal) -> Self {
        self.max_loss = Some(max_loss);
        self
    }

    /// 미리 계산된 순손익을 설정합니다.
    pub fn with_net_pnl(mut self, net_pnl: Decimal) -> Self {
        self.net_pnl = Some(net_pnl);
        self
    }

    /// 최대 불리/유리 변동을 설정합니다.
    pub fn with_excursions(mut self, mae: Decimal, mfe: Decimal) -> Self {
        self.mae = Some(mae);
        self.mfe = Some(mfe);
        self
    }

    /// 청산 사유를 설정합니다.
    pub fn with_close_reason(mut self, reason: CloseReason) -> Self {
        self.close_reason = reason;
        self
    }

    /// 청산된 거래인지 확인합니다.
    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// 통계에 사용할 수 있는 기록인지 확인합니다.
    ///
    /// 진입 시각이 없는 기록은 잘못된 기록입니다.
    pub fn is_valid(&self) -> bool {
        self.opened_at.is_some()
    }

    /// 순손익 (`net_pnl`이 없으면 `gross_pnl - fee`).
    pub fn effective_net_pnl(&self) -> Decimal {
        self.net_pnl
            .unwrap_or_else(|| net_pnl(self.gross_pnl, self.fee))
    }

    /// 수수료 포함 여부에 따른 손익.
    pub fn pnl(&self, include_fees: bool) -> Decimal {
        if include_fees {
            self.effective_net_pnl()
        } else {
            self.gross_pnl
        }
    }

    /// 1R 금액 (없으면 0).
    pub fn risk_unit(&self) -> Decimal {
        self.max_loss.unwrap_or(Decimal::ZERO)
    }

    /// 수수료 포함 여부에 따른 R 배수.
    pub fn r_multiple(&self, include_fees: bool) -> Decimal {
        r_multiple(self.pnl(include_fees), self.risk_unit())
    }

    /// 정렬 기준 시각.
    ///
    /// 청산 시각을 사용하고, 없으면 진입 시각으로 대체합니다.
    pub fn effective_close_time(&self) -> Option<DateTime<Utc>> {
        self.closed_at.or(self.opened_at)
    }

    /// 보유 기간.
    pub fn holding_duration(&self) -> Option<Duration> {
        match (self.opened_at, self.closed_at) {
            (Some(open), Some(close)) => Some(close.signed_duration_since(open)),
            _ => None,
        }
    }
}
