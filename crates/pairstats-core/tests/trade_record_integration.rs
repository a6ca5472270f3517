//! 거래 기록 정규화 통합 테스트
//!
//! 백엔드 내보내기 형식(여러 세대의 필드 이름)을 읽어 `TradeRecord`로 바꾸는 흐름을 검증합니다.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use pairstats_core::{
    normalize_records, parse_date_string, parse_records, r_multiple, CloseReason, PairStatsError,
    RawId, RawTradeRecord,
};

#[test]
fn test_mixed_generation_export() {
    let json = r#"[
        {"id": "new", "opened_at": "2024-05-01T00:00:00Z", "closed_at": "2024-05-01T06:00:00Z",
         "gross_pnl": "42.5", "fee": "2.5", "net_pnl": "39", "close_reason": "stop_loss"},
        {"_id": "legacy", "created_at": "2024-05-02 08:00:00", "close_time": 1714651200000,
         "total_pnl": -12, "total_fee": 0.5, "mae": 2.5, "mfe": "4"},
        {"trade_id": "bare"},
        {"_id": 1001, "opened_at": "2024-05-03T00:00:00Z", "gross_pnl": {"amount": 1}}
    ]"#;

    let records = parse_records(json).unwrap();
    assert_eq!(records.len(), 3);

    let new = &records[0];
    assert_eq!(new.id, "new");
    assert_eq!(new.effective_net_pnl(), dec!(39));
    assert_eq!(new.close_reason, CloseReason::StopLoss);

    let legacy = &records[1];
    assert_eq!(legacy.id, "legacy");
    assert_eq!(
        legacy.opened_at,
        Some(Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap())
    );
    assert_eq!(
        legacy.closed_at,
        Some(Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap())
    );
    assert_eq!(legacy.effective_net_pnl(), dec!(-12.5));
    assert_eq!(legacy.mae, Some(dec!(2.5)));
    assert_eq!(legacy.mfe, Some(dec!(4)));
    assert_eq!(legacy.close_reason, CloseReason::Unknown);

    let bare = &records[2];
    assert_eq!(bare.id, "bare");
    assert!(!bare.is_valid());
    assert!(!bare.is_closed());
    assert_eq!(bare.gross_pnl, Decimal::ZERO);
}

#[test]
fn test_one_bad_record_does_not_drop_batch() {
    let json = r#"{"trades": [
        {"id": "ok", "opened_at": "2024-05-01T00:00:00Z", "closed_at": "2024-05-01T01:00:00Z", "gross_pnl": 5},
        {"id": 42, "opened_at": "2024-05-01T00:00:00Z", "closed_at": "2024-05-01T02:00:00Z", "max_loss": "n/a"},
        {"id": 43, "opened_at": "2024-05-01T00:00:00Z", "closed_at": "2024-05-01T03:00:00Z", "gross_pnl": -2}
    ]}"#;

    let records = parse_records(json).unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["ok", "43"]);
}

#[test]
fn test_primary_field_wins_over_alias() {
    let json = r#"{"id": "x", "gross_pnl": 10, "total_pnl": 99, "fee": 1, "total_fee": 50}"#;
    let raw: RawTradeRecord = serde_json::from_str(json).unwrap();
    let record = raw.normalize().unwrap();

    assert_eq!(record.gross_pnl, dec!(10));
    assert_eq!(record.fee, dec!(1));
}

#[test]
fn test_malformed_records_are_skipped() {
    let raws = vec![
        RawTradeRecord {
            id: Some(RawId::Text("ok".to_string())),
            ..Default::default()
        },
        serde_json::from_str(r#"{"id": "bad", "opened_at": "31/12/2024"}"#).unwrap(),
    ];

    let records = normalize_records(&raws);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "ok");
}

#[test]
fn test_invalid_json_is_serialization_error() {
    assert!(matches!(
        parse_records("{not json"),
        Err(PairStatsError::Serialization(_))
    ));
    assert!(matches!(
        parse_records(r#"{"rows": []}"#),
        Err(PairStatsError::InvalidInput(_))
    ));
}

#[test]
fn test_parse_date_string_url_encoded() {
    let parsed = parse_date_string("2024-05-01T08%3A00%3A00%2B08%3A00", &Utc).unwrap();
    assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
}

proptest! {
    #[test]
    fn r_multiple_sign_follows_pnl(pnl in -100_000i64..100_000, risk in -5_000i64..5_000) {
        let pnl = Decimal::new(pnl, 2);
        let risk = Decimal::new(risk, 2);
        let r = r_multiple(pnl, risk);

        if risk.is_zero() {
            prop_assert_eq!(r, Decimal::ZERO);
        } else {
            prop_assert_eq!(r < Decimal::ZERO, pnl < Decimal::ZERO);
            prop_assert_eq!(r, r_multiple(pnl, -risk));
        }
    }

    #[test]
    fn r_multiple_is_total_for_extreme_magnitudes(
        pnl in any::<i64>(),
        pnl_scale in 0u32..=10,
        risk in 1i64..1_000,
        risk_scale in 0u32..=28,
    ) {
        let pnl = Decimal::new(pnl, pnl_scale);
        let risk = Decimal::new(risk, risk_scale);
        let r = r_multiple(pnl, risk);

        if pnl > Decimal::ZERO {
            prop_assert!(r >= Decimal::ZERO);
        } else if pnl < Decimal::ZERO {
            prop_assert!(r <= Decimal::ZERO);
        }
    }
}
