//! # Pairstats Core
//!
//! 페어 트레이딩 대시보드 통계 엔진의 핵심 도메인 모델과 공통 인프라를 제공합니다.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 거래 기록 (`TradeRecord`) 및 청산 사유
//! - 레거시 필드 별칭을 정규화하는 입력 어댑터
//! - 손익/R 배수 공통 계산
//! - 무한대를 표현할 수 있는 비율 타입 (`Ratio`)
//! - 날짜 파싱 유틸리티
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod time;

pub use self::config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use time::*;
