//! CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 거래 기록 JSON 로드 및 정규화
//! - 통계 / 누적 손익 곡선 / 기간별 통계 리포트
//! - 표 또는 JSON 출력

pub mod commands;

pub use commands::{build_options, load_trades, resolve_window, FilterArgs, OutputFormat};
