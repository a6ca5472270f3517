//! 통계 엔진 주변부의 에러 타입.
//!
//! 통계 계산 자체는 모든 입력에 대해 정의되어 있어 에러 경로가 없습니다.
//! 에러는 입력 파싱, 날짜 해석, 설정 로드 단계에서만 발생합니다.

use thiserror::Error;

/// 공통 에러.
#[derive(Debug, Error)]
pub enum PairStatsError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 날짜 해석 실패
    #[error("날짜 해석 실패: {0}")]
    InvalidDate(String),
}

/// 공통 Result 타입.
pub type PairStatsResult<T> = Result<T, PairStatsError>;

impl PairStatsError {
    /// 사용자 입력 문제로 인한 에러인지 확인합니다.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            PairStatsError::InvalidInput(_) | PairStatsError::InvalidDate(_)
        )
    }
}

impl From<serde_json::Error> for PairStatsError {
    fn from(err: serde_json::Error) -> Self {
        PairStatsError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for PairStatsError {
    fn from(err: config::ConfigError) -> Self {
        PairStatsError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error() {
        let err = PairStatsError::InvalidDate("2024-13-01".to_string());
        assert!(err.is_user_error());

        let err = PairStatsError::Config("missing file".to_string());
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_from_serde_json() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: PairStatsError = err.into();
        assert!(matches!(err, PairStatsError::Serialization(_)));
    }
}
