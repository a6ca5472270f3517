//! 설정 관리.
//!
//! 설정 파일(TOML)과 `PAIRSTATS__` 접두사 환경 변수에서 설정을 읽습니다.
//! 모든 항목에 기본값이 있으므로 설정 파일 없이도 동작합니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PairStatsError, PairStatsResult};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 통계 계산 설정
    pub analytics: AnalyticsConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 통계 계산 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// 수수료 포함 여부 (true = 순손익 기준)
    pub include_fees: bool,
    /// 날짜 범위와 기간 집계에 사용할 IANA 시간대
    pub timezone: String,
    /// 범위를 지정하지 않았을 때 사용할 기본 범위 태그
    pub default_range: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            include_fees: true,
            timezone: "Asia/Taipei".to_string(),
            default_range: "all".to_string(),
        }
    }
}

impl AnalyticsConfig {
    /// 설정된 시간대를 해석합니다.
    pub fn tz(&self) -> PairStatsResult<chrono_tz::Tz> {
        self.timezone.parse::<chrono_tz::Tz>().map_err(|e| {
            PairStatsError::Config(format!("알 수 없는 시간대 '{}': {}", self.timezone, e))
        })
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// `path`가 `None`이거나 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load(path: Option<&Path>) -> PairStatsResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("PAIRSTATS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        // 시간대는 로드 시점에 검증
        app.analytics.tz()?;
        Ok(app)
    }

    /// 기본 경로(`config/default.toml`)에서 설정을 로드합니다.
    pub fn load_default() -> PairStatsResult<Self> {
        Self::load(Some(Path::new("config/default.toml")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert!(cfg.analytics.include_fees);
        assert_eq!(cfg.analytics.default_range, "all");
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.analytics.tz().unwrap(), chrono_tz::Asia::Taipei);
    }

    #[test]
    fn test_invalid_timezone() {
        let cfg = AnalyticsConfig {
            timezone: "Mars/Olympus".to_string(),
            ..Default::default()
        };
        assert!(matches!(cfg.tz(), Err(PairStatsError::Config(_))));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let cfg = AppConfig::load(Some(Path::new("does/not/exist.toml"))).unwrap();
        assert_eq!(cfg.analytics.timezone, "Asia/Taipei");
    }
}
