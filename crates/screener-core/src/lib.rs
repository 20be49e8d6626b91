//! # Screener Core
//!
//! 주식 스크리너의 핵심 도메인 모델 및 스크리닝 엔진을 제공합니다.
//!
//! 이 크레이트는 스크리닝 파이프라인 전반에서 사용되는 기본 타입을 제공합니다:
//! - 티커 심볼 및 유니버스 소스 정의
//! - 종목별 재무 지표 스냅샷 (`RawQuote`)
//! - 필터 설정 및 스크리닝 엔진
//! - 기술적 지표 점수와 종합 순위
//! - 설정 관리
//! - 로깅 인프라

pub mod analysis;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use analysis::*;
pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
