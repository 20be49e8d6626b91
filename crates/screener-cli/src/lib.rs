//! 스크리너 CLI 도구.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 필터 파라미터 입력 및 스크리닝 실행
//! - 결과 테이블/CSV/JSON 출력
//! - 유니버스 조회
//! - 시장별 기술적 분석 순위표
//! - 실행 통계

pub mod commands;
pub mod stats;

pub use stats::ScreenStats;
