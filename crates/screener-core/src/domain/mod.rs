//! 스크리닝을 위한 도메인 모델.

mod filter;
mod quote;
mod screening;

pub use filter::*;
pub use quote::*;
pub use screening::*;
