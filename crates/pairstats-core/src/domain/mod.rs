//! 거래 통계를 위한 도메인 모델.

mod calculations;
mod normalize;
mod ratio;
mod trade;

pub use calculations::*;
pub use normalize::*;
pub use ratio::*;
pub use trade::*;
