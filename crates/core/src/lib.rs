pub mod models;
pub mod num;
pub mod series;
pub mod traits;

pub use models::*;
pub use num::Num;
pub use series::{Ohlc, PriceSeries};
pub use traits::*;
