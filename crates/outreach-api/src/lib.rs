pub mod dispatch;
pub mod export;
pub mod promo;
pub mod state;
