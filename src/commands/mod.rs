pub mod price;
pub mod resolve;
pub mod serve;
