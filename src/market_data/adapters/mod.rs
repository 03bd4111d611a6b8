pub mod alternative_me;
pub mod coinmarketcap;
pub mod finnhub;
