pub mod market_service;
