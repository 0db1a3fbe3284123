pub mod exchanger;

pub use exchanger::{AuthorizationExchanger, ExchangeOutcome};
