//! Ticker → Upstox instrument key lookup for the dashboard's watchlist.
//!
//! Instrument keys have the form `<SEGMENT>|<ISIN or index name>`. Symbols that
//! are not in the table pass through unchanged, so callers can also send raw
//! instrument keys.

use std::collections::{BTreeMap, HashMap};

use lazy_static::lazy_static;

/// Indices first, then NSE equities.
pub const INSTRUMENTS: &[(&str, &str)] = &[
    ("NIFTY50", "NSE_INDEX|Nifty 50"),
    ("BANKNIFTY", "NSE_INDEX|Nifty Bank"),
    ("SENSEX", "BSE_INDEX|SENSEX"),
    ("RELIANCE", "NSE_EQ|INE002A01018"),
    ("TCS", "NSE_EQ|INE467B01029"),
    ("HDFCBANK", "NSE_EQ|INE040A01034"),
    ("INFY", "NSE_EQ|INE009A01021"),
    ("ICICIBANK", "NSE_EQ|INE090A01021"),
    ("BHARTIARTL", "NSE_EQ|INE397D01024"),
    ("ITC", "NSE_EQ|INE154A01025"),
    ("SBIN", "NSE_EQ|INE062A01020"),
];

lazy_static! {
    static ref BY_TICKER: HashMap<&'static str, &'static str> =
        INSTRUMENTS.iter().copied().collect();
}

/// The instrument key for `symbol`, or `symbol` itself when unknown.
pub fn instrument_key(symbol: &str) -> &str {
    BY_TICKER.get(symbol).copied().unwrap_or(symbol)
}

pub fn instrument_keys<S: AsRef<str>>(symbols: &[S]) -> Vec<String> {
    symbols
        .iter()
        .map(|s| instrument_key(s.as_ref()).to_string())
        .collect()
}

/// The full table, ordered by ticker.
pub fn instrument_table() -> BTreeMap<&'static str, &'static str> {
    INSTRUMENTS.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tickers_map_to_keys() {
        assert_eq!(instrument_key("RELIANCE"), "NSE_EQ|INE002A01018");
        assert_eq!(instrument_key("NIFTY50"), "NSE_INDEX|Nifty 50");
        assert_eq!(instrument_key("SENSEX"), "BSE_INDEX|SENSEX");
    }

    #[test]
    fn unknown_symbols_pass_through() {
        assert_eq!(instrument_key("NSE_FO|12345"), "NSE_FO|12345");
        assert_eq!(instrument_key("reliance"), "reliance");
        assert_eq!(
            instrument_keys(&["TCS", "WIPRO"]),
            vec!["NSE_EQ|INE467B01029".to_string(), "WIPRO".to_string()]
        );
    }

    #[test]
    fn table_holds_every_entry() {
        assert_eq!(instrument_table().len(), INSTRUMENTS.len());
    }
}
