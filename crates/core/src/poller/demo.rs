//! Static demonstration quotes shown when the gateway cannot serve live data.

use serde_json::{json, Map, Value};

/// (instrument key, last price, net change, open, high, low, close)
const DEMO_QUOTES: &[(&str, f64, f64, f64, f64, f64, f64)] = &[
    ("NSE_INDEX|Nifty 50", 22_147.0, 94.15, 22_080.5, 22_190.2, 22_045.8, 22_052.85),
    ("NSE_INDEX|Nifty Bank", 47_286.9, -112.4, 47_420.0, 47_512.3, 47_180.6, 47_399.3),
    ("BSE_INDEX|SENSEX", 72_996.3, 282.8, 72_760.1, 73_120.4, 72_640.0, 72_713.5),
    ("NSE_EQ|INE002A01018", 2_500.5, 12.3, 2_488.0, 2_512.9, 2_480.1, 2_488.2),
    ("NSE_EQ|INE467B01029", 3_912.75, -18.6, 3_935.0, 3_941.2, 3_905.4, 3_931.35),
    ("NSE_EQ|INE040A01034", 1_448.1, 6.85, 1_440.0, 1_452.6, 1_436.2, 1_441.25),
    ("NSE_EQ|INE009A01021", 1_487.4, -9.1, 1_498.0, 1_501.75, 1_482.3, 1_496.5),
    ("NSE_EQ|INE090A01021", 1_083.55, 4.2, 1_079.0, 1_088.4, 1_075.6, 1_079.35),
    ("NSE_EQ|INE397D01024", 1_216.3, 15.05, 1_203.0, 1_220.0, 1_199.5, 1_201.25),
    ("NSE_EQ|INE154A01025", 429.85, -1.35, 431.5, 433.0, 428.2, 431.2),
    ("NSE_EQ|INE062A01020", 758.6, 3.9, 755.0, 761.4, 752.8, 754.7),
];

/// Demonstration quotes for `instrument_keys`, shaped like a provider quotes
/// response. Keys without demo data are left out.
pub fn demo_quotes(instrument_keys: &[String]) -> Value {
    let mut data = Map::new();
    for (key, last, change, open, high, low, close) in DEMO_QUOTES {
        if instrument_keys.iter().any(|k| k == key) {
            data.insert(
                (*key).to_string(),
                json!({
                    "instrument_token": key,
                    "last_price": last,
                    "net_change": change,
                    "ohlc": {"open": open, "high": high, "low": low, "close": close},
                }),
            );
        }
    }
    json!({"status": "success", "data": data})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_requested_keys_are_included() {
        let quotes = demo_quotes(&[
            "NSE_EQ|INE002A01018".to_string(),
            "NSE_FO|99999".to_string(),
        ]);
        let data = quotes["data"].as_object().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data["NSE_EQ|INE002A01018"]["last_price"], 2500.5);
    }

    #[test]
    fn every_mapped_instrument_has_demo_data() {
        let keys: Vec<String> = crate::upstox::instruments::INSTRUMENTS
            .iter()
            .map(|(_, key)| key.to_string())
            .collect();
        let quotes = demo_quotes(&keys);
        assert_eq!(quotes["data"].as_object().unwrap().len(), keys.len());
    }
}
