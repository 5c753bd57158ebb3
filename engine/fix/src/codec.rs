//! FIX tag-value encoding and tolerant decoding
//!
//! Standard framing: `8=FIX.4.4|9=<len>|35=...|...|10=<cksum>` with SOH
//! (0x01) delimiters. Inbound parsing is a tolerant reader: unknown tags
//! are skipped, malformed fields dropped, and a report is produced as long
//! as the identifying fields are present.

use crate::messages::{ExecReport, ExecType, FixOrder, OrdStatus, OrdType};
use chrono::Utc;
use engine_common::{FixConfig, Px, Qty, Side, Ts};

/// Field delimiter
pub const SOH: u8 = 0x01;

/// Protocol version rendered into tag 8
pub const BEGIN_STRING: &str = "FIX.4.4";

/// Message type constants (tag 35)
pub mod msg_type {
    /// Heartbeat
    pub const HEARTBEAT: &str = "0";
    /// Logon
    pub const LOGON: &str = "A";
    /// Logout
    pub const LOGOUT: &str = "5";
    /// NewOrderSingle
    pub const NEW_ORDER_SINGLE: &str = "D";
    /// ExecutionReport
    pub const EXECUTION_REPORT: &str = "8";
}

/// Modulo-256 checksum over every byte up to (not including) tag 10
#[must_use]
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

fn sending_time() -> String {
    Utc::now().format("%Y%m%d-%H:%M:%S%.3f").to_string()
}

/// Encode a complete FIX message with standard header and trailer.
///
/// `body` carries the message-specific fields appended after the header
/// (35, 49, 56, 34, 52).
#[must_use]
pub fn encode_message(
    msg_type: &str,
    config: &FixConfig,
    seq: u64,
    body: &[(u32, String)],
) -> Vec<u8> {
    let mut inner = Vec::with_capacity(128);
    push_field(&mut inner, 35, msg_type);
    push_field(&mut inner, 49, &config.sender_comp_id);
    push_field(&mut inner, 56, &config.target_comp_id);
    push_field(&mut inner, 34, &seq.to_string());
    push_field(&mut inner, 52, &sending_time());
    for (tag, value) in body {
        push_field(&mut inner, *tag, value);
    }

    let mut msg = Vec::with_capacity(inner.len() + 32);
    push_field(&mut msg, 8, BEGIN_STRING);
    push_field(&mut msg, 9, &inner.len().to_string());
    msg.extend_from_slice(&inner);

    let cksum = checksum(&msg);
    push_field(&mut msg, 10, &format!("{cksum:03}"));
    msg
}

fn push_field(buf: &mut Vec<u8>, tag: u32, value: &str) {
    buf.extend_from_slice(tag.to_string().as_bytes());
    buf.push(b'=');
    buf.extend_from_slice(value.as_bytes());
    buf.push(SOH);
}

/// Encode a Logon (35=A) with reset-free defaults
#[must_use]
pub fn encode_logon(config: &FixConfig, seq: u64) -> Vec<u8> {
    let hb_secs = config.heartbeat_interval.as_secs();
    encode_message(
        msg_type::LOGON,
        config,
        seq,
        &[(98, "0".to_string()), (108, hb_secs.to_string())],
    )
}

/// Encode a Logout (35=5)
#[must_use]
pub fn encode_logout(config: &FixConfig, seq: u64) -> Vec<u8> {
    encode_message(msg_type::LOGOUT, config, seq, &[])
}

/// Encode a Heartbeat (35=0)
#[must_use]
pub fn encode_heartbeat(config: &FixConfig, seq: u64) -> Vec<u8> {
    encode_message(msg_type::HEARTBEAT, config, seq, &[])
}

/// Encode a NewOrderSingle (35=D) from an order request
#[must_use]
pub fn encode_new_order_single(config: &FixConfig, seq: u64, order: &FixOrder) -> Vec<u8> {
    let mut body = vec![
        (11, order.cl_ord_id.clone()),
        (55, order.symbol.clone()),
        (54, order.side.fix_code().to_string()),
        (40, order.ord_type.fix_code().to_string()),
        (38, format_decimal(order.quantity.as_f64())),
        (60, sending_time()),
    ];
    if matches!(order.ord_type, OrdType::Limit) {
        body.push((44, format_decimal(order.price.as_f64())));
    }
    encode_message(msg_type::NEW_ORDER_SINGLE, config, seq, &body)
}

// Trailing-zero-free decimal rendering for price/qty tags.
fn format_decimal(value: f64) -> String {
    let s = format!("{value:.4}");
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

/// Split a raw message into (tag, value) pairs, skipping malformed fields
#[must_use]
pub fn parse_fields(raw: &[u8]) -> Vec<(u32, String)> {
    raw.split(|b| *b == SOH)
        .filter(|f| !f.is_empty())
        .filter_map(|f| {
            let text = std::str::from_utf8(f).ok()?;
            let (tag, value) = text.split_once('=')?;
            Some((tag.parse::<u32>().ok()?, value.to_string()))
        })
        .collect()
}

/// First value for `tag`, if present
#[must_use]
pub fn field<'a>(fields: &'a [(u32, String)], tag: u32) -> Option<&'a str> {
    fields
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, v)| v.as_str())
}

/// Verify the tag-10 trailer against the message bytes preceding it
#[must_use]
pub fn verify_checksum(raw: &[u8]) -> bool {
    // "10=NNN<SOH>" is always the last 7 bytes of a well-formed message
    if raw.len() < 7 {
        return false;
    }
    let (head, trailer) = raw.split_at(raw.len() - 7);
    let Ok(trailer) = std::str::from_utf8(trailer) else {
        return false;
    };
    let Some(value) = trailer.strip_prefix("10=") else {
        return false;
    };
    let Ok(expected) = value.trim_end_matches('\x01').parse::<u8>() else {
        return false;
    };
    checksum(head) == expected
}

/// Decode an ExecutionReport (35=8) from raw bytes.
///
/// Tolerant reader: returns `None` only when the message is not an
/// execution report or the identifying fields are absent; all numeric
/// fields default to zero when missing or unparsable.
#[must_use]
pub fn decode_exec_report(raw: &[u8]) -> Option<ExecReport> {
    let fields = parse_fields(raw);
    if field(&fields, 35)? != msg_type::EXECUTION_REPORT {
        return None;
    }

    let order_id = field(&fields, 37)?.to_string();
    let exec_id = field(&fields, 17)?.to_string();
    let symbol = field(&fields, 55).unwrap_or_default().to_string();

    let side = match field(&fields, 54) {
        Some("2") => Side::Sell,
        _ => Side::Buy,
    };
    let exec_type = field(&fields, 150)
        .and_then(|v| v.chars().next())
        .and_then(ExecType::from_fix_code)
        .unwrap_or(ExecType::New);
    let ord_status = field(&fields, 39)
        .and_then(|v| v.chars().next())
        .and_then(OrdStatus::from_fix_code)
        .unwrap_or(OrdStatus::New);

    Some(ExecReport {
        order_id,
        exec_id,
        exec_type,
        ord_status,
        symbol,
        side,
        leaves_qty: qty_field(&fields, 151),
        cum_qty: qty_field(&fields, 14),
        avg_px: px_field(&fields, 6),
        last_px: px_field(&fields, 31),
        last_qty: qty_field(&fields, 32),
        text: field(&fields, 58).unwrap_or_default().to_string(),
        transact_time: Ts::now(),
    })
}

fn qty_field(fields: &[(u32, String)], tag: u32) -> Qty {
    field(fields, tag)
        .and_then(|v| v.parse::<f64>().ok())
        .map_or(Qty::ZERO, Qty::new)
}

fn px_field(fields: &[(u32, String)], tag: u32) -> Px {
    field(fields, tag)
        .and_then(|v| v.parse::<f64>().ok())
        .map_or(Px::ZERO, Px::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> FixConfig {
        FixConfig {
            sender_comp_id: "CLIENT".to_string(),
            target_comp_id: "BROKER".to_string(),
            host: "127.0.0.1".to_string(),
            port: 9876,
            heartbeat_interval: Duration::from_secs(30),
        }
    }

    fn as_text(raw: &[u8]) -> String {
        String::from_utf8(raw.to_vec()).unwrap().replace('\x01', "|")
    }

    #[test]
    fn test_logon_framing() {
        let raw = encode_logon(&config(), 1);
        let text = as_text(&raw);
        assert!(text.starts_with("8=FIX.4.4|9="));
        assert!(text.contains("|35=A|"));
        assert!(text.contains("|49=CLIENT|"));
        assert!(text.contains("|56=BROKER|"));
        assert!(text.contains("|34=1|"));
        assert!(text.contains("|108=30|"));
        assert!(verify_checksum(&raw));
    }

    #[test]
    fn test_body_length_is_exact() {
        let raw = encode_heartbeat(&config(), 7);
        let fields = parse_fields(&raw);
        let declared: usize = field(&fields, 9).unwrap().parse().unwrap();

        // Body spans from after "9=<len><SOH>" to before "10="
        let text = raw.clone();
        let body_start = {
            let mut sohs = 0;
            let mut idx = 0;
            for (i, b) in text.iter().enumerate() {
                if *b == SOH {
                    sohs += 1;
                    if sohs == 2 {
                        idx = i + 1;
                        break;
                    }
                }
            }
            idx
        };
        let body_end = text.len() - 7; // "10=NNN<SOH>"
        assert_eq!(declared, body_end - body_start);
    }

    #[test]
    fn test_new_order_single_fields() {
        let order = FixOrder {
            cl_ord_id: "ORD-1".to_string(),
            symbol: "AAPL".to_string(),
            side: Side::Buy,
            ord_type: OrdType::Limit,
            quantity: Qty::from_units(10),
            price: Px::new(101.25),
        };
        let raw = encode_new_order_single(&config(), 3, &order);
        let text = as_text(&raw);
        assert!(text.contains("|35=D|"));
        assert!(text.contains("|11=ORD-1|"));
        assert!(text.contains("|55=AAPL|"));
        assert!(text.contains("|54=1|"));
        assert!(text.contains("|40=2|"));
        assert!(text.contains("|38=10|"));
        assert!(text.contains("|44=101.25|"));
        assert!(verify_checksum(&raw));
    }

    #[test]
    fn test_market_order_has_no_price() {
        let order = FixOrder {
            cl_ord_id: "ORD-2".to_string(),
            symbol: "MSFT".to_string(),
            side: Side::Sell,
            ord_type: OrdType::Market,
            quantity: Qty::from_units(5),
            price: Px::ZERO,
        };
        let raw = encode_new_order_single(&config(), 4, &order);
        assert!(!as_text(&raw).contains("|44="));
    }

    #[test]
    fn test_exec_report_roundtrip() {
        let raw = encode_message(
            msg_type::EXECUTION_REPORT,
            &config(),
            9,
            &[
                (37, "ORD-9".to_string()),
                (17, "EXE-9".to_string()),
                (150, "2".to_string()),
                (39, "2".to_string()),
                (55, "AAPL".to_string()),
                (54, "1".to_string()),
                (151, "0".to_string()),
                (14, "10".to_string()),
                (6, "101.25".to_string()),
                (31, "101.25".to_string()),
                (32, "10".to_string()),
                (58, "fill".to_string()),
            ],
        );

        let report = decode_exec_report(&raw).unwrap();
        assert_eq!(report.order_id, "ORD-9");
        assert_eq!(report.exec_id, "EXE-9");
        assert_eq!(report.ord_status, OrdStatus::Filled);
        assert_eq!(report.cum_qty, Qty::from_units(10));
        assert_eq!(report.leaves_qty, Qty::ZERO);
        assert_eq!(report.avg_px, Px::new(101.25));
        assert_eq!(report.text, "fill");
    }

    #[test]
    fn test_decode_tolerates_garbage() {
        assert!(decode_exec_report(b"not fix at all").is_none());
        assert!(decode_exec_report(b"").is_none());

        // Heartbeat is not an exec report
        let hb = encode_heartbeat(&config(), 1);
        assert!(decode_exec_report(&hb).is_none());

        // Exec report with junk numerics still decodes, zeroed
        let raw = encode_message(
            msg_type::EXECUTION_REPORT,
            &config(),
            2,
            &[
                (37, "O".to_string()),
                (17, "E".to_string()),
                (14, "junk".to_string()),
            ],
        );
        let report = decode_exec_report(&raw).unwrap();
        assert_eq!(report.cum_qty, Qty::ZERO);
    }

    #[rstest::rstest]
    #[case(100.0, "100")]
    #[case(101.25, "101.25")]
    #[case(0.5, "0.5")]
    #[case(187.5, "187.5")]
    #[case(0.0001, "0.0001")]
    fn test_decimal_rendering_trims_zeros(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_decimal(value), expected);
    }

    #[test]
    fn test_checksum_detects_corruption() {
        let mut raw = encode_logon(&config(), 1);
        assert!(verify_checksum(&raw));
        let mid = raw.len() / 2;
        raw[mid] = raw[mid].wrapping_add(1);
        assert!(!verify_checksum(&raw));
    }
}
