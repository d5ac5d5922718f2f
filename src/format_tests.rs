#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;

// ── truncate ──────────────────────────────────────────────────

#[test]
fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
}

#[test]
fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
}

#[test]
fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 5), "hell…");
}

#[test]
fn test_truncate_zero_max() {
    assert_eq!(truncate("hello", 0), "");
}

#[test]
fn test_truncate_unicode() {
    assert_eq!(truncate("café résumé", 5), "café…");
}

// ── format_money ──────────────────────────────────────────────

#[test]
fn test_format_money_thousands() {
    assert_eq!(format_money(dec!(1234567.89), "$"), "$1,234,567.89");
}

#[test]
fn test_format_money_small() {
    assert_eq!(format_money(dec!(5), "$"), "$5.00");
    assert_eq!(format_money(dec!(0), "$"), "$0.00");
}

#[test]
fn test_format_money_negative() {
    assert_eq!(format_money(dec!(-1500.5), "$"), "-$1,500.50");
}

#[test]
fn test_format_money_rounds_half_away() {
    assert_eq!(format_money(dec!(433.333333), "$"), "$433.33");
    assert_eq!(format_money(dec!(0.125), "$"), "$0.13");
    assert_eq!(format_money(dec!(-0.125), "$"), "-$0.13");
}

#[test]
fn test_format_money_other_symbol() {
    assert_eq!(format_money(dec!(1000), "€"), "€1,000.00");
    assert_eq!(format_money(dec!(12.3), ""), "12.30");
}

// ── progress_bar ──────────────────────────────────────────────

#[test]
fn test_progress_bar() {
    assert_eq!(progress_bar(0, 4), "░░░░");
    assert_eq!(progress_bar(50, 4), "██░░");
    assert_eq!(progress_bar(100, 4), "████");
    assert_eq!(progress_bar(250, 4), "████");
}
