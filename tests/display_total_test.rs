#[cfg(test)]
mod tests {
    use mountescrow_fees::money::{format_amount, Currency, PLACEHOLDER};
    use mountescrow_fees::records::{
        display_total, display_total_json, format_total, Deal, DisplayTotal, Proposal, Transaction,
    };
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_missing_fee_counts_as_zero() {
        assert_eq!(display_total(dec!(1000), None), dec!(1000));
    }

    #[test]
    fn test_fee_added_to_principal() {
        assert_eq!(display_total(dec!(1000), Some(dec!(50))), dec!(1050));
    }

    #[test]
    fn test_json_values_numeric_or_string() {
        assert_eq!(display_total_json(&json!(1000), Some(&json!(50))), Some(dec!(1050)));
        assert_eq!(display_total_json(&json!("1000"), Some(&json!("50.5"))), Some(dec!(1050.5)));
        assert_eq!(display_total_json(&json!("1,000"), None), Some(dec!(1000)));
    }

    #[test]
    fn test_malformed_fee_shows_principal_alone() {
        assert_eq!(display_total_json(&json!(1000), Some(&json!("abc"))), Some(dec!(1000)));
        assert_eq!(display_total_json(&json!(1000), Some(&json!(null))), Some(dec!(1000)));
        assert_eq!(display_total_json(&json!(1000), Some(&json!([1, 2]))), Some(dec!(1000)));
    }

    #[test]
    fn test_malformed_principal_shows_placeholder() {
        let total = display_total_json(&json!("abc"), Some(&json!(50)));
        assert_eq!(total, None);
        assert_eq!(format_total(total, Currency::Ngn), PLACEHOLDER);
    }

    #[test]
    fn test_formatted_total() {
        let total = display_total_json(&json!(1234567.5), Some(&json!(61728.38)));
        assert_eq!(format_total(total, Currency::Ngn), "₦1,296,295.88");
        assert_eq!(format_amount(dec!(1050), Currency::Usd), "$1,050.00");
    }

    #[test]
    fn test_deal_display_total() {
        let deal: Deal = serde_json::from_value(json!({
            "id": "deal1",
            "totalAmount": "250000",
            "escrowFee": 25000
        }))
        .unwrap();
        assert_eq!(deal.display_total(), Some(dec!(275000)));
        assert_eq!(deal.formatted_total(Currency::Ngn), "₦275,000.00");
    }

    #[test]
    fn test_proposal_without_fee() {
        let proposal: Proposal = serde_json::from_value(json!({
            "id": "p1",
            "totalAmount": 1000
        }))
        .unwrap();
        assert_eq!(proposal.display_total(), Some(dec!(1000)));
    }

    #[test]
    fn test_transaction_without_amount_shows_placeholder() {
        let tx: Transaction = serde_json::from_value(json!({
            "id": "t1",
            "amount": "not available",
            "escrowFee": 10
        }))
        .unwrap();
        assert_eq!(tx.display_total(), None);
        assert_eq!(tx.formatted_total(Currency::Ngn), PLACEHOLDER);
    }
}
