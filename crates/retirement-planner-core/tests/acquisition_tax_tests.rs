use retirement_planner_core::acquisition_tax::{
    calculate_report, resolve, resolve_rates, AcquisitionClassification, AcquisitionInput,
    AcquisitionReport, AcquisitionReportInput, SubClassification,
};
use retirement_planner_core::PlannerError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use AcquisitionClassification::*;

const ALL_CLASSIFICATIONS: [AcquisitionClassification; 4] =
    [Inheritance, GiftOrFreeTransfer, OriginalConstruction, SaleOrExchange];

const ALL_SUBS: [SubClassification; 3] = [
    SubClassification::None,
    SubClassification::Land,
    SubClassification::NonLand,
];

// ===========================================================================
// Rate resolution
// ===========================================================================

#[test]
fn test_gift_special_rule_boundary() {
    let at = resolve_rates(GiftOrFreeTransfer, SubClassification::None, dec!(300_000_000), true);
    assert_eq!(at.acq, dec!(12.0));

    let below = resolve_rates(GiftOrFreeTransfer, SubClassification::None, dec!(299_999_999), true);
    assert_eq!(below.acq, dec!(3.5));
}

#[test]
fn test_special_rule_leaves_surtaxes_at_table_rates() {
    let on = resolve_rates(GiftOrFreeTransfer, SubClassification::None, dec!(500_000_000), true);
    let off = resolve_rates(GiftOrFreeTransfer, SubClassification::None, dec!(500_000_000), false);
    assert_eq!(on.rural, off.rural);
    assert_eq!(on.edu, off.edu);
    assert_eq!(on.edu, dec!(0.30));
}

#[test]
fn test_special_rule_has_no_effect_outside_gift() {
    for c in [Inheritance, OriginalConstruction, SaleOrExchange] {
        for s in ALL_SUBS {
            let on = resolve_rates(c, s, dec!(1_000_000_000), true);
            let off = resolve_rates(c, s, dec!(1_000_000_000), false);
            assert_eq!(on, off, "{c}/{s}");
        }
    }
}

#[test]
fn test_rates_independent_of_base_without_special_rule() {
    for c in ALL_CLASSIFICATIONS {
        for s in ALL_SUBS {
            let small = resolve_rates(c, s, dec!(1), false);
            let large = resolve_rates(c, s, dec!(900_000_000), false);
            assert_eq!(small, large, "{c}/{s}");
        }
    }
}

// ===========================================================================
// Amounts
// ===========================================================================

#[test]
fn test_amount_total_is_exact_sum_for_all_pairs() {
    let bases = [dec!(0), dec!(1), dec!(777), dec!(123_456_789), dec!(300_000_000)];
    for c in ALL_CLASSIFICATIONS {
        for s in ALL_SUBS {
            for base in bases {
                for special in [false, true] {
                    let d = resolve(&AcquisitionInput {
                        classification: c,
                        sub_classification: s,
                        taxable_base: base,
                        special_rule_enabled: special,
                    });
                    assert_eq!(d.amount_total, d.amount_acq + d.amount_rural + d.amount_edu);
                    assert_eq!(d.amount_acq.scale(), 0);
                }
            }
        }
    }
}

#[test]
fn test_gift_special_rule_amounts() {
    let d = resolve(&AcquisitionInput {
        classification: GiftOrFreeTransfer,
        sub_classification: SubClassification::None,
        taxable_base: dec!(300_000_000),
        special_rule_enabled: true,
    });
    assert_eq!(d.amount_acq, dec!(36_000_000));
    assert_eq!(d.amount_rural, Decimal::ZERO);
    assert_eq!(d.amount_edu, dec!(900_000));
    assert_eq!(d.amount_total, dec!(36_900_000));
}

#[test]
fn test_zero_base_yields_zero_amounts() {
    let d = resolve(&AcquisitionInput::default());
    assert_eq!(d.amount_total, Decimal::ZERO);
    assert_eq!(d.rate_acq, dec!(2.8));
}

// ===========================================================================
// Report
// ===========================================================================

#[test]
fn test_report_from_json_document() {
    let json = r#"{
        "items": [
            {"classification": "sale_or_exchange", "sub_classification": "land", "taxable_base": "100000000"},
            {"classification": "original_construction", "taxable_base": "50000000"},
            {"classification": "inheritance", "sub_classification": "non_land", "taxable_base": "20000000"}
        ]
    }"#;
    let input: AcquisitionReportInput = serde_json::from_str(json).unwrap();
    let out = calculate_report(&input).unwrap();
    let totals = out.result.totals();

    // 3.2M + (1.4M + 0.1M + 80k) + (560k + 32k)
    assert_eq!(totals.sum_acq, dec!(3_000_000) + dec!(1_400_000) + dec!(560_000));
    assert_eq!(totals.sum_rural, dec!(100_000));
    assert_eq!(totals.sum_edu, dec!(200_000) + dec!(80_000) + dec!(32_000));
    assert_eq!(
        totals.sum_total,
        totals.sum_acq + totals.sum_rural + totals.sum_edu
    );
    assert!(out.warnings.is_empty());
}

#[test]
fn test_report_rejects_negative_base() {
    let input = AcquisitionReportInput {
        special_rule_enabled: None,
        items: vec![AcquisitionInput {
            taxable_base: dec!(-10),
            ..AcquisitionInput::default()
        }],
    };
    assert!(matches!(
        calculate_report(&input),
        Err(PlannerError::InvalidInput { .. })
    ));
}

#[test]
fn test_report_serializes_items_with_derived_fields() {
    let mut report = AcquisitionReport::new();
    report
        .add_item(AcquisitionInput {
            classification: SaleOrExchange,
            sub_classification: SubClassification::Land,
            taxable_base: dec!(100_000_000),
            special_rule_enabled: false,
        })
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    let item = &json["items"][0];
    assert_eq!(item["classification"], "sale_or_exchange");
    assert_eq!(item["amount_total"], "3200000");
    assert_eq!(json["totals"]["sum_total"], "3200000");
}

#[test]
fn test_empty_report() {
    let report = AcquisitionReport::from_input(&AcquisitionReportInput::default()).unwrap();
    assert!(report.is_empty());
    assert_eq!(report.totals().sum_total, Decimal::ZERO);
}
