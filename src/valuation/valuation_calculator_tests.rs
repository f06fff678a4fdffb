//! Tests for the valuation calculators.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::costsheet::{CategoryKey, CostCategory, CostLine};
    use crate::fx::Currency;
    use crate::settings::GlobalParameters;
    use crate::valuation::{calculate_category_valuation, calculate_cost_summary};

    fn globals(
        rate: Decimal,
        margin: Decimal,
        preferred: Currency,
        tax: Decimal,
    ) -> GlobalParameters {
        GlobalParameters::new(rate, margin, preferred, tax).unwrap()
    }

    fn category_with_line(
        key: CategoryKey,
        includes_tax: bool,
        margin_applies: bool,
        line: CostLine,
    ) -> CostCategory {
        let mut category = CostCategory::new(key, Currency::Pen, includes_tax, margin_applies);
        category.add_line(line).unwrap();
        category
    }

    // ==================== Category subtotals ====================

    #[test]
    fn test_tax_inclusive_category_sums_lines() {
        let line = CostLine::simple("mesh panel", dec!(10), dec!(5), Currency::Pen).unwrap();
        let category = category_with_line(CategoryKey::Fabrication, true, false, line);
        let params = globals(dec!(3.75), dec!(0.20), Currency::Pen, dec!(0.18));

        let valuation = calculate_category_valuation(&category, &params).unwrap();
        assert_eq!(valuation.subtotal_base, dec!(50));
        assert_eq!(valuation.subtotal_reporting, dec!(50));
    }

    #[test]
    fn test_tax_exclusive_category_grossed_up() {
        let line = CostLine::simple("mesh panel", dec!(10), dec!(5), Currency::Pen).unwrap();
        let category = category_with_line(CategoryKey::Fabrication, false, false, line);
        let params = globals(dec!(3.75), dec!(0.20), Currency::Pen, dec!(0.18));

        let valuation = calculate_category_valuation(&category, &params).unwrap();
        assert_eq!(valuation.subtotal_base, dec!(59));
    }

    #[test]
    fn test_margin_applies_only_to_margin_bearing_category() {
        let wire = CostLine::simple("2.3mm wire", dec!(100), dec!(1), Currency::Pen).unwrap();
        let raw_material = category_with_line(CategoryKey::RawMaterial, true, true, wire.clone());
        let fabrication = category_with_line(CategoryKey::Fabrication, true, false, wire);
        let params = globals(dec!(3.75), dec!(0.20), Currency::Pen, dec!(0.18));

        let with_margin = calculate_category_valuation(&raw_material, &params).unwrap();
        let without_margin = calculate_category_valuation(&fabrication, &params).unwrap();
        assert_eq!(with_margin.subtotal_base, dec!(120));
        assert_eq!(without_margin.subtotal_base, dec!(100));
    }

    #[test]
    fn test_usd_line_normalizes_to_base() {
        let line = CostLine::simple("imported nipples", dec!(1), dec!(10), Currency::Usd).unwrap();
        let category = category_with_line(CategoryKey::PurchasedGoods, true, false, line);
        let params = globals(dec!(3.75), Decimal::ZERO, Currency::Pen, dec!(0.18));

        let valuation = calculate_category_valuation(&category, &params).unwrap();
        assert_eq!(valuation.subtotal_base, dec!(37.5));
    }

    #[test]
    fn test_margin_applied_before_tax_gross_up() {
        let wire = CostLine::simple("2.3mm wire", dec!(100), dec!(1), Currency::Pen).unwrap();
        let category = category_with_line(CategoryKey::RawMaterial, false, true, wire);
        let params = globals(dec!(3.75), dec!(0.20), Currency::Pen, dec!(0.18));

        // 100 * 1.20 margin, then * 1.18 gross-up.
        let valuation = calculate_category_valuation(&category, &params).unwrap();
        assert_eq!(valuation.subtotal_base, dec!(141.6));
    }

    #[test]
    fn test_mixed_currency_lines_share_one_rate() {
        let mut category = CostCategory::new(CategoryKey::Miscellaneous, Currency::Pen, true, false);
        category
            .add_line(CostLine::simple("freight", dec!(1), dec!(75), Currency::Pen).unwrap())
            .unwrap();
        category
            .add_line(CostLine::simple("import fee", dec!(1), dec!(20), Currency::Usd).unwrap())
            .unwrap();
        let params = globals(dec!(3.75), Decimal::ZERO, Currency::Pen, dec!(0.18));

        let valuation = calculate_category_valuation(&category, &params).unwrap();
        assert_eq!(valuation.subtotal_base, dec!(150));
    }

    #[test]
    fn test_labor_lines_price_by_days_and_rate() {
        let crew = CostLine::labor("assembly crew", dec!(6), dec!(10), dec!(65), Currency::Pen).unwrap();
        let category = category_with_line(CategoryKey::Labor, true, false, crew);
        let params = globals(dec!(3.75), Decimal::ZERO, Currency::Pen, dec!(0.18));

        let valuation = calculate_category_valuation(&category, &params).unwrap();
        assert_eq!(valuation.subtotal_base, dec!(3900));
    }

    #[test]
    fn test_reporting_currency_only_affects_presentation() {
        let line = CostLine::simple("mesh panel", dec!(10), dec!(7.5), Currency::Pen).unwrap();
        let mut category = category_with_line(CategoryKey::Fabrication, true, false, line);
        let params = globals(dec!(3.75), Decimal::ZERO, Currency::Pen, dec!(0.18));

        let in_pen = calculate_category_valuation(&category, &params).unwrap();
        category.set_reporting_currency(Currency::Usd);
        let in_usd = calculate_category_valuation(&category, &params).unwrap();

        assert_eq!(in_pen.subtotal_base, in_usd.subtotal_base);
        assert_eq!(in_pen.subtotal_reporting, dec!(75));
        assert_eq!(in_usd.subtotal_reporting, dec!(20));
    }

    #[test]
    fn test_empty_category_totals_zero() {
        let category = CostCategory::seeded(CategoryKey::Miscellaneous);
        let params = GlobalParameters::default();

        let valuation = calculate_category_valuation(&category, &params).unwrap();
        assert_eq!(valuation.subtotal_base, Decimal::ZERO);
        assert_eq!(valuation.subtotal_reporting, Decimal::ZERO);
    }

    // ==================== Combined summary ====================

    #[test]
    fn test_summary_display_in_preferred_currency() {
        let fabrication = category_with_line(
            CategoryKey::Fabrication,
            true,
            false,
            CostLine::simple("mesh panel", dec!(100), dec!(1), Currency::Pen).unwrap(),
        );
        let purchased = category_with_line(
            CategoryKey::PurchasedGoods,
            true,
            false,
            CostLine::simple("nipples", dec!(50), dec!(1), Currency::Pen).unwrap(),
        );
        let params = globals(dec!(3.75), Decimal::ZERO, Currency::Usd, dec!(0.18));

        let summary = calculate_cost_summary(&[fabrication, purchased], &params).unwrap();
        assert_eq!(summary.base_total, dec!(150));
        assert_eq!(summary.display_total, dec!(40));
        assert_eq!(summary.display_currency, Currency::Usd);
    }

    #[test]
    fn test_base_total_is_sum_of_category_base_subtotals() {
        let mut fabrication = category_with_line(
            CategoryKey::Fabrication,
            true,
            false,
            CostLine::simple("mesh panel", dec!(824), dec!(0.7), Currency::Pen).unwrap(),
        );
        fabrication.set_reporting_currency(Currency::Usd);
        let labor = category_with_line(
            CategoryKey::Labor,
            false,
            false,
            CostLine::labor("crew", dec!(6), dec!(10), dec!(65), Currency::Pen).unwrap(),
        );
        let params = globals(dec!(3.75), dec!(0.02), Currency::Pen, dec!(0.18));

        let summary = calculate_cost_summary(&[fabrication, labor], &params).unwrap();
        let expected: Decimal = summary
            .categories
            .iter()
            .map(|valuation| valuation.subtotal_base)
            .sum();
        assert_eq!(summary.base_total, expected);
    }

    #[test]
    fn test_preferred_currency_change_leaves_base_total() {
        let category = category_with_line(
            CategoryKey::Fabrication,
            true,
            false,
            CostLine::simple("mesh panel", dec!(100), dec!(1.5), Currency::Pen).unwrap(),
        );
        let in_pen = globals(dec!(3.75), Decimal::ZERO, Currency::Pen, dec!(0.18));
        let in_usd = globals(dec!(3.75), Decimal::ZERO, Currency::Usd, dec!(0.18));

        let pen_summary = calculate_cost_summary(std::slice::from_ref(&category), &in_pen).unwrap();
        let usd_summary = calculate_cost_summary(std::slice::from_ref(&category), &in_usd).unwrap();

        assert_eq!(pen_summary.base_total, usd_summary.base_total);
        assert_eq!(pen_summary.display_total, dec!(150));
        assert_eq!(usd_summary.display_total, dec!(40));
    }

    #[test]
    fn test_empty_sheet_totals_zero() {
        let categories: Vec<CostCategory> =
            CategoryKey::all().into_iter().map(CostCategory::seeded).collect();
        let summary = calculate_cost_summary(&categories, &GlobalParameters::default()).unwrap();
        assert_eq!(summary.base_total, Decimal::ZERO);
        assert_eq!(summary.display_total, Decimal::ZERO);
        assert_eq!(summary.categories.len(), 5);
    }

    // ==================== Properties ====================

    proptest! {
        #[test]
        fn prop_base_subtotal_invariant_under_reporting_currency(
            price_cents in 0i64..1_000_000,
            quantity in 0i64..10_000,
            rate_cents in 1i64..1_000_000,
        ) {
            let line = CostLine::simple(
                "line",
                Decimal::from(quantity),
                Decimal::new(price_cents, 2),
                Currency::Usd,
            ).unwrap();
            let mut category = category_with_line(CategoryKey::PurchasedGoods, true, false, line);
            let params = globals(
                Decimal::new(rate_cents, 2),
                Decimal::ZERO,
                Currency::Pen,
                dec!(0.18),
            );

            let in_pen = calculate_category_valuation(&category, &params).unwrap();
            category.set_reporting_currency(Currency::Usd);
            let in_usd = calculate_category_valuation(&category, &params).unwrap();

            prop_assert_eq!(in_pen.subtotal_base, in_usd.subtotal_base);
        }

        #[test]
        fn prop_display_total_consistent_with_rate(
            price_cents in 0i64..1_000_000,
            quantity in 0i64..10_000,
            rate_cents in 1i64..1_000_000,
        ) {
            let rate = Decimal::new(rate_cents, 2);
            let line = CostLine::simple(
                "line",
                Decimal::from(quantity),
                Decimal::new(price_cents, 2),
                Currency::Pen,
            ).unwrap();
            let category = category_with_line(CategoryKey::Fabrication, true, false, line);
            let params = globals(rate, Decimal::ZERO, Currency::Usd, dec!(0.18));

            let summary = calculate_cost_summary(std::slice::from_ref(&category), &params).unwrap();

            // display_total * rate recovers the base total up to rounding.
            let recovered = summary.display_total * rate;
            let difference = (recovered - summary.base_total).abs();
            prop_assert!(difference <= rate * dec!(0.000001));
        }
    }
}
