use super::error::CalcError;
use super::types::{
    ComparisonRow, GrowthPoint, PlanInputs, PlanSummary, RetirementIncome, RiskLevel, SipResult,
    TaxEstimate,
};

pub const SEC_80C_LIMIT: f64 = 150_000.0;
pub const SEC_80C_TAX_RATE: f64 = 0.30;

const COMPARISON_ROWS: [ComparisonRow; 4] = [
    ComparisonRow {
        option_name: "Equity Mutual Fund",
        expected_return_percent: 12.0,
        risk_level: RiskLevel::High,
        liquidity: "High (after 1 year)",
    },
    ComparisonRow {
        option_name: "Public Provident Fund (PPF)",
        expected_return_percent: 7.1,
        risk_level: RiskLevel::Low,
        liquidity: "Low",
    },
    ComparisonRow {
        option_name: "Employees Provident Fund (EPF)",
        expected_return_percent: 8.1,
        risk_level: RiskLevel::Low,
        liquidity: "Low",
    },
    ComparisonRow {
        option_name: "National Pension Scheme (NPS)",
        expected_return_percent: 9.0,
        risk_level: RiskLevel::Moderate,
        liquidity: "Moderate",
    },
];

pub fn annuity_future_value(
    monthly_contribution: f64,
    annual_rate_percent: f64,
    months: u32,
) -> f64 {
    let monthly_rate = annual_rate_percent / 12.0 / 100.0;
    // The closed form divides by the rate; a zero rate degenerates to the
    // plain sum of contributions.
    if monthly_rate == 0.0 {
        return monthly_contribution * months as f64;
    }
    monthly_contribution * (((1.0 + monthly_rate).powi(months as i32) - 1.0) / monthly_rate)
}

pub fn simulate_sip(monthly_contribution: f64, annual_rate_percent: f64, years: u32) -> SipResult {
    SipResult {
        total_invested: monthly_contribution * 12.0 * years as f64,
        future_value: annuity_future_value(monthly_contribution, annual_rate_percent, years * 12),
    }
}

pub fn project_plan(inputs: &PlanInputs) -> PlanSummary {
    let months = inputs.horizon_months();
    PlanSummary {
        total_investment: inputs.monthly_investment * months as f64,
        future_value_equity: annuity_future_value(
            inputs.monthly_investment,
            inputs.equity_rate,
            months,
        ),
        future_value_traditional: annuity_future_value(
            inputs.monthly_investment,
            inputs.traditional_rate,
            months,
        ),
    }
}

pub fn yearly_series(inputs: &PlanInputs) -> impl Iterator<Item = GrowthPoint> + '_ {
    (inputs.current_age..=inputs.retirement_age).map(move |age| {
        let elapsed_months = (age - inputs.current_age) * 12;
        GrowthPoint {
            age,
            equity_value: annuity_future_value(
                inputs.monthly_investment,
                inputs.equity_rate,
                elapsed_months,
            ),
            traditional_value: annuity_future_value(
                inputs.monthly_investment,
                inputs.traditional_rate,
                elapsed_months,
            ),
        }
    })
}

pub fn estimate_tax_benefit(annual_investment: f64) -> TaxEstimate {
    let eligible_amount = annual_investment.min(SEC_80C_LIMIT);
    TaxEstimate {
        eligible_amount,
        tax_saved: eligible_amount * SEC_80C_TAX_RATE,
    }
}

pub fn project_retirement_income(
    corpus: f64,
    annuity_rate_percent: f64,
    monthly_withdrawal: f64,
) -> Result<RetirementIncome, CalcError> {
    if monthly_withdrawal <= 0.0 {
        return Err(CalcError::ZeroWithdrawal);
    }
    Ok(RetirementIncome {
        annual_annuity: corpus * annuity_rate_percent / 100.0,
        withdrawal_horizon_years: corpus / (monthly_withdrawal * 12.0),
    })
}

pub fn comparison_table() -> &'static [ComparisonRow] {
    &COMPARISON_ROWS
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    // Per-month compounding oracle for the closed form: contribution i earns
    // interest for the months remaining after it is paid in.
    fn compounding_oracle(monthly_contribution: f64, annual_rate_percent: f64, months: u32) -> f64 {
        let monthly_rate = annual_rate_percent / 12.0 / 100.0;
        let mut future_value = 0.0;
        for i in 1..=months {
            future_value += monthly_contribution * (1.0 + monthly_rate).powi((months - i) as i32);
        }
        future_value
    }

    fn sample_inputs() -> PlanInputs {
        PlanInputs {
            current_age: 30,
            retirement_age: 60,
            monthly_investment: 5_000.0,
            equity_rate: 12.0,
            traditional_rate: 7.0,
        }
    }

    #[test]
    fn sip_reference_scenario_matches_known_values() {
        let result = simulate_sip(5_000.0, 12.0, 20);
        assert_approx(result.total_invested, 1_200_000.0);
        assert_approx_tol(result.future_value, 4_946_276.83, 0.01);
    }

    #[test]
    fn closed_form_agrees_with_oracle_for_reference_scenario() {
        let closed = annuity_future_value(5_000.0, 12.0, 240);
        let oracle = compounding_oracle(5_000.0, 12.0, 240);
        assert!((closed - oracle).abs() <= 1e-6 * oracle);
    }

    #[test]
    fn zero_rate_future_value_equals_total_invested_exactly() {
        let result = simulate_sip(5_000.0, 0.0, 10);
        assert!(result.future_value == result.total_invested);
        assert_approx(result.total_invested, 600_000.0);
    }

    #[test]
    fn plan_summary_matches_closed_form_at_horizon() {
        let inputs = sample_inputs();
        let summary = project_plan(&inputs);
        assert_approx(summary.total_investment, 1_800_000.0);
        assert_approx_tol(summary.future_value_equity, 17_474_820.66, 0.01);
        assert_approx_tol(summary.future_value_traditional, 6_099_854.98, 0.01);
    }

    #[test]
    fn plan_with_zero_horizon_is_all_zero() {
        let mut inputs = sample_inputs();
        inputs.current_age = 60;
        inputs.retirement_age = 60;
        let summary = project_plan(&inputs);
        assert_approx(summary.total_investment, 0.0);
        assert_approx(summary.future_value_equity, 0.0);
        assert_approx(summary.future_value_traditional, 0.0);
    }

    #[test]
    fn yearly_series_spans_start_to_horizon_inclusive() {
        let inputs = sample_inputs();
        let points: Vec<GrowthPoint> = yearly_series(&inputs).collect();

        assert_eq!(points.len(), 31);
        assert_eq!(points[0].age, 30);
        assert_eq!(points[30].age, 60);
        assert_approx(points[0].equity_value, 0.0);
        assert_approx(points[0].traditional_value, 0.0);

        let summary = project_plan(&inputs);
        assert_approx_tol(points[30].equity_value, summary.future_value_equity, 1e-6);
        assert_approx_tol(
            points[30].traditional_value,
            summary.future_value_traditional,
            1e-6,
        );
    }

    #[test]
    fn yearly_series_is_nondecreasing_under_positive_rates() {
        let inputs = sample_inputs();
        let points: Vec<GrowthPoint> = yearly_series(&inputs).collect();
        for pair in points.windows(2) {
            assert!(pair[1].equity_value >= pair[0].equity_value);
            assert!(pair[1].traditional_value >= pair[0].traditional_value);
        }
    }

    #[test]
    fn tax_benefit_is_capped_at_the_statutory_limit() {
        let estimate = estimate_tax_benefit(200_000.0);
        assert_approx(estimate.eligible_amount, 150_000.0);
        assert_approx(estimate.tax_saved, 45_000.0);
    }

    #[test]
    fn tax_benefit_below_the_limit_uses_the_full_amount() {
        let estimate = estimate_tax_benefit(100_000.0);
        assert_approx(estimate.eligible_amount, 100_000.0);
        assert_approx(estimate.tax_saved, 30_000.0);
    }

    #[test]
    fn retirement_income_reference_scenario() {
        let income = project_retirement_income(1_000_000.0, 6.0, 10_000.0).expect("valid inputs");
        assert_approx(income.annual_annuity, 60_000.0);
        assert_approx_tol(income.withdrawal_horizon_years, 8.3333, 1e-4);
    }

    #[test]
    fn retirement_income_rejects_zero_withdrawal() {
        let err = project_retirement_income(1_000_000.0, 6.0, 0.0).expect_err("must reject");
        assert_eq!(err, CalcError::ZeroWithdrawal);
    }

    #[test]
    fn comparison_table_has_the_four_fixed_options() {
        let rows = comparison_table();
        assert_eq!(rows.len(), 4);

        let names: Vec<&str> = rows.iter().map(|row| row.option_name).collect();
        assert_eq!(
            names,
            vec![
                "Equity Mutual Fund",
                "Public Provident Fund (PPF)",
                "Employees Provident Fund (EPF)",
                "National Pension Scheme (NPS)",
            ]
        );
        assert_eq!(rows[0].risk_level, RiskLevel::High);
        assert_eq!(rows[3].risk_level, RiskLevel::Moderate);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_closed_form_agrees_with_compounding_oracle(
            monthly in 500u32..100_000,
            rate_bp in 0u32..2_000,
            years in 1u32..41
        ) {
            let monthly = monthly as f64;
            let rate = rate_bp as f64 / 100.0;
            let closed = annuity_future_value(monthly, rate, years * 12);
            let oracle = compounding_oracle(monthly, rate, years * 12);
            prop_assert!((closed - oracle).abs() <= 1e-6 * oracle.max(1.0));
        }

        #[test]
        fn prop_future_value_dominates_contributions_under_positive_rate(
            monthly in 500u32..100_000,
            rate_bp in 1u32..2_000,
            years in 1u32..41
        ) {
            let result = simulate_sip(monthly as f64, rate_bp as f64 / 100.0, years);
            prop_assert!(result.future_value >= result.total_invested);
        }

        #[test]
        fn prop_total_invested_is_monthly_times_months(
            monthly in 500u32..100_000,
            years in 1u32..41
        ) {
            let result = simulate_sip(monthly as f64, 8.0, years);
            prop_assert!((result.total_invested - monthly as f64 * 12.0 * years as f64).abs() <= EPS);
        }

        #[test]
        fn prop_eligible_amount_never_exceeds_the_limit(investment in 0u32..1_000_000) {
            let estimate = estimate_tax_benefit(investment as f64);
            prop_assert!(estimate.eligible_amount <= SEC_80C_LIMIT);
            prop_assert!((estimate.tax_saved - estimate.eligible_amount * SEC_80C_TAX_RATE).abs() <= EPS);
        }

        #[test]
        fn prop_withdrawal_horizon_matches_division(
            corpus in 100_000u32..100_000_000,
            monthly in 1_000u32..100_000
        ) {
            let income = project_retirement_income(corpus as f64, 6.0, monthly as f64)
                .expect("positive withdrawal");
            let expected = corpus as f64 / (monthly as f64 * 12.0);
            prop_assert!((income.withdrawal_horizon_years - expected).abs() <= EPS);
        }
    }
}
