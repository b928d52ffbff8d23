use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlanInputs {
    pub current_age: u32,
    pub retirement_age: u32,
    pub monthly_investment: f64,
    pub equity_rate: f64,
    pub traditional_rate: f64,
}

impl PlanInputs {
    pub fn horizon_months(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age) * 12
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub total_investment: f64,
    pub future_value_equity: f64,
    pub future_value_traditional: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPoint {
    pub age: u32,
    pub equity_value: f64,
    pub traditional_value: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SipResult {
    pub total_invested: f64,
    pub future_value: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxEstimate {
    pub eligible_amount: f64,
    pub tax_saved: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementIncome {
    pub annual_annuity: f64,
    pub withdrawal_horizon_years: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub option_name: &'static str,
    pub expected_return_percent: f64,
    pub risk_level: RiskLevel,
    pub liquidity: &'static str,
}
