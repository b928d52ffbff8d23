mod engine;
mod error;
mod format;
mod types;

pub use engine::{
    SEC_80C_LIMIT, SEC_80C_TAX_RATE, annuity_future_value, comparison_table, estimate_tax_benefit,
    project_plan, project_retirement_income, simulate_sip, yearly_series,
};
pub use error::CalcError;
pub use format::format_inr;
pub use types::{
    ComparisonRow, GrowthPoint, PlanInputs, PlanSummary, RetirementIncome, RiskLevel, SipResult,
    TaxEstimate,
};
