// Wide → long reshape of the monthly transaction columns.
use crate::error::{DashboardError, Result};
use crate::types::{AgentRecord, Month, TrendRecord};

/// Melt the wide agent table into one row per (agent, month).
///
/// `month_columns` names the wide columns to unpivot, in the order they should
/// be emitted; each must be one of the six known month headers. Rows come out
/// month-major: every agent for the first column, then every agent for the
/// next. Missing monthly values stay missing.
pub fn melt(agents: &[AgentRecord], month_columns: &[&str]) -> Result<Vec<TrendRecord>> {
    let months = month_columns
        .iter()
        .map(|c| Month::from_column(c).ok_or_else(|| DashboardError::UnknownMonthColumn(c.to_string())))
        .collect::<Result<Vec<Month>>>()?;

    let mut out = Vec::with_capacity(agents.len() * months.len());
    for month in months {
        out.extend(agents.iter().map(|a| TrendRecord {
            user_name: a.user_name.clone(),
            gender: a.gender.clone(),
            region: a.region.clone(),
            month,
            transactions: a.transactions(month),
        }));
    }
    Ok(out)
}
