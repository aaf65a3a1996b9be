// Source tables loaded once, and the per-interaction chart bundle built from them.
use crate::error::Result;
use crate::filter::{distinct_values, Selection};
use crate::reports;
use crate::reshape::melt;
use crate::types::{
    AgentRecord, CategoryCountRow, Heatmap, Month, MonthlyAverageRow, RegionTrendRow, SummaryStats,
    TrendRecord,
};
use serde::Serialize;
use tracing::debug;

/// Wide and long tables derived from the source sheet. Never mutated.
#[derive(Debug)]
pub struct SourceTables {
    pub agents: Vec<AgentRecord>,
    pub trend: Vec<TrendRecord>,
    pub gender_options: Vec<String>,
    pub region_options: Vec<String>,
}

impl SourceTables {
    pub fn new(agents: Vec<AgentRecord>) -> Result<Self> {
        let trend = melt(&agents, &Month::columns())?;
        let gender_options = distinct_values(agents.iter().map(|a| a.gender.as_deref()));
        let region_options = distinct_values(agents.iter().map(|a| a.region.as_deref()));
        Ok(SourceTables {
            agents,
            trend,
            gender_options,
            region_options,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    DensityHeatmap,
    Pie,
    Bar,
    Line,
}

/// Column names a renderer binds to each visual channel.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Bindings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Chart<T> {
    pub kind: ChartKind,
    pub title: &'static str,
    pub bindings: Bindings,
    pub data: T,
}

impl<T> Chart<T> {
    fn new(kind: ChartKind, title: &'static str, bindings: Bindings, data: T) -> Self {
        Chart {
            kind,
            title,
            bindings,
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub filters: Selection,
    pub summary: SummaryStats,
    pub productivity_heatmap: Chart<Heatmap>,
    pub active_status: Chart<Vec<CategoryCountRow>>,
    pub gender_ratio: Chart<Vec<CategoryCountRow>>,
    pub monthly_average: Chart<Vec<MonthlyAverageRow>>,
    pub region_trend: Chart<Vec<RegionTrendRow>>,
}

/// Filter both tables with `selection` and compute every chart dataset.
///
/// Pure with respect to `source`: the same selection always yields the same
/// dashboard.
pub fn build(source: &SourceTables, selection: &Selection, bins: usize) -> Dashboard {
    let agents = selection.apply(&source.agents);
    let trend = selection.apply(&source.trend);
    debug!(
        agents = agents.len(),
        trend_rows = trend.len(),
        "filtered source tables"
    );

    Dashboard {
        filters: selection.clone(),
        summary: reports::generate_summary(source.agents.len(), &agents, &trend),
        productivity_heatmap: Chart::new(
            ChartKind::DensityHeatmap,
            "Agent Productivity by Location",
            Bindings {
                x: Some("Sim_Longitude"),
                y: Some("Sim_Latitude"),
                z: Some("Average Productivity"),
                ..Bindings::default()
            },
            reports::productivity_heatmap(&agents, bins, bins),
        ),
        active_status: Chart::new(
            ChartKind::Pie,
            "Active vs Dormant Agents",
            Bindings {
                names: Some("Category"),
                values: Some("Count"),
                ..Bindings::default()
            },
            reports::active_counts(&agents),
        ),
        gender_ratio: Chart::new(
            ChartKind::Pie,
            "Gender Ratio",
            Bindings {
                names: Some("Category"),
                values: Some("Count"),
                ..Bindings::default()
            },
            reports::gender_counts(&agents),
        ),
        monthly_average: Chart::new(
            ChartKind::Bar,
            "Average Transactions by Month",
            Bindings {
                x: Some("Month"),
                y: Some("Avg Transactions"),
                ..Bindings::default()
            },
            reports::monthly_averages(&agents),
        ),
        region_trend: Chart::new(
            ChartKind::Line,
            "Monthly Productivity Trend by Region",
            Bindings {
                x: Some("Month"),
                y: Some("Transactions"),
                color: Some("Region"),
                ..Bindings::default()
            },
            reports::region_trend(&trend),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reshape::tests::{agent, two_agents};

    #[test]
    fn source_tables_derive_long_table_and_options() {
        let mut agents = two_agents();
        agents.push(agent("C", "F", "South", [Some(1.0); 6]));
        let source = SourceTables::new(agents).unwrap();
        assert_eq!(source.trend.len(), 18);
        assert_eq!(source.gender_options, vec!["F", "M"]);
        assert_eq!(source.region_options, vec!["North", "South"]);
    }

    #[test]
    fn unfiltered_dashboard_covers_everyone() {
        let source = SourceTables::new(two_agents()).unwrap();
        let dash = build(&source, &Selection::default(), 20);
        assert_eq!(dash.summary.total_agents, 2);
        assert_eq!(dash.summary.agents_in_view, 2);
        assert_eq!(dash.summary.trend_rows_in_view, 12);
        assert_eq!(dash.monthly_average.data[0].avg_transactions, Some(6.0));
        assert_eq!(dash.region_trend.data.len(), 12);
        assert_eq!(dash.gender_ratio.data.len(), 2);
    }

    #[test]
    fn filters_reach_every_chart() {
        let source = SourceTables::new(two_agents()).unwrap();
        let sel = Selection {
            genders: vec![],
            regions: vec!["North".into()],
        };
        let dash = build(&source, &sel, 20);
        assert_eq!(dash.summary.agents_in_view, 1);
        assert_eq!(dash.summary.trend_rows_in_view, 6);
        assert_eq!(dash.gender_ratio.data.len(), 1);
        assert_eq!(dash.gender_ratio.data[0].category, "F");
        assert!(dash.region_trend.data.iter().all(|r| r.region == "North"));
        let months: Vec<Month> = dash.region_trend.data.iter().map(|r| r.month).collect();
        assert_eq!(months, Month::ALL.to_vec());
        assert_eq!(dash.monthly_average.data[5].avg_transactions, Some(30.0));
    }

    #[test]
    fn build_is_idempotent() {
        let source = SourceTables::new(two_agents()).unwrap();
        let sel = Selection {
            genders: vec!["M".into()],
            regions: vec![],
        };
        let a = serde_json::to_value(build(&source, &sel, 20)).unwrap();
        let b = serde_json::to_value(build(&source, &sel, 20)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a["monthly_average"]["kind"], "bar");
        assert_eq!(a["region_trend"]["bindings"]["color"], "Region");
    }
}
