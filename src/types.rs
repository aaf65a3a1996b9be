use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// The six reporting months, declared in calendar order.
///
/// The derived `Ord` follows declaration order, so sorting by `Month` gives
/// Sep < Oct < Nov < Dec < Jan < Feb even though the period crosses a year
/// boundary and the labels are not alphabetical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Month {
    Sep,
    Oct,
    Nov,
    Dec,
    Jan,
    Feb,
}

impl Month {
    pub const ALL: [Month; 6] = [
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
        Month::Jan,
        Month::Feb,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
            Month::Jan => "Jan",
            Month::Feb => "Feb",
        }
    }

    /// Header of the wide-table column holding this month's transactions.
    pub fn column_name(self) -> &'static str {
        match self {
            Month::Sep => "September value",
            Month::Oct => "October value",
            Month::Nov => "November value",
            Month::Dec => "December value",
            Month::Jan => "January value",
            Month::Feb => "February value",
        }
    }

    /// Month column headers in calendar order.
    pub fn columns() -> [&'static str; 6] {
        Month::ALL.map(Month::column_name)
    }

    pub fn from_column(name: &str) -> Option<Month> {
        let name = name.trim();
        Month::ALL.into_iter().find(|m| m.column_name() == name)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Non-month headers every source sheet must carry.
pub const ATTRIBUTE_COLUMNS: [&str; 7] = [
    "UserName",
    "Gender",
    "Region",
    "Sim_Longitude",
    "Sim_Latitude",
    "Average Productivity",
    "Active",
];

#[derive(Debug, Default, Deserialize)]
pub struct RawRow {
    #[serde(rename = "UserName")]
    pub user_name: Option<String>,
    #[serde(rename = "Gender")]
    pub gender: Option<String>,
    #[serde(rename = "Region")]
    pub region: Option<String>,
    #[serde(rename = "Sim_Longitude")]
    pub sim_longitude: Option<String>,
    #[serde(rename = "Sim_Latitude")]
    pub sim_latitude: Option<String>,
    #[serde(rename = "Average Productivity")]
    pub average_productivity: Option<String>,
    #[serde(rename = "Active")]
    pub active: Option<String>,
    #[serde(rename = "September value")]
    pub september: Option<String>,
    #[serde(rename = "October value")]
    pub october: Option<String>,
    #[serde(rename = "November value")]
    pub november: Option<String>,
    #[serde(rename = "December value")]
    pub december: Option<String>,
    #[serde(rename = "January value")]
    pub january: Option<String>,
    #[serde(rename = "February value")]
    pub february: Option<String>,
}

impl RawRow {
    pub fn month_value(&self, month: Month) -> Option<&str> {
        match month {
            Month::Sep => self.september.as_deref(),
            Month::Oct => self.october.as_deref(),
            Month::Nov => self.november.as_deref(),
            Month::Dec => self.december.as_deref(),
            Month::Jan => self.january.as_deref(),
            Month::Feb => self.february.as_deref(),
        }
    }

    /// Assign a cell by its sheet header. Unknown headers are ignored.
    pub fn set(&mut self, column: &str, value: Option<String>) {
        let slot = match column.trim() {
            "UserName" => &mut self.user_name,
            "Gender" => &mut self.gender,
            "Region" => &mut self.region,
            "Sim_Longitude" => &mut self.sim_longitude,
            "Sim_Latitude" => &mut self.sim_latitude,
            "Average Productivity" => &mut self.average_productivity,
            "Active" => &mut self.active,
            "September value" => &mut self.september,
            "October value" => &mut self.october,
            "November value" => &mut self.november,
            "December value" => &mut self.december,
            "January value" => &mut self.january,
            "February value" => &mut self.february,
            _ => return,
        };
        *slot = value;
    }
}

/// One agent row of the wide source table.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRecord {
    pub user_name: String,
    pub gender: Option<String>,
    pub region: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub average_productivity: Option<f64>,
    pub active: Option<String>,
    /// Monthly transaction counts indexed by `Month::index`.
    pub monthly: [Option<f64>; 6],
}

impl AgentRecord {
    pub fn transactions(&self, month: Month) -> Option<f64> {
        self.monthly[month.index()]
    }
}

/// One (agent, month) row of the long trend table.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendRecord {
    pub user_name: String,
    pub gender: Option<String>,
    pub region: Option<String>,
    pub month: Month,
    pub transactions: Option<f64>,
}

fn display_optional(v: &Option<f64>) -> String {
    match v {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

fn display_sum(v: &f64) -> String {
    format!("{:.2}", v)
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct MonthlyAverageRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: Month,
    #[serde(rename = "Avg Transactions")]
    #[tabled(rename = "Avg Transactions", display_with = "display_optional")]
    pub avg_transactions: Option<f64>,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct RegionTrendRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: Month,
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Transactions")]
    #[tabled(rename = "Transactions", display_with = "display_optional")]
    pub transactions: Option<f64>,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct CategoryCountRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct HeatmapCell {
    #[serde(rename = "LongitudeFrom")]
    #[tabled(rename = "LongitudeFrom", display_with = "display_sum")]
    pub longitude_from: f64,
    #[serde(rename = "LongitudeTo")]
    #[tabled(rename = "LongitudeTo", display_with = "display_sum")]
    pub longitude_to: f64,
    #[serde(rename = "LatitudeFrom")]
    #[tabled(rename = "LatitudeFrom", display_with = "display_sum")]
    pub latitude_from: f64,
    #[serde(rename = "LatitudeTo")]
    #[tabled(rename = "LatitudeTo", display_with = "display_sum")]
    pub latitude_to: f64,
    #[serde(rename = "Agents")]
    #[tabled(rename = "Agents")]
    pub agents: usize,
    #[serde(rename = "Productivity")]
    #[tabled(rename = "Productivity", display_with = "display_sum")]
    pub productivity: f64,
}

/// Density grid over longitude (x) and latitude (y).
///
/// `z[y][x]` and `counts[y][x]` are row-major by latitude bin, the layout a
/// heatmap renderer expects. `x_edges`/`y_edges` hold `bins + 1` boundaries.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Heatmap {
    pub x_edges: Vec<f64>,
    pub y_edges: Vec<f64>,
    pub z: Vec<Vec<f64>>,
    pub counts: Vec<Vec<usize>>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SummaryStats {
    pub total_agents: usize,
    pub agents_in_view: usize,
    pub trend_rows_in_view: usize,
    pub avg_productivity: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn months_sort_in_calendar_order_not_alphabetically() {
        let mut months = vec![Month::Jan, Month::Feb, Month::Sep, Month::Dec, Month::Oct, Month::Nov];
        months.sort();
        assert_eq!(months, Month::ALL.to_vec());

        let mut labels: Vec<&str> = Month::ALL.iter().map(|m| m.label()).collect();
        labels.sort();
        assert_ne!(labels, vec!["Sep", "Oct", "Nov", "Dec", "Jan", "Feb"]);
    }

    #[test]
    fn month_columns_line_up_with_enumeration() {
        assert_eq!(
            Month::columns(),
            [
                "September value",
                "October value",
                "November value",
                "December value",
                "January value",
                "February value",
            ]
        );
        for month in Month::ALL {
            assert_eq!(Month::from_column(month.column_name()), Some(month));
        }
        assert_eq!(Month::from_column(" January value "), Some(Month::Jan));
        assert_eq!(Month::from_column("March value"), None);
        assert_eq!(Month::Feb.to_string(), "Feb");
    }

    #[test]
    fn raw_row_set_routes_by_header() {
        let mut row = RawRow::default();
        row.set("Region", Some("North".into()));
        row.set("November value", Some("12".into()));
        row.set("Unrelated", Some("x".into()));
        assert_eq!(row.region.as_deref(), Some("North"));
        assert_eq!(row.month_value(Month::Nov), Some("12"));
        assert_eq!(row.month_value(Month::Sep), None);
    }
}
