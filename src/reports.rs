use crate::types::{
    AgentRecord, CategoryCountRow, Heatmap, HeatmapCell, Month, MonthlyAverageRow, RegionTrendRow,
    SummaryStats, TrendRecord,
};
use crate::util::mean;
use std::collections::BTreeMap;

/// Average transactions per month across the wide table, in calendar order.
pub fn monthly_averages(data: &[AgentRecord]) -> Vec<MonthlyAverageRow> {
    Month::ALL
        .into_iter()
        .map(|month| MonthlyAverageRow {
            month,
            avg_transactions: mean(data.iter().map(|a| a.transactions(month))),
        })
        .collect()
}

/// Mean transactions per (Month, Region) over the long table.
///
/// Ordered by month then region name. Rows without a region are not grouped.
pub fn region_trend(data: &[TrendRecord]) -> Vec<RegionTrendRow> {
    let mut groups: BTreeMap<(Month, &str), Vec<Option<f64>>> = BTreeMap::new();
    for r in data {
        let Some(region) = r.region.as_deref() else {
            continue;
        };
        groups.entry((r.month, region)).or_default().push(r.transactions);
    }
    groups
        .into_iter()
        .map(|((month, region), values)| RegionTrendRow {
            month,
            region: region.to_string(),
            transactions: mean(values),
        })
        .collect()
}

/// Occurrences of each distinct non-missing value, most frequent first.
/// Ties keep the order in which values first appear.
pub fn value_counts<'a, I>(values: I) -> Vec<CategoryCountRow>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut rows: Vec<CategoryCountRow> = Vec::new();
    for v in values.into_iter().flatten() {
        match rows.iter_mut().find(|r| r.category == v) {
            Some(row) => row.count += 1,
            None => rows.push(CategoryCountRow {
                category: v.to_string(),
                count: 1,
            }),
        }
    }
    // stable: equal counts stay in first-seen order
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

pub fn active_counts(data: &[AgentRecord]) -> Vec<CategoryCountRow> {
    value_counts(data.iter().map(|a| a.active.as_deref()))
}

pub fn gender_counts(data: &[AgentRecord]) -> Vec<CategoryCountRow> {
    value_counts(data.iter().map(|a| a.gender.as_deref()))
}

fn edges(min: f64, max: f64, bins: usize) -> Vec<f64> {
    let (lo, hi) = if (max - min).abs() < f64::EPSILON {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (hi - lo) / bins as f64;
    (0..=bins).map(|i| lo + width * i as f64).collect()
}

fn bin_of(v: f64, edges: &[f64]) -> usize {
    let bins = edges.len() - 1;
    let lo = edges[0];
    let width = (edges[bins] - lo) / bins as f64;
    (((v - lo) / width).floor() as usize).min(bins - 1)
}

/// Sum of `Average Productivity` on an equal-width longitude × latitude grid.
///
/// Agents without both coordinates are left out. The grid spans the observed
/// coordinate range and the maximum lands in the last bin.
pub fn productivity_heatmap(data: &[AgentRecord], bins_x: usize, bins_y: usize) -> Heatmap {
    let points: Vec<(f64, f64, Option<f64>)> = data
        .iter()
        .filter_map(|a| Some((a.longitude?, a.latitude?, a.average_productivity)))
        .collect();
    if points.is_empty() || bins_x == 0 || bins_y == 0 {
        return Heatmap {
            x_edges: Vec::new(),
            y_edges: Vec::new(),
            z: Vec::new(),
            counts: Vec::new(),
        };
    }

    let (mut min_x, mut max_x) = (f64::MAX, f64::MIN);
    let (mut min_y, mut max_y) = (f64::MAX, f64::MIN);
    for (x, y, _) in &points {
        min_x = min_x.min(*x);
        max_x = max_x.max(*x);
        min_y = min_y.min(*y);
        max_y = max_y.max(*y);
    }
    let x_edges = edges(min_x, max_x, bins_x);
    let y_edges = edges(min_y, max_y, bins_y);

    let mut z = vec![vec![0.0; bins_x]; bins_y];
    let mut counts = vec![vec![0usize; bins_x]; bins_y];
    for (x, y, weight) in points {
        let (ix, iy) = (bin_of(x, &x_edges), bin_of(y, &y_edges));
        counts[iy][ix] += 1;
        if let Some(w) = weight {
            z[iy][ix] += w;
        }
    }
    Heatmap {
        x_edges,
        y_edges,
        z,
        counts,
    }
}

impl Heatmap {
    /// Occupied cells, hottest first.
    pub fn cells(&self) -> Vec<HeatmapCell> {
        let mut cells = Vec::new();
        for (iy, row) in self.counts.iter().enumerate() {
            for (ix, &agents) in row.iter().enumerate() {
                if agents == 0 {
                    continue;
                }
                cells.push(HeatmapCell {
                    longitude_from: self.x_edges[ix],
                    longitude_to: self.x_edges[ix + 1],
                    latitude_from: self.y_edges[iy],
                    latitude_to: self.y_edges[iy + 1],
                    agents,
                    productivity: self.z[iy][ix],
                });
            }
        }
        cells.sort_by(|a, b| b.productivity.total_cmp(&a.productivity));
        cells
    }
}

pub fn generate_summary(
    total_agents: usize,
    agents: &[AgentRecord],
    trend: &[TrendRecord],
) -> SummaryStats {
    SummaryStats {
        total_agents,
        agents_in_view: agents.len(),
        trend_rows_in_view: trend.len(),
        avg_productivity: mean(agents.iter().map(|a| a.average_productivity)),
    }
}
