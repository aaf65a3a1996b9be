use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::util::{format_int, format_number};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

/// Write `rows` as CSV. The header row is written even when `rows` is empty,
/// taken from the same column names the previews use.
pub fn write_csv<T: Serialize + Tabled>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        wtr.write_record(T::headers().iter().map(|h| h.as_bytes()))?;
    }
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Write every chart dataset plus `dashboard.json` into `dir`.
///
/// Returns the written paths in the order the charts appear on the page.
pub fn write_dashboard(dir: &Path, dash: &Dashboard) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let path = dir.join("productivity_heatmap.csv");
    write_csv(&path, &dash.productivity_heatmap.data.cells())?;
    written.push(path);

    let path = dir.join("active_status.csv");
    write_csv(&path, &dash.active_status.data)?;
    written.push(path);

    let path = dir.join("gender_ratio.csv");
    write_csv(&path, &dash.gender_ratio.data)?;
    written.push(path);

    let path = dir.join("monthly_average.csv");
    write_csv(&path, &dash.monthly_average.data)?;
    written.push(path);

    let path = dir.join("region_trend.csv");
    write_csv(&path, &dash.region_trend.data)?;
    written.push(path);

    let path = dir.join("dashboard.json");
    write_json(&path, dash)?;
    written.push(path);

    for p in &written {
        info!(path = %p.display(), "wrote");
    }
    Ok(written)
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Console rendition of the dashboard: one Markdown table per chart.
pub fn print_dashboard(dash: &Dashboard) {
    let s = &dash.summary;
    println!(
        "Agents in view: {} of {}",
        format_int(s.agents_in_view),
        format_int(s.total_agents)
    );
    if let Some(p) = s.avg_productivity {
        println!("Average productivity: {}", format_number(p, 2));
    }
    println!();

    let cells = dash.productivity_heatmap.data.cells();
    println!("Heatmap: {}", dash.productivity_heatmap.title);
    println!("(Most productive longitude/latitude cells)\n");
    preview_table_rows(&cells, 5);

    println!("{}\n", dash.active_status.title);
    preview_table_rows(&dash.active_status.data, 10);

    println!("{}\n", dash.gender_ratio.title);
    preview_table_rows(&dash.gender_ratio.data, 10);

    println!("{}\n", dash.monthly_average.title);
    preview_table_rows(&dash.monthly_average.data, 6);

    println!("{}\n", dash.region_trend.title);
    preview_table_rows(&dash.region_trend.data, 12);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{build, SourceTables};
    use crate::filter::Selection;
    use crate::reshape::tests::two_agents;
    use tempfile::TempDir;

    #[test]
    fn writes_every_chart_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dash");
        let source = SourceTables::new(two_agents()).unwrap();
        let dash = build(&source, &Selection::default(), 20);

        let written = write_dashboard(&out, &dash).unwrap();
        assert_eq!(written.len(), 6);
        assert!(written.iter().all(|p| p.is_file()));

        let monthly = std::fs::read_to_string(out.join("monthly_average.csv")).unwrap();
        let lines: Vec<&str> = monthly.lines().collect();
        assert_eq!(lines[0], "Month,Avg Transactions");
        assert_eq!(lines[1], "Sep,6.0");
        assert_eq!(lines[6], "Feb,23.5");

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("dashboard.json")).unwrap()).unwrap();
        assert_eq!(json["summary"]["agents_in_view"], 2);
        assert_eq!(json["gender_ratio"]["kind"], "pie");
    }

    #[test]
    fn missing_average_writes_an_empty_field() {
        let dir = TempDir::new().unwrap();
        let mut agents = two_agents();
        for a in &mut agents {
            a.monthly[1] = None;
        }
        let source = SourceTables::new(agents).unwrap();
        let dash = build(&source, &Selection::default(), 20);
        write_dashboard(dir.path(), &dash).unwrap();

        let monthly = std::fs::read_to_string(dir.path().join("monthly_average.csv")).unwrap();
        assert_eq!(monthly.lines().nth(2), Some("Oct,"));
    }

    #[test]
    fn empty_view_still_writes_headers() {
        let dir = TempDir::new().unwrap();
        let source = SourceTables::new(two_agents()).unwrap();
        let sel = Selection {
            genders: vec![],
            regions: vec!["Nowhere".into()],
        };
        let dash = build(&source, &sel, 20);
        assert_eq!(dash.summary.agents_in_view, 0);
        write_dashboard(dir.path(), &dash).unwrap();

        let read = |name: &str| std::fs::read_to_string(dir.path().join(name)).unwrap();
        let expected = [
            (
                "productivity_heatmap.csv",
                "LongitudeFrom,LongitudeTo,LatitudeFrom,LatitudeTo,Agents,Productivity",
            ),
            ("active_status.csv", "Category,Count"),
            ("gender_ratio.csv", "Category,Count"),
            ("region_trend.csv", "Month,Region,Transactions"),
        ];
        for (name, header) in expected {
            let body = read(name);
            let lines: Vec<&str> = body.lines().collect();
            assert_eq!(lines, vec![header], "{name}");
        }

        let monthly = read("monthly_average.csv");
        let lines: Vec<&str> = monthly.lines().collect();
        assert_eq!(lines[0], "Month,Avg Transactions");
        assert_eq!(lines[1], "Sep,");
        assert_eq!(lines.len(), 7);
    }
}
