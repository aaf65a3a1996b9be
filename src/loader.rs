use crate::error::{DashboardError, Result};
use crate::types::{AgentRecord, Month, RawRow, ATTRIBUTE_COLUMNS};
use crate::util::{clean_text, parse_f64_safe};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    /// Numeric cells that held text and were read as missing.
    pub coerced_cells: usize,
}

/// Load the agent sheet from a spreadsheet or a CSV export.
///
/// The format is picked from the file extension; `sheet` is ignored for CSV.
pub fn load_agents(path: &Path, sheet: &str) -> Result<(Vec<AgentRecord>, LoadReport)> {
    if !path.is_file() {
        return Err(DashboardError::MissingFile(path.to_path_buf()));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let (agents, report) = match ext.as_str() {
        "csv" => load_csv(path)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path, sheet)?,
        other => return Err(DashboardError::UnsupportedFormat(other.to_string())),
    };
    info!(
        path = %path.display(),
        rows = report.total_rows,
        loaded = report.loaded_rows,
        parse_errors = report.parse_errors,
        coerced_cells = report.coerced_cells,
        "source table loaded"
    );
    Ok((agents, report))
}

/// Every required header must be present; extra headers are fine.
fn check_headers<'a, I>(headers: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let present: Vec<&str> = headers.into_iter().map(str::trim).collect();
    let months = Month::columns();
    for required in ATTRIBUTE_COLUMNS.iter().chain(months.iter()) {
        if !present.contains(required) {
            return Err(DashboardError::MissingColumn(required.to_string()));
        }
    }
    Ok(())
}

fn load_csv(path: &Path) -> Result<(Vec<AgentRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;
    check_headers(rdr.headers()?.iter())?;

    let mut report = LoadReport::default();
    let mut agents = Vec::new();
    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(row = report.total_rows, error = %e, "skipping malformed row");
                report.parse_errors += 1;
                continue;
            }
        };
        agents.push(clean_row(row, &mut report));
    }
    report.loaded_rows = agents.len();
    Ok((agents, report))
}

fn load_workbook(path: &Path, sheet: &str) -> Result<(Vec<AgentRecord>, LoadReport)> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names();
    if !names.iter().any(|n| n == sheet) {
        return Err(DashboardError::MissingSheet {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
            available: names.join(", "),
        });
    }
    let range = workbook.worksheet_range(sheet)?;
    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(h) => h.iter().map(|c| cell_text(c).unwrap_or_default()).collect(),
        None => return Err(DashboardError::EmptySheet(sheet.to_string())),
    };
    check_headers(headers.iter().map(String::as_str))?;

    let mut report = LoadReport::default();
    let mut agents = Vec::new();
    for cells in rows {
        if cells.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        report.total_rows += 1;
        let mut row = RawRow::default();
        for (header, cell) in headers.iter().zip(cells) {
            row.set(header, cell_text(cell));
        }
        agents.push(clean_row(row, &mut report));
    }
    report.loaded_rows = agents.len();
    Ok((agents, report))
}

/// Render a spreadsheet cell as text, the form `RawRow` carries.
///
/// Whole floats print without a fractional part so a numeric `Active` flag
/// reads `1` rather than `1.0`; booleans use the `True`/`False` spelling.
pub fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => clean_text(Some(s.clone())),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(true) => Some("True".to_string()),
        Data::Bool(false) => Some("False".to_string()),
        other => Some(other.to_string()),
    }
}

fn numeric(value: Option<&str>, report: &mut LoadReport) -> Option<f64> {
    let parsed = parse_f64_safe(value);
    if parsed.is_none() && value.is_some_and(|v| !v.trim().is_empty()) {
        report.coerced_cells += 1;
    }
    parsed
}

fn clean_row(row: RawRow, report: &mut LoadReport) -> AgentRecord {
    let mut monthly = [None; 6];
    for month in Month::ALL {
        monthly[month.index()] = numeric(row.month_value(month), report);
    }
    let longitude = numeric(row.sim_longitude.as_deref(), report);
    let latitude = numeric(row.sim_latitude.as_deref(), report);
    let average_productivity = numeric(row.average_productivity.as_deref(), report);

    let user_name = clean_text(row.user_name).unwrap_or_default();
    if user_name.is_empty() {
        warn!(row = report.total_rows, "agent row without UserName");
    }

    AgentRecord {
        user_name,
        gender: clean_text(row.gender),
        region: clean_text(row.region),
        longitude,
        latitude,
        average_productivity,
        active: clean_text(row.active),
        monthly,
    }
}
