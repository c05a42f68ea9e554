use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

use wta_points::analyze;
use wta_points::dataset::{DateCell, load_dataset};
use wta_points::error::LoadError;
use wta_points::features::YearMonth;

enum Cell {
    Text(&'static str),
    Number(f64),
    Date(u16, u8, u8),
    Blank,
}

fn temp_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("wta_points_{}_{name}.xlsx", std::process::id()));
    path
}

fn write_workbook(name: &str, header: &[&str], rows: &[Vec<Cell>]) -> PathBuf {
    let path = temp_path(name);
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet
        .write_string(0, 0, "2024 WTA Women Points Dataset")
        .expect("banner should write");
    for (col, name) in header.iter().enumerate() {
        sheet
            .write_string(1, col as u16, *name)
            .expect("header should write");
    }
    for (idx, row) in rows.iter().enumerate() {
        let r = idx as u32 + 2;
        for (col, cell) in row.iter().enumerate() {
            let c = col as u16;
            match cell {
                Cell::Text(value) => {
                    sheet.write_string(r, c, *value).expect("text should write");
                }
                Cell::Number(value) => {
                    sheet.write_number(r, c, *value).expect("number should write");
                }
                Cell::Date(y, m, d) => {
                    let date = ExcelDateTime::from_ymd(*y, *m, *d).expect("valid date");
                    sheet
                        .write_datetime_with_format(r, c, &date, &date_format)
                        .expect("date should write");
                }
                Cell::Blank => {}
            }
        }
    }
    workbook.save(&path).expect("workbook should save");
    path
}

const HEADER: &[&str] = &[
    "MATCH DATE",
    "TOURNAMENT ID",
    "TOURNAMENT NAME",
    "MATCH ID",
    "SURFACE",
    "SERVER",
    "WON SERVE",
];

fn game(
    date: Cell,
    tid: f64,
    tname: &'static str,
    mid: f64,
    surface: &'static str,
    outcome: &'static str,
) -> Vec<Cell> {
    vec![
        date,
        Cell::Number(tid),
        Cell::Text(tname),
        Cell::Number(mid),
        Cell::Text(surface),
        Cell::Text("Player"),
        Cell::Text(outcome),
    ]
}

#[test]
fn loads_rows_below_banner_and_header() {
    let path = write_workbook(
        "basic",
        HEADER,
        &[
            game(Cell::Date(2024, 1, 2), 520.0, "Brisbane", 1001.0, "Hard", "WON"),
            game(Cell::Date(2024, 1, 2), 520.0, "Brisbane", 1001.0, "Hard", "LOST"),
            game(Cell::Text("2024-04-08"), 1038.0, "Charleston", 2001.0, "Clay", "WON"),
            game(Cell::Text("unknown"), 1038.0, "Charleston", 2002.0, "Clay", "N/A"),
        ],
    );

    let dataset = load_dataset(&path).expect("workbook should load");
    fs::remove_file(&path).ok();

    assert_eq!(
        dataset.columns,
        HEADER.iter().map(|s| s.to_string()).collect::<Vec<_>>()
    );
    assert_eq!(dataset.rows.len(), 4);

    let first = &dataset.rows[0];
    assert!(matches!(first.match_date, DateCell::Serial(_)));
    assert_eq!(first.tournament_id, "520");
    assert_eq!(first.match_id, "1001");
    assert_eq!(first.tournament_name, "Brisbane");
    assert_eq!(first.won_serve, "WON");
    assert_eq!(
        dataset.rows[2].match_date,
        DateCell::Text("2024-04-08".to_string())
    );
}

#[test]
fn analyze_runs_the_whole_pipeline() {
    let path = write_workbook(
        "pipeline",
        HEADER,
        &[
            game(Cell::Date(2024, 1, 2), 520.0, "Brisbane", 1001.0, "Hard", "WON"),
            game(Cell::Date(2024, 1, 2), 520.0, "Brisbane", 1001.0, "Hard", "LOST"),
            game(Cell::Date(2024, 4, 8), 1038.0, "Charleston", 2001.0, "Clay", "WON"),
            // Empty sheet row inside the used range, followed by more data.
            vec![Cell::Blank, Cell::Blank, Cell::Blank],
            game(Cell::Text("unknown"), 1038.0, "Charleston", 2002.0, "Clay", "N/A"),
        ],
    );

    let analysis = analyze(&path, 10).expect("pipeline should run");
    fs::remove_file(&path).ok();

    assert_eq!(
        analysis.rows[0].match_date,
        NaiveDate::from_ymd_opt(2024, 1, 2)
    );
    assert_eq!(analysis.dataset.rows.len(), 4);
    assert_eq!(analysis.rows[3].match_id, "2002");
    assert_eq!(analysis.rows[3].month, None);

    let summary = &analysis.summary;
    assert_eq!(summary.row_count, 4);
    assert_eq!(summary.tournament_count, 2);
    assert_eq!(summary.match_count, 3);
    assert_eq!(summary.service_game_count, 3);
    assert_eq!(summary.undated_rows, 1);
    assert_eq!(summary.games_per_month.len(), 2);
    assert_eq!(
        summary.games_per_month[0].month,
        YearMonth { year: 2024, month: 1 }
    );
    assert_eq!(summary.hold_rate_by_surface[0].surface, "Clay");
    assert_eq!(summary.top_tournaments[0].tournament_name, "Brisbane");
}

#[test]
fn missing_columns_are_listed() {
    let path = write_workbook(
        "missing_cols",
        &["MATCH DATE", "MATCH ID", "SURFACE"],
        &[vec![Cell::Date(2024, 1, 2), Cell::Number(1.0), Cell::Text("Hard")]],
    );

    let err = load_dataset(&path).expect_err("header lacks columns");
    fs::remove_file(&path).ok();

    match err {
        LoadError::MissingColumns { missing, .. } => {
            assert_eq!(missing, vec!["TOURNAMENT ID", "TOURNAMENT NAME", "WON SERVE"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn header_on_first_row_is_rejected() {
    // The real header has to sit on the second row; here it is the banner.
    let path = temp_path("header_first");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in HEADER.iter().enumerate() {
        sheet.write_string(0, col as u16, *name).expect("header should write");
    }
    sheet.write_string(1, 0, "2024-01-02").expect("row should write");
    sheet.write_string(1, 6, "WON").expect("row should write");
    workbook.save(&path).expect("workbook should save");

    let err = load_dataset(&path).expect_err("first data row is not a header");
    fs::remove_file(&path).ok();
    assert!(matches!(err, LoadError::MissingColumns { .. }));
}

#[test]
fn missing_file_is_a_load_error() {
    let path = temp_path("does_not_exist");
    let err = load_dataset(&path).expect_err("file is absent");
    assert!(matches!(err, LoadError::NotFound(_)));
    assert!(err.to_string().contains("not found"));
}

#[test]
fn corrupt_file_is_a_load_error() {
    let path = temp_path("corrupt");
    fs::write(&path, b"this is not a spreadsheet").expect("temp file should write");
    let err = load_dataset(&path).expect_err("bytes are not a workbook");
    fs::remove_file(&path).ok();
    assert!(matches!(err, LoadError::Open { .. }));
}
