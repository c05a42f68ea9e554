use crate::aggregate::Summary;
use crate::config::ReportConfig;
use crate::dataset::Dataset;
use crate::features::GameRow;

const PREVIEW_HEADERS: [&str; 9] = [
    "MATCH DATE",
    "TOURNAMENT ID",
    "TOURNAMENT NAME",
    "MATCH ID",
    "SURFACE",
    "WON SERVE",
    "MONTH",
    "hold",
    "is_service_game",
];

// Longest cell text shown in the preview table before it is cut.
const PREVIEW_CELL_MAX: usize = 28;

pub fn format_percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

pub fn format_fraction(rate: f64) -> String {
    format!("{rate:.3}")
}

pub fn display_label(label: &str) -> &str {
    if label.is_empty() { "(blank)" } else { label }
}

/// Builds the full text report in the order the analysis runs.
pub fn render_report(
    dataset: &Dataset,
    rows: &[GameRow],
    summary: &Summary,
    cfg: &ReportConfig,
) -> String {
    let mut lines = Vec::new();

    lines.push("Data loaded successfully!".to_string());
    lines.push(format!(
        "Source: {} (sheet '{}')",
        dataset.source.display(),
        dataset.sheet
    ));
    if cfg.preview_rows > 0 {
        lines.push(String::new());
        lines.push(format!(
            "First {} rows of the dataset:",
            cfg.preview_rows.min(rows.len())
        ));
        lines.extend(preview_table(rows, cfg.preview_rows));
    }
    lines.push(String::new());
    lines.push("Columns in the dataset:".to_string());
    lines.extend(column_list(
        &dataset.columns,
        cfg.display_width,
        cfg.max_columns,
    ));

    lines.push(String::new());
    lines.push("--- BASIC STRUCTURE ---".to_string());
    lines.push(format!(
        "Total rows (roughly individual games): {}",
        summary.row_count
    ));
    lines.push(format!("Number of tournaments: {}", summary.tournament_count));
    lines.push(format!("Number of matches: {}", summary.match_count));
    lines.push(String::new());
    lines.push("Games by surface:".to_string());
    let surface_width = label_width(summary.surface_counts.iter().map(|s| s.surface.as_str()));
    for item in &summary.surface_counts {
        lines.push(format!(
            "  {:<surface_width$}  {:>8}",
            display_label(&item.surface),
            item.games
        ));
    }

    lines.push(String::new());
    lines.push("--- SERVE PERFORMANCE ---".to_string());
    lines.push(format!(
        "Total service games in dataset: {}",
        summary.service_game_count
    ));
    lines.push(format!(
        "Overall hold percentage: {}",
        summary
            .overall_hold_rate
            .map(format_percent)
            .unwrap_or_else(|| "no data".to_string())
    ));
    lines.push(String::new());
    lines.push("Hold percentage by surface:".to_string());
    if summary.hold_rate_by_surface.is_empty() {
        lines.push("  no data".to_string());
    }
    let rate_width = label_width(
        summary
            .hold_rate_by_surface
            .iter()
            .map(|s| s.surface.as_str()),
    );
    for item in &summary.hold_rate_by_surface {
        lines.push(format!(
            "  {:<rate_width$}  {:>6}  ({} = {}/{})",
            display_label(&item.surface),
            format_percent(item.rate),
            format_fraction(item.rate),
            item.held,
            item.service_games
        ));
    }

    lines.push(String::new());
    lines.push("--- GAMES PER MONTH ---".to_string());
    if summary.games_per_month.is_empty() {
        lines.push("  no dated rows".to_string());
    }
    for item in &summary.games_per_month {
        lines.push(format!("  {}  {:>8}", item.month, item.games));
    }
    if summary.undated_rows > 0 {
        lines.push(format!(
            "  ({} rows without a usable match date are not counted)",
            summary.undated_rows
        ));
    }

    lines.push(String::new());
    lines.push("--- INSIGHT QUESTIONS ---".to_string());
    lines.push(String::new());
    lines.push(format!(
        "Top {} tournaments by number of game-rows:",
        summary.top_tournaments.len()
    ));
    let id_width = label_width(
        summary
            .top_tournaments
            .iter()
            .map(|t| t.tournament_id.as_str()),
    )
    .max("TOURNAMENT ID".len());
    let name_width = label_width(
        summary
            .top_tournaments
            .iter()
            .map(|t| t.tournament_name.as_str()),
    )
    .max("TOURNAMENT NAME".len());
    lines.push(format!(
        "  {:<id_width$}  {:<name_width$}  {:>13}",
        "TOURNAMENT ID", "TOURNAMENT NAME", "NUM_GAME_ROWS"
    ));
    for item in &summary.top_tournaments {
        lines.push(format!(
            "  {:<id_width$}  {:<name_width$}  {:>13}",
            display_label(&item.tournament_id),
            display_label(&item.tournament_name),
            item.games
        ));
    }

    lines.push(String::new());
    lines.push("Text summary of serve strength by surface:".to_string());
    for item in &summary.hold_rate_by_surface {
        lines.push(format!(
            "- On {}, players hold serve about {} of the time.",
            display_label(&item.surface),
            format_percent(item.rate)
        ));
    }

    lines.join("\n")
}

pub fn render_json(summary: &Summary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels
        .map(|label| display_label(label).chars().count())
        .max()
        .unwrap_or(0)
}

fn preview_table(rows: &[GameRow], limit: usize) -> Vec<String> {
    let cells = rows
        .iter()
        .take(limit)
        .map(|row| {
            [
                row.match_date.map(|d| d.to_string()).unwrap_or_default(),
                row.tournament_id.clone(),
                row.tournament_name.clone(),
                row.match_id.clone(),
                row.surface.clone(),
                row.serve_outcome.clone(),
                row.month.map(|m| m.to_string()).unwrap_or_default(),
                u8::from(row.held_serve).to_string(),
                u8::from(row.is_service_game).to_string(),
            ]
            .map(|cell| clip(&cell, PREVIEW_CELL_MAX))
        })
        .collect::<Vec<_>>();

    let mut widths = PREVIEW_HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |values: &[&str]| {
        values
            .iter()
            .zip(widths.iter())
            .map(|(value, &width)| format!("{value:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![format_line(&PREVIEW_HEADERS)];
    for row in &cells {
        let values = row.iter().map(String::as_str).collect::<Vec<_>>();
        out.push(format_line(&values));
    }
    out
}

fn clip(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut out = value.chars().take(max.saturating_sub(1)).collect::<String>();
    out.push('…');
    out
}

/// Column names joined with commas and wrapped at `width`, listing at most
/// `max_columns` of them.
fn column_list(columns: &[String], width: usize, max_columns: usize) -> Vec<String> {
    let mut items = columns
        .iter()
        .take(max_columns)
        .map(|c| format!("'{c}'"))
        .collect::<Vec<_>>();
    if columns.len() > max_columns {
        items.push(format!("... (+{} more)", columns.len() - max_columns));
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for (idx, item) in items.iter().enumerate() {
        let piece = if idx + 1 < items.len() {
            format!("{item},")
        } else {
            item.clone()
        };
        if !current.is_empty() && current.chars().count() + 1 + piece.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&piece);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
