use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::features::{GameRow, YearMonth};

pub const DEFAULT_TOP_TOURNAMENTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceCount {
    pub surface: String,
    pub games: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceHoldRate {
    pub surface: String,
    pub held: usize,
    pub service_games: usize,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthCount {
    pub month: YearMonth,
    pub games: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentCount {
    pub tournament_id: String,
    pub tournament_name: String,
    pub games: usize,
}

/// Every aggregate the report and charts read, computed in one place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub row_count: usize,
    pub tournament_count: usize,
    pub match_count: usize,
    pub surface_counts: Vec<SurfaceCount>,
    pub service_game_count: usize,
    pub held_count: usize,
    pub overall_hold_rate: Option<f64>,
    pub hold_rate_by_surface: Vec<SurfaceHoldRate>,
    pub games_per_month: Vec<MonthCount>,
    pub undated_rows: usize,
    pub top_tournaments: Vec<TournamentCount>,
}

impl Summary {
    pub fn compute(rows: &[GameRow], top_limit: usize) -> Self {
        let service = service_rows(rows);
        Self {
            row_count: row_count(rows),
            tournament_count: tournament_count(rows),
            match_count: match_count(rows),
            surface_counts: surface_counts(rows),
            service_game_count: service.len(),
            held_count: service.iter().filter(|row| row.held_serve).count(),
            overall_hold_rate: overall_hold_rate(rows),
            hold_rate_by_surface: hold_rate_by_surface(rows),
            games_per_month: games_per_month(rows),
            undated_rows: rows.iter().filter(|row| row.month.is_none()).count(),
            top_tournaments: top_tournaments(rows, top_limit),
        }
    }
}

pub fn row_count(rows: &[GameRow]) -> usize {
    rows.len()
}

/// Distinct non-blank tournament ids.
pub fn tournament_count(rows: &[GameRow]) -> usize {
    distinct_non_blank(rows.iter().map(|row| row.tournament_id.as_str()))
}

/// Distinct non-blank match ids.
pub fn match_count(rows: &[GameRow]) -> usize {
    distinct_non_blank(rows.iter().map(|row| row.match_id.as_str()))
}

fn distinct_non_blank<'a>(values: impl Iterator<Item = &'a str>) -> usize {
    values
        .filter(|value| !value.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

/// Rows per surface, most games first. Equal counts keep first-seen order.
pub fn surface_counts(rows: &[GameRow]) -> Vec<SurfaceCount> {
    let mut out: Vec<SurfaceCount> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        let idx = *slot.entry(row.surface.as_str()).or_insert_with(|| {
            out.push(SurfaceCount {
                surface: row.surface.clone(),
                games: 0,
            });
            out.len() - 1
        });
        out[idx].games += 1;
    }
    out.sort_by(|a, b| b.games.cmp(&a.games));
    out
}

pub fn service_rows(rows: &[GameRow]) -> Vec<&GameRow> {
    rows.iter().filter(|row| row.is_service_game).collect()
}

/// Share of service games held; `None` when there are no service games.
pub fn overall_hold_rate(rows: &[GameRow]) -> Option<f64> {
    let (held, total) = rows
        .iter()
        .filter(|row| row.is_service_game)
        .fold((0usize, 0usize), |(held, total), row| {
            (held + usize::from(row.held_serve), total + 1)
        });
    (total > 0).then(|| held as f64 / total as f64)
}

/// Hold rate per surface over service games, highest first. Surfaces with
/// equal rates stay in label order.
pub fn hold_rate_by_surface(rows: &[GameRow]) -> Vec<SurfaceHoldRate> {
    let mut groups: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for row in rows.iter().filter(|row| row.is_service_game) {
        let entry = groups.entry(row.surface.as_str()).or_insert((0, 0));
        entry.0 += usize::from(row.held_serve);
        entry.1 += 1;
    }

    let mut out = groups
        .into_iter()
        .map(|(surface, (held, service_games))| SurfaceHoldRate {
            surface: surface.to_string(),
            held,
            service_games,
            rate: held as f64 / service_games as f64,
        })
        .collect::<Vec<_>>();
    out.sort_by(|a, b| b.rate.total_cmp(&a.rate));
    out
}

/// Rows per calendar month in chronological order. Undated rows are left out.
pub fn games_per_month(rows: &[GameRow]) -> Vec<MonthCount> {
    let mut months: BTreeMap<YearMonth, usize> = BTreeMap::new();
    for month in rows.iter().filter_map(|row| row.month) {
        *months.entry(month).or_default() += 1;
    }
    months
        .into_iter()
        .map(|(month, games)| MonthCount { month, games })
        .collect()
}

/// Tournaments with the most rows, at most `limit` of them. Equal counts
/// keep the order in which tournaments first appear.
pub fn top_tournaments(rows: &[GameRow], limit: usize) -> Vec<TournamentCount> {
    let mut out: Vec<TournamentCount> = Vec::new();
    let mut slot: HashMap<(&str, &str), usize> = HashMap::new();
    for row in rows {
        let key = (row.tournament_id.as_str(), row.tournament_name.as_str());
        let idx = *slot.entry(key).or_insert_with(|| {
            out.push(TournamentCount {
                tournament_id: row.tournament_id.clone(),
                tournament_name: row.tournament_name.clone(),
                games: 0,
            });
            out.len() - 1
        });
        out[idx].games += 1;
    }
    out.sort_by(|a, b| b.games.cmp(&a.games));
    out.truncate(limit);
    out
}
