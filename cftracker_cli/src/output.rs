use std::io::Write;

use anyhow::Result;
use cftracker_lib::report::{CellHint, Report, ReportRow};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::object::Cell;
use tabled::settings::Color;
use tabled::Table;

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Serialize)]
struct ProblemJson<'a> {
    index: &'a str,
    rating: Option<i64>,
    solve_time_seconds: Option<i64>,
    verdict: &'static str,
    hint: CellHint,
}

#[derive(Serialize)]
struct ReportRowJson<'a> {
    contest_id: &'a str,
    contest: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    date: String,
    time: String,
    rank: i64,
    rating: Option<i64>,
    rating_change: Option<i64>,
    title: Option<&'static str>,
    problems: Vec<ProblemJson<'a>>,
    upsolved: usize,
    rank_trend: String,
    correctness: String,
    same_level: String,
    higher_level: String,
    speed: String,
}

// -- Row builders --

/// Column titles matching [`ReportRow::cells`].
pub fn report_header(problem_columns: usize) -> Vec<String> {
    let mut header: Vec<String> = [
        "Contest", "Type", "Date", "Time", "Rank", "Rating", "Change", "Title",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    header.extend((1..=problem_columns).map(|i| format!("P{}", i)));
    header.extend(
        [
            "Upsolved",
            "Rank trend",
            "Correctness",
            "Same level",
            "Higher level",
            "Speed",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    header
}

fn build_json_rows(rows: &[ReportRow]) -> Vec<ReportRowJson<'_>> {
    rows.iter()
        .map(|r| ReportRowJson {
            contest_id: &r.contest_id,
            contest: &r.contest_name,
            kind: r.kind.label(),
            date: r.date(),
            time: r.time(),
            rank: r.rank,
            rating: r.new_rating,
            rating_change: r.rating_change,
            title: r.rating_title(),
            problems: r
                .problems
                .iter()
                .map(|p| ProblemJson {
                    index: &p.index,
                    rating: p.rating,
                    solve_time_seconds: p.solve_time,
                    verdict: p.verdict.symbol(),
                    hint: p.hint(),
                })
                .collect(),
            upsolved: r.upsolved,
            rank_trend: r.rank_trend_text(),
            correctness: r.correctness_text(),
            same_level: r.same_level.to_string(),
            higher_level: r.higher_level.to_string(),
            speed: r.speed.to_string(),
        })
        .collect()
}

fn hint_color(hint: CellHint) -> Color {
    match hint {
        CellHint::Rated => Color::FG_CYAN,
        CellHint::Virtual => Color::FG_YELLOW,
        CellHint::RatingGain | CellHint::Solved => Color::FG_GREEN,
        CellHint::RatingLoss | CellHint::Failed => Color::FG_RED,
        CellHint::Untouched => Color::FG_WHITE,
    }
}

fn build_report_table(report: &Report) -> Table {
    let columns = report.problem_columns;
    let mut builder = Builder::default();
    builder.push_record(report_header(columns));
    for row in &report.rows {
        builder.push_record(row.cells(columns));
    }
    let mut table = builder.build();

    for (i, row) in report.rows.iter().enumerate() {
        for (j, hint) in row.hints(columns).into_iter().enumerate() {
            if let Some(hint) = hint {
                // Record 0 is the header.
                table.modify(Cell::new(i + 1, j), hint_color(hint));
            }
        }
    }
    table
}

// -- Output --

pub fn print_report_table(report: &Report) {
    println!("{}", build_report_table(report));
}

pub fn print_report_json(report: &Report) {
    print_json(&build_json_rows(&report.rows));
}

pub fn print_report_csv(report: &Report) -> Result<()> {
    write_report_csv(report, std::io::stdout())
}

fn write_report_csv<W: Write>(report: &Report, out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(report_header(report.problem_columns))?;
    for row in &report.rows {
        wtr.write_record(row.cells(report.problem_columns))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cftracker_lib::analytics::{
        Movement, Percentile, ProblemVerdict, RankTrend, SpeedVerdict,
    };
    use cftracker_lib::report::{ParticipationKind, ProblemCell};

    fn sample_report() -> Report {
        let row = ReportRow {
            contest_id: "1900".into(),
            contest_name: "Codeforces Round 911 (Div. 2)".into(),
            kind: ParticipationKind::Rated,
            start_time: 1_701_095_700,
            rank: 2210,
            new_rating: Some(1431),
            rating_change: Some(-21),
            problems: vec![
                ProblemCell {
                    index: "A".into(),
                    rating: Some(800),
                    verdict: ProblemVerdict::Solved,
                    solve_time: Some(540),
                    attempted: true,
                },
                ProblemCell {
                    index: "B".into(),
                    rating: Some(900),
                    verdict: ProblemVerdict::Failed,
                    solve_time: None,
                    attempted: true,
                },
            ],
            upsolved: 1,
            rank_trend: Some(RankTrend {
                within_target: false,
                movement: Some(Movement::Worsened),
            }),
            correctness: vec![ProblemVerdict::Solved, ProblemVerdict::Failed],
            same_level: Percentile::BetterThan(50),
            higher_level: Percentile::NotApplicable,
            speed: SpeedVerdict::Neutral,
        };
        Report {
            rows: vec![row],
            problem_columns: 3,
        }
    }

    #[test]
    fn header_lines_up_with_cells() {
        let report = sample_report();
        let header = report_header(report.problem_columns);
        assert_eq!(header.len(), report.rows[0].cells(3).len());
        assert_eq!(header[8], "P1");
        assert_eq!(header[11], "Upsolved");
    }

    #[test]
    fn json_rows_carry_display_fields() {
        let report = sample_report();
        let rows = build_json_rows(&report.rows);
        let value = serde_json::to_value(&rows).unwrap();

        let row = &value[0];
        assert_eq!(row["type"], "Rated");
        assert_eq!(row["date"], "27/11/2023");
        assert_eq!(row["rating_change"], -21);
        assert_eq!(row["title"], "Specialist");
        assert_eq!(row["problems"][0]["hint"], "solved");
        assert_eq!(row["problems"][1]["hint"], "failed");
        assert_eq!(row["same_level"], "better than 50%");
        assert_eq!(row["higher_level"], "N/A");
    }

    #[test]
    fn csv_has_header_and_padded_problem_cells() {
        let report = sample_report();
        let mut buf = Vec::new();
        write_report_csv(&report, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert!(lines.next().unwrap().starts_with("Contest,Type,Date"));
        let data = lines.next().unwrap();
        assert!(data.contains("800 (09:00),900,,1,"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn table_renders_every_row() {
        let rendered = build_report_table(&sample_report()).to_string();
        assert!(rendered.contains("Codeforces Round 911"));
        assert!(rendered.contains("Rank trend"));
    }
}
