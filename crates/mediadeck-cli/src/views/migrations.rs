//! Database migration history.
//!
//! The server sorts versions lexicographically, which puts "10" before
//! "9"; when sorting by version the view re-sorts numerically after the
//! fetch.

use mediadeck_client::ConsoleApi;
use mediadeck_core::{Record, RecordPage, SortOrder};

use crate::display;
use crate::shell::{CommandInput, Outcome, View, ViewState};

const HELP: &str = "\
commands:
  refresh | r                                  refetch the history
  sort <version|installed_rank|installed_on> [asc|desc]
  quit";

const SORT_COLUMNS: &[&str] = &["version", "installed_rank", "installed_on"];

pub struct MigrationsView {
    sort_by: String,
    sort_order: SortOrder,
    page: Option<RecordPage>,
    state: ViewState,
}

impl MigrationsView {
    pub fn new() -> Self {
        Self {
            sort_by: "version".to_string(),
            sort_order: SortOrder::Desc,
            page: None,
            state: ViewState::Idle,
        }
    }

    async fn refresh(&mut self, api: &mut ConsoleApi) {
        self.state = ViewState::Loading;
        match api.migrations(&self.sort_by, self.sort_order).await {
            Ok(mut page) => {
                if self.sort_by == "version" {
                    sort_by_version(&mut page.records, self.sort_order);
                }
                self.page = Some(page);
                self.state = ViewState::Displaying;
            }
            Err(err) => self.state = ViewState::Error(display::error_banner(&err)),
        }
    }

    fn render_page(&self, page: &RecordPage) {
        println!(
            "GET flyway/?sort_by={}&sort_order={}",
            self.sort_by, self.sort_order
        );
        display::render_table(page, display::MIGRATION_COLUMNS);
        println!("total migrations: {}", page.len());
    }
}

/// Numeric version ordering: `"10"` sorts after `"9"`, `"2.1"` between
/// `"2"` and `"3"`. Unparseable versions sort first.
fn sort_by_version(records: &mut [Record], order: SortOrder) {
    records.sort_by(|a, b| {
        let cmp = version_key(a).total_cmp(&version_key(b));
        match order {
            SortOrder::Asc => cmp,
            SortOrder::Desc => cmp.reverse(),
        }
    });
}

fn version_key(record: &Record) -> f64 {
    match record.get("version") {
        Some(value) => value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
            .unwrap_or(0.0),
        None => 0.0,
    }
}

impl View for MigrationsView {
    fn name(&self) -> &'static str {
        "migrations"
    }

    fn help(&self) -> &'static str {
        HELP
    }

    async fn init(&mut self, api: &mut ConsoleApi) {
        self.refresh(api).await;
    }

    async fn handle(&mut self, api: &mut ConsoleApi, input: &CommandInput<'_>) -> Outcome {
        match input.command {
            "refresh" | "r" => {
                self.refresh(api).await;
                Outcome::Redraw
            }
            "sort" => {
                let Some(column) = input.arg(0) else {
                    println!("usage: sort <{}> [asc|desc]", SORT_COLUMNS.join("|"));
                    return Outcome::Quiet;
                };
                if !SORT_COLUMNS.contains(&column) {
                    println!("sortable columns: {}", SORT_COLUMNS.join(", "));
                    return Outcome::Quiet;
                }
                if let Some(order) = input.arg(1) {
                    match order.parse::<SortOrder>() {
                        Ok(order) => self.sort_order = order,
                        Err(err) => {
                            println!("{err}");
                            return Outcome::Quiet;
                        }
                    }
                }
                self.sort_by = column.to_string();
                self.refresh(api).await;
                Outcome::Redraw
            }
            _ => Outcome::Unknown,
        }
    }

    fn render(&self) {
        match &self.state {
            ViewState::Error(banner) => {
                println!("{banner}");
                if let Some(page) = &self.page {
                    println!("(showing previously fetched history)");
                    self.render_page(page);
                }
            }
            ViewState::Displaying => match &self.page {
                Some(page) if page.is_empty() => println!("no migrations found"),
                Some(page) => self.render_page(page),
                None => println!("no data loaded; `refresh` to fetch"),
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::testutil::refused_api;
    use serde_json::json;

    fn migrations(versions: &[&str]) -> Vec<Record> {
        versions
            .iter()
            .map(|v| Record::from_value(json!({"version": v, "success": true})).unwrap())
            .collect()
    }

    fn versions(records: &[Record]) -> Vec<&str> {
        records
            .iter()
            .filter_map(|r| r.str_field("version"))
            .collect()
    }

    #[test]
    fn version_sort_is_numeric_not_lexicographic() {
        let mut records = migrations(&["10", "9", "2.1", "1"]);
        sort_by_version(&mut records, SortOrder::Asc);
        assert_eq!(versions(&records), ["1", "2.1", "9", "10"]);

        sort_by_version(&mut records, SortOrder::Desc);
        assert_eq!(versions(&records), ["10", "9", "2.1", "1"]);
    }

    #[test]
    fn numeric_json_versions_sort_too() {
        let mut records = vec![
            Record::from_value(json!({"version": 10})).unwrap(),
            Record::from_value(json!({"version": "9"})).unwrap(),
        ];
        sort_by_version(&mut records, SortOrder::Asc);
        assert_eq!(records[0].str_field("version"), Some("9"));
    }

    #[tokio::test]
    async fn sort_command_rejects_unknown_columns() {
        let mut api = refused_api();
        let mut view = MigrationsView::new();
        let input = CommandInput::parse("sort description").unwrap();
        view.handle(&mut api, &input).await;
        assert_eq!(view.sort_by, "version", "unknown column is ignored");
    }

    #[tokio::test]
    async fn sort_command_updates_state() {
        let mut api = refused_api();
        let mut view = MigrationsView::new();
        let input = CommandInput::parse("sort installed_on asc").unwrap();
        view.handle(&mut api, &input).await;
        assert_eq!(view.sort_by, "installed_on");
        assert_eq!(view.sort_order, SortOrder::Asc);
    }
}
