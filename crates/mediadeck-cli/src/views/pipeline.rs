//! Pipeline status management.
//!
//! Search for media items by hash or title, select one, then move it
//! through the pipeline or apply a maintenance action. Destructive
//! actions require an explicit `confirm`.

use mediadeck_client::{ClientError, ConsoleApi};
use mediadeck_core::{ListQuery, PipelineStatus, Record, RecordPage};

use crate::display;
use crate::shell::{CommandInput, Outcome, View, ViewState};

const HELP: &str = "\
commands:
  find hash <hash>       search by content hash
  find title <term>      search by title
  select <row>           focus one search result
  show                   card for the focused item
  status <stage>         set the focused item's pipeline status
  promote                clear errors, back onto the download path
  finish                 mark complete and release the transfer
  delete confirm         soft-delete the focused item
  back                   drop the focus
  refresh | r            rerun the current search
  quit

pipeline stages:
  ingested paused parsed rejected file_accepted metadata_collected
  media_accepted downloading downloaded transferred complete";

pub struct PipelineView {
    query: ListQuery,
    results: Option<RecordPage>,
    selected: Option<usize>,
    state: ViewState,
}

impl PipelineView {
    pub fn new() -> Self {
        Self {
            query: ListQuery::new(),
            results: None,
            selected: None,
            state: ViewState::Idle,
        }
    }

    fn has_search(&self) -> bool {
        self.query.hash.is_some() || self.query.media_title.is_some()
    }

    async fn refresh(&mut self, api: &mut ConsoleApi) {
        if !self.has_search() {
            return;
        }
        self.state = ViewState::Loading;
        match api.media(&self.query).await {
            Ok(page) => {
                // A single hit is focused immediately.
                self.selected = if page.len() == 1 { Some(0) } else { None };
                self.results = Some(page);
                self.state = ViewState::Displaying;
            }
            Err(err) => self.state = ViewState::Error(display::error_banner(&err)),
        }
    }

    fn selected_record(&self) -> Option<&Record> {
        let index = self.selected?;
        self.results.as_ref()?.records.get(index)
    }

    fn selected_hash(&self) -> Option<String> {
        self.selected_record()
            .and_then(|record| record.str_field("hash"))
            .map(str::to_string)
    }

    /// Re-focus the same item after a refetch.
    fn reselect(&mut self, hash: &str) {
        self.selected = self.results.as_ref().and_then(|page| {
            page.records
                .iter()
                .position(|record| record.str_field("hash") == Some(hash))
        });
    }

    async fn after_mutation(
        &mut self,
        api: &mut ConsoleApi,
        result: Result<Record, ClientError>,
        hash: &str,
    ) {
        match result {
            Ok(_) => {
                println!("{hash} updated");
                self.refresh(api).await;
                self.reselect(hash);
            }
            Err(err) => {
                println!("{}", display::warn_banner(&err));
                self.state = ViewState::Displaying;
            }
        }
    }

    fn render_results(&self, page: &RecordPage) {
        println!("GET media/?{}", self.query.canonical_page_string());
        display::render_table(page, display::MEDIA_COLUMNS);
        println!("{} result(s); `select <row>` to focus one", page.len());
    }
}

impl View for PipelineView {
    fn name(&self) -> &'static str {
        "pipeline"
    }

    fn help(&self) -> &'static str {
        HELP
    }

    async fn init(&mut self, _api: &mut ConsoleApi) {
        println!("search first: `find hash <hash>` or `find title <term>`");
    }

    async fn handle(&mut self, api: &mut ConsoleApi, input: &CommandInput<'_>) -> Outcome {
        match input.command {
            "find" => match input.arg(0) {
                Some("hash") if input.args.len() == 2 => {
                    self.query.hash = input.arg(1).map(str::to_string);
                    self.query.media_title = None;
                    self.refresh(api).await;
                    Outcome::Redraw
                }
                Some("title") if input.args.len() > 1 => {
                    self.query.media_title = Some(input.rest_from(1));
                    self.query.hash = None;
                    self.refresh(api).await;
                    Outcome::Redraw
                }
                _ => {
                    println!("usage: find hash <hash> | find title <term>");
                    Outcome::Quiet
                }
            },
            "select" => match input.arg(0).and_then(|a| a.parse::<usize>().ok()) {
                Some(row) if row >= 1 => {
                    let count = self.results.as_ref().map_or(0, RecordPage::len);
                    if row <= count {
                        self.selected = Some(row - 1);
                        Outcome::Redraw
                    } else {
                        println!("no row {row} in the results");
                        Outcome::Quiet
                    }
                }
                _ => {
                    println!("usage: select <row>");
                    Outcome::Quiet
                }
            },
            "show" => {
                match self.selected_record() {
                    Some(record) => display::render_card(record, display::MEDIA_CARD),
                    None => println!("nothing focused; `select <row>` first"),
                }
                Outcome::Quiet
            }
            "status" => {
                let Some(hash) = self.selected_hash() else {
                    println!("nothing focused; `select <row>` first");
                    return Outcome::Quiet;
                };
                let status = match input.arg(0).map(str::parse::<PipelineStatus>) {
                    Some(Ok(status)) => status,
                    Some(Err(err)) => {
                        println!("{err}");
                        return Outcome::Quiet;
                    }
                    None => {
                        println!("usage: status <stage>");
                        return Outcome::Quiet;
                    }
                };
                self.state = ViewState::Submitting;
                let result = api.set_pipeline_status(&hash, status).await;
                self.after_mutation(api, result, &hash).await;
                Outcome::Redraw
            }
            "promote" => {
                let Some(hash) = self.selected_hash() else {
                    println!("nothing focused; `select <row>` first");
                    return Outcome::Quiet;
                };
                self.state = ViewState::Submitting;
                let result = api.promote(&hash).await;
                self.after_mutation(api, result, &hash).await;
                Outcome::Redraw
            }
            "finish" => {
                let Some(hash) = self.selected_hash() else {
                    println!("nothing focused; `select <row>` first");
                    return Outcome::Quiet;
                };
                self.state = ViewState::Submitting;
                let result = api.finish(&hash).await;
                self.after_mutation(api, result, &hash).await;
                Outcome::Redraw
            }
            "delete" => {
                let Some(hash) = self.selected_hash() else {
                    println!("nothing focused; `select <row>` first");
                    return Outcome::Quiet;
                };
                if input.arg(0) != Some("confirm") {
                    println!("soft-deleting {hash}; type `delete confirm` to proceed");
                    return Outcome::Quiet;
                }
                self.state = ViewState::Submitting;
                match api.soft_delete(&hash).await {
                    Ok(_) => {
                        println!("{hash} soft-deleted");
                        self.selected = None;
                        self.refresh(api).await;
                    }
                    Err(err) => {
                        println!("{}", display::warn_banner(&err));
                        self.state = ViewState::Displaying;
                    }
                }
                Outcome::Redraw
            }
            "back" => {
                self.selected = None;
                Outcome::Redraw
            }
            "refresh" | "r" => {
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
                if let Some(page) = &self.results {
                    println!("(showing previously fetched results)");
                    self.render_results(page);
                }
            }
            ViewState::Displaying => {
                if let Some(record) = self.selected_record() {
                    display::render_card(record, display::MEDIA_CARD);
                    println!("`status <stage>`, `promote`, `finish`, `delete confirm`, or `back`");
                } else {
                    match &self.results {
                        Some(page) if page.is_empty() => println!("no matches"),
                        Some(page) => self.render_results(page),
                        None => println!("search first: `find hash <hash>` or `find title <term>`"),
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::testutil::refused_api;
    use serde_json::json;

    fn two_results() -> RecordPage {
        RecordPage::from_response(json!({
            "data": [
                {"hash": "aaa111", "media_title": "Alien", "pipeline_status": "parsed"},
                {"hash": "bbb222", "media_title": "Aliens", "pipeline_status": "ingested"},
            ]
        }))
    }

    #[tokio::test]
    async fn select_focuses_a_result_row() {
        let mut api = refused_api();
        let mut view = PipelineView::new();
        view.results = Some(two_results());
        view.state = ViewState::Displaying;

        let input = CommandInput::parse("select 2").unwrap();
        view.handle(&mut api, &input).await;
        assert_eq!(view.selected, Some(1));
        assert_eq!(view.selected_hash().as_deref(), Some("bbb222"));

        let input = CommandInput::parse("select 9").unwrap();
        view.handle(&mut api, &input).await;
        assert_eq!(view.selected, Some(1), "out-of-range select keeps focus");
    }

    #[tokio::test]
    async fn delete_requires_explicit_confirm() {
        let mut api = refused_api();
        let mut view = PipelineView::new();
        view.results = Some(two_results());
        view.selected = Some(0);
        view.state = ViewState::Displaying;

        let input = CommandInput::parse("delete").unwrap();
        view.handle(&mut api, &input).await;
        // Without `confirm` nothing was submitted, so the focus and
        // results are untouched.
        assert_eq!(view.selected, Some(0));
        assert_eq!(view.results.as_ref().map(RecordPage::len), Some(2));
    }

    #[tokio::test]
    async fn failed_status_update_keeps_results() {
        let mut api = refused_api();
        let mut view = PipelineView::new();
        view.query.hash = Some("aaa111".to_string());
        view.results = Some(two_results());
        view.selected = Some(0);
        view.state = ViewState::Displaying;

        let input = CommandInput::parse("status complete").unwrap();
        view.handle(&mut api, &input).await;
        assert_eq!(view.state, ViewState::Displaying);
        assert_eq!(view.results.as_ref().map(RecordPage::len), Some(2));
    }

    #[tokio::test]
    async fn status_without_focus_is_rejected() {
        let mut api = refused_api();
        let mut view = PipelineView::new();
        let input = CommandInput::parse("status complete").unwrap();
        let outcome = view.handle(&mut api, &input).await;
        assert!(matches!(outcome, Outcome::Quiet));
    }
}
