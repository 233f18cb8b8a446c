//! Training backlog review and search.
//!
//! Opens on the unreviewed movie backlog, newest first. Labeling a
//! title either re-affirms the current label (which only marks it
//! reviewed) or changes it (which the server also records as
//! human-labeled).

use mediadeck_client::{ClientError, ConsoleApi};
use mediadeck_core::{Label, ListQuery, PageSize, Record, RecordPage, SortOrder};

use crate::display;
use crate::shell::{CommandInput, Outcome, View, ViewState};

const HELP: &str = "\
commands:
  refresh | r                       refetch with current filters
  next | prev | page <n>            move between pages
  size <25|50|100>                  records per page
  sort <column> [asc|desc]          change ordering
  reviewed <unreviewed|reviewed|all>
  anomalous <yes|no|all>
  find title <term>                 search by title
  find id <tt...>                   search by identifier
  find clear                        drop the search
  label <tt...> <would_watch|would_not_watch>
  review <tt...>                    mark reviewed without relabeling
  anom <tt...>                      toggle the anomalous flag
  detail <row>                      full card for a listed row
  backlog                           unreviewed count
  quit";

pub struct TrainingView {
    query: ListQuery,
    page: Option<RecordPage>,
    state: ViewState,
    backlog: Option<u64>,
}

impl TrainingView {
    pub fn new() -> Self {
        let query = ListQuery::new()
            .with_reviewed(false)
            .with_media_type("movie");
        Self {
            query,
            page: None,
            state: ViewState::Idle,
            backlog: None,
        }
    }

    async fn refresh(&mut self, api: &mut ConsoleApi) {
        self.state = ViewState::Loading;
        match api.training(&self.query).await {
            Ok(page) => {
                self.page = Some(page);
                self.state = ViewState::Displaying;
            }
            Err(err) => self.state = ViewState::Error(display::error_banner(&err)),
        }
        if matches!(self.state, ViewState::Displaying) {
            self.backlog = api.unreviewed_count().await.ok();
        }
    }

    fn listed(&self, imdb_id: &str) -> Option<&Record> {
        self.page
            .as_ref()
            .and_then(|page| page.find_by_str("imdb_id", imdb_id))
    }

    async fn submit_label(&mut self, api: &mut ConsoleApi, imdb_id: &str, label: Label) {
        let unchanged = self
            .listed(imdb_id)
            .and_then(|record| record.str_field("label"))
            == Some(label.as_str());
        self.state = ViewState::Submitting;
        // Re-affirming the displayed label only marks the record
        // reviewed; a changed label goes through the label endpoint.
        let result = if unchanged {
            api.set_reviewed(imdb_id, true).await
        } else {
            api.update_label(imdb_id, label).await
        };
        self.after_mutation(api, result, imdb_id).await;
    }

    async fn submit_reviewed(&mut self, api: &mut ConsoleApi, imdb_id: &str) {
        self.state = ViewState::Submitting;
        let result = api.set_reviewed(imdb_id, true).await;
        self.after_mutation(api, result, imdb_id).await;
    }

    async fn toggle_anomalous(&mut self, api: &mut ConsoleApi, imdb_id: &str) {
        let current = self
            .listed(imdb_id)
            .and_then(|record| record.bool_field("anomalous"))
            .unwrap_or(false);
        self.state = ViewState::Submitting;
        let result = api.set_anomalous(imdb_id, !current).await;
        self.after_mutation(api, result, imdb_id).await;
    }

    async fn after_mutation(
        &mut self,
        api: &mut ConsoleApi,
        result: Result<Record, ClientError>,
        imdb_id: &str,
    ) {
        match result {
            Ok(_) => {
                println!("{imdb_id} updated");
                self.refresh(api).await;
            }
            Err(err) => {
                println!("{}", display::warn_banner(&err));
                self.state = ViewState::Displaying;
            }
        }
    }

    fn render_page(&self, page: &RecordPage) {
        println!("GET training?{}", self.query.canonical_string());
        display::render_table(page, display::TRAINING_COLUMNS);
        let start = self.query.offset() + 1;
        let end = self.query.offset() + page.len() as u32;
        let mut footer = format!("rows {start}-{end}");
        if let Some(total) = page.total {
            footer.push_str(&format!(" of {total}"));
        }
        footer.push_str(&format!(" | page {}", self.query.page));
        if let Some(backlog) = self.backlog {
            footer.push_str(&format!(" | backlog {backlog}"));
        }
        println!("{footer}");
    }

    fn searching(&self) -> bool {
        self.query.media_title.is_some() || self.query.imdb_id.is_some()
    }
}

impl View for TrainingView {
    fn name(&self) -> &'static str {
        "training"
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
            "next" | "n" => {
                self.query.page += 1;
                self.refresh(api).await;
                Outcome::Redraw
            }
            "prev" | "p" => {
                if self.query.page > 1 {
                    self.query.page -= 1;
                    self.refresh(api).await;
                }
                Outcome::Redraw
            }
            "page" => match input.arg(0).and_then(|a| a.parse::<u32>().ok()) {
                Some(n) if n >= 1 => {
                    self.query.page = n;
                    self.refresh(api).await;
                    Outcome::Redraw
                }
                _ => {
                    println!("usage: page <n>");
                    Outcome::Quiet
                }
            },
            "size" => match input.arg(0).and_then(|a| a.parse::<PageSize>().ok()) {
                Some(size) => {
                    self.query.page_size = size;
                    self.query.page = 1;
                    self.refresh(api).await;
                    Outcome::Redraw
                }
                None => {
                    println!("usage: size <25|50|100>");
                    Outcome::Quiet
                }
            },
            "sort" => {
                let Some(column) = input.arg(0) else {
                    println!("usage: sort <column> [asc|desc]");
                    return Outcome::Quiet;
                };
                if let Some(order) = input.arg(1) {
                    match order.parse::<SortOrder>() {
                        Ok(order) => self.query.sort_order = order,
                        Err(err) => {
                            println!("{err}");
                            return Outcome::Quiet;
                        }
                    }
                }
                self.query.sort_by = column.to_string();
                self.query.page = 1;
                self.refresh(api).await;
                Outcome::Redraw
            }
            "reviewed" => {
                self.query.reviewed = match input.arg(0) {
                    Some("unreviewed") => Some(false),
                    Some("reviewed") => Some(true),
                    Some("all") => None,
                    _ => {
                        println!("usage: reviewed <unreviewed|reviewed|all>");
                        return Outcome::Quiet;
                    }
                };
                self.query.page = 1;
                self.refresh(api).await;
                Outcome::Redraw
            }
            "anomalous" => {
                self.query.anomalous = match input.arg(0) {
                    Some("yes") => Some(true),
                    Some("no") => Some(false),
                    Some("all") => None,
                    _ => {
                        println!("usage: anomalous <yes|no|all>");
                        return Outcome::Quiet;
                    }
                };
                self.query.page = 1;
                self.refresh(api).await;
                Outcome::Redraw
            }
            "find" => match input.arg(0) {
                Some("title") if input.args.len() > 1 => {
                    self.query.media_title = Some(input.rest_from(1));
                    self.query.imdb_id = None;
                    self.query.page = 1;
                    self.refresh(api).await;
                    Outcome::Redraw
                }
                Some("id") if input.args.len() == 2 => {
                    self.query.imdb_id = input.arg(1).map(str::to_string);
                    self.query.media_title = None;
                    self.query.page = 1;
                    self.refresh(api).await;
                    Outcome::Redraw
                }
                Some("clear") => {
                    self.query.media_title = None;
                    self.query.imdb_id = None;
                    self.query.page = 1;
                    self.refresh(api).await;
                    Outcome::Redraw
                }
                _ => {
                    println!("usage: find title <term> | find id <tt...> | find clear");
                    Outcome::Quiet
                }
            },
            "label" => match (input.arg(0), input.arg(1).map(str::parse::<Label>)) {
                (Some(id), Some(Ok(label))) => {
                    self.submit_label(api, id, label).await;
                    Outcome::Redraw
                }
                (_, Some(Err(err))) => {
                    println!("{err}");
                    Outcome::Quiet
                }
                _ => {
                    println!("usage: label <tt...> <would_watch|would_not_watch>");
                    Outcome::Quiet
                }
            },
            "review" => match input.arg(0) {
                Some(id) => {
                    self.submit_reviewed(api, id).await;
                    Outcome::Redraw
                }
                None => {
                    println!("usage: review <tt...>");
                    Outcome::Quiet
                }
            },
            "anom" => match input.arg(0) {
                Some(id) => {
                    self.toggle_anomalous(api, id).await;
                    Outcome::Redraw
                }
                None => {
                    println!("usage: anom <tt...>");
                    Outcome::Quiet
                }
            },
            "detail" => match input.arg(0).and_then(|a| a.parse::<usize>().ok()) {
                Some(row) if row >= 1 => {
                    match self.page.as_ref().and_then(|p| p.records.get(row - 1)) {
                        Some(record) => display::render_card(record, display::TRAINING_CARD),
                        None => println!("no row {row} on this page"),
                    }
                    Outcome::Quiet
                }
                _ => {
                    println!("usage: detail <row>");
                    Outcome::Quiet
                }
            },
            "backlog" => {
                match self.backlog {
                    Some(count) => println!("{count} unreviewed items"),
                    None => println!("backlog count unavailable"),
                }
                Outcome::Quiet
            }
            _ => Outcome::Unknown,
        }
    }

    fn render(&self) {
        match &self.state {
            ViewState::Error(banner) => {
                println!("{banner}");
                if let Some(page) = &self.page {
                    println!("(showing previously fetched data)");
                    self.render_page(page);
                }
            }
            ViewState::Displaying => match &self.page {
                Some(page) if page.is_empty() => {
                    if self.query.reviewed == Some(false) && !self.searching() {
                        println!("backlog cleared");
                    } else {
                        println!("no records found");
                    }
                }
                Some(page) => self.render_page(page),
                None => println!("no data loaded; `refresh` to fetch"),
            },
            _ => {}
        }
    }
}
