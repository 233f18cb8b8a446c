//! Prediction analysis: browse model output by confusion-matrix
//! category and push label corrections back to the training data.

use mediadeck_client::{ClientError, ConsoleApi};
use mediadeck_core::{CmValue, Label, ListQuery, PageSize, Record, RecordPage, SortOrder};

use crate::display;
use crate::shell::{CommandInput, Outcome, View, ViewState};

const HELP: &str = "\
commands:
  refresh | r                       refetch with current filters
  cm <tp|tn|fp|fn|all>              confusion-matrix filter
  order <asc|desc>                  probability ordering
  next | prev | page <n>            move between pages
  size <25|50|100>                  records per page
  label <tt...> <would_watch|would_not_watch>
  review <tt...>                    mark reviewed without relabeling
  detail <row>                      full card for a listed row
  quit";

pub struct PredictionsView {
    query: ListQuery,
    page: Option<RecordPage>,
    state: ViewState,
}

impl PredictionsView {
    pub fn new() -> Self {
        // Highest-probability predictions first; that is where the
        // interesting misclassifications cluster.
        let query = ListQuery::new().with_sort("probability", SortOrder::Desc);
        Self {
            query,
            page: None,
            state: ViewState::Idle,
        }
    }

    async fn refresh(&mut self, api: &mut ConsoleApi) {
        self.state = ViewState::Loading;
        match api.predictions(&self.query).await {
            Ok(page) => {
                self.page = Some(page);
                self.state = ViewState::Displaying;
            }
            Err(err) => self.state = ViewState::Error(display::error_banner(&err)),
        }
    }

    async fn submit_label(&mut self, api: &mut ConsoleApi, imdb_id: &str, label: Label) {
        let unchanged = self
            .page
            .as_ref()
            .and_then(|page| page.find_by_str("imdb_id", imdb_id))
            .and_then(|record| record.str_field("label"))
            == Some(label.as_str());
        self.state = ViewState::Submitting;
        let result = if unchanged {
            api.set_reviewed(imdb_id, true).await
        } else {
            api.update_label(imdb_id, label).await
        };
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
        println!("GET prediction/?{}", self.query.canonical_string());
        display::render_table(page, display::PREDICTION_COLUMNS);
        let mut footer = format!("{} predictions | page {}", page.len(), self.query.page);
        if let Some(cm) = self.query.cm_value {
            footer.push_str(&format!(" | {} only", cm.describe()));
        }
        println!("{footer}");
    }
}

impl View for PredictionsView {
    fn name(&self) -> &'static str {
        "predictions"
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
            "cm" => {
                self.query.cm_value = match input.arg(0) {
                    Some("all") => None,
                    Some(code) => match code.parse::<CmValue>() {
                        Ok(cm) => Some(cm),
                        Err(err) => {
                            println!("{err}");
                            return Outcome::Quiet;
                        }
                    },
                    None => {
                        println!("usage: cm <tp|tn|fp|fn|all>");
                        return Outcome::Quiet;
                    }
                };
                self.query.page = 1;
                self.refresh(api).await;
                Outcome::Redraw
            }
            "order" => match input.arg(0).map(str::parse::<SortOrder>) {
                Some(Ok(order)) => {
                    self.query.sort_order = order;
                    self.query.page = 1;
                    self.refresh(api).await;
                    Outcome::Redraw
                }
                _ => {
                    println!("usage: order <asc|desc>");
                    Outcome::Quiet
                }
            },
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
                    self.state = ViewState::Submitting;
                    let result = api.set_reviewed(id, true).await;
                    self.after_mutation(api, result, id).await;
                    Outcome::Redraw
                }
                None => {
                    println!("usage: review <tt...>");
                    Outcome::Quiet
                }
            },
            "detail" => match input.arg(0).and_then(|a| a.parse::<usize>().ok()) {
                Some(row) if row >= 1 => {
                    match self.page.as_ref().and_then(|p| p.records.get(row - 1)) {
                        Some(record) => display::render_card(record, display::PREDICTION_CARD),
                        None => println!("no row {row} on this page"),
                    }
                    Outcome::Quiet
                }
                _ => {
                    println!("usage: detail <row>");
                    Outcome::Quiet
                }
            },
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
                Some(page) if page.is_empty() => println!("no predictions found"),
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

    #[tokio::test]
    async fn cm_filter_command_updates_query() {
        let mut api = refused_api();
        let mut view = PredictionsView::new();
        let input = CommandInput::parse("cm fp").unwrap();
        view.handle(&mut api, &input).await;
        assert_eq!(view.query.cm_value, Some(CmValue::Fp));

        let input = CommandInput::parse("cm all").unwrap();
        view.handle(&mut api, &input).await;
        assert_eq!(view.query.cm_value, None);
    }

    #[tokio::test]
    async fn defaults_sort_by_probability() {
        let view = PredictionsView::new();
        assert_eq!(view.query.sort_by, "probability");
        assert_eq!(view.query.sort_order, SortOrder::Desc);
    }

    #[tokio::test]
    async fn failed_refresh_sets_error_state() {
        let mut api = refused_api();
        let mut view = PredictionsView::new();
        view.refresh(&mut api).await;
        assert!(matches!(view.state, ViewState::Error(_)));
        assert!(view.page.is_none());
    }
}
