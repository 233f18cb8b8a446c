//! Media library browser.
//!
//! The media endpoint paginates by `page`/`limit` rather than
//! `limit`/`offset`, and reports a page count alongside the total.

use mediadeck_client::ConsoleApi;
use mediadeck_core::{ListQuery, PageSize, RecordPage, SortOrder};

use crate::display;
use crate::shell::{CommandInput, Outcome, View, ViewState};

const HELP: &str = "\
commands:
  refresh | r                refetch the current page
  next | prev | page <n>     move between pages
  size <25|50|100>           records per page
  sort <column> [asc|desc]   change ordering
  errors <on|off|all>        filter by error status
  detail <row>               full card for a listed row
  quit";

pub struct MediaView {
    query: ListQuery,
    page: Option<RecordPage>,
    state: ViewState,
}

impl MediaView {
    pub fn new() -> Self {
        Self {
            query: ListQuery::new(),
            page: None,
            state: ViewState::Idle,
        }
    }

    async fn refresh(&mut self, api: &mut ConsoleApi) {
        self.state = ViewState::Loading;
        match api.media(&self.query).await {
            Ok(page) => {
                self.page = Some(page);
                self.state = ViewState::Displaying;
            }
            Err(err) => self.state = ViewState::Error(display::error_banner(&err)),
        }
    }

    fn render_page(&self, page: &RecordPage) {
        println!("GET media/?{}", self.query.canonical_page_string());
        display::render_table(page, display::MEDIA_COLUMNS);
        let mut footer = format!("{} items | page {}", page.len(), self.query.page);
        if let Some(pages) = page.pages {
            footer.push_str(&format!(" of {pages}"));
        }
        if let Some(total) = page.total {
            footer.push_str(&format!(" | total {total}"));
        }
        println!("{footer}");
    }
}

impl View for MediaView {
    fn name(&self) -> &'static str {
        "media"
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
            "errors" => {
                self.query.error_status = match input.arg(0) {
                    Some("on") => Some(true),
                    Some("off") => Some(false),
                    Some("all") => None,
                    _ => {
                        println!("usage: errors <on|off|all>");
                        return Outcome::Quiet;
                    }
                };
                self.query.page = 1;
                self.refresh(api).await;
                Outcome::Redraw
            }
            "detail" => match input.arg(0).and_then(|a| a.parse::<usize>().ok()) {
                Some(row) if row >= 1 => {
                    match self.page.as_ref().and_then(|p| p.records.get(row - 1)) {
                        Some(record) => display::render_card(record, display::MEDIA_CARD),
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
                Some(page) if page.is_empty() => println!("no media items found"),
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
    async fn error_filter_command_updates_query() {
        let mut api = refused_api();
        let mut view = MediaView::new();
        let input = CommandInput::parse("errors on").unwrap();
        view.handle(&mut api, &input).await;
        assert_eq!(view.query.error_status, Some(true));

        let input = CommandInput::parse("errors all").unwrap();
        view.handle(&mut api, &input).await;
        assert_eq!(view.query.error_status, None);
    }

    #[tokio::test]
    async fn prev_on_first_page_stays_on_first_page() {
        let mut api = refused_api();
        let mut view = MediaView::new();
        let input = CommandInput::parse("prev").unwrap();
        view.handle(&mut api, &input).await;
        assert_eq!(view.query.page, 1);
    }
}
