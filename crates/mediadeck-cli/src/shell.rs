//! The interactive view shell: read a command, apply it, re-render.
//!
//! One command runs at a time; the shell blocks on the resulting
//! request before prompting again. Request failures never end the
//! session; the view renders a banner and the loop keeps reading.

use std::io::{self, Write};

use mediadeck_client::ConsoleApi;

/// Lifecycle of a view between operator actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// Nothing fetched yet.
    Idle,
    /// A read is in flight.
    Loading,
    /// A mutation is in flight.
    Submitting,
    /// The current page reflects the last successful read.
    Displaying,
    /// The last read failed; the banner explains, prior data is kept.
    Error(String),
}

/// What a view did with a command.
pub enum Outcome {
    /// State changed; re-render.
    Redraw,
    /// Output already printed; nothing to re-render.
    Quiet,
    /// Not a command this view knows.
    Unknown,
}

/// One parsed input line: a command word plus its arguments.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandInput<'a> {
    pub command: &'a str,
    pub args: Vec<&'a str>,
}

impl<'a> CommandInput<'a> {
    /// Split a line into command and arguments. Blank lines parse to
    /// `None`.
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let command = tokens.next()?;
        Some(Self {
            command,
            args: tokens.collect(),
        })
    }

    pub fn arg(&self, index: usize) -> Option<&'a str> {
        self.args.get(index).copied()
    }

    /// Arguments from `index` onward rejoined with single spaces, for
    /// free-text search terms.
    pub fn rest_from(&self, index: usize) -> String {
        self.args[index.min(self.args.len())..].join(" ")
    }
}

/// A page/screen controller driven by the shell.
#[allow(async_fn_in_trait)]
pub trait View {
    fn name(&self) -> &'static str;
    fn help(&self) -> &'static str;
    /// Initial load when the session opens.
    async fn init(&mut self, api: &mut ConsoleApi);
    /// Apply one command.
    async fn handle(&mut self, api: &mut ConsoleApi, input: &CommandInput<'_>) -> Outcome;
    /// Render current state to stdout.
    fn render(&self);
}

/// Drive `view` until the operator quits or stdin closes.
pub async fn run<V: View>(mut view: V, api: &mut ConsoleApi) -> anyhow::Result<()> {
    println!(
        "{} view. `help` lists commands, `quit` leaves.",
        view.name()
    );
    view.init(api).await;
    view.render();

    let mut line = String::new();
    loop {
        print!("{}> ", view.name());
        io::stdout().flush()?;

        line.clear();
        if io::stdin().read_line(&mut line)? == 0 {
            println!();
            break;
        }
        let Some(input) = CommandInput::parse(&line) else {
            continue;
        };
        match input.command {
            "quit" | "q" | "exit" => break,
            "help" | "?" => {
                println!("{}", view.help());
                continue;
            }
            _ => {}
        }
        match view.handle(api, &input).await {
            Outcome::Unknown => {
                println!("unknown command {:?}; `help` lists commands", input.command);
            }
            Outcome::Quiet => {}
            Outcome::Redraw => view.render(),
        }
    }
    Ok(())
}
