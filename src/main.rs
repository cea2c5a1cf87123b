//! waymark: a scroll-spy engine with a terminal page simulator.
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use ratatui::crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use waymark::events::{Dispatcher, PageEvent};
use waymark::highlighter::Highlighter;
use waymark::page::{NavRegion, Page};
use waymark::scenario::Scenario;
use waymark::{config, ui};

#[derive(Parser)]
#[command(name = "waymark")]
#[command(about = "Scroll-aware navigation highlighting for sectioned pages", long_about = None)]
struct Args {
    /// Page layout JSON (defaults to the built-in demo page)
    #[arg(value_name = "PAGE")]
    page: Option<PathBuf>,

    /// Replay a scenario JSON headlessly and print the activation trace
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Initial URL fragment, without the leading '#'
    #[arg(long)]
    fragment: Option<String>,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let cfg = config::Config::load();

    let page = match &args.page {
        Some(path) => Page::load(path)?,
        None => Page::demo(),
    };

    if let Some(path) = &args.replay {
        let scenario = Scenario::load(path)?;
        let trace = scenario.replay(page, cfg);
        let json = serde_json::to_string_pretty(&trace).map_err(io::Error::other)?;
        println!("{json}");
        return Ok(());
    }

    let highlighter = Highlighter::new(page, cfg, args.fragment.as_deref());
    run_tui(highlighter)
}

fn run_tui(mut app: Highlighter) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (mut dispatcher, _handles) = Dispatcher::wired(app.config().resize_debounce_ms);

    let result = run_app(&mut terminal, &mut app, &mut dispatcher);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    } else {
        let json = serde_json::json!({
            "active": app.active_id(),
            "scroll_y": app.scroll_y(),
        });
        println!("{json}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut Highlighter,
    dispatcher: &mut Dispatcher,
) -> io::Result<()> {
    let started = Instant::now();
    let mut message: Option<String> = None;

    loop {
        terminal.draw(|f| ui::draw(f, app, message.as_deref()))?;

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                let step = app.config().scroll_step_px;
                let page_height = app.page().viewport_height;
                let max_y = (app.page().document_height() - page_height).max(0.0);
                let y = app.scroll_y();
                let now_ms = elapsed_ms(started);

                match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Up => {
                        dispatcher.dispatch(app, PageEvent::Scroll { y: (y - step).max(0.0) });
                    }
                    KeyCode::Down => {
                        dispatcher.dispatch(app, PageEvent::Scroll { y: (y + step).min(max_y) });
                    }
                    KeyCode::PageUp => {
                        dispatcher.dispatch(
                            app,
                            PageEvent::Scroll {
                                y: (y - page_height).max(0.0),
                            },
                        );
                    }
                    KeyCode::PageDown => {
                        dispatcher.dispatch(
                            app,
                            PageEvent::Scroll {
                                y: (y + page_height).min(max_y),
                            },
                        );
                    }
                    KeyCode::Home => {
                        dispatcher.dispatch(app, PageEvent::Scroll { y: 0.0 });
                    }
                    KeyCode::End => {
                        dispatcher.dispatch(app, PageEvent::Scroll { y: max_y });
                    }
                    KeyCode::Char(c) if c.is_ascii_digit() => {
                        let slot = c
                            .to_digit(10)
                            .and_then(|d| usize::try_from(d).ok())
                            .and_then(|d| d.checked_sub(1));
                        if let Some(target) = slot.and_then(|s| nth_primary_target(app, s)) {
                            message = Some(format!("clicked #{target}"));
                            if let Some(section) = app.page().section(&target) {
                                let jump = section.top.min(max_y);
                                dispatcher.dispatch(app, PageEvent::Scroll { y: jump });
                            }
                            dispatcher.dispatch(app, PageEvent::Click { target, now_ms });
                        }
                    }
                    KeyCode::Esc => message = None,
                    _ => {}
                }
            }
        }

        dispatcher.dispatch(app, PageEvent::Frame { now_ms: elapsed_ms(started) });
    }
}

/// Target of the `slot`-th tracked link in the desktop nav, if one exists.
fn nth_primary_target(app: &Highlighter, slot: usize) -> Option<String> {
    let page = app.page();
    page.links
        .iter()
        .filter(|l| l.region == NavRegion::Primary && page.is_known(&l.target))
        .nth(slot)
        .map(|l| l.target.clone())
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
