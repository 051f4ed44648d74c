//! Interactive browser: arrow keys move between dates like a swipe.

use anyhow::Result;
use ballpark_core::{FileStorage, ForecastBoard, ForecastScreen, StadiumSelector};
use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, Clear, ClearType},
};
use inquire::Select;
use std::io::{self, Write};

use crate::{
    cli::{stadium_choices, today},
    render,
};

const HELP: &str = "←/h previous date · →/l next date · s stadium · g nearest · n re-match last position · r refresh · q quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Same as swiping left.
    NextDate,
    /// Same as swiping right.
    PreviousDate,
    PickStadium,
    Locate,
    Relocate,
    Refresh,
    Quit,
    Ignore,
}

fn action_for(key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match key.code {
        KeyCode::Right | KeyCode::Char('l') => Action::NextDate,
        KeyCode::Left | KeyCode::Char('h') => Action::PreviousDate,
        KeyCode::Char('s') => Action::PickStadium,
        KeyCode::Char('g') => Action::Locate,
        KeyCode::Char('n') => Action::Relocate,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        _ => Action::Ignore,
    }
}

/// Raw mode for the duration of one key read.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn read_action() -> Result<Action> {
    let _raw = RawMode::enable()?;
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(action_for(key));
            }
        }
    }
}

fn draw(screen: &ForecastScreen, status: Option<&str>) -> Result<()> {
    let mut out = io::stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    writeln!(out, "⚾ Ballpark weather")?;
    if let Some(status) = status {
        writeln!(out, "{status}")?;
    }
    writeln!(out)?;
    writeln!(out, "{}", render::screen(screen))?;
    writeln!(out, "{HELP}")?;
    out.flush()?;
    Ok(())
}

pub async fn run(mut selector: StadiumSelector, mut board: ForecastBoard<FileStorage>) -> Result<()> {
    draw(&ForecastScreen::Idle, selector.status())?;
    let mut screen = board.show(selector.selected(), today(), false).await;

    loop {
        draw(&screen, selector.status())?;

        screen = match read_action()? {
            Action::NextDate => board.next_date(),
            Action::PreviousDate => board.previous_date(),
            Action::PickStadium => {
                let picked = Select::new("Stadium:", stadium_choices()).prompt_skippable()?;
                match picked {
                    Some(choice) => {
                        let stadium = selector.select(choice.0.short_name)?;
                        draw(&ForecastScreen::Idle, selector.status())?;
                        board.show(stadium, today(), false).await
                    }
                    None => board.screen(),
                }
            }
            Action::Locate => {
                let _ = selector.locate().await;
                board.show(selector.selected(), today(), false).await
            }
            Action::Relocate => {
                if selector.relocate().is_some() {
                    board.show(selector.selected(), today(), false).await
                } else {
                    board.screen()
                }
            }
            Action::Refresh => board.refresh(today()).await,
            Action::Quit => break,
            Action::Ignore => board.screen(),
        };
    }

    Ok(())
}
