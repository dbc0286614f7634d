//! Line-oriented interactive session: typing searches, `:` commands act on
//! the results.
//!
//! Input is read while requests are in flight, so a new line supersedes a
//! search that has not answered yet. Results are printed as the controllers
//! publish them.

use std::io::Write;

use cinelist_api::{MovieCatalog, SearchPage};
use cinelist_core::storage::KeyValueStore;
use cinelist_runtime::{FetchState, Runtime, RuntimeError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::render;

const HELP: &str = "\
type to search, then:
  :open N    show result N (again to close)
  :rate N    rate the open movie 1-10
  :rm ID     remove a watched movie
  :list      show the watchlist
  :close     close the open movie
  :quit      leave
";

#[derive(Debug, PartialEq)]
pub enum Input {
    Query(String),
    Open(usize),
    Rate(u8),
    Remove(String),
    List,
    Close,
    Help,
    Quit,
    Invalid(String),
}

pub fn parse_line(line: &str) -> Input {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(command) = line.strip_prefix(':') else {
        return Input::Query(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    match (name, arg) {
        ("open" | "o", Some(n)) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Input::Open(n),
            _ => Input::Invalid(format!("not a result number: {n}")),
        },
        ("rate" | "r", Some(n)) => match n.parse::<u8>() {
            Ok(n) => Input::Rate(n),
            Err(_) => Input::Invalid(format!("not a rating: {n}")),
        },
        ("rm", Some(id)) => Input::Remove(id.to_string()),
        ("list" | "l", None) => Input::List,
        ("close" | "c", None) => Input::Close,
        ("help" | "h", None) => Input::Help,
        ("quit" | "q", None) => Input::Quit,
        _ => Input::Invalid(format!("unknown command: :{command}")),
    }
}

/// Drive `runtime` from `input` until `:quit`, or until input ends and
/// nothing is left in flight.
pub async fn run<C, S, R, W>(
    runtime: &mut Runtime<C, S>,
    input: R,
    out: &mut W,
) -> Result<(), RuntimeError>
where
    C: MovieCatalog + 'static,
    S: KeyValueStore,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{HELP}")?;
    let mut lines = input.lines();
    let mut search_rx = runtime.search().subscribe();
    let mut details_rx = runtime.details().subscribe();
    let mut reading = true;

    loop {
        if !reading {
            let pending = search_rx.has_changed().unwrap_or(false)
                || details_rx.has_changed().unwrap_or(false);
            let busy = runtime.search().state().loading || runtime.details().state().loading;
            if !pending && !busy {
                break;
            }
        }

        tokio::select! {
            line = lines.next_line(), if reading => match line? {
                Some(line) => {
                    if !handle(runtime, parse_line(&line), out)? {
                        break;
                    }
                }
                None => reading = false,
            },
            Ok(()) = search_rx.changed() => {
                let state = search_rx.borrow_and_update().clone();
                print_search(&state, out)?;
            }
            Ok(()) = details_rx.changed() => {
                details_rx.mark_unchanged();
                print_details(runtime, out)?;
            }
            else => break,
        }
        out.flush()?;
    }

    Ok(())
}

/// Apply one line of input. Returns `false` when the session should end.
fn handle<C, S, W>(
    runtime: &mut Runtime<C, S>,
    input: Input,
    out: &mut W,
) -> Result<bool, RuntimeError>
where
    C: MovieCatalog + 'static,
    S: KeyValueStore,
    W: Write,
{
    match input {
        Input::Query(query) => runtime.set_query(&query),
        Input::Open(n) => {
            let state = runtime.search().state();
            match state.value.movies.get(n - 1) {
                Some(movie) => runtime.toggle_movie(&movie.id),
                None => writeln!(out, "no result {n}")?,
            }
        }
        Input::Rate(rating) => match runtime.rate_selected(rating) {
            Ok(entry) => writeln!(out, "Added {} with rating {}", entry.title, entry.user_rating)?,
            Err(e) => writeln!(out, "{e}")?,
        },
        Input::Remove(id) => match runtime.remove_watched(&id)? {
            true => writeln!(out, "Removed {id}")?,
            false => writeln!(out, "{id} is not on the watchlist")?,
        },
        Input::List => {
            write!(out, "{}", render::watched(runtime.watched()))?;
            write!(out, "{}", render::summary(&runtime.summary()))?;
        }
        Input::Close => runtime.close_movie(),
        Input::Help => write!(out, "{HELP}")?,
        Input::Quit => return Ok(false),
        Input::Invalid(message) => writeln!(out, "{message}")?,
    }
    Ok(true)
}

fn print_search<W: Write>(state: &FetchState<SearchPage>, out: &mut W) -> std::io::Result<()> {
    if state.loading {
        return Ok(());
    }
    match state.error {
        Some(ref error) => writeln!(out, "{error}"),
        None if state.value.movies.is_empty() => Ok(()),
        None => write!(out, "{}", render::search_page(&state.value)),
    }
}

fn print_details<C, S, W>(runtime: &Runtime<C, S>, out: &mut W) -> Result<(), RuntimeError>
where
    C: MovieCatalog + 'static,
    S: KeyValueStore,
    W: Write,
{
    if runtime.details().state().loading {
        return Ok(());
    }
    match runtime.detail_outcome() {
        Ok(Some(detail)) => {
            let rating = runtime.watchlist().user_rating(&detail.id);
            writeln!(out, "== {} ==", runtime.selected_title())?;
            write!(out, "{}", render::detail(&detail, rating))?;
        }
        Ok(None) => {}
        Err(e) => writeln!(out, "{e}")?,
    }
    Ok(())
}
