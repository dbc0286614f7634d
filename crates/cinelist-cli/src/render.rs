//! Plain-text rendering of catalog results and the watchlist.

use cinelist_api::{MovieDetail, MovieSummary, SearchPage};
use cinelist_core::models::{WatchedEntry, WatchedSummary};

pub fn search_page(page: &SearchPage) -> String {
    let shown = page.movies.len();
    let mut out = format!("Found {shown} results");
    if page.total_results as usize > shown {
        out.push_str(&format!(" (showing {shown} of {})", page.total_results));
    }
    out.push('\n');
    for (i, movie) in page.movies.iter().enumerate() {
        out.push_str(&format!("{:>3}. {}\n", i + 1, summary_line(movie)));
    }
    out
}

fn summary_line(movie: &MovieSummary) -> String {
    format!("{} ({}) [{}]", movie.title, movie.year, movie.id)
}

pub fn detail(detail: &MovieDetail, user_rating: Option<u8>) -> String {
    let mut out = format!(
        "{} ({})\n{} | {}\n{}\n\n{}\n\nStarring: {}\nDirected by: {}\nWritten by: {}\nIMDb rating: {}\n",
        detail.title,
        detail.year,
        detail.released,
        detail.runtime,
        detail.genre,
        detail.plot,
        detail.actors,
        detail.director,
        detail.writer,
        detail.imdb_rating,
    );
    if let Some(rating) = user_rating {
        out.push_str(&format!("You rated this movie {rating}\n"));
    }
    out
}

pub fn watched(entries: &[WatchedEntry]) -> String {
    if entries.is_empty() {
        return "No watched movies yet\n".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        let imdb = entry
            .imdb_rating
            .map_or_else(|| "N/A".to_string(), |r| format!("{r:.1}"));
        out.push_str(&format!(
            "{} ({}) [{}]  imdb {}  you {}  {} min\n",
            entry.title,
            entry.year,
            entry.id,
            imdb,
            entry.user_rating,
            entry.runtime_minutes(),
        ));
    }
    out
}

pub fn summary(summary: &WatchedSummary) -> String {
    format!(
        "{} movies | imdb {:.2} | you {:.2} | {:.0} min\n",
        summary.count, summary.avg_imdb_rating, summary.avg_user_rating, summary.avg_runtime
    )
}
