use super::{prompts, stars, ui, Context};
use crate::output::Output;
use crate::MovieCommands;
use cinerate_core::{parse_movies_csv, MovieQuery, Page};
use cinerate_models::{Movie, MovieDraft, Review};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_movie(cmd: MovieCommands, ctx: &Context, output: &Output) -> Result<()> {
    let catalog = &ctx.services.catalog;

    match cmd {
        MovieCommands::Add {
            title,
            description,
            year,
            genre,
            director,
            cast,
            poster,
        } => {
            let movie = catalog
                .create_movie(MovieDraft {
                    title,
                    description,
                    release_year: year,
                    genre,
                    director,
                    cast,
                    poster_url: poster,
                })
                .await?;
            output.success(format!("Added \"{}\" ({})", movie.title, movie.id));
            output.data(&movie);
        }
        MovieCommands::Edit {
            id,
            title,
            description,
            year,
            genre,
            director,
            cast,
            poster,
        } => {
            let current = catalog.get_movie(id).await?;
            let base = current.to_draft();
            let draft = MovieDraft {
                title: title.unwrap_or(base.title),
                description: description.unwrap_or(base.description),
                release_year: year.unwrap_or(base.release_year),
                genre: genre.unwrap_or(base.genre),
                director: director.unwrap_or(base.director),
                cast: cast.unwrap_or(base.cast),
                poster_url: poster.unwrap_or(base.poster_url),
            };
            let movie = catalog.update_movie(id, draft).await?;
            output.success(format!("Updated \"{}\"", movie.title));
            output.data(&movie);
        }
        MovieCommands::Rm { id, yes } => {
            let movie = catalog.get_movie(id).await?;
            if !yes {
                let prompt = format!(
                    "Delete \"{}\" and its {} review(s)?",
                    movie.title,
                    movie.reviews.len()
                );
                if !prompts::prompt_yes_no(&prompt, false)? {
                    output.info("Cancelled");
                    return Ok(());
                }
            }
            let removal = catalog.delete_movie(id).await?;
            output.success(format!(
                "Deleted \"{}\" and {} review(s)",
                removal.movie.title, removal.reviews_removed
            ));
            if removal.reviews_left > 0 {
                output.warn(format!(
                    "{} review(s) could not be removed; run `cinerate reconcile`",
                    removal.reviews_left
                ));
            }
            output.data(&removal);
        }
        MovieCommands::Show { id } => {
            let details = catalog.movie_details(id).await?;
            output.human(render_movie(&details.movie));
            if details.reviews.is_empty() {
                output.human("No reviews yet".bright_black());
            } else {
                output.human(render_reviews(&details.reviews));
            }
            output.data(&details);
        }
        MovieCommands::List {
            genre,
            sort,
            page,
            limit,
        } => {
            let page = catalog
                .list_movies(MovieQuery {
                    genre,
                    sort,
                    page,
                    limit,
                })
                .await?;
            if page.items.is_empty() {
                output.info("No movies found");
            } else {
                output.human(render_movie_list(&page));
            }
            output.data(&json!({
                "movies": page.items,
                "total": page.total,
                "totalPages": page.total_pages,
                "currentPage": page.current_page,
            }));
        }
        MovieCommands::Genre { name } => {
            let movies = catalog.movies_by_genre(&name).await?;
            if movies.is_empty() {
                output.info(format!("No movies in genre \"{}\"", name));
            } else {
                output.human(render_movie_rows(&movies));
            }
            output.data(&json!({ "genre": name, "movies": movies }));
        }
        MovieCommands::Genres => {
            let genres = catalog.genres().await?;
            if genres.is_empty() {
                output.info("No genres yet");
            }
            for genre in &genres {
                output.human(genre);
            }
            output.data(&json!({ "genres": genres }));
        }
        MovieCommands::Import { file } => {
            let rows = parse_movies_csv(&file)
                .map_err(|e| eyre!("Failed to read {}: {}", file.display(), e))?;

            let progress = ui::ImportProgress::new(rows.len(), output.is_quiet());
            let report = catalog.import(rows, |done| progress.set_done(done)).await;
            progress.finish();
            let report = report?;

            for skipped in &report.skipped {
                output.warn(format!("Line {} skipped: {}", skipped.line, skipped.reason));
            }
            output.success(format!(
                "Imported {} movie(s), skipped {} row(s)",
                report.created.len(),
                report.skipped.len()
            ));
            output.data(&report);
        }
    }

    Ok(())
}

fn render_movie(movie: &Movie) -> String {
    let mut table = ui::table(&["Field", "Value"]);
    table.add_row(vec![Cell::new("ID"), Cell::new(movie.id)]);
    table.add_row(vec![Cell::new("Title"), Cell::new(&movie.title)]);
    table.add_row(vec![Cell::new("Year"), Cell::new(movie.release_year)]);
    table.add_row(vec![Cell::new("Genre"), Cell::new(&movie.genre)]);
    table.add_row(vec![Cell::new("Director"), Cell::new(&movie.director)]);
    table.add_row(vec![Cell::new("Cast"), Cell::new(movie.cast.join(", "))]);
    table.add_row(vec![
        Cell::new("Rating"),
        Cell::new(format!(
            "{} {:.1} ({} rating(s))",
            stars(movie.average_rating),
            movie.average_rating,
            movie.total_ratings
        )),
    ]);
    table.add_row(vec![Cell::new("Poster"), Cell::new(&movie.poster_url)]);
    table.add_row(vec![Cell::new("Description"), Cell::new(&movie.description)]);
    table.to_string()
}

pub(crate) fn render_reviews(reviews: &[Review]) -> String {
    let mut table = ui::table(&["ID", "User", "Rating", "Likes", "Review", "Written"]);
    for review in reviews {
        table.add_row(vec![
            Cell::new(review.id),
            Cell::new(&review.user_id),
            Cell::new(stars(review.rating.value() as f64)),
            Cell::new(review.like_count()),
            Cell::new(ui::truncate(&review.content, 60)),
            Cell::new(review.created_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    table.to_string()
}

fn render_movie_list(page: &Page<Movie>) -> String {
    format!(
        "{}\nPage {} of {} ({} movie(s))",
        render_movie_rows(&page.items),
        page.current_page,
        page.total_pages.max(1),
        page.total
    )
}

fn render_movie_rows(movies: &[Movie]) -> String {
    let mut table = ui::table(&["ID", "Title", "Year", "Genre", "Rating", "Reviews"]);
    for movie in movies {
        table.add_row(vec![
            Cell::new(movie.id),
            Cell::new(&movie.title),
            Cell::new(movie.release_year),
            Cell::new(&movie.genre),
            Cell::new(format!("{} {:.1}", stars(movie.average_rating), movie.average_rating)),
            Cell::new(movie.total_ratings),
        ]);
    }
    table.to_string()
}
