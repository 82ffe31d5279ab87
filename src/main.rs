// src/main.rs
//
// Command-line host for the moviehub core.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use moviehub::application::commands;
use moviehub::application::{AppState, MovieDto, MoviesQueryDto, SessionDto};
use moviehub::config::AppConfig;

#[derive(Parser)]
#[command(name = "moviehub")]
#[command(about = "Browse popular movies and keep per-user favorites", long_about = None)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with the (mock) Google account
    Login,
    /// Sign out and forget the persisted session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List popular movies
    Popular {
        /// Ignore cached data and fetch again
        #[arg(long)]
        refresh: bool,
    },
    /// List the signed-in user's favorites
    Favorites,
    /// Add or remove a movie from favorites
    Toggle { movie_id: i64 },
    /// Remove a movie from favorites
    Remove { movie_id: i64 },
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_session(session: &SessionDto) {
    match &session.user {
        Some(user) => println!("Signed in as {} <{}> ({})", user.full_name, user.email, user.id),
        None => println!("Not signed in"),
    }
}

fn print_movie(movie: &MovieDto) {
    let badge = if movie.is_favorite { "*" } else { " " };
    println!(
        "{} {:>8}  {:<40} {:>4.1}  {}",
        badge,
        movie.id,
        movie.title,
        movie.average_rating,
        movie.release_date.as_deref().unwrap_or("-")
    );
}

fn print_listing(listing: &MoviesQueryDto) {
    for movie in &listing.movies {
        print_movie(movie);
    }
    if let Some(error) = &listing.error {
        eprintln!("Failed to load movies: {}", error);
        if listing.can_retry {
            eprintln!("Run `moviehub popular --refresh` to retry.");
        }
    }
}

async fn run(cli: Cli, state: &AppState) -> Result<()> {
    match cli.command {
        Commands::Login => {
            let session = commands::sign_in_with_google(state).await.map_err(|e| anyhow!(e))?;
            if cli.json { print_json(&session)? } else { print_session(&session) }
        }
        Commands::Logout => {
            let session = commands::sign_out(state).await.map_err(|e| anyhow!(e))?;
            if cli.json { print_json(&session)? } else { print_session(&session) }
        }
        Commands::Whoami => {
            let session = commands::get_session(state).await.map_err(|e| anyhow!(e))?;
            if cli.json { print_json(&session)? } else { print_session(&session) }
        }
        Commands::Popular { refresh } => {
            if let Err(e) = state.config.require_api_key() {
                log::warn!("{}", e);
            }
            let listing = if refresh {
                commands::refresh_popular_movies(state).await
            } else {
                commands::list_popular_movies(state).await
            }
            .map_err(|e| anyhow!(e))?;
            if cli.json { print_json(&listing)? } else { print_listing(&listing) }
        }
        Commands::Favorites => {
            let favorites = commands::list_favorites(state).await.map_err(|e| anyhow!(e))?;
            if cli.json {
                print_json(&favorites)?
            } else if favorites.movies.is_empty() {
                println!("No favorites yet");
            } else {
                favorites.movies.iter().for_each(print_movie);
            }
        }
        Commands::Toggle { movie_id } => {
            if state.session.current_user().is_none() {
                println!("Not signed in");
                return Ok(());
            }
            // Movies not yet favorited are looked up in the popular listing
            if !state.favorites.favorites().iter().any(|m| m.id == movie_id) {
                commands::list_popular_movies(state).await.map_err(|e| anyhow!(e))?;
            }
            let toggled = commands::toggle_favorite(state, movie_id)
                .await
                .map_err(|e| anyhow!(e))?;
            if cli.json {
                print_json(&toggled)?
            } else if !toggled.changed {
                println!("Not signed in");
            } else if toggled.is_favorite {
                println!("Added {} to favorites", movie_id);
            } else {
                println!("Removed {} from favorites", movie_id);
            }
        }
        Commands::Remove { movie_id } => {
            if state.session.current_user().is_none() {
                println!("Not signed in");
                return Ok(());
            }
            let removed = commands::remove_favorite(state, movie_id)
                .await
                .map_err(|e| anyhow!(e))?;
            if cli.json {
                print_json(&removed)?
            } else if removed.changed {
                println!("Removed {} from favorites", movie_id);
            } else {
                println!("Movie {} is not a favorite", movie_id);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = AppConfig::from_env();
    let state = AppState::open(config).context("failed to open application state")?;

    let result = run(cli, &state).await;
    state.shutdown();
    result
}
