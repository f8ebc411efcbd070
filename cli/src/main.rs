//! vocab CLI
//!
//! Terminal launcher for the lang-portal backend:
//! - Dashboard, words, groups, study sessions and activities
//! - Settings resets
//! - Vocabulary import (generate, review file, import)

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vocab_core::view::{ActivitiesView, DashboardView, GroupsView, StudySessionsView, WordsView};
use vocab_core::{
    Api, Debouncer, GroupDetailQuery, GroupsQuery, Importer, PortalClient, PortalConfig,
    QueryCache, SettingsActions, StudySessionsQuery, UreqTransport, WordDetailQuery, WordsQuery,
};

#[derive(Parser)]
#[command(name = "vocab")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browse and import vocabulary on a lang-portal backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL (overrides config and VOCAB_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Last session, quick stats and study progress
    Dashboard,

    /// List words
    Words {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Search term (at least two characters)
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Show one word
    Word {
        /// Word id
        id: String,
    },

    /// List groups
    Groups {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Show one group with its words
    Group {
        /// Group id
        id: String,
    },

    /// List study sessions
    Sessions {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// List study activities
    Activities,

    /// Create a group
    CreateGroup { name: String },

    /// Generate words for a group and write them to a review file
    Generate {
        /// Group id whose name is used as the category
        #[arg(short, long)]
        group: u64,
        /// Where to write the word list for review
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Import a reviewed word list into a group
    Import {
        #[arg(short, long)]
        group: u64,
        /// JSON word list, as written by `generate`
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Delete all study sessions and review counters
    ResetHistory {
        /// Skip the confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Delete all words, groups and sessions
    FullReset {
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = PortalConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    tracing::debug!(base_url = %config.api.base_url, "using backend");

    let api = Api::new(PortalClient::new(&config.api.base_url), UreqTransport::new());
    let mut cache = QueryCache::new();
    let now = Instant::now();

    match cli.command {
        Commands::Dashboard => {
            DashboardView::refresh(&api, &mut cache, now);
            let view = DashboardView::from_cache(&cache);
            match &view.last_session {
                Some(session) => println!("Last session: {} (#{})", session.group_name, session.id),
                None => println!("Last session: none yet"),
            }
            if let Some(stats) = &view.quick_stats {
                println!("Success rate: {:.0}%", stats.success_rate);
                println!("Study sessions: {}", stats.total_study_sessions);
                println!("Active groups: {}", stats.total_active_groups);
                println!("Study streak: {} days", stats.study_streak_days);
            }
            if let Some(progress) = &view.progress {
                println!(
                    "Words studied: {}/{} ({:.0}%)",
                    progress.total_words_studied,
                    progress.total_available_words,
                    view.progress_percentage()
                );
            }
            if let Some(error) = view.error {
                bail!(error);
            }
        }

        Commands::Words { page, search } => {
            let mut query = WordsQuery::new(Debouncer::from_config(&config.query));
            query.set_page(page);
            if !search.is_empty() {
                query.input_search(&search, now);
                if !query.tick(now + config.query.debounce()) {
                    tracing::warn!(search = %search, "search term too short, listing all words");
                }
                // tick() resets to page 1 on commit.
                query.set_page(page);
            }
            query.refresh(&api, &mut cache, now);
            let view = WordsView::new(query.page(), query.search(), &query.state(&cache));
            if let Some(error) = view.error {
                bail!(error);
            }
            if let Some(message) = view.empty_message {
                println!("{message}");
            }
            for card in &view.cards {
                println!(
                    "{:>5}  {:<20} {:<20} +{} -{}  {}%",
                    card.id, card.italian, card.english, card.correct, card.wrong, card.success_rate
                );
            }
            println!("page {}/{}", view.pagination.current_page, view.pagination.total_pages);
        }

        Commands::Word { id } => {
            let query = WordDetailQuery::from_route(&id).map_err(|e| anyhow::anyhow!(e.user_message()))?;
            query.refresh(&api, &mut cache, now);
            let state = query.state(&cache);
            let word = state
                .data
                .with_context(|| state.error.unwrap_or_else(|| "word not found".to_string()))?;
            println!("{}", serde_json::to_string_pretty(&word)?);
        }

        Commands::Groups { page } => {
            let mut query = GroupsQuery::default();
            query.set_page(page);
            query.refresh(&api, &mut cache, now);
            let view = GroupsView::new(query.page(), &query.state(&cache));
            if let Some(error) = view.error {
                bail!(error);
            }
            for card in &view.cards {
                println!("{:>5}  {:<24} {}", card.id, card.name, card.word_count_label);
            }
            println!("page {}/{}", view.pagination.current_page, view.pagination.total_pages);
        }

        Commands::Group { id } => {
            let query = GroupDetailQuery::from_route(&id).map_err(|e| anyhow::anyhow!(e.user_message()))?;
            query.refresh(&api, &mut cache, now);
            let state = query.state(&cache);
            let detail = state
                .data
                .with_context(|| state.error.unwrap_or_else(|| "group not found".to_string()))?;
            println!("{}", detail.group.name);
            if let Some(description) = &detail.group.description {
                println!("{description}");
            }
            if !detail.has_words() {
                println!("This group doesn't have any words yet");
            }
            for word in &detail.words {
                println!("  {:<20} {}", word.italian, word.english);
            }
        }

        Commands::Sessions { page } => {
            let mut query = StudySessionsQuery::default();
            query.set_page(page);
            query.refresh(&api, &mut cache, now);
            let view = StudySessionsView::new(query.page(), &query.state(&cache));
            if let Some(error) = view.error {
                bail!(error);
            }
            for row in &view.rows {
                println!(
                    "{:>5}  {:<18} {:<18} {}  {}",
                    row.id, row.activity_name, row.group_name, row.started, row.score
                );
            }
            println!("page {}/{}", view.pagination.current_page, view.pagination.total_pages);
        }

        Commands::Activities => {
            ActivitiesView::refresh(&api, &mut cache, now);
            let view = ActivitiesView::from_cache(&cache);
            if let Some(error) = view.error {
                bail!(error);
            }
            for activity in &view.activities {
                println!(
                    "{:>3}  {:<20} [{:?}] {}",
                    activity.id,
                    activity.name,
                    activity.activity_type(),
                    activity.description
                );
            }
        }

        Commands::CreateGroup { name } => {
            let group = api.create_group(&name).map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("Created group #{} {}", group.id, group.name);
        }

        Commands::Generate { group, out } => {
            let mut importer = Importer::new();
            importer
                .select_group(&api, group)
                .map_err(|e| anyhow::anyhow!("group {group}: {}", e.user_message()))?;
            importer.generate(&api);
            if let Some(error) = importer.error() {
                bail!(error.to_string());
            }
            let text = importer.words_json().map_err(|e| anyhow::anyhow!(e.user_message()))?;
            std::fs::write(&out, text).with_context(|| format!("writing {}", out.display()))?;
            println!("Wrote {} words to {}", importer.words().len(), out.display());
        }

        Commands::Import { group, file } => {
            let text = std::fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
            let mut importer = Importer::new();
            importer
                .select_group(&api, group)
                .map_err(|e| anyhow::anyhow!("group {group}: {}", e.user_message()))?;
            importer.edit_json(&text).map_err(|e| anyhow::anyhow!(e.user_message()))?;
            importer.import(&api);
            if let Some(error) = importer.error() {
                bail!(error.to_string());
            }
            if let Some(message) = importer.success_message() {
                println!("{message}");
            }
        }

        Commands::ResetHistory { yes } => {
            let mut settings = SettingsActions::default();
            settings.ask_reset_history();
            if !yes {
                bail!("this deletes all study sessions; rerun with --yes to confirm");
            }
            settings.confirm_reset_history(&api, &mut cache);
            if let Some(error) = settings.reset_history.error() {
                bail!(error.to_string());
            }
            println!("Study history reset");
        }

        Commands::FullReset { yes } => {
            let mut settings = SettingsActions::default();
            settings.ask_full_reset();
            if !yes {
                bail!("this deletes all words, groups and sessions; rerun with --yes to confirm");
            }
            settings.confirm_full_reset(&api, &mut cache);
            if let Some(error) = settings.full_reset.error() {
                bail!(error.to_string());
            }
            println!("Full reset completed");
        }
    }

    Ok(())
}
