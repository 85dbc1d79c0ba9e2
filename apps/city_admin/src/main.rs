use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    logo::{decode_logo, logo_preview},
    navigation::{PAGE_PARAM, SORT_PARAM},
    CityApi, EditorSession, History, HttpCityApi, ListState, ListSynchronizer, LogoFile,
    QueryParams, RouteData, SaveOutcome, Settings,
};
use shared::domain::{City, CityId, CountryId};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "city-admin")]
struct Cli {
    /// Overrides the server URL from settings and environment.
    #[arg(long)]
    server_url: Option<String>,
    /// Settings file to use instead of ./city-admin.toml.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Shows one page of cities.
    List {
        /// Raw navigation query, e.g. "page=2&sort=name,desc".
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long)]
        page: Option<u32>,
        /// Sort as "<predicate>,<asc|desc>".
        #[arg(long)]
        sort: Option<String>,
    },
    Show {
        id: i64,
        /// Writes the decoded logo to this path.
        #[arg(long)]
        save_logo: Option<PathBuf>,
    },
    Countries,
    Search {
        #[arg(long, conflicts_with = "country", required_unless_present = "country")]
        name: Option<String>,
        #[arg(long)]
        country: Option<String>,
    },
    Create {
        #[arg(long)]
        name: String,
        /// Country id.
        #[arg(long)]
        country: Option<i64>,
        #[arg(long)]
        logo: Option<PathBuf>,
    },
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, conflicts_with = "clear_country")]
        country: Option<i64>,
        #[arg(long)]
        clear_country: bool,
        #[arg(long)]
        logo: Option<PathBuf>,
    },
    ClearLogo {
        id: i64,
    },
    Delete {
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => client_core::load_settings_from(path)?,
        None => client_core::load_settings(),
    };
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    info!(server_url = %settings.server_url, "using city server");
    let api: Arc<dyn CityApi> = Arc::new(HttpCityApi::from_settings(&settings)?);

    match cli.command {
        Command::List { query, page, sort } => {
            let mut params = QueryParams::parse(&query);
            if let Some(page) = page {
                params.set(PAGE_PARAM, page.to_string());
            }
            if let Some(sort) = sort {
                params.set(SORT_PARAM, sort);
            }
            list(api, &settings, params).await?;
        }
        Command::Show { id, save_logo } => {
            let city = find_city(api.as_ref(), id).await?;
            print_city(&city);
            match (&city.logo, save_logo) {
                (Some(payload), Some(path)) => {
                    let bytes = decode_logo(payload)?;
                    tokio::fs::write(&path, &bytes)
                        .await
                        .with_context(|| format!("failed to write logo to '{}'", path.display()))?;
                    println!("logo written to {} ({} bytes)", path.display(), bytes.len());
                }
                (Some(payload), None) => {
                    println!("logo: {}...", logo_preview(payload, 48));
                }
                (None, Some(_)) => bail!("city {id} has no logo"),
                (None, None) => {}
            }
        }
        Command::Countries => {
            for country in api.query_countries().await? {
                println!("{}\t{}", country.id, country.name.as_deref().unwrap_or("-"));
            }
        }
        Command::Search { name, country } => {
            let found = match (name, country) {
                (Some(name), _) => api.search_by_name(&name).await?,
                (None, Some(country)) => api.search_by_country_name(&country).await?,
                (None, None) => Vec::new(),
            };
            for city in &found {
                print_city(city);
            }
            println!("{} match(es)", found.len());
        }
        Command::Create {
            name,
            country,
            logo,
        } => {
            let mut editor = EditorSession::open(Arc::clone(&api), navigator(), None).await;
            editor.form_mut().set_name(name);
            if let Some(country) = country {
                select_country(&mut editor, country)?;
            }
            if let Some(path) = logo {
                editor.select_logo(Some(LogoFile::from_path(&path).await?));
            }
            report(editor.save().await)?;
        }
        Command::Edit {
            id,
            name,
            country,
            clear_country,
            logo,
        } => {
            let city = find_city(api.as_ref(), id).await?;
            let mut editor = EditorSession::open(Arc::clone(&api), navigator(), Some(city)).await;
            if let Some(name) = name {
                editor.form_mut().set_name(name);
            }
            if clear_country {
                editor.form_mut().set_country(None);
            } else if let Some(country) = country {
                select_country(&mut editor, country)?;
            }
            if let Some(path) = logo {
                editor.select_logo(Some(LogoFile::from_path(&path).await?));
            }
            report(editor.save().await)?;
        }
        Command::ClearLogo { id } => {
            let city = find_city(api.as_ref(), id).await?;
            let mut editor = EditorSession::open(Arc::clone(&api), navigator(), Some(city)).await;
            report(editor.clear_logo().await)?;
        }
        Command::Delete { id } => {
            let history = Arc::new(History::new(QueryParams::new()));
            let mut sync = ListSynchronizer::new(api, history, settings.items_per_page);
            sync.on_navigation(RouteData::new(settings.default_sort.as_str()).into());
            sync.on_navigation(QueryParams::new().into());
            sync.delete(CityId(id)).await?;
            println!("deleted city {id}; {} remaining", sync.total_items());
        }
    }

    Ok(())
}

async fn list(api: Arc<dyn CityApi>, settings: &Settings, params: QueryParams) -> Result<()> {
    let history = Arc::new(History::new(params.clone()));
    let mut sync = ListSynchronizer::new(api, history.clone(), settings.items_per_page);
    sync.on_navigation(RouteData::new(settings.default_sort.as_str()).into());
    sync.handle_navigation(params.into()).await;

    let rows = sync
        .rows()
        .ok_or_else(|| anyhow!("loading the city list failed"))?;
    for city in rows {
        print_city(city);
    }

    let Some(state) = sync.state().cloned() else {
        return Ok(());
    };
    let pages = ListState::page_count(sync.total_items(), sync.items_per_page());
    println!(
        "page {}/{pages}, {} cities, sorted by {},{}",
        state.page,
        sync.total_items(),
        state.predicate,
        state.direction()
    );
    if u64::from(state.page) < pages {
        sync.go_to_page(state.page.saturating_add(1));
        println!("next: {}", history.current().encode());
    }
    if state.page > 1 {
        sync.go_to_page(state.page - 1);
        println!("previous: {}", history.current().encode());
    }
    Ok(())
}

fn navigator() -> Arc<History> {
    Arc::new(History::new(QueryParams::new()))
}

async fn find_city(api: &dyn CityApi, id: i64) -> Result<City> {
    api.find(CityId(id))
        .await?
        .ok_or_else(|| anyhow!("city {id} not found"))
}

fn select_country(editor: &mut EditorSession, id: i64) -> Result<()> {
    let country = editor
        .countries()
        .iter()
        .find(|country| country.id == CountryId(id))
        .cloned()
        .ok_or_else(|| anyhow!("unknown country {id}"))?;
    editor.form_mut().set_country(Some(country));
    Ok(())
}

fn report(outcome: SaveOutcome) -> Result<()> {
    match outcome {
        SaveOutcome::Saved(city) => {
            println!("saved:");
            print_city(&city);
            Ok(())
        }
        SaveOutcome::Failed(message) => bail!("save failed: {message}"),
        SaveOutcome::Cancelled => bail!("save cancelled"),
    }
}

fn print_city(city: &City) {
    let country = city
        .country
        .as_ref()
        .map(|country| match &country.name {
            Some(name) => format!("{name} ({})", country.id),
            None => country.id.to_string(),
        })
        .unwrap_or_else(|| "-".to_string());
    let logo = if city.logo.is_some() { "logo" } else { "no logo" };
    println!("{}\t{}\t{country}\t{logo}", city.id, city.name);
}
