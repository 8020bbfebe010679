//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `resolve`: Resolve a query and search a catalog
//! - `config`: Show the effective configuration

mod config;
mod resolve;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::error::Error;
use crate::resolve::{Catalog, EntityKind, LanguagePreference, Query, ResolveOptions};

pub use config::cmd_config;
pub use resolve::{cmd_resolve, cmd_search};

/// Media Resolver CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a query to a unique catalog entity
    Resolve(QueryArgs),
    /// List every candidate a catalog offers, without disambiguation
    Search(QueryArgs),
    /// Show the config file location and effective settings
    Config {
        /// Write the effective settings to the config file if none exists
        #[arg(long)]
        init: bool,
    },
}

/// Query and language flags shared by `resolve` and `search`
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Catalog file (defaults to [catalog] path in the config file)
    #[arg(long, env = "MEDIA_RESOLVER_CATALOG")]
    pub catalog: Option<PathBuf>,
    /// Entity kind: movie, series, season, episode, person, character, company, album, track
    #[arg(short, long, default_value = "movie")]
    pub kind: EntityKind,
    /// Local name of the entity
    #[arg(short, long, default_value = "")]
    pub name: String,
    /// Original-language name
    #[arg(long)]
    pub original_name: Option<String>,
    /// Release year
    #[arg(short, long)]
    pub year: Option<i32>,
    /// Season number
    #[arg(long)]
    pub season: Option<u32>,
    /// Episode number (repeat for multi-episode files)
    #[arg(long = "episode")]
    pub episodes: Vec<u32>,
    /// Parent name (series for episodes, album for tracks)
    #[arg(long)]
    pub parent: Option<String>,
    /// Artist (repeatable)
    #[arg(long = "artist")]
    pub artists: Vec<String>,
    /// Album title
    #[arg(long)]
    pub album: Option<String>,
    /// Track number
    #[arg(long)]
    pub track: Option<u32>,
    /// Disc number
    #[arg(long)]
    pub disc: Option<u32>,
    /// Known identifier as CATALOG=ID, e.g. imdb=tt0113277 (repeatable)
    #[arg(long = "id", value_parser = parse_id)]
    pub ids: Vec<(Catalog, String)>,
    /// Preferred search language
    #[arg(long, env = "MEDIA_RESOLVER_LANG")]
    pub lang: Option<String>,
    /// Fallback search language
    #[arg(long)]
    pub default_lang: Option<String>,
    /// Regional language variant for music (repeatable)
    #[arg(long = "region")]
    pub regions: Vec<String>,
    /// Overwrite the local name with the catalog's
    #[arg(long)]
    pub update_names: bool,
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl QueryArgs {
    /// Build the query described by the flags.
    pub fn to_query(&self) -> Query {
        let mut query = Query::new(self.kind, self.name.clone());
        let e = &mut query.entity;
        e.original_name = self.original_name.clone();
        e.year = self.year;
        e.season = self.season;
        e.parent_name = self.parent.clone();
        for (catalog, id) in &self.ids {
            e.ids.set(*catalog, id.clone());
        }

        e.audio.artists = self.artists.clone();
        e.audio.album = self.album.clone();
        e.audio.track_number = self.track;
        e.audio.disc_number = self.disc;

        match (self.kind, self.track) {
            (EntityKind::Track, Some(track)) if self.episodes.is_empty() => e.set_numbers([track]),
            _ => e.set_numbers(self.episodes.iter().copied()),
        }

        query
    }

    /// Resolution options: config values, overridden by flags.
    pub fn options(&self, config: &Config) -> ResolveOptions {
        let mut options = config.resolve_options();
        let langs = &config.languages;

        let preferred = self.lang.clone().unwrap_or_else(|| langs.preferred.clone());
        let default = self.default_lang.clone().unwrap_or_else(|| langs.default.clone());
        let regions = if self.regions.is_empty() {
            langs.regions.clone()
        } else {
            self.regions.clone()
        };

        options.languages = LanguagePreference::new(preferred, default).with_regions(regions);
        options.update_names |= self.update_names;
        options
    }

    /// Catalog from the flag, falling back to the config file.
    pub fn catalog_path(&self, config: &Config) -> Result<PathBuf, Error> {
        self.catalog
            .clone()
            .or_else(|| config.catalog.path.clone())
            .ok_or_else(|| {
                Error::invalid_input("no catalog given; pass --catalog or set [catalog] path")
            })
    }
}

fn parse_id(s: &str) -> Result<(Catalog, String), String> {
    let (key, id) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CATALOG=ID, got '{s}'"))?;
    let catalog = Catalog::from_key(key).ok_or_else(|| format!("unknown catalog '{key}'"))?;
    if id.trim().is_empty() {
        return Err(format!("empty id for {catalog}"));
    }
    Ok((catalog, id.trim().to_string()))
}

/// Run the specified CLI command.
///
/// Returns `Ok(true)` if a command was run, `Ok(false)` if no command was specified.
pub fn run_command(cli: &Cli) -> anyhow::Result<bool> {
    let config = crate::config::load();

    match &cli.command {
        Some(Commands::Resolve(args)) => {
            let rt = Runtime::new()?;
            cmd_resolve(&rt, args, &config)?;
            Ok(true)
        }
        Some(Commands::Search(args)) => {
            let rt = Runtime::new()?;
            cmd_search(&rt, args, &config)?;
            Ok(true)
        }
        Some(Commands::Config { init }) => {
            cmd_config(&config, *init)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> QueryArgs {
        let mut argv = vec!["media-resolver", "resolve"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Some(Commands::Resolve(args)) => args,
            _ => panic!("expected resolve"),
        }
    }

    #[test]
    fn test_episode_flags_build_query() {
        let args = parse(&[
            "--kind", "episode", "--name", "Folge", "--season", "1", "--episode", "4",
            "--episode", "3", "--parent", "Sanctuary",
        ]);
        let q = args.to_query();

        assert_eq!(q.kind(), EntityKind::Episode);
        assert_eq!(q.entity.season, Some(1));
        assert_eq!(q.entity.numbers.as_slice(), &[3, 4]);
        assert_eq!(q.entity.parent_name.as_deref(), Some("Sanctuary"));
    }

    #[test]
    fn test_id_flag() {
        let args = parse(&["--name", "", "--id", "imdb=tt0113277"]);
        assert_eq!(args.to_query().entity.ids.get(Catalog::Imdb), Some("tt0113277"));

        assert!(parse_id("letterboxd=heat").is_err());
        assert!(parse_id("imdb").is_err());
        assert!(parse_id("imdb= ").is_err());
    }

    #[test]
    fn test_track_flags() {
        let args = parse(&[
            "--kind", "track", "--name", "Hurt", "--artist", "Johnny Cash", "--track", "2",
        ]);
        let q = args.to_query();

        assert_eq!(q.entity.audio.artists, vec!["Johnny Cash".to_string()]);
        assert_eq!(q.entity.audio.track_number, Some(2));
        assert_eq!(q.entity.numbers.as_slice(), &[2]);
    }

    #[test]
    fn test_flags_override_config_languages() {
        let mut config = Config::default();
        config.languages.preferred = "fr".to_string();
        config.languages.regions = vec!["ca".to_string()];

        let options = parse(&["--name", "Heat", "--default-lang", "de"]).options(&config);

        assert_eq!(options.languages.preferred, "fr");
        assert_eq!(options.languages.default, "de");
        assert_eq!(options.languages.regions, vec!["ca".to_string()]);
    }

    #[test]
    fn test_config_init_flag() {
        let cli = Cli::try_parse_from(["media-resolver", "config", "--init"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config { init: true })));
    }

    #[test]
    fn test_catalog_path_falls_back_to_config() {
        let mut config = Config::default();
        let args = QueryArgs {
            catalog: None,
            ..parse(&["--name", "Heat"])
        };
        assert!(args.catalog_path(&config).is_err());

        config.catalog.path = Some(PathBuf::from("/data/catalog.json"));
        assert_eq!(
            args.catalog_path(&config).unwrap(),
            PathBuf::from("/data/catalog.json")
        );
    }
}
