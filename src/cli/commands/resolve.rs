//! Resolve and search commands.

use serde::Serialize;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use super::QueryArgs;
use crate::config::Config;
use crate::error::{Result, ResultExt};
use crate::resolve::{
    Candidate, CombinedRecord, ExternalIds, FileCatalog, MultiPartResolution, Query, Resolution,
    SearchCascade,
};

/// Resolve one query against a catalog file
pub fn cmd_resolve(rt: &Runtime, args: &QueryArgs, config: &Config) -> anyhow::Result<()> {
    let path = args.catalog_path(config)?;
    let cancel = CancellationToken::new();
    let options = args.options(config).with_cancellation(cancel.clone());
    let query = args.to_query();

    rt.block_on(async {
        let catalog = FileCatalog::open(&path)
            .await
            .with_context(format!("opening {}", path.display()))?;
        let cascade = SearchCascade::new(catalog);
        spawn_ctrl_c(cancel);

        let name = query.name().to_string();

        if query.entity.numbers.len() > 1 {
            let mut query = query;
            let result = cascade
                .resolve_multi_part(&mut query, &options)
                .await
                .with_context(format!("resolving '{name}'"))?;
            if args.json {
                print_json_multi(&query, &result)?;
            } else {
                print_multi(&query, &result);
            }
            return Ok(());
        }

        let resolution = cascade
            .resolve(query, &options)
            .await
            .with_context(format!("resolving '{name}'"))?;

        if args.json {
            print_json(&resolution)?;
        } else {
            print_resolution(&name, &resolution);
        }
        Ok::<_, anyhow::Error>(())
    })
}

/// Print the raw candidate list of the first stage that finds anything
pub fn cmd_search(rt: &Runtime, args: &QueryArgs, config: &Config) -> anyhow::Result<()> {
    let path = args.catalog_path(config)?;
    let options = args.options(config);
    let query = args.to_query();

    rt.block_on(async {
        let catalog = FileCatalog::open(&path)
            .await
            .with_context(format!("opening {}", path.display()))?;
        let cascade = SearchCascade::new(catalog);

        let candidates = cascade
            .search_any(&query, &options)
            .await
            .with_context(format!("searching '{}'", query.name()))?;

        if args.json {
            print_json_value(&candidates)?;
        } else {
            println!("{} candidate(s) for '{}':", candidates.len(), query.name());
            for c in &candidates {
                println!("  - {}", describe(c));
            }
        }
        Ok::<_, anyhow::Error>(())
    })
}

fn spawn_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling resolution");
            cancel.cancel();
        }
    });
}

fn print_resolution(name: &str, resolution: &Resolution) {
    match resolution {
        Resolution::Resolved(resolved) => {
            println!(
                "Resolved '{}' -> {} ({})",
                name,
                describe(&resolved.candidate),
                resolved.stage
            );
            print_ids("ids", &resolved.query.entity.ids);
            print_ids("parent ids", &resolved.query.entity.parent_ids);
        }
        Resolution::Ambiguous(set) => {
            println!("Ambiguous: {} candidates for '{}'", set.len(), name);
            for c in set {
                println!("  - {}", describe(c));
            }
        }
        Resolution::NotFound => println!("No match for '{}'", name),
    }
}

fn print_multi(query: &Query, result: &MultiPartResolution) {
    match &result.combined {
        Some(combined) => print_combined(combined),
        None => println!("No part of '{}' resolved", query.name()),
    }
    for (number, outcome) in &result.unresolved {
        println!("  part {}: {}", number, outcome.label());
    }
    print_ids("ids", &query.entity.ids);
    print_ids("parent ids", &query.entity.parent_ids);
}

fn print_combined(combined: &CombinedRecord) {
    println!("Resolved {}", combined.name);
    if let Some(rating) = combined.rating {
        println!(
            "  rating: {:.1} ({} votes)",
            rating,
            combined.votes.unwrap_or_default()
        );
    }
    if let Some(ref summary) = combined.summary {
        for line in summary.lines() {
            println!("  {}", line);
        }
    }
}

fn print_ids(label: &str, ids: &ExternalIds) {
    if ids.is_empty() {
        return;
    }
    println!("  {}:", label);
    for (catalog, id) in ids.iter() {
        println!("    {}: {}", catalog, id);
    }
}

fn describe(c: &Candidate) -> String {
    let e = &c.entity;
    let mut out = e.name.clone();
    if let Some(year) = e.year {
        out.push_str(&format!(" ({})", year));
    }
    if let Some(ref album) = e.audio.album {
        out.push_str(&format!(" on {}", album));
    }
    out.push_str(&format!(" [{}]", c.provenance.provider));
    out
}

fn print_json(resolution: &Resolution) -> Result<()> {
    let value = match resolution {
        Resolution::Resolved(resolved) => serde_json::json!({
            "outcome": "unique",
            "stage": resolved.stage.to_string(),
            "query": resolved.query,
            "candidate": resolved.candidate,
        }),
        Resolution::Ambiguous(set) => serde_json::json!({
            "outcome": "ambiguous",
            "candidates": set,
        }),
        Resolution::NotFound => serde_json::json!({ "outcome": "not_found" }),
    };
    print_json_value(&value)
}

fn print_json_multi(query: &Query, result: &MultiPartResolution) -> Result<()> {
    let unresolved: Vec<_> = result
        .unresolved
        .iter()
        .map(|(number, outcome)| serde_json::json!({ "number": number, "outcome": outcome.label() }))
        .collect();
    let value = serde_json::json!({
        "query": query,
        "combined": result.combined,
        "unresolved": unresolved,
    });
    print_json_value(&value)
}

fn print_json_value(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
