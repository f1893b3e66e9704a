use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app::{AppContext, FeedlineError, Result};
use crate::ingest::SweepOutcome;
use crate::pagination::FeedPage;

/// Import/export document.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscriptionList {
    pub feeds: Vec<Subscription>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subscription {
    pub name: String,
    pub url: String,
}

pub fn add_source(ctx: &AppContext, user_id: i64, name: &str, url: &str) -> Result<()> {
    let source = ctx.engine.add_source(user_id, name, url)?;
    println!("Added feed {}: {} ({})", source.id, source.name, source.url);
    Ok(())
}

pub fn remove_source(ctx: &AppContext, user_id: i64, id: i64) -> Result<()> {
    ctx.engine.remove_source(user_id, id)?;
    println!("Removed feed {}", id);
    Ok(())
}

pub fn rename_source(ctx: &AppContext, user_id: i64, id: i64, name: &str, url: &str) -> Result<()> {
    let source = ctx.engine.update_source(user_id, id, name, url)?;
    println!("Updated feed {}: {} ({})", source.id, source.name, source.url);
    Ok(())
}

pub fn list_sources(ctx: &AppContext, user_id: i64) -> Result<()> {
    let sources = ctx.engine.list_sources(user_id)?;

    if sources.is_empty() {
        println!("No feeds");
        return Ok(());
    }

    for source in sources {
        println!("{:>4}  {}\n      {}", source.id, source.name, source.url);
    }

    Ok(())
}

pub fn import_sources(ctx: &AppContext, user_id: i64, path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)?;
    let list = parse_subscriptions(&content)?;

    if list.feeds.is_empty() {
        println!("No feeds found in {}", path.display());
        return Ok(());
    }

    let report = ctx.engine.import_sources(
        user_id,
        list.feeds.iter().map(|feed| (&feed.name, &feed.url)),
    );

    for error in &report.errors {
        eprintln!("  ! {}", error);
    }
    println!(
        "Import complete: {} added, {} rejected",
        report.added,
        report.errors.len()
    );

    Ok(())
}

pub fn export_sources(ctx: &AppContext, user_id: i64) -> Result<()> {
    let list = SubscriptionList {
        feeds: ctx
            .engine
            .export_sources(user_id)?
            .into_iter()
            .map(|(name, url)| Subscription { name, url })
            .collect(),
    };

    println!("{}", render_subscriptions(&list)?);
    Ok(())
}

pub async fn refresh(ctx: &AppContext, user_id: i64) -> Result<()> {
    let report = ctx.engine.refresh_feeds(user_id).await?;

    if report.sources == 0 {
        println!("No feeds to refresh");
        return Ok(());
    }

    if let SweepOutcome::Swept(deleted) = report.sweep {
        if deleted > 0 {
            println!("Removed {} expired entries", deleted);
        }
    }
    println!(
        "Refresh complete: {} items examined, {} new or updated, {} of {} feeds failed",
        report.items_examined, report.items_new_or_updated, report.sources_failed, report.sources
    );
    Ok(())
}

pub async fn show_page(ctx: &AppContext, user_id: i64, offset: u32, refresh: bool) -> Result<()> {
    let page = if refresh {
        ctx.engine.view_page(user_id, offset).await?
    } else {
        ctx.engine.get_page(user_id, offset)?
    };

    print!("{}", render_page(&page));
    Ok(())
}

fn parse_subscriptions(content: &str) -> Result<SubscriptionList> {
    serde_json::from_str(content)
        .map_err(|e| FeedlineError::Other(format!("Invalid import file: {e}")))
}

fn render_subscriptions(list: &SubscriptionList) -> Result<String> {
    serde_json::to_string_pretty(list).map_err(|e| FeedlineError::Other(e.to_string()))
}

fn render_page(page: &FeedPage) -> String {
    let mut out = String::new();

    if page.is_empty() {
        out.push_str("No entries in this window\n");
    }

    for bucket in &page.buckets {
        out.push_str(&format!("== {} ==\n", bucket.label));
        for sourced in &bucket.entries {
            let marker = if sourced.entry.is_new { "*" } else { " " };
            out.push_str(&format!(
                "{} [{}] {}\n    {}\n",
                marker, sourced.feed_name, sourced.entry.title, sourced.entry.link
            ));
        }
    }

    if page.has_more {
        out.push_str(&format!("\nMore: feedline page --offset {}\n", page.next_offset));
    }
    out
}
