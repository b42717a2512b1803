//! Read-only rendering of backend data to the terminal.

use console::style;
use discovery_client::{
    CategorySettings, Post, Product, ProductDetail, SearchRecord, SearchResult,
};
use reconciler::Provenance;

pub fn print_products(result: &SearchResult, provenance: Provenance) {
    if let Some(summary) = result.summary.as_deref() {
        println!("\n{}", style(summary).italic());
    }
    let total = result
        .total_found
        .unwrap_or(result.products.len() as u64);
    println!(
        "{} {} products{}",
        style("found").green().bold(),
        total,
        match provenance {
            Provenance::Recovered => " (recovered from execution logs)",
            Provenance::Parsed => " (parsed from task output)",
            _ => "",
        }
    );

    for product in &result.products {
        print_product_card(product, provenance == Provenance::Recovered);
    }

    if let Some(note) = result.note.as_deref() {
        println!("{} {note}", style("note").dim());
    }
}

fn print_product_card(product: &Product, recovered: bool) {
    println!(
        "\n  {} {}",
        style(&product.name).bold(),
        style(format!("[{}]", product.category)).dim()
    );
    if !product.description.is_empty() {
        println!("  {}", product.description);
    }
    println!(
        "  {} likes  {} retweets  {} replies  {} views",
        product.metrics.likes,
        product.metrics.retweets,
        product.metrics.replies,
        product.metrics.views
    );
    if let Some(url) = product.url.as_deref().filter(|u| !u.is_empty()) {
        println!("  site: {}", style(url).underlined());
    }
    if let Some(post_url) = product.post_url.as_deref().filter(|u| !u.is_empty()) {
        println!("  post: {}", style(post_url).underlined());
    }
    if let Some(id) = product.id {
        println!("  {}", style(format!("detail: scout product {id}")).dim());
    }
    if recovered {
        println!("  {}", style("recovered from logs").yellow());
    }
}

pub fn print_records(records: &[SearchRecord]) {
    if records.is_empty() {
        println!("No search records found");
        return;
    }
    for record in records {
        let keywords = if record.keywords.is_empty() {
            "AI product search".to_string()
        } else {
            record.keywords.join(", ")
        };
        println!(
            "{:>5}  {}  {}  {} to {}  {} products",
            style(record.id).bold(),
            style(&record.status).cyan(),
            keywords,
            record.start_date,
            record.end_date,
            record.total_products
        );
    }
}

pub fn print_product_detail(detail: &ProductDetail, posts: &[Post]) {
    println!(
        "{} {}",
        style(&detail.name).bold(),
        style(format!(
            "[{}]",
            detail.category.as_deref().unwrap_or("Uncategorized")
        ))
        .dim()
    );
    if let Some(description) = detail.description.as_deref() {
        println!("{description}");
    }
    if let Some(url) = detail.official_url.as_deref() {
        println!("site: {}", style(url).underlined());
    }
    println!(
        "{} posts  {} likes  {} retweets  {} replies  {} views",
        detail.total_posts,
        detail.total_likes,
        detail.total_retweets,
        detail.total_replies,
        detail.total_views
    );
    if let Some(info) = detail.search_info.as_ref() {
        println!(
            "{} keywords: {}; range: {} to {}; task: {}",
            style("search").dim(),
            info.keywords.join(", "),
            info.start_date,
            info.end_date,
            info.task_id
        );
    }
    if !detail.deep_search_completed {
        println!(
            "{}",
            style("deep search not yet run for this product").dim()
        );
    }

    if posts.is_empty() {
        println!("\nNo related posts found");
        return;
    }
    println!("\n{}", style("Related posts:").bold());
    for post in posts {
        print_post(post);
    }
}

fn print_post(post: &Post) {
    let author = post.author.as_deref().unwrap_or("unknown");
    let date = post
        .post_date
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown time".to_string());
    let original = if post.is_original { " (original)" } else { "" };
    println!("\n  {} at {}{}", style(author).bold(), date, original);
    if let Some(content) = post.content.as_deref() {
        println!("  {content}");
    }
    println!(
        "  {} likes  {} retweets  {} replies  {} views",
        post.likes, post.retweets, post.replies, post.views
    );
    if let Some(url) = post.post_url.as_deref() {
        println!("  {}", style(url).dim());
    }
}

pub fn print_categories(settings: &CategorySettings) {
    println!("{}", style("Preset categories:").bold());
    for category in &settings.preset {
        let mark = if category.enabled { "x" } else { " " };
        println!("  [{mark}] {}", category.label);
    }
    if settings.custom.is_empty() {
        println!("\nNo custom categories");
    } else {
        println!("\n{}", style("Custom categories:").bold());
        for category in &settings.custom {
            println!("  [x] {}", category.label);
        }
    }
}
