/// Example: querying a small collection of nested records

use entity_query::core::config::Config;
use entity_query::core::engine::QueryEngine;
use entity_query::query::ast::Query;
use entity_query::query::types::{Conditions, SearchOptions};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Normalize records by their id field
    let records = vec![
        json!({"id": "1", "type": "fruit", "color": "red", "meta": {"tag": "x"}}),
        json!({"id": "2", "type": "fruit", "color": "green", "meta": {"tag": "y"}}),
        json!({"id": "3", "type": "veg", "color": "red", "meta": {"tag": "x"}}),
    ];
    let engine = QueryEngine::from_records(records, Config::default())?;

    // 2. Single sub-query, default conditions
    let fruit = engine.search_value(Some(&json!({"type": "fruit"})), &SearchOptions::new())?;
    println!("fruit: {:?}", fruit);

    // 3. Several sub-queries under each condition mode
    let query = json!([{"type": "fruit"}, {"color": "red"}]);
    for mode in ["all", "any", "diff", "none"] {
        let ids = engine.search_value(Some(&query), &SearchOptions::parse(mode)?)?;
        println!("{:>4}: {:?}", mode, ids);
    }

    // 4. Nested fields and patterns
    let tagged = engine.filter_value(Some(&json!({"meta": {"tag": "x"}})), &SearchOptions::new())?;
    println!("tag x: {}", tagged.len());

    let typed = vec![Query::new().with_pattern("color", "/^GR/i")?];
    let first = engine.find(Some(&typed), &SearchOptions::from(Conditions::All))?;
    println!("first green-ish: {}", first.map(|r| r.to_string()).unwrap_or_default());

    // 5. Cache statistics
    let stats = engine.stats();
    println!("\n{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}
