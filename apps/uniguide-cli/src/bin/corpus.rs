use std::collections::BTreeMap;
use std::{env, path::PathBuf, time::Instant};

use uniguide_cli::{build_index, init_logging, load_corpus};
use uniguide_core::classifier::ConfidenceClassifier;
use uniguide_core::config::Config;

fn main() -> anyhow::Result<()> {
    init_logging();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let args: Vec<String> = env::args().skip(1).collect();
    let mut docs_dir = None; let mut query = None;
    let mut i = 0; while i < args.len() { match args[i].as_str() {
        "--query" | "-q" => { if i + 1 < args.len() { query = Some(args[i + 1].clone()); i += 1; } else { eprintln!("Error: --query requires a value"); std::process::exit(1); } }
        _ if !args[i].starts_with('-') => docs_dir = Some(PathBuf::from(&args[i])), _ => {} } i += 1; }
    let docs_dir = docs_dir.unwrap_or_else(|| settings.docs_dir());

    println!("UniGuide corpus\n===============");
    println!("Documents: {}", docs_dir.display());
    println!("Chunking: window {} / overlap {}", settings.chunking.window_size, settings.chunking.overlap);
    let chunks = load_corpus(&settings, &docs_dir)?;
    let mut per_source: BTreeMap<&str, usize> = BTreeMap::new();
    for chunk in &chunks { *per_source.entry(chunk.source.as_str()).or_default() += 1; }
    for (source, count) in &per_source { println!("  {:>5}  {}", count, source); }
    println!("{} chunks from {} documents", chunks.len(), per_source.len());

    let start = Instant::now();
    let index = build_index(&settings, chunks)?;
    let embedder_id = index.corpus().map(|c| c.embedder_id().to_string()).unwrap_or_default();
    println!("Index built in {:.2?} with {}", start.elapsed(), embedder_id);

    if let Some(query) = query {
        let classifier = ConfidenceClassifier::from_config(&settings.thresholds)?;
        let result = index.retrieve(&query, settings.retrieval.top_k)?;
        println!("\nQuery: {query}");
        println!("Confidence {:.2} -> {}", result.confidence, classifier.classify(result.confidence, false));
        println!("Sources: {}", result.sources.join(", "));
        println!("\n{}", result.retrieved_text);
    }
    Ok(())
}
