use uniguide_core::config::EmbeddingConfig;
use uniguide_embed::get_default_embedder;

fn main() -> anyhow::Result<()> {
    let embedder = get_default_embedder(&EmbeddingConfig::default())?;
    let texts = vec!["What counts as ragging?".to_string(), "hostel curfew timings".to_string()];
    let embs = embedder.embed_batch(&texts)?;
    println!("{} B={} dim={}", embedder.embedder_id(), embs.len(), embedder.dim());
    Ok(())
}
