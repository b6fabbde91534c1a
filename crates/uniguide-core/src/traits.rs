use async_trait::async_trait;

/// Text embedding capability.
///
/// One instance must serve both corpus and query embeddings; vectors from
/// different `embedder_id`s are not comparable.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the model/version (e.g. `minilm-l6-v2:d384`).
    fn embedder_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector"))
    }
}

/// Single-shot, stateless text completion.
#[async_trait]
pub trait Completer: Send + Sync {
    /// Provider name used in logs (e.g. "groq").
    fn name(&self) -> &str;

    /// Returns the best completion for `prompt`.
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}
