//! Embedded corpus and nearest-neighbour retrieval over it.
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use uniguide_core::traits::Embedder;
use uniguide_core::types::{Chunk, RetrievalResult, SourceId};
use uniguide_core::{Error, Result};

use crate::cache::{CacheStats, QueryEmbeddingCache};
use crate::similarity::cosine_similarity;

const BUILD_BATCH: usize = 64;

/// Every chunk paired with its embedding, in chunk order. Immutable once built.
pub struct CorpusIndex {
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
    embedder_id: String,
    dim: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a Chunk,
    pub score: f32,
}

impl CorpusIndex {
    /// Embed all chunk texts with `embedder`, in batches, showing progress.
    pub fn build(chunks: Vec<Chunk>, embedder: &dyn Embedder) -> Result<Self> {
        let start = Instant::now();
        let pb = ProgressBar::new(chunks.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%)") {
            pb.set_style(style.progress_chars("#>-"));
        }
        let mut vectors = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(BUILD_BATCH) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embedded = embedder.embed_batch(&texts).map_err(|e| Error::Embedding(format!("{e:#}")))?;
            if embedded.len() != batch.len() {
                return Err(Error::Embedding(format!("embedder returned {} vectors for {} chunks", embedded.len(), batch.len())));
            }
            vectors.extend(embedded);
            pb.inc(batch.len() as u64);
        }
        pb.finish_and_clear();

        let dim = embedder.dim();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
            return Err(Error::Embedding(format!("corpus vector has dimension {}, embedder reports {}", bad.len(), dim)));
        }
        info!(chunks = chunks.len(), dim, embedder = embedder.embedder_id(), elapsed_ms = start.elapsed().as_millis() as u64, "corpus index built");
        Ok(Self { chunks, vectors, embedder_id: embedder.embedder_id().to_string(), dim })
    }

    pub fn len(&self) -> usize { self.chunks.len() }
    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }
    pub fn dim(&self) -> usize { self.dim }
    pub fn embedder_id(&self) -> &str { &self.embedder_id }
    pub fn chunks(&self) -> &[Chunk] { &self.chunks }

    /// Score every chunk against `query` and sort best first. The sort is
    /// stable, so equal scores keep corpus order.
    pub fn rank(&self, query: &[f32]) -> Vec<ScoredChunk<'_>> {
        let mut scored: Vec<ScoredChunk<'_>> = self
            .chunks
            .iter()
            .zip(&self.vectors)
            .map(|(chunk, vector)| ScoredChunk { chunk, score: cosine_similarity(query, vector) })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }
}

/// Process-wide retrieval entry point: the embedder, the corpus built from it,
/// and the query-embedding cache.
///
/// `build` takes `&mut self`, so it cannot overlap with `retrieve`; share the
/// built index behind an `Arc` to serve concurrent requests.
pub struct EmbeddingIndex {
    embedder: Arc<dyn Embedder>,
    corpus: Option<CorpusIndex>,
    cache: QueryEmbeddingCache,
}

impl EmbeddingIndex {
    pub fn new(embedder: Arc<dyn Embedder>, cache_capacity: usize) -> Self {
        Self { embedder, corpus: None, cache: QueryEmbeddingCache::new(cache_capacity) }
    }

    /// Construct and build in one step.
    pub fn from_chunks(embedder: Arc<dyn Embedder>, cache_capacity: usize, chunks: Vec<Chunk>) -> Result<Self> {
        let mut index = Self::new(embedder, cache_capacity);
        index.build(chunks)?;
        Ok(index)
    }

    /// Replace the corpus wholesale with an embedding of `chunks`.
    pub fn build(&mut self, chunks: Vec<Chunk>) -> Result<()> {
        self.corpus = Some(CorpusIndex::build(chunks, self.embedder.as_ref())?);
        Ok(())
    }

    pub fn is_ready(&self) -> bool { self.corpus.is_some() }
    pub fn len(&self) -> usize { self.corpus.as_ref().map_or(0, CorpusIndex::len) }
    pub fn is_empty(&self) -> bool { self.len() == 0 }
    pub fn corpus(&self) -> Option<&CorpusIndex> { self.corpus.as_ref() }
    pub fn cache_stats(&self) -> CacheStats { self.cache.stats() }
    pub fn clear_cache(&self) { self.cache.clear() }

    /// Top-`top_k` chunks for `query`.
    ///
    /// An unbuilt or empty index yields the empty result (confidence 0).
    /// Failing to embed the query is an error.
    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<RetrievalResult> {
        let Some(corpus) = &self.corpus else {
            debug!("retrieval before index build; returning empty result");
            return Ok(RetrievalResult::empty());
        };
        if corpus.is_empty() || top_k == 0 {
            return Ok(RetrievalResult::empty());
        }

        // Checked before insertion so a mismatched vector is never cached.
        let query_vec = self
            .cache
            .get_or_compute(query, || {
                let vector = self.embedder.embed(query)?;
                anyhow::ensure!(
                    vector.len() == corpus.dim(),
                    "query vector has dimension {}, corpus ({}) has {}",
                    vector.len(),
                    corpus.embedder_id(),
                    corpus.dim()
                );
                Ok(vector)
            })
            .map_err(|e| Error::Embedding(format!("{e:#}")))?;

        let ranked = corpus.rank(&query_vec);
        let selected = &ranked[..top_k.min(ranked.len())];

        let confidence = selected.iter().map(|s| s.score).fold(f32::NEG_INFINITY, f32::max).clamp(0.0, 1.0);
        let retrieved_text = selected.iter().map(|s| s.chunk.text.as_str()).collect::<Vec<_>>().join("\n\n").trim().to_string();
        let mut sources: Vec<SourceId> = Vec::new();
        for scored in selected {
            if !sources.contains(&scored.chunk.source) {
                sources.push(scored.chunk.source.clone());
            }
        }
        debug!(top_k = selected.len(), confidence, sources = ?sources, "retrieved");
        Ok(RetrievalResult { retrieved_text, confidence, sources })
    }
}
