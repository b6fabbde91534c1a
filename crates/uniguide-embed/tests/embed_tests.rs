use uniguide_core::config::EmbeddingConfig;
use uniguide_core::traits::Embedder;
use uniguide_core::Error;
use uniguide_embed::{get_default_embedder, resolve_model_dir, FakeEmbedder, FAKE_DIM};

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[test]
fn fake_embedder_shapes_and_determinism() {
    let config = EmbeddingConfig { use_fake: true, ..EmbeddingConfig::default() };
    let embedder = get_default_embedder(&config).expect("embedder");
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), FAKE_DIM);
    assert_eq!(embedder.dim(), FAKE_DIM);

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn fake_embedder_prefers_shared_words() {
    let embedder = FakeEmbedder::new(FAKE_DIM);
    let query = embedder.embed("ragging policy").unwrap();
    let related = embedder.embed("the ragging policy of the university").unwrap();
    let unrelated = embedder.embed("library opening hours").unwrap();
    assert!(cosine(&query, &related) > cosine(&query, &unrelated));
}

#[test]
fn embed_single_matches_batch() {
    let embedder = FakeEmbedder::new(64);
    let single = embedder.embed("fee refund").unwrap();
    let batch = embedder.embed_batch(&["fee refund".to_string()]).unwrap();
    assert_eq!(single, batch[0]);
    assert!(embedder.embedder_id().ends_with(":d64"));
}

#[test]
fn missing_configured_model_dir_is_config_error() {
    let tmp = tempfile::tempdir().unwrap();
    let err = resolve_model_dir(Some(tmp.path().join("absent"))).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidConfig(_))));
}
