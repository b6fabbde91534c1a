use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use uniguide_answer::AnswerService;
use uniguide_cli::{build_index, build_service, load_corpus, ChatSession};
use uniguide_core::config::{Config, Settings};
use uniguide_core::traits::Completer;
use uniguide_core::types::Role;
use uniguide_core::Error;

/// Fails its first call, then echoes a fixed reply.
struct FlakyCompleter {
    calls: AtomicUsize,
}

#[async_trait]
impl Completer for FlakyCompleter {
    fn name(&self) -> &str { "flaky" }
    async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            anyhow::bail!("503 service unavailable");
        }
        Ok("The fee is due before the deadline.".to_string())
    }
}

fn fake_settings() -> Settings {
    Config::from_toml_str(
        r#"
        [chunking]
        window_size = 120
        overlap = 20

        [embedding]
        use_fake = true

        [completion]
        api_key_env = "UNIGUIDE_TEST_NEVER_SET_KEY"
        "#,
    )
    .settings()
    .expect("settings")
}

fn write_corpus(dir: &std::path::Path) {
    fs::write(dir.join("ragging_policy.txt"), "Ragging in any form is strictly prohibited. ".repeat(10)).unwrap();
    fs::write(dir.join("fees.md"), "The semester fee must be paid before the deadline.").unwrap();
}

#[test]
fn corpus_loads_and_index_builds_with_fake_embedder() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    let settings = fake_settings();

    let chunks = load_corpus(&settings, tmp.path()).expect("corpus");
    assert!(chunks.len() > 2, "long policy document spans several chunks");
    let index = build_index(&settings, chunks.clone()).expect("index");
    assert_eq!(index.len(), chunks.len());

    let result = index.retrieve("is ragging prohibited", 2).unwrap();
    assert_eq!(result.sources, vec!["ragging_policy.txt".to_string()]);
    assert!(result.confidence > 0.0);
}

#[test]
fn missing_api_key_fails_at_startup() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    let err = build_service(&fake_settings(), tmp.path()).err().expect("startup must fail");
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidConfig(_))), "{err:#}");
}

#[test]
fn missing_docs_dir_is_reported() {
    let tmp = TempDir::new().unwrap();
    let err = load_corpus(&fake_settings(), &tmp.path().join("missing")).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NotFound(_))));
}

#[tokio::test]
async fn failed_chat_turn_keeps_session_usable() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    let settings = fake_settings();
    let index = build_index(&settings, load_corpus(&settings, tmp.path()).unwrap()).unwrap();
    let service = AnswerService::new(Arc::new(index), Arc::new(FlakyCompleter { calls: AtomicUsize::new(0) }));
    let mut session = ChatSession::new(settings.prompt.history_turns);

    let err = session.ask(&service, "when is the fee due").await.unwrap_err();
    assert!(matches!(err, Error::Completion(_)), "{err:?}");
    assert!(session.history().is_empty());

    let answer = session.ask(&service, "when is the fee due").await.unwrap();
    assert_eq!(answer.text, "The fee is due before the deadline.");
    let roles: Vec<Role> = session.history().iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant]);
}
