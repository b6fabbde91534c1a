use std::env;
use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use uniguide_answer::{AnswerService, ChatReply};
use tracing::warn;
use uniguide_cli::{build_service, init_logging, ChatSession};
use uniguide_core::config::{Config, Settings};

struct Args {
    cmd: String,
    question: Vec<String>,
    force_kb: bool,
    json: bool,
    docs_dir: Option<PathBuf>,
}

fn usage(prog: &str) -> ! {
    eprintln!("Usage: {prog} ask \"<question>\" [--force-kb] [--json] [--docs <dir>]");
    eprintln!("       {prog} chat [--json] [--docs <dir>]");
    std::process::exit(1);
}

fn parse_args() -> Args {
    let mut raw: Vec<String> = env::args().collect();
    let prog = raw.remove(0);
    if raw.is_empty() { usage(&prog); }
    let cmd = raw.remove(0);
    let mut args = Args { cmd, question: Vec::new(), force_kb: false, json: false, docs_dir: None };
    let mut i = 0;
    while i < raw.len() {
        match raw[i].as_str() {
            "--force-kb" => args.force_kb = true,
            "--json" => args.json = true,
            "--docs" => {
                i += 1;
                match raw.get(i) { Some(dir) => args.docs_dir = Some(PathBuf::from(dir)), None => usage(&prog) }
            }
            _ => args.question.push(raw[i].clone()),
        }
        i += 1;
    }
    args
}

fn render(answer: &uniguide_core::types::Answer, settings: &Settings, json: bool) -> anyhow::Result<String> {
    if json {
        let reply = ChatReply::from_answer(answer, settings.data.base_doc_url.as_deref());
        return Ok(serde_json::to_string_pretty(&reply)?);
    }
    let mut out = answer.text.clone();
    out.push_str(&format!("\n\n[{} | confidence {:.2}]", answer.tier, answer.confidence));
    for source in &answer.sources {
        out.push_str(&format!("\n  source: {source}"));
    }
    Ok(out)
}

async fn chat_loop(service: &AnswerService, settings: &Settings, json: bool) -> anyhow::Result<()> {
    let mut session = ChatSession::new(settings.prompt.history_turns);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"\nYou> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else { break };
        let question = line.trim();
        if question.is_empty() { continue; }
        if matches!(question, "exit" | "quit") { break; }

        let answer = match session.ask(service, question).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "question failed");
                eprintln!("Error: {e}");
                continue;
            }
        };
        stdout.write_all(render(&answer, settings, json)?.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let args = parse_args();
    let docs_dir = args.docs_dir.clone().unwrap_or_else(|| settings.docs_dir());

    match args.cmd.as_str() {
        "ask" => {
            let question = args.question.join(" ");
            if question.trim().is_empty() { usage("uniguide"); }
            let service = build_service(&settings, &docs_dir)?;
            let answer = service.answer(&question, &[], args.force_kb).await?;
            println!("{}", render(&answer, &settings, args.json)?);
        }
        "chat" => {
            let service = build_service(&settings, &docs_dir)?;
            eprintln!("UniGuide ready ({} chunks). Type 'exit' to quit.", service.index().len());
            chat_loop(&service, &settings, args.json).await?;
        }
        other => { eprintln!("Unknown command: {}", other); usage("uniguide"); }
    }
    Ok(())
}
