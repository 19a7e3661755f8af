//! Analyze command implementation.

use crate::cli::AnalyzeArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use faris_domain::traits::ReasoningBackend;
use faris_domain::{AnalysisRequest, AnalysisResult};
use faris_engine::{EngineConfig, Orchestrator};
use faris_store::{MockEmbeddingModel, PatternStore, SqliteCaseStore};
use std::fmt::Display;
use std::fs;
use std::sync::Arc;
use tracing::info;

/// Build the request from `--input` or the individual flags.
pub fn build_request(args: &AnalyzeArgs) -> Result<AnalysisRequest> {
    if let Some(path) = &args.input {
        let contents = fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&contents)?);
    }

    let (Some(question), Some(answer)) = (&args.question, &args.answer) else {
        return Err(CliError::InvalidInput(
            "Both --question and --answer are required without --input".to_string(),
        ));
    };
    let mut request = AnalysisRequest::new(question, answer, args.domain.into());
    if let Some(context) = &args.context {
        request = request.with_context(context);
    }
    Ok(request)
}

/// Engine settings after applying `--preset` and `--offline`.
pub fn engine_config(args: &AnalyzeArgs, config: &Config) -> Result<EngineConfig> {
    let mut engine = match args.preset {
        Some(preset) => EngineConfig::preset(preset.as_str())
            .ok_or_else(|| CliError::Config(format!("Unknown preset '{}'", preset.as_str())))?,
        None => config.engine.clone(),
    };
    if args.offline {
        engine.use_reasoning_backend = false;
    }
    Ok(engine)
}

/// Run one analysis against `backend`, persisting it when a database is set.
///
/// With a database, past failure patterns are loaded from it so the
/// explanation can point at similar earlier cases.
pub async fn analyze_with<B>(backend: Arc<B>, args: &AnalyzeArgs, config: &Config) -> Result<AnalysisResult>
where
    B: ReasoningBackend + Send + Sync + 'static,
    B::Error: Display,
{
    let request = build_request(args)?;
    let mut orchestrator = Orchestrator::new(backend, engine_config(args, config)?)?;

    if let Some(path) = args.db.clone().or_else(|| config.database.clone()) {
        let cases = Arc::new(SqliteCaseStore::new(&path)?);
        let patterns = PatternStore::load(MockEmbeddingModel::default(), cases.patterns()?)?;
        info!("Using case database {} ({} past patterns)", path.display(), patterns.len());
        orchestrator = orchestrator
            .with_similarity_store(Arc::new(patterns))
            .with_case_sink(cases);
    }

    Ok(orchestrator.analyze(request).await?)
}

/// Execute the analyze command.
pub async fn execute_analyze(args: AnalyzeArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut backend = config.backend.clone();
    if let Some(model) = &args.model {
        backend.model = model.clone();
    }

    let result = analyze_with(Arc::new(backend.provider()), &args, config).await?;
    println!("{}", formatter.format_result(&result)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command, PresetArg};
    use clap::Parser;
    use faris_domain::{Domain, FailureType, RiskLevel};
    use faris_llm::MockProvider;
    use tempfile::TempDir;

    fn analyze_args(argv: &[&str]) -> AnalyzeArgs {
        let mut full = vec!["faris", "analyze"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Command::Analyze(args) => args,
            _ => panic!("Expected Analyze command"),
        }
    }

    const ASPIRIN: [&str; 7] = [
        "-q",
        "What are the side effects of aspirin?",
        "-a",
        "Aspirin has no side effects and is completely safe for everyone.",
        "-d",
        "medical",
        "--offline",
    ];

    #[test]
    fn test_request_from_flags() {
        let args = analyze_args(&["-q", "Why?", "-a", "Because.", "--context", "docs"]);
        let request = build_request(&args).unwrap();
        assert_eq!(request.domain, Domain::General);
        assert_eq!(request.context.as_deref(), Some("docs"));
    }

    #[test]
    fn test_request_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("request.json");
        fs::write(
            &path,
            r#"{"question": "Is it legal?", "answer": "Yes, always.", "domain": "legal"}"#,
        )
        .unwrap();

        let args = analyze_args(&["--input", path.to_str().unwrap()]);
        let request = build_request(&args).unwrap();
        assert_eq!(request.domain, Domain::Legal);
        assert_eq!(request.answer, "Yes, always.");
    }

    #[test]
    fn test_engine_config_overrides() {
        let mut args = analyze_args(&ASPIRIN);
        args.preset = Some(PresetArg::Lenient);
        let engine = engine_config(&args, &Config::default()).unwrap();
        assert!(!engine.use_reasoning_backend);
        assert_eq!(engine.max_claims, EngineConfig::lenient().max_claims);
    }

    #[tokio::test]
    async fn test_offline_analysis_persisted() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("faris.db");
        let mut config = Config::default();
        config.database = Some(db.clone());

        let provider = MockProvider::default();
        let args = analyze_args(&ASPIRIN);
        let first = analyze_with(Arc::new(provider.clone()), &args, &config).await.unwrap();
        let second = analyze_with(Arc::new(provider.clone()), &args, &config).await.unwrap();

        assert_eq!(provider.call_count(), 0);
        assert_eq!(first.failure_types, vec![FailureType::Overconfidence]);
        assert_eq!(first.risk_assessment.level, RiskLevel::Low);
        assert!(second
            .explanation
            .similar_failures
            .iter()
            .any(|s| s.case_id == first.case_id));

        let store = SqliteCaseStore::new(&db).unwrap();
        assert_eq!(store.stats().unwrap().total_cases, 2);
        assert_eq!(store.get(first.case_id).unwrap(), Some(first));
    }
}
