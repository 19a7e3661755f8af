//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use faris_domain::{AnalysisResult, FailureType, RiskLevel};
use faris_engine::TaxonomyEntry;
use faris_store::{CaseStats, CaseSummary};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format one analysis result.
    pub fn format_result(&self, result: &AnalysisResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
            OutputFormat::Table => Ok(self.format_result_table(result)),
            OutputFormat::Quiet => Ok(format!(
                "{} {:.3} {}",
                result.case_id, result.risk_assessment.score, result.risk_assessment.level
            )),
        }
    }

    fn format_result_table(&self, result: &AnalysisResult) -> String {
        let risk = &result.risk_assessment;
        let mut sections = vec![
            format!(
                "Risk: {} ({:.2}, interval {:.2}-{:.2})",
                self.colorize(&risk.level.to_string().to_uppercase(), risk_color(risk.level)),
                risk.score,
                risk.confidence_interval.lower,
                risk.confidence_interval.upper
            ),
            format!("Case: {}", result.case_id),
            String::new(),
            result.explanation.summary.clone(),
        ];

        if !result.failures.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Type", "Severity", "Confidence", "Claims", "Description"]);
            for finding in &result.failures {
                let claims: Vec<String> = finding.claim_ids.iter().map(|id| id.to_string()).collect();
                builder.push_record([
                    finding.failure_type.display_name().to_string(),
                    finding.severity.to_string(),
                    format!("{:.0}%", finding.confidence * 100.0),
                    claims.join(", "),
                    finding.description.clone(),
                ]);
            }
            sections.push(String::new());
            sections.push(self.heading("Failures"));
            sections.push(table(builder));
        }

        if !result.claims.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["ID", "Verdict", "Claim"]);
            for claim in &result.claims {
                builder.push_record([
                    claim.id.to_string(),
                    claim.verdict.as_str().to_string(),
                    claim.text.clone(),
                ]);
            }
            sections.push(String::new());
            sections.push(self.heading("Claims"));
            sections.push(table(builder));
        }

        if !result.recommendations.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Priority", "Kind", "Recommendation", "Addresses"]);
            for rec in &result.recommendations {
                let addresses: Vec<&str> = rec.addresses.iter().map(FailureType::display_name).collect();
                builder.push_record([
                    rec.priority.to_string(),
                    rec.kind.to_string(),
                    rec.title.clone(),
                    addresses.join(", "),
                ]);
            }
            sections.push(String::new());
            sections.push(self.heading("Recommendations"));
            sections.push(table(builder));
        }

        if !result.explanation.similar_failures.is_empty() {
            sections.push(String::new());
            sections.push(self.heading("Similar past failures"));
            for similar in &result.explanation.similar_failures {
                sections.push(format!(
                    "  {} {} ({:.2}): {}",
                    similar.case_id,
                    similar.failure_type.display_name(),
                    similar.similarity,
                    similar.description
                ));
            }
        }

        if result.degraded {
            sections.push(String::new());
            for d in &result.degradations {
                sections.push(self.warning(&format!("{} degraded in {}: {}", d.component, d.stage, d.reason)));
            }
        }

        sections.join("\n")
    }

    /// Format the failure taxonomy.
    pub fn format_taxonomy(&self, entries: &[TaxonomyEntry]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(entries)?),
            OutputFormat::Quiet => Ok(entries
                .iter()
                .map(|e| e.failure_type.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Failure Type", "Description", "Mitigation"]);
                for entry in entries {
                    builder.push_record([
                        entry.failure_type.display_name().to_string(),
                        entry.description.to_string(),
                        entry.mitigation_strategies.join("\n"),
                    ]);
                }
                Ok(table(builder))
            }
        }
    }

    /// Format a case listing.
    pub fn format_cases(&self, cases: &[CaseSummary]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(cases)?),
            OutputFormat::Quiet => Ok(cases
                .iter()
                .map(|c| c.case_id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if cases.is_empty() {
                    return Ok(self.colorize("No cases found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Case", "Domain", "Risk", "Score", "Question"]);
                for case in cases {
                    let mut risk = case.risk_level.clone();
                    if case.degraded {
                        risk.push('*');
                    }
                    builder.push_record([
                        case.case_id.to_string(),
                        case.domain.clone(),
                        risk,
                        format!("{:.2}", case.risk_score),
                        truncate(&case.question, 60),
                    ]);
                }
                Ok(table(builder))
            }
        }
    }

    /// Format case statistics.
    pub fn format_stats(&self, stats: &CaseStats) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(stats)?);
        }

        let mut lines = vec![
            format!("Cases: {}", stats.total_cases),
            format!("With failures: {}", stats.failed_cases),
            format!("Degraded: {}", stats.degraded_cases),
        ];
        if let Some(mean) = stats.mean_risk_score {
            lines.push(format!("Mean risk score: {:.3}", mean));
        }
        if self.format == OutputFormat::Table && !stats.failures_by_type.is_empty() {
            lines.push(String::new());
            lines.push(self.heading("Failures by type"));
            for (failure_type, count) in &stats.failures_by_type {
                lines.push(format!("  {}: {}", failure_type, count));
            }
        }
        Ok(lines.join("\n"))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn heading(&self, text: &str) -> String {
        if self.color_enabled {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn risk_color(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "green",
        RiskLevel::Medium => "yellow",
        RiskLevel::High => "red",
    }
}

fn table(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use faris_domain::{
        AnalysisMetadata, AnalysisRequest, AnswerKind, CaseId, Claim, ClaimId, Degradation, Domain,
        Explanation, ExplanationSource, FailureFinding, PipelineStage, Severity, Verdict,
    };
    use faris_scoring::RiskScorer;
    use std::collections::BTreeMap;

    fn create_test_result() -> AnalysisResult {
        let finding = FailureFinding::new(
            FailureType::Hallucination,
            Severity::Critical,
            0.95,
            "Claims aspirin has no side effects",
        )
        .with_claims([ClaimId::from_ordinal(1)]);
        let mut claim = Claim::new(ClaimId::from_ordinal(1), "Aspirin has no side effects");
        claim.verdict = Verdict::False;

        AnalysisResult {
            case_id: CaseId::new(),
            request: AnalysisRequest::new("Side effects of aspirin?", "None.", Domain::Medical),
            failure_detected: true,
            failure_types: vec![FailureType::Hallucination],
            failures: vec![finding.clone()],
            claims: vec![claim],
            risk_assessment: RiskScorer::default().score(&[finding], Domain::Medical),
            recommendations: Vec::new(),
            explanation: Explanation {
                summary: "The answer denies known risks.".to_string(),
                detailed_analysis: String::new(),
                key_findings: Vec::new(),
                source: ExplanationSource::Template,
                similar_failures: Vec::new(),
            },
            degraded: true,
            degradations: vec![Degradation {
                stage: PipelineStage::Detecting,
                component: "scope_violation".to_string(),
                reason: "timed out".to_string(),
            }],
            metadata: AnalysisMetadata {
                answer_kind: AnswerKind::Response,
                dropped_findings: 0,
                assumptions: Vec::new(),
                reasoning_chain: Vec::new(),
                stage_timings_ms: BTreeMap::new(),
                created_at: 0,
            },
        }
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_result(&create_test_result()).unwrap();
        assert!(output.starts_with("Risk: MEDIUM"));
        assert!(output.contains("Hallucination"));
        assert!(output.contains("Aspirin has no side effects"));
        assert!(output.contains("false"));
        assert!(output.contains("⚠ scope_violation degraded in detecting: timed out"));
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let result = create_test_result();
        let output = formatter.format_result(&result).unwrap();
        let parsed: AnalysisResult = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.case_id, result.case_id);
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let result = create_test_result();
        let output = formatter.format_result(&result).unwrap();
        assert!(output.starts_with(&result.case_id.to_string()));
        assert!(output.ends_with("medium"));
    }

    #[test]
    fn test_taxonomy_formats() {
        let table = Formatter::new(OutputFormat::Table, false)
            .format_taxonomy(faris_engine::taxonomy())
            .unwrap();
        assert!(table.contains("Logical Inconsistency"));

        let quiet = Formatter::new(OutputFormat::Quiet, false)
            .format_taxonomy(faris_engine::taxonomy())
            .unwrap();
        assert_eq!(quiet.lines().count(), 6);
    }

    #[test]
    fn test_empty_cases() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_cases(&[]).unwrap();
        assert_eq!(output, "No cases found.");
    }

    #[test]
    fn test_stats_format() {
        let mut failures_by_type = BTreeMap::new();
        failures_by_type.insert("hallucination".to_string(), 3);
        let stats = CaseStats {
            total_cases: 4,
            failed_cases: 3,
            degraded_cases: 1,
            mean_risk_score: Some(0.5),
            failures_by_type,
        };

        let output = Formatter::new(OutputFormat::Table, false).format_stats(&stats).unwrap();
        assert!(output.contains("Cases: 4"));
        assert!(output.contains("Mean risk score: 0.500"));
        assert!(output.contains("  hallucination: 3"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer question", 10), "a longe...");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.error("bad"), "✗ bad");
    }
}
