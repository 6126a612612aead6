//! Query Service: question -> graph query -> answer

use crate::{prompts, AgentError, LlmClient, Result};
use kgchat_db::Repository;
use tracing::{debug, info, instrument};

/// Keywords that must never appear in a generated query: anything that
/// could mutate data or the schema, plus session/control statements.
const FORBIDDEN_KEYWORDS: &[&str] = &[
    "CREATE", "INSERT", "UPDATE", "UPSERT", "DELETE", "RELATE", "DEFINE", "REMOVE", "BEGIN",
    "COMMIT", "CANCEL", "KILL", "LIVE", "SLEEP", "USE",
];

/// The answer plus the intermediate steps that produced it.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub answer: String,
    /// The generated graph query (empty when the graph was empty).
    pub query: String,
    /// The raw result rows handed to answer synthesis.
    pub context: String,
}

/// Answers natural-language questions against the graph: one LLM call to
/// translate the question into SurrealQL, one store round trip, one LLM
/// call to phrase the result rows as an answer.
#[derive(Clone)]
pub struct QueryAgent {
    llm: LlmClient,
    repo: Repository,
}

impl QueryAgent {
    pub fn new(llm: LlmClient, repo: Repository) -> Self {
        Self { llm, repo }
    }

    #[instrument(skip(self))]
    pub async fn answer(&self, question: &str) -> Result<QueryOutcome> {
        let counts = self.repo.counts().await?;
        if counts.entities == 0 {
            // Nothing in the graph can answer anything; skip both LLM calls.
            return Ok(QueryOutcome {
                answer: prompts::NO_INFORMATION_ANSWER.to_string(),
                query: String::new(),
                context: "[]".to_string(),
            });
        }

        let raw = self.llm.generate(&prompts::query_prompt(question)).await?;
        let query = sanitize_query(&raw)?;
        info!("Generated query: {}", query);

        let results = self.repo.run_query(&query).await?;
        let context = results.join("\n");
        debug!("Query returned {} result sets", results.len());

        if results_are_empty(&results) {
            return Ok(QueryOutcome {
                answer: prompts::NO_INFORMATION_ANSWER.to_string(),
                query,
                context,
            });
        }

        let answer = self
            .llm
            .generate(&prompts::answer_prompt(question, &context))
            .await?;

        Ok(QueryOutcome {
            answer: answer.trim().to_string(),
            query,
            context,
        })
    }
}

/// Strip fences and whitespace from a generated query and reject anything
/// that is not a single read-only SELECT.
pub fn sanitize_query(raw: &str) -> Result<String> {
    let query = strip_code_fences(raw);
    let query = query.trim().trim_end_matches(';').trim().to_string();

    if query.is_empty() {
        return Err(AgentError::QueryRejected("empty query".into()));
    }

    if !query.to_ascii_uppercase().starts_with("SELECT") {
        return Err(AgentError::QueryRejected(format!(
            "only SELECT statements are allowed: {}",
            query
        )));
    }

    for token in query
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .filter(|t| !t.is_empty())
    {
        if FORBIDDEN_KEYWORDS
            .iter()
            .any(|k| token.eq_ignore_ascii_case(k))
        {
            return Err(AgentError::QueryRejected(format!(
                "forbidden keyword {:?} in query: {}",
                token, query
            )));
        }
    }

    Ok(query)
}

fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let mut lines = trimmed.lines();
    let _ = lines.next(); // drop ``` or ```sql
    let mut content = lines.collect::<Vec<_>>().join("\n");
    if content.ends_with("```") {
        content.truncate(content.len().saturating_sub(3));
    }
    content.trim().to_string()
}

fn results_are_empty(results: &[String]) -> bool {
    results
        .iter()
        .all(|r| matches!(r.trim(), "" | "[]" | "NONE" | "NULL" | "null"))
}
