//! Sequential question batch.
//!
//! Questions go to the model one at a time. Each answer is analyzed and
//! folded into the counts before the next question is sent. A failed
//! request is reported, recorded as unanswered, and followed by a short
//! pause; it never stops the batch.

use crate::analysis::{AggregateCounts, ResponseAnalyzer};
use crate::client::{ClientError, ModelClient, PromptSet};
use crate::models::ResultEntry;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{debug, info};

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Wait after a failed request before moving on.
    pub failure_pause: Duration,
    pub show_progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            failure_pause: Duration::from_secs(5),
            show_progress: true,
        }
    }
}

/// Everything a finished batch produced.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    /// One entry per question, in question order.
    pub entries: Vec<ResultEntry>,
    pub counts: AggregateCounts,
}

impl RunOutcome {
    /// Questions that produced a response.
    pub fn answered(&self) -> usize {
        self.entries.iter().filter(|e| e.is_answered()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.answered()
    }
}

/// Drives one run over a question list.
pub struct BatchRunner<'a> {
    client: &'a dyn ModelClient,
    analyzer: &'a ResponseAnalyzer,
    prompts: &'a PromptSet,
    options: RunOptions,
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        client: &'a dyn ModelClient,
        analyzer: &'a ResponseAnalyzer,
        prompts: &'a PromptSet,
        options: RunOptions,
    ) -> Self {
        Self {
            client,
            analyzer,
            prompts,
            options,
        }
    }

    /// Ask every question in order and collect the results.
    pub async fn run(&self, questions: &[String]) -> RunOutcome {
        info!(
            "Asking {} question(s) with model {}",
            questions.len(),
            self.client.model()
        );

        let pb = self.progress_bar(questions.len());
        let mut outcome = RunOutcome::default();

        for (i, question) in questions.iter().enumerate() {
            pb.set_message(format!("question {}", i + 1));
            debug!("Question {}: {}", i + 1, question);

            match self.client.request(question, self.prompts).await {
                Ok(response) => {
                    let analysis = self.analyzer.analyze(Some(&response));
                    debug!(
                        "Response {}: {} chars, {} brand(s), {} domain(s)",
                        i + 1,
                        analysis.response_length,
                        analysis.products.len(),
                        analysis.resources.domains.len()
                    );
                    outcome.counts.record(&analysis);
                    outcome
                        .entries
                        .push(ResultEntry::answered(question.clone(), response, analysis));
                }
                Err(e) => {
                    // Shown even with --quiet
                    let notice = failure_notice(i + 1, &e);
                    pb.suspend(|| eprintln!("{}", notice));
                    outcome.entries.push(ResultEntry::unanswered(question.clone()));

                    if !self.options.failure_pause.is_zero() {
                        tokio::time::sleep(self.options.failure_pause).await;
                    }
                }
            }

            pb.inc(1);
        }

        pb.finish_with_message("done");
        info!(
            "Run complete: {} answered, {} failed",
            outcome.answered(),
            outcome.failed()
        );

        outcome
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

/// One-line notice for a failed question, numbered from 1.
fn failure_notice(number: usize, err: &ClientError) -> String {
    format!("⚠️  Question {} failed: {}", number, err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::BrandList;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers from a fixed script; questions not in it fail.
    struct ScriptedClient {
        answers: HashMap<String, String>,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(answers: &[(&str, &str)]) -> Self {
            Self {
                answers: answers
                    .iter()
                    .map(|(q, a)| (q.to_string(), a.to_string()))
                    .collect(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn request(&self, question: &str, prompts: &PromptSet) -> Result<String, ClientError> {
            self.seen.lock().unwrap().push(prompts.user_message(question));
            self.answers
                .get(question)
                .cloned()
                .ok_or(ClientError::Api {
                    status: 500,
                    body: "boom".to_string(),
                })
        }
    }

    fn options() -> RunOptions {
        RunOptions {
            failure_pause: Duration::ZERO,
            show_progress: false,
        }
    }

    fn questions(qs: &[&str]) -> Vec<String> {
        qs.iter().map(|q| q.to_string()).collect()
    }

    #[tokio::test]
    async fn test_run_collects_entries_in_order() {
        let client = ScriptedClient::new(&[
            ("Q1", "Acme at https://acme.com/a"),
            ("Q2", "Globex and acme, see globex.net"),
        ]);
        let analyzer = ResponseAnalyzer::new(BrandList::new(["Acme", "Globex"])).unwrap();
        let prompts = PromptSet::new("sys", "Ask: {question}");

        let outcome = BatchRunner::new(&client, &analyzer, &prompts, options())
            .run(&questions(&["Q1", "Q2"]))
            .await;

        assert_eq!(outcome.entries.len(), 2);
        assert_eq!(outcome.entries[0].question, "Q1");
        assert_eq!(outcome.answered(), 2);
        assert_eq!(outcome.counts.brand_count("Acme"), 2);
        assert_eq!(outcome.counts.brand_count("Globex"), 1);
        assert_eq!(outcome.counts.domains.get("acme.com"), Some(&1));
        assert_eq!(
            *client.seen.lock().unwrap(),
            vec!["Ask: Q1".to_string(), "Ask: Q2".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_run() {
        let client = ScriptedClient::new(&[("Q2", "nothing notable here")]);
        let analyzer = ResponseAnalyzer::new(BrandList::new(["Acme"])).unwrap();
        let prompts = PromptSet::new("sys", "{question}");

        let outcome = BatchRunner::new(&client, &analyzer, &prompts, options())
            .run(&questions(&["Q1", "Q2"]))
            .await;

        assert_eq!(outcome.entries.len(), 2);
        assert!(!outcome.entries[0].is_answered());
        assert!(outcome.entries[0].analysis.is_none());
        assert!(outcome.entries[1].is_answered());
        assert_eq!(outcome.answered(), 1);
        assert_eq!(outcome.failed(), 1);
        assert!(outcome.counts.domains.is_empty());
        assert!(outcome.counts.brands.is_empty());
    }

    #[test]
    fn test_failure_notice() {
        let err = ClientError::Api {
            status: 429,
            body: "slow down".to_string(),
        };
        assert_eq!(
            failure_notice(2, &err),
            "⚠️  Question 2 failed: API error 429: slow down"
        );
    }

    #[test]
    fn test_all_failures() {
        let client = ScriptedClient::new(&[]);
        let analyzer = ResponseAnalyzer::new(BrandList::default()).unwrap();
        let prompts = PromptSet::new("sys", "{question}");
        let runner = BatchRunner::new(&client, &analyzer, &prompts, options());

        let outcome = tokio_test::block_on(runner.run(&questions(&["A", "B", "C"])));

        assert_eq!(outcome.failed(), 3);
        assert_eq!(client.seen.lock().unwrap().len(), 3);
    }
}
