//! Question store and one-shot startup seeding
//!
//! The store is bulk-replaced once from the remote seed source and read-only
//! afterward. Seeding runs as an independent task so it never blocks
//! connection acceptance; until it lands (or if it fails) `random_one`
//! simply answers None, which the HTTP layer maps to an empty response.

use log::info;
use rand::seq::SliceRandom;
use serde_json::Value;
use shared::Question;
use tokio::sync::RwLock;

/// In-memory question collection shared between the seeder task and the
/// HTTP handlers.
#[derive(Debug, Default)]
pub struct QuestionStore {
    questions: RwLock<Vec<Question>>,
}

impl QuestionStore {
    pub fn new() -> Self {
        Self {
            questions: RwLock::new(Vec::new()),
        }
    }

    /// Atomically swaps in a new question set.
    pub async fn replace_all(&self, questions: Vec<Question>) {
        *self.questions.write().await = questions;
    }

    /// One record chosen uniformly at random, or None while the store is
    /// empty (not yet seeded, or seeding failed).
    pub async fn random_one(&self) -> Option<Question> {
        self.questions
            .read()
            .await
            .choose(&mut rand::thread_rng())
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.questions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.questions.read().await.is_empty()
    }
}

/// Parses the seed payload: a JSON object keyed by question text, each value
/// the list of answers. Some published blobs start with a UTF-8 BOM, which
/// serde_json rejects, so it is stripped first.
pub fn parse_seed(body: &str) -> Result<Vec<Question>, serde_json::Error> {
    let body = body.trim_start_matches('\u{feff}');
    let map: serde_json::Map<String, Value> = serde_json::from_str(body)?;

    Ok(map
        .into_iter()
        .map(|(question, answers)| Question {
            question,
            answers: match answers {
                Value::Array(answers) => answers,
                other => vec![other],
            },
        })
        .collect())
}

/// Fetches the remote seed source and bulk-replaces the store. Any fetch or
/// parse failure leaves the store untouched; the caller logs and moves on.
pub async fn seed_questions(
    store: &QuestionStore,
    url: &str,
) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
    let body = reqwest::get(url).await?.error_for_status()?.text().await?;
    let questions = parse_seed(&body)?;
    let count = questions.len();

    store.replace_all(questions).await;
    info!("Question store replaced with {} records", count);

    Ok(count)
}
