use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use crate::core::config::Settings;
use crate::db::types::UserRole;
use crate::schemas::quiz::QuestionPayload;

/// Client for the OpenAI-compatible chat completions endpoint used to draft
/// quiz questions. Generated questions are returned to the caller for review;
/// nothing is persisted here.
#[derive(Debug, Clone)]
pub(crate) struct QuizGenerationService {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl QuizGenerationService {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.ai().ai_request_timeout);
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: settings.ai().openai_api_key.clone(),
            base_url: settings.ai().openai_base_url.trim_end_matches('/').to_string(),
            model: settings.ai().ai_model.clone(),
            max_tokens: settings.ai().ai_max_tokens,
        })
    }

    pub(crate) fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Asks the model for `count` questions on `theme`. The question-kind
    /// policy is enforced here and only here: `ecole` owners receive
    /// multiple-choice questions exclusively, `entreprise` owners a mix.
    pub(crate) async fn generate(
        &self,
        theme: &str,
        count: u32,
        role: UserRole,
    ) -> Result<Vec<QuestionPayload>> {
        let timer = Instant::now();
        let mcq_only = matches!(role, UserRole::Ecole);
        let prompt = build_prompt(theme, count, mcq_only);

        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "max_completion_tokens": self.max_tokens,
        });

        tracing::info!(theme = %theme, count = count, "Sending quiz generation request");

        let url = format!("{}/chat/completions", self.base_url);
        let mut last_error = None;
        let mut body = Value::Null;

        for attempt in 0..=3 {
            let response =
                self.client.post(&url).bearer_auth(&self.api_key).json(&payload).send().await;

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    body = resp.json().await.unwrap_or(Value::Null);
                    if status.is_success() {
                        last_error = None;
                        break;
                    }
                    last_error = Some(anyhow::anyhow!("AI API error: {body}"));
                }
                Err(err) => {
                    last_error = Some(anyhow::anyhow!(err).context("Failed to call AI API"));
                }
            }

            if attempt < 3 {
                tokio::time::sleep(Duration::from_secs(2_u64.pow(attempt as u32))).await;
            }
        }

        if let Some(err) = last_error {
            return Err(err);
        }

        let content = body
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|value| value.as_str())
            .context("Missing AI response content")?;

        let questions = parse_generated_questions(content, mcq_only)?;

        let tokens_used = body
            .get("usage")
            .and_then(|usage| usage.get("total_tokens"))
            .and_then(|value| value.as_u64());

        tracing::info!(
            theme = %theme,
            generated = questions.len(),
            duration_seconds = timer.elapsed().as_secs_f64(),
            tokens_used = tokens_used,
            "Quiz generation completed"
        );

        Ok(questions)
    }
}

fn build_prompt(theme: &str, count: u32, mcq_only: bool) -> String {
    let allowed_kinds = if mcq_only {
        "uniquement des questions à choix multiples (kind \"mcq\")"
    } else {
        "un mélange de questions à choix multiples (kind \"mcq\") et de questions à réponse libre (kind \"free\")"
    };

    format!(
        r#"Génère {count} questions de quiz en français sur le thème "{theme}".

IMPORTANT: Tu dois générer {allowed_kinds}.

Pour chaque question, respecte STRICTEMENT ce format JSON:

Question à choix multiples:
{{"kind": "mcq", "question": "Texte de la question", "choices": ["Choix 1", "Choix 2", "Choix 3", "Choix 4"], "answer": "La bonne réponse exacte parmi les choix"}}

Question à réponse libre:
{{"kind": "free", "question": "Texte de la question"}}

Règles:
- Pour les questions "mcq", fournis exactement 4 choix de réponse
- Le champ "answer" doit contenir la valeur exacte de la bonne réponse (pas l'index)
- Retourne uniquement un tableau JSON valide, sans texte avant ou après
- Ne pas inclure de numérotation dans les questions"#,
    )
}

/// Strips optional markdown fences then parses and validates the model
/// output. A free-response question in mcq-only mode is a hard error rather
/// than something to silently drop.
fn parse_generated_questions(content: &str, mcq_only: bool) -> Result<Vec<QuestionPayload>> {
    let cleaned = content.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    let questions: Vec<QuestionPayload> =
        serde_json::from_str(cleaned).context("Failed to parse generated questions")?;

    if questions.is_empty() {
        bail!("Model returned no questions");
    }

    for question in &questions {
        match question {
            QuestionPayload::Mcq { question, choices, answer } => {
                if question.trim().is_empty() || answer.trim().is_empty() || choices.is_empty() {
                    bail!("Model returned an incomplete multiple-choice question");
                }
            }
            QuestionPayload::Free { question } => {
                if mcq_only {
                    bail!("Model returned a free-response question in mcq-only mode");
                }
                if question.trim().is_empty() {
                    bail!("Model returned an empty free-response question");
                }
            }
        }
    }

    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_json_array() {
        let content = r#"```json
[
    {"kind": "mcq", "question": "Capitale de la France ?", "choices": ["Paris", "Lyon", "Marseille", "Bordeaux"], "answer": "Paris"},
    {"kind": "free", "question": "Explique le concept de photosynthèse"}
]
```"#;

        let questions = parse_generated_questions(content, false).expect("parsed");
        assert_eq!(questions.len(), 2);
        assert!(matches!(questions[0], QuestionPayload::Mcq { .. }));
        assert!(matches!(questions[1], QuestionPayload::Free { .. }));
    }

    #[test]
    fn rejects_free_question_in_mcq_only_mode() {
        let content = r#"[{"kind": "free", "question": "Question ouverte"}]"#;

        let err = parse_generated_questions(content, true).unwrap_err();
        assert!(err.to_string().contains("free-response"));
    }

    #[test]
    fn rejects_incomplete_mcq() {
        let content = r#"[{"kind": "mcq", "question": "Q ?", "choices": [], "answer": "A"}]"#;

        assert!(parse_generated_questions(content, false).is_err());
    }

    #[test]
    fn rejects_empty_output() {
        assert!(parse_generated_questions("[]", false).is_err());
        assert!(parse_generated_questions("pas du json", false).is_err());
    }

    #[test]
    fn prompt_restricts_kinds_for_mcq_only() {
        let prompt = build_prompt("histoire", 5, true);
        assert!(prompt.contains("uniquement"));
        assert!(prompt.contains("histoire"));
        assert!(prompt.contains('5'));

        let mixed = build_prompt("histoire", 5, false);
        assert!(mixed.contains("mélange"));
    }
}
