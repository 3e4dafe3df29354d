//! Dialogue state machine: one question per profile field, then the recommendation pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::profile::{ProfileField, UserProfile};
use crate::recommendation::{PipelineError, Recommendation, RecommendationEngine};

pub mod handlers;
pub mod store;

pub const COMPLETION_MESSAGE: &str = "Perfect! I have all the information I need. Let me analyze \
    your profile and find the best credit cards for you.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("Missing required fields: {}. Please provide all required information.", join_fields(.0))]
    MissingFields(Vec<ProfileField>),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

fn join_fields(fields: &[ProfileField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// What one conversational step hands back to the caller.
#[derive(Debug, Clone)]
pub struct Reply {
    pub response: String,
    pub is_complete: bool,
    pub current_question: Option<ProfileField>,
    pub recommendation: Option<Recommendation>,
}

impl Reply {
    fn question(field: ProfileField) -> Self {
        Self {
            response: field.question().to_string(),
            is_complete: false,
            current_question: Some(field),
            recommendation: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationSummary {
    pub questions_completed: usize,
    pub total_questions: usize,
    pub progress_percentage: f64,
    pub current_question: Option<ProfileField>,
    pub is_complete: bool,
}

/// One user's dialogue. Lives only in memory.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub profile: UserProfile,
    pub history: Vec<ChatTurn>,
    pub current_question: Option<ProfileField>,
    pub analysis: Option<Recommendation>,
    pub questions_completed: bool,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            profile: UserProfile::default(),
            history: Vec::new(),
            current_question: None,
            analysis: None,
            questions_completed: false,
        }
    }

    /// Records `answer` for the pending question, then asks the next unanswered one.
    /// Once every field has a value the completion message is returned instead.
    pub fn ask_question(&mut self, answer: Option<&str>) -> Reply {
        let answer = answer.map(str::trim).filter(|a| !a.is_empty());
        if let (Some(answer), Some(field)) = (answer, self.current_question) {
            debug!("Session {} answered {}", self.id, field.as_str());
            self.profile.set(field, answer);
            self.push(ChatRole::User, answer);
        }

        match self.profile.next_unanswered() {
            Some(field) => {
                self.current_question = Some(field);
                self.push(ChatRole::Assistant, field.question());
                Reply::question(field)
            }
            None => {
                self.questions_completed = true;
                Reply {
                    response: COMPLETION_MESSAGE.to_string(),
                    is_complete: true,
                    current_question: None,
                    recommendation: None,
                }
            }
        }
    }

    /// Routes one incoming message: keep asking while fields are missing,
    /// otherwise run the recommendation pipeline.
    pub async fn process_message(
        &mut self,
        message: Option<&str>,
        engine: &RecommendationEngine,
    ) -> Result<Reply, PipelineError> {
        if self.history.is_empty() {
            return Ok(self.ask_question(message));
        }
        if self.questions_completed {
            return self.recommend(engine).await;
        }
        if self.profile.next_unanswered().is_some() {
            return Ok(self.ask_question(message));
        }

        self.questions_completed = true;
        self.recommend(engine).await
    }

    /// Replaces the profile with a fully answered one and recommends immediately.
    pub async fn submit_complete_profile(
        &mut self,
        profile: UserProfile,
        engine: &RecommendationEngine,
    ) -> Result<Reply, ConversationError> {
        if !profile.is_complete() {
            return Err(ConversationError::MissingFields(profile.missing_fields()));
        }

        self.push(
            ChatRole::User,
            &format!("Complete profile submitted: {}", profile.summary()),
        );
        self.profile = profile;
        self.current_question = None;
        self.questions_completed = true;
        info!("Session {} submitted a complete profile", self.id);

        Ok(self.recommend(engine).await?)
    }

    pub fn summary(&self) -> ConversationSummary {
        let questions_completed = self.profile.answered_count();
        let total_questions = ProfileField::ALL.len();
        ConversationSummary {
            questions_completed,
            total_questions,
            progress_percentage: questions_completed as f64 / total_questions as f64 * 100.0,
            current_question: self.current_question,
            is_complete: self.questions_completed,
        }
    }

    /// Back to a fresh session with the same id.
    pub fn reset(&mut self) {
        *self = Self {
            created_at: self.created_at,
            ..Self::new(self.id)
        };
    }

    async fn recommend(&mut self, engine: &RecommendationEngine) -> Result<Reply, PipelineError> {
        let recommendation = engine.analyze_and_recommend(&self.profile).await?;
        self.push(ChatRole::Assistant, &recommendation.text_response);
        self.analysis = Some(recommendation.clone());

        Ok(Reply {
            response: recommendation.text_response.clone(),
            is_complete: true,
            current_question: None,
            recommendation: Some(recommendation),
        })
    }

    fn push(&mut self, role: ChatRole, content: &str) {
        self.history.push(ChatTurn {
            role,
            content: content.to_string(),
        });
    }
}
