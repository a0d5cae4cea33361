//! AI match prediction and tournament simulation.
//!
//! The collaborator is optional: when it is unconfigured, slow or failing,
//! callers get `AiOutcome::Unavailable` and carry on.

use crate::error::{FantasyError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPlayer {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub rating: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRoster {
    pub name: String,
    #[serde(default)]
    pub players: Vec<RosterPlayer>,
}

impl TeamRoster {
    fn describe(&self) -> String {
        let players = self
            .players
            .iter()
            .map(|p| format!("{} ({}, rating {})", p.name, p.role, p.rating))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}: {}", self.name, players)
    }

    fn strength(&self) -> f64 {
        if self.players.is_empty() {
            return 0.0;
        }
        self.players.iter().map(|p| p.rating).sum::<f64>() / self.players.len() as f64
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AiOutcome {
    Available { text: String },
    Unavailable { reason: String },
}

#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(
        &self,
        team_a: &TeamRoster,
        team_b: &TeamRoster,
        match_type: &str,
    ) -> Result<String>;

    async fn simulate(&self, teams: &[TeamRoster], tournament_type: &str) -> Result<String>;
}

/// Stand-in used when no API key is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnconfiguredPredictor;

#[async_trait]
impl Predictor for UnconfiguredPredictor {
    async fn predict(&self, _: &TeamRoster, _: &TeamRoster, _: &str) -> Result<String> {
        Err(FantasyError::ExternalService(
            "AI predictions are not configured".to_string(),
        ))
    }

    async fn simulate(&self, _: &[TeamRoster], _: &str) -> Result<String> {
        Err(FantasyError::ExternalService(
            "AI simulations are not configured".to_string(),
        ))
    }
}

/// Google Gemini `generateContent` over REST.
pub struct GeminiPredictor {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiPredictor {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FantasyError::ExternalService(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| FantasyError::ExternalService(format!("request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(FantasyError::ExternalService(format!(
                "model returned HTTP {}",
                response.status()
            )));
        }
        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| FantasyError::ExternalService(format!("bad response: {e}")))?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(FantasyError::ExternalService(
                "model returned no text".to_string(),
            ));
        }
        Ok(text)
    }
}

#[async_trait]
impl Predictor for GeminiPredictor {
    async fn predict(
        &self,
        team_a: &TeamRoster,
        team_b: &TeamRoster,
        match_type: &str,
    ) -> Result<String> {
        self.generate(&prediction_prompt(team_a, team_b, match_type))
            .await
    }

    async fn simulate(&self, teams: &[TeamRoster], tournament_type: &str) -> Result<String> {
        self.generate(&simulation_prompt(teams, tournament_type)).await
    }
}

pub fn prediction_prompt(team_a: &TeamRoster, team_b: &TeamRoster, match_type: &str) -> String {
    format!(
        "Predict the winner of a {match_type} match between these two teams.\n\
         Team 1 - {}\n\
         Team 2 - {}\n\
         Weigh team balance across roles, player ratings and likely conditions. \
         Answer as JSON with the predicted winner, a win probability percentage, \
         two or three sentences of reasoning and the key players to watch.",
        team_a.describe(),
        team_b.describe()
    )
}

pub fn simulation_prompt(teams: &[TeamRoster], tournament_type: &str) -> String {
    let lines = teams
        .iter()
        .enumerate()
        .map(|(i, t)| {
            format!(
                "Team {} - {} (strength {:.1}/100)",
                i + 1,
                t.describe(),
                t.strength()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Simulate a {tournament_type} tournament between these teams:\n{lines}\n\
         Answer as JSON with the result of every match, final standings, the winner, \
         the best performing players and any upsets."
    )
}

fn validate_teams(teams: &[&TeamRoster]) -> Result<()> {
    if teams.iter().any(|t| t.name.trim().is_empty()) {
        return Err(FantasyError::validation("teams", "every team needs a name"));
    }
    Ok(())
}

/// Ask for a prediction, giving up after `limit`.
///
/// Validation problems are returned; anything the collaborator does wrong
/// becomes `Unavailable`.
pub async fn predict_or_unavailable(
    predictor: &dyn Predictor,
    team_a: &TeamRoster,
    team_b: &TeamRoster,
    match_type: &str,
    limit: Duration,
) -> Result<AiOutcome> {
    validate_teams(&[team_a, team_b])?;
    let call = predictor.predict(team_a, team_b, match_type);
    Ok(degrade(tokio::time::timeout(limit, call).await, limit))
}

pub async fn simulate_or_unavailable(
    predictor: &dyn Predictor,
    teams: &[TeamRoster],
    tournament_type: &str,
    limit: Duration,
) -> Result<AiOutcome> {
    if teams.len() < 2 {
        return Err(FantasyError::validation("teams", "at least two teams are needed"));
    }
    validate_teams(&teams.iter().collect::<Vec<_>>())?;
    let call = predictor.simulate(teams, tournament_type);
    Ok(degrade(tokio::time::timeout(limit, call).await, limit))
}

fn degrade(
    result: std::result::Result<Result<String>, tokio::time::error::Elapsed>,
    limit: Duration,
) -> AiOutcome {
    let reason = match result {
        Ok(Ok(text)) => return AiOutcome::Available { text },
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("no answer within {}s", limit.as_secs_f32()),
    };
    log::warn!("AI collaborator unavailable: {reason}");
    AiOutcome::Unavailable { reason }
}
