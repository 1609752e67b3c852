use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Which fields the generation service is asked to return, in order.
/// `Basic` is the original two-segment contract; `Rich` adds a fun fact
/// and a nickname and references the pet's gender.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    Basic,
    #[default]
    Rich,
}

impl ResponseFormat {
    pub fn field_count(&self) -> usize {
        match self {
            ResponseFormat::Basic => 2,
            ResponseFormat::Rich => 4,
        }
    }

    pub fn requires_gender(&self) -> bool {
        matches!(self, ResponseFormat::Rich)
    }
}

/// Attributes of the pet for a single generation request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PetDescriptor {
    pub species: String,
    pub color: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub traits: Vec<String>,
}

impl PetDescriptor {
    /// Lower-cases and trims every attribute so the prompt text is
    /// deterministic regardless of how the form input was cased.
    pub fn normalized(&self) -> Self {
        let clean = |s: &str| s.trim().to_lowercase();
        Self {
            species: clean(&self.species),
            color: clean(&self.color),
            gender: self
                .gender
                .as_deref()
                .map(clean)
                .filter(|g| !g.is_empty()),
            traits: self
                .traits
                .iter()
                .map(|t| clean(t))
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NameRequest {
    pub species: String,
    pub color: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub traits: Option<Vec<String>>,
    /// Sampling temperature for the generation service, clamped to [0.0, 1.0].
    #[serde(default)]
    pub creativity: Option<f32>,
    #[serde(default)]
    pub format: Option<ResponseFormat>,
    /// When set, a successful result is appended to this session's history.
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

impl NameRequest {
    pub fn descriptor(&self) -> PetDescriptor {
        PetDescriptor {
            species: self.species.clone(),
            color: self.color.clone(),
            gender: self.gender.clone(),
            traits: self.traits.clone().unwrap_or_default(),
        }
    }
}

/// Outcome of one pipeline invocation. Exactly one of "all domain fields
/// populated" or "error populated" holds, never both.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub name: Option<String>,
    pub explanation: Option<String>,
    pub fun_fact: Option<String>,
    pub nickname: Option<String>,
    pub gender: Option<String>,
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn failure(message: String) -> Self {
        Self {
            name: None,
            explanation: None,
            fun_fact: None,
            nickname: None,
            gender: None,
            error: Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// A successful generation kept in session history/favorites, together with
/// the descriptor it was generated for.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GeneratedName {
    pub name: String,
    pub explanation: String,
    pub fun_fact: Option<String>,
    pub nickname: Option<String>,
    pub species: String,
    pub color: String,
    pub gender: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Session {
    pub id: Uuid,
    pub history: Vec<GeneratedName>,
    pub favorites: Vec<GeneratedName>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FavoriteRequest {
    /// Index into the session's history of the entry to favorite.
    pub history_index: usize,
}
