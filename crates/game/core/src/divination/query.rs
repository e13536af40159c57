#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TargetKind {
    Block,
    Entity,
}

/// What to look for: a block or entity type key plus a difficulty in percent.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DivinationQuery {
    pub kind: TargetKind,
    pub target: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub difficulty: f64,
}

impl DivinationQuery {
    pub fn block(target: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Block,
            target: target.into(),
            difficulty: 0.0,
        }
    }

    pub fn entity(target: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Entity,
            target: target.into(),
            difficulty: 0.0,
        }
    }

    pub fn with_difficulty(mut self, difficulty: f64) -> Self {
        self.difficulty = difficulty;
        self
    }
}

/// The tool an actor divines with; holds the query between searches.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DivinationCarrier {
    query: Option<DivinationQuery>,
}

impl DivinationCarrier {
    pub fn query(&self) -> Option<&DivinationQuery> {
        self.query.as_ref()
    }

    pub fn set_query(&mut self, query: DivinationQuery) {
        self.query = Some(query);
    }

    pub fn clear(&mut self) -> Option<DivinationQuery> {
        self.query.take()
    }
}
