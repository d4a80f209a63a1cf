use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type EntityId = i64;

pub const PLACEHOLDER_DASH: &str = "-";
pub const PLACEHOLDER_NOT_SET: &str = "Not set";
pub const PLACEHOLDER_UNKNOWN: &str = "Unknown";

/// A server-owned record. `SINGULAR` doubles as the wrapper key the API may
/// use when it answers a create call with `{"stage": {...}}`.
pub trait Entity: DeserializeOwned + Clone + Send + 'static {
    const SINGULAR: &'static str;
    const PLURAL: &'static str;

    fn id(&self) -> EntityId;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub format_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub prize_pool: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub point_system_id: Option<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub order: i64,
    pub tournament_id: EntityId,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    pub stage_id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub map: Option<String>,
    #[serde(default)]
    pub number: Option<i64>,
    #[serde(default)]
    pub group_id: Option<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: EntityId,
    pub tag: String,
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: EntityId,
    pub ign: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pubg_id: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub team_id: Option<EntityId>,
}

macro_rules! impl_entity {
    ($ty:ty, $singular:literal, $plural:literal) => {
        impl Entity for $ty {
            const SINGULAR: &'static str = $singular;
            const PLURAL: &'static str = $plural;

            fn id(&self) -> EntityId {
                self.id
            }
        }
    };
}

impl_entity!(Tournament, "tournament", "tournaments");
impl_entity!(Stage, "stage", "stages");
impl_entity!(Group, "group", "groups");
impl_entity!(Match, "match", "matches");
impl_entity!(Team, "team", "teams");
impl_entity!(Player, "player", "players");

/// Response of a create call: either the record itself or the record wrapped
/// under the entity's singular key.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateResult<T> {
    Bare(T),
    Wrapped(T),
}

impl<T: Entity> CreateResult<T> {
    pub fn decode(value: Value) -> Result<Self, serde_json::Error> {
        if let Value::Object(map) = &value
            && let Some(inner) = map.get(T::SINGULAR)
            && inner.is_object()
        {
            return serde_json::from_value(inner.clone()).map(Self::Wrapped);
        }
        serde_json::from_value(value).map(Self::Bare)
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Bare(record) | Self::Wrapped(record) => record,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FormatType {
    #[default]
    Squad,
    Duo,
    Solo,
}

impl FormatType {
    pub const ALL: [FormatType; 3] = [FormatType::Squad, FormatType::Duo, FormatType::Solo];

    pub fn label(self) -> &'static str {
        match self {
            FormatType::Squad => "Squad",
            FormatType::Duo => "Duo",
            FormatType::Solo => "Solo",
        }
    }

    pub fn next(self) -> Self {
        match self {
            FormatType::Squad => FormatType::Duo,
            FormatType::Duo => FormatType::Solo,
            FormatType::Solo => FormatType::Squad,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormatType::Squad => FormatType::Solo,
            FormatType::Duo => FormatType::Squad,
            FormatType::Solo => FormatType::Duo,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTournament {
    pub name: String,
    pub timezone: String,
    pub format_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStage {
    pub tournament_id: EntityId,
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGroup {
    pub stage_id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMatch {
    pub group_id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeam {
    pub tag: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Missing and blank values both render as `placeholder`.
pub fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => placeholder,
    }
}

// Some backends send numeric ids and prize pools as JSON numbers.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
