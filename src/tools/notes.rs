use anyhow::Result;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use super::Tool;
use crate::vault::{ListResult, NotesVault, ReadResult, SearchResults};

/// Requests accepted by the notes tool, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum NotesRequest {
    Search {
        query: String,
        #[serde(default, deserialize_with = "deserialize_limit")]
        limit: Option<usize>,
    },
    Read {
        path: String,
    },
    List {
        #[serde(default)]
        directory: Option<String>,
        #[serde(default, deserialize_with = "deserialize_limit")]
        limit: Option<usize>,
    },
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum NotesResponse {
    Search(SearchResults),
    Read(ReadResult),
    List(ListResult),
}

/// Accepts `limit` as a JSON number or, for query strings, a numeric string.
fn deserialize_limit<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLimit {
        Number(u64),
        Text(String),
    }

    match Option::<RawLimit>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawLimit::Number(n)) => usize::try_from(n).map(Some).map_err(D::Error::custom),
        Some(RawLimit::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawLimit::Text(text)) => text.trim().parse::<usize>().map(Some).map_err(|_| {
            D::Error::custom(format!("limit must be a non-negative integer, got `{}`", text))
        }),
    }
}

/// Searches, reads and lists notes in the vault.
pub struct NotesTool {
    vault: NotesVault,
}

impl NotesTool {
    pub fn new(vault: NotesVault) -> Self {
        Self { vault }
    }
}

#[async_trait::async_trait]
impl Tool for NotesTool {
    type Input = NotesRequest;
    type Output = NotesResponse;

    fn name(&self) -> &str {
        "notes"
    }

    fn description(&self) -> &str {
        "Search, read and list notes in the vault (action: search | read | list)"
    }

    async fn run(&self, request: NotesRequest) -> Result<NotesResponse> {
        log::debug!("NotesTool: {:?}", request);

        let response = match request {
            NotesRequest::Search { query, limit } => {
                NotesResponse::Search(self.vault.search_notes(&query, limit).await?)
            }
            NotesRequest::Read { path } => NotesResponse::Read(self.vault.read_note(&path).await?),
            NotesRequest::List { directory, limit } => NotesResponse::List(
                self.vault.list_notes(directory.as_deref(), limit).await?,
            ),
        };

        Ok(response)
    }
}
