//! GraphQL request and response shapes for the viewer's repository listing.

use serde::Deserialize;

use crate::repo::RepoDescriptor;

use super::error::ListError;

pub(crate) const PAGE_SIZE: usize = 100;

pub(crate) const REPOSITORIES_QUERY: &str = r#"
query($cursor: String, $affiliations: [RepositoryAffiliation], $pageSize: Int!) {
  viewer {
    repositories(first: $pageSize, after: $cursor, affiliations: $affiliations, ownerAffiliations: $affiliations) {
      totalCount
      pageInfo {
        endCursor
        hasNextPage
      }
      nodes {
        name
        url
        sshUrl
        isFork
        isArchived
        defaultBranchRef {
          name
        }
      }
    }
  }
}
"#;

/// One page of the listing, already converted to descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryPage {
    pub total_count: usize,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
    pub repos: Vec<RepoDescriptor>,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<ViewerData>,
    #[serde(default)]
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ViewerData {
    viewer: Viewer,
}

#[derive(Debug, Deserialize)]
struct Viewer {
    repositories: RepositoryConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryConnection {
    total_count: usize,
    page_info: PageInfo,
    nodes: Option<Vec<Option<RepositoryNode>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    end_cursor: Option<String>,
    has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    name: String,
    url: String,
    ssh_url: Option<String>,
    #[serde(default)]
    is_fork: bool,
    #[serde(default)]
    is_archived: bool,
    default_branch_ref: Option<BranchRef>,
}

#[derive(Debug, Deserialize)]
struct BranchRef {
    name: String,
}

impl RepositoryNode {
    fn into_descriptor(self, ssh: bool) -> RepoDescriptor {
        let (clone_url, alternate_urls) = match (ssh, self.ssh_url) {
            (true, Some(ssh_url)) => (ssh_url, vec![self.url]),
            (_, Some(ssh_url)) => (self.url, vec![ssh_url]),
            (_, None) => (self.url, Vec::new()),
        };
        RepoDescriptor {
            name: self.name,
            clone_url,
            alternate_urls,
            default_branch: self.default_branch_ref.map(|r| r.name),
            is_fork: self.is_fork,
            is_archived: self.is_archived,
        }
    }
}

/// Parse one GraphQL response body. `ssh` selects the clone url.
pub(crate) fn parse_page(body: &str, ssh: bool) -> Result<RepositoryPage, ListError> {
    let response: GraphqlResponse =
        serde_json::from_str(body).map_err(|e| ListError::Decode(e.to_string()))?;

    if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
        let message = errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        let is_auth = errors
            .iter()
            .filter_map(|e| e.kind.as_deref())
            .any(|kind| kind == "UNAUTHORIZED" || kind == "FORBIDDEN");
        return Err(match is_auth {
            true => ListError::Authentication(message),
            false => ListError::Api(message),
        });
    }

    let Some(data) = response.data else {
        return Err(ListError::Api("response contains no data".to_string()));
    };

    let connection = data.viewer.repositories;
    let repos = connection
        .nodes
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .map(|node| node.into_descriptor(ssh))
        .collect();

    Ok(RepositoryPage {
        total_count: connection.total_count,
        end_cursor: connection.page_info.end_cursor,
        has_next_page: connection.page_info.has_next_page,
        repos,
    })
}
