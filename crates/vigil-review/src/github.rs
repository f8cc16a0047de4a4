use serde::Deserialize;

use vigil_core::{ChangedFile, GithubConfig, VigilError};

/// PR metadata needed for pre-flight: title and branches feed the ticket
/// extractor, the rest feeds the report header.
#[derive(Debug, Clone)]
pub struct PrDetails {
    /// PR title.
    pub title: String,
    /// PR description body (empty when absent).
    pub description: String,
    /// Author login.
    pub author: String,
    /// Head branch name.
    pub branch: String,
    /// Base branch name.
    pub base_branch: String,
    /// PR state (open, closed).
    pub state: String,
    /// Link to the raw diff.
    pub diff_url: String,
}

#[derive(Deserialize)]
struct PrResponse {
    title: String,
    body: Option<String>,
    user: ActorRef,
    head: BranchRef,
    base: BranchRef,
    state: String,
    diff_url: String,
}

#[derive(Deserialize)]
struct ActorRef {
    login: String,
}

#[derive(Deserialize)]
struct BranchRef {
    #[serde(rename = "ref")]
    branch_ref: String,
}

#[derive(Deserialize)]
struct FileEntry {
    filename: String,
    status: String,
    additions: u32,
    deletions: u32,
}

/// GitHub Pull Request client: reads PR metadata, diff, and changed files;
/// writes the single review comment.
///
/// Reads go through plain `reqwest` (the diff media type needs a raw-text
/// response anyway); the comment write goes through `octocrab`'s routed
/// POST.
///
/// # Examples
///
/// ```
/// use vigil_review::github::parse_pr_reference;
///
/// let (owner, repo, number) = parse_pr_reference("rust-lang/rust#12345").unwrap();
/// assert_eq!(owner, "rust-lang");
/// assert_eq!(repo, "rust");
/// assert_eq!(number, 12345);
/// ```
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
    http: reqwest::Client,
    token: String,
    api_base: String,
}

impl GitHubClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Config`] if no token is configured, or
    /// [`VigilError::GitHub`] if the client cannot be built.
    pub fn new(config: &GithubConfig) -> Result<Self, VigilError> {
        let token = config.require_token()?.to_string();

        let octocrab = octocrab::Octocrab::builder()
            .personal_token(token.clone())
            .build()
            .map_err(|e| VigilError::GitHub(format!("failed to create GitHub client: {e}")))?;

        let http = reqwest::Client::new();
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| "https://api.github.com".to_string());

        Ok(Self {
            octocrab,
            http,
            token,
            api_base,
        })
    }

    /// Fetch PR title, description, author, branches, state, and diff link.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::GitHub`] on network or API errors.
    pub async fn pr_details(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<PrDetails, VigilError> {
        let url = format!("{}/repos/{owner}/{repo}/pulls/{pr_number}", self.api_base);
        let response = self
            .request(&url, "application/vnd.github+json")
            .await
            .map_err(|e| VigilError::GitHub(format!("failed to fetch PR details: {e}")))?;

        let pr: PrResponse = serde_json::from_str(&response)
            .map_err(|e| VigilError::GitHub(format!("unexpected PR response: {e}")))?;

        Ok(PrDetails {
            title: pr.title,
            description: pr.body.unwrap_or_default(),
            author: pr.user.login,
            branch: pr.head.branch_ref,
            base_branch: pr.base.branch_ref,
            state: pr.state,
            diff_url: pr.diff_url,
        })
    }

    /// Fetch the unified diff for a pull request as raw text.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::GitHub`] on network or API errors.
    pub async fn pr_diff(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<String, VigilError> {
        let url = format!("{}/repos/{owner}/{repo}/pulls/{pr_number}", self.api_base);
        self.request(&url, "application/vnd.github.v3.diff")
            .await
            .map_err(|e| VigilError::GitHub(format!("failed to fetch PR diff: {e}")))
    }

    /// Fetch the changed-file list with per-file add/delete counts.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::GitHub`] on network or API errors.
    pub async fn changed_files(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<ChangedFile>, VigilError> {
        let url = format!(
            "{}/repos/{owner}/{repo}/pulls/{pr_number}/files",
            self.api_base
        );
        let response = self
            .request(&url, "application/vnd.github+json")
            .await
            .map_err(|e| VigilError::GitHub(format!("failed to fetch changed files: {e}")))?;

        let entries: Vec<FileEntry> = serde_json::from_str(&response)
            .map_err(|e| VigilError::GitHub(format!("unexpected files response: {e}")))?;

        Ok(entries
            .into_iter()
            .map(|f| ChangedFile {
                path: f.filename,
                status: f.status,
                additions: f.additions,
                deletions: f.deletions,
            })
            .collect())
    }

    /// Post the rendered report as a single PR comment.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::GitHub`] on API errors.
    pub async fn post_comment(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        body: &str,
    ) -> Result<(), VigilError> {
        let route = format!("/repos/{owner}/{repo}/issues/{pr_number}/comments");
        let payload = serde_json::json!({ "body": body });

        let _response: serde_json::Value = self
            .octocrab
            .post(route, Some(&payload))
            .await
            .map_err(|e| VigilError::GitHub(format!("failed to post comment: {e}")))?;

        Ok(())
    }

    async fn request(&self, url: &str, accept: &str) -> Result<String, String> {
        let response = self
            .http
            .get(url)
            .header("Accept", accept)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", "vigil")
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("GitHub API error {status}: {body}"));
        }

        response.text().await.map_err(|e| e.to_string())
    }
}

/// Parse a PR reference string (`owner/repo#number`) into its components.
///
/// # Errors
///
/// Returns [`VigilError::Config`] if the format is invalid.
///
/// # Examples
///
/// ```
/// use vigil_review::github::parse_pr_reference;
///
/// let (owner, repo, num) = parse_pr_reference("octocat/hello-world#42").unwrap();
/// assert_eq!(owner, "octocat");
/// assert_eq!(repo, "hello-world");
/// assert_eq!(num, 42);
/// ```
pub fn parse_pr_reference(pr_ref: &str) -> Result<(String, String, u64), VigilError> {
    let Some((owner_repo, number_str)) = pr_ref.split_once('#') else {
        return Err(VigilError::Config(format!(
            "invalid PR reference '{pr_ref}', expected owner/repo#number"
        )));
    };
    let Some((owner, repo)) = owner_repo.split_once('/') else {
        return Err(VigilError::Config(format!(
            "invalid PR reference '{pr_ref}', expected owner/repo#number"
        )));
    };
    let number: u64 = number_str
        .parse()
        .map_err(|_| VigilError::Config(format!("invalid PR number: {number_str}")))?;
    Ok((owner.to_string(), repo.to_string(), number))
}
