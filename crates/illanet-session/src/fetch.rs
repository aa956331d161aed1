//! HTTPS request for the account's character list.
//!
//! The request is independent of the game connection: a form-encoded POST
//! to the account service, answered with a document that
//! [`parse_charlist`](crate::parse_charlist) understands. It is slow
//! compared to a frame, so it never runs on the main loop.
//! [`CharListFetcher::spawn`] starts it on the runtime and hands back a
//! receiver the main loop can poll.

use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, error};

use crate::{CharListDocument, SessionError, parse_charlist};

/// Path of the character-list endpoint on the account host.
pub const CHARLIST_PATH: &str = "/account/xml_charlist.php";

/// Result code reported for every failure that is not a server-reported
/// error id.
pub const CHARLIST_FETCH_FAILED: i32 = 2;

/// What came back from a character-list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharListOutcome {
    /// The service answered with a document (which may itself carry an
    /// error id).
    Loaded(CharListDocument),
    /// The request or the parsing failed. Carries a description for logs.
    Failed(String),
}

impl CharListOutcome {
    /// The numeric result code: `0` for a character list, the server's
    /// error id for an error document, [`CHARLIST_FETCH_FAILED`] otherwise.
    pub fn code(&self) -> i32 {
        match self {
            Self::Loaded(CharListDocument::Characters { .. }) => 0,
            Self::Loaded(CharListDocument::Error { code }) => *code,
            Self::Failed(_) => CHARLIST_FETCH_FAILED,
        }
    }
}

/// Client for the character-list endpoint.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct CharListFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl CharListFetcher {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

    /// Fetcher for `https://{host}`.
    pub fn new(host: &str) -> Result<Self, SessionError> {
        Self::with_base_url(format!("https://{host}"), Self::DEFAULT_TIMEOUT)
    }

    /// Fetcher for an explicit base URL such as `http://127.0.0.1:8080`.
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SessionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    pub fn url(&self) -> String {
        format!("{}{CHARLIST_PATH}", self.base_url)
    }

    /// Requests and parses the character list.
    ///
    /// # Errors
    /// Any [`SessionError`] from the request, a non-success status, or the
    /// document parser.
    pub async fn fetch(&self, account: &str, password: &str) -> Result<CharListDocument, SessionError> {
        let url = self.url();
        debug!(%url, account, "requesting character list");

        let body = self
            .client
            .post(&url)
            .form(&[("name", account), ("passwd", password)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_charlist(&body)
    }

    /// Like [`fetch`](Self::fetch), but folds every failure into
    /// [`CharListOutcome::Failed`].
    pub async fn fetch_outcome(&self, account: &str, password: &str) -> CharListOutcome {
        match self.fetch(account, password).await {
            Ok(doc) => CharListOutcome::Loaded(doc),
            Err(e) => {
                error!(error = %e, "loading the character list failed");
                CharListOutcome::Failed(e.to_string())
            }
        }
    }

    /// Runs the request on a background task.
    ///
    /// Must be called from inside a Tokio runtime. The receiver yields
    /// exactly one outcome; if the task dies first the receiver reports
    /// a closed channel, which callers treat as a failure.
    pub fn spawn(&self, account: String, password: String) -> oneshot::Receiver<CharListOutcome> {
        let (tx, rx) = oneshot::channel();
        let fetcher = self.clone();
        tokio::spawn(async move {
            let outcome = fetcher.fetch_outcome(&account, &password).await;
            // The requester may have given up waiting; nothing to do then.
            let _ = tx.send(outcome);
        });
        rx
    }
}
