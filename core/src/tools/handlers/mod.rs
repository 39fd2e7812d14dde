mod bash;
mod browser;
mod crawl;
mod python;
mod search;

pub use bash::BashHandler;
pub use browser::BrowserHandler;
pub use crawl::CrawlHandler;
pub use python::PythonReplHandler;
pub use search::TavilySearch;

use reqwest::Response;

use crate::error::ManusErr;
use crate::error::Result;

/// Turns a non-success answer from a tool backend into a provider error.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ManusErr::Provider { status, body })
}
