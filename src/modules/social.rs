use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::ReconModule;
use crate::context::RequestContext;
use crate::result::ModuleResult;

const NAME: &str = "social";
const DEFAULT_HN_ENDPOINT: &str = "https://hn.algolia.com";
const DEFAULT_REDDIT_ENDPOINT: &str = "https://www.reddit.com";

/// Hits kept per platform before cross-platform deduplication.
const MAX_HITS_PER_SOURCE: usize = 5;

/// Passive OSINT mentions from Reddit and Hacker News.
pub struct SocialModule {
    hn_endpoint: String,
    reddit_endpoint: String,
}

impl Default for SocialModule {
    fn default() -> Self {
        Self {
            hn_endpoint: DEFAULT_HN_ENDPOINT.to_string(),
            reddit_endpoint: DEFAULT_REDDIT_ENDPOINT.to_string(),
        }
    }
}

impl SocialModule {
    pub fn with_endpoints(
        hn_endpoint: impl Into<String>,
        reddit_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            hn_endpoint: hn_endpoint.into(),
            reddit_endpoint: reddit_endpoint.into(),
        }
    }
}

#[async_trait]
impl ReconModule for SocialModule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Passive OSINT mentions from Reddit and Hacker News."
    }

    async fn run(&self, ctx: &RequestContext) -> ModuleResult {
        let Some(query) = ctx.domain.as_deref() else {
            return ModuleResult::no_data(NAME, "a domain is required for social tracing");
        };

        let hn = self.search_hacker_news(ctx, query).await;
        let reddit = self.search_reddit(ctx, query).await;

        let mut seen_urls = HashSet::new();
        let mut hits: Vec<Value> = Vec::new();
        let mut failures: Vec<String> = Vec::new();
        let mut timed_out = false;

        for (source, outcome) in [("hacker news", hn), ("reddit", reddit)] {
            match outcome {
                Ok(entries) => {
                    for entry in entries {
                        let url = entry
                            .get("url")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string();
                        if seen_urls.insert(url) {
                            hits.push(entry);
                        }
                    }
                }
                Err(err) => {
                    if err.is_timeout() {
                        timed_out = true;
                        failures.push(format!("{source} search timed out"));
                    } else {
                        failures.push(format!("{source} search failed: {err}"));
                    }
                }
            }
        }

        if !hits.is_empty() {
            return ModuleResult::success(NAME, Value::Array(hits));
        }
        if failures.is_empty() {
            return ModuleResult::no_data(NAME, "no social mentions discovered");
        }
        if timed_out {
            ModuleResult::timeout(NAME, failures.join("; "))
        } else {
            ModuleResult::blocked(NAME, failures.join("; "))
        }
    }
}

impl SocialModule {
    async fn search_hacker_news(
        &self,
        ctx: &RequestContext,
        query: &str,
    ) -> Result<Vec<Value>, reqwest::Error> {
        let payload: Value = ctx
            .client
            .get(format!("{}/api/v1/search", self.hn_endpoint))
            .query(&[("query", query), ("tags", "story")])
            .header(reqwest::header::USER_AGENT, ctx.user_agent())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let hits = payload
            .get("hits")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .take(MAX_HITS_PER_SOURCE)
            .filter_map(|hit| {
                let title = hit.get("title").and_then(Value::as_str)?;
                let url = hit
                    .get("url")
                    .and_then(Value::as_str)
                    .or_else(|| hit.get("story_url").and_then(Value::as_str))?;
                Some(json!({"source": "HackerNews", "title": title, "url": url}))
            })
            .collect();
        Ok(hits)
    }

    async fn search_reddit(
        &self,
        ctx: &RequestContext,
        query: &str,
    ) -> Result<Vec<Value>, reqwest::Error> {
        let payload: Value = ctx
            .client
            .get(format!("{}/search.json", self.reddit_endpoint))
            .query(&[("q", query), ("limit", "5"), ("sort", "new"), ("type", "link")])
            .header(reqwest::header::USER_AGENT, ctx.user_agent())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let hits = payload
            .pointer("/data/children")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .take(MAX_HITS_PER_SOURCE)
            .filter_map(|child| {
                let data = child.get("data")?;
                let title = data.get("title").and_then(Value::as_str)?;
                let url = data.get("url").and_then(Value::as_str)?;
                Some(json!({
                    "source": "Reddit",
                    "title": title,
                    "url": url,
                    "subreddit": data.get("subreddit").cloned().unwrap_or(Value::Null),
                }))
            })
            .collect();
        Ok(hits)
    }
}
