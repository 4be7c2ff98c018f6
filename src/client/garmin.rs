//! Garmin Connect source client
//!
//! Uses a cookie-keeping `ureq` agent: the sign-in form is submitted once and
//! the resulting session cookies authenticate every later request.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::Value;

use super::{Activity, ActivityFormat, ActivityId, SourceClient, UserId};
use crate::config::SourceConfig;

/// Garmin Connect client for listing and downloading activities
pub struct GarminClient {
    agent: ureq::Agent,
    base_url: String,
    feed_limit: usize,
}

impl GarminClient {
    const USER_AGENT: &'static str =
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

    /// Sign in and return a client bound to the resulting session.
    pub fn login(config: &SourceConfig, password: &str) -> Result<Self> {
        let client = Self {
            agent: ureq::Agent::new_with_defaults(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            feed_limit: config.feed_limit,
        };

        let signin_url = format!("{}/signin", client.base_url);

        // Fetch the form first so the session cookie is set before posting.
        client
            .agent
            .get(&signin_url)
            .header("User-Agent", Self::USER_AGENT)
            .call()
            .context("Failed to load Garmin Connect sign-in page")?;

        client
            .agent
            .post(&signin_url)
            .header("User-Agent", Self::USER_AGENT)
            .send_form([
                ("login", "login"),
                ("login:loginUsernameField", config.username.as_str()),
                ("login:password", password),
                ("login:signInButton", "Sign In"),
                ("javax.faces.ViewState", "j_id1"),
            ])
            .with_context(|| format!("Failed to sign in to Garmin Connect as {}", config.username))?;

        log::debug!("Signed in to Garmin Connect as {}", config.username);

        Ok(client)
    }

    fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        let mut request = self.agent.get(url).header("User-Agent", Self::USER_AGENT);
        for (key, value) in query {
            request = request.query(*key, value);
        }

        let mut response = request
            .call()
            .with_context(|| format!("Request to {} failed", url))?;

        response
            .body_mut()
            .read_json()
            .with_context(|| format!("Failed to parse response from {}", url))
    }
}

impl SourceClient for GarminClient {
    fn list_activities(&self) -> Result<Vec<Activity>> {
        let url = format!(
            "{}/proxy/activity-search-service-1.0/json/activities",
            self.base_url
        );
        let body = self.get_json(
            &url,
            &[
                ("start", "0".to_string()),
                ("limit", self.feed_limit.to_string()),
            ],
        )?;

        let activities = parse_activity_list(body)?;
        log::debug!("Garmin Connect listed {} activities", activities.len());
        Ok(activities)
    }

    fn get_activity(&self, activity_id: ActivityId) -> Result<Activity> {
        let url = format!(
            "{}/proxy/activity-service-1.3/json/activity/{}",
            self.base_url, activity_id
        );
        let body = self.get_json(&url, &[])?;
        parse_activity_detail(body)
    }

    fn download_activity(&self, activity_id: ActivityId, format: ActivityFormat) -> Result<Vec<u8>> {
        let url = format!(
            "{}/proxy/activity-service-1.1/{}/activity/{}",
            self.base_url, format, activity_id
        );

        let mut response = self
            .agent
            .get(&url)
            .header("User-Agent", Self::USER_AGENT)
            .query("full", "true")
            .call()
            .with_context(|| format!("Failed to download activity {}", activity_id))?;

        let data = response
            .body_mut()
            .read_to_vec()
            .with_context(|| format!("Failed to read data for activity {}", activity_id))?;

        log::debug!(
            "Downloaded activity {} ({} bytes, {})",
            activity_id,
            data.len(),
            format
        );

        Ok(data)
    }
}

/// Search response envelope: `{"results": {"activities": [{"activity": {..}}]}}`
#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: SearchResults,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    activities: Vec<ActivityEnvelope>,
}

#[derive(Debug, Deserialize)]
struct ActivityEnvelope {
    activity: RawActivity,
}

// Garmin sends ids either as numbers or as numeric strings.
#[derive(Debug, Deserialize)]
struct RawActivity {
    #[serde(rename = "activityId")]
    activity_id: Value,
    #[serde(rename = "userId")]
    user_id: Value,
}

impl RawActivity {
    fn into_activity(self) -> Result<Activity> {
        let activity_id = match &self.activity_id {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .ok_or_else(|| anyhow!("Invalid activityId: {}", self.activity_id))?;

        let user_id = match &self.user_id {
            Value::Number(n) => n.to_string(),
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => return Err(anyhow!("Invalid userId for activity {}", activity_id)),
        };

        Ok(Activity {
            activity_id: ActivityId(activity_id),
            user_id: UserId::new(user_id),
        })
    }
}

fn parse_activity_list(body: Value) -> Result<Vec<Activity>> {
    let response: SearchResponse =
        serde_json::from_value(body).context("Unexpected activity search response")?;

    response
        .results
        .activities
        .into_iter()
        .map(|envelope| envelope.activity.into_activity())
        .collect()
}

fn parse_activity_detail(body: Value) -> Result<Activity> {
    let envelope: ActivityEnvelope =
        serde_json::from_value(body).context("Unexpected activity response")?;
    envelope.activity.into_activity()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_activity_list_keeps_feed_order() {
        let body = json!({
            "results": {
                "activities": [
                    {"activity": {"activityId": "305", "userId": "77"}},
                    {"activity": {"activityId": 304, "userId": 77}},
                    {"activity": {"activityId": "300", "userId": "77"}}
                ]
            }
        });

        let activities = parse_activity_list(body).unwrap();
        let ids: Vec<u64> = activities.iter().map(|a| a.activity_id.0).collect();
        assert_eq!(ids, vec![305, 304, 300]);
        assert!(activities.iter().all(|a| a.user_id.as_str() == "77"));
    }

    #[test]
    fn test_parse_empty_activity_list() {
        let body = json!({"results": {}});
        assert!(parse_activity_list(body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_activity_list_rejects_bad_id() {
        let body = json!({
            "results": {"activities": [{"activity": {"activityId": "abc", "userId": "1"}}]}
        });
        let err = parse_activity_list(body).unwrap_err();
        assert!(err.to_string().contains("activityId"));
    }

    #[test]
    fn test_parse_activity_detail() {
        let body = json!({"activity": {"activityId": "42", "userId": "9001", "activityName": "Ride"}});
        let activity = parse_activity_detail(body).unwrap();
        assert_eq!(activity, Activity::new(42, "9001"));
    }

    #[test]
    fn test_parse_activity_detail_requires_user() {
        let body = json!({"activity": {"activityId": 42, "userId": null}});
        assert!(parse_activity_detail(body).is_err());
    }
}
