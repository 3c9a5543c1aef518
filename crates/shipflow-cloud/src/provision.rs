//! Cloud resource provisioning
//!
//! Sequential creation of resource group → App Service plan → web app, a
//! readiness poll against the web app state, and publish profile retrieval
//! with bounded retry. The provisioner never deletes anything on its own;
//! rollback scope lives with the pipeline, which calls [`Provisioner::destroy`]
//! when a later stage fails.

use crate::azcli::{AzCli, parse_publish_profile};
use crate::error::{CloudError, Result};
use shipflow_core::RunParams;
use std::time::Duration;
use tokio::time::Instant;

/// Retry configuration for transient cloud operations.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts.
    pub max_attempts: u32,

    /// Initial delay between attempts.
    pub initial_delay: Duration,

    /// Maximum delay between attempts.
    pub max_delay: Duration,

    /// Backoff multiplier.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay before the next attempt, `attempt` counting from 1.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        let delay = self.initial_delay.mul_f64(factor);
        delay.min(self.max_delay)
    }
}

/// Everything the pipeline needs to know about the provisioned app.
#[derive(Debug, Clone)]
pub struct ProvisionedApp {
    pub name: String,
    pub resource_group: String,
    pub url: Option<String>,
}

/// Creates the Azure resource hierarchy for one run.
pub struct Provisioner {
    az: AzCli,
    pub retry: RetryConfig,
    /// Hard ceiling on the readiness poll.
    pub readiness_timeout: Duration,
}

impl Provisioner {
    pub fn new(az: AzCli) -> Self {
        Self {
            az,
            retry: RetryConfig::default(),
            readiness_timeout: Duration::from_secs(300),
        }
    }

    /// Create resource group, plan and web app in order. The first failure
    /// aborts; nothing later is attempted.
    pub async fn provision(&self, params: &RunParams) -> Result<ProvisionedApp> {
        self.az
            .group_create(&params.resource_group, &params.location)
            .await
            .map_err(|e| step_error("resource group", &params.resource_group, e))?;
        tracing::info!(resource_group = %params.resource_group, "resource group ready");

        self.az
            .plan_create(&params.plan_name, &params.resource_group, &params.sku)
            .await
            .map_err(|e| step_error("app service plan", &params.plan_name, e))?;
        tracing::info!(plan = %params.plan_name, "app service plan ready");

        let app = self
            .az
            .webapp_create(
                &params.app_name,
                &params.resource_group,
                &params.plan_name,
                &params.runtime,
            )
            .await
            .map_err(|e| step_error("web app", &params.app_name, e))?;
        tracing::info!(app = %app.name, "web app created");

        Ok(ProvisionedApp {
            url: app.url(),
            name: params.app_name.clone(),
            resource_group: params.resource_group.clone(),
        })
    }

    /// Poll the web app until App Service reports it `Running`.
    ///
    /// Poll errors are treated as "not ready yet" — the app often 404s for
    /// a short window right after creation. Only the deadline is fatal.
    pub async fn wait_until_ready(&self, app: &str, resource_group: &str) -> Result<()> {
        let deadline = Instant::now() + self.readiness_timeout;
        let mut attempt: u32 = 1;

        loop {
            match self.az.webapp_show(app, resource_group).await {
                Ok(info) if info.is_running() => {
                    tracing::info!(app = %app, "web app is running");
                    return Ok(());
                }
                Ok(info) => {
                    tracing::debug!(app = %app, state = ?info.state, "not ready yet");
                }
                Err(e) => {
                    tracing::debug!(app = %app, error = %e, "readiness probe failed");
                }
            }

            let delay = self.retry.delay_for(attempt);
            if Instant::now() + delay >= deadline {
                return Err(CloudError::ReadinessTimeout {
                    app: app.to_string(),
                    timeout_secs: self.readiness_timeout.as_secs(),
                });
            }
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Fetch the publish profile XML, retrying up to the configured number
    /// of attempts. Stops on the first attempt that yields a profile with
    /// usable credentials.
    pub async fn fetch_publish_profile(&self, app: &str, resource_group: &str) -> Result<String> {
        for attempt in 1..=self.retry.max_attempts {
            match self.try_fetch_profile(app, resource_group).await {
                Ok(xml) => return Ok(xml),
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max = self.retry.max_attempts,
                        error = %e,
                        "publish profile not available yet"
                    );
                }
            }

            if attempt < self.retry.max_attempts {
                tokio::time::sleep(self.retry.delay_for(attempt)).await;
            }
        }

        Err(CloudError::SecretRetrievalExhausted {
            attempts: self.retry.max_attempts,
        })
    }

    async fn try_fetch_profile(&self, app: &str, resource_group: &str) -> Result<String> {
        let xml = self.az.list_publishing_profiles(app, resource_group).await?;
        parse_publish_profile(&xml)?;
        Ok(xml)
    }

    /// Tear down the resource group (cascades to plan and web app).
    pub async fn destroy(&self, resource_group: &str) -> Result<()> {
        self.az.group_delete(resource_group).await
    }
}

/// Wrap a step failure, surfacing naming conflicts as their own kind.
fn step_error(resource: &'static str, name: &str, e: CloudError) -> CloudError {
    match e {
        CloudError::CommandFailed { ref stderr, .. }
            if stderr.to_lowercase().contains("already exists")
                || stderr.contains("Conflict") =>
        {
            CloudError::Conflict(format!("{resource} {name}"))
        }
        CloudError::CommandFailed { stderr, .. } => CloudError::ProvisionFailed {
            resource,
            message: stderr,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azcli::AzCli;
    use async_trait::async_trait;
    use shipflow_core::{CmdOutput, CmdSpec, CommandRunner};
    use std::sync::{Arc, Mutex};

    const PROFILE_XML: &str = r#"<publishData><publishProfile publishUrl="app1.scm.azurewebsites.net:443" userName="$app1" userPWD="pw" /></publishData>"#;

    /// Scripted runner: matches a substring of the command line against a
    /// rule table and records every invocation.
    struct MockRunner {
        rules: Vec<(String, Vec<CmdOutput>)>,
        calls: Mutex<Vec<String>>,
        hits: Mutex<Vec<usize>>,
    }

    impl MockRunner {
        fn new() -> Self {
            Self {
                rules: Vec::new(),
                calls: Mutex::new(Vec::new()),
                hits: Mutex::new(Vec::new()),
            }
        }

        /// Repeat the last outcome once the queue for a rule drains.
        fn rule(mut self, matcher: &str, outcomes: Vec<CmdOutput>) -> Self {
            self.rules.push((matcher.to_string(), outcomes));
            self.hits.lock().unwrap().push(0);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, matcher: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|line| line.contains(matcher))
                .count()
        }
    }

    fn ok(stdout: &str) -> CmdOutput {
        CmdOutput {
            code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    fn fail(stderr: &str) -> CmdOutput {
        CmdOutput {
            code: Some(1),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    #[async_trait]
    impl CommandRunner for MockRunner {
        async fn run(&self, spec: &CmdSpec) -> shipflow_core::Result<CmdOutput> {
            let line = spec.display_line();
            self.calls.lock().unwrap().push(line.clone());

            for (idx, (matcher, outcomes)) in self.rules.iter().enumerate() {
                if line.contains(matcher.as_str()) {
                    let mut hits = self.hits.lock().unwrap();
                    let hit = hits[idx].min(outcomes.len() - 1);
                    hits[idx] += 1;
                    return Ok(outcomes[hit].clone());
                }
            }

            Ok(ok(""))
        }
    }

    fn provisioner(runner: Arc<MockRunner>) -> Provisioner {
        let mut p = Provisioner::new(AzCli::new(runner));
        p.retry = RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_multiplier: 2.0,
        };
        p.readiness_timeout = Duration::from_millis(100);
        p
    }

    fn params() -> RunParams {
        let mut p = RunParams::new("octocat", "app1");
        p.resource_group = "rg1".to_string();
        p.plan_name = "plan1".to_string();
        p
    }

    #[tokio::test]
    async fn test_provision_creates_in_order() {
        let runner = Arc::new(MockRunner::new().rule(
            "webapp create",
            vec![ok(r#"{"name": "app1", "state": "Running", "defaultHostName": "app1.azurewebsites.net"}"#)],
        ));
        let app = provisioner(runner.clone())
            .provision(&params())
            .await
            .unwrap();

        assert_eq!(app.url.as_deref(), Some("https://app1.azurewebsites.net"));

        let calls = runner.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].contains("group create"));
        assert!(calls[1].contains("appservice plan create"));
        assert!(calls[2].contains("webapp create"));
    }

    #[tokio::test]
    async fn test_provision_stops_at_failed_plan() {
        let runner = Arc::new(
            MockRunner::new().rule("appservice plan create", vec![fail("quota exceeded")]),
        );
        let err = provisioner(runner.clone())
            .provision(&params())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CloudError::ProvisionFailed {
                resource: "app service plan",
                ..
            }
        ));
        assert_eq!(runner.count("webapp create"), 0);
    }

    #[tokio::test]
    async fn test_provision_surfaces_name_conflict() {
        let runner = Arc::new(MockRunner::new().rule(
            "webapp create",
            vec![fail("Website with given name app1 already exists.")],
        ));
        let err = provisioner(runner).provision(&params()).await.unwrap_err();

        assert!(matches!(err, CloudError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_fetch_profile_attempts_exactly_max() {
        let runner = Arc::new(
            MockRunner::new().rule("list-publishing-profiles", vec![fail("not ready")]),
        );
        let err = provisioner(runner.clone())
            .fetch_publish_profile("app1", "rg1")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CloudError::SecretRetrievalExhausted { attempts: 3 }
        ));
        assert_eq!(runner.count("list-publishing-profiles"), 3);
    }

    #[tokio::test]
    async fn test_fetch_profile_stops_on_first_success() {
        let runner = Arc::new(MockRunner::new().rule(
            "list-publishing-profiles",
            vec![fail("not ready"), ok(PROFILE_XML)],
        ));
        let xml = provisioner(runner.clone())
            .fetch_publish_profile("app1", "rg1")
            .await
            .unwrap();

        assert_eq!(xml, PROFILE_XML);
        assert_eq!(runner.count("list-publishing-profiles"), 2);
    }

    #[tokio::test]
    async fn test_fetch_profile_retries_on_unusable_profile() {
        // A 200 from az with no credential in the XML still counts as a
        // failed attempt.
        let runner = Arc::new(MockRunner::new().rule(
            "list-publishing-profiles",
            vec![ok("<publishData></publishData>"), ok(PROFILE_XML)],
        ));
        let xml = provisioner(runner)
            .fetch_publish_profile("app1", "rg1")
            .await
            .unwrap();

        assert_eq!(xml, PROFILE_XML);
    }

    #[tokio::test]
    async fn test_wait_until_ready_polls_until_running() {
        let runner = Arc::new(MockRunner::new().rule(
            "webapp show",
            vec![
                ok(r#"{"name": "app1", "state": "Stopped"}"#),
                ok(r#"{"name": "app1", "state": "Running"}"#),
            ],
        ));
        provisioner(runner.clone())
            .wait_until_ready("app1", "rg1")
            .await
            .unwrap();

        assert_eq!(runner.count("webapp show"), 2);
    }

    #[tokio::test]
    async fn test_wait_until_ready_times_out() {
        let runner = Arc::new(
            MockRunner::new().rule("webapp show", vec![ok(r#"{"name": "app1", "state": "Stopped"}"#)]),
        );
        let err = provisioner(runner)
            .wait_until_ready("app1", "rg1")
            .await
            .unwrap_err();

        assert!(matches!(err, CloudError::ReadinessTimeout { .. }));
    }

    #[tokio::test]
    async fn test_destroy_uses_no_wait() {
        let runner = Arc::new(MockRunner::new());
        provisioner(runner.clone()).destroy("rg1").await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("group delete"));
        assert!(calls[0].contains("--no-wait"));
    }

    #[test]
    fn test_backoff_is_capped() {
        let retry = RetryConfig {
            max_attempts: 10,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        };

        assert_eq!(retry.delay_for(1), Duration::from_secs(2));
        assert_eq!(retry.delay_for(2), Duration::from_secs(4));
        assert_eq!(retry.delay_for(3), Duration::from_secs(8));
        assert_eq!(retry.delay_for(10), Duration::from_secs(30));
    }
}
