use crate::cache::RecordStore;
use crate::config::{Credentials, SiteConfig};
use crate::crawler::{Crawler, LoginOutcome};
use crate::driver::{Driver, DriverError, DriverResult, Element};
use crate::extract::rules::{
    LOGIN_PASSWORD_SELECTOR, LOGIN_SUBMIT_SELECTOR, LOGIN_USERNAME_SELECTOR,
};
use crate::extract::FieldExtractor;
use crate::retry::Sleeper;
use crate::url::site_url;
use crate::ShioriError;
use std::time::Duration;

impl<D: Driver, E: FieldExtractor, S: RecordStore> Crawler<D, E, S> {
    /// Signs in with `credentials`
    ///
    /// The whole form flow is retried on timeouts. Landing on a
    /// verification checkpoint is not a failure and is never retried: it
    /// is returned as [`LoginOutcome::CheckpointRequired`] so the caller can
    /// have a human complete it, then call [`Crawler::confirm_checkpoint`].
    ///
    /// # Returns
    ///
    /// * `Ok(LoginOutcome)` - Signed in, or stopped at a checkpoint
    /// * `Err(ShioriError::MissingCredentials)` - Email or password is empty
    /// * `Err(ShioriError::Retry)` - The login flow failed
    pub async fn login(&mut self, credentials: &Credentials) -> Result<LoginOutcome, ShioriError> {
        if !credentials.is_complete() {
            return Err(ShioriError::MissingCredentials);
        }

        let login_url = site_url(&self.config.site, &self.config.site.login_path)?;
        tracing::info!("Logging in as {}", credentials.email);

        let outcome = {
            let driver = &self.driver;
            let site = &self.config.site;
            let sleeper = self.sleeper.as_ref();
            let timeout = self.config.crawler.wait_timeout();
            let poll = self.config.crawler.url_poll_interval();
            let target = login_url.as_str();
            let email = credentials.email.as_str();
            let password = credentials.password.as_str();

            self.executor
                .execute(driver, "login", move || async move {
                    driver.navigate(target).await?;

                    let username_field = driver
                        .wait_until_present(LOGIN_USERNAME_SELECTOR, timeout)
                        .await?;
                    username_field.clear().await?;
                    username_field.send_keys(email).await?;

                    let password_field = require(driver, LOGIN_PASSWORD_SELECTOR).await?;
                    password_field.clear().await?;
                    password_field.send_keys(password).await?;

                    require(driver, LOGIN_SUBMIT_SELECTOR).await?.click().await?;

                    await_landing(driver, sleeper, site, timeout, poll).await
                })
                .await?
        };

        match &outcome {
            LoginOutcome::SignedIn => {
                self.signed_in = true;
                tracing::info!("Login successful");
            }
            LoginOutcome::CheckpointRequired { url } => {
                tracing::warn!("Security checkpoint at {}; waiting for manual verification", url);
            }
        }

        Ok(outcome)
    }

    /// Checks once whether a pending checkpoint has been completed
    pub async fn confirm_checkpoint(&mut self) -> Result<LoginOutcome, ShioriError> {
        let url = self.driver.current_url().await?;

        let outcome = match classify_landing(&self.config.site, &url) {
            Some(pending @ LoginOutcome::CheckpointRequired { .. }) => pending,
            _ => LoginOutcome::SignedIn,
        };

        if outcome == LoginOutcome::SignedIn {
            self.signed_in = true;
            tracing::info!("Checkpoint cleared");
        } else {
            tracing::warn!("Still at security checkpoint: {}", url);
        }

        Ok(outcome)
    }
}

async fn require<D: Driver>(driver: &D, selector: &str) -> DriverResult<D::Element> {
    driver
        .find_one(selector)
        .await?
        .ok_or_else(|| DriverError::NoSuchElement(selector.to_string()))
}

/// Polls the current URL until the login redirect settles
async fn await_landing<D: Driver>(
    driver: &D,
    sleeper: &dyn Sleeper,
    site: &SiteConfig,
    timeout: Duration,
    poll: Duration,
) -> DriverResult<LoginOutcome> {
    let poll = poll.max(Duration::from_millis(1));
    let mut waited = Duration::ZERO;

    loop {
        let url = driver.current_url().await?;
        if let Some(outcome) = classify_landing(site, &url) {
            return Ok(outcome);
        }

        if waited >= timeout {
            return Err(DriverError::Timeout(format!("login redirect, last at {}", url)));
        }

        sleeper.sleep(poll).await;
        waited += poll;
    }
}

/// Checkpoint wins over signed-in when a URL carries both markers
fn classify_landing(site: &SiteConfig, url: &str) -> Option<LoginOutcome> {
    if url.contains(site.checkpoint_marker.as_str()) {
        Some(LoginOutcome::CheckpointRequired {
            url: url.to_string(),
        })
    } else if url.contains(site.signed_in_marker.as_str()) {
        Some(LoginOutcome::SignedIn)
    } else {
        None
    }
}
