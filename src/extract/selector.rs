use crate::cache::{Fields, RecordKind};
use crate::config::CrawlerConfig;
use crate::driver::{Driver, DriverError, DriverResult, Element};
use crate::extract::rules::{default_rules, FieldRule, Strategy};
use crate::extract::text::{clean_text, NOT_AVAILABLE};
use crate::extract::FieldExtractor;
use async_trait::async_trait;
use std::time::Duration;

/// Table-driven field extractor
///
/// Each rule is applied on its own. A field whose element is missing,
/// times out, or fails to read is recorded as [`NOT_AVAILABLE`] and the
/// remaining fields are still extracted. Only stale references and lost
/// sessions escape, so the caller can reload or give up.
#[derive(Debug, Clone)]
pub struct SelectorExtractor {
    wait_timeout: Duration,
    job_rules: Vec<FieldRule>,
    profile_rules: Vec<FieldRule>,
}

impl SelectorExtractor {
    pub fn new(wait_timeout: Duration) -> Self {
        Self {
            wait_timeout,
            job_rules: default_rules(RecordKind::Job).to_vec(),
            profile_rules: default_rules(RecordKind::Profile).to_vec(),
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.wait_timeout())
    }

    /// Replaces the rules used for `kind`
    pub fn with_rules(mut self, kind: RecordKind, rules: Vec<FieldRule>) -> Self {
        match kind {
            RecordKind::Job => self.job_rules = rules,
            RecordKind::Profile => self.profile_rules = rules,
        }
        self
    }

    pub fn rules(&self, kind: RecordKind) -> &[FieldRule] {
        match kind {
            RecordKind::Job => &self.job_rules,
            RecordKind::Profile => &self.profile_rules,
        }
    }

    async fn expand<D: Driver>(&self, driver: &D, toggle: &str) -> DriverResult<()> {
        let button = match driver.find_one(toggle).await {
            Ok(Some(button)) => button,
            Ok(None) => return Ok(()),
            Err(e) if escapes(&e) => return Err(e),
            Err(e) => {
                tracing::debug!("Could not look up {}: {}", toggle, e);
                return Ok(());
            }
        };

        match button.click().await {
            Err(e) if escapes(&e) => Err(e),
            Err(e) => {
                tracing::debug!("Could not click {}: {}", toggle, e);
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    async fn read_field<D: Driver>(
        &self,
        driver: &D,
        rule: &FieldRule,
    ) -> DriverResult<Option<String>> {
        if let Some(toggle) = rule.expand {
            self.expand(driver, toggle).await?;
        }

        match rule.strategy {
            Strategy::Wait => {
                let element = driver
                    .wait_until_present(rule.selectors, self.wait_timeout)
                    .await?;
                element.text().await.map(Some)
            }
            Strategy::First => match driver.find_one(rule.selectors).await? {
                Some(element) => element.text().await.map(Some),
                None => Ok(None),
            },
            Strategy::AnyContaining(needle) => {
                let needle = needle.to_ascii_lowercase();
                for element in driver.find_all(rule.selectors).await? {
                    let text = element.text().await?;
                    if text.to_ascii_lowercase().contains(&needle) {
                        return Ok(Some(text));
                    }
                }
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl FieldExtractor for SelectorExtractor {
    async fn extract<D: Driver>(&self, driver: &D, kind: RecordKind) -> DriverResult<Fields> {
        let mut fields = Fields::new();

        for rule in self.rules(kind) {
            let value = match self.read_field(driver, rule).await {
                Ok(Some(text)) => {
                    let text = clean_text(&text);
                    if text.is_empty() {
                        tracing::debug!("{} field {} is empty", kind, rule.name);
                        NOT_AVAILABLE.to_string()
                    } else {
                        text
                    }
                }
                Ok(None) => {
                    tracing::warn!("{} field {} not found", kind, rule.name);
                    NOT_AVAILABLE.to_string()
                }
                Err(e) if escapes(&e) => return Err(e),
                Err(e) => {
                    tracing::warn!("Could not extract {} field {}: {}", kind, rule.name, e);
                    NOT_AVAILABLE.to_string()
                }
            };

            fields.insert(rule.name.to_string(), value);
        }

        Ok(fields)
    }
}

/// Errors that must reach the retry layer instead of becoming a sentinel
fn escapes(error: &DriverError) -> bool {
    error.is_stale() || error.is_fatal()
}
