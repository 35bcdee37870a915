//! Selector tables for the supported page layouts

use crate::cache::RecordKind;

/// Cards on a job search listing
pub const SEARCH_CARD_SELECTOR: &str = "div.job-card-container, li.jobs-search-results__list-item";

/// Link inside a search card
pub const CARD_LINK_SELECTOR: &str = "a";

pub const LOGIN_USERNAME_SELECTOR: &str = "#username";
pub const LOGIN_PASSWORD_SELECTOR: &str = "#password";
pub const LOGIN_SUBMIT_SELECTOR: &str = "button[type=\"submit\"]";

/// How a field's element is located
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Wait up to the configured timeout for the first match
    Wait,
    /// Take the first match, if there is one
    First,
    /// Take the first match whose text contains the needle (ASCII
    /// case-insensitive)
    AnyContaining(&'static str),
}

/// One named field and where to find it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub name: &'static str,
    /// CSS selector group; the first matching element wins
    pub selectors: &'static str,
    pub strategy: Strategy,
    /// Control clicked before reading, e.g. a "show more" toggle
    pub expand: Option<&'static str>,
}

impl FieldRule {
    pub const fn new(name: &'static str, selectors: &'static str, strategy: Strategy) -> Self {
        Self {
            name,
            selectors,
            strategy,
            expand: None,
        }
    }

    pub const fn expanding(self, toggle: &'static str) -> Self {
        Self {
            expand: Some(toggle),
            ..self
        }
    }
}

pub const JOB_RULES: &[FieldRule] = &[
    FieldRule::new(
        "title",
        "h1.job-title, h1.t-24, h1.jobs-unified-top-card__job-title",
        Strategy::Wait,
    ),
    FieldRule::new(
        "company",
        "a.job-card-container__company-name, \
         .job-details-jobs-unified-top-card__company-name, \
         a.jobs-unified-top-card__company-name",
        Strategy::First,
    ),
    FieldRule::new(
        "location",
        ".job-details-jobs-unified-top-card__bullet, \
         .job-card-container__metadata-item, \
         span.jobs-unified-top-card__bullet",
        Strategy::First,
    ),
    FieldRule::new(
        "description",
        ".jobs-description-content__text, .jobs-box__html-content, div.jobs-description__content",
        Strategy::First,
    )
    .expanding("button[aria-label*=\"Show more\"]"),
    FieldRule::new(
        "posted_date",
        ".jobs-unified-top-card__posted-date, \
         span.jobs-unified-top-card__subtitle-secondary-grouping",
        Strategy::First,
    ),
    FieldRule::new(
        "job_type",
        "span.jobs-unified-top-card__workplace-type",
        Strategy::First,
    ),
    FieldRule::new(
        "seniority_level",
        "li.jobs-unified-top-card__job-insight",
        Strategy::AnyContaining("level"),
    ),
];

pub const PROFILE_RULES: &[FieldRule] = &[
    FieldRule::new("name", "h1.text-heading-xlarge, h1.inline.t-24", Strategy::Wait),
    FieldRule::new("headline", "div.text-body-medium.break-words", Strategy::First),
    FieldRule::new(
        "location",
        "span.text-body-small.inline.t-black--light.break-words",
        Strategy::First,
    ),
    FieldRule::new(
        "about",
        "div.display-flex.ph5.pv3 span[aria-hidden=\"true\"]",
        Strategy::First,
    ),
    FieldRule::new("connections", "span.t-black--light span.t-bold", Strategy::First),
];

/// Built-in rules for a record kind
pub fn default_rules(kind: RecordKind) -> &'static [FieldRule] {
    match kind {
        RecordKind::Job => JOB_RULES,
        RecordKind::Profile => PROFILE_RULES,
    }
}
