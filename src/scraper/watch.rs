//! The open-section watch job.
//!
//! One run groups every watched section by the search that lists it, scrapes
//! each group once, keeps the watched sections that are now open, drops pairs
//! already alerted within the renotify grace period, records alerts and then
//! notifies each recipient with a single message.
//!
//! Failure policy:
//! - a group whose search fails on the remote side (navigation, parse,
//!   normalize, timeout) is logged and skipped;
//! - a storage failure anywhere outside the grace filter aborts the run;
//! - a failing grace filter is logged and the run continues unfiltered;
//! - a failing notification is logged and the next recipient is tried.

use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::ScrapeError;
use super::refresh::refresh_class_data;
use crate::data::Store;
use crate::data::models::{Course, CourseSection, Recipient, SearchKey, WatchedSection};
use crate::globalsearch::ClassSearch;
use crate::globalsearch::models::SectionStatus;
use crate::notify::{Notifier, NotifyError, format_message, format_section_line};
use crate::utils::{fmt_duration, log_if_slow};

/// A group search slower than this is logged.
const SLOW_GROUP_THRESHOLD: Duration = Duration::from_secs(30);

/// Watched sections that share one results-page search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchGroup {
    pub key: SearchKey,
    /// Union of watched class numbers, in first-seen order.
    pub section_numbers: IndexSet<i32>,
    /// Distinct recipients watching anything in this group.
    pub recipients: IndexMap<i32, Recipient>,
    pub watches: Vec<WatchedSection>,
}

/// Bucket watched sections by (school, term, subject, career).
pub fn group_watched_sections(watched: Vec<WatchedSection>) -> Vec<SearchGroup> {
    let mut groups: IndexMap<SearchKey, SearchGroup> = IndexMap::new();

    for watch in watched {
        let key = watch.search_key();
        let group = groups.entry(key).or_insert_with(|| SearchGroup {
            key,
            section_numbers: IndexSet::new(),
            recipients: IndexMap::new(),
            watches: Vec::new(),
        });

        group.section_numbers.insert(watch.section.number);
        group
            .recipients
            .entry(watch.recipient.id)
            .or_insert_with(|| watch.recipient.clone());
        group.watches.push(watch);
    }

    groups.into_values().collect()
}

/// Why a group produced no result.
#[derive(Debug, thiserror::Error)]
pub enum GroupError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),
    #[error("Group search timed out after {0:?}")]
    Timeout(Duration),
    #[error("No stored search context for {0:?}")]
    MissingContext(SearchKey),
}

impl GroupError {
    /// Isolated failures skip the group; the others abort the run.
    pub fn is_isolated(&self) -> bool {
        match self {
            Self::Scrape(e) => !e.is_storage(),
            Self::Timeout(_) | Self::MissingContext(_) => true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum RecipientError {
    #[error("Failed to build notification message")]
    Message(#[source] anyhow::Error),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Knobs for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    /// Hours before a (recipient, section) pair may be alerted again.
    pub renotify_grace_hours: f64,
    /// Upper bound for one group's scrape and persist.
    pub group_timeout: Duration,
}

/// What a run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub groups: usize,
    pub failed_groups: usize,
    /// Open (recipient, section) pairs before the grace filter.
    pub open_pairs: usize,
    /// Pairs dropped by the grace filter.
    pub suppressed: usize,
    pub alerts_recorded: usize,
    pub notified: usize,
    pub notify_failures: usize,
}

/// Newly open sections of one recipient, keyed by section id.
#[derive(Debug, Clone)]
struct RecipientAlerts {
    recipient: Recipient,
    sections: IndexMap<i32, (CourseSection, Course)>,
}

/// Runs the watch job against a store, a page source and a notifier.
pub struct WatchJob<'a> {
    search: &'a dyn ClassSearch,
    store: &'a dyn Store,
    notifier: &'a dyn Notifier,
    options: WatchOptions,
}

impl<'a> WatchJob<'a> {
    pub fn new(
        search: &'a dyn ClassSearch,
        store: &'a dyn Store,
        notifier: &'a dyn Notifier,
        options: WatchOptions,
    ) -> Self {
        Self {
            search,
            store,
            notifier,
            options,
        }
    }

    /// Run the job once.
    ///
    /// The persisted renotify grace period wins over the configured one.
    pub async fn run(&self) -> anyhow::Result<CheckSummary> {
        let start = Instant::now();
        info!("Checking for open sections");

        let grace_hours = match self.store.global_settings().await {
            Ok(Some(settings)) => settings.hours_renotify_grace_period,
            Ok(None) => self.options.renotify_grace_hours,
            Err(e) => {
                warn!(error = ?e, "Failed to load global settings, using configured grace period");
                self.options.renotify_grace_hours
            }
        };

        let groups = group_watched_sections(self.store.watched_sections().await?);
        let mut summary = CheckSummary {
            groups: groups.len(),
            ..CheckSummary::default()
        };
        if groups.is_empty() {
            info!("No recipients with watched sections found");
            return Ok(summary);
        }
        info!(count = groups.len(), "Found search groups to process");

        let mut alerts: IndexMap<i32, RecipientAlerts> = IndexMap::new();
        for group in &groups {
            match self.search_group(group).await {
                Ok(open) => merge_open_watches(&mut alerts, open),
                Err(e) if e.is_isolated() => {
                    summary.failed_groups += 1;
                    error!(error = ?e, group = ?group.key, "Error searching for watched sections, skipping group");
                }
                Err(e) => return Err(anyhow::Error::new(e).context("Watch job aborted")),
            }
        }

        summary.open_pairs = count_pairs(&alerts);
        if summary.open_pairs == 0 {
            info!(duration = fmt_duration(start.elapsed()), "No open sections found for any recipients");
            return Ok(summary);
        }

        let cutoff = grace_cutoff(Utc::now(), grace_hours);
        summary.suppressed = self.apply_grace_filter(&mut alerts, cutoff).await;

        let pairs: Vec<(i32, i32)> = alerts
            .values()
            .flat_map(|a| a.sections.keys().map(|section_id| (a.recipient.id, *section_id)))
            .collect();
        if pairs.is_empty() {
            info!(
                suppressed = summary.suppressed,
                "All open sections were alerted within the grace period"
            );
            return Ok(summary);
        }
        summary.alerts_recorded = self.store.insert_alerts(&pairs).await?;
        info!(count = summary.alerts_recorded, "Recorded class alerts");

        info!(count = alerts.len(), "Notifying recipients about open sections");
        for recipient_alerts in alerts.values() {
            match self.notify_recipient(recipient_alerts).await {
                Ok(()) => summary.notified += 1,
                Err(e) => {
                    summary.notify_failures += 1;
                    error!(error = ?e, recipient = recipient_alerts.recipient.name, "Error notifying recipient");
                }
            }
        }

        info!(
            groups = summary.groups,
            failed_groups = summary.failed_groups,
            open = summary.open_pairs,
            suppressed = summary.suppressed,
            alerts = summary.alerts_recorded,
            notified = summary.notified,
            notify_failures = summary.notify_failures,
            duration = fmt_duration(start.elapsed()),
            "Watch job finished"
        );
        Ok(summary)
    }

    /// Scrape one group and return its watches whose section is now open.
    async fn search_group(&self, group: &SearchGroup) -> Result<Vec<WatchedSection>, GroupError> {
        let context = self
            .store
            .search_context(group.key)
            .await
            .map_err(ScrapeError::Storage)?
            .ok_or(GroupError::MissingContext(group.key))?;

        info!(
            sections = group.section_numbers.len(),
            recipients = group.recipients.len(),
            search = %context,
            "Searching for watched sections"
        );

        let start = Instant::now();
        let refresh = tokio::time::timeout(
            self.options.group_timeout,
            refresh_class_data(self.search, self.store, &context, false),
        )
        .await
        .map_err(|_| GroupError::Timeout(self.options.group_timeout))??;
        log_if_slow(start, SLOW_GROUP_THRESHOLD, "watch group search");

        let open_numbers: HashSet<i32> = refresh
            .courses
            .iter()
            .flat_map(|course| &course.sections)
            .filter(|section| {
                section.status == SectionStatus::Open
                    && group.section_numbers.contains(&section.number)
            })
            .map(|section| section.number)
            .collect();

        let open: Vec<WatchedSection> = group
            .watches
            .iter()
            .filter(|watch| open_numbers.contains(&watch.section.number))
            .cloned()
            .collect();

        if open.is_empty() {
            info!(search = %context, "No open sections found for this group");
        } else {
            info!(count = open_numbers.len(), search = %context, "Found open sections");
        }
        Ok(open)
    }

    /// Drop pairs alerted after `cutoff`. Returns how many were dropped.
    ///
    /// A failing lookup leaves `alerts` untouched.
    async fn apply_grace_filter(
        &self,
        alerts: &mut IndexMap<i32, RecipientAlerts>,
        cutoff: DateTime<Utc>,
    ) -> usize {
        let recent = match self.store.recent_alerts(cutoff).await {
            Ok(recent) => recent,
            Err(e) => {
                error!(error = ?e, "Grace-period filter failed, notifying without filtering");
                return 0;
            }
        };

        let recent: HashSet<(i32, i32)> = recent
            .iter()
            .map(|alert| (alert.recipient_id, alert.course_section_id))
            .collect();

        let before = count_pairs(alerts);
        for (recipient_id, recipient_alerts) in alerts.iter_mut() {
            recipient_alerts
                .sections
                .retain(|section_id, _| !recent.contains(&(*recipient_id, *section_id)));
        }
        alerts.retain(|_, recipient_alerts| !recipient_alerts.sections.is_empty());

        let suppressed = before - count_pairs(alerts);
        if suppressed > 0 {
            info!(count = suppressed, cutoff = %cutoff, "Suppressed alerts within grace period");
        }
        suppressed
    }

    async fn notify_recipient(&self, alerts: &RecipientAlerts) -> Result<(), RecipientError> {
        let mut lines = Vec::with_capacity(alerts.sections.len());
        for (section, course) in alerts.sections.values() {
            let instructors = self
                .store
                .instructor_names(section.id)
                .await
                .map_err(RecipientError::Message)?;
            lines.push(format_section_line(course, section, &instructors));
        }

        let Some(message) = format_message(&lines) else {
            return Ok(());
        };
        self.notifier.notify(&alerts.recipient, &message).await?;

        info!(
            recipient = alerts.recipient.name,
            count = alerts.sections.len(),
            "Notified recipient about open sections"
        );
        Ok(())
    }
}

fn merge_open_watches(alerts: &mut IndexMap<i32, RecipientAlerts>, open: Vec<WatchedSection>) {
    for watch in open {
        let entry = alerts
            .entry(watch.recipient.id)
            .or_insert_with(|| RecipientAlerts {
                recipient: watch.recipient.clone(),
                sections: IndexMap::new(),
            });
        entry
            .sections
            .entry(watch.section.id)
            .or_insert((watch.section, watch.course));
    }
    debug!(recipients = alerts.len(), "Merged open sections");
}

fn count_pairs(alerts: &IndexMap<i32, RecipientAlerts>) -> usize {
    alerts.values().map(|a| a.sections.len()).sum()
}

/// `now - hours`; negative periods are treated as zero.
pub fn grace_cutoff(now: DateTime<Utc>, hours: f64) -> DateTime<Utc> {
    let millis = (hours.max(0.0) * 3_600_000.0).round() as i64;
    chrono::Duration::try_milliseconds(millis)
        .and_then(|period| now.checked_sub_signed(period))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
