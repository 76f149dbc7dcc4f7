//! Background scheduler for recurring scrapes.
//!
//! Jobs are keyed by a stable id. Each installed job runs in its own task
//! and sleeps until its trigger fires, so jobs never block each other; they
//! share the ingestor's pacing and connection pool. Syncing a new set of
//! [`JobSpec`]s replaces only the jobs whose configuration changed.

pub mod jobs;

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::{DateTime, Local, NaiveTime, TimeZone};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::repository::ScheduleTouch;
use crate::services::{IngestJob, Ingestor};

pub use jobs::desired_jobs;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid time of day '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error("interval for {0} must be positive")]
    InvalidInterval(String),
}

/// When a job fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Every day at a local time of day.
    Daily(NaiveTime),
    /// Repeatedly, first firing one interval after installation.
    Interval(Duration),
}

impl Trigger {
    /// Parse an "HH:MM" daily trigger.
    pub fn daily(at: &str) -> Result<Self, ScheduleError> {
        let at = at.trim();
        let (hours, minutes) = at
            .split_once(':')
            .ok_or_else(|| ScheduleError::InvalidTime(at.to_string()))?;
        let parse = |v: &str| v.parse::<u32>().ok().filter(|_| (1..=2).contains(&v.len()));
        match (parse(hours), parse(minutes)) {
            (Some(h), Some(m)) => NaiveTime::from_hms_opt(h, m, 0)
                .map(Trigger::Daily)
                .ok_or_else(|| ScheduleError::InvalidTime(at.to_string())),
            _ => Err(ScheduleError::InvalidTime(at.to_string())),
        }
    }

    pub fn every(interval: Duration) -> Self {
        Trigger::Interval(interval)
    }

    /// Next firing strictly after `now`.
    pub fn next_fire<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        match self {
            Trigger::Interval(every) => {
                now.clone() + chrono::Duration::from_std(*every).unwrap_or(chrono::Duration::zero())
            }
            Trigger::Daily(at) => {
                let tz = now.timezone();
                let mut day = now.date_naive();
                loop {
                    // Skips days where the wall time does not exist.
                    if let Some(candidate) = tz.from_local_datetime(&day.and_time(*at)).earliest() {
                        if candidate > *now {
                            return candidate;
                        }
                    }
                    day = match day.succ_opt() {
                        Some(next) => next,
                        None => return now.clone(),
                    };
                }
            }
        }
    }

    /// Time to wait from `now` until the next firing.
    pub fn delay_from<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Duration {
        (self.next_fire(now) - now.clone())
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::Daily(at) => write!(f, "daily at {}", at.format("%H:%M")),
            Trigger::Interval(every) => write!(f, "every {}s", every.as_secs()),
        }
    }
}

/// A job the settings ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub id: String,
    pub trigger: Trigger,
    pub job: IngestJob,
    /// Scrape-log tag for runs of this job.
    pub tag: String,
    /// Settings column stamped after a successful run.
    pub touch: ScheduleTouch,
}

/// What a sync changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub added: Vec<String>,
    pub replaced: Vec<String>,
    pub removed: Vec<String>,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.replaced.is_empty() && self.removed.is_empty()
    }
}

struct Installed {
    spec: JobSpec,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Registry of running jobs.
pub struct Scheduler {
    ingestor: Ingestor,
    jobs: HashMap<String, Installed>,
}

impl Scheduler {
    pub fn new(ingestor: Ingestor) -> Self {
        Self {
            ingestor,
            jobs: HashMap::new(),
        }
    }

    /// Installed jobs with their triggers, ordered by id.
    pub fn installed(&self) -> BTreeMap<String, Trigger> {
        self.jobs
            .iter()
            .map(|(id, job)| (id.clone(), job.spec.trigger))
            .collect()
    }

    /// Install `specs` as the complete job set.
    ///
    /// Unchanged jobs keep running; changed ones are replaced and ids absent
    /// from `specs` are removed. A replaced or removed job that is mid-run
    /// finishes that run first.
    pub fn sync(&mut self, specs: Vec<JobSpec>) -> SyncReport {
        let mut report = SyncReport::default();
        let mut wanted: HashMap<String, JobSpec> =
            specs.into_iter().map(|s| (s.id.clone(), s)).collect();

        let stale: Vec<String> = self
            .jobs
            .keys()
            .filter(|id| !wanted.contains_key(*id))
            .cloned()
            .collect();
        for id in stale {
            if let Some(job) = self.jobs.remove(&id) {
                let _ = job.stop.send(true);
                info!("Removed job {}", id);
                report.removed.push(id);
            }
        }

        let mut ids: Vec<String> = wanted.keys().cloned().collect();
        ids.sort();
        for id in ids {
            let Some(spec) = wanted.remove(&id) else { continue };
            match self.jobs.get(&id) {
                Some(existing) if existing.spec == spec => continue,
                Some(_) => {
                    if let Some(old) = self.jobs.remove(&id) {
                        let _ = old.stop.send(true);
                    }
                    info!("Replaced job {} ({})", id, spec.trigger);
                    report.replaced.push(id.clone());
                }
                None => {
                    info!("Added job {} ({})", id, spec.trigger);
                    report.added.push(id.clone());
                }
            }
            let installed = self.install(spec);
            self.jobs.insert(id, installed);
        }

        report
    }

    fn install(&self, spec: JobSpec) -> Installed {
        let (stop, mut stopped) = watch::channel(false);
        let ingestor = self.ingestor.clone();
        let job = spec.clone();

        let task = tokio::spawn(async move {
            loop {
                let delay = job.trigger.delay_from(&Local::now());
                debug!("Job {} sleeping {:?}", job.id, delay);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = stopped.changed() => break,
                }
                if *stopped.borrow() {
                    break;
                }
                match jobs::is_current(ingestor.context(), &job).await {
                    Ok(true) => {
                        run_job(&ingestor, &job).await;
                    }
                    Ok(false) => info!("Job {} no longer matches its settings row, skipping run", job.id),
                    Err(e) => {
                        warn!("Could not re-check settings for job {}: {}", job.id, e);
                        run_job(&ingestor, &job).await;
                    }
                }
            }
            debug!("Job {} stopped", job.id);
        });

        Installed { spec, stop, task }
    }

    /// Stop every job. Runs in flight are aborted.
    pub async fn shutdown(&mut self) {
        for (id, job) in self.jobs.drain() {
            let _ = job.stop.send(true);
            job.task.abort();
            let _ = job.task.await;
            debug!("Shut down job {}", id);
        }
        info!("Scheduler stopped");
    }

    /// Re-read settings every `poll` until `shutdown` flips to true.
    ///
    /// Installed jobs only change on a poll tick, but every job re-checks
    /// its settings row just before firing, so a job that was disabled or
    /// rescheduled since the last tick never fires under its old settings.
    pub async fn run(mut self, poll: Duration, mut shutdown: watch::Receiver<bool>) {
        let ctx = self.ingestor.context().clone();
        loop {
            match desired_jobs(&ctx).await {
                Ok(specs) => {
                    let report = self.sync(specs);
                    if !report.is_empty() {
                        info!(
                            "Schedule synced: {} added, {} replaced, {} removed",
                            report.added.len(),
                            report.replaced.len(),
                            report.removed.len()
                        );
                    }
                }
                Err(e) => error!("Failed to read schedule settings: {}", e),
            }

            tokio::select! {
                _ = tokio::time::sleep(poll) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        self.shutdown().await;
    }
}

/// One scheduled run. The outcome is already logged by the ingestor; only
/// successful runs stamp their settings row.
pub async fn run_job(ingestor: &Ingestor, spec: &JobSpec) -> bool {
    info!("Running scheduled job {}", spec.id);
    let outcome = ingestor.run_tagged(&spec.job, &spec.tag).await;
    if !outcome.success {
        error!("Scheduled job {} failed: {}", spec.id, outcome.message);
        return false;
    }
    if let Err(e) = ingestor.context().settings().touch(&spec.touch).await {
        warn!("Job {} succeeded but last_scrape was not stamped: {}", spec.id, e);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_parse_daily() {
        assert_eq!(
            Trigger::daily("02:00").unwrap(),
            Trigger::Daily(NaiveTime::from_hms_opt(2, 0, 0).unwrap())
        );
        assert_eq!(
            Trigger::daily("7:05").unwrap(),
            Trigger::Daily(NaiveTime::from_hms_opt(7, 5, 0).unwrap())
        );
        for bad in ["24:00", "12:60", "noon", "12", "", "1:2:3", "+1:00"] {
            assert_eq!(
                Trigger::daily(bad),
                Err(ScheduleError::InvalidTime(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_daily_next_fire() {
        let trigger = Trigger::daily("03:00").unwrap();
        assert_eq!(
            trigger.next_fire(&at("2026-03-10T01:00:00Z")),
            at("2026-03-10T03:00:00Z")
        );
        assert_eq!(
            trigger.next_fire(&at("2026-03-10T03:00:00Z")),
            at("2026-03-11T03:00:00Z")
        );
        assert_eq!(
            trigger.delay_from(&at("2026-03-10T02:30:00Z")),
            Duration::from_secs(30 * 60)
        );
    }

    #[test]
    fn test_interval_next_fire() {
        let trigger = Trigger::every(Duration::from_secs(60));
        assert_eq!(
            trigger.next_fire(&at("2026-03-10T01:00:00Z")),
            at("2026-03-10T01:01:00Z")
        );
        assert_eq!(trigger.to_string(), "every 60s");
    }
}
