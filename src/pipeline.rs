// src/pipeline.rs
//! Ingest → parse → stage → publish pipeline
//!
//! Four independent flows share state only through short lock scopes:
//! host callbacks push into the ingest channel, a dedicated parser thread
//! folds sentences into the staging buffers, and two scheduled tasks on the
//! pipeline's runtime publish snapshots and trim the satellite registry.
//! No code path ever holds two staging locks at once.

use crate::{
    config::DiagConfig,
    display::SnapshotObserver,
    error::Result,
    eventlog::EventLog,
    gps::{nmea, LocationFields, SatelliteCountFields, SatelliteRegistry, SentenceUpdate},
    services::{
        self, LocationService, LocationStatus, SubscriberIdentity, TelephonyService,
        TelephonyStatus,
    },
    signal::{CellIdentity, SignalEvent, SignalFields},
    snapshot::{Snapshot, SnapshotHandle},
    trim::TrimPolicy,
};
use chrono::Local;
use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    thread,
    time::{Duration, Instant},
};
use tokio::{
    runtime::{Handle, Runtime},
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};

const ECHO_PREVIEW_CHARS: usize = 60;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Host-reported state that bypasses the parser
#[derive(Debug, Clone, Default)]
struct HostState {
    signal: SignalFields,
    cell: CellIdentity,
    identity: SubscriberIdentity,
    location_status: LocationStatus,
    telephony_status: TelephonyStatus,
}

/// Pre-publish buffers, one lock each
#[derive(Debug, Default)]
pub(crate) struct Staging {
    location: Mutex<LocationFields>,
    counts: Mutex<SatelliteCountFields>,
    satellites: Mutex<SatelliteRegistry>,
    host: Mutex<HostState>,
}

impl Staging {
    pub(crate) fn apply(&self, update: SentenceUpdate) {
        match update {
            SentenceUpdate::Location(fields) => lock(&self.location).merge(&fields),
            SentenceUpdate::Counts(fields) => lock(&self.counts).merge(&fields),
            SentenceUpdate::Satellites(batch) => lock(&self.satellites).merge(batch),
        }
    }

    pub(crate) fn trim_satellites(&self, policy: &TrimPolicy) -> usize {
        lock(&self.satellites).trim(policy)
    }

    pub(crate) fn satellite_count(&self) -> usize {
        lock(&self.satellites).len()
    }
}

/// Latest GGA/RMC sentence, refreshed at most once per interval
#[derive(Debug)]
struct SentenceEcho {
    interval: Duration,
    state: Mutex<EchoState>,
}

#[derive(Debug, Default)]
struct EchoState {
    latest: Option<String>,
    last_logged: Option<Instant>,
}

impl SentenceEcho {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: Mutex::new(EchoState::default()),
        }
    }

    fn observe(&self, sentence: &str, log: &EventLog) {
        let now = Instant::now();
        {
            let mut state = lock(&self.state);
            let due = state
                .last_logged
                .map_or(true, |at| now.duration_since(at) > self.interval);
            if !due {
                return;
            }
            state.latest = Some(sentence.to_string());
            state.last_logged = Some(now);
        }
        let preview: String = sentence.chars().take(ECHO_PREVIEW_CHARS).collect();
        log.info(format!("NMEA: {}...", preview));
    }

    fn latest(&self) -> Option<String> {
        lock(&self.state).latest.clone()
    }
}

/// Producer side of the ingest queue. Cheap to clone; never blocks.
#[derive(Debug, Clone)]
pub struct IngestHandle {
    tx: UnboundedSender<String>,
    echo: Arc<SentenceEcho>,
    staging: Arc<Staging>,
    log: EventLog,
}

impl IngestHandle {
    /// Queue one raw sentence. Returns `false` once the pipeline has stopped.
    pub fn offer(&self, sentence: impl Into<String>) -> bool {
        let sentence = sentence.into();
        if nmea::is_fix_sentence(&sentence) {
            self.echo.observe(&sentence, &self.log);
        }
        self.tx.send(sentence).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// The source ran out of sentences (end of file, port closed)
    pub fn report_end(&self, reason: impl Into<String>) {
        let reason = reason.into();
        self.log.warn(format!("NMEA feed ended: {}", reason));
        self.set_location_status(LocationStatus::FeedEnded(reason));
    }

    /// The source stopped on a read error
    pub fn report_failure(&self, error: impl std::fmt::Display) {
        let reason = error.to_string();
        self.log.error(format!("NMEA feed failed: {}", reason));
        self.set_location_status(LocationStatus::Failed(reason));
    }

    pub(crate) fn set_location_status(&self, status: LocationStatus) {
        lock(&self.staging.host).location_status = status;
    }
}

/// Entry point for telephony events
#[derive(Debug, Clone)]
pub struct SignalHandle {
    staging: Arc<Staging>,
}

impl SignalHandle {
    pub fn deliver(&self, event: SignalEvent) {
        match event {
            SignalEvent::Strength(report) => {
                let fields = SignalFields::from_report(&report);
                tracing::debug!(dbm = ?fields.dbm, technology = ?fields.technology, "Signal strength changed");
                lock(&self.staging.host).signal = fields;
            }
            SignalEvent::CellLocation(location) => {
                lock(&self.staging.host).cell = location.into();
            }
        }
    }
}

/// Drains the ingest queue on a dedicated thread
struct ParserWorker {
    rx: UnboundedReceiver<String>,
    staging: Arc<Staging>,
    running: Arc<AtomicBool>,
    log: EventLog,
    idle_wait: Duration,
    runtime: Handle,
}

/// Clears the running flag and logs if the worker thread unwinds
struct WorkerExit<'a> {
    running: &'a AtomicBool,
    log: &'a EventLog,
}

impl Drop for WorkerExit<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.running.store(false, Ordering::Release);
            self.log.error("Parser worker terminated abnormally");
        }
    }
}

impl ParserWorker {
    fn run(mut self) {
        let running = Arc::clone(&self.running);
        let log = self.log.clone();
        let _exit = WorkerExit {
            running: &running,
            log: &log,
        };

        tracing::debug!("Parser worker started");
        let mut processed: u64 = 0;
        let idle_wait = self.idle_wait;

        while self.running.load(Ordering::Acquire) {
            // Wakes on arrival; the timeout only bounds how long a stop request waits.
            // The timer is created inside the runtime context.
            let rx = &mut self.rx;
            let next = self
                .runtime
                .block_on(async { tokio::time::timeout(idle_wait, rx.recv()).await });
            match next {
                Ok(Some(sentence)) => {
                    process_sentence(&self.staging, &sentence);
                    processed += 1;
                }
                Ok(None) => break,
                Err(_) => {}
            }
        }

        tracing::debug!(processed, "Parser worker stopped");
    }
}

/// Parse one sentence into the staging buffers. A panic is logged and the
/// sentence dropped; it never takes the worker down.
pub(crate) fn process_sentence(staging: &Staging, sentence: &str) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        for update in nmea::parse_sentence(sentence) {
            staging.apply(update);
        }
    }));
    if outcome.is_err() {
        tracing::error!(sentence, "Sentence processing panicked, skipping");
    }
}

/// Copies staging into the published snapshot
pub(crate) struct Publisher {
    staging: Arc<Staging>,
    snapshot: SnapshotHandle,
    echo: Arc<SentenceEcho>,
    display_trim: TrimPolicy,
    observers: Vec<Arc<dyn SnapshotObserver>>,
    sequence: u64,
}

impl Publisher {
    /// Unchanged or unknown staging values leave the published ones as they
    /// were. The snapshot itself is rewritten in one write-lock scope.
    pub(crate) fn publish(&mut self) -> Snapshot {
        let location = lock(&self.staging.location).clone();
        let counts = lock(&self.staging.counts).clone();
        let satellites = {
            let registry = lock(&self.staging.satellites);
            (!registry.is_empty()).then(|| registry.records().to_vec())
        };
        let host = lock(&self.staging.host).clone();
        let last_fix = self.echo.latest();

        let satellites = satellites.map(|mut list| {
            self.display_trim.apply(&mut list);
            list
        });

        self.sequence += 1;
        let sequence = self.sequence;
        let published = self.snapshot.replace_with(|snap| {
            snap.latitude.merge_from(&location.latitude);
            snap.longitude.merge_from(&location.longitude);
            snap.altitude.merge_from(&location.altitude);
            snap.speed.merge_from(&location.speed);

            if counts.visible > 0 {
                snap.satellite_count = counts.visible;
            }
            if counts.used > 0 {
                snap.used_satellites = counts.used;
            }
            snap.hdop.merge_from(&counts.hdop);
            if let Some(list) = satellites {
                snap.satellites = list;
            }

            snap.signal = host.signal;
            snap.cell = host.cell;
            snap.identity = host.identity;
            snap.location_status = host.location_status;
            snap.telephony_status = host.telephony_status;
            if last_fix.is_some() {
                snap.last_fix_sentence = last_fix;
            }

            snap.published_at = Some(Local::now());
            snap.sequence = sequence;
        });

        for observer in &self.observers {
            observer.on_publish(&published);
        }
        published
    }
}

fn spawn_periodic<F>(runtime: &Handle, period: Duration, mut tick: F) -> JoinHandle<()>
where
    F: FnMut() + Send + 'static,
{
    runtime.spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            ticker.tick().await;
            tick();
        }
    })
}

/// The running pipeline. Dropping it stops everything.
pub struct Pipeline {
    running: Arc<AtomicBool>,
    staging: Arc<Staging>,
    snapshot: SnapshotHandle,
    ingest: IngestHandle,
    log: EventLog,
    worker: Option<thread::JoinHandle<()>>,
    tasks: Vec<JoinHandle<()>>,
    runtime: Option<Runtime>,
    handle: Handle,
}

impl Pipeline {
    /// Start the parser thread, the snapshot publisher and the registry janitor
    pub fn start(config: &DiagConfig, observers: Vec<Arc<dyn SnapshotObserver>>) -> Result<Self> {
        config.validate()?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("gnss-diag-sched")
            .enable_all()
            .build()?;
        let handle = runtime.handle().clone();

        let log = EventLog::new(config.log_trim);
        let staging = Arc::new(Staging::default());
        let snapshot = SnapshotHandle::new();
        let running = Arc::new(AtomicBool::new(true));
        let echo = Arc::new(SentenceEcho::new(config.sentence_echo_interval()));

        let (tx, rx) = mpsc::unbounded_channel();
        let ingest = IngestHandle {
            tx,
            echo: Arc::clone(&echo),
            staging: Arc::clone(&staging),
            log: log.clone(),
        };

        let worker = ParserWorker {
            rx,
            staging: Arc::clone(&staging),
            running: Arc::clone(&running),
            log: log.clone(),
            idle_wait: config.worker_idle_wait(),
            runtime: handle.clone(),
        };
        let worker = thread::Builder::new()
            .name("nmea-parser".to_string())
            .spawn(move || worker.run())?;

        let mut publisher = Publisher {
            staging: Arc::clone(&staging),
            snapshot: snapshot.clone(),
            echo,
            display_trim: config.display_trim,
            observers,
            sequence: 0,
        };
        let publish_task = spawn_periodic(&handle, config.publish_interval(), move || {
            publisher.publish();
        });

        let janitor_staging = Arc::clone(&staging);
        let registry_trim = config.registry_trim;
        let janitor_task = spawn_periodic(&handle, config.janitor_interval(), move || {
            let removed = janitor_staging.trim_satellites(&registry_trim);
            if removed > 0 {
                tracing::debug!(removed, "Trimmed satellite registry");
            }
        });

        log.info(format!(
            "Pipeline started (publish every {} ms, registry trim every {} s)",
            config.publish_interval_ms, config.janitor_interval_secs
        ));

        Ok(Self {
            running,
            staging,
            snapshot,
            ingest,
            log,
            worker: Some(worker),
            tasks: vec![publish_task, janitor_task],
            runtime: Some(runtime),
            handle,
        })
    }

    pub fn ingest(&self) -> IngestHandle {
        self.ingest.clone()
    }

    pub fn signal(&self) -> SignalHandle {
        SignalHandle {
            staging: Arc::clone(&self.staging),
        }
    }

    pub fn snapshot(&self) -> SnapshotHandle {
        self.snapshot.clone()
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Runtime driving the scheduled tasks, for sources that need async I/O
    pub fn runtime_handle(&self) -> Handle {
        self.handle.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Attach a location service; the outcome is published with the next snapshot
    pub fn attach_location(
        &self,
        service: Option<&dyn LocationService>,
        permission_granted: bool,
    ) -> LocationStatus {
        services::connect_location(service, permission_granted, self.ingest(), &self.log)
    }

    /// Attach a telephony service and record the outcome for the display
    pub fn attach_telephony(
        &self,
        service: Option<&dyn TelephonyService>,
        permission_granted: bool,
    ) -> TelephonyStatus {
        let (status, identity) =
            services::connect_telephony(service, permission_granted, self.signal(), &self.log);
        let mut host = lock(&self.staging.host);
        host.telephony_status = status.clone();
        host.identity = identity;
        status
    }

    /// Stop the worker, cancel both scheduled tasks and release the runtime.
    /// Queued sentences that were not parsed yet are discarded.
    pub fn stop(&mut self) {
        let Some(runtime) = self.runtime.take() else {
            return;
        };
        self.running.store(false, Ordering::Release);

        for task in self.tasks.drain(..) {
            task.abort();
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Parser worker terminated abnormally");
            }
        }
        runtime.shutdown_background();

        self.log.info("Pipeline stopped");
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gps::{Constellation, FieldValue},
        signal::{CellLocation, CellSignal, CellSignalReport, RadioTechnology},
    };

    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
    const GGA_NO_ALT: &str = "$GNGGA,123520,4807.040,N,01131.002,E,1,07,1.1,,,46.9,M,,*47";
    const RMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";
    const GSV_GROUP: [&str; 3] = [
        "$GPGSV,3,1,11,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45*75",
        "$GPGSV,3,2,11,15,12,101,,17,33,055,38,19,71,283,44,22,08,151,*70",
        "$GPGSV,3,3,11,24,43,201,33,25,05,012,,32,55,133,47*4A",
    ];

    fn publisher(staging: &Arc<Staging>) -> Publisher {
        Publisher {
            staging: Arc::clone(staging),
            snapshot: SnapshotHandle::new(),
            echo: Arc::new(SentenceEcho::new(Duration::from_secs(5))),
            display_trim: TrimPolicy::new(50, 40),
            observers: Vec::new(),
            sequence: 0,
        }
    }

    fn fast_config() -> DiagConfig {
        DiagConfig {
            publish_interval_ms: 20,
            worker_idle_wait_ms: 5,
            ..DiagConfig::default()
        }
    }

    fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn test_partial_gga_keeps_speed() {
        let staging = Arc::new(Staging::default());
        process_sentence(&staging, RMC);
        process_sentence(&staging, GGA_NO_ALT);

        let snap = publisher(&staging).publish();
        assert_eq!(snap.speed.to_string(), "41.48 km/h");
        assert_eq!(snap.altitude, FieldValue::Unknown);
        assert_eq!(snap.latitude.to_string(), "48.117333°N");
        assert_eq!(snap.used_satellites, 7);
    }

    #[test]
    fn test_reparsing_is_idempotent() {
        let staging = Arc::new(Staging::default());
        let mut publisher = publisher(&staging);
        for line in [GGA, RMC].iter().chain(GSV_GROUP.iter()) {
            process_sentence(&staging, line);
        }
        let first = publisher.publish();

        for line in [GGA, RMC].iter().chain(GSV_GROUP.iter()) {
            process_sentence(&staging, line);
        }
        let second = publisher.publish();

        assert_eq!(first.satellites, second.satellites);
        assert_eq!(first.latitude, second.latitude);
        assert_eq!(first.satellite_count, 11);
        assert_eq!(second.sequence, first.sequence + 1);
    }

    #[test]
    fn test_malformed_sentence_changes_nothing() {
        let staging = Arc::new(Staging::default());
        process_sentence(&staging, "$GPGGA,,,,*");
        let snap = publisher(&staging).publish();
        assert_eq!(snap.latitude, FieldValue::Unknown);
        assert_eq!(snap.used_satellites, 0);
    }

    #[test]
    fn test_empty_staging_keeps_last_values() {
        let staging = Arc::new(Staging::default());
        let mut publisher = publisher(&staging);
        for line in GSV_GROUP {
            process_sentence(&staging, line);
        }
        publisher.publish();

        // Registry emptied by trimming: published list survives
        staging.trim_satellites(&TrimPolicy::new(0, 0));
        assert_eq!(staging.satellite_count(), 0);
        let snap = publisher.publish();
        assert_eq!(snap.satellites.len(), 11);
    }

    #[test]
    fn test_display_copy_is_bounded() {
        let staging = Arc::new(Staging::default());
        for prn in 1..=60 {
            process_sentence(&staging, &format!("$GLGSV,1,1,60,{},10,100,30*00", prn));
        }
        assert_eq!(staging.satellite_count(), 60);

        let snap = publisher(&staging).publish();
        assert_eq!(snap.satellites.len(), 40);
        assert_eq!(snap.satellites[0].prn, "21");
        assert_eq!(snap.satellites[0].constellation, Constellation::Glonass);
        // Staging is not affected by the display bound
        assert_eq!(staging.satellite_count(), 60);
    }

    #[test]
    fn test_janitor_trim_on_staging() {
        let staging = Arc::new(Staging::default());
        for prn in 0..101 {
            process_sentence(&staging, &format!("$GAGSV,1,1,99,{},10,100,30*00", prn));
        }
        assert_eq!(staging.trim_satellites(&TrimPolicy::new(100, 80)), 21);
        assert_eq!(staging.satellite_count(), 80);
    }

    #[test]
    fn test_signal_events_are_published() {
        let staging = Arc::new(Staging::default());
        let signal = SignalHandle {
            staging: Arc::clone(&staging),
        };
        signal.deliver(SignalEvent::Strength(CellSignalReport::Cells(vec![CellSignal {
            technology: Some(RadioTechnology::Lte),
            dbm: Some(-88),
        }])));
        signal.deliver(SignalEvent::CellLocation(CellLocation::Gsm { cid: 77, lac: 5 }));

        let snap = publisher(&staging).publish();
        assert_eq!(snap.signal.dbm, Some(-88));
        assert_eq!(snap.signal.generation, Some("4G"));
        assert_eq!(snap.cell.cell_id, Some(77));
    }

    #[test]
    fn test_echo_is_throttled() {
        let log = EventLog::default();
        let echo = SentenceEcho::new(Duration::from_secs(5));
        echo.observe(GGA, &log);
        echo.observe(RMC, &log);
        assert_eq!(echo.latest().as_deref(), Some(GGA));
        assert_eq!(log.len(), 1);
        assert!(log.entries()[0].contains("NMEA: $GPGGA,123519"));
        assert!(log.entries()[0].ends_with("..."));
    }

    #[test]
    fn test_worker_parses_outside_runtime_context() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let staging = Arc::new(Staging::default());
        let running = Arc::new(AtomicBool::new(true));
        let log = EventLog::default();
        let (tx, rx) = mpsc::unbounded_channel();

        let worker = ParserWorker {
            rx,
            staging: Arc::clone(&staging),
            running: Arc::clone(&running),
            log: log.clone(),
            idle_wait: Duration::from_millis(5),
            runtime: runtime.handle().clone(),
        };
        let worker_thread = thread::spawn(move || worker.run());

        // Let at least one idle timeout elapse before the first sentence
        thread::sleep(Duration::from_millis(30));
        tx.send(GSV_GROUP[0].to_string()).unwrap();
        assert!(wait_for(|| staging.satellite_count() == 4));

        running.store(false, Ordering::Release);
        assert!(worker_thread.join().is_ok());
        assert!(log.is_empty());
    }

    #[test]
    fn test_dead_worker_is_visible() {
        let running = Arc::new(AtomicBool::new(true));
        let log = EventLog::default();

        let (flag, events) = (Arc::clone(&running), log.clone());
        let outcome = thread::spawn(move || {
            let _exit = WorkerExit {
                running: &flag,
                log: &events,
            };
            panic!("worker failure");
        })
        .join();

        assert!(outcome.is_err());
        assert!(!running.load(Ordering::Acquire));
        assert!(log.entries()[0].ends_with("Parser worker terminated abnormally"));
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let mut pipeline = Pipeline::start(&fast_config(), Vec::new()).unwrap();
        let ingest = pipeline.ingest();
        let snapshot = pipeline.snapshot();

        for line in [RMC, GGA].iter().chain(GSV_GROUP.iter()) {
            assert!(ingest.offer(*line));
        }

        assert!(wait_for(|| {
            let snap = snapshot.read();
            snap.satellites.len() == 11 && snap.altitude.is_known() && snap.speed.is_known()
        }));

        let snap = snapshot.read();
        assert_eq!(snap.latitude.to_string(), "48.117300°N");
        assert_eq!(snap.longitude.to_string(), "11.516667°E");
        assert_eq!(snap.satellite_count, 11);
        assert_eq!(snap.used_satellites, 8);
        assert_eq!(snap.last_fix_sentence.as_deref(), Some(RMC));

        pipeline.stop();
        assert!(!pipeline.is_running());
        assert!(!ingest.offer(GGA));
        assert!(ingest.is_closed());
    }

    #[test]
    fn test_observers_are_notified() {
        struct Counter(std::sync::atomic::AtomicUsize);
        impl SnapshotObserver for Counter {
            fn on_publish(&self, _snapshot: &Snapshot) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let counter = Arc::new(Counter(std::sync::atomic::AtomicUsize::new(0)));
        let observer: Arc<dyn SnapshotObserver> = counter.clone();
        let pipeline = Pipeline::start(&fast_config(), vec![observer]).unwrap();

        assert!(wait_for(|| counter.0.load(Ordering::SeqCst) >= 2));
        assert!(pipeline.snapshot().read().sequence >= 2);
    }

    #[test]
    fn test_janitor_runs_on_schedule() {
        let config = DiagConfig {
            janitor_interval_secs: 1,
            ..fast_config()
        };
        let pipeline = Pipeline::start(&config, Vec::new()).unwrap();
        let ingest = pipeline.ingest();
        for prn in 0..101 {
            ingest.offer(format!("$GBGSV,1,1,99,{},10,100,30*00", prn));
        }

        assert!(wait_for(|| pipeline.staging.satellite_count() == 101));
        assert!(wait_for(|| pipeline.staging.satellite_count() == 80));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut pipeline = Pipeline::start(&fast_config(), Vec::new()).unwrap();
        pipeline.stop();
        pipeline.stop();
        let stops = pipeline
            .log()
            .entries()
            .iter()
            .filter(|e| e.ends_with("Pipeline stopped"))
            .count();
        assert_eq!(stops, 1);
    }
}
