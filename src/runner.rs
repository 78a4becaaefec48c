//! Single-loop replay of a page script through the engine.
//!
//! One task owns the engine and the simulated page. Script steps and debounced
//! scroll notifications arrive on the same channel, so handlers never run
//! concurrently with each other or with document mutation.

use crate::cancellation::CancellationToken;
use crate::config::EngineConfig;
use crate::debounce::{Debounced, debounce};
use crate::engine::{Engine, EngineSnapshot, Notification, SectionIndex};
use crate::host::apply_effects;
use crate::page::{PageFixture, ScriptStep, SimulatedPage};
use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub snapshot: EngineSnapshot,
    /// Class/attribute writes that reached the document.
    pub mutations: usize,
    pub notifications: usize,
    pub cancelled: bool,
}

enum LoopEvent {
    Step(ScriptStep),
    Notify(Notification),
    ScriptDone,
}

enum ScrollSink {
    Immediate,
    Debounced(Debounced<f32>),
}

struct Replay {
    engine: Engine,
    page: SimulatedPage,
    config: EngineConfig,
    scroll_sink: ScrollSink,
    notifications: usize,
}

/// Replay `fixture`'s script against a fresh engine.
///
/// Runs until the script is exhausted and every debounce window has elapsed,
/// or until `cancel` fires.
pub async fn replay(
    fixture: PageFixture,
    config: EngineConfig,
    cancel: CancellationToken,
) -> Result<RunReport> {
    let (tx, mut rx) = mpsc::unbounded_channel::<LoopEvent>();

    let scroll_sink = match config.scroll_debounce() {
        Some(delay) => {
            let sink = tx.clone();
            let debounced = debounce(delay, move |offset: f32| {
                let _ = sink.send(LoopEvent::Notify(Notification::Scrolled { offset }));
            })
            .context("Failed to set up scroll debouncing")?;
            info!(delay_ms = delay.as_millis() as u64, "Scroll notifications are debounced");
            ScrollSink::Debounced(debounced)
        }
        None => ScrollSink::Immediate,
    };

    let mut page = SimulatedPage::from_fixture(&fixture);
    let (engine, effects) = Engine::bootstrap(&mut page, config.clone());
    apply_effects(&mut page, &config, &effects);

    let mut replay = Replay {
        engine,
        page,
        config,
        scroll_sink,
        notifications: 0,
    };
    replay.drain_host_events();

    let tail = replay
        .config
        .scroll_debounce()
        .unwrap_or_default()
        .saturating_add(Duration::from_millis(1));
    let driver = tokio::spawn(drive_script(fixture.script, tail, tx, cancel.clone()));

    let mut cancelled = false;
    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Replay cancelled; stopping event loop");
                cancelled = true;
                break;
            }
            event = rx.recv() => event,
        };
        match event {
            Some(LoopEvent::Step(step)) => replay.run_step(step),
            Some(LoopEvent::Notify(notification)) => replay.dispatch(notification),
            Some(LoopEvent::ScriptDone) | None => break,
        }
    }

    if let ScrollSink::Debounced(debounced) = &replay.scroll_sink {
        debounced.cancel();
    }
    driver.await.context("Script driver task failed")?;

    let report = RunReport {
        snapshot: replay.engine.snapshot(),
        mutations: replay.page.mutations(),
        notifications: replay.notifications,
        cancelled,
    };
    info!(
        mutations = report.mutations,
        notifications = report.notifications,
        cancelled = report.cancelled,
        "Replay finished"
    );
    Ok(report)
}

async fn drive_script(
    mut steps: Vec<ScriptStep>,
    tail: Duration,
    tx: mpsc::UnboundedSender<LoopEvent>,
    cancel: CancellationToken,
) {
    steps.sort_by_key(ScriptStep::at_ms);
    let start = Instant::now();
    for step in steps {
        let due = start + Duration::from_millis(step.at_ms());
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep_until(due) => {}
        }
        if tx.send(LoopEvent::Step(step)).is_err() {
            return;
        }
    }
    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = tokio::time::sleep(tail) => {
            let _ = tx.send(LoopEvent::ScriptDone);
        }
    }
}

impl Replay {
    fn run_step(&mut self, step: ScriptStep) {
        debug!(?step, "Running script step");
        match step {
            ScriptStep::Scroll { offset, .. } => self.page.user_scroll(offset),
            ScriptStep::ScrollToTop { .. } => self.dispatch(Notification::ScrollToTopRequested),
            ScriptStep::Relayout { sections, .. } => {
                self.page.relayout(sections);
                let index = SectionIndex::scan(&self.page);
                self.dispatch(Notification::SectionsMeasured(index));
            }
        }
        self.drain_host_events();
    }

    fn dispatch(&mut self, notification: Notification) {
        self.notifications += 1;
        let effects = self.engine.reduce(notification);
        apply_effects(&mut self.page, &self.config, &effects);
        self.drain_host_events();
    }

    /// Forward whatever the page queued while effects were applied.
    fn drain_host_events(&mut self) {
        loop {
            let visibility = self.page.take_visibility_notifications();
            let scroll = self.page.take_scroll_event();
            if visibility.is_empty() && scroll.is_none() {
                return;
            }
            for notification in visibility {
                self.dispatch(notification);
            }
            if let Some(offset) = scroll {
                match &self.scroll_sink {
                    ScrollSink::Immediate => self.dispatch(Notification::Scrolled { offset }),
                    ScrollSink::Debounced(debounced) => debounced.call(offset),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{SectionId, Visibility};
    use crate::host::ElementId;
    use crate::page::parse_page;

    const SHOWROOM: &str = r##"
viewport_height = 600

[[section]]
id = "hero"
offset = 0

[[section]]
id = "cars"
offset = 1500

[[section]]
id = "contact"
offset = 2500

[[nav_link]]
id = "nav-hero"
href = "#hero"

[[nav_link]]
id = "nav-cars"
href = "#cars"

[[nav_link]]
id = "nav-contact"
href = "#contact"

[[image]]
id = "img-roadster"
offset = 1600
height = 300
data_src = "img/roadster.jpg"

[[image]]
id = "img-dealer"
offset = 3200
height = 300
data_src = "img/dealer.jpg"

[[script]]
action = "scroll"
at_ms = 0
offset = 400

[[script]]
action = "scroll"
at_ms = 50
offset = 1300

[[script]]
action = "scroll"
at_ms = 100
offset = 2600
"##;

    fn fixture() -> PageFixture {
        parse_page(SHOWROOM).expect("valid page")
    }

    #[tokio::test(start_paused = true)]
    async fn replays_script_without_debounce() {
        let report = replay(fixture(), EngineConfig::default(), CancellationToken::new())
            .await
            .expect("replay succeeds");

        let snapshot = report.snapshot;
        assert!(!report.cancelled);
        assert_eq!(snapshot.scroll_offset, 2600.0);
        assert_eq!(snapshot.active_section, Some(SectionId::new("contact")));
        assert_eq!(snapshot.active_links, vec![ElementId::new("nav-contact")]);
        assert_eq!(snapshot.scroll_top, Visibility::Visible);
        assert_eq!(snapshot.loaded_images, vec![ElementId::new("img-roadster")]);
        assert_eq!(snapshot.pending_images, vec![ElementId::new("img-dealer")]);
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_scrolls_collapse_to_the_last_offset() {
        let mut config = EngineConfig::default();
        config.scroll_debounce_ms = 300;

        let report = replay(fixture(), config, CancellationToken::new())
            .await
            .expect("replay succeeds");

        // Three scroll steps collapse into one notification; the roadster
        // entering the viewport is delivered right away.
        assert_eq!(report.notifications, 2);
        assert_eq!(
            report.snapshot.active_section,
            Some(SectionId::new("contact"))
        );
        assert_eq!(report.snapshot.loaded_images, vec![ElementId::new("img-roadster")]);
    }

    #[tokio::test(start_paused = true)]
    async fn scroll_to_top_resets_highlight_and_control() {
        let mut fixture = fixture();
        fixture.script.push(ScriptStep::ScrollToTop { at_ms: 500 });

        let report = replay(fixture, EngineConfig::default(), CancellationToken::new())
            .await
            .expect("replay succeeds");

        assert_eq!(report.snapshot.scroll_offset, 0.0);
        assert_eq!(report.snapshot.scroll_top, Visibility::Hidden);
        assert_eq!(report.snapshot.active_section, Some(SectionId::new("hero")));
        assert_eq!(report.snapshot.active_links, vec![ElementId::new("nav-hero")]);
    }

    #[tokio::test(start_paused = true)]
    async fn relayout_rescans_sections() {
        let mut fixture = fixture();
        fixture.script.push(ScriptStep::Relayout {
            at_ms: 500,
            sections: vec![
                crate::engine::Section::new("hero", 0.0),
                crate::engine::Section::new("cars", 1500.0),
                crate::engine::Section::new("contact", 3200.0),
            ],
        });

        let report = replay(fixture, EngineConfig::default(), CancellationToken::new())
            .await
            .expect("replay succeeds");

        assert_eq!(report.snapshot.scroll_offset, 2600.0);
        assert_eq!(report.snapshot.active_section, Some(SectionId::new("cars")));
        assert_eq!(report.snapshot.active_links, vec![ElementId::new("nav-cars")]);
    }

    #[tokio::test(start_paused = true)]
    async fn hosts_without_observers_keep_images_pending() {
        let mut fixture = fixture();
        fixture.supports_visibility = false;

        let report = replay(fixture, EngineConfig::default(), CancellationToken::new())
            .await
            .expect("replay succeeds");

        assert!(!report.snapshot.lazy_loading);
        assert!(report.snapshot.loaded_images.is_empty());
        assert_eq!(report.snapshot.pending_images.len(), 2);
        assert_eq!(report.snapshot.active_section, Some(SectionId::new("contact")));
    }

    #[tokio::test(start_paused = true)]
    async fn scroll_to_top_while_scroll_is_debounced() {
        let mut config = EngineConfig::default();
        config.scroll_debounce_ms = 300;
        let mut fixture = fixture();
        fixture.script.truncate(2);
        fixture.script.push(ScriptStep::ScrollToTop { at_ms: 100 });

        let report = replay(fixture, config, CancellationToken::new())
            .await
            .expect("replay succeeds");

        assert_eq!(report.snapshot.scroll_offset, 0.0);
        assert_eq!(report.snapshot.scroll_top, Visibility::Hidden);
        assert_eq!(report.snapshot.active_section, Some(SectionId::new("hero")));
        assert_eq!(report.snapshot.active_links, vec![ElementId::new("nav-hero")]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_a_long_script_gap() {
        let mut fixture = fixture();
        fixture.script.push(ScriptStep::Scroll {
            at_ms: 60_000,
            offset: 100.0,
        });
        let cancel = CancellationToken::new();
        let interrupt = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            interrupt.cancel();
        });

        let start = Instant::now();
        let report = replay(fixture, EngineConfig::default(), cancel)
            .await
            .expect("cancellation is not an error");

        assert!(report.cancelled);
        assert_eq!(start.elapsed(), Duration::from_secs(1));
        assert_eq!(report.snapshot.scroll_offset, 2600.0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_replay_stops_early() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = replay(fixture(), EngineConfig::default(), cancel)
            .await
            .expect("cancellation is not an error");

        assert!(report.cancelled);
        assert_eq!(report.notifications, 0);
        assert_eq!(report.snapshot.scroll_offset, 0.0);
    }
}
