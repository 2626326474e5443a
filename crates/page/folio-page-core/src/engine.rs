//! Engine: owns every component's state plus the single timer queue.
//!
//! Methods:
//! - new, start_text_cycle, register_target / register_scroll_targets,
//!   schedule_load_stage, reveal, mount_contact, submit_contact,
//!   complete_contact, update (inputs -> timers), teardown
//!
//! Each mutating method returns the [`Outputs`] it produced. Components own
//! disjoint state; the engine only multiplexes their timers onto one virtual
//! clock.

use log::{debug, info, warn};

use crate::config::PageConfig;
use crate::contact::{
    ContactFlow, Endpoint, EndpointResponse, StatusTone, SubmissionState, TransportError,
};
use crate::error::PageError;
use crate::ids::{IdAllocator, SubmissionId, TargetId};
use crate::inputs::Inputs;
use crate::load_stage::{LoadElement, LoadStagePlan};
use crate::outputs::{Change, Outputs, PageEvent};
use crate::reveal::{ObserverOptions, RevealScheduler};
use crate::text_cycle::{CycleState, CycleTiming, TextCycle, WordList};
use crate::timer::{TimerId, TimerQueue};
use crate::Millis;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Task {
    CycleStep,
    Reveal(TargetId),
    ClearStatus,
}

#[derive(Debug)]
pub struct Engine {
    cfg: PageConfig,
    ids: IdAllocator,
    now: Millis,
    timers: TimerQueue<Task>,

    cycle: TextCycle,
    cycle_running: bool,
    /// The one pending cycle step, if the cycle is running.
    cycle_timer: Option<TimerId>,
    surface_attached: bool,

    reveal: RevealScheduler,
    contact: ContactFlow,
    torn_down: bool,
}

impl Engine {
    /// Create an engine from a validated config.
    pub fn new(cfg: PageConfig) -> Result<Self, PageError> {
        cfg.validate()?;
        let words = WordList::new(cfg.words.iter().cloned())?;
        let cycle = TextCycle::new(words, CycleTiming::from_config(&cfg));
        let contact = ContactFlow::new(cfg.contact.clone());
        Ok(Self {
            cfg,
            ids: IdAllocator::new(),
            now: 0,
            timers: TimerQueue::new(),
            cycle,
            cycle_running: false,
            cycle_timer: None,
            surface_attached: false,
            reveal: RevealScheduler::new(),
            contact,
            torn_down: false,
        })
    }

    pub fn config(&self) -> &PageConfig {
        &self.cfg
    }

    /// Current virtual time.
    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.timers.next_due()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn cycle_state(&self) -> CycleState {
        self.cycle.state()
    }

    pub fn text_cycle(&self) -> &TextCycle {
        &self.cycle
    }

    pub fn is_cycle_running(&self) -> bool {
        self.cycle_running
    }

    /// Due time of the queued cycle step, if one is queued.
    pub fn cycle_step_due(&self) -> Option<Millis> {
        self.cycle_timer.and_then(|id| self.timers.due(id))
    }

    pub fn observer_options(&self) -> ObserverOptions {
        ObserverOptions::from(&self.cfg.observer)
    }

    pub fn reveal_scheduler(&self) -> &RevealScheduler {
        &self.reveal
    }

    pub fn is_revealed(&self, id: TargetId) -> bool {
        self.reveal.is_revealed(id)
    }

    pub fn submission_state(&self) -> SubmissionState {
        self.contact.state()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // --- text cycle -------------------------------------------------------

    /// Start the word cycle. Without a surface nothing happens and nothing is
    /// ever scheduled. The first step runs immediately.
    pub fn start_text_cycle(&mut self, surface_present: bool) -> Outputs {
        let mut out = Outputs::default();
        if !surface_present {
            debug!("no text cycle surface; cycle not started");
            return out;
        }
        if self.cycle_running || self.torn_down {
            return out;
        }
        self.cycle_running = true;
        self.surface_attached = true;
        out.push_event(PageEvent::TextCycleStarted);
        self.run_cycle_step(&mut out);
        out
    }

    fn run_cycle_step(&mut self, out: &mut Outputs) {
        if let Some(id) = self.cycle_timer.take() {
            debug_assert!(!self.timers.is_pending(id), "cycle step queued twice");
        }
        if !self.surface_attached {
            info!("text cycle surface detached; halting");
            self.cycle_running = false;
            out.push_event(PageEvent::CycleHalted);
            return;
        }
        let step = self.cycle.step();
        out.push_change(Change::Text { text: step.text });
        if let Some(word_index) = step.advanced_to {
            out.push_event(PageEvent::WordAdvanced { word_index });
        }
        self.cycle_timer = Some(
            self.timers
                .schedule(self.now, step.next_delay, Task::CycleStep),
        );
    }

    // --- reveal -----------------------------------------------------------

    /// Allocate a handle for a host element.
    pub fn register_target(&mut self) -> TargetId {
        let id = self.ids.alloc_target();
        self.reveal.insert(id);
        id
    }

    /// Allocate `count` handles and mark them as watched by the visibility
    /// monitor.
    pub fn register_scroll_targets(&mut self, count: usize) -> Vec<TargetId> {
        (0..count)
            .map(|_| {
                let id = self.ids.alloc_target();
                self.reveal.observe(id);
                id
            })
            .collect()
    }

    /// Evaluate the load-stage schedule once. Immediate reveals are part of
    /// the returned outputs; the rest fire from `update`.
    pub fn schedule_load_stage(&mut self, elements: &[LoadElement]) -> Outputs {
        let mut out = Outputs::default();
        if self.torn_down {
            return out;
        }
        let plan = LoadStagePlan::from_elements(elements, &self.cfg.load_stage);
        for target in plan.targets() {
            self.reveal.insert(target);
        }
        for group in &plan.groups {
            for (target, delay) in group.schedule() {
                match delay {
                    None => self.reveal_into(target, &mut out),
                    Some(delay) => {
                        self.timers.schedule(self.now, delay, Task::Reveal(target));
                    }
                }
            }
        }
        out
    }

    /// Reveal a target now. Revealing twice is a no-op.
    pub fn reveal(&mut self, id: TargetId) -> Result<Outputs, PageError> {
        let mut out = Outputs::default();
        if self.torn_down {
            return Ok(out);
        }
        if self.reveal.reveal(id)? {
            out.push_change(Change::Reveal { target: id });
        }
        Ok(out)
    }

    fn reveal_into(&mut self, id: TargetId, out: &mut Outputs) {
        match self.reveal.reveal(id) {
            Ok(true) => out.push_change(Change::Reveal { target: id }),
            Ok(false) => {}
            Err(e) => warn!("load-stage reveal skipped: {e}"),
        }
    }

    // --- contact ----------------------------------------------------------

    /// Show the configuration notice if the form cannot submit.
    pub fn mount_contact(&mut self) -> Outputs {
        let mut out = Outputs::default();
        if self.torn_down {
            return out;
        }
        if let Some(status) = self.contact.mount_notice() {
            out.push_change(Change::Status {
                text: status.text,
                tone: status.tone,
            });
            self.schedule_status_clear();
        }
        out
    }

    /// Start a submission. The returned outputs carry either a
    /// `Change::Dispatch` the host must perform, or the configuration error.
    /// A submission while another is in flight is rejected. After teardown
    /// nothing is dispatched.
    pub fn submit_contact(&mut self, fields: Vec<(String, String)>) -> Result<Outputs, PageError> {
        let mut out = Outputs::default();
        if self.torn_down {
            debug!("contact submission after teardown dropped");
            return Ok(out);
        }
        let id = self.ids.alloc_submission();
        match self.contact.begin(id, fields) {
            Ok((request, status)) => {
                out.push_change(Change::Status {
                    text: status.text,
                    tone: status.tone,
                });
                out.push_change(Change::Dispatch { request });
            }
            Err(PageError::MissingAccessKey) => {
                let status = ContactFlow::missing_key_status();
                out.push_change(Change::Status {
                    text: status.text,
                    tone: status.tone,
                });
                out.push_event(PageEvent::SubmissionSettled {
                    state: SubmissionState::Error,
                });
                self.schedule_status_clear();
            }
            Err(e) => return Err(e),
        }
        Ok(out)
    }

    /// Feed the endpoint outcome for a dispatched submission. Outcomes that
    /// arrive after teardown are dropped.
    pub fn complete_contact(
        &mut self,
        id: SubmissionId,
        outcome: Result<EndpointResponse, TransportError>,
    ) -> Outputs {
        let mut out = Outputs::default();
        if self.torn_down {
            debug!("submission {id:?} settled after teardown; dropped");
            return out;
        }
        let Some(settlement) = self.contact.settle(id, outcome) else {
            return out;
        };
        out.push_change(Change::Status {
            text: settlement.status.text,
            tone: settlement.status.tone,
        });
        if settlement.reset_form {
            out.push_change(Change::ResetForm);
        }
        out.push_event(PageEvent::SubmissionSettled {
            state: settlement.state,
        });
        self.schedule_status_clear();
        out
    }

    /// Submit and settle in one call against a synchronous endpoint.
    pub fn submit_contact_with<E: Endpoint + ?Sized>(
        &mut self,
        fields: Vec<(String, String)>,
        endpoint: &mut E,
    ) -> Result<Outputs, PageError> {
        let mut out = self.submit_contact(fields)?;
        if let Some(request) = out.dispatched().cloned() {
            let outcome = endpoint.post(&request);
            out.append(self.complete_contact(request.id, outcome));
        }
        Ok(out)
    }

    fn schedule_status_clear(&mut self) {
        let delay = self.cfg.contact.status_clear_ms;
        self.timers.schedule(self.now, delay, Task::ClearStatus);
    }

    // --- driving ----------------------------------------------------------

    /// Apply host notifications, then advance the clock by `dt` ms firing
    /// every timer that comes due, each at its own due time.
    pub fn update(&mut self, dt: Millis, inputs: Inputs) -> Outputs {
        let mut out = Outputs::default();
        if self.torn_down {
            return out;
        }
        if let Some(attached) = inputs.text_surface_attached {
            self.surface_attached = attached;
        }
        self.reveal.handle_visibility(&inputs.visibility, &mut out);

        let target = self.now.saturating_add(dt);
        while let Some((due, _, task)) = self.timers.pop_due(target) {
            self.now = due;
            self.run_task(task, &mut out);
        }
        self.now = target;
        out
    }

    fn run_task(&mut self, task: Task, out: &mut Outputs) {
        match task {
            Task::CycleStep => self.run_cycle_step(out),
            Task::Reveal(target) => self.reveal_into(target, out),
            Task::ClearStatus => {
                out.push_change(Change::Status {
                    text: String::new(),
                    tone: StatusTone::Neutral,
                });
                self.contact.status_cleared();
            }
        }
    }

    /// Drop all pending timers and disconnect the visibility monitor. The
    /// engine ignores further updates.
    pub fn teardown(&mut self) -> Outputs {
        let mut out = Outputs::default();
        if self.torn_down {
            return out;
        }
        self.timers.clear();
        self.cycle_timer = None;
        self.cycle_running = false;
        self.reveal.disconnect();
        self.torn_down = true;
        out.push_change(Change::Disconnect);
        out.push_event(PageEvent::TornDown);
        info!("page engine torn down");
        out
    }
}
