//! The reasoner facade
//!
//! `Nar` wires the memory, clock and collaborator bundle together behind a
//! thread-safe interface. Input arrives through a channel from any thread;
//! cycles run either on demand (`cycle`) or on a background driver thread
//! (`start_fps`). The memory sits behind one mutex, which is exactly the
//! single-writer discipline the store requires.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

use crate::concept::Concept;
use crate::control::{Budget, Control};
use crate::event::{Event, EventKind};
use crate::memory::Memory;
use crate::param::{ParameterError, Parameters};
use crate::task::{Occurrence, Sentence, Stamp, Task};
use crate::term::Term;
use crate::time::Clock;
use crate::truth::Truth;

const DEFAULT_JUDGMENT_PRIORITY: f32 = 0.8;
const DEFAULT_JUDGMENT_DURABILITY: f32 = 0.5;
const DEFAULT_QUESTION_PRIORITY: f32 = 0.9;
const DEFAULT_QUESTION_DURABILITY: f32 = 0.9;

/// Budget quality of an input judgment, derived from its truth
fn truth_to_quality(truth: &Truth) -> f32 {
    let expectation = truth.expectation();
    expectation.max((1.0 - expectation) * 0.75)
}

/// The reasoner: memory, clock and control loop under one roof
pub struct Nar {
    memory: Arc<Mutex<Memory>>,
    control: Arc<Mutex<Control>>,
    clock: Arc<Clock>,
    input_tx: Sender<Task>,
    input_rx: Receiver<Task>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Nar {
    /// Create a reasoner with the default collaborators
    pub fn new(params: Parameters) -> Result<Self, ParameterError> {
        Nar::with_control(params, 1, Control::default())
    }

    /// Create a reasoner with a caller-supplied collaborator bundle
    pub fn with_control(
        params: Parameters,
        nar_id: u64,
        control: Control,
    ) -> Result<Self, ParameterError> {
        let params = params.validated()?;
        let (input_tx, input_rx) = channel::unbounded();
        Ok(Nar {
            memory: Arc::new(Mutex::new(Memory::new(params, nar_id))),
            control: Arc::new(Mutex::new(control)),
            clock: Arc::new(Clock::new()),
            input_tx,
            input_rx,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        })
    }

    /// The shared memory root (locked per access)
    pub fn memory(&self) -> Arc<Mutex<Memory>> {
        self.memory.clone()
    }

    /// The current cycle
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Jump the clock forward (never backwards)
    pub fn advance_clock(&self, time: i64) {
        self.clock.advance_to(time);
    }

    /// Subscribe an observer to an event kind
    pub fn on_event(&self, kind: EventKind, observer: impl Fn(&Event) + Send + 'static) {
        self.memory.lock().on_event(kind, observer);
    }

    /// A sender usable from any thread to feed input tasks
    pub fn input_sender(&self) -> Sender<Task> {
        self.input_tx.clone()
    }

    /// Queue an input task for the next cycle
    pub fn input(&self, task: Task) {
        let _ = self.input_tx.send(task);
    }

    /// Queue an eternal input judgment
    pub fn input_judgment(&self, term: Term, truth: Truth) {
        let (serial, now) = (self.memory.lock().new_stamp_serial(), self.clock.now());
        let quality = truth_to_quality(&truth);
        self.input(Task::new_input(
            Sentence::judgment(term, truth, Stamp::new(serial, now, Occurrence::Eternal)),
            Budget::new_at(
                DEFAULT_JUDGMENT_PRIORITY,
                DEFAULT_JUDGMENT_DURABILITY,
                quality,
                now,
            ),
        ));
    }

    /// Queue an input judgment occurring now (an event)
    pub fn input_event(&self, term: Term, truth: Truth) {
        let (serial, now) = (self.memory.lock().new_stamp_serial(), self.clock.now());
        let quality = truth_to_quality(&truth);
        self.input(Task::new_input(
            Sentence::judgment(term, truth, Stamp::new(serial, now, Occurrence::At(now))),
            Budget::new_at(
                DEFAULT_JUDGMENT_PRIORITY,
                DEFAULT_JUDGMENT_DURABILITY,
                quality,
                now,
            ),
        ));
    }

    /// Queue an input question
    pub fn input_question(&self, term: Term) {
        let (serial, now) = (self.memory.lock().new_stamp_serial(), self.clock.now());
        self.input(Task::new_input(
            Sentence::question(term, Stamp::new(serial, now, Occurrence::Eternal)),
            Budget::new_at(
                DEFAULT_QUESTION_PRIORITY,
                DEFAULT_QUESTION_DURABILITY,
                1.0,
                now,
            ),
        ));
    }

    /// Run one cycle: drain queued input, step the control loop, advance
    /// the clock
    pub fn cycle(&self) {
        {
            let mut mem = self.memory.lock();
            while let Ok(task) = self.input_rx.try_recv() {
                mem.add_task(task, false);
            }
            let now = self.clock.now();
            self.control.lock().step(&mut mem, now);
        }
        self.clock.next();
    }

    /// Run `n` cycles
    pub fn cycles(&self, n: usize) {
        for _ in 0..n {
            self.cycle();
        }
    }

    /// Snapshot a concept by (normalized) term
    pub fn concept(&self, term: &Term) -> Option<Concept> {
        self.memory.lock().concept(&term.replace_intervals()).cloned()
    }

    /// Clear memory and clock back to the initial state
    pub fn reset(&self) {
        self.memory.lock().reset();
        while self.input_rx.try_recv().is_ok() {}
        self.clock.reset();
    }

    /// Drive cycles on a background thread at roughly `fps` cycles/second
    pub fn start_fps(&mut self, fps: f32) {
        if self.worker.is_some() {
            return;
        }
        self.running.store(true, Ordering::SeqCst);
        let memory = self.memory.clone();
        let control = self.control.clone();
        let clock = self.clock.clone();
        let input_rx = self.input_rx.clone();
        let running = self.running.clone();
        let period = Duration::from_secs_f32(1.0 / fps.max(0.001));

        self.worker = Some(thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                {
                    let mut mem = memory.lock();
                    while let Ok(task) = input_rx.try_recv() {
                        mem.add_task(task, false);
                    }
                    let now = clock.now();
                    control.lock().step(&mut mem, now);
                }
                clock.next();
                thread::sleep(period);
            }
        }));
    }

    /// Stop the background driver, if running
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for Nar {
    fn drop(&mut self) {
        self.stop();
    }
}
