//! Scripted stand-ins for the three client capabilities.
//!
//! The simulated engine plays back a per-url plan: request a socket watch on
//! the first timeout, then deliver header lines and body chunks (or a
//! failure) when that socket is reported ready. The simulated reactor fires
//! nothing by itself, tests enqueue readiness and timer events explicitly,
//! which keeps every interleaving deterministic.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use http::StatusCode;
use micro_fetch::executor::{Executor, UnitOfWork};
use micro_fetch::reactor::{Interest, Reactor, ReactorEvent, SocketFd};
use micro_fetch::transfer::{
    EngineError, EngineHooks, Finished, PoolLimits, SessionToken, Stimulus, TransferEngine, TransferId,
    TransferOutcome, TransferSpec, WatchKey,
};

/// Polls `cond` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    false
}

/// Runs each unit on its own thread, asynchronously like a real pool.
#[derive(Debug, Default)]
pub struct SpawnExecutor;

impl Executor for SpawnExecutor {
    fn submit(&self, work: UnitOfWork) {
        thread::spawn(work);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerOp {
    Arm(Duration),
    Disarm,
}

#[derive(Debug, Default)]
struct ReactorState {
    registered: HashMap<SocketFd, Interest>,
    armed: Option<Duration>,
    timer_log: Vec<TimerOp>,
    pending: VecDeque<ReactorEvent>,
}

/// Reactor whose events are enqueued by the test through [`ReactorHandle`].
#[derive(Debug)]
pub struct SimReactor {
    state: Arc<Mutex<ReactorState>>,
}

#[derive(Debug, Clone)]
pub struct ReactorHandle {
    state: Arc<Mutex<ReactorState>>,
}

impl SimReactor {
    pub fn new() -> (Self, ReactorHandle) {
        let state = Arc::new(Mutex::new(ReactorState::default()));
        (Self { state: Arc::clone(&state) }, ReactorHandle { state })
    }
}

impl ReactorHandle {
    pub fn fire_io(&self, fd: SocketFd, readiness: Interest) {
        self.state.lock().unwrap().pending.push_back(ReactorEvent::Io { fd, readiness });
    }

    pub fn fire_timer(&self) {
        self.state.lock().unwrap().pending.push_back(ReactorEvent::TimerExpired);
    }

    pub fn is_registered(&self, fd: SocketFd) -> bool {
        self.state.lock().unwrap().registered.contains_key(&fd)
    }

    pub fn armed(&self) -> Option<Duration> {
        self.state.lock().unwrap().armed
    }

    pub fn timer_log(&self) -> Vec<TimerOp> {
        self.state.lock().unwrap().timer_log.clone()
    }
}

impl Reactor for SimReactor {
    type Io = SocketFd;

    fn register_io(&mut self, fd: SocketFd, interest: Interest) -> io::Result<SocketFd> {
        self.state.lock().unwrap().registered.insert(fd, interest);
        Ok(fd)
    }

    fn modify_io(&mut self, io: &mut SocketFd, interest: Interest) -> io::Result<()> {
        self.state.lock().unwrap().registered.insert(*io, interest);
        Ok(())
    }

    fn unregister_io(&mut self, io: SocketFd) {
        self.state.lock().unwrap().registered.remove(&io);
    }

    fn arm_timer(&mut self, after: Duration) {
        let mut state = self.state.lock().unwrap();
        state.armed = Some(after);
        state.timer_log.push(TimerOp::Arm(after));
    }

    fn disarm_timer(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.armed = None;
        state.timer_log.push(TimerOp::Disarm);
    }

    fn wait(&mut self, max_wait: Duration, events: &mut Vec<ReactorEvent>) -> io::Result<()> {
        let deadline = Instant::now() + max_wait;
        loop {
            {
                let mut state = self.state.lock().unwrap();
                if !state.pending.is_empty() {
                    events.extend(state.pending.drain(..));
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(1));
        }
    }
}

/// What the simulated engine should do with a transfer to a given url.
#[derive(Debug, Clone)]
pub enum Plan {
    /// Reject the transfer at registration time.
    Reject { message: String },
    /// Watch `fd`, then deliver headers and body and finish with `status`.
    Succeed {
        fd: SocketFd,
        initial_timeout: Duration,
        status: StatusCode,
        header_lines: Vec<Vec<u8>>,
        body_chunks: Vec<Vec<u8>>,
    },
    /// Watch `fd`, deliver some body bytes, then fail mid-stream.
    Fail { fd: SocketFd, initial_timeout: Duration, partial_body: Vec<u8>, message: String },
}

impl Plan {
    pub fn succeed(fd: SocketFd, status: StatusCode, header_lines: Vec<Vec<u8>>, body_chunks: Vec<Vec<u8>>) -> Self {
        Plan::Succeed { fd, initial_timeout: Duration::from_millis(1), status, header_lines, body_chunks }
    }

    fn fd(&self) -> Option<SocketFd> {
        match self {
            Plan::Reject { .. } => None,
            Plan::Succeed { fd, .. } | Plan::Fail { fd, .. } => Some(*fd),
        }
    }

    fn initial_timeout(&self) -> Option<Duration> {
        match self {
            Plan::Reject { .. } => None,
            Plan::Succeed { initial_timeout, .. } | Plan::Fail { initial_timeout, .. } => Some(*initial_timeout),
        }
    }
}

/// One request as the engine saw it at registration.
#[derive(Debug, Clone)]
pub struct RecordedSpec {
    pub method: http::Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

#[derive(Debug)]
struct SimTransfer {
    token: SessionToken,
    plan: Plan,
    watch: Option<WatchKey>,
    started: bool,
    done: bool,
}

#[derive(Debug, Default)]
struct EngineState {
    plans: HashMap<String, Plan>,
    transfers: HashMap<u64, SimTransfer>,
    fd_index: HashMap<SocketFd, u64>,
    finished: VecDeque<Finished>,
    specs: Vec<RecordedSpec>,
    limits: Option<PoolLimits>,
    next_id: u64,
}

/// Transfer engine that plays back per-url [`Plan`]s.
#[derive(Debug)]
pub struct SimEngine {
    state: Arc<Mutex<EngineState>>,
}

#[derive(Debug, Clone)]
pub struct EngineHandle {
    state: Arc<Mutex<EngineState>>,
}

impl SimEngine {
    pub fn new() -> (Self, EngineHandle) {
        let state = Arc::new(Mutex::new(EngineState::default()));
        (Self { state: Arc::clone(&state) }, EngineHandle { state })
    }
}

impl EngineHandle {
    pub fn set_plan(&self, url: &str, plan: Plan) {
        self.state.lock().unwrap().plans.insert(url.to_owned(), plan);
    }

    pub fn add_count(&self) -> usize {
        self.state.lock().unwrap().specs.len()
    }

    pub fn recorded_specs(&self) -> Vec<RecordedSpec> {
        self.state.lock().unwrap().specs.clone()
    }

    pub fn limits(&self) -> Option<PoolLimits> {
        self.state.lock().unwrap().limits
    }
}

impl TransferEngine for SimEngine {
    fn configure(&mut self, limits: PoolLimits) {
        self.state.lock().unwrap().limits = Some(limits);
    }

    fn add_transfer(
        &mut self,
        spec: TransferSpec<'_>,
        token: SessionToken,
        hooks: &mut dyn EngineHooks,
    ) -> Result<TransferId, EngineError> {
        let mut state = self.state.lock().unwrap();
        state.specs.push(RecordedSpec {
            method: spec.method.clone(),
            url: spec.url.to_owned(),
            headers: spec.headers.iter().map(|(name, value)| (name.to_owned(), value.to_owned())).collect(),
            body: spec.body.to_vec(),
            connect_timeout: spec.connect_timeout,
            request_timeout: spec.request_timeout,
        });

        let plan = state.plans.get(spec.url).cloned().unwrap_or_else(|| panic!("no plan for url {}", spec.url));
        if let Plan::Reject { message } = &plan {
            return Err(EngineError::new(message));
        }

        state.next_id += 1;
        let id = state.next_id;
        if let Some(fd) = plan.fd() {
            state.fd_index.insert(fd, id);
        }
        let initial_timeout = plan.initial_timeout();
        state.transfers.insert(id, SimTransfer { token, plan, watch: None, started: false, done: false });
        drop(state);

        hooks.want_timeout(initial_timeout);
        Ok(TransferId(id))
    }

    fn remove_transfer(&mut self, id: TransferId, hooks: &mut dyn EngineHooks) {
        let mut state = self.state.lock().unwrap();
        if let Some(mut transfer) = state.transfers.remove(&id.0) {
            if let Some(fd) = transfer.plan.fd() {
                state.fd_index.remove(&fd);
            }
            let watch = transfer.watch.take();
            drop(state);
            if watch.is_some() {
                hooks.drop_socket(watch);
            }
        }
    }

    fn drive(&mut self, stimulus: Stimulus, hooks: &mut dyn EngineHooks) -> usize {
        match stimulus {
            Stimulus::Timeout => self.start_pending(hooks),
            Stimulus::Socket { fd, .. } => self.progress_socket(fd, hooks),
        }
        let state = self.state.lock().unwrap();
        state.transfers.values().filter(|transfer| !transfer.done).count()
    }

    fn poll_finished(&mut self) -> Option<Finished> {
        self.state.lock().unwrap().finished.pop_front()
    }
}

impl SimEngine {
    /// On timeout, every not-yet-started transfer asks for its socket.
    fn start_pending(&mut self, hooks: &mut dyn EngineHooks) {
        let pending: Vec<(u64, SocketFd)> = {
            let state = self.state.lock().unwrap();
            state
                .transfers
                .iter()
                .filter(|(_, transfer)| !transfer.started)
                .filter_map(|(id, transfer)| transfer.plan.fd().map(|fd| (*id, fd)))
                .collect()
        };

        for (id, fd) in pending {
            let watch = hooks.want_socket(fd, Interest::WRITE, None);
            let mut state = self.state.lock().unwrap();
            if let Some(transfer) = state.transfers.get_mut(&id) {
                transfer.watch = Some(watch);
                transfer.started = true;
            }
        }
    }

    /// On readiness, the transfer owning the socket plays out its plan.
    fn progress_socket(&mut self, fd: SocketFd, hooks: &mut dyn EngineHooks) {
        let Some((id, token, plan, watch)) = ({
            let state = self.state.lock().unwrap();
            state.fd_index.get(&fd).and_then(|id| {
                state
                    .transfers
                    .get(id)
                    .filter(|transfer| transfer.started && !transfer.done)
                    .map(|transfer| (*id, transfer.token, transfer.plan.clone(), transfer.watch))
            })
        }) else {
            return;
        };

        let outcome = match plan {
            Plan::Succeed { status, header_lines, body_chunks, .. } => {
                for line in &header_lines {
                    hooks.header_line(token, line);
                }
                for chunk in &body_chunks {
                    hooks.append_body(token, chunk);
                }
                TransferOutcome::Success { status }
            }
            Plan::Fail { partial_body, message, .. } => {
                if !partial_body.is_empty() {
                    hooks.append_body(token, &partial_body);
                }
                TransferOutcome::Failed { message }
            }
            Plan::Reject { .. } => return,
        };

        hooks.drop_socket(watch);

        let mut state = self.state.lock().unwrap();
        if let Some(transfer) = state.transfers.get_mut(&id) {
            transfer.done = true;
            transfer.watch = None;
        }
        state.finished.push_back(Finished { id: TransferId(id), token, outcome });
    }
}
