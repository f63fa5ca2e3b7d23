//! Per-request execution of a chain.
//!
//! # Protocol
//!
//! [`Execution::run`] invokes the first component. Each component receives the request
//! and the execution and chooses one of three outcomes:
//!
//! - call [`Execution::proceed`] once to run the rest of the chain, adjust the returned
//!   response and return it;
//! - return a response without proceeding, so no later component runs;
//! - return an error, which fails the whole execution.
//!
//! Proceeding past the last component yields `Resp::default()`.
//!
//! # State
//!
//! `Running` until the outermost call returns. Success moves to `Completed` and hands
//! the final response to every freeze listener, in registration order. Failure moves to
//! `Failed`, which is terminal even if an upstream component swallows the error, and
//! drops the listeners uninvoked.

use std::fmt;

use conduit_component::{ComponentId, Identified};
use tokio_util::sync::CancellationToken;

use crate::{Chain, ExecutionFault};

mod trace;

pub use trace::{Trace, TraceEntry};


/// Observer of the final response.
pub type FreezeListener<'a, Resp> = Box<dyn FnOnce(&Resp) + Send + 'a>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionState {
	/// `cursor` is the index of the next component to invoke.
	Running { cursor: usize },
	Completed,
	Failed(ExecutionFault),
}

/// The state of one request flowing through one chain. Never shared between requests.
pub struct Execution<'c, Req, Resp> {
	chain: &'c Chain<Req, Resp>,
	state: ExecutionState,
	/// Per component depth: whether the invocation at that depth already proceeded.
	proceeded: Vec<bool>,
	listeners: Vec<FreezeListener<'c, Resp>>,
	cancellation: CancellationToken,
	trace: Trace,
}

impl<'c, Req, Resp> Execution<'c, Req, Resp> {
	pub fn start(chain: &'c Chain<Req, Resp>) -> Self {
		Self {
			chain,
			state: ExecutionState::Running { cursor: 0 },
			proceeded: vec![false; chain.len()],
			listeners: Vec::new(),
			cancellation: CancellationToken::new(),
			trace: Trace::default(),
		}
	}

	/// Shares `token` with the caller so it can cancel this execution.
	pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
		self.cancellation = token;
		self
	}

	pub fn with_trace_level(mut self, level: u8) -> Self {
		self.trace = Trace::new(level);
		self
	}

	pub fn chain(&self) -> &'c Chain<Req, Resp> {
		self.chain
	}

	pub fn state(&self) -> &ExecutionState {
		&self.state
	}

	/// The component currently being invoked, if any.
	pub fn current_component(&self) -> Option<&'c ComponentId> {
		let chain = self.chain;
		match self.state {
			ExecutionState::Running { cursor } if cursor > 0 => chain.components().get(cursor - 1).map(|c| c.id()),
			_ => None,
		}
	}

	/// Builds a component fault attributed to the current component.
	pub fn fault(&self, message: impl fmt::Display) -> ExecutionFault {
		let component = self.current_component().unwrap_or_else(|| self.chain.id()).clone();
		ExecutionFault::Component {
			component,
			message: message.to_string(),
		}
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancellation.is_cancelled()
	}

	/// Fails with [`ExecutionFault::Cancelled`] once the token has fired.
	pub fn ensure_not_cancelled(&self) -> Result<(), ExecutionFault> {
		if self.is_cancelled() {
			return Err(ExecutionFault::Cancelled);
		}
		Ok(())
	}

	/// Records a trace message if `level` is enabled for this execution.
	pub fn trace(&mut self, level: u8, message: impl Into<String>) {
		self.trace.record(level, message);
	}

	pub fn trace_log(&self) -> &Trace {
		&self.trace
	}

	/// Registers an observer of the final response.
	///
	/// Listeners registered after the execution finished are dropped.
	pub fn on_freeze(&mut self, listener: impl FnOnce(&Resp) + Send + 'c) {
		if let ExecutionState::Running { .. } = self.state {
			self.listeners.push(Box::new(listener));
		} else {
			tracing::debug!(chain = %self.chain.id(), "freeze listener registered after execution finished");
		}
	}

	fn fail(&mut self, fault: ExecutionFault) -> ExecutionFault {
		if let ExecutionState::Failed(first) = &self.state {
			return first.clone();
		}
		tracing::debug!(chain = %self.chain.id(), %fault, "execution failed");
		self.listeners.clear();
		self.state = ExecutionState::Failed(fault.clone());
		fault
	}

	fn cursor(&self) -> Result<usize, ExecutionFault> {
		match &self.state {
			ExecutionState::Running { cursor } => Ok(*cursor),
			ExecutionState::Completed => Err(ExecutionFault::AlreadyCompleted),
			ExecutionState::Failed(fault) => Err(fault.clone()),
		}
	}
}

impl<'c, Req, Resp: Default> Execution<'c, Req, Resp> {
	/// Runs the rest of the chain and returns its response.
	///
	/// Each component invocation may proceed at most once.
	pub fn proceed(&mut self, request: &mut Req) -> Result<Resp, ExecutionFault> {
		let depth = self.cursor()?;
		if depth > 0 {
			let caller = depth - 1;
			if self.proceeded[caller] {
				let component = self.chain.components()[caller].id().clone();
				return Err(self.fail(ExecutionFault::ContinuationReused { component }));
			}
			self.proceeded[caller] = true;
		}

		let chain = self.chain;
		let Some(component) = chain.components().get(depth) else {
			return Ok(Resp::default());
		};

		tracing::trace!(chain = %chain.id(), component = %component.id(), depth, "entering component");
		if self.trace.enabled(1) {
			self.trace.record(1, format!("entering {}", component.id()));
		}

		self.proceeded[depth] = false;
		self.state = ExecutionState::Running { cursor: depth + 1 };
		let result = component.processor().process(request, self);

		if let ExecutionState::Failed(fault) = &self.state {
			return Err(fault.clone());
		}
		match result {
			Err(fault) => Err(self.fail(fault)),
			Ok(response) => {
				self.state = ExecutionState::Running { cursor: depth };
				Ok(response)
			}
		}
	}

	/// Drives the whole chain, then freezes the response.
	///
	/// Freeze listeners run on this thread, once each, in registration order, as the
	/// last step before the response is returned.
	pub fn run(&mut self, request: &mut Req) -> Result<Resp, ExecutionFault> {
		if self.cursor()? != 0 {
			return Err(self.fail(ExecutionFault::Component {
				component: self.chain.id().clone(),
				message: "run called from inside the chain".to_owned(),
			}));
		}
		let response = self.proceed(request)?;
		self.state = ExecutionState::Completed;
		for listener in std::mem::take(&mut self.listeners) {
			listener(&response);
		}
		Ok(response)
	}
}

impl<Req, Resp> fmt::Debug for Execution<'_, Req, Resp> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Execution")
			.field("chain", &self.chain.id())
			.field("state", &self.state)
			.field("listeners", &self.listeners.len())
			.finish_non_exhaustive()
	}
}
