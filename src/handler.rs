//! SOAP message interceptors and the ordered chain that runs them.
//!
//! A [`HandlerChain`] is assembled per STS call. Outbound handlers run in insertion order
//! before the request is serialized; inbound handlers run in the same order once the response
//! envelope has been parsed. Handlers only touch the in-flight envelope, so a chain carries
//! no state between messages apart from what extractors deliberately publish through their
//! slots.

mod assertion;
mod credential;
mod extract;
mod timestamp;

pub use assertion::*;
pub use credential::*;
pub use extract::*;
pub use timestamp::*;

// std
use std::slice::Iter;
// self
use crate::{_prelude::*, soap::SoapEnvelope};

/// Interceptor applied to every SOAP exchange made through a chain.
///
/// Both hooks default to doing nothing, so implementors override only the direction they
/// care about.
pub trait SoapHandler: Send + Sync {
	/// Stable label used in logs.
	fn name(&self) -> &'static str;

	/// Mutates an outgoing request before it is serialized.
	fn handle_outbound(&self, _envelope: &mut SoapEnvelope) -> Result<()> {
		Ok(())
	}

	/// Inspects an incoming response after it has been parsed.
	fn handle_inbound(&self, _envelope: &SoapEnvelope) -> Result<()> {
		Ok(())
	}
}
impl<H> SoapHandler for Arc<H>
where
	H: ?Sized + SoapHandler,
{
	fn name(&self) -> &'static str {
		(**self).name()
	}

	fn handle_outbound(&self, envelope: &mut SoapEnvelope) -> Result<()> {
		(**self).handle_outbound(envelope)
	}

	fn handle_inbound(&self, envelope: &SoapEnvelope) -> Result<()> {
		(**self).handle_inbound(envelope)
	}
}

/// Ordered, mutable list of handlers.
#[derive(Clone, Default)]
pub struct HandlerChain {
	handlers: Vec<Arc<dyn SoapHandler>>,
}
impl HandlerChain {
	/// Creates an empty chain.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a handler; it runs after every handler added before it.
	pub fn add(&mut self, handler: impl 'static + SoapHandler) -> &mut Self {
		self.handlers.push(Arc::new(handler));

		self
	}

	/// Builder form of [`HandlerChain::add`].
	pub fn with(mut self, handler: impl 'static + SoapHandler) -> Self {
		self.add(handler);

		self
	}

	/// Removes every handler.
	pub fn clear(&mut self) {
		self.handlers.clear();
	}

	/// Number of handlers.
	pub fn len(&self) -> usize {
		self.handlers.len()
	}

	/// Whether the chain has no handlers.
	pub fn is_empty(&self) -> bool {
		self.handlers.is_empty()
	}

	/// Immutable ordered view handed to the invocation layer.
	///
	/// Later changes to the chain do not affect snapshots already taken.
	pub fn snapshot(&self) -> ChainSnapshot {
		ChainSnapshot(self.handlers.iter().cloned().collect())
	}
}
impl Debug for HandlerChain {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_list().entries(self.handlers.iter().map(|handler| handler.name())).finish()
	}
}

/// Frozen, cheaply cloneable handler sequence.
#[derive(Clone)]
pub struct ChainSnapshot(Arc<[Arc<dyn SoapHandler>]>);
impl ChainSnapshot {
	/// Handlers in execution order.
	pub fn iter(&self) -> Iter<'_, Arc<dyn SoapHandler>> {
		self.0.iter()
	}

	/// Handler labels in execution order.
	pub fn names(&self) -> Vec<&'static str> {
		self.0.iter().map(|handler| handler.name()).collect()
	}

	/// Number of handlers.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether the snapshot has no handlers.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Runs every outbound hook in order, stopping at the first failure.
	pub fn process_outbound(&self, envelope: &mut SoapEnvelope) -> Result<()> {
		for handler in self.iter() {
			handler.handle_outbound(envelope)?;
		}

		Ok(())
	}

	/// Runs every inbound hook in order, stopping at the first failure.
	pub fn process_inbound(&self, envelope: &SoapEnvelope) -> Result<()> {
		for handler in self.iter() {
			handler.handle_inbound(envelope)?;
		}

		Ok(())
	}
}
impl Debug for ChainSnapshot {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ChainSnapshot").field(&self.names()).finish()
	}
}
