//! Ordering of asynchronous snapshot fetches.
//!
//! Every fetch takes a ticket before it starts. A completion is accepted only
//! when its ticket is newer than every completion accepted so far, and accepted
//! snapshots waiting to be ingested are coalesced to the newest one.

use log::debug;

use super::types::GraphSnapshot;

/// Sequence number handed out when a fetch starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
	pub fn sequence(self) -> u64 {
		self.0
	}
}

#[derive(Debug, Default)]
pub struct RefreshQueue {
	issued: u64,
	newest_accepted: Option<FetchTicket>,
	pending: Option<(FetchTicket, GraphSnapshot)>,
}

impl RefreshQueue {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn begin_fetch(&mut self) -> FetchTicket {
		self.issued += 1;
		FetchTicket(self.issued)
	}

	/// Records a finished fetch. Returns `false` when it was superseded and dropped.
	pub fn complete(&mut self, ticket: FetchTicket, snapshot: GraphSnapshot) -> bool {
		if self.newest_accepted.is_some_and(|newest| ticket <= newest) {
			debug!(
				"discarding stale snapshot #{} (newest is #{})",
				ticket.0,
				self.newest_accepted.map_or(0, FetchTicket::sequence)
			);
			return false;
		}
		if let Some((replaced, _)) = &self.pending {
			debug!("snapshot #{} supersedes pending #{}", ticket.0, replaced.0);
		}
		self.newest_accepted = Some(ticket);
		self.pending = Some((ticket, snapshot));
		true
	}

	pub fn has_pending(&self) -> bool {
		self.pending.is_some()
	}

	pub fn take_latest(&mut self) -> Option<(FetchTicket, GraphSnapshot)> {
		self.pending.take()
	}
}
