// Copyright (C) Parity Technologies (UK) Ltd.
// This file is part of Polkadot.

// Polkadot is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// Polkadot is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with Polkadot.  If not, see <http://www.gnu.org/licenses/>.

//! Walks the finalized blocks of a chain one by one.

use crate::{state::BlockRef, LOG_TARGET};
use futures::StreamExt;
use std::time::Duration;
use xcm_client::{rpc::RpcStream, BlockNumber, ChainError, ChainSession, EventRecord, Header};

/// Yields successive finalized blocks from a starting number.
///
/// New heads come from the finalized heads subscription. When the subscription is silent for a
/// poll interval, or gone, the finalized head is polled instead.
pub(crate) struct BlockFollower<'a> {
	session: &'a ChainSession,
	next: BlockNumber,
	finalized: BlockNumber,
	heads: Option<RpcStream<Header>>,
	poll_interval: Duration,
}

impl<'a> BlockFollower<'a> {
	pub async fn new(
		session: &'a ChainSession,
		from: BlockNumber,
		poll_interval: Duration,
	) -> Result<BlockFollower<'a>, ChainError> {
		let heads = match session.subscribe_finalized().await {
			Ok(heads) => Some(heads),
			Err(ChainError::Closed) => return Err(ChainError::Closed),
			Err(err) => {
				log::debug!(
					target: LOG_TARGET,
					"No finalized heads subscription on {}, polling: {err}",
					session.endpoint(),
				);
				None
			},
		};
		let finalized = session.finalized_number().await?;
		Ok(BlockFollower { session, next: from, finalized, heads, poll_interval })
	}

	/// Next block, waiting for it to be finalized.
	pub async fn next_block(&mut self) -> Result<BlockRef, ChainError> {
		while self.next > self.finalized {
			self.wait_for_head().await?;
		}
		let number = self.next;
		let hash = self
			.session
			.block_hash(number)
			.await?
			.ok_or_else(|| ChainError::BlockNotFound(number.to_string()))?;
		self.next += 1;
		Ok(BlockRef { number, hash })
	}

	/// Walk blocks until `matcher` recognizes something in their events.
	pub async fn find<T>(
		&mut self,
		mut matcher: impl FnMut(&[EventRecord]) -> Option<T>,
	) -> Result<(BlockRef, T), ChainError> {
		loop {
			let block = self.next_block().await?;
			let events = self.session.events_at(block.hash).await?;
			log::trace!(
				target: LOG_TARGET,
				"Scanning {} events of block #{} on {}",
				events.len(),
				block.number,
				self.session.endpoint(),
			);
			if let Some(found) = matcher(&events) {
				return Ok((block, found))
			}
		}
	}

	async fn wait_for_head(&mut self) -> Result<(), ChainError> {
		match self.heads.as_mut() {
			Some(heads) => match tokio::time::timeout(self.poll_interval, heads.next()).await {
				Ok(Some(Ok(header))) => {
					self.finalized = self.finalized.max(header.number);
					return Ok(())
				},
				Ok(Some(Err(err))) => {
					log::warn!(target: LOG_TARGET, "Finalized heads subscription failed: {err}");
					self.heads = None;
				},
				Ok(None) => {
					log::debug!(target: LOG_TARGET, "Finalized heads subscription closed");
					self.heads = None;
				},
				Err(_) => {},
			},
			None => tokio::time::sleep(self.poll_interval).await,
		}
		self.finalized = self.finalized.max(self.session.finalized_number().await?);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;
	use xcm_client::{test_utils::MockRpc, ConnectionParams};

	#[tokio::test]
	async fn follows_blocks_finalized_after_it_started() {
		let rpc = Arc::new(MockRpc::default());
		let session = ChainSession::from_rpc("ws://mock", rpc.clone(), ConnectionParams::default())
			.await
			.unwrap();
		let first = rpc.push_empty_blocks(2);

		let mut follower = BlockFollower::new(&session, 2, Duration::from_millis(10)).await.unwrap();
		assert_eq!(follower.next_block().await.unwrap(), BlockRef { number: 2, hash: first });

		let producer = {
			let rpc = rpc.clone();
			tokio::spawn(async move {
				tokio::time::sleep(Duration::from_millis(30)).await;
				rpc.push_empty_blocks(1)
			})
		};
		let next = follower.next_block().await.unwrap();
		assert_eq!(next.number, 3);
		assert_eq!(Some(next.hash), Some(producer.await.unwrap()));
	}
}
