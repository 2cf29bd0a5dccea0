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

//! Chain sessions for building, signing and submitting XCM transfers.
//!
//! Everything chain-specific is read from the runtime metadata of the connected node: pallet and
//! call indices, the XCM versions accepted by the transfer call, the signed extensions and the
//! layout of storage values and events. Nothing is hardcoded per chain.

pub mod error;
pub mod events;
pub mod extrinsic;
pub mod keyring;
pub mod metadata;
pub mod rpc;
pub mod session;
pub mod transfer;
pub mod value;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

pub use error::{
	BuildError, ChainError, ConnectError, KeyringError, MetadataError, RpcError, SubmitError,
};
pub use events::{EventRecord, Phase};
pub use keyring::{AccountId, Keyring};
pub use metadata::MetadataRegistry;
pub use rpc::{BlockNumber, ChainRpc, Header, WsRpcClient};
pub use session::{ChainSession, ConnectionParams, Submission};
pub use transfer::{BuiltTransfer, EncodedCall, Protocol, TransferBuilder, TransferRequest};
pub use value::Value;

pub use primitive_types::H256;

/// Log target of this crate.
pub const LOG_TARGET: &str = "xcm-client";
