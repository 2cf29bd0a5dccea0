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

//! Error types of the chain client.

use crate::rpc::TransactionStatus;
use thiserror::Error;
use xcm_format::CodecError;

/// Failure reported by the JSON-RPC transport or by the remote node.
#[derive(Error, Debug)]
pub enum RpcError {
	/// The node answered the call with an error object.
	#[error("RPC call failed: {0}")]
	Call(String),
	/// A [`jsonrpsee::core::ClientError`] wrapper error.
	#[error(transparent)]
	Transport(jsonrpsee::core::ClientError),
	/// The node answered with something we could not interpret.
	#[error("invalid RPC response: {0}")]
	InvalidResponse(String),
	/// The subscription ended before the expected item arrived.
	#[error("subscription closed by the node")]
	SubscriptionClosed,
	/// The client was closed with [`crate::ChainRpc::close`].
	#[error("RPC client is closed")]
	Closed,
}

impl RpcError {
	/// Whether the node itself refused the request, as opposed to the connection failing.
	pub fn is_call_error(&self) -> bool {
		matches!(self, RpcError::Call(_))
	}
}

impl From<jsonrpsee::core::ClientError> for RpcError {
	fn from(err: jsonrpsee::core::ClientError) -> Self {
		match err {
			jsonrpsee::core::ClientError::Call(obj) => RpcError::Call(match obj.data() {
				Some(data) => format!("{} ({}): {}", obj.message(), obj.code(), data.get()),
				None => format!("{} ({})", obj.message(), obj.code()),
			}),
			jsonrpsee::core::ClientError::ParseError(err) =>
				RpcError::InvalidResponse(err.to_string()),
			other => RpcError::Transport(other),
		}
	}
}

impl From<serde_json::Error> for RpcError {
	fn from(err: serde_json::Error) -> Self {
		RpcError::InvalidResponse(err.to_string())
	}
}

/// Errors raised while decoding or querying a metadata snapshot.
#[derive(Error, Debug)]
pub enum MetadataError {
	#[error(transparent)]
	Rpc(#[from] RpcError),
	/// The blob is not SCALE encoded `RuntimeMetadataPrefixed`.
	#[error("failed to decode runtime metadata: {0}")]
	Decode(#[from] codec::Error),
	#[error("metadata does not start with the `meta` magic number (found {0:#010x})")]
	InvalidMagic(u32),
	#[error("metadata version {0} is not supported, expected 14 or 15")]
	UnsupportedVersion(u32),
	/// The runtime has no XCM pallet.
	#[error("chain exposes neither `XcmPallet` nor `PolkadotXcm`")]
	Unsupported,
	#[error("type {0} is referenced but not defined in the registry")]
	UnknownType(u32),
	#[error("storage entry {module}.{entry} not found")]
	StorageNotFound { module: String, entry: String },
	/// A value decoded fine but does not have the layout this client relies on.
	#[error("unexpected layout of {0}")]
	UnexpectedShape(&'static str),
	#[error(transparent)]
	Codec(#[from] CodecError),
}

/// Errors raised while opening a [`crate::ChainSession`].
#[derive(Error, Debug)]
pub enum ConnectError {
	#[error("invalid endpoint `{endpoint}`: {reason}")]
	InvalidEndpoint { endpoint: String, reason: String },
	#[error("unsupported endpoint scheme `{0}`, expected ws or wss")]
	UnsupportedScheme(String),
	#[error(transparent)]
	Rpc(#[from] RpcError),
	#[error("chain exposes neither `XcmPallet` nor `PolkadotXcm`")]
	Unsupported,
	#[error(transparent)]
	Metadata(MetadataError),
}

impl From<MetadataError> for ConnectError {
	fn from(err: MetadataError) -> Self {
		match err {
			MetadataError::Unsupported => ConnectError::Unsupported,
			MetadataError::Rpc(err) => ConnectError::Rpc(err),
			other => ConnectError::Metadata(other),
		}
	}
}

/// Errors raised while building a call or an extrinsic. No network I/O is involved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
	#[error("none of the XCM pallets exposes a reserve transfer call")]
	CallNotFound,
	#[error("call parameter `{0}` is not supported")]
	UnsupportedParameter(String),
	#[error("invalid destination: {0}")]
	InvalidDestination(&'static str),
	#[error("beneficiary must be 20 or 32 bytes, got {0}")]
	InvalidBeneficiary(usize),
	#[error("no XCM version common to dest, beneficiary and assets")]
	NoCommonVersion,
	#[error("signed extension `{0}` is not supported")]
	UnsupportedExtension(String),
	#[error("unsupported extrinsic layout: {0}")]
	UnsupportedExtrinsic(String),
	#[error("type {0} is referenced but not defined in the registry")]
	UnknownType(u32),
	#[error(transparent)]
	Location(#[from] xcm_format::LocationError),
	#[error(transparent)]
	Conversion(#[from] xcm_format::ConversionError),
}

/// Errors raised by [`crate::ChainSession::submit`].
#[derive(Error, Debug)]
pub enum SubmitError {
	/// The node or the runtime refused the transaction.
	#[error("transaction rejected: {0}")]
	Rejected(String),
	/// The connection or the status stream was lost before inclusion.
	#[error("connection lost while waiting for inclusion: {0}")]
	Disconnected(String),
	#[error("transaction not included within {0:?}")]
	Timeout(std::time::Duration),
	#[error(transparent)]
	Build(#[from] BuildError),
	#[error(transparent)]
	Chain(#[from] ChainError),
}

impl SubmitError {
	pub(crate) fn from_status(status: &TransactionStatus) -> Option<Self> {
		match status {
			TransactionStatus::Invalid => Some(SubmitError::Rejected("invalid".into())),
			TransactionStatus::Dropped => Some(SubmitError::Rejected("dropped".into())),
			TransactionStatus::Usurped(hash) =>
				Some(SubmitError::Rejected(format!("usurped by {hash:?}"))),
			TransactionStatus::FinalityTimeout(hash) =>
				Some(SubmitError::Rejected(format!("finality timeout in block {hash:?}"))),
			_ => None,
		}
	}
}

/// Errors raised by queries on an open session.
#[derive(Error, Debug)]
pub enum ChainError {
	#[error(transparent)]
	Rpc(#[from] RpcError),
	#[error(transparent)]
	Metadata(#[from] MetadataError),
	#[error(transparent)]
	Codec(#[from] CodecError),
	#[error("block {0} not found")]
	BlockNotFound(String),
	#[error("extrinsic not found in block {0:?}")]
	ExtrinsicNotInBlock(primitive_types::H256),
	#[error("session is closed")]
	Closed,
}

/// Errors raised while parsing a secret reference.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyringError {
	#[error("secret must be 0x-prefixed 32-byte hex, mnemonic phrases are not supported")]
	UnsupportedPhrase,
	#[error("invalid hex secret")]
	InvalidHex,
	#[error("invalid secret length {0}, expected 32 bytes")]
	InvalidLength(usize),
	#[error("invalid derivation path `{0}`")]
	InvalidPath(String),
	#[error("password suffixes are not supported")]
	PasswordUnsupported,
}
