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

//! JSON-RPC transport.
//!
//! [`ChainRpc`] is the seam between sessions and the node: [`WsRpcClient`] speaks to a node over
//! a websocket, tests plug in the in-memory `MockRpc`.

use crate::{error::RpcError, ConnectionParams, LOG_TARGET};
use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use jsonrpsee::{
	core::client::{ClientT, SubscriptionClientT},
	rpc_params,
	ws_client::{WsClient, WsClientBuilder},
};
use parking_lot::Mutex;
use primitive_types::H256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

pub type BlockNumber = u32;

/// Stream of subscription items.
pub type RpcStream<T> = BoxStream<'static, Result<T, RpcError>>;

/// Raw bytes, hex encoded on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bytes(pub Vec<u8>);

impl Serialize for Bytes {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&array_bytes::bytes2hex("0x", &self.0))
	}
}

impl<'de> Deserialize<'de> for Bytes {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let hex = String::deserialize(deserializer)?;
		array_bytes::hex2bytes(&hex)
			.map(Bytes)
			.map_err(|e| serde::de::Error::custom(format!("invalid hex: {e:?}")))
	}
}

/// Block numbers come as hex strings from Substrate nodes, and as plain numbers from some others.
fn deserialize_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BlockNumber, D::Error> {
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum NumberOrHex {
		Number(u64),
		Hex(String),
	}

	let number = match NumberOrHex::deserialize(deserializer)? {
		NumberOrHex::Number(number) => number,
		NumberOrHex::Hex(hex) => u64::from_str_radix(hex.trim_start_matches("0x"), 16)
			.map_err(serde::de::Error::custom)?,
	};
	BlockNumber::try_from(number).map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
	pub parent_hash: H256,
	#[serde(deserialize_with = "deserialize_number")]
	pub number: BlockNumber,
	#[serde(default)]
	pub state_root: H256,
	#[serde(default)]
	pub extrinsics_root: H256,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Block {
	pub header: Header,
	/// Encoded extrinsics, each with its length prefix.
	pub extrinsics: Vec<Bytes>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignedBlock {
	pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeVersion {
	pub spec_name: String,
	pub spec_version: u32,
	pub transaction_version: u32,
}

/// Token properties reported by `system_properties`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainProperties {
	pub token_decimals: Option<u8>,
	pub token_symbol: Option<String>,
	pub ss58_format: Option<u16>,
}

impl ChainProperties {
	/// Interpret the JSON object, taking the first entry of multi-token chains.
	pub fn from_json(properties: &serde_json::Map<String, serde_json::Value>) -> Self {
		fn first(value: Option<&serde_json::Value>) -> Option<&serde_json::Value> {
			match value? {
				serde_json::Value::Array(items) => items.first(),
				other => Some(other),
			}
		}

		ChainProperties {
			token_decimals: first(properties.get("tokenDecimals"))
				.and_then(serde_json::Value::as_u64)
				.and_then(|decimals| u8::try_from(decimals).ok()),
			token_symbol: first(properties.get("tokenSymbol"))
				.and_then(serde_json::Value::as_str)
				.map(str::to_owned),
			ss58_format: properties
				.get("ss58Format")
				.and_then(serde_json::Value::as_u64)
				.and_then(|format| u16::try_from(format).ok()),
		}
	}
}

/// Status notifications of `author_submitAndWatchExtrinsic`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionStatus {
	Future,
	Ready,
	Broadcast(Vec<String>),
	InBlock(H256),
	Retracted(H256),
	FinalityTimeout(H256),
	Finalized(H256),
	Usurped(H256),
	Dropped,
	Invalid,
}

/// The calls a session makes to a node.
#[async_trait]
pub trait ChainRpc: Send + Sync {
	/// Encoded `RuntimeMetadataPrefixed` of the best block.
	async fn metadata(&self) -> Result<Vec<u8>, RpcError>;
	async fn runtime_version(&self) -> Result<RuntimeVersion, RpcError>;
	async fn system_properties(&self) -> Result<ChainProperties, RpcError>;
	/// Hash of block `number`, or of the best block.
	async fn block_hash(&self, number: Option<BlockNumber>) -> Result<Option<H256>, RpcError>;
	async fn finalized_head(&self) -> Result<H256, RpcError>;
	async fn header(&self, hash: Option<H256>) -> Result<Option<Header>, RpcError>;
	async fn block(&self, hash: H256) -> Result<Option<SignedBlock>, RpcError>;
	async fn storage(&self, key: &[u8], at: Option<H256>) -> Result<Option<Vec<u8>>, RpcError>;
	async fn subscribe_finalized_heads(&self) -> Result<RpcStream<Header>, RpcError>;
	/// Submit a length-prefixed signed extrinsic and follow its status.
	async fn submit_and_watch(&self, extrinsic: &[u8])
		-> Result<RpcStream<TransactionStatus>, RpcError>;
	/// Release the transport. Calling it more than once has no effect.
	async fn close(&self);
}

/// [`ChainRpc`] over a jsonrpsee websocket client.
pub struct WsRpcClient {
	endpoint: String,
	client: Mutex<Option<Arc<WsClient>>>,
}

impl WsRpcClient {
	pub async fn connect(endpoint: &str, params: &ConnectionParams) -> Result<Self, RpcError> {
		log::info!(target: LOG_TARGET, "Connecting to {endpoint}");
		let client = WsClientBuilder::default()
			.max_request_size(params.max_request_size)
			.max_response_size(params.max_response_size)
			.request_timeout(params.request_timeout)
			.connection_timeout(params.connection_timeout)
			.build(endpoint)
			.await?;
		Ok(WsRpcClient { endpoint: endpoint.to_owned(), client: Mutex::new(Some(Arc::new(client))) })
	}

	fn client(&self) -> Result<Arc<WsClient>, RpcError> {
		self.client.lock().clone().ok_or(RpcError::Closed)
	}

	fn stream<T: Send + 'static>(
		subscription: jsonrpsee::core::client::Subscription<T>,
	) -> RpcStream<T>
	where
		T: serde::de::DeserializeOwned,
	{
		subscription.map(|item| item.map_err(RpcError::from)).boxed()
	}
}

#[async_trait]
impl ChainRpc for WsRpcClient {
	async fn metadata(&self) -> Result<Vec<u8>, RpcError> {
		let bytes: Bytes = self.client()?.request("state_getMetadata", rpc_params![]).await?;
		Ok(bytes.0)
	}

	async fn runtime_version(&self) -> Result<RuntimeVersion, RpcError> {
		Ok(self.client()?.request("state_getRuntimeVersion", rpc_params![]).await?)
	}

	async fn system_properties(&self) -> Result<ChainProperties, RpcError> {
		let properties: serde_json::Map<String, serde_json::Value> =
			self.client()?.request("system_properties", rpc_params![]).await?;
		Ok(ChainProperties::from_json(&properties))
	}

	async fn block_hash(&self, number: Option<BlockNumber>) -> Result<Option<H256>, RpcError> {
		Ok(self.client()?.request("chain_getBlockHash", rpc_params![number]).await?)
	}

	async fn finalized_head(&self) -> Result<H256, RpcError> {
		Ok(self.client()?.request("chain_getFinalizedHead", rpc_params![]).await?)
	}

	async fn header(&self, hash: Option<H256>) -> Result<Option<Header>, RpcError> {
		Ok(self.client()?.request("chain_getHeader", rpc_params![hash]).await?)
	}

	async fn block(&self, hash: H256) -> Result<Option<SignedBlock>, RpcError> {
		Ok(self.client()?.request("chain_getBlock", rpc_params![hash]).await?)
	}

	async fn storage(&self, key: &[u8], at: Option<H256>) -> Result<Option<Vec<u8>>, RpcError> {
		let value: Option<Bytes> = self
			.client()?
			.request("state_getStorage", rpc_params![Bytes(key.to_vec()), at])
			.await?;
		Ok(value.map(|bytes| bytes.0))
	}

	async fn subscribe_finalized_heads(&self) -> Result<RpcStream<Header>, RpcError> {
		let subscription = self
			.client()?
			.subscribe(
				"chain_subscribeFinalizedHeads",
				rpc_params![],
				"chain_unsubscribeFinalizedHeads",
			)
			.await?;
		Ok(Self::stream(subscription))
	}

	async fn submit_and_watch(
		&self,
		extrinsic: &[u8],
	) -> Result<RpcStream<TransactionStatus>, RpcError> {
		let subscription = self
			.client()?
			.subscribe(
				"author_submitAndWatchExtrinsic",
				rpc_params![Bytes(extrinsic.to_vec())],
				"author_unwatchExtrinsic",
			)
			.await?;
		Ok(Self::stream(subscription))
	}

	async fn close(&self) {
		if self.client.lock().take().is_some() {
			log::debug!(target: LOG_TARGET, "Closed connection to {}", self.endpoint);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn header_accepts_hex_and_plain_numbers() {
		let hash = format!("0x{}", "11".repeat(32));
		let header: Header =
			serde_json::from_str(&format!(r#"{{"parentHash":"{hash}","number":"0x1a"}}"#)).unwrap();
		assert_eq!(header.number, 26);
		assert_eq!(header.parent_hash, H256::repeat_byte(0x11));
		let header: Header =
			serde_json::from_str(&format!(r#"{{"parentHash":"{hash}","number":7}}"#)).unwrap();
		assert_eq!(header.number, 7);
	}

	#[test]
	fn transaction_status_uses_node_naming() {
		let hash = format!("0x{}", "22".repeat(32));
		let parse = |json: &str| serde_json::from_str::<TransactionStatus>(json).unwrap();
		assert_eq!(parse(r#""ready""#), TransactionStatus::Ready);
		assert_eq!(parse(r#""invalid""#), TransactionStatus::Invalid);
		assert_eq!(
			parse(&format!(r#"{{"inBlock":"{hash}"}}"#)),
			TransactionStatus::InBlock(H256::repeat_byte(0x22))
		);
		assert_eq!(
			parse(&format!(r#"{{"finalityTimeout":"{hash}"}}"#)),
			TransactionStatus::FinalityTimeout(H256::repeat_byte(0x22))
		);
		assert_eq!(parse(r#"{"broadcast":["peer"]}"#), TransactionStatus::Broadcast(vec!["peer".into()]));
	}

	#[test]
	fn chain_properties_take_the_first_token() {
		let json = serde_json::json!({
			"tokenDecimals": [12, 10],
			"tokenSymbol": ["KSM", "XYZ"],
			"ss58Format": 2,
		});
		let properties = ChainProperties::from_json(json.as_object().unwrap());
		assert_eq!(
			properties,
			ChainProperties {
				token_decimals: Some(12),
				token_symbol: Some("KSM".into()),
				ss58_format: Some(2)
			}
		);
		assert_eq!(ChainProperties::from_json(&Default::default()), ChainProperties::default());
	}

	#[test]
	fn bytes_are_hex_on_the_wire() {
		let bytes: Bytes = serde_json::from_str(r#""0x0102""#).unwrap();
		assert_eq!(bytes, Bytes(vec![1, 2]));
		assert_eq!(serde_json::to_string(&bytes).unwrap(), r#""0x0102""#);
	}
}
