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

//! Command line interface.

use crate::{amount, parse, LOG_TARGET};
use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use std::time::Duration;
use xcm_client::{
	ChainSession, ConnectionParams, Keyring, Protocol, Submission, TransferRequest,
};
use xcm_tracker::{
	ExtrinsicRef, MessageTracker, TrackError, TrackOutcome, TrackParams, TrackerConfig,
	TrackingSession, TrackingState,
};

/// Send, decode and track XCM transfers.
#[derive(Parser, Debug)]
#[command(name = "xcm-tools", version, about, long_about = None)]
pub struct Cli {
	#[command(subcommand)]
	pub command: Command,
	#[command(flatten)]
	pub connection: ConnectionArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Submit a reserve transfer of the native token.
	#[command(subcommand)]
	Send(SendCommand),
	/// Decode a version-tagged XCM message.
	Parse(ParseArgs),
	/// Follow the message sent by an extrinsic to its outcome.
	#[command(alias = "tracker")]
	Track(TrackArgs),
}

#[derive(Subcommand, Debug)]
pub enum SendCommand {
	/// From a parachain to its relay chain.
	#[command(name = "ump", alias = "UMP")]
	Ump(SendArgs),
	/// From a parachain to a sibling parachain.
	#[command(name = "hrmp", alias = "HRMP")]
	Hrmp(ParaSendArgs),
	/// From the relay chain to a parachain.
	#[command(name = "dmp", alias = "DMP")]
	Dmp(ParaSendArgs),
}

#[derive(Args, Debug)]
pub struct ConnectionArgs {
	/// RPC request timeout, in seconds.
	#[arg(long, global = true, default_value_t = 60)]
	pub request_timeout: u64,
	/// Websocket connection timeout, in seconds.
	#[arg(long, global = true, default_value_t = 30)]
	pub connection_timeout: u64,
	/// Largest accepted RPC response, in MiB.
	#[arg(long, global = true, default_value_t = 64)]
	pub max_response_size: u32,
}

impl ConnectionArgs {
	pub fn params(&self) -> ConnectionParams {
		ConnectionParams {
			request_timeout: Duration::from_secs(self.request_timeout),
			connection_timeout: Duration::from_secs(self.connection_timeout),
			max_response_size: self.max_response_size.saturating_mul(1024 * 1024),
			..Default::default()
		}
	}
}

#[derive(Args, Debug)]
pub struct SendArgs {
	/// Beneficiary account: 0x-prefixed hex of 32 bytes, or 20 bytes for Ethereum-style accounts.
	#[arg(long)]
	pub dest: String,
	/// Amount of whole tokens, e.g. `1.25`.
	#[arg(long)]
	pub amount: String,
	/// Token decimals, overriding the chain's `tokenDecimals` property.
	#[arg(long)]
	pub decimals: Option<u8>,
	/// Signing key: 0x-prefixed secret seed, optionally with `//hard` or `/soft` junctions, or a
	/// development account such as `//Alice`.
	#[arg(long, env = "SK", hide_env_values = true)]
	pub keyring: String,
	/// Websocket endpoint of the source chain.
	#[arg(long, env = "ENDPOINT")]
	pub endpoint: String,
	#[command(flatten)]
	pub follow: FollowArgs,
}

#[derive(Args, Debug)]
pub struct ParaSendArgs {
	/// Destination parachain.
	#[arg(long, alias = "paraId")]
	pub para_id: u32,
	#[command(flatten)]
	pub send: SendArgs,
}

/// Where to follow the message after submission.
#[derive(Args, Debug)]
pub struct FollowArgs {
	/// Destination endpoint. When given, the message is tracked after submission.
	#[arg(long, alias = "destEndpoint")]
	pub dest_endpoint: Option<String>,
	/// Relay chain endpoint, required to track HRMP messages.
	#[arg(long, alias = "relaychainEndpoint")]
	pub relaychain_endpoint: Option<String>,
	#[command(flatten)]
	pub tracking: TrackingArgs,
}

#[derive(Args, Debug)]
pub struct TrackingArgs {
	/// Give up tracking after this many seconds.
	#[arg(long, default_value_t = 600)]
	pub timeout: u64,
	/// Seconds to wait for a new finalized head before polling for it.
	#[arg(long, default_value_t = 6)]
	pub poll_interval: u64,
	/// Blocks to look back when no better starting point is known.
	#[arg(long, default_value_t = 10)]
	pub lookback: u32,
}

impl TrackingArgs {
	pub fn config(&self) -> TrackerConfig {
		TrackerConfig {
			timeout: Duration::from_secs(self.timeout),
			poll_interval: Duration::from_secs(self.poll_interval),
			lookback: self.lookback,
		}
	}
}

#[derive(Args, Debug)]
pub struct ParseArgs {
	/// Raw message, 0x-prefixed hex starting with the version tag.
	#[arg(long)]
	pub message: String,
	/// Endpoint whose metadata decodes versions without a static table.
	#[arg(long, env = "ENDPOINT")]
	pub endpoint: Option<String>,
}

#[derive(Args, Debug)]
pub struct TrackArgs {
	/// Sending extrinsic, as `<block>-<index>`.
	#[arg(long, alias = "extrinsicIndex", value_parser = parse_extrinsic_ref)]
	pub extrinsic_index: ExtrinsicRef,
	/// UMP, HRMP or DMP.
	#[arg(long)]
	pub protocol: Protocol,
	/// Websocket endpoint of the source chain.
	#[arg(long, env = "ENDPOINT")]
	pub endpoint: String,
	/// Websocket endpoint of the destination chain.
	#[arg(long, alias = "destEndpoint")]
	pub dest_endpoint: String,
	/// Relay chain endpoint, required for HRMP.
	#[arg(long, alias = "relaychainEndpoint")]
	pub relaychain_endpoint: Option<String>,
	#[command(flatten)]
	pub tracking: TrackingArgs,
}

impl Cli {
	pub async fn run(self) -> anyhow::Result<()> {
		let params = self.connection.params();
		match self.command {
			Command::Send(SendCommand::Ump(args)) => send(Protocol::Ump, None, &args, params).await,
			Command::Send(SendCommand::Hrmp(args)) =>
				send(Protocol::Hrmp, Some(args.para_id), &args.send, params).await,
			Command::Send(SendCommand::Dmp(args)) =>
				send(Protocol::Dmp, Some(args.para_id), &args.send, params).await,
			Command::Parse(args) => parse_message(&args, params).await,
			Command::Track(args) => {
				let track = TrackParams {
					source_endpoint: args.endpoint,
					extrinsic: args.extrinsic_index,
					protocol: args.protocol,
					dest_endpoint: args.dest_endpoint,
					relay_endpoint: args.relaychain_endpoint,
				};
				let outcome = MessageTracker::new(params, args.tracking.config())
					.track(&track)
					.await
					.map_err(report_error)?;
				report(&outcome)
			},
		}
	}
}

fn parse_extrinsic_ref(s: &str) -> Result<ExtrinsicRef, String> {
	s.parse().map_err(|err: TrackError| err.to_string())
}

async fn connect(endpoint: &str, params: ConnectionParams) -> anyhow::Result<ChainSession> {
	ChainSession::connect(endpoint, params)
		.await
		.with_context(|| format!("connecting to {endpoint}"))
}

async fn send(
	protocol: Protocol,
	dest_para_id: Option<u32>,
	args: &SendArgs,
	params: ConnectionParams,
) -> anyhow::Result<()> {
	let keyring = Keyring::from_secret(&args.keyring).context("reading the signing key")?;
	let beneficiary = array_bytes::hex2bytes(args.dest.trim())
		.map_err(|err| anyhow!("beneficiary is not hex: {err:?}"))?;
	log::info!(
		target: LOG_TARGET,
		"Sending {protocol} transfer signed by {}",
		array_bytes::bytes2hex("0x", keyring.public()),
	);

	let session = connect(&args.endpoint, params.clone()).await?;
	let submitted =
		submit_transfer(&session, protocol, dest_para_id, beneficiary, args, &keyring).await;
	session.close().await;
	let submission = submitted?;
	println!(
		"{protocol} transfer included in block #{} ({:?}), extrinsic {}, tx hash {}",
		submission.block_number,
		submission.block_hash,
		submission.extrinsic_ref(),
		submission.tx_hash_hex(),
	);

	let Some(dest_endpoint) = args.follow.dest_endpoint.clone() else { return Ok(()) };
	let track = TrackParams {
		source_endpoint: args.endpoint.clone(),
		extrinsic: ExtrinsicRef {
			block: submission.block_number,
			index: submission.extrinsic_index,
		},
		protocol,
		dest_endpoint,
		relay_endpoint: args.follow.relaychain_endpoint.clone(),
	};
	let tracker = MessageTracker::new(params, args.follow.tracking.config());
	match tracker.track(&track).await {
		Ok(outcome) => report(&outcome),
		Err(err) => Err(anyhow::Error::new(report_error(err)).context(format!(
			"submitted in block {}, tracking incomplete",
			submission.block_number
		))),
	}
}

/// Build the transfer described by `args` and submit it through `session`.
pub async fn submit_transfer(
	session: &ChainSession,
	protocol: Protocol,
	dest_para_id: Option<u32>,
	beneficiary: Vec<u8>,
	args: &SendArgs,
	keyring: &Keyring,
) -> anyhow::Result<Submission> {
	let decimals = args
		.decimals
		.or(session.properties().token_decimals)
		.context("the chain declares no token decimals, pass --decimals")?;
	let amount = amount::to_base_units(&args.amount, decimals)?;
	let request = TransferRequest { protocol, dest_para_id, beneficiary, amount };
	let transfer = session.transfer_builder().build(&request).context("building transfer")?;
	log::info!(
		target: LOG_TARGET,
		"Calling {}.{} with XCM v{}: {:?}",
		transfer.call.module,
		transfer.call.call,
		transfer.version,
		transfer.message.instruction_names(),
	);
	session.submit(&transfer.call, keyring).await.context("submitting transfer")
}

async fn parse_message(args: &ParseArgs, params: ConnectionParams) -> anyhow::Result<()> {
	let bytes = parse::hex_message(&args.message)?;
	let json = match parse::decode_static(&bytes)? {
		parse::Decoded::Static(message) => serde_json::to_value(&message)?,
		parse::Decoded::UnknownVersion(version) => {
			let endpoint = args.endpoint.as_deref().with_context(|| {
				format!("XCM v{version} has no static table, pass --endpoint to decode it")
			})?;
			let session = connect(endpoint, params).await?;
			let decoded = parse::decode_with_registry(session.registry(), &bytes);
			session.close().await;
			decoded?
		},
	};
	println!("{}", serde_json::to_string_pretty(&json)?);
	Ok(())
}

fn report(outcome: &TrackOutcome) -> anyhow::Result<()> {
	print_history(&outcome.session);
	match (outcome.state(), &outcome.failure) {
		(TrackingState::Executed, _) => {
			println!("Executed");
			Ok(())
		},
		(state, Some(reason)) => Err(anyhow!("message {state}: {reason}")),
		(state, None) => Err(anyhow!("message ended in state {state}")),
	}
}

/// Print the progress recorded before tracking stopped, then pass the error on.
fn report_error(err: TrackError) -> TrackError {
	if let TrackError::Timeout { session: Some(session), .. } = &err {
		print_history(session);
	}
	err
}

fn print_history(session: &TrackingSession) {
	println!("Message {:?} sent by extrinsic {}", session.message_hash, session.extrinsic);
	for transition in session.history() {
		match transition.block {
			Some(block) => println!(
				"  {} -> {} on {} chain, block #{} ({:?})",
				transition.from, transition.to, transition.phase, block.number, block.hash
			),
			None =>
				println!("  {} -> {} in {} phase", transition.from, transition.to, transition.phase),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;
	use xcm_client::test_utils::{metadata_v14, FixtureOptions, MockRpc};

	fn send_args(amount: &str, decimals: Option<u8>) -> SendArgs {
		SendArgs {
			dest: "0xd43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d".into(),
			amount: amount.into(),
			decimals,
			keyring: "//Alice".into(),
			endpoint: "ws://mock".into(),
			follow: FollowArgs {
				dest_endpoint: None,
				relaychain_endpoint: None,
				tracking: TrackingArgs { timeout: 1, poll_interval: 1, lookback: 1 },
			},
		}
	}

	#[test]
	fn command_line_parses() {
		let cli = Cli::try_parse_from([
			"xcm-tools",
			"send",
			"HRMP",
			"--para-id",
			"2087",
			"--dest",
			"0x00",
			"--amount",
			"1.5",
			"--keyring",
			"//Alice",
			"--endpoint",
			"ws://127.0.0.1:9944",
		])
		.unwrap();
		assert_matches::assert_matches!(
			cli.command,
			Command::Send(SendCommand::Hrmp(ParaSendArgs { para_id: 2087, .. }))
		);

		let cli = Cli::try_parse_from([
			"xcm-tools",
			"track",
			"--extrinsic-index",
			"100-2",
			"--protocol",
			"ump",
			"--endpoint",
			"ws://para",
			"--dest-endpoint",
			"ws://relay",
			"--timeout",
			"30",
		])
		.unwrap();
		let Command::Track(args) = cli.command else { panic!("expected track") };
		assert_eq!(args.extrinsic_index, ExtrinsicRef { block: 100, index: 2 });
		assert_eq!(args.protocol, Protocol::Ump);
		assert_eq!(args.tracking.config().timeout, Duration::from_secs(30));

		assert!(Cli::try_parse_from(["xcm-tools", "track", "--extrinsic-index", "100"]).is_err());
	}

	#[tokio::test]
	async fn ump_transfer_to_alice_returns_the_transaction_hash() {
		let rpc = Arc::new(MockRpc::new(metadata_v14(&FixtureOptions {
			xcm_pallet: Some("XcmPallet"),
			..Default::default()
		})));
		let session = ChainSession::from_rpc("ws://mock", rpc.clone(), ConnectionParams::default())
			.await
			.unwrap();
		let args = send_args("1", None);
		let keyring = Keyring::from_secret(&args.keyring).unwrap();
		let beneficiary = array_bytes::hex2bytes(&args.dest).unwrap();

		let submission = submit_transfer(&session, Protocol::Ump, None, beneficiary, &args, &keyring)
			.await
			.unwrap();

		assert_eq!(submission.tx_hash_hex().len(), 66);
		assert_eq!(rpc.submitted().len(), 1);
		let (module, call) = session.transfer_builder().resolve_call().unwrap();
		assert_eq!((module.name.as_str(), call.name.as_str()), ("XcmPallet", "reserve_transfer_assets"));
	}

	#[tokio::test]
	async fn amounts_finer_than_the_chain_decimals_are_not_submitted() {
		let rpc = Arc::new(MockRpc::default());
		let session = ChainSession::from_rpc("ws://mock", rpc.clone(), ConnectionParams::default())
			.await
			.unwrap();
		let args = send_args("0.0000000000001", None);
		let keyring = Keyring::from_secret(&args.keyring).unwrap();

		let result =
			submit_transfer(&session, Protocol::Ump, None, vec![1; 32], &args, &keyring).await;

		assert!(result.unwrap_err().downcast_ref::<amount::AmountError>().is_some());
		assert!(rpc.submitted().is_empty());
	}
}
