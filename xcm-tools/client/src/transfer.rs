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

//! Reserve transfer calls of the XCM pallet.
//!
//! The pallet, the call and the XCM version of every argument are looked up in the metadata of
//! the chain the transfer is submitted to. Building a call does no network I/O.

use crate::{
	error::BuildError,
	metadata::{CallDescriptor, MetadataRegistry, ModuleDescriptor, TypeId, XCM_PALLETS},
	LOG_TARGET,
};
use codec::Encode;
use std::{collections::BTreeMap, fmt, str::FromStr};
use thiserror::Error;
use xcm_format::{
	v2, v3, v4, VersionedAssets, VersionedLocation, VersionedXcm, XcmVersion, SUPPORTED_VERSIONS,
};

/// Transfer calls, in resolution order.
pub const TRANSFER_CALLS: [&str; 2] = ["reserve_transfer_assets", "limited_reserve_transfer_assets"];

/// Routing direction of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
	/// Parachain to relay chain.
	Ump,
	/// Parachain to parachain, through the relay chain.
	Hrmp,
	/// Relay chain to parachain.
	Dmp,
}

impl Protocol {
	/// Whether the message crosses the relay chain on its way to the destination.
	pub fn via_relay(&self) -> bool {
		matches!(self, Protocol::Ump | Protocol::Hrmp)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown protocol `{0}`, expected UMP, HRMP or DMP")]
pub struct UnknownProtocol(pub String);

impl FromStr for Protocol {
	type Err = UnknownProtocol;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"UMP" => Ok(Protocol::Ump),
			"HRMP" => Ok(Protocol::Hrmp),
			"DMP" => Ok(Protocol::Dmp),
			_ => Err(UnknownProtocol(s.to_owned())),
		}
	}
}

impl fmt::Display for Protocol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Protocol::Ump => "UMP",
			Protocol::Hrmp => "HRMP",
			Protocol::Dmp => "DMP",
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
	pub protocol: Protocol,
	/// Destination parachain, required for HRMP and DMP.
	pub dest_para_id: Option<u32>,
	/// Raw `AccountId32` (32 bytes) or `AccountKey20` (20 bytes).
	pub beneficiary: Vec<u8>,
	/// Amount in base units of the native token.
	pub amount: u128,
}

/// A call resolved against the metadata, ready to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCall {
	pub module: String,
	pub call: String,
	pub module_index: u8,
	pub call_index: u8,
	pub args: Vec<u8>,
}

impl EncodedCall {
	pub fn encode(&self) -> Vec<u8> {
		let mut encoded = Vec::with_capacity(2 + self.args.len());
		encoded.push(self.module_index);
		encoded.push(self.call_index);
		encoded.extend_from_slice(&self.args);
		encoded
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltTransfer {
	pub call: EncodedCall,
	pub version: XcmVersion,
	pub dest: VersionedLocation,
	pub beneficiary: VersionedLocation,
	pub assets: VersionedAssets,
	/// Program the XCM executor of the sending chain runs for this transfer.
	pub message: VersionedXcm,
}

/// Version-independent shape of the transfer program.
enum Step {
	WithdrawAsset(v3::MultiLocation),
	TransferReserveAsset { asset: v3::MultiLocation, dest: v3::MultiLocation, xcm: Vec<Step> },
	InitiateReserveWithdraw { reserve: v3::MultiLocation, xcm: Vec<Step> },
	DepositReserveAsset { dest: v3::MultiLocation, xcm: Vec<Step> },
	/// Pay for execution with the transferred asset, seen from the executing chain.
	BuyExecution(v3::MultiLocation),
	DepositAsset,
}

/// Values every step of a program refers to.
struct Program {
	steps: Vec<Step>,
	amount: u128,
	beneficiary: v3::MultiLocation,
}

impl Program {
	fn new(request: &TransferRequest, beneficiary: v3::MultiLocation) -> Result<Self, BuildError> {
		let deposit = || vec![Step::BuyExecution(v3::MultiLocation::parent()), Step::DepositAsset];
		let steps = match (request.protocol, request.dest_para_id) {
			(Protocol::Ump, None) => vec![
				Step::WithdrawAsset(v3::MultiLocation::parent()),
				Step::InitiateReserveWithdraw {
					reserve: v3::MultiLocation::parent(),
					xcm: vec![Step::BuyExecution(v3::MultiLocation::here()), Step::DepositAsset],
				},
			],
			(Protocol::Hrmp, Some(para)) => vec![
				Step::WithdrawAsset(v3::MultiLocation::parent()),
				Step::InitiateReserveWithdraw {
					reserve: v3::MultiLocation::parent(),
					xcm: vec![
						Step::BuyExecution(v3::MultiLocation::here()),
						Step::DepositReserveAsset { dest: parachain(0, para), xcm: deposit() },
					],
				},
			],
			(Protocol::Dmp, Some(para)) => vec![Step::TransferReserveAsset {
				asset: v3::MultiLocation::here(),
				dest: parachain(0, para),
				xcm: deposit(),
			}],
			_ => return Err(BuildError::InvalidDestination("unexpected destination parachain")),
		};
		Ok(Program { steps, amount: request.amount, beneficiary })
	}

	fn asset_v3(&self, location: &v3::MultiLocation) -> v3::MultiAsset {
		v3::MultiAsset {
			id: v3::AssetId::Concrete(location.clone()),
			fun: v3::Fungibility::Fungible(self.amount),
		}
	}

	fn asset_v4(&self, location: &v3::MultiLocation) -> v4::Asset {
		v4::Asset { id: v4::AssetId(location.clone()), fun: v4::Fungibility::Fungible(self.amount) }
	}

	fn asset_v2(&self, location: &v3::MultiLocation) -> Result<v2::MultiAsset, BuildError> {
		Ok(v2::MultiAsset {
			id: v2::AssetId::Concrete(location.clone().try_into()?),
			fun: v2::Fungibility::Fungible(self.amount),
		})
	}

	fn render(&self, version: XcmVersion) -> Result<VersionedXcm, BuildError> {
		Ok(match version {
			2 => VersionedXcm::V2(self.render_v2(&self.steps)?),
			3 => VersionedXcm::V3(self.render_v3(&self.steps)),
			_ => VersionedXcm::V4(self.render_v4(&self.steps)),
		})
	}

	fn render_v2(&self, steps: &[Step]) -> Result<v2::Xcm, BuildError> {
		use v2::Instruction::*;
		let all = || v2::MultiAssetFilter::Wild(v2::WildMultiAsset::All);
		steps
			.iter()
			.map(|step| {
				Ok(match step {
					Step::WithdrawAsset(asset) =>
						WithdrawAsset(v2::MultiAssets(vec![self.asset_v2(asset)?])),
					Step::TransferReserveAsset { asset, dest, xcm } => TransferReserveAsset {
						assets: v2::MultiAssets(vec![self.asset_v2(asset)?]),
						dest: dest.clone().try_into()?,
						xcm: self.render_v2(xcm)?,
					},
					Step::InitiateReserveWithdraw { reserve, xcm } => InitiateReserveWithdraw {
						assets: all(),
						reserve: reserve.clone().try_into()?,
						xcm: self.render_v2(xcm)?,
					},
					Step::DepositReserveAsset { dest, xcm } => DepositReserveAsset {
						assets: all(),
						max_assets: 1,
						dest: dest.clone().try_into()?,
						xcm: self.render_v2(xcm)?,
					},
					Step::BuyExecution(fees) => BuyExecution {
						fees: self.asset_v2(fees)?,
						weight_limit: v2::WeightLimit::Unlimited,
					},
					Step::DepositAsset => DepositAsset {
						assets: all(),
						max_assets: 1,
						beneficiary: self.beneficiary.clone().try_into()?,
					},
				})
			})
			.collect::<Result<_, BuildError>>()
			.map(v2::Xcm)
	}

	fn render_v3(&self, steps: &[Step]) -> v3::Xcm {
		use v3::Instruction::*;
		let one = || v3::MultiAssetFilter::Wild(v3::WildMultiAsset::AllCounted(1));
		v3::Xcm(
			steps
				.iter()
				.map(|step| match step {
					Step::WithdrawAsset(asset) => WithdrawAsset(v3::MultiAssets(vec![self.asset_v3(asset)])),
					Step::TransferReserveAsset { asset, dest, xcm } => TransferReserveAsset {
						assets: v3::MultiAssets(vec![self.asset_v3(asset)]),
						dest: dest.clone(),
						xcm: self.render_v3(xcm),
					},
					Step::InitiateReserveWithdraw { reserve, xcm } => InitiateReserveWithdraw {
						assets: one(),
						reserve: reserve.clone(),
						xcm: self.render_v3(xcm),
					},
					Step::DepositReserveAsset { dest, xcm } => DepositReserveAsset {
						assets: one(),
						dest: dest.clone(),
						xcm: self.render_v3(xcm),
					},
					Step::BuyExecution(fees) => BuyExecution {
						fees: self.asset_v3(fees),
						weight_limit: v3::WeightLimit::Unlimited,
					},
					Step::DepositAsset =>
						DepositAsset { assets: one(), beneficiary: self.beneficiary.clone() },
				})
				.collect(),
		)
	}

	fn render_v4(&self, steps: &[Step]) -> v4::Xcm {
		use v4::Instruction::*;
		let one = || v4::AssetFilter::Wild(v4::WildAsset::AllCounted(1));
		v4::Xcm(
			steps
				.iter()
				.map(|step| match step {
					Step::WithdrawAsset(asset) => WithdrawAsset(v4::Assets(vec![self.asset_v4(asset)])),
					Step::TransferReserveAsset { asset, dest, xcm } => TransferReserveAsset {
						assets: v4::Assets(vec![self.asset_v4(asset)]),
						dest: dest.clone(),
						xcm: self.render_v4(xcm),
					},
					Step::InitiateReserveWithdraw { reserve, xcm } => InitiateReserveWithdraw {
						assets: one(),
						reserve: reserve.clone(),
						xcm: self.render_v4(xcm),
					},
					Step::DepositReserveAsset { dest, xcm } => DepositReserveAsset {
						assets: one(),
						dest: dest.clone(),
						xcm: self.render_v4(xcm),
					},
					Step::BuyExecution(fees) => BuyExecution {
						fees: self.asset_v4(fees),
						weight_limit: v4::WeightLimit::Unlimited,
					},
					Step::DepositAsset =>
						DepositAsset { assets: one(), beneficiary: self.beneficiary.clone() },
				})
				.collect(),
		)
	}
}

fn parachain(parents: u8, para: u32) -> v3::MultiLocation {
	v3::MultiLocation::new(parents, v3::Junctions::x1(v3::Junction::Parachain(para)))
}

fn location_in(version: XcmVersion, location: v3::MultiLocation) -> Result<VersionedLocation, BuildError> {
	Ok(match version {
		2 => VersionedLocation::V2(location.try_into()?),
		3 => VersionedLocation::V3(location),
		_ => VersionedLocation::V4(location),
	})
}

fn assets_in(version: XcmVersion, assets: v3::MultiAssets) -> Result<VersionedAssets, BuildError> {
	Ok(match version {
		2 => VersionedAssets::V2(assets.try_into()?),
		3 => VersionedAssets::V3(assets),
		_ => VersionedAssets::V4(assets.try_into()?),
	})
}

/// Builds reserve transfer calls against one metadata snapshot.
pub struct TransferBuilder<'a> {
	registry: &'a MetadataRegistry,
}

impl<'a> TransferBuilder<'a> {
	pub fn new(registry: &'a MetadataRegistry) -> Self {
		TransferBuilder { registry }
	}

	/// First `(pallet, call)` of [`XCM_PALLETS`] x [`TRANSFER_CALLS`] present in the runtime.
	pub fn resolve_call(&self) -> Result<(&'a ModuleDescriptor, &'a CallDescriptor), BuildError> {
		let registry = self.registry;
		XCM_PALLETS
			.iter()
			.filter_map(|pallet| registry.find_module(pallet))
			.find_map(|module| {
				TRANSFER_CALLS.iter().find_map(|call| module.call(call)).map(|call| (module, call))
			})
			.ok_or(BuildError::CallNotFound)
	}

	pub fn build(&self, request: &TransferRequest) -> Result<BuiltTransfer, BuildError> {
		match (request.protocol, request.dest_para_id) {
			(Protocol::Ump, Some(_)) =>
				return Err(BuildError::InvalidDestination("UMP transfers target the relay chain")),
			(Protocol::Hrmp | Protocol::Dmp, None) =>
				return Err(BuildError::InvalidDestination("destination parachain id is required")),
			_ => (),
		}
		let beneficiary = beneficiary(&request.beneficiary)?;
		let (module, call) = self.resolve_call()?;

		let (dest, asset) = match (request.protocol, request.dest_para_id) {
			(Protocol::Hrmp, Some(para)) => (parachain(1, para), v3::MultiLocation::parent()),
			(Protocol::Dmp, Some(para)) => (parachain(0, para), v3::MultiLocation::here()),
			_ => (v3::MultiLocation::parent(), v3::MultiLocation::parent()),
		};
		let assets = v3::MultiAssets(vec![v3::MultiAsset {
			id: v3::AssetId::Concrete(asset),
			fun: v3::Fungibility::Fungible(request.amount),
		}]);

		let (version, indices) = self.common_version(call)?;
		let dest = location_in(version, dest)?;
		let versioned_beneficiary = location_in(version, beneficiary.clone())?;
		let assets = assets_in(version, assets)?;

		let index = |name: &str| {
			indices.get(name).copied().ok_or_else(|| BuildError::UnsupportedParameter(name.into()))
		};
		let mut args = Vec::new();
		for param in &call.params {
			match param.name.as_str() {
				"dest" => {
					args.push(index("dest")?);
					args.extend(dest.encode_inner());
				},
				"beneficiary" => {
					args.push(index("beneficiary")?);
					args.extend(versioned_beneficiary.encode_inner());
				},
				"assets" => {
					args.push(index("assets")?);
					args.extend(assets.encode_inner());
				},
				"fee_asset_item" => 0u32.encode_to(&mut args),
				"weight_limit" => {
					let unlimited = self
						.registry
						.resolve(param.ty)
						.and_then(|ty| ty.variant("Unlimited"))
						.ok_or_else(|| BuildError::UnsupportedParameter(param.name.clone()))?;
					args.push(unlimited.index);
				},
				other => return Err(BuildError::UnsupportedParameter(other.to_owned())),
			}
		}

		let message = Program::new(request, beneficiary)?.render(version)?;
		log::debug!(
			target: LOG_TARGET,
			"Built {}.{} for a {} transfer with XCM v{version}",
			module.name,
			call.name,
			request.protocol,
		);
		Ok(BuiltTransfer {
			call: EncodedCall {
				module: module.name.clone(),
				call: call.name.clone(),
				module_index: module.index,
				call_index: call.index,
				args,
			},
			version,
			dest,
			beneficiary: versioned_beneficiary,
			assets,
			message,
		})
	}

	/// XCM versions accepted by a versioned parameter type, with their variant index.
	fn versions(&self, ty: TypeId) -> BTreeMap<XcmVersion, u8> {
		self.registry
			.resolve(ty)
			.map(|ty| {
				ty.variants()
					.iter()
					.filter_map(|variant| {
						let version = variant.name.strip_prefix('V')?.parse::<XcmVersion>().ok()?;
						SUPPORTED_VERSIONS.contains(&version).then_some((version, variant.index))
					})
					.collect()
			})
			.unwrap_or_default()
	}

	/// Highest version listed by `dest`, `beneficiary` and `assets`, with the variant index of
	/// each parameter.
	fn common_version(
		&self,
		call: &CallDescriptor,
	) -> Result<(XcmVersion, BTreeMap<String, u8>), BuildError> {
		let versioned = call
			.params
			.iter()
			.filter(|param| matches!(param.name.as_str(), "dest" | "beneficiary" | "assets"))
			.map(|param| (param.name.clone(), self.versions(param.ty)))
			.collect::<Vec<_>>();
		let version = SUPPORTED_VERSIONS
			.iter()
			.rev()
			.copied()
			.find(|version| versioned.iter().all(|(_, versions)| versions.contains_key(version)))
			.ok_or(BuildError::NoCommonVersion)?;
		let indices = versioned
			.into_iter()
			.filter_map(|(name, versions)| versions.get(&version).map(|index| (name, *index)))
			.collect();
		Ok((version, indices))
	}
}

fn beneficiary(account: &[u8]) -> Result<v3::MultiLocation, BuildError> {
	let junction = match account.len() {
		32 => {
			let mut id = [0u8; 32];
			id.copy_from_slice(account);
			v3::Junction::AccountId32 { network: None, id }
		},
		20 => {
			let mut key = [0u8; 20];
			key.copy_from_slice(account);
			v3::Junction::AccountKey20 { network: None, key }
		},
		len => return Err(BuildError::InvalidBeneficiary(len)),
	};
	Ok(v3::MultiLocation::new(0, v3::Junctions::x1(junction)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::{metadata_v14, FixtureOptions};
	use codec::Compact;

	const ALICE: [u8; 32] = [
		0xd4, 0x35, 0x93, 0xc7, 0x15, 0xfd, 0xd3, 0x1c, 0x61, 0x14, 0x1a, 0xbd, 0x04, 0xa9, 0x9f,
		0xd6, 0x82, 0x2c, 0x85, 0x58, 0x85, 0x4c, 0xcd, 0xe3, 0x9a, 0x56, 0x84, 0xe7, 0xa5, 0x6d,
		0xa2, 0x7d,
	];

	fn registry(options: &FixtureOptions) -> MetadataRegistry {
		MetadataRegistry::from_bytes(&metadata_v14(options)).unwrap()
	}

	fn request(protocol: Protocol, dest_para_id: Option<u32>) -> TransferRequest {
		TransferRequest { protocol, dest_para_id, beneficiary: ALICE.to_vec(), amount: 1_000_000_000_000 }
	}

	#[test]
	fn directions_map_to_destinations() {
		let registry = registry(&FixtureOptions::default());
		let builder = TransferBuilder::new(&registry);

		let ump = builder.build(&request(Protocol::Ump, None)).unwrap();
		assert_eq!(ump.dest, VersionedLocation::V4(v4::Location::parent()));

		let hrmp = builder.build(&request(Protocol::Hrmp, Some(2087))).unwrap();
		assert_eq!(hrmp.dest, VersionedLocation::V4(parachain(1, 2087)));

		let dmp = builder.build(&request(Protocol::Dmp, Some(1000))).unwrap();
		assert_eq!(dmp.dest, VersionedLocation::V4(parachain(0, 1000)));
		assert_eq!(
			dmp.assets,
			VersionedAssets::V4(v4::Assets(vec![v4::Asset {
				id: v4::AssetId(v4::Location::here()),
				fun: v4::Fungibility::Fungible(1_000_000_000_000),
			}]))
		);
	}

	#[test]
	fn arguments_follow_metadata_order() {
		let registry = registry(&FixtureOptions::default());
		let built = TransferBuilder::new(&registry).build(&request(Protocol::Hrmp, Some(2087))).unwrap();
		assert_eq!(built.call.module, "PolkadotXcm");
		assert_eq!(built.call.call, "reserve_transfer_assets");
		assert_eq!(built.version, 4);

		let mut expected = vec![4, 1, 1, 0];
		Compact(2087u32).encode_to(&mut expected);
		expected.extend([4, 0, 1, 1, 0]);
		expected.extend(ALICE);
		expected.extend([4, 4, 1, 0, 0]);
		Compact(1_000_000_000_000u128).encode_to(&mut expected);
		expected.extend(0u32.encode());
		assert_eq!(built.call.args, expected);

		let encoded = built.call.encode();
		assert_eq!(encoded[0], registry.find_module("PolkadotXcm").unwrap().index);
		assert_eq!(encoded[1], 2);
	}

	#[test]
	fn limited_call_gets_an_unlimited_weight() {
		let options = FixtureOptions { reserve_transfer: false, ..Default::default() };
		let registry = registry(&options);
		let built = TransferBuilder::new(&registry).build(&request(Protocol::Ump, None)).unwrap();
		assert_eq!(built.call.call, "limited_reserve_transfer_assets");
		assert_eq!(built.call.call_index, 8);
		assert_eq!(built.call.args.last(), Some(&0));
		assert_eq!(&built.call.args[..3], &[4, 1, 0]);
	}

	#[test]
	fn version_is_the_highest_common_one() {
		let options = FixtureOptions { legacy_versions: true, ..Default::default() };
		let registry = registry(&options);
		let built = TransferBuilder::new(&registry).build(&request(Protocol::Dmp, Some(1000))).unwrap();
		assert_eq!(built.version, 3);
		assert_eq!(built.call.args[0], 3);
		assert_eq!(built.dest, VersionedLocation::V3(parachain(0, 1000)));
	}

	#[test]
	fn programs_match_the_direction() {
		let registry = registry(&FixtureOptions::default());
		let builder = TransferBuilder::new(&registry);
		assert_eq!(
			builder.build(&request(Protocol::Ump, None)).unwrap().message.instruction_names(),
			vec!["WithdrawAsset", "InitiateReserveWithdraw"]
		);
		assert_eq!(
			builder.build(&request(Protocol::Dmp, Some(1000))).unwrap().message.instruction_names(),
			vec!["TransferReserveAsset"]
		);
	}

	#[test]
	fn v2_program_deposits_with_max_assets() {
		let program =
			Program::new(&request(Protocol::Dmp, Some(1000)), beneficiary(&ALICE).unwrap()).unwrap();
		let VersionedXcm::V2(xcm) = program.render(2).unwrap() else { panic!("expected v2") };
		let [v2::Instruction::TransferReserveAsset { xcm: inner, .. }] = xcm.0.as_slice() else {
			panic!("unexpected program {xcm:?}")
		};
		assert!(matches!(
			inner.0.as_slice(),
			[v2::Instruction::BuyExecution { .. }, v2::Instruction::DepositAsset { max_assets: 1, .. }]
		));
	}

	#[test]
	fn invalid_requests_are_rejected() {
		let registry = registry(&FixtureOptions::default());
		let builder = TransferBuilder::new(&registry);
		assert!(matches!(
			builder.build(&request(Protocol::Ump, Some(1000))),
			Err(BuildError::InvalidDestination(_))
		));
		assert!(matches!(
			builder.build(&request(Protocol::Hrmp, None)),
			Err(BuildError::InvalidDestination(_))
		));
		let mut short = request(Protocol::Ump, None);
		short.beneficiary.pop();
		assert_eq!(builder.build(&short), Err(BuildError::InvalidBeneficiary(31)));

		let mut ethereum = request(Protocol::Ump, None);
		ethereum.beneficiary.truncate(20);
		let built = builder.build(&ethereum).unwrap();
		assert_eq!(&built.call.args[3..7], &[4, 0, 1, 3]);
	}

	#[test]
	fn missing_calls_are_reported() {
		let registry = registry(&FixtureOptions { xcm_calls: false, ..Default::default() });
		assert_eq!(
			TransferBuilder::new(&registry).build(&request(Protocol::Ump, None)),
			Err(BuildError::CallNotFound)
		);
	}

	#[test]
	fn protocol_parses_case_insensitively() {
		assert_eq!("ump".parse::<Protocol>(), Ok(Protocol::Ump));
		assert_eq!("HRMP".parse::<Protocol>(), Ok(Protocol::Hrmp));
		assert_eq!("Dmp".parse::<Protocol>(), Ok(Protocol::Dmp));
		assert!("xcmp".parse::<Protocol>().is_err());
		assert_eq!(Protocol::Hrmp.to_string(), "HRMP");
	}
}
